//! Command-line interface for todos
//!
//! This module defines the CLI structure using clap derive macros.
//! Each subcommand is defined in its own submodule.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::Config;
use crate::error::Result;
use crate::events::EventDestination;
use crate::output::OutputOptions;
use crate::reducer::RankRefresh;
use crate::selector::Route;

mod replay;
mod show_config;

/// todos - a terminal to-do list
///
/// Add, edit, toggle and remove tasks. New tasks stay highlighted for a
/// short countdown; the three most recently completed tasks are ranked.
#[derive(Parser, Debug)]
#[command(name = "todos")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to a config file (defaults to ./.todos.toml, then the user config dir)
    #[arg(long, global = true, env = "TODOS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Emit one JSON event per applied action to a file ("-" for stdout)
    #[arg(long, global = true, value_name = "DEST")]
    pub events: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Interactive terminal list (the default)
    Tui {
        /// Route to open: /, /active or /completed
        #[arg(long)]
        route: Option<String>,
    },

    /// Apply a JSONL stream of actions and print the resulting list
    Replay {
        /// Actions file, one JSON action per line ("-" for stdin)
        #[arg(default_value = "-")]
        input: PathBuf,

        /// Route to print: /, /active or /completed
        #[arg(long)]
        route: Option<String>,

        /// Seed the id generator for reproducible ids
        #[arg(long)]
        seed: Option<u64>,

        /// Use a stepped clock starting at this epoch-millisecond instant
        #[arg(long, value_name = "MS")]
        start_ms: Option<i64>,

        /// Clock step per action when --start-ms is set
        #[arg(long, value_name = "MS", default_value = "1000")]
        step_ms: i64,

        /// Override ranks.refresh: every_mutation or toggle
        #[arg(long)]
        refresh: Option<String>,
    },

    /// Show the effective configuration
    Config,
}

impl Cli {
    /// Execute the CLI command
    pub fn run(self) -> Result<()> {
        let cwd = std::env::current_dir()?;
        let (config, source) = Config::discover(self.config.as_deref(), &cwd)?;
        let output = OutputOptions {
            json: self.json,
            quiet: self.quiet,
        };
        let events = EventDestination::parse(self.events.as_deref())
            .map(|dest| dest.open())
            .transpose()?;

        let command = self.command.unwrap_or(Commands::Tui { route: None });
        match command {
            Commands::Tui { route } => {
                let route = route
                    .as_deref()
                    .map(Route::parse)
                    .unwrap_or_else(|| config.default_route());
                crate::ui::run(&config, route, events)
            }
            Commands::Replay {
                input,
                route,
                seed,
                start_ms,
                step_ms,
                refresh,
            } => {
                let refresh = match refresh {
                    Some(raw) => raw.parse::<RankRefresh>()?,
                    None => config.ranks.refresh,
                };
                replay::run(replay::ReplayOptions {
                    input,
                    route: route
                        .as_deref()
                        .map(Route::parse)
                        .unwrap_or_else(|| config.default_route()),
                    seed,
                    start_ms,
                    step_ms,
                    refresh,
                    events,
                    output,
                })
            }
            Commands::Config => show_config::run(&config, &source, output),
        }
    }
}
