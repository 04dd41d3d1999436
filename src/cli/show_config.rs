//! `todos config`: print the effective configuration.

use serde::Serialize;

use crate::config::{Config, ConfigSource};
use crate::error::Result;
use crate::output::{emit_success, OutputOptions};

#[derive(Serialize)]
struct ConfigReport<'a> {
    source: &'a ConfigSource,
    config: &'a Config,
}

pub fn run(config: &Config, source: &ConfigSource, options: OutputOptions) -> Result<()> {
    if options.json {
        let report = ConfigReport { source, config };
        return emit_success(options, "config", &report, None);
    }
    if options.quiet {
        return Ok(());
    }

    println!("# source: {}", describe(source));
    print!("{}", toml::to_string_pretty(config)?);
    Ok(())
}

fn describe(source: &ConfigSource) -> String {
    match source {
        ConfigSource::Explicit(path) => format!("{} (explicit)", path.display()),
        ConfigSource::Local(path) => format!("{} (local)", path.display()),
        ConfigSource::User(path) => format!("{} (user)", path.display()),
        ConfigSource::Defaults => "built-in defaults".to_string(),
    }
}
