//! Logging setup
//!
//! Log lines go to stderr, or to `config.log_file` when one is set.
//! `STOCKROOM_LOG` takes a full filter directive and overrides `-v`.

use std::fs::OpenOptions;
use std::sync::Mutex;

use anyhow::{Context, Result};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use stockroom_core::Config;

/// Environment variable holding a filter directive
const LOG_ENV: &str = "STOCKROOM_LOG";

/// Level for our own crates at a given `-v` count
fn level_for(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

fn build_filter(verbosity: u8) -> EnvFilter {
    match std::env::var(LOG_ENV) {
        Ok(directive) if !directive.trim().is_empty() => EnvFilter::new(directive),
        _ => {
            let level = level_for(verbosity);
            EnvFilter::new(format!("stockroom_core={},stockroom_cli={}", level, level))
        }
    }
}

/// Install the global subscriber
pub fn init(verbosity: u8, config: &Config) -> Result<()> {
    let filter = build_filter(verbosity);
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);

    // A subscriber installed earlier stays in place
    match &config.log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file: {:?}", path))?;
            if let Err(e) = builder
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
            {
                debug!(error = %e, "subscriber already installed");
            }
        }
        None => {
            if let Err(e) = builder.with_writer(std::io::stderr).try_init() {
                debug!(error = %e, "subscriber already installed");
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_for_verbosity() {
        assert_eq!(level_for(0), "warn");
        assert_eq!(level_for(1), "info");
        assert_eq!(level_for(2), "debug");
        assert_eq!(level_for(9), "trace");
    }

    #[test]
    fn test_second_init_keeps_first_subscriber() {
        let config = Config {
            log_file: None,
            ..Config::default()
        };
        assert!(init(0, &config).is_ok());
        assert!(init(2, &config).is_ok());
    }
}
