//! Process-wide `tracing` setup shared by the CLI and tests.
//!
//! Events go to stderr either as readable text or as one JSON object per
//! line. `RUST_LOG`, when set, takes precedence over the configured level
//! string, which accepts full directives such as
//! `"warn,ballotguard_ledger=debug"`.

use serde::{Deserialize, Serialize};
use std::io;
use std::str::FromStr;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Selects the output format for structured logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Plain text lines.
    #[default]
    Human,
    /// One JSON object per event.
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "human" => Ok(Self::Human),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown log format: {other}")),
        }
    }
}

/// Install the global subscriber for `format`, filtered by `level`.
///
/// Returns `false` and leaves the current subscriber in place if one is
/// already installed.
pub fn init_logging(format: LogFormat, level: &str) -> bool {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let (text, json) = match format {
        LogFormat::Human => (
            Some(fmt::layer().with_writer(io::stderr).with_thread_ids(true)),
            None,
        ),
        LogFormat::Json => (
            None,
            Some(fmt::layer().json().with_writer(io::stderr).with_thread_ids(true)),
        ),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(text)
        .with(json)
        .try_init()
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_formats() {
        assert_eq!("human".parse::<LogFormat>(), Ok(LogFormat::Human));
        assert_eq!("JSON".parse::<LogFormat>(), Ok(LogFormat::Json));
        assert!("xml".parse::<LogFormat>().is_err());
    }

    #[test]
    fn second_init_is_rejected_not_panicking() {
        init_logging(LogFormat::Human, "warn");
        assert!(!init_logging(LogFormat::Json, "warn"));
    }
}
