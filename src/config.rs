// src/config.rs
use std::{env, path::PathBuf, time::Duration};
use thiserror::Error;
use url::Url;

pub const DEFAULT_INPUT: &str = "Wowhead_Lookup.csv";
pub const DEFAULT_OUTPUT: &str = "updated_spreadsheet.csv";
pub const DEFAULT_BASE_URL: &str = "https://www.wowhead.com";
pub const DEFAULT_RETRY_BACKOFF_MS: u64 = 500;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{var}: expected a non-negative integer, got {value:?}")]
    NotANumber { var: &'static str, value: String },
    #[error("{var}: delimiter must be a single byte, got {value:?}")]
    Delimiter { var: &'static str, value: String },
    #[error("{var}: invalid base url {value:?}: {source}")]
    BaseUrl {
        var: &'static str,
        value: String,
        source: url::ParseError,
    },
}

/// Everything the pipeline needs, resolved once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub input: PathBuf,
    pub output: PathBuf,
    pub base_url: Url,
    pub delimiter: u8,
    /// `None` means requests may block indefinitely.
    pub timeout: Option<Duration>,
    pub max_retries: u32,
    pub retry_backoff: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input: PathBuf::from(DEFAULT_INPUT),
            output: PathBuf::from(DEFAULT_OUTPUT),
            base_url: Url::parse(DEFAULT_BASE_URL).expect("default base url is valid"),
            delimiter: b',',
            timeout: None,
            max_retries: 0,
            retry_backoff: Duration::from_millis(DEFAULT_RETRY_BACKOFF_MS),
        }
    }
}

impl Config {
    /// Read `SPELL_*` variables from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary key lookup; unset keys fall back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Config::default();

        if let Some(v) = lookup("SPELL_INPUT") {
            cfg.input = PathBuf::from(v);
        }
        if let Some(v) = lookup("SPELL_OUTPUT") {
            cfg.output = PathBuf::from(v);
        }
        if let Some(v) = lookup("SPELL_BASE_URL") {
            cfg.base_url = Url::parse(v.trim()).map_err(|source| ConfigError::BaseUrl {
                var: "SPELL_BASE_URL",
                value: v.clone(),
                source,
            })?;
        }
        if let Some(v) = lookup("SPELL_DELIMITER") {
            cfg.delimiter = parse_delimiter("SPELL_DELIMITER", &v)?;
        }
        if let Some(v) = lookup("SPELL_TIMEOUT_SECS") {
            let secs = parse_u64("SPELL_TIMEOUT_SECS", &v)?;
            cfg.timeout = Some(Duration::from_secs(secs));
        }
        if let Some(v) = lookup("SPELL_MAX_RETRIES") {
            let n = parse_u64("SPELL_MAX_RETRIES", &v)?;
            cfg.max_retries = u32::try_from(n).map_err(|_| ConfigError::NotANumber {
                var: "SPELL_MAX_RETRIES",
                value: v.clone(),
            })?;
        }
        if let Some(v) = lookup("SPELL_RETRY_BACKOFF_MS") {
            cfg.retry_backoff = Duration::from_millis(parse_u64("SPELL_RETRY_BACKOFF_MS", &v)?);
        }

        Ok(cfg)
    }
}

fn parse_u64(var: &'static str, value: &str) -> Result<u64, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::NotANumber {
        var,
        value: value.to_string(),
    })
}

fn parse_delimiter(var: &'static str, value: &str) -> Result<u8, ConfigError> {
    // "\t" is accepted literally so tab-separated input can be set from a shell
    let value_ref = if value == "\\t" { "\t" } else { value };
    match value_ref.as_bytes() {
        [b] => Ok(*b),
        _ => Err(ConfigError::Delimiter {
            var,
            value: value.to_string(),
        }),
    }
}
