//! Configuration types and CLI options.
//!
//! This module defines the enums and the `Config` struct used for command-line
//! argument parsing, plus the conversions into the settings consumed by the prober.

use std::collections::BTreeMap;
use std::net::IpAddr;
use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use thiserror::Error;

use crate::config::constants::*;
use crate::dns::RetryPolicy;
use crate::probe::{ProbeSettings, Targets};

/// Logging level for the application.
///
/// Controls the verbosity of log output, from most restrictive (Error) to most
/// verbose (Trace).
#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    /// Only error messages
    Error,
    /// Error and warning messages
    Warn,
    /// Error, warning, and informational messages
    Info,
    /// All messages except trace
    Debug,
    /// All messages including trace
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Log output format.
///
/// - `Plain`: Human-readable format with colors (default)
/// - `Json`: Structured JSON format for machine parsing
#[derive(Clone, Debug, ValueEnum)]
pub enum LogFormat {
    /// Human-readable format with colors (default)
    Plain,
    /// Structured JSON format for machine parsing
    Json,
}

/// Configuration errors detected before any domain is probed.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// A timeout was zero.
    #[error("{0} must be greater than zero")]
    ZeroTimeout(&'static str),

    /// Concurrency outside `1..=MAX_CONCURRENCY_LIMIT`.
    #[error("max concurrency must be between 1 and 500, got {0}")]
    InvalidConcurrency(usize),

    /// Attempts outside `1..=MAX_ATTEMPTS_LIMIT`.
    #[error("max attempts must be between 1 and 10, got {0}")]
    InvalidAttempts(u32),

    /// A `--label` value without `host=label` shape.
    #[error("invalid label '{0}': expected HOST=LABEL")]
    InvalidLabel(String),
}

/// Command-line options and library configuration.
///
/// All options have defaults and can be overridden via flags (target lists and
/// name servers also via environment variables, which `main` may load from `.env`).
///
/// # Examples
///
/// ```bash
/// # Audit against a provider's name servers and web front-end
/// domain_audit domains.csv --target-ns ns1.host.example,ns2.host.example --target-a 203.0.113.10
///
/// # Resume an interrupted run, querying a specific upstream
/// domain_audit domains.csv --resume --nameserver 1.1.1.1
/// ```
#[derive(Debug, Clone, Parser)]
#[command(
    name = "domain_audit",
    about = "Checks NS/A/MX delegation and SPF/DMARC/DKIM posture for a list of domains."
)]
pub struct Config {
    /// Domain list (delimited file, first column; `-` for stdin)
    #[arg(value_parser)]
    pub file: PathBuf,

    /// CSV file results are appended to
    #[arg(long, value_parser, default_value = DEFAULT_OUTPUT_PATH)]
    pub output: PathBuf,

    /// Do not write a header row into a new/empty output file
    #[arg(long)]
    pub no_header: bool,

    /// Log level: error|warn|info|debug|trace
    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,

    /// Log format: plain|json
    #[arg(long, value_enum, default_value_t = LogFormat::Plain)]
    pub log_format: LogFormat,

    /// Name servers to query (defaults to the resolver's built-in upstreams)
    #[arg(long, env = "DOMAIN_AUDIT_NAMESERVERS", value_delimiter = ',')]
    pub nameserver: Vec<IpAddr>,

    /// Expected NS host names
    #[arg(long, env = "DOMAIN_AUDIT_TARGET_NS", value_delimiter = ',')]
    pub target_ns: Vec<String>,

    /// Expected A record addresses
    #[arg(long, env = "DOMAIN_AUDIT_TARGET_A", value_delimiter = ',')]
    pub target_a: Vec<String>,

    /// Expected MX host names (substring match; MX matching is skipped when empty)
    #[arg(long, env = "DOMAIN_AUDIT_TARGET_MX", value_delimiter = ',')]
    pub target_mx: Vec<String>,

    /// Display labels for NS hosts in the summary, as HOST=LABEL
    #[arg(long = "label")]
    pub labels: Vec<String>,

    /// DKIM selectors to probe (replaces the built-in list)
    #[arg(long = "dkim-selector", value_delimiter = ',')]
    pub dkim_selectors: Vec<String>,

    /// Per-query timeout in milliseconds
    #[arg(long, default_value_t = DEFAULT_QUERY_TIMEOUT_MS)]
    pub query_timeout_ms: u64,

    /// Per-domain deadline in seconds
    #[arg(long, default_value_t = DEFAULT_DOMAIN_TIMEOUT_SECS)]
    pub domain_timeout_secs: u64,

    /// Maximum attempts per query (initial attempt included)
    #[arg(long, default_value_t = DEFAULT_MAX_ATTEMPTS)]
    pub max_attempts: u32,

    /// Delay before the first retry in milliseconds (doubles per attempt, 0 disables backoff)
    #[arg(long, default_value_t = DEFAULT_RETRY_BASE_DELAY_MS)]
    pub retry_base_delay_ms: u64,

    /// Maximum concurrent domain probes
    #[arg(long, default_value_t = DEFAULT_MAX_CONCURRENCY)]
    pub max_concurrency: usize,

    /// Skip domains recorded in the checkpoint file and record finished ones
    #[arg(long)]
    pub resume: bool,

    /// Checkpoint file used by `--resume`
    #[arg(long, value_parser, default_value = DEFAULT_CHECKPOINT_PATH)]
    pub checkpoint: PathBuf,

    /// Delete the checkpoint file before starting
    #[arg(long)]
    pub reset_checkpoint: bool,

    /// Retry broken domains once at the end without asking
    #[arg(long)]
    pub retry_broken: bool,

    /// Disable the progress bar
    #[arg(long)]
    pub no_progress: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            file: PathBuf::from("domains.csv"),
            output: PathBuf::from(DEFAULT_OUTPUT_PATH),
            no_header: false,
            log_level: LogLevel::Info,
            log_format: LogFormat::Plain,
            nameserver: Vec::new(),
            target_ns: Vec::new(),
            target_a: Vec::new(),
            target_mx: Vec::new(),
            labels: Vec::new(),
            dkim_selectors: Vec::new(),
            query_timeout_ms: DEFAULT_QUERY_TIMEOUT_MS,
            domain_timeout_secs: DEFAULT_DOMAIN_TIMEOUT_SECS,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            retry_base_delay_ms: DEFAULT_RETRY_BASE_DELAY_MS,
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            resume: false,
            checkpoint: PathBuf::from(DEFAULT_CHECKPOINT_PATH),
            reset_checkpoint: false,
            retry_broken: false,
            no_progress: false,
        }
    }
}

impl Config {
    /// Checks the values that would make a run meaningless.
    ///
    /// # Errors
    ///
    /// Returns the first `ConfigError` found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.query_timeout_ms == 0 {
            return Err(ConfigError::ZeroTimeout("query timeout"));
        }
        if self.domain_timeout_secs == 0 {
            return Err(ConfigError::ZeroTimeout("domain timeout"));
        }
        if self.max_concurrency == 0 || self.max_concurrency > MAX_CONCURRENCY_LIMIT {
            return Err(ConfigError::InvalidConcurrency(self.max_concurrency));
        }
        if self.max_attempts == 0 || self.max_attempts > MAX_ATTEMPTS_LIMIT {
            return Err(ConfigError::InvalidAttempts(self.max_attempts));
        }
        self.display_labels()?;

        if self.target_ns.is_empty() && self.target_a.is_empty() {
            log::warn!("No --target-ns or --target-a given: every domain will report no match");
        }
        if self.domain_timeout() < self.query_timeout() {
            log::warn!(
                "Domain timeout ({}s) is shorter than one query timeout ({}ms); most domains will be marked broken",
                self.domain_timeout_secs,
                self.query_timeout_ms
            );
        }
        Ok(())
    }

    /// Per-query timeout.
    pub fn query_timeout(&self) -> Duration {
        Duration::from_millis(self.query_timeout_ms)
    }

    /// Per-domain deadline.
    pub fn domain_timeout(&self) -> Duration {
        Duration::from_secs(self.domain_timeout_secs)
    }

    /// Retry policy applied to every query.
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            timeout: self.query_timeout(),
            max_attempts: self.max_attempts,
            base_delay: Duration::from_millis(self.retry_base_delay_ms),
        }
    }

    /// Builds the prober settings from the CLI values.
    pub fn probe_settings(&self) -> ProbeSettings {
        let dkim_selectors = if self.dkim_selectors.is_empty() {
            DEFAULT_DKIM_SELECTORS
                .iter()
                .map(|s| s.to_string())
                .collect()
        } else {
            self.dkim_selectors.clone()
        };
        ProbeSettings {
            targets: Targets {
                ns: self.target_ns.clone(),
                a: self.target_a.clone(),
                mx: if self.target_mx.is_empty() {
                    None
                } else {
                    Some(self.target_mx.clone())
                },
            },
            retry: self.retry_policy(),
            domain_timeout: self.domain_timeout(),
            dkim_selectors,
        }
    }

    /// Parses `--label HOST=LABEL` values into a host → label map.
    ///
    /// Host names are normalized the same way NS records are, so lookups
    /// against probe results need no further massaging.
    pub fn display_labels(&self) -> Result<BTreeMap<String, String>, ConfigError> {
        let mut labels = BTreeMap::new();
        for raw in &self.labels {
            let (host, label) = raw
                .split_once('=')
                .ok_or_else(|| ConfigError::InvalidLabel(raw.clone()))?;
            let host = crate::record::normalize_host(host);
            let label = label.trim();
            if host.is_empty() || label.is_empty() {
                return Err(ConfigError::InvalidLabel(raw.clone()));
            }
            labels.insert(host, label.to_string());
        }
        Ok(labels)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_conversion() {
        assert_eq!(
            log::LevelFilter::from(LogLevel::Error),
            log::LevelFilter::Error
        );
        assert_eq!(
            log::LevelFilter::from(LogLevel::Warn),
            log::LevelFilter::Warn
        );
        assert_eq!(
            log::LevelFilter::from(LogLevel::Info),
            log::LevelFilter::Info
        );
        assert_eq!(
            log::LevelFilter::from(LogLevel::Debug),
            log::LevelFilter::Debug
        );
        assert_eq!(
            log::LevelFilter::from(LogLevel::Trace),
            log::LevelFilter::Trace
        );
    }

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.max_concurrency, 20);
        assert_eq!(config.query_timeout_ms, 3000);
        assert_eq!(config.domain_timeout_secs, 30);
        assert_eq!(config.max_attempts, 3);
        assert_eq!(config.retry_base_delay_ms, 500);
        assert!(!config.resume);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_concurrency() {
        let config = Config {
            max_concurrency: 0,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::InvalidConcurrency(0)));
    }

    #[test]
    fn test_validate_rejects_excessive_concurrency() {
        let config = Config {
            max_concurrency: MAX_CONCURRENCY_LIMIT + 1,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidConcurrency(_))
        ));
    }

    #[test]
    fn test_validate_rejects_zero_timeouts() {
        let config = Config {
            query_timeout_ms: 0,
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::ZeroTimeout("query timeout"))
        );

        let config = Config {
            domain_timeout_secs: 0,
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::ZeroTimeout("domain timeout"))
        );
    }

    #[test]
    fn test_validate_rejects_zero_attempts() {
        let config = Config {
            max_attempts: 0,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::InvalidAttempts(0)));
    }

    #[test]
    fn test_probe_settings_uses_default_selectors() {
        let settings = Config::default().probe_settings();
        assert_eq!(settings.dkim_selectors.len(), DEFAULT_DKIM_SELECTORS.len());
        assert_eq!(settings.dkim_selectors[0], "default");
        assert!(settings.targets.mx.is_none());
    }

    #[test]
    fn test_probe_settings_custom_values() {
        let config = Config {
            target_mx: vec!["mx.host.example".to_string()],
            dkim_selectors: vec!["s1".to_string()],
            retry_base_delay_ms: 0,
            ..Default::default()
        };
        let settings = config.probe_settings();
        assert_eq!(settings.dkim_selectors, vec!["s1".to_string()]);
        assert_eq!(
            settings.targets.mx,
            Some(vec!["mx.host.example".to_string()])
        );
        assert_eq!(settings.retry.base_delay, Duration::ZERO);
    }

    #[test]
    fn test_display_labels_parsing() {
        let config = Config {
            labels: vec!["NS1.Host.Example.=Host Co".to_string()],
            ..Default::default()
        };
        let labels = config.display_labels().unwrap();
        assert_eq!(
            labels.get("ns1.host.example").map(String::as_str),
            Some("Host Co")
        );
    }

    #[test]
    fn test_display_labels_rejects_missing_separator() {
        let config = Config {
            labels: vec!["ns1.host.example".to_string()],
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidLabel(_))
        ));
    }

    #[test]
    fn test_cli_parsing_lists() {
        let config = Config::try_parse_from([
            "domain_audit",
            "domains.csv",
            "--target-ns",
            "ns1.a.example,ns2.a.example",
            "--nameserver",
            "1.1.1.1",
            "--resume",
        ])
        .unwrap();
        assert_eq!(config.target_ns.len(), 2);
        assert_eq!(config.nameserver, vec!["1.1.1.1".parse::<IpAddr>().unwrap()]);
        assert!(config.resume);
    }
}
