use crate::domain::Decimal;
use chrono::Duration;
use std::collections::HashMap;
use thiserror::Error;

/// Default timestamp format of the raw ledger export.
pub const DEFAULT_DATE_FORMAT: &str = "%m/%d/%y %H:%M";

#[derive(Debug, Clone)]
pub struct Config {
    pub input_path: String,
    pub output_dir: String,
    pub date_format: String,
    pub analysis: AnalysisConfig,
}

/// Options of the analysis core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalysisConfig {
    toxicity_threshold: Duration,
    term_bucket_cutoff: Duration,
    zero_tolerance: Decimal,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnv(String),
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
    #[error("{name} must be a positive duration, got {value_ms}ms")]
    NonPositiveDuration { name: String, value_ms: i64 },
}

impl AnalysisConfig {
    /// Build a validated configuration.
    ///
    /// # Errors
    /// Returns `NonPositiveDuration` for a zero/negative threshold or cutoff, and
    /// `InvalidValue` for a negative zero tolerance.
    pub fn new(
        toxicity_threshold: Duration,
        term_bucket_cutoff: Duration,
        zero_tolerance: Decimal,
    ) -> Result<Self, ConfigError> {
        ensure_positive("toxicity_threshold", toxicity_threshold)?;
        ensure_positive("term_bucket_cutoff", term_bucket_cutoff)?;
        if zero_tolerance.is_negative() {
            return Err(ConfigError::InvalidValue(
                "zero_tolerance".to_string(),
                format!("must not be negative, got {}", zero_tolerance),
            ));
        }
        Ok(Self {
            toxicity_threshold,
            term_bucket_cutoff,
            zero_tolerance,
        })
    }

    pub fn toxicity_threshold(&self) -> Duration {
        self.toxicity_threshold
    }

    pub fn term_bucket_cutoff(&self) -> Duration {
        self.term_bucket_cutoff
    }

    pub fn zero_tolerance(&self) -> Decimal {
        self.zero_tolerance
    }

    pub fn with_toxicity_threshold(self, threshold: Duration) -> Result<Self, ConfigError> {
        Self::new(threshold, self.term_bucket_cutoff, self.zero_tolerance)
    }

    pub fn with_term_bucket_cutoff(self, cutoff: Duration) -> Result<Self, ConfigError> {
        Self::new(self.toxicity_threshold, cutoff, self.zero_tolerance)
    }

    pub fn with_zero_tolerance(self, tolerance: Decimal) -> Result<Self, ConfigError> {
        Self::new(self.toxicity_threshold, self.term_bucket_cutoff, tolerance)
    }
}

impl Default for AnalysisConfig {
    /// One minute quick-turn window, one day term cutoff, 1e-9 residual tolerance.
    fn default() -> Self {
        Self {
            toxicity_threshold: Duration::minutes(1),
            term_bucket_cutoff: Duration::days(1),
            zero_tolerance: Decimal::from_parts(1, 9),
        }
    }
}

fn ensure_positive(name: &str, value: Duration) -> Result<(), ConfigError> {
    if value <= Duration::zero() {
        return Err(ConfigError::NonPositiveDuration {
            name: name.to_string(),
            value_ms: value.num_milliseconds(),
        });
    }
    Ok(())
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_map(std::env::vars().collect())
    }

    pub fn from_env_map(env_map: HashMap<String, String>) -> Result<Self, ConfigError> {
        let input_path = env_map
            .get("INPUT_PATH")
            .cloned()
            .ok_or_else(|| ConfigError::MissingEnv("INPUT_PATH".to_string()))?;

        let output_dir = env_map
            .get("OUTPUT_DIR")
            .cloned()
            .unwrap_or_else(|| ".".to_string());

        let date_format = env_map
            .get("DATE_FORMAT")
            .cloned()
            .unwrap_or_else(|| DEFAULT_DATE_FORMAT.to_string());

        let toxicity_threshold_ms = parse_ms(&env_map, "TOXICITY_THRESHOLD_MS", "60000")?;
        let term_bucket_cutoff_ms = parse_ms(&env_map, "TERM_BUCKET_CUTOFF_MS", "86400000")?;

        let zero_tolerance_raw = env_map
            .get("ZERO_TOLERANCE")
            .map(|s| s.as_str())
            .unwrap_or("0.000000001");
        let zero_tolerance = Decimal::from_str_lenient(zero_tolerance_raw).map_err(|_| {
            ConfigError::InvalidValue(
                "ZERO_TOLERANCE".to_string(),
                format!("must be a decimal number, got {}", zero_tolerance_raw),
            )
        })?;

        let analysis = AnalysisConfig::new(
            Duration::milliseconds(toxicity_threshold_ms),
            Duration::milliseconds(term_bucket_cutoff_ms),
            zero_tolerance,
        )?;

        Ok(Config {
            input_path,
            output_dir,
            date_format,
            analysis,
        })
    }
}

fn parse_ms(
    env_map: &HashMap<String, String>,
    key: &str,
    default: &str,
) -> Result<i64, ConfigError> {
    env_map
        .get(key)
        .map(|s| s.as_str())
        .unwrap_or(default)
        .parse::<i64>()
        .map_err(|_| ConfigError::InvalidValue(key.to_string(), "must be a valid i64".to_string()))
}
