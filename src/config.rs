//! Processor configuration.
//!
//! Values come from, in increasing precedence:
//! - built-in defaults
//! - the environment (a `.env` file is loaded first if present)
//! - explicit overrides by the caller (CLI flags)

use crate::error::{RegressionError, Result};
use crate::fit::evaluator::{DEFAULT_MIN_SCORE, DEFAULT_TEST_FRACTION, EvaluationOptions};
use crate::fit::limiter::DEFAULT_MAX_TRAINING_SAMPLES;

pub const ENV_MAX_TRAINING_SAMPLES: &str = "OLSR_MAX_TRAINING_SAMPLES";
pub const ENV_TEST_FRACTION: &str = "OLSR_TEST_FRACTION";
pub const ENV_MIN_SCORE: &str = "OLSR_MIN_SCORE";
pub const ENV_SEED: &str = "OLSR_SEED";

#[derive(Debug, Clone, PartialEq)]
pub struct ProcessorConfig {
    /// Training rows kept (most recent first); `0` disables the cap.
    pub max_training_samples: usize,
    pub test_fraction: f64,
    pub min_score: f64,
    /// Seed for evaluation splits. `None` draws from OS entropy.
    pub seed: Option<u64>,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            max_training_samples: DEFAULT_MAX_TRAINING_SAMPLES,
            test_fraction: DEFAULT_TEST_FRACTION,
            min_score: DEFAULT_MIN_SCORE,
            seed: None,
        }
    }
}

impl ProcessorConfig {
    /// Defaults overridden by `OLSR_*` environment variables.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`ProcessorConfig::from_env`], reading variables through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(raw) = lookup(ENV_MAX_TRAINING_SAMPLES) {
            config.max_training_samples = parse_var(ENV_MAX_TRAINING_SAMPLES, &raw)?;
        }
        if let Some(raw) = lookup(ENV_TEST_FRACTION) {
            config.test_fraction = parse_var(ENV_TEST_FRACTION, &raw)?;
        }
        if let Some(raw) = lookup(ENV_MIN_SCORE) {
            config.min_score = parse_var(ENV_MIN_SCORE, &raw)?;
        }
        if let Some(raw) = lookup(ENV_SEED) {
            config.seed = Some(parse_var(ENV_SEED, &raw)?);
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.test_fraction.is_finite() && self.test_fraction > 0.0 && self.test_fraction < 1.0) {
            return Err(RegressionError::InvalidConfig(format!(
                "test fraction must be in (0, 1), got {}",
                self.test_fraction
            )));
        }
        if !self.min_score.is_finite() {
            return Err(RegressionError::InvalidConfig(
                "minimum score must be finite".to_string(),
            ));
        }
        Ok(())
    }

    pub fn evaluation_options(&self) -> EvaluationOptions {
        EvaluationOptions {
            test_fraction: self.test_fraction,
            min_score: self.min_score,
        }
    }

    pub fn summary(&self) -> String {
        let cap = match self.max_training_samples {
            0 => "unlimited".to_string(),
            n => n.to_string(),
        };
        let seed = self
            .seed
            .map(|s| s.to_string())
            .unwrap_or_else(|| "entropy".to_string());
        format!(
            "max training samples: {cap}, test fraction: {:.2}, min score: {:.2}, seed: {seed}",
            self.test_fraction, self.min_score
        )
    }
}

fn parse_var<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T> {
    raw.trim()
        .parse::<T>()
        .map_err(|_| RegressionError::InvalidConfig(format!("{key}: cannot parse '{raw}'")))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_without_environment() {
        let config = ProcessorConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, ProcessorConfig::default());
        assert_eq!(config.max_training_samples, 20_000);
        assert_eq!(config.test_fraction, 0.2);
        assert_eq!(config.seed, None);
    }

    #[test]
    fn environment_overrides_defaults() {
        let config = ProcessorConfig::from_lookup(lookup(&[
            (ENV_MAX_TRAINING_SAMPLES, "0"),
            (ENV_TEST_FRACTION, "0.25"),
            (ENV_MIN_SCORE, " 0.5 "),
            (ENV_SEED, "1234"),
        ]))
        .unwrap();

        assert_eq!(config.max_training_samples, 0);
        assert_eq!(config.test_fraction, 0.25);
        assert_eq!(config.min_score, 0.5);
        assert_eq!(config.seed, Some(1234));
        assert!(config.summary().contains("unlimited"));
    }

    #[test]
    fn rejects_unparseable_and_out_of_range_values() {
        let err = ProcessorConfig::from_lookup(lookup(&[(ENV_MAX_TRAINING_SAMPLES, "-1")])).unwrap_err();
        assert!(matches!(err, RegressionError::InvalidConfig(_)));

        let err = ProcessorConfig::from_lookup(lookup(&[(ENV_TEST_FRACTION, "1.0")])).unwrap_err();
        assert!(matches!(err, RegressionError::InvalidConfig(_)));
    }
}
