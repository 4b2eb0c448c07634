//! Input bounds and normalization constants
//!
//! NNet files carry per-input bounds plus means and ranges for every input and
//! one trailing entry applied to all outputs. Values the caller does not supply
//! default to unbounded inputs and identity normalization.
//!
//! # TOML Format
//! ```toml
//! input_mins = [0.0, -3.141593]
//! input_maxes = [60760.0, 3.141593]
//! means = [19791.091, 0.0, 7.5188840201005975]
//! ranges = [60261.0, 6.28318530718, 373.94992]
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ConvertError, ConvertResult};

/// Default lower bound: the most negative `f32`
pub const DEFAULT_INPUT_MIN: f64 = f32::MIN as f64;
/// Default upper bound: the most positive `f32`
pub const DEFAULT_INPUT_MAX: f64 = f32::MAX as f64;
/// Default mean
pub const DEFAULT_MEAN: f64 = 0.0;
/// Default range
pub const DEFAULT_RANGE: f64 = 1.0;

/// Fully populated bounds and normalization for a network
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Normalization {
    /// Lower bound per input
    pub input_mins: Vec<f64>,
    /// Upper bound per input
    pub input_maxes: Vec<f64>,
    /// Mean per input, then one for the outputs
    pub means: Vec<f64>,
    /// Range per input, then one for the outputs
    pub ranges: Vec<f64>,
}

impl Normalization {
    /// All defaults for `input_size` inputs
    pub fn defaults(input_size: usize) -> Self {
        Self::resolve(input_size, &NormalizationOverrides::default())
    }

    /// Fill every array the caller left out with its default
    pub fn resolve(input_size: usize, overrides: &NormalizationOverrides) -> Self {
        let or_fill = |given: &Option<Vec<f64>>, len: usize, value: f64| {
            given.clone().unwrap_or_else(|| vec![value; len])
        };

        Self {
            input_mins: or_fill(&overrides.input_mins, input_size, DEFAULT_INPUT_MIN),
            input_maxes: or_fill(&overrides.input_maxes, input_size, DEFAULT_INPUT_MAX),
            means: or_fill(&overrides.means, input_size + 1, DEFAULT_MEAN),
            ranges: or_fill(&overrides.ranges, input_size + 1, DEFAULT_RANGE),
        }
    }

    /// Check array lengths against the number of inputs
    pub fn validate(&self, input_size: usize) -> ConvertResult<()> {
        let checks = [
            ("input_mins", self.input_mins.len(), input_size),
            ("input_maxes", self.input_maxes.len(), input_size),
            ("means", self.means.len(), input_size.saturating_add(1)),
            ("ranges", self.ranges.len(), input_size.saturating_add(1)),
        ];

        for (name, actual, expected) in checks {
            if actual != expected {
                return Err(ConvertError::Config(format!(
                    "{} has {} entries, expected {} for {} inputs",
                    name, actual, expected, input_size
                )));
            }
        }

        if let Some((i, (lo, hi))) = self
            .input_mins
            .iter()
            .zip(&self.input_maxes)
            .enumerate()
            .find(|(_, (lo, hi))| lo > hi)
        {
            return Err(ConvertError::Config(format!(
                "input {} has min {} greater than max {}",
                i, lo, hi
            )));
        }

        Ok(())
    }
}

/// Caller-supplied bounds and normalization; `None` means "use the default"
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NormalizationOverrides {
    /// Lower bound per input
    pub input_mins: Option<Vec<f64>>,
    /// Upper bound per input
    pub input_maxes: Option<Vec<f64>>,
    /// Mean per input plus outputs
    pub means: Option<Vec<f64>>,
    /// Range per input plus outputs
    pub ranges: Option<Vec<f64>>,
}

impl NormalizationOverrides {
    /// True when nothing was supplied
    pub fn is_empty(&self) -> bool {
        self.input_mins.is_none()
            && self.input_maxes.is_none()
            && self.means.is_none()
            && self.ranges.is_none()
    }

    /// Load overrides from a TOML file
    pub fn from_file(path: &Path) -> ConvertResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ConvertError::Config(format!("cannot read config '{}': {e}", path.display()))
        })?;
        Self::from_toml(&content)
    }

    /// Parse overrides from a TOML string
    pub fn from_toml(toml_str: &str) -> ConvertResult<Self> {
        toml::from_str(toml_str).map_err(|e| ConvertError::Config(format!("TOML parse error: {e}")))
    }

    /// Serialize overrides to TOML
    pub fn to_toml(&self) -> ConvertResult<String> {
        toml::to_string_pretty(self)
            .map_err(|e| ConvertError::Config(format!("TOML serialize error: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let norm = Normalization::defaults(4);

        assert_eq!(norm.input_mins, vec![f32::MIN as f64; 4]);
        assert_eq!(norm.input_maxes, vec![f32::MAX as f64; 4]);
        assert_eq!(norm.means, vec![0.0; 5]);
        assert_eq!(norm.ranges, vec![1.0; 5]);
        assert!(norm.validate(4).is_ok());
    }

    #[test]
    fn test_defaults_zero_inputs() {
        let norm = Normalization::defaults(0);

        assert!(norm.input_mins.is_empty());
        assert_eq!(norm.means, vec![0.0]);
        assert_eq!(norm.ranges, vec![1.0]);
    }

    #[test]
    fn test_partial_overrides() {
        let overrides = NormalizationOverrides {
            input_mins: Some(vec![-1.0, -2.0]),
            ranges: Some(vec![2.0, 4.0, 10.0]),
            ..Default::default()
        };
        let norm = Normalization::resolve(2, &overrides);

        assert_eq!(norm.input_mins, vec![-1.0, -2.0]);
        assert_eq!(norm.input_maxes, vec![DEFAULT_INPUT_MAX; 2]);
        assert_eq!(norm.means, vec![0.0; 3]);
        assert_eq!(norm.ranges, vec![2.0, 4.0, 10.0]);
    }

    #[test]
    fn test_validate_lengths() {
        let overrides = NormalizationOverrides {
            means: Some(vec![0.0, 0.0]),
            ..Default::default()
        };
        let norm = Normalization::resolve(2, &overrides);

        let err = norm.validate(2).unwrap_err();
        assert!(err.to_string().contains("means has 2 entries, expected 3"));
    }

    #[test]
    fn test_validate_bounds_order() {
        let overrides = NormalizationOverrides {
            input_mins: Some(vec![1.0]),
            input_maxes: Some(vec![0.0]),
            ..Default::default()
        };
        assert!(Normalization::resolve(1, &overrides).validate(1).is_err());
    }

    #[test]
    fn test_overrides_from_toml() {
        let overrides = NormalizationOverrides::from_toml(
            r#"
            input_mins = [0.0, -3.5]
            means = [1.0, 2.0, 3.0]
            "#,
        )
        .unwrap();

        assert_eq!(overrides.input_mins, Some(vec![0.0, -3.5]));
        assert_eq!(overrides.means, Some(vec![1.0, 2.0, 3.0]));
        assert!(overrides.input_maxes.is_none());
        assert!(!overrides.is_empty());
    }

    #[test]
    fn test_overrides_reject_unknown_keys() {
        let err = NormalizationOverrides::from_toml("input_min = [0.0]").unwrap_err();
        assert!(matches!(err, ConvertError::Config(_)));
    }

    #[test]
    fn test_overrides_toml_roundtrip() {
        let overrides = NormalizationOverrides {
            ranges: Some(vec![1.5, 2.5]),
            ..Default::default()
        };
        let text = overrides.to_toml().unwrap();
        assert_eq!(NormalizationOverrides::from_toml(&text).unwrap(), overrides);
    }
}
