//! Error types for the skidpad crate.

use std::fmt;

/// Result type for configuration validation.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// A configuration value that cannot drive a vehicle or rig.
///
/// Raised once at construction time; nothing in the per-tick path is fallible.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// A value that must be strictly positive was zero or negative.
    NotPositive {
        /// Name of the offending field.
        field: &'static str,
        /// The rejected value.
        value: f32,
    },
    /// A value was NaN or infinite.
    NotFinite {
        /// Name of the offending field.
        field: &'static str,
    },
    /// A value fell outside its allowed range.
    OutOfRange {
        /// Name of the offending field.
        field: &'static str,
        /// The rejected value.
        value: f32,
        /// Inclusive lower bound.
        min: f32,
        /// Inclusive upper bound.
        max: f32,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::NotPositive { field, value } => {
                write!(f, "{field} must be greater than zero, got {value}")
            }
            ConfigError::NotFinite { field } => write!(f, "{field} must be finite"),
            ConfigError::OutOfRange {
                field,
                value,
                min,
                max,
            } => write!(f, "{field} must be within [{min}, {max}], got {value}"),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Check that `value` is finite and strictly positive.
pub(crate) fn ensure_positive(field: &'static str, value: f32) -> Result<()> {
    ensure_finite(field, value)?;
    if value <= 0.0 {
        return Err(ConfigError::NotPositive { field, value });
    }
    Ok(())
}

/// Check that `value` is finite.
pub(crate) fn ensure_finite(field: &'static str, value: f32) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::NotFinite { field })
    }
}

/// Check that `value` is finite and within `[min, max]`.
pub(crate) fn ensure_in_range(field: &'static str, value: f32, min: f32, max: f32) -> Result<()> {
    ensure_finite(field, value)?;
    if value < min || value > max {
        return Err(ConfigError::OutOfRange {
            field,
            value,
            min,
            max,
        });
    }
    Ok(())
}
