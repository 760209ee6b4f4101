//! Validation errors raised while building a [`ParameterSet`](super::ParameterSet).

use serde::Serialize;
use thiserror::Error;

/// Reasons a parameter bundle is rejected.
///
/// Raised only at construction time. Downstream components assume a valid
/// `ParameterSet` and never produce this error themselves.
#[derive(Error, Debug, Clone, PartialEq, Serialize)]
pub enum ValidationError {
    /// Rate, yield or width constant that must be strictly positive
    #[error("{field} must be strictly positive, got {value}")]
    NonPositive { field: &'static str, value: f64 },

    /// Quantity that must not be negative (death rate, initial conditions)
    #[error("{field} must not be negative, got {value}")]
    Negative { field: &'static str, value: f64 },

    /// NaN or infinite input
    #[error("{field} must be finite, got {value}")]
    NonFinite { field: &'static str, value: f64 },

    /// Environmental reading outside its physically plausible range
    #[error("{field} = {value} lies outside the plausible range [{min}, {max}]")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    /// Integration horizon or step subdivision not usable
    #[error("invalid integrator setting {field}: {message}")]
    Integrator { field: &'static str, message: String },
}

impl ValidationError {
    /// Name of the offending field.
    pub fn field(&self) -> &'static str {
        match self {
            ValidationError::NonPositive { field, .. }
            | ValidationError::Negative { field, .. }
            | ValidationError::NonFinite { field, .. }
            | ValidationError::OutOfRange { field, .. }
            | ValidationError::Integrator { field, .. } => field,
        }
    }
}

/// Reject NaN/inf, then anything `<= 0`.
pub(crate) fn require_positive(field: &'static str, value: f64) -> Result<(), ValidationError> {
    require_finite(field, value)?;
    if value <= 0.0 {
        return Err(ValidationError::NonPositive { field, value });
    }
    Ok(())
}

/// Reject NaN/inf, then anything `< 0`.
pub(crate) fn require_non_negative(field: &'static str, value: f64) -> Result<(), ValidationError> {
    require_finite(field, value)?;
    if value < 0.0 {
        return Err(ValidationError::Negative { field, value });
    }
    Ok(())
}

pub(crate) fn require_finite(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::NonFinite { field, value });
    }
    Ok(())
}

pub(crate) fn require_within(
    field: &'static str,
    value: f64,
    min: f64,
    max: f64,
) -> Result<(), ValidationError> {
    require_finite(field, value)?;
    if value < min || value > max {
        return Err(ValidationError::OutOfRange {
            field,
            value,
            min,
            max,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positive_rejects_zero_and_nan() {
        assert!(require_positive("mu_max", 0.035).is_ok());
        assert_eq!(
            require_positive("mu_max", 0.0),
            Err(ValidationError::NonPositive { field: "mu_max", value: 0.0 })
        );
        assert!(matches!(
            require_positive("mu_max", f64::NAN),
            Err(ValidationError::NonFinite { field: "mu_max", .. })
        ));
    }

    #[test]
    fn test_non_negative_accepts_zero() {
        assert!(require_non_negative("kd_base", 0.0).is_ok());
        assert!(require_non_negative("kd_base", -1e-6).is_err());
    }

    #[test]
    fn test_range_message() {
        let err = require_within("ph", 15.0, 0.0, 14.0).unwrap_err();
        assert_eq!(err.field(), "ph");
        assert!(err.to_string().contains("[0, 14]"), "message was {}", err);
    }
}
