use crate::TsError;

/// Floating point type used throughout system
pub type Real = f64;

pub fn ensure_finite(v: Real, what: &'static str) -> Result<Real, TsError> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(TsError::NonFinite { what, value: v })
    }
}

/// Require `v > 0` and finite.
pub fn ensure_positive(v: Real, what: &'static str) -> Result<Real, TsError> {
    let v = ensure_finite(v, what)?;
    if v > 0.0 {
        Ok(v)
    } else {
        Err(TsError::OutOfRange {
            what,
            constraint: "> 0",
            value: v,
        })
    }
}

/// Require `v >= 0` and finite. Rejects NaN.
pub fn ensure_non_negative(v: Real, what: &'static str) -> Result<Real, TsError> {
    let v = ensure_finite(v, what)?;
    if v >= 0.0 {
        Ok(v)
    } else {
        Err(TsError::OutOfRange {
            what,
            constraint: ">= 0",
            value: v,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ensure_finite_detects_nan() {
        let err = ensure_finite(Real::NAN, "test").unwrap_err();
        let msg = format!("{err}");
        assert!(msg.contains("Non-finite"));
    }

    #[test]
    fn ensure_non_negative_reports_value() {
        let err = ensure_non_negative(-2.0, "tau_I").unwrap_err();
        assert_eq!(err.to_string(), "tau_I must be >= 0, got -2");
        assert_eq!(ensure_non_negative(0.0, "tau_I"), Ok(0.0));
        assert!(ensure_non_negative(Real::NAN, "tau_I").is_err());
    }

    #[test]
    fn ensure_positive_rejects_zero() {
        assert!(ensure_positive(0.0, "area").is_err());
        assert!(ensure_positive(Real::INFINITY, "area").is_err());
        assert_eq!(ensure_positive(120.0, "area"), Ok(120.0));
    }
}
