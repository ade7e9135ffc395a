//! Numeric conversion helpers centralizing NaN guards and safe casts.

use num_traits::cast::cast;
use serde_json::Value;

/// Return the value unless it is NaN, in which case return 0.0.
#[must_use]
pub fn nan_to_zero(value: f64) -> f64 {
    if value.is_nan() { 0.0 } else { value }
}

/// Read a loosely-typed JSON value as a number, returning 0.0 for anything
/// that is not a usable number (missing, null, strings, booleans).
#[must_use]
pub fn json_number_or_zero(value: Option<&Value>) -> f64 {
    value
        .and_then(Value::as_f64)
        .map_or(0.0, nan_to_zero)
}

/// Loose truthiness used by the backend's boolean flags.
#[must_use]
pub fn json_truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(flag)) => *flag,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|v| v != 0.0 && !v.is_nan()),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(_) | Value::Object(_)) => true,
    }
}

/// Round a f64 and clamp it to the u32 range, returning 0 for non-finite values.
#[must_use]
pub fn round_f64_to_u32(value: f64) -> u32 {
    if !value.is_finite() {
        return 0;
    }
    let max = cast::<u32, f64>(u32::MAX).unwrap_or(f64::MAX);
    let clamped = value.round().clamp(0.0, max);
    cast::<f64, u32>(clamped).unwrap_or(0)
}

/// Convert u32 to f64 in a single location.
#[must_use]
pub fn u32_to_f64(value: u32) -> f64 {
    f64::from(value)
}

/// Convert usize to f64 while allowing precision loss in a single location.
#[must_use]
pub fn usize_to_f64(value: usize) -> f64 {
    cast::<usize, f64>(value).unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn nan_guard_keeps_real_numbers() {
        assert!((nan_to_zero(f64::NAN) - 0.0).abs() < f64::EPSILON);
        assert!((nan_to_zero(12.5) - 12.5).abs() < f64::EPSILON);
        assert!(nan_to_zero(f64::INFINITY).is_infinite());
    }

    #[test]
    fn json_numbers_default_to_zero() {
        assert!((json_number_or_zero(Some(&json!(4.5))) - 4.5).abs() < f64::EPSILON);
        assert!(json_number_or_zero(Some(&json!("4.5"))).abs() < f64::EPSILON);
        assert!(json_number_or_zero(Some(&Value::Null)).abs() < f64::EPSILON);
        assert!(json_number_or_zero(None).abs() < f64::EPSILON);
    }

    #[test]
    fn truthiness_matches_loose_booleans() {
        assert!(json_truthy(Some(&json!(true))));
        assert!(json_truthy(Some(&json!(1))));
        assert!(json_truthy(Some(&json!("yes"))));
        assert!(!json_truthy(Some(&json!(0))));
        assert!(!json_truthy(Some(&json!(""))));
        assert!(!json_truthy(None));
    }

    #[test]
    fn rounding_clamps_to_u32() {
        assert_eq!(round_f64_to_u32(2.6), 3);
        assert_eq!(round_f64_to_u32(-4.0), 0);
        assert_eq!(round_f64_to_u32(f64::NAN), 0);
    }
}
