//! bounded.rs
//! Scalar-or-interval values with closed arithmetic.
//!
//! Interval arithmetic here is deliberately *not* worst-case: two intervals are
//! combined bound by bound (min with min, max with max), which assumes both
//! quantities move together through the formula. Uncertainty across the whole
//! model is instead bracketed by evaluating the graph once per bound
//! (see `impacts::engine`).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Div, Mul, Sub};
use thiserror::Error;

#[derive(Error, Debug, Clone, Copy, PartialEq)]
#[error("invalid range: min {min} is greater than max {max}")]
pub struct InvalidRangeError {
    pub min: f64,
    pub max: f64,
}

/// A closed `[min, max]` band. Only constructible with `min <= max`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Range {
    min: f64,
    max: f64,
}

impl Range {
    pub fn new(min: f64, max: f64) -> Result<Self, InvalidRangeError> {
        // Also rejects NaN bounds.
        if !(min <= max) {
            return Err(InvalidRangeError { min, max });
        }
        Ok(Self { min, max })
    }

    /// Builds a range from two bounds in either order.
    #[inline(always)]
    fn ordered(a: f64, b: f64) -> Self {
        Self { min: a.min(b), max: a.max(b) }
    }

    #[inline(always)]
    pub fn min(&self) -> f64 { self.min }

    #[inline(always)]
    pub fn max(&self) -> f64 { self.max }
}

/// A quantity expressed either as a single number or as a 95%-confidence band.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "BoundedRepr", into = "BoundedRepr")]
pub enum BoundedValue {
    Scalar(f64),
    Interval(Range),
}

impl BoundedValue {
    pub fn scalar(value: f64) -> Self {
        BoundedValue::Scalar(value)
    }

    pub fn interval(min: f64, max: f64) -> Result<Self, InvalidRangeError> {
        Range::new(min, max).map(BoundedValue::Interval)
    }

    /// Lower bound; the value itself for a scalar.
    #[inline(always)]
    pub fn min(&self) -> f64 {
        match self {
            BoundedValue::Scalar(v) => *v,
            BoundedValue::Interval(r) => r.min,
        }
    }

    /// Upper bound; the value itself for a scalar.
    #[inline(always)]
    pub fn max(&self) -> f64 {
        match self {
            BoundedValue::Scalar(v) => *v,
            BoundedValue::Interval(r) => r.max,
        }
    }

    pub fn is_interval(&self) -> bool {
        matches!(self, BoundedValue::Interval(_))
    }

    /// Threshold comparison: an interval is below `threshold` when its upper bound is.
    pub fn is_below(&self, threshold: f64) -> bool {
        self.max() < threshold
    }

    /// Raises every bound to at least `floor`.
    pub fn clamp_min(self, floor: f64) -> Self {
        self.map(|v| v.max(floor))
    }

    /// Applies `f` to each bound. `f` should be monotone; the result is re-ordered regardless.
    pub fn map(self, f: impl Fn(f64) -> f64) -> Self {
        match self {
            BoundedValue::Scalar(v) => BoundedValue::Scalar(f(v)),
            BoundedValue::Interval(r) => BoundedValue::Interval(Range::ordered(f(r.min), f(r.max))),
        }
    }

    #[inline(always)]
    fn combine(self, rhs: BoundedValue, op: impl Fn(f64, f64) -> f64) -> Self {
        use BoundedValue::{Interval, Scalar};
        match (self, rhs) {
            (Scalar(a), Scalar(b)) => Scalar(op(a, b)),
            (Scalar(a), Interval(r)) => Interval(Range::ordered(op(a, r.min), op(a, r.max))),
            (Interval(l), Scalar(b)) => Interval(Range::ordered(op(l.min, b), op(l.max, b))),
            (Interval(l), Interval(r)) => Interval(Range::ordered(op(l.min, r.min), op(l.max, r.max))),
        }
    }
}

impl Default for BoundedValue {
    fn default() -> Self {
        BoundedValue::Scalar(0.0)
    }
}

impl From<f64> for BoundedValue {
    fn from(value: f64) -> Self {
        BoundedValue::Scalar(value)
    }
}

impl fmt::Display for BoundedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoundedValue::Scalar(v) => write!(f, "{}", v),
            BoundedValue::Interval(r) => write!(f, "[{}, {}]", r.min, r.max),
        }
    }
}

macro_rules! impl_bounded_op {
    ($trait:ident, $method:ident, $op:tt) => {
        impl $trait<BoundedValue> for BoundedValue {
            type Output = BoundedValue;
            fn $method(self, rhs: BoundedValue) -> BoundedValue {
                self.combine(rhs, |a, b| a $op b)
            }
        }

        impl $trait<f64> for BoundedValue {
            type Output = BoundedValue;
            fn $method(self, rhs: f64) -> BoundedValue {
                self.combine(BoundedValue::Scalar(rhs), |a, b| a $op b)
            }
        }

        impl $trait<BoundedValue> for f64 {
            type Output = BoundedValue;
            fn $method(self, rhs: BoundedValue) -> BoundedValue {
                BoundedValue::Scalar(self).combine(rhs, |a, b| a $op b)
            }
        }
    };
}

impl_bounded_op!(Add, add, +);
impl_bounded_op!(Sub, sub, -);
impl_bounded_op!(Mul, mul, *);
impl_bounded_op!(Div, div, /);

/// Wire form: a bare number or `{"min": .., "max": ..}`.
#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum BoundedRepr {
    Scalar(f64),
    Interval { min: f64, max: f64 },
}

impl TryFrom<BoundedRepr> for BoundedValue {
    type Error = InvalidRangeError;

    fn try_from(repr: BoundedRepr) -> Result<Self, Self::Error> {
        match repr {
            BoundedRepr::Scalar(v) => Ok(BoundedValue::Scalar(v)),
            BoundedRepr::Interval { min, max } => BoundedValue::interval(min, max),
        }
    }
}

impl From<BoundedValue> for BoundedRepr {
    fn from(value: BoundedValue) -> Self {
        match value {
            BoundedValue::Scalar(v) => BoundedRepr::Scalar(v),
            BoundedValue::Interval(r) => BoundedRepr::Interval { min: r.min, max: r.max },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn iv(min: f64, max: f64) -> BoundedValue {
        BoundedValue::interval(min, max).unwrap()
    }

    #[test]
    fn test_interval_rejects_inverted_bounds() {
        let err = BoundedValue::interval(3.0, 1.0).unwrap_err();
        assert_eq!(err, InvalidRangeError { min: 3.0, max: 1.0 });
        assert!(BoundedValue::interval(f64::NAN, 1.0).is_err());
        assert!(BoundedValue::interval(2.0, 2.0).is_ok());
    }

    #[test]
    fn test_scalar_arithmetic_stays_scalar() {
        let v = BoundedValue::scalar(2.0) * BoundedValue::scalar(3.0) + 1.0;
        assert_eq!(v, BoundedValue::Scalar(7.0));
    }

    #[test]
    fn test_scalar_broadcasts_over_interval() {
        assert_eq!(iv(1.0, 2.0) * 3.0, iv(3.0, 6.0));
        assert_eq!(10.0 + iv(1.0, 2.0), iv(11.0, 12.0));
        assert_eq!(iv(2.0, 4.0) / 2.0, iv(1.0, 2.0));
    }

    #[test]
    fn test_interval_pairs_combine_bound_by_bound() {
        // Not worst-case: [1,2] - [1,2] is [0,0], not [-1,1].
        assert_eq!(iv(1.0, 2.0) - iv(1.0, 2.0), iv(0.0, 0.0));
        assert_eq!(iv(1.0, 2.0) * iv(3.0, 4.0), iv(3.0, 8.0));
    }

    #[rstest]
    #[case(iv(1.0, 2.0) * -1.0)]
    #[case(-3.0 - iv(1.0, 5.0))]
    #[case(iv(1.0, 2.0) / iv(4.0, 100.0))]
    #[case(iv(-2.0, 1.0) * iv(-5.0, 3.0))]
    #[case(1.0 / iv(-1.0, 2.0))]
    fn test_bounds_stay_ordered(#[case] value: BoundedValue) {
        assert!(value.min() <= value.max(), "{} is inverted", value);
    }

    #[rstest]
    #[case(BoundedValue::scalar(0.5), 1.0, true)]
    #[case(BoundedValue::scalar(1.0), 1.0, false)]
    #[case(iv(0.2, 0.9), 1.0, true)]
    #[case(iv(0.2, 1.5), 1.0, false)]
    #[case(iv(0.2, 1.5), f64::INFINITY, true)]
    fn test_threshold_compares_upper_bound(#[case] value: BoundedValue, #[case] threshold: f64, #[case] expected: bool) {
        assert_eq!(value.is_below(threshold), expected);
    }

    #[test]
    fn test_clamp_min_floors_each_bound() {
        assert_eq!(iv(-1.0, 2.0).clamp_min(0.0), iv(0.0, 2.0));
        assert_eq!(BoundedValue::scalar(-4.0).clamp_min(0.0), BoundedValue::Scalar(0.0));
    }

    #[test]
    fn test_serde_wire_form() {
        assert_eq!(serde_json::to_string(&BoundedValue::scalar(1.5)).unwrap(), "1.5");
        assert_eq!(serde_json::to_string(&iv(1.0, 2.0)).unwrap(), r#"{"min":1.0,"max":2.0}"#);

        let parsed: BoundedValue = serde_json::from_str(r#"{"min":6.0,"max":8.0}"#).unwrap();
        assert_eq!(parsed, iv(6.0, 8.0));
        assert!(serde_json::from_str::<BoundedValue>(r#"{"min":8.0,"max":6.0}"#).is_err());
    }
}
