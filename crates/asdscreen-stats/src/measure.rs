//! Explicit outcomes for statistics that may not exist.
//!
//! Every ratio, rate or model-derived value in the workspace is wrapped in a
//! [`Measure`]. A measure is either a computed value or one of three explicit
//! non-values:
//!
//! - [`Measure::Undefined`]: the formula has no value for this input (for
//!   example a zero denominator). Never coerced to `0.0` or `NaN`.
//! - [`Measure::Unavailable`]: the input population is below the declared
//!   minimum, so the value was deliberately not computed. The threshold and
//!   the actual count are retained.
//! - [`Measure::NotComputed`]: the combination was never part of the analysis
//!   (for example a lookup for a stratum that does not occur).
//!
//! Non-values propagate through [`Measure::zip_with`], so a comparison that
//! involves an undefined operand is itself undefined.
//!
//! # Examples
//!
//! ```
//! use asdscreen_stats::measure::{Measure, UndefinedReason};
//!
//! assert_eq!(Measure::ratio(3.0, 4.0), Measure::Value(0.75));
//! assert_eq!(
//!     Measure::ratio(3.0, 0.0),
//!     Measure::Undefined(UndefinedReason::ZeroDenominator)
//! );
//!
//! let diff = Measure::Value(0.5).zip_with(Measure::ratio(1.0, 0.0), |a, b| a - b);
//! assert!(diff.is_undefined());
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

/// A statistic that is either computed or explicitly absent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum Measure<T> {
    /// The computed value.
    Value(T),
    /// The statistic has no value for this input.
    Undefined(UndefinedReason),
    /// The input population is below the minimum required size.
    Unavailable(InsufficientSample),
    /// The statistic was never computed for this combination.
    NotComputed,
}

/// Why a statistic is undefined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UndefinedReason {
    /// The denominator population or probability is zero.
    ZeroDenominator,
    /// The reference probability of a ratio measure is zero.
    ZeroReference,
    /// An input has no variance.
    ZeroVariance,
    /// Only one outcome class is present.
    SingleClass,
    /// A contingency table collapses below 2x2 after dropping empty margins.
    DegenerateTable,
    /// The computation produced a non-finite number.
    NonFinite,
}

impl fmt::Display for UndefinedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::ZeroDenominator => "zero denominator",
            Self::ZeroReference => "zero reference rate",
            Self::ZeroVariance => "zero variance",
            Self::SingleClass => "single outcome class",
            Self::DegenerateTable => "degenerate contingency table",
            Self::NonFinite => "non-finite result",
        };
        f.write_str(s)
    }
}

/// A population that is smaller than a statistic's declared minimum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InsufficientSample {
    /// Minimum population size required.
    pub threshold: usize,
    /// Population size that was available.
    pub actual: usize,
}

impl InsufficientSample {
    /// Returns `Err` when `actual` is below `threshold`.
    ///
    /// ```
    /// use asdscreen_stats::measure::InsufficientSample;
    ///
    /// assert!(InsufficientSample::check(30, 30).is_ok());
    /// let err = InsufficientSample::check(30, 20).unwrap_err();
    /// assert_eq!(err.actual, 20);
    /// ```
    pub fn check(threshold: usize, actual: usize) -> Result<(), Self> {
        if actual < threshold {
            Err(Self { threshold, actual })
        } else {
            Ok(())
        }
    }
}

impl<T> Measure<T> {
    #[must_use]
    pub fn value(&self) -> Option<&T> {
        match self {
            Self::Value(v) => Some(v),
            _ => None,
        }
    }

    #[must_use]
    pub fn into_value(self) -> Option<T> {
        match self {
            Self::Value(v) => Some(v),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_value(&self) -> bool {
        matches!(self, Self::Value(_))
    }

    #[must_use]
    pub fn is_undefined(&self) -> bool {
        matches!(self, Self::Undefined(_))
    }

    #[must_use]
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }

    #[must_use]
    pub fn as_ref(&self) -> Measure<&T> {
        match self {
            Self::Value(v) => Measure::Value(v),
            Self::Undefined(r) => Measure::Undefined(*r),
            Self::Unavailable(s) => Measure::Unavailable(*s),
            Self::NotComputed => Measure::NotComputed,
        }
    }

    pub fn map<U, F>(self, f: F) -> Measure<U>
    where
        F: FnOnce(T) -> U,
    {
        self.and_then(|v| Measure::Value(f(v)))
    }

    pub fn and_then<U, F>(self, f: F) -> Measure<U>
    where
        F: FnOnce(T) -> Measure<U>,
    {
        match self {
            Self::Value(v) => f(v),
            Self::Undefined(r) => Measure::Undefined(r),
            Self::Unavailable(s) => Measure::Unavailable(s),
            Self::NotComputed => Measure::NotComputed,
        }
    }

    /// Combines two measures; the first non-value operand wins.
    pub fn zip_with<U, R, F>(self, other: Measure<U>, f: F) -> Measure<R>
    where
        F: FnOnce(T, U) -> R,
    {
        self.and_then(|a| other.map(|b| f(a, b)))
    }
}

impl Measure<f64> {
    /// Wraps a float, turning `NaN` and infinities into [`UndefinedReason::NonFinite`].
    #[must_use]
    pub fn finite(value: f64) -> Self {
        if value.is_finite() {
            Self::Value(value)
        } else {
            Self::Undefined(UndefinedReason::NonFinite)
        }
    }

    /// `numerator / denominator`, undefined when the denominator is zero.
    #[must_use]
    pub fn ratio(numerator: f64, denominator: f64) -> Self {
        if denominator == 0.0 {
            Self::Undefined(UndefinedReason::ZeroDenominator)
        } else {
            Self::finite(numerator / denominator)
        }
    }
}

impl<T> From<InsufficientSample> for Measure<T> {
    fn from(sample: InsufficientSample) -> Self {
        Self::Unavailable(sample)
    }
}

impl<T> fmt::Display for Measure<T>
where
    T: fmt::Display,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(v) => fmt::Display::fmt(v, f),
            Self::Undefined(reason) => write!(f, "undefined ({reason})"),
            Self::Unavailable(s) => write!(f, "unavailable (n={} < {})", s.actual, s.threshold),
            Self::NotComputed => f.write_str("not computed"),
        }
    }
}
