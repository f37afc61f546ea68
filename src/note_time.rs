//! Rational note timing.
//!
//! Positions and durations are integer fractions of a whole note. They are
//! never converted to floating point: comparisons go through gcd reduction
//! or cross-multiplication.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TabError};

/// A position or duration as `numerator / denominator` of a whole note.
///
/// The denominator is always positive. The pair is kept exactly as given
/// (`[4, 4]` stays `[4, 4]`); use [`simplify`] or [`equivalent`] when the
/// value matters rather than the representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "(i64, i64)", into = "(i64, i64)")]
pub struct NoteTime {
    numerator: i64,
    denominator: i64,
}

impl NoteTime {
    /// Time zero, the start of a bar.
    pub const ZERO: NoteTime = NoteTime { numerator: 0, denominator: 1 };

    pub fn new(numerator: i64, denominator: i64) -> Result<Self> {
        if denominator <= 0 {
            return Err(TabError::Arithmetic(format!(
                "note time denominator must be positive, got {numerator}/{denominator}"
            )));
        }
        Ok(Self { numerator, denominator })
    }

    pub fn numerator(&self) -> i64 {
        self.numerator
    }

    pub fn denominator(&self) -> i64 {
        self.denominator
    }

    /// Exact sum of two note times, simplified.
    pub fn checked_add(self, other: NoteTime) -> Result<NoteTime> {
        let overflow = || {
            TabError::Arithmetic(format!("note time overflow adding {self} and {other}"))
        };
        let numerator = self
            .numerator
            .checked_mul(other.denominator)
            .and_then(|a| {
                other
                    .numerator
                    .checked_mul(self.denominator)
                    .and_then(|b| a.checked_add(b))
            })
            .ok_or_else(overflow)?;
        let denominator = self
            .denominator
            .checked_mul(other.denominator)
            .ok_or_else(overflow)?;
        Ok(simplify(NoteTime { numerator, denominator }))
    }
}

impl TryFrom<(i64, i64)> for NoteTime {
    type Error = TabError;

    fn try_from((numerator, denominator): (i64, i64)) -> Result<Self> {
        NoteTime::new(numerator, denominator)
    }
}

impl From<NoteTime> for (i64, i64) {
    fn from(t: NoteTime) -> Self {
        (t.numerator, t.denominator)
    }
}

impl fmt::Display for NoteTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.numerator, self.denominator)
    }
}

/// Greatest common divisor (Euclid). `gcd(a, 0) == |a|`.
///
/// Fails only when the result is 2^63, which does not fit in an `i64`
/// (`gcd(i64::MIN, 0)`, `gcd(i64::MIN, i64::MIN)`).
pub fn gcd(a: i64, b: i64) -> Result<i64> {
    i64::try_from(unsigned_gcd(a.unsigned_abs(), b.unsigned_abs()))
        .map_err(|_| TabError::Arithmetic(format!("greatest common divisor of {a} and {b} overflows")))
}

fn unsigned_gcd(mut a: u64, mut b: u64) -> u64 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

/// Lowest common multiple of a list of integers; 1 for an empty list.
///
/// The result is never negative. A zero anywhere in the list yields 0.
pub fn lcm(numbers: &[i64]) -> Result<i64> {
    let overflow = || TabError::Arithmetic(format!("lowest common multiple of {numbers:?} overflows"));
    let mut acc: i64 = 1;
    for &n in numbers {
        let divisor = gcd(acc, n)?;
        if divisor == 0 {
            acc = 0;
            continue;
        }
        acc = (acc / divisor).checked_mul(n).ok_or_else(overflow)?;
    }
    acc.checked_abs().ok_or_else(overflow)
}

/// Reduce a note time to lowest terms. Idempotent.
pub fn simplify(t: NoteTime) -> NoteTime {
    // denominator > 0, so the divisor is in 1..=denominator
    let divisor = unsigned_gcd(t.numerator.unsigned_abs(), t.denominator.unsigned_abs()) as i64;
    NoteTime {
        numerator: t.numerator / divisor,
        denominator: t.denominator / divisor,
    }
}

/// Whether two note times denote the same value.
pub fn equivalent(a: NoteTime, b: NoteTime) -> bool {
    simplify(a) == simplify(b)
}

/// Whether a note starting at `start` and lasting `duration` sounds at `now`,
/// i.e. `start <= now < start + duration`.
pub fn is_sounding(start: NoteTime, duration: NoteTime, now: NoteTime) -> bool {
    let (sn, sd) = (start.numerator as i128, start.denominator as i128);
    let (dn, dd) = (duration.numerator as i128, duration.denominator as i128);
    let (nn, nd) = (now.numerator as i128, now.denominator as i128);

    let started = sn * nd <= nn * sd;
    let still_sounding = nn * sd * dd < (sn * dd + dn * sd) * nd;
    started && still_sounding
}
