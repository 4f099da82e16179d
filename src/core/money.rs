use crate::error::DebtError;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};

/// Number of minor units in one major currency unit.
const MINOR_UNITS: i64 = 100;

/// A monetary amount in integer minor units (cents).
///
/// All arithmetic inside the engine happens on `Cents`, so comparisons and
/// sums are exact. Conversion to and from major units happens once, at the
/// boundary.
///
/// # Examples
///
/// ```
/// use debt_simplifier::core::money::Cents;
/// use rust_decimal_macros::dec;
///
/// let amount = Cents::from_major(dec!(150)).unwrap();
/// assert_eq!(amount, Cents::new(15_000));
/// assert_eq!(amount.to_major(), dec!(150.00));
/// ```
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Cents(i64);

impl Cents {
    pub const ZERO: Cents = Cents(0);
    pub const MAX: Cents = Cents(i64::MAX);

    pub const fn new(minor_units: i64) -> Self {
        Self(minor_units)
    }

    /// Convert an amount in major units, rounding half away from zero.
    pub fn from_major(amount: Decimal) -> Result<Self, DebtError> {
        amount
            .checked_mul(Decimal::from(MINOR_UNITS))
            .map(|scaled| scaled.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero))
            .and_then(|rounded| rounded.to_i64())
            .map(Self)
            .ok_or(DebtError::AmountOutOfRange(amount))
    }

    /// The amount in major units with two decimal places.
    pub fn to_major(self) -> Decimal {
        Decimal::new(self.0, 2)
    }

    pub fn value(self) -> i64 {
        self.0
    }

    pub fn is_positive(self) -> bool {
        self.0 > 0
    }

    pub fn is_negative(self) -> bool {
        self.0 < 0
    }

    pub fn abs(self) -> Self {
        Self(self.0.abs())
    }

    pub fn checked_add(self, other: Cents) -> Option<Cents> {
        self.0.checked_add(other.0).map(Self)
    }

    pub fn checked_sub(self, other: Cents) -> Option<Cents> {
        self.0.checked_sub(other.0).map(Self)
    }

    /// Sum of all amounts, or `None` if the total does not fit.
    pub fn checked_sum(amounts: impl IntoIterator<Item = Cents>) -> Option<Cents> {
        amounts
            .into_iter()
            .try_fold(Cents::ZERO, Cents::checked_add)
    }

    /// Split evenly between `count` parts using integer division.
    ///
    /// Returns `(share, remainder)` where `share * count + remainder == self`.
    /// The remainder is what truncation leaves unassigned. `None` when
    /// `count` is zero.
    pub fn split_even(self, count: usize) -> Option<(Cents, Cents)> {
        let count = i64::try_from(count).ok().filter(|c| *c > 0)?;
        Some((Self(self.0 / count), Self(self.0 % count)))
    }
}

impl fmt::Display for Cents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.to_major(), f)
    }
}

impl From<i64> for Cents {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

// Operators follow plain `i64` semantics. Totals over untrusted input go
// through `checked_add` or `checked_sum`.
impl Add for Cents {
    type Output = Cents;

    fn add(self, rhs: Cents) -> Cents {
        Cents(self.0 + rhs.0)
    }
}

impl Sub for Cents {
    type Output = Cents;

    fn sub(self, rhs: Cents) -> Cents {
        Cents(self.0 - rhs.0)
    }
}

impl Neg for Cents {
    type Output = Cents;

    fn neg(self) -> Cents {
        Cents(-self.0)
    }
}

impl AddAssign for Cents {
    fn add_assign(&mut self, rhs: Cents) {
        self.0 += rhs.0;
    }
}

impl SubAssign for Cents {
    fn sub_assign(&mut self, rhs: Cents) {
        self.0 -= rhs.0;
    }
}
