//! Exact fixed-point money.
//!
//! Every externally visible amount is a [`Money`]: an exact decimal rounded
//! half-up (away from zero) to the cent. Arithmetic between `Money` values is
//! exact, since sums and differences of cent-scaled decimals stay cent-scaled.
//! Raw upstream amounts with more precision are brought to the cent through
//! [`Money::round`].

use core::fmt;
use core::iter::Sum;
use core::ops::{Add, AddAssign, Neg, Sub, SubAssign};
use core::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

/// Number of fractional digits carried by every [`Money`] value.
pub const MONEY_SCALE: u32 = 2;

/// Signed monetary amount, exact to the cent.
///
/// Backed by [`rust_decimal::Decimal`] (96-bit mantissa, 28 significant
/// digits), so aggregation never drifts the way binary floats do.
///
/// ```rust
/// use rust_decimal_macros::dec;
/// use splitledger_core::Money;
///
/// assert_eq!(Money::round(dec!(10.005)).to_string(), "10.01");
/// assert_eq!(Money::round(dec!(10.004)).to_string(), "10.00");
/// assert!("12.345".parse::<Money>().is_err());
/// ```
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(try_from = "String", into = "String")]
pub struct Money(Decimal);

impl Money {
    pub const ZERO: Money = Money(Decimal::ZERO);

    /// Rounds an arbitrary decimal to the nearest cent, ties away from zero.
    #[must_use]
    pub fn round(amount: Decimal) -> Self {
        Self::normalized(
            amount.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero),
        )
    }

    /// Accepts a decimal only if it already fits in whole cents.
    ///
    /// Trailing zeros are fine (`12.500`); significant sub-cent digits are not.
    pub fn from_decimal_exact(amount: Decimal) -> DomainResult<Self> {
        if amount.normalize().scale() > MONEY_SCALE {
            return Err(DomainError::invalid_amount(format!(
                "{amount} has more than {MONEY_SCALE} decimals"
            )));
        }
        Ok(Self::normalized(amount))
    }

    /// Creates an amount from integer cents.
    #[must_use]
    pub fn from_cents(cents: i64) -> Self {
        Self::normalized(Decimal::new(cents, MONEY_SCALE))
    }

    /// Returns the underlying decimal.
    #[must_use]
    pub fn amount(self) -> Decimal {
        self.0
    }

    #[must_use]
    pub fn is_zero(self) -> bool {
        self.0.is_zero()
    }

    #[must_use]
    pub fn is_positive(self) -> bool {
        self.0 > Decimal::ZERO
    }

    #[must_use]
    pub fn is_negative(self) -> bool {
        self.0 < Decimal::ZERO
    }

    #[must_use]
    pub fn abs(self) -> Self {
        Self(self.0.abs())
    }

    /// Checked addition (returns `None` on overflow).
    #[must_use]
    pub fn checked_add(self, rhs: Money) -> Option<Money> {
        self.0.checked_add(rhs.0).map(Self::normalized)
    }

    /// Checked subtraction (returns `None` on overflow).
    #[must_use]
    pub fn checked_sub(self, rhs: Money) -> Option<Money> {
        self.0.checked_sub(rhs.0).map(Self::normalized)
    }

    // Zero is always stored unsigned so that `-0.00` never reaches Display.
    fn normalized(amount: Decimal) -> Self {
        if amount.is_zero() {
            Self(Decimal::ZERO)
        } else {
            Self(amount)
        }
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Self::Output {
        Money::normalized(self.0 + rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Money) {
        *self = *self + rhs;
    }
}

impl Sub for Money {
    type Output = Money;

    fn sub(self, rhs: Money) -> Self::Output {
        Money::normalized(self.0 - rhs.0)
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, rhs: Money) {
        *self = *self - rhs;
    }
}

impl Neg for Money {
    type Output = Money;

    fn neg(self) -> Self::Output {
        Money::normalized(-self.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

impl FromStr for Money {
    type Err = DomainError;

    /// Parses a decimal string (`"10"`, `"10.5"`, `"-3.25"`).
    ///
    /// Input is never rounded: more than two significant decimals is an error.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(DomainError::invalid_amount("empty amount"));
        }
        let amount = Decimal::from_str(trimmed)
            .map_err(|e| DomainError::invalid_amount(format!("{trimmed}: {e}")))?;
        Money::from_decimal_exact(amount)
    }
}

impl TryFrom<String> for Money {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Money> for String {
    fn from(value: Money) -> Self {
        value.to_string()
    }
}
