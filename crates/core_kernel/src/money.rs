//! Money types with precise decimal arithmetic
//!
//! This module provides a type-safe representation of monetary values
//! using rust_decimal for precise calculations without floating-point errors,
//! plus the VAT rate value object used on every invoice line.

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};
use std::str::FromStr;
use thiserror::Error;

/// Number of decimal places persisted for prices and line amounts
pub const AMOUNT_DECIMAL_PLACES: u32 = 2;

/// Number of decimal places persisted for a VAT rate (e.g. 0.175)
pub const VAT_RATE_DECIMAL_PLACES: u32 = 3;

/// Currency codes following ISO 4217
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    GBP,
    EUR,
    USD,
}

impl Currency {
    /// Returns the number of decimal places for this currency
    pub fn decimal_places(&self) -> u32 {
        AMOUNT_DECIMAL_PLACES
    }

    /// Returns the currency symbol
    pub fn symbol(&self) -> &'static str {
        match self {
            Currency::GBP => "£",
            Currency::EUR => "€",
            Currency::USD => "$",
        }
    }

    /// Returns the ISO 4217 code
    pub fn code(&self) -> &'static str {
        match self {
            Currency::GBP => "GBP",
            Currency::EUR => "EUR",
            Currency::USD => "USD",
        }
    }

    /// Plural unit name used in line descriptions ("2.00 hours @ 50.00 pounds")
    pub fn unit_name(&self) -> &'static str {
        match self {
            Currency::GBP => "pounds",
            Currency::EUR => "euros",
            Currency::USD => "dollars",
        }
    }

    /// Long name used in the document footer ("All prices in pounds sterling")
    pub fn long_name(&self) -> &'static str {
        match self {
            Currency::GBP => "pounds sterling",
            Currency::EUR => "euros",
            Currency::USD => "US dollars",
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for Currency {
    type Err = MoneyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "GBP" => Ok(Currency::GBP),
            "EUR" => Ok(Currency::EUR),
            "USD" => Ok(Currency::USD),
            other => Err(MoneyError::UnknownCurrency(other.to_string())),
        }
    }
}

/// Errors that can occur during money operations
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MoneyError {
    #[error("Currency mismatch: cannot operate on {0} and {1}")]
    CurrencyMismatch(String, String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Invalid VAT rate {0}: must be between 0 and 1")]
    InvalidVatRate(Decimal),

    #[error("Unknown currency: {0}")]
    UnknownCurrency(String),
}

/// Rounds half-to-even to `dp` places, the rounding applied when amounts are stored
pub fn round_stored(value: Decimal, dp: u32) -> Decimal {
    value.round_dp_with_strategy(dp, RoundingStrategy::MidpointNearestEven)
}

/// Formats a decimal with exactly `dp` places, e.g. `390` -> `"390.00"`
pub fn format_fixed(value: Decimal, dp: u32) -> String {
    let mut rounded = round_stored(value, dp);
    rounded.rescale(dp);
    if rounded.is_zero() {
        rounded.set_sign_positive(true);
    }
    rounded.to_string()
}

/// A monetary amount with associated currency
///
/// Amounts are kept at the persisted precision of two decimal places.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Money {
    amount: Decimal,
    currency: Currency,
}

impl Money {
    /// Creates a new Money value, rounding to the currency's decimal places
    pub fn new(amount: Decimal, currency: Currency) -> Self {
        Self {
            amount: round_stored(amount, currency.decimal_places()),
            currency,
        }
    }

    /// Creates Money from an integer amount in minor units (e.g., pence)
    pub fn from_minor(minor_units: i64, currency: Currency) -> Self {
        Self::new(Decimal::new(minor_units, currency.decimal_places()), currency)
    }

    /// Creates a zero amount in the specified currency
    pub fn zero(currency: Currency) -> Self {
        Self {
            amount: dec!(0),
            currency,
        }
    }

    /// Returns the amount
    pub fn amount(&self) -> Decimal {
        self.amount
    }

    /// Returns the currency
    pub fn currency(&self) -> Currency {
        self.currency
    }

    /// Returns true if the amount is zero
    pub fn is_zero(&self) -> bool {
        self.amount.is_zero()
    }

    /// Returns true if the amount is negative
    pub fn is_negative(&self) -> bool {
        self.amount.is_sign_negative() && !self.amount.is_zero()
    }

    /// Checked addition that returns an error on currency mismatch
    pub fn checked_add(&self, other: &Money) -> Result<Money, MoneyError> {
        if self.currency != other.currency {
            return Err(MoneyError::CurrencyMismatch(
                self.currency.to_string(),
                other.currency.to_string(),
            ));
        }
        Ok(Self::new(self.amount + other.amount, self.currency))
    }

    /// Checked subtraction that returns an error on currency mismatch
    pub fn checked_sub(&self, other: &Money) -> Result<Money, MoneyError> {
        if self.currency != other.currency {
            return Err(MoneyError::CurrencyMismatch(
                self.currency.to_string(),
                other.currency.to_string(),
            ));
        }
        Ok(Self::new(self.amount - other.amount, self.currency))
    }

    /// Multiplies by a scalar (e.g., a quantity of hours)
    pub fn multiply(&self, factor: Decimal) -> Self {
        Self::new(self.amount * factor, self.currency)
    }

    /// Sums amounts of a single currency, failing on the first mismatch
    pub fn try_sum<'a, I>(currency: Currency, amounts: I) -> Result<Money, MoneyError>
    where
        I: IntoIterator<Item = &'a Money>,
    {
        amounts
            .into_iter()
            .try_fold(Money::zero(currency), |acc, m| acc.checked_add(m))
    }

    /// The amount formatted with two decimal places and no symbol ("1044.66")
    pub fn format_amount(&self) -> String {
        format_fixed(self.amount, self.currency.decimal_places())
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.currency.symbol(), self.format_amount())
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        self.checked_add(&other)
            .expect("Currency mismatch in Money::add")
    }
}

impl Sub for Money {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        self.checked_sub(&other)
            .expect("Currency mismatch in Money::sub")
    }
}

impl Neg for Money {
    type Output = Self;

    fn neg(self) -> Self {
        Self::new(-self.amount, self.currency)
    }
}

impl Mul<Decimal> for Money {
    type Output = Self;

    fn mul(self, factor: Decimal) -> Self {
        self.multiply(factor)
    }
}

/// A VAT rate stored as a fraction (0.2 is 20%)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct VatRate {
    value: Decimal,
}

impl VatRate {
    /// Zero-rated supplies
    pub const ZERO: VatRate = VatRate { value: Decimal::ZERO };

    /// Creates a rate from a fraction, e.g. `0.175` for 17.5%
    pub fn new(value: Decimal) -> Result<Self, MoneyError> {
        if (value.is_sign_negative() && !value.is_zero()) || value > Decimal::ONE {
            return Err(MoneyError::InvalidVatRate(value));
        }
        Ok(Self {
            value: round_stored(value, VAT_RATE_DECIMAL_PLACES),
        })
    }

    /// Creates a rate from a percentage, e.g. `20` for 20%
    pub fn from_percentage(percentage: Decimal) -> Result<Self, MoneyError> {
        Self::new(percentage / dec!(100))
    }

    /// Returns the rate as a fraction
    pub fn as_decimal(&self) -> Decimal {
        self.value
    }

    /// Returns the rate as a percentage rounded to two places
    pub fn as_percentage(&self) -> Decimal {
        round_stored(self.value * dec!(100), 2)
    }

    /// The percentage without trailing zeros ("20", "17.5")
    pub fn percentage_label(&self) -> String {
        self.as_percentage().normalize().to_string()
    }

    /// Applies this rate to a money amount
    pub fn apply(&self, money: &Money) -> Money {
        money.multiply(self.value)
    }
}

impl TryFrom<Decimal> for VatRate {
    type Error = MoneyError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        VatRate::new(value)
    }
}

impl From<VatRate> for Decimal {
    fn from(rate: VatRate) -> Decimal {
        rate.value
    }
}

impl fmt::Display for VatRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.percentage_label())
    }
}
