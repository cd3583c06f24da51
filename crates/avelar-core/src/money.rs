//! # Money Module
//!
//! Provides the `Money` type for handling Brazilian Real amounts safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In JavaScript/floating point:                                          │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Centavos                                         │
//! │    R$ 10,99 is stored as 1099                                           │
//! │    Sums, discounts and reports never drift                             │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use avelar_core::money::Money;
//!
//! let price = Money::from_cents(1099); // R$ 10,99
//! let doubled = price * 2;             // R$ 21,98
//! assert_eq!(doubled.to_string(), "R$ 21,98");
//! ```
//!
//! Form fields arrive as typed text ("1.234,56") or as decimal numbers;
//! [`Money::parse_brl`] and [`Money::from_reais`] are the only two ways in.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use ts_rs::TS;

use crate::error::ValidationError;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in centavos.
///
/// ## Where Money is Used
/// ```text
/// Produto.preco_venda ──► CartItem.subtotal ──► Venda.total
///                                                   │
/// Lancamento.valor ──► ResumoFinanceiro ◄───────────┘ (reports)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from centavos.
    ///
    /// ## Example
    /// ```rust
    /// use avelar_core::money::Money;
    ///
    /// let price = Money::from_cents(1099); // R$ 10,99
    /// assert_eq!(price.cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Converts a decimal reais amount (as typed in a number input) to
    /// centavos, rounding to the nearest centavo.
    ///
    /// ## Example
    /// ```rust
    /// use avelar_core::money::Money;
    ///
    /// assert_eq!(Money::from_reais(10.99).cents(), 1099);
    /// assert_eq!(Money::from_reais(0.1 + 0.2).cents(), 30);
    /// ```
    pub fn from_reais(reais: f64) -> Self {
        Money((reais * 100.0).round() as i64)
    }

    /// Parses an amount written the Brazilian way.
    ///
    /// Accepts `"1.234,56"`, `"R$ 10,00"`, `"-5,5"` and the plain decimal
    /// form `"1234.56"`. When a comma is present it is the decimal
    /// separator and dots are thousands separators; otherwise a dot is the
    /// decimal separator. At most two decimal places.
    pub fn parse_brl(input: &str) -> Result<Self, ValidationError> {
        let invalid = |reason: &str| ValidationError::InvalidFormat {
            field: "valor".to_string(),
            reason: reason.to_string(),
        };

        let mut text = input.trim().replace("R$", "");
        text.retain(|c| !c.is_whitespace());

        let negative = text.starts_with('-');
        let text = text.trim_start_matches('-');

        if text.is_empty() {
            return Err(ValidationError::Required {
                field: "valor".to_string(),
            });
        }

        let normalized = if text.contains(',') {
            text.replace('.', "").replacen(',', ".", 1)
        } else {
            text.to_string()
        };

        let (whole, fraction) = match normalized.split_once('.') {
            Some((whole, fraction)) => (whole, fraction),
            None => (normalized.as_str(), ""),
        };

        if whole.is_empty() && fraction.is_empty() {
            return Err(invalid("valor vazio"));
        }
        if !whole.chars().all(|c| c.is_ascii_digit()) || !fraction.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid("use apenas números, ponto e vírgula"));
        }
        if fraction.len() > 2 {
            return Err(invalid("no máximo duas casas decimais"));
        }

        let whole: i64 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| invalid("valor muito grande"))?
        };
        let fraction: i64 = match fraction.len() {
            0 => 0,
            1 => fraction.parse::<i64>().map_err(|_| invalid("centavos"))? * 10,
            _ => fraction.parse().map_err(|_| invalid("centavos"))?,
        };

        let cents = whole
            .checked_mul(100)
            .and_then(|c| c.checked_add(fraction))
            .ok_or_else(|| invalid("valor muito grande"))?;

        Ok(Money(if negative { -cents } else { cents }))
    }

    /// Returns the value in centavos.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the whole reais portion.
    #[inline]
    pub const fn reais(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the centavos portion (always 0-99).
    #[inline]
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns the value as decimal reais (display and percentage math only).
    #[inline]
    pub fn as_reais_f64(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Returns the absolute value.
    #[inline]
    pub const fn abs(&self) -> Self {
        Money(self.0.abs())
    }

    /// Multiplies money by a quantity.
    ///
    /// ## Example
    /// ```rust
    /// use avelar_core::money::Money;
    ///
    /// let unit_price = Money::from_cents(4990); // R$ 49,90
    /// assert_eq!(unit_price.multiply_quantity(3).cents(), 14970);
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

/// Returns `part` as a percentage of `whole`, or 0 when `whole` is zero.
///
/// ## Example
/// ```rust
/// use avelar_core::money::{percentage_of, Money};
///
/// let lucro = Money::from_cents(2500);
/// let receitas = Money::from_cents(10000);
/// assert_eq!(percentage_of(lucro.cents(), receitas.cents()), 25.0);
/// assert_eq!(percentage_of(10, 0), 0.0);
/// ```
pub fn percentage_of(part: i64, whole: i64) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    part as f64 / whole as f64 * 100.0
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Renders `R$ 1.234,56` (negative amounts as `-R$ 5,50`).
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let digits = self.reais().abs().to_string();

        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, c) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                grouped.push('.');
            }
            grouped.push(c);
        }

        write!(f, "{}R$ {},{:02}", sign, grouped, self.cents_part())
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

/// Multiplication by quantity.
impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_cents() {
        let money = Money::from_cents(1099);
        assert_eq!(money.cents(), 1099);
        assert_eq!(money.reais(), 10);
        assert_eq!(money.cents_part(), 99);
    }

    #[test]
    fn test_display() {
        assert_eq!(Money::from_cents(1099).to_string(), "R$ 10,99");
        assert_eq!(Money::from_cents(500).to_string(), "R$ 5,00");
        assert_eq!(Money::from_cents(-550).to_string(), "-R$ 5,50");
        assert_eq!(Money::from_cents(0).to_string(), "R$ 0,00");
        assert_eq!(Money::from_cents(123456).to_string(), "R$ 1.234,56");
        assert_eq!(Money::from_cents(123456789).to_string(), "R$ 1.234.567,89");
        assert_eq!(Money::from_cents(100000).to_string(), "R$ 1.000,00");
    }

    #[test]
    fn test_from_reais_rounds_to_nearest_centavo() {
        assert_eq!(Money::from_reais(10.99).cents(), 1099);
        assert_eq!(Money::from_reais(0.1 + 0.2).cents(), 30);
        assert_eq!(Money::from_reais(19.999).cents(), 2000);
        assert_eq!(Money::from_reais(-5.5).cents(), -550);
    }

    #[test]
    fn test_parse_brl() {
        assert_eq!(Money::parse_brl("1.234,56").unwrap().cents(), 123456);
        assert_eq!(Money::parse_brl("R$ 10,00").unwrap().cents(), 1000);
        assert_eq!(Money::parse_brl("1234.56").unwrap().cents(), 123456);
        assert_eq!(Money::parse_brl("350").unwrap().cents(), 35000);
        assert_eq!(Money::parse_brl("0,5").unwrap().cents(), 50);
        assert_eq!(Money::parse_brl("-5,50").unwrap().cents(), -550);
        assert_eq!(Money::parse_brl(",99").unwrap().cents(), 99);
    }

    #[test]
    fn test_parse_brl_rejects_garbage() {
        assert!(Money::parse_brl("").is_err());
        assert!(Money::parse_brl("R$").is_err());
        assert!(Money::parse_brl("abc").is_err());
        assert!(Money::parse_brl("10,999").is_err());
        assert!(Money::parse_brl("1.2.3").is_err());
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(500);

        assert_eq!((a + b).cents(), 1500);
        assert_eq!((a - b).cents(), 500);
        assert_eq!((a * 3).cents(), 3000);

        let mut c = a;
        c += b;
        c -= Money::from_cents(100);
        assert_eq!(c.cents(), 1400);
    }

    #[test]
    fn test_sum() {
        let values = vec![Money::from_cents(100), Money::from_cents(250), Money::from_cents(-50)];
        let total: Money = values.iter().sum();
        assert_eq!(total.cents(), 300);

        let empty: Vec<Money> = Vec::new();
        assert!(empty.into_iter().sum::<Money>().is_zero());
    }

    #[test]
    fn test_zero_and_checks() {
        let zero = Money::zero();
        assert!(zero.is_zero());
        assert!(!zero.is_positive());
        assert!(!zero.is_negative());

        let negative = Money::from_cents(-100);
        assert!(negative.is_negative());
        assert_eq!(negative.abs().cents(), 100);
    }

    #[test]
    fn test_percentage_of() {
        assert_eq!(percentage_of(25, 100), 25.0);
        assert!((percentage_of(1, 3) - 33.333).abs() < 0.001);
        assert_eq!(percentage_of(5, 0), 0.0);
        assert_eq!(percentage_of(-50, 200), -25.0);
    }
}
