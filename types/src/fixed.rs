use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::{fmt, str::FromStr};
use thiserror::Error;

// Scaling factor for fixed-point arithmetic
// Using 10000 for easy decimal representation (4 decimal places)
pub const SCALE: i64 = 10_000;
pub const HALF_SCALE: i64 = SCALE / 2;
const DECIMALS: usize = 4;

/// Fixed-point number with 4 decimal places of precision.
///
/// Prices and asset quantities are kept in this form so the market never
/// accumulates floating-point drift. On disk it is written as a plain JSON
/// number.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Decimal(i64);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseDecimalError {
    #[error("not a decimal number: {0:?}")]
    Invalid(String),
    #[error("at most {DECIMALS} decimal places are supported")]
    Precision,
    #[error("value out of range")]
    Overflow,
}

impl Decimal {
    pub const ZERO: Self = Decimal(0);
    pub const ONE: Self = Decimal(SCALE);

    pub const fn from_raw(raw: i64) -> Self {
        Decimal(raw)
    }

    /// Get the raw scaled value
    pub const fn raw(self) -> i64 {
        self.0
    }

    /// Create from an integer value
    pub fn from_int(value: i64) -> Self {
        Decimal(value.saturating_mul(SCALE))
    }

    /// Create from a whole number of points
    pub fn from_units(value: u64) -> Self {
        Decimal::from_int(i64::try_from(value).unwrap_or(i64::MAX))
    }

    /// Create from a fraction (numerator / denominator)
    pub fn from_frac(numerator: i64, denominator: i64) -> Self {
        if denominator == 0 {
            return Decimal(0);
        }
        Decimal::from_int(numerator).div(Decimal::from_int(denominator))
    }

    /// Create from a float, rounding to the nearest representable value.
    pub fn from_f64(value: f64) -> Self {
        // `as` saturates and maps NaN to zero.
        Decimal((value * SCALE as f64).round() as i64)
    }

    pub fn to_f64(self) -> f64 {
        self.0 as f64 / SCALE as f64
    }

    pub fn is_positive(self) -> bool {
        self.0 > 0
    }

    pub fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// Convert to integer with rounding
    pub fn to_int_rounded(self) -> i64 {
        if self.0 >= 0 {
            (self.0 + HALF_SCALE) / SCALE
        } else {
            (self.0 - HALF_SCALE) / SCALE
        }
    }

    /// Smallest whole number of points not below this value (zero for non-positive values).
    pub fn ceil_units(self) -> u64 {
        if self.0 <= 0 {
            return 0;
        }
        (self.0 as u64).div_ceil(SCALE as u64)
    }

    /// Whole points, discarding the fraction (zero for non-positive values).
    pub fn floor_units(self) -> u64 {
        if self.0 <= 0 {
            return 0;
        }
        (self.0 / SCALE) as u64
    }

    /// Round half away from zero to `dp` decimal places.
    pub fn round_dp(self, dp: u32) -> Self {
        let step = Self::step(dp);
        let quotient = self.0 / step;
        let remainder = self.0 % step;
        let carry = if remainder.abs() * 2 >= step {
            remainder.signum()
        } else {
            0
        };
        Decimal((quotient + carry) * step)
    }

    /// Round toward negative infinity to `dp` decimal places.
    pub fn floor_dp(self, dp: u32) -> Self {
        let step = Self::step(dp);
        Decimal(self.0.div_euclid(step) * step)
    }

    fn step(dp: u32) -> i64 {
        let dp = dp.min(DECIMALS as u32);
        10i64.pow(DECIMALS as u32 - dp)
    }

    /// Multiply two fixed-point numbers
    pub fn mul(self, other: Self) -> Self {
        let scaled = (self.0 as i128) * (other.0 as i128);
        Decimal(clamp_i128(scaled / SCALE as i128))
    }

    /// Multiply, or `None` when the product does not fit.
    pub fn checked_mul(self, other: Self) -> Option<Self> {
        let scaled = (self.0 as i128) * (other.0 as i128) / SCALE as i128;
        i64::try_from(scaled).ok().map(Decimal)
    }

    /// Divide two fixed-point numbers
    pub fn div(self, other: Self) -> Self {
        if other.0 == 0 {
            return Decimal(0);
        }
        let scaled = (self.0 as i128) * (SCALE as i128);
        Decimal(clamp_i128(scaled / other.0 as i128))
    }
}

fn clamp_i128(value: i128) -> i64 {
    value.clamp(i64::MIN as i128, i64::MAX as i128) as i64
}

impl std::ops::Add for Decimal {
    type Output = Self;
    fn add(self, other: Self) -> Self {
        Decimal(self.0.saturating_add(other.0))
    }
}

impl std::ops::AddAssign for Decimal {
    fn add_assign(&mut self, other: Self) {
        *self = *self + other;
    }
}

impl std::ops::Sub for Decimal {
    type Output = Self;
    fn sub(self, other: Self) -> Self {
        Decimal(self.0.saturating_sub(other.0))
    }
}

impl std::ops::SubAssign for Decimal {
    fn sub_assign(&mut self, other: Self) {
        *self = *self - other;
    }
}

impl std::ops::Neg for Decimal {
    type Output = Self;
    fn neg(self) -> Self {
        Decimal(-self.0)
    }
}

impl std::ops::Mul for Decimal {
    type Output = Self;
    fn mul(self, other: Self) -> Self {
        Decimal::mul(self, other)
    }
}

impl std::ops::Div for Decimal {
    type Output = Self;
    fn div(self, other: Self) -> Self {
        Decimal::div(self, other)
    }
}

impl fmt::Display for Decimal {
    /// Always shows at least two decimals, trailing zeros beyond that are dropped.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let magnitude = self.0.unsigned_abs();
        let whole = magnitude / SCALE as u64;
        let frac = format!("{:04}", magnitude % SCALE as u64);
        let trimmed = frac.trim_end_matches('0');
        let frac = if trimmed.len() < 2 { &frac[..2] } else { trimmed };
        write!(f, "{sign}{whole}.{frac}")
    }
}

impl FromStr for Decimal {
    type Err = ParseDecimalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim();
        let invalid = || ParseDecimalError::Invalid(s.to_string());
        let (negative, digits) = match text.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, text),
        };
        let (whole, frac) = digits.split_once('.').unwrap_or((digits, ""));
        if whole.is_empty() && frac.is_empty() {
            return Err(invalid());
        }
        if !whole.chars().all(|c| c.is_ascii_digit()) || !frac.chars().all(|c| c.is_ascii_digit())
        {
            return Err(invalid());
        }
        if frac.len() > DECIMALS {
            return Err(ParseDecimalError::Precision);
        }

        let whole: i64 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| ParseDecimalError::Overflow)?
        };
        let frac: i64 = if frac.is_empty() {
            0
        } else {
            let padded = format!("{frac:0<width$}", width = DECIMALS);
            padded.parse().map_err(|_| invalid())?
        };
        let raw = whole
            .checked_mul(SCALE)
            .and_then(|w| w.checked_add(frac))
            .ok_or(ParseDecimalError::Overflow)?;
        Ok(Decimal(if negative { -raw } else { raw }))
    }
}

impl Serialize for Decimal {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.to_f64())
    }
}

impl<'de> Deserialize<'de> for Decimal {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        f64::deserialize(deserializer).map(Decimal::from_f64)
    }
}
