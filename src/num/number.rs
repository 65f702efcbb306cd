use std::fmt;
use std::str::FromStr;

use bigdecimal::num_bigint::BigInt;
use bigdecimal::{BigDecimal, Zero};
use rust_decimal::Decimal;

use crate::error::NumericError;

/// Native kinds a [`Number`] can be narrowed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumberKind {
    I8,
    I16,
    I32,
    I64,
    I128,
    Isize,
    U8,
    U16,
    U32,
    U64,
    U128,
    Usize,
    F32,
    F64,
    Decimal,
    BigDecimal,
}

impl NumberKind {
    pub const fn is_integral(self) -> bool {
        !matches!(
            self,
            NumberKind::F32 | NumberKind::F64 | NumberKind::Decimal | NumberKind::BigDecimal
        )
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            NumberKind::I8 => "i8",
            NumberKind::I16 => "i16",
            NumberKind::I32 => "i32",
            NumberKind::I64 => "i64",
            NumberKind::I128 => "i128",
            NumberKind::Isize => "isize",
            NumberKind::U8 => "u8",
            NumberKind::U16 => "u16",
            NumberKind::U32 => "u32",
            NumberKind::U64 => "u64",
            NumberKind::U128 => "u128",
            NumberKind::Usize => "usize",
            NumberKind::F32 => "f32",
            NumberKind::F64 => "f64",
            NumberKind::Decimal => "decimal",
            NumberKind::BigDecimal => "bigdecimal",
        }
    }
}

impl fmt::Display for NumberKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A numeric literal held as an exact, arbitrary-precision decimal.
///
/// Any literal that reads as a finite `f64` is kept digit for digit, so large
/// integers and tiny fractions survive untouched.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Number(BigDecimal);

impl Number {
    /// Parses a numeral literal.
    ///
    /// Returns `None` when the literal does not read as a finite `f64`. A
    /// literal that underflows the `f64` range to zero is stored as zero.
    pub fn parse(literal: &str) -> Option<Self> {
        if let Ok(value) = literal.parse::<i64>() {
            return Some(Number(BigDecimal::from(value)));
        }
        let float = literal.parse::<f64>().ok()?;
        if !float.is_finite() {
            return None;
        }
        match BigDecimal::from_str(literal) {
            Ok(exact) if float != 0.0 || exact.is_zero() => Some(Number(exact)),
            _ => Self::from_f64(float),
        }
    }

    /// Builds the decimal spelled by the shortest round-trip form of `value`.
    pub fn from_f64(value: f64) -> Option<Self> {
        if !value.is_finite() {
            return None;
        }
        let mut buffer = ryu::Buffer::new();
        BigDecimal::from_str(buffer.format(value)).ok().map(Number)
    }

    pub fn from_decimal(value: BigDecimal) -> Self {
        Number(value)
    }

    pub fn as_decimal(&self) -> &BigDecimal {
        &self.0
    }

    /// True when no significant fractional digit remains.
    pub fn is_integral(&self) -> bool {
        self.0.is_zero() || self.0.normalized().as_bigint_and_exponent().1 <= 0
    }

    /// Narrows to `T`, failing whenever an integral target cannot hold the
    /// value exactly.
    pub fn convert<T: FromNumber>(&self) -> Result<T, NumericError> {
        T::from_number(self)
    }

    fn integral(&self, target: NumberKind) -> Result<i128, NumericError> {
        if !self.is_integral() {
            return Err(NumericError::NotAnInteger {
                value: self.to_string(),
                target,
            });
        }
        // Integral values render as bare digits.
        self.to_string()
            .parse::<i128>()
            .map_err(|_| self.overflow(target))
    }

    fn overflow(&self, target: NumberKind) -> NumericError {
        NumericError::Overflow {
            value: self.to_string(),
            target,
        }
    }
}

impl From<i64> for Number {
    fn from(n: i64) -> Self {
        Number(BigDecimal::from(n))
    }
}

impl From<i32> for Number {
    fn from(n: i32) -> Self {
        Number(BigDecimal::from(n))
    }
}

impl From<u64> for Number {
    fn from(n: u64) -> Self {
        Number(BigDecimal::from(n))
    }
}

impl From<i128> for Number {
    fn from(n: i128) -> Self {
        Number(BigDecimal::new(BigInt::from(n), 0))
    }
}

impl From<u128> for Number {
    fn from(n: u128) -> Self {
        Number(BigDecimal::new(BigInt::from(n), 0))
    }
}

impl From<BigDecimal> for Number {
    fn from(value: BigDecimal) -> Self {
        Number(value)
    }
}

impl FromStr for Number {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Number::parse(s.trim()).ok_or_else(|| crate::Error::parse(s, "not a number"))
    }
}

/// Plain positional notation with trailing fractional zeros dropped.
impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_zero() {
            return f.write_str("0");
        }
        let (digits, scale) = self.0.normalized().into_bigint_and_exponent();
        let digits = digits.to_string();
        let (sign, magnitude) = match digits.strip_prefix('-') {
            Some(rest) => ("-", rest),
            None => ("", digits.as_str()),
        };
        f.write_str(sign)?;

        if scale <= 0 {
            f.write_str(magnitude)?;
            return write_zeros(f, scale.unsigned_abs());
        }
        let scale = scale.unsigned_abs();
        let len = magnitude.len() as u64;
        if len > scale {
            let (int, frac) = magnitude.split_at((len - scale) as usize);
            write!(f, "{int}.{frac}")
        } else {
            f.write_str("0.")?;
            write_zeros(f, scale - len)?;
            f.write_str(magnitude)
        }
    }
}

fn write_zeros(f: &mut fmt::Formatter<'_>, count: u64) -> fmt::Result {
    for _ in 0..count {
        f.write_str("0")?;
    }
    Ok(())
}

/// Conversion target of [`Number::convert`].
pub trait FromNumber: Sized {
    const KIND: NumberKind;

    fn from_number(number: &Number) -> Result<Self, NumericError>;
}

macro_rules! impl_from_number_integral {
    ($($ty:ty => $kind:ident),* $(,)?) => {
        $(
            impl FromNumber for $ty {
                const KIND: NumberKind = NumberKind::$kind;

                fn from_number(number: &Number) -> Result<Self, NumericError> {
                    let value = number.integral(Self::KIND)?;
                    <$ty>::try_from(value).map_err(|_| number.overflow(Self::KIND))
                }
            }
        )*
    };
}

impl_from_number_integral!(
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    i128 => I128,
    isize => Isize,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    u128 => U128,
    usize => Usize,
);

// Floats round from the plain rendering, which the std parser reads exactly.
impl FromNumber for f64 {
    const KIND: NumberKind = NumberKind::F64;

    fn from_number(number: &Number) -> Result<Self, NumericError> {
        number
            .to_string()
            .parse::<f64>()
            .map_err(|_| number.overflow(Self::KIND))
    }
}

impl FromNumber for f32 {
    const KIND: NumberKind = NumberKind::F32;

    fn from_number(number: &Number) -> Result<Self, NumericError> {
        number
            .to_string()
            .parse::<f32>()
            .map_err(|_| number.overflow(Self::KIND))
    }
}

/// Exact when the value fits in 96 bits with at most 28 fractional digits.
impl FromNumber for Decimal {
    const KIND: NumberKind = NumberKind::Decimal;

    fn from_number(number: &Number) -> Result<Self, NumericError> {
        Decimal::from_str_exact(&number.to_string()).map_err(|_| number.overflow(Self::KIND))
    }
}

impl FromNumber for BigDecimal {
    const KIND: NumberKind = NumberKind::BigDecimal;

    fn from_number(number: &Number) -> Result<Self, NumericError> {
        Ok(number.0.clone())
    }
}
