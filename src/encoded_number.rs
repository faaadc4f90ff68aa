//! [`EncodedNumber`]: a `(context, value, exponent)` triple — the plaintext-ring
//! representation of a scalar, prior to encryption.

use rug::Integer;
use rust_decimal::Decimal;

use crate::context::Context;
use crate::error::Error;

/// A value encoded into the Paillier plaintext ring, together with the [`Context`] (and hence
/// the [`crate::EncodingScheme`]) that produced it.
///
/// `value` is always in `[0, N)`; the represented rational is
/// `decode(value) * base^exponent`, where `decode(value) = value` if `value <= maxEncoded`,
/// else (signed schemes only) `value - N`.
#[derive(Clone, Debug)]
pub struct EncodedNumber {
    context: Context,
    value: Integer,
    exponent: i64,
}

impl PartialEq for EncodedNumber {
    fn eq(&self, other: &Self) -> bool {
        self.context == other.context && self.value == other.value && self.exponent == other.exponent
    }
}

impl EncodedNumber {
    pub(crate) fn from_parts(context: Context, value: Integer, exponent: i64) -> Self {
        Self {
            context,
            value,
            exponent,
        }
    }

    pub fn context(&self) -> &Context {
        &self.context
    }

    /// The raw ring representative in `[0, N)`. Use [`EncodedNumber::decode_bigint`] and
    /// friends to recover the represented scalar.
    pub fn value(&self) -> &Integer {
        &self.value
    }

    pub fn exponent(&self) -> i64 {
        self.exponent
    }

    /// Whether the underlying significand lies within `[minSignificand, maxSignificand]`.
    ///
    /// After a homomorphic operation in a partial-precision context, a result can land outside
    /// this range without raising — the overflow only becomes visible at decode time.
    pub fn is_valid(&self) -> bool {
        match self.context.encoding_scheme().significand_of_value(&self.value) {
            Ok(s) => self.context.encoding_scheme().is_valid(&s),
            Err(_) => false,
        }
    }

    pub fn decode_i64(&self) -> Result<i64, Error> {
        let s = self.context.encoding_scheme().significand_of_value(&self.value)?;
        self.context.encoding_scheme().decode_i64(&s, self.exponent)
    }

    pub fn decode_u64(&self) -> Result<u64, Error> {
        let s = self.context.encoding_scheme().significand_of_value(&self.value)?;
        self.context.encoding_scheme().decode_u64(&s, self.exponent)
    }

    pub fn decode_bigint(&self) -> Result<Integer, Error> {
        let s = self.context.encoding_scheme().significand_of_value(&self.value)?;
        self.context.encoding_scheme().decode_bigint(&s, self.exponent)
    }

    pub fn decode_f64(&self) -> Result<f64, Error> {
        let s = self.context.encoding_scheme().significand_of_value(&self.value)?;
        Ok(self.context.encoding_scheme().decode_f64(&s, self.exponent))
    }

    pub fn decode_decimal(&self) -> Result<Decimal, Error> {
        let s = self.context.encoding_scheme().significand_of_value(&self.value)?;
        self.context.encoding_scheme().decode_decimal(&s, self.exponent)
    }

    /// `self + rhs`, aligning exponents to the smaller of the two.
    pub fn add(&self, rhs: &EncodedNumber) -> Result<EncodedNumber, Error> {
        Context::check_same_context(&self.context, &rhs.context)?;
        let (value, exponent) = self
            .context
            .add_encoded(&self.value, self.exponent, &rhs.value, rhs.exponent);
        Ok(EncodedNumber::from_parts(self.context.clone(), value, exponent))
    }

    /// `self - rhs`, defined as `self + (-rhs)`.
    pub fn sub(&self, rhs: &EncodedNumber) -> Result<EncodedNumber, Error> {
        Context::check_same_context(&self.context, &rhs.context)?;
        let (value, exponent) = self
            .context
            .sub_encoded(&self.value, self.exponent, &rhs.value, rhs.exponent);
        Ok(EncodedNumber::from_parts(self.context.clone(), value, exponent))
    }

    /// `self * rhs`; exponents add.
    pub fn mul(&self, rhs: &EncodedNumber) -> Result<EncodedNumber, Error> {
        Context::check_same_context(&self.context, &rhs.context)?;
        let (value, exponent) = self
            .context
            .mul_encoded(&self.value, self.exponent, &rhs.value, rhs.exponent);
        Ok(EncodedNumber::from_parts(self.context.clone(), value, exponent))
    }

    /// The additive inverse: `value = 0` is unchanged, otherwise `N - value`; exponent
    /// preserved.
    pub fn additive_inverse(&self) -> EncodedNumber {
        let value = self.context.neg_encoded(&self.value);
        EncodedNumber::from_parts(self.context.clone(), value, self.exponent)
    }

    /// `self / b`, implemented as multiplication by `b`'s encoded reciprocal (no general
    /// homomorphic division is provided).
    pub fn div(&self, b: &EncodedNumber) -> Result<EncodedNumber, Error> {
        let recip = self.context.encode_reciprocal(b)?;
        self.mul(&recip)
    }
}

impl std::ops::Add for &EncodedNumber {
    type Output = Result<EncodedNumber, Error>;
    fn add(self, rhs: &EncodedNumber) -> Self::Output {
        EncodedNumber::add(self, rhs)
    }
}

impl std::ops::Sub for &EncodedNumber {
    type Output = Result<EncodedNumber, Error>;
    fn sub(self, rhs: &EncodedNumber) -> Self::Output {
        EncodedNumber::sub(self, rhs)
    }
}

impl std::ops::Mul for &EncodedNumber {
    type Output = Result<EncodedNumber, Error>;
    fn mul(self, rhs: &EncodedNumber) -> Self::Output {
        EncodedNumber::mul(self, rhs)
    }
}

impl std::ops::Neg for &EncodedNumber {
    type Output = EncodedNumber;
    fn neg(self) -> Self::Output {
        EncodedNumber::additive_inverse(self)
    }
}
