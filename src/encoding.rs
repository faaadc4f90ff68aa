//! Mapping between native scalars and the `(significand, exponent)` pairs the Paillier
//! plaintext ring actually holds.
//!
//! One [`EncodingScheme`] struct covers both "subtypes" described by the spec this crate
//! implements: the standard binary encoding is simply the case `base == 2`, not a distinct
//! type — the bound derivation and the encode/decode/align operations are identical modulo the
//! constant, so splitting it into a trait or enum would only duplicate the arithmetic.

use rug::ops::{DivRem, Pow};
use rug::{Complete, Integer};
use rust_decimal::Decimal;

use crate::error::{Error, Reason};
use crate::public_key::PublicKey;

/// Binds a [`PublicKey`] to a signedness, precision and base, and derives the bounds that
/// every encoded significand must respect.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncodingScheme {
    public_key: PublicKey,
    signed: bool,
    precision: u32,
    base: u32,
    max_encoded: Integer,
    min_encoded: Integer,
}

impl EncodingScheme {
    /// Full precision: the encoded-value capacity equals `bitLength(N)`.
    pub fn new_full_precision(public_key: PublicKey, signed: bool, base: u32) -> Result<Self, Error> {
        let precision = public_key.bits_length();
        Self::new(public_key, signed, precision, base)
    }

    /// Constructs an encoding scheme. `precision` bounds the number of bits (not base-`base`
    /// digits) the significand capacity spans; `1 <= precision <= bitLength(N)`, and
    /// `precision >= 2` when `signed`.
    pub fn new(public_key: PublicKey, signed: bool, precision: u32, base: u32) -> Result<Self, Error> {
        if base < 2 {
            return Err(Reason::InvalidArgument.into());
        }
        let full = public_key.bits_length();
        if precision < 1 || precision > full || (signed && precision < 2) {
            return Err(Reason::InvalidArgument.into());
        }

        let n = public_key.n();
        let (max_encoded, min_encoded) = if precision == full {
            if signed {
                let max_encoded = Integer::from(n >> 1u32);
                let min_encoded = Integer::from(n - &max_encoded);
                (max_encoded, min_encoded)
            } else {
                let max_encoded = Integer::from(n - 1);
                (max_encoded, Integer::from(0))
            }
        } else {
            let base_prec = Integer::from(base).pow(precision);
            if signed {
                let max_encoded = Integer::from(&base_prec >> 1u32) - 1;
                let min_encoded = Integer::from(n - &max_encoded);
                (max_encoded, min_encoded)
            } else {
                let max_encoded = Integer::from(&base_prec - 1);
                (max_encoded, Integer::from(0))
            }
        };

        Ok(Self {
            public_key,
            signed,
            precision,
            base,
            max_encoded,
            min_encoded,
        })
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    pub fn signed(&self) -> bool {
        self.signed
    }

    pub fn precision(&self) -> u32 {
        self.precision
    }

    pub fn base(&self) -> u32 {
        self.base
    }

    pub fn max_encoded(&self) -> &Integer {
        &self.max_encoded
    }

    pub fn min_encoded(&self) -> &Integer {
        &self.min_encoded
    }

    /// The largest significand this scheme can encode.
    pub fn max_significand(&self) -> Integer {
        self.max_encoded.clone()
    }

    /// The smallest significand this scheme can encode (`0` when unsigned).
    pub fn min_significand(&self) -> Integer {
        if self.signed {
            -self.max_encoded.clone()
        } else {
            Integer::from(0)
        }
    }

    /// `base^e` for `e >= 0`.
    pub fn base_pow(&self, e: u32) -> Integer {
        Integer::from(self.base).pow(e)
    }

    /// `base^delta mod N`, for `delta >= 0`. Used to align exponents in the plaintext/ciphertext
    /// ring, where scalar multiplication is only meaningful modulo `N`.
    pub(crate) fn base_pow_mod_n(&self, delta: u64) -> Integer {
        Integer::from(self.base)
            .pow_mod(&Integer::from(delta), self.public_key.n())
            .expect("modular exponentiation with a non-negative exponent is always defined")
    }

    /// Whether `significand` lies within `[minSignificand, maxSignificand]`.
    pub fn is_valid(&self, significand: &Integer) -> bool {
        *significand >= self.min_significand() && *significand <= self.max_significand()
    }

    /// Maps a significand in `[minSignificand, maxSignificand]` to its ring representative in
    /// `[0, N)` (negative significands are stored as `N + s`).
    pub(crate) fn value_of_significand(&self, s: &Integer) -> Integer {
        if s.cmp0().is_lt() {
            (s + self.public_key.n()).complete()
        } else {
            s.clone()
        }
    }

    /// The inverse of [`EncodingScheme::value_of_significand`]: recovers the significand a
    /// ring value represents, or fails with `DecodeError` if `value` falls in the overflow
    /// sentinel region.
    pub(crate) fn significand_of_value(&self, value: &Integer) -> Result<Integer, Error> {
        if *value <= self.max_encoded {
            Ok(value.clone())
        } else if self.signed && *value >= self.min_encoded {
            Ok((value - self.public_key.n()).complete())
        } else {
            Err(Reason::Decode.into())
        }
    }

    /// Picks the exponent for an integer input: the largest `e >= 0` such that `base^e`
    /// divides `x` (trailing zero stripping in base `base`), maximising downstream headroom.
    fn strip_trailing_zeros(&self, x: &Integer) -> (Integer, i64) {
        if x.cmp0().is_eq() {
            return (Integer::from(0), 0);
        }
        let base = Integer::from(self.base);
        let mut significand = x.clone();
        let mut exponent = 0i64;
        loop {
            let (q, r) = significand.clone().div_rem(base.clone());
            if r.cmp0().is_ne() {
                break;
            }
            significand = q;
            exponent += 1;
        }
        (significand, exponent)
    }

    fn encode_significand(&self, significand: Integer, exponent: i64) -> Result<EncodedValue, Error> {
        if !self.is_valid(&significand) {
            return Err(Reason::Encode.into());
        }
        let value = self.value_of_significand(&significand);
        Ok(EncodedValue { value, exponent })
    }

    /// Encodes a signed 64-bit integer, stripping trailing zero digits in `base` to maximise
    /// headroom for later homomorphic operations.
    pub fn encode_i64(&self, x: i64) -> Result<EncodedValue, Error> {
        if !self.signed && x < 0 {
            return Err(Reason::Encode.into());
        }
        let (significand, exponent) = self.strip_trailing_zeros(&Integer::from(x));
        self.encode_significand(significand, exponent)
    }

    /// Encodes an unsigned 64-bit integer.
    pub fn encode_u64(&self, x: u64) -> Result<EncodedValue, Error> {
        let (significand, exponent) = self.strip_trailing_zeros(&Integer::from(x));
        self.encode_significand(significand, exponent)
    }

    /// Encodes an arbitrary-precision integer directly, stripping trailing zero digits.
    pub fn encode_bigint(&self, x: &Integer) -> Result<EncodedValue, Error> {
        if !self.signed && x.cmp0().is_lt() {
            return Err(Reason::Encode.into());
        }
        let (significand, exponent) = self.strip_trailing_zeros(x);
        self.encode_significand(significand, exponent)
    }

    /// Encodes a significand at an explicitly chosen exponent, without the trailing-zero
    /// search. Useful to align a constant to a particular exponent (e.g. to encode `1/b`
    /// at the exponent `divide_by_scalar` needs).
    pub fn encode_at_exponent(&self, x: &Integer, exponent: i64) -> Result<EncodedValue, Error> {
        if !self.signed && x.cmp0().is_lt() {
            return Err(Reason::Encode.into());
        }
        self.encode_significand(x.clone(), exponent)
    }

    /// Encodes a IEEE-754 double. For `base == 2` the full mantissa is preserved exactly
    /// (modulo `precision`); for other bases the same exact binary value is re-based to
    /// `base`, rounding to the nearest representable significand.
    pub fn encode_f64(&self, x: f64) -> Result<EncodedValue, Error> {
        if !x.is_finite() {
            return Err(Reason::Encode.into());
        }
        if x == 0.0 {
            return self.encode_significand(Integer::from(0), 0);
        }
        let (mantissa, bin_exponent, sign) = decode_f64_bits(x);
        let mantissa_bits = mantissa.significant_bits();
        let bin_lsb_exponent = bin_exponent - i64::from(mantissa_bits);

        let prec_exponent = if self.base == 2 {
            bin_lsb_exponent
        } else {
            floor_log_convert(bin_lsb_exponent, 2.0, self.base as f64)
        };

        let (significand, exponent) =
            round_to_exponent(&mantissa, bin_exponent, 2, sign, prec_exponent, self.base);
        self.encode_significand(significand, exponent)
    }

    /// Encodes an arbitrary-precision decimal. For `base == 10` this is exact: the decimal's
    /// own scale becomes the exponent directly. For other bases the exact decimal value is
    /// re-based to `base`, rounding to the nearest representable significand.
    pub fn encode_decimal(&self, x: Decimal) -> Result<EncodedValue, Error> {
        if !self.signed && x.is_sign_negative() {
            return Err(Reason::Encode.into());
        }
        let mantissa = Integer::from(x.mantissa());
        let scale = x.scale();

        if self.base == 10 {
            let exponent = -i64::from(scale);
            return self.encode_significand(mantissa, exponent);
        }

        // Exact value is `mantissa * 10^-scale`; re-express as a binary-style (mantissa,
        // exponent) pair with exponent measured in base 10, then reuse the generic rounding
        // routine used for doubles.
        let bin_exponent = -i64::from(scale);
        let lsb_exponent = bin_exponent; // one decimal digit per unit of scale
        let prec_exponent = floor_log_convert(lsb_exponent, 10.0, self.base as f64);
        let sign = mantissa.cmp0();
        let (significand, exponent) = round_to_exponent(
            &mantissa.clone().abs(),
            bin_exponent,
            10,
            sign,
            prec_exponent,
            self.base,
        );
        self.encode_significand(significand, exponent)
    }

    /// Decodes a significand/exponent pair to a signed 64-bit integer. Fails with
    /// `ArithmeticOverflow` if the represented value is not an exact integer, or does not fit
    /// in `i64`.
    pub fn decode_i64(&self, significand: &Integer, exponent: i64) -> Result<i64, Error> {
        let exact = self.decode_exact_integer(significand, exponent)?;
        exact.to_i64().ok_or_else(|| Reason::ArithmeticOverflow.into())
    }

    /// Decodes a significand/exponent pair to an unsigned 64-bit integer.
    pub fn decode_u64(&self, significand: &Integer, exponent: i64) -> Result<u64, Error> {
        let exact = self.decode_exact_integer(significand, exponent)?;
        exact.to_u64().ok_or_else(|| Reason::ArithmeticOverflow.into())
    }

    /// Decodes a significand/exponent pair to an arbitrary-precision integer.
    pub fn decode_bigint(&self, significand: &Integer, exponent: i64) -> Result<Integer, Error> {
        self.decode_exact_integer(significand, exponent)
    }

    fn decode_exact_integer(&self, significand: &Integer, exponent: i64) -> Result<Integer, Error> {
        if exponent >= 0 {
            Ok(significand * self.base_pow(exponent as u32))
        } else {
            let divisor = self.base_pow((-exponent) as u32);
            let (q, r) = significand.clone().div_rem(divisor);
            if r.cmp0().is_ne() {
                return Err(Reason::ArithmeticOverflow.into());
            }
            Ok(q)
        }
    }

    /// Decodes a significand/exponent pair to an `f64`, with the usual floating-point
    /// rounding and range clamping (overflow saturates to `±INFINITY`, matching `f64`'s own
    /// conversions).
    pub fn decode_f64(&self, significand: &Integer, exponent: i64) -> f64 {
        let significand_f64 = significand.to_f64();
        let base_pow = self.base_pow(exponent.unsigned_abs() as u32).to_f64();
        if exponent >= 0 {
            significand_f64 * base_pow
        } else {
            significand_f64 / base_pow
        }
    }

    /// Decodes a significand/exponent pair to a [`Decimal`]. Exact when `base == 10` and the
    /// exponent fits within `Decimal`'s supported scale (`-28..=28`); fails with
    /// `ArithmeticOverflow` otherwise.
    pub fn decode_decimal(&self, significand: &Integer, exponent: i64) -> Result<Decimal, Error> {
        if self.base == 10 {
            if exponent <= 0 && (-exponent) <= 28 {
                let scale = (-exponent) as u32;
                let m = significand.to_i128().ok_or(Reason::ArithmeticOverflow)?;
                return Ok(Decimal::from_i128_with_scale(m, scale));
            }
            if exponent > 0 {
                let shifted = Integer::from(significand * self.base_pow(exponent as u32));
                let m = shifted.to_i128().ok_or(Reason::ArithmeticOverflow)?;
                return Ok(Decimal::from_i128_with_scale(m, 0));
            }
            return Err(Reason::ArithmeticOverflow.into());
        }

        // Non-decimal base: round-trip through the same approximation used for `f64`.
        let approx = self.decode_f64(significand, exponent);
        Decimal::try_from(approx).map_err(|_| Reason::ArithmeticOverflow.into())
    }
}

/// A bare `(value, exponent)` pair prior to being wrapped in a [`crate::Context`]-bound
/// [`crate::EncodedNumber`].
#[derive(Clone, Debug)]
pub struct EncodedValue {
    pub(crate) value: Integer,
    pub(crate) exponent: i64,
}

/// Standard exact decomposition of an `f64` into `sign * mantissa * 2^exponent`, mirroring the
/// historical `std::num::Float::integer_decode` algorithm.
fn decode_f64_bits(x: f64) -> (Integer, i64, std::cmp::Ordering) {
    let bits = x.to_bits();
    let sign = if bits >> 63 == 0 {
        std::cmp::Ordering::Greater
    } else {
        std::cmp::Ordering::Less
    };
    let mut exponent: i64 = ((bits >> 52) & 0x7ff) as i64;
    let mantissa = if exponent == 0 {
        (bits & 0xf_ffff_ffff_ffff) << 1
    } else {
        (bits & 0xf_ffff_ffff_ffff) | 0x10_0000_0000_0000
    };
    exponent -= 1075;
    (Integer::from(mantissa), exponent, sign)
}

/// `floor(src_exp * log2(src_base) / log2(dst_base))`: converts an exponent measured in
/// digits of `src_base` into the equivalent (conservatively rounded towards `-inf`) exponent
/// measured in digits of `dst_base`.
fn floor_log_convert(src_exp: i64, src_base: f64, dst_base: f64) -> i64 {
    let ratio = (src_exp as f64) * src_base.log2() / dst_base.log2();
    ratio.floor() as i64
}

/// Rounds the exact value `sign * mantissa * src_base^src_exponent` to the nearest significand
/// representable as `significand * dst_base^prec_exponent`, using exact integer arithmetic
/// throughout (no intermediate floating-point rounding).
fn round_to_exponent(
    mantissa: &Integer,
    src_exponent: i64,
    src_base: u32,
    sign: std::cmp::Ordering,
    prec_exponent: i64,
    dst_base: u32,
) -> (Integer, i64) {
    // value = mantissa * src_base^src_exponent; we want round(value / dst_base^prec_exponent).
    let mut numerator = mantissa.clone();
    let mut denominator = Integer::from(1);

    let src_base_big = Integer::from(src_base);
    if src_exponent >= 0 {
        numerator *= src_base_big.pow(src_exponent as u32);
    } else {
        denominator *= src_base_big.pow((-src_exponent) as u32);
    }

    let dst_base_big = Integer::from(dst_base);
    if prec_exponent >= 0 {
        denominator *= dst_base_big.pow(prec_exponent as u32);
    } else {
        numerator *= dst_base_big.pow((-prec_exponent) as u32);
    }

    // round-half-away-from-zero of numerator/denominator, both non-negative here.
    let rounded = (numerator * 2u8 + &denominator) / (denominator * 2u8);
    let significand = if sign == std::cmp::Ordering::Less {
        -rounded
    } else {
        rounded
    };
    (significand, prec_exponent)
}
