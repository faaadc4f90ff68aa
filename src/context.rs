//! Binds a public key to an [`EncodingScheme`] and hosts the homomorphic algebra on the
//! `(value, exponent)`/`(ciphertext, exponent)` pairs that back [`crate::EncodedNumber`] and
//! [`crate::EncryptedNumber`].

use rand_core::{CryptoRng, RngCore};
use rug::{Complete, Integer};
use rust_decimal::Decimal;

use crate::encoding::EncodedValue;
use crate::error::{Error, Reason};
use crate::public_key::PublicKey;
use crate::{Ciphertext, EncodedNumber, EncodingScheme, EncryptedNumber};

/// The (publicKey, signed, precision, base) tuple every arithmetic operation is checked
/// against. Two contexts are compatible iff they are equal.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Context {
    encoding_scheme: EncodingScheme,
}

impl Context {
    /// Builds a context from an explicit encoding scheme.
    pub fn new(public_key: PublicKey, signed: bool, precision: u32, base: u32) -> Result<Self, Error> {
        Ok(Self {
            encoding_scheme: EncodingScheme::new(public_key, signed, precision, base)?,
        })
    }

    /// The interoperability default from the spec this crate implements: full precision,
    /// base 16. Callers choose signedness and supply an already-generated key (typically
    /// 2048 bits, per that same default).
    pub fn with_default_encoding(public_key: PublicKey, signed: bool) -> Result<Self, Error> {
        Ok(Self {
            encoding_scheme: EncodingScheme::new_full_precision(public_key, signed, 16)?,
        })
    }

    pub fn public_key(&self) -> &PublicKey {
        self.encoding_scheme.public_key()
    }

    pub fn encoding_scheme(&self) -> &EncodingScheme {
        &self.encoding_scheme
    }

    /// Fails with [`Reason::ContextMismatch`] unless `a` and `b` belong to equal contexts.
    pub(crate) fn check_same_context(a: &Context, b: &Context) -> Result<(), Error> {
        if a != b {
            return Err(Reason::ContextMismatch.into());
        }
        Ok(())
    }

    // ---- encoding ----

    pub fn encode_i64(&self, x: i64) -> Result<EncodedNumber, Error> {
        self.wrap(self.encoding_scheme.encode_i64(x)?)
    }

    pub fn encode_u64(&self, x: u64) -> Result<EncodedNumber, Error> {
        self.wrap(self.encoding_scheme.encode_u64(x)?)
    }

    pub fn encode_bigint(&self, x: &Integer) -> Result<EncodedNumber, Error> {
        self.wrap(self.encoding_scheme.encode_bigint(x)?)
    }

    pub fn encode_f64(&self, x: f64) -> Result<EncodedNumber, Error> {
        self.wrap(self.encoding_scheme.encode_f64(x)?)
    }

    pub fn encode_decimal(&self, x: Decimal) -> Result<EncodedNumber, Error> {
        self.wrap(self.encoding_scheme.encode_decimal(x)?)
    }

    /// Encodes `x` at a caller-chosen exponent rather than the one `encode_bigint` would pick
    /// via trailing-zero stripping. Useful to force two operands onto a common exponent before
    /// combining them, or to re-encode a constant at the exponent a later multiplication needs.
    pub fn encode_at_exponent(&self, x: &Integer, exponent: i64) -> Result<EncodedNumber, Error> {
        self.wrap(self.encoding_scheme.encode_at_exponent(x, exponent)?)
    }

    /// Wraps an already-reduced ring value (`[0, N)`) at `exponent` without re-validating it
    /// as a significand. Used for decryption results: a homomorphic operation on ciphertexts
    /// in a partial-precision context can legitimately overflow into the sentinel region, and
    /// that must surface as a `DecodeError` from the caller's `decode_*` call, not as an
    /// encode-time rejection here.
    pub(crate) fn wrap_ring_value(&self, value: Integer, exponent: i64) -> EncodedNumber {
        self.encoded_from_parts(value, exponent)
    }

    /// Reattaches this context to a bare `(value, exponent)` pair, e.g. one just deserialized
    /// over the wire. Does not validate `value` as a significand — see
    /// [`EncodedNumber::is_valid`].
    pub fn encoded_from_parts(&self, value: Integer, exponent: i64) -> EncodedNumber {
        EncodedNumber::from_parts(self.clone(), value, exponent)
    }

    /// Reattaches this context to a bare `(ciphertext, exponent, isSafe)` triple, e.g. one just
    /// deserialized over the wire.
    pub fn encrypted_from_parts(
        &self,
        ciphertext: Ciphertext,
        exponent: i64,
        is_safe: bool,
    ) -> EncryptedNumber {
        EncryptedNumber::from_parts(self.clone(), ciphertext, exponent, is_safe)
    }

    fn wrap(&self, v: EncodedValue) -> Result<EncodedNumber, Error> {
        Ok(EncodedNumber::from_parts(self.clone(), v.value, v.exponent))
    }

    // ---- encrypting ----

    /// Encrypts an encoded number under this context's public key.
    pub fn encrypt(
        &self,
        rng: &mut (impl RngCore + CryptoRng),
        x: &EncodedNumber,
    ) -> Result<EncryptedNumber, Error> {
        Context::check_same_context(self, x.context())?;
        let c = self.public_key().raw_encrypt(rng, x.value())?;
        Ok(EncryptedNumber::from_parts(self.clone(), c, x.exponent(), true))
    }

    // ---- exponent alignment ----

    /// Rescales `value` (an element of `Z_N`, at exponent `from_exp`) down to `to_exp`.
    /// Requires `from_exp >= to_exp`.
    pub(crate) fn align_value(&self, value: &Integer, from_exp: i64, to_exp: i64) -> Integer {
        debug_assert!(from_exp >= to_exp);
        let delta = (from_exp - to_exp) as u64;
        if delta == 0 {
            return value.clone();
        }
        let scale = self.encoding_scheme.base_pow_mod_n(delta);
        (value * scale).complete() % self.public_key().n()
    }

    /// Rescales ciphertext `c` (at exponent `from_exp`) down to `to_exp` by raising it to the
    /// power `base^delta mod N`.
    pub(crate) fn align_ciphertext(
        &self,
        c: &Ciphertext,
        from_exp: i64,
        to_exp: i64,
    ) -> Result<Ciphertext, Error> {
        debug_assert!(from_exp >= to_exp);
        let delta = (from_exp - to_exp) as u64;
        if delta == 0 {
            return Ok(c.clone());
        }
        let scale = self.encoding_scheme.base_pow_mod_n(delta);
        self.public_key().raw_multiply(c, &scale)
    }

    // ---- encoded-value algebra ----

    pub(crate) fn add_encoded(
        &self,
        v1: &Integer,
        e1: i64,
        v2: &Integer,
        e2: i64,
    ) -> (Integer, i64) {
        let (a, b, exponent) = if e1 <= e2 {
            (v1.clone(), self.align_value(v2, e2, e1), e1)
        } else {
            (self.align_value(v1, e1, e2), v2.clone(), e2)
        };
        let sum = (a + b).complete() % self.public_key().n();
        (sum, exponent)
    }

    pub(crate) fn neg_encoded(&self, value: &Integer) -> Integer {
        if value.cmp0().is_eq() {
            value.clone()
        } else {
            (self.public_key().n() - value).complete()
        }
    }

    pub(crate) fn sub_encoded(
        &self,
        v1: &Integer,
        e1: i64,
        v2: &Integer,
        e2: i64,
    ) -> (Integer, i64) {
        self.add_encoded(v1, e1, &self.neg_encoded(v2), e2)
    }

    pub(crate) fn mul_encoded(
        &self,
        v1: &Integer,
        e1: i64,
        v2: &Integer,
        e2: i64,
    ) -> (Integer, i64) {
        let product = (v1 * v2).complete() % self.public_key().n();
        (product, e1 + e2)
    }

    /// `1/b` encoded at an exponent chosen so the reciprocal is exact enough to respect this
    /// context's precision; used to realise `divideByScalar` as multiplication by an encoded
    /// reciprocal (spec leaves general homomorphic division out of scope).
    pub(crate) fn encode_reciprocal(&self, b: &EncodedNumber) -> Result<EncodedNumber, Error> {
        Context::check_same_context(self, b.context())?;
        let significand = self.encoding_scheme.significand_of_value(b.value())?;
        let decoded = self.encoding_scheme.decode_f64(&significand, b.exponent());
        if decoded == 0.0 || !decoded.is_finite() {
            return Err(Reason::Encode.into());
        }
        self.encode_f64(1.0 / decoded)
    }

    // ---- ciphertext algebra ----

    pub(crate) fn add_encrypted(
        &self,
        c1: &Ciphertext,
        e1: i64,
        c2: &Ciphertext,
        e2: i64,
    ) -> Result<(Ciphertext, i64), Error> {
        let (a, b, exponent) = if e1 <= e2 {
            (c1.clone(), self.align_ciphertext(c2, e2, e1)?, e1)
        } else {
            (self.align_ciphertext(c1, e1, e2)?, c2.clone(), e2)
        };
        let sum = self.public_key().raw_add(&a, &b)?;
        Ok((sum, exponent))
    }

    pub(crate) fn neg_encrypted(&self, c: &Ciphertext) -> Result<Ciphertext, Error> {
        self.public_key().raw_additive_inverse(c)
    }

    pub(crate) fn sub_encrypted(
        &self,
        c1: &Ciphertext,
        e1: i64,
        c2: &Ciphertext,
        e2: i64,
    ) -> Result<(Ciphertext, i64), Error> {
        let neg = self.neg_encrypted(c2)?;
        self.add_encrypted(c1, e1, &neg, e2)
    }

    /// Scalar-multiplies ciphertext `c` (at exponent `e_c`) by encoded value `(v, e_v)`.
    ///
    /// `rawMultiply` expects a non-negative scalar; when `v` is the ring representative of a
    /// negative significand (i.e. `v > maxEncoded`), it is already stored as `N + significand`
    /// and can be passed to `rawMultiply` unchanged — the ring arithmetic handles the sign.
    pub(crate) fn mul_encrypted_by_encoded(
        &self,
        c: &Ciphertext,
        e_c: i64,
        v: &Integer,
        e_v: i64,
    ) -> Result<(Ciphertext, i64), Error> {
        let product = self.public_key().raw_multiply(c, v)?;
        Ok((product, e_c + e_v))
    }

    pub(crate) fn obfuscate(
        &self,
        rng: &mut (impl RngCore + CryptoRng),
        c: &Ciphertext,
    ) -> Result<Ciphertext, Error> {
        self.public_key().raw_obfuscate(rng, c)
    }
}
