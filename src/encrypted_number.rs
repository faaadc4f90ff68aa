//! [`EncryptedNumber`]: a `(context, ciphertext, exponent, isSafe)` tuple — an
//! [`crate::EncodedNumber`] under encryption, plus the bookkeeping bit that tracks whether the
//! ciphertext has been freshly randomised since it was last exposed.

use rand_core::{CryptoRng, RngCore};

use crate::context::Context;
use crate::error::Error;
use crate::{Ciphertext, EncodedNumber};

/// An encrypted scalar: `ciphertext` decrypts (under this `context`'s private key) to the
/// ring value `decode(value) * base^exponent` described by [`EncodedNumber`].
///
/// `is_safe` tracks whether `ciphertext` has been randomised since it was last disclosed.
/// `encrypt` and `obfuscate` produce `is_safe = true`; every operation that combines
/// ciphertexts (`add`, `sub`, `additive_inverse`, exponent alignment, scalar multiplication)
/// produces `is_safe = false`. Call [`EncryptedNumber::obfuscate`] before disclosing a
/// ciphertext that isn't currently safe.
#[derive(Clone, Debug)]
pub struct EncryptedNumber {
    context: Context,
    ciphertext: Ciphertext,
    exponent: i64,
    is_safe: bool,
}

impl EncryptedNumber {
    pub(crate) fn from_parts(
        context: Context,
        ciphertext: Ciphertext,
        exponent: i64,
        is_safe: bool,
    ) -> Self {
        Self {
            context,
            ciphertext,
            exponent,
            is_safe,
        }
    }

    pub fn context(&self) -> &Context {
        &self.context
    }

    pub fn exponent(&self) -> i64 {
        self.exponent
    }

    pub fn is_safe(&self) -> bool {
        self.is_safe
    }

    /// Returns the raw ciphertext, obfuscating it first if it is not already safe to
    /// disclose.
    pub fn ciphertext(
        &self,
        rng: &mut (impl RngCore + CryptoRng),
    ) -> Result<Ciphertext, Error> {
        if self.is_safe {
            Ok(self.ciphertext.clone())
        } else {
            Ok(self.obfuscate(rng)?.ciphertext)
        }
    }

    /// Returns the raw ciphertext without checking or enforcing `is_safe`. Prefer
    /// [`EncryptedNumber::ciphertext`] unless you have already reasoned about safety
    /// yourself (e.g. you are about to combine it with another ciphertext, rather than
    /// disclose it).
    pub fn ciphertext_unchecked(&self) -> &Ciphertext {
        &self.ciphertext
    }

    /// Decrypts under `private_key` and returns the resulting [`EncodedNumber`]. The recovered
    /// ring value is wrapped as-is: a homomorphic result that has drifted outside the valid
    /// significand range is still returned here, and only rejected once a `decode_*` call is
    /// made on it.
    pub fn decrypt(&self, private_key: &crate::PrivateKey) -> Result<EncodedNumber, Error> {
        let m = private_key.raw_decrypt(&self.ciphertext)?;
        Ok(self.context.wrap_ring_value(m, self.exponent))
    }

    /// `self + rhs`, aligning exponents to the smaller of the two. Result `is_safe = false`.
    pub fn add(&self, rhs: &EncryptedNumber) -> Result<EncryptedNumber, Error> {
        Context::check_same_context(&self.context, &rhs.context)?;
        let (c, exponent) =
            self.context
                .add_encrypted(&self.ciphertext, self.exponent, &rhs.ciphertext, rhs.exponent)?;
        Ok(EncryptedNumber::from_parts(self.context.clone(), c, exponent, false))
    }

    /// `self - rhs`, defined as `self + (-rhs)`. Result `is_safe = false`.
    pub fn sub(&self, rhs: &EncryptedNumber) -> Result<EncryptedNumber, Error> {
        Context::check_same_context(&self.context, &rhs.context)?;
        let (c, exponent) =
            self.context
                .sub_encrypted(&self.ciphertext, self.exponent, &rhs.ciphertext, rhs.exponent)?;
        Ok(EncryptedNumber::from_parts(self.context.clone(), c, exponent, false))
    }

    /// `self + rhs` with `rhs` a plaintext [`EncodedNumber`] — encrypts `rhs` under a fresh
    /// nonce and then adds.
    pub fn add_encoded(
        &self,
        rng: &mut (impl RngCore + CryptoRng),
        rhs: &EncodedNumber,
    ) -> Result<EncryptedNumber, Error> {
        let rhs_enc = self.context.encrypt(rng, rhs)?;
        self.add(&rhs_enc)
    }

    /// Scalar-multiplies `self` by the encoded value `rhs`. Exponents add. Result
    /// `is_safe = false`.
    pub fn mul_encoded(&self, rhs: &EncodedNumber) -> Result<EncryptedNumber, Error> {
        Context::check_same_context(&self.context, rhs.context())?;
        let (c, exponent) = self.context.mul_encrypted_by_encoded(
            &self.ciphertext,
            self.exponent,
            rhs.value(),
            rhs.exponent(),
        )?;
        Ok(EncryptedNumber::from_parts(self.context.clone(), c, exponent, false))
    }

    /// `self / b` for a plaintext scalar `b`, implemented as multiplication by `b`'s encoded
    /// reciprocal. No general homomorphic division is provided.
    pub fn divide_by_scalar(&self, b: &EncodedNumber) -> Result<EncryptedNumber, Error> {
        let recip = self.context.encode_reciprocal(b)?;
        self.mul_encoded(&recip)
    }

    /// The additive inverse (modular inverse of the ciphertext modulo `N^2`). Exponent
    /// preserved. Result `is_safe = false` — per this spec, additive inverse does *not*
    /// auto-obfuscate; call [`EncryptedNumber::obfuscate`] before disclosing it.
    pub fn additive_inverse(&self) -> Result<EncryptedNumber, Error> {
        let c = self.context.neg_encrypted(&self.ciphertext)?;
        Ok(EncryptedNumber::from_parts(self.context.clone(), c, self.exponent, false))
    }

    /// Re-randomises the ciphertext. Result `is_safe = true`.
    pub fn obfuscate(
        &self,
        rng: &mut (impl RngCore + CryptoRng),
    ) -> Result<EncryptedNumber, Error> {
        let c = self.context.obfuscate(rng, &self.ciphertext)?;
        Ok(EncryptedNumber::from_parts(self.context.clone(), c, self.exponent, true))
    }
}

impl std::ops::Add for &EncryptedNumber {
    type Output = Result<EncryptedNumber, Error>;
    fn add(self, rhs: &EncryptedNumber) -> Self::Output {
        EncryptedNumber::add(self, rhs)
    }
}

impl std::ops::Sub for &EncryptedNumber {
    type Output = Result<EncryptedNumber, Error>;
    fn sub(self, rhs: &EncryptedNumber) -> Self::Output {
        EncryptedNumber::sub(self, rhs)
    }
}

impl std::ops::Neg for &EncryptedNumber {
    type Output = Result<EncryptedNumber, Error>;
    fn neg(self) -> Self::Output {
        EncryptedNumber::additive_inverse(self)
    }
}
