use rand_core::{CryptoRng, RngCore};
use rug::{Complete, Integer};

use crate::error::{Bug, Error, Reason};
use crate::utils::{self, IntegerExt};
use crate::{Ciphertext, Nonce, Plaintext};

/// A Paillier public key.
///
/// Holds the modulus `N`, its square `N^2`, and the generator `g = N + 1`. Fixing the
/// generator to `N + 1` is what makes `rawEncrypt` cheap: `g^x mod N^2` collapses to
/// `1 + x*N mod N^2` instead of a full modular exponentiation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PublicKey {
    n: Integer,
    nn: Integer,
    g: Integer,
}

impl PublicKey {
    /// Constructs a public key from `N`.
    pub fn from_n(n: Integer) -> Self {
        let nn = n.clone() * &n;
        let g = Integer::from(&n + 1);
        Self { n, nn, g }
    }

    /// Returns `N`.
    pub fn n(&self) -> &Integer {
        &self.n
    }

    /// Returns `N^2`.
    pub fn nn(&self) -> &Integer {
        &self.nn
    }

    /// Returns the generator `g = N + 1`.
    pub fn g(&self) -> &Integer {
        &self.g
    }

    /// Bit length of the modulus.
    pub fn bits_length(&self) -> u32 {
        self.n.significant_bits()
    }

    /// `L(x) = (x - 1) / N`, exact integer division.
    ///
    /// Returns `None` if `x` is not `1 mod N` or is not in `Z*_{N^2}`.
    pub(crate) fn l(&self, x: &Integer) -> Option<Integer> {
        if (x % self.n()).complete() != *Integer::ONE {
            return None;
        }
        if !utils::in_mult_group(x, self.nn()) {
            return None;
        }
        Some((x - Integer::ONE).complete() / self.n())
    }

    /// `rawEncryptWithoutObfuscation(m) = 1 + m*N mod N^2`.
    ///
    /// Internal building block: the result has not been randomised and must not be disclosed
    /// until [`PublicKey::raw_obfuscate`] has been applied to it.
    pub(crate) fn raw_encrypt_without_obfuscation(&self, m: &Plaintext) -> Result<Ciphertext, Error> {
        let m = m.clone().modulo(&self.n);
        Ok((Integer::ONE + (&m * self.n()).complete()) % self.nn())
    }

    /// `rawEncrypt(m) = (1 + m*N) * r^N mod N^2` for a fresh nonce `r` sampled in `[1, N)`.
    pub fn raw_encrypt(
        &self,
        rng: &mut (impl RngCore + CryptoRng),
        m: &Plaintext,
    ) -> Result<Ciphertext, Error> {
        let r = utils::sample_in_mult_group(rng, &self.n);
        self.raw_encrypt_with_nonce(m, &r)
    }

    /// `rawEncrypt(m)` with an explicitly supplied nonce `r in Z*_N`.
    pub fn raw_encrypt_with_nonce(&self, m: &Plaintext, r: &Nonce) -> Result<Ciphertext, Error> {
        if !utils::in_mult_group(r, &self.n) {
            return Err(Reason::Encrypt.into());
        }
        let a = self.raw_encrypt_without_obfuscation(m)?;
        let b = r
            .clone()
            .pow_mod(&self.n, &self.nn)
            .map_err(|_| Bug::PowModUndef)?;
        Ok((a * b) % self.nn())
    }

    /// `rawObfuscate(c) = c * r^N mod N^2` for a fresh nonce `r` sampled in `[1, N)`.
    ///
    /// Re-randomises a ciphertext without changing the plaintext it decrypts to.
    pub fn raw_obfuscate(
        &self,
        rng: &mut (impl RngCore + CryptoRng),
        c: &Ciphertext,
    ) -> Result<Ciphertext, Error> {
        if !utils::in_mult_group(c, &self.nn) {
            return Err(Reason::Ops.into());
        }
        let r = utils::sample_in_mult_group(rng, &self.n);
        let rn = r.pow_mod(&self.n, &self.nn).map_err(|_| Bug::PowModUndef)?;
        Ok((c * rn).complete() % self.nn())
    }

    /// `rawAdd(c1, c2) = c1 * c2 mod N^2`.
    pub fn raw_add(&self, c1: &Ciphertext, c2: &Ciphertext) -> Result<Ciphertext, Error> {
        if !utils::in_mult_group(c1, &self.nn) || !utils::in_mult_group(c2, &self.nn) {
            return Err(Reason::Ops.into());
        }
        Ok((c1 * c2).complete() % self.nn())
    }

    /// `rawMultiply(c, k) = c^k mod N^2` for `k` in `[0, N)`.
    pub fn raw_multiply(&self, c: &Ciphertext, k: &Integer) -> Result<Ciphertext, Error> {
        if !utils::in_mult_group(c, &self.nn) || k.cmp0().is_lt() || k >= &self.n {
            return Err(Reason::Ops.into());
        }
        if *k == *Integer::ONE {
            return Ok(c.clone());
        }
        Ok(c.clone().pow_mod(k, &self.nn).map_err(|_| Bug::PowModUndef)?)
    }

    /// `rawAdditiveInverse(c) = c^-1 mod N^2`.
    pub fn raw_additive_inverse(&self, c: &Ciphertext) -> Result<Ciphertext, Error> {
        if !utils::in_mult_group(c, &self.nn) {
            return Err(Reason::Ops.into());
        }
        c.clone().invert(&self.nn).map_err(|_| Reason::Ops.into())
    }
}
