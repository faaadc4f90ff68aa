use rug::Integer;

use crate::{EncodedNumber, EncryptedNumber, PrivateKey, PublicKey};

impl serde::Serialize for PublicKey {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.n().serialize(serializer)
    }
}

impl<'de> serde::Deserialize<'de> for PublicKey {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let n = Integer::deserialize(deserializer)?;
        Ok(PublicKey::from_n(n))
    }
}

impl serde::Serialize for PrivateKey {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let pq = [self.p(), self.q()];
        pq.serialize(serializer)
    }
}

impl<'de> serde::Deserialize<'de> for PrivateKey {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let [p, q] = <[Integer; 2]>::deserialize(deserializer)?;
        PrivateKey::from_primes(p, q).map_err(|_| <D::Error as serde::de::Error>::custom("invalid paillier key"))
    }
}

/// `EncodedNumber` and `EncryptedNumber` carry a `Context` (a public key plus an encoding
/// scheme) that is normally shared out-of-band rather than repeated on every value, so only
/// their `(value, exponent)` / `(ciphertext, exponent, isSafe)` payload is `Serialize`d here.
/// Reconstruct the value on the receiving end with [`crate::Context::encoded_from_parts`] /
/// [`crate::Context::encrypted_from_parts`] once the bare tuple has been deserialized.
impl serde::Serialize for EncodedNumber {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        (self.value(), self.exponent()).serialize(serializer)
    }
}

/// Any API that exports a ciphertext must require `isSafe == true` and obfuscate otherwise;
/// `Serialize` has no RNG to obfuscate with, so it refuses instead of silently releasing a
/// ciphertext that hasn't been re-randomised since a prior homomorphic op. Call
/// [`EncryptedNumber::obfuscate`] first if `is_safe()` is false.
impl serde::Serialize for EncryptedNumber {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        if !self.is_safe() {
            return Err(<S::Error as serde::ser::Error>::custom(
                "cannot serialize an EncryptedNumber that is not safe to disclose; call obfuscate() first",
            ));
        }
        (self.ciphertext_unchecked(), self.exponent(), self.is_safe()).serialize(serializer)
    }
}
