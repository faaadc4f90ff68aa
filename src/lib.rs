//! Paillier additively-homomorphic encryption, with a fixed-point encoding layer that lifts
//! the scheme from raw integers modulo `N` to signed and unsigned rational numbers.
//!
//! The cryptographic core ([`PublicKey`], [`PrivateKey`]) operates on raw integers in the
//! Paillier ciphertext ring `Z/N^2 Z`. [`EncodingScheme`] maps native scalars (`i64`, `u64`,
//! `f64`, [`rust_decimal::Decimal`]) to a `(significand, exponent)` pair in that ring, and
//! [`Context`] binds a public key and an encoding scheme together, enforcing that arithmetic
//! only ever combines operands that agree on key, signedness, precision and base.
//! [`EncodedNumber`] and [`EncryptedNumber`] are the value types users actually hold and
//! compute with; their methods delegate to the owning [`Context`].

mod context;
mod encoded_number;
mod encoding;
mod encrypted_number;
pub mod error;
mod private_key;
mod public_key;
pub mod utils;

#[cfg(feature = "serde")]
mod serde;

use rug::Integer;

/// A raw Paillier ciphertext, an element of `Z/N^2 Z`.
pub type Ciphertext = Integer;
/// A raw Paillier plaintext, an element of `Z/N Z`.
pub type Plaintext = Integer;
/// A nonce used to randomise a ciphertext, an element of `Z*_N`.
pub type Nonce = Integer;

pub use self::{
    context::Context,
    encoded_number::EncodedNumber,
    encoding::EncodingScheme,
    encrypted_number::EncryptedNumber,
    error::Error,
    private_key::PrivateKey,
    public_key::PublicKey,
};
