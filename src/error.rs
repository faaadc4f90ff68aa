//! The crate's error taxonomy.
//!
//! Follows a two-layer shape: [`Error`] is the opaque type handed to callers, wrapping a
//! private [`Reason`] so the set of error variants can grow without it being a breaking change.
//! [`Bug`] collects internal invariant violations — conditions that can only occur if a key or
//! context was corrupted, never as a consequence of caller input.

/// Any error this crate can return.
#[derive(Debug, thiserror::Error)]
#[error(transparent)]
pub struct Error(#[from] Reason);

#[derive(Debug, thiserror::Error)]
pub(crate) enum Reason {
    #[error("invalid argument")]
    InvalidArgument,
    #[error("p, q are invalid")]
    InvalidPQ,
    #[error("encryption error")]
    Encrypt,
    #[error("decryption error")]
    Decrypt,
    #[error("homomorphic operation failed: invalid inputs")]
    Ops,
    #[error("value cannot be encoded in this context")]
    Encode,
    #[error("value cannot be decoded: overflow sentinel region")]
    Decode,
    #[error("decoded value does not fit in the requested native type")]
    ArithmeticOverflow,
    #[error("operands belong to incompatible contexts")]
    ContextMismatch,
    #[error("bug occurred")]
    Bug(#[source] Bug),
}

#[derive(Debug, thiserror::Error)]
pub(crate) enum Bug {
    #[error("pow mod undefined")]
    PowModUndef,
    #[error("CRT recombination failed for a well-formed key")]
    CrtRecombination,
}

impl From<Bug> for Error {
    fn from(err: Bug) -> Self {
        Error(Reason::Bug(err))
    }
}
