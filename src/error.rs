//! Typed errors surfaced by the core and the CLI.
//!
//! Every fallible operation in this crate returns a [`Result<T, Error>`]
//! instead of panicking or exiting the process. Number-theoretic primitives
//! with no sensible recovery path (e.g. [`crate::kernel::mod_inv`] on
//! non-coprime inputs) return `Option` instead; see their docs.

use std::io;

/// The error type for every fallible operation in this crate.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A caller-supplied size or bound is out of range for the requested
    /// operation (e.g. `nbits` too small for keygen, a modulus `<= 256`, or a
    /// block outside `[0, N)` on a crypt call).
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// [`crate::codec::Message::decode`] encountered a block that exceeds
    /// `256^bpb` for its packing width — the caller likely tried to decode
    /// ciphertext (or other out-of-range data) as plaintext.
    #[error("block {value} exceeds the {bpb}-byte plaintext block bound")]
    DecodeRangeError { value: String, bpb: usize },

    /// Input bytes did not parse as a [`crate::key::Key`].
    #[error("failed to parse key data: {0}")]
    KeyLoadError(String),

    /// A ciphertext package's embedded public key does not match the
    /// private key being used to decrypt it.
    #[error("embedded key does not match the key provided for decryption")]
    WrongKeyForCiphertext,

    /// The supplied key cannot perform the requested operation (e.g.
    /// decrypting with a public key, or public-extracting from a key that is
    /// already public).
    #[error("key is not capable of {0}")]
    KeyLacksCapability(&'static str),

    /// Filesystem I/O failure while the CLI was reading or writing a key,
    /// plaintext, or ciphertext file.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
