//! Reversible byte-string <-> integer-block codec.
//!
//! A [`Message`] is the bridge between plaintext bytes and the integer
//! domain RSA actually operates on. Encoding never loses length information
//! (even across padding-to-block-size), and `map` lets [`crate::key`] carry a
//! message through `encrypt_int`/`decrypt_int` without re-deriving the
//! bookkeeping.

use num_bigint::BigUint;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A sequence of integers packed from (or destined to become) a byte string,
/// along with the modulus they were packed against and how many bytes of
/// the *original* plaintext live in the final block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    numbers: Vec<BigUint>,
    modulus: BigUint,
    overflow: usize,
}

impl Message {
    /// The packed integer blocks, in order.
    #[must_use]
    pub fn numbers(&self) -> &[BigUint] {
        &self.numbers
    }

    /// The modulus the blocks were packed against.
    #[must_use]
    pub fn modulus(&self) -> &BigUint {
        &self.modulus
    }

    /// How many bytes of the original plaintext occupy the final block.
    #[must_use]
    pub fn overflow(&self) -> usize {
        self.overflow
    }

    /// Bytes per plaintext block for a given modulus: `ceil(log2(N)/8) - 1`,
    /// i.e. the modulus' byte width rounded up, minus one so every packed
    /// block is guaranteed to land strictly below `N`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParameter`] if `modulus <= 256` (so `bpb`
    /// would be `0`).
    pub fn bytes_per_block(modulus: &BigUint) -> Result<usize> {
        if modulus <= &BigUint::from(256_u32) {
            return Err(Error::InvalidParameter(format!(
                "modulus {modulus} must be greater than 256 to hold at least one plaintext byte per block"
            )));
        }

        let byte_width = (modulus.bits() + 7) / 8;
        Ok((byte_width - 1) as usize)
    }

    /// Packs `data` into big-endian integer blocks of `bytes_per_block(N)`
    /// bytes each (the final block is zero-padded on the right before
    /// packing if short). Empty input produces zero blocks and
    /// `overflow == bpb`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParameter`] if `modulus <= 256`.
    pub fn encode(data: &[u8], modulus: &BigUint) -> Result<Message> {
        let bpb = Message::bytes_per_block(modulus)?;

        let capacity_hint = if data.is_empty() {
            0
        } else {
            (data.len() + bpb - 1) / bpb
        };
        let mut numbers = Vec::with_capacity(capacity_hint);

        for chunk in data.chunks(bpb) {
            let mut buf = vec![0_u8; bpb];
            buf[..chunk.len()].copy_from_slice(chunk);
            numbers.push(BigUint::from_bytes_be(&buf));
        }

        let overflow = if data.is_empty() {
            bpb
        } else {
            let remainder = data.len() % bpb;
            if remainder == 0 {
                bpb
            } else {
                remainder
            }
        };

        Ok(Message {
            numbers,
            modulus: modulus.clone(),
            overflow,
        })
    }

    /// Unpacks the message's blocks back into the original bytes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DecodeRangeError`] if any block is not strictly less
    /// than `256^bpb` — this is the signal that the caller is decoding
    /// ciphertext (or otherwise out-of-range data) rather than plaintext.
    pub fn decode(&self) -> Result<Vec<u8>> {
        let bpb = Message::bytes_per_block(&self.modulus)?;
        let bound = BigUint::from(256_u32).pow(bpb as u32);

        let mut out = Vec::with_capacity(self.numbers.len() * bpb);
        let last_index = self.numbers.len().checked_sub(1);

        for (i, n) in self.numbers.iter().enumerate() {
            if n >= &bound {
                return Err(Error::DecodeRangeError {
                    value: n.to_string(),
                    bpb,
                });
            }

            let mut bytes = n.to_bytes_be();
            if bytes.len() < bpb {
                let mut padded = vec![0_u8; bpb - bytes.len()];
                padded.append(&mut bytes);
                bytes = padded;
            }

            if Some(i) == last_index {
                bytes.truncate(self.overflow);
            }

            out.extend_from_slice(&bytes);
        }

        Ok(out)
    }

    /// Returns a new message with every block transformed by `f`, keeping
    /// `modulus` and `overflow` unchanged. This is how [`crate::key`] carries
    /// a message through `encrypt_int`/`decrypt_int` in bulk; the per-block
    /// bound is *not* re-checked here, the caller is responsible for only
    /// mapping with a function that preserves the relevant invariant.
    #[must_use]
    pub fn map<F: Fn(&BigUint) -> BigUint>(&self, f: F) -> Message {
        Message {
            numbers: self.numbers.iter().map(f).collect(),
            modulus: self.modulus.clone(),
            overflow: self.overflow,
        }
    }
}
