//! A didactic, from-scratch implementation of textbook RSA: key generation,
//! encryption, decryption, and public-key extraction.
//!
//! This is **not** a crypto library _(don't roll your own crypto!)_ — there
//! is no padding scheme, no constant-time arithmetic, no secure randomness
//! requirement, and no protection against the many attacks textbook RSA is
//! known to be vulnerable to. It exists to make the number theory underneath
//! RSA visible and testable, not to protect anything.
//!
//! [`kernel`] holds the hand-rolled number-theoretic primitives (extended
//! Euclid, modular multiplication/exponentiation, Miller-Rabin primality).
//! [`codec`] bridges byte strings and the integer blocks those primitives
//! operate on. [`key`] ties both together into [`key::PrivateKey`] and
//! [`key::PublicKey`].
//!
//! See the `textbook-rsa` binary (`src/bin/textbook-rsa.rs`) for a CLI built
//! on top of this library.

#![deny(clippy::correctness)]
#![warn(clippy::style)]
#![warn(clippy::complexity)]
#![warn(clippy::perf)]
#![warn(clippy::pedantic)]
#![allow(clippy::unreadable_literal)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::module_name_repetitions)]

pub mod codec;
pub mod error;
pub mod kernel;
pub mod key;
