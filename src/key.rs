//! RSA key types: [`PrivateKey`], [`PublicKey`], and the capability-tagged
//! [`Key`] wrapper used wherever either shape must be accepted (chiefly the
//! CLI).

use num_bigint::BigUint;
use rand::{CryptoRng, Rng};
use serde::{Deserialize, Serialize};

use crate::codec::Message;
use crate::error::{Error, Result};
use crate::kernel::{mod_exp, mod_inv, random_prime};

/// An RSA private key: `(N, e, d)` plus the `p`, `q`, `phi` it was derived
/// from, retained for didactic inspection (they play no part in equality).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrivateKey {
    n: BigUint,
    e: BigUint,
    d: BigUint,
    p: BigUint,
    q: BigUint,
    phi: BigUint,
}

impl PartialEq for PrivateKey {
    fn eq(&self, other: &Self) -> bool {
        self.n == other.n && self.e == other.e && self.d == other.d
    }
}
impl Eq for PrivateKey {}

impl PrivateKey {
    /// Generates a new private key from two distinct `nbits`-bit primes,
    /// searching for the smallest valid public exponent `e >= 2`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParameter`] if `nbits <= 2`.
    pub fn generate<R: Rng + CryptoRng>(nbits: u32, rng: &mut R) -> Result<PrivateKey> {
        if nbits <= 2 {
            return Err(Error::InvalidParameter(format!(
                "nbits must be > 2 for key generation, got {nbits}"
            )));
        }

        let p = random_prime(nbits, rng);
        let mut q = random_prime(nbits, rng);
        while q == p {
            q = random_prime(nbits, rng);
        }

        Self::from_primes(p, q)
    }

    /// As [`generate`](Self::generate), but searching for the smallest valid
    /// `e` starting from a caller-supplied candidate instead of `2`. Useful
    /// for exploring the (insecure, but commonly cited) `e = 65537`
    /// convention while still honoring the coprimality and `d != e`
    /// invariants.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParameter`] if `nbits <= 2`.
    pub fn generate_with_exponent<R: Rng + CryptoRng>(
        nbits: u32,
        starting_e: BigUint,
        rng: &mut R,
    ) -> Result<PrivateKey> {
        if nbits <= 2 {
            return Err(Error::InvalidParameter(format!(
                "nbits must be > 2 for key generation, got {nbits}"
            )));
        }

        let p = random_prime(nbits, rng);
        let mut q = random_prime(nbits, rng);
        while q == p {
            q = random_prime(nbits, rng);
        }

        Self::from_primes_with_exponent(p, q, starting_e)
    }

    /// Builds a private key from two already-chosen primes, searching for
    /// the smallest valid `e` starting at `2`. Exposed mainly for tests that
    /// want to exercise key construction on small, fixed primes without
    /// paying for prime generation.
    ///
    /// # Errors
    ///
    /// Propagates whatever [`from_primes_with_exponent`](Self::from_primes_with_exponent) returns.
    pub fn from_primes(p: BigUint, q: BigUint) -> Result<PrivateKey> {
        Self::from_primes_with_exponent(p, q, BigUint::from(2_u32))
    }

    /// Builds a private key from two already-chosen primes and a starting
    /// candidate for `e`, incrementing until `mod_inv(e, phi)` exists and
    /// yields `d != e`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParameter`] if `p == q`.
    pub fn from_primes_with_exponent(
        p: BigUint,
        q: BigUint,
        starting_e: BigUint,
    ) -> Result<PrivateKey> {
        if p == q {
            return Err(Error::InvalidParameter(
                "p and q must be distinct primes".to_string(),
            ));
        }

        let phi = (&p - BigUint::from(1_u32)) * (&q - BigUint::from(1_u32));

        let mut e = starting_e;
        let d = loop {
            if let Some(d) = mod_inv(&e, &phi) {
                if d != e {
                    break d;
                }
            }
            e += 1_u32;
        };

        let n = &p * &q;

        Ok(PrivateKey { n, e, d, p, q, phi })
    }

    /// The public modulus `N`.
    #[must_use]
    pub fn n(&self) -> &BigUint {
        &self.n
    }

    /// The public exponent `e`.
    #[must_use]
    pub fn e(&self) -> &BigUint {
        &self.e
    }

    /// The private exponent `d`.
    #[must_use]
    pub fn d(&self) -> &BigUint {
        &self.d
    }

    /// The first prime factor, retained for didactic inspection.
    #[must_use]
    pub fn p(&self) -> &BigUint {
        &self.p
    }

    /// The second prime factor, retained for didactic inspection.
    #[must_use]
    pub fn q(&self) -> &BigUint {
        &self.q
    }

    /// `(p - 1)(q - 1)`, retained for didactic inspection.
    #[must_use]
    pub fn phi(&self) -> &BigUint {
        &self.phi
    }

    /// Derives this key's public view.
    #[must_use]
    pub fn get_public(&self) -> PublicKey {
        PublicKey {
            n: self.n.clone(),
            e: self.e.clone(),
        }
    }

    /// Decrypts a single integer block: `c^d mod N`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParameter`] if `c >= N`.
    pub fn decrypt_int(&self, c: &BigUint) -> Result<BigUint> {
        if c >= &self.n {
            return Err(Error::InvalidParameter(format!(
                "ciphertext block {c} is not less than the modulus"
            )));
        }

        Ok(mod_exp(c, &self.d, &self.n))
    }

    /// Decrypts every block of `msg` against this key. No padding, no
    /// chaining, no integrity check: each block is transformed
    /// independently, which is deliberately insecure for anything but
    /// teaching.
    #[must_use]
    pub fn decrypt(&self, msg: &Message) -> Message {
        msg.map(|c| mod_exp(c, &self.d, &self.n))
    }
}

/// An RSA public key: `(N, e)`, with no knowledge of `p`, `q`, `d`, or `phi`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicKey {
    n: BigUint,
    e: BigUint,
}

impl PublicKey {
    /// The public modulus `N`.
    #[must_use]
    pub fn n(&self) -> &BigUint {
        &self.n
    }

    /// The public exponent `e`.
    #[must_use]
    pub fn e(&self) -> &BigUint {
        &self.e
    }

    /// Encrypts a single integer block: `m^e mod N`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParameter`] if `m >= N`.
    pub fn encrypt_int(&self, m: &BigUint) -> Result<BigUint> {
        if m >= &self.n {
            return Err(Error::InvalidParameter(format!(
                "plaintext block {m} is not less than the modulus"
            )));
        }

        Ok(mod_exp(m, &self.e, &self.n))
    }

    /// Encrypts every block of `msg` against this key. See
    /// [`PrivateKey::decrypt`] for why this is deliberately ECB-equivalent
    /// and insecure for real use.
    #[must_use]
    pub fn encrypt(&self, msg: &Message) -> Message {
        msg.map(|m| mod_exp(m, &self.e, &self.n))
    }
}

/// A key of either shape, tagged so callers (chiefly the CLI) can accept
/// either and dispatch on capability instead of probing for attributes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "key")]
pub enum Key {
    Private(PrivateKey),
    Public(PublicKey),
}

impl Key {
    /// Every key can encrypt (both variants hold `e`).
    #[must_use]
    pub fn can_encrypt(&self) -> bool {
        true
    }

    /// Only a private key can decrypt.
    #[must_use]
    pub fn can_decrypt(&self) -> bool {
        matches!(self, Key::Private(_))
    }

    /// `true` if this is already a bare public key (i.e. public-extraction
    /// would be a no-op).
    #[must_use]
    pub fn is_public(&self) -> bool {
        matches!(self, Key::Public(_))
    }

    /// Projects either variant to its public view.
    #[must_use]
    pub fn as_public(&self) -> PublicKey {
        match self {
            Key::Private(k) => k.get_public(),
            Key::Public(k) => k.clone(),
        }
    }

    /// Returns the underlying private key, if this is one.
    ///
    /// # Errors
    ///
    /// Returns [`Error::KeyLacksCapability`] for a public key.
    pub fn as_private(&self) -> Result<&PrivateKey> {
        match self {
            Key::Private(k) => Ok(k),
            Key::Public(_) => Err(Error::KeyLacksCapability("decryption")),
        }
    }
}

impl From<PrivateKey> for Key {
    fn from(k: PrivateKey) -> Self {
        Key::Private(k)
    }
}

impl From<PublicKey> for Key {
    fn from(k: PublicKey) -> Self {
        Key::Public(k)
    }
}

#[cfg(test)]
mod test {
    use super::{Key, PrivateKey};
    use crate::codec::Message;
    use num_bigint::BigUint;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn test_bad_keygen_requires_distinct_primes() {
        let result = PrivateKey::from_primes(BigUint::from(7_u32), BigUint::from(7_u32));
        assert!(result.is_err());
    }

    #[test]
    fn test_small_primes_round_trip() {
        let key = PrivateKey::from_primes(BigUint::from(11_u32), BigUint::from(23_u32)).unwrap();
        let public = key.get_public();

        for m in 0_u32..20 {
            let m = BigUint::from(m);
            let c = public.encrypt_int(&m).unwrap();
            assert_eq!(key.decrypt_int(&c).unwrap(), m);
        }
    }

    #[test]
    fn test_generate_full_round_trip_various_sizes() {
        let mut rng = StdRng::seed_from_u64(34);

        for nbits in [3_u32, 4, 5, 10, 20] {
            let key = PrivateKey::generate(nbits, &mut rng).unwrap();
            let public = key.get_public();

            for m in 0..nbits {
                let m = BigUint::from(m);
                if m >= *key.n() {
                    continue;
                }
                let c = public.encrypt_int(&m).unwrap();
                assert_eq!(key.decrypt_int(&c).unwrap(), m);
            }
        }
    }

    #[test]
    fn test_generate_full_message_round_trip() {
        let mut rng = StdRng::seed_from_u64(34);
        let plaintext = b"Hello world! How are you this fine day? I'm doing just great!";

        for nbits in [32_u32, 64, 72, 136] {
            let key = PrivateKey::generate(nbits, &mut rng).unwrap();
            let public = key.get_public();

            let message = Message::encode(plaintext, key.n()).unwrap();
            let ciphertext = public.encrypt(&message);
            let decrypted = key.decrypt(&ciphertext);

            assert_eq!(&decrypted.decode().unwrap(), plaintext);
        }
    }

    #[test]
    fn test_plaintext_longer_than_modulus_regression() {
        let mut rng = StdRng::seed_from_u64(34);
        let key = PrivateKey::generate(10, &mut rng).unwrap();
        let public = key.get_public();

        let plaintext = b"\xFF\xFF\xFF\xFF\xFF";
        let message = Message::encode(plaintext, key.n()).unwrap();
        let ciphertext = public.encrypt(&message);
        let decrypted = key.decrypt(&ciphertext);

        assert_eq!(&decrypted.decode().unwrap(), plaintext);
    }

    #[test]
    fn test_seeded_generation_is_reproducible() {
        let mut rng_a = StdRng::seed_from_u64(34);
        let key_a = PrivateKey::generate(10, &mut rng_a).unwrap();

        let mut rng_b = StdRng::seed_from_u64(34);
        let key_b = PrivateKey::generate(10, &mut rng_b).unwrap();

        assert_eq!(key_a, key_b);

        let mut rng_c = StdRng::seed_from_u64(35);
        let key_c = PrivateKey::generate(10, &mut rng_c).unwrap();

        assert_ne!(key_a, key_c);
    }

    #[test]
    fn test_generate_with_exponent_honors_fixed_starting_e() {
        let mut rng = StdRng::seed_from_u64(34);
        let key = PrivateKey::generate_with_exponent(32, BigUint::from(65537_u32), &mut rng).unwrap();
        let public = key.get_public();

        assert!(*key.e() >= BigUint::from(65537_u32));
        assert_ne!(key.d(), key.e());
        assert_eq!(
            crate::kernel::mod_mul(key.e(), key.d(), key.phi()),
            BigUint::from(1_u32)
        );

        for m in 0_u32..10 {
            let m = BigUint::from(m);
            let c = public.encrypt_int(&m).unwrap();
            assert_eq!(key.decrypt_int(&c).unwrap(), m);
        }
    }

    #[test]
    fn test_key_capability_dispatch() {
        let mut rng = StdRng::seed_from_u64(34);
        let private = PrivateKey::generate(10, &mut rng).unwrap();
        let public = private.get_public();

        let private_key: Key = private.into();
        let public_key: Key = public.into();

        assert!(private_key.can_encrypt());
        assert!(private_key.can_decrypt());
        assert!(!private_key.is_public());

        assert!(public_key.can_encrypt());
        assert!(!public_key.can_decrypt());
        assert!(public_key.is_public());

        assert!(public_key.as_private().is_err());
    }

    #[test]
    fn test_key_json_round_trip_preserves_equality() {
        let mut rng = StdRng::seed_from_u64(34);
        let private = PrivateKey::generate(16, &mut rng).unwrap();
        let key: Key = private.into();

        let json = serde_json::to_string(&key).unwrap();
        let recovered: Key = serde_json::from_str(&json).unwrap();

        assert_eq!(key, recovered);
    }

    #[test]
    fn test_error_display_messages_are_non_empty() {
        use crate::error::Error;

        let errors = [
            Error::InvalidParameter("bad nbits".to_string()),
            Error::DecodeRangeError {
                value: "65537".to_string(),
                bpb: 2,
            },
            Error::KeyLoadError("truncated json".to_string()),
            Error::WrongKeyForCiphertext,
            Error::KeyLacksCapability("decryption"),
        ];

        for e in errors {
            let message = e.to_string();
            assert!(!message.is_empty());
            assert_ne!(message, format!("{e:?}"));
        }
    }
}
