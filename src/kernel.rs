//! Number-theoretic kernel: [extended GCD](https://en.wikipedia.org/wiki/Extended_Euclidean_algorithm),
//! modular multiplication/exponentiation, and
//! [Miller-Rabin](https://en.wikipedia.org/wiki/Miller%E2%80%93Rabin_primality_test)
//! primality testing.
//!
//! This module exists to be read, not just used: `mod_mul` recurses via a
//! Karatsuba-style split instead of deferring to `BigUint`'s native
//! multiplication, and `mod_exp`/`is_prime` are built entirely on top of the
//! primitives defined here. None of this is competitive with a production
//! bignum library; see the crate-level docs for what this crate is (and
//! isn't) for.

use num_bigint::{BigInt, BigUint, RandBigInt};
use num_integer::Integer;
use num_traits::{One, Zero};
use rand::{CryptoRng, Rng};

/// Number of independent Miller-Rabin rounds used by [`is_prime`]'s default
/// entry points. False-positive rate is at most `4^-ROUNDS`.
pub const MILLER_RABIN_ROUNDS: usize = 100;

/// Default Karatsuba fallback threshold for [`mod_mul`]/[`mod_exp`]: below
/// this magnitude, multiplication is done natively instead of recursing.
///
/// Exposed as a function (rather than a `const`) because it returns a
/// heap-allocated `BigUint`.
#[must_use]
pub fn default_native_math_max() -> BigUint {
    BigUint::one() << 62
}

/// [Extended Euclidean algorithm](https://en.wikipedia.org/wiki/Extended_Euclidean_algorithm).
///
/// Returns `(x, y, g)` such that `a*x + b*y == g == gcd(a, b)`. `a` and `b`
/// must be non-negative; `g` is always non-negative, but `x` and `y` may be
/// negative (they are genuine Bézout coefficients, not reduced residues).
///
/// The first returned coefficient always multiplies the first argument, even
/// when `b > a` forces an internal swap to keep the recursion well-founded.
///
/// # Panics
///
/// If `a` or `b` is negative.
#[must_use]
pub fn ext_gcd(a: &BigUint, b: &BigUint) -> (BigInt, BigInt, BigUint) {
    let (x, y, g) = ext_gcd_signed(a.clone().into(), b.clone().into());
    (
        x,
        y,
        g.to_biguint()
            .expect("gcd of two non-negative integers must be non-negative"),
    )
}

fn ext_gcd_signed(a: BigInt, b: BigInt) -> (BigInt, BigInt, BigInt) {
    let flip = b > a;
    let (a, b) = if flip { (b, a) } else { (a, b) };

    if b.is_zero() {
        return if flip {
            (BigInt::zero(), BigInt::one(), a)
        } else {
            (BigInt::one(), BigInt::zero(), a)
        };
    }

    let (x, y, g) = ext_gcd_signed(b.clone(), &a % &b);

    let mut ny = y.clone();
    let mut nx = &x - (&a / &b) * &y;

    if flip {
        std::mem::swap(&mut ny, &mut nx);
    }

    (ny, nx, g)
}

/// Greatest common divisor. Convenience wrapper around [`ext_gcd`] that
/// discards the Bézout coefficients.
#[must_use]
pub fn gcd(a: &BigUint, b: &BigUint) -> BigUint {
    ext_gcd(a, b).2
}

/// Modular multiplicative inverse: the unique `v` in `[0, n)` with
/// `x * v ≡ 1 (mod n)`, or `None` if `gcd(x, n) != 1`.
#[must_use]
pub fn mod_inv(x: &BigUint, n: &BigUint) -> Option<BigUint> {
    let (coeff, _, g) = ext_gcd(x, n);

    if !g.is_one() {
        return None;
    }

    let n_signed = BigInt::from(n.clone());
    let reduced = ((coeff % &n_signed) + &n_signed) % &n_signed;

    Some(
        reduced
            .to_biguint()
            .expect("coefficient reduced mod n must be non-negative"),
    )
}

/// `(x * y) mod n`, computed via a Karatsuba-style recursive split once
/// either operand is at or above [`default_native_math_max`]. See
/// [`mod_mul_with_threshold`] to use a different threshold (e.g. in tests
/// that want to force the recursive path on small operands).
#[must_use]
pub fn mod_mul(x: &BigUint, y: &BigUint, n: &BigUint) -> BigUint {
    mod_mul_with_threshold(x, y, n, &default_native_math_max())
}

/// `(x * y) mod n`, splitting recursively via
///
/// ```text
/// (a + K*c)(b + K*d) = a*b + K*((a+c)(b+d) - a*b - c*d) + K^2*c*d
/// ```
///
/// whenever `x` or `y` is at or above `native_math_max`, where
/// `K = 2^floor(bits(max(x, y)) / 2)`, `a = x mod K`, `c = x div K`,
/// `b = y mod K`, `d = y div K`. Below the threshold, multiplies natively.
///
/// Lowering `native_math_max` (down to something tiny, like `4`) must still
/// produce correct results — it only changes how much of the recursive path
/// gets exercised.
#[must_use]
pub fn mod_mul_with_threshold(
    x: &BigUint,
    y: &BigUint,
    n: &BigUint,
    native_math_max: &BigUint,
) -> BigUint {
    if x < native_math_max && y < native_math_max {
        return (x * y) % n;
    }

    let bits = x.max(y).bits();
    let half = bits / 2;
    let k = BigUint::one() << half;

    let (c, a) = (x / &k, x % &k);
    let (d, b) = (y / &k, y % &k);

    let ab = mod_mul_with_threshold(&a, &b, n, native_math_max);
    let cd = mod_mul_with_threshold(&c, &d, n, native_math_max);
    let cross = mod_mul_with_threshold(&(&a + &c), &(&b + &d), n, native_math_max);

    let middle = mod_sub(&mod_sub(&cross, &ab, n), &cd, n);

    let k_mod = &k % n;
    let k2_mod = mod_mul_with_threshold(&k_mod, &k_mod, n, native_math_max);

    let term1 = &ab % n;
    let term2 = mod_mul_with_threshold(&middle, &k_mod, n, native_math_max);
    let term3 = mod_mul_with_threshold(&cd, &k2_mod, n, native_math_max);

    (term1 + term2 + term3) % n
}

/// `(a - b) mod n`, where `a` and `b` are already-reduced residues that may
/// compare either way (unlike `BigUint` subtraction, this never underflows).
fn mod_sub(a: &BigUint, b: &BigUint, n: &BigUint) -> BigUint {
    let a = a % n;
    let b = b % n;

    if a >= b {
        a - b
    } else {
        n - (b - a)
    }
}

/// `(x ** y) mod n` via left-to-right binary exponentiation: square `z` for
/// every bit of `y` from most to least significant, and multiply by `x`
/// whenever that bit is set.
///
/// `mod_exp(x, 0, n) == 1 mod n` (so the result is `0` when `n == 1`), and
/// `mod_exp(0, 0, n) == 1 mod n` by the same convention.
#[must_use]
pub fn mod_exp(x: &BigUint, y: &BigUint, n: &BigUint) -> BigUint {
    mod_exp_with_threshold(x, y, n, &default_native_math_max())
}

/// As [`mod_exp`], but using `native_math_max` as the Karatsuba fallback
/// threshold for every underlying [`mod_mul_with_threshold`] call.
#[must_use]
pub fn mod_exp_with_threshold(
    x: &BigUint,
    y: &BigUint,
    n: &BigUint,
    native_math_max: &BigUint,
) -> BigUint {
    if n.is_one() {
        return BigUint::zero();
    }

    let mut z = BigUint::one();

    for i in (0..y.bits()).rev() {
        z = mod_mul_with_threshold(&z, &z, n, native_math_max);

        if y.bit(i) {
            z = mod_mul_with_threshold(x, &z, n, native_math_max);
        }
    }

    z % n
}

/// Rewrites `n = u * 2^t` with `u` odd. Requires `n` to be even-or-odd
/// non-zero; callers always pass `candidate - 1`.
fn factor_out_twos(mut n: BigUint) -> (BigUint, u64) {
    let mut t = 0u64;

    while n.is_even() {
        n >>= 1u32;
        t += 1;
    }

    (n, t)
}

/// A single [Miller-Rabin witness test](https://en.wikipedia.org/wiki/Miller%E2%80%93Rabin_primality_test)
/// for base `base` against `candidate = u * 2^t + 1`.
///
/// Returns `true` when `base` does *not* prove `candidate` composite (i.e.
/// the witness test passes for this base). The "first one" bookkeeping
/// treats a sequence that starts at `1` as a benign prefix rather than a
/// non-trivial square root — this is what makes the test actually catch
/// Carmichael numbers instead of just restating Fermat's test.
#[must_use]
pub fn miller_rabin_witness(candidate: &BigUint, u: &BigUint, t: u64, base: &BigUint) -> bool {
    let candidate_minus_one = candidate - BigUint::one();

    let mut val = mod_exp(base, u, candidate);
    let mut found_first_one = val.is_one();

    for _ in 0..t {
        let new_val = mod_mul(&val, &val, candidate);

        if new_val.is_one() && !found_first_one {
            found_first_one = true;

            if val != candidate_minus_one {
                return false;
            }
        }

        val = new_val;
    }

    val.is_one()
}

/// Probabilistic primality test via `rounds` independent
/// [Miller-Rabin](https://en.wikipedia.org/wiki/Miller%E2%80%93Rabin_primality_test)
/// rounds, each drawing a fresh base uniformly from `[1, x)` via `rng`.
/// False-positive rate is at most `4^-rounds`.
#[must_use]
pub fn is_prime<R: Rng + CryptoRng>(x: &BigUint, rng: &mut R, rounds: usize) -> bool {
    if x.is_zero() || x.is_one() {
        return false;
    }

    let two = BigUint::from(2u32);
    let three = BigUint::from(3u32);

    if x == &two || x == &three {
        return true;
    }

    if x.is_even() {
        return false;
    }

    let (u, t) = factor_out_twos(x - BigUint::one());
    let one = BigUint::one();

    (0..rounds).all(|_| {
        let base = rng.gen_biguint_range(&one, x);
        miller_rabin_witness(x, &u, t, &base)
    })
}

/// Samples uniformly from `[2^(nbits-1), 2^nbits - 1]` until [`is_prime`]
/// (with [`MILLER_RABIN_ROUNDS`] rounds) accepts.
///
/// # Panics
///
/// If `nbits <= 2`.
#[must_use]
pub fn random_prime<R: Rng + CryptoRng>(nbits: u32, rng: &mut R) -> BigUint {
    assert!(nbits > 2, "random_prime requires nbits > 2, got {nbits}");

    let low = BigUint::one() << (nbits - 1);
    let high_exclusive = BigUint::one() << nbits;

    loop {
        let candidate = rng.gen_biguint_range(&low, &high_exclusive);

        if is_prime(&candidate, rng, MILLER_RABIN_ROUNDS) {
            return candidate;
        }
    }
}
