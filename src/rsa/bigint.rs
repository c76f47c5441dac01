// RSA Big Integer Operations
// Wrapper around num-bigint for RSA-specific operations

use num_bigint::{BigInt, BigUint, RandBigInt};
use num_integer::Integer;
use num_traits::{One, Signed, Zero};
use rand::thread_rng;

/// RSA Big Integer type alias
pub type RsaBigInt = BigUint;

/// Odd primes below 256, used to screen candidates before Miller-Rabin
const SMALL_PRIMES: [u32; 53] = [
    3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37, 41, 43, 47, 53, 59, 61, 67, 71, 73, 79, 83, 89, 97,
    101, 103, 107, 109, 113, 127, 131, 137, 139, 149, 151, 157, 163, 167, 173, 179, 181, 191, 193,
    197, 199, 211, 223, 227, 229, 233, 239, 241, 251,
];

/// Create a big integer from u64
pub fn from_u64(n: u64) -> RsaBigInt {
    RsaBigInt::from(n)
}

/// Two's-complement, least-significant byte first.
///
/// This is the minimal encoding: zero is a single `0x00` byte, and a value
/// whose top byte has its high bit set gets an extra `0x00` sign byte.
pub fn to_twos_complement_le(n: &RsaBigInt) -> Vec<u8> {
    let mut bytes = n.to_bytes_le();
    if bytes.last().map_or(false, |b| b & 0x80 != 0) {
        bytes.push(0);
    }
    bytes
}

/// Inverse of [`to_twos_complement_le`]. An empty slice reads as zero.
pub fn from_twos_complement_le(bytes: &[u8]) -> BigInt {
    BigInt::from_signed_bytes_le(bytes)
}

/// Modular exponentiation: base^exp mod modulus
pub fn mod_pow(base: &RsaBigInt, exp: &RsaBigInt, modulus: &RsaBigInt) -> RsaBigInt {
    if modulus.is_one() {
        return RsaBigInt::zero();
    }

    base.modpow(exp, modulus)
}

/// Compute modular inverse: a^(-1) mod n
///
/// Extended Euclid, carrying only the coefficient of `a`. The result is
/// reduced into `[0, n)`. Returns None when `gcd(a, n) != 1`.
pub fn mod_inverse(a: &RsaBigInt, n: &RsaBigInt) -> Option<RsaBigInt> {
    if n.is_zero() {
        return None;
    }

    let modulus = BigInt::from(n.clone());
    let mut a = BigInt::from(a.clone());
    let mut i = modulus.clone();
    let mut v = BigInt::zero();
    let mut d = BigInt::one();

    while a.is_positive() {
        let t = &i / &a;
        let x = a;
        a = &i % &x;
        i = x;
        let x = d;
        d = &v - &t * &x;
        v = x;
    }

    // i is gcd(a, n) once the remainder hits zero
    if !i.is_one() {
        return None;
    }

    v.mod_floor(&modulus).to_biguint()
}

/// Greatest common divisor
pub fn gcd(a: &RsaBigInt, b: &RsaBigInt) -> RsaBigInt {
    a.gcd(b)
}

/// True for 1, 2, 4, 8, ...
pub fn is_power_of_two(n: &RsaBigInt) -> bool {
    n.count_ones() == 1
}

/// True if some small prime other than `n` itself divides `n`
pub fn has_small_factor(n: &RsaBigInt) -> bool {
    SMALL_PRIMES.iter().any(|&p| {
        let rem: RsaBigInt = n % p;
        rem.is_zero() && *n != RsaBigInt::from(p)
    })
}

/// Miller-Rabin primality test
/// Returns true if n is probably prime, with error probability at most 4^-rounds
pub fn is_probable_prime(n: &RsaBigInt, rounds: usize) -> bool {
    let two = RsaBigInt::from(2u8);
    if n < &two {
        return false;
    }
    if n == &two || n == &RsaBigInt::from(3u8) {
        return true;
    }
    if n.is_even() {
        return false;
    }

    // Write n-1 as d * 2^r with d odd
    let n_minus_one = n - 1u8;
    let r = n_minus_one.trailing_zeros().unwrap_or(0);
    let d = &n_minus_one >> r;

    let mut rng = thread_rng();
    // n >= 5 here, so witnesses in [2, n-3] exist
    let upper = n - &two;

    'witness: for _ in 0..rounds {
        let a = rng.gen_biguint_range(&two, &upper);
        let mut x = mod_pow(&a, &d, n);

        if x.is_one() || x == n_minus_one {
            continue;
        }

        for _ in 1..r {
            x = mod_pow(&x, &two, n);
            if x == n_minus_one {
                continue 'witness;
            }
        }

        // Composite
        return false;
    }

    // Probably prime
    true
}
