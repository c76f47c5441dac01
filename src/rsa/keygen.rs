// RSA Key Generation
// Builds key pairs from randomly searched primes and a random prime exponent

use num_traits::One;

use super::bigint::{gcd, mod_inverse, RsaBigInt};
use super::prime::PrimeSearch;
use super::random::{RandomSource, SystemRandom};
use crate::error::{Error, Result};

/// Bit length targeted for the public exponent
pub const PUBLIC_EXPONENT_BITS: usize = 512;

/// Smallest key size accepted by [`KeyPairBuilder`]
pub const MIN_KEY_BITS: usize = 16;

/// Largest key size accepted by [`KeyPairBuilder`]
pub const MAX_KEY_BITS: usize = 1 << 16;

/// Retries allowed for `p == q` or a non-invertible exponent
pub const DEFAULT_MAX_ATTEMPTS: usize = 64;

/// Maximum deviation of the prime split from an even split, in percent
const SPLIT_DEVIATION_PERCENT: usize = 30;

/// RSA Public Key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RsaPublicKey {
    pub e: RsaBigInt, // Public exponent
    pub n: RsaBigInt, // Modulus
}

/// RSA Private Key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RsaPrivateKey {
    pub d: RsaBigInt, // Private exponent
    pub n: RsaBigInt, // Modulus (same as public)
}

/// RSA Key Pair (both public and private keys)
#[derive(Debug, Clone)]
pub struct RsaKeyPair {
    pub public_key: RsaPublicKey,
    pub private_key: RsaPrivateKey,
    /// Requested key size; the modulus may be somewhat shorter
    pub key_size: usize,
}

/// Everything computed during one generation. The primes never leave
/// this struct and the totient is not kept at all.
#[derive(Debug, Clone)]
pub(crate) struct KeyComponents {
    pub p: RsaBigInt,
    pub q: RsaBigInt,
    pub n: RsaBigInt,
    pub e: RsaBigInt,
    pub d: RsaBigInt,
}

impl RsaPublicKey {
    pub fn new(e: RsaBigInt, n: RsaBigInt) -> Self {
        Self { e, n }
    }

    /// Bit length of the modulus
    pub fn bit_length(&self) -> u64 {
        self.n.bits()
    }
}

impl RsaPrivateKey {
    pub fn new(d: RsaBigInt, n: RsaBigInt) -> Self {
        Self { d, n }
    }

    /// Bit length of the modulus
    pub fn bit_length(&self) -> u64 {
        self.n.bits()
    }
}

impl RsaKeyPair {
    /// Bit length of the generated modulus
    pub fn bit_length(&self) -> u64 {
        self.public_key.bit_length()
    }
}

/// Builder for key pairs of a requested size.
#[derive(Debug, Clone)]
pub struct KeyPairBuilder {
    key_size: usize,
    workers: Option<usize>,
    max_attempts: usize,
}

impl KeyPairBuilder {
    pub fn new(key_size: usize) -> Self {
        Self {
            key_size,
            workers: None,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    /// Workers per prime search; defaults to the rayon thread count
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = Some(workers);
        self
    }

    pub fn with_max_attempts(mut self, attempts: usize) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    /// Split the key size into bit lengths for `p` and `q`.
    ///
    /// `p` gets half the key size plus a jitter in `[-dev, dev)` where
    /// `dev` is 30% of the key size; `q` gets the rest.
    pub fn split<S>(&self, source: &S) -> (usize, usize)
    where
        S: RandomSource + ?Sized,
    {
        // floor(key_size * 30 / 100) without overflowing usize
        let deviation = self.key_size / 100 * SPLIT_DEVIATION_PERCENT
            + self.key_size % 100 * SPLIT_DEVIATION_PERCENT / 100;
        let span = u32::try_from(2 * deviation).unwrap_or(u32::MAX);
        let offset = source.below(span) as usize;

        let p_len = self.key_size / 2 + offset - deviation;
        (p_len, self.key_size - p_len)
    }

    /// Generate a key pair, drawing every random value from `source`
    pub fn build<S>(&self, source: &S) -> Result<RsaKeyPair>
    where
        S: RandomSource + ?Sized,
    {
        let c = self.generate_components(source)?;
        log::debug!(
            "generated {}-bit modulus from {}-bit and {}-bit primes",
            c.n.bits(),
            c.p.bits(),
            c.q.bits()
        );
        Ok(RsaKeyPair {
            public_key: RsaPublicKey::new(c.e, c.n.clone()),
            private_key: RsaPrivateKey::new(c.d, c.n),
            key_size: self.key_size,
        })
    }

    pub(crate) fn generate_components<S>(&self, source: &S) -> Result<KeyComponents>
    where
        S: RandomSource + ?Sized,
    {
        if !(MIN_KEY_BITS..=MAX_KEY_BITS).contains(&self.key_size) {
            return Err(Error::InvalidKeySize {
                min: MIN_KEY_BITS,
                max: MAX_KEY_BITS,
                actual: self.key_size,
            });
        }

        for attempt in 1..=self.max_attempts {
            let (p_len, q_len) = self.split(source);
            log::debug!(
                "key generation attempt {}: p {} bits, q {} bits",
                attempt,
                p_len,
                q_len
            );

            let (p, q) = rayon::join(
                || self.search(p_len).find_prime(source),
                || self.search(q_len).find_prime(source),
            );
            let (p, q) = (p?, q?);

            if p == q {
                log::warn!("p and q collided, retrying");
                continue;
            }

            let n = &p * &q;
            let r = (&p - 1u8) * (&q - 1u8);

            let e = self.search(PUBLIC_EXPONENT_BITS).find_prime(source)?;
            if !gcd(&e, &r).is_one() {
                log::warn!("public exponent is not coprime with the totient, retrying");
                continue;
            }

            let d = match mod_inverse(&e, &r) {
                Some(d) => d,
                None => continue,
            };

            return Ok(KeyComponents { p, q, n, e, d });
        }

        Err(Error::KeyGenerationFailed(format!(
            "no usable key pair after {} attempts",
            self.max_attempts
        )))
    }

    fn search(&self, bit_length: usize) -> PrimeSearch {
        let search = PrimeSearch::new(bit_length);
        match self.workers {
            Some(workers) => search.with_workers(workers),
            None => search,
        }
    }
}

/// Generate a key pair of `key_size` bits from the system random source
pub fn generate_keypair(key_size: usize) -> Result<RsaKeyPair> {
    KeyPairBuilder::new(key_size).build(&SystemRandom)
}
