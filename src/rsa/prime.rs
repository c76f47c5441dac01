// Parallel Prime Search
// Workers sample random candidates until enough probable primes are recorded

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};

use num_integer::Integer;

use super::bigint::{has_small_factor, is_power_of_two, is_probable_prime, RsaBigInt};
use super::random::RandomSource;
use crate::error::{Error, Result};

/// Miller-Rabin rounds; false positive rate is at most 4^-10
pub const WITNESS_ROUNDS: usize = 10;

/// Search configuration for probable primes of a target bit length.
///
/// Candidates are `bit_length / 8` random bytes read little-endian with the
/// sign bit of the last byte cleared. The top bit is not forced, so a prime
/// may come out shorter than the target.
#[derive(Debug, Clone)]
pub struct PrimeSearch {
    bit_length: usize,
    workers: usize,
    rounds: usize,
}

/// State shared by the workers of one search
struct SearchState {
    stop: AtomicBool,
    found: Mutex<Vec<RsaBigInt>>,
}

impl SearchState {
    fn new(count: usize) -> Self {
        Self {
            stop: AtomicBool::new(false),
            found: Mutex::new(Vec::with_capacity(count)),
        }
    }

    fn should_stop(&self) -> bool {
        self.stop.load(Ordering::Acquire)
    }

    /// Record a prime unless the target was already reached
    fn record(&self, prime: RsaBigInt, count: usize) {
        let mut found = self.found.lock().unwrap_or_else(PoisonError::into_inner);

        if found.len() < count && !found.contains(&prime) {
            log::debug!(
                "probable prime found ({} bits), {}/{}",
                prime.bits(),
                found.len() + 1,
                count
            );
            found.push(prime);
        }

        if found.len() >= count && !self.stop.swap(true, Ordering::AcqRel) {
            log::trace!("prime search target reached, stopping workers");
        }
    }

    fn into_found(self) -> Vec<RsaBigInt> {
        self.found
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl PrimeSearch {
    /// New search with one worker per rayon thread and 10 witness rounds
    pub fn new(bit_length: usize) -> Self {
        Self {
            bit_length,
            workers: rayon::current_num_threads().max(1),
            rounds: WITNESS_ROUNDS,
        }
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    pub fn with_rounds(mut self, rounds: usize) -> Self {
        self.rounds = rounds;
        self
    }

    /// Bytes drawn per candidate. Never zero, so tiny targets still terminate.
    pub fn candidate_len(&self) -> usize {
        (self.bit_length / 8).max(1)
    }

    /// Turn raw random bytes into a non-negative candidate
    pub fn candidate_from_bytes(bytes: &mut [u8]) -> RsaBigInt {
        if let Some(last) = bytes.last_mut() {
            *last &= 0x7F;
        }
        RsaBigInt::from_bytes_le(bytes)
    }

    /// Cheap rejections first, then Miller-Rabin
    pub fn is_acceptable(&self, candidate: &RsaBigInt) -> bool {
        if candidate.is_even() || is_power_of_two(candidate) {
            return false;
        }
        !has_small_factor(candidate) && is_probable_prime(candidate, self.rounds)
    }

    /// Find `count` distinct probable primes.
    ///
    /// Discovery order across workers is not deterministic. There is no
    /// timeout: the call returns once `count` primes have been recorded.
    pub fn find_primes<S>(&self, source: &S, count: usize) -> Vec<RsaBigInt>
    where
        S: RandomSource + ?Sized,
    {
        if count == 0 {
            return Vec::new();
        }

        let state = SearchState::new(count);
        rayon::scope(|scope| {
            for _ in 0..self.workers {
                let state = &state;
                scope.spawn(move |_| self.run_worker(source, count, state));
            }
        });

        state.into_found()
    }

    /// Find a single probable prime
    pub fn find_prime<S>(&self, source: &S) -> Result<RsaBigInt>
    where
        S: RandomSource + ?Sized,
    {
        self.find_primes(source, 1).pop().ok_or_else(|| {
            Error::KeyGenerationFailed(format!("no {}-bit prime recorded", self.bit_length))
        })
    }

    fn run_worker<S>(&self, source: &S, count: usize, state: &SearchState)
    where
        S: RandomSource + ?Sized,
    {
        let mut bytes = vec![0u8; self.candidate_len()];

        // The stop flag is only checked between candidates
        while !state.should_stop() {
            source.fill(&mut bytes);
            let candidate = Self::candidate_from_bytes(&mut bytes);

            if self.is_acceptable(&candidate) {
                state.record(candidate, count);
            }
        }
    }
}
