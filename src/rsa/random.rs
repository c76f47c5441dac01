// Random byte sources
// Candidate primes and key-size jitter are drawn through this trait

use rand::{thread_rng, RngCore};
use std::sync::Mutex;

/// A source of unpredictable bytes shared by parallel search workers.
pub trait RandomSource: Sync {
    /// Fill `dest` entirely with random bytes
    fn fill(&self, dest: &mut [u8]);

    /// Uniform integer in `[0, bound)`; returns 0 when `bound` is 0
    fn below(&self, bound: u32) -> u32 {
        if bound == 0 {
            return 0;
        }
        // 2^32 mod bound; values below it would bias the result
        let threshold = bound.wrapping_neg() % bound;
        loop {
            let mut buf = [0u8; 4];
            self.fill(&mut buf);
            let value = u32::from_le_bytes(buf);
            if value >= threshold {
                return value % bound;
            }
        }
    }
}

/// Operating system seeded CSPRNG of the calling thread
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRandom;

impl RandomSource for SystemRandom {
    fn fill(&self, dest: &mut [u8]) {
        thread_rng().fill_bytes(dest);
    }
}

/// Any RNG behind a lock can be shared between workers. Seeded generators
/// make searches reproducible when run with a single worker.
impl<R: RngCore + Send> RandomSource for Mutex<R> {
    fn fill(&self, dest: &mut [u8]) {
        let mut rng = match self.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        rng.fill_bytes(dest);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_below_stays_in_range() {
        let source = Mutex::new(ChaCha8Rng::seed_from_u64(1));
        for bound in [1u32, 2, 3, 18, 1000, u32::MAX] {
            for _ in 0..100 {
                assert!(source.below(bound) < bound);
            }
        }
        assert_eq!(source.below(0), 0);
    }

    #[test]
    fn test_seeded_source_is_reproducible() {
        let a = Mutex::new(ChaCha8Rng::seed_from_u64(42));
        let b = Mutex::new(ChaCha8Rng::seed_from_u64(42));
        let mut x = [0u8; 16];
        let mut y = [0u8; 16];
        a.fill(&mut x);
        b.fill(&mut y);
        assert_eq!(x, y);
    }

    #[test]
    fn test_system_random_fills() {
        let mut buf = [0u8; 64];
        SystemRandom.fill(&mut buf);
        assert!(buf.iter().any(|&b| b != 0));
    }
}
