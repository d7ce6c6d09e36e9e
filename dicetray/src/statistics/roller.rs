use std::time::Duration;

use rand::{Rng, SeedableRng, rngs::StdRng};
use rand_distr::Distribution;

use crate::rules::dice::{FACES, Face};

/// Source of every random number in the crate.
///
/// Backed by [`StdRng`], a ChaCha-based cryptographically strong generator.
/// [`Roller::new`] seeds it from the operating system; [`Roller::from_seed`]
/// exists for reproducible runs and tests.
#[derive(Debug)]
pub struct Roller {
    rng: StdRng,
}

impl Roller {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let rng = StdRng::from_os_rng();
        Roller { rng }
    }

    /// Creates a new `Roller` instance with a different random seed.
    /// Each concurrently animated die gets its own fork.
    pub fn fork(&mut self) -> Self {
        let mut seed = [0u8; 32];
        self.rng.fill(&mut seed);
        let rng = StdRng::from_seed(seed);
        Roller { rng }
    }

    pub fn from_seed(seed: u64) -> Self {
        let rng = StdRng::seed_from_u64(seed);
        Roller { rng }
    }

    /// A uniformly distributed face in `1..=6`.
    pub fn face(&mut self) -> Face {
        let index = self.rng.random_range(0..FACES as usize);
        Face::ALL[index]
    }

    /// A uniformly distributed duration in `[min, max)`.
    pub fn duration(&mut self, min: Duration, max: Duration) -> anyhow::Result<Duration> {
        if min == max {
            return Ok(min);
        }
        let dist = rand_distr::Uniform::new(min.as_secs_f64(), max.as_secs_f64())?;
        Ok(Duration::from_secs_f64(dist.sample(&mut self.rng)))
    }

    #[cfg(test)]
    pub fn test_rng() -> Self {
        Self::from_seed(42)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_face_range() {
        let mut roller = Roller::test_rng();
        let mut seen = [false; 6];
        for _ in 0..10000 {
            let face = roller.face();
            seen[usize::from(face.value() - 1)] = true;
        }
        assert!(seen.iter().all(|s| *s));
    }

    #[test]
    fn test_duration_range() {
        let mut roller = Roller::test_rng();
        let min = Duration::from_millis(300);
        let max = Duration::from_millis(600);
        for _ in 0..10000 {
            let d = roller.duration(min, max).unwrap();
            assert!(d >= min && d < max, "{d:?}");
        }
    }

    #[test]
    fn test_duration_rejects_inverted_range() {
        let mut roller = Roller::test_rng();
        assert!(
            roller
                .duration(Duration::from_millis(600), Duration::from_millis(300))
                .is_err()
        );
    }

    #[test]
    fn test_forks_diverge() {
        let mut roller = Roller::test_rng();
        let mut a = roller.fork();
        let mut b = roller.fork();
        let a: Vec<_> = (0..32).map(|_| a.face()).collect();
        let b: Vec<_> = (0..32).map(|_| b.face()).collect();
        assert_ne!(a, b);
    }
}
