//! Unseeded randomness for production decisions.
use combat_core::RandomSource;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// [`RandomSource`] seeded from operating system entropy.
#[derive(Clone, Debug)]
pub struct ThreadRandom {
    rng: StdRng,
}

impl ThreadRandom {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }
}

impl Default for ThreadRandom {
    fn default() -> Self {
        Self::new()
    }
}

impl RandomSource for ThreadRandom {
    fn next_int(&mut self, upper: u32) -> u32 {
        if upper == 0 {
            return 0;
        }
        self.rng.random_range(0..upper)
    }

    fn next_float(&mut self) -> f64 {
        self.rng.random::<f64>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stays_within_bounds() {
        let mut rng = ThreadRandom::new();
        for _ in 0..1_000 {
            assert!(rng.next_int(7) < 7);
            let f = rng.next_float();
            assert!((0.0..1.0).contains(&f));
        }
        assert_eq!(rng.next_int(0), 0);
    }
}
