//! Seedable dice used by every randomized choreography.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Thin wrapper over [`StdRng`] with the helpers the scene needs.
///
/// A fixed seed makes a run reproducible (useful for tests and recorded
/// captures); `None` seeds from the OS.
#[derive(Debug, Clone)]
pub struct Dice {
    rng: StdRng,
}

impl Dice {
    /// Create dice from an optional seed.
    #[must_use]
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self { rng }
    }

    /// Uniform integer in the inclusive range `[min, max]`.
    ///
    /// Reversed bounds are swapped rather than rejected.
    pub fn int(&mut self, min: i32, max: i32) -> i32 {
        let (lo, hi) = if min <= max { (min, max) } else { (max, min) };
        self.rng.random_range(lo..=hi)
    }

    /// [`Self::int`] converted to `f32`.
    pub fn int_f(&mut self, min: i32, max: i32) -> f32 {
        self.int(min, max) as f32
    }

    /// Uniform float in `[0, 1)`.
    pub fn unit(&mut self) -> f32 {
        self.rng.random::<f32>()
    }

    /// Fair coin.
    pub fn coin(&mut self) -> bool {
        self.rng.random_bool(0.5)
    }

    /// True with probability `1 / n`.
    pub fn one_in(&mut self, n: u32) -> bool {
        n <= 1 || self.rng.random_range(0..n) == 0
    }

    /// Uniform index in `[0, len)`; zero for empty collections.
    pub fn index(&mut self, len: usize) -> usize {
        if len == 0 {
            0
        } else {
            self.rng.random_range(0..len)
        }
    }

    /// Seconds drawn as a whole number in `[min, max]`.
    pub fn seconds(&mut self, min: i32, max: i32) -> f32 {
        self.int_f(min, max)
    }
}

impl Default for Dice {
    fn default() -> Self {
        Self::new(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn int_stays_inclusive() {
        let mut dice = Dice::new(Some(7));
        let mut saw_min = false;
        let mut saw_max = false;
        for _ in 0..2000 {
            let v = dice.int(-2, 2);
            assert!((-2..=2).contains(&v));
            saw_min |= v == -2;
            saw_max |= v == 2;
        }
        assert!(saw_min && saw_max);
    }

    #[test]
    fn reversed_bounds_are_swapped() {
        let mut dice = Dice::new(Some(1));
        for _ in 0..100 {
            let v = dice.int(5, 1);
            assert!((1..=5).contains(&v));
        }
    }

    #[test]
    fn same_seed_same_sequence() {
        let mut a = Dice::new(Some(42));
        let mut b = Dice::new(Some(42));
        for _ in 0..32 {
            assert_eq!(a.int(0, 1000), b.int(0, 1000));
        }
    }

    #[test]
    fn one_in_one_always_true() {
        let mut dice = Dice::new(Some(3));
        assert!((0..50).all(|_| dice.one_in(1)));
    }

    #[test]
    fn index_of_empty_is_zero() {
        let mut dice = Dice::new(Some(3));
        assert_eq!(dice.index(0), 0);
    }
}
