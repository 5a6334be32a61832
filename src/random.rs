use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::VecDeque;

/// Uniform draws in `[0, 1)`
pub trait RandomSource {
    fn next_unit(&mut self) -> f64;

    /// `true` with probability `p`
    fn chance(&mut self, p: f64) -> bool {
        self.next_unit() < p
    }
}

#[derive(Debug, Clone)]
pub struct StdRandom {
    rng: StdRng,
}

impl StdRandom {
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for StdRandom {
    fn default() -> Self {
        Self::from_entropy()
    }
}

impl RandomSource for StdRandom {
    fn next_unit(&mut self) -> f64 {
        self.rng.gen::<f64>()
    }
}

/// Replays a fixed list of draws, then repeats `fallback`
#[derive(Debug, Clone)]
pub struct ScriptedRandom {
    draws: VecDeque<f64>,
    fallback: f64,
}

impl ScriptedRandom {
    pub fn new<I: IntoIterator<Item = f64>>(draws: I) -> Self {
        Self {
            draws: draws.into_iter().collect(),
            fallback: 0.0,
        }
    }

    pub fn with_fallback(mut self, fallback: f64) -> Self {
        self.fallback = fallback;
        self
    }

    pub fn remaining(&self) -> usize {
        self.draws.len()
    }
}

impl RandomSource for ScriptedRandom {
    fn next_unit(&mut self) -> f64 {
        self.draws.pop_front().unwrap_or(self.fallback)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scripted_draws_replay_in_order_then_fall_back() {
        let mut r = ScriptedRandom::new([0.1, 0.9]).with_fallback(0.6);
        assert_eq!(r.next_unit(), 0.1);
        assert_eq!(r.next_unit(), 0.9);
        assert_eq!(r.remaining(), 0);
        assert_eq!(r.next_unit(), 0.6);
    }

    #[test]
    fn chance_is_strictly_below_threshold() {
        let mut r = ScriptedRandom::new([0.49, 0.5, 0.74, 0.75]);
        assert!(r.chance(0.5));
        assert!(!r.chance(0.5));
        assert!(r.chance(0.75));
        assert!(!r.chance(0.75));
    }

    #[test]
    fn seeded_draws_are_reproducible_and_in_range() {
        let mut a = StdRandom::seeded(7);
        let mut b = StdRandom::seeded(7);
        for _ in 0..100 {
            let x = a.next_unit();
            assert!((0.0..1.0).contains(&x));
            assert_eq!(x, b.next_unit());
        }
    }
}
