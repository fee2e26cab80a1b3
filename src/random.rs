use rand::Rng;

const MULTIPLIER_A: i64 = 1103515245;
const INCREMENT_C: i64 = 12345;
const DEFAULT_SEED: i64 = 3819201;

/// Source of randomness for the randomized parts of move selection.
pub trait RandomGenerator: Default {
    fn next(&mut self) -> i32;
    fn next_range(&mut self, from: i32, to: i32) -> i32;

    /// A value in `[0, 1)`.
    fn next_unit(&mut self) -> f64 {
        self.next_range(0, 1 << 24) as f64 / (1u32 << 24) as f64
    }

    fn get_random_from_slice<'a, K>(&mut self, slice: &'a [K]) -> Option<&'a K> {
        if slice.is_empty() {
            return None;
        }
        slice.get(self.next_range(0, slice.len() as i32) as usize)
    }
}

#[derive(Debug, Default)]
pub struct StandardRandomGenerator;

impl RandomGenerator for StandardRandomGenerator {
    fn next(&mut self) -> i32 {
        rand::random()
    }

    fn next_range(&mut self, from: i32, to: i32) -> i32 {
        rand::rng().random_range(from..to)
    }
}

/// A seeded linear congruential generator, for reproducible games and tests.
#[derive(Debug)]
pub struct CustomNumberGenerator {
    seed: i64,
}

impl Default for CustomNumberGenerator {
    fn default() -> Self {
        CustomNumberGenerator::new(DEFAULT_SEED)
    }
}

impl RandomGenerator for CustomNumberGenerator {
    fn next(&mut self) -> i32 {
        self.seed = (self.seed * MULTIPLIER_A + INCREMENT_C) % (i32::MAX as i64);
        self.seed as i32
    }

    fn next_range(&mut self, from: i32, to: i32) -> i32 {
        (self.next() % (to - from)).abs() + from
    }
}

impl CustomNumberGenerator {
    pub const fn new(seed: i64) -> Self {
        Self {
            seed: seed.rem_euclid(i32::MAX as i64),
        }
    }
}
