//! Thread-local seeded randomness for workload generation.
//!
//! Each thread owns its own generator, so seeded runs stay reproducible
//! while independent seeds are swept on parallel test threads. The engine
//! itself never draws from it; only workload generation does.

use rand::SeedableRng;
use rand::{
    distributions::{uniform::SampleUniform, Distribution, Standard},
    Rng,
};
use rand_chacha::ChaCha8Rng;
use std::cell::RefCell;

thread_local! {
    static SIM_RNG: RefCell<ChaCha8Rng> = RefCell::new(ChaCha8Rng::from_entropy());

    static CURRENT_SEED: RefCell<u64> = const { RefCell::new(0) };
}

/// Draw a value from the standard distribution of `T`.
pub fn sim_random<T>() -> T
where
    Standard: Distribution<T>,
{
    SIM_RNG.with(|rng| rng.borrow_mut().sample(Standard))
}

/// Draw a value uniformly from `range`.
///
/// # Panics
///
/// Panics on an empty range; see [`sim_random_range_or_default`].
pub fn sim_random_range<T>(range: std::ops::Range<T>) -> T
where
    T: SampleUniform + PartialOrd,
{
    SIM_RNG.with(|rng| rng.borrow_mut().gen_range(range))
}

/// Like [`sim_random_range`], but an empty range yields its start.
pub fn sim_random_range_or_default<T>(range: std::ops::Range<T>) -> T
where
    T: SampleUniform + PartialOrd + Clone,
{
    if range.start >= range.end {
        range.start
    } else {
        sim_random_range(range)
    }
}

/// Reseed this thread's generator and remember `seed`.
pub fn set_sim_seed(seed: u64) {
    SIM_RNG.with(|rng| {
        *rng.borrow_mut() = ChaCha8Rng::seed_from_u64(seed);
    });
    CURRENT_SEED.with(|current| {
        *current.borrow_mut() = seed;
    });
}

/// Seed last passed to [`set_sim_seed`] on this thread, or 0.
pub fn get_current_sim_seed() -> u64 {
    CURRENT_SEED.with(|current| *current.borrow())
}

/// Drop any seeded state before the next iteration.
pub fn reset_sim_rng() {
    SIM_RNG.with(|rng| {
        *rng.borrow_mut() = ChaCha8Rng::from_entropy();
    });
    CURRENT_SEED.with(|current| {
        *current.borrow_mut() = 0;
    });
}
