//! Uniform reviewer selection.
//!
//! Candidates are drawn uniformly without replacement in Rust rather than
//! with the store's `ORDER BY RANDOM()`, so selection behaves the same on any
//! backend and can be driven by a seeded RNG in tests.

use rand::seq::SliceRandom;
use rand::Rng;

/// Pick up to `count` distinct items uniformly at random.
///
/// Returns every candidate (in random order) when fewer than `count` exist.
pub fn choose_uniform<T, R>(mut candidates: Vec<T>, count: usize, rng: &mut R) -> Vec<T>
where
    R: Rng + ?Sized,
{
    // A uniformly shuffled prefix is a uniform sample without replacement.
    candidates.shuffle(rng);
    candidates.truncate(count);
    candidates
}

/// [`choose_uniform`] with the thread-local RNG.
pub fn choose_reviewers<T>(candidates: Vec<T>, count: usize) -> Vec<T> {
    choose_uniform(candidates, count, &mut rand::thread_rng())
}
