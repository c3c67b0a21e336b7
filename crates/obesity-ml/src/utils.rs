//! Common utilities used across the crate.
//!
//! This module provides order statistics, parallelism configuration, and
//! small numeric helpers that are used by various subsystems.

use rayon::prelude::*;

// =============================================================================
// Statistical Utilities
// =============================================================================

/// Compute the `alpha` quantile of a slice using linear interpolation.
///
/// The position `alpha * (n - 1)` is located in the sorted values and the
/// result interpolates between the two surrounding order statistics. This is
/// the default quantile definition of most dataframe libraries.
///
/// # Arguments
/// * `values` - The values to compute the quantile over (NaNs are ignored)
/// * `alpha` - The quantile level in `[0, 1]`
/// * `scratch` - Scratch space for the sorted copy (will be resized if needed)
///
/// # Returns
/// The quantile value. Returns `f64::NAN` if there are no finite values.
pub fn quantile(values: &[f64], alpha: f64, scratch: &mut Vec<f64>) -> f64 {
    debug_assert!((0.0..=1.0).contains(&alpha));

    scratch.clear();
    scratch.extend(values.iter().copied().filter(|v| !v.is_nan()));

    let n = scratch.len();
    if n == 0 {
        return f64::NAN;
    }
    if n == 1 {
        return scratch[0];
    }

    scratch.sort_by(|a, b| a.total_cmp(b));

    let position = alpha * (n - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let fraction = position - lower as f64;

    scratch[lower] + (scratch[upper] - scratch[lower]) * fraction
}

/// Arithmetic mean of the non-NaN values. Returns `f64::NAN` if there are none.
pub fn nan_mean(values: impl IntoIterator<Item = f64>) -> f64 {
    let (sum, count) = values
        .into_iter()
        .filter(|v| !v.is_nan())
        .fold((0.0f64, 0usize), |(s, c), v| (s + v, c + 1));

    if count == 0 {
        f64::NAN
    } else {
        sum / count as f64
    }
}

/// Index of the largest value. Ties resolve to the lowest index.
#[inline]
pub fn argmax(values: impl IntoIterator<Item = f64>) -> usize {
    let mut best_idx = 0;
    let mut best_val = f64::NEG_INFINITY;
    for (idx, v) in values.into_iter().enumerate() {
        if v > best_val {
            best_val = v;
            best_idx = idx;
        }
    }
    best_idx
}

/// Round to a fixed number of decimal places.
#[inline]
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

// =============================================================================
// Parallelism Configuration
// =============================================================================

/// Whether parallel execution is allowed.
///
/// This is a simple flag passed through training components. When
/// `Parallel`, components may use `rayon` parallel iterators; when
/// `Sequential`, they must iterate on the calling thread.
///
/// The actual thread pool is set up at the trainer level via `n_threads`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Parallelism {
    Sequential,
    Parallel,
}

impl Parallelism {
    /// Create from thread count semantics.
    ///
    /// - 0 = auto (parallel if rayon pool has multiple threads, sequential otherwise)
    /// - 1 = sequential
    /// - >1 = parallel
    #[inline]
    pub fn from_threads(n_threads: usize) -> Self {
        if n_threads == 1 || (n_threads == 0 && rayon::current_num_threads() == 1) {
            Parallelism::Sequential
        } else {
            Parallelism::Parallel
        }
    }

    /// Returns `true` if parallel execution is allowed.
    #[inline]
    pub fn is_parallel(self) -> bool {
        matches!(self, Parallelism::Parallel)
    }

    /// Map over an iterator, in parallel when allowed. Output order matches input order.
    #[inline]
    pub fn maybe_par_map<T, B, I, F>(self, iter: I, f: F) -> Vec<B>
    where
        T: Send,
        B: Send,
        I: IntoIterator<Item = T> + IntoParallelIterator<Item = T>,
        F: Fn(T) -> B + Sync + Send,
    {
        if self.is_parallel() {
            iter.into_par_iter().map(f).collect()
        } else {
            iter.into_iter().map(f).collect()
        }
    }
}

// =============================================================================
// Thread Pool Setup
// =============================================================================

/// Run a closure with the appropriate thread pool.
///
/// Thread count semantics:
/// - `0` = auto (use the global rayon pool)
/// - `1` = sequential (no thread pool)
/// - `n > 1` = use exactly `n` threads
///
/// If a dedicated pool cannot be built the closure runs sequentially.
pub fn run_with_threads<T: Send>(n_threads: usize, f: impl FnOnce(Parallelism) -> T + Send) -> T {
    match Parallelism::from_threads(n_threads) {
        Parallelism::Sequential => f(Parallelism::Sequential),
        Parallelism::Parallel if n_threads == 0 => f(Parallelism::Parallel),
        Parallelism::Parallel => {
            match rayon::ThreadPoolBuilder::new().num_threads(n_threads).build() {
                Ok(pool) => pool.install(|| f(Parallelism::Parallel)),
                Err(err) => {
                    tracing::warn!(%err, "failed to build thread pool, running sequentially");
                    f(Parallelism::Sequential)
                }
            }
        }
    }
}
