/*!
 * Constant-Time Tag Comparison
 *
 * Tag verification is the single point where GCM can leak through timing.
 * Comparison here always visits every byte of the expected tag and folds the
 * outcome into a `subtle::Choice`, so neither the position nor the count of
 * differing bytes influences the work done.
 */

use std::hint::black_box;
use std::sync::atomic::{compiler_fence, Ordering};
use std::time::{Duration, Instant};

use subtle::{Choice, ConstantTimeEq};

use crate::error::{error_codes, CryptoError, CryptoResult};

#[cfg(test)]
thread_local! {
    static BYTE_COMPARISONS: std::cell::Cell<usize> = std::cell::Cell::new(0);
}

#[cfg(test)]
fn record_comparison() {
    BYTE_COMPARISONS.with(|count| count.set(count.get() + 1));
}

#[cfg(not(test))]
#[inline(always)]
fn record_comparison() {}

/// Reset and return the number of byte comparisons made on this thread
#[cfg(test)]
pub(crate) fn take_comparison_count() -> usize {
    BYTE_COMPARISONS.with(|count| count.replace(0))
}

/// Compare a computed tag against a received one.
///
/// Every byte of `expected` is compared exactly once. A length mismatch is
/// folded into the result instead of returning early; tag lengths are public
/// so only the contents need protecting.
pub fn tags_equal(expected: &[u8], received: &[u8]) -> Choice {
    let same_len = (expected.len() as u64).ct_eq(&(received.len() as u64));

    let mut equal = Choice::from(1u8);
    for (i, e) in expected.iter().enumerate() {
        let r = received.get(i).copied().unwrap_or(0);
        record_comparison();
        equal &= e.ct_eq(&r);
    }

    equal & same_len
}

/// Configuration for the comparison timing harness
#[derive(Debug, Clone)]
pub struct ComparisonTimingConfig {
    pub iterations: usize,
    pub warmup_iterations: usize,
    pub tag_len: usize,
}

impl Default for ComparisonTimingConfig {
    fn default() -> Self {
        Self {
            iterations: 10_000,
            warmup_iterations: 1_000,
            tag_len: 16,
        }
    }
}

/// Timing summary for mismatches at the first versus the last tag byte
#[derive(Debug, Clone)]
pub struct ComparisonTiming {
    pub early_mismatch_mean: Duration,
    pub late_mismatch_mean: Duration,
    pub early_mismatch_std_dev_ns: f64,
    pub late_mismatch_std_dev_ns: f64,
    pub samples: usize,
}

impl ComparisonTiming {
    /// Welch's t statistic between the two mismatch positions
    pub fn welch_t(&self) -> f64 {
        let n = self.samples as f64;
        let mean_diff =
            self.early_mismatch_mean.as_nanos() as f64 - self.late_mismatch_mean.as_nanos() as f64;
        let se = (self.early_mismatch_std_dev_ns.powi(2) / n
            + self.late_mismatch_std_dev_ns.powi(2) / n)
            .sqrt();
        if se == 0.0 {
            0.0
        } else {
            mean_diff / se
        }
    }
}

/// Sample [`tags_equal`] with the first differing byte at the front and at
/// the back of the tag.
///
/// Measurements are interleaved so drift affects both series alike. A
/// non-constant-time comparison shows up as a large `welch_t`.
pub fn measure_comparison_timing(config: &ComparisonTimingConfig) -> CryptoResult<ComparisonTiming> {
    if config.iterations < 2 || config.tag_len == 0 {
        return Err(CryptoError::invalid_parameter_with_code(
            "timing_config",
            "at least 2 iterations and a non-empty tag",
            &format!("{} iterations, {}-byte tag", config.iterations, config.tag_len),
            error_codes::INVALID_CONFIG,
        ));
    }

    let expected = vec![0x5au8; config.tag_len];
    let mut early = expected.clone();
    early[0] ^= 0x01;
    let mut late = expected.clone();
    late[config.tag_len - 1] ^= 0x01;

    for _ in 0..config.warmup_iterations {
        black_box(tags_equal(black_box(&expected), black_box(&early)));
        black_box(tags_equal(black_box(&expected), black_box(&late)));
    }

    let mut early_ns = Vec::with_capacity(config.iterations);
    let mut late_ns = Vec::with_capacity(config.iterations);
    for _ in 0..config.iterations {
        early_ns.push(time_once(&expected, &early));
        late_ns.push(time_once(&expected, &late));
    }

    let (early_mean, early_sd) = mean_and_std_dev(&early_ns);
    let (late_mean, late_sd) = mean_and_std_dev(&late_ns);

    Ok(ComparisonTiming {
        early_mismatch_mean: Duration::from_nanos(early_mean as u64),
        late_mismatch_mean: Duration::from_nanos(late_mean as u64),
        early_mismatch_std_dev_ns: early_sd,
        late_mismatch_std_dev_ns: late_sd,
        samples: config.iterations,
    })
}

fn time_once(expected: &[u8], received: &[u8]) -> f64 {
    compiler_fence(Ordering::SeqCst);
    let start = Instant::now();
    black_box(tags_equal(black_box(expected), black_box(received)));
    compiler_fence(Ordering::SeqCst);
    start.elapsed().as_nanos() as f64
}

fn mean_and_std_dev(samples: &[f64]) -> (f64, f64) {
    let n = samples.len() as f64;
    let mean = samples.iter().sum::<f64>() / n;
    let variance = samples.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1.0);
    (mean, variance.sqrt())
}
