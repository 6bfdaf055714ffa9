//! Distance profiling and percentile-based breakpoint detection.
//!
//! ## From Embeddings to Boundaries
//!
//! ```text
//! Groups:     [G0]   [G1]   [G2]   [G3]   [G4]
//! Distances:      d0     d1     d2     d3        <- n-1 adjacent pairs
//!
//! threshold = percentile(d, 0.75)
//!
//! Breakpoints: every k where d[k] >= threshold
//! ```
//!
//! Distance is `1 - cosine_similarity`, with similarity clamped to `[0, 1]`
//! to absorb floating-point drift. A spike in the profile means consecutive
//! context windows stopped talking about the same thing — exactly where a
//! chunk edge belongs.
//!
//! ## Why a Percentile, Not a Fixed Threshold?
//!
//! Absolute distances vary wildly between embedding models and document
//! registers. A percentile adapts to each document's own distribution:
//! "split at the top quartile of *this* text's topic shifts" transfers
//! across models, a hardcoded `0.3` does not.
//!
//! ## Degenerate Inputs
//!
//! Missing embeddings (dropped groups upstream) contribute a neutral `0.5`
//! distance rather than failing the run. Non-finite samples are excluded
//! from the percentile; zero valid samples yield a threshold of `0`.

use crate::SegmentGroup;

/// Distance substituted when either side of a gap lacks an embedding.
const NEUTRAL_DISTANCE: f64 = 0.5;

/// Cosine distance `1 - cos(a, b)` in `[0, 1]`.
///
/// Similarity is clamped to `[0, 1]` and defined as `0` when either vector
/// has zero magnitude, so the distance for degenerate vectors is `1`.
#[must_use]
pub fn cosine_distance(a: &[f64], b: &[f64]) -> f64 {
    1.0 - cosine_similarity(a, b)
}

fn cosine_similarity(a: &[f64], b: &[f64]) -> f64 {
    let dot: f64 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f64 = a.iter().map(|x| x * x).sum::<f64>().sqrt();
    let norm_b: f64 = b.iter().map(|x| x * x).sum::<f64>().sqrt();

    if norm_a > 0.0 && norm_b > 0.0 {
        (dot / (norm_a * norm_b)).clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// Compute the `n - 1` adjacent distances for `n` groups.
///
/// Gaps touching a group without an embedding get a neutral `0.5`.
#[must_use]
pub fn distance_profile(groups: &[SegmentGroup]) -> Vec<f64> {
    groups
        .windows(2)
        .map(|pair| match (&pair[0].embedding, &pair[1].embedding) {
            (Some(a), Some(b)) => cosine_distance(a, b),
            _ => NEUTRAL_DISTANCE,
        })
        .collect()
}

/// Linear-interpolated percentile over the finite samples of `distances`.
///
/// For `m` valid samples sorted ascending and `p` in `[0, 1]`, the result
/// interpolates at rank `p * (m - 1)`:
///
/// ```rust
/// use seams::percentile_threshold;
///
/// let threshold = percentile_threshold(&[0.1, 0.2, 0.3, 0.4], 0.5);
/// assert!((threshold - 0.25).abs() < 1e-12);
/// ```
///
/// Zero valid samples yield `0`; one valid sample yields that sample.
#[must_use]
pub fn percentile_threshold(distances: &[f64], percentile: f64) -> f64 {
    let mut valid: Vec<f64> = distances.iter().copied().filter(|d| d.is_finite()).collect();
    if valid.is_empty() {
        return 0.0;
    }
    if valid.len() == 1 {
        return valid[0];
    }

    valid.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let rank = percentile.clamp(0.0, 1.0) * (valid.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let frac = rank - rank.floor();

    if lower + 1 >= valid.len() {
        return valid[valid.len() - 1];
    }
    valid[lower] * (1.0 - frac) + valid[lower + 1] * frac
}

/// Indices whose distance reaches the threshold.
///
/// Index `k` refers to the gap between group `k` and `k + 1`. The
/// comparison is inclusive: an exact tie with the threshold is a
/// breakpoint. Returned indices are strictly increasing.
#[must_use]
pub fn detect_breakpoints(distances: &[f64], threshold: f64) -> Vec<usize> {
    distances
        .iter()
        .enumerate()
        .filter(|(_, d)| d.is_finite() && **d >= threshold)
        .map(|(k, _)| k)
        .collect()
}
