//! Score vectors and tolerance-aware comparison.
//!
//! Every objective in Gearforge is expressed as an ordered tuple of
//! floats compared lexicographically: the caller encodes objective
//! priority purely by coordinate position. Chained multiplicative
//! effect composition makes bit-exact float equality meaningless, so
//! every comparison between two derived scores goes through the same
//! relative-tolerance equality.

use std::cmp::Ordering;

use smallvec::SmallVec;

/// Ordered objective tuple produced by a scoring function.
///
/// Sets never track more than a handful of objectives, so the vector
/// stays inline.
pub type ScoreVec = SmallVec<[f64; 4]>;

/// Relative tolerance used for all derived-score comparisons.
pub const REL_TOLERANCE: f64 = 1e-9;

/// Returns true if `a` and `b` are equal up to [`REL_TOLERANCE`].
///
/// NaN is never close to anything, including itself.
pub fn is_close(a: f64, b: f64) -> bool {
    if a.is_nan() || b.is_nan() {
        return false;
    }
    if a == b {
        return true;
    }
    if !a.is_finite() || !b.is_finite() {
        return false;
    }
    (a - b).abs() <= REL_TOLERANCE * f64::max(a.abs(), b.abs())
}

/// Lexicographic comparison between score vectors.
///
/// Coordinates are compared in order with tolerance-aware equality;
/// the first decisive coordinate wins. When one vector is a prefix of
/// the other, the longer vector wins (an empty vector is the identity
/// "worst score", which lets an incumbent be seeded from nothing).
pub fn compare_scores(a: &[f64], b: &[f64]) -> Ordering {
    for (x, y) in a.iter().zip(b.iter()) {
        if !is_close(*x, *y) {
            return x.partial_cmp(y).unwrap_or(Ordering::Equal);
        }
    }
    a.len().cmp(&b.len())
}
