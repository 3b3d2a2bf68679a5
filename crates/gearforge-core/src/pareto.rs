//! Pareto-frontier extraction over scored entries.
//!
//! Entries are first collapsed into tie classes (tolerance-equal score
//! vectors), then dominated classes are discarded. All entries of a
//! surviving class are returned together so that callers never lose a
//! physically distinct item that happens to score identically to
//! another.

use tracing::warn;

use crate::score::{compare_scores, is_close, ScoreVec};

/// A tie class: one representative score and every entry carrying it.
struct TieClass<T> {
    /// Score of the first (best-sorted) entry in the class.
    score: ScoreVec,
    /// Score of the most recently joined entry; equality chains off
    /// this one, so it can drift from the representative.
    last: ScoreVec,
    entries: Vec<T>,
}

/// Returns the non-dominated entries among `entries`, grouped into tie
/// classes of tolerance-equal scores.
///
/// A class is dominated when some other class is at least as good in
/// every coordinate and strictly better in one. All score vectors must
/// have the same length. Extraction is idempotent: re-running it on a
/// flattened frontier returns the same classes.
pub fn pareto_frontier<T>(entries: Vec<(ScoreVec, T)>) -> Vec<Vec<T>> {
    let classes = group_equivalent(entries);
    if classes.iter().all(|c| c.score.len() == 2) {
        frontier_2d(classes)
    } else {
        frontier_generic(classes)
    }
}

/// Groups entries whose scores compare equal under the relative
/// tolerance.
///
/// Because tolerance-equality is not transitive, a chain of pairwise
/// close scores can drift; that indicates scores far too close to be
/// meaningfully distinct and is reported once per group.
fn group_equivalent<T>(entries: Vec<(ScoreVec, T)>) -> Vec<TieClass<T>> {
    let mut sorted = entries;
    sorted.sort_by(|a, b| compare_scores(&b.0, &a.0));

    let mut classes: Vec<TieClass<T>> = Vec::new();
    for (score, entry) in sorted {
        match classes.last_mut() {
            Some(class)
                if compare_scores(&class.last, &score) == std::cmp::Ordering::Equal =>
            {
                class.last = score;
                class.entries.push(entry);
            }
            _ => classes.push(TieClass {
                last: score.clone(),
                score,
                entries: vec![entry],
            }),
        }
    }

    for class in &classes {
        let drifted = class
            .score
            .iter()
            .zip(class.last.iter())
            .any(|(a, b)| !is_close(*a, *b));
        if drifted {
            warn!(score = ?class.score, size = class.entries.len(),
                "tie class scores drifted beyond tolerance");
        }
    }
    classes
}

/// O(n log n) sweep for two-coordinate scores.
///
/// Classes arrive sorted descending; a class survives iff its second
/// coordinate strictly exceeds the best second coordinate seen so far.
fn frontier_2d<T>(classes: Vec<TieClass<T>>) -> Vec<Vec<T>> {
    let mut frontier = Vec::new();
    let mut best_y = f64::NEG_INFINITY;
    for class in classes {
        let y = class.score[1];
        if y > best_y && !is_close(y, best_y) {
            best_y = y;
            frontier.push(class.entries);
        }
    }
    frontier
}

/// O(n²) pairwise check for arbitrary score dimension.
fn frontier_generic<T>(classes: Vec<TieClass<T>>) -> Vec<Vec<T>> {
    let scores: Vec<ScoreVec> = classes.iter().map(|c| c.score.clone()).collect();
    classes
        .into_iter()
        .enumerate()
        .filter(|(i, class)| {
            !scores
                .iter()
                .enumerate()
                .any(|(j, other)| j != *i && dominates(other, &class.score))
        })
        .map(|(_, class)| class.entries)
        .collect()
}

/// True when `a` is at least as good as `b` everywhere and strictly
/// better somewhere, under the relative tolerance.
fn dominates(a: &[f64], b: &[f64]) -> bool {
    debug_assert_eq!(a.len(), b.len());
    let mut strictly = false;
    for (x, y) in a.iter().zip(b.iter()) {
        if is_close(*x, *y) {
            continue;
        }
        if x < y {
            return false;
        }
        strictly = true;
    }
    strictly
}

#[cfg(test)]
mod tests {
    use super::*;
    use smallvec::smallvec;

    fn entry(score: &[f64], tag: u32) -> (ScoreVec, u32) {
        (ScoreVec::from_slice(score), tag)
    }

    #[test]
    fn dominated_entries_are_dropped() {
        let frontier = pareto_frontier(vec![
            entry(&[3.0, 1.0], 1),
            entry(&[2.0, 2.0], 2),
            entry(&[1.0, 1.0], 3), // dominated by both
            entry(&[1.0, 3.0], 4),
        ]);
        let flat: Vec<u32> = frontier.into_iter().flatten().collect();
        assert_eq!(flat, vec![1, 2, 4]);
    }

    #[test]
    fn tied_scores_stay_in_one_class() {
        let frontier = pareto_frontier(vec![
            entry(&[2.0, 2.0], 1),
            entry(&[2.0 + 1e-12, 2.0], 2),
            entry(&[1.0, 1.0], 3),
        ]);
        assert_eq!(frontier.len(), 1);
        assert_eq!(frontier[0].len(), 2);
    }

    #[test]
    fn fast_path_agrees_with_generic() {
        let entries = vec![
            entry(&[5.0, 0.0], 1),
            entry(&[4.0, 4.0], 2),
            entry(&[4.0, 1.0], 3),
            entry(&[0.0, 5.0], 4),
            entry(&[3.0, 3.0], 5),
        ];
        let via_2d = pareto_frontier(entries.clone());

        // Pad with a constant third coordinate to force the generic
        // path; the frontier must not change.
        let padded: Vec<(ScoreVec, u32)> = entries
            .into_iter()
            .map(|(mut s, t)| {
                s.push(7.0);
                (s, t)
            })
            .collect();
        let via_generic = pareto_frontier(padded);

        let a: Vec<u32> = via_2d.into_iter().flatten().collect();
        let b: Vec<u32> = via_generic.into_iter().flatten().collect();
        assert_eq!(a, b);
    }

    #[test]
    fn extraction_is_idempotent() {
        let entries = vec![
            entry(&[3.0, 1.0, 2.0], 1),
            entry(&[1.0, 3.0, 2.0], 2),
            entry(&[2.0, 2.0, 2.0], 3),
            entry(&[1.0, 1.0, 1.0], 4),
        ];
        let first = pareto_frontier(entries);
        let rescored: Vec<(ScoreVec, u32)> = first
            .iter()
            .flatten()
            .map(|&t| {
                let s: ScoreVec = match t {
                    1 => smallvec![3.0, 1.0, 2.0],
                    2 => smallvec![1.0, 3.0, 2.0],
                    _ => smallvec![2.0, 2.0, 2.0],
                };
                (s, t)
            })
            .collect();
        let second = pareto_frontier(rescored);
        let a: Vec<u32> = first.into_iter().flatten().collect();
        let b: Vec<u32> = second.into_iter().flatten().collect();
        assert_eq!(a, b);
    }

    #[test]
    fn single_entry_survives() {
        let frontier = pareto_frontier(vec![entry(&[1.0], 9)]);
        assert_eq!(frontier, vec![vec![9]]);
    }

    #[test]
    fn empty_input_yields_empty_frontier() {
        let frontier: Vec<Vec<u32>> = pareto_frontier(Vec::new());
        assert!(frontier.is_empty());
    }
}
