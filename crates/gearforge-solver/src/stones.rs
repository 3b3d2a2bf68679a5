//! Greedy stone selection.

use std::cmp::Ordering;

use gearforge_core::{compare_scores, Effects, ScoreVec};

use crate::normalize::AnnotatedStone;

/// Outcome of a greedy fill: the picked stones in pick order, plus the
/// base ledger with all of them merged in.
pub struct StoneFill<'a> {
    pub stones: Vec<&'a AnnotatedStone>,
    pub effects: Effects,
}

/// Fills up to `budget` stone slots greedily from per-family queues.
///
/// Each step picks the family whose next queued stone yields the best
/// merged score and advances that family's cursor; queues must already
/// be sorted most promising first. Ties keep the earliest family.
/// Stops early once every queue is exhausted.
///
/// Marginal-gain picking is vulnerable to local minima: a stone pair
/// whose value only materializes together will not be found. In
/// practice stone effects compose monotonically and the error is
/// negligible next to the artifact choice it serves.
pub fn fill_stones<'a>(
    base: &Effects,
    budget: usize,
    queues: &[Vec<&'a AnnotatedStone>],
    score_fn: &dyn Fn(&Effects) -> ScoreVec,
) -> StoneFill<'a> {
    let mut effects = base.clone();
    let mut stones = Vec::new();
    let mut cursors = vec![0usize; queues.len()];

    for _ in 0..budget {
        let mut best_score = ScoreVec::new();
        let mut best_queue: Option<usize> = None;

        for (qi, queue) in queues.iter().enumerate() {
            let Some(candidate) = queue.get(cursors[qi]) else {
                continue;
            };
            let mut merged = effects.clone();
            merged.merge(&candidate.effects);
            let score = score_fn(&merged);
            if compare_scores(&score, &best_score) == Ordering::Greater {
                best_score = score;
                best_queue = Some(qi);
            }
        }

        let Some(qi) = best_queue else { break };
        let picked = queues[qi][cursors[qi]];
        effects.merge(&picked.effects);
        stones.push(picked);
        cursors[qi] += 1;
    }

    StoneFill { stones, effects }
}
