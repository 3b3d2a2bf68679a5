//! Reslotting minimization: among score-equivalent solutions, pick the
//! physical assignment that moves the fewest stones.

use std::collections::BTreeMap;

use gearforge_core::{Artifact, GearforgeError, Result, Stone, StoneKey};
use tracing::debug;

use crate::iter::CartesianProduct;
use crate::normalize::{AnnotatedArtifact, AnnotatedStone};

/// One score-optimal selection produced by the search: the chosen
/// equivalence classes and the stones the greedy filler picked.
#[derive(Debug, Clone)]
pub struct CandidateSolution<'a> {
    pub artifacts: Vec<&'a AnnotatedArtifact>,
    pub stones: Vec<&'a AnnotatedStone>,
}

/// Picks, over all solutions and all equivalence-class member
/// combinations, the concrete artifact assignment whose stone layout
/// is closest to the desired one, and slots the stones into it.
///
/// The cost of an assignment is the number of desired stones its
/// artifacts do not already hold. A zero-cost assignment short-circuits
/// the scan. Equal positive costs are broken deterministically by the
/// assignment's item-id sequence, lowest first, so reruns over the
/// same inventory produce the same set.
pub fn minimal_reslotting(solutions: &[CandidateSolution<'_>]) -> Result<Vec<Artifact>> {
    let mut best: Option<(usize, Vec<u64>, Vec<Artifact>)> = None;

    'solutions: for solution in solutions {
        let desired = stone_counts(solution.stones.iter().map(|s| &s.stone));
        let axes: Vec<&[Artifact]> = solution
            .artifacts
            .iter()
            .map(|class| class.artifacts.as_slice())
            .collect();

        for members in CartesianProduct::new(axes) {
            let cost = reslot_cost(&members, &desired);
            let ids: Vec<u64> = members.iter().map(|a| a.id).collect();
            let better = match &best {
                None => true,
                Some((best_cost, best_ids, _)) => {
                    cost < *best_cost || (cost == *best_cost && ids < *best_ids)
                }
            };
            if !better {
                continue;
            }

            let mut set: Vec<Artifact> = members.into_iter().cloned().collect();
            let stones: Vec<&Stone> = solution.stones.iter().map(|s| &s.stone).collect();
            let moved = assign_stones(&mut set, &stones);
            debug!(cost, moved, "improved reslotting assignment");

            let found_zero = cost == 0;
            best = Some((cost, ids, set));
            if found_zero {
                break 'solutions;
            }
        }
    }

    match best {
        Some((_, _, set)) => Ok(set),
        None => Err(GearforgeError::Inconsistency(
            "candidate solution contains an empty equivalence class".into(),
        )),
    }
}

/// Number of desired stones the assignment's artifacts do not already
/// hold in their slots.
fn reslot_cost(members: &[&Artifact], desired: &BTreeMap<StoneKey, i64>) -> usize {
    let mut missing = desired.clone();
    for artifact in members {
        for stone in artifact.slotted() {
            if let Some(count) = missing.get_mut(&stone.key()) {
                *count -= 1;
            }
        }
    }
    missing.values().map(|&c| c.max(0) as usize).sum()
}

fn stone_counts<'a>(stones: impl Iterator<Item = &'a Stone>) -> BTreeMap<StoneKey, i64> {
    let mut counts = BTreeMap::new();
    for stone in stones {
        *counts.entry(stone.key()).or_insert(0) += 1;
    }
    counts
}

/// Slots `stones` into `set` with the fewest moves, and records what
/// moved for display.
///
/// Stones already in place that the desired layout still wants stay
/// put and are marked unmoved. Open slots are refilled first, then
/// slots holding a movable stone the layout no longer wants, in
/// encounter order. Every placed stone gets its `reslotted` flag set
/// and its artifact's `reslotted` counter bumped. Returns the number
/// of slots that needed a change.
pub fn assign_stones(set: &mut [Artifact], stones: &[&Stone]) -> usize {
    let mut wanted = stone_counts(stones.iter().copied());

    // (artifact index, slot index), open slots first.
    let mut to_fill: Vec<(usize, usize)> = Vec::new();
    let mut to_replace: Vec<(usize, usize)> = Vec::new();

    for (ai, artifact) in set.iter_mut().enumerate() {
        for (si, slot) in artifact.stones.iter_mut().enumerate() {
            match slot {
                None => to_fill.push((ai, si)),
                Some(stone) if !stone.reslotted => {}
                Some(stone) => {
                    let count = wanted.get_mut(&stone.key());
                    match count {
                        Some(count) if *count > 0 => {
                            *count -= 1;
                            stone.reslotted = false;
                        }
                        _ => to_replace.push((ai, si)),
                    }
                }
            }
        }
    }
    to_fill.extend(to_replace);
    let changed = to_fill.len();

    let mut remaining: Vec<Stone> = Vec::new();
    for stone in stones {
        if let Some(count) = wanted.get_mut(&stone.key()) {
            if *count > 0 {
                *count -= 1;
                remaining.push((*stone).clone());
            }
        }
    }

    for ((ai, si), mut stone) in to_fill.into_iter().zip(remaining) {
        stone.reslotted = true;
        set[ai].stones[si] = Some(stone);
        set[ai].reslotted += 1;
    }
    changed
}
