//! Branch-and-bound search for the best artifact set.
//!
//! Families are the branching unit: each recursion level either places
//! one candidate of the current family or skips the family entirely.
//! Pruning relies on an optimistic, generally unreachable upper bound
//! (see [`Effects::bound`]) so a branch is only abandoned when even its
//! best imaginable completion cannot match the incumbent.

use std::cmp::Ordering;

use gearforge_core::{
    compare_scores, ArtifactFamily, ArtifactSet, Catalog, EffectQuery, Effects, GearforgeError,
    Item, Result, ScoreVec, StoneFamily,
};
use tracing::debug;

use crate::normalize::{AnnotatedArtifact, AnnotatedStone, Normalized, MAX_SET_STONES};
use crate::reslot::{minimal_reslotting, CandidateSolution};
use crate::stones::fill_stones;

/// Caller constraints on a search.
#[derive(Debug, Clone, Default)]
pub struct SearchOptions {
    /// Families that must appear in every reported solution. A
    /// required family without candidates makes the search infeasible.
    pub required_families: Vec<ArtifactFamily>,
    /// Families allowed beyond the required ones; `None` allows all.
    pub optional_families: Option<Vec<ArtifactFamily>>,
    /// Stone families the filler may draw from; `None` allows all.
    pub stone_families: Option<Vec<StoneFamily>>,
    /// Seeds the incumbent: only selections scoring at least this are
    /// reported, and pruning kicks in immediately.
    pub minimum_score: Option<ScoreVec>,
    /// Effects contributed by everything outside the set.
    pub baseline: Option<Effects>,
}

impl SearchOptions {
    pub fn new() -> Self {
        SearchOptions::default()
    }

    pub fn with_required_families(mut self, families: Vec<ArtifactFamily>) -> Self {
        self.required_families = families;
        self
    }

    pub fn with_optional_families(mut self, families: Vec<ArtifactFamily>) -> Self {
        self.optional_families = Some(families);
        self
    }

    pub fn with_stone_families(mut self, families: Vec<StoneFamily>) -> Self {
        self.stone_families = Some(families);
        self
    }

    pub fn with_minimum_score(mut self, score: ScoreVec) -> Self {
        self.minimum_score = Some(score);
        self
    }

    pub fn with_baseline(mut self, baseline: Effects) -> Self {
        self.baseline = Some(baseline);
        self
    }
}

struct FamilyEntry<'a> {
    family: ArtifactFamily,
    candidates: Vec<&'a AnnotatedArtifact>,
}

struct SearchContext<'a, 'f> {
    families: Vec<FamilyEntry<'a>>,
    required_len: usize,
    queues: Vec<Vec<&'a AnnotatedStone>>,
    /// `suffix_bounds[i]` bounds everything reachable from family `i`
    /// onward; the last entry is neutral.
    suffix_bounds: Vec<Effects>,
    max_slot: usize,
    baseline: Effects,
    score_fn: &'f dyn Fn(&Effects) -> ScoreVec,
}

struct SearchState<'a> {
    chosen: Vec<&'a AnnotatedArtifact>,
    best_score: ScoreVec,
    solutions: Vec<CandidateSolution<'a>>,
    nodes: u64,
}

/// Searches for the artifact set maximizing `score_fn` under the given
/// constraints.
///
/// `normalized` comes from [`crate::normalize::normalize`]; `max_slot`
/// is the number of artifacts a set may hold. All score-equivalent
/// optima are collected during the search and resolved into one
/// concrete set by the reslotting minimizer. Returns `Ok(None)` when
/// no selection satisfies the constraints.
pub fn search_set(
    normalized: &Normalized,
    catalog: &dyn Catalog,
    max_slot: usize,
    score_fn: &dyn Fn(&Effects) -> ScoreVec,
    options: &SearchOptions,
) -> Result<Option<ArtifactSet>> {
    for (i, family) in options.required_families.iter().enumerate() {
        if options.required_families[..i].contains(family) {
            return Err(GearforgeError::InvalidInput(format!(
                "required family {family:?} listed more than once"
            )));
        }
    }

    let baseline = options.baseline.clone().unwrap_or_default();

    let scored = |effects: &Effects| -> ScoreVec {
        let mut merged = baseline.clone();
        merged.merge(effects);
        score_fn(&merged)
    };
    let item_compare = |a: &Effects, b: &Effects| compare_scores(&scored(a), &scored(b));

    // Candidate lists per family, most promising first.
    let candidates_of = |family: ArtifactFamily| -> Vec<&AnnotatedArtifact> {
        let mut candidates: Vec<&AnnotatedArtifact> = normalized
            .artifacts
            .get(&family)
            .map(|c| c.iter().collect())
            .unwrap_or_default();
        candidates.sort_by(|a, b| {
            item_compare(&b.effects, &a.effects).then(b.open_slots.cmp(&a.open_slots))
        });
        candidates
    };

    let mut families: Vec<FamilyEntry<'_>> = Vec::new();
    for &family in &options.required_families {
        let candidates = candidates_of(family);
        if candidates.is_empty() {
            debug!(?family, "required family has no candidates");
            return Ok(None);
        }
        families.push(FamilyEntry { family, candidates });
    }
    let required_len = families.len();

    let mut optional: Vec<ArtifactFamily> = options
        .optional_families
        .clone()
        .unwrap_or_else(|| normalized.artifacts.keys().copied().collect());
    optional.retain(|f| !options.required_families.contains(f));
    let mut optional: Vec<FamilyEntry<'_>> = optional
        .into_iter()
        .map(|family| FamilyEntry {
            family,
            candidates: candidates_of(family),
        })
        .filter(|entry| !entry.candidates.is_empty())
        .collect();
    optional.sort_by(|a, b| {
        item_compare(&b.candidates[0].effects, &a.candidates[0].effects)
            .then(b.candidates[0].open_slots.cmp(&a.candidates[0].open_slots))
    });
    families.extend(optional);
    debug!(
        order = ?families.iter().map(|f| f.family).collect::<Vec<_>>(),
        required = required_len,
        "family search order"
    );

    // Stone queues, most promising first, capped at what a full set
    // can physically consume.
    let stone_families: Vec<StoneFamily> = options
        .stone_families
        .clone()
        .unwrap_or_else(|| normalized.stones.keys().copied().collect());
    let mut queues: Vec<Vec<&AnnotatedStone>> = stone_families
        .into_iter()
        .filter_map(|family| normalized.stones.get(&family))
        .map(|pool| {
            let mut queue: Vec<&AnnotatedStone> = pool.iter().collect();
            queue.sort_by(|a, b| item_compare(&b.effects, &a.effects));
            queue.truncate(MAX_SET_STONES);
            queue
        })
        .filter(|queue| !queue.is_empty())
        .collect();
    queues.sort_by(|a, b| item_compare(&b[0].effects, &a[0].effects));

    // Per-family optimistic ledgers, then suffix-combined for pruning.
    let family_bounds: Vec<Effects> = families
        .iter()
        .map(|entry| Effects::bound(entry.candidates.iter().map(|c| &c.effects)))
        .collect();
    let mut suffix_bounds = vec![Effects::new(); families.len() + 1];
    for idx in (0..families.len()).rev() {
        suffix_bounds[idx] = Effects::bound([&suffix_bounds[idx + 1], &family_bounds[idx]]);
    }

    let ctx = SearchContext {
        families,
        required_len,
        queues,
        suffix_bounds,
        max_slot,
        baseline,
        score_fn,
    };
    let mut state = SearchState {
        chosen: Vec::new(),
        best_score: options.minimum_score.clone().unwrap_or_default(),
        solutions: Vec::new(),
        nodes: 0,
    };
    rec(&ctx, &mut state, 0);

    let reslotting_options: u64 = state
        .solutions
        .iter()
        .map(|s| {
            s.artifacts
                .iter()
                .map(|class| class.artifacts.len() as u64)
                .product::<u64>()
        })
        .sum();
    debug!(
        nodes = state.nodes,
        candidate_sets = state.solutions.len(),
        reslotting_options,
        "search finished"
    );

    if state.solutions.is_empty() {
        return Ok(None);
    }

    let mut set = minimal_reslotting(&state.solutions)?;
    set.sort_by_key(|artifact| artifact.family);

    let query = EffectQuery {
        recursive: true,
        targets: None,
    };
    let ledgers: Vec<Effects> = set
        .iter()
        .map(|artifact| catalog.effects(&Item::Artifact(artifact.clone()), &query))
        .collect();
    let effects = Effects::merged(&ledgers);

    let mut set: Vec<Option<gearforge_core::Artifact>> = set.into_iter().map(Some).collect();
    set.resize(max_slot.max(set.len()), None);

    Ok(Some(ArtifactSet { set, effects }))
}

fn rec<'a>(ctx: &SearchContext<'a, '_>, state: &mut SearchState<'a>, idx: usize) {
    state.nodes += 1;

    let base_effects = Effects::merged(
        std::iter::once(&ctx.baseline).chain(state.chosen.iter().map(|c| &c.effects)),
    );
    let stone_budget: usize = state.chosen.iter().map(|c| c.open_slots).sum();

    // Evaluate the current selection once every required family is in.
    if idx >= ctx.required_len {
        let fill = fill_stones(&base_effects, stone_budget, &ctx.queues, ctx.score_fn);
        let score = (ctx.score_fn)(&fill.effects);
        match compare_scores(&score, &state.best_score) {
            Ordering::Greater => {
                state.solutions.clear();
                state.solutions.push(CandidateSolution {
                    artifacts: state.chosen.clone(),
                    stones: fill.stones,
                });
                state.best_score = score;
            }
            Ordering::Equal => {
                state.solutions.push(CandidateSolution {
                    artifacts: state.chosen.clone(),
                    stones: fill.stones,
                });
                state.best_score = score;
            }
            Ordering::Less => {}
        }
    }

    if state.chosen.len() >= ctx.max_slot || idx >= ctx.families.len() {
        return;
    }

    // Optimistic completion: merge the undecided-family bound once per
    // free slot and fill three speculative stone slots per free slot.
    // If even that cannot reach the incumbent, the branch is dead.
    let remaining = ctx.max_slot - state.chosen.len();
    let mut optimistic = base_effects;
    for _ in 0..remaining {
        optimistic.merge(&ctx.suffix_bounds[idx]);
    }
    let fill = fill_stones(
        &optimistic,
        stone_budget + remaining * 3,
        &ctx.queues,
        ctx.score_fn,
    );
    if compare_scores(&(ctx.score_fn)(&fill.effects), &state.best_score) == Ordering::Less {
        return;
    }

    for &candidate in &ctx.families[idx].candidates {
        state.chosen.push(candidate);
        rec(ctx, state, idx + 1);
        state.chosen.pop();
    }
    // Skipping is only legal once the required prefix is satisfied.
    if idx >= ctx.required_len {
        rec(ctx, state, idx + 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gearforge_core::{EffectId, Item, Rarity};
    use gearforge_test::{artifact, stone, StaticCatalog};

    use crate::normalize::{normalize, ReslotMode};

    fn soul_score(effects: &Effects) -> ScoreVec {
        ScoreVec::from_slice(&[effects.get(EffectId::SoulEggBonus)])
    }

    const FAMILIES: [ArtifactFamily; 5] = [
        ArtifactFamily::BookOfBasan,
        ArtifactFamily::LunarTotem,
        ArtifactFamily::DemetersNecklace,
        ArtifactFamily::TungstenAnkh,
        ArtifactFamily::AurelianBrooch,
    ];

    // One artifact per family, each adding family-index tenths to the
    // soul egg bonus.
    fn graded_world() -> (StaticCatalog, Vec<Item>) {
        let mut catalog = StaticCatalog::new();
        let mut items = Vec::new();
        for (i, &family) in FAMILIES.iter().enumerate() {
            catalog = catalog.with_artifact(
                family,
                1,
                Rarity::Common,
                [(EffectId::SoulEggBonus, (i + 1) as f64 * 0.1)],
            );
            items.push(Item::Artifact(artifact(family, 1, Rarity::Common, i as u64, 0)));
        }
        (catalog, items)
    }

    #[test]
    fn picks_the_best_families_under_the_slot_budget() {
        let (catalog, items) = graded_world();
        let normalized = normalize(&items, &catalog, ReslotMode::Full, None, None);

        let result = search_set(&normalized, &catalog, 4, &soul_score, &SearchOptions::new())
            .unwrap()
            .unwrap();

        // Top four of the five families: 0.2 + 0.3 + 0.4 + 0.5.
        assert!((result.effects.get(EffectId::SoulEggBonus) - 1.4).abs() < 1e-9);
        let chosen: Vec<ArtifactFamily> =
            result.set.iter().flatten().map(|a| a.family).collect();
        assert_eq!(chosen.len(), 4);
        assert!(!chosen.contains(&ArtifactFamily::BookOfBasan));
    }

    #[test]
    fn pads_unused_slots_with_none() {
        let (catalog, items) = graded_world();
        let normalized = normalize(&items[..2], &catalog, ReslotMode::Full, None, None);

        let result = search_set(&normalized, &catalog, 4, &soul_score, &SearchOptions::new())
            .unwrap()
            .unwrap();
        assert_eq!(result.set.len(), 4);
        assert_eq!(result.set.iter().flatten().count(), 2);
    }

    #[test]
    fn required_family_without_candidates_is_infeasible() {
        let (catalog, items) = graded_world();
        let normalized = normalize(&items, &catalog, ReslotMode::Full, None, None);

        let options = SearchOptions::new()
            .with_required_families(vec![ArtifactFamily::MercurysLens]);
        let result = search_set(&normalized, &catalog, 4, &soul_score, &options).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn required_family_is_always_included() {
        let (catalog, items) = graded_world();
        let normalized = normalize(&items, &catalog, ReslotMode::Full, None, None);

        // Force the weakest family in; only three free slots remain.
        let options = SearchOptions::new()
            .with_required_families(vec![ArtifactFamily::BookOfBasan]);
        let result = search_set(&normalized, &catalog, 4, &soul_score, &options)
            .unwrap()
            .unwrap();
        let chosen: Vec<ArtifactFamily> =
            result.set.iter().flatten().map(|a| a.family).collect();
        assert!(chosen.contains(&ArtifactFamily::BookOfBasan));
        assert!((result.effects.get(EffectId::SoulEggBonus) - 1.3).abs() < 1e-9);
    }

    #[test]
    fn families_outside_the_optional_list_are_never_equipped() {
        let (catalog, items) = graded_world();
        let normalized = normalize(&items, &catalog, ReslotMode::Full, None, None);

        // Only the two weakest families are allowed; the stronger ones
        // must not appear even though slots remain.
        let allowed = vec![FAMILIES[0], FAMILIES[1]];
        let options = SearchOptions::new().with_optional_families(allowed.clone());
        let result = search_set(&normalized, &catalog, 4, &soul_score, &options)
            .unwrap()
            .unwrap();

        let chosen: Vec<ArtifactFamily> =
            result.set.iter().flatten().map(|a| a.family).collect();
        assert_eq!(chosen.len(), 2);
        assert!(chosen.iter().all(|f| allowed.contains(f)));
        assert!((result.effects.get(EffectId::SoulEggBonus) - 0.3).abs() < 1e-9);
    }

    #[test]
    fn filler_only_draws_from_allowed_stone_families() {
        let catalog = StaticCatalog::new()
            .with_artifact(
                ArtifactFamily::BookOfBasan,
                1,
                Rarity::Common,
                [(EffectId::SoulEggBonus, 0.2)],
            )
            .with_stone(StoneFamily::SoulStone, 2, [(EffectId::SoulEggBonus, 0.05)])
            .with_stone(
                StoneFamily::ProphecyStone,
                2,
                [(EffectId::SoulEggBonus, 0.04)],
            );
        let items = vec![
            Item::Artifact(artifact(ArtifactFamily::BookOfBasan, 1, Rarity::Common, 1, 2)),
            Item::Stone(stone(StoneFamily::SoulStone, 2, 10, 2)),
            Item::Stone(stone(StoneFamily::ProphecyStone, 2, 11, 2)),
        ];
        let normalized = normalize(&items, &catalog, ReslotMode::Full, None, None);

        // The stronger soul stones are off limits.
        let options =
            SearchOptions::new().with_stone_families(vec![StoneFamily::ProphecyStone]);
        let result = search_set(&normalized, &catalog, 1, &soul_score, &options)
            .unwrap()
            .unwrap();

        let chosen = result.set.iter().flatten().next().unwrap();
        assert!(chosen
            .slotted()
            .all(|s| s.family == StoneFamily::ProphecyStone));
        assert_eq!(chosen.slotted().count(), 2);
        assert!((result.effects.get(EffectId::SoulEggBonus) - 0.28).abs() < 1e-9);
    }

    #[test]
    fn duplicate_required_family_is_rejected() {
        let (catalog, items) = graded_world();
        let normalized = normalize(&items, &catalog, ReslotMode::Full, None, None);

        let options = SearchOptions::new().with_required_families(vec![
            ArtifactFamily::BookOfBasan,
            ArtifactFamily::BookOfBasan,
        ]);
        let result = search_set(&normalized, &catalog, 4, &soul_score, &options);
        assert!(matches!(
            result,
            Err(gearforge_core::GearforgeError::InvalidInput(_))
        ));
    }

    #[test]
    fn unreachable_minimum_score_yields_none() {
        let (catalog, items) = graded_world();
        let normalized = normalize(&items, &catalog, ReslotMode::Full, None, None);

        let options =
            SearchOptions::new().with_minimum_score(ScoreVec::from_slice(&[100.0]));
        let result = search_set(&normalized, &catalog, 4, &soul_score, &options).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn reachable_minimum_score_still_reports_the_optimum() {
        let (catalog, items) = graded_world();
        let normalized = normalize(&items, &catalog, ReslotMode::Full, None, None);

        let options = SearchOptions::new().with_minimum_score(ScoreVec::from_slice(&[1.0]));
        let result = search_set(&normalized, &catalog, 4, &soul_score, &options)
            .unwrap()
            .unwrap();
        assert!((result.effects.get(EffectId::SoulEggBonus) - 1.4).abs() < 1e-9);
    }

    #[test]
    fn dominated_candidates_do_not_change_the_result() {
        let (catalog, mut items) = graded_world();
        let catalog = catalog.with_artifact(
            FAMILIES[4],
            0,
            Rarity::Common,
            [(EffectId::SoulEggBonus, 0.01)],
        );
        let baseline_result = {
            let normalized = normalize(&items, &catalog, ReslotMode::Full, None, None);
            search_set(&normalized, &catalog, 4, &soul_score, &SearchOptions::new())
                .unwrap()
                .unwrap()
        };

        // A strictly worse duplicate in the strongest family.
        items.push(Item::Artifact(artifact(FAMILIES[4], 0, Rarity::Common, 99, 0)));
        let normalized = normalize(&items, &catalog, ReslotMode::Full, None, None);
        let result = search_set(&normalized, &catalog, 4, &soul_score, &SearchOptions::new())
            .unwrap()
            .unwrap();

        assert_eq!(
            result.effects.get(EffectId::SoulEggBonus),
            baseline_result.effects.get(EffectId::SoulEggBonus)
        );
    }

    #[test]
    fn baseline_effects_steer_the_choice() {
        let catalog = StaticCatalog::new()
            .with_artifact(
                ArtifactFamily::OrnateGusset,
                1,
                Rarity::Common,
                [(EffectId::HabCapacityBase, 100.0)],
            )
            .with_artifact(
                ArtifactFamily::LunarTotem,
                1,
                Rarity::Common,
                [(EffectId::HabCapacityMult, 2.0)],
            );
        let items = vec![
            Item::Artifact(artifact(ArtifactFamily::OrnateGusset, 1, Rarity::Common, 1, 0)),
            Item::Artifact(artifact(ArtifactFamily::LunarTotem, 1, Rarity::Common, 2, 0)),
        ];
        let normalized = normalize(&items, &catalog, ReslotMode::Full, None, None);
        let hab_score = |effects: &Effects| -> ScoreVec {
            ScoreVec::from_slice(&[
                effects.get(EffectId::HabCapacityBase) * effects.get(EffectId::HabCapacityMult),
            ])
        };

        // Without a baseline the base-capacity artifact is the only
        // one producing a non-zero score.
        let result = search_set(&normalized, &catalog, 1, &hab_score, &SearchOptions::new())
            .unwrap()
            .unwrap();
        assert_eq!(
            result.set.iter().flatten().next().map(|a| a.family),
            Some(ArtifactFamily::OrnateGusset)
        );

        // With a large external base capacity, doubling it wins.
        let baseline: Effects = [(EffectId::HabCapacityBase, 1000.0)].into_iter().collect();
        let options = SearchOptions::new().with_baseline(baseline);
        let result = search_set(&normalized, &catalog, 1, &hab_score, &options)
            .unwrap()
            .unwrap();
        assert_eq!(
            result.set.iter().flatten().next().map(|a| a.family),
            Some(ArtifactFamily::LunarTotem)
        );
    }

    #[test]
    fn open_slots_get_filled_from_the_stone_pool() {
        let catalog = StaticCatalog::new()
            .with_artifact(
                ArtifactFamily::BookOfBasan,
                1,
                Rarity::Common,
                [(EffectId::SoulEggBonus, 0.2)],
            )
            .with_stone(
                gearforge_core::StoneFamily::SoulStone,
                2,
                [(EffectId::SoulEggBonus, 0.05)],
            );
        let items = vec![
            Item::Artifact(artifact(ArtifactFamily::BookOfBasan, 1, Rarity::Common, 1, 2)),
            Item::Stone(stone(gearforge_core::StoneFamily::SoulStone, 2, 10, 3)),
        ];
        let normalized = normalize(&items, &catalog, ReslotMode::Full, None, None);

        let result = search_set(&normalized, &catalog, 1, &soul_score, &SearchOptions::new())
            .unwrap()
            .unwrap();
        let chosen = result.set.iter().flatten().next().unwrap();
        // Both open slots filled; the third stone has nowhere to go.
        assert_eq!(chosen.open_slots(), 0);
        assert!((result.effects.get(EffectId::SoulEggBonus) - 0.3).abs() < 1e-9);
    }

    #[test]
    fn matches_exhaustive_enumeration_on_a_small_instance() {
        let mut catalog = StaticCatalog::new();
        let mut items = Vec::new();
        let values = [
            (ArtifactFamily::BookOfBasan, [0.31, 0.17]),
            (ArtifactFamily::LunarTotem, [0.23, 0.29]),
            (ArtifactFamily::DemetersNecklace, [0.11, 0.37]),
        ];
        let mut id = 0;
        for &(family, tiers) in &values {
            for (tier, &value) in tiers.iter().enumerate() {
                catalog = catalog.with_artifact(
                    family,
                    tier as u8,
                    Rarity::Common,
                    [(EffectId::SoulEggBonus, value)],
                );
                items.push(Item::Artifact(artifact(
                    family,
                    tier as u8,
                    Rarity::Common,
                    id,
                    0,
                )));
                id += 1;
            }
        }

        // Exhaustive best over at most two picks, one per family.
        let mut best = 0.0f64;
        for i in 0..values.len() {
            for ci in 0..2 {
                best = best.max(values[i].1[ci]);
                for j in (i + 1)..values.len() {
                    for cj in 0..2 {
                        best = best.max(values[i].1[ci] + values[j].1[cj]);
                    }
                }
            }
        }

        let normalized = normalize(&items, &catalog, ReslotMode::Full, None, None);
        let result = search_set(&normalized, &catalog, 2, &soul_score, &SearchOptions::new())
            .unwrap()
            .unwrap();
        assert!((result.effects.get(EffectId::SoulEggBonus) - best).abs() < 1e-9);
    }
}
