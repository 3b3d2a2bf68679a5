//! Inventory normalization: annotate, filter and Pareto-reduce raw
//! items into search candidates.

use std::collections::BTreeMap;
use std::collections::BTreeSet;

use gearforge_core::{
    pareto_frontier, Artifact, ArtifactFamily, Catalog, EffectId, EffectQuery, Effects, Item,
    ScoreVec, Stone, StoneFamily,
};
use serde::{Deserialize, Serialize};

/// Largest stone pool a search can consume: a full set holds at most
/// four artifacts with three slots each.
pub const MAX_SET_STONES: usize = 12;

/// How the search is allowed to rearrange stones relative to the
/// input inventory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReslotMode {
    /// Slotted stones stay where they are and no stone may be added.
    Frozen,
    /// Slotted stones stay, open slots may be filled.
    InsertOnly,
    /// Slotted stones are ignored entirely; nothing may be slotted.
    IgnoreStones,
    /// Slotted stones return to the pool and every slot is fillable.
    Full,
}

impl ReslotMode {
    /// Slotted stones are pulled out of their artifacts and scored as
    /// part of the loose pool instead.
    pub fn detach_stones(self) -> bool {
        matches!(self, ReslotMode::IgnoreStones | ReslotMode::Full)
    }

    /// Open slots count as usable capacity.
    pub fn allow_slotting(self) -> bool {
        matches!(self, ReslotMode::InsertOnly | ReslotMode::Full)
    }

    /// Usable slot count of `artifact` under this mode.
    pub fn count_open_slots(self, artifact: &Artifact) -> usize {
        if !self.allow_slotting() {
            return 0;
        }
        if self.detach_stones() {
            artifact.stones.len()
        } else {
            artifact.open_slots()
        }
    }
}

/// An equivalence class of interchangeable artifact candidates.
///
/// Every member contributes the same tracked effects and slot count;
/// the reslotting stage later picks whichever physical member needs
/// the fewest stone moves.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnnotatedArtifact {
    pub artifacts: Vec<Artifact>,
    pub effects: Effects,
    pub open_slots: usize,
}

/// A single stone candidate with its precomputed ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnnotatedStone {
    pub stone: Stone,
    pub effects: Effects,
}

/// Search-ready candidates grouped by family.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Normalized {
    pub artifacts: BTreeMap<ArtifactFamily, Vec<AnnotatedArtifact>>,
    pub stones: BTreeMap<StoneFamily, Vec<AnnotatedStone>>,
}

/// Annotates every item with its effect ledger, discards items that
/// can contribute nothing, and Pareto-reduces each artifact family.
///
/// `main_effects` are the keys an artifact must move for it to be kept
/// at all; `secondary_effects` additionally participate in dominance
/// pruning (an artifact weaker on every main key may survive through a
/// secondary key). When `secondary_effects` is `None`, ledgers are not
/// restricted and all keys participate.
///
/// Stone pools are expanded per physical copy and are NOT
/// Pareto-reduced: the greedy filler consumes several stones of one
/// family, so a dominated stone may still be picked after its
/// dominator.
pub fn normalize(
    items: &[Item],
    catalog: &dyn Catalog,
    mode: ReslotMode,
    main_effects: Option<&[EffectId]>,
    secondary_effects: Option<&[EffectId]>,
) -> Normalized {
    let mut normalized = Normalized::default();

    // Main keys always participate in the target restriction.
    let targets: Option<Vec<EffectId>> = secondary_effects.map(|secondary| {
        let mut keys: Vec<EffectId> = main_effects.unwrap_or(&[]).to_vec();
        keys.extend_from_slice(secondary);
        keys
    });
    let query = EffectQuery {
        recursive: !mode.detach_stones(),
        targets: targets.as_deref(),
    };

    for item in items {
        match item {
            Item::Artifact(artifact) => {
                add_artifact(&mut normalized, catalog, mode, &query, main_effects, artifact);
                if mode.detach_stones() {
                    for stone in artifact.slotted() {
                        add_stone(&mut normalized, catalog, &query, main_effects, stone, 1);
                    }
                }
            }
            Item::Stone(stone) => {
                add_stone(&mut normalized, catalog, &query, main_effects, stone, stone.quantity);
            }
            Item::Ingredient(_) => {}
        }
    }

    for candidates in normalized.artifacts.values_mut() {
        *candidates = reduce_family(std::mem::take(candidates));
    }
    normalized
}

fn add_artifact(
    normalized: &mut Normalized,
    catalog: &dyn Catalog,
    mode: ReslotMode,
    query: &EffectQuery<'_>,
    main_effects: Option<&[EffectId]>,
    artifact: &Artifact,
) {
    let open_slots = mode.count_open_slots(artifact);
    let effects = catalog.effects(&Item::Artifact(artifact.clone()), query);

    // No tracked effect and no slot capacity: nothing to gain.
    if open_slots == 0 && effects.is_default(main_effects) {
        return;
    }

    let mut artifact = artifact.clone();
    for stone in artifact.stones.iter_mut().flatten() {
        stone.reslotted = mode.detach_stones();
    }

    normalized
        .artifacts
        .entry(artifact.family)
        .or_default()
        .push(AnnotatedArtifact {
            artifacts: vec![artifact],
            effects,
            open_slots,
        });
}

fn add_stone(
    normalized: &mut Normalized,
    catalog: &dyn Catalog,
    query: &EffectQuery<'_>,
    main_effects: Option<&[EffectId]>,
    stone: &Stone,
    quantity: u32,
) {
    let effects = catalog.effects(&Item::Stone(stone.clone()), query);
    if effects.is_default(main_effects) {
        return;
    }

    let mut stone = stone.clone();
    stone.quantity = 1;
    stone.reslotted = false;

    let pool = normalized.stones.entry(stone.family).or_default();
    for _ in 0..quantity {
        pool.push(AnnotatedStone {
            stone: stone.clone(),
            effects: effects.clone(),
        });
    }
}

/// Drops dominated candidates within one family and collapses
/// tolerance-equal ones into a single class retaining every member.
///
/// Dominance is judged over usable slots plus the union of effect keys
/// the family's candidates actually carry.
fn reduce_family(candidates: Vec<AnnotatedArtifact>) -> Vec<AnnotatedArtifact> {
    let keys: BTreeSet<EffectId> = candidates
        .iter()
        .flat_map(|c| c.effects.keys())
        .collect();

    let scored: Vec<(ScoreVec, AnnotatedArtifact)> = candidates
        .into_iter()
        .map(|candidate| {
            let mut score = ScoreVec::new();
            score.push(candidate.open_slots as f64);
            score.extend(keys.iter().map(|&k| candidate.effects.score(k)));
            (score, candidate)
        })
        .collect();

    pareto_frontier(scored)
        .into_iter()
        .map(|class| {
            let effects = class[0].effects.clone();
            let open_slots = class[0].open_slots;
            AnnotatedArtifact {
                artifacts: class.into_iter().flat_map(|c| c.artifacts).collect(),
                effects,
                open_slots,
            }
        })
        .collect()
}
