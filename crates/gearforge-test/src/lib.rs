//! Shared test fixtures for Gearforge crates.
//!
//! Provides a small in-memory [`Catalog`] implementation plus item
//! builders, so solver tests can declare inventories in a few lines
//! without dragging real game metadata into the workspace.

use std::collections::HashMap;

use gearforge_core::{
    Artifact, ArtifactFamily, Catalog, EffectId, EffectQuery, Effects, Item, Rarity, Stone,
    StoneFamily,
};

/// In-memory catalog mapping item identities to effect ledgers.
///
/// Artifacts are keyed by family, tier and rarity; stones by family
/// and tier. Unregistered items resolve to the neutral ledger, which
/// conveniently models effect-free ingredients.
#[derive(Debug, Default)]
pub struct StaticCatalog {
    artifacts: HashMap<(ArtifactFamily, u8, Rarity), Effects>,
    stones: HashMap<(StoneFamily, u8), Effects>,
}

impl StaticCatalog {
    pub fn new() -> Self {
        StaticCatalog::default()
    }

    /// Registers an artifact ledger, replacing any previous entry.
    pub fn with_artifact(
        mut self,
        family: ArtifactFamily,
        tier: u8,
        rarity: Rarity,
        effects: impl IntoIterator<Item = (EffectId, f64)>,
    ) -> Self {
        self.artifacts
            .insert((family, tier, rarity), effects.into_iter().collect());
        self
    }

    /// Registers a stone ledger, replacing any previous entry.
    pub fn with_stone(
        mut self,
        family: StoneFamily,
        tier: u8,
        effects: impl IntoIterator<Item = (EffectId, f64)>,
    ) -> Self {
        self.stones
            .insert((family, tier), effects.into_iter().collect());
        self
    }

    fn stone_effects(&self, stone: &Stone) -> Effects {
        self.stones
            .get(&(stone.family, stone.tier))
            .cloned()
            .unwrap_or_default()
    }
}

impl Catalog for StaticCatalog {
    fn effects(&self, item: &Item, query: &EffectQuery<'_>) -> Effects {
        let mut effects = match item {
            Item::Artifact(artifact) => {
                let mut effects = self
                    .artifacts
                    .get(&(artifact.family, artifact.tier, artifact.rarity))
                    .cloned()
                    .unwrap_or_default();
                if query.recursive {
                    for stone in artifact.slotted() {
                        effects.merge(&self.stone_effects(stone));
                    }
                }
                effects
            }
            Item::Stone(stone) => self.stone_effects(stone),
            Item::Ingredient(_) => Effects::new(),
        };
        if let Some(targets) = query.targets {
            effects = effects
                .iter()
                .filter(|(id, _)| targets.contains(id))
                .collect();
        }
        effects
    }
}

/// Builds an artifact with `slots` open slots.
pub fn artifact(family: ArtifactFamily, tier: u8, rarity: Rarity, id: u64, slots: usize) -> Artifact {
    Artifact {
        family,
        tier,
        rarity,
        id,
        quantity: 1,
        stones: vec![None; slots],
        reslotted: 0,
    }
}

/// Builds a loose stone stack.
pub fn stone(family: StoneFamily, tier: u8, id: u64, quantity: u32) -> Stone {
    Stone {
        family,
        tier,
        id,
        quantity,
        reslotted: false,
    }
}

/// Slots `stone` into the first open slot, panicking when full.
pub fn slot(mut artifact: Artifact, stone: Stone) -> Artifact {
    let open = artifact
        .stones
        .iter_mut()
        .find(|s| s.is_none())
        .expect("artifact has no open slot");
    *open = Some(stone);
    artifact
}
