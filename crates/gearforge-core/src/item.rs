//! Inventory item data model.
//!
//! Items are plain owned values. Duplicating one is an explicit
//! `clone()`; nothing in the engine shares an item mutably. The
//! `stones` vector on an artifact doubles as its slot list: its length
//! is the slot count and `None` marks an open slot.

use serde::{Deserialize, Serialize};

use crate::effect::Effects;

/// Coarse item category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemCategory {
    Artifact,
    Stone,
    Ingredient,
}

/// Artifact rarity, ordered from most to least common.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rarity {
    Common,
    Rare,
    Epic,
    Legendary,
}

/// Artifact families. At most one artifact per family may appear in a
/// set, which is what makes families the branching unit of the search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactFamily {
    LunarTotem,
    NeodymiumMedallion,
    BeakOfMidas,
    LightOfEggendil,
    DemetersNecklace,
    VialOfMartianDust,
    OrnateGusset,
    TheChalice,
    BookOfBasan,
    PhoenixFeather,
    TungstenAnkh,
    AurelianBrooch,
    CarvedRainstick,
    PuzzleCube,
    QuantumMetronome,
    ShipInABottle,
    TachyonDeflector,
    InterstellarCompass,
    DilithiumMonocle,
    TitaniumActuator,
    MercurysLens,
}

/// Stone families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoneFamily {
    TachyonStone,
    DilithiumStone,
    ShellStone,
    LunarStone,
    SoulStone,
    ProphecyStone,
    QuantumStone,
    TerraStone,
    LifeStone,
    ClarityStone,
}

/// Ingredient families. Ingredients carry no effects and never enter a
/// set; they are modeled so a full inventory deserializes losslessly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IngredientFamily {
    GoldMeteorite,
    TauCetiGeode,
    SolarTitanium,
}

/// Fungibility key: two physical items with the same key are
/// interchangeable for slotting purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct StoneKey {
    pub family: StoneFamily,
    pub tier: u8,
}

/// A stone, either loose or slotted into an artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stone {
    pub family: StoneFamily,
    pub tier: u8,
    /// Stable inventory identifier.
    pub id: u64,
    /// Number of physical copies this record stands for (loose stones
    /// only; a slotted stone is always a single copy).
    pub quantity: u32,
    /// Set when this stone was moved relative to the input inventory.
    #[serde(default)]
    pub reslotted: bool,
}

impl Stone {
    pub fn key(&self) -> StoneKey {
        StoneKey {
            family: self.family,
            tier: self.tier,
        }
    }
}

/// An artifact together with its slot contents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Artifact {
    pub family: ArtifactFamily,
    pub tier: u8,
    pub rarity: Rarity,
    /// Stable inventory identifier.
    pub id: u64,
    /// Number of physical copies this record stands for.
    pub quantity: u32,
    /// Slot contents; length is the slot count, `None` is an open slot.
    pub stones: Vec<Option<Stone>>,
    /// Count of slot changes relative to the input inventory.
    #[serde(default)]
    pub reslotted: u32,
}

impl Artifact {
    /// Number of slots not currently holding a stone.
    pub fn open_slots(&self) -> usize {
        self.stones.iter().filter(|s| s.is_none()).count()
    }

    /// Slotted stones in slot order, skipping open slots.
    pub fn slotted(&self) -> impl Iterator<Item = &Stone> {
        self.stones.iter().flatten()
    }
}

/// An ingredient stack.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ingredient {
    pub family: IngredientFamily,
    pub tier: u8,
    pub id: u64,
    pub quantity: u32,
}

/// Any inventory item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "category", rename_all = "snake_case")]
pub enum Item {
    Artifact(Artifact),
    Stone(Stone),
    Ingredient(Ingredient),
}

impl Item {
    pub fn category(&self) -> ItemCategory {
        match self {
            Item::Artifact(_) => ItemCategory::Artifact,
            Item::Stone(_) => ItemCategory::Stone,
            Item::Ingredient(_) => ItemCategory::Ingredient,
        }
    }

    pub fn id(&self) -> u64 {
        match self {
            Item::Artifact(a) => a.id,
            Item::Stone(s) => s.id,
            Item::Ingredient(i) => i.id,
        }
    }

    pub fn quantity(&self) -> u32 {
        match self {
            Item::Artifact(a) => a.quantity,
            Item::Stone(s) => s.quantity,
            Item::Ingredient(i) => i.quantity,
        }
    }
}

/// Folds fungible item records into one, summing quantities.
///
/// Stones and ingredients are fungible when family and tier match.
/// Artifacts additionally require identical rarity and an identical
/// slotted-stone multiset (slot order does not matter). The first
/// record of each group survives with the summed quantity.
pub fn merge_duplicates(items: Vec<Item>) -> Vec<Item> {
    let mut merged: Vec<Item> = Vec::with_capacity(items.len());
    for item in items {
        match merged.iter().position(|m| fungible(m, &item)) {
            Some(i) => {
                let quantity = item.quantity();
                match &mut merged[i] {
                    Item::Artifact(a) => a.quantity += quantity,
                    Item::Stone(s) => s.quantity += quantity,
                    Item::Ingredient(g) => g.quantity += quantity,
                }
            }
            None => merged.push(item),
        }
    }
    merged
}

fn fungible(a: &Item, b: &Item) -> bool {
    match (a, b) {
        (Item::Artifact(x), Item::Artifact(y)) => {
            x.family == y.family
                && x.tier == y.tier
                && x.rarity == y.rarity
                && stone_multiset(x) == stone_multiset(y)
        }
        (Item::Stone(x), Item::Stone(y)) => x.key() == y.key(),
        (Item::Ingredient(x), Item::Ingredient(y)) => x.family == y.family && x.tier == y.tier,
        _ => false,
    }
}

fn stone_multiset(artifact: &Artifact) -> Vec<Option<StoneKey>> {
    let mut keys: Vec<Option<StoneKey>> = artifact
        .stones
        .iter()
        .map(|s| s.as_ref().map(Stone::key))
        .collect();
    keys.sort();
    keys
}

/// A finished set: one artifact (or none) per slot, plus the combined
/// ledger of everything in it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactSet {
    /// Family-sorted, padded with `None` to the slot budget.
    pub set: Vec<Option<Artifact>>,
    pub effects: Effects,
}
