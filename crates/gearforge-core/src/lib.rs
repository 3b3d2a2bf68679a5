//! Gearforge Core - Core types for artifact set optimization
//!
//! This crate provides the fundamental abstractions for Gearforge:
//! - An effect ledger with additive / multiplicative / max-replace keys
//! - Score vectors with tolerance-aware lexicographic comparison
//! - Pareto-frontier extraction over scored entries
//! - The inventory item data model
//! - The `Catalog` trait the embedding application implements

pub mod catalog;
pub mod effect;
pub mod error;
pub mod item;
pub mod pareto;
pub mod score;

pub use catalog::{Catalog, EffectQuery};
pub use effect::{EffectId, EffectKind, Effects};
pub use error::{GearforgeError, Result};
pub use item::{
    merge_duplicates, Artifact, ArtifactFamily, ArtifactSet, Ingredient, IngredientFamily, Item,
    ItemCategory, Rarity, Stone, StoneFamily, StoneKey,
};
pub use pareto::pareto_frontier;
pub use score::{compare_scores, is_close, ScoreVec, REL_TOLERANCE};
