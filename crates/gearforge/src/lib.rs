//! Gearforge - Artifact loadout optimization
//!
//! Finds the inventory subset maximizing a caller-supplied objective:
//! normalize the inventory once, then run as many searches over it as
//! needed.
//!
//! # Example
//!
//! ```rust
//! use gearforge::prelude::*;
//!
//! // The embedding application supplies the catalog; scoring is an
//! // arbitrary function over the combined effect ledger.
//! let score = |effects: &Effects| -> ScoreVec {
//!     ScoreVec::from_slice(&[effects.get(EffectId::SoulEggBonus)])
//! };
//! let effects = Effects::new();
//! assert_eq!(score(&effects), ScoreVec::from_slice(&[0.0]));
//! ```

pub use gearforge_core::{
    compare_scores, is_close, merge_duplicates, pareto_frontier, Artifact, ArtifactFamily,
    ArtifactSet, Catalog, EffectId, EffectKind, EffectQuery, Effects, GearforgeError, Ingredient,
    IngredientFamily, Item, ItemCategory, Rarity, Result, ScoreVec, Stone, StoneFamily, StoneKey,
    REL_TOLERANCE,
};

pub use gearforge_solver::{
    assign_stones, fill_stones, minimal_reslotting, normalize, search_set, AnnotatedArtifact,
    AnnotatedStone, CandidateSolution, CartesianProduct, Normalized, ReslotMode, SearchOptions,
    StoneFill, MAX_SET_STONES,
};

/// Everything a typical caller needs.
pub mod prelude {
    pub use gearforge_core::{
        Artifact, ArtifactFamily, ArtifactSet, Catalog, EffectId, EffectQuery, Effects,
        GearforgeError, Item, ItemCategory, Rarity, Result, ScoreVec, Stone, StoneFamily,
    };
    pub use gearforge_solver::{normalize, search_set, ReslotMode, SearchOptions};
}
