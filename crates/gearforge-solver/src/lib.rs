//! Gearforge Solver - Constrained search over artifact inventories
//!
//! The pipeline has three stages:
//! 1. [`normalize`] annotates raw items with effect ledgers, discards
//!    useless ones and Pareto-reduces each artifact family;
//! 2. [`search_set`] runs a branch-and-bound over family choices with
//!    a greedy stone filler scoring each selection;
//! 3. the reslotting minimizer turns the score-equivalent optima into
//!    the one concrete set needing the fewest stone moves.

pub mod iter;
pub mod normalize;
pub mod reslot;
pub mod search;
pub mod stones;

pub use iter::CartesianProduct;
pub use normalize::{
    normalize, AnnotatedArtifact, AnnotatedStone, Normalized, ReslotMode, MAX_SET_STONES,
};
pub use reslot::{assign_stones, minimal_reslotting, CandidateSolution};
pub use search::{search_set, SearchOptions};
pub use stones::{fill_stones, StoneFill};
