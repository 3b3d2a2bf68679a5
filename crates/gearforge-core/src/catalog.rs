//! Catalog seam between the engine and the embedding application.

use crate::effect::{EffectId, Effects};
use crate::item::Item;

/// Parameters of an effect lookup.
#[derive(Debug, Clone, Copy, Default)]
pub struct EffectQuery<'a> {
    /// Include the effects of slotted stones in an artifact's ledger.
    pub recursive: bool,
    /// Restrict the resulting ledger to these keys; `None` keeps all.
    pub targets: Option<&'a [EffectId]>,
}

/// Pure metadata lookup mapping an item to its effect ledger.
///
/// Implementations are backed by static game metadata and must be
/// deterministic: the solver caches ledgers per item and assumes two
/// identical queries agree. The engine never constructs a catalog; the
/// embedding application supplies one.
pub trait Catalog {
    /// Computes the effect ledger of a single item.
    ///
    /// For artifacts with `recursive` set, slotted stones contribute
    /// their own ledgers merged on top of the artifact's. `targets`
    /// filters the result down to the listed keys.
    fn effects(&self, item: &Item, query: &EffectQuery<'_>) -> Effects;
}
