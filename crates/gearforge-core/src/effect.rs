//! Effect ledger with additive, multiplicative and max-replace
//! composition.
//!
//! Every tracked effect key has exactly one composition kind. The
//! general naming pattern is `x_rate = x_base * x_mult`, where bases
//! accumulate additively (or by replacement, for capacities supplied
//! by discrete equipment such as habs and vehicles) and multipliers
//! accumulate multiplicatively. Cost multipliers are flagged as
//! *minimize* so that "larger is better" holds uniformly wherever a
//! score is compared: [`Effects::score`] negates them and
//! [`Effects::bound`] takes their minimum instead of their maximum.
//!
//! The key set is closed and static: unknown keys are simply not
//! representable. The kind table is a compile-time `match`, never a
//! runtime registry.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// How values accumulate under a given effect key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EffectKind {
    /// Stacked bonuses; neutral element 0.
    Additive,
    /// Compounding multipliers; neutral element 1.
    Multiplicative,
    /// Capacities granted by discrete equipment: keep the larger of
    /// current and incoming. Neutral element 0.
    MaxReplace,
}

impl EffectKind {
    /// The neutral (identity) value for this kind.
    #[inline]
    pub const fn neutral(self) -> f64 {
        match self {
            EffectKind::Additive | EffectKind::MaxReplace => 0.0,
            EffectKind::Multiplicative => 1.0,
        }
    }
}

macro_rules! effect_table {
    ($( $variant:ident => $kind:ident, $minimize:literal, $label:literal; )+) => {
        /// Closed set of tracked effect identifiers.
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(rename_all = "snake_case")]
        pub enum EffectId {
            $( $variant, )+
        }

        impl EffectId {
            /// Every tracked effect key, in declaration order.
            pub const ALL: &'static [EffectId] = &[
                $( EffectId::$variant, )+
            ];

            /// The composition kind of this key.
            #[inline]
            pub const fn kind(self) -> EffectKind {
                match self {
                    $( EffectId::$variant => EffectKind::$kind, )+
                }
            }

            /// True for keys where a smaller accumulated value is
            /// better (cost multipliers).
            #[inline]
            pub const fn minimize(self) -> bool {
                match self {
                    $( EffectId::$variant => $minimize, )+
                }
            }

            /// Human-readable description, for display layers.
            pub const fn label(self) -> &'static str {
                match self {
                    $( EffectId::$variant => $label, )+
                }
            }
        }
    };
}

effect_table! {
    HatchingRate        => Additive,       false, "hold to hatch rate";
    IhrBase             => Additive,       false, "internal hatchery rate";
    IhrMult             => Multiplicative, false, "internal hatchery rate";
    IhrAwayMult         => Multiplicative, false, "away internal hatchery rate";
    HabCapacityBase     => MaxReplace,     false, "hab capacity";
    HabCapacityMult     => Multiplicative, false, "hab capacity";
    LayingRate          => Multiplicative, false, "laying rate";
    ShippingBase        => MaxReplace,     false, "shipping rate";
    ShippingMult        => Multiplicative, false, "shipping rate";
    EggValueBase        => MaxReplace,     false, "egg value";
    EggValueMult        => Multiplicative, false, "egg value";
    EarningMult         => Multiplicative, false, "earnings";
    EarningAwayMult     => Multiplicative, false, "away earnings";
    EarningMrcbMult     => Additive,       false, "max running chicken bonus";
    SoulEggs            => Additive,       false, "soul eggs";
    ProphecyEggs        => Additive,       false, "eggs of prophecy";
    TruthEggs           => Additive,       false, "eggs of truth";
    SoulEggBonus        => Additive,       false, "soul egg bonus";
    ProphecyEggBonus    => Additive,       false, "egg of prophecy bonus";
    PrestigeEarningMult => Multiplicative, false, "soul egg collection rate";
    PrestigeMult        => Multiplicative, false, "soul eggs collected";
    BoostMult           => Multiplicative, false, "boost boost";
    BoostDurationMult   => Multiplicative, false, "boost duration";
    ResearchCostMult    => Multiplicative, true,  "research cost";
    VehicleCostMult     => Multiplicative, true,  "vehicle cost";
    HabCostMult         => Multiplicative, true,  "hab cost";
    TeamEarningBonus    => Additive,       false, "co-op teammates' earnings";
    TeamLayingBonus     => Additive,       false, "co-op teammates' laying rates";
    DroneRewardMult     => Multiplicative, false, "drone rewards";
    DroneFrequencyMult  => Multiplicative, false, "drone frequency";
    DroneGoldMult       => Multiplicative, false, "chance of gold";
    DroneCashMult       => Multiplicative, false, "chance of cash";
    FarmValueMult       => Multiplicative, false, "farm valuation";
}

/// Accumulated effect values, one per tracked key.
///
/// Only non-neutral values are stored, so a fresh ledger is the
/// neutral ledger and [`Effects::get`] falls back to each key's
/// neutral value. Ledgers are produced fresh per query and merged
/// functionally; a ledger is never shared mutably between owners.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Effects {
    values: BTreeMap<EffectId, f64>,
}

impl Effects {
    /// Creates the neutral ledger.
    pub fn new() -> Self {
        Effects::default()
    }

    /// Folds several ledgers into one, key by key, via [`Effects::apply`].
    pub fn merged<'a, I>(parts: I) -> Self
    where
        I: IntoIterator<Item = &'a Effects>,
    {
        let mut ret = Effects::new();
        for part in parts {
            ret.merge(part);
        }
        ret
    }

    /// Returns the accumulated value for `id`, or its neutral value.
    #[inline]
    pub fn get(&self, id: EffectId) -> f64 {
        match self.values.get(&id) {
            Some(v) => *v,
            None => id.kind().neutral(),
        }
    }

    /// Overwrites the value for `id`. Setting the neutral value clears
    /// the entry, keeping the ledger sparse.
    pub fn set(&mut self, id: EffectId, value: f64) {
        if value == id.kind().neutral() {
            self.values.remove(&id);
        } else {
            self.values.insert(id, value);
        }
    }

    /// Merges one incoming value according to the key's kind.
    pub fn apply(&mut self, id: EffectId, value: f64) {
        self.apply_n(id, value, 1);
    }

    /// Merges `repeat` copies of an incoming value in one step.
    pub fn apply_n(&mut self, id: EffectId, value: f64, repeat: u32) {
        let current = self.get(id);
        let next = match id.kind() {
            EffectKind::Additive => current + value * f64::from(repeat),
            EffectKind::Multiplicative => current * value.powi(repeat as i32),
            EffectKind::MaxReplace => f64::max(current, value),
        };
        self.set(id, next);
    }

    /// Folds another ledger into this one, key by key.
    pub fn merge(&mut self, other: &Effects) {
        for (&id, &value) in &other.values {
            self.apply(id, value);
        }
    }

    /// Builds an admissible per-key bound over several ledgers: the
    /// maximum value per key, or the minimum for minimize-flagged keys.
    ///
    /// The result is unreachable in general (keys may come from
    /// mutually exclusive candidates) which is exactly what makes it a
    /// safe pruning bound.
    pub fn bound<'a, I>(parts: I) -> Self
    where
        I: IntoIterator<Item = &'a Effects>,
    {
        let mut ret = Effects::new();
        for part in parts {
            for (&id, &value) in &part.values {
                let current = ret.get(id);
                if id.minimize() {
                    ret.set(id, f64::min(current, value));
                } else {
                    ret.set(id, f64::max(current, value));
                }
            }
        }
        ret
    }

    /// Returns the value for `id` oriented so that larger is always
    /// better: minimize-flagged keys are negated.
    ///
    /// Use this whenever the value feeds a generic optimization
    /// comparison; use [`Effects::get`] for arithmetic.
    #[inline]
    pub fn score(&self, id: EffectId) -> f64 {
        if id.minimize() {
            -self.get(id)
        } else {
            self.get(id)
        }
    }

    /// True if this ledger equals the neutral ledger, either wholly or
    /// restricted to the given keys.
    pub fn is_default(&self, keys: Option<&[EffectId]>) -> bool {
        match keys {
            Some(keys) => !keys.iter().any(|k| self.values.contains_key(k)),
            None => self.values.is_empty(),
        }
    }

    /// Iterates over keys holding a non-neutral value.
    pub fn keys(&self) -> impl Iterator<Item = EffectId> + '_ {
        self.values.keys().copied()
    }

    /// Iterates over (key, value) pairs holding a non-neutral value.
    pub fn iter(&self) -> impl Iterator<Item = (EffectId, f64)> + '_ {
        self.values.iter().map(|(&id, &v)| (id, v))
    }
}

impl FromIterator<(EffectId, f64)> for Effects {
    fn from_iter<I: IntoIterator<Item = (EffectId, f64)>>(iter: I) -> Self {
        let mut ret = Effects::new();
        for (id, value) in iter {
            ret.set(id, value);
        }
        ret
    }
}
