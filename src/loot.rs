//! Rarity-keyed loot resolution.
//!
//! A [`LootTable`] maps rarity tiers to candidate entries; a
//! [`LootResolver`] picks one entry uniformly at random and resolves dice
//! quantities to concrete integers. An unknown rarity yields an empty
//! result, never an error.
//!
//! Each call drops at most one item. Multi-item drops are deliberately
//! unsupported; callers wanting several drops call the resolver once per
//! drop.

use crate::dice::{DiceError, DiceExpression};
use lazy_static::lazy_static;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

/// A loot entry's quantity: a fixed amount or a dice expression rolled at
/// drop time.
///
/// Serialized untagged, so a JSON number is a fixed quantity and a JSON
/// string is dice notation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Quantity {
    Fixed(u32),
    Dice(String),
}

/// One candidate drop within a rarity tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LootEntry {
    pub name: String,
    pub quantity: Quantity,
}

impl LootEntry {
    pub fn fixed(name: impl Into<String>, quantity: u32) -> Self {
        Self {
            name: name.into(),
            quantity: Quantity::Fixed(quantity),
        }
    }

    pub fn dice(name: impl Into<String>, notation: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            quantity: Quantity::Dice(notation.into()),
        }
    }
}

/// Immutable mapping from rarity tier to candidate entries.
///
/// Tables are explicit values rather than process-wide globals so that
/// embedding applications can run several rule sets (per-campaign tables)
/// side by side. Tier lookup is case-insensitive.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LootTable {
    tiers: HashMap<String, Vec<LootEntry>>,
}

impl LootTable {
    pub fn new(tiers: HashMap<String, Vec<LootEntry>>) -> Self {
        Self { tiers }
    }

    /// The built-in table: `common`, `uncommon`, and `rare` tiers.
    pub fn standard() -> Self {
        STANDARD_TABLE.clone()
    }

    /// Entries configured for a rarity tier, if any.
    pub fn entries(&self, rarity: &str) -> Option<&[LootEntry]> {
        self.tiers
            .iter()
            .find(|(tier, _)| tier.eq_ignore_ascii_case(rarity))
            .map(|(_, entries)| entries.as_slice())
    }
}

lazy_static! {
    /// Built-in loot table. Gold quantities are dice expressions rolled at
    /// drop time; item quantities are fixed.
    static ref STANDARD_TABLE: LootTable = {
        let mut tiers = HashMap::new();
        tiers.insert(
            "common".to_string(),
            vec![
                LootEntry::dice("Gold", "1d6"),
                LootEntry::fixed("Healing Potion", 1),
            ],
        );
        tiers.insert(
            "uncommon".to_string(),
            vec![
                LootEntry::dice("Gold", "2d6+2"),
                LootEntry::fixed("Greater Healing Potion", 1),
                LootEntry::fixed("Silvered Dagger", 1),
            ],
        );
        tiers.insert(
            "rare".to_string(),
            vec![
                LootEntry::dice("Gold", "4d6+10"),
                LootEntry::fixed("Superior Healing Potion", 1),
                LootEntry::fixed("Flametongue Shard", 1),
            ],
        );
        LootTable::new(tiers)
    };
}

/// A fully resolved drop: the quantity is always a concrete integer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LootDrop {
    pub name: String,
    pub quantity: u32,
}

/// Resolves rarity tiers against a loot table.
#[derive(Debug, Clone)]
pub struct LootResolver {
    table: LootTable,
}

impl Default for LootResolver {
    fn default() -> Self {
        Self::new(LootTable::standard())
    }
}

impl LootResolver {
    /// Create a resolver over an explicit table.
    pub fn new(table: LootTable) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &LootTable {
        &self.table
    }

    /// Resolve a rarity tier with a caller-supplied RNG.
    ///
    /// Returns an empty vector for an unrecognized rarity and exactly one
    /// drop otherwise. A malformed dice quantity in the table surfaces as
    /// a [`DiceError`].
    pub fn resolve_with<R: Rng>(
        &self,
        rarity: &str,
        rng: &mut R,
    ) -> Result<Vec<LootDrop>, DiceError> {
        let Some(entries) = self.table.entries(rarity) else {
            debug!(rarity, "no loot tier configured");
            return Ok(Vec::new());
        };
        if entries.is_empty() {
            return Ok(Vec::new());
        }

        let entry = &entries[rng.gen_range(0..entries.len())];
        let quantity = match &entry.quantity {
            Quantity::Fixed(n) => *n,
            Quantity::Dice(notation) => {
                let rolled = DiceExpression::parse(notation)?.roll_with(rng).total;
                rolled.max(0) as u32
            }
        };
        debug!(rarity, name = %entry.name, quantity, "loot resolved");

        Ok(vec![LootDrop {
            name: entry.name.clone(),
            quantity,
        }])
    }

    /// Resolve a rarity tier using the thread-local RNG.
    pub fn resolve(&self, rarity: &str) -> Result<Vec<LootDrop>, DiceError> {
        self.resolve_with(rarity, &mut rand::thread_rng())
    }
}
