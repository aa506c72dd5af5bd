//! Turn-based combat resolution engine.
//!
//! This crate provides:
//! - A dice notation evaluator (`NdS+M`, plus d20 advantage rolls)
//! - An alternating-turn combat simulator with a bounded round count
//! - A rarity-keyed loot resolver
//!
//! The engine is synchronous and pure: callers supply combatant records and
//! (optionally) a seeded RNG, and get back an ordered combat log, a winner,
//! and resolved loot. Nothing here touches the network or the filesystem.
//!
//! # Quick Start
//!
//! ```
//! use nuaibria_combat::{Combatant, LootResolver, Simulator};
//!
//! let mut hero = Combatant::new("Hero", 20, 12, "1d6");
//! let mut goblin = Combatant::new("Goblin", 15, 10, "1d4");
//!
//! let result = Simulator::new().run(&mut hero, &mut goblin)?;
//! println!("{}", result.log.join("\n"));
//!
//! let loot = LootResolver::default().resolve("common")?;
//! assert_eq!(loot.len(), 1);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod combat;
pub mod dice;
pub mod loot;

// Primary public API
pub use combat::{CombatError, CombatOutcome, CombatResult, Combatant, Simulator};
pub use dice::{Advantage, D20Roll, DiceError, DiceExpression, RollResult};
pub use loot::{LootDrop, LootEntry, LootResolver, LootTable, Quantity};
