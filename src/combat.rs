//! Alternating-turn combat simulator.
//!
//! Two combatants exchange attacks until one drops to zero health or the
//! round cap is reached. Each exchange is a `1d20` attack roll against the
//! defender's armor class; on a hit the attacker's damage expression is
//! rolled and subtracted from the defender's health. Attacker and defender
//! roles swap after every exchange regardless of outcome.

use crate::dice::{DiceError, DiceExpression};
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Default round cap before a stalemate is declared.
pub const DEFAULT_MAX_ROUNDS: u32 = 100;

/// Error type for combat simulation.
#[derive(Debug, Error)]
pub enum CombatError {
    /// A combatant's damage expression failed to parse. Both expressions
    /// are validated before the first exchange, so a failed simulation
    /// produces no partial log and no health changes.
    #[error("Malformed damage expression for {combatant}: {source}")]
    MalformedDamage {
        combatant: String,
        source: DiceError,
    },
}

/// One side of a combat exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Combatant {
    pub name: String,
    /// Current hit points. May go negative on the final exchange.
    pub health: i32,
    /// Attack rolls must meet or exceed this to hit.
    pub armor_class: i32,
    /// Damage dice notation, e.g. `"1d6"` or `"2d4+1"`.
    pub damage: String,
}

impl Combatant {
    pub fn new(
        name: impl Into<String>,
        health: i32,
        armor_class: i32,
        damage: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            health,
            armor_class,
            damage: damage.into(),
        }
    }

    pub fn is_down(&self) -> bool {
        self.health <= 0
    }
}

/// How a simulation concluded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CombatOutcome {
    /// One combatant dropped to zero health or below.
    Victory,
    /// Round cap reached; winner decided by remaining health.
    Stalemate,
    /// Round cap reached with equal health on both sides.
    Draw,
}

/// Outcome of a full simulation.
///
/// `winner` is a snapshot of the winning combatant's final state and is
/// `None` only for a draw. The log is ordered and its final entry is the
/// winner or draw announcement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CombatResult {
    pub winner: Option<Combatant>,
    pub log: Vec<String>,
    pub outcome: CombatOutcome,
    pub rounds: u32,
}

/// Combat simulator with a configurable round cap.
#[derive(Debug, Clone, Copy)]
pub struct Simulator {
    max_rounds: u32,
}

impl Default for Simulator {
    fn default() -> Self {
        Self::new()
    }
}

impl Simulator {
    pub fn new() -> Self {
        Self {
            max_rounds: DEFAULT_MAX_ROUNDS,
        }
    }

    pub fn with_max_rounds(max_rounds: u32) -> Self {
        Self { max_rounds }
    }

    /// Run a simulation using the thread-local RNG.
    pub fn run(
        &self,
        first: &mut Combatant,
        second: &mut Combatant,
    ) -> Result<CombatResult, CombatError> {
        self.run_with(first, second, &mut rand::thread_rng())
    }

    /// Run a simulation with a caller-supplied RNG.
    ///
    /// `first` attacks on even-numbered exchanges, `second` on odd ones.
    /// Health changes are applied through the `&mut` borrows, so both
    /// combatants' final state is visible to the caller afterwards.
    pub fn run_with<R: Rng>(
        &self,
        first: &mut Combatant,
        second: &mut Combatant,
        rng: &mut R,
    ) -> Result<CombatResult, CombatError> {
        let damage = [parse_damage(first)?, parse_damage(second)?];
        let attack = DiceExpression {
            count: 1,
            sides: 20,
            modifier: 0,
        };

        let mut log = Vec::new();
        let mut rounds = 0;
        let mut fighters = [first, second];

        while !fighters[0].is_down() && !fighters[1].is_down() && rounds < self.max_rounds {
            let attacker = (rounds % 2) as usize;
            let defender = attacker ^ 1;
            rounds += 1;

            let attack_roll = attack.roll_with(rng).total;
            if attack_roll >= fighters[defender].armor_class {
                // A negative damage modifier cannot heal the defender.
                let dealt = damage[attacker].roll_with(rng).total.max(0);
                fighters[defender].health -= dealt;
                debug!(
                    attacker = %fighters[attacker].name,
                    defender = %fighters[defender].name,
                    attack_roll,
                    dealt,
                    "attack hits"
                );
                log.push(format!(
                    "{} hits {} for {} damage.",
                    fighters[attacker].name, fighters[defender].name, dealt
                ));
            } else {
                debug!(
                    attacker = %fighters[attacker].name,
                    defender = %fighters[defender].name,
                    attack_roll,
                    "attack misses"
                );
                log.push(format!(
                    "{} misses {}.",
                    fighters[attacker].name, fighters[defender].name
                ));
            }
        }

        Ok(self.conclude(fighters, log, rounds))
    }

    fn conclude(
        &self,
        fighters: [&mut Combatant; 2],
        mut log: Vec<String>,
        rounds: u32,
    ) -> CombatResult {
        let [a, b] = fighters;

        if a.is_down() != b.is_down() {
            let winner = if a.is_down() { b } else { a };
            log.push(format!("{} wins!", winner.name));
            return CombatResult {
                winner: Some(winner.clone()),
                log,
                outcome: CombatOutcome::Victory,
                rounds,
            };
        }

        if a.is_down() && b.is_down() {
            // Only reachable when both combatants enter at zero or below:
            // each exchange changes a single combatant's health, so
            // simultaneous death cannot occur during simulation.
            log.push("Combat ends in a draw.".to_string());
            return CombatResult {
                winner: None,
                log,
                outcome: CombatOutcome::Draw,
                rounds,
            };
        }

        log.push(format!(
            "Stalemate reached after {} rounds.",
            self.max_rounds
        ));

        if a.health == b.health {
            log.push("Combat ends in a draw.".to_string());
            return CombatResult {
                winner: None,
                log,
                outcome: CombatOutcome::Draw,
                rounds,
            };
        }

        let winner = if a.health > b.health { a } else { b };
        log.push(format!("{} declared winner by remaining health.", winner.name));
        CombatResult {
            winner: Some(winner.clone()),
            log,
            outcome: CombatOutcome::Stalemate,
            rounds,
        }
    }
}

fn parse_damage(combatant: &Combatant) -> Result<DiceExpression, CombatError> {
    DiceExpression::parse(&combatant.damage).map_err(|source| CombatError::MalformedDamage {
        combatant: combatant.name.clone(),
        source,
    })
}
