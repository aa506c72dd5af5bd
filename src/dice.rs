//! Dice notation evaluator.
//!
//! Supports the compact `NdS+M` notation used throughout the engine for
//! attack rolls, damage rolls, and loot quantities, plus d20 rolls with
//! advantage and disadvantage.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Error type for dice parsing.
#[derive(Debug, Error)]
pub enum DiceError {
    #[error("Malformed dice expression: {0}")]
    MalformedExpression(String),
}

/// A parsed dice expression (e.g. `2d6+3`).
///
/// `count` and `sides` are both at least 1 after parsing; the modifier
/// defaults to 0 when the notation omits it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiceExpression {
    pub count: u32,
    pub sides: u32,
    pub modifier: i32,
}

impl DiceExpression {
    /// Parse strict `NdS`, `NdS+M`, or `NdS-M` notation.
    ///
    /// The die count is mandatory (`"d6"` is malformed), the `d` separator
    /// is case-insensitive, and no characters beyond the three numeric
    /// segments are permitted. Surrounding whitespace is trimmed.
    pub fn parse(notation: &str) -> Result<Self, DiceError> {
        let trimmed = notation.trim();
        let malformed = || DiceError::MalformedExpression(notation.to_string());

        let d_pos = trimmed.find(['d', 'D']).ok_or_else(malformed)?;
        let count_str = &trimmed[..d_pos];
        let rest = &trimmed[d_pos + 1..];

        let (sides_str, modifier) = match rest.find(['+', '-']) {
            Some(sign_pos) => {
                let digits = &rest[sign_pos + 1..];
                if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
                    return Err(malformed());
                }
                let value: i32 = digits.parse().map_err(|_| malformed())?;
                let signed = if rest.as_bytes()[sign_pos] == b'-' {
                    -value
                } else {
                    value
                };
                (&rest[..sign_pos], signed)
            }
            None => (rest, 0),
        };

        let count = parse_segment(count_str).ok_or_else(malformed)?;
        let sides = parse_segment(sides_str).ok_or_else(malformed)?;
        if count == 0 || sides == 0 {
            return Err(malformed());
        }

        Ok(DiceExpression {
            count,
            sides,
            modifier,
        })
    }

    /// Roll with a caller-supplied RNG (deterministic under a seeded RNG).
    pub fn roll_with<R: Rng>(&self, rng: &mut R) -> RollResult {
        let rolls: Vec<u32> = (0..self.count)
            .map(|_| rng.gen_range(1..=self.sides))
            .collect();
        let total = rolls.iter().sum::<u32>() as i32 + self.modifier;
        RollResult {
            rolls,
            modifier: self.modifier,
            total,
            notation: self.to_string(),
        }
    }

    /// Roll using the thread-local RNG.
    pub fn roll(&self) -> RollResult {
        self.roll_with(&mut rand::thread_rng())
    }

    /// Minimum and maximum totals this expression can produce.
    pub fn range(&self) -> (i32, i32) {
        let count = self.count as i32;
        (
            count + self.modifier,
            count * self.sides as i32 + self.modifier,
        )
    }
}

/// Parse one numeric segment of a notation string.
///
/// Stricter than `str::parse`: rejects empty segments and embedded signs,
/// so `"+2d6"` and `"2d6+-3"` are malformed rather than silently accepted.
fn parse_segment(s: &str) -> Option<u32> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

impl FromStr for DiceExpression {
    type Err = DiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DiceExpression::parse(s)
    }
}

impl fmt::Display for DiceExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}d{}", self.count, self.sides)?;
        match self.modifier.cmp(&0) {
            Ordering::Greater => write!(f, "+{}", self.modifier),
            Ordering::Less => write!(f, "{}", self.modifier),
            Ordering::Equal => Ok(()),
        }
    }
}

/// Result of rolling a dice expression, with the per-die breakdown.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RollResult {
    pub rolls: Vec<u32>,
    pub modifier: i32,
    pub total: i32,
    pub notation: String,
}

impl fmt::Display for RollResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {}", self.notation, self.total)
    }
}

/// Advantage state for d20 rolls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Advantage {
    #[default]
    Normal,
    Advantage,
    Disadvantage,
}

impl Advantage {
    /// Combine two advantage states (advantage + disadvantage = normal).
    pub fn combine(self, other: Advantage) -> Advantage {
        match (self, other) {
            (Advantage::Normal, x) | (x, Advantage::Normal) => x,
            (Advantage::Advantage, Advantage::Disadvantage) => Advantage::Normal,
            (Advantage::Disadvantage, Advantage::Advantage) => Advantage::Normal,
            (Advantage::Advantage, Advantage::Advantage) => Advantage::Advantage,
            (Advantage::Disadvantage, Advantage::Disadvantage) => Advantage::Disadvantage,
        }
    }
}

/// Result of a d20 roll with optional advantage or disadvantage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct D20Roll {
    /// The dice actually drawn (one die normally, two under advantage or
    /// disadvantage).
    pub rolls: Vec<u32>,
    /// The die that counts.
    pub kept: u32,
    pub mode: Advantage,
    pub natural_20: bool,
    pub natural_1: bool,
}

/// Roll a d20 with a caller-supplied RNG.
///
/// Advantage keeps the higher of two dice, disadvantage the lower.
pub fn d20_with<R: Rng>(mode: Advantage, rng: &mut R) -> D20Roll {
    let first = rng.gen_range(1..=20u32);
    let (rolls, kept) = match mode {
        Advantage::Normal => (vec![first], first),
        Advantage::Advantage => {
            let second = rng.gen_range(1..=20u32);
            (vec![first, second], first.max(second))
        }
        Advantage::Disadvantage => {
            let second = rng.gen_range(1..=20u32);
            (vec![first, second], first.min(second))
        }
    };
    D20Roll {
        rolls,
        kept,
        mode,
        natural_20: kept == 20,
        natural_1: kept == 1,
    }
}

/// Roll a d20 using the thread-local RNG.
pub fn d20(mode: Advantage) -> D20Roll {
    d20_with(mode, &mut rand::thread_rng())
}

/// Convenience function to parse and roll a notation string in one step.
pub fn roll(notation: &str) -> Result<RollResult, DiceError> {
    Ok(DiceExpression::parse(notation)?.roll())
}

/// Parse and roll with a caller-supplied RNG.
pub fn roll_with<R: Rng>(notation: &str, rng: &mut R) -> Result<RollResult, DiceError> {
    Ok(DiceExpression::parse(notation)?.roll_with(rng))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_parse_simple() {
        let expr = DiceExpression::parse("1d20").unwrap();
        assert_eq!(expr.count, 1);
        assert_eq!(expr.sides, 20);
        assert_eq!(expr.modifier, 0);
    }

    #[test]
    fn test_parse_with_modifier() {
        let expr = DiceExpression::parse("2d6+3").unwrap();
        assert_eq!(expr.count, 2);
        assert_eq!(expr.sides, 6);
        assert_eq!(expr.modifier, 3);

        let expr = DiceExpression::parse("2d6-2").unwrap();
        assert_eq!(expr.modifier, -2);
    }

    #[test]
    fn test_parse_case_insensitive_separator() {
        let expr = DiceExpression::parse("2D6+3").unwrap();
        assert_eq!(expr, DiceExpression::parse("2d6+3").unwrap());
    }

    #[test]
    fn test_parse_trims_whitespace() {
        assert!(DiceExpression::parse("  1d8  ").is_ok());
    }

    #[test]
    fn test_parse_malformed() {
        for notation in [
            "abc", "d6", "2d", "", "2d6+", "2d6-", "2x6", "2d6+abc", "+2d6", "2d6+-3", "2d6 3",
            "1d6+3x",
        ] {
            let result = DiceExpression::parse(notation);
            assert!(
                matches!(result, Err(DiceError::MalformedExpression(_))),
                "expected {notation:?} to be malformed"
            );
        }
    }

    #[test]
    fn test_parse_rejects_zero_count_and_sides() {
        assert!(DiceExpression::parse("0d6").is_err());
        assert!(DiceExpression::parse("1d0").is_err());
    }

    #[test]
    fn test_roll_bounds() {
        let expr = DiceExpression::parse("2d6+3").unwrap();
        for _ in 0..100 {
            let result = expr.roll();
            assert!(result.total >= 5 && result.total <= 15);
            assert_eq!(result.rolls.len(), 2);
            assert!(result.rolls.iter().all(|&r| (1..=6).contains(&r)));
        }
    }

    #[test]
    fn test_roll_no_modifier_bounds() {
        for _ in 0..100 {
            let result = roll("1d20").unwrap();
            assert!(result.total >= 1 && result.total <= 20);
        }
    }

    #[test]
    fn test_roll_fixed_die() {
        let result = roll("1d1").unwrap();
        assert_eq!(result.total, 1);
        assert_eq!(result.rolls, vec![1]);
    }

    #[test]
    fn test_roll_seeded_is_deterministic() {
        let expr = DiceExpression::parse("3d8+2").unwrap();
        let a = expr.roll_with(&mut ChaCha8Rng::seed_from_u64(7));
        let b = expr.roll_with(&mut ChaCha8Rng::seed_from_u64(7));
        assert_eq!(a.rolls, b.rolls);
        assert_eq!(a.total, b.total);
    }

    #[test]
    fn test_range() {
        let expr = DiceExpression::parse("2d6+3").unwrap();
        assert_eq!(expr.range(), (5, 15));

        let expr = DiceExpression::parse("1d4-2").unwrap();
        assert_eq!(expr.range(), (-1, 2));
    }

    #[test]
    fn test_display_round_trip() {
        for notation in ["1d20", "2d6+3", "4d8-1"] {
            let expr = DiceExpression::parse(notation).unwrap();
            assert_eq!(expr.to_string(), notation);
        }
    }

    #[test]
    fn test_d20_normal_draws_one_die() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let roll = d20_with(Advantage::Normal, &mut rng);
        assert_eq!(roll.rolls.len(), 1);
        assert_eq!(roll.kept, roll.rolls[0]);
    }

    #[test]
    fn test_d20_advantage_keeps_max() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        for _ in 0..50 {
            let roll = d20_with(Advantage::Advantage, &mut rng);
            assert_eq!(roll.rolls.len(), 2);
            assert_eq!(roll.kept, *roll.rolls.iter().max().unwrap());
        }
    }

    #[test]
    fn test_d20_disadvantage_keeps_min() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        for _ in 0..50 {
            let roll = d20_with(Advantage::Disadvantage, &mut rng);
            assert_eq!(roll.rolls.len(), 2);
            assert_eq!(roll.kept, *roll.rolls.iter().min().unwrap());
        }
    }

    #[test]
    fn test_d20_natural_flags() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let mut saw_20 = false;
        let mut saw_1 = false;
        for _ in 0..500 {
            let roll = d20_with(Advantage::Normal, &mut rng);
            assert_eq!(roll.natural_20, roll.kept == 20);
            assert_eq!(roll.natural_1, roll.kept == 1);
            saw_20 |= roll.natural_20;
            saw_1 |= roll.natural_1;
        }
        assert!(saw_20 && saw_1);
    }

    #[test]
    fn test_advantage_combine() {
        assert_eq!(
            Advantage::Normal.combine(Advantage::Advantage),
            Advantage::Advantage
        );
        assert_eq!(
            Advantage::Advantage.combine(Advantage::Disadvantage),
            Advantage::Normal
        );
        assert_eq!(
            Advantage::Disadvantage.combine(Advantage::Disadvantage),
            Advantage::Disadvantage
        );
    }
}
