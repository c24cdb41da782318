//! Damage resolution.
//!
//! Pure numeric pipeline turning a raw damage amount into the final value
//! after critical multipliers, typed resistances, and armor. No state, no
//! randomness; callers that need rolls draw them first (see [`crate::attack`]).

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// Damage Type
// ============================================================================

/// Damage type for resistances and damage calculation.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum DamageType {
    /// Physical damage (melee, projectiles). The only type reduced by armor.
    Physical,
    Fire,
    Ice,
    Energy,
    Earth,
    Holy,
    Death,
    /// Healing uses the damage pipeline with the sign flipped by callers;
    /// it can never be resisted.
    Healing,
}

// ============================================================================
// Resistance
// ============================================================================

/// A typed resistance entry, expressed as a percentage of damage removed.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Resistance {
    pub damage_type: DamageType,
    pub percentage: f64,
}

impl Resistance {
    /// Create a validated resistance entry.
    ///
    /// # Errors
    ///
    /// Rejects percentages outside `[0, 100]` and any entry for
    /// [`DamageType::Healing`].
    pub fn new(damage_type: DamageType, percentage: f64) -> Result<Self, DamageError> {
        if damage_type == DamageType::Healing {
            return Err(DamageError::HealingResistance);
        }
        if !(0.0..=100.0).contains(&percentage) {
            return Err(DamageError::PercentageOutOfRange { percentage });
        }
        Ok(Self {
            damage_type,
            percentage,
        })
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum DamageError {
    #[error("resistance percentage {percentage} is outside [0, 100]")]
    PercentageOutOfRange { percentage: f64 },

    #[error("healing cannot be resisted")]
    HealingResistance,
}

// ============================================================================
// Resolution
// ============================================================================

/// Outcome of one damage resolution pass.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DamageResolution {
    /// The amount passed in, before any modifier.
    pub original_damage: f64,
    /// Final damage after all modifiers, floored and clamped to zero.
    pub final_damage: u32,
    /// True when the modifiers removed all of a non-zero amount.
    pub was_blocked: bool,
    pub was_critical: bool,
    /// Resistance percentage that applied, 0 when no entry matched.
    pub resistance_applied: f64,
}

/// Fraction of the running physical damage that armor can remove at most.
const ARMOR_CAP: f64 = 0.8;

/// Damage removed per point of armor.
const ARMOR_FACTOR: f64 = 0.1;

/// Resolve a damage amount against resistances and armor.
///
/// # Formula
///
/// ```text
/// running = amount * (is_critical ? critical_multiplier : 1)
/// running *= (100 - resistance_pct) / 100      # first entry matching type
/// running -= min(armor * 0.1, running * 0.8)   # physical only
/// final   = max(floor(running), 0)
/// ```
///
/// Pure and idempotent: identical inputs always produce identical output.
pub fn resolve(
    amount: f64,
    damage_type: DamageType,
    resistances: &[Resistance],
    armor: f64,
    critical_multiplier: f64,
    is_critical: bool,
) -> DamageResolution {
    let mut running = amount;

    if is_critical {
        running *= critical_multiplier;
    }

    let resistance_applied = resistances
        .iter()
        .find(|entry| entry.damage_type == damage_type)
        .map(|entry| entry.percentage)
        .unwrap_or(0.0);
    running *= (100.0 - resistance_applied) / 100.0;

    if damage_type == DamageType::Physical {
        let reduction = (armor * ARMOR_FACTOR).min(running * ARMOR_CAP);
        running -= reduction;
    }

    let final_damage = running.floor().max(0.0) as u32;

    DamageResolution {
        original_damage: amount,
        final_damage,
        was_blocked: final_damage == 0 && amount > 0.0,
        was_critical: is_critical,
        resistance_applied,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fire_resistance(pct: f64) -> Resistance {
        Resistance::new(DamageType::Fire, pct).unwrap()
    }

    #[test]
    fn critical_doubles_before_resistance() {
        // 300 fire, 50% resistance, critical x2: 300 * 2 = 600, * 0.5 = 300
        let resolution = resolve(
            300.0,
            DamageType::Fire,
            &[fire_resistance(50.0)],
            0.0,
            2.0,
            true,
        );

        assert_eq!(resolution.final_damage, 300);
        assert!(resolution.was_critical);
        assert_eq!(resolution.resistance_applied, 50.0);
    }

    #[test]
    fn first_matching_resistance_wins() {
        let entries = [fire_resistance(25.0), fire_resistance(75.0)];
        let resolution = resolve(100.0, DamageType::Fire, &entries, 0.0, 2.0, false);

        assert_eq!(resolution.resistance_applied, 25.0);
        assert_eq!(resolution.final_damage, 75);
    }

    #[test]
    fn unmatched_resistance_applies_nothing() {
        let entries = [fire_resistance(50.0)];
        let resolution = resolve(100.0, DamageType::Ice, &entries, 0.0, 2.0, false);

        assert_eq!(resolution.resistance_applied, 0.0);
        assert_eq!(resolution.final_damage, 100);
    }

    #[test]
    fn armor_reduces_physical_damage() {
        // armor 100 -> reduction 10, well under the 80% cap
        let resolution = resolve(50.0, DamageType::Physical, &[], 100.0, 2.0, false);
        assert_eq!(resolution.final_damage, 40);
    }

    #[test]
    fn armor_reduction_caps_at_eighty_percent() {
        // armor 10_000 would remove 1_000, but the cap leaves 20% of 50
        let resolution = resolve(50.0, DamageType::Physical, &[], 10_000.0, 2.0, false);
        assert_eq!(resolution.final_damage, 10);
    }

    #[test]
    fn armor_ignored_for_non_physical() {
        let resolution = resolve(50.0, DamageType::Fire, &[], 10_000.0, 2.0, false);
        assert_eq!(resolution.final_damage, 50);
    }

    #[test]
    fn blocked_only_when_nonzero_amount_hits_zero() {
        let blocked = resolve(
            10.0,
            DamageType::Fire,
            &[fire_resistance(100.0)],
            0.0,
            2.0,
            false,
        );
        assert!(blocked.was_blocked);
        assert_eq!(blocked.final_damage, 0);

        let zero_amount = resolve(0.0, DamageType::Fire, &[], 0.0, 2.0, false);
        assert!(!zero_amount.was_blocked);
    }

    #[test]
    fn final_damage_never_negative() {
        let resolution = resolve(1.0, DamageType::Physical, &[], 10_000.0, 2.0, false);
        assert_eq!(resolution.final_damage, 0);
    }

    #[test]
    fn resolve_is_idempotent() {
        let entries = [fire_resistance(33.0)];
        let first = resolve(123.4, DamageType::Fire, &entries, 5.0, 2.0, true);
        let second = resolve(123.4, DamageType::Fire, &entries, 5.0, 2.0, true);
        assert_eq!(first, second);
    }

    #[test]
    fn resistance_validation() {
        assert_eq!(
            Resistance::new(DamageType::Fire, 101.0),
            Err(DamageError::PercentageOutOfRange { percentage: 101.0 })
        );
        assert_eq!(
            Resistance::new(DamageType::Fire, -1.0),
            Err(DamageError::PercentageOutOfRange { percentage: -1.0 })
        );
        assert_eq!(
            Resistance::new(DamageType::Healing, 10.0),
            Err(DamageError::HealingResistance)
        );
        assert!(Resistance::new(DamageType::Physical, 0.0).is_ok());
        assert!(Resistance::new(DamageType::Earth, 100.0).is_ok());
    }
}
