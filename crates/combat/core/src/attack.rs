//! Attack resolution.
//!
//! One [`Attack`] wraps a single attempt and produces its result through the
//! hit/dodge/critical/block pipeline. Rolls come from an injected
//! [`RollSource`] so resolution is reproducible under test.

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::damage::DamageType;
use crate::participant::ParticipantId;

// ============================================================================
// Roll Source
// ============================================================================

/// Source of uniform rolls in `[0, 1)`.
///
/// Injected into resolution so dodge/critical/block rolls can come from a
/// seeded generator in tests and from a real RNG in production.
pub trait RollSource {
    fn roll(&mut self) -> f64;
}

impl<R: Rng + ?Sized> RollSource for R {
    fn roll(&mut self) -> f64 {
        self.gen_range(0.0..1.0)
    }
}

// ============================================================================
// Attack
// ============================================================================

/// Delivery style of an attack.
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
pub enum AttackType {
    Melee,
    Ranged,
    Magical,
    Special,
}

/// Parameters of one attack attempt, as admitted from the outside.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AttackSpec {
    pub attacker_id: ParticipantId,
    pub target_id: ParticipantId,
    pub attack_type: AttackType,
    pub damage_type: DamageType,
    pub base_damage: f64,
    pub dodge_chance: f64,
    pub block_chance: f64,
    /// Scalar mitigation in `[0, 1]` applied to the final damage.
    pub resistance: f64,
    pub critical_chance: f64,
    pub accuracy: f64,
}

impl AttackSpec {
    /// Validate the numeric ranges of the spec.
    ///
    /// # Errors
    ///
    /// Rejects negative base damage and any chance outside `[0, 1]`.
    pub fn validate(&self) -> Result<(), AttackError> {
        if self.base_damage < 0.0 {
            return Err(AttackError::NegativeBaseDamage {
                base_damage: self.base_damage,
            });
        }
        for (field, value) in [
            ("dodge_chance", self.dodge_chance),
            ("block_chance", self.block_chance),
            ("resistance", self.resistance),
            ("critical_chance", self.critical_chance),
            ("accuracy", self.accuracy),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(AttackError::ChanceOutOfRange { field, value });
            }
        }
        Ok(())
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum AttackError {
    #[error("base damage {base_damage} must not be negative")]
    NegativeBaseDamage { base_damage: f64 },

    #[error("{field} {value} is outside [0, 1]")]
    ChanceOutOfRange { field: &'static str, value: f64 },
}

/// Outcome of a resolved attack.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttackResult {
    /// Damage dealt; 0 when dodged, at least 1 otherwise.
    pub damage: u32,
    pub damage_type: DamageType,
    pub critical: bool,
    pub dodged: bool,
    /// Amount removed by a successful block.
    pub blocked: u32,
}

/// One attack attempt.
///
/// Immutable after construction except for the one-shot result slot filled
/// by [`Attack::resolve`]. Re-invoking `resolve` overwrites the stored
/// result; it never accumulates.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Attack {
    spec: AttackSpec,
    created_at: DateTime<Utc>,
    result: Option<AttackResult>,
}

impl Attack {
    /// Build a validated attack from its spec.
    pub fn new(spec: AttackSpec) -> Result<Self, AttackError> {
        spec.validate()?;
        Ok(Self {
            spec,
            created_at: Utc::now(),
            result: None,
        })
    }

    pub fn spec(&self) -> &AttackSpec {
        &self.spec
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn result(&self) -> Option<&AttackResult> {
        self.result.as_ref()
    }

    /// Run the hit/dodge/critical/block pipeline.
    ///
    /// # Pipeline
    ///
    /// 1. Draw independent hit and dodge rolls. A hit roll above accuracy or
    ///    a dodge roll under `dodge_chance` means the attack is dodged.
    /// 2. Draw a critical roll; a critical doubles the base damage.
    /// 3. Apply the scalar resistance `(1 - resistance)`.
    /// 4. Draw a block roll; a block removes `floor(damage * 0.5)`.
    /// 5. Floor; a non-dodged attack always deals at least 1.
    pub fn resolve(
        &mut self,
        dodge_chance: f64,
        block_chance: f64,
        resistance: f64,
        rolls: &mut dyn RollSource,
    ) -> AttackResult {
        let hit_roll = rolls.roll();
        let dodge_roll = rolls.roll();

        if hit_roll > self.spec.accuracy || dodge_roll < dodge_chance {
            let result = AttackResult {
                damage: 0,
                damage_type: self.spec.damage_type,
                critical: false,
                dodged: true,
                blocked: 0,
            };
            self.result = Some(result);
            return result;
        }

        let critical = rolls.roll() < self.spec.critical_chance;
        let multiplier = if critical { 2.0 } else { 1.0 };
        let mut damage = self.spec.base_damage * multiplier * (1.0 - resistance);

        let mut blocked = 0u32;
        if rolls.roll() < block_chance {
            blocked = (damage * 0.5).floor() as u32;
            damage -= blocked as f64;
        }

        let result = AttackResult {
            damage: (damage.floor() as u32).max(1),
            damage_type: self.spec.damage_type,
            critical,
            dodged: false,
            blocked,
        };
        self.result = Some(result);
        result
    }
}
