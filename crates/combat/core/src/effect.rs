//! Timed and periodic combat effects.
//!
//! A [`CombatEffect`] is an immutable description of a status effect; the
//! scheduler decides when its pulses fire. Durations and intervals are
//! measured in scheduler ticks.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::participant::ParticipantId;

/// Status effect classification.
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
pub enum EffectKind {
    DamageOverTime,
    HealingOverTime,
    Stun,
    Slow,
    Bleed,
    Poison,
    Burn,
    Freeze,
    Buff,
    Debuff,
}

impl EffectKind {
    /// Effects that pulse repeatedly at their interval.
    pub fn is_periodic(self) -> bool {
        matches!(
            self,
            Self::DamageOverTime | Self::HealingOverTime | Self::Bleed | Self::Poison | Self::Burn
        )
    }

    /// Effects that restrict the target's actions.
    pub fn is_control(self) -> bool {
        matches!(self, Self::Stun | Self::Slow | Self::Freeze)
    }

    pub fn is_damaging(self) -> bool {
        matches!(
            self,
            Self::DamageOverTime | Self::Bleed | Self::Poison | Self::Burn
        )
    }

    pub fn is_healing(self) -> bool {
        matches!(self, Self::HealingOverTime)
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum EffectError {
    #[error("effect duration {duration} must be positive")]
    NonPositiveDuration { duration: f64 },

    #[error("effect interval {interval} must be positive")]
    NonPositiveInterval { interval: f64 },
}

/// Immutable description of a timed status effect.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CombatEffect {
    pub kind: EffectKind,
    /// Magnitude per pulse for periodic kinds, total magnitude otherwise.
    pub value: f64,
    /// Lifetime in scheduler ticks, strictly positive.
    pub duration: f64,
    /// Ticks between pulses, strictly positive.
    pub interval: f64,
    pub source_id: ParticipantId,
    pub target_id: ParticipantId,
    pub started_at: DateTime<Utc>,
    /// Free-form annotations carried along for collaborators.
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

impl CombatEffect {
    /// Create an effect with the default interval of 1 tick.
    pub fn new(
        kind: EffectKind,
        value: f64,
        duration: f64,
        source_id: ParticipantId,
        target_id: ParticipantId,
    ) -> Result<Self, EffectError> {
        if duration <= 0.0 {
            return Err(EffectError::NonPositiveDuration { duration });
        }
        Ok(Self {
            kind,
            value,
            duration,
            interval: 1.0,
            source_id,
            target_id,
            started_at: Utc::now(),
            metadata: serde_json::Map::new(),
        })
    }

    /// Override the pulse interval.
    pub fn with_interval(mut self, interval: f64) -> Result<Self, EffectError> {
        if interval <= 0.0 {
            return Err(EffectError::NonPositiveInterval { interval });
        }
        self.interval = interval;
        Ok(self)
    }

    pub fn with_metadata(
        mut self,
        metadata: serde_json::Map<String, serde_json::Value>,
    ) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn is_periodic(&self) -> bool {
        self.kind.is_periodic()
    }

    pub fn is_control(&self) -> bool {
        self.kind.is_control()
    }

    pub fn is_damaging(&self) -> bool {
        self.kind.is_damaging()
    }

    pub fn is_healing(&self) -> bool {
        self.kind.is_healing()
    }

    /// Number of pulses a periodic effect fires over its lifetime.
    pub fn pulses(&self) -> u32 {
        (self.duration / self.interval).ceil() as u32
    }

    /// Total magnitude over the effect's lifetime: `value * ceil(duration /
    /// interval)` for periodic kinds, `value` otherwise.
    pub fn total_value(&self) -> f64 {
        if self.is_periodic() {
            self.value * f64::from(self.pulses())
        } else {
            self.value
        }
    }
}
