//! Deterministic combat domain logic shared across the pipeline.
//!
//! `combat-core` defines the canonical combat rules (damage resolution,
//! attack resolution, timed effects) and the event machinery the scheduler
//! drives: the combat event type with its lifecycle, the priority queue,
//! and the active-participant set. Everything here is pure and synchronous;
//! randomness enters only through the [`attack::RollSource`] capability and
//! time only through explicit timestamps, so every function can be exercised
//! deterministically from tests.
pub mod attack;
pub mod damage;
pub mod effect;
pub mod event;
pub mod participant;
pub mod queue;

pub use attack::{Attack, AttackError, AttackResult, AttackSpec, AttackType, RollSource};
pub use damage::{DamageError, DamageResolution, DamageType, Resistance, resolve};
pub use effect::{CombatEffect, EffectError, EffectKind};
pub use event::{CombatEvent, EventData, EventError, EventId, EventKind, EventRecord, EventStatus};
pub use participant::{ActiveParticipants, ParticipantId};
pub use queue::CombatQueue;
