//! Scheduler and admission surface for the combat event pipeline.
//!
//! This crate wires the pure domain logic from `combat-core` into a running
//! service: [`EventProcessor`] owns the periodic tick that drains the event
//! queue, [`CombatHandle`] is the cloneable façade callers use to admit
//! events and query status, and [`EventBus`] streams resolved event records
//! back to collaborators.
//!
//! Modules are organized by responsibility:
//! - [`api`] exposes the types downstream clients interact with
//! - [`events`] provides the broadcast bus for result notifications
//! - [`processor`] hosts the scheduler and its builder
//! - `state` keeps the shared queue/participant state internal to the crate
pub mod api;
pub mod events;
pub mod processor;

mod state;

pub use api::{AttackRequest, CombatHandle, CombatStatus, Result, RuntimeError};
pub use events::{CombatNotice, EventBus};
pub use processor::{EventProcessor, ProcessorBuilder, ProcessorConfig};

// Domain types callers need when talking to the handle.
pub use combat_core::{
    Attack, AttackResult, AttackSpec, AttackType, CombatEffect, CombatEvent, DamageType,
    EffectKind, EventData, EventId, EventKind, EventRecord, ParticipantId,
};
