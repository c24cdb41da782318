//! Shared mutable combat state.
//!
//! The queue, the active-participant set, and the periodic-effect schedule
//! are written from two directions: admission calls arriving on any task,
//! and the tick loop. One mutex covers all three so an admission can never
//! observe a participant marked active without its event queued. The tick
//! loop snapshots what it needs under the lock and resolves events outside
//! it, so slow resolution never blocks admissions for a whole tick.

use std::sync::{Arc, Mutex, MutexGuard};

use combat_core::{ActiveParticipants, CombatEffect, CombatQueue, ParticipantId};

use crate::api::errors::{Result, RuntimeError};

/// A periodic effect waiting for its next pulse.
///
/// Counts in whole scheduler ticks; the processor decrements the countdown
/// once per tick and emits a pulse event when it reaches zero.
#[derive(Clone, Debug)]
pub(crate) struct ScheduledEffect {
    pub effect: CombatEffect,
    pub ticks_until_pulse: u32,
    pub remaining_pulses: u32,
}

impl ScheduledEffect {
    pub fn new(effect: CombatEffect) -> Self {
        let ticks = interval_ticks(&effect);
        Self {
            ticks_until_pulse: ticks,
            remaining_pulses: effect.pulses(),
            effect,
        }
    }

    pub fn involves(&self, id: &ParticipantId) -> bool {
        self.effect.source_id == *id || self.effect.target_id == *id
    }
}

/// Whole ticks between pulses, never less than one.
pub(crate) fn interval_ticks(effect: &CombatEffect) -> u32 {
    (effect.interval.round() as u32).max(1)
}

/// Everything the scheduler and the admission side share.
#[derive(Debug, Default)]
pub(crate) struct CombatState {
    pub queue: CombatQueue,
    pub active: ActiveParticipants,
    pub effect_schedule: Vec<ScheduledEffect>,
}

/// Mutex-protected [`CombatState`] with poisoning mapped to a typed error.
#[derive(Debug, Default)]
pub(crate) struct SharedCombat {
    inner: Mutex<CombatState>,
}

impl SharedCombat {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn lock(&self) -> Result<MutexGuard<'_, CombatState>> {
        self.inner.lock().map_err(|_| RuntimeError::StatePoisoned)
    }
}
