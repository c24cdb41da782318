//! Cloneable façade for admitting combat events and querying status.
//!
//! [`CombatHandle`] hides the locking discipline: every admission takes the
//! shared-state lock once, enqueues, and marks the event's participants
//! active before releasing it. Validation failures are raised here,
//! synchronously, and never enter the queue.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::broadcast;

use combat_core::{
    AttackSpec, AttackType, CombatEffect, CombatEvent, DamageType, EventData, EventRecord,
    ParticipantId,
};

use super::errors::{Result, RuntimeError};
use crate::events::{CombatNotice, EventBus};
use crate::state::SharedCombat;

/// Priority for an attack between participants already in combat.
pub(crate) const PRIORITY_ATTACK_ACTIVE: i32 = 1;
/// Priority for an attack that opens a fight.
pub(crate) const PRIORITY_ATTACK_IDLE: i32 = 0;
/// Effects resolve after attacks.
pub(crate) const PRIORITY_EFFECT: i32 = -1;
/// Combat termination preempts everything queued.
pub(crate) const PRIORITY_END_COMBAT: i32 = 10;

const DEFAULT_CRITICAL_CHANCE: f64 = 0.05;
const DEFAULT_ACCURACY: f64 = 0.9;

/// Attack admission request.
///
/// The tuning fields default to the standard values (no dodge, no block,
/// no mitigation, 5% critical, 90% accuracy); construct with
/// [`AttackRequest::new`] and override the ones that matter.
#[derive(Clone, Debug)]
pub struct AttackRequest {
    pub attacker_id: ParticipantId,
    pub target_id: ParticipantId,
    pub attack_type: AttackType,
    pub damage_type: DamageType,
    pub base_damage: f64,
    pub dodge_chance: f64,
    pub block_chance: f64,
    pub resistance: f64,
    pub critical_chance: f64,
    pub accuracy: f64,
}

impl AttackRequest {
    pub fn new(
        attacker_id: impl Into<ParticipantId>,
        target_id: impl Into<ParticipantId>,
        attack_type: AttackType,
        damage_type: DamageType,
        base_damage: f64,
    ) -> Self {
        Self {
            attacker_id: attacker_id.into(),
            target_id: target_id.into(),
            attack_type,
            damage_type,
            base_damage,
            dodge_chance: 0.0,
            block_chance: 0.0,
            resistance: 0.0,
            critical_chance: DEFAULT_CRITICAL_CHANCE,
            accuracy: DEFAULT_ACCURACY,
        }
    }

    fn into_spec(self) -> AttackSpec {
        AttackSpec {
            attacker_id: self.attacker_id,
            target_id: self.target_id,
            attack_type: self.attack_type,
            damage_type: self.damage_type,
            base_damage: self.base_damage,
            dodge_chance: self.dodge_chance,
            block_chance: self.block_chance,
            resistance: self.resistance,
            critical_chance: self.critical_chance,
            accuracy: self.accuracy,
        }
    }
}

/// Combat status snapshot for one participant.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CombatStatus {
    pub in_combat: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub pending_events: Vec<EventRecord>,
}

/// Client-facing handle to the combat pipeline.
#[derive(Clone)]
pub struct CombatHandle {
    shared: Arc<SharedCombat>,
    bus: EventBus,
}

impl CombatHandle {
    pub(crate) fn new(shared: Arc<SharedCombat>, bus: EventBus) -> Self {
        Self { shared, bus }
    }

    /// Admit an attack between two participants.
    ///
    /// Priority is 1 when either side is already in combat, 0 otherwise;
    /// both are marked active on admission.
    pub fn submit_attack(&self, request: AttackRequest) -> Result<EventRecord> {
        let spec = request.into_spec();
        spec.validate()?;

        let attacker = spec.attacker_id.clone();
        let target = spec.target_id.clone();

        let mut state = self.shared.lock()?;
        let engaged = state.active.contains(&attacker) || state.active.contains(&target);
        let priority = if engaged {
            PRIORITY_ATTACK_ACTIVE
        } else {
            PRIORITY_ATTACK_IDLE
        };

        let event = CombatEvent::new(EventData::Attack(spec), priority, vec![attacker, target])?;
        Ok(Self::admit(&mut state, event))
    }

    /// Admit a status effect. Effects always queue below attacks.
    pub fn apply_effect(&self, effect: CombatEffect) -> Result<EventRecord> {
        let participants = vec![effect.source_id.clone(), effect.target_id.clone()];
        let event = CombatEvent::new(
            EventData::ApplyEffect(effect),
            PRIORITY_EFFECT,
            participants,
        )?;

        let mut state = self.shared.lock()?;
        Ok(Self::admit(&mut state, event))
    }

    /// Admit combat termination for an active participant.
    ///
    /// # Errors
    ///
    /// [`RuntimeError::ParticipantNotInCombat`] when the participant has no
    /// active membership.
    pub fn end_combat(
        &self,
        participant: impl Into<ParticipantId>,
        reason: Option<String>,
    ) -> Result<EventRecord> {
        let id = participant.into();

        let mut state = self.shared.lock()?;
        if !state.active.contains(&id) {
            return Err(RuntimeError::ParticipantNotInCombat { id });
        }

        let event = CombatEvent::new(
            EventData::EndCombat { reason },
            PRIORITY_END_COMBAT,
            vec![id],
        )?;
        Ok(Self::admit(&mut state, event))
    }

    /// Generic admission: enqueue an already-built event and mark every
    /// participant active. The typed entry points above are the usual path;
    /// this one exists for callers that construct events themselves.
    pub fn submit_event(&self, event: CombatEvent) -> Result<EventRecord> {
        let mut state = self.shared.lock()?;
        Ok(Self::admit(&mut state, event))
    }

    /// Combat status for one participant.
    pub fn status(&self, participant: impl Into<ParticipantId>) -> Result<CombatStatus> {
        let id = participant.into();
        let state = self.shared.lock()?;

        Ok(CombatStatus {
            in_combat: state.active.contains(&id),
            pending_events: state
                .queue
                .pending_for(&id)
                .into_iter()
                .map(CombatEvent::record)
                .collect(),
        })
    }

    /// Subscribe to completed/failed event notices.
    pub fn subscribe(&self) -> broadcast::Receiver<CombatNotice> {
        self.bus.subscribe()
    }

    fn admit(state: &mut crate::state::CombatState, event: CombatEvent) -> EventRecord {
        let record = event.record();
        tracing::debug!(
            event = %event.id(),
            kind = %event.kind(),
            priority = event.priority(),
            "combat event admitted"
        );
        for id in event.participants() {
            state.active.add(id.clone());
        }
        state.queue.enqueue(event);
        record
    }
}
