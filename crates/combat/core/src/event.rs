//! The combat event: a typed, prioritized unit of work with a
//! forward-moving lifecycle.
//!
//! Status is a tagged union rather than a flag plus side fields, so a
//! completed event carries its result and completion time in the same
//! place and can never drift back to pending.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

use crate::attack::AttackSpec;
use crate::effect::CombatEffect;
use crate::participant::ParticipantId;

// ============================================================================
// Identity & type tags
// ============================================================================

/// Unique identity of a combat event.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(Uuid);

impl EventId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for EventId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for EventId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Event type tag, derived from the payload.
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
pub enum EventKind {
    Attack,
    ApplyEffect,
    ProcessEffect,
    RemoveEffect,
    EndCombat,
}

// ============================================================================
// Payload & status
// ============================================================================

/// Type-keyed payload. Exactly one shape per event kind, so a payload can
/// never be missing or mismatched for its type.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventData {
    Attack(AttackSpec),
    ApplyEffect(CombatEffect),
    ProcessEffect(CombatEffect),
    RemoveEffect(CombatEffect),
    EndCombat { reason: Option<String> },
}

/// Lifecycle state. Transitions only move forward:
/// `Pending -> Processing -> Completed | Failed`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum EventStatus {
    Pending,
    Processing { started_at: DateTime<Utc> },
    Completed { at: DateTime<Utc>, result: Value },
    Failed { at: DateTime<Utc>, error: String },
}

impl EventStatus {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing { .. } => "processing",
            Self::Completed { .. } => "completed",
            Self::Failed { .. } => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed { .. } | Self::Failed { .. })
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum EventError {
    #[error("combat event requires at least one participant")]
    NoParticipants,
}

// ============================================================================
// Combat Event
// ============================================================================

/// A prioritized unit of combat work.
///
/// The participant set is fixed at construction; only the status moves,
/// and only forward.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CombatEvent {
    id: EventId,
    data: EventData,
    status: EventStatus,
    created_at: DateTime<Utc>,
    priority: i32,
    participants: Vec<ParticipantId>,
}

impl CombatEvent {
    /// Create a pending event.
    ///
    /// Duplicate participant ids are collapsed, keeping first-seen order.
    ///
    /// # Errors
    ///
    /// [`EventError::NoParticipants`] when the participant list is empty.
    pub fn new(
        data: EventData,
        priority: i32,
        participants: Vec<ParticipantId>,
    ) -> Result<Self, EventError> {
        if participants.is_empty() {
            return Err(EventError::NoParticipants);
        }
        let mut deduped: Vec<ParticipantId> = Vec::with_capacity(participants.len());
        for id in participants {
            if !deduped.contains(&id) {
                deduped.push(id);
            }
        }
        Ok(Self {
            id: EventId::new(),
            data,
            status: EventStatus::Pending,
            created_at: Utc::now(),
            priority,
            participants: deduped,
        })
    }

    /// Override the creation timestamp. Ordering tests use this to pin the
    /// FIFO tie-break; production code keeps the construction time.
    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }

    pub fn id(&self) -> EventId {
        self.id
    }

    pub fn kind(&self) -> EventKind {
        match &self.data {
            EventData::Attack(_) => EventKind::Attack,
            EventData::ApplyEffect(_) => EventKind::ApplyEffect,
            EventData::ProcessEffect(_) => EventKind::ProcessEffect,
            EventData::RemoveEffect(_) => EventKind::RemoveEffect,
            EventData::EndCombat { .. } => EventKind::EndCombat,
        }
    }

    pub fn data(&self) -> &EventData {
        &self.data
    }

    pub fn status(&self) -> &EventStatus {
        &self.status
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn priority(&self) -> i32 {
        self.priority
    }

    pub fn participants(&self) -> &[ParticipantId] {
        &self.participants
    }

    pub fn involves(&self, id: &ParticipantId) -> bool {
        self.participants.contains(id)
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.status, EventStatus::Pending)
    }

    /// Move to `Processing`. Callers drive the lifecycle strictly forward;
    /// marking a non-pending event is a caller bug and is not defended.
    pub fn mark_processing(&mut self, now: DateTime<Utc>) {
        self.status = EventStatus::Processing { started_at: now };
    }

    /// Attach the result and move to `Completed`. A terminal event is left
    /// untouched; completion happens at most once.
    pub fn complete(&mut self, now: DateTime<Utc>, result: Value) {
        if !self.status.is_terminal() {
            self.status = EventStatus::Completed { at: now, result };
        }
    }

    /// Attach the error and move to `Failed`. Terminal events stay as-is.
    pub fn fail(&mut self, now: DateTime<Utc>, error: impl Into<String>) {
        if !self.status.is_terminal() {
            self.status = EventStatus::Failed {
                at: now,
                error: error.into(),
            };
        }
    }

    pub fn processed_at(&self) -> Option<DateTime<Utc>> {
        match &self.status {
            EventStatus::Completed { at, .. } | EventStatus::Failed { at, .. } => Some(*at),
            _ => None,
        }
    }

    /// Serialized wire representation.
    pub fn record(&self) -> EventRecord {
        let result = match &self.status {
            EventStatus::Completed { result, .. } => Some(result.clone()),
            EventStatus::Failed { error, .. } => Some(serde_json::json!({ "error": error })),
            _ => None,
        };
        let data = match &self.data {
            EventData::Attack(spec) => to_json(spec),
            EventData::ApplyEffect(effect)
            | EventData::ProcessEffect(effect)
            | EventData::RemoveEffect(effect) => to_json(effect),
            EventData::EndCombat { reason } => serde_json::json!({ "reason": reason }),
        };
        EventRecord {
            id: self.id,
            kind: self.kind(),
            status: self.status.label().to_owned(),
            data,
            created_at: self.created_at,
            processed_at: self.processed_at(),
            result,
            priority: self.priority,
            participant_ids: self.participants.clone(),
        }
    }
}

/// Domain types serialize infallibly (string keys only); `Null` is the
/// fallback that keeps the record total.
fn to_json<T: Serialize>(value: &T) -> Value {
    serde_json::to_value(value).unwrap_or(Value::Null)
}

/// JSON-shaped snapshot of an event, as emitted to collaborators.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRecord {
    pub id: EventId,
    #[serde(rename = "type")]
    pub kind: EventKind,
    pub status: String,
    pub data: Value,
    pub created_at: DateTime<Utc>,
    pub processed_at: Option<DateTime<Utc>>,
    pub result: Option<Value>,
    pub priority: i32,
    pub participant_ids: Vec<ParticipantId>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn end_combat_event(priority: i32) -> CombatEvent {
        CombatEvent::new(
            EventData::EndCombat { reason: None },
            priority,
            vec!["hero-1".into()],
        )
        .unwrap()
    }

    #[test]
    fn rejects_empty_participants() {
        let result = CombatEvent::new(EventData::EndCombat { reason: None }, 0, vec![]);
        assert_eq!(result.unwrap_err(), EventError::NoParticipants);
    }

    #[test]
    fn deduplicates_participants_preserving_order() {
        let event = CombatEvent::new(
            EventData::EndCombat { reason: None },
            0,
            vec!["b".into(), "a".into(), "b".into()],
        )
        .unwrap();
        let ids: Vec<_> = event.participants().iter().map(|p| p.as_str()).collect();
        assert_eq!(ids, ["b", "a"]);
    }

    #[test]
    fn lifecycle_moves_forward_only() {
        let mut event = end_combat_event(0);
        assert!(event.is_pending());
        assert_eq!(event.processed_at(), None);

        let now = Utc::now();
        event.mark_processing(now);
        assert_eq!(event.status().label(), "processing");

        event.complete(now, serde_json::json!({ "ended": true }));
        assert_eq!(event.status().label(), "completed");
        assert_eq!(event.processed_at(), Some(now));

        // A terminal event ignores further transitions.
        event.fail(Utc::now(), "too late");
        assert_eq!(event.status().label(), "completed");
    }

    #[test]
    fn failure_captures_the_error_as_result() {
        let mut event = end_combat_event(0);
        event.mark_processing(Utc::now());
        event.fail(Utc::now(), "handler exploded");

        let record = event.record();
        assert_eq!(record.status, "failed");
        assert_eq!(
            record.result,
            Some(serde_json::json!({ "error": "handler exploded" }))
        );
    }

    #[test]
    fn record_uses_the_wire_field_names() {
        let event = end_combat_event(10);
        let json = serde_json::to_value(event.record()).unwrap();

        assert_eq!(json["type"], "end_combat");
        assert_eq!(json["status"], "pending");
        assert_eq!(json["priority"], 10);
        assert!(json["createdAt"].is_string());
        assert!(json["processedAt"].is_null());
        assert!(json["result"].is_null());
        assert_eq!(json["participantIds"][0], "hero-1");
    }
}
