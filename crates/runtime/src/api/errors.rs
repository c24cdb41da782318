//! Unified error types surfaced by the runtime API.
//!
//! Wraps admission-time validation failures from the domain crate and the
//! scheduler's own coordination failures so clients can bubble them up with
//! consistent context.

use thiserror::Error;

use combat_core::{AttackError, EffectError, EventError, ParticipantId};

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("participant {id} is not in active combat")]
    ParticipantNotInCombat { id: ParticipantId },

    #[error(transparent)]
    InvalidAttack(#[from] AttackError),

    #[error(transparent)]
    InvalidEffect(#[from] EffectError),

    #[error(transparent)]
    InvalidEvent(#[from] EventError),

    #[error("combat state lock poisoned")]
    StatePoisoned,

    #[error("scheduler task join failed")]
    WorkerJoin(#[source] tokio::task::JoinError),
}
