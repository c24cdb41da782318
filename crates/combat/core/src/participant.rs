//! Participant identity and the active-combat membership set.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque identifier for a combat participant.
///
/// The pipeline never interprets the contents; collaborators hand these in
/// (account ids, character names, whatever the outer layers use).
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParticipantId(String);

impl ParticipantId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ParticipantId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl From<String> for ParticipantId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Membership tracker for "currently in combat".
///
/// Membership is the sole gate for combat status: a participant is in
/// active combat exactly while its id is in this set.
#[derive(Clone, Debug, Default)]
pub struct ActiveParticipants {
    members: HashSet<ParticipantId>,
}

impl ActiveParticipants {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a participant; returns true if it was not already active.
    pub fn add(&mut self, id: ParticipantId) -> bool {
        self.members.insert(id)
    }

    /// Remove a participant; returns true if it was active.
    pub fn remove(&mut self, id: &ParticipantId) -> bool {
        self.members.remove(id)
    }

    pub fn contains(&self, id: &ParticipantId) -> bool {
        self.members.contains(id)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &ParticipantId> {
        self.members.iter()
    }
}
