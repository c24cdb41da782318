//! Priority-ordered queue of pending combat events.

use crate::event::{CombatEvent, EventId};
use crate::participant::ParticipantId;

/// Ordered collection of combat events.
///
/// Ordering is re-established on every insertion: primary key descending
/// priority, secondary key ascending creation time. The sort is stable, so
/// events with equal priority and timestamp keep FIFO order.
#[derive(Debug, Default)]
pub struct CombatQueue {
    events: Vec<CombatEvent>,
}

impl CombatQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enqueue(&mut self, event: CombatEvent) {
        self.events.push(event);
        self.events
            .sort_by(|a, b| match b.priority().cmp(&a.priority()) {
                std::cmp::Ordering::Equal => a.created_at().cmp(&b.created_at()),
                ordering => ordering,
            });
    }

    /// Remove and return the head of the queue.
    pub fn dequeue(&mut self) -> Option<CombatEvent> {
        if self.events.is_empty() {
            None
        } else {
            Some(self.events.remove(0))
        }
    }

    pub fn peek(&self) -> Option<&CombatEvent> {
        self.events.first()
    }

    /// Drain every currently pending event, in queue order.
    ///
    /// Events in other states (a processing event re-inserted by a caller,
    /// for instance) stay put.
    pub fn take_pending(&mut self) -> Vec<CombatEvent> {
        let mut pending = Vec::new();
        let mut index = 0;
        while index < self.events.len() {
            if self.events[index].is_pending() {
                pending.push(self.events.remove(index));
            } else {
                index += 1;
            }
        }
        pending
    }

    /// Pending events that reference the given participant.
    pub fn pending_for(&self, id: &ParticipantId) -> Vec<&CombatEvent> {
        self.events
            .iter()
            .filter(|event| event.is_pending() && event.involves(id))
            .collect()
    }

    /// Drop every event referencing the participant, whatever its status.
    /// Returns the ids of the removed events.
    pub fn remove_all_for(&mut self, id: &ParticipantId) -> Vec<EventId> {
        let mut removed = Vec::new();
        self.events.retain(|event| {
            if event.involves(id) {
                removed.push(event.id());
                false
            } else {
                true
            }
        });
        removed
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventData;
    use chrono::{TimeZone, Utc};

    fn event(priority: i32, participant: &str) -> CombatEvent {
        CombatEvent::new(
            EventData::EndCombat { reason: None },
            priority,
            vec![participant.into()],
        )
        .unwrap()
    }

    #[test]
    fn higher_priority_dequeues_first() {
        let mut queue = CombatQueue::new();
        queue.enqueue(event(0, "a"));
        queue.enqueue(event(10, "b"));
        queue.enqueue(event(-1, "c"));
        queue.enqueue(event(1, "d"));

        let order: Vec<i32> = std::iter::from_fn(|| queue.dequeue())
            .map(|e| e.priority())
            .collect();
        assert_eq!(order, [10, 1, 0, -1]);
    }

    #[test]
    fn equal_priority_preserves_fifo() {
        let stamp = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let mut queue = CombatQueue::new();
        queue.enqueue(event(0, "first").with_created_at(stamp));
        queue.enqueue(event(0, "second").with_created_at(stamp));
        queue.enqueue(event(0, "third").with_created_at(stamp));

        let order: Vec<String> = std::iter::from_fn(|| queue.dequeue())
            .map(|e| e.participants()[0].to_string())
            .collect();
        assert_eq!(order, ["first", "second", "third"]);
    }

    #[test]
    fn earlier_creation_wins_within_priority() {
        let early = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let late = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 5).unwrap();

        let mut queue = CombatQueue::new();
        queue.enqueue(event(0, "late").with_created_at(late));
        queue.enqueue(event(0, "early").with_created_at(early));

        assert_eq!(queue.peek().unwrap().participants()[0].as_str(), "early");
    }

    #[test]
    fn take_pending_drains_in_order_and_skips_non_pending() {
        let mut queue = CombatQueue::new();
        let mut processing = event(5, "busy");
        processing.mark_processing(Utc::now());
        queue.enqueue(processing);
        queue.enqueue(event(1, "a"));
        queue.enqueue(event(3, "b"));

        let pending = queue.take_pending();
        let priorities: Vec<i32> = pending.iter().map(|e| e.priority()).collect();
        assert_eq!(priorities, [3, 1]);

        // The processing event is still queued.
        assert_eq!(queue.len(), 1);
        assert!(!queue.peek().unwrap().is_pending());
    }

    #[test]
    fn pending_for_filters_by_participant_and_status() {
        let mut queue = CombatQueue::new();
        queue.enqueue(event(0, "hero"));
        queue.enqueue(event(0, "villain"));
        let mut done = event(0, "hero");
        done.complete(Utc::now(), serde_json::json!({}));
        queue.enqueue(done);

        assert_eq!(queue.pending_for(&"hero".into()).len(), 1);
        assert_eq!(queue.pending_for(&"villain".into()).len(), 1);
        assert_eq!(queue.pending_for(&"nobody".into()).len(), 0);
    }

    #[test]
    fn remove_all_for_drops_any_status() {
        let mut queue = CombatQueue::new();
        queue.enqueue(event(0, "hero"));
        let mut processing = event(0, "hero");
        processing.mark_processing(Utc::now());
        queue.enqueue(processing);
        queue.enqueue(event(0, "villain"));

        let removed = queue.remove_all_for(&"hero".into());
        assert_eq!(removed.len(), 2);
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.peek().unwrap().participants()[0].as_str(), "villain");
    }
}
