//! The combat event processor: a fixed-interval scheduler that drains the
//! event queue.
//!
//! One spawned task owns the tick. Each tick advances the periodic-effect
//! schedule, snapshots every pending event under the shared lock, then
//! resolves the batch outside the lock so admissions stay unblocked. A tick
//! that fires while the previous one is still running is dropped outright,
//! not deferred ([`MissedTickBehavior::Skip`]); under sustained overload
//! pending events can therefore wait several periods before a tick gets to
//! them.
//!
//! Failures are isolated per event: a dispatch error fails that event with
//! the captured error as its result and the batch continues.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde_json::{Value, json};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tracing::{debug, error, info, warn};

use combat_core::{Attack, CombatEvent, EventData};

use crate::api::errors::{Result, RuntimeError};
use crate::api::handle::{CombatHandle, PRIORITY_EFFECT};
use crate::events::{CombatNotice, EventBus};
use crate::state::{CombatState, ScheduledEffect, SharedCombat, interval_ticks};

/// Scheduler configuration.
#[derive(Debug, Clone)]
pub struct ProcessorConfig {
    /// Fixed delay between ticks.
    pub tick_interval: Duration,
    /// Broadcast buffer per notice subscriber.
    pub bus_capacity: usize,
    /// Seed for the roll source; `None` seeds from entropy.
    pub rng_seed: Option<u64>,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_millis(2000),
            bus_capacity: 100,
            rng_seed: None,
        }
    }
}

/// Owns the tick task and its shutdown channel.
///
/// Built via [`EventProcessor::builder`]; clients interact through the
/// [`CombatHandle`] it hands out.
pub struct EventProcessor {
    handle: CombatHandle,
    shutdown_tx: watch::Sender<bool>,
    worker: JoinHandle<()>,
}

impl EventProcessor {
    pub fn builder() -> ProcessorBuilder {
        ProcessorBuilder::new()
    }

    /// Cloneable handle for admissions, status queries, and subscriptions.
    pub fn handle(&self) -> CombatHandle {
        self.handle.clone()
    }

    /// Stop the tick loop and join the task.
    pub async fn shutdown(self) -> Result<()> {
        let _ = self.shutdown_tx.send(true);
        self.worker.await.map_err(RuntimeError::WorkerJoin)
    }
}

/// Builder for [`EventProcessor`].
pub struct ProcessorBuilder {
    config: ProcessorConfig,
}

impl ProcessorBuilder {
    fn new() -> Self {
        Self {
            config: ProcessorConfig::default(),
        }
    }

    pub fn tick_interval(mut self, interval: Duration) -> Self {
        self.config.tick_interval = interval;
        self
    }

    pub fn bus_capacity(mut self, capacity: usize) -> Self {
        self.config.bus_capacity = capacity;
        self
    }

    pub fn rng_seed(mut self, seed: u64) -> Self {
        self.config.rng_seed = Some(seed);
        self
    }

    /// Spawn the tick task. Must be called inside a tokio runtime.
    pub fn spawn(self) -> EventProcessor {
        let shared = SharedCombat::new();
        let bus = EventBus::with_capacity(self.config.bus_capacity);
        let handle = CombatHandle::new(Arc::clone(&shared), bus.clone());

        let rng = match self.config.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let worker = tokio::spawn(tick_loop(
            shared,
            bus,
            self.config.tick_interval,
            rng,
            shutdown_rx,
        ));

        EventProcessor {
            handle,
            shutdown_tx,
            worker,
        }
    }
}

async fn tick_loop(
    shared: Arc<SharedCombat>,
    bus: EventBus,
    period: Duration,
    mut rng: StdRng,
    mut shutdown: watch::Receiver<bool>,
) {
    // First tick fires one full period after start, like every later one.
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    info!(
        period_ms = period.as_millis() as u64,
        "combat event processor started"
    );

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if let Err(err) = run_tick(&shared, &bus, &mut rng) {
                    error!(%err, "tick aborted");
                }
            }
            _ = shutdown.changed() => {
                info!("combat event processor stopped");
                break;
            }
        }
    }
}

/// One tick: advance the effect schedule, snapshot pending events under the
/// lock, resolve them outside it.
fn run_tick(shared: &SharedCombat, bus: &EventBus, rng: &mut StdRng) -> Result<()> {
    let batch = {
        let mut state = shared.lock()?;
        advance_effect_schedule(&mut state);
        state.queue.take_pending()
    };

    if batch.is_empty() {
        return Ok(());
    }
    debug!(events = batch.len(), "tick draining queue");

    for mut event in batch {
        event.mark_processing(Utc::now());
        match dispatch(shared, rng, &event) {
            Ok(result) => {
                event.complete(Utc::now(), result);
                debug!(event = %event.id(), kind = %event.kind(), "combat event completed");
                bus.publish(CombatNotice::Completed(event.record()));
            }
            Err(err) => {
                event.fail(Utc::now(), err.to_string());
                warn!(event = %event.id(), kind = %event.kind(), %err, "combat event failed");
                bus.publish(CombatNotice::Failed(event.record()));
            }
        }
    }

    Ok(())
}

/// Count every scheduled effect down one tick; emit a pulse event at zero
/// and a removal event once the final pulse has fired.
fn advance_effect_schedule(state: &mut CombatState) {
    let mut due = Vec::new();
    for entry in &mut state.effect_schedule {
        entry.ticks_until_pulse -= 1;
        if entry.ticks_until_pulse == 0 {
            due.push(entry.effect.clone());
            entry.remaining_pulses -= 1;
            entry.ticks_until_pulse = interval_ticks(&entry.effect);
        }
    }

    let mut expired = Vec::new();
    state.effect_schedule.retain(|entry| {
        if entry.remaining_pulses == 0 {
            expired.push(entry.effect.clone());
            false
        } else {
            true
        }
    });

    for effect in due {
        enqueue_followup(state, EventData::ProcessEffect(effect));
    }
    for effect in expired {
        enqueue_followup(state, EventData::RemoveEffect(effect));
    }
}

fn enqueue_followup(state: &mut CombatState, data: EventData) {
    let (source, target) = match &data {
        EventData::ProcessEffect(effect) | EventData::RemoveEffect(effect) => {
            (effect.source_id.clone(), effect.target_id.clone())
        }
        _ => return,
    };
    match CombatEvent::new(data, PRIORITY_EFFECT, vec![source, target]) {
        Ok(event) => state.queue.enqueue(event),
        Err(err) => error!(%err, "failed to build effect follow-up"),
    }
}

/// Type-specific resolution for one event. Errors propagate to the tick
/// loop, which fails the event and moves on.
fn dispatch(shared: &SharedCombat, rng: &mut StdRng, event: &CombatEvent) -> Result<Value> {
    match event.data() {
        EventData::Attack(spec) => {
            let mut attack = Attack::new(spec.clone())?;
            let result = attack.resolve(
                spec.dodge_chance,
                spec.block_chance,
                spec.resistance,
                rng,
            );
            Ok(json!({ "attack": spec, "result": result }))
        }
        EventData::ApplyEffect(effect) => {
            if effect.is_periodic() {
                shared
                    .lock()?
                    .effect_schedule
                    .push(ScheduledEffect::new(effect.clone()));
            }
            Ok(json!({ "effect": effect, "applied": true }))
        }
        EventData::ProcessEffect(effect) => {
            if effect.is_damaging() {
                Ok(json!({ "damage": effect.value }))
            } else if effect.is_healing() {
                Ok(json!({ "healing": effect.value }))
            } else {
                Ok(json!({ "applied": true }))
            }
        }
        EventData::RemoveEffect(effect) => Ok(json!({ "effect": effect, "removed": true })),
        EventData::EndCombat { reason } => {
            let mut state = shared.lock()?;
            for id in event.participants() {
                let removed = state.queue.remove_all_for(id);
                if !removed.is_empty() {
                    debug!(participant = %id, events = removed.len(), "purged queued events");
                }
                state.effect_schedule.retain(|entry| !entry.involves(id));
                state.active.remove(id);
            }
            Ok(json!({
                "participantIds": event.participants(),
                "ended": true,
                "reason": reason,
            }))
        }
    }
}
