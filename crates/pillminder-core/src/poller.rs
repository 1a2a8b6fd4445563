//! Periodic evaluation driver.
//!
//! One poller per engine. The poller owns a single tokio task handle:
//! `start` is idempotent (a second call while the task is live is a
//! no-op, so a restart cannot register two timers), `stop` aborts the
//! task, and dropping the poller stops it.
//!
//! Matching is minute-granular, so any interval below 60 seconds
//! cannot skip a matching window. A tick whose window passed entirely
//! while the host was suspended is missed; gaps are not compensated.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;

use crate::alarm::AlarmEngine;
use crate::clock::Clock;
use crate::events::Event;
use crate::repository::ScheduleRepository;
use crate::storage::state_store::StateStore;

/// Default seconds between evaluation ticks.
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 15;

pub struct Poller<C, S, R> {
    engine: Arc<Mutex<AlarmEngine<C, S>>>,
    repository: Arc<Mutex<R>>,
    interval: Duration,
    events: UnboundedSender<Event>,
    handle: Option<JoinHandle<()>>,
}

impl<C, S, R> Poller<C, S, R>
where
    C: Clock + Send + 'static,
    S: StateStore + Send + 'static,
    R: ScheduleRepository + Send + 'static,
{
    /// Build a poller and the receiving end of its event stream.
    pub fn new(
        engine: Arc<Mutex<AlarmEngine<C, S>>>,
        repository: Arc<Mutex<R>>,
        interval: Duration,
    ) -> (Self, UnboundedReceiver<Event>) {
        let (events, receiver) = mpsc::unbounded_channel();
        (
            Self {
                engine,
                repository,
                interval,
                events,
                handle: None,
            },
            receiver,
        )
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Start ticking. No-op while a task is already live.
    pub fn start(&mut self) {
        if self.is_running() {
            return;
        }
        let engine = Arc::clone(&self.engine);
        let repository = Arc::clone(&self.repository);
        let events = self.events.clone();
        let period = self.interval;

        self.handle = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                for event in run_tick(&engine, &repository) {
                    if events.send(event).is_err() {
                        // Receiver gone: nobody is listening anymore.
                        return;
                    }
                }
            }
        }));
    }

    /// Stop ticking and clear the task handle.
    pub fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

impl<C, S, R> Drop for Poller<C, S, R> {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

/// One synchronous evaluation pass. A failed repository read degrades
/// that list to empty for this tick; the other list still alarms.
fn run_tick<C, S, R>(
    engine: &Mutex<AlarmEngine<C, S>>,
    repository: &Mutex<R>,
) -> Vec<Event>
where
    C: Clock,
    S: StateStore,
    R: ScheduleRepository,
{
    let (reminders, expiries) = {
        let repository = repository.lock().unwrap_or_else(|e| e.into_inner());
        let reminders = repository.reminders().unwrap_or_else(|e| {
            log::warn!("reminder read failed, skipping reminders this tick: {e}");
            Vec::new()
        });
        let expiries = repository.tracked_expiries().unwrap_or_else(|e| {
            log::warn!("expiry read failed, skipping expiries this tick: {e}");
            Vec::new()
        });
        (reminders, expiries)
    };

    let mut engine = engine.lock().unwrap_or_else(|e| e.into_inner());
    engine.tick(&reminders, &expiries)
}
