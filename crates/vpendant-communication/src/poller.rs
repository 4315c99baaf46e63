//! Periodic robot state polling
//!
//! Reads `/api/jog/state` on a fixed interval and publishes
//! [`RobotEvent::StateChanged`] when the report differs from the last one.
//! Failed polls publish [`RobotEvent::PollFailed`] and polling carries on.

use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::client::PendantClient;
use vpendant_core::{AppEvent, EventBus, RobotEvent, RobotState, TransportError};

/// Poll interval used when none is configured (8 Hz)
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(125);

/// Publishes robot state changes from a background task
pub struct StatePoller {
    client: PendantClient,
    events: Arc<EventBus>,
    interval: Duration,
    last: Arc<Mutex<Option<RobotState>>>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl StatePoller {
    pub fn new(client: PendantClient, events: Arc<EventBus>) -> Self {
        Self::with_interval(client, events, DEFAULT_POLL_INTERVAL)
    }

    pub fn with_interval(client: PendantClient, events: Arc<EventBus>, interval: Duration) -> Self {
        Self {
            client,
            events,
            interval,
            last: Arc::new(Mutex::new(None)),
            task: Mutex::new(None),
        }
    }

    /// Start polling; returns false when already running
    ///
    /// Must be called from within a tokio runtime. The first poll happens
    /// immediately.
    pub fn start(&self) -> bool {
        let mut task = self.task.lock();
        if task.as_ref().is_some_and(|t| !t.is_finished()) {
            return false;
        }

        let client = self.client.clone();
        let events = self.events.clone();
        let last = self.last.clone();
        let period = self.interval;

        tracing::info!("Polling robot state every {:?}", period);
        *task = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                let _ = poll(&client, &events, &last).await;
            }
        }));
        true
    }

    /// Stop polling; the last state stays available
    pub fn stop(&self) {
        if let Some(task) = self.task.lock().take() {
            task.abort();
            tracing::info!("Robot state polling stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.task
            .lock()
            .as_ref()
            .is_some_and(|t| !t.is_finished())
    }

    /// Most recent successful report
    pub fn last_state(&self) -> Option<RobotState> {
        self.last.lock().clone()
    }

    /// Poll once outside the background loop, publishing as the loop would
    pub async fn poll_once(&self) -> Result<RobotState, TransportError> {
        poll(&self.client, &self.events, &self.last).await
    }
}

impl Drop for StatePoller {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn poll(
    client: &PendantClient,
    events: &EventBus,
    last: &Mutex<Option<RobotState>>,
) -> Result<RobotState, TransportError> {
    match client.fetch_state().await {
        Ok(state) => {
            let changed = {
                let mut last = last.lock();
                let changed = last
                    .as_ref()
                    .map_or(true, |previous| previous.has_changed(&state));
                *last = Some(state.clone());
                changed
            };
            if changed {
                tracing::debug!("Robot state changed");
                let _ = events.publish(AppEvent::Robot(RobotEvent::StateChanged(state.clone())));
            }
            Ok(state)
        }
        Err(err) => {
            tracing::warn!("Robot state poll failed: {}", err);
            let _ = events.publish(AppEvent::Robot(RobotEvent::PollFailed {
                error: err.to_string(),
            }));
            Err(err)
        }
    }
}
