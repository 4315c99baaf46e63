//! Continuous-jog session controller
//!
//! Turns a "start moving in direction D" signal and a "stop" signal into a
//! bounded-rate stream of [`JogRequest`]s followed by exactly one
//! [`JogStopRequest`].
//!
//! ```text
//! Idle   --start(dir)--> Active   first request sent at once, timer armed
//! Active --tick-->       Active   one request per period
//! Active --stop()-->     Idle     timer disarmed, stop request sent
//! Active --start(dir2)-> implicit stop, then a fresh start
//! Idle   --stop()-->     Idle     no-op
//! ```
//!
//! All state sits behind one mutex, so `start`, `stop`, and a timer tick
//! never interleave. Each `start` bumps a generation counter; a tick only
//! acts while its captured generation is current and the session is active,
//! which covers ticks that were already woken when `stop` ran.
//!
//! Axis, mode, and step are read from the [`JogSettingsProvider`] on every
//! send. The step is re-validated per tick; an invalid step ends the session
//! with a stop request and a [`SessionEvent::Rejected`] event.

use parking_lot::Mutex;
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use super::dispatch::{spawn_dispatcher, Outbox, Outgoing};
use super::traits::{JogSettingsProvider, JogTransport};
use crate::data::{JogDirection, JogRequest, JogStopRequest, StepSize};
use crate::error::ValidationError;
use crate::event_bus::{AppEvent, EventBus, SessionEvent};

/// Repeat period used when none is configured
pub const DEFAULT_REPEAT_INTERVAL: Duration = Duration::from_millis(30);

/// Session status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionStatus {
    /// No session running.
    #[default]
    Idle,
    /// Requests are being sent.
    Active,
}

/// Observable state of the jog session
///
/// `command_count` and `last_sent_at` stay readable after `stop` and are
/// reset by the next `start`.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    /// Idle or active.
    pub status: SessionStatus,
    /// Direction of the active session.
    pub direction: Option<JogDirection>,
    /// When the current (or last) session started.
    pub started_at: Option<Instant>,
    /// Jog requests sent in the current (or last) session.
    pub command_count: u64,
    /// When the last jog request was submitted.
    pub last_sent_at: Option<Instant>,
}

/// Controller configuration
#[derive(Debug, Clone)]
pub struct JogSessionConfig {
    /// Period between repeated jog requests.
    pub repeat_interval: Duration,
}

impl Default for JogSessionConfig {
    fn default() -> Self {
        Self {
            repeat_interval: DEFAULT_REPEAT_INTERVAL,
        }
    }
}

struct SessionInner {
    state: SessionState,
    generation: u64,
    timer: Option<JoinHandle<()>>,
}

struct Shared {
    inner: Mutex<SessionInner>,
    settings: Arc<dyn JogSettingsProvider>,
    outbox: Outbox,
    events: Arc<EventBus>,
    config: JogSessionConfig,
}

/// The continuous-jog session controller
///
/// Construct inside a tokio runtime; the controller spawns its request
/// dispatcher and one repeat timer per session on it.
pub struct JogSessionController {
    shared: Arc<Shared>,
    dispatcher: Mutex<Option<JoinHandle<()>>>,
}

impl JogSessionController {
    /// Create a controller with the default 30 ms repeat interval and its
    /// own event bus
    pub fn new(settings: Arc<dyn JogSettingsProvider>, transport: Arc<dyn JogTransport>) -> Self {
        Self::with_config(
            settings,
            transport,
            JogSessionConfig::default(),
            Arc::new(EventBus::new()),
        )
    }

    /// Create a controller with explicit configuration and event bus
    pub fn with_config(
        settings: Arc<dyn JogSettingsProvider>,
        transport: Arc<dyn JogTransport>,
        config: JogSessionConfig,
        events: Arc<EventBus>,
    ) -> Self {
        let (outbox, dispatcher) = spawn_dispatcher(transport, events.clone());
        Self {
            shared: Arc::new(Shared {
                inner: Mutex::new(SessionInner {
                    state: SessionState::default(),
                    generation: 0,
                    timer: None,
                }),
                settings,
                outbox,
                events,
                config,
            }),
            dispatcher: Mutex::new(Some(dispatcher)),
        }
    }

    /// Begin jogging in `direction`
    ///
    /// Fails without touching the session when the current step is out of
    /// range. An active session is stopped first.
    pub fn start(&self, direction: JogDirection) -> Result<(), ValidationError> {
        let mut pending = Vec::new();
        let result = {
            let mut inner = self.shared.inner.lock();
            self.shared.start_locked(&mut inner, direction, &mut pending)
        };
        self.shared.publish_all(pending);
        result
    }

    /// End the active session; no-op when idle
    pub fn stop(&self) {
        let mut pending = Vec::new();
        {
            let mut inner = self.shared.inner.lock();
            self.shared.stop_locked(&mut inner, &mut pending);
        }
        self.shared.publish_all(pending);
    }

    /// Whether a session is active
    pub fn is_active(&self) -> bool {
        self.shared.inner.lock().state.status == SessionStatus::Active
    }

    /// Direction of the active session, if any
    pub fn active_direction(&self) -> Option<JogDirection> {
        let inner = self.shared.inner.lock();
        match inner.state.status {
            SessionStatus::Active => inner.state.direction,
            SessionStatus::Idle => None,
        }
    }

    /// Copy of the session state
    pub fn snapshot(&self) -> SessionState {
        self.shared.inner.lock().state.clone()
    }

    /// Whether a repeat timer is currently armed
    pub fn has_armed_timer(&self) -> bool {
        self.shared
            .inner
            .lock()
            .timer
            .as_ref()
            .is_some_and(|timer| !timer.is_finished())
    }

    /// Requests submitted but not yet completed by the transport
    pub fn in_flight(&self) -> usize {
        self.shared.outbox.in_flight()
    }

    /// Event bus carrying session and transport events
    pub fn events(&self) -> Arc<EventBus> {
        self.shared.events.clone()
    }

    /// Repeat period in use
    pub fn repeat_interval(&self) -> Duration {
        self.shared.config.repeat_interval
    }

    /// Stop any session and wait until every queued request has completed
    ///
    /// The controller rejects further sends afterwards.
    pub async fn shutdown(&self) {
        self.stop();
        self.shared.outbox.close();
        let dispatcher = self.dispatcher.lock().take();
        if let Some(handle) = dispatcher {
            if let Err(err) = handle.await {
                tracing::warn!("Jog dispatcher ended abnormally: {}", err);
            }
        }
    }
}

impl Drop for JogSessionController {
    fn drop(&mut self) {
        // The dispatcher drains the queue after the outbox is dropped, so
        // this stop still reaches the transport.
        self.stop();
    }
}

impl std::fmt::Debug for JogSessionController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JogSessionController")
            .field("state", &self.snapshot())
            .field("repeat_interval", &self.shared.config.repeat_interval)
            .finish()
    }
}

impl Shared {
    fn jog_request(&self, direction: JogDirection) -> Result<JogRequest, ValidationError> {
        let step = StepSize::new(self.settings.step())?;
        Ok(JogRequest::new(
            self.settings.axis(),
            direction,
            step,
            self.settings.mode(),
        ))
    }

    fn start_locked(
        self: &Arc<Self>,
        inner: &mut SessionInner,
        direction: JogDirection,
        pending: &mut Vec<SessionEvent>,
    ) -> Result<(), ValidationError> {
        let request = match self.jog_request(direction) {
            Ok(request) => request,
            Err(err) => {
                tracing::warn!("Jog start rejected: {}", err);
                pending.push(SessionEvent::Rejected {
                    reason: err.to_string(),
                });
                return Err(err);
            }
        };

        if inner.state.status == SessionStatus::Active {
            self.stop_locked(inner, pending);
        }

        inner.generation += 1;
        inner.state = SessionState {
            status: SessionStatus::Active,
            direction: Some(direction),
            started_at: Some(Instant::now()),
            command_count: 0,
            last_sent_at: None,
        };

        tracing::info!(
            "Jog session {} started: {} {} ({} mode, step {})",
            inner.generation,
            request.axis,
            direction,
            request.mode,
            request.step
        );
        pending.push(SessionEvent::Started {
            direction,
            axis: request.axis.clone(),
            mode: request.mode,
        });
        self.submit_jog(inner, request);

        inner.timer = Some(tokio::spawn(run_repeat_timer(
            Arc::downgrade(self),
            inner.generation,
            self.config.repeat_interval,
        )));

        Ok(())
    }

    fn stop_locked(&self, inner: &mut SessionInner, pending: &mut Vec<SessionEvent>) {
        if inner.state.status == SessionStatus::Idle {
            return;
        }

        if let Some(timer) = inner.timer.take() {
            timer.abort();
        }

        inner.state.status = SessionStatus::Idle;
        inner.state.direction = None;
        let count = inner.state.command_count;
        let duration = inner
            .state
            .started_at
            .map(|started| started.elapsed())
            .unwrap_or_default();

        let request = JogStopRequest::new(self.settings.axis(), self.settings.mode());
        tracing::info!(
            "Jog session {} stopped on {} after {:?}, {} requests",
            inner.generation,
            request.axis,
            duration,
            count
        );
        self.outbox.submit(Outgoing::Stop(request));
        pending.push(SessionEvent::Stopped { duration, count });
    }

    fn submit_jog(&self, inner: &mut SessionInner, request: JogRequest) {
        tracing::debug!(
            "Jog #{}: {} {} {}",
            inner.state.command_count + 1,
            request.axis,
            request.direction,
            request.step
        );
        self.outbox.submit(Outgoing::Jog(request));
        inner.state.command_count += 1;
        inner.state.last_sent_at = Some(Instant::now());
    }

    /// Handle one timer tick; returns false when the timer should end
    fn tick(&self, generation: u64) -> bool {
        let mut pending = Vec::new();
        let keep_running = {
            let mut inner = self.inner.lock();
            if inner.state.status != SessionStatus::Active || inner.generation != generation {
                return false;
            }

            let direction = inner.state.direction.unwrap_or(JogDirection::Positive);
            match self.jog_request(direction) {
                Ok(request) => {
                    self.submit_jog(&mut inner, request);
                    pending.push(SessionEvent::Tick {
                        count: inner.state.command_count,
                    });
                    true
                }
                Err(err) => {
                    tracing::warn!("Jog step became invalid mid-session: {}", err);
                    pending.push(SessionEvent::Rejected {
                        reason: err.to_string(),
                    });
                    self.stop_locked(&mut inner, &mut pending);
                    false
                }
            }
        };
        self.publish_all(pending);
        keep_running
    }

    fn publish_all(&self, pending: Vec<SessionEvent>) {
        for event in pending {
            let _ = self.events.publish(AppEvent::Session(event));
        }
    }
}

async fn run_repeat_timer(shared: Weak<Shared>, generation: u64, period: Duration) {
    let mut interval = tokio::time::interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        interval.tick().await;
        let Some(shared) = shared.upgrade() else {
            break;
        };
        if !shared.tick(generation) {
            break;
        }
    }
}
