//! The [`EventBus`] shared by the jog controller, the request dispatcher,
//! the state poller, and whatever displays their output.

use parking_lot::RwLock;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::broadcast;
use uuid::Uuid;

use super::events::{AppEvent, EventCategory};

/// Handle returned by [`EventBus::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(Uuid);

impl SubscriptionId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Sub({})", &self.0.simple().to_string()[..8])
    }
}

/// Which events a handler wants
#[derive(Debug, Clone, Default)]
pub enum EventFilter {
    /// Everything.
    #[default]
    All,
    /// Only events in one of these categories.
    Categories(Vec<EventCategory>),
}

impl EventFilter {
    pub fn matches(&self, event: &AppEvent) -> bool {
        match self {
            EventFilter::All => true,
            EventFilter::Categories(wanted) => wanted.contains(&event.category()),
        }
    }
}

type EventHandler = Arc<dyn Fn(AppEvent) + Send + Sync>;

/// Event bus tuning
#[derive(Debug, Clone)]
pub struct EventBusConfig {
    /// Broadcast buffer; slow receivers lag past this many events.
    pub channel_capacity: usize,
    /// Record published events for [`EventBus::history`].
    pub enable_history: bool,
    /// Oldest entries are dropped beyond this count.
    pub max_history_size: usize,
    /// Entries older than this are dropped on the next publish.
    pub history_retention: Duration,
}

impl Default for EventBusConfig {
    fn default() -> Self {
        Self {
            channel_capacity: 1024,
            enable_history: false,
            max_history_size: 1000,
            history_retention: Duration::from_secs(300),
        }
    }
}

/// Bounded, time-limited record of published events
#[derive(Debug, Default)]
struct EventHistory {
    entries: VecDeque<(Instant, AppEvent)>,
}

impl EventHistory {
    fn record(&mut self, event: &AppEvent, max_len: usize, retention: Duration) {
        let now = Instant::now();
        self.entries.push_back((now, event.clone()));

        while let Some((at, _)) = self.entries.front() {
            if now.duration_since(*at) <= retention && self.entries.len() <= max_len {
                break;
            }
            self.entries.pop_front();
        }
    }

    fn since(&self, since: Option<Instant>) -> Vec<AppEvent> {
        self.entries
            .iter()
            .filter(|(at, _)| since.map_or(true, |since| *at >= since))
            .map(|(_, event)| event.clone())
            .collect()
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum EventBusError {
    /// Nothing was listening when the event was published
    #[error("No active subscribers")]
    NoSubscribers,
}

/// Publish/subscribe hub for pendant events
///
/// Synchronous handlers run on the publishing thread. Async consumers can
/// take a broadcast [`receiver`](EventBus::receiver) instead.
pub struct EventBus {
    sender: broadcast::Sender<AppEvent>,
    handlers: RwLock<HashMap<SubscriptionId, (EventFilter, EventHandler)>>,
    history: RwLock<EventHistory>,
    config: EventBusConfig,
}

impl EventBus {
    pub fn new() -> Self {
        Self::with_config(EventBusConfig::default())
    }

    pub fn with_config(config: EventBusConfig) -> Self {
        let (sender, _) = broadcast::channel(config.channel_capacity);
        Self {
            sender,
            handlers: RwLock::new(HashMap::new()),
            history: RwLock::new(EventHistory::default()),
            config,
        }
    }

    /// Deliver `event` to matching handlers and to broadcast receivers
    ///
    /// Returns the number of broadcast receivers that got the event, or
    /// `NoSubscribers` when neither handlers nor receivers exist.
    pub fn publish(&self, event: AppEvent) -> Result<usize, EventBusError> {
        tracing::trace!("Publishing {}", event.description());

        if self.config.enable_history {
            self.history.write().record(
                &event,
                self.config.max_history_size,
                self.config.history_retention,
            );
        }

        // Handlers are cloned out so one may subscribe or publish re-entrantly.
        let matching: Vec<EventHandler> = self
            .handlers
            .read()
            .values()
            .filter(|(filter, _)| filter.matches(&event))
            .map(|(_, handler)| handler.clone())
            .collect();
        let handled = !matching.is_empty();
        for handler in matching {
            handler(event.clone());
        }

        match self.sender.send(event) {
            Ok(receivers) => Ok(receivers),
            Err(_) if handled || self.subscriber_count() > 0 => Ok(0),
            Err(_) => Err(EventBusError::NoSubscribers),
        }
    }

    /// Register a handler for events passing `filter`
    ///
    /// Handlers run on the publishing thread, often a timer or dispatcher
    /// task, so they must not block.
    pub fn subscribe<F>(&self, filter: EventFilter, handler: F) -> SubscriptionId
    where
        F: Fn(AppEvent) + Send + Sync + 'static,
    {
        let id = SubscriptionId::new();
        self.handlers.write().insert(id, (filter, Arc::new(handler)));
        tracing::debug!("Subscription {} added", id);
        id
    }

    /// Broadcast receiver seeing every event published from now on
    pub fn receiver(&self) -> broadcast::Receiver<AppEvent> {
        self.sender.subscribe()
    }

    /// Remove a handler; false if it was already gone
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let removed = self.handlers.write().remove(&id).is_some();
        if removed {
            tracing::debug!("Subscription {} removed", id);
        }
        removed
    }

    /// Number of registered handlers (broadcast receivers not included)
    pub fn subscriber_count(&self) -> usize {
        self.handlers.read().len()
    }

    /// Recorded events at or after `since`, or all of them
    ///
    /// Always empty unless history is enabled in the config.
    pub fn history(&self, since: Option<Instant>) -> Vec<AppEvent> {
        if !self.config.enable_history {
            return Vec::new();
        }
        self.history.read().since(since)
    }

    pub fn clear_history(&self) {
        self.history.write().entries.clear();
    }

    pub fn config(&self) -> &EventBusConfig {
        &self.config
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("handlers", &self.subscriber_count())
            .field("receivers", &self.sender.receiver_count())
            .finish()
    }
}
