//! # Event Bus Module
//!
//! Decoupled publish/subscribe for pendant events.
//!
//! The jog controller, the request dispatcher, and the state poller publish
//! typed events; a display layer or a test subscribes to the categories it
//! cares about. Nothing in the pendant depends on a subscriber being present.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use vpendant_core::event_bus::{AppEvent, EventBus, EventCategory, EventFilter, SessionEvent};
//!
//! let bus = EventBus::new();
//! let subscription = bus.subscribe(
//!     EventFilter::Categories(vec![EventCategory::Session]),
//!     |event| {
//!         if let AppEvent::Session(SessionEvent::Stopped { count, .. }) = event {
//!             println!("session sent {} requests", count);
//!         }
//!     },
//! );
//!
//! bus.unsubscribe(subscription);
//! ```

mod bus;
mod events;

pub use bus::*;
pub use events::*;
