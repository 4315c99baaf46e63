//! # vpendant Communication
//!
//! HTTP access to the pendant backend: the jog transport used by the
//! session controller, a client for mode, axis, and state endpoints, and a
//! background robot state poller.

pub mod client;
pub mod poller;
pub mod transport;

pub use client::{PendantClient, DEFAULT_BASE_URL, DEFAULT_TIMEOUT};
pub use poller::{StatePoller, DEFAULT_POLL_INTERVAL};
pub use transport::HttpJogTransport;
