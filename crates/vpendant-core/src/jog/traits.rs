//! Collaborator interfaces for the jog session controller

use async_trait::async_trait;

use crate::data::{JogMode, JogRequest, JogResponse, JogStopRequest};
use crate::error::TransportError;

/// Result of a single send through a [`JogTransport`]
pub type TransportResult = Result<JogResponse, TransportError>;

/// Sends jog commands to the pendant backend
///
/// Implementations report failures as `Err`, never by panicking. A
/// response with `success == false` is treated as a failure by the caller.
#[async_trait]
pub trait JogTransport: Send + Sync {
    /// Send one incremental jog move
    async fn send_jog(&self, request: JogRequest) -> TransportResult;

    /// Send a jog stop
    async fn send_jog_stop(&self, request: JogStopRequest) -> TransportResult;
}

/// Current operator selection, read on every send
///
/// Values are never cached by the controller, so a change takes effect on
/// the next tick.
pub trait JogSettingsProvider: Send + Sync {
    /// Selected axis name
    fn axis(&self) -> String;

    /// Selected jog mode
    fn mode(&self) -> JogMode;

    /// Raw step value as entered; may be out of range
    fn step(&self) -> f64;
}
