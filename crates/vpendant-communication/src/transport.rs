//! [`JogTransport`] over the pendant HTTP API

use async_trait::async_trait;
use std::time::Duration;

use crate::client::PendantClient;
use vpendant_core::{JogRequest, JogStopRequest, JogTransport, TransportError, TransportResult};

/// Sends jog moves and stops as `POST /api/jog`
#[derive(Debug, Clone)]
pub struct HttpJogTransport {
    client: PendantClient,
}

impl HttpJogTransport {
    /// Create a transport for `base_url` with the given per-request timeout
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, TransportError> {
        Ok(Self {
            client: PendantClient::with_timeout(base_url, timeout)?,
        })
    }

    /// Wrap an existing client, sharing its connection pool
    pub fn from_client(client: PendantClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &PendantClient {
        &self.client
    }
}

#[async_trait]
impl JogTransport for HttpJogTransport {
    async fn send_jog(&self, request: JogRequest) -> TransportResult {
        self.client.send_jog(&request).await
    }

    async fn send_jog_stop(&self, request: JogStopRequest) -> TransportResult {
        self.client.send_jog_stop(&request).await
    }
}
