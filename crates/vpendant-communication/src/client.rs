//! HTTP client for the pendant API
//!
//! Endpoints (JSON over HTTP):
//! - `POST /api/jog` jog move or stop
//! - `POST /api/jog/mode` change the controller's jog mode
//! - `POST /api/jog/axis` select the active axis by number
//! - `GET /api/jog/state` read joint, Cartesian, and status data

use reqwest::{StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

use vpendant_core::{JogMode, JogRequest, JogResponse, JogStopRequest, RobotState, TransportError};

/// Backend address used when none is configured
pub const DEFAULT_BASE_URL: &str = "http://localhost:8082";

/// Per-request timeout used when none is configured
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Longest error body kept in [`TransportError::HttpStatus`]
const MAX_ERROR_BODY: usize = 256;

const JOG_PATH: &str = "/api/jog";
const MODE_PATH: &str = "/api/jog/mode";
const AXIS_PATH: &str = "/api/jog/axis";
const STATE_PATH: &str = "/api/jog/state";

#[derive(Serialize)]
struct ModeBody {
    mode: JogMode,
}

#[derive(Serialize)]
struct AxisBody {
    axis: u8,
    robot: u32,
}

/// Client for one pendant backend
///
/// Cloning is cheap; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct PendantClient {
    http: reqwest::Client,
    base_url: String,
}

impl PendantClient {
    /// Create a client with the default timeout
    pub fn new(base_url: &str) -> Result<Self, TransportError> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    /// Create a client whose requests give up after `timeout`
    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self, TransportError> {
        let parsed = Url::parse(base_url).map_err(|_| TransportError::InvalidUrl {
            url: base_url.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(TransportError::InvalidUrl {
                url: base_url.to_string(),
            });
        }

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::Network {
                reason: e.to_string(),
            })?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Base URL without a trailing slash
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Send one jog move
    pub async fn send_jog(&self, request: &JogRequest) -> Result<JogResponse, TransportError> {
        self.post_command(JOG_PATH, request).await
    }

    /// Send a jog stop for the request's axis
    pub async fn send_jog_stop(
        &self,
        request: &JogStopRequest,
    ) -> Result<JogResponse, TransportError> {
        self.post_command(JOG_PATH, &request.wire_body()).await
    }

    /// Switch the controller's jog mode
    pub async fn set_mode(&self, mode: JogMode) -> Result<JogResponse, TransportError> {
        tracing::info!("Setting jog mode to {}", mode);
        self.post_command(MODE_PATH, &ModeBody { mode }).await
    }

    /// Select the active axis by its 1-based number on `robot`
    pub async fn select_axis(&self, axis: u8, robot: u32) -> Result<JogResponse, TransportError> {
        tracing::info!("Selecting axis {} on robot {}", axis, robot);
        self.post_command(AXIS_PATH, &AxisBody { axis, robot }).await
    }

    /// Post the mode and then the axis, so the backend follows an axis
    /// reset caused by the mode change
    pub async fn sync_selection(
        &self,
        mode: JogMode,
        axis: u8,
        robot: u32,
    ) -> Result<(), TransportError> {
        self.set_mode(mode).await?;
        self.select_axis(axis, robot).await?;
        Ok(())
    }

    /// Read the robot's current state
    pub async fn fetch_state(&self) -> Result<RobotState, TransportError> {
        let response = self
            .http
            .get(self.endpoint(STATE_PATH))
            .send()
            .await
            .map_err(request_error)?;
        decode(response).await
    }

    async fn post_command<B>(&self, path: &str, body: &B) -> Result<JogResponse, TransportError>
    where
        B: Serialize + ?Sized,
    {
        let response = self
            .http
            .post(self.endpoint(path))
            .json(body)
            .send()
            .await
            .map_err(request_error)?;

        let reply: JogResponse = decode(response).await?;
        if !reply.success {
            return Err(TransportError::Rejected {
                message: reply.message,
            });
        }
        Ok(reply)
    }
}

fn request_error(err: reqwest::Error) -> TransportError {
    if err.is_builder() {
        return TransportError::InvalidUrl {
            url: err
                .url()
                .map(|url| url.to_string())
                .unwrap_or_default(),
        };
    }
    TransportError::Network {
        reason: err.to_string(),
    }
}

async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, TransportError> {
    let status = response.status();
    if !status.is_success() {
        return Err(status_error(status, response).await);
    }

    let bytes = response.bytes().await.map_err(request_error)?;
    serde_json::from_slice(&bytes).map_err(|e| TransportError::Decode {
        reason: e.to_string(),
    })
}

async fn status_error(status: StatusCode, response: reqwest::Response) -> TransportError {
    let mut body = response.text().await.unwrap_or_default();
    if body.len() > MAX_ERROR_BODY {
        let mut cut = MAX_ERROR_BODY;
        while !body.is_char_boundary(cut) {
            cut -= 1;
        }
        body.truncate(cut);
    }
    TransportError::HttpStatus {
        status: status.as_u16(),
        body: body.trim().to_string(),
    }
}
