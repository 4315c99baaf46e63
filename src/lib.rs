//! # vpendant
//!
//! A virtual teach pendant for jogging SCARA robot arms through an HTTP
//! pendant API.
//!
//! ## Architecture
//!
//! vpendant is organized as a workspace with multiple crates:
//!
//! 1. **vpendant-core** - Jog data model, session controller, events, input mapping
//! 2. **vpendant-communication** - HTTP transport, pendant client, state poller
//! 3. **vpendant-settings** - Configuration files and validation
//! 4. **vpendant** - Logging setup, terminal console, and the main binary
//!
//! ## Continuous jog
//!
//! Holding a jog input starts a session that sends one jog request
//! immediately and one per repeat interval (30 ms by default) until the
//! input is released, then sends exactly one stop request.

pub mod console;

pub use vpendant_core::{data, event_bus, input, jog, kinematics};

pub use vpendant_core::{
    AppEvent, Error, EventBus, EventCategory, EventFilter, JogDirection, JogMode, JogRequest,
    JogSessionConfig, JogSessionController, JogSettingsProvider, JogStopRequest, JogTransport,
    LiveJogSettings, Result, RobotState, SessionEvent, SessionState, SessionStatus, StepSize,
    TransportError, ValidationError,
};

pub use vpendant_communication::{HttpJogTransport, PendantClient, StatePoller};

pub use vpendant_settings::{Config, SettingsError};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (set at compile time)
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum LogFormat {
    /// Single-line human readable output.
    #[default]
    Compact,
    /// Multi-line output with source locations.
    Pretty,
    /// One JSON object per line.
    Json,
}

/// Initialize logging with the default configuration
///
/// Compact output on stderr, filtered by `RUST_LOG` (INFO when unset).
pub fn init_logging() -> anyhow::Result<()> {
    init_logging_with(LogFormat::default())
}

/// Initialize logging with the given output format
///
/// Logs go to stderr so they do not interleave with console output.
pub fn init_logging_with(format: LogFormat) -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(env_filter);
    let result = match format {
        LogFormat::Compact => registry
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(false)
                    .compact(),
            )
            .try_init(),
        LogFormat::Pretty => registry
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_thread_names(true)
                    .with_line_number(true)
                    .pretty(),
            )
            .try_init(),
        LogFormat::Json => registry
            .with(fmt::layer().with_writer(std::io::stderr).json())
            .try_init(),
    };

    result.map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))
}
