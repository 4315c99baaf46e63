//! Continuous jog: session controller, request dispatch, and the
//! collaborator interfaces it depends on.

pub mod dispatch;
pub mod session;
pub mod settings;
pub mod traits;

pub use dispatch::{spawn_dispatcher, Outbox, Outgoing};
pub use session::{
    JogSessionConfig, JogSessionController, SessionState, SessionStatus, DEFAULT_REPEAT_INTERVAL,
};
pub use settings::{JogSelection, LiveJogSettings};
pub use traits::{JogSettingsProvider, JogTransport, TransportResult};
