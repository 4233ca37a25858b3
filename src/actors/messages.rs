//! Message types for actor communication

use tokio::sync::oneshot;

use crate::pipeline::CycleSummary;

/// Commands that can be sent to the MonitorActor
#[derive(Debug)]
pub enum MonitorCommand {
    /// Trigger an immediate evaluation cycle (bypassing the interval timer)
    ///
    /// Used for testing and manual refresh. Responds with the cycle summary,
    /// or `None` if the cycle failed at the store.
    RunNow {
        respond_to: oneshot::Sender<Option<CycleSummary>>,
    },

    /// Update the evaluation interval
    ///
    /// Takes effect after the current tick.
    UpdateInterval { interval_secs: u64 },

    /// Gracefully shut down the monitor
    Shutdown,
}

/// Commands that can be sent to the MessageBusActor
#[derive(Debug)]
pub enum BusCommand {
    /// Publish a message, fire-and-forget
    ///
    /// Dropped with a log line when the connection is down; never queued.
    Publish { topic: String, payload: String },

    /// Gracefully shut down the bus client
    Shutdown,
}

/// Lifecycle state of the broker connection
///
/// `Connected → Disconnected` on any network drop, then automatically back
/// to `Connecting`. There is no terminal state; the client never gives up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
}

impl std::fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConnectionState::Disconnected => write!(f, "disconnected"),
            ConnectionState::Connecting => write!(f, "connecting"),
            ConnectionState::Connected => write!(f, "connected"),
        }
    }
}
