//! Per-connection session for a `Join` stream
//!
//! ```text
//! Join RPC ──> BroadcastServer::join ──> SessionHandler::run ──> BroadcastServer::leave
//!                                          │
//!                      waits on: sink closed | superseded | shutdown
//! ```
//!
//! The session owns the [`Subscription`]. Dropping it after `leave` releases
//! the last sender clone held outside the registry, which ends the client's
//! response stream.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::debug;

use crate::BroadcastServer;
use crate::LeaveReason;
use crate::Subscription;

pub struct SessionHandler {
    server: Arc<BroadcastServer>,
    subscription: Subscription,
    shutdown_signal: watch::Receiver<()>,
}

impl SessionHandler {
    pub fn new(
        server: Arc<BroadcastServer>,
        subscription: Subscription,
        shutdown_signal: watch::Receiver<()>,
    ) -> Self {
        Self {
            server,
            subscription,
            shutdown_signal,
        }
    }

    /// Blocks until the connection ends, then runs leave exactly once.
    pub async fn run(mut self) -> LeaveReason {
        let sink = self.subscription.subscriber.sink.clone();
        let superseded = self.subscription.subscriber.superseded.clone();

        debug!(
            identity = %self.subscription.identity,
            subscriber_id = self.subscription.id(),
            "Session started"
        );

        let reason = tokio::select! {
            _ = sink.closed() => LeaveReason::Disconnected,
            _ = superseded.cancelled() => LeaveReason::Superseded,
            _ = self.shutdown_signal.changed() => LeaveReason::Shutdown,
        };
        drop(sink);

        self.server.leave(&self.subscription, reason);
        reason
    }
}
