//! Broadcast server: the join / publish / leave protocol
//!
//! Owns the process-wide Lamport clock and the subscriber registry. The
//! clock mutex is the single serialization point of the protocol: every
//! registry mutation and every fan-out happens while it is held, so
//! subscribers observe messages in clock order and no broadcast ever sees a
//! half-applied join or leave. Fan-out only uses `try_send`, so the lock is
//! never held across an await point.
//!
//! # Connection lifecycle
//!
//! ```text
//! CONNECTING ──join()──> JOINED ──publish()*──> LEAVING ──leave()──> CLOSED
//! ```

use parking_lot::Mutex;
use tracing::info;
use tracing::warn;

use super::BroadcastOutcome;
use super::ClockValue;
use super::LamportClock;
use super::MessageSink;
use super::Subscriber;
use super::SubscriberRegistry;
use crate::constants::departure_notice;
use crate::constants::welcome_notice;
use crate::metrics;
use crate::proto::ChatMessage;
use crate::Error;
use crate::Result;

/// Why a joined connection is being torn down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeaveReason {
    /// Client went away (normal exit, network failure, transport error)
    Disconnected,
    /// A later `Join` took the identity over. The earlier stream is closed
    /// without a departure notice instead of lingering beside its successor.
    Superseded,
    /// The server is stopping
    Shutdown,
}

/// Ticket returned by [`BroadcastServer::join`], consumed by `leave`.
#[derive(Debug, Clone)]
pub struct Subscription {
    pub identity: String,
    pub subscriber: Subscriber,
}

impl Subscription {
    pub fn id(&self) -> u64 {
        self.subscriber.id
    }
}

#[derive(Debug)]
pub struct BroadcastServer {
    clock: Mutex<LamportClock>,
    registry: SubscriberRegistry,
}

impl Default for BroadcastServer {
    fn default() -> Self {
        Self::new(LamportClock::default())
    }
}

impl BroadcastServer {
    pub fn new(clock: LamportClock) -> Self {
        Self {
            clock: Mutex::new(clock),
            registry: SubscriberRegistry::new(),
        }
    }

    /// Registers `sink` for `identity` and greets everyone, the newcomer
    /// included, with a welcome notice stamped with the current clock.
    ///
    /// A duplicate identity replaces the earlier sink; the displaced
    /// connection is told to close through its `superseded` token.
    ///
    /// An empty or whitespace-only identity is rejected with
    /// [`Error::InvalidRequest`] (`InvalidArgument` over gRPC) and nothing is
    /// registered.
    pub fn join(
        &self,
        identity: &str,
        sink: MessageSink,
    ) -> Result<Subscription> {
        if identity.trim().is_empty() {
            return Err(Error::InvalidRequest("identity must not be empty".into()));
        }

        let clock = self.clock.lock();

        let (subscriber, replaced) = self.registry.add(identity, sink);
        if let Some(previous) = replaced {
            warn!(
                identity = %identity,
                previous_id = previous.id,
                subscriber_id = subscriber.id,
                "Identity already joined, superseding earlier connection"
            );
            previous.superseded.cancel();
        }
        metrics::ACTIVE_SUBSCRIBERS.set(self.registry.len() as i64);

        let welcome = ChatMessage::system(welcome_notice(identity), clock.current());
        let outcome = self.registry.broadcast(&welcome);
        record_broadcast("welcome", &outcome);

        info!(
            identity = %identity,
            subscriber_id = subscriber.id,
            clock = clock.current(),
            subscribers = self.registry.len(),
            "Client joined"
        );

        Ok(Subscription {
            identity: identity.to_string(),
            subscriber,
        })
    }

    /// Stamps `message` with the server clock and fans it out to every
    /// subscriber, the publisher included.
    ///
    /// A clock that is not strictly ahead of the server is corrected to
    /// `server + 1`; a clock ahead of the server becomes the new server
    /// clock. Returns the message as delivered.
    pub fn publish(
        &self,
        mut message: ChatMessage,
    ) -> ChatMessage {
        let mut clock = self.clock.lock();

        let requested = message.lamport_clock;
        message.lamport_clock = clock.observe(requested);
        metrics::SERVER_CLOCK.set(message.lamport_clock);

        let outcome = self.registry.broadcast(&message);
        record_broadcast("publish", &outcome);

        info!(
            sender = %message.sender,
            requested_clock = requested,
            clock = message.lamport_clock,
            delivered = outcome.delivered,
            failed = outcome.failed(),
            "Message published"
        );

        message
    }

    /// Tears down a joined connection.
    ///
    /// The entry is only removed while it still belongs to `subscription`.
    /// Every reason except [`LeaveReason::Superseded`] announces the
    /// departure to the remaining subscribers.
    pub fn leave(
        &self,
        subscription: &Subscription,
        reason: LeaveReason,
    ) {
        let clock = self.clock.lock();

        let removed = self.registry.remove_if_current(&subscription.identity, subscription.id());
        metrics::ACTIVE_SUBSCRIBERS.set(self.registry.len() as i64);

        info!(
            identity = %subscription.identity,
            subscriber_id = subscription.id(),
            ?reason,
            removed,
            "Client disconnected"
        );

        if reason == LeaveReason::Superseded {
            return;
        }

        let notice = ChatMessage::system(departure_notice(&subscription.identity), clock.current());
        let outcome = self.registry.broadcast(&notice);
        record_broadcast("leave", &outcome);
    }

    pub fn current_clock(&self) -> ClockValue {
        self.clock.lock().current()
    }

    pub fn subscriber_count(&self) -> usize {
        self.registry.len()
    }

    pub fn is_joined(
        &self,
        identity: &str,
    ) -> bool {
        self.registry.contains(identity)
    }
}

fn record_broadcast(
    kind: &str,
    outcome: &BroadcastOutcome,
) {
    metrics::MESSAGES_BROADCAST.with_label_values(&[kind]).inc();
    if outcome.dropped > 0 {
        metrics::DELIVERY_FAILURES
            .with_label_values(&["full"])
            .inc_by(outcome.dropped as u64);
    }
    if outcome.closed > 0 {
        metrics::DELIVERY_FAILURES
            .with_label_values(&["closed"])
            .inc_by(outcome.closed as u64);
    }
}
