//! Registry of live subscriber sinks
//!
//! Maps a client identity to the outbound channel feeding that client's
//! `Join` stream. Broadcast is a non-blocking fan-out: a sink that is full
//! (slow client) or closed (client gone) is skipped without affecting
//! delivery to anyone else.
//!
//! ```text
//! BroadcastServer ── broadcast() ──> try_send ─┬─> Alice sink ──> gRPC stream
//!                                              ├─> Bob sink   ──> gRPC stream
//!                                              └─> Carol sink ──> gRPC stream
//! ```

use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;

use dashmap::DashMap;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio_util::sync::CancellationToken;
use tracing::trace;
use tracing::warn;

use crate::proto::ChatMessage;

/// Outbound handle for one connected client.
pub type MessageSink = mpsc::Sender<std::result::Result<ChatMessage, tonic::Status>>;

/// A registered sink plus the bookkeeping that ties it to one `Join` call.
#[derive(Debug, Clone)]
pub struct Subscriber {
    /// Unique per `Join`, distinguishes reconnects under the same identity
    pub id: u64,
    pub sink: MessageSink,
    /// Fired when a later `Join` takes this identity over
    pub superseded: CancellationToken,
}

/// Per-broadcast delivery tally.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BroadcastOutcome {
    pub delivered: usize,
    /// Sink buffer was full; the message is lost for that subscriber only
    pub dropped: usize,
    /// Receiver already gone; its session will clean the entry up
    pub closed: usize,
}

impl BroadcastOutcome {
    pub fn failed(&self) -> usize {
        self.dropped + self.closed
    }
}

#[derive(Debug)]
pub struct SubscriberRegistry {
    subscribers: DashMap<String, Subscriber>,

    /// Next subscription id (monotonically increasing)
    next_id: AtomicU64,
}

impl Default for SubscriberRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl SubscriberRegistry {
    pub fn new() -> Self {
        Self {
            subscribers: DashMap::new(),
            next_id: AtomicU64::new(1),
        }
    }

    /// Registers `sink` under `identity`, replacing any earlier entry.
    ///
    /// Returns the new subscriber and, if the identity was already taken,
    /// the entry it displaced.
    pub fn add(
        &self,
        identity: impl Into<String>,
        sink: MessageSink,
    ) -> (Subscriber, Option<Subscriber>) {
        let identity = identity.into();
        let subscriber = Subscriber {
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            sink,
            superseded: CancellationToken::new(),
        };

        let replaced = self.subscribers.insert(identity.clone(), subscriber.clone());

        trace!(
            identity = %identity,
            subscriber_id = subscriber.id,
            replaced = replaced.is_some(),
            "Subscriber registered"
        );

        (subscriber, replaced)
    }

    /// Deletes the entry for `identity`. Absent identities are a no-op.
    pub fn remove(
        &self,
        identity: &str,
    ) -> Option<Subscriber> {
        self.subscribers.remove(identity).map(|(_, subscriber)| subscriber)
    }

    /// Deletes the entry only while it still belongs to subscription `id`.
    pub fn remove_if_current(
        &self,
        identity: &str,
        id: u64,
    ) -> bool {
        self.subscribers.remove_if(identity, |_, subscriber| subscriber.id == id).is_some()
    }

    /// Delivers `message` to every registered sink without waiting on any
    /// of them.
    pub fn broadcast(
        &self,
        message: &ChatMessage,
    ) -> BroadcastOutcome {
        let mut outcome = BroadcastOutcome::default();

        for entry in self.subscribers.iter() {
            match entry.sink.try_send(Ok(message.clone())) {
                Ok(()) => outcome.delivered += 1,
                Err(TrySendError::Full(_)) => {
                    outcome.dropped += 1;
                    warn!(
                        identity = %entry.key(),
                        clock = message.lamport_clock,
                        "Subscriber buffer full, message dropped"
                    );
                }
                Err(TrySendError::Closed(_)) => {
                    outcome.closed += 1;
                    trace!(identity = %entry.key(), "Subscriber sink already closed");
                }
            }
        }

        outcome
    }

    pub fn contains(
        &self,
        identity: &str,
    ) -> bool {
        self.subscribers.contains_key(identity)
    }

    #[cfg(test)]
    pub(crate) fn current_id(
        &self,
        identity: &str,
    ) -> Option<u64> {
        self.subscribers.get(identity).map(|s| s.id)
    }

    #[cfg(test)]
    pub(crate) fn identities(&self) -> Vec<String> {
        self.subscribers.iter().map(|entry| entry.key().clone()).collect()
    }

    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    #[cfg(test)]
    pub(crate) fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }
}
