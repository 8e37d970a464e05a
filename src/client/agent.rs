//! Chat participant
//!
//! Keeps a local Lamport clock replica that ticks before every send and
//! merges the clock of every received message.

use futures::Stream;
use futures::StreamExt;
use parking_lot::Mutex;
use tonic::Code;
use tracing::debug;
use tracing::info;
use tracing::warn;

use super::ChatTransport;
use super::MessageStream;
use crate::proto::ChatMessage;
use crate::proto::PublishAck;
use crate::ClockValue;
use crate::LamportClock;
use crate::NetworkError;
use crate::Result;

pub struct ClientAgent<T: ChatTransport> {
    identity: String,
    clock: Mutex<LamportClock>,
    transport: T,
}

impl<T: ChatTransport> ClientAgent<T> {
    pub fn new(
        identity: impl Into<String>,
        transport: T,
    ) -> Self {
        Self {
            identity: identity.into(),
            clock: Mutex::new(LamportClock::default()),
            transport,
        }
    }

    pub fn identity(&self) -> &str {
        &self.identity
    }

    pub fn clock(&self) -> ClockValue {
        self.clock.lock().current()
    }

    /// Opens the inbound stream. The server greets with a welcome notice.
    pub async fn join(&self) -> Result<MessageStream> {
        info!(identity = %self.identity, "joining the chat");
        self.transport.join(&self.identity, self.clock()).await
    }

    /// Sends one line of user input.
    ///
    /// Failures are logged and returned; the agent stays usable.
    pub async fn publish(
        &self,
        text: &str,
    ) -> Result<PublishAck> {
        let lamport_clock = self.clock.lock().tick();
        let message = ChatMessage::new(self.identity.as_str(), text.trim(), lamport_clock);

        match self.transport.publish(message).await {
            Ok(ack) => {
                debug!(sent_clock = lamport_clock, assigned_clock = ack.lamport_clock, "published");
                Ok(ack)
            }
            Err(e) => {
                warn!(identity = %self.identity, "something went wrong with the server: {:?}", e);
                Err(e)
            }
        }
    }

    /// Merges and renders every inbound message until the stream ends.
    ///
    /// End of stream and a `Cancelled` status are a normal close; any other
    /// status is returned as [`NetworkError::StreamBroken`].
    pub async fn receive_loop<R>(
        &self,
        mut inbound: MessageStream,
        mut render: R,
    ) -> Result<()>
    where
        R: FnMut(&ChatMessage, ClockValue),
    {
        while let Some(item) = inbound.next().await {
            match item {
                Ok(message) => {
                    let local = self.clock.lock().merge(message.lamport_clock);
                    if message.is_system() {
                        info!(clock = local, "server notice: {}", message.body);
                    } else {
                        info!(
                            sender = %message.sender,
                            clock = local,
                            "{} got message from {}: {}",
                            self.identity,
                            message.sender,
                            message.body
                        );
                    }
                    render(&message, local);
                }
                Err(status) if status.code() == Code::Cancelled => {
                    info!("connection to server closed");
                    return Ok(());
                }
                Err(status) => {
                    warn!("failed to receive message from stream: {:?}", status);
                    return Err(NetworkError::StreamBroken(Box::new(status)).into());
                }
            }
        }
        info!("server is done sending messages");
        Ok(())
    }

    /// Joins, then publishes every input line while rendering broadcasts.
    ///
    /// Returns when input reaches EOF (the inbound stream is dropped, which
    /// the server treats as leave) or when the inbound stream ends.
    pub async fn run<I, R>(
        &self,
        input: I,
        render: R,
    ) -> Result<()>
    where
        I: Stream<Item = std::io::Result<String>>,
        R: FnMut(&ChatMessage, ClockValue),
    {
        let inbound = self.join().await?;

        let receiving = self.receive_loop(inbound, render);
        let sending = self.send_loop(input);
        tokio::pin!(receiving);
        tokio::pin!(sending);

        tokio::select! {
            result = &mut receiving => result,
            result = &mut sending => result,
        }
    }

    async fn send_loop<I>(
        &self,
        input: I,
    ) -> Result<()>
    where
        I: Stream<Item = std::io::Result<String>>,
    {
        tokio::pin!(input);
        while let Some(line) = input.next().await {
            let line = line?;
            // Already logged; a failed publish does not end the session.
            let _ = self.publish(&line).await;
        }
        debug!(identity = %self.identity, "input closed");
        Ok(())
    }
}

/// Console line for a received message.
pub fn render_line(
    message: &ChatMessage,
    clock: ClockValue,
) -> String {
    format!("Lamport: {} | {}: {}", clock, message.sender, message.body)
}
