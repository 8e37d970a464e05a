//! `chat.ChittyChat` service bound to [`ChatNode`].

use std::pin::Pin;

use futures::Stream;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tonic::Request;
use tonic::Response;
use tonic::Status;
use tracing::debug;
use tracing::warn;

use super::SessionHandler;
use crate::proto::ChatMessage;
use crate::proto::ChittyChat;
use crate::proto::JoinRequest;
use crate::proto::PublishAck;
use crate::ChatNode;

#[tonic::async_trait]
impl ChittyChat for ChatNode {
    type JoinStream = Pin<Box<dyn Stream<Item = Result<ChatMessage, Status>> + Send>>;

    /// Registers the caller and streams every broadcast to it until the
    /// connection ends. A session task per call detects the end and runs
    /// leave.
    async fn join(
        &self,
        request: Request<JoinRequest>,
    ) -> std::result::Result<Response<Self::JoinStream>, Status> {
        if !self.is_rpc_ready() {
            warn!("[rpc|join] chat node is not ready");
            return Err(Status::unavailable("Service is not ready"));
        }

        let remote_addr = request.remote_addr();
        let JoinRequest {
            sender,
            lamport_clock,
        } = request.into_inner();
        debug!(identity = %sender, client_clock = lamport_clock, ?remote_addr, "Join requested");

        let (sink, receiver) = mpsc::channel(self.config.server.sink_buffer_size);
        let subscription = self.server.join(&sender, sink)?;

        let handler = SessionHandler::new(
            self.server.clone(),
            subscription,
            self.shutdown_signal.clone(),
        );
        tokio::spawn(handler.run());

        Ok(Response::new(Box::pin(ReceiverStream::new(receiver))))
    }

    async fn publish(
        &self,
        request: Request<ChatMessage>,
    ) -> std::result::Result<Response<PublishAck>, Status> {
        if !self.is_rpc_ready() {
            warn!("[rpc|publish] chat node is not ready");
            return Err(Status::unavailable("Service is not ready"));
        }

        let delivered = self.server.publish(request.into_inner());
        Ok(Response::new(PublishAck {
            lamport_clock: delivered.lamport_clock,
        }))
    }
}
