//! Protocol Buffer definitions and generated code for the chat RPC service.
//!
//! The types are generated at build time from `proto/chat.proto` by
//! [`tonic-build`].

pub mod chat {
    tonic::include_proto!("chat");
}

pub use chat::chitty_chat_client::ChittyChatClient;
pub use chat::chitty_chat_server::ChittyChat;
pub use chat::chitty_chat_server::ChittyChatServer;
pub use chat::ChatMessage;
pub use chat::JoinRequest;
pub use chat::PublishAck;

impl ChatMessage {
    pub fn new(
        sender: impl Into<String>,
        body: impl Into<String>,
        lamport_clock: i64,
    ) -> Self {
        Self {
            sender: sender.into(),
            body: body.into(),
            lamport_clock,
        }
    }

    /// System notice authored by the server itself.
    pub fn system(
        body: impl Into<String>,
        lamport_clock: i64,
    ) -> Self {
        Self::new(crate::SERVER_SENDER, body, lamport_clock)
    }

    pub fn is_system(&self) -> bool {
        self.sender == crate::SERVER_SENDER
    }
}
