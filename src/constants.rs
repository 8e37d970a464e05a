// -
// Protocol

/// Sender name carried by every system notice (welcome / departure).
pub const SERVER_SENDER: &str = "Server";

/// Well-known port the server binds and the client dials by default.
pub const DEFAULT_PORT: u16 = 8080;

// -
// Sinks

/// Per-subscriber outbound buffer. A subscriber lagging further behind than
/// this loses messages instead of stalling the broadcast.
pub(crate) const DEFAULT_SINK_BUFFER_SIZE: usize = 128;

// -
// Logs

pub(crate) const DEFAULT_LOG_DIR: &str = "./logs";
pub(crate) const SERVER_LOG_FILE: &str = "server.log";
pub(crate) const CLIENT_LOG_FILE: &str = "client.log";

pub(crate) fn welcome_notice(identity: &str) -> String {
    format!("Welcome {identity} to the Chitty Chat!")
}

pub(crate) fn departure_notice(identity: &str) -> String {
    format!("{identity} has left the chat")
}
