use tokio::sync::mpsc;

use crate::proto::ChatMessage;

static LOGGER_INIT: once_cell::sync::Lazy<()> = once_cell::sync::Lazy::new(|| {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
});

pub fn enable_logger() {
    *LOGGER_INIT;
    println!("setup logger for unit test.");
}

/// Everything already buffered in `rx`, without waiting.
pub fn drain(rx: &mut mpsc::Receiver<std::result::Result<ChatMessage, tonic::Status>>) -> Vec<ChatMessage> {
    let mut messages = Vec::new();
    while let Ok(item) = rx.try_recv() {
        if let Ok(message) = item {
            messages.push(message);
        }
    }
    messages
}
