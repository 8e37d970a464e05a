use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use chitty_chat::bind_listener;
use chitty_chat::proto::ChatMessage;
use chitty_chat::ChatConfig;
use chitty_chat::ChatNode;
use chitty_chat::ClientConfig;
use chitty_chat::GrpcChatTransport;
use chitty_chat::LamportClock;
use chitty_chat::MessageStream;
use chitty_chat::NodeBuilder;
use futures::StreamExt;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::timeout;

pub const WAIT_FOR_NODE_READY_IN_SEC: u64 = 3;

pub const WAIT_FOR_MESSAGE_IN_MS: u64 = 2000;

pub struct TestServer {
    pub node: Arc<ChatNode>,
    pub address: SocketAddr,
    shutdown_tx: watch::Sender<()>,
    handle: JoinHandle<chitty_chat::Result<()>>,
}

impl TestServer {
    /// Starts a chat server on an ephemeral localhost port.
    pub async fn start(seed: LamportClock) -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(());

        let listener = bind_listener("127.0.0.1:0".parse().unwrap()).await.unwrap();
        let address = listener.local_addr().unwrap();

        let mut config = ChatConfig::default();
        config.server.listen_address = address;

        let node = NodeBuilder::init(config, shutdown_rx).clock(seed).build();
        let mut ready_rx = node.ready_notifier();
        let handle = tokio::spawn(node.clone().serve(listener));

        timeout(
            Duration::from_secs(WAIT_FOR_NODE_READY_IN_SEC),
            ready_rx.wait_for(|&ready| ready),
        )
        .await
        .expect("server ready in time")
        .expect("ready channel open");

        Self {
            node,
            address,
            shutdown_tx,
            handle,
        }
    }

    pub fn client_config(
        &self,
        name: &str,
    ) -> ClientConfig {
        ClientConfig {
            name: name.to_string(),
            server_address: format!("http://{}", self.address),
            ..ClientConfig::default()
        }
    }

    pub async fn transport(&self) -> GrpcChatTransport {
        let config = ChatConfig::default();
        GrpcChatTransport::connect(&self.client_config("test"), &config.network)
            .await
            .expect("connect to test server")
    }

    pub async fn shutdown(self) {
        self.shutdown_tx.send(()).expect("server still running");
        timeout(Duration::from_secs(WAIT_FOR_NODE_READY_IN_SEC), self.handle)
            .await
            .expect("server stops in time")
            .expect("server task not panicked")
            .expect("server exits cleanly");
    }
}

pub async fn next_message(stream: &mut MessageStream) -> ChatMessage {
    timeout(Duration::from_millis(WAIT_FOR_MESSAGE_IN_MS), stream.next())
        .await
        .expect("message arrives in time")
        .expect("stream still open")
        .expect("message, not status")
}

#[allow(dead_code)]
pub async fn expect_closed(stream: &mut MessageStream) {
    let item = timeout(Duration::from_millis(WAIT_FOR_MESSAGE_IN_MS), stream.next())
        .await
        .expect("stream ends in time");
    assert!(item.is_none(), "expected end of stream, got {:?}", item);
}
