use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use tokio::sync::watch;
use tokio::time::timeout;
use tonic::Code;
use tonic::Request;

use crate::proto::ChatMessage;
use crate::proto::ChittyChat;
use crate::proto::JoinRequest;
use crate::test_utils::enable_logger;
use crate::ChatConfig;
use crate::ChatNode;
use crate::LamportClock;
use crate::NodeBuilder;
use crate::SERVER_SENDER;

const WAIT: Duration = Duration::from_secs(2);

fn ready_node(shutdown_rx: watch::Receiver<()>) -> Arc<ChatNode> {
    let node = NodeBuilder::init(ChatConfig::default(), shutdown_rx).build();
    node.set_rpc_ready(true);
    node
}

fn join_request(identity: &str) -> Request<JoinRequest> {
    Request::new(JoinRequest {
        sender: identity.to_string(),
        lamport_clock: 0,
    })
}

#[tokio::test]
async fn test_join_rejected_until_ready() {
    let (_tx, rx) = watch::channel(());
    let node = NodeBuilder::init(ChatConfig::default(), rx).build();

    let status = node.join(join_request("Alice")).await.err().unwrap();
    assert_eq!(status.code(), Code::Unavailable);

    let status = node
        .publish(Request::new(ChatMessage::new("Alice", "hi", 1)))
        .await
        .err()
        .unwrap();
    assert_eq!(status.code(), Code::Unavailable);
}

#[tokio::test]
async fn test_join_with_empty_identity_is_invalid_argument() {
    let (_tx, rx) = watch::channel(());
    let node = ready_node(rx);

    let status = node.join(join_request("  ")).await.err().unwrap();
    assert_eq!(status.code(), Code::InvalidArgument);
    assert_eq!(node.server.subscriber_count(), 0);
}

/// # Case: Join streams the welcome, Publish acks with the assigned clock
#[tokio::test]
async fn test_join_then_publish_round_trip() {
    enable_logger();
    let (_tx, rx) = watch::channel(());
    let node = ready_node(rx);

    let mut stream = node.join(join_request("Alice")).await.unwrap().into_inner();
    let welcome = timeout(WAIT, stream.next()).await.unwrap().unwrap().unwrap();
    assert_eq!(welcome.sender, SERVER_SENDER);
    assert_eq!(welcome.body, "Welcome Alice to the Chitty Chat!");

    let ack = node
        .publish(Request::new(ChatMessage::new("Alice", "hello", 1)))
        .await
        .unwrap()
        .into_inner();
    assert_eq!(ack.lamport_clock, 1);

    let echoed = timeout(WAIT, stream.next()).await.unwrap().unwrap().unwrap();
    assert_eq!(echoed.body, "hello");
    assert_eq!(echoed.lamport_clock, ack.lamport_clock);
}

#[tokio::test]
async fn test_publish_corrects_stale_clock() {
    let (_tx, rx) = watch::channel(());
    let node = NodeBuilder::init(ChatConfig::default(), rx)
        .clock(LamportClock::new(5))
        .build();
    node.set_rpc_ready(true);

    let ack = node
        .publish(Request::new(ChatMessage::new("Bob", "late", 0)))
        .await
        .unwrap()
        .into_inner();
    assert_eq!(ack.lamport_clock, 6);
}

/// # Case: dropping the response stream triggers the departure notice
#[tokio::test]
async fn test_dropping_stream_announces_departure() {
    let (_tx, rx) = watch::channel(());
    let node = ready_node(rx);

    let alice_stream = node.join(join_request("Alice")).await.unwrap().into_inner();
    let mut bob_stream = node.join(join_request("Bob")).await.unwrap().into_inner();
    // Bob's own welcome
    timeout(WAIT, bob_stream.next()).await.unwrap().unwrap().unwrap();

    drop(alice_stream);

    let notice = timeout(WAIT, bob_stream.next()).await.unwrap().unwrap().unwrap();
    assert_eq!(notice.body, "Alice has left the chat");
    assert!(!node.server.is_joined("Alice"));
}

#[tokio::test]
async fn test_shutdown_ends_join_streams() {
    let (tx, rx) = watch::channel(());
    let node = ready_node(rx);

    let mut stream = node.join(join_request("Alice")).await.unwrap().into_inner();
    timeout(WAIT, stream.next()).await.unwrap().unwrap().unwrap();

    tx.send(()).unwrap();

    assert!(timeout(WAIT, stream.next()).await.unwrap().is_none());
    assert_eq!(node.server.subscriber_count(), 0);
}
