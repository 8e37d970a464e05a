//! gRPC binding of the chat protocol
//!
//! Serves `chat.ChittyChat` next to the standard `grpc.health.v1` service on
//! a listener bound by the caller. `Join` responses are long-lived streams,
//! so no server-wide request timeout is installed.

mod grpc_chat_service;
mod session_handler;

pub use session_handler::*;

#[cfg(test)]
mod grpc_chat_service_test;

use std::net::SocketAddr;
use std::sync::Arc;

use futures::FutureExt;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tokio_stream::wrappers::TcpListenerStream;
use tonic::codec::CompressionEncoding;
use tonic_health::server::health_reporter;
use tracing::debug;
use tracing::error;
use tracing::info;
use tracing::warn;

use crate::proto::ChittyChatServer;
use crate::ChatNode;
use crate::Result;
use crate::SystemError;

/// Binds the chat listener. Failure here is fatal for the server process.
pub async fn bind_listener(address: SocketAddr) -> Result<TcpListener> {
    TcpListener::bind(address).await.map_err(|e| {
        error!("failed to bind {}: {:?}", address, e);
        SystemError::BindFailed { address, source: e }.into()
    })
}

/// Runs the RPC server until `shutdown_signal` fires and every open `Join`
/// stream has ended.
pub async fn start_rpc_server(
    node: Arc<ChatNode>,
    listener: TcpListener,
    mut shutdown_signal: watch::Receiver<()>,
) -> Result<()> {
    let local_addr = listener.local_addr()?;
    let config = node.config.clone();
    let network = &config.network;

    let (mut health_reporter, health_service) = health_reporter();
    health_reporter.set_serving::<ChittyChatServer<ChatNode>>().await;

    let chat_service = {
        let server = ChittyChatServer::from_arc(node.clone());
        if network.enable_compression {
            server
                .accept_compressed(CompressionEncoding::Gzip)
                .send_compressed(CompressionEncoding::Gzip)
        } else {
            server
        }
    };

    node.set_rpc_ready(true);
    info!("chat rpc server listening on {}", local_addr);

    let result = tonic::transport::Server::builder()
        .concurrency_limit_per_connection(network.concurrency_limit)
        .max_concurrent_streams(network.max_concurrent_streams)
        .tcp_nodelay(network.tcp_nodelay)
        .tcp_keepalive(Some(network.tcp_keepalive()))
        .http2_keepalive_interval(Some(network.http2_keep_alive_interval()))
        .http2_keepalive_timeout(Some(network.http2_keep_alive_timeout()))
        .add_service(health_service)
        .add_service(chat_service)
        .serve_with_incoming_shutdown(
            TcpListenerStream::new(listener),
            shutdown_signal.changed().map(|_| {
                warn!("Stopping chat rpc server on {}", local_addr);
            }),
        )
        .await;

    node.set_rpc_ready(false);

    if let Err(e) = result {
        error!("chat rpc server terminated with error: {:?}", e);
        return Err(SystemError::ServerUnavailable.into());
    }
    debug!("rpc service finished!");
    Ok(())
}
