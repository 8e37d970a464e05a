//! Chat node container and lifecycle management.
//!
//! [`ChatNode`] hosts the [`BroadcastServer`] behind the gRPC service and
//! tracks whether the RPC server is accepting calls.
//!
//! ## Example Usage
//! ```ignore
//! let node = NodeBuilder::init(config, shutdown_rx).build();
//! let listener = bind_listener(node.config.server.listen_address).await?;
//! node.serve(listener).await?;
//! ```

mod builder;
pub use builder::*;


use std::fmt::Debug;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::info;

use crate::network::start_rpc_server;
use crate::BroadcastServer;
use crate::ChatConfig;
use crate::Result;

/// Created via [`NodeBuilder`].
pub struct ChatNode {
    pub(crate) server: Arc<BroadcastServer>,
    pub(crate) ready: AtomicBool,

    /// Notifies when RPC server is ready to accept requests
    pub(crate) rpc_ready_tx: watch::Sender<bool>,

    pub config: Arc<ChatConfig>,

    /// Shutdown signal for graceful termination
    pub(crate) shutdown_signal: watch::Receiver<()>,
}

impl Debug for ChatNode {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.debug_struct("ChatNode")
            .field("listen_address", &self.config.server.listen_address)
            .field("subscribers", &self.server.subscriber_count())
            .finish()
    }
}

impl ChatNode {
    /// Serves RPCs on `listener` until the shutdown signal fires.
    pub async fn serve(
        self: Arc<Self>,
        listener: TcpListener,
    ) -> Result<()> {
        let shutdown_signal = self.shutdown_signal.clone();
        start_rpc_server(self, listener, shutdown_signal).await
    }

    pub fn set_rpc_ready(
        &self,
        is_ready: bool,
    ) {
        info!("Set chat RPC server ready: {}", is_ready);
        self.ready.store(is_ready, Ordering::SeqCst);
        self.rpc_ready_tx.send_replace(is_ready);
    }

    pub fn is_rpc_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    /// Returns a receiver for readiness notifications.
    ///
    /// ```ignore
    /// let mut ready_rx = node.ready_notifier();
    /// ready_rx.wait_for(|&ready| ready).await?;
    /// ```
    pub fn ready_notifier(&self) -> watch::Receiver<bool> {
        self.rpc_ready_tx.subscribe()
    }

    pub fn server(&self) -> Arc<BroadcastServer> {
        self.server.clone()
    }
}
