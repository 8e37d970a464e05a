//! Builder for [`ChatNode`].
//!
//! ```ignore
//! let node = NodeBuilder::new(Some("config/server.toml"), shutdown_rx)?
//!     .clock(LamportClock::new(0))
//!     .build();
//! ```

use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use tokio::sync::watch;
use tracing::info;

use super::ChatNode;
use crate::BroadcastServer;
use crate::ChatConfig;
use crate::LamportClock;
use crate::Result;

pub struct NodeBuilder {
    pub(super) config: ChatConfig,
    pub(super) clock: LamportClock,
    pub(super) shutdown_signal: watch::Receiver<()>,
}

impl NodeBuilder {
    /// Loads layered configuration, optionally overridden by `config_path`,
    /// and validates it.
    pub fn new(
        config_path: Option<&str>,
        shutdown_signal: watch::Receiver<()>,
    ) -> Result<Self> {
        let mut config = ChatConfig::new()?;
        if let Some(p) = config_path {
            info!("with_override_config from: {}", &p);
            config = config.with_override_config(p)?;
        }

        Ok(Self::init(config.validate()?, shutdown_signal))
    }

    /// Core initialization logic shared by all construction paths
    pub fn init(
        config: ChatConfig,
        shutdown_signal: watch::Receiver<()>,
    ) -> Self {
        Self {
            config,
            clock: LamportClock::default(),
            shutdown_signal,
        }
    }

    /// Seeds the server clock, e.g. when resuming after a restart
    pub fn clock(
        mut self,
        clock: LamportClock,
    ) -> Self {
        self.clock = clock;
        self
    }

    pub fn config(
        mut self,
        config: ChatConfig,
    ) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> Arc<ChatNode> {
        let (rpc_ready_tx, _rpc_ready_rx) = watch::channel(false);

        Arc::new(ChatNode {
            server: Arc::new(BroadcastServer::new(self.clock)),
            ready: AtomicBool::new(false),
            rpc_ready_tx,
            config: Arc::new(self.config),
            shutdown_signal: self.shutdown_signal,
        })
    }
}
