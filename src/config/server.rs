use std::net::SocketAddr;
use std::path::PathBuf;

use config::ConfigError;
use serde::Deserialize;
use serde::Serialize;

use crate::constants::DEFAULT_LOG_DIR;
use crate::constants::DEFAULT_SINK_BUFFER_SIZE;
use crate::constants::SERVER_LOG_FILE;
use crate::Error;
use crate::Result;
use crate::DEFAULT_PORT;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_listen_addr")]
    pub listen_address: SocketAddr,

    /// Directory holding the server log file
    #[serde(default = "default_log_dir")]
    pub log_dir: PathBuf,

    /// Truncated on every server start
    #[serde(default = "default_log_file")]
    pub log_file: String,

    /// Outbound buffer per joined client
    #[serde(default = "default_sink_buffer_size")]
    pub sink_buffer_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_address: default_listen_addr(),
            log_dir: default_log_dir(),
            log_file: default_log_file(),
            sink_buffer_size: default_sink_buffer_size(),
        }
    }
}

impl ServerConfig {
    /// Validates server configuration consistency
    /// # Errors
    /// Returns `Error::Config` if any configuration rules are violated
    pub fn validate(&self) -> Result<()> {
        if self.listen_address.port() == 0 {
            return Err(Error::Config(ConfigError::Message(
                "listen_address must specify a non-zero port".into(),
            )));
        }

        if self.sink_buffer_size == 0 {
            return Err(Error::Config(ConfigError::Message(
                "sink_buffer_size must be > 0".into(),
            )));
        }

        if self.log_file.trim().is_empty() {
            return Err(Error::Config(ConfigError::Message("log_file cannot be empty".into())));
        }

        if self.log_dir.as_os_str().is_empty() {
            return Err(Error::Config(ConfigError::Message("log_dir path cannot be empty".into())));
        }

        Ok(())
    }

    pub fn log_path(&self) -> PathBuf {
        self.log_dir.join(&self.log_file)
    }
}

fn default_listen_addr() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], DEFAULT_PORT))
}
fn default_log_dir() -> PathBuf {
    PathBuf::from(DEFAULT_LOG_DIR)
}
fn default_log_file() -> String {
    SERVER_LOG_FILE.to_string()
}
fn default_sink_buffer_size() -> usize {
    DEFAULT_SINK_BUFFER_SIZE
}
