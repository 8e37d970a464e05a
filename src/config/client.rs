use std::path::PathBuf;

use config::ConfigError;
use serde::Deserialize;
use serde::Serialize;

use crate::constants::CLIENT_LOG_FILE;
use crate::constants::DEFAULT_LOG_DIR;
use crate::Error;
use crate::Result;
use crate::DEFAULT_PORT;

/// Settings of the `chat-client` binary.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ClientConfig {
    /// Display name, used as the chat identity
    #[serde(default = "default_name")]
    pub name: String,

    /// gRPC endpoint of the server, e.g. `http://127.0.0.1:8080`
    #[serde(default = "default_server_address")]
    pub server_address: String,

    #[serde(default = "default_log_dir")]
    pub log_dir: PathBuf,

    /// Appended to, never truncated
    #[serde(default = "default_log_file")]
    pub log_file: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            server_address: default_server_address(),
            log_dir: default_log_dir(),
            log_file: default_log_file(),
        }
    }
}

impl ClientConfig {
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::Config(ConfigError::Message("client name cannot be empty".into())));
        }

        if !(self.server_address.starts_with("http://") || self.server_address.starts_with("https://")) {
            return Err(Error::Config(ConfigError::Message(format!(
                "server_address {} must start with http:// or https://",
                self.server_address
            ))));
        }

        Ok(())
    }

    pub fn log_path(&self) -> PathBuf {
        self.log_dir.join(&self.log_file)
    }
}

fn default_name() -> String {
    "Alice".to_string()
}
fn default_server_address() -> String {
    format!("http://127.0.0.1:{DEFAULT_PORT}")
}
fn default_log_dir() -> PathBuf {
    PathBuf::from(DEFAULT_LOG_DIR)
}
fn default_log_file() -> String {
    CLIENT_LOG_FILE.to_string()
}
