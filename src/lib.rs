mod client;
mod config;
mod constants;
mod engine;
mod errors;
mod metrics;
mod network;
mod node;
pub mod proto;
pub mod utils;

pub use engine::*;

pub use client::*;
pub use config::*;
pub use constants::*;
pub use errors::*;
pub use metrics::*;
pub use network::*;
pub use node::*;
pub use utils::*;

//-----------------------------------------------------------
// Test utils

#[cfg(test)]
pub mod test_utils;
