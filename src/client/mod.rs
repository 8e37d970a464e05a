mod agent;
mod transport;

pub use agent::*;
pub use transport::*;
