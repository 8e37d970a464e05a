//! Transport-agnostic chat core: the Lamport clock, the subscriber registry
//! and the broadcast server that ties them together.

mod broadcast;
mod clock;
mod registry;

pub use broadcast::*;
pub use clock::*;
pub use registry::*;

#[cfg(test)]
mod clock_test;
