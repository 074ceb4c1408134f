//! Service plumbing shared by every Kainan binary.

pub mod health;
pub mod middleware;
pub mod serde;
pub mod tracing;
