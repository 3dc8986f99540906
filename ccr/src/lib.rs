//! Terminal console and command line for cross-cluster replication follower
//! indices.

pub mod follow;
pub mod tui;

pub use ccr_core::{CcrError, CcrResult};
