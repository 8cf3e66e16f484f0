//! Corral – the exclusive-execution core of an agent-based simulation VM
//!
//! This crate runs a compiled procedure once for every agent in a collection:
//! - Shuffled, reproducible iteration over a snapshot of the collection
//! - Agents created mid-run are never visited; agents that die are skipped
//! - One reused per-agent execution context, reset between agents
//! - Exclusive jobs that run to completion without interleaving

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

/// Runtime configuration
pub mod config;
/// Agents, breeds, and agent collections
pub mod world;
/// Frames, contexts, interpreter seam, and jobs
pub mod vm;

// Re-export key types for convenience
pub use config::VmConfig;
pub use vm::{ExclusiveJob, Job, JobOwner, RandomSource, Workspace};
pub use world::{AgentId, AgentSet, World};

/// Current version of the Corral runtime
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
