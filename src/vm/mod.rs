//! Execution machinery for compiled procedures.
//!
//! An [`ExclusiveJob`] snapshots its agent set, builds a single [`Context`],
//! and drives the [`Interpreter`] through the procedure once per agent,
//! resetting the context in between. Frames are immutable [`Activation`]s
//! shared by `Arc`.

/// Call-stack frames.
pub mod activation;
/// Per-agent execution state.
pub mod context;
/// Language and job errors.
pub mod error;
/// Interpreter seam and the reference interpreter.
pub mod interpreter;
/// Units of work.
pub mod job;
/// Compiled procedures and reference bytecode.
pub mod procedure;
/// Language values.
pub mod value;
/// Shared execution environment and random source.
pub mod workspace;

pub use activation::Activation;
pub use context::Context;
pub use error::{JobError, JobResult, LogoError, LogoResult};
pub use interpreter::{BasicInterpreter, ExecEnv, Interpreter, Step};
pub use job::{ExclusiveJob, Job, JobOwner, RunSummary};
pub use procedure::{Expr, Instruction, Procedure, ProcedureKind};
pub use value::Value;
pub use workspace::{RandomSource, Workspace};
