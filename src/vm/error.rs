//! Error types for the Corral VM
//!
//! Language runtime errors raised by executing code are [`LogoError`]s. Jobs
//! wrap them in [`JobError::Runtime`] together with the agent, procedure and
//! instruction address that were current when the error was raised.

use thiserror::Error;

/// Errors raised by executing code
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LogoError {
    /// Error raised by a primitive or by user code
    #[error("{0}")]
    Runtime(String),

    /// Code run by an agent kind that cannot run it
    #[error("{primitive} can't be run by a {kind}")]
    WrongAgentKind {
        /// Procedure or primitive name
        primitive: String,
        /// Kind of the offending context
        kind: String,
    },

    /// Reporter procedure ended without reporting a value
    #[error("reached end of reporter procedure {procedure} without REPORT being called")]
    NoReport {
        /// Reporter procedure name
        procedure: String,
    },

    /// REPORT used from command code
    #[error("REPORT can only be used inside a reporter procedure")]
    ReportOutsideReporter,

    /// A reporter procedure invoked as a command
    #[error("{procedure} is a reporter and can't be called as a command")]
    ReporterAsCommand {
        /// Reporter procedure name
        procedure: String,
    },

    /// Instruction pointer outside the procedure body
    #[error("instruction address {ip} is outside procedure {procedure}")]
    InvalidAddress {
        /// Procedure name
        procedure: String,
        /// Offending address
        ip: usize,
    },

    /// The context has no frame to execute
    #[error("context has no active frame")]
    NoActivation,

    /// The context has no agent
    #[error("context has no current agent")]
    NoAgent,

    /// The current agent died and can no longer be addressed
    #[error("that {0} is dead")]
    DeadAgent(String),
}

/// Convenience result alias for executing code
pub type LogoResult<T> = std::result::Result<T, LogoError>;

/// Job execution errors
#[derive(Debug, Error)]
pub enum JobError {
    /// Executing code raised a runtime error; the rest of the run was abandoned
    #[error("runtime error in {procedure} for {agent} at instruction {ip}: {source}")]
    Runtime {
        /// Procedure that was executing
        procedure: String,
        /// Agent that was executing
        agent: String,
        /// Instruction address at the time of the error
        ip: usize,
        /// Underlying language error
        source: LogoError,
    },

    /// The workspace was halted between agents
    #[error("job halted")]
    Halted,

    /// A reporter was evaluated against an empty agent set
    #[error("cannot evaluate a reporter against an empty agent set")]
    EmptyAgentSet,
}

impl JobError {
    /// The language error behind a runtime failure, if any
    pub fn logo_error(&self) -> Option<&LogoError> {
        match self {
            JobError::Runtime { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Convenience result alias for job operations
pub type JobResult<T> = std::result::Result<T, JobError>;
