//! Compiled procedures
//!
//! A procedure is an immutable body of instructions shared by `Arc`. The
//! instruction set here is the small reference bytecode understood by
//! [`BasicInterpreter`](super::interpreter::BasicInterpreter); other
//! interpreters are free to ignore it and key off the procedure name.

use std::sync::Arc;

use super::value::Value;
use crate::world::{AgentBits, AgentSet};

/// Whether a procedure is run for effect or for a value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcedureKind {
    /// Run for side effects
    Command,
    /// Evaluated for a value via REPORT
    Reporter,
}

/// A compiled procedure
#[derive(Debug, Clone, PartialEq)]
pub struct Procedure {
    /// Procedure name, used in diagnostics
    pub name: String,
    /// Command or reporter
    pub kind: ProcedureKind,
    /// Agent kinds allowed to run the body
    pub usable_by: AgentBits,
    /// Instruction body
    pub code: Vec<Instruction>,
}

impl Procedure {
    /// Build a procedure
    pub fn new(
        name: impl Into<String>,
        kind: ProcedureKind,
        usable_by: AgentBits,
        code: Vec<Instruction>,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            usable_by,
            code,
        }
    }

    /// Shared command procedure usable by every agent kind
    pub fn command(name: impl Into<String>, code: Vec<Instruction>) -> Arc<Self> {
        Arc::new(Self::new(name, ProcedureKind::Command, AgentBits::ALL, code))
    }

    /// Shared reporter procedure usable by every agent kind
    pub fn reporter(name: impl Into<String>, code: Vec<Instruction>) -> Arc<Self> {
        Arc::new(Self::new(name, ProcedureKind::Reporter, AgentBits::ALL, code))
    }

    /// Number of instructions in the body
    pub fn len(&self) -> usize {
        self.code.len()
    }

    /// Whether the body is empty
    pub fn is_empty(&self) -> bool {
        self.code.is_empty()
    }
}

/// Reference bytecode
#[derive(Debug, Clone, PartialEq)]
pub enum Instruction {
    /// Do nothing
    Noop,
    /// Append the rendered value to the world's output
    Print(Expr),
    /// Set an agent-owned variable on the current agent
    Set {
        /// Variable name
        var: String,
        /// New value
        value: Expr,
    },
    /// Create one turtle of `breed`, copying the current agent's variables
    Hatch {
        /// Breed of the new turtle
        breed: String,
    },
    /// Kill the current agent and end its run
    Die,
    /// Kill the agent with the given who number, if alive
    KillWho(u64),
    /// Call a command procedure
    Call(Arc<Procedure>),
    /// Return from the current procedure call
    Return,
    /// End the current agent's run
    Done,
    /// Report a value from a reporter procedure
    Report(Expr),
    /// Raise a runtime error
    Fail(String),
}

impl Instruction {
    /// Short name used in trace output
    pub fn mnemonic(&self) -> &'static str {
        match self {
            Instruction::Noop => "noop",
            Instruction::Print(_) => "print",
            Instruction::Set { .. } => "set",
            Instruction::Hatch { .. } => "hatch",
            Instruction::Die => "die",
            Instruction::KillWho(_) => "kill-who",
            Instruction::Call(_) => "call",
            Instruction::Return => "return",
            Instruction::Done => "done",
            Instruction::Report(_) => "report",
            Instruction::Fail(_) => "fail",
        }
    }
}

/// Reference expressions
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Literal value
    Constant(Value),
    /// Agent-owned variable of the current agent
    Own(String),
    /// Who number of the current agent
    Who,
    /// Random integer in `0..n` drawn from the job's random source
    RandomInt(u32),
    /// Number of living members of a collection
    Count(AgentSet),
}
