//! Per-agent execution state
//!
//! A [`Context`] is the record the interpreter drives forward: the current
//! agent, its frame, its instruction pointer, and whether it has finished.
//! Exclusive jobs build one context per run and [`reset`](Context::reset) it
//! before every agent, so nothing but the owner and the type tag survives
//! from one agent to the next.

use std::sync::Arc;

use super::activation::Activation;
use super::error::{LogoError, LogoResult};
use super::interpreter::{ExecEnv, Interpreter, Step};
use super::job::JobOwner;
use super::procedure::Procedure;
use super::value::Value;
use crate::world::{AgentBits, AgentId, World};

/// Mutable execution record for one agent at a time
#[derive(Debug, Clone)]
pub struct Context {
    owner: JobOwner,
    agent: Option<AgentId>,
    activation: Option<Arc<Activation>>,
    ip: usize,
    finished: bool,
    /// Procedure calls made by this context below the frame it was reset with
    call_depth: usize,
    agent_bit: AgentBits,
}

impl Context {
    /// Create a context with no frame
    pub fn new(owner: JobOwner, agent: Option<AgentId>, agent_bit: AgentBits) -> Self {
        Self {
            owner,
            agent,
            activation: None,
            ip: 0,
            finished: false,
            call_depth: 0,
            agent_bit,
        }
    }

    /// Prepare the context for the next agent.
    ///
    /// Overwrites the agent, frame, instruction pointer, finished flag and
    /// call depth. The owner and type tag are kept.
    pub fn reset(&mut self, agent: AgentId, activation: Arc<Activation>, ip: usize) {
        self.agent = Some(agent);
        self.activation = Some(activation);
        self.ip = ip;
        self.finished = false;
        self.call_depth = 0;
    }

    /// Forget the current agent once its run is over
    pub fn release_agent(&mut self) {
        self.agent = None;
    }

    /// Drive the current agent until it finishes or raises an error
    pub fn run_exclusive(
        &mut self,
        interpreter: &dyn Interpreter,
        env: &mut ExecEnv<'_>,
    ) -> LogoResult<()> {
        while !self.finished {
            match interpreter.step(self, env)? {
                Step::Continue => {}
                Step::Finished => self.finished = true,
                Step::Report(_) => return Err(LogoError::ReportOutsideReporter),
            }
        }
        Ok(())
    }

    /// Evaluate a reporter procedure starting at address 0 of `activation`
    pub fn call_reporter_procedure(
        &mut self,
        activation: Arc<Activation>,
        interpreter: &dyn Interpreter,
        env: &mut ExecEnv<'_>,
    ) -> LogoResult<Value> {
        let procedure = activation.procedure().name.clone();
        self.activation = Some(activation);
        self.ip = 0;
        self.finished = false;
        self.call_depth = 0;

        while !self.finished {
            match interpreter.step(self, env)? {
                Step::Continue => {}
                Step::Finished => self.finished = true,
                Step::Report(value) => {
                    self.finished = true;
                    return Ok(value);
                }
            }
        }
        Err(LogoError::NoReport { procedure })
    }

    /// Enter `procedure`, resuming the caller at `return_address` afterwards
    pub fn push_call(&mut self, procedure: Arc<Procedure>, return_address: usize) {
        let parent = self.activation.take();
        self.activation = Some(Activation::new(procedure, parent, return_address));
        self.ip = 0;
        self.call_depth += 1;
    }

    /// Return to the caller. Returns false when there is no call to return
    /// from, i.e. the agent's run is over.
    pub fn pop_call(&mut self) -> bool {
        if self.call_depth == 0 {
            return false;
        }
        let Some(frame) = self.activation.take() else {
            return false;
        };
        self.ip = frame.return_address();
        self.activation = frame.parent().cloned();
        self.call_depth -= 1;
        true
    }

    /// Owner of the job running this context
    pub fn owner(&self) -> &JobOwner {
        &self.owner
    }

    /// Current agent
    pub fn agent(&self) -> Option<AgentId> {
        self.agent
    }

    /// Current frame
    pub fn activation(&self) -> Option<&Arc<Activation>> {
        self.activation.as_ref()
    }

    /// Instruction pointer
    pub fn ip(&self) -> usize {
        self.ip
    }

    /// Move the instruction pointer
    pub fn set_ip(&mut self, ip: usize) {
        self.ip = ip;
    }

    /// Step past the current instruction
    pub fn advance(&mut self) {
        self.ip += 1;
    }

    /// Whether the current agent's run is over
    pub fn finished(&self) -> bool {
        self.finished
    }

    /// Mark the current agent's run as over
    pub fn finish(&mut self) {
        self.finished = true;
    }

    /// Calls made below the entry frame
    pub fn call_depth(&self) -> usize {
        self.call_depth
    }

    /// Runtime type tag
    pub fn agent_bit(&self) -> AgentBits {
        self.agent_bit
    }

    /// Name of the procedure currently executing
    pub fn procedure_name(&self) -> String {
        self.activation
            .as_ref()
            .map(|frame| frame.procedure().name.clone())
            .unwrap_or_else(|| "<none>".to_string())
    }

    /// Description of the current agent, e.g. `turtle 3`
    pub fn describe_agent(&self, world: &World) -> String {
        match self.agent {
            Some(id) => world.describe(id),
            None => "nobody".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vm::interpreter::BasicInterpreter;
    use crate::vm::procedure::{Expr, Instruction};
    use crate::world::AgentSet;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    fn owner() -> JobOwner {
        JobOwner::new("test")
    }

    #[test]
    fn test_reset_overwrites_per_agent_fields_only() {
        let mut world = World::new();
        let ids = world.create_turtles("turtles", 2);
        let first_frame = Activation::root(Procedure::command("a", vec![]), 0);
        let second_frame = Activation::root(Procedure::command("b", vec![]), 3);

        let mut context = Context::new(owner(), None, AgentBits::TURTLE);
        let owner_id = context.owner().id;
        context.reset(ids[0], first_frame, 0);
        context.set_ip(7);
        context.push_call(Procedure::command("c", vec![]), 8);
        context.finish();

        context.reset(ids[1], second_frame.clone(), 3);

        assert_eq!(context.agent(), Some(ids[1]));
        assert!(Arc::ptr_eq(context.activation().unwrap(), &second_frame));
        assert_eq!(context.ip(), 3);
        assert!(!context.finished());
        assert_eq!(context.call_depth(), 0);
        assert_eq!(context.agent_bit(), AgentBits::TURTLE);
        assert_eq!(context.owner().id, owner_id);
    }

    #[test]
    fn test_run_exclusive_finishes_at_end_of_body() {
        let mut world = World::new();
        let id = world.create_agent(crate::world::AgentKind::Turtle, "turtles");
        let mut random = SmallRng::seed_from_u64(0);
        let procedure = Procedure::command("noops", vec![Instruction::Noop, Instruction::Noop]);

        let mut context = Context::new(owner(), None, AgentBits::TURTLE);
        context.reset(id, Activation::root(procedure, 0), 0);
        let mut env = ExecEnv::new(&mut world, &mut random);
        context.run_exclusive(&BasicInterpreter, &mut env).unwrap();

        assert!(context.finished());
        assert_eq!(context.ip(), 2);

        context.release_agent();
        assert_eq!(context.agent(), None);
        assert_eq!(context.ip(), 2);
    }

    #[test]
    fn test_nested_call_returns_to_caller() {
        let mut world = World::new();
        let id = world.create_agent(crate::world::AgentKind::Turtle, "turtles");
        let mut random = SmallRng::seed_from_u64(0);
        let inner = Procedure::command(
            "inner",
            vec![Instruction::Print(Expr::Constant("inner".into())), Instruction::Return],
        );
        let outer = Procedure::command(
            "outer",
            vec![
                Instruction::Call(inner),
                Instruction::Print(Expr::Constant("outer".into())),
            ],
        );

        let root = Activation::root(outer, 0);
        let mut context = Context::new(owner(), None, AgentBits::TURTLE);
        context.reset(id, root.clone(), 0);
        let mut env = ExecEnv::new(&mut world, &mut random);
        context.run_exclusive(&BasicInterpreter, &mut env).unwrap();

        assert_eq!(world.output(), &["inner".to_string(), "outer".to_string()]);
        assert!(Arc::ptr_eq(context.activation().unwrap(), &root));
        assert_eq!(context.call_depth(), 0);
    }

    #[test]
    fn test_pop_call_at_entry_frame_ends_run() {
        let frame = Activation::root(Procedure::command("a", vec![]), 0);
        let mut context = Context::new(owner(), None, AgentBits::TURTLE);
        context.reset(AgentId::default(), frame.clone(), 0);

        assert!(!context.pop_call());
        assert!(Arc::ptr_eq(context.activation().unwrap(), &frame));
    }

    #[test]
    fn test_reporter_without_report_fails() {
        let mut world = World::new();
        let id = world.create_agent(crate::world::AgentKind::Turtle, "turtles");
        let mut random = SmallRng::seed_from_u64(0);
        let reporter = Procedure::reporter("silent", vec![Instruction::Noop]);

        let mut context = Context::new(owner(), Some(id), AgentBits::TURTLE);
        let mut env = ExecEnv::new(&mut world, &mut random);
        let err = context
            .call_reporter_procedure(Activation::root(reporter, 0), &BasicInterpreter, &mut env)
            .unwrap_err();

        assert_eq!(
            err,
            LogoError::NoReport {
                procedure: "silent".to_string()
            }
        );
    }

    #[test]
    fn test_reporter_returns_value() {
        let mut world = World::new();
        let id = world.create_agent(crate::world::AgentKind::Turtle, "turtles");
        world.create_turtles("turtles", 2);
        let mut random = SmallRng::seed_from_u64(0);
        let reporter = Procedure::reporter(
            "population",
            vec![Instruction::Report(Expr::Count(AgentSet::turtles()))],
        );

        let mut context = Context::new(owner(), Some(id), AgentBits::TURTLE);
        let mut env = ExecEnv::new(&mut world, &mut random);
        let value = context
            .call_reporter_procedure(Activation::root(reporter, 0), &BasicInterpreter, &mut env)
            .unwrap();

        assert_eq!(value, Value::Number(3.0));
        assert!(context.finished());
    }

    #[test]
    fn test_calling_a_reporter_as_command_fails() {
        let mut world = World::new();
        let id = world.create_agent(crate::world::AgentKind::Turtle, "turtles");
        let mut random = SmallRng::seed_from_u64(0);
        let inner = Procedure::reporter(
            "inner",
            vec![Instruction::Report(Expr::Constant(Value::Number(2.0)))],
        );
        let outer = Procedure::reporter(
            "outer",
            vec![
                Instruction::Call(inner),
                Instruction::Report(Expr::Constant(Value::Number(1.0))),
            ],
        );

        let mut context = Context::new(owner(), Some(id), AgentBits::TURTLE);
        let mut env = ExecEnv::new(&mut world, &mut random);
        let err = context
            .call_reporter_procedure(Activation::root(outer, 0), &BasicInterpreter, &mut env)
            .unwrap_err();

        assert_eq!(
            err,
            LogoError::ReporterAsCommand {
                procedure: "inner".to_string()
            }
        );
        assert_eq!(context.ip(), 0);
        assert_eq!(context.call_depth(), 0);
    }
}
