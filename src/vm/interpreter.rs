use rand::Rng;
use rand::rngs::SmallRng;
use tracing::trace;

use super::context::Context;
use super::error::{LogoError, LogoResult};
use super::procedure::{Expr, Instruction, ProcedureKind};
use super::value::Value;
use crate::world::{AgentBits, AgentKind, World};

/// Outcome of a single interpreter step
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// More work remains for the current agent
    Continue,
    /// The current agent's run is over
    Finished,
    /// A reporter produced its value
    Report(Value),
}

/// What executing code may touch while one agent runs.
pub struct ExecEnv<'a> {
    /// The world, locked for the whole job
    pub world: &'a mut World,
    /// The job's random source
    pub random: &'a mut SmallRng,
}

impl<'a> ExecEnv<'a> {
    /// Borrow a world and random source for execution
    pub fn new(world: &'a mut World, random: &'a mut SmallRng) -> Self {
        Self { world, random }
    }
}

/// Instruction interpreter driving a [`Context`] forward.
pub trait Interpreter: Send + Sync {
    /// Execute one or more instructions for the context's current agent
    fn step(&self, context: &mut Context, env: &mut ExecEnv<'_>) -> LogoResult<Step>;
}

/// Interpreter for the reference bytecode in [`procedure`](super::procedure).
#[derive(Debug, Clone, Copy, Default)]
pub struct BasicInterpreter;

impl Interpreter for BasicInterpreter {
    fn step(&self, context: &mut Context, env: &mut ExecEnv<'_>) -> LogoResult<Step> {
        let activation = context
            .activation()
            .cloned()
            .ok_or(LogoError::NoActivation)?;
        let procedure = activation.procedure();
        if !context.agent_bit().intersects(procedure.usable_by) {
            return Err(wrong_kind(&procedure.name, context.agent_bit()));
        }

        let ip = context.ip();
        let Some(instruction) = procedure.code.get(ip) else {
            if ip != procedure.code.len() {
                return Err(LogoError::InvalidAddress {
                    procedure: procedure.name.clone(),
                    ip,
                });
            }
            // Falling off the end behaves like an implicit return
            return Ok(if context.pop_call() {
                Step::Continue
            } else {
                Step::Finished
            });
        };
        trace!(procedure = %procedure.name, ip, op = instruction.mnemonic(), "step");

        match instruction {
            Instruction::Noop => {
                context.advance();
                Ok(Step::Continue)
            }
            Instruction::Print(expr) => {
                let value = eval(expr, context, env)?;
                let line = value.render(env.world);
                env.world.push_output(line);
                context.advance();
                Ok(Step::Continue)
            }
            Instruction::Set { var, value } => {
                let value = eval(value, context, env)?;
                let id = context.agent().ok_or(LogoError::NoAgent)?;
                let agent = env
                    .world
                    .get_mut(id)
                    .ok_or_else(|| LogoError::DeadAgent(kind_name(context.agent_bit())))?;
                agent.vars.insert(var.clone(), value);
                context.advance();
                Ok(Step::Continue)
            }
            Instruction::Hatch { breed } => {
                if !context.agent_bit().intersects(AgentBits::TURTLE) {
                    return Err(wrong_kind("hatch", context.agent_bit()));
                }
                let id = context.agent().ok_or(LogoError::NoAgent)?;
                let vars = env
                    .world
                    .get(id)
                    .map(|agent| agent.vars.clone())
                    .ok_or_else(|| LogoError::DeadAgent(kind_name(context.agent_bit())))?;
                let child = env.world.create_agent(AgentKind::Turtle, breed);
                if let Some(agent) = env.world.get_mut(child) {
                    agent.vars = vars;
                }
                context.advance();
                Ok(Step::Continue)
            }
            Instruction::Die => {
                let id = context.agent().ok_or(LogoError::NoAgent)?;
                env.world.kill(id);
                Ok(Step::Finished)
            }
            Instruction::KillWho(who) => {
                context.advance();
                match env.world.find_by_who(*who) {
                    Some(target) => {
                        env.world.kill(target);
                        if context.agent() == Some(target) {
                            return Ok(Step::Finished);
                        }
                        Ok(Step::Continue)
                    }
                    None => Ok(Step::Continue),
                }
            }
            Instruction::Call(callee) => {
                if callee.kind != ProcedureKind::Command {
                    return Err(LogoError::ReporterAsCommand {
                        procedure: callee.name.clone(),
                    });
                }
                context.push_call(callee.clone(), ip + 1);
                Ok(Step::Continue)
            }
            Instruction::Return => Ok(if context.pop_call() {
                Step::Continue
            } else {
                Step::Finished
            }),
            Instruction::Done => Ok(Step::Finished),
            Instruction::Report(expr) => {
                if procedure.kind != ProcedureKind::Reporter {
                    return Err(LogoError::ReportOutsideReporter);
                }
                Ok(Step::Report(eval(expr, context, env)?))
            }
            Instruction::Fail(message) => Err(LogoError::Runtime(message.clone())),
        }
    }
}

fn eval(expr: &Expr, context: &Context, env: &mut ExecEnv<'_>) -> LogoResult<Value> {
    match expr {
        Expr::Constant(value) => Ok(value.clone()),
        Expr::Own(var) => {
            let id = context.agent().ok_or(LogoError::NoAgent)?;
            let agent = env
                .world
                .get(id)
                .ok_or_else(|| LogoError::DeadAgent(kind_name(context.agent_bit())))?;
            agent.vars.get(var).cloned().ok_or_else(|| {
                LogoError::Runtime(format!(
                    "{} does not own variable {}",
                    env.world.describe(id),
                    var
                ))
            })
        }
        Expr::Who => {
            let id = context.agent().ok_or(LogoError::NoAgent)?;
            env.world
                .get(id)
                .map(|agent| Value::Number(agent.who as f64))
                .ok_or_else(|| LogoError::DeadAgent(kind_name(context.agent_bit())))
        }
        Expr::RandomInt(bound) => {
            if *bound == 0 {
                return Ok(Value::Number(0.0));
            }
            Ok(Value::Number(env.random.random_range(0..*bound) as f64))
        }
        Expr::Count(set) => Ok(Value::Number(set.count(env.world) as f64)),
    }
}

fn kind_name(bits: AgentBits) -> String {
    [
        AgentKind::Observer,
        AgentKind::Turtle,
        AgentKind::Patch,
        AgentKind::Link,
    ]
    .into_iter()
    .filter(|kind| bits.contains(kind.bit()))
    .map(AgentKind::name)
    .collect::<Vec<_>>()
    .join("/")
}

fn wrong_kind(primitive: &str, bits: AgentBits) -> LogoError {
    LogoError::WrongAgentKind {
        primitive: primitive.to_string(),
        kind: kind_name(bits),
    }
}
