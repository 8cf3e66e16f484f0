//! Corral CLI - run exclusive jobs against a scratch world
//!
//! Builds a world of turtles, runs a small procedure over them as a single
//! exclusive job, and prints what happened.

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use corral::vm::{
    ExclusiveJob, Expr, Instruction, Job, JobOwner, Procedure, RandomSource, Workspace,
};
use corral::world::{AgentSet, World};
use corral::VmConfig;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "corral")]
#[command(about = "Exclusive-execution core for an agent-based simulation VM", long_about = None)]
struct Cli {
    /// JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a procedure over every turtle
    Run {
        /// Number of turtles to create
        #[arg(short, long, default_value = "5")]
        turtles: usize,

        /// Seed for the random source (overrides the config)
        #[arg(long)]
        seed: Option<u64>,

        /// Every visited turtle hatches a child
        #[arg(long)]
        hatch: bool,

        /// Every visited turtle kills the turtle with this who number
        #[arg(long)]
        kill_who: Option<u64>,
    },

    /// Evaluate `count turtles` as a reporter
    Report {
        /// Number of turtles to create
        #[arg(short, long, default_value = "5")]
        turtles: usize,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => VmConfig::load(path)
            .with_context(|| format!("Failed to load config from {:?}", path))?,
        None => VmConfig::default(),
    };

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_filter)),
        )
        .init();

    match cli.command {
        Commands::Run {
            turtles,
            seed,
            hatch,
            kill_who,
        } => {
            let mut code = vec![Instruction::Print(Expr::Who)];
            if hatch {
                code.push(Instruction::Hatch {
                    breed: "turtles".to_string(),
                });
            }
            if let Some(who) = kill_who {
                code.push(Instruction::KillWho(who));
            }
            let procedure = Procedure::command("go", code);

            let mut world = World::new();
            world.create_turtles("turtles", turtles);

            let random = match seed {
                Some(seed) => RandomSource::seeded(seed),
                None => RandomSource::from_config(&config),
            };
            let workspace = Workspace::new(world, Arc::new(corral::vm::BasicInterpreter), config);
            let mut job = ExclusiveJob::new(
                JobOwner::new("cli"),
                AgentSet::turtles(),
                procedure,
                0,
                None,
                workspace.clone(),
                random,
            );
            let summary = job.run()?;

            let world = workspace.lock_world();
            for line in world.output() {
                println!("visited turtle {}", line);
            }
            println!(
                "snapshot: {}  executed: {}  skipped: {}  turtles now: {}",
                summary.snapshot_size,
                summary.executed,
                summary.skipped,
                AgentSet::turtles().count(&world)
            );
        }

        Commands::Report { turtles } => {
            let procedure = Procedure::reporter(
                "population",
                vec![Instruction::Report(Expr::Count(AgentSet::turtles()))],
            );

            let mut world = World::new();
            world.create_turtles("turtles", turtles);
            let random = RandomSource::from_config(&config);
            let workspace = Workspace::new(world, Arc::new(corral::vm::BasicInterpreter), config);
            let job = ExclusiveJob::new(
                JobOwner::new("console"),
                AgentSet::turtles(),
                procedure,
                0,
                None,
                workspace.clone(),
                random,
            );

            let value = job.call_reporter_procedure()?;
            let world = workspace.lock_world();
            println!("{}", value.render(&world));
        }
    }

    Ok(())
}
