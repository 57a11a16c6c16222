//! Rollback command

use crate::commands::{open_store, GlobalArgs};
use clap::Args;
use fnroll_core::{PollPolicy, ResolveStrategy, RollbackOptions, RollbackSettings};
use fnroll_core_types::CallContext;
use fnroll_engine::{apply_engine_command, EngineCommand, EngineCommandResult};
use fnroll_store::FileFunctionLoader;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Args)]
pub struct RollbackArgs {
    /// Function definition file (JSON, or YAML by extension)
    #[arg(long, default_value = "function.json")]
    pub function: PathBuf,

    /// Report the transition without changing anything
    #[arg(long)]
    pub dry_run: bool,

    /// Delete the rolled back version once the alias has moved off it
    #[arg(long)]
    pub delete_version: bool,

    /// Interval between alias checks while waiting to delete
    #[arg(long, default_value_t = 1000)]
    pub poll_interval_ms: u64,

    /// Multiply the poll interval by this factor after each check
    #[arg(long, default_value_t = 1.0)]
    pub poll_backoff: f32,

    /// Upper bound for the poll interval when backing off
    #[arg(long, default_value_t = 30_000)]
    pub max_poll_interval_ms: u64,

    /// Give up waiting to delete after this many alias checks
    #[arg(long)]
    pub max_poll_attempts: Option<u32>,

    /// How to find the previous version: scan or listing
    #[arg(long, default_value = "scan", value_parser = parse_strategy)]
    pub strategy: ResolveStrategy,

    /// Abandon the whole rollback after this many seconds
    #[arg(long)]
    pub timeout_secs: Option<u64>,
}

fn parse_strategy(s: &str) -> Result<ResolveStrategy, String> {
    ResolveStrategy::parse(s).ok_or_else(|| format!("unknown strategy {:?} (scan, listing)", s))
}

pub fn execute(args: RollbackArgs, global: &GlobalArgs) -> Result<(), Box<dyn std::error::Error>> {
    let store = open_store(global)?;
    let loader = FileFunctionLoader::new();

    let mut ctx = CallContext::new();
    if let Some(secs) = args.timeout_secs {
        ctx = ctx.with_timeout(Duration::from_secs(secs));
    }

    let mut poll = PollPolicy::fixed(Duration::from_millis(args.poll_interval_ms)).with_backoff(
        args.poll_backoff,
        Duration::from_millis(args.max_poll_interval_ms),
    );
    if let Some(max) = args.max_poll_attempts {
        poll = poll.with_max_attempts(max);
    }

    let cmd = EngineCommand::Rollback {
        options: RollbackOptions {
            function_file: args.function,
            dry_run: args.dry_run,
            delete_version: args.delete_version,
        },
        settings: RollbackSettings {
            poll,
            strategy: args.strategy,
        },
    };

    match apply_engine_command(cmd, &store, &loader, &ctx)? {
        EngineCommandResult::Rollback(outcome) => {
            println!("{}", outcome);
            if let Some(deleted) = outcome.deleted_version {
                println!("deleted version {}", deleted);
            }
            Ok(())
        }
        other => Err(format!("unexpected engine result: {:?}", other).into()),
    }
}
