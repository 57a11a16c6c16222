//! Alias commands

use crate::commands::{open_store, GlobalArgs};
use clap::{Args, Subcommand};
use fnroll_core::{Version, CURRENT_ALIAS_NAME};
use fnroll_core_types::CallContext;
use fnroll_engine::{apply_engine_command, EngineCommand, EngineCommandResult};
use fnroll_store::FileFunctionLoader;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct AliasArgs {
    #[command(subcommand)]
    pub command: AliasCommand,
}

#[derive(Debug, Subcommand)]
pub enum AliasCommand {
    /// Point an alias at a published version
    Set(SetArgs),
}

#[derive(Debug, Args)]
pub struct SetArgs {
    /// Version to point the alias at
    #[arg(long, value_parser = parse_version)]
    pub version: Version,

    #[arg(long, default_value = CURRENT_ALIAS_NAME)]
    pub alias: String,

    /// Function definition file (JSON, or YAML by extension)
    #[arg(long, default_value = "function.json")]
    pub function: PathBuf,
}

fn parse_version(s: &str) -> Result<Version, String> {
    Version::parse(s).map_err(|e| e.to_string())
}

pub fn execute(args: AliasArgs, global: &GlobalArgs) -> Result<(), Box<dyn std::error::Error>> {
    match args.command {
        AliasCommand::Set(set_args) => execute_set(set_args, global),
    }
}

fn execute_set(args: SetArgs, global: &GlobalArgs) -> Result<(), Box<dyn std::error::Error>> {
    let store = open_store(global)?;
    let loader = FileFunctionLoader::new();
    let ctx = CallContext::new();

    let cmd = EngineCommand::SetAlias {
        function_file: args.function,
        alias: args.alias,
        version: args.version,
    };
    match apply_engine_command(cmd, &store, &loader, &ctx)? {
        EngineCommandResult::AliasSet(r) => {
            match r.previous {
                Some(previous) => println!(
                    "alias {} of function {}: {} -> {}",
                    r.alias, r.function_name, previous, r.version
                ),
                None => println!(
                    "alias {} of function {} created at {}",
                    r.alias, r.function_name, r.version
                ),
            }
            Ok(())
        }
        other => Err(format!("unexpected engine result: {:?}", other).into()),
    }
}
