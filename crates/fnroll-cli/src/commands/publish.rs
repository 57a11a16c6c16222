//! Publish command

use crate::commands::{open_store, GlobalArgs};
use clap::Args;
use fnroll_core::CURRENT_ALIAS_NAME;
use fnroll_core_types::CallContext;
use fnroll_engine::{apply_engine_command, EngineCommand, EngineCommandResult};
use fnroll_store::FileFunctionLoader;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct PublishArgs {
    /// Function definition file (JSON, or YAML by extension)
    #[arg(long, default_value = "function.json")]
    pub function: PathBuf,

    /// Leave the current alias where it is
    #[arg(long)]
    pub no_alias: bool,
}

pub fn execute(args: PublishArgs, global: &GlobalArgs) -> Result<(), Box<dyn std::error::Error>> {
    let store = open_store(global)?;
    let loader = FileFunctionLoader::new();
    let ctx = CallContext::new();

    let cmd = EngineCommand::Publish {
        function_file: args.function,
        point_alias: !args.no_alias,
    };
    match apply_engine_command(cmd, &store, &loader, &ctx)? {
        EngineCommandResult::Published(r) => {
            println!(
                "published function {} version {}",
                r.published.function_name, r.published.version
            );
            if r.aliased {
                println!("alias {} -> {}", CURRENT_ALIAS_NAME, r.published.version);
            }
            Ok(())
        }
        other => Err(format!("unexpected engine result: {:?}", other).into()),
    }
}
