//! Versions listing command

use crate::commands::{open_store, GlobalArgs};
use clap::Args;
use fnroll_core_types::CallContext;
use fnroll_engine::{apply_engine_command, EngineCommand, EngineCommandResult};
use fnroll_store::FileFunctionLoader;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct VersionsArgs {
    /// Function definition file (JSON, or YAML by extension)
    #[arg(long, default_value = "function.json")]
    pub function: PathBuf,

    /// Print the listing as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn execute(args: VersionsArgs, global: &GlobalArgs) -> Result<(), Box<dyn std::error::Error>> {
    let store = open_store(global)?;
    let loader = FileFunctionLoader::new();
    let ctx = CallContext::new();

    let cmd = EngineCommand::ListVersions {
        function_file: args.function,
    };
    let listing = match apply_engine_command(cmd, &store, &loader, &ctx)? {
        EngineCommandResult::Versions(listing) => listing,
        other => return Err(format!("unexpected engine result: {:?}", other).into()),
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&listing)?);
        return Ok(());
    }

    if listing.versions.is_empty() {
        println!("no published versions of function {}", listing.function_name);
        return Ok(());
    }
    for entry in &listing.versions {
        let marker = if entry.current { "*" } else { " " };
        let published = entry
            .last_modified
            .map(|t| t.to_rfc3339())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{} {:>4}  {}  {}",
            marker,
            entry.version.to_string(),
            published,
            entry.description.as_deref().unwrap_or("")
        );
    }
    Ok(())
}
