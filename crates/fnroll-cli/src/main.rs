//! fnroll CLI
//!
//! Command-line interface for rolling function aliases back

use clap::{Parser, Subcommand};
use fnroll_core::logging_facility::{init, Profile};

mod commands;

#[derive(Debug, Parser)]
#[command(name = "fnroll")]
#[command(about = "fnroll - Roll function aliases back to the previous version", long_about = None)]
struct Cli {
    #[command(flatten)]
    global: commands::GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Point the current alias at the previous existing version
    Rollback(commands::rollback::RollbackArgs),
    /// List published versions
    Versions(commands::versions::VersionsArgs),
    /// Publish the function definition as a new version
    Publish(commands::publish::PublishArgs),
    /// Alias operations
    Alias(commands::alias::AliasArgs),
}

fn main() {
    let cli = Cli::parse();

    init(match cli.global.log_format {
        commands::LogFormat::Text => Profile::Development,
        commands::LogFormat::Json => Profile::Production,
    });

    let result = match cli.command {
        Commands::Rollback(args) => commands::rollback::execute(args, &cli.global),
        Commands::Versions(args) => commands::versions::execute(args, &cli.global),
        Commands::Publish(args) => commands::publish::execute(args, &cli.global),
        Commands::Alias(args) => commands::alias::execute(args, &cli.global),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
