//! Subcommands and the options they share

use clap::{Args, ValueEnum};
use fnroll_store::SqliteVersionStore;
use std::path::Path;

pub mod alias;
pub mod publish;
pub mod rollback;
pub mod versions;

/// Log output format on stderr
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Args)]
pub struct GlobalArgs {
    /// Local version store database
    #[arg(long, global = true, env = "FNROLL_DB", default_value = ".fnroll/store.db")]
    pub db: String,

    #[arg(
        long,
        global = true,
        env = "FNROLL_LOG_FORMAT",
        value_enum,
        default_value_t = LogFormat::Text
    )]
    pub log_format: LogFormat,

    /// Serve the previous alias target for this many reads after each alias update
    #[arg(long, global = true, env = "FNROLL_ALIAS_LAG_READS", default_value_t = 0, hide = true)]
    pub alias_lag_reads: u32,
}

/// Open (creating if needed) the store named by `--db`
pub fn open_store(global: &GlobalArgs) -> Result<SqliteVersionStore, Box<dyn std::error::Error>> {
    let db = Path::new(&global.db);
    if let Some(parent) = db.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    tracing::debug!(db = %db.display(), "opening version store");
    Ok(SqliteVersionStore::open(db)?.with_alias_lag(global.alias_lag_reads))
}
