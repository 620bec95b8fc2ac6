//! Command-line and environment configuration.

use clap::{Parser, ValueEnum};
use contacts_core::UpdateUniqueness;
use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "contacts-server")]
#[command(about = "HTTP service for the contact directory")]
pub struct Args {
    /// SQLite database file; created and migrated on first start.
    #[arg(long, env = "CONTACTS_DB", default_value = "./contacts.sqlite3")]
    pub db: PathBuf,
    #[arg(long, env = "CONTACTS_BIND", default_value = "127.0.0.1:5000")]
    pub bind: SocketAddr,
    /// trace|debug|info|warn|error. Defaults by build mode.
    #[arg(long, env = "CONTACTS_LOG_LEVEL")]
    pub log_level: Option<String>,
    /// Absolute directory for rotating log files. Logs go to stderr when unset.
    #[arg(long, env = "CONTACTS_LOG_DIR")]
    pub log_dir: Option<String>,
    /// Which value update uniqueness checks inspect.
    #[arg(
        long,
        env = "CONTACTS_UPDATE_UNIQUENESS",
        value_enum,
        default_value_t = UpdateUniquenessArg::Candidate
    )]
    pub update_uniqueness: UpdateUniquenessArg,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum UpdateUniquenessArg {
    /// Check the incoming value against other contacts.
    Candidate,
    /// Legacy: check the target's currently stored value.
    Stored,
}

impl From<UpdateUniquenessArg> for UpdateUniqueness {
    fn from(value: UpdateUniquenessArg) -> Self {
        match value {
            UpdateUniquenessArg::Candidate => Self::Candidate,
            UpdateUniquenessArg::Stored => Self::Stored,
        }
    }
}
