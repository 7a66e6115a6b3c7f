//! Command-line arguments

use std::path::PathBuf;

use bench_core::config::{DEFAULT_CONFIG_FILE, DEFAULT_SECTION};
use clap::{Parser, Subcommand};

use crate::benchmark::{Workload, DEFAULT_COMMAND, DEFAULT_ITERATIONS};
use crate::modes::Mode;

/// Compare pooled and per-call MySQL connections
#[derive(Parser, Debug)]
#[command(name = "connbench", version, about)]
pub struct Cli {
    /// INI file holding the connection parameters
    #[arg(long, global = true, env = "CONNBENCH_CONFIG", default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// Section of the INI file to read
    #[arg(long, global = true, default_value = DEFAULT_SECTION)]
    pub section: String,

    /// Workload units to run; each unit issues two calls
    #[arg(long, short = 'n', global = true, default_value_t = DEFAULT_ITERATIONS)]
    pub iterations: usize,

    /// Command issued by every call
    #[arg(long = "command", global = true, default_value = DEFAULT_COMMAND)]
    pub sql: String,

    /// Print the report as JSON instead of the plain summary
    #[arg(long, global = true)]
    pub json: bool,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,

    #[command(subcommand)]
    pub mode: ModeCommand,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum ModeCommand {
    /// Reuse connections from a bounded pool
    Pooled {
        /// Pool size, overriding max_size from the config file
        #[arg(long)]
        max_size: Option<usize>,
    },
    /// Open and close a connection for every call
    Unpooled,
}

impl Cli {
    pub fn mode(&self) -> Mode {
        match self.mode {
            ModeCommand::Pooled { .. } => Mode::Pooled,
            ModeCommand::Unpooled => Mode::Unpooled,
        }
    }

    pub fn max_size(&self) -> Option<usize> {
        match self.mode {
            ModeCommand::Pooled { max_size } => max_size,
            ModeCommand::Unpooled => None,
        }
    }

    pub fn workload(&self) -> Workload {
        Workload::new(self.iterations).command(self.sql.clone())
    }
}
