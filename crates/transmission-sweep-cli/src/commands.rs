use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "transmission-sweep")]
#[command(about = "Reconcile a Transmission daemon with its on-disk artifacts", long_about = None)]
pub struct Cli {
    /// Daemon host (wins over environment and config file)
    #[arg(long, global = true)]
    pub host: Option<String>,

    /// Daemon RPC port, 1-65535
    #[arg(long, global = true)]
    pub port: Option<u16>,

    /// Report actions without touching anything
    #[arg(long, global = true)]
    pub dry_run: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Remove incomplete payload entries that no live task claims
    CleanupIncompletedir {
        /// Incomplete-downloads directory
        #[arg(long)]
        dir: Option<String>,
    },
    /// Remove descriptor files that no live task claims
    CleanupTorrentsdir {
        /// Descriptor directory
        #[arg(long)]
        dir: Option<String>,
    },
    /// Remove finished tasks from the daemon's task list
    RemoveFinished {
        /// Also delete the downloaded payload data
        #[arg(long)]
        delete_data: bool,
    },
    /// Print resolved configuration values
    PrintConfig,
}
