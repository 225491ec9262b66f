//! CLI Argument Parsing
//!
//! CLIの引数解析

use clap::{Parser, Subcommand};

/// JSON マニフェストから Azure Data Factory のリソースを管理するCLI
#[derive(Parser, Debug, Clone)]
#[command(name = "adf-provider")]
#[command(about = "Manage Azure Data Factory resources from JSON manifests", long_about = None)]
pub struct Args {
    /// Provider config file path
    #[arg(short, long, global = true, default_value = "./adf-provider.json")]
    pub config: String,

    /// State file path
    #[arg(short, long, global = true, default_value = "./adf-provider.state.json")]
    pub state: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Print resource schemas as JSON
    Schema {
        /// Only print this resource type
        #[arg(long)]
        resource: Option<String>,
    },
    /// Validate manifests without calling the API
    Validate {
        #[arg(short, long, default_value = ".")]
        dir: String,
    },
    /// Show the changes apply would make
    Plan {
        #[arg(short, long, default_value = ".")]
        dir: String,
    },
    /// Create, update and delete resources to match the manifests
    Apply {
        #[arg(short, long, default_value = ".")]
        dir: String,

        /// Only print the plan
        #[arg(long)]
        dry_run: bool,
    },
    /// Re-read every recorded resource from the API
    Refresh,
    /// Delete every recorded resource
    Destroy {
        #[arg(long)]
        dry_run: bool,
    },
}

impl Command {
    /// Whether the command needs Azure credentials
    pub fn requires_api(&self) -> bool {
        match self {
            Command::Schema { .. } | Command::Validate { .. } | Command::Plan { .. } => false,
            Command::Apply { dry_run, .. } | Command::Destroy { dry_run } => !dry_run,
            Command::Refresh => true,
        }
    }
}
