//! passage CLI - Cognito to Firebase user migration
//!
//! This CLI enables operators to:
//! - Migrate a Cognito user export into Firebase Auth and Firestore
//! - Reverse a migration by deleting identity entries, documents, or both

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;
mod error;
mod export;
mod logging;
mod progress;

use error::CliResult;

/// passage CLI - Cognito to Firebase user migration
#[derive(Parser)]
#[command(name = "passage")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable debug-level log output
    #[arg(long, global = true)]
    verbose: bool,

    /// Also write log output to this file
    #[arg(long, global = true, value_name = "PATH")]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Migrate a Cognito user export into Firebase Auth and Firestore
    Migrate(commands::migrate::MigrateArgs),

    /// Delete migrated users from Firebase Auth, Firestore, or both
    Delete(commands::delete::DeleteArgs),
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // The guard flushes the log file writer when main returns.
    let _guard = match logging::init(cli.verbose, cli.log_file.as_deref()) {
        Ok(guard) => guard,
        Err(e) => {
            e.print();
            std::process::exit(e.exit_code());
        }
    };

    match run(cli).await {
        Ok(()) => std::process::exit(0),
        Err(e) => {
            e.print();
            std::process::exit(e.exit_code());
        }
    }
}

async fn run(cli: Cli) -> CliResult<()> {
    match cli.command {
        Commands::Migrate(args) => commands::migrate::execute(args).await,
        Commands::Delete(args) => commands::delete::execute(args).await,
    }
}
