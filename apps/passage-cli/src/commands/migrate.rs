//! Migrate command: Cognito export -> Firebase Auth + Firestore

use std::path::PathBuf;

use clap::Args;
use tracing::info;

use passage_core::{
    MigrateOptions, MigrationAction, MigrationEngine, MigrationOutcome, OutcomeLog,
};

use crate::commands::FirebaseArgs;
use crate::error::CliResult;
use crate::export;
use crate::progress::BatchProgress;

/// Arguments for the migrate command
#[derive(Args, Debug)]
pub struct MigrateArgs {
    /// Path to the Cognito user export JSON file
    #[arg(long, value_name = "FILE")]
    pub export: PathBuf,

    /// Skip records whose UserStatus is not CONFIRMED
    #[arg(long)]
    pub only_confirmed: bool,

    /// Initial password assigned to newly created Firebase users
    #[arg(long, default_value = "Default@123")]
    pub initial_password: String,

    /// Output the outcome log as JSON
    #[arg(long)]
    pub json: bool,

    #[command(flatten)]
    pub firebase: FirebaseArgs,
}

/// Execute migrate command
pub async fn execute(args: MigrateArgs) -> CliResult<()> {
    let export = export::load(&args.export)?;
    info!(
        path = %args.export.display(),
        users = export.users.len(),
        "export loaded"
    );

    let (auth, firestore) = args.firebase.clients()?;
    let engine = MigrationEngine::new(
        auth,
        firestore,
        MigrateOptions {
            initial_password: args.initial_password,
            only_confirmed: args.only_confirmed,
            ..MigrateOptions::default()
        },
    );

    let progress = (!args.json)
        .then(|| BatchProgress::new(export.users.len() as u64, "Migrating users..."));

    let mut log = OutcomeLog::new();
    for record in &export.users {
        log.append(engine.migrate_record(record).await);
        if let Some(progress) = &progress {
            progress.inc();
        }
    }
    if let Some(progress) = &progress {
        progress.finish_and_clear();
    }

    if args.json {
        let report = serde_json::json!({
            "outcomes": log.iter().collect::<Vec<_>>(),
            "summary": log.summary(),
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_summary(&log);
    }

    Ok(())
}

fn print_summary(log: &OutcomeLog) {
    let summary = log.summary();
    println!("Migration complete: {} processed", summary.processed);
    println!("  created: {}", summary.created);
    println!("  updated: {}", summary.updated);
    println!("  skipped: {}", summary.skipped);
    println!("  failed:  {}", summary.failed);

    let follow_up: Vec<&MigrationOutcome> = log
        .iter()
        .filter(|o| matches!(o.action, MigrationAction::Skipped | MigrationAction::Failed))
        .collect();
    if !follow_up.is_empty() {
        println!("\nFollow-up required:");
        for outcome in follow_up {
            println!(
                "  {}  {}  {}",
                outcome.source_id,
                outcome.action,
                outcome.reason.as_deref().unwrap_or("")
            );
        }
    }
}
