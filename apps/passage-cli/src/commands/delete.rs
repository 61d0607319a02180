//! Delete command: reverse a migration from either or both target stores

use clap::{Args, ValueEnum};
use dialoguer::{Confirm, Input};
use serde::Serialize;

use passage_core::{
    DeletionAction, DeletionEngine, DeletionKey, DeletionMode, DeletionOutcome, DeletionRequest,
};

use crate::commands::FirebaseArgs;
use crate::error::{CliError, CliResult};

/// Arguments for the delete command
#[derive(Args, Debug)]
#[command(group(
    clap::ArgGroup::new("key")
        .required(true)
        .args(["uid", "email", "all"])
))]
pub struct DeleteArgs {
    /// Firebase UID of the user to delete
    #[arg(long)]
    pub uid: Option<String>,

    /// Email of the user to delete, resolved to a UID first
    #[arg(long)]
    pub email: Option<String>,

    /// Delete every migrated user
    #[arg(long)]
    pub all: bool,

    /// Which stores to delete from
    #[arg(long, value_enum, default_value_t = Target::Both)]
    pub target: Target,

    /// Skip the confirmation prompt
    #[arg(long)]
    pub force: bool,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,

    #[command(flatten)]
    pub firebase: FirebaseArgs,
}

/// Deletion target selection
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Target {
    /// Firebase Auth entry and Firestore document
    Both,
    /// Firebase Auth entry only
    Identity,
    /// Firestore document only
    Document,
}

impl Target {
    fn mode(self) -> DeletionMode {
        match self {
            Target::Both => DeletionMode::IdentityAndDocument,
            Target::Identity => DeletionMode::IdentityOnly,
            Target::Document => DeletionMode::DocumentOnly,
        }
    }
}

/// Aggregate counts over a deletion sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DeletionSummary {
    pub processed: usize,
    pub deleted: usize,
    pub not_found: usize,
    pub failed: usize,
}

impl DeletionSummary {
    fn tally(outcomes: &[DeletionOutcome]) -> Self {
        let mut summary = Self {
            processed: outcomes.len(),
            ..Self::default()
        };
        for outcome in outcomes {
            match outcome.action {
                DeletionAction::Deleted => summary.deleted += 1,
                DeletionAction::NotFound => summary.not_found += 1,
                DeletionAction::Failed => summary.failed += 1,
            }
        }
        summary
    }
}

/// Execute delete command
pub async fn execute(args: DeleteArgs) -> CliResult<()> {
    let (auth, firestore) = args.firebase.clients()?;
    let engine = DeletionEngine::new(auth, firestore);
    let mode = args.target.mode();

    if args.all {
        if !confirm_delete_all(&args)? {
            println!("Cancelled.");
            return Ok(());
        }

        let outcomes = engine.delete_all(mode).await?;
        let summary = DeletionSummary::tally(&outcomes);
        if args.json {
            let report = serde_json::json!({
                "outcomes": outcomes,
                "summary": summary,
            });
            println!("{}", serde_json::to_string_pretty(&report)?);
        } else {
            print_summary(&summary, &outcomes);
        }
        return Ok(());
    }

    let key = match (&args.uid, &args.email) {
        (Some(uid), _) => DeletionKey::TargetUid(uid.clone()),
        (_, Some(email)) => DeletionKey::Email(email.clone()),
        _ => unreachable!("clap enforces the key group"),
    };

    if !confirm_single(&args, &key)? {
        println!("Cancelled.");
        return Ok(());
    }

    let outcome = engine.delete(&DeletionRequest { key, mode }).await;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        match &outcome.reason {
            Some(reason) => println!("{}: {} ({})", outcome.key, outcome.action, reason),
            None => println!("{}: {}", outcome.key, outcome.action),
        }
    }
    Ok(())
}

/// Confirm a single deletion unless --force is used.
fn confirm_single(args: &DeleteArgs, key: &DeletionKey) -> CliResult<bool> {
    if args.force {
        return Ok(true);
    }
    require_interactive()?;

    let confirm = Confirm::new()
        .with_prompt(format!(
            "Delete '{key}' from {}? This action cannot be undone.",
            target_label(args.target)
        ))
        .default(false)
        .interact()?;
    Ok(confirm)
}

/// Require the project id to be typed back before a full sweep.
fn confirm_delete_all(args: &DeleteArgs) -> CliResult<bool> {
    if args.force {
        return Ok(true);
    }
    require_interactive()?;

    println!(
        "This will delete every migrated user from {} in project '{}'.",
        target_label(args.target),
        args.firebase.project_id
    );
    let typed: String = Input::new()
        .with_prompt("Type the project id to confirm")
        .interact_text()?;
    if typed != args.firebase.project_id {
        println!("Project id did not match; nothing deleted.");
        return Ok(false);
    }
    Ok(true)
}

fn require_interactive() -> CliResult<()> {
    if !atty::is(atty::Stream::Stdin) {
        return Err(CliError::Validation(
            "Cannot confirm deletion in non-interactive mode. Use --force to skip confirmation."
                .to_string(),
        ));
    }
    Ok(())
}

fn target_label(target: Target) -> &'static str {
    match target {
        Target::Both => "Firebase Auth and Firestore",
        Target::Identity => "Firebase Auth",
        Target::Document => "Firestore",
    }
}

fn print_summary(summary: &DeletionSummary, outcomes: &[DeletionOutcome]) {
    println!("Deletion complete: {} processed", summary.processed);
    println!("  deleted:   {}", summary.deleted);
    println!("  not found: {}", summary.not_found);
    println!("  failed:    {}", summary.failed);

    let failures: Vec<&DeletionOutcome> = outcomes
        .iter()
        .filter(|o| o.action == DeletionAction::Failed)
        .collect();
    if !failures.is_empty() {
        println!("\nFollow-up required:");
        for outcome in failures {
            println!(
                "  {}  {}",
                outcome.key,
                outcome.reason.as_deref().unwrap_or("")
            );
        }
    }
}
