//! Implementation of the `reclaim delete` command.

use super::prompt::StdinConfirmer;
use crate::cli::DeleteArgs;
use reclaim::confirm::{CANCELLED_MESSAGE, ConfirmationSession, NOTHING_TO_DELETE, format_size};
use reclaim::context::ReclaimContext;
use reclaim::delete::{DeletionOptions, DeletionResult};
use reclaim::error::{ReclaimError, Result};
use std::io::IsTerminal;

pub async fn cmd_delete(ctx: &ReclaimContext, args: DeleteArgs) -> Result<()> {
    let options = options_from_args(&args);
    if options.interactive && !std::io::stdin().is_terminal() {
        return Err(ReclaimError::UserError(
            "stdin is not a terminal; pass --yes to delete without confirmation".to_string(),
        ));
    }
    let deleter = ctx.deleter()?;

    let mut session = ConfirmationSession::new();
    let confirmer = StdinConfirmer;
    let result = deleter
        .safe_delete_with_confirmation(&args.paths, options, &mut session, Some(&confirmer))
        .await;

    print_result(&result);
    outcome(&result)
}

/// `--yes`, `--force` and `--dry-run` never prompt.
pub fn options_from_args(args: &DeleteArgs) -> DeletionOptions {
    DeletionOptions {
        dry_run: args.dry_run,
        use_trash: !args.no_trash,
        skip_confirmation: args.force,
        retain_in_quarantine: args.quarantine,
        interactive: !args.yes && !args.force && !args.dry_run,
    }
}

fn print_result(result: &DeletionResult) {
    for warning in &result.warnings {
        eprintln!("warning: {}", warning);
    }

    if result.dry_run {
        println!(
            "Dry run: would move {} item(s), {} total, to {}.",
            result.processed_paths.len(),
            format_size(result.total_size),
            result.method
        );
        for path in &result.processed_paths {
            println!("  - {}", path.display());
        }
        return;
    }

    if !result.processed_paths.is_empty() {
        println!(
            "Moved {} item(s), {} total, to {}.",
            result.processed_paths.len(),
            format_size(result.total_size),
            result.method
        );
        for path in &result.processed_paths {
            println!("  - {}", path.display());
        }
    }
    if !result.quarantine_ids.is_empty() {
        println!("Quarantine ids (restore with `reclaim restore <id>`):");
        for id in &result.quarantine_ids {
            println!("  {}", id);
        }
    }
    if !result.failed_paths.is_empty() {
        println!("Not deleted:");
        for path in &result.failed_paths {
            println!("  - {}", path.display());
        }
    }
}

/// Map a deletion result onto the process outcome.
fn outcome(result: &DeletionResult) -> Result<()> {
    if result.success {
        return Ok(());
    }
    if result.errors.iter().any(|e| e == CANCELLED_MESSAGE) {
        return Err(ReclaimError::Cancelled);
    }
    if result.blocked {
        return Err(ReclaimError::ValidationError(result.errors.join("; ")));
    }
    if result.errors.iter().any(|e| e == NOTHING_TO_DELETE) {
        return Err(ReclaimError::UserError(NOTHING_TO_DELETE.to_string()));
    }
    Err(ReclaimError::DeletionFailed(if result.errors.is_empty() {
        "nothing was deleted".to_string()
    } else {
        result.errors.join("; ")
    }))
}
