//! Implementations of the quarantine commands: `list`, `restore`,
//! `cleanup` and `clear`.

use crate::cli::{CleanupArgs, ClearArgs, ListArgs, RestoreArgs};
use reclaim::confirm::format_size;
use reclaim::context::ReclaimContext;
use reclaim::error::{ReclaimError, Result};
use reclaim::quarantine::{QuarantineEntry, RestoreOutcome};

pub async fn cmd_list(ctx: &ReclaimContext, args: ListArgs) -> Result<()> {
    let entries = ctx.store().list_quarantine().await;

    if args.json {
        let json = serde_json::to_string_pretty(&entries)
            .map_err(|e| ReclaimError::UserError(format!("failed to encode entries: {}", e)))?;
        println!("{}", json);
        return Ok(());
    }

    print!("{}", render_table(&entries));
    Ok(())
}

pub async fn cmd_restore(ctx: &ReclaimContext, args: RestoreArgs) -> Result<()> {
    match ctx.store().restore(&args.id).await? {
        RestoreOutcome::Restored(path) => {
            println!("Restored {} to {}", args.id, path.display());
            Ok(())
        }
        RestoreOutcome::UnknownId => Err(ReclaimError::UserError(format!(
            "no quarantine entry with id '{}' (see `reclaim list`)",
            args.id
        ))),
        RestoreOutcome::MissingObject => Err(ReclaimError::QuarantineError(format!(
            "quarantined object for '{}' is missing; run `reclaim cleanup` to drop the entry",
            args.id
        ))),
    }
}

/// Expire old entries, then drop entries whose object is gone.
pub async fn cmd_cleanup(ctx: &ReclaimContext, args: CleanupArgs) -> Result<()> {
    let days = args.days.unwrap_or(ctx.config.retention_days);
    let store = ctx.store();

    let removed = store.cleanup(days).await?;
    let orphans = store.prune_orphans().await?;

    println!(
        "Deleted {} item(s) older than {} day(s).",
        removed, days
    );
    if orphans > 0 {
        println!("Dropped {} entry(ies) with missing objects.", orphans);
    }
    Ok(())
}

pub async fn cmd_clear(ctx: &ReclaimContext, args: ClearArgs) -> Result<()> {
    if !args.yes {
        return Err(ReclaimError::UserError(
            "clear permanently deletes every quarantined item; pass --yes to proceed".to_string(),
        ));
    }

    let cleared = ctx.store().clear_all().await?;
    println!("Permanently deleted {} quarantined item(s).", cleared);
    Ok(())
}

fn render_table(entries: &[QuarantineEntry]) -> String {
    if entries.is_empty() {
        return "Quarantine is empty.\n".to_string();
    }

    let mut out = String::new();
    let mut total = 0u64;
    for entry in entries {
        total += entry.size;
        out.push_str(&format!(
            "{}  {}  {:>9}  {}\n",
            entry.id,
            entry.moved_at.format("%Y-%m-%d %H:%M"),
            format_size(entry.size),
            entry.original_path.display()
        ));
    }
    out.push_str(&format!(
        "{} item(s), {} total\n",
        entries.len(),
        format_size(total)
    ));
    out
}
