//! Command implementations for reclaim.
//!
//! This module provides the dispatcher that routes CLI commands to their
//! implementations. Every command resolves a `ReclaimContext` from the
//! optional `--config` path first.

mod check;
mod delete;
mod prompt;
mod quarantine;

use crate::cli::{Cli, Command};
use reclaim::confirm::format_size;
use reclaim::context::ReclaimContext;
use reclaim::error::Result;

/// Dispatch a command to its implementation.
pub async fn dispatch(cli: Cli) -> Result<()> {
    let ctx = ReclaimContext::resolve(cli.config.as_deref())?;
    tracing::debug!(
        platform = %ctx.platform,
        config = ?ctx.config_path,
        "context resolved"
    );

    match cli.command {
        Command::Delete(args) => delete::cmd_delete(&ctx, args).await,
        Command::Check(args) => check::cmd_check(&ctx, args),
        Command::List(args) => quarantine::cmd_list(&ctx, args).await,
        Command::Restore(args) => quarantine::cmd_restore(&ctx, args).await,
        Command::Cleanup(args) => quarantine::cmd_cleanup(&ctx, args).await,
        Command::Clear(args) => quarantine::cmd_clear(&ctx, args).await,
        Command::TrashSize => cmd_trash_size(&ctx).await,
    }
}

async fn cmd_trash_size(ctx: &ReclaimContext) -> Result<()> {
    let trash = ctx.trash();
    if !trash.is_supported().await {
        println!("No trash mechanism is available on {}.", ctx.platform);
        return Ok(());
    }

    let bytes = trash.trash_size().await;
    println!("Trash size: {} ({} bytes)", format_size(bytes), bytes);
    Ok(())
}
