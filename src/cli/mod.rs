//! CLI argument parsing for reclaim.
//!
//! Uses clap derive macros for declarative argument definitions.
//! This module defines the command structure; actual implementations
//! are in the `commands` module.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Reclaim: delete files safely.
///
/// Every deletion is validated first:
/// - System paths are never touched
/// - Critical user locations and large directories are flagged
/// - Items go to the OS trash, or to a restorable quarantine when the trash
///   is unavailable
#[derive(Parser, Debug)]
#[command(name = "reclaim")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the config file (defaults to the user config directory).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands for reclaim.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Delete paths via the OS trash, falling back to quarantine.
    ///
    /// Asks for confirmation unless --yes or --force is given.
    #[command(alias = "rm")]
    Delete(DeleteArgs),

    /// Check paths for safety concerns without deleting anything.
    Check(CheckArgs),

    /// List quarantined items.
    #[command(alias = "ls")]
    List(ListArgs),

    /// Restore a quarantined item to its original location.
    Restore(RestoreArgs),

    /// Permanently delete quarantined items older than the retention period.
    Cleanup(CleanupArgs),

    /// Permanently delete everything in quarantine.
    Clear(ClearArgs),

    /// Show how much space the OS trash uses.
    TrashSize,
}

/// Arguments for the `delete` command.
#[derive(Parser, Debug)]
pub struct DeleteArgs {
    /// Paths to delete.
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,

    /// Show what would be deleted without changing anything.
    #[arg(long)]
    pub dry_run: bool,

    /// Do not use the OS trash; quarantine instead.
    #[arg(long)]
    pub no_trash: bool,

    /// Keep items restorable in reclaim's quarantine.
    #[arg(long)]
    pub quarantine: bool,

    /// Do not ask for confirmation.
    #[arg(short, long)]
    pub yes: bool,

    /// Do not ask, and skip system paths instead of refusing the batch.
    #[arg(short, long)]
    pub force: bool,
}

/// Arguments for the `check` command.
#[derive(Parser, Debug)]
pub struct CheckArgs {
    /// Paths to check.
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,

    /// Print the validation result as JSON.
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `list` command.
#[derive(Parser, Debug)]
pub struct ListArgs {
    /// Print entries as JSON.
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `restore` command.
#[derive(Parser, Debug)]
pub struct RestoreArgs {
    /// Quarantine id (see `reclaim list`).
    pub id: String,
}

/// Arguments for the `cleanup` command.
#[derive(Parser, Debug)]
pub struct CleanupArgs {
    /// Retention in days (defaults to `retention_days` from config).
    #[arg(long)]
    pub days: Option<u32>,
}

/// Arguments for the `clear` command.
#[derive(Parser, Debug)]
pub struct ClearArgs {
    /// Confirm permanent deletion (required).
    #[arg(long)]
    pub yes: bool,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_delete_defaults() {
        let cli = Cli::try_parse_from(["reclaim", "delete", "a.txt", "b"]).unwrap();
        if let Command::Delete(args) = cli.command {
            assert_eq!(args.paths, vec![PathBuf::from("a.txt"), PathBuf::from("b")]);
            assert!(!args.dry_run);
            assert!(!args.no_trash);
            assert!(!args.quarantine);
            assert!(!args.yes);
            assert!(!args.force);
        } else {
            panic!("Expected Delete command");
        }
    }

    #[test]
    fn parse_delete_flags() {
        let cli = Cli::try_parse_from([
            "reclaim",
            "rm",
            "--dry-run",
            "--no-trash",
            "--quarantine",
            "-y",
            "--force",
            "x",
        ])
        .unwrap();
        if let Command::Delete(args) = cli.command {
            assert!(args.dry_run);
            assert!(args.no_trash);
            assert!(args.quarantine);
            assert!(args.yes);
            assert!(args.force);
        } else {
            panic!("Expected Delete command");
        }
    }

    #[test]
    fn delete_requires_a_path() {
        assert!(Cli::try_parse_from(["reclaim", "delete"]).is_err());
    }

    #[test]
    fn parse_check_json() {
        let cli = Cli::try_parse_from(["reclaim", "check", "/tmp/x", "--json"]).unwrap();
        if let Command::Check(args) = cli.command {
            assert!(args.json);
            assert_eq!(args.paths, vec![PathBuf::from("/tmp/x")]);
        } else {
            panic!("Expected Check command");
        }
    }

    #[test]
    fn parse_restore() {
        let cli = Cli::try_parse_from(["reclaim", "restore", "abc-123"]).unwrap();
        if let Command::Restore(args) = cli.command {
            assert_eq!(args.id, "abc-123");
        } else {
            panic!("Expected Restore command");
        }
    }

    #[test]
    fn parse_cleanup_days() {
        let cli = Cli::try_parse_from(["reclaim", "cleanup", "--days", "7"]).unwrap();
        if let Command::Cleanup(args) = cli.command {
            assert_eq!(args.days, Some(7));
        } else {
            panic!("Expected Cleanup command");
        }
    }

    #[test]
    fn parse_clear_and_global_config() {
        let cli =
            Cli::try_parse_from(["reclaim", "clear", "--yes", "--config", "/etc/r.yaml"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/etc/r.yaml")));
        if let Command::Clear(args) = cli.command {
            assert!(args.yes);
        } else {
            panic!("Expected Clear command");
        }
    }

    #[test]
    fn parse_trash_size() {
        let cli = Cli::try_parse_from(["reclaim", "trash-size"]).unwrap();
        assert!(matches!(cli.command, Command::TrashSize));
    }

    #[test]
    fn parse_list_alias() {
        let cli = Cli::try_parse_from(["reclaim", "ls", "--json"]).unwrap();
        assert!(matches!(cli.command, Command::List(ListArgs { json: true })));
    }
}
