//! Implementation of the `reclaim check` command.
//!
//! Runs the safety validator over the given paths and reports what a
//! deletion would be warned about or blocked by. Nothing is touched.

use crate::cli::CheckArgs;
use reclaim::context::ReclaimContext;
use reclaim::error::{ReclaimError, Result};
use reclaim::safety::ValidationResult;

pub fn cmd_check(ctx: &ReclaimContext, args: CheckArgs) -> Result<()> {
    let validator = ctx.validator()?;
    let result = validator.validate(&args.paths);

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .map_err(|e| ReclaimError::UserError(format!("failed to encode result: {}", e)))?;
        println!("{}", json);
    } else {
        print!("{}", render(&result, args.paths.len()));
    }

    if result.is_valid {
        Ok(())
    } else {
        Err(ReclaimError::ValidationError(format!(
            "{} system path(s) found",
            result.system_paths.len()
        )))
    }
}

fn render(result: &ValidationResult, checked: usize) -> String {
    let mut out = String::new();

    if !result.blockers.is_empty() {
        out.push_str("Blocked:\n");
        for blocker in &result.blockers {
            out.push_str(&format!("  x {}\n", blocker));
        }
    }
    if !result.warnings.is_empty() {
        out.push_str("Warnings:\n");
        for warning in &result.warnings {
            out.push_str(&format!("  ! {}\n", warning));
        }
    }

    if result.is_valid && result.warnings.is_empty() {
        out.push_str(&format!("{} path(s) checked, no concerns.\n", checked));
    } else if result.is_valid {
        out.push_str(&format!(
            "{} path(s) checked, safe to delete with {} warning(s).\n",
            checked,
            result.warnings.len()
        ));
    } else {
        out.push_str(&format!(
            "{} path(s) checked, deletion would be rejected.\n",
            checked
        ));
    }
    out
}
