//! External trash utilities.
//!
//! Platform trash facilities (Finder, the Windows recycle bin, `gio`,
//! trash-cli) are invoked, never reimplemented. Every invocation is bounded by
//! a timeout so a hung desktop service cannot stall a batch, and a missing
//! binary is an ordinary strategy failure.

use super::strategy::TrashStrategy;
use crate::config::types::PATH_PLACEHOLDER;
use crate::error::{ReclaimError, Result};
use async_trait::async_trait;
use std::io;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

/// How the path is escaped before substitution into the argument template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathEscape {
    /// Substituted verbatim as its own argv element.
    None,
    /// Inside an AppleScript double-quoted string literal.
    AppleScript,
    /// Inside a PowerShell single-quoted string literal.
    PowerShell,
}

impl PathEscape {
    fn apply(&self, path: &str) -> String {
        match self {
            PathEscape::None => path.to_string(),
            PathEscape::AppleScript => path.replace('\\', "\\\\").replace('"', "\\\""),
            PathEscape::PowerShell => path.replace('\'', "''"),
        }
    }
}

/// Runs `program args..` with `{path}` substituted, one process per path.
#[derive(Debug, Clone)]
pub struct CommandStrategy {
    name: String,
    program: String,
    args: Vec<String>,
    escape: PathEscape,
    timeout: Duration,
}

impl CommandStrategy {
    pub fn new(
        name: impl Into<String>,
        program: impl Into<String>,
        args: Vec<String>,
        escape: PathEscape,
        timeout: Duration,
    ) -> Self {
        Self {
            name: name.into(),
            program: program.into(),
            args,
            escape,
            timeout,
        }
    }

    /// Build from a shell-words template such as `"trash-put {path}"`.
    pub fn from_template(template: &str, timeout: Duration) -> Result<Self> {
        let mut words = shell_words::split(template).map_err(|e| {
            ReclaimError::ConfigError(format!(
                "failed to parse trash command '{}': {}",
                template, e
            ))
        })?;
        if words.is_empty() {
            return Err(ReclaimError::ConfigError(
                "trash command template is empty".to_string(),
            ));
        }
        let program = words.remove(0);
        Ok(Self::new(
            program.clone(),
            program,
            words,
            PathEscape::None,
            timeout,
        ))
    }

    /// Finder "move to trash" through AppleScript.
    pub fn finder(timeout: Duration) -> Self {
        Self::new(
            "finder",
            "osascript",
            vec![
                "-e".to_string(),
                format!(
                    "tell application \"Finder\" to delete POSIX file \"{}\"",
                    PATH_PLACEHOLDER
                ),
            ],
            PathEscape::AppleScript,
            timeout,
        )
    }

    /// Recycle bin through the VisualBasic FileSystem API from PowerShell.
    pub fn powershell_recycle_bin(timeout: Duration) -> Self {
        let script = format!(
            "Add-Type -AssemblyName Microsoft.VisualBasic; $p = '{}'; \
             if (Test-Path -LiteralPath $p -PathType Container) {{ \
             [Microsoft.VisualBasic.FileIO.FileSystem]::DeleteDirectory($p, 'OnlyErrorDialogs', 'SendToRecycleBin') \
             }} else {{ \
             [Microsoft.VisualBasic.FileIO.FileSystem]::DeleteFile($p, 'OnlyErrorDialogs', 'SendToRecycleBin') }}",
            PATH_PLACEHOLDER
        );
        Self::new(
            "powershell",
            "powershell",
            vec![
                "-NoProfile".to_string(),
                "-NonInteractive".to_string(),
                "-Command".to_string(),
                script,
            ],
            PathEscape::PowerShell,
            timeout,
        )
    }

    /// NirSoft's `nircmd moverecyclebin`, used when present.
    pub fn nircmd(timeout: Duration) -> Self {
        Self::new(
            "nircmd",
            "nircmd",
            vec!["moverecyclebin".to_string(), PATH_PLACEHOLDER.to_string()],
            PathEscape::None,
            timeout,
        )
    }

    /// GNOME/GIO desktop trash.
    pub fn gio(timeout: Duration) -> Self {
        Self::new(
            "gio",
            "gio",
            vec!["trash".to_string(), PATH_PLACEHOLDER.to_string()],
            PathEscape::None,
            timeout,
        )
    }

    /// trash-cli's `trash-put`.
    pub fn trash_put(timeout: Duration) -> Self {
        Self::new(
            "trash-put",
            "trash-put",
            vec![PATH_PLACEHOLDER.to_string()],
            PathEscape::None,
            timeout,
        )
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    fn render_args(&self, path: &Path) -> Vec<String> {
        let escaped = self.escape.apply(&path.to_string_lossy());
        self.args
            .iter()
            .map(|arg| arg.replace(PATH_PLACEHOLDER, &escaped))
            .collect()
    }
}

#[async_trait]
impl TrashStrategy for CommandStrategy {
    fn name(&self) -> &str {
        &self.name
    }

    async fn is_available(&self) -> bool {
        which::which(&self.program).is_ok()
    }

    async fn trash(&self, path: &Path) -> Result<()> {
        let output = run_with_timeout(&self.program, &self.render_args(path), self.timeout).await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ReclaimError::TrashError(format!(
                "'{}' exited with {}: {}",
                self.program,
                output.status,
                stderr.trim()
            )));
        }

        // Some utilities exit 0 without doing anything (no desktop session,
        // unsupported volume). Only a vanished source counts as success.
        if tokio::fs::symlink_metadata(path).await.is_ok() {
            return Err(ReclaimError::TrashError(format!(
                "'{}' reported success but {} still exists",
                self.program,
                path.display()
            )));
        }

        Ok(())
    }
}

/// Run a program to completion, killing it when `timeout` elapses.
pub(crate) async fn run_with_timeout(
    program: &str,
    args: &[String],
    timeout: Duration,
) -> Result<std::process::Output> {
    let mut command = Command::new(program);
    command
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    match tokio::time::timeout(timeout, command.output()).await {
        Ok(Ok(output)) => Ok(output),
        Ok(Err(e)) if e.kind() == io::ErrorKind::NotFound => Err(ReclaimError::TrashError(
            format!("'{}' is not installed", program),
        )),
        Ok(Err(e)) => Err(ReclaimError::TrashError(format!(
            "failed to run '{}': {}",
            program, e
        ))),
        Err(_) => Err(ReclaimError::TrashError(format!(
            "'{}' timed out after {}s",
            program,
            timeout.as_secs_f32()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn applescript_escape_quotes_and_backslashes() {
        assert_eq!(
            PathEscape::AppleScript.apply(r#"/tmp/a "b"\c"#),
            r#"/tmp/a \"b\"\\c"#
        );
    }

    #[test]
    fn powershell_escape_doubles_single_quotes() {
        assert_eq!(
            PathEscape::PowerShell.apply(r"C:\Users\o'neil\tmp"),
            r"C:\Users\o''neil\tmp"
        );
    }

    #[test]
    fn finder_template_embeds_escaped_path() {
        let strategy = CommandStrategy::finder(Duration::from_secs(1));
        let args = strategy.render_args(Path::new("/Users/me/My \"File\".txt"));

        assert_eq!(args[0], "-e");
        assert_eq!(
            args[1],
            r#"tell application "Finder" to delete POSIX file "/Users/me/My \"File\".txt""#
        );
    }

    #[test]
    fn template_parses_program_and_arguments() {
        let strategy =
            CommandStrategy::from_template("kioclient5 move {path} trash:/", Duration::from_secs(1))
                .unwrap();

        assert_eq!(strategy.program(), "kioclient5");
        assert_eq!(
            strategy.render_args(Path::new("/home/me/old dir")),
            vec!["move", "/home/me/old dir", "trash:/"]
        );
    }

    #[test]
    fn empty_template_is_rejected() {
        assert!(CommandStrategy::from_template("   ", Duration::from_secs(1)).is_err());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn installed_program_is_available() {
        let strategy = CommandStrategy::from_template("sh -c true {path}", Duration::from_secs(1))
            .unwrap();

        assert!(strategy.is_available().await);
    }

    #[tokio::test]
    async fn missing_program_is_a_recoverable_failure() {
        let strategy = CommandStrategy::from_template(
            "reclaim-no-such-binary-xyz {path}",
            Duration::from_secs(1),
        )
        .unwrap();

        assert!(!strategy.is_available().await);
        let err = strategy.trash(Path::new("/tmp/whatever")).await.unwrap_err();
        assert!(err.to_string().contains("is not installed"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn hung_command_times_out() {
        let strategy =
            CommandStrategy::from_template("sh -c 'sleep 5' {path}", Duration::from_millis(100))
                .unwrap();

        let err = strategy.trash(Path::new("/tmp/whatever")).await.unwrap_err();
        assert!(err.to_string().contains("timed out"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn success_without_effect_is_a_failure() {
        let temp = tempfile::TempDir::new().unwrap();
        let file = temp.path().join("still-here.txt");
        std::fs::write(&file, b"x").unwrap();
        let strategy = CommandStrategy::from_template("true {path}", Duration::from_secs(5)).unwrap();

        let err = strategy.trash(&file).await.unwrap_err();

        assert!(err.to_string().contains("still exists"));
        assert!(file.exists());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn non_zero_exit_is_a_failure() {
        let strategy = CommandStrategy::from_template("false {path}", Duration::from_secs(5)).unwrap();

        let err = strategy.trash(Path::new("/tmp/whatever")).await.unwrap_err();
        assert!(err.to_string().contains("exited with"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn command_that_removes_the_path_succeeds() {
        let temp = tempfile::TempDir::new().unwrap();
        let file = temp.path().join("gone.txt");
        std::fs::write(&file, b"x").unwrap();
        let strategy = CommandStrategy::from_template("rm {path}", Duration::from_secs(5)).unwrap();

        strategy.trash(&file).await.unwrap();

        assert!(!file.exists());
    }
}
