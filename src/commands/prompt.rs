//! Interactive confirmation on the terminal.

use async_trait::async_trait;
use reclaim::confirm::{ConfirmationPrompt, ConfirmationResult, Confirmer, format_size};
use tokio::io::{AsyncBufReadExt, BufReader};

/// Asks on stderr, reads y/N/a(lways) from stdin. EOF means no.
pub struct StdinConfirmer;

#[async_trait]
impl Confirmer for StdinConfirmer {
    async fn confirm(&self, prompt: &ConfirmationPrompt) -> ConfirmationResult {
        eprint!("{}", render_prompt(prompt));

        let mut line = String::new();
        let mut reader = BufReader::new(tokio::io::stdin());
        match reader.read_line(&mut line).await {
            Ok(0) => ConfirmationResult::no(),
            Ok(_) => parse_answer(&line),
            Err(e) => {
                tracing::warn!(error = %e, "failed to read confirmation");
                ConfirmationResult::no()
            }
        }
    }
}

/// Text shown before the question.
pub fn render_prompt(prompt: &ConfirmationPrompt) -> String {
    let mut out = String::new();
    out.push_str(&prompt.message);
    out.push('\n');

    for line in &prompt.details {
        out.push_str(&format!("  {}\n", line));
    }
    if !prompt.warnings.is_empty() {
        out.push_str("Warnings:\n");
        for warning in &prompt.warnings {
            out.push_str(&format!("  ! {}\n", warning));
        }
    }
    out.push_str(&format!(
        "Proceed with {} ({})? [y/N/a(lways)] ",
        prompt.method,
        format_size(prompt.total_size)
    ));
    out
}

pub fn parse_answer(input: &str) -> ConfirmationResult {
    match input.trim().to_lowercase().as_str() {
        "y" | "yes" => ConfirmationResult::yes(),
        "a" | "always" => ConfirmationResult::always(),
        _ => ConfirmationResult::no(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reclaim::delete::DeletionMethod;

    #[test]
    fn answers_are_parsed_case_insensitively() {
        assert_eq!(parse_answer("y\n"), ConfirmationResult::yes());
        assert_eq!(parse_answer("YES"), ConfirmationResult::yes());
        assert_eq!(parse_answer(" a "), ConfirmationResult::always());
        assert_eq!(parse_answer("Always\r\n"), ConfirmationResult::always());
    }

    #[test]
    fn anything_else_is_no() {
        assert_eq!(parse_answer(""), ConfirmationResult::no());
        assert_eq!(parse_answer("\n"), ConfirmationResult::no());
        assert_eq!(parse_answer("n"), ConfirmationResult::no());
        assert_eq!(parse_answer("sure"), ConfirmationResult::no());
    }

    #[test]
    fn rendered_prompt_lists_details_and_warnings() {
        let prompt = ConfirmationPrompt {
            message: "Delete 2 items (3.0 KB)?".to_string(),
            details: vec!["/tmp/a".to_string(), "/tmp/b".to_string()],
            warnings: vec!["File may be in use: /tmp/a".to_string()],
            item_count: 2,
            total_size: 3072,
            method: DeletionMethod::Quarantine,
        };

        let text = render_prompt(&prompt);

        assert!(text.starts_with("Delete 2 items (3.0 KB)?\n  /tmp/a\n  /tmp/b\n"));
        assert!(text.contains("Warnings:\n  ! File may be in use: /tmp/a\n"));
        assert!(text.ends_with("Proceed with quarantine (3.0 KB)? [y/N/a(lways)] "));
    }
}
