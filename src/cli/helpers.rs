//! Shared helper functions for CLI commands.

use std::time::Duration;

use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use crate::workflow::court_index::{ProcessingStep, StepStatus};

/// Truncate a string for table output.
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let head: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", head)
    }
}

/// A green spinner with a steady tick.
pub fn spinner(message: impl Into<String>) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message.into());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Parse `key=value` arguments.
pub fn parse_key_value(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((k, v)) if !k.trim().is_empty() => Ok((k.trim().to_string(), v.trim().to_string())),
        _ => Err(format!("expected KEY=VALUE, got '{}'", s)),
    }
}

/// Status marker for a processing step.
pub fn step_marker(step: &ProcessingStep) -> String {
    match step.status {
        StepStatus::Completed => style("✓").green().to_string(),
        StepStatus::Failed => style("✗").red().to_string(),
        StepStatus::Processing => style("→").cyan().to_string(),
        StepStatus::Pending => style("·").dim().to_string(),
    }
}

/// Print a horizontal rule of `width` dashes.
pub fn rule(width: usize) {
    println!("{}", "-".repeat(width));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a longer document name", 10), "a longe...");
    }

    #[test]
    fn test_parse_key_value() {
        assert_eq!(
            parse_key_value("city = Pune").unwrap(),
            ("city".to_string(), "Pune".to_string())
        );
        assert_eq!(
            parse_key_value("name=").unwrap(),
            ("name".to_string(), String::new())
        );
        assert!(parse_key_value("novalue").is_err());
        assert!(parse_key_value("=x").is_err());
    }
}
