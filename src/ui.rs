// UI module for terminal output: a spinner while resolving, one status line
// per plugin on stderr, machine-readable results on stdout.

#![allow(clippy::print_stdout, clippy::print_stderr)]

use console::{Term, style};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use scaf::ResolvedArtifact;
use serde::Serialize;
use std::time::Duration;

/// Spinner style similar to uv/pnpm
const SPINNER_CHARS: &str = "⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏";

/// Check if stderr is a TTY (for interactive output)
fn is_tty() -> bool {
    Term::stderr().is_term()
}

/// Create a styled spinner for async operations
pub fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if !is_tty() {
        pb.set_draw_target(ProgressDrawTarget::hidden());
    }

    pb.set_style(
        ProgressStyle::default_spinner()
            .tick_chars(SPINNER_CHARS)
            .template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message.to_string());

    if is_tty() {
        pb.enable_steady_tick(Duration::from_millis(80));
    }

    pb
}

/// Print a resolved plugin: name, version and where it comes from
pub fn resolved(name: &str, artifact: &ResolvedArtifact) {
    let version = match artifact.build {
        Some(build) => format!("{} (build {})", artifact.version, build),
        None => artifact.version.clone(),
    };
    eprintln!(
        "{} {} {} {}",
        style("✓").green(),
        name,
        style(version).dim(),
        style(format!("[{}]", artifact.source)).cyan()
    );
}

/// Print a failed plugin with the full error chain
pub fn failed(name: &str, error: &anyhow::Error) {
    eprintln!("{} {}: {:#}", style("✗").red(), name, error);
}

/// Print a warning message
pub fn warning(message: &str) {
    eprintln!("{} {}", style("⚠").yellow(), message);
}

/// Print a summary line
pub fn summary(resolved: usize, failed: usize) {
    if failed == 0 {
        eprintln!("Resolved {} plugin(s)", resolved);
    } else {
        eprintln!(
            "Resolved {} plugin(s), {}",
            resolved,
            style(format!("{} failed", failed)).red()
        );
    }
}

/// Write a value as YAML to stdout
pub fn print_yaml<T: Serialize>(value: &T) -> anyhow::Result<()> {
    print!("{}", serde_yaml::to_string(value)?);
    Ok(())
}

/// Write one item per line to stdout
pub fn print_lines<I, S>(lines: I)
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    for line in lines {
        println!("{}", line.as_ref());
    }
}
