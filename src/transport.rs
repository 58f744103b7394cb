//! Byte-transport conveniences.
//!
//! `Connection::spawn` (see [`crate::protocol`]) accepts any
//! `AsyncRead`/`AsyncWrite` pair, so this module is thin: it covers the two
//! cases every embedding program needs — the process's own stdio, and a
//! child process's stdio.

use anyhow::{Context, Result};
use tokio::io::{Stdin, Stdout};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};

/// The process's own standard input/output, the default duplex pair named
/// in §6 ("Transport").
pub fn stdio() -> (Stdin, Stdout) {
    (tokio::io::stdin(), tokio::io::stdout())
}

/// Spawns `program` with `args` and returns its stdio pair along with the
/// child handle (kept alive so the process isn't reaped early, and so the
/// caller can wait on or kill it).
pub fn spawn_child_stdio(program: &str, args: &[&str]) -> Result<(ChildStdout, ChildStdin, Child)> {
    let mut child = Command::new(program)
        .args(args)
        .stdin(std::process::Stdio::piped())
        .stdout(std::process::Stdio::piped())
        .spawn()
        .with_context(|| format!("failed to spawn {program}"))?;

    let stdout = child
        .stdout
        .take()
        .context("child process stdout not available")?;
    let stdin = child
        .stdin
        .take()
        .context("child process stdin not available")?;

    Ok((stdout, stdin, child))
}
