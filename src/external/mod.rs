// Expensive external queries (shell-outs) wrapped by the refresh cache.

pub mod docker;
pub mod services;

use std::time::Duration;
use tokio::process::Command;

/// Run a command with a hard time bound. A timeout is reported the same way
/// as any other failure so callers degrade instead of hanging.
pub(crate) async fn run_command(
    program: &str,
    args: &[&str],
    limit: Duration,
) -> anyhow::Result<String> {
    let output = tokio::time::timeout(limit, Command::new(program).args(args).output())
        .await
        .map_err(|_| anyhow::anyhow!("{} timed out after {:?}", program, limit))??;
    anyhow::ensure!(
        output.status.success(),
        "{} exited with {}: {}",
        program,
        output.status,
        String::from_utf8_lossy(&output.stderr).trim()
    );
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}
