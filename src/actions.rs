//! Side effects outside the process: artifact files and child processes.

use crate::error::BotError;
use async_trait::async_trait;
use std::path::Path;
use tokio::process::Command;
use tracing::debug;

/// Boundary for everything the mentality sequence does outside the bot.
#[async_trait]
pub trait ExternalActions: Send + Sync {
    /// Overwrite `path` with `contents`, creating parent directories.
    async fn write_artifact(&self, path: &Path, contents: &str) -> Result<(), BotError>;

    /// Run `program` with `args` and wait for it; non-zero exit is an error.
    async fn run_process(&self, program: &str, args: &[String]) -> Result<(), BotError>;
}

/// [`ExternalActions`] backed by the filesystem and real child processes.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessActions;

#[async_trait]
impl ExternalActions for ProcessActions {
    async fn write_artifact(&self, path: &Path, contents: &str) -> Result<(), BotError> {
        let action = format!("write {}", path.display());
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| BotError::external(&action, e))?;
        }
        tokio::fs::write(path, contents)
            .await
            .map_err(|e| BotError::external(&action, e))?;
        debug!(path = %path.display(), bytes = contents.len(), "Artifact written");
        Ok(())
    }

    async fn run_process(&self, program: &str, args: &[String]) -> Result<(), BotError> {
        let status = Command::new(program)
            .args(args)
            .kill_on_drop(true)
            .status()
            .await
            .map_err(|e| BotError::external(program, e))?;
        if status.success() {
            debug!(program, "Process finished");
            Ok(())
        } else {
            Err(BotError::external(program, status))
        }
    }
}
