//! Test bot process management.
//!
//! Spawns the `nuitbot` binary with a generated config file.

use std::process::{ExitStatus, Stdio};
use std::time::Duration;
use tempfile::TempDir;
use tokio::process::{Child, Command};
use tokio::time::timeout;

/// Environment variables that would override the generated config.
const OVERRIDES: [&str; 4] = ["TWITCH_OAUTH", "TWITCH_NICK", "TWITCH_CHANNEL", "OBS_PASSWORD"];

/// A running bot. Killed on drop.
pub struct TestBot {
    child: Child,
    dir: TempDir,
}

impl TestBot {
    /// Spawn the bot with `config` written to a temporary `nuitbot.toml`.
    ///
    /// `{dir}` in `config` is replaced with the temporary directory.
    pub async fn spawn(config: &str) -> anyhow::Result<Self> {
        let dir = tempfile::tempdir()?;
        let config = config.replace("{dir}", &dir.path().display().to_string());
        let config_path = dir.path().join("nuitbot.toml");
        std::fs::write(&config_path, config)?;

        let mut command = Command::new(env!("CARGO_BIN_EXE_nuitbot"));
        command
            .arg(&config_path)
            .current_dir(dir.path())
            .stdin(Stdio::null())
            .kill_on_drop(true);
        for key in OVERRIDES {
            command.env_remove(key);
        }
        let child = command.spawn()?;

        Ok(Self { child, dir })
    }

    /// Temporary directory holding the config and any artifacts.
    pub fn dir(&self) -> &std::path::Path {
        self.dir.path()
    }

    /// Deliver SIGTERM.
    #[cfg(unix)]
    pub async fn terminate(&self) -> anyhow::Result<()> {
        let pid = self
            .child
            .id()
            .ok_or_else(|| anyhow::anyhow!("bot already exited"))?;
        let status = Command::new("kill")
            .arg("-TERM")
            .arg(pid.to_string())
            .status()
            .await?;
        anyhow::ensure!(status.success(), "kill failed: {status}");
        Ok(())
    }

    /// Wait for the process to exit.
    pub async fn wait(&mut self, limit: Duration) -> anyhow::Result<ExitStatus> {
        Ok(timeout(limit, self.child.wait()).await??)
    }
}
