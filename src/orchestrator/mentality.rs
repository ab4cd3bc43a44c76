//! The mentality sequence.
//!
//! Write both artifacts, settle, hotkey, play the sound to completion,
//! hotkey again. Each step is best-effort: a failure is logged and the
//! sequence moves on.

use super::Orchestrator;
use crate::actions::ExternalActions;
use crate::control;
use rand::Rng;
use std::path::Path;
use tracing::{info, warn};

impl<R: Rng + Send, A: ExternalActions> Orchestrator<R, A> {
    pub(super) async fn run_mentality(&mut self, message: &str, display_name: &str) {
        info!("Mentality triggered");

        let artifacts = [
            (&self.mentality.message_file, message),
            (&self.mentality.name_file, display_name),
        ];
        for (path, contents) in artifacts {
            if let Err(e) = self.actions.write_artifact(Path::new(path), contents).await {
                warn!(code = e.error_code(), error = %e, "Failed to write artifact");
            }
        }

        tokio::time::sleep(self.mentality.settle_delay()).await;
        self.hotkey("transition in").await;

        info!("Playing sound");
        let args = [self.mentality.sound_file.clone()];
        if let Err(e) = self.actions.run_process(&self.mentality.player, &args).await {
            warn!(code = e.error_code(), error = %e, "Sound playback failed");
        }

        self.hotkey("transition out").await;
        info!("Mentality complete");
    }

    /// Press the configured hotkey: remotely when the control plane is
    /// usable, else through the local key command, else not at all.
    async fn hotkey(&mut self, step: &'static str) {
        if self.control.is_usable() {
            match control::trigger_hotkey(&mut self.control, &self.hotkey, self.control_timeout).await
            {
                Ok(()) => info!(step, "Remote hotkey triggered"),
                Err(e) => {
                    warn!(step, code = e.error_code(), error = %e, "Remote hotkey failed");
                    if e.is_disconnect() {
                        let reconnected = self.control.reconnect().await.map(|_| ());
                        if let Err(e) = reconnected {
                            warn!(code = e.error_code(), error = %e, "Control plane reconnect failed");
                        }
                    }
                }
            }
            return;
        }

        match self
            .mentality
            .key_command
            .as_deref()
            .and_then(<[String]>::split_first)
        {
            Some((program, args)) => match self.actions.run_process(program, args).await {
                Ok(()) => info!(step, %program, "Key command ran"),
                Err(e) => warn!(step, code = e.error_code(), error = %e, "Key command failed"),
            },
            None => warn!(step, "Control plane not ready, skipping hotkey"),
        }
    }
}
