//! Hook for the host's cache invalidation command.
use std::fmt::Debug;

use async_trait::async_trait;
use tokio::process::Command;

/// Runs host console commands without reporting their outcome
#[async_trait]
pub trait ConsoleRunner: Send + Sync + Debug {
    async fn execute_console_command(&self, command: &str);
}

/// Runs commands through the platform shell, logging failures
#[derive(Debug, Clone, Default)]
pub struct ProcessConsole;

impl ProcessConsole {
    pub fn new() -> Self {
        Self
    }

    fn shell(command: &str) -> Command {
        if cfg!(windows) {
            let mut cmd = Command::new("cmd");
            cmd.arg("/C").arg(command);
            cmd
        } else {
            let mut cmd = Command::new("sh");
            cmd.arg("-c").arg(command);
            cmd
        }
    }
}

#[async_trait]
impl ConsoleRunner for ProcessConsole {
    async fn execute_console_command(&self, command: &str) {
        log::debug!("Running console command: {}", command);
        let mut shell = Self::shell(command);
        match shell.output().await {
            Ok(output) if output.status.success() => {}
            Ok(output) => log::warn!(
                "Console command '{}' exited with {}: {}",
                command,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            ),
            Err(e) => log::warn!("Failed to run console command '{}': {}", command, e),
        }
    }
}
