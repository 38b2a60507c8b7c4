/*
Copyright 2024 San Francisco Compute Company

Licensed under the Apache License, Version 2.0 (the "License");
you may not use this file except in compliance with the License.
You may obtain a copy of the License at

    http://www.apache.org/licenses/LICENSE-2.0

Unless required by applicable law or agreed to in writing, software
distributed under the License is distributed on an "AS IS" BASIS,
WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
See the License for the specific language governing permissions and
limitations under the License.
*/

//! Unix command execution adapter

use crate::domain::CommandError;
use crate::ports::{CommandExecutor, CommandOutput, SystemCommand};
use async_trait::async_trait;
use log::{debug, warn};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;

/// Unix-based command executor with per-command timeouts and bounded retry
pub struct UnixCommandExecutor {
    /// Default timeout for commands
    default_timeout: Duration,
    /// Number of retry attempts for failed commands
    retry_count: u32,
}

impl UnixCommandExecutor {
    /// Create a new Unix command executor
    ///
    /// # Arguments
    /// * `default_timeout` - Default timeout for commands
    /// * `retry_count` - Number of retry attempts
    pub fn new(default_timeout: Duration, retry_count: u32) -> Self {
        Self {
            default_timeout,
            retry_count,
        }
    }

    /// Create a Unix command executor with default settings
    pub fn with_defaults() -> Self {
        Self::new(Duration::from_secs(30), 1)
    }

    /// Execute a command with retry on spawn failure or timeout
    async fn execute_with_retry(
        &self,
        command: &SystemCommand,
    ) -> Result<CommandOutput, CommandError> {
        let mut last_error = None;

        for attempt in 0..=self.retry_count {
            match self.execute_once(command).await {
                Ok(output) => return Ok(output),
                Err(e) => {
                    last_error = Some(e);

                    if attempt < self.retry_count {
                        warn!(
                            "'{}' failed on attempt {}, retrying",
                            command.program,
                            attempt + 1
                        );
                        tokio::time::sleep(Duration::from_millis(100 * (attempt + 1) as u64)).await;
                    }
                }
            }
        }

        Err(last_error.expect("at least one attempt was made"))
    }

    /// Execute a command once
    async fn execute_once(&self, command: &SystemCommand) -> Result<CommandOutput, CommandError> {
        let command_timeout = command.timeout.unwrap_or(self.default_timeout);

        let mut cmd = Command::new(&command.program);
        cmd.args(&command.args)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .stdin(Stdio::null());

        debug!("executing: {} {}", command.program, command.args.join(" "));

        let result = timeout(command_timeout, cmd.output()).await;

        match result {
            Ok(Ok(output)) => {
                let stdout = String::from_utf8_lossy(&output.stdout).to_string();
                let stderr = String::from_utf8_lossy(&output.stderr).to_string();
                let success = output.status.success();
                let exit_code = output.status.code();

                if !success {
                    debug!(
                        "'{}' exited with {:?}: {}",
                        command.program,
                        exit_code,
                        stderr.trim()
                    );
                }

                Ok(CommandOutput {
                    stdout,
                    stderr,
                    exit_code,
                    success,
                })
            }
            Ok(Err(e)) => Err(CommandError::ExecutionFailed {
                program: command.program.clone(),
                reason: e.to_string(),
            }),
            Err(_) => Err(CommandError::Timeout {
                program: command.program.clone(),
                timeout: command_timeout,
            }),
        }
    }
}

#[async_trait]
impl CommandExecutor for UnixCommandExecutor {
    async fn execute(&self, command: &SystemCommand) -> Result<CommandOutput, CommandError> {
        self.execute_with_retry(command).await
    }

    async fn is_command_available(&self, command_name: &str) -> Result<bool, CommandError> {
        let which_cmd = SystemCommand::new("which")
            .args(&[command_name])
            .timeout(Duration::from_secs(5));

        match self.execute_once(&which_cmd).await {
            Ok(output) => Ok(output.success && !output.stdout.trim().is_empty()),
            Err(_) => Ok(false), // If 'which' fails, assume command is not available
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_unix_command_executor_basic() {
        let executor = UnixCommandExecutor::with_defaults();

        let cmd = SystemCommand::new("echo").args(&["hello", "world"]);

        let result = executor.execute(&cmd).await.unwrap();
        assert!(result.success);
        assert_eq!(result.stdout.trim(), "hello world");
    }

    #[tokio::test]
    async fn test_command_availability_check() {
        let executor = UnixCommandExecutor::with_defaults();

        assert!(!executor
            .is_command_available("definitely_not_a_real_command_12345")
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_command_timeout() {
        let executor = UnixCommandExecutor::new(Duration::from_secs(30), 0);

        let cmd = SystemCommand::new("sleep")
            .args(&["10"])
            .timeout(Duration::from_millis(100));

        let result = executor.execute(&cmd).await;
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("timed out"));
    }

    #[tokio::test]
    async fn test_nonzero_exit_is_not_an_error() {
        let executor = UnixCommandExecutor::with_defaults();

        let cmd = SystemCommand::new("false");
        let result = executor.execute(&cmd).await.unwrap();
        assert!(!result.success);
    }
}
