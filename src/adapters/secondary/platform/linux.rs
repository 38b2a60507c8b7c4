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

//! Linux platform probe adapter

use crate::domain::DomainError;
use crate::ports::{CommandExecutor, PlatformProbe, SystemCommand, Virtualization};
use async_trait::async_trait;
use log::debug;
use std::sync::Arc;
use std::time::Duration;

/// Platform probe backed by `uname` and `systemd-detect-virt`
pub struct LinuxPlatformProbe {
    executor: Arc<dyn CommandExecutor>,
}

impl LinuxPlatformProbe {
    pub fn new(executor: Arc<dyn CommandExecutor>) -> Self {
        Self { executor }
    }
}

#[async_trait]
impl PlatformProbe for LinuxPlatformProbe {
    async fn kernel(&self) -> Result<String, DomainError> {
        let cmd = SystemCommand::new("uname")
            .args(&["-s"])
            .timeout(Duration::from_secs(5));
        let output = self.executor.execute(&cmd).await.map_err(|e| {
            DomainError::PlatformProbeFailed(format!("uname -s failed: {e}"))
        })?;
        Ok(output.stdout.trim().to_string())
    }

    async fn virtualization(&self) -> Result<Virtualization, DomainError> {
        let available = self
            .executor
            .is_command_available("systemd-detect-virt")
            .await
            .unwrap_or(false);
        if !available {
            // no detector: assume bare metal rather than blocking collection
            debug!("systemd-detect-virt not available, assuming physical host");
            return Ok(Virtualization::Physical);
        }

        let cmd = SystemCommand::new("systemd-detect-virt").timeout(Duration::from_secs(5));
        match self.executor.execute(&cmd).await {
            // exit 0 means some virtualization was detected; "none" on
            // stdout (exit 1) means physical
            Ok(output) => {
                let kind = output.stdout.trim().to_string();
                if output.success && kind != "none" {
                    Ok(Virtualization::Virtual(kind))
                } else {
                    Ok(Virtualization::Physical)
                }
            }
            Err(e) => Err(DomainError::PlatformProbeFailed(format!(
                "systemd-detect-virt failed: {e}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::CommandError;
    use crate::ports::CommandOutput;

    /// Executor stub returning fixed outputs per program
    struct StubExecutor {
        uname: &'static str,
        detect_virt: Option<(&'static str, bool)>,
    }

    #[async_trait]
    impl CommandExecutor for StubExecutor {
        async fn execute(&self, command: &SystemCommand) -> Result<CommandOutput, CommandError> {
            let (stdout, success) = match command.program.as_str() {
                "uname" => (self.uname, true),
                "systemd-detect-virt" => self.detect_virt.unwrap_or(("", false)),
                _ => ("", false),
            };
            Ok(CommandOutput {
                stdout: format!("{stdout}\n"),
                stderr: String::new(),
                exit_code: Some(if success { 0 } else { 1 }),
                success,
            })
        }

        async fn is_command_available(&self, command_name: &str) -> Result<bool, CommandError> {
            Ok(command_name == "uname"
                || (command_name == "systemd-detect-virt" && self.detect_virt.is_some()))
        }
    }

    #[tokio::test]
    async fn test_kernel_is_trimmed() {
        let probe = LinuxPlatformProbe::new(Arc::new(StubExecutor {
            uname: "Linux",
            detect_virt: None,
        }));
        assert_eq!(probe.kernel().await.unwrap(), "Linux");
    }

    #[tokio::test]
    async fn test_detected_hypervisor_is_virtual() {
        let probe = LinuxPlatformProbe::new(Arc::new(StubExecutor {
            uname: "Linux",
            detect_virt: Some(("kvm", true)),
        }));
        assert_eq!(
            probe.virtualization().await.unwrap(),
            Virtualization::Virtual("kvm".to_string())
        );
    }

    #[tokio::test]
    async fn test_none_means_physical() {
        let probe = LinuxPlatformProbe::new(Arc::new(StubExecutor {
            uname: "Linux",
            detect_virt: Some(("none", false)),
        }));
        assert_eq!(
            probe.virtualization().await.unwrap(),
            Virtualization::Physical
        );
    }

    #[tokio::test]
    async fn test_missing_detector_defaults_to_physical() {
        let probe = LinuxPlatformProbe::new(Arc::new(StubExecutor {
            uname: "Linux",
            detect_virt: None,
        }));
        assert_eq!(
            probe.virtualization().await.unwrap(),
            Virtualization::Physical
        );
    }
}
