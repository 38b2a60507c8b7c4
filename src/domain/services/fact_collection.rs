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

use crate::domain::parsers::{fibrechannel, ipmi, lldp};
use crate::domain::{CollectConfig, DomainError, FactError, FactName, FactReport};
use crate::ports::{CommandExecutor, FactService, PlatformProbe, SystemCommand, Virtualization};
use async_trait::async_trait;
use log::{debug, info, warn};
use std::sync::Arc;

/// Domain service that collects facts from the system inventory tools.
///
/// For each requested fact the service runs the source tool through the
/// command executor, hands the captured stdout to the matching parser, and
/// registers the result under the fact's name. Collection is confined to
/// physical Linux hosts unless the caller opts out; a confined-away host or
/// a missing tool leaves facts absent rather than failing the report, but a
/// platform probe that cannot answer while confinement is enforced is
/// surfaced as an error.
pub struct FactCollectionService {
    /// Command executor for invoking the inventory tools
    executor: Arc<dyn CommandExecutor>,
    /// Platform probe for confinement checks
    platform: Arc<dyn PlatformProbe>,
}

impl FactCollectionService {
    /// Create a new fact collection service
    ///
    /// # Arguments
    /// * `executor` - Command executor adapter
    /// * `platform` - Platform probe adapter
    pub fn new(executor: Arc<dyn CommandExecutor>, platform: Arc<dyn PlatformProbe>) -> Self {
        Self { executor, platform }
    }

    /// Evaluate the confinement checks: kernel must be Linux and the host
    /// must be physical hardware. A platform probe that cannot answer at
    /// all is a hard error; the caller cannot tell whether collection
    /// should have run.
    async fn platform_allows_collection(&self) -> Result<bool, DomainError> {
        let kernel = self.platform.kernel().await?;
        if kernel != "Linux" {
            info!("skipping fact collection: kernel is {kernel}, not Linux");
            return Ok(false);
        }
        match self.platform.virtualization().await? {
            Virtualization::Physical => Ok(true),
            Virtualization::Virtual(kind) => {
                info!("skipping fact collection: virtualized host ({kind})");
                Ok(false)
            }
        }
    }

    /// Run one inventory tool and capture its stdout.
    ///
    /// Returns `None` when the tool is not installed or could not be run;
    /// a non-zero exit still yields whatever stdout was produced, since the
    /// parsers are best-effort by design.
    async fn capture(&self, program: &str, args: &[&str]) -> Option<String> {
        match self.executor.is_command_available(program).await {
            Ok(true) => {}
            Ok(false) => {
                warn!("{program} is not installed, fact will be absent");
                return None;
            }
            Err(e) => {
                warn!("could not check for {program}: {e}");
                return None;
            }
        }

        let command = SystemCommand::new(program).args(args);
        match self.executor.execute(&command).await {
            Ok(output) => {
                if !output.success {
                    debug!(
                        "{program} exited with {:?}: {}",
                        output.exit_code,
                        output.stderr.trim()
                    );
                }
                Some(output.stdout)
            }
            Err(e) => {
                warn!("failed to run {program}: {e}");
                None
            }
        }
    }
}

#[async_trait]
impl FactService for FactCollectionService {
    async fn collect(&self, config: &CollectConfig) -> Result<FactReport, FactError> {
        if config.confine && !self.platform_allows_collection().await? {
            return Ok(FactReport::default());
        }

        let mut report = FactReport::default();
        for fact in &config.facts {
            match fact {
                FactName::Fibrechannel => {
                    if let Some(stdout) = self.capture("systool", &["-c", "fc_host", "-v"]).await {
                        let facts = fibrechannel::parse(&stdout);
                        debug!("fibrechannel: {} host(s)", facts.hosts.len());
                        report.fibrechannel = Some(facts);
                    }
                }
                FactName::Ipmi => {
                    if let Some(stdout) = self.capture("ipmitool", &["lan", "print"]).await {
                        let facts = ipmi::parse(&stdout);
                        debug!("ipmi: {} channel(s)", facts.channels.len());
                        report.ipmi = Some(facts);
                    }
                }
                FactName::Lldp => {
                    if let Some(stdout) =
                        self.capture("/usr/sbin/lldpcli", &["show", "neighbors"]).await
                    {
                        let facts = lldp::parse(&stdout);
                        debug!("lldp: {} neighbor(s)", facts.neighbors.len());
                        report.lldp = Some(facts);
                    }
                }
            }
        }

        Ok(report)
    }
}
