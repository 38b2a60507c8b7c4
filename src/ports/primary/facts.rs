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

use crate::domain::{CollectConfig, FactError, FactReport};
use async_trait::async_trait;

/// Primary port - Main interface offered by the fact collection domain
///
/// This is what external systems (CLI, library consumers) use to collect
/// structured facts from the system inventory tools.
#[async_trait]
pub trait FactService: Send + Sync {
    /// Collect the configured facts from the local system
    ///
    /// Facts whose source tool is not installed, or that are confined away
    /// from this platform, are simply absent from the report; they are not
    /// errors.
    ///
    /// # Arguments
    /// * `config` - Which facts to collect and whether to confine
    ///
    /// # Returns
    /// * `Ok(FactReport)` - Collected facts (possibly empty)
    /// * `Err(FactError)` - The platform probes could not answer while
    ///   confinement was enforced
    async fn collect(&self, config: &CollectConfig) -> Result<FactReport, FactError>;
}
