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

//! Dependency injection container for fact collection services

use crate::adapters::{LinuxPlatformProbe, UnixCommandExecutor};
use crate::domain::FactCollectionService;
use crate::ports::{CommandExecutor, FactService, PlatformProbe};
use std::sync::Arc;
use std::time::Duration;

/// Configuration for the dependency injection container
#[derive(Debug, Clone)]
pub struct ContainerConfig {
    /// Command execution timeout
    pub command_timeout: Duration,
    /// Command retry count
    pub retry_count: u32,
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self {
            command_timeout: Duration::from_secs(30),
            retry_count: 1,
        }
    }
}

impl ContainerConfig {
    pub fn builder() -> ContainerConfigBuilder {
        ContainerConfigBuilder::default()
    }
}

/// Builder for [`ContainerConfig`]
#[derive(Debug, Default)]
pub struct ContainerConfigBuilder {
    command_timeout: Option<Duration>,
    retry_count: Option<u32>,
}

impl ContainerConfigBuilder {
    pub fn command_timeout(mut self, timeout: Duration) -> Self {
        self.command_timeout = Some(timeout);
        self
    }

    pub fn retry_count(mut self, count: u32) -> Self {
        self.retry_count = Some(count);
        self
    }

    pub fn build(self) -> ContainerConfig {
        let defaults = ContainerConfig::default();
        ContainerConfig {
            command_timeout: self.command_timeout.unwrap_or(defaults.command_timeout),
            retry_count: self.retry_count.unwrap_or(defaults.retry_count),
        }
    }
}

/// Wires the adapters to the domain service
pub struct ServiceContainer {
    fact_service: Arc<dyn FactService>,
}

impl ServiceContainer {
    /// Build a container with the platform adapters
    pub fn new(config: ContainerConfig) -> Self {
        let executor: Arc<dyn CommandExecutor> = Arc::new(UnixCommandExecutor::new(
            config.command_timeout,
            config.retry_count,
        ));
        let platform: Arc<dyn PlatformProbe> =
            Arc::new(LinuxPlatformProbe::new(Arc::clone(&executor)));
        let fact_service = Arc::new(FactCollectionService::new(executor, platform));
        Self { fact_service }
    }

    /// Build a container from custom adapters (used by tests and embedders)
    pub fn with_adapters(
        executor: Arc<dyn CommandExecutor>,
        platform: Arc<dyn PlatformProbe>,
    ) -> Self {
        Self {
            fact_service: Arc::new(FactCollectionService::new(executor, platform)),
        }
    }

    /// The wired fact service
    pub fn fact_service(&self) -> Arc<dyn FactService> {
        Arc::clone(&self.fact_service)
    }
}
