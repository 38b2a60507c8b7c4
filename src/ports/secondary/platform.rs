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

use crate::domain::DomainError;
use async_trait::async_trait;

/// Whether the host is physical hardware or a guest
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Virtualization {
    /// Bare metal
    Physical,
    /// Virtualized, with the hypervisor/container kind when known
    Virtual(String),
}

/// Secondary port - Platform confinement probing
///
/// The inventory tools this crate wraps only make sense on physical Linux
/// hosts (fibre-channel HBAs, a BMC, switch neighbors). This interface
/// abstracts the checks that confine fact collection to such hosts.
#[async_trait]
pub trait PlatformProbe: Send + Sync {
    /// Kernel name as reported by the system (e.g. "Linux")
    ///
    /// # Returns
    /// * `Ok(String)` - Kernel name
    /// * `Err(DomainError)` - Error probing the platform
    async fn kernel(&self) -> Result<String, DomainError>;

    /// Virtualization state of the host
    ///
    /// # Returns
    /// * `Ok(Virtualization)` - Physical or virtual, with the kind
    /// * `Err(DomainError)` - Error probing the platform
    async fn virtualization(&self) -> Result<Virtualization, DomainError>;
}
