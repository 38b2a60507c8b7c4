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

//! Hardware Facts Library
//!
//! This library extracts structured facts from the human-oriented text output
//! of system inventory tools: fibre-channel host topology from
//! `systool -c fc_host -v`, baseboard-management network configuration from
//! `ipmitool lan print`, and link-layer neighbors from
//! `lldpcli show neighbors`. It uses a Ports and Adapters (Hexagonal)
//! architecture for maintainability and testability.
//!
//! # Architecture
//!
//! - **Domain**: the generic line-oriented record parser and per-format
//!   grammar tables, plus the fact collection service
//! - **Ports**: interfaces for command execution and platform probing
//! - **Adapters**: Unix process execution and Linux platform detection
//!
//! The parsers themselves are pure functions from captured stdout to nested
//! record mappings; they can be used without the service layer:
//!
//! ```rust
//! use hardware_facts::domain::parsers::fibrechannel;
//!
//! let output = "  Class Device = \"host0\"\n    port_state = \"Online\"\n";
//! let facts = fibrechannel::parse(output);
//! assert_eq!(facts.hosts["host0"]["port_state"].as_text(), Some("Online"));
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use hardware_facts::{CollectConfig, ContainerConfig, ServiceContainer};
//!
//! async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let container = ServiceContainer::new(ContainerConfig::default());
//!     let report = container
//!         .fact_service()
//!         .collect(&CollectConfig::default())
//!         .await?;
//!     println!("{}", serde_json::to_string_pretty(&report)?);
//!     Ok(())
//! }
//! ```

pub mod adapters;
pub mod container;
pub mod domain;
pub mod ports;

pub use adapters::{LinuxPlatformProbe, UnixCommandExecutor};
pub use container::{ContainerConfig, ContainerConfigBuilder, ServiceContainer};
pub use domain::{
    CollectConfig, CommandError, DomainError, FactError, FactName, FactReport, FactValue,
    FibreChannelFacts, IpmiFacts, LldpFacts, NeighborLinks, Record, ResultSet,
};
pub use ports::{CommandExecutor, CommandOutput, FactService, PlatformProbe, SystemCommand};
