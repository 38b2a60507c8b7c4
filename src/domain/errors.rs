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

//! Error types at the port seams.
//!
//! The parser core itself is infallible: malformed lines are skipped, not
//! surfaced. Errors exist only around it, for command execution and platform
//! probing, and even there a missing tool is downgraded to an absent fact
//! rather than propagated.

use std::time::Duration;
use thiserror::Error;

/// Domain-level errors that don't expose infrastructure details
#[derive(Debug, Clone, Error)]
pub enum DomainError {
    /// Platform confinement could not be evaluated
    #[error("platform probe failed: {0}")]
    PlatformProbeFailed(String),
    /// Invalid configuration provided
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
}

/// Command execution errors
#[derive(Debug, Clone, Error)]
pub enum CommandError {
    /// The command could not be spawned or its output not captured
    #[error("failed to execute '{program}': {reason}")]
    ExecutionFailed { program: String, reason: String },
    /// The command ran longer than its allotted timeout
    #[error("command '{program}' timed out after {timeout:?}")]
    Timeout { program: String, timeout: Duration },
}

/// Errors visible to fact-report consumers.
///
/// A missing tool or unparseable output never gets here; the only hard
/// failure is a platform probe that cannot answer while confinement is
/// enforced.
#[derive(Debug, Clone, Error)]
pub enum FactError {
    /// Domain operation failed
    #[error(transparent)]
    Domain(#[from] DomainError),
}

impl From<CommandError> for DomainError {
    fn from(err: CommandError) -> Self {
        DomainError::PlatformProbeFailed(err.to_string())
    }
}
