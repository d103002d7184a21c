// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Error types for the module system

use thiserror::Error;

/// Result type for module system operations
pub type Result<T> = std::result::Result<T, RequireError>;

/// Errors raised by `require()`
///
/// Structural failures (missing files, cycles, unknown dependencies) and a
/// module body's own failures all reach the caller of `require` through this
/// type. None of them is retried by the loader.
#[derive(Debug, Error)]
pub enum RequireError {
    /// No module at the canonical path in the package's module table
    #[error("Could not find file at {path} in {package}")]
    NotFound {
        /// Canonical path that was requested
        path: String,
        /// Name of the package that was searched
        package: String,
    },

    /// A module required itself before finishing its initial execution
    #[error("Circular dependency detected when requiring {0}")]
    CircularDependency(String),

    /// Bare specifier with no entry in the dependency table
    #[error("Package: {0} not found.")]
    DependencyNotFound(String),

    /// Failure raised by a module body
    #[error("{0}")]
    Thrown(String),

    /// Native evaluator has no function registered under this symbol
    #[error("No native unit registered as '{0}'")]
    UnknownUnit(String),

    /// JSON parsing error
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// A module's require function outlived its package
    #[error("Cannot require '{0}': its package has been dropped")]
    PackageDropped(String),
}

impl RequireError {
    /// Create an error raised from inside a module body
    pub fn thrown(msg: impl Into<String>) -> Self {
        Self::Thrown(msg.into())
    }

    /// Create a module not found error
    pub fn not_found(path: impl Into<String>, package: impl Into<String>) -> Self {
        Self::NotFound {
            path: path.into(),
            package: package.into(),
        }
    }

    /// Whether this is a missing module error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Whether this is a circular dependency error
    pub fn is_circular(&self) -> bool {
        matches!(self, Self::CircularDependency(_))
    }
}
