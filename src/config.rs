// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Loader configuration.

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Entry point loaded when a package does not declare one
pub const DEFAULT_ENTRY_POINT: &str = "main";

/// Name given to the top of the package graph
pub const ROOT_NAME: &str = "ROOT";

/// Configuration for a [`Loader`](crate::Loader).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LoaderConfig {
    /// Entry point for packages without an `entryPoint`
    pub default_entry_point: String,

    /// `name` and `scopedName` assigned to the root package
    pub root_name: String,

    /// Hand evaluators the program with a trailing `//# sourceURL=` line
    pub annotate_source_urls: bool,

    /// Parse paths ending in `.json` as data instead of executing them
    pub json_modules: bool,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            default_entry_point: DEFAULT_ENTRY_POINT.to_string(),
            root_name: ROOT_NAME.to_string(),
            annotate_source_urls: true,
            json_modules: true,
        }
    }
}

impl LoaderConfig {
    /// Parse configuration from JSON. Missing keys take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Set the default entry point
    pub fn with_default_entry_point(mut self, entry_point: impl Into<String>) -> Self {
        self.default_entry_point = entry_point.into();
        self
    }

    /// Enable or disable `.json` data modules
    pub fn with_json_modules(mut self, enabled: bool) -> Self {
        self.json_modules = enabled;
        self
    }

    /// Set the root package name
    pub fn with_root_name(mut self, name: impl Into<String>) -> Self {
        self.root_name = name.into();
        self
    }
}
