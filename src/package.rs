// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Package descriptors.
//!
//! A [`Package`] is an immutable bundle of module sources plus the packages
//! it depends on. The only state it ever gains is its `name`/`scopedName`
//! (assigned once, on first resolution) and its module cache (created once,
//! on first `require`).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::{Arc, OnceLock};
use tracing::warn;

use crate::error::Result;
use crate::module_system::ModuleCache;
use crate::path;

/// Source of a single module
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleSource {
    /// Program text
    pub content: String,
}

impl ModuleSource {
    /// Create a module source
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }
}

/// A bundle of modules and its dependency packages
#[derive(Debug, Default)]
pub struct Package {
    name: OnceLock<String>,
    scoped_name: OnceLock<String>,
    entry_point: Option<String>,
    version: Option<String>,
    modules: BTreeMap<String, ModuleSource>,
    dependencies: BTreeMap<String, Arc<Package>>,
    cache: OnceLock<ModuleCache>,
}

impl Package {
    /// Start building a package
    pub fn builder() -> PackageBuilder {
        PackageBuilder::default()
    }

    /// Parse a package snapshot (and its dependencies) from JSON
    pub fn from_json(json: &str) -> Result<Arc<Self>> {
        let descriptor: PackageDescriptor = serde_json::from_str(json)?;
        descriptor.into_package()
    }

    /// Package name, once known
    pub fn name(&self) -> Option<&str> {
        self.name.get().map(String::as_str)
    }

    /// Hierarchical `parent:child` name, once known
    pub fn scoped_name(&self) -> Option<&str> {
        self.scoped_name.get().map(String::as_str)
    }

    /// Declared entry point
    pub fn entry_point(&self) -> Option<&str> {
        self.entry_point.as_deref()
    }

    /// Declared version
    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    /// Source of the module at a canonical path
    pub fn module(&self, path: &str) -> Option<&ModuleSource> {
        self.modules.get(path)
    }

    /// All modules by canonical path
    pub fn modules(&self) -> &BTreeMap<String, ModuleSource> {
        &self.modules
    }

    /// Dependency declared under a bare specifier
    pub fn dependency(&self, specifier: &str) -> Option<&Arc<Package>> {
        self.dependencies.get(specifier)
    }

    /// All dependencies by bare specifier
    pub fn dependencies(&self) -> &BTreeMap<String, Arc<Package>> {
        &self.dependencies
    }

    /// This package's module cache, created on first access
    pub fn cache(&self) -> &ModuleCache {
        self.cache.get_or_init(ModuleCache::new)
    }

    /// The module cache if anything has created it yet
    pub fn existing_cache(&self) -> Option<&ModuleCache> {
        self.cache.get()
    }

    /// Assign the name unless one is already set; returns the name in effect
    pub(crate) fn name_or_init(&self, f: impl FnOnce() -> String) -> &str {
        self.name.get_or_init(f)
    }

    /// Assign the scoped name unless one is already set
    pub(crate) fn scoped_name_or_init(&self, f: impl FnOnce() -> String) -> &str {
        self.scoped_name.get_or_init(f)
    }
}

/// Builder for [`Package`]
#[derive(Debug, Default)]
pub struct PackageBuilder {
    name: Option<String>,
    scoped_name: Option<String>,
    entry_point: Option<String>,
    version: Option<String>,
    modules: BTreeMap<String, ModuleSource>,
    dependencies: BTreeMap<String, Arc<Package>>,
}

impl PackageBuilder {
    /// Preset the name
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Preset the scoped name
    pub fn scoped_name(mut self, scoped_name: impl Into<String>) -> Self {
        self.scoped_name = Some(scoped_name.into());
        self
    }

    /// Set the entry point
    pub fn entry_point(mut self, entry_point: impl Into<String>) -> Self {
        self.entry_point = Some(entry_point.into());
        self
    }

    /// Set the version
    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Add a module. `path` is used verbatim as the canonical key.
    pub fn module(mut self, path: impl Into<String>, content: impl Into<String>) -> Self {
        self.modules.insert(path.into(), ModuleSource::new(content));
        self
    }

    /// Declare a dependency under a bare specifier
    pub fn dependency(mut self, specifier: impl Into<String>, package: Arc<Package>) -> Self {
        self.dependencies.insert(specifier.into(), package);
        self
    }

    /// Finish the package
    pub fn build(self) -> Arc<Package> {
        let package = Package {
            entry_point: self.entry_point,
            version: self.version,
            modules: self.modules,
            dependencies: self.dependencies,
            ..Package::default()
        };
        if let Some(name) = self.name {
            package.name_or_init(|| name);
        }
        if let Some(scoped_name) = self.scoped_name {
            package.scoped_name_or_init(|| scoped_name);
        }
        Arc::new(package)
    }
}

/// A file entry of a package snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileDescriptor {
    /// Program text
    pub content: String,

    /// Path recorded by the bundler
    #[serde(default)]
    pub path: Option<String>,

    /// Entry type (`blob`)
    #[serde(default, rename = "type")]
    pub file_type: Option<String>,
}

/// JSON snapshot of a package, as produced by the bundler.
///
/// Fields the loader has no use for (`source`, `progenitor`, `repository`,
/// ...) are ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageDescriptor {
    /// Package name
    pub name: Option<String>,

    /// Scoped name
    pub scoped_name: Option<String>,

    /// Entry point
    pub entry_point: Option<String>,

    /// Package version
    pub version: Option<String>,

    /// Compiled modules by canonical path
    #[serde(default, alias = "modules")]
    pub distribution: BTreeMap<String, FileDescriptor>,

    /// Dependency snapshots by bare specifier
    #[serde(default)]
    pub dependencies: BTreeMap<String, PackageDescriptor>,
}

impl PackageDescriptor {
    /// Build the package graph this snapshot describes
    pub fn into_package(self) -> Result<Arc<Package>> {
        let mut builder = Package::builder();
        if let Some(name) = self.name {
            builder = builder.name(name);
        }
        if let Some(scoped_name) = self.scoped_name {
            builder = builder.scoped_name(scoped_name);
        }
        if let Some(entry_point) = self.entry_point {
            builder = builder.entry_point(entry_point);
        }
        if let Some(version) = self.version {
            builder = builder.version(version);
        }

        // Keys are used as given; odd ones are kept but can never be required
        for (key, file) in self.distribution {
            if path::normalize::<&str>(&key, &[]) != key {
                warn!(path = %key, "module path is not canonical");
            }
            builder = builder.module(key, file.content);
        }

        for (specifier, dependency) in self.dependencies {
            if !path::is_package_specifier(&specifier) {
                warn!(%specifier, "dependency is not a bare specifier");
            }
            builder = builder.dependency(specifier, dependency.into_package()?);
        }

        Ok(builder.build())
    }
}
