// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Module loader - locates, executes and caches modules

use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::config::LoaderConfig;
use crate::error::{RequireError, Result};
use crate::evaluator::{Evaluator, Program};
use crate::module_system::cache::Claim;
use crate::module_system::require::Require;
use crate::module_system::scope::{Module, Scope};
use crate::package::Package;
use crate::path;
use crate::value::Value;

/// Module loader
///
/// Cheap to clone; clones share the evaluator, configuration and global
/// context. Module caches belong to the packages, not to the loader.
///
/// Every module is executed through the evaluator, except paths ending in
/// `.json` while [`LoaderConfig::json_modules`] is set: those are parsed as
/// data and become the exports directly.
///
/// Loading is single-threaded: two threads loading the same path of one
/// package at the same time see each other's in-flight guard, and one of
/// them fails with [`RequireError::CircularDependency`].
#[derive(Clone)]
pub struct Loader {
    /// Runs module bodies
    evaluator: Arc<dyn Evaluator>,
    /// Loader settings
    config: Arc<LoaderConfig>,
    /// Value bound to `global` in every module
    global: Value,
}

impl Loader {
    /// Create a loader with the default configuration
    pub fn new<E: Evaluator + 'static>(evaluator: E) -> Self {
        Self {
            evaluator: Arc::new(evaluator),
            config: Arc::new(LoaderConfig::default()),
            global: Value::object(),
        }
    }

    /// Replace the configuration
    pub fn with_config(mut self, config: LoaderConfig) -> Self {
        self.config = Arc::new(config);
        self
    }

    /// Replace the execution context bound to `global`
    pub fn with_global(mut self, global: Value) -> Self {
        self.global = global;
        self
    }

    /// The active configuration
    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    /// The execution context bound to `global`
    pub fn global(&self) -> &Value {
        &self.global
    }

    /// Generate the require function for a root package.
    ///
    /// The package is named after `root_name` unless it already has names.
    pub fn generate_for(&self, package: &Arc<Package>) -> Require {
        package.name_or_init(|| self.config.root_name.clone());
        package.scoped_name_or_init(|| self.config.root_name.clone());
        Require::for_root(self.clone(), package)
    }

    /// Load a package's entry point and return its exports
    pub fn load_package(&self, package: &Arc<Package>) -> Result<Value> {
        let entry_point = self.entry_point_of(package);
        self.load_path(Module::root().directory(), package, entry_point)
    }

    /// Resolve a bare specifier against `package`'s dependencies and load it
    pub(crate) fn load_dependency(&self, package: &Arc<Package>, specifier: &str) -> Result<Value> {
        let dependency = self.dependency_of(package, specifier)?;
        let name = dependency.name_or_init(|| specifier.to_string());
        let scoped_name = dependency.scoped_name_or_init(|| self.child_scope(package, specifier));
        debug!(specifier, name, scoped_name, "resolved dependency package");
        self.load_package(dependency)
    }

    /// Load a path specifier required from `directory`, through the cache
    pub(crate) fn load_path(&self, directory: &str, package: &Arc<Package>, path: &str) -> Result<Value> {
        let canonical = self.canonical_path(directory, path);
        let cache = package.cache();

        match cache.claim(&canonical) {
            Claim::Loaded(module) => {
                debug!(path = %canonical, "module cache hit");
                Ok(module.exports())
            }
            Claim::InFlight => Err(RequireError::CircularDependency(canonical)),
            Claim::Claimed => match self.load_module(package, &canonical) {
                Ok(module) => {
                    let exports = module.exports();
                    cache.complete(canonical, module);
                    Ok(exports)
                }
                Err(err) => {
                    if cache.release(&canonical) {
                        warn!(path = %canonical, error = %err, "module failed to load");
                    }
                    Err(err)
                }
            },
        }
    }

    /// Execute the module at `canonical` in a fresh scope.
    ///
    /// Does not consult or update the cache.
    pub(crate) fn load_module(&self, package: &Arc<Package>, canonical: &str) -> Result<Arc<Module>> {
        let source = package
            .module(canonical)
            .ok_or_else(|| RequireError::not_found(canonical, self.name_of(package)))?;

        let dirname = path::dirname(canonical);
        let module = Arc::new(Module::new(dirname));

        if self.config.json_modules && canonical.ends_with(".json") {
            let json: serde_json::Value = serde_json::from_str(&source.content)?;
            module.set_exports(Value::from_json(&json));
            return Ok(module);
        }

        let program = Program::new(
            &source.content,
            canonical,
            self.scoped_name_of(package),
            self.config.annotate_source_urls,
        );
        let require = Require::for_module(self.clone(), package, &module);
        let scope = Scope::new(require, Arc::clone(&module), package, canonical, &self.global);

        debug!(source_url = %program.source_url(), "executing module");
        self.evaluator.evaluate(&program, &scope)?;
        debug!(source_url = %program.source_url(), "module executed");

        Ok(module)
    }

    /// Canonical path `path` names when required from `directory`
    pub(crate) fn canonical_path(&self, directory: &str, path: &str) -> String {
        path::normalize(path, &path::segments(directory))
    }

    pub(crate) fn dependency_of<'p>(&self, package: &'p Package, specifier: &str) -> Result<&'p Arc<Package>> {
        package
            .dependency(specifier)
            .ok_or_else(|| RequireError::DependencyNotFound(specifier.to_string()))
    }

    pub(crate) fn entry_point_of<'p>(&'p self, package: &'p Package) -> &'p str {
        package
            .entry_point()
            .unwrap_or(&self.config.default_entry_point)
    }

    pub(crate) fn child_scope(&self, parent: &Package, specifier: &str) -> String {
        format!("{}:{}", self.scoped_name_of(parent), specifier)
    }

    fn name_of<'p>(&'p self, package: &'p Package) -> &'p str {
        package.name().unwrap_or(&self.config.root_name)
    }

    fn scoped_name_of<'p>(&'p self, package: &'p Package) -> &'p str {
        package.scoped_name().unwrap_or(&self.config.root_name)
    }
}

impl fmt::Debug for Loader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Loader")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
