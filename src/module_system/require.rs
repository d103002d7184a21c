// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! CommonJS require() implementation

use std::fmt;
use std::sync::{Arc, Weak};
use tracing::instrument;

use crate::error::{RequireError, Result};
use crate::module_system::loader::Loader;
use crate::module_system::scope::Module;
use crate::package::Package;
use crate::path;
use crate::value::Value;

/// Where a specifier points, without loading it
#[derive(Debug, Clone)]
pub struct Resolution {
    /// Package that owns the module
    pub package: Arc<Package>,
    /// Canonical path inside that package
    pub path: String,
}

/// How a require function refers to its package
#[derive(Clone)]
enum Owner {
    /// Handed out by `generate_for`; keeps the package alive
    Root(Arc<Package>),
    /// Bound to a module body. Weak, since the package's cache holds the
    /// module and its exports may hold this function.
    Module(Weak<Package>),
}

/// The require() function bound to a package and a calling module
///
/// A require function given to a module body does not keep its package
/// alive. Once every other handle is dropped, calls fail with
/// [`RequireError::PackageDropped`].
#[derive(Clone)]
pub struct Require {
    loader: Loader,
    owner: Owner,
    /// Canonical directory of the calling module
    directory: String,
}

impl Require {
    pub(crate) fn for_root(loader: Loader, package: &Arc<Package>) -> Self {
        Self {
            loader,
            owner: Owner::Root(Arc::clone(package)),
            directory: Module::root().directory().to_string(),
        }
    }

    pub(crate) fn for_module(loader: Loader, package: &Arc<Package>, module: &Module) -> Self {
        Self {
            loader,
            owner: Owner::Module(Arc::downgrade(package)),
            directory: module.directory().to_string(),
        }
    }

    /// require(specifier)
    ///
    /// Bare specifiers load a dependency's entry point; anything starting
    /// with `/`, `./` or `../` loads a module of this package.
    #[instrument(level = "debug", skip(self), fields(directory = %self.directory))]
    pub fn call(&self, specifier: &str) -> Result<Value> {
        let package = self.upgrade(specifier)?;
        if path::is_package_specifier(specifier) {
            self.loader.load_dependency(&package, specifier)
        } else {
            self.loader.load_path(&self.directory, &package, specifier)
        }
    }

    /// require.resolve() - where `specifier` points, without loading it
    pub fn resolve(&self, specifier: &str) -> Result<Resolution> {
        let package = self.upgrade(specifier)?;
        if path::is_package_specifier(specifier) {
            let dependency = self.loader.dependency_of(&package, specifier)?;
            let entry_point = self.loader.entry_point_of(dependency);
            Ok(Resolution {
                package: Arc::clone(dependency),
                path: self.loader.canonical_path(Module::root().directory(), entry_point),
            })
        } else {
            let path = self.loader.canonical_path(&self.directory, specifier);
            Ok(Resolution { package, path })
        }
    }

    /// require.cache - canonical paths loaded in this package so far
    pub fn cached_paths(&self) -> Vec<String> {
        self.package()
            .and_then(|package| package.existing_cache().map(|cache| cache.loaded_paths()))
            .unwrap_or_default()
    }

    /// The package this function requires from, if it is still alive
    pub fn package(&self) -> Option<Arc<Package>> {
        match &self.owner {
            Owner::Root(package) => Some(Arc::clone(package)),
            Owner::Module(package) => package.upgrade(),
        }
    }

    /// Canonical directory of the calling module, `""` at the root
    pub fn directory(&self) -> &str {
        &self.directory
    }

    /// Wrap as a function value taking the specifier as its first argument
    pub fn to_value(&self) -> Value {
        let require = self.clone();
        Value::function(move |args| {
            let specifier = args.first().and_then(Value::as_str).ok_or_else(|| {
                RequireError::thrown("TypeError: require() expects a string specifier")
            })?;
            require.call(specifier)
        })
    }

    fn upgrade(&self, specifier: &str) -> Result<Arc<Package>> {
        self.package()
            .ok_or_else(|| RequireError::PackageDropped(specifier.to_string()))
    }
}

impl fmt::Debug for Require {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let package = self.package();
        f.debug_struct("Require")
            .field("package", &package.as_ref().map(|p| p.scoped_name()))
            .field("directory", &self.directory)
            .finish()
    }
}
