// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Module records and the bindings a module body runs with

use parking_lot::RwLock;
use std::sync::{Arc, LazyLock};

use crate::error::Result;
use crate::module_system::require::Require;
use crate::package::Package;
use crate::value::Value;

static ROOT_MODULE: LazyLock<Arc<Module>> = LazyLock::new(|| Arc::new(Module::new("")));

/// A loaded (or loading) module
#[derive(Debug)]
pub struct Module {
    /// Canonical directory containing the module, `""` at the root
    directory: String,
    /// `module.exports`
    exports: RwLock<Value>,
}

impl Module {
    pub(crate) fn new(directory: impl Into<String>) -> Self {
        Self {
            directory: directory.into(),
            exports: RwLock::new(Value::object()),
        }
    }

    /// The caller context for top-level requires into a package
    pub fn root() -> Arc<Module> {
        Arc::clone(&ROOT_MODULE)
    }

    /// Canonical directory of this module
    pub fn directory(&self) -> &str {
        &self.directory
    }

    /// Current value of `module.exports`
    pub fn exports(&self) -> Value {
        self.exports.read().clone()
    }

    /// Replace `module.exports`
    pub fn set_exports(&self, value: Value) {
        *self.exports.write() = value;
    }
}

/// Bindings visible to an executing module body
pub struct Scope<'a> {
    require: Require,
    module: Arc<Module>,
    package: &'a Arc<Package>,
    filename: &'a str,
    global: &'a Value,
}

impl<'a> Scope<'a> {
    pub(crate) fn new(
        require: Require,
        module: Arc<Module>,
        package: &'a Arc<Package>,
        filename: &'a str,
        global: &'a Value,
    ) -> Self {
        Self {
            require,
            module,
            package,
            filename,
            global,
        }
    }

    /// `require(specifier)` relative to this module
    pub fn require(&self, specifier: &str) -> Result<Value> {
        self.require.call(specifier)
    }

    /// The require function itself, for capture in exported closures
    pub fn require_fn(&self) -> &Require {
        &self.require
    }

    /// `module`
    pub fn module(&self) -> &Arc<Module> {
        &self.module
    }

    /// Receiver of the module body (the module record)
    pub fn this(&self) -> &Arc<Module> {
        self.module()
    }

    /// `exports`, read through `module.exports` so replacements are seen
    pub fn exports(&self) -> Value {
        self.module().exports()
    }

    /// `module.exports = value`
    pub fn set_exports(&self, value: Value) {
        self.module().set_exports(value);
    }

    /// The package this module belongs to
    pub fn package(&self) -> &'a Arc<Package> {
        self.package
    }

    /// `__filename`: canonical path of this module
    pub fn filename(&self) -> &'a str {
        self.filename
    }

    /// `__dirname`: canonical directory of this module
    pub fn dirname(&self) -> &str {
        self.module.directory()
    }

    /// `global`: the execution context shared by every module
    pub fn global(&self) -> &'a Value {
        self.global
    }
}
