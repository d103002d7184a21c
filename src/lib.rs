// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! # spacey-require
//!
//! An in-memory CommonJS-style module system for bundled packages.
//!
//! A [`Package`] is a table of modules (canonical path → source text) plus a
//! table of dependency packages. [`Loader::generate_for`] hands out a
//! [`Require`] function that resolves `require(specifier)` calls among them
//! without touching a filesystem:
//!
//! - Path specifiers (`/x`, `./x`, `../x`) are normalized against the calling
//!   module's directory and loaded from the same package
//! - Bare specifiers (`foo`) load the entry point of a declared dependency
//! - Every module executes at most once per package
//! - A module that requires itself before finishing fails with
//!   [`RequireError::CircularDependency`]
//!
//! Module bodies run through a pluggable [`Evaluator`]. [`NativeEvaluator`]
//! links each module to a registered Rust function.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use spacey_require::{Loader, NativeEvaluator, Package, Value};
//!
//! let evaluator = NativeEvaluator::new()
//!     .register("greeting", |scope| {
//!         scope.set_exports(Value::from("hello"));
//!         Ok(())
//!     });
//!
//! let package = Package::builder()
//!     .module("main", "greeting")
//!     .build();
//!
//! let require = Loader::new(evaluator).generate_for(&package);
//! assert_eq!(require.call("./main")?, Value::from("hello"));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod evaluator;
pub mod module_system;
pub mod package;
pub mod path;
pub mod value;

// Re-exports
pub use config::LoaderConfig;
pub use error::{RequireError, Result};
pub use evaluator::{Evaluator, FnEvaluator, NativeEvaluator, Program};
pub use module_system::{CacheSlot, Loader, Module, ModuleCache, Require, Resolution, Scope};
pub use package::{FileDescriptor, ModuleSource, Package, PackageBuilder, PackageDescriptor};
pub use value::{NativeFn, Object, Value};

/// Version of the spacey-require crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
