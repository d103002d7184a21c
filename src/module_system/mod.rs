// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! In-memory CommonJS module system
//!
//! - `require()` function bound to a package and calling module
//! - `module.exports` / `exports`
//! - Synchronous loading, each module executed at most once per package
//! - Circular requires fail instead of observing partial exports

mod cache;
mod loader;
mod require;
mod scope;

pub use cache::{CacheSlot, ModuleCache};
pub use loader::Loader;
pub use require::{Require, Resolution};
pub use scope::{Module, Scope};
