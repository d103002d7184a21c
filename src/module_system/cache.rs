// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Per-package module cache for require()

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::sync::Arc;

use crate::module_system::scope::Module;

/// State of a canonical path in a package's cache.
///
/// A path with no slot has never been loaded (or its last load failed).
#[derive(Debug, Clone)]
pub enum CacheSlot {
    /// The module body is executing right now
    Loading,
    /// The module finished executing
    Loaded(Arc<Module>),
}

/// Outcome of [`ModuleCache::claim`]
#[derive(Debug)]
pub(crate) enum Claim {
    /// Already loaded, use this record
    Loaded(Arc<Module>),
    /// Another load of this path is still on the stack
    InFlight,
    /// The caller now owns the in-flight guard and must load the module
    Claimed,
}

/// Module cache owned by a single package
#[derive(Debug, Default)]
pub struct ModuleCache {
    /// Cache mapping canonical paths to slots
    cache: DashMap<String, CacheSlot>,
}

impl ModuleCache {
    /// Create a new empty cache
    pub fn new() -> Self {
        Self {
            cache: DashMap::new(),
        }
    }

    /// Get the slot for a canonical path
    pub fn get(&self, path: &str) -> Option<CacheSlot> {
        self.cache.get(path).map(|entry| entry.value().clone())
    }

    /// Whether the module at `path` is mid-execution
    pub fn is_loading(&self, path: &str) -> bool {
        matches!(self.get(path), Some(CacheSlot::Loading))
    }

    /// Look up `path`, placing the in-flight guard if it is absent.
    ///
    /// The shard lock is released before this returns, so the caller may
    /// re-enter the cache while executing the module.
    pub(crate) fn claim(&self, path: &str) -> Claim {
        match self.cache.entry(path.to_string()) {
            Entry::Occupied(entry) => match entry.get() {
                CacheSlot::Loading => Claim::InFlight,
                CacheSlot::Loaded(module) => Claim::Loaded(Arc::clone(module)),
            },
            Entry::Vacant(entry) => {
                entry.insert(CacheSlot::Loading);
                Claim::Claimed
            }
        }
    }

    /// Replace the guard at `path` with the loaded module
    pub(crate) fn complete(&self, path: String, module: Arc<Module>) {
        self.cache.insert(path, CacheSlot::Loaded(module));
    }

    /// Drop the guard at `path`, leaving any loaded module in place.
    ///
    /// Returns whether a guard was removed.
    pub(crate) fn release(&self, path: &str) -> bool {
        self.cache
            .remove_if(path, |_, slot| matches!(slot, CacheSlot::Loading))
            .is_some()
    }

    /// Canonical paths of fully loaded modules, sorted
    pub fn loaded_paths(&self) -> Vec<String> {
        let mut paths: Vec<String> = self
            .cache
            .iter()
            .filter(|entry| matches!(entry.value(), CacheSlot::Loaded(_)))
            .map(|entry| entry.key().clone())
            .collect();
        paths.sort();
        paths
    }

    /// Get the number of slots, guards included
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    /// Check if the cache is empty
    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }
}
