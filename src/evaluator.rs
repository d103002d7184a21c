// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Module body execution
//!
//! The loader never interprets source text itself. It hands each module's
//! [`Program`] and a [`Scope`] to an [`Evaluator`], which must run the body to
//! completion before returning. Implementations include:
//!
//! - [`NativeEvaluator`] - each module's source names a registered Rust function
//! - [`FnEvaluator`] - any closure, e.g. a bridge to an embedded interpreter

use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::error::{RequireError, Result};
use crate::module_system::Scope;

/// Runs module bodies.
///
/// `evaluate` is synchronous: nested `scope.require()` calls happen on the
/// same stack and the module counts as loaded once this returns `Ok`.
pub trait Evaluator: Send + Sync {
    /// Execute `program` with the bindings in `scope`
    fn evaluate(&self, program: &Program<'_>, scope: &Scope<'_>) -> Result<()>;
}

/// A module's program text and its provenance
#[derive(Debug, Clone, Copy)]
pub struct Program<'a> {
    source: &'a str,
    path: &'a str,
    scoped_name: &'a str,
    annotate: bool,
}

impl<'a> Program<'a> {
    pub(crate) fn new(source: &'a str, path: &'a str, scoped_name: &'a str, annotate: bool) -> Self {
        Self {
            source,
            path,
            scoped_name,
            annotate,
        }
    }

    /// Raw source text
    pub fn source(&self) -> &'a str {
        self.source
    }

    /// Canonical path of the module
    pub fn path(&self) -> &'a str {
        self.path
    }

    /// Scoped name of the owning package
    pub fn scoped_name(&self) -> &'a str {
        self.scoped_name
    }

    /// Debugger-facing location, `<scopedName>/<path>`
    pub fn source_url(&self) -> String {
        format!("{}/{}", self.scoped_name, self.path)
    }

    /// Source with a trailing `//# sourceURL=` annotation
    pub fn annotated(&self) -> String {
        format!("{}\n//# sourceURL={}", self.source, self.source_url())
    }

    /// The text an evaluator should run, annotated if the loader asks for it
    pub fn text(&self) -> Cow<'a, str> {
        if self.annotate {
            Cow::Owned(self.annotated())
        } else {
            Cow::Borrowed(self.source)
        }
    }
}

/// Evaluator backed by a closure
pub struct FnEvaluator<F>(F);

/// Wrap a closure as an [`Evaluator`]
pub fn from_fn<F>(f: F) -> FnEvaluator<F>
where
    F: Fn(&Program<'_>, &Scope<'_>) -> Result<()> + Send + Sync,
{
    FnEvaluator(f)
}

impl<F> Evaluator for FnEvaluator<F>
where
    F: Fn(&Program<'_>, &Scope<'_>) -> Result<()> + Send + Sync,
{
    fn evaluate(&self, program: &Program<'_>, scope: &Scope<'_>) -> Result<()> {
        (self.0)(program, scope)
    }
}

type NativeUnit = Arc<dyn Fn(&Scope<'_>) -> Result<()> + Send + Sync>;

/// Links modules to Rust functions.
///
/// A module's source text, trimmed, is the symbol of the unit to run. This
/// trades true dynamic loading for a statically known module set.
#[derive(Default, Clone)]
pub struct NativeEvaluator {
    units: HashMap<String, NativeUnit>,
}

impl NativeEvaluator {
    /// Create an evaluator with no units
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the unit run for modules whose source is `symbol`
    pub fn register<F>(mut self, symbol: impl Into<String>, unit: F) -> Self
    where
        F: Fn(&Scope<'_>) -> Result<()> + Send + Sync + 'static,
    {
        self.units.insert(symbol.into(), Arc::new(unit));
        self
    }

    /// Whether a unit is registered under `symbol`
    pub fn contains(&self, symbol: &str) -> bool {
        self.units.contains_key(symbol)
    }
}

impl fmt::Debug for NativeEvaluator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut symbols: Vec<&String> = self.units.keys().collect();
        symbols.sort();
        f.debug_struct("NativeEvaluator")
            .field("units", &symbols)
            .finish()
    }
}

impl Evaluator for NativeEvaluator {
    fn evaluate(&self, program: &Program<'_>, scope: &Scope<'_>) -> Result<()> {
        let symbol = program.source().trim();
        let unit = self
            .units
            .get(symbol)
            .ok_or_else(|| RequireError::UnknownUnit(symbol.to_string()))?;
        unit(scope)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_url() {
        let program = Program::new("exports.a = 1", "lib/a", "ROOT:util", true);
        assert_eq!(program.source_url(), "ROOT:util/lib/a");
        assert_eq!(
            program.text(),
            "exports.a = 1\n//# sourceURL=ROOT:util/lib/a"
        );
    }

    #[test]
    fn test_unannotated_text_borrows() {
        let program = Program::new("body", "main", "ROOT", false);
        assert!(matches!(program.text(), Cow::Borrowed("body")));
    }

    #[test]
    fn test_register() {
        let evaluator = NativeEvaluator::new().register("main", |_| Ok(()));
        assert!(evaluator.contains("main"));
        assert!(!evaluator.contains("other"));
    }
}
