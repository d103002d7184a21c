// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! require() across packages

mod common;

use common::{Counter, init_tracing};
use spacey_require::{Loader, LoaderConfig, NativeEvaluator, Package, RequireError, Value};
use std::sync::Arc;

fn scoped_name_reporter() -> NativeEvaluator {
    NativeEvaluator::new().register("report", |scope| {
        let exports = scope.exports();
        exports.set("scoped", scope.package().scoped_name().unwrap_or_default());
        exports.set("name", scope.package().name().unwrap_or_default());
        Ok(())
    })
}

#[test]
fn test_dependency_gets_scoped_name() {
    init_tracing();
    let foo = Package::builder().module("main", "report").build();
    let root = Package::builder().dependency("foo", Arc::clone(&foo)).build();
    let require = Loader::new(scoped_name_reporter()).generate_for(&root);

    assert_eq!(root.name(), Some("ROOT"));
    assert_eq!(root.scoped_name(), Some("ROOT"));
    assert!(foo.scoped_name().is_none());

    let exports = require.call("foo").unwrap();
    assert_eq!(exports.get("scoped"), Value::from("ROOT:foo"));
    assert_eq!(exports.get("name"), Value::from("foo"));
    assert_eq!(foo.scoped_name(), Some("ROOT:foo"));

    // Stable and cached across repeated requires
    assert!(exports.same(&require.call("foo").unwrap()));
    assert_eq!(foo.scoped_name(), Some("ROOT:foo"));
}

#[test]
fn test_nested_dependency_scoped_names() {
    let bar = Package::builder().module("main", "report").build();
    let foo = Package::builder()
        .module("main", "foo")
        .dependency("bar", Arc::clone(&bar))
        .build();
    let root = Package::builder().dependency("foo", Arc::clone(&foo)).build();

    let evaluator = scoped_name_reporter().register("foo", |scope| {
        scope.set_exports(scope.require("bar")?);
        Ok(())
    });
    let require = Loader::new(evaluator).generate_for(&root);

    let exports = require.call("foo").unwrap();
    assert_eq!(exports.get("scoped"), Value::from("ROOT:foo:bar"));
    assert_eq!(bar.name(), Some("bar"));
}

#[test]
fn test_preset_names_are_kept() {
    let foo = Package::builder()
        .name("jquery")
        .scoped_name("vendor:jquery")
        .module("main", "report")
        .build();
    let root = Package::builder()
        .name("app")
        .dependency("foo", Arc::clone(&foo))
        .build();
    let require = Loader::new(scoped_name_reporter()).generate_for(&root);

    assert_eq!(root.name(), Some("app"));
    assert_eq!(root.scoped_name(), Some("ROOT"));
    let exports = require.call("foo").unwrap();
    assert_eq!(exports.get("name"), Value::from("jquery"));
    assert_eq!(exports.get("scoped"), Value::from("vendor:jquery"));
}

#[test]
fn test_missing_dependency() {
    let root = Package::builder().build();
    let require = Loader::new(NativeEvaluator::new()).generate_for(&root);

    let err = require.call("jquery").unwrap_err();
    assert!(matches!(err, RequireError::DependencyNotFound(ref name) if name == "jquery"));
    assert_eq!(err.to_string(), "Package: jquery not found.");
    assert!(matches!(
        require.resolve("jquery"),
        Err(RequireError::DependencyNotFound(_))
    ));
}

#[test]
fn test_dependency_lookup_uses_whole_specifier() {
    let foo = Package::builder().module("main", "report").build();
    let root = Package::builder().dependency("foo", foo).build();
    let require = Loader::new(scoped_name_reporter()).generate_for(&root);

    let err = require.call("foo/lib").unwrap_err();
    assert!(matches!(err, RequireError::DependencyNotFound(ref name) if name == "foo/lib"));
}

#[test]
fn test_entry_points() {
    let evaluator = NativeEvaluator::new()
        .register("index", |scope| {
            scope.set_exports(Value::from(scope.filename()));
            Ok(())
        })
        .register("nested", |scope| {
            scope.set_exports(scope.require("./index")?);
            Ok(())
        });

    let declared = Package::builder()
        .entry_point("lib/nested")
        .module("lib/nested", "nested")
        .module("lib/index", "index")
        .build();
    let defaulted = Package::builder().module("main", "index").build();
    let root = Package::builder()
        .dependency("declared", declared)
        .dependency("defaulted", defaulted)
        .build();
    let require = Loader::new(evaluator).generate_for(&root);

    assert_eq!(require.call("declared").unwrap(), Value::from("lib/index"));
    assert_eq!(require.call("defaulted").unwrap(), Value::from("main"));
}

#[test]
fn test_configured_default_entry_point_and_root_name() {
    let dep = Package::builder().module("index", "report").build();
    let root = Package::builder().dependency("dep", dep).build();
    let config = LoaderConfig::default()
        .with_default_entry_point("index")
        .with_root_name("TOP");
    let require = Loader::new(scoped_name_reporter())
        .with_config(config)
        .generate_for(&root);

    let exports = require.call("dep").unwrap();
    assert_eq!(exports.get("scoped"), Value::from("TOP:dep"));
    assert_eq!(root.name(), Some("TOP"));
}

#[test]
fn test_missing_entry_point_names_dependency() {
    let dep = Package::builder().module("index", "report").build();
    let root = Package::builder().dependency("dep", dep).build();
    let require = Loader::new(scoped_name_reporter()).generate_for(&root);

    match require.call("dep").unwrap_err() {
        RequireError::NotFound { path, package } => {
            assert_eq!(path, "main");
            assert_eq!(package, "dep");
        }
        other => panic!("expected NotFound, got {:?}", other),
    }
}

#[test]
fn test_sibling_packages_cache_independently() {
    let runs = Counter::default();
    let counter = runs.clone();
    let evaluator = NativeEvaluator::new()
        .register("shared", move |scope| {
            counter.bump();
            scope.exports().set("package", scope.package().scoped_name().unwrap_or_default());
            Ok(())
        })
        .register("uses_shared", |scope| {
            scope.set_exports(scope.require("shared")?);
            Ok(())
        });

    let shared = || Package::builder().module("main", "shared").build();
    let left = Package::builder()
        .module("main", "uses_shared")
        .dependency("shared", shared())
        .build();
    let right = Package::builder()
        .module("main", "uses_shared")
        .dependency("shared", shared())
        .build();
    let root = Package::builder()
        .dependency("left", Arc::clone(&left))
        .dependency("right", Arc::clone(&right))
        .build();
    let require = Loader::new(evaluator).generate_for(&root);

    let from_left = require.call("left").unwrap();
    let from_right = require.call("right").unwrap();

    assert!(!from_left.same(&from_right));
    assert_eq!(from_left.get("package"), Value::from("ROOT:left:shared"));
    assert_eq!(from_right.get("package"), Value::from("ROOT:right:shared"));
    assert_eq!(runs.get(), 2);

    // Same entry point path string, separate caches
    let left_cache = left.existing_cache().unwrap();
    let right_cache = right.existing_cache().unwrap();
    assert_eq!(left_cache.loaded_paths(), vec!["main"]);
    assert_eq!(right_cache.loaded_paths(), vec!["main"]);
    assert!(!std::ptr::eq(left_cache, right_cache));
}

#[test]
fn test_shared_package_object_shares_its_cache() {
    let runs = Counter::default();
    let counter = runs.clone();
    let evaluator = NativeEvaluator::new().register("shared", move |_| {
        counter.bump();
        Ok(())
    });

    let shared = Package::builder().module("main", "shared").build();
    let root = Package::builder()
        .dependency("one", Arc::clone(&shared))
        .dependency("two", Arc::clone(&shared))
        .build();
    let require = Loader::new(evaluator).generate_for(&root);

    let one = require.call("one").unwrap();
    let two = require.call("two").unwrap();
    assert!(one.same(&two));
    assert_eq!(runs.get(), 1);
    // First resolution wins
    assert_eq!(shared.name(), Some("one"));
    assert_eq!(shared.scoped_name(), Some("ROOT:one"));
}

#[test]
fn test_path_specifiers_stay_in_own_package() {
    let evaluator = NativeEvaluator::new()
        .register("ping", |scope| {
            scope.require("pong")?;
            Ok(())
        })
        .register("pong", |scope| {
            scope.require("/main").map(|_| ())
        })
        .register("root_main", |scope| {
            scope.require("ping")?;
            Ok(())
        });

    // "/main" from pong means pong's own entry point, which is still loading
    let pong = Package::builder()
        .module("main", "pong")
        .build();
    let ping = Package::builder()
        .module("main", "ping")
        .dependency("pong", pong)
        .build();
    let root = Package::builder()
        .module("main", "root_main")
        .dependency("ping", ping)
        .build();
    let require = Loader::new(evaluator).generate_for(&root);

    let err = require.call("./main").unwrap_err();
    assert!(matches!(err, RequireError::CircularDependency(ref path) if path == "main"));
    assert!(root.cache().is_empty());
}

#[test]
fn test_resolve_dependency() {
    let dep = Package::builder()
        .entry_point("./lib/../index")
        .module("index", "report")
        .build();
    let root = Package::builder().dependency("dep", Arc::clone(&dep)).build();
    let require = Loader::new(scoped_name_reporter()).generate_for(&root);

    let resolution = require.resolve("dep").unwrap();
    assert!(Arc::ptr_eq(&resolution.package, &dep));
    assert_eq!(resolution.path, "index");
    assert!(dep.name().is_none());
}

#[test]
fn test_snapshot_end_to_end() {
    let snapshot = r#"{
        "version": "0.8.3",
        "entryPoint": "interactive",
        "distribution": {
            "interactive": { "path": "interactive", "content": "interactive", "type": "blob" },
            "pixie.json": { "path": "pixie.json", "content": "{\"version\":\"0.8.3\"}", "type": "blob" }
        },
        "dependencies": {
            "jquery": {
                "distribution": { "main": { "content": "jquery" } }
            }
        }
    }"#;

    let evaluator = NativeEvaluator::new()
        .register("interactive", |scope| {
            let exports = scope.exports();
            exports.set("config", scope.require("./pixie.json")?);
            exports.set("dollar", scope.require("jquery")?);
            Ok(())
        })
        .register("jquery", |scope| {
            scope.set_exports(Value::from("$"));
            Ok(())
        });

    let root = Package::from_json(snapshot).unwrap();
    let loader = Loader::new(evaluator);
    let require = loader.generate_for(&root);
    let exports = loader.load_package(&root).unwrap();

    assert_eq!(exports.get("dollar"), Value::from("$"));
    assert_eq!(exports.get("config").get("version"), Value::from("0.8.3"));
    assert!(exports.same(&require.call("./interactive").unwrap()));
    assert_eq!(require.cached_paths(), vec!["interactive", "pixie.json"]);
    assert_eq!(
        root.dependency("jquery").unwrap().scoped_name(),
        Some("ROOT:jquery")
    );
}
