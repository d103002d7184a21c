// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Canonical module paths
//!
//! Module paths are always `/`-separated, whatever the host platform, and
//! canonical paths carry neither a leading nor a trailing separator.

/// Path segment separator
pub const SEPARATOR: char = '/';

/// Normalize `path` against the `base` directory segments.
///
/// An absolute `path` (leading `/`) ignores `base`. `..` pops the last
/// segment and is a no-op at the root; `.` and empty segments are dropped.
pub fn normalize<S: AsRef<str>>(path: &str, base: &[S]) -> String {
    let base: &[S] = if path.starts_with(SEPARATOR) { &[] } else { base };

    let mut components: Vec<&str> = Vec::new();
    let pieces = base
        .iter()
        .map(AsRef::as_ref)
        .chain(path.split(SEPARATOR));

    for component in pieces {
        match component {
            "" | "." => continue,
            ".." => {
                components.pop();
            }
            c => components.push(c),
        }
    }

    let normalized = components.join("/");
    tracing::trace!(path, normalized = %normalized, "normalized module path");
    normalized
}

/// Directory part of a canonical path (`""` for root-level files)
pub fn dirname(path: &str) -> &str {
    match path.rfind(SEPARATOR) {
        Some(idx) => &path[..idx],
        None => "",
    }
}

/// Split a directory into base segments for [`normalize`]
pub fn segments(dir: &str) -> Vec<&str> {
    dir.split(SEPARATOR).collect()
}

/// Whether `specifier` names a dependency package rather than a file.
///
/// Anything not starting with `/`, `./` or `../` is a bare specifier. The
/// empty string is treated as a path.
pub fn is_package_specifier(specifier: &str) -> bool {
    !(specifier.is_empty()
        || specifier.starts_with('/')
        || specifier.starts_with("./")
        || specifier.starts_with("../"))
}
