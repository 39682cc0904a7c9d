//
// Copyright 2020 bplist Developers
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.
//

//! # Mapping a resource URL onto a safe filesystem path and writing it.
//!
//! This module performs no content transformation: bytes are written
//! verbatim, and the only text it ever produces is log lines.

use std::fs;
use std::io::{self, Write};
use std::path::{Component, Path, PathBuf};

use url::Url;
use uuid::Uuid;

fn log(sink: &mut Option<&mut dyn Write>, message: &str) -> io::Result<()> {
    if let Some(writer) = sink.as_mut() {
        writeln!(writer, "{}", message)?;
    }
    Ok(())
}

/// Strips `..` and `.` segments out of a URL-style relative path, rejecting
/// (returning `None`) any path that would still climb above its root, such
/// as one that is absolute or begins with `..`.
fn normalize_relative(relative: &str) -> Option<PathBuf> {
    let mut result = PathBuf::new();
    for component in Path::new(relative).components() {
        match component {
            Component::Normal(part) => result.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
        }
    }
    if result.as_os_str().is_empty() {
        None
    } else {
        Some(result)
    }
}

/// True if `path` already exists (as a file or a directory), or its parent
/// exists as something other than a directory. Either condition sends the
/// write through the fresh-name fallback instead.
fn collides(path: &Path) -> bool {
    if path.exists() {
        return true;
    }
    match path.parent() {
        Some(parent) => parent.exists() && !parent.is_dir(),
        None => false,
    }
}

fn write_with_fresh_name(
    output_dir: &Path,
    data: &[u8],
    sink: &mut Option<&mut dyn Write>,
) -> io::Result<Option<String>> {
    let name = Uuid::new_v4().to_string();
    fs::create_dir_all(output_dir)?;
    fs::write(output_dir.join(&name), data)?;
    log(sink, &format!("wrote resource under fresh name {} after path collision", name))?;
    Ok(Some(name))
}

/// Writes a sub-resource's bytes under `output_dir`, deriving its path from
/// `resource_url` relative to `main_url`.
///
/// Returns `Ok(None)` if the resource has no persistable path (its URL path
/// is not rooted at `/`, or its relative path has an empty basename); this
/// is logged, not an error. Returns `Ok(Some(relative_path))` (always
/// forward-slash separated) on success.
pub fn write(
    output_dir: &Path,
    resource_url: &Url,
    main_url: &Url,
    data: &[u8],
    sink: &mut Option<&mut dyn Write>,
) -> io::Result<Option<String>> {
    let resource_path = resource_url.path();
    if !resource_path.starts_with('/') {
        log(sink, &format!("skipping resource with non-rooted path: {}", resource_url))?;
        return Ok(None);
    }

    let main_path = main_url.path();
    let stripped = resource_path.strip_prefix(main_path).unwrap_or(resource_path);
    let relative = stripped.trim_start_matches('/');

    if relative.is_empty() || relative.ends_with('/') {
        log(sink, &format!("skipping directory-like resource: {}", resource_url))?;
        return Ok(None);
    }

    let normalized = match normalize_relative(relative) {
        Some(normalized) => normalized,
        None => {
            log(sink, &format!("rejecting path escaping output directory: {}", resource_url))?;
            return write_with_fresh_name(output_dir, data, sink);
        }
    };

    let path = output_dir.join(&normalized);

    if collides(&path) {
        return write_with_fresh_name(output_dir, data, sink);
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&path, data)?;

    Ok(Some(normalized.to_string_lossy().replace('\\', "/")))
}
