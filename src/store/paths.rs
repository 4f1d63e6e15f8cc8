//! Key to path resolution
//!
//! Layout:
//! - `<root>/<collection>/<resource>.json`: committed record
//! - `<root>/<collection>/<resource>.json.tmp`: in-flight write

use std::ffi::{OsStr, OsString};
use std::fs;
use std::path::{Component, Path, PathBuf};

use super::errors::{StoreError, StoreResult};

/// Suffix of committed record files
pub const RECORD_SUFFIX: &str = ".json";

/// Suffix appended to the record path while a write is in flight
pub const TEMP_SUFFIX: &str = ".tmp";

/// Reject names that are empty or could escape the collection directory.
pub fn validate_name(kind: &str, name: &str) -> StoreResult<()> {
    if name.is_empty() {
        return Err(StoreError::validation(format!("missing {} name", kind)));
    }
    if name == "." || name == ".." {
        return Err(StoreError::validation(format!(
            "{} name '{}' is reserved",
            kind, name
        )));
    }
    if name.contains(['/', '\\', '\0']) {
        return Err(StoreError::validation(format!(
            "{} name '{}' contains a path separator or NUL byte",
            kind, name
        )));
    }
    Ok(())
}

/// Lexically clean a path: drop `.`, fold `name/..`, never touch the filesystem.
///
/// An empty result becomes `.`.
pub fn normalize_root(path: &Path) -> PathBuf {
    let mut parts: Vec<Component<'_>> = Vec::new();

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match parts.last() {
                Some(Component::Normal(_)) => {
                    parts.pop();
                }
                // `/..` is `/`
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => parts.push(component),
            },
            other => parts.push(other),
        }
    }

    if parts.is_empty() {
        return PathBuf::from(".");
    }
    parts.iter().collect()
}

pub fn collection_dir(root: &Path, collection: &str) -> PathBuf {
    root.join(collection)
}

/// Final path for a write: `<root>/<collection>/<resource>.json`
pub fn record_path(root: &Path, collection: &str, resource: &str) -> PathBuf {
    collection_dir(root, collection).join(format!("{}{}", resource, RECORD_SUFFIX))
}

/// Sibling temp path: `<record>.tmp`
pub fn temp_path(record: &Path) -> PathBuf {
    let mut name: OsString = record.as_os_str().to_owned();
    name.push(TEMP_SUFFIX);
    PathBuf::from(name)
}

/// Locate an existing record, accepting bare or `.json`-suffixed names.
///
/// `<resource>.json` is probed first, so a resource literally named
/// `x.json` is never shadowed by resource `x`. Only when that path is absent
/// does a `.json`-suffixed name fall back to the file as given.
pub fn resolve_existing(root: &Path, collection: &str, resource: &str) -> StoreResult<PathBuf> {
    let key = format!("{}/{}", collection, resource);
    let suffixed = record_path(root, collection, resource);

    let missing = match fs::metadata(&suffixed) {
        Ok(meta) if meta.is_file() => return Ok(suffixed),
        Ok(_) => StoreError::not_found(key),
        Err(e) => StoreError::from_io_at(key, e),
    };

    if missing.is_not_found() && resource.ends_with(RECORD_SUFFIX) {
        let as_given = collection_dir(root, collection).join(resource);
        if as_given.is_file() {
            return Ok(as_given);
        }
    }
    Err(missing)
}

/// Whether a directory entry name is a committed record (not a `.tmp` leftover).
///
/// Matches on raw bytes so names that are not valid UTF-8 still count.
pub fn is_record_file_name(name: &OsStr) -> bool {
    let bytes = name.as_encoded_bytes();
    bytes.len() > RECORD_SUFFIX.len() && bytes.ends_with(RECORD_SUFFIX.as_bytes())
}

/// Resource name of a record file name: `John.json` -> `John`
pub fn resource_name(file_name: &OsStr) -> Option<&str> {
    file_name
        .to_str()
        .and_then(|n| n.strip_suffix(RECORD_SUFFIX))
        .filter(|n| !n.is_empty())
}
