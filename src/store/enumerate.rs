//! Eager enumeration of a collection
//!
//! Only committed record files (`*.json`) count; `.tmp` files from in-flight
//! or interrupted writes and subdirectories are skipped. Order is whatever
//! the directory iteration yields.
//!
//! File names are matched as raw bytes. A record whose name is not UTF-8 is
//! still read; `list_resources` reports it as an `Io` error.

use std::fs::{self, DirEntry};
use std::io;
use std::path::{Path, PathBuf};

use super::engine::Store;
use super::errors::{StoreError, StoreResult};
use super::paths::{collection_dir, is_record_file_name, resource_name, validate_name};

impl Store {
    /// Raw serialized content of every record in `collection`.
    ///
    /// No lock is taken and nothing is deserialized.
    ///
    /// # Errors
    ///
    /// - `Validation` for an empty or unsafe collection name
    /// - `NotFound` if the collection directory does not exist
    /// - `Io` if the directory or a file cannot be read
    pub fn read_all(&self, collection: &str) -> StoreResult<Vec<String>> {
        validate_name("collection", collection)?;

        let dir = existing_collection_dir(self.root(), collection)?;
        record_paths(&dir, collection)?
            .into_iter()
            .map(|path| {
                fs::read_to_string(&path)
                    .map_err(|e| StoreError::from_io_at(path.display().to_string(), e))
            })
            .collect()
    }

    /// Names of the committed resources in `collection`
    pub fn list_resources(&self, collection: &str) -> StoreResult<Vec<String>> {
        validate_name("collection", collection)?;

        let dir = existing_collection_dir(self.root(), collection)?;
        record_paths(&dir, collection)?
            .iter()
            .map(|path| {
                path.file_name()
                    .and_then(resource_name)
                    .map(str::to_string)
                    .ok_or_else(|| {
                        StoreError::io(
                            format!("record {} has no UTF-8 resource name", path.display()),
                            io::Error::new(io::ErrorKind::InvalidData, "non UTF-8 file name"),
                        )
                    })
            })
            .collect()
    }
}

/// Collection directory, or `NotFound` if it is missing or not a directory.
pub(crate) fn existing_collection_dir(root: &Path, collection: &str) -> StoreResult<PathBuf> {
    let dir = collection_dir(root, collection);
    match fs::metadata(&dir) {
        Ok(meta) if meta.is_dir() => Ok(dir),
        Ok(_) => Err(StoreError::not_found(format!("collection {}", collection))),
        Err(e) => Err(StoreError::from_io_at(format!("collection {}", collection), e)),
    }
}

pub(crate) fn is_record_entry(entry: &DirEntry, collection: &str) -> StoreResult<bool> {
    let file_type = entry.file_type().map_err(|e| {
        StoreError::io(
            format!("failed to stat {} in collection {}", entry.path().display(), collection),
            e,
        )
    })?;
    Ok(file_type.is_file() && is_record_file_name(&entry.file_name()))
}

fn record_paths(dir: &Path, collection: &str) -> StoreResult<Vec<PathBuf>> {
    let entries = fs::read_dir(dir)
        .map_err(|e| StoreError::from_io_at(format!("collection {}", collection), e))?;

    let mut paths = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| {
            StoreError::io(format!("failed to enumerate collection {}", collection), e)
        })?;
        if is_record_entry(&entry, collection)? {
            paths.push(entry.path());
        }
    }
    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use tempfile::TempDir;

    #[test]
    fn test_read_all_returns_raw_records() {
        let temp = TempDir::new().unwrap();
        let store = Store::open(temp.path()).unwrap();

        store.write("users", "a", &json!({"n": 1})).unwrap();
        store.write("users", "b", &json!({"n": 2})).unwrap();

        let records = store.read_all("users").unwrap();
        assert_eq!(records.len(), 2);

        let mut ns: Vec<i64> = records
            .iter()
            .map(|r| {
                assert!(r.ends_with('\n'));
                serde_json::from_str::<Value>(r).unwrap()["n"].as_i64().unwrap()
            })
            .collect();
        ns.sort();
        assert_eq!(ns, vec![1, 2]);
    }

    #[test]
    fn test_read_all_skips_tmp_and_dirs() {
        let temp = TempDir::new().unwrap();
        let store = Store::open(temp.path()).unwrap();

        store.write("users", "a", &json!(1)).unwrap();
        fs::write(temp.path().join("users/b.json.tmp"), "{\"trunc").unwrap();
        fs::create_dir_all(temp.path().join("users/nested")).unwrap();

        assert_eq!(store.read_all("users").unwrap(), vec!["1\n".to_string()]);
    }

    #[test]
    fn test_missing_collection_not_found() {
        let temp = TempDir::new().unwrap();
        let store = Store::open(temp.path()).unwrap();

        assert!(store.read_all("ghosts").unwrap_err().is_not_found());
        assert!(store.list_resources("ghosts").unwrap_err().is_not_found());
        assert!(store.read_all("").unwrap_err().is_validation());
    }

    #[test]
    fn test_empty_collection() {
        let temp = TempDir::new().unwrap();
        let store = Store::open(temp.path()).unwrap();
        fs::create_dir_all(temp.path().join("empty")).unwrap();

        assert!(store.read_all("empty").unwrap().is_empty());
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_non_utf8_record_names_are_not_skipped() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let temp = TempDir::new().unwrap();
        let store = Store::open(temp.path()).unwrap();
        store.write("users", "a", &json!(1)).unwrap();
        fs::write(
            temp.path().join("users").join(OsStr::from_bytes(b"caf\xe9.json")),
            "2\n",
        )
        .unwrap();

        let mut records = store.read_all("users").unwrap();
        records.sort();
        assert_eq!(records, vec!["1\n".to_string(), "2\n".to_string()]);

        let err = store.list_resources("users").unwrap_err();
        assert_eq!(err.code(), "FOLIO_IO_ERROR");
    }

    #[test]
    fn test_list_resources() {
        let temp = TempDir::new().unwrap();
        let store = Store::open(temp.path()).unwrap();

        for name in ["John", "Bon", "Don"] {
            store.write("users", name, &json!({"Name": name})).unwrap();
        }

        let mut names = store.list_resources("users").unwrap();
        names.sort();
        assert_eq!(names, vec!["Bon", "Don", "John"]);
    }
}
