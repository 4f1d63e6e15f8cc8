//! Store engine: bootstrap, atomic writes, reads, deletes
//!
//! A write holds its collection lock for the whole sequence:
//! 1. Create the collection directory if missing
//! 2. Serialize the value (tab-indented JSON + trailing newline)
//! 3. Write `<resource>.json.tmp` and fsync it
//! 4. Rename onto `<resource>.json` (the atomicity boundary)
//! 5. fsync the collection directory
//!
//! A crash before step 4 leaves at most an orphaned `.tmp` file; the
//! committed `<resource>.json`, if any, is untouched. Orphans are not
//! cleaned up.
//!
//! Reads take no lock. Because the rename is atomic a reader sees either
//! the previous or the new version of a record, never a partial one.

use std::fs::{self, DirBuilder, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::PoisonError;

use serde::de::DeserializeOwned;
use serde::Serialize;

use super::config::StoreConfig;
use super::errors::{StoreError, StoreResult};
use super::locks::LockRegistry;
use super::paths::{
    collection_dir, normalize_root, record_path, resolve_existing, temp_path, validate_name,
};
use crate::crash_point::{maybe_crash, points};
use crate::observability::Logger;

/// A JSON document store rooted at one directory.
///
/// Construct once and share (`Arc<Store>`): the collection locks live in
/// the instance, so two `Store`s over the same root do not exclude each
/// other's writers.
#[derive(Debug)]
pub struct Store {
    root: PathBuf,
    config: StoreConfig,
    locks: LockRegistry,
}

impl Store {
    /// Open a store at `root` with default configuration.
    ///
    /// Creates the directory (and parents) if it does not exist. An existing
    /// directory is used as-is.
    pub fn open(root: impl AsRef<Path>) -> StoreResult<Self> {
        Self::with_config(StoreConfig::new(root.as_ref()))
    }

    pub fn with_config(config: StoreConfig) -> StoreResult<Self> {
        config.validate()?;

        let root = normalize_root(&config.root_dir);
        let root_str = root.display().to_string();

        match fs::metadata(&root) {
            Ok(meta) if meta.is_dir() => {
                Logger::info("STORE_ROOT_EXISTS", &[("root", root_str.as_str())]);
            }
            Ok(_) => {
                Logger::warn("STORE_ROOT_NOT_DIRECTORY", &[("root", root_str.as_str())]);
            }
            Err(_) => {
                create_dir_all(&root, config.dir_mode).map_err(|e| {
                    StoreError::io(format!("failed to create root directory {}", root_str), e)
                })?;
                Logger::info("STORE_ROOT_CREATED", &[("root", root_str.as_str())]);
            }
        }

        Ok(Self {
            root,
            config,
            locks: LockRegistry::new(),
        })
    }

    /// Normalized root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn locks(&self) -> &LockRegistry {
        &self.locks
    }

    /// Persist `value` as `<collection>/<resource>.json`, replacing any
    /// previous version (last writer wins).
    ///
    /// # Errors
    ///
    /// - `Validation` for an empty or unsafe name, before any I/O
    /// - `Serialization` if `value` cannot be encoded
    /// - `Io` for directory, temp file or rename failures
    pub fn write<T>(&self, collection: &str, resource: &str, value: &T) -> StoreResult<()>
    where
        T: Serialize + ?Sized,
    {
        validate_name("collection", collection)?;
        validate_name("resource", resource)?;

        let lock = self.locks.lock_for(collection)?;
        // The mutex guards no data, so a poisoned lock is still usable
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);

        let result = self.write_locked(collection, resource, value);
        if let Err(ref e) = result {
            let message = e.to_string();
            Logger::error(
                "RECORD_WRITE_FAILED",
                &[
                    ("code", e.code()),
                    ("collection", collection),
                    ("error", message.as_str()),
                    ("resource", resource),
                ],
            );
        }
        result
    }

    fn write_locked<T>(&self, collection: &str, resource: &str, value: &T) -> StoreResult<()>
    where
        T: Serialize + ?Sized,
    {
        let dir = collection_dir(&self.root, collection);
        create_dir_all(&dir, self.config.dir_mode).map_err(|e| {
            StoreError::io(
                format!("failed to create collection directory {}", dir.display()),
                e,
            )
        })?;

        let bytes = encode_record(value).map_err(|e| StoreError::Serialization {
            key: format!("{}/{}", collection, resource),
            source: e,
        })?;

        let final_path = record_path(&self.root, collection, resource);
        let tmp_path = temp_path(&final_path);

        maybe_crash(points::STORE_BEFORE_TEMP_WRITE);

        if let Err(e) = self.write_temp(&tmp_path, &bytes) {
            let _ = fs::remove_file(&tmp_path);
            return Err(StoreError::io(
                format!("failed to write {}", tmp_path.display()),
                e,
            ));
        }

        maybe_crash(points::STORE_BEFORE_RENAME);

        if let Err(e) = fs::rename(&tmp_path, &final_path) {
            let _ = fs::remove_file(&tmp_path);
            return Err(StoreError::io(
                format!(
                    "failed to rename {} to {}",
                    tmp_path.display(),
                    final_path.display()
                ),
                e,
            ));
        }

        if self.config.fsync {
            sync_dir(&dir);
        }

        maybe_crash(points::STORE_AFTER_RENAME);

        let size = bytes.len().to_string();
        Logger::trace(
            "RECORD_WRITTEN",
            &[
                ("bytes", size.as_str()),
                ("collection", collection),
                ("resource", resource),
            ],
        );
        Ok(())
    }

    fn write_temp(&self, path: &Path, bytes: &[u8]) -> io::Result<()> {
        let mut options = OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(self.config.file_mode);
        }

        let mut file = options.open(path)?;
        file.write_all(bytes)?;
        if self.config.fsync {
            file.sync_all()?;
        }
        Ok(())
    }

    /// Read and deserialize `<collection>/<resource>`.
    ///
    /// `resource` may be given bare (`John`) or suffixed (`John.json`).
    ///
    /// # Errors
    ///
    /// - `Validation` for an empty or unsafe name
    /// - `NotFound` if neither candidate path exists
    /// - `Io` if the file cannot be read
    /// - `Deserialization` if the content is not a `T`
    pub fn read<T>(&self, collection: &str, resource: &str) -> StoreResult<T>
    where
        T: DeserializeOwned,
    {
        validate_name("collection", collection)?;
        validate_name("resource", resource)?;

        let path = resolve_existing(&self.root, collection, resource)?;
        decode_record(&path)
    }

    /// Remove `<collection>/<resource>` under the collection lock.
    pub fn delete(&self, collection: &str, resource: &str) -> StoreResult<()> {
        validate_name("collection", collection)?;
        validate_name("resource", resource)?;

        let lock = self.locks.lock_for(collection)?;
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);

        let path = resolve_existing(&self.root, collection, resource)?;
        fs::remove_file(&path).map_err(|e| {
            StoreError::from_io_at(format!("{}/{}", collection, resource), e)
        })?;

        if self.config.fsync {
            sync_dir(&collection_dir(&self.root, collection));
        }

        Logger::trace(
            "RECORD_DELETED",
            &[("collection", collection), ("resource", resource)],
        );
        Ok(())
    }
}

/// Tab-indented JSON terminated by a newline
fn encode_record<T>(value: &T) -> serde_json::Result<Vec<u8>>
where
    T: Serialize + ?Sized,
{
    let mut out = Vec::with_capacity(128);
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"\t");
    let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
    value.serialize(&mut serializer)?;
    out.push(b'\n');
    Ok(out)
}

/// Read one record file fully and deserialize it.
pub(crate) fn decode_record<T>(path: &Path) -> StoreResult<T>
where
    T: DeserializeOwned,
{
    let bytes =
        fs::read(path).map_err(|e| StoreError::from_io_at(path.display().to_string(), e))?;

    serde_json::from_slice(&bytes).map_err(|e| StoreError::Deserialization {
        path: path.display().to_string(),
        source: e,
    })
}

fn create_dir_all(path: &Path, mode: u32) -> io::Result<()> {
    let mut builder = DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(mode);
    }
    #[cfg(not(unix))]
    let _ = mode;
    builder.create(path)
}

/// Best-effort: makes the rename durable on filesystems that need it.
fn sync_dir(dir: &Path) {
    if let Ok(handle) = File::open(dir) {
        let _ = handle.sync_all();
    }
}
