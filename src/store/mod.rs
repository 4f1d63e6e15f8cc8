//! Document store subsystem
//!
//! Records are JSON files at `<root>/<collection>/<resource>.json`.
//!
//! # Design Principles
//!
//! - One lock per collection serializes writers; readers never lock
//! - Writes go to a `.tmp` sibling and are renamed into place
//! - The engine never inspects record contents beyond (de)serialization
//! - Every error is returned to the caller; nothing is retried

mod config;
mod engine;
mod enumerate;
mod errors;
mod locks;
mod paths;
mod stream;

pub use config::StoreConfig;
pub use engine::Store;
pub use errors::{StoreError, StoreResult};
pub use locks::{CollectionLock, LockRegistry};
pub use paths::{normalize_root, validate_name, RECORD_SUFFIX, TEMP_SUFFIX};
pub use stream::RecordStream;
