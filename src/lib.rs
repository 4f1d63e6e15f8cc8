//! folio - a minimal JSON document store
//!
//! Records live as individual JSON files under `<root>/<collection>/`.
//!
//! ```no_run
//! use folio::Store;
//! use serde_json::{json, Value};
//!
//! let store = Store::open("./data")?;
//! store.write("users", "John", &json!({"Name": "John"}))?;
//! let john: Value = store.read("users", "John")?;
//! let everyone = store.read_all("users")?;
//! # Ok::<(), folio::StoreError>(())
//! ```

pub mod cli;
pub mod crash_point;
pub mod observability;
pub mod store;

pub use store::{RecordStream, Store, StoreConfig, StoreError, StoreResult};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
