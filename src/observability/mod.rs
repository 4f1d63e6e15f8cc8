//! Observability for folio
//!
//! Structured JSON line logging. Logging never affects store behaviour:
//! write failures of the log sink are ignored.
//!
//! ```ignore
//! use folio::observability::Logger;
//!
//! Logger::info("STORE_ROOT_EXISTS", &[("root", "./data")]);
//! ```

mod logger;

pub use logger::{Logger, Severity};
