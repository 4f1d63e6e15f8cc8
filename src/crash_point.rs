//! Crash point injection for durability testing
//!
//! When `FOLIO_CRASH_POINT` names a crash point, the process terminates
//! via `std::process::abort()` on reaching it: no cleanup, no unwinding.
//!
//! ```bash
//! FOLIO_CRASH_POINT=store_before_rename folio write users John --value '{}'
//! ```

use std::sync::OnceLock;

/// Environment variable selecting the crash point
pub const CRASH_POINT_ENV: &str = "FOLIO_CRASH_POINT";

static CRASH_POINT: OnceLock<Option<String>> = OnceLock::new();

#[inline]
fn get_crash_point() -> Option<&'static str> {
    CRASH_POINT
        .get_or_init(|| std::env::var(CRASH_POINT_ENV).ok())
        .as_deref()
}

/// Returns true if `FOLIO_CRASH_POINT` equals the given name.
#[inline]
pub fn crash_point_enabled(name: &str) -> bool {
    get_crash_point().map(|p| p == name).unwrap_or(false)
}

/// Abort the process if the named crash point is enabled.
#[inline]
pub fn maybe_crash(name: &str) {
    if crash_point_enabled(name) {
        eprintln!("[CRASH] Triggering crash at point: {}", name);
        std::process::abort();
    }
}

/// All defined crash point names
pub mod points {
    /// Collection lock held, nothing written yet
    pub const STORE_BEFORE_TEMP_WRITE: &str = "store_before_temp_write";
    /// `<resource>.json.tmp` written (and synced), not yet renamed
    pub const STORE_BEFORE_RENAME: &str = "store_before_rename";
    /// Rename done, collection lock still held
    pub const STORE_AFTER_RENAME: &str = "store_after_rename";

    pub fn all() -> &'static [&'static str] {
        &[
            STORE_BEFORE_TEMP_WRITE,
            STORE_BEFORE_RENAME,
            STORE_AFTER_RENAME,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crash_point_disabled_by_default() {
        assert!(!crash_point_enabled("test_point"));
    }

    #[test]
    fn test_all_crash_points_defined() {
        let all = points::all();
        assert_eq!(all.len(), 3);
        assert!(all.contains(&"store_before_rename"));
    }

    #[test]
    fn test_crash_point_names_are_lowercase_with_underscores() {
        for point in points::all() {
            assert!(
                point.chars().all(|c| c.is_lowercase() || c == '_'),
                "Crash point '{}' should be lowercase with underscores",
                point
            );
        }
    }
}
