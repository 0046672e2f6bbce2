//! Process-level run ID for tracking sync executions.
//!
//! Each sync process gets a unique ULID at startup. Every record touched in
//! the same run shares this ID in the logs, which makes a nightly run's
//! writes traceable after the fact (which run scored a damage row, which run
//! completed a raid).

use once_cell::sync::Lazy;
use ulid::Ulid;

/// Process-level run ID, generated once at first access.
static RUN_ID: Lazy<String> = Lazy::new(|| Ulid::new().to_string());

/// Returns the process-level run ID.
///
/// Generated once per process, time-ordered (ULIDs sort lexicographically by
/// creation time), 26 characters, URL-safe.
#[inline]
pub fn get() -> &'static str {
    &RUN_ID
}

/// Generates a fresh ULID, for sub-operations that need their own identity.
#[inline]
pub fn generate() -> String {
    Ulid::new().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_returns_same_value() {
        let first = get();
        let second = get();
        assert_eq!(first, second);
        assert_eq!(first.len(), 26);
    }

    #[test]
    fn generate_returns_unique_values() {
        let a = generate();
        let b = generate();
        assert_ne!(a, b);
    }
}
