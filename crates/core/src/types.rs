//! Identifier and timestamp aliases shared across the engine.

use serde::{Deserialize, Serialize};

/// Stable identity shared by every version of one logical content item.
pub type RootId = uuid::Uuid;

/// Identity of a single persisted version under a root.
pub type VersionId = uuid::Uuid;

/// Identity of a language a version can be available in.
pub type LanguageId = uuid::Uuid;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Monotonic version counters used for ordering; never reused.
///
/// Drafts of a never-published item live at major 0 (`0.1`, `0.2`, …).
/// Publishing moves a version to the next major (`1.0`, `2.0`, …) and
/// editable clones of a published version increment the minor within the
/// published major (`1.1`, `1.2`, …).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct VersionNumber {
    pub major: i32,
    pub minor: i32,
}

impl VersionNumber {
    pub const fn new(major: i32, minor: i32) -> Self {
        Self { major, minor }
    }

    /// Version number assigned to the very first draft under a new root.
    pub const fn initial() -> Self {
        Self { major: 0, minor: 1 }
    }

    /// The next editable version within the same major.
    pub const fn next_minor(self) -> Self {
        Self {
            major: self.major,
            minor: self.minor + 1,
        }
    }

    /// The version number a publish produces: next major, minor reset.
    pub const fn next_major(self) -> Self {
        Self {
            major: self.major + 1,
            minor: 0,
        }
    }

    /// `true` once this version has been through at least one publish.
    pub const fn has_been_published(self) -> bool {
        self.major > 0
    }
}

impl std::fmt::Display for VersionNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_is_zero_one() {
        assert_eq!(VersionNumber::initial(), VersionNumber::new(0, 1));
    }

    #[test]
    fn test_next_minor_keeps_major() {
        assert_eq!(VersionNumber::new(2, 3).next_minor(), VersionNumber::new(2, 4));
    }

    #[test]
    fn test_next_major_resets_minor() {
        assert_eq!(VersionNumber::new(1, 4).next_major(), VersionNumber::new(2, 0));
    }

    #[test]
    fn test_ordering_is_major_then_minor() {
        assert!(VersionNumber::new(0, 9) < VersionNumber::new(1, 0));
        assert!(VersionNumber::new(1, 0) < VersionNumber::new(1, 1));
        assert!(VersionNumber::new(1, 1) < VersionNumber::new(2, 0));
    }

    #[test]
    fn test_display() {
        assert_eq!(VersionNumber::new(3, 0).to_string(), "3.0");
    }
}
