//! Publishing lifecycle states and their fallback priority table.
//!
//! The priority table is the single source of truth for "which version
//! wins" when multiple versions exist for a root and the caller does not
//! ask for an exact status. It is deliberately defined in exactly one
//! place; every read path orders through [`PublishingStatus::priority`].

use serde::{Deserialize, Serialize};

use crate::error::VersioningError;

/// Lifecycle state of a version, or of a single language within a version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PublishingStatus {
    /// Being edited, never published.
    Draft,
    /// Editable copy of a previously published version.
    Modified,
    /// The one live, publicly visible version of its root.
    Published,
    /// Was published and has since been superseded by a newer publish.
    OldPublished,
    /// Archived / soft-deleted. Terminal except for an explicit restore.
    Deleted,
}

impl PublishingStatus {
    /// The "live" set used by almost all read paths.
    pub const LIVE: &'static [PublishingStatus] = &[
        PublishingStatus::Draft,
        PublishingStatus::Modified,
        PublishingStatus::Published,
    ];

    /// Sort rank for fallback selection: lower wins.
    ///
    /// Published = 0, Draft = 1, Modified = 2, everything else last.
    pub const fn priority(self) -> u8 {
        match self {
            Self::Published => 0,
            Self::Draft => 1,
            Self::Modified => 2,
            Self::OldPublished | Self::Deleted => 3,
        }
    }

    /// `true` for statuses in the live set (Draft, Modified, Published).
    pub const fn is_live(self) -> bool {
        matches!(self, Self::Draft | Self::Modified | Self::Published)
    }

    /// Archived or superseded: excluded from default queries.
    pub const fn is_removed(self) -> bool {
        matches!(self, Self::OldPublished | Self::Deleted)
    }

    /// Status code as stored in the database.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Modified => "modified",
            Self::Published => "published",
            Self::OldPublished => "old_published",
            Self::Deleted => "deleted",
        }
    }

    /// All states, in priority order.
    pub const ALL: &'static [PublishingStatus] = &[
        PublishingStatus::Published,
        PublishingStatus::Draft,
        PublishingStatus::Modified,
        PublishingStatus::OldPublished,
        PublishingStatus::Deleted,
    ];
}

impl std::fmt::Display for PublishingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PublishingStatus {
    type Err = VersioningError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(Self::Draft),
            "modified" => Ok(Self::Modified),
            "published" => Ok(Self::Published),
            "old_published" => Ok(Self::OldPublished),
            "deleted" => Ok(Self::Deleted),
            other => Err(VersioningError::UnknownStatusCode(other.to_string())),
        }
    }
}

/// Virtual groupings used only for filtering version queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusFilter {
    /// Draft, Modified and Published. The default everywhere.
    Live,
    /// Archived or superseded versions only.
    Removed,
    /// History queries: no filtering at all.
    AllIncludingRemoved,
}

impl StatusFilter {
    pub const fn matches(self, status: PublishingStatus) -> bool {
        match self {
            Self::Live => status.is_live(),
            Self::Removed => status.is_removed(),
            Self::AllIncludingRemoved => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_table() {
        assert_eq!(PublishingStatus::Published.priority(), 0);
        assert_eq!(PublishingStatus::Draft.priority(), 1);
        assert_eq!(PublishingStatus::Modified.priority(), 2);
        assert_eq!(PublishingStatus::OldPublished.priority(), 3);
        assert_eq!(PublishingStatus::Deleted.priority(), 3);
    }

    #[test]
    fn test_live_set() {
        assert!(PublishingStatus::Draft.is_live());
        assert!(PublishingStatus::Modified.is_live());
        assert!(PublishingStatus::Published.is_live());
        assert!(!PublishingStatus::OldPublished.is_live());
        assert!(!PublishingStatus::Deleted.is_live());
    }

    #[test]
    fn test_removed_is_complement_of_live() {
        for status in PublishingStatus::ALL {
            assert_ne!(status.is_live(), status.is_removed());
        }
    }

    #[test]
    fn test_status_codes_round_trip() {
        for status in PublishingStatus::ALL {
            assert_eq!(status.as_str().parse::<PublishingStatus>().unwrap(), *status);
        }
    }

    #[test]
    fn test_unknown_status_code_rejected() {
        assert!("archived".parse::<PublishingStatus>().is_err());
        assert!("".parse::<PublishingStatus>().is_err());
    }

    #[test]
    fn test_filter_groupings() {
        assert!(StatusFilter::Live.matches(PublishingStatus::Draft));
        assert!(!StatusFilter::Live.matches(PublishingStatus::Deleted));
        assert!(StatusFilter::Removed.matches(PublishingStatus::OldPublished));
        assert!(!StatusFilter::Removed.matches(PublishingStatus::Published));
        for status in PublishingStatus::ALL {
            assert!(StatusFilter::AllIncludingRemoved.matches(*status));
        }
    }

    #[test]
    fn test_serde_codes_match_db_codes() {
        let json = serde_json::to_string(&PublishingStatus::OldPublished).unwrap();
        assert_eq!(json, "\"old_published\"");
    }
}
