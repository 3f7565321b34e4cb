//! Provenance of a stored favorite.

use serde::{Deserialize, Serialize};

/// Where a favorite came from.
///
/// Wire values are the kebab-case strings the client sends
/// (`"dupe-search"`, `"scanner"`, `"manual"`); the same strings are stored
/// in the `source` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum FavoriteSource {
    /// Saved from a duplicate-search result.
    DupeSearch,
    /// Saved from an image-scan result.
    Scanner,
    /// Entered by hand.
    #[default]
    Manual,
}

impl FavoriteSource {
    /// The wire/storage representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::DupeSearch => "dupe-search",
            Self::Scanner => "scanner",
            Self::Manual => "manual",
        }
    }

    /// Parse the storage representation; unknown values map to `Manual`.
    ///
    /// Rows written by older gateway versions may carry source strings we
    /// no longer emit; treating them as manual keeps reads total.
    #[must_use]
    pub fn from_db(s: &str) -> Self {
        match s {
            "dupe-search" => Self::DupeSearch,
            "scanner" => Self::Scanner,
            _ => Self::Manual,
        }
    }
}

impl core::fmt::Display for FavoriteSource {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_format_is_kebab_case() {
        assert_eq!(
            serde_json::to_string(&FavoriteSource::DupeSearch).unwrap(),
            "\"dupe-search\""
        );
        let parsed: FavoriteSource = serde_json::from_str("\"scanner\"").unwrap();
        assert_eq!(parsed, FavoriteSource::Scanner);
    }

    #[test]
    fn test_db_roundtrip() {
        for source in [
            FavoriteSource::DupeSearch,
            FavoriteSource::Scanner,
            FavoriteSource::Manual,
        ] {
            assert_eq!(FavoriteSource::from_db(source.as_str()), source);
        }
    }

    #[test]
    fn test_unknown_db_value_defaults_to_manual() {
        assert_eq!(FavoriteSource::from_db("import-v1"), FavoriteSource::Manual);
    }

    #[test]
    fn test_default_is_manual() {
        assert_eq!(FavoriteSource::default(), FavoriteSource::Manual);
    }
}
