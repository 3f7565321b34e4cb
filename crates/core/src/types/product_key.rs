//! Canonical product identification key.

use core::fmt;

use serde::{Deserialize, Serialize};

/// The canonical identifier of a product within a user's favorites.
///
/// Favorites are deduplicated per owner on this key, so every favorite must
/// carry exactly one. Clients that know a stable upstream id supply it
/// directly; otherwise the key is synthesized from the brand and product
/// name with [`ProductKey::synthesize`], which is deterministic — the same
/// product scanned twice, or found once via dupe search and once manually,
/// lands on the same key.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct ProductKey(String);

impl ProductKey {
    /// Maximum stored length; longer keys are truncated at a slug boundary.
    pub const MAX_LENGTH: usize = 256;

    /// Use an externally supplied key verbatim (trimmed).
    ///
    /// Returns `None` if the input is blank.
    #[must_use]
    pub fn external(key: &str) -> Option<Self> {
        let key = key.trim();
        if key.is_empty() {
            return None;
        }
        let mut key = key.to_owned();
        key.truncate(Self::MAX_LENGTH);
        Some(Self(key))
    }

    /// Synthesize a key from a product's brand and name.
    ///
    /// Lowercases, maps every non-alphanumeric run to a single `-`, and
    /// joins brand and name. Apostrophes, spaces and other punctuation
    /// collapse into the separator, so "L'Oreal" and "l oreal" agree.
    #[must_use]
    pub fn synthesize(brand_name: &str, product_name: &str) -> Self {
        let mut slug = String::with_capacity(brand_name.len() + product_name.len() + 1);
        for part in [brand_name, product_name] {
            let start = slug.len();
            for c in part.trim().chars() {
                if c.is_ascii_alphanumeric() {
                    slug.push(c.to_ascii_lowercase());
                } else if !slug.ends_with('-') && !slug.is_empty() {
                    slug.push('-');
                }
            }
            // separate brand from name unless one side was all punctuation
            if slug.len() > start && !slug.ends_with('-') {
                slug.push('-');
            }
        }
        let slug = slug.trim_matches('-').to_owned();
        let mut slug = if slug.is_empty() {
            "unknown-product".to_owned()
        } else {
            slug
        };
        slug.truncate(Self::MAX_LENGTH);
        Self(slug.trim_end_matches('-').to_owned())
    }

    /// Pick the identification key for a favorite: the supplied key when
    /// present, the synthesized slug otherwise.
    #[must_use]
    pub fn resolve(supplied: Option<&str>, brand_name: &str, product_name: &str) -> Self {
        supplied
            .and_then(Self::external)
            .unwrap_or_else(|| Self::synthesize(brand_name, product_name))
    }

    /// Returns the key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the key and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for ProductKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for ProductKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// SQLx support (with postgres feature)
#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for ProductKey {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for ProductKey {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <String as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(Self(s))
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for ProductKey {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <String as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_external_key_used_verbatim() {
        let key = ProductKey::external("sephora:12345").unwrap();
        assert_eq!(key.as_str(), "sephora:12345");
    }

    #[test]
    fn test_external_blank_is_none() {
        assert!(ProductKey::external("").is_none());
        assert!(ProductKey::external("   ").is_none());
    }

    #[test]
    fn test_synthesize_basic() {
        let key = ProductKey::synthesize("CeraVe", "Hydrating Cleanser");
        assert_eq!(key.as_str(), "cerave-hydrating-cleanser");
    }

    #[test]
    fn test_synthesize_is_deterministic() {
        let a = ProductKey::synthesize("The Ordinary", "Niacinamide 10% + Zinc 1%");
        let b = ProductKey::synthesize("The Ordinary", "Niacinamide 10% + Zinc 1%");
        assert_eq!(a, b);
    }

    #[test]
    fn test_synthesize_normalizes_punctuation() {
        let a = ProductKey::synthesize("L'Oreal", "Revitalift Serum");
        let b = ProductKey::synthesize("l oreal", "revitalift   serum");
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "l-oreal-revitalift-serum");
    }

    #[test]
    fn test_synthesize_empty_inputs() {
        let key = ProductKey::synthesize("", "");
        assert_eq!(key.as_str(), "unknown-product");
    }

    #[test]
    fn test_synthesize_no_trailing_separator() {
        let key = ProductKey::synthesize("CeraVe", "Cleanser!!!");
        assert_eq!(key.as_str(), "cerave-cleanser");
    }

    #[test]
    fn test_resolve_prefers_supplied() {
        let key = ProductKey::resolve(Some("abc-1"), "CeraVe", "Cleanser");
        assert_eq!(key.as_str(), "abc-1");
    }

    #[test]
    fn test_resolve_falls_back_to_synthesis() {
        let key = ProductKey::resolve(None, "CeraVe", "Cleanser");
        assert_eq!(key.as_str(), "cerave-cleanser");

        let blank = ProductKey::resolve(Some("  "), "CeraVe", "Cleanser");
        assert_eq!(blank.as_str(), "cerave-cleanser");
    }

    #[test]
    fn test_serde_transparent() {
        let key = ProductKey::synthesize("CeraVe", "Cleanser");
        let json = serde_json::to_string(&key).unwrap();
        assert_eq!(json, "\"cerave-cleanser\"");
    }
}
