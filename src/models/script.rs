//! Script asset model.

use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// A downloadable script asset (document ID is the slug).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Script {
    /// URL-safe identifier derived from the title
    pub slug: String,
    pub title: String,
    pub description: String,
    /// Where the asset is served from (blob storage URL or external link)
    pub script_url: String,
    /// Premium-gated content requires a resolved premium or admin role
    pub is_premium: bool,
    pub created_at: String,
}

/// Derive a URL-safe slug from a script title.
pub fn slugify(title: &str) -> String {
    title
        .to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect::<String>()
        .split('-')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify_collapses_separators() {
        assert_eq!(slugify("Auto Farm v2"), "auto-farm-v2");
        assert_eq!(slugify("  Speed -- Hack!  "), "speed-hack");
        assert_eq!(slugify("ESP"), "esp");
    }
}
