use serde::{Deserialize, Serialize};

/// Canonical channel record, independent of which provider it came from.
///
/// `name` is the cleaned display name (see [`crate::normalize`]); `raw_name`
/// keeps the provider's original string for tooltips and accessibility.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Channel {
    pub id: String,
    pub name: String,
    pub raw_name: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
}

impl Channel {
    /// Identity used for deduplication: two records with the same cleaned
    /// name and the same stream URL are the same channel.
    pub fn dedup_key(&self) -> (String, String) {
        (self.name.clone(), self.url.clone())
    }
}

/// One page of a resolution result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    pub channels: Vec<Channel>,
    /// Page index this slice was produced for.
    pub index: usize,
    /// True when the deduplicated sequence extends past this slice.
    pub has_more: bool,
}
