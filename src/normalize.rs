use regex::Regex;
use serde_json::{Map, Value};

use crate::channel::Channel;

/// URL schemes a candidate may use, plus protocol-relative `//`.
pub const ACCEPTED_SCHEMES: &[&str] = &["http://", "https://", "rtmp://", "rtmps://", "udp://"];

// Extraction rule tables, evaluated in priority order with first-match-wins.
// Upstream feeds disagree on field names; the alias sets below cover the
// shapes seen across TVGarden, iptv-org and generic playlist exports.
const IPTV_ARRAY_FIELDS: &[&str] = &["iptv_urls"];
const GENERIC_URL_FIELDS: &[&str] = &["url", "stream", "stream_url", "src", "link", "href", "uri"];
const YOUTUBE_ARRAY_FIELDS: &[&str] = &["youtube_urls"];
const NAME_FIELDS: &[&str] = &["name", "title", "tvg_name", "channel", "display_name"];
const ID_FIELDS: &[&str] = &["nanoid", "id", "channel_id", "tvg_id"];
const CATEGORY_FIELDS: &[&str] = &["category", "group_title", "group"];
const LOGO_FIELDS: &[&str] = &["logo", "tvg_logo", "logo_url", "icon"];

/// Validity predicate: trimmed, non-empty, accepted scheme or
/// protocol-relative. Returns the trimmed URL on success.
pub fn valid_url(candidate: &str) -> Option<String> {
    let candidate = candidate.trim();
    if candidate.is_empty() {
        return None;
    }
    let lower = candidate.to_lowercase();
    if ACCEPTED_SCHEMES.iter().any(|s| lower.starts_with(s)) || candidate.starts_with("//") {
        return Some(candidate.to_string());
    }
    None
}

// Some feeds nest stream URLs one level deep (arrays of arrays); collect
// every string either way.
fn collect_strings(value: &Value, out: &mut Vec<String>) {
    match value {
        Value::String(s) => out.push(s.clone()),
        Value::Array(items) => {
            for item in items {
                collect_strings(item, out);
            }
        }
        _ => {}
    }
}

fn url_from_iptv_arrays(record: &Map<String, Value>) -> Option<String> {
    first_valid_in_arrays(record, IPTV_ARRAY_FIELDS)
}

fn url_from_generic_field(record: &Map<String, Value>) -> Option<String> {
    for field in GENERIC_URL_FIELDS {
        if let Some(Value::String(s)) = record.get(*field) {
            if let Some(url) = valid_url(s) {
                return Some(url);
            }
        }
    }
    None
}

fn url_from_youtube_arrays(record: &Map<String, Value>) -> Option<String> {
    first_valid_in_arrays(record, YOUTUBE_ARRAY_FIELDS)
}

fn first_valid_in_arrays(record: &Map<String, Value>, fields: &[&str]) -> Option<String> {
    for field in fields {
        if let Some(value @ Value::Array(_)) = record.get(*field) {
            let mut candidates = Vec::new();
            collect_strings(value, &mut candidates);
            if let Some(url) = candidates.iter().find_map(|c| valid_url(c)) {
                return Some(url);
            }
        }
    }
    None
}

type UrlRule = fn(&Map<String, Value>) -> Option<String>;

const URL_RULES: &[UrlRule] = &[url_from_iptv_arrays, url_from_generic_field, url_from_youtube_arrays];

/// Best playable URL for a raw record, or None if nothing validates.
pub fn extract_url(record: &Value) -> Option<String> {
    let record = record.as_object()?;
    URL_RULES.iter().find_map(|rule| rule(record))
}

/// Cheap probe used by the fetcher to decide whether a payload is worth
/// accepting: at least one record must carry a playable URL.
pub fn has_candidate(record: &Value) -> bool {
    extract_url(record).is_some()
}

// Ids arrive as strings or numbers depending on the provider.
fn field_string(record: &Map<String, Value>, fields: &[&str]) -> Option<String> {
    for field in fields {
        match record.get(*field) {
            Some(Value::String(s)) if !s.trim().is_empty() => return Some(s.trim().to_string()),
            Some(Value::Number(n)) => return Some(n.to_string()),
            _ => {}
        }
    }
    None
}

/// Cosmetic display-name cleanup, applied uniformly across providers.
pub struct NameCleaner {
    annotation: Regex,
    leading_index: Regex,
    trailing_marker: Regex,
    whitespace: Regex,
}

impl NameCleaner {
    pub fn new() -> Self {
        Self {
            annotation: Regex::new(r"[(\[][^)\]]*[)\]]").unwrap(),
            leading_index: Regex::new(r"^(\s*\d+\s*[-|.:]\s*)+").unwrap(),
            trailing_marker: Regex::new(r"(?i)\s+(hd|fhd|uhd|4k|tv|television)\s*$").unwrap(),
            whitespace: Regex::new(r"\s+").unwrap(),
        }
    }

    /// Strip annotations, leading numeric prefixes and trailing quality/TV
    /// markers, collapse whitespace, lowercase. Idempotent.
    pub fn clean(&self, raw: &str) -> String {
        let mut name = self.annotation.replace_all(raw, " ").to_string();
        name = self.leading_index.replace(&name, "").to_string();
        loop {
            let stripped = self.trailing_marker.replace(&name, "").to_string();
            if stripped == name || stripped.trim().is_empty() {
                break;
            }
            name = stripped;
        }
        name = self.whitespace.replace_all(name.trim(), " ").to_string();
        name.to_lowercase()
    }
}

impl Default for NameCleaner {
    fn default() -> Self {
        Self::new()
    }
}

/// Truncate a display name to `budget` characters, marking the cut with an
/// ellipsis. The untruncated name stays on the record as `raw_name`.
pub fn truncate_display(name: &str, budget: usize) -> String {
    if name.chars().count() <= budget {
        return name.to_string();
    }
    let mut truncated: String = name.chars().take(budget).collect();
    truncated.push('…');
    truncated
}

/// Maps raw provider records to canonical channels. Pure: no I/O, no shared
/// state; one instance per resolution call.
pub struct Normalizer {
    provider: String,
    cleaner: NameCleaner,
    display_name_budget: usize,
}

impl Normalizer {
    pub fn new(provider: &str, display_name_budget: usize) -> Self {
        Self {
            provider: provider.to_string(),
            cleaner: NameCleaner::new(),
            display_name_budget,
        }
    }

    /// One raw record in, zero-or-one canonical channel out. Records without
    /// a valid URL candidate are dropped.
    pub fn normalize(&self, record: &Value, ordinal: usize) -> Option<Channel> {
        let url = extract_url(record)?;
        let obj = record.as_object()?;

        let raw_name = field_string(obj, NAME_FIELDS).unwrap_or_default();
        let (raw_name, name) = if raw_name.is_empty() {
            let placeholder = format!("channel-{}", ordinal + 1);
            (placeholder.clone(), placeholder)
        } else {
            let cleaned = self.cleaner.clean(&raw_name);
            if cleaned.is_empty() {
                let placeholder = format!("channel-{}", ordinal + 1);
                (raw_name, placeholder)
            } else {
                (raw_name, cleaned)
            }
        };
        let name = truncate_display(&name, self.display_name_budget);

        let id = field_string(obj, ID_FIELDS)
            .unwrap_or_else(|| format!("{}_{}", self.provider, ordinal));

        Some(Channel {
            id,
            name,
            raw_name,
            url,
            source_category: field_string(obj, CATEGORY_FIELDS),
            country: field_string(obj, &["country"]),
            language: field_string(obj, &["language"]),
            logo: field_string(obj, LOGO_FIELDS),
        })
    }
}
