use regex::Regex;
use serde_json::{Map, Value};

/// Quick shape probe: does this body look like an M3U playlist at all?
///
/// Providers sometimes answer a playlist URL with an HTML error page and a
/// 200 status; those must count as a shape failure, not an empty playlist.
pub fn looks_like_m3u(content: &str) -> bool {
    content.contains("#EXTM3U") || content.contains("#EXTINF")
}

/// Parse M3U playlist text into raw records for the normalizer.
///
/// Each record is an object with a `name`, a `url`, and any EXTINF
/// attributes (keys normalized to snake_case, so `tvg-logo` becomes
/// `tvg_logo`). Entries without a URL line are skipped; URL validation is
/// the normalizer's job, not ours.
pub fn parse(content: &str) -> Vec<Value> {
    // Greedy attribute group: the name is whatever follows the last comma,
    // so quoted attribute values may themselves contain commas.
    let re_extinf = Regex::new(r#"#EXTINF:\s*-?\d+\s*(.*),\s*(.*)"#).unwrap();
    let re_attr = Regex::new(r#"([A-Za-z0-9-]+)="([^"]*)""#).unwrap();

    let mut records = Vec::new();
    let mut current: Option<Map<String, Value>> = None;

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(caps) = re_extinf.captures(line) {
            let mut record = Map::new();
            record.insert("name".to_string(), Value::String(caps[2].trim().to_string()));
            for attr in re_attr.captures_iter(&caps[1]) {
                let key = attr[1].replace('-', "_");
                let key = match key.as_str() {
                    "tvg_language" => "language".to_string(),
                    "tvg_country" => "country".to_string(),
                    other => other.to_string(),
                };
                record.insert(key, Value::String(attr[2].to_string()));
            }
            current = Some(record);
        } else if !line.starts_with('#') {
            if let Some(mut record) = current.take() {
                record.insert("url".to_string(), Value::String(line.to_string()));
                records.push(Value::Object(record));
            }
        }
    }

    records
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_entries_with_attributes() {
        let data = r#"#EXTM3U
#EXTINF:-1 tvg-id="ARD.de" tvg-logo="http://logo/ard.png" group-title="News",ARD
https://ard.example/stream.m3u8
#EXTINF:0,ZDF
rtmp://zdf.example/live"#;

        let records = parse(data);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["name"], "ARD");
        assert_eq!(records[0]["url"], "https://ard.example/stream.m3u8");
        assert_eq!(records[0]["tvg_id"], "ARD.de");
        assert_eq!(records[0]["tvg_logo"], "http://logo/ard.png");
        assert_eq!(records[0]["group_title"], "News");
        assert_eq!(records[1]["name"], "ZDF");
        assert_eq!(records[1]["url"], "rtmp://zdf.example/live");
    }

    #[test]
    fn entry_without_url_is_skipped() {
        let data = "#EXTM3U\n#EXTINF:0,Orphan\n#EXTINF:0,Kept\nhttps://kept.example/live";
        let records = parse(data);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["name"], "Kept");
    }

    #[test]
    fn language_and_country_attrs_map_to_plain_keys() {
        let data = "#EXTINF:-1 tvg-language=\"German\" tvg-country=\"DE\",3sat\nhttps://x";
        let records = parse(data);
        assert_eq!(records[0]["language"], "German");
        assert_eq!(records[0]["country"], "DE");
    }

    #[test]
    fn html_body_is_not_a_playlist() {
        assert!(!looks_like_m3u("<html><body>404</body></html>"));
        assert!(looks_like_m3u("#EXTM3U\n"));
    }
}
