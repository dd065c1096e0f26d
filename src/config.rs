use anyhow::Result;
use serde::Deserialize;

/// Tuning knobs for the resolution pipeline.
///
/// Page size and the display-name budget are presentation-density choices
/// made by the caller; they are configuration, not constants.
#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfig {
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    /// Sort pages case-insensitively by display name instead of keeping
    /// source order.
    #[serde(default)]
    pub alphabetical: bool,
    /// Transport-level timeout per provider request, in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Max display-name length before truncation with an ellipsis.
    #[serde(default = "default_display_name_budget")]
    pub display_name_budget: usize,
}

fn default_page_size() -> usize {
    12
}

fn default_request_timeout_secs() -> u64 {
    10
}

fn default_display_name_budget() -> usize {
    12
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            alphabetical: false,
            request_timeout_secs: default_request_timeout_secs(),
            display_name_budget: default_display_name_budget(),
        }
    }
}

impl PipelineConfig {
    /// Load from a config file (TOML/YAML/JSON, by extension). Missing keys
    /// fall back to the serde defaults above.
    pub fn from_file(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path))
            .build()?;
        Ok(settings.try_deserialize()?)
    }
}
