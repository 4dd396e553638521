use crate::link::LinkPolicy;
use crate::lookup::DEFAULT_PREVIEW_ENDPOINT;
use crate::placement::PlacementConfig;

pub const DEFAULT_INTENT_DELAY_MS: u32 = 500;
pub const DEFAULT_HIDE_DELAY_MS: u32 = 300;

pub const DEFAULT_CONTENT_SELECTOR: &str = ".markdown-body";
pub const DEFAULT_OVERLAY_CLASS: &str = "preview-tooltip";
pub const DEFAULT_EXCLUDED_SELECTORS: &[&str] = &[".toc-tree", ".toc-item", "#settings-modal"];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HoverTiming {
    pub intent_delay_ms: u32,
    pub hide_delay_ms: u32,
}

impl Default for HoverTiming {
    fn default() -> Self {
        Self {
            intent_delay_ms: DEFAULT_INTENT_DELAY_MS,
            hide_delay_ms: DEFAULT_HIDE_DELAY_MS,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct PreviewConfig {
    pub timing: HoverTiming,
    pub placement: PlacementConfig,
    pub endpoint: String,
    pub links: LinkPolicy,
    pub content_selector: String,
    pub excluded_selectors: Vec<String>,
    pub overlay_class: String,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            timing: HoverTiming::default(),
            placement: PlacementConfig::default(),
            endpoint: DEFAULT_PREVIEW_ENDPOINT.to_string(),
            links: LinkPolicy::default(),
            content_selector: DEFAULT_CONTENT_SELECTOR.to_string(),
            excluded_selectors: DEFAULT_EXCLUDED_SELECTORS
                .iter()
                .map(|selector| selector.to_string())
                .collect(),
            overlay_class: DEFAULT_OVERLAY_CLASS.to_string(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConfigKey {
    IntentDelayMs,
    HideDelayMs,
    Endpoint,
    ViewPrefix,
}

impl PreviewConfig {
    /// Applies one textual override. Blank or unparsable values leave the
    /// current setting alone; returns whether anything changed.
    pub fn apply_override(&mut self, key: ConfigKey, raw: &str) -> bool {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return false;
        }
        match key {
            ConfigKey::IntentDelayMs => match trimmed.parse::<u32>() {
                Ok(value) => {
                    self.timing.intent_delay_ms = value;
                    true
                }
                Err(_) => false,
            },
            ConfigKey::HideDelayMs => match trimmed.parse::<u32>() {
                Ok(value) => {
                    self.timing.hide_delay_ms = value;
                    true
                }
                Err(_) => false,
            },
            ConfigKey::Endpoint => {
                self.endpoint = trimmed.to_string();
                true
            }
            ConfigKey::ViewPrefix => {
                let mut prefix = trimmed.to_string();
                if !prefix.starts_with('/') {
                    prefix.insert(0, '/');
                }
                if !prefix.ends_with('/') {
                    prefix.push('/');
                }
                self.links.view_prefix = prefix;
                true
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = PreviewConfig::default();
        assert_eq!(config.timing.intent_delay_ms, 500);
        assert_eq!(config.timing.hide_delay_ms, 300);
        assert_eq!(config.endpoint, "/api/preview");
        assert_eq!(config.links.view_prefix, "/view/");
        assert_eq!(config.excluded_selectors.len(), 3);
    }

    #[test]
    fn overrides_ignore_junk() {
        let mut config = PreviewConfig::default();
        assert!(!config.apply_override(ConfigKey::IntentDelayMs, "  "));
        assert!(!config.apply_override(ConfigKey::HideDelayMs, "soon"));
        assert!(config.apply_override(ConfigKey::IntentDelayMs, " 120 "));
        assert_eq!(config.timing.intent_delay_ms, 120);
        assert_eq!(config.timing.hide_delay_ms, 300);
    }

    #[test]
    fn view_prefix_is_normalized() {
        let mut config = PreviewConfig::default();
        config.apply_override(ConfigKey::ViewPrefix, "docs");
        assert_eq!(config.links.view_prefix, "/docs/");
    }
}
