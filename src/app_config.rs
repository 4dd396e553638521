use folio_core::{ConfigKey, PreviewConfig};

use crate::dom;

const INTENT_DELAY_KEY: &str = "folio.debug.preview_intent_ms";
const HIDE_DELAY_KEY: &str = "folio.debug.preview_hide_ms";

/// Defaults, then build-time env, then localStorage debug overrides.
pub(crate) fn load_preview_config() -> PreviewConfig {
    let mut config = PreviewConfig::default();

    if let Some(raw) = option_env!("FOLIO_PREVIEW_ENDPOINT")
        .or(option_env!("TRUNK_PUBLIC_FOLIO_PREVIEW_ENDPOINT"))
    {
        config.apply_override(ConfigKey::Endpoint, raw);
    }
    if let Some(raw) =
        option_env!("FOLIO_VIEW_PREFIX").or(option_env!("TRUNK_PUBLIC_FOLIO_VIEW_PREFIX"))
    {
        config.apply_override(ConfigKey::ViewPrefix, raw);
    }

    if let Some(raw) = dom::read_storage(INTENT_DELAY_KEY) {
        if !config.apply_override(ConfigKey::IntentDelayMs, &raw) {
            gloo::console::warn!("config: ignoring", INTENT_DELAY_KEY, raw);
        }
    }
    if let Some(raw) = dom::read_storage(HIDE_DELAY_KEY) {
        if !config.apply_override(ConfigKey::HideDelayMs, &raw) {
            gloo::console::warn!("config: ignoring", HIDE_DELAY_KEY, raw);
        }
    }

    config.links.origin = page_origin();
    config
}

fn page_origin() -> Option<String> {
    let origin = web_sys::window()?.location().origin().ok()?;
    if origin.is_empty() || origin == "null" {
        return None;
    }
    Some(origin)
}
