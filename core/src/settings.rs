pub const THEME_KEY: &str = "theme";
pub const FONT_SIZE_KEY: &str = "fontSize";
pub const READABLE_WIDTH_KEY: &str = "readableWidth";
pub const LINE_NUMBERS_KEY: &str = "lineNumbers";
pub const MERMAID_THEME_KEY: &str = "mermaidTheme";

pub const DEFAULT_MERMAID_THEME: &str = "default";
pub const READABLE_WIDTH_CLASS: &str = "readable-width";
pub const LINE_NUMBERS_CLASS: &str = "line-numbers";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ThemeMode {
    Light,
    #[default]
    Dark,
}

impl ThemeMode {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "light" => Some(ThemeMode::Light),
            "dark" => Some(ThemeMode::Dark),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ThemeMode::Light => "light",
            ThemeMode::Dark => "dark",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FontSize {
    Small,
    #[default]
    Medium,
    Large,
}

impl FontSize {
    pub const ALL: [FontSize; 3] = [FontSize::Small, FontSize::Medium, FontSize::Large];

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "small" => Some(FontSize::Small),
            "medium" => Some(FontSize::Medium),
            "large" => Some(FontSize::Large),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FontSize::Small => "small",
            FontSize::Medium => "medium",
            FontSize::Large => "large",
        }
    }

    pub fn class_name(self) -> &'static str {
        match self {
            FontSize::Small => "font-small",
            FontSize::Medium => "font-medium",
            FontSize::Large => "font-large",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReaderSettings {
    pub theme: ThemeMode,
    pub font_size: FontSize,
    pub readable_width: bool,
    pub line_numbers: bool,
    pub mermaid_theme: String,
}

impl Default for ReaderSettings {
    fn default() -> Self {
        Self {
            theme: ThemeMode::default(),
            font_size: FontSize::default(),
            readable_width: true,
            line_numbers: false,
            mermaid_theme: DEFAULT_MERMAID_THEME.to_string(),
        }
    }
}

impl ReaderSettings {
    /// Builds settings from stored string values, falling back to defaults
    /// for anything missing or unrecognized.
    pub fn from_stored<F>(get: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Self {
            theme: get(THEME_KEY)
                .and_then(|raw| ThemeMode::parse(&raw))
                .unwrap_or(defaults.theme),
            font_size: get(FONT_SIZE_KEY)
                .and_then(|raw| FontSize::parse(&raw))
                .unwrap_or(defaults.font_size),
            readable_width: get(READABLE_WIDTH_KEY)
                .map(|raw| raw.trim() == "true")
                .unwrap_or(defaults.readable_width),
            line_numbers: get(LINE_NUMBERS_KEY)
                .map(|raw| raw.trim() == "true")
                .unwrap_or(defaults.line_numbers),
            mermaid_theme: get(MERMAID_THEME_KEY)
                .map(|raw| raw.trim().to_string())
                .filter(|raw| !raw.is_empty())
                .unwrap_or(defaults.mermaid_theme),
        }
    }

    pub fn stored_pairs(&self) -> Vec<(&'static str, String)> {
        vec![
            (THEME_KEY, self.theme.as_str().to_string()),
            (FONT_SIZE_KEY, self.font_size.as_str().to_string()),
            (READABLE_WIDTH_KEY, self.readable_width.to_string()),
            (LINE_NUMBERS_KEY, self.line_numbers.to_string()),
            (MERMAID_THEME_KEY, self.mermaid_theme.clone()),
        ]
    }
}

/// Number of rendered lines in a code block. A single trailing newline does
/// not start a new line.
pub fn code_line_count(text: &str) -> usize {
    let trimmed = text.strip_suffix('\n').unwrap_or(text);
    trimmed.split('\n').count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn empty_storage_gives_defaults() {
        let settings = ReaderSettings::from_stored(|_| None);
        assert_eq!(settings, ReaderSettings::default());
        assert_eq!(settings.theme, ThemeMode::Dark);
        assert!(settings.readable_width);
        assert!(!settings.line_numbers);
    }

    #[test]
    fn stored_values_round_into_settings() {
        let stored: HashMap<&str, &str> = [
            (THEME_KEY, "light"),
            (FONT_SIZE_KEY, "large"),
            (READABLE_WIDTH_KEY, "false"),
            (LINE_NUMBERS_KEY, "true"),
            (MERMAID_THEME_KEY, "forest"),
        ]
        .into_iter()
        .collect();
        let settings = ReaderSettings::from_stored(|key| stored.get(key).map(|v| v.to_string()));
        assert_eq!(settings.theme, ThemeMode::Light);
        assert_eq!(settings.font_size, FontSize::Large);
        assert!(!settings.readable_width);
        assert!(settings.line_numbers);
        assert_eq!(settings.mermaid_theme, "forest");
        let pairs = settings.stored_pairs();
        assert!(pairs.contains(&(FONT_SIZE_KEY, "large".to_string())));
        assert!(pairs.contains(&(READABLE_WIDTH_KEY, "false".to_string())));
    }

    #[test]
    fn unknown_values_fall_back() {
        let settings = ReaderSettings::from_stored(|key| match key {
            THEME_KEY => Some("sepia".to_string()),
            FONT_SIZE_KEY => Some("huge".to_string()),
            _ => None,
        });
        assert_eq!(settings.theme, ThemeMode::Dark);
        assert_eq!(settings.font_size, FontSize::Medium);
    }

    #[test]
    fn line_count_ignores_trailing_newline() {
        assert_eq!(code_line_count("a\nb\n"), 2);
        assert_eq!(code_line_count("a\nb"), 2);
        assert_eq!(code_line_count(""), 1);
        assert_eq!(code_line_count("a\n\n"), 2);
    }
}
