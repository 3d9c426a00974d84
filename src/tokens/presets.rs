use super::{ColorPalette, FontSettings, TypographySettings};

/// Catalog entry: `colors` are primary, secondary, accent, background and text;
/// `fonts` are the heading and body families.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThemePreset {
    pub id: &'static str,
    pub name: &'static str,
    pub colors: [&'static str; 5],
    pub fonts: [&'static str; 2],
}

pub const THEME_PRESETS: &[ThemePreset] = &[
    ThemePreset {
        id: "default",
        name: "Default",
        colors: ["#3b82f6", "#64748b", "#f59e0b", "#ffffff", "#1f2937"],
        fonts: ["Inter", "Inter"],
    },
    ThemePreset {
        id: "ocean",
        name: "Ocean",
        colors: ["#0ea5e9", "#0369a1", "#22d3ee", "#f0f9ff", "#0c4a6e"],
        fonts: ["Poppins", "Open Sans"],
    },
    ThemePreset {
        id: "forest",
        name: "Forest",
        colors: ["#16a34a", "#166534", "#facc15", "#f7fee7", "#14532d"],
        fonts: ["Merriweather", "Source Sans Pro"],
    },
    ThemePreset {
        id: "sunset",
        name: "Sunset",
        colors: ["#f97316", "#be123c", "#fde047", "#fff7ed", "#431407"],
        fonts: ["Montserrat", "Lato"],
    },
    ThemePreset {
        id: "midnight",
        name: "Midnight",
        colors: ["#8b5cf6", "#1e1b4b", "#f472b6", "#0f172a", "#e2e8f0"],
        fonts: ["Space Grotesk", "Inter"],
    },
    ThemePreset {
        id: "minimal",
        name: "Minimal",
        colors: ["#111827", "#6b7280", "#d1d5db", "#ffffff", "#111827"],
        fonts: ["Playfair Display", "Roboto"],
    },
];

impl ThemePreset {
    pub fn find(id: &str) -> Option<&'static ThemePreset> {
        THEME_PRESETS.iter().find(|preset| preset.id == id)
    }

    /// Status colors fall back to the stock palette.
    pub fn palette(&self) -> ColorPalette {
        let [primary, secondary, accent, background, text] = self.colors;
        ColorPalette {
            primary: primary.to_string(),
            secondary: secondary.to_string(),
            accent: accent.to_string(),
            background: background.to_string(),
            text: text.to_string(),
            ..ColorPalette::default()
        }
    }

    pub fn typography(&self) -> TypographySettings {
        let [heading, body] = self.fonts;
        let defaults = TypographySettings::default();
        TypographySettings {
            headings: FontSettings {
                font_family: heading.to_string(),
                ..defaults.headings
            },
            body: FontSettings {
                font_family: body.to_string(),
                ..defaults.body
            },
            custom_fonts: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preset_ids_are_unique() {
        for (index, preset) in THEME_PRESETS.iter().enumerate() {
            assert!(
                THEME_PRESETS[index + 1..]
                    .iter()
                    .all(|other| other.id != preset.id),
                "duplicate preset id {}",
                preset.id
            );
        }
    }

    #[test]
    fn default_preset_matches_stock_palette() {
        let preset = ThemePreset::find("default").expect("default preset exists");
        assert_eq!(preset.palette(), ColorPalette::default());
    }
}
