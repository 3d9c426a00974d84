mod presets;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::element::{
    category, Background, BackgroundKind, Border, CssValue, Dimension, ElementKind, Layout,
    StyleLayer, Typography,
};

pub use presets::{ThemePreset, THEME_PRESETS};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ColorPalette {
    pub primary: String,
    pub secondary: String,
    pub accent: String,
    pub background: String,
    pub text: String,
    pub success: String,
    pub error: String,
    pub warning: String,
    pub custom: BTreeMap<String, String>,
}

impl Default for ColorPalette {
    fn default() -> Self {
        Self {
            primary: "#3b82f6".to_string(),
            secondary: "#64748b".to_string(),
            accent: "#f59e0b".to_string(),
            background: "#ffffff".to_string(),
            text: "#1f2937".to_string(),
            success: "#10b981".to_string(),
            error: "#ef4444".to_string(),
            warning: "#f59e0b".to_string(),
            custom: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FontSettings {
    pub font_family: String,
    pub font_weight: u16,
    pub line_height: f64,
    pub letter_spacing: f64,
    pub font_size: f64,
}

impl FontSettings {
    fn heading() -> Self {
        Self {
            font_family: "Inter".to_string(),
            font_weight: 700,
            line_height: 1.2,
            letter_spacing: 0.0,
            font_size: 32.0,
        }
    }
}

impl Default for FontSettings {
    fn default() -> Self {
        Self {
            font_family: "Inter".to_string(),
            font_weight: 400,
            line_height: 1.6,
            letter_spacing: 0.0,
            font_size: 16.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomFont {
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub weights: Vec<u16>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TypographySettings {
    pub headings: FontSettings,
    pub body: FontSettings,
    pub custom_fonts: Vec<CustomFont>,
}

impl Default for TypographySettings {
    fn default() -> Self {
        Self {
            headings: FontSettings::heading(),
            body: FontSettings::default(),
            custom_fonts: Vec::new(),
        }
    }
}

/// Pixel values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SpacingSettings {
    pub container_padding: f64,
    pub section_spacing: f64,
    pub element_spacing: f64,
    pub border_radius: f64,
    pub content_width: f64,
}

impl Default for SpacingSettings {
    fn default() -> Self {
        Self {
            container_padding: 24.0,
            section_spacing: 64.0,
            element_spacing: 16.0,
            border_radius: 8.0,
            content_width: 1200.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DesignSettings {
    pub color_palette: ColorPalette,
    pub typography_settings: TypographySettings,
    pub spacing_settings: SpacingSettings,
    pub custom_css: String,
    pub theme: String,
}

impl Default for DesignSettings {
    fn default() -> Self {
        Self {
            color_palette: ColorPalette::default(),
            typography_settings: TypographySettings::default(),
            spacing_settings: SpacingSettings::default(),
            custom_css: String::new(),
            theme: DEFAULT_THEME.to_string(),
        }
    }
}

category! {
    pub struct ColorPalettePatch {
        primary: String,
        secondary: String,
        accent: String,
        background: String,
        text: String,
        success: String,
        error: String,
        warning: String,
        custom: BTreeMap<String, String>,
    }
}

impl ColorPalettePatch {
    fn apply_to(&self, palette: &mut ColorPalette) {
        let slots = [
            (&self.primary, &mut palette.primary),
            (&self.secondary, &mut palette.secondary),
            (&self.accent, &mut palette.accent),
            (&self.background, &mut palette.background),
            (&self.text, &mut palette.text),
            (&self.success, &mut palette.success),
            (&self.error, &mut palette.error),
            (&self.warning, &mut palette.warning),
        ];
        for (patch, slot) in slots {
            if let Some(value) = patch {
                *slot = value.clone();
            }
        }
        if let Some(custom) = &self.custom {
            palette
                .custom
                .extend(custom.iter().map(|(name, value)| (name.clone(), value.clone())));
        }
    }
}

category! {
    pub struct FontSettingsPatch {
        font_family: String,
        font_weight: u16,
        line_height: f64,
        letter_spacing: f64,
        font_size: f64,
    }
}

impl FontSettingsPatch {
    fn apply_to(&self, font: &mut FontSettings) {
        if let Some(family) = &self.font_family {
            font.font_family = family.clone();
        }
        if let Some(weight) = self.font_weight {
            font.font_weight = weight;
        }
        if let Some(line_height) = self.line_height.filter(|value| *value > 0.0) {
            font.line_height = line_height;
        }
        if let Some(letter_spacing) = self.letter_spacing {
            font.letter_spacing = letter_spacing;
        }
        if let Some(size) = self.font_size.filter(|value| *value > 0.0) {
            font.font_size = size;
        }
    }
}

category! {
    pub struct TypographySettingsPatch {
        headings: FontSettingsPatch,
        body: FontSettingsPatch,
    }
}

category! {
    pub struct SpacingSettingsPatch {
        container_padding: f64,
        section_spacing: f64,
        element_spacing: f64,
        border_radius: f64,
        content_width: f64,
    }
}

impl SpacingSettingsPatch {
    fn apply_to(&self, spacing: &mut SpacingSettings) {
        let slots = [
            (self.container_padding, &mut spacing.container_padding),
            (self.section_spacing, &mut spacing.section_spacing),
            (self.element_spacing, &mut spacing.element_spacing),
            (self.border_radius, &mut spacing.border_radius),
            (self.content_width, &mut spacing.content_width),
        ];
        for (patch, slot) in slots {
            if let Some(value) = patch.filter(|value| *value >= 0.0) {
                *slot = value;
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DesignSettingsPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color_palette: Option<ColorPalettePatch>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub typography_settings: Option<TypographySettingsPatch>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spacing_settings: Option<SpacingSettingsPatch>,
}

/// Owns the design settings of one project.
#[derive(Debug, Clone, Default)]
pub struct TokenRegistry {
    settings: DesignSettings,
    version: u64,
}

impl TokenRegistry {
    pub fn new(settings: DesignSettings) -> Self {
        Self {
            settings,
            version: 0,
        }
    }

    pub fn settings(&self) -> &DesignSettings {
        &self.settings
    }

    /// Bumped on every mutation.
    pub fn version(&self) -> u64 {
        self.version
    }

    fn touch(&mut self) {
        self.version = self.version.wrapping_add(1);
    }

    pub fn update_design_settings(&mut self, patch: &DesignSettingsPatch) {
        if let Some(palette) = &patch.color_palette {
            palette.apply_to(&mut self.settings.color_palette);
        }
        if let Some(typography) = &patch.typography_settings {
            let target = &mut self.settings.typography_settings;
            if let Some(headings) = &typography.headings {
                headings.apply_to(&mut target.headings);
            }
            if let Some(body) = &typography.body {
                body.apply_to(&mut target.body);
            }
        }
        if let Some(spacing) = &patch.spacing_settings {
            spacing.apply_to(&mut self.settings.spacing_settings);
        }
        self.touch();
    }

    /// Replaces palette, typography and spacing with a preset in one step.
    /// Custom colors and uploaded fonts survive the switch. Returns `false`
    /// for an unknown theme id.
    pub fn apply_theme(&mut self, theme_id: &str) -> bool {
        let Some(preset) = ThemePreset::find(theme_id) else {
            tracing::warn!(theme_id, "unknown theme preset; design settings unchanged");
            return false;
        };

        let mut palette = preset.palette();
        palette.custom = std::mem::take(&mut self.settings.color_palette.custom);
        let mut typography = preset.typography();
        typography.custom_fonts = std::mem::take(&mut self.settings.typography_settings.custom_fonts);

        self.settings.color_palette = palette;
        self.settings.typography_settings = typography;
        self.settings.spacing_settings = SpacingSettings::default();
        self.settings.theme = preset.id.to_string();
        self.touch();
        tracing::debug!(theme_id, "applied theme preset");
        true
    }

    pub fn add_custom_color(&mut self, name: &str, value: &str) {
        self.settings
            .color_palette
            .custom
            .insert(name.to_string(), value.to_string());
        self.touch();
    }

    /// Re-adding a font with the same name replaces its url and weights.
    pub fn add_custom_font(&mut self, name: &str, url: &str, weights: &[u16]) {
        let font = CustomFont {
            name: name.to_string(),
            url: url.to_string(),
            weights: weights.to_vec(),
        };
        let fonts = &mut self.settings.typography_settings.custom_fonts;
        match fonts.iter_mut().find(|existing| existing.name == name) {
            Some(existing) => *existing = font,
            None => fonts.push(font),
        }
        self.touch();
    }

    pub fn set_custom_css(&mut self, css: &str) {
        self.settings.custom_css = css.to_string();
        self.touch();
    }

    /// Looks up a palette entry by role name or custom color name.
    pub fn color(&self, name: &str) -> Option<&str> {
        let palette = &self.settings.color_palette;
        let named = match name {
            "primary" => Some(&palette.primary),
            "secondary" => Some(&palette.secondary),
            "accent" => Some(&palette.accent),
            "background" => Some(&palette.background),
            "text" => Some(&palette.text),
            "success" => Some(&palette.success),
            "error" => Some(&palette.error),
            "warning" => Some(&palette.warning),
            _ => palette.custom.get(name),
        };
        named.map(String::as_str)
    }

    /// Lowest-precedence cascade layer for an element of `kind`.
    pub fn default_layer(&self, kind: &ElementKind) -> StyleLayer {
        let settings = &self.settings;
        let mut layer = StyleLayer::default();

        if kind.is_text_bearing() {
            let font = if matches!(kind, ElementKind::Heading) {
                &settings.typography_settings.headings
            } else {
                &settings.typography_settings.body
            };
            layer.typography = Some(Typography {
                font_family: Some(font.font_family.clone()),
                font_size: Some(font.font_size),
                font_weight: Some(CssValue::Number(f64::from(font.font_weight))),
                line_height: Some(CssValue::Number(font.line_height)),
                letter_spacing: Some(font.letter_spacing).filter(|spacing| *spacing != 0.0),
                color: Some(settings.color_palette.text.clone()),
                ..Typography::default()
            });
        }

        if matches!(kind, ElementKind::Button) {
            layer.background = Some(Background {
                kind: Some(BackgroundKind::Color),
                value: Some(settings.color_palette.primary.clone()),
                ..Background::default()
            });
            layer.border = Some(Border {
                radius: Some(settings.spacing_settings.border_radius),
                ..Border::default()
            });
            if let Some(typography) = layer.typography.as_mut() {
                typography.color = Some(settings.color_palette.background.clone());
            }
        }

        if kind.is_layout_box() {
            layer.layout = Some(Layout {
                padding: Some(Dimension::Pixels(settings.spacing_settings.container_padding)),
                gap: Some(Dimension::Pixels(settings.spacing_settings.element_spacing)),
                ..Layout::default()
            });
        }

        layer
    }
}

const DEFAULT_THEME: &str = "default";
