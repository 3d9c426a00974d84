use serde::{Deserialize, Serialize};

use crate::interaction::Interactions;
use crate::viewport::Viewport;

use super::responsive::Responsive;

/// Layers a partial value over a resolved one, keeping unset leaves.
pub trait Overlay {
    fn overlay(&mut self, patch: &Self);
}

impl<T: Overlay + Clone + Default> Overlay for Option<T> {
    fn overlay(&mut self, patch: &Self) {
        if let Some(patch) = patch {
            self.get_or_insert_with(T::default).overlay(patch);
        }
    }
}

/// Declares a category struct whose leaves are all optional, camelCase on the
/// wire, tolerant of malformed values, and mergeable leaf by leaf.
macro_rules! category {
    (
        $(#[$meta:meta])*
        pub struct $name:ident {
            $(
                $(#[$field_meta:meta])*
                $field:ident : $ty:ty
            ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq, ::serde::Serialize, ::serde::Deserialize)]
        #[serde(rename_all = "camelCase", default)]
        pub struct $name {
            $(
                $(#[$field_meta])*
                #[serde(
                    skip_serializing_if = "Option::is_none",
                    deserialize_with = "crate::element::lenient::leaf"
                )]
                pub $field: Option<$ty>,
            )+
        }

        impl $crate::element::Overlay for $name {
            fn overlay(&mut self, patch: &Self) {
                $(
                    if let Some(value) = &patch.$field {
                        self.$field = Some(value.clone());
                    }
                )+
            }
        }

        impl $name {
            pub fn is_empty(&self) -> bool {
                true $(&& self.$field.is_none())+
            }
        }
    };
}
pub(crate) use category;

/// A length that is either a bare pixel count or a raw CSS value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Dimension {
    Pixels(f64),
    Raw(String),
}

impl Dimension {
    pub fn to_css(&self) -> String {
        match self {
            Self::Pixels(px) => format!("{}px", format_number(*px)),
            Self::Raw(raw) => raw.clone(),
        }
    }
}

/// A keyword-or-number CSS value such as `font-weight` or `line-height`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CssValue {
    Number(f64),
    Keyword(String),
}

impl CssValue {
    pub fn to_css(&self) -> String {
        match self {
            Self::Number(number) => format_number(*number),
            Self::Keyword(keyword) => keyword.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IterationCount {
    Times(f64),
    Keyword(String),
}

impl IterationCount {
    pub fn to_css(&self) -> String {
        match self {
            Self::Times(times) => format_number(*times),
            Self::Keyword(keyword) => keyword.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Shadow {
    pub offset_x: f64,
    pub offset_y: f64,
    pub blur: f64,
    pub spread: Option<f64>,
    pub color: String,
    pub inset: bool,
}

impl Default for Shadow {
    fn default() -> Self {
        Self {
            offset_x: 0.0,
            offset_y: 4.0,
            blur: 6.0,
            spread: None,
            color: DEFAULT_SHADOW_COLOR.to_string(),
            inset: false,
        }
    }
}

/// Either structured shadow parts or a shadow string produced elsewhere.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ShadowSpec {
    Css(String),
    Parts(Shadow),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BackgroundKind {
    #[default]
    Color,
    Gradient,
    Image,
    Video,
}

category! {
    pub struct AdvancedStyles {
        position: String,
        overflow: String,
        z_index: i64,
        opacity: f64,
        cursor: String,
    }
}

category! {
    pub struct Transforms {
        translate_x: f64,
        translate_y: f64,
        /// Degrees.
        rotate: f64,
        scale: f64,
        skew_x: f64,
        skew_y: f64,
        origin: String,
    }
}

category! {
    pub struct Filters {
        /// Pixels.
        blur: f64,
        brightness: f64,
        contrast: f64,
        grayscale: f64,
        /// Degrees.
        hue_rotate: f64,
        saturate: f64,
    }
}

category! {
    /// Durations and delays are milliseconds.
    pub struct Animation {
        name: String,
        duration: f64,
        timing_function: String,
        delay: f64,
        iteration_count: IterationCount,
        direction: String,
        fill_mode: String,
    }
}

category! {
    pub struct Background {
        #[serde(rename = "type")]
        kind: BackgroundKind,
        value: String,
        overlay: String,
        size: String,
        position: String,
        repeat: String,
        attachment: String,
        parallax: bool,
    }
}

category! {
    pub struct Border {
        width: f64,
        style: String,
        color: String,
        radius: f64,
    }
}

category! {
    pub struct Effects {
        box_shadow: ShadowSpec,
        opacity: f64,
        scale: f64,
        blur: f64,
        rotate: f64,
        grayscale: f64,
    }
}

category! {
    pub struct Typography {
        font_family: String,
        font_size: f64,
        font_weight: CssValue,
        line_height: CssValue,
        letter_spacing: f64,
        text_align: String,
        text_transform: String,
        font_style: String,
        text_decoration: String,
        text_shadow: ShadowSpec,
        color: String,
    }
}

category! {
    pub struct Layout {
        width: Dimension,
        height: Dimension,
        min_height: Dimension,
        max_width: Dimension,
        padding: Dimension,
        margin: Dimension,
        display: String,
        flex_direction: String,
        justify_content: String,
        align_items: String,
        gap: Dimension,
    }
}

/// Category names accepted inside `properties` and inside each responsive
/// override.
pub const STYLE_CATEGORIES: [&str; 9] = [
    "advancedStyles",
    "transforms",
    "filters",
    "animation",
    "background",
    "border",
    "effects",
    "typography",
    "layout",
];

/// One full set of style categories. Used both for the element base layer and
/// for each viewport override.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StyleLayer {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub advanced_styles: Option<AdvancedStyles>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transforms: Option<Transforms>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filters: Option<Filters>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub animation: Option<Animation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background: Option<Background>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border: Option<Border>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub effects: Option<Effects>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub typography: Option<Typography>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layout: Option<Layout>,
}

impl Overlay for StyleLayer {
    fn overlay(&mut self, patch: &Self) {
        self.advanced_styles.overlay(&patch.advanced_styles);
        self.transforms.overlay(&patch.transforms);
        self.filters.overlay(&patch.filters);
        self.animation.overlay(&patch.animation);
        self.background.overlay(&patch.background);
        self.border.overlay(&patch.border);
        self.effects.overlay(&patch.effects);
        self.typography.overlay(&patch.typography);
        self.layout.overlay(&patch.layout);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ElementProperties {
    #[serde(flatten)]
    pub style: StyleLayer,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interactions: Option<Interactions>,
    #[serde(skip_serializing_if = "Responsive::is_empty")]
    pub responsive: Responsive,
}

impl ElementProperties {
    /// Base layer with the desktop override and, for smaller breakpoints, the
    /// breakpoint's own override layered on top.
    pub fn resolved_layer(&self, viewport: Viewport) -> StyleLayer {
        let mut layer = self.style.clone();
        for step in self.responsive.cascade(viewport) {
            layer.overlay(&step.style);
        }
        layer
    }
}

impl Overlay for ElementProperties {
    fn overlay(&mut self, patch: &Self) {
        self.style.overlay(&patch.style);
        self.interactions.overlay(&patch.interactions);
        self.responsive.overlay(&patch.responsive);
    }
}

/// Formats a CSS number without a trailing `.0`.
pub fn format_number(value: f64) -> String {
    if value == value.trunc() && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

const DEFAULT_SHADOW_COLOR: &str = "rgba(0, 0, 0, 0.25)";

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn category_overlay_replaces_only_named_leaves() {
        let mut filters = Filters {
            blur: Some(2.0),
            contrast: Some(1.1),
            ..Filters::default()
        };
        let patch = Filters {
            blur: Some(4.0),
            ..Filters::default()
        };

        filters.overlay(&patch);

        assert_eq!(filters.blur, Some(4.0));
        assert_eq!(filters.contrast, Some(1.1));
    }

    #[test]
    fn category_drops_malformed_leaf_and_keeps_siblings() {
        let typography: Typography = serde_json::from_value(json!({
            "letterSpacing": "wide",
            "fontSize": "18",
            "textAlign": "center"
        }))
        .expect("category should deserialize");

        assert_eq!(typography.letter_spacing, None);
        assert_eq!(typography.font_size, Some(18.0));
        assert_eq!(typography.text_align.as_deref(), Some("center"));
    }

    #[test]
    fn empty_category_serializes_to_empty_object() {
        let json = serde_json::to_value(Transforms::default()).unwrap();
        assert_eq!(json, json!({}));
        assert!(Transforms::default().is_empty());
    }

    #[test]
    fn background_kind_uses_type_key() {
        let background: Background =
            serde_json::from_value(json!({ "type": "gradient", "value": "linear-gradient(red, blue)" }))
                .unwrap();
        assert_eq!(background.kind, Some(BackgroundKind::Gradient));
    }

    #[test]
    fn format_number_trims_integral_values() {
        assert_eq!(format_number(10.0), "10");
        assert_eq!(format_number(-45.0), "-45");
        assert_eq!(format_number(1.2), "1.2");
    }

    #[test]
    fn dimension_formats_pixels_and_raw_values() {
        assert_eq!(Dimension::Pixels(24.0).to_css(), "24px");
        assert_eq!(Dimension::Raw("100%".to_string()).to_css(), "100%");
    }
}
