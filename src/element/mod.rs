//! Element data model: identity, kind, canvas position and the categorized
//! property bag.

pub(crate) mod lenient;
mod properties;
mod responsive;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

pub(crate) use properties::category;
pub use properties::{
    format_number, AdvancedStyles, Animation, Background, BackgroundKind, Border, CssValue,
    Dimension, Effects, ElementProperties, Filters, IterationCount, Layout, Overlay, Shadow,
    ShadowSpec, StyleLayer, Transforms, Typography, STYLE_CATEGORIES,
};
pub use responsive::{Responsive, ViewportOverride};

pub type ElementId = String;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ElementKind {
    Text,
    Heading,
    Image,
    Button,
    Link,
    #[default]
    Container,
    Section,
    Video,
    Form,
    Input,
    Divider,
    Spacer,
    Icon,
    Custom(String),
}

impl ElementKind {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Text => "text",
            Self::Heading => "heading",
            Self::Image => "image",
            Self::Button => "button",
            Self::Link => "link",
            Self::Container => "container",
            Self::Section => "section",
            Self::Video => "video",
            Self::Form => "form",
            Self::Input => "input",
            Self::Divider => "divider",
            Self::Spacer => "spacer",
            Self::Icon => "icon",
            Self::Custom(name) => name,
        }
    }

    /// Kinds that render text and therefore pick up typography tokens.
    pub const fn is_text_bearing(&self) -> bool {
        matches!(
            self,
            Self::Text | Self::Heading | Self::Button | Self::Link | Self::Input
        )
    }

    pub const fn is_layout_box(&self) -> bool {
        matches!(self, Self::Container | Self::Section | Self::Form)
    }

    pub const fn default_size(&self) -> (f64, f64) {
        match self {
            Self::Text => (300.0, 40.0),
            Self::Heading => (400.0, 56.0),
            Self::Image => (300.0, 200.0),
            Self::Button | Self::Link => (160.0, 48.0),
            Self::Container | Self::Form => (600.0, 300.0),
            Self::Section => (1200.0, 400.0),
            Self::Video => (480.0, 270.0),
            Self::Input => (280.0, 44.0),
            Self::Divider => (600.0, 2.0),
            Self::Spacer => (600.0, 40.0),
            Self::Icon => (48.0, 48.0),
            Self::Custom(_) => (200.0, 100.0),
        }
    }
}

impl From<String> for ElementKind {
    fn from(value: String) -> Self {
        match value.as_str() {
            "text" => Self::Text,
            "heading" => Self::Heading,
            "image" => Self::Image,
            "button" => Self::Button,
            "link" => Self::Link,
            "container" => Self::Container,
            "section" => Self::Section,
            "video" => Self::Video,
            "form" => Self::Form,
            "input" => Self::Input,
            "divider" => Self::Divider,
            "spacer" => Self::Spacer,
            "icon" => Self::Icon,
            _ => Self::Custom(value),
        }
    }
}

impl From<ElementKind> for String {
    fn from(kind: ElementKind) -> Self {
        kind.as_str().to_string()
    }
}

impl std::fmt::Display for ElementKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canvas-space placement.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

category! {
    pub struct PositionPatch {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    }
}

impl PositionPatch {
    pub fn apply_to(&self, position: &mut Position) {
        if let Some(x) = self.x {
            position.x = x;
        }
        if let Some(y) = self.y {
            position.y = y;
        }
        if let Some(width) = self.width.filter(|width| *width >= 0.0) {
            position.width = width;
        }
        if let Some(height) = self.height.filter(|height| *height >= 0.0) {
            position.height = height;
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    pub id: ElementId,
    #[serde(rename = "type")]
    pub kind: ElementKind,
    #[serde(default)]
    pub position: Position,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default)]
    pub properties: ElementProperties,
}

impl Element {
    pub fn new(id: impl Into<ElementId>, kind: ElementKind) -> Self {
        let (width, height) = kind.default_size();
        Self {
            id: id.into(),
            kind,
            position: Position {
                x: 0.0,
                y: 0.0,
                width,
                height,
            },
            content: None,
            properties: ElementProperties::default(),
        }
    }

    /// Merges the categories present in `patch`. The kind and id never change
    /// through a patch.
    pub fn apply_patch(&mut self, patch: &ElementPatch) {
        if let Some(position) = &patch.position {
            position.apply_to(&mut self.position);
        }
        if let Some(content) = &patch.content {
            self.content = Some(content.clone());
        }
        if let Some(properties) = &patch.properties {
            self.properties.overlay(properties);
        }
    }

    pub fn is_visible(&self, viewport: crate::viewport::Viewport) -> bool {
        self.properties.responsive.is_visible(viewport)
    }
}

#[derive(Debug, Error)]
pub enum PatchError {
    #[error("unknown property category `{category}`")]
    UnknownCategory { category: String },
    #[error("patch must be a JSON object")]
    NotAnObject,
    #[error("malformed patch")]
    Malformed(#[from] serde_json::Error),
}

/// Partial element used for both creation and update.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ElementPatch {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<ElementKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<PositionPatch>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<ElementProperties>,
}

impl ElementPatch {
    pub fn of_kind(kind: ElementKind) -> Self {
        Self {
            kind: Some(kind),
            ..Self::default()
        }
    }

    pub fn with_properties(properties: ElementProperties) -> Self {
        Self {
            properties: Some(properties),
            ..Self::default()
        }
    }

    /// Parses an untyped patch, rejecting category names that do not exist.
    /// Malformed leaf values are dropped, not rejected.
    pub fn from_json(value: Value) -> Result<Self, PatchError> {
        let object = value.as_object().ok_or(PatchError::NotAnObject)?;
        if let Some(properties) = object.get("properties") {
            validate_properties(properties)?;
        }
        Ok(serde_json::from_value(value)?)
    }
}

const ELEMENT_LEVEL_KEYS: [&str; 2] = ["interactions", "responsive"];
const VIEWPORT_LEVEL_KEYS: [&str; 2] = ["isVisible", "grid"];

pub(crate) fn validate_properties(properties: &Value) -> Result<(), PatchError> {
    let Some(object) = properties.as_object() else {
        return Err(PatchError::NotAnObject);
    };

    for key in object.keys() {
        if !STYLE_CATEGORIES.contains(&key.as_str()) && !ELEMENT_LEVEL_KEYS.contains(&key.as_str())
        {
            return Err(PatchError::UnknownCategory {
                category: key.clone(),
            });
        }
    }

    let Some(responsive) = object.get("responsive").and_then(Value::as_object) else {
        return Ok(());
    };
    for (viewport, layer) in responsive {
        let Some(layer) = layer.as_object() else {
            continue;
        };
        for key in layer.keys() {
            if !STYLE_CATEGORIES.contains(&key.as_str())
                && !VIEWPORT_LEVEL_KEYS.contains(&key.as_str())
            {
                return Err(PatchError::UnknownCategory {
                    category: format!("responsive.{viewport}.{key}"),
                });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::viewport::Viewport;
    use serde_json::json;

    #[test]
    fn element_kind_round_trips_known_and_custom_names() {
        assert_eq!(ElementKind::from("button".to_string()), ElementKind::Button);
        let custom = ElementKind::from("countdown".to_string());
        assert_eq!(custom, ElementKind::Custom("countdown".to_string()));
        assert_eq!(String::from(custom), "countdown");
    }

    #[test]
    fn patch_merges_only_present_categories() {
        let mut element = Element::new("e1", ElementKind::Text);
        element.apply_patch(
            &ElementPatch::from_json(json!({
                "properties": {
                    "typography": { "fontSize": 18, "textAlign": "left" },
                    "border": { "width": 1 }
                }
            }))
            .unwrap(),
        );
        element.apply_patch(
            &ElementPatch::from_json(json!({
                "properties": { "typography": { "fontSize": 22 } }
            }))
            .unwrap(),
        );

        let typography = element.properties.style.typography.as_ref().unwrap();
        assert_eq!(typography.font_size, Some(22.0));
        assert_eq!(typography.text_align.as_deref(), Some("left"));
        assert_eq!(
            element.properties.style.border.as_ref().unwrap().width,
            Some(1.0)
        );
    }

    #[test]
    fn malformed_numeric_leaf_keeps_prior_value() {
        let mut element = Element::new("e1", ElementKind::Text);
        element.apply_patch(
            &ElementPatch::from_json(json!({
                "properties": { "typography": { "letterSpacing": 2 } }
            }))
            .unwrap(),
        );
        element.apply_patch(
            &ElementPatch::from_json(json!({
                "properties": { "typography": { "letterSpacing": "loose" } }
            }))
            .unwrap(),
        );

        let typography = element.properties.style.typography.as_ref().unwrap();
        assert_eq!(typography.letter_spacing, Some(2.0));
    }

    #[test]
    fn unknown_category_is_rejected() {
        let err = ElementPatch::from_json(json!({
            "properties": { "sparkles": { "amount": 3 } }
        }))
        .expect_err("unknown category should fail");
        assert!(matches!(err, PatchError::UnknownCategory { ref category } if category == "sparkles"));

        let err = ElementPatch::from_json(json!({
            "properties": { "responsive": { "mobile": { "glow": {} } } }
        }))
        .expect_err("unknown responsive category should fail");
        assert!(matches!(err, PatchError::UnknownCategory { .. }));
    }

    #[test]
    fn responsive_patch_targets_one_viewport() {
        let mut element = Element::new("e1", ElementKind::Image);
        element.apply_patch(
            &ElementPatch::from_json(json!({
                "properties": { "responsive": { "mobile": { "isVisible": false } } }
            }))
            .unwrap(),
        );

        assert!(element.is_visible(Viewport::Desktop));
        assert!(!element.is_visible(Viewport::Mobile));
    }

    #[test]
    fn position_patch_ignores_negative_sizes() {
        let mut position = Position {
            x: 1.0,
            y: 2.0,
            width: 100.0,
            height: 50.0,
        };
        PositionPatch {
            x: Some(10.0),
            width: Some(-5.0),
            ..PositionPatch::default()
        }
        .apply_to(&mut position);

        assert_eq!(position.x, 10.0);
        assert_eq!(position.width, 100.0);
    }

    #[test]
    fn element_serializes_with_type_key() {
        let element = Element::new("e9", ElementKind::Button);
        let json = serde_json::to_value(&element).unwrap();
        assert_eq!(json["type"], "button");
        assert_eq!(json["id"], "e9");
    }
}
