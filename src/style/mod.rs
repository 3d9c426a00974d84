//! Viewport-aware style cascade.
//!
//! Precedence, lowest first:
//!
//! **Token defaults → Element base → Responsive override → Hover overrides**
//!
//! Each category is merged leaf by leaf, so a leaf missing at a higher layer
//! falls through to the next lower one. The resolved layer is then serialized
//! into a flat, deterministic [`StyleDescriptor`].

mod serialize;

use std::collections::BTreeMap;

use serde::Serialize;

use crate::element::{format_number, Element, Overlay, StyleLayer};
use crate::grid::resolve_grid;
use crate::tokens::TokenRegistry;
use crate::viewport::Viewport;

pub use serialize::{
    animation_css, background_declarations, box_shadow_css, filter_css, normalize_opacity,
    text_shadow_css, transform_css,
};

/// Render-time state that never reaches the persisted element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct InteractionState {
    pub hovered: bool,
    /// Visibility forced by a click action, overriding the stored flag.
    pub visible: Option<bool>,
}

/// Concrete style for one element on one breakpoint. Keys are camelCase CSS
/// property names; iteration order is sorted and therefore stable.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct StyleDescriptor {
    pub visible: bool,
    pub properties: BTreeMap<String, String>,
}

impl StyleDescriptor {
    pub fn get(&self, property: &str) -> Option<&str> {
        self.properties.get(property).map(String::as_str)
    }

    pub fn contains(&self, property: &str) -> bool {
        self.properties.contains_key(property)
    }

    fn set(&mut self, property: &str, value: impl Into<String>) {
        self.properties.insert(property.to_string(), value.into());
    }

    fn set_some(&mut self, property: &str, value: Option<String>) {
        if let Some(value) = value {
            self.set(property, value);
        }
    }

    /// Inline CSS text with kebab-case property names.
    pub fn to_css_text(&self) -> String {
        self.properties
            .iter()
            .map(|(property, value)| format!("{}: {value};", kebab_case(property)))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Resolves the cascade for `element` on `viewport`. Pure: the same inputs
/// always give an equal descriptor.
pub fn compile_style(
    element: &Element,
    viewport: Viewport,
    tokens: &TokenRegistry,
    interaction: Option<&InteractionState>,
) -> StyleDescriptor {
    let interaction = interaction.copied().unwrap_or_default();
    let hover = element
        .properties
        .interactions
        .as_ref()
        .and_then(|interactions| interactions.hover.as_ref());

    let mut layer = tokens.default_layer(&element.kind);
    layer.overlay(&element.properties.resolved_layer(viewport));
    if interaction.hovered {
        if let Some(hover) = hover {
            layer.overlay(&hover.hover_layer());
        }
    }

    let mut descriptor = StyleDescriptor {
        visible: interaction
            .visible
            .unwrap_or_else(|| element.is_visible(viewport)),
        properties: BTreeMap::new(),
    };

    emit_layout(&mut descriptor, &layer);
    emit_advanced(&mut descriptor, &layer);
    descriptor.set_some(
        "transform",
        transform_css(layer.transforms.as_ref(), layer.effects.as_ref()),
    );
    if let Some(origin) = layer.transforms.as_ref().and_then(|t| t.origin.clone()) {
        descriptor.set("transformOrigin", origin);
    }
    descriptor.set_some(
        "filter",
        filter_css(layer.filters.as_ref(), layer.effects.as_ref()),
    );
    descriptor.set_some("animation", animation_css(layer.animation.as_ref()));
    if let Some(background) = &layer.background {
        for (property, value) in background_declarations(background) {
            descriptor.set(property, value);
        }
    }
    emit_border(&mut descriptor, &layer);
    if let Some(shadow) = layer.effects.as_ref().and_then(|e| e.box_shadow.as_ref()) {
        descriptor.set("boxShadow", box_shadow_css(shadow));
    }
    emit_typography(&mut descriptor, &layer);
    if let Some(hover) = hover {
        descriptor.set("transition", hover.transition_css());
    }

    if let Some(grid) = element.properties.responsive.grid(viewport) {
        for (property, value) in resolve_grid(&grid).declarations() {
            descriptor.set(property, value);
        }
    }

    if !descriptor.visible {
        descriptor.set("display", "none");
    }
    descriptor
}

fn emit_layout(descriptor: &mut StyleDescriptor, layer: &StyleLayer) {
    let Some(layout) = &layer.layout else {
        return;
    };
    let dimensions = [
        ("width", &layout.width),
        ("height", &layout.height),
        ("minHeight", &layout.min_height),
        ("maxWidth", &layout.max_width),
        ("padding", &layout.padding),
        ("margin", &layout.margin),
        ("gap", &layout.gap),
    ];
    for (property, value) in dimensions {
        descriptor.set_some(property, value.as_ref().map(|value| value.to_css()));
    }
    descriptor.set_some("display", layout.display.clone());
    descriptor.set_some("flexDirection", layout.flex_direction.clone());
    descriptor.set_some("justifyContent", layout.justify_content.clone());
    descriptor.set_some("alignItems", layout.align_items.clone());
}

fn emit_advanced(descriptor: &mut StyleDescriptor, layer: &StyleLayer) {
    let effects_opacity = layer.effects.as_ref().and_then(|e| e.opacity);
    if let Some(advanced) = &layer.advanced_styles {
        descriptor.set_some("position", advanced.position.clone());
        descriptor.set_some("overflow", advanced.overflow.clone());
        descriptor.set_some("zIndex", advanced.z_index.map(|z| z.to_string()));
        descriptor.set_some("cursor", advanced.cursor.clone());
    }
    let opacity = effects_opacity
        .or_else(|| layer.advanced_styles.as_ref().and_then(|a| a.opacity))
        .and_then(normalize_opacity);
    descriptor.set_some("opacity", opacity.map(format_number));
}

fn emit_border(descriptor: &mut StyleDescriptor, layer: &StyleLayer) {
    let Some(border) = &layer.border else {
        return;
    };
    let width = border.width.filter(|width| width.is_finite() && *width >= 0.0);
    descriptor.set_some("borderWidth", width.map(serialize::px));
    let style = border
        .style
        .clone()
        .or_else(|| width.filter(|width| *width > 0.0).map(|_| "solid".to_string()));
    descriptor.set_some("borderStyle", style);
    descriptor.set_some("borderColor", border.color.clone());
    descriptor.set_some(
        "borderRadius",
        border
            .radius
            .filter(|radius| radius.is_finite() && *radius >= 0.0)
            .map(serialize::px),
    );
}

fn emit_typography(descriptor: &mut StyleDescriptor, layer: &StyleLayer) {
    let Some(typography) = &layer.typography else {
        return;
    };
    descriptor.set_some("fontFamily", typography.font_family.clone());
    descriptor.set_some(
        "fontSize",
        typography
            .font_size
            .filter(|size| size.is_finite() && *size > 0.0)
            .map(serialize::px),
    );
    descriptor.set_some("fontWeight", typography.font_weight.as_ref().map(|w| w.to_css()));
    descriptor.set_some("lineHeight", typography.line_height.as_ref().map(|l| l.to_css()));
    descriptor.set_some(
        "letterSpacing",
        typography
            .letter_spacing
            .filter(|spacing| spacing.is_finite())
            .map(serialize::px),
    );
    descriptor.set_some("textAlign", typography.text_align.clone());
    descriptor.set_some("textTransform", typography.text_transform.clone());
    descriptor.set_some("fontStyle", typography.font_style.clone());
    descriptor.set_some("textDecoration", typography.text_decoration.clone());
    descriptor.set_some(
        "textShadow",
        typography.text_shadow.as_ref().map(text_shadow_css),
    );
    descriptor.set_some("color", typography.color.clone());
}

fn kebab_case(property: &str) -> String {
    let mut kebab = String::with_capacity(property.len() + 4);
    for c in property.chars() {
        if c.is_ascii_uppercase() {
            kebab.push('-');
            kebab.push(c.to_ascii_lowercase());
        } else {
            kebab.push(c);
        }
    }
    kebab
}
