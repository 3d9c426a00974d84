use serde::{Deserialize, Serialize};

use crate::grid::GridSpec;
use crate::viewport::Viewport;

use super::properties::{Overlay, StyleLayer};

/// Partial override for one breakpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ViewportOverride {
    #[serde(flatten)]
    pub style: StyleLayer,
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "super::lenient::leaf"
    )]
    pub is_visible: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grid: Option<GridSpec>,
}

impl Overlay for ViewportOverride {
    fn overlay(&mut self, patch: &Self) {
        self.style.overlay(&patch.style);
        if let Some(visible) = patch.is_visible {
            self.is_visible = Some(visible);
        }
        self.grid.overlay(&patch.grid);
    }
}

/// Per-breakpoint overrides. `desktop` is the base layer: a missing field on
/// `tablet` or `mobile` inherits the resolved desktop value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Responsive {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub desktop: Option<ViewportOverride>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tablet: Option<ViewportOverride>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mobile: Option<ViewportOverride>,
}

impl Responsive {
    pub fn is_empty(&self) -> bool {
        self.desktop.is_none() && self.tablet.is_none() && self.mobile.is_none()
    }

    pub fn get(&self, viewport: Viewport) -> Option<&ViewportOverride> {
        match viewport {
            Viewport::Desktop => self.desktop.as_ref(),
            Viewport::Tablet => self.tablet.as_ref(),
            Viewport::Mobile => self.mobile.as_ref(),
        }
    }

    pub fn get_or_insert(&mut self, viewport: Viewport) -> &mut ViewportOverride {
        let slot = match viewport {
            Viewport::Desktop => &mut self.desktop,
            Viewport::Tablet => &mut self.tablet,
            Viewport::Mobile => &mut self.mobile,
        };
        slot.get_or_insert_with(ViewportOverride::default)
    }

    /// Override layers to apply for `viewport`, lowest precedence first.
    pub fn cascade(&self, viewport: Viewport) -> impl Iterator<Item = &ViewportOverride> {
        let own = if viewport.is_base() {
            None
        } else {
            self.get(viewport)
        };
        self.desktop.iter().chain(own)
    }

    pub fn is_visible(&self, viewport: Viewport) -> bool {
        self.cascade(viewport)
            .filter_map(|layer| layer.is_visible)
            .last()
            .unwrap_or(true)
    }

    /// Grid settings resolved field by field from desktop down to `viewport`.
    pub fn grid(&self, viewport: Viewport) -> Option<GridSpec> {
        let mut resolved: Option<GridSpec> = None;
        for layer in self.cascade(viewport) {
            resolved.overlay(&layer.grid);
        }
        resolved
    }
}

impl Overlay for Responsive {
    fn overlay(&mut self, patch: &Self) {
        for viewport in Viewport::ALL {
            if let Some(layer) = patch.get(viewport) {
                self.get_or_insert(viewport).overlay(layer);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::Filters;

    fn with_visibility(visible: bool) -> ViewportOverride {
        ViewportOverride {
            is_visible: Some(visible),
            ..ViewportOverride::default()
        }
    }

    #[test]
    fn tablet_inherits_desktop_visibility_when_unset() {
        let responsive = Responsive {
            desktop: Some(with_visibility(false)),
            mobile: Some(with_visibility(true)),
            ..Responsive::default()
        };

        assert!(!responsive.is_visible(Viewport::Desktop));
        assert!(!responsive.is_visible(Viewport::Tablet));
        assert!(responsive.is_visible(Viewport::Mobile));
    }

    #[test]
    fn visibility_defaults_to_visible() {
        assert!(Responsive::default().is_visible(Viewport::Tablet));
    }

    #[test]
    fn grid_merges_desktop_fields_under_viewport_fields() {
        let mut responsive = Responsive::default();
        responsive.get_or_insert(Viewport::Desktop).grid = Some(GridSpec {
            enabled: Some(true),
            columns: Some(3),
            gap: Some(crate::element::Dimension::Pixels(24.0)),
            ..GridSpec::default()
        });
        responsive.get_or_insert(Viewport::Mobile).grid = Some(GridSpec {
            columns: Some(1),
            ..GridSpec::default()
        });

        let mobile = responsive.grid(Viewport::Mobile).expect("grid resolves");
        assert_eq!(mobile.enabled, Some(true));
        assert_eq!(mobile.columns, Some(1));

        let tablet = responsive.grid(Viewport::Tablet).expect("grid resolves");
        assert_eq!(tablet.columns, Some(3));
    }

    #[test]
    fn responsive_rejects_unknown_breakpoints() {
        let parsed = serde_json::from_value::<Responsive>(serde_json::json!({ "watch": {} }));
        assert!(parsed.is_err());
    }

    #[test]
    fn overlay_touches_only_patched_viewports() {
        let mut responsive = Responsive::default();
        responsive.get_or_insert(Viewport::Tablet).style.filters = Some(Filters {
            blur: Some(1.0),
            ..Filters::default()
        });

        let mut patch = Responsive::default();
        patch.get_or_insert(Viewport::Mobile).is_visible = Some(false);
        responsive.overlay(&patch);

        assert!(responsive.tablet.is_some());
        assert_eq!(
            responsive.mobile.as_ref().and_then(|layer| layer.is_visible),
            Some(false)
        );
        assert!(responsive.desktop.is_none());
    }
}
