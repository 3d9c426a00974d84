mod plan;
mod runtime;

use serde::{Deserialize, Serialize};

use crate::element::{
    Animation, Background, BackgroundKind, Effects, ElementId, IterationCount, Overlay, Shadow,
    ShadowSpec, StyleLayer, Transforms, Typography,
};
use crate::viewport::Viewport;

pub use plan::{plan_click, ActionEffect, ActionPlan, ScheduledStep, SkipReason, SkippedStep};
pub use runtime::{RuntimeInteractions, StepOutcome};

pub const DEFAULT_HOVER_DURATION_MS: f64 = 300.0;
const DEFAULT_HOVER_SCALE: f64 = 1.05;
const DEFAULT_HOVER_LIFT_PX: f64 = -4.0;
const DEFAULT_HOVER_ROTATE_DEG: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum HoverEffect {
    Color,
    #[default]
    Scale,
    TranslateY,
    Rotate,
    Shadow,
}

/// One hover spec per element, applied identically on every breakpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HoverSpec {
    pub effect: HoverEffect,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scale: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub translate_y: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shadow: Option<ShadowSpec>,
    /// Transition duration in milliseconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
}

impl HoverSpec {
    /// Overrides applied on top of the resolved style while hovered.
    pub fn hover_layer(&self) -> StyleLayer {
        let mut layer = StyleLayer::default();
        match self.effect {
            HoverEffect::Color => {
                if let Some(color) = &self.background_color {
                    layer.background = Some(Background {
                        kind: Some(BackgroundKind::Color),
                        value: Some(color.clone()),
                        ..Background::default()
                    });
                }
                if let Some(color) = &self.text_color {
                    layer.typography = Some(Typography {
                        color: Some(color.clone()),
                        ..Typography::default()
                    });
                }
            }
            HoverEffect::Scale => {
                layer.transforms = Some(Transforms {
                    scale: Some(self.scale.unwrap_or(DEFAULT_HOVER_SCALE)),
                    ..Transforms::default()
                });
            }
            HoverEffect::TranslateY => {
                layer.transforms = Some(Transforms {
                    translate_y: Some(self.translate_y.unwrap_or(DEFAULT_HOVER_LIFT_PX)),
                    ..Transforms::default()
                });
            }
            HoverEffect::Rotate => {
                layer.transforms = Some(Transforms {
                    rotate: Some(self.rotate.unwrap_or(DEFAULT_HOVER_ROTATE_DEG)),
                    ..Transforms::default()
                });
            }
            HoverEffect::Shadow => {
                let shadow = self.shadow.clone().unwrap_or_else(|| {
                    ShadowSpec::Parts(Shadow {
                        offset_y: 10.0,
                        blur: 25.0,
                        spread: Some(-5.0),
                        ..Shadow::default()
                    })
                });
                layer.effects = Some(Effects {
                    box_shadow: Some(shadow),
                    ..Effects::default()
                });
            }
        }
        layer
    }

    pub fn transition_css(&self) -> String {
        let duration = self
            .duration
            .filter(|duration| duration.is_finite() && *duration >= 0.0)
            .unwrap_or(DEFAULT_HOVER_DURATION_MS);
        format!("all {}ms ease", crate::element::format_number(duration))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum AnimationTrigger {
    #[default]
    OnLoad,
    OnScroll,
    OnClick,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnimationSpec {
    pub trigger: AnimationTrigger,
    /// Keyframe family such as `fade`, `slide`, `zoom` or `bounce`.
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub direction: Option<String>,
    pub duration: f64,
    pub delay: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iteration_count: Option<IterationCount>,
}

impl Default for AnimationSpec {
    fn default() -> Self {
        Self {
            trigger: AnimationTrigger::OnLoad,
            kind: "fade".to_string(),
            direction: None,
            duration: 600.0,
            delay: 0.0,
            iteration_count: None,
        }
    }
}

impl AnimationSpec {
    /// `fade` + `up` becomes `fadeUp`; without a direction the keyframes are
    /// the `In` variant.
    pub fn keyframes_name(&self) -> String {
        let suffix = match self.direction.as_deref().map(str::trim) {
            Some(direction) if !direction.is_empty() => capitalize(direction),
            _ => "In".to_string(),
        };
        format!("{}{suffix}", self.kind)
    }

    pub fn to_animation(&self) -> Animation {
        Animation {
            name: Some(self.keyframes_name()),
            duration: Some(self.duration.max(0.0)),
            timing_function: Some("ease-out".to_string()),
            delay: Some(self.delay.max(0.0)).filter(|delay| *delay > 0.0),
            iteration_count: self.iteration_count.clone(),
            direction: None,
            fill_mode: Some("both".to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ClickActionKind {
    #[default]
    None,
    Link,
    Scroll,
    Toggle,
    Chain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepKind {
    Link,
    Scroll,
    Toggle,
    Show,
    Hide,
    Animate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainedAction {
    pub action: StepKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_element_id: Option<ElementId>,
    /// Milliseconds after the previous step was dispatched.
    #[serde(default)]
    pub delay: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_viewport: Option<Viewport>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClickSpec {
    pub action: ClickActionKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub new_tab: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_element_id: Option<ElementId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_viewport: Option<Viewport>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub chained_actions: Vec<ChainedAction>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Interactions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hover: Option<HoverSpec>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub animations: Option<Vec<AnimationSpec>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub on_click: Option<ClickSpec>,
}

impl Interactions {
    pub fn animations_for(&self, trigger: AnimationTrigger) -> impl Iterator<Item = &AnimationSpec> {
        self.animations
            .iter()
            .flatten()
            .filter(move |animation| animation.trigger == trigger)
    }
}

impl Overlay for Interactions {
    fn overlay(&mut self, patch: &Self) {
        if let Some(hover) = &patch.hover {
            self.hover = Some(hover.clone());
        }
        if let Some(animations) = &patch.animations {
            self.animations = Some(animations.clone());
        }
        if let Some(on_click) = &patch.on_click {
            self.on_click = Some(on_click.clone());
        }
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
