use serde::Serialize;

use crate::element::{Animation, Element, ElementId};
use crate::viewport::Viewport;

use super::{AnimationTrigger, ChainedAction, ClickActionKind, StepKind};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ActionEffect {
    Navigate {
        url: String,
        new_tab: bool,
    },
    ScrollTo {
        element_id: ElementId,
    },
    /// `viewport: None` applies to every breakpoint.
    Toggle {
        element_id: ElementId,
        viewport: Option<Viewport>,
    },
    SetVisible {
        element_id: ElementId,
        viewport: Option<Viewport>,
        visible: bool,
    },
    PlayAnimation {
        element_id: ElementId,
        animation: Animation,
    },
}

impl ActionEffect {
    pub fn target(&self) -> Option<&str> {
        match self {
            Self::Navigate { .. } => None,
            Self::ScrollTo { element_id }
            | Self::Toggle { element_id, .. }
            | Self::SetVisible { element_id, .. }
            | Self::PlayAnimation { element_id, .. } => Some(element_id.as_str()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledStep {
    /// Milliseconds after the click.
    pub at_ms: f64,
    /// Position in `chainedActions`, when the step came from a chain.
    pub chain_index: Option<usize>,
    pub effect: ActionEffect,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SkipReason {
    MissingTarget,
    DanglingTarget,
    MissingUrl,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkippedStep {
    pub chain_index: Option<usize>,
    pub target: Option<ElementId>,
    pub reason: SkipReason,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionPlan {
    pub source: ElementId,
    pub steps: Vec<ScheduledStep>,
    pub skipped: Vec<SkippedStep>,
}

impl ActionPlan {
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

/// Builds the schedule a click on `source` triggers. `resolve` looks up live
/// elements by id; steps whose target does not resolve are skipped while the
/// remaining steps keep their timing.
pub fn plan_click<'a, F>(source: &Element, resolve: F) -> ActionPlan
where
    F: Fn(&str) -> Option<&'a Element>,
{
    let mut plan = ActionPlan {
        source: source.id.clone(),
        ..ActionPlan::default()
    };
    let Some(interactions) = source.properties.interactions.as_ref() else {
        return plan;
    };

    for animation in interactions.animations_for(AnimationTrigger::OnClick) {
        plan.steps.push(ScheduledStep {
            at_ms: 0.0,
            chain_index: None,
            effect: ActionEffect::PlayAnimation {
                element_id: source.id.clone(),
                animation: animation.to_animation(),
            },
        });
    }

    let Some(click) = interactions.on_click.as_ref() else {
        return plan;
    };

    let single = |action: StepKind| ChainedAction {
        action,
        target_element_id: click.target_element_id.clone(),
        delay: 0.0,
        target_viewport: click.target_viewport,
        url: click.url.clone(),
    };

    match click.action {
        ClickActionKind::None => {}
        ClickActionKind::Link | ClickActionKind::Scroll | ClickActionKind::Toggle => {
            let kind = match click.action {
                ClickActionKind::Link => StepKind::Link,
                ClickActionKind::Scroll => StepKind::Scroll,
                _ => StepKind::Toggle,
            };
            push_step(&mut plan, &single(kind), None, 0.0, click.new_tab, &resolve);
        }
        ClickActionKind::Chain => {
            let mut at_ms = 0.0;
            for (index, step) in click.chained_actions.iter().enumerate() {
                at_ms += sanitize_delay(step.delay);
                push_step(&mut plan, step, Some(index), at_ms, click.new_tab, &resolve);
            }
        }
    }

    tracing::debug!(
        source = %plan.source,
        steps = plan.steps.len(),
        skipped = plan.skipped.len(),
        "planned click actions"
    );
    plan
}

fn push_step<'a, F>(
    plan: &mut ActionPlan,
    step: &ChainedAction,
    chain_index: Option<usize>,
    at_ms: f64,
    new_tab: bool,
    resolve: &F,
) where
    F: Fn(&str) -> Option<&'a Element>,
{
    if step.action == StepKind::Link {
        match step.url.as_deref().map(str::trim).filter(|url| !url.is_empty()) {
            Some(url) => plan.steps.push(ScheduledStep {
                at_ms,
                chain_index,
                effect: ActionEffect::Navigate {
                    url: url.to_string(),
                    new_tab,
                },
            }),
            None => record_skip(plan, chain_index, None, SkipReason::MissingUrl),
        }
        return;
    }

    let Some(target_id) = step.target_element_id.as_ref() else {
        record_skip(plan, chain_index, None, SkipReason::MissingTarget);
        return;
    };
    let Some(target) = resolve(target_id.as_str()) else {
        record_skip(plan, chain_index, Some(target_id), SkipReason::DanglingTarget);
        return;
    };

    let element_id = target.id.clone();
    let viewport = step.target_viewport;
    let mut effects = Vec::new();
    match step.action {
        StepKind::Link => {}
        StepKind::Scroll => effects.push(ActionEffect::ScrollTo { element_id }),
        StepKind::Toggle => effects.push(ActionEffect::Toggle {
            element_id,
            viewport,
        }),
        StepKind::Show | StepKind::Hide => effects.push(ActionEffect::SetVisible {
            element_id,
            viewport,
            visible: step.action == StepKind::Show,
        }),
        StepKind::Animate => {
            let animations = target
                .properties
                .interactions
                .as_ref()
                .map(|interactions| {
                    interactions
                        .animations_for(AnimationTrigger::OnClick)
                        .map(|spec| spec.to_animation())
                        .collect::<Vec<_>>()
                })
                .unwrap_or_default();
            effects.extend(animations.into_iter().map(|animation| {
                ActionEffect::PlayAnimation {
                    element_id: element_id.clone(),
                    animation,
                }
            }));
        }
    }

    plan.steps.extend(effects.into_iter().map(|effect| ScheduledStep {
        at_ms,
        chain_index,
        effect,
    }));
}

fn record_skip(
    plan: &mut ActionPlan,
    chain_index: Option<usize>,
    target: Option<&ElementId>,
    reason: SkipReason,
) {
    if reason == SkipReason::DanglingTarget {
        tracing::warn!(
            source = %plan.source,
            target = ?target,
            chain_index,
            "click action targets a missing element; skipping step"
        );
    }
    plan.skipped.push(SkippedStep {
        chain_index,
        target: target.cloned(),
        reason,
    });
}

fn sanitize_delay(delay: f64) -> f64 {
    if delay.is_finite() && delay > 0.0 {
        delay
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::ElementKind;
    use crate::interaction::{AnimationSpec, ClickSpec, Interactions};

    fn element(id: &str) -> Element {
        Element::new(id, ElementKind::Container)
    }

    fn with_click(id: &str, click: ClickSpec) -> Element {
        let mut source = Element::new(id, ElementKind::Button);
        source.properties.interactions = Some(Interactions {
            on_click: Some(click),
            ..Interactions::default()
        });
        source
    }

    fn chain_step(action: StepKind, target: &str, delay: f64) -> ChainedAction {
        ChainedAction {
            action,
            target_element_id: Some(target.to_string()),
            delay,
            target_viewport: None,
            url: None,
        }
    }

    #[test]
    fn chain_skips_dangling_step_and_runs_the_rest() {
        let elements = [element("a"), element("c")];
        let source = with_click(
            "btn",
            ClickSpec {
                action: ClickActionKind::Chain,
                chained_actions: vec![
                    chain_step(StepKind::Toggle, "a", 0.0),
                    chain_step(StepKind::Hide, "ghost", 100.0),
                    chain_step(StepKind::Show, "c", 250.0),
                ],
                ..ClickSpec::default()
            },
        );

        let plan = plan_click(&source, |id| elements.iter().find(|e| e.id == id));

        assert_eq!(plan.steps.len(), 2);
        assert_eq!(plan.steps[0].chain_index, Some(0));
        assert_eq!(plan.steps[1].chain_index, Some(2));
        assert_eq!(plan.steps[1].at_ms, 350.0);
        assert_eq!(
            plan.skipped,
            vec![SkippedStep {
                chain_index: Some(1),
                target: Some("ghost".to_string()),
                reason: SkipReason::DanglingTarget,
            }]
        );
    }

    #[test]
    fn negative_delays_count_as_zero() {
        let elements = [element("a")];
        let source = with_click(
            "btn",
            ClickSpec {
                action: ClickActionKind::Chain,
                chained_actions: vec![
                    chain_step(StepKind::Scroll, "a", 200.0),
                    chain_step(StepKind::Scroll, "a", -50.0),
                ],
                ..ClickSpec::default()
            },
        );

        let plan = plan_click(&source, |id| elements.iter().find(|e| e.id == id));
        let offsets: Vec<f64> = plan.steps.iter().map(|step| step.at_ms).collect();
        assert_eq!(offsets, vec![200.0, 200.0]);
    }

    #[test]
    fn link_without_url_is_skipped() {
        let source = with_click(
            "btn",
            ClickSpec {
                action: ClickActionKind::Link,
                ..ClickSpec::default()
            },
        );
        let plan = plan_click(&source, |_| None);
        assert!(plan.is_empty());
        assert_eq!(plan.skipped[0].reason, SkipReason::MissingUrl);
    }

    #[test]
    fn toggle_action_is_scoped_to_target_viewport() {
        let elements = [element("menu")];
        let source = with_click(
            "burger",
            ClickSpec {
                action: ClickActionKind::Toggle,
                target_element_id: Some("menu".to_string()),
                target_viewport: Some(Viewport::Mobile),
                ..ClickSpec::default()
            },
        );

        let plan = plan_click(&source, |id| elements.iter().find(|e| e.id == id));
        assert_eq!(
            plan.steps[0].effect,
            ActionEffect::Toggle {
                element_id: "menu".to_string(),
                viewport: Some(Viewport::Mobile),
            }
        );
    }

    #[test]
    fn click_animations_play_before_actions() {
        let mut source = with_click(
            "btn",
            ClickSpec {
                action: ClickActionKind::Link,
                url: Some("/signup".to_string()),
                new_tab: true,
                ..ClickSpec::default()
            },
        );
        if let Some(interactions) = source.properties.interactions.as_mut() {
            interactions.animations = Some(vec![AnimationSpec {
                trigger: AnimationTrigger::OnClick,
                kind: "bounce".to_string(),
                ..AnimationSpec::default()
            }]);
        }

        let plan = plan_click(&source, |_| None);
        assert!(matches!(
            plan.steps[0].effect,
            ActionEffect::PlayAnimation { .. }
        ));
        assert_eq!(
            plan.steps[1].effect,
            ActionEffect::Navigate {
                url: "/signup".to_string(),
                new_tab: true,
            }
        );
    }

    #[test]
    fn element_without_interactions_plans_nothing() {
        let plan = plan_click(&element("plain"), |_| None);
        assert!(plan.is_empty());
        assert!(plan.skipped.is_empty());
    }
}
