use std::collections::{BTreeMap, BTreeSet};

use crate::element::ElementId;
use crate::viewport::Viewport;

use super::ActionEffect;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// Visibility state changed in the runtime.
    Applied,
    /// Navigation, scrolling and animation are carried out by the renderer.
    Delegated,
    /// The target no longer exists.
    Skipped,
}

/// Transient render-time state: hovered elements and visibility toggled by
/// click actions. Never persisted and never part of history.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuntimeInteractions {
    hovered: BTreeSet<ElementId>,
    visibility: BTreeMap<(ElementId, Viewport), bool>,
}

impl RuntimeInteractions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` when the hover state changed.
    pub fn set_hover(&mut self, element_id: &str, active: bool) -> bool {
        if active {
            self.hovered.insert(element_id.to_string())
        } else {
            self.hovered.remove(element_id)
        }
    }

    pub fn is_hovered(&self, element_id: &str) -> bool {
        self.hovered.contains(element_id)
    }

    pub fn visibility_override(&self, element_id: &str, viewport: Viewport) -> Option<bool> {
        self.visibility
            .get(&(element_id.to_string(), viewport))
            .copied()
    }

    /// Applies a visibility effect. `persisted` reports the element's stored
    /// visibility for a breakpoint, used as the starting point of a toggle.
    pub fn apply<P>(&mut self, effect: &ActionEffect, persisted: P) -> StepOutcome
    where
        P: Fn(&str, Viewport) -> bool,
    {
        match effect {
            ActionEffect::Toggle {
                element_id,
                viewport,
            } => {
                for viewport in scope(*viewport) {
                    let current = self
                        .visibility_override(element_id, viewport)
                        .unwrap_or_else(|| persisted(element_id, viewport));
                    self.visibility
                        .insert((element_id.clone(), viewport), !current);
                }
                StepOutcome::Applied
            }
            ActionEffect::SetVisible {
                element_id,
                viewport,
                visible,
            } => {
                for viewport in scope(*viewport) {
                    self.visibility
                        .insert((element_id.clone(), viewport), *visible);
                }
                StepOutcome::Applied
            }
            ActionEffect::Navigate { .. }
            | ActionEffect::ScrollTo { .. }
            | ActionEffect::PlayAnimation { .. } => StepOutcome::Delegated,
        }
    }

    /// Drops all state held for a removed element.
    pub fn forget(&mut self, element_id: &str) {
        self.hovered.remove(element_id);
        self.visibility.retain(|(id, _), _| id != element_id);
    }

    /// Keeps state only for elements accepted by `keep`.
    pub fn retain<F>(&mut self, keep: F)
    where
        F: Fn(&str) -> bool,
    {
        self.hovered.retain(|id| keep(id.as_str()));
        self.visibility.retain(|(id, _), _| keep(id.as_str()));
    }

    pub fn clear(&mut self) {
        self.hovered.clear();
        self.visibility.clear();
    }
}

fn scope(viewport: Option<Viewport>) -> Vec<Viewport> {
    match viewport {
        Some(viewport) => vec![viewport],
        None => Viewport::ALL.to_vec(),
    }
}
