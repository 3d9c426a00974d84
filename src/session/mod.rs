mod cache;

use std::cell::RefCell;

use serde_json::Value;

use crate::config::EngineConfig;
use crate::element::{Element, ElementId, ElementKind, ElementPatch};
use crate::error::{BuilderError, BuilderResult};
use crate::grid::{resolve_grid, GridCss};
use crate::history::{History, HistoryEntry};
use crate::interaction::{plan_click, ActionPlan, RuntimeInteractions, ScheduledStep, StepOutcome};
use crate::storage::{PageStorage, PersistenceWorker, SaveRequest};
use crate::store::ElementStore;
use crate::style::{compile_style, InteractionState, StyleDescriptor};
use crate::template::SectionTemplate;
use crate::tokens::{DesignSettings, DesignSettingsPatch, TokenRegistry};
use crate::viewport::{Viewport, ViewportResolver};

use cache::{StyleCache, StyleKey};

#[derive(Debug, Clone, PartialEq)]
pub enum ChangeEvent {
    PageOpened { page_id: String },
    ElementAdded { element_id: ElementId },
    ElementUpdated { element_id: ElementId },
    ElementRemoved { element_id: ElementId },
    VisibilityToggled {
        element_id: ElementId,
        viewport: Viewport,
        visible: bool,
    },
    TemplateImported { element_ids: Vec<ElementId> },
    HistoryMoved { cursor: usize },
    DesignChanged,
    ViewportChanged { viewport: Viewport },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Subscriber = Box<dyn FnMut(&ChangeEvent)>;

/// Editing state for one open page. Committed mutations update the store,
/// record a history snapshot, notify subscribers and queue a background save.
pub struct EditorSession {
    config: EngineConfig,
    store: Option<ElementStore>,
    tokens: Option<TokenRegistry>,
    project_id: Option<String>,
    viewport: ViewportResolver,
    history: History,
    runtime: RuntimeInteractions,
    subscribers: Vec<(SubscriptionId, Subscriber)>,
    next_subscription: u64,
    style_cache: RefCell<StyleCache>,
    persistence: Option<PersistenceWorker>,
}

impl Default for EditorSession {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl std::fmt::Debug for EditorSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditorSession")
            .field("page_id", &self.page_id())
            .field("project_id", &self.project_id)
            .field("viewport", &self.viewport.current())
            .field("history", &self.history.state())
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

impl EditorSession {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            viewport: ViewportResolver::new(config.default_viewport),
            history: History::with_limit(config.history_limit),
            config,
            store: None,
            tokens: None,
            project_id: None,
            runtime: RuntimeInteractions::new(),
            subscribers: Vec::new(),
            next_subscription: 1,
            style_cache: RefCell::new(StyleCache::default()),
            persistence: None,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Starts a background writer over `storage`, debounced by the configured
    /// window. Later commits are saved without blocking the caller.
    pub fn enable_persistence<S>(&mut self, storage: S)
    where
        S: PageStorage + Send + 'static,
    {
        self.persistence = Some(PersistenceWorker::spawn(
            storage,
            self.config.save_debounce(),
        ));
    }

    /// Blocks until every pending save has been written.
    pub fn flush(&self) {
        if let Some(worker) = &self.persistence {
            worker.flush();
        }
    }

    // Page and design lifecycle

    pub fn open_page(&mut self, page_id: &str) {
        self.open_page_with(page_id, Vec::new());
    }

    /// Opens a page over previously persisted elements. A non-empty page is
    /// recorded as the base history entry so the first edit can be undone.
    pub fn open_page_with(&mut self, page_id: &str, elements: Vec<Element>) {
        tracing::info!(page_id, elements = elements.len(), "open page");
        self.history.reset(page_id);
        if !elements.is_empty() {
            let base = HistoryEntry::new(page_id, &elements, format!("open {page_id}"));
            if let Err(err) = self.history.commit(base) {
                tracing::warn!(?err, page_id, "failed to record loaded page in history");
            }
        }
        self.store = Some(ElementStore::with_elements(page_id, elements));
        self.runtime.clear();
        self.style_cache.borrow_mut().clear();
        self.notify(&ChangeEvent::PageOpened {
            page_id: page_id.to_string(),
        });
    }

    pub fn load_page(&mut self, storage: &dyn PageStorage, page_id: &str) -> BuilderResult<()> {
        let elements = storage.load_elements(page_id)?.unwrap_or_default();
        self.open_page_with(page_id, elements);
        Ok(())
    }

    pub fn init_design(&mut self, project_id: &str, settings: DesignSettings) {
        tracing::info!(project_id, theme = %settings.theme, "initialize design settings");
        self.project_id = Some(project_id.to_string());
        self.tokens = Some(TokenRegistry::new(settings));
        self.style_cache.borrow_mut().clear();
    }

    pub fn load_design(&mut self, storage: &dyn PageStorage, project_id: &str) -> BuilderResult<()> {
        let settings = storage.load_design(project_id)?.unwrap_or_default();
        self.init_design(project_id, settings);
        Ok(())
    }

    pub fn page_id(&self) -> Option<&str> {
        self.store.as_ref().map(ElementStore::page_id)
    }

    pub fn project_id(&self) -> Option<&str> {
        self.project_id.as_deref()
    }

    // Element store

    pub fn elements(&self) -> BuilderResult<&[Element]> {
        Ok(self.store()?.elements())
    }

    pub fn get_element(&self, id: &str) -> Option<&Element> {
        self.store.as_ref().and_then(|store| store.get_element(id))
    }

    pub fn add_element(&mut self, partial: &ElementPatch) -> BuilderResult<ElementId> {
        let id = self.store_mut()?.add_element(partial);
        let kind = partial.kind.clone().unwrap_or(ElementKind::Container);
        self.commit(format!("add {kind}"))?;
        self.notify(&ChangeEvent::ElementAdded {
            element_id: id.clone(),
        });
        Ok(id)
    }

    /// Like [`Self::add_element`] for an untyped patch. Unknown categories are
    /// rejected before anything is created.
    pub fn add_element_json(&mut self, partial: Value) -> BuilderResult<ElementId> {
        let patch = ElementPatch::from_json(partial)?;
        self.add_element(&patch)
    }

    /// Returns `Ok(false)` without committing when `id` does not exist.
    pub fn update_element(&mut self, id: &str, partial: &ElementPatch) -> BuilderResult<bool> {
        if !self.store_mut()?.update_element(id, partial) {
            return Ok(false);
        }
        self.commit(format!("update {id}"))?;
        self.notify(&ChangeEvent::ElementUpdated {
            element_id: id.to_string(),
        });
        Ok(true)
    }

    pub fn update_element_json(&mut self, id: &str, partial: Value) -> BuilderResult<bool> {
        let patch = ElementPatch::from_json(partial)?;
        self.update_element(id, &patch)
    }

    pub fn remove_element(&mut self, id: &str) -> BuilderResult<bool> {
        if self.store_mut()?.remove_element(id).is_none() {
            return Ok(false);
        }
        self.runtime.forget(id);
        self.commit(format!("remove {id}"))?;
        self.notify(&ChangeEvent::ElementRemoved {
            element_id: id.to_string(),
        });
        Ok(true)
    }

    pub fn toggle_visibility(
        &mut self,
        id: &str,
        viewport: Viewport,
        visible: bool,
    ) -> BuilderResult<bool> {
        if !self.store_mut()?.toggle_visibility(id, viewport, visible) {
            return Ok(false);
        }
        let action = if visible { "show" } else { "hide" };
        self.commit(format!("{action} {id} on {viewport}"))?;
        self.notify(&ChangeEvent::VisibilityToggled {
            element_id: id.to_string(),
            viewport,
            visible,
        });
        Ok(true)
    }

    /// Adds the template's elements as one history entry.
    pub fn import_template(&mut self, template: &SectionTemplate) -> BuilderResult<Vec<ElementId>> {
        let store = self.store_mut()?;
        let element_ids: Vec<ElementId> = template
            .expand()
            .iter()
            .map(|patch| store.add_element(patch))
            .collect();
        self.commit(format!("import {} template", template.kind))?;
        self.notify(&ChangeEvent::TemplateImported {
            element_ids: element_ids.clone(),
        });
        Ok(element_ids)
    }

    // Rendering

    /// Concrete style for `id` on `viewport`, including hover and runtime
    /// visibility. `Ok(None)` for an unknown id.
    pub fn compile_style(
        &self,
        id: &str,
        viewport: Viewport,
    ) -> BuilderResult<Option<StyleDescriptor>> {
        let tokens = self.tokens()?;
        let store = self.store()?;
        let Some(element) = store.get_element(id) else {
            tracing::debug!(element_id = %id, "compile requested for missing element");
            return Ok(None);
        };

        let interaction = InteractionState {
            hovered: self.runtime.is_hovered(id),
            visible: self.runtime.visibility_override(id, viewport),
        };
        let key = StyleKey {
            element_id: id.to_string(),
            viewport,
            store_version: store.version(),
            design_version: tokens.version(),
            interaction,
        };
        if let Some(cached) = self.style_cache.borrow().get(&key) {
            return Ok(Some(cached.clone()));
        }

        let descriptor = compile_style(element, viewport, tokens, Some(&interaction));
        self.style_cache
            .borrow_mut()
            .insert(key, descriptor.clone());
        Ok(Some(descriptor))
    }

    /// [`Self::compile_style`] on the active viewport.
    pub fn compile_current(&self, id: &str) -> BuilderResult<Option<StyleDescriptor>> {
        self.compile_style(id, self.viewport.current())
    }

    /// Grid output for `id` on `viewport`, when any grid settings apply there.
    pub fn resolve_grid(&self, id: &str, viewport: Viewport) -> BuilderResult<Option<GridCss>> {
        Ok(self
            .store()?
            .get_element(id)
            .and_then(|element| element.properties.responsive.grid(viewport))
            .map(|spec| resolve_grid(&spec)))
    }

    // Interactions

    pub fn dispatch_click(&self, id: &str) -> BuilderResult<ActionPlan> {
        let store = self.store()?;
        let Some(source) = store.get_element(id) else {
            tracing::warn!(element_id = %id, "click on missing element ignored");
            return Ok(ActionPlan {
                source: id.to_string(),
                ..ActionPlan::default()
            });
        };
        Ok(plan_click(source, |target| store.get_element(target)))
    }

    /// Runs one scheduled step. The target is looked up again, so an element
    /// removed between planning and execution is skipped.
    pub fn apply_step(&mut self, step: &ScheduledStep) -> BuilderResult<StepOutcome> {
        let store = self.store.as_ref().ok_or(BuilderError::StoreNotInitialized)?;
        if let Some(target) = step.effect.target() {
            if !store.contains(target) {
                tracing::warn!(
                    element_id = %target,
                    chain_index = ?step.chain_index,
                    "scheduled step target no longer exists; skipping"
                );
                return Ok(StepOutcome::Skipped);
            }
        }
        let outcome = self.runtime.apply(&step.effect, |id, viewport| {
            store
                .get_element(id)
                .is_none_or(|element| element.is_visible(viewport))
        });
        Ok(outcome)
    }

    /// Returns `true` when the hover state changed.
    pub fn dispatch_hover(&mut self, id: &str, active: bool) -> bool {
        if active && self.get_element(id).is_none() {
            tracing::debug!(element_id = %id, "hover on missing element ignored");
            return false;
        }
        self.runtime.set_hover(id, active)
    }

    pub fn runtime_interactions(&self) -> &RuntimeInteractions {
        &self.runtime
    }

    // History

    pub fn undo(&mut self) -> BuilderResult<bool> {
        self.move_history(true)
    }

    pub fn redo(&mut self) -> BuilderResult<bool> {
        self.move_history(false)
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    fn move_history(&mut self, backwards: bool) -> BuilderResult<bool> {
        let store = self.store.as_mut().ok_or(BuilderError::StoreNotInitialized)?;
        let entry = if backwards {
            self.history.undo()
        } else {
            self.history.redo()
        };
        let Some(entry) = entry else {
            return Ok(false);
        };
        store.replace_elements(entry.elements.clone());
        let restored = store.elements();
        self.runtime.retain(|id| restored.iter().any(|element| element.id == id));

        let cursor = self.history.cursor().unwrap_or_default();
        self.schedule_page_save();
        self.notify(&ChangeEvent::HistoryMoved { cursor });
        Ok(true)
    }

    fn commit(&mut self, label: String) -> BuilderResult<()> {
        let store = self.store.as_ref().ok_or(BuilderError::StoreNotInitialized)?;
        let entry = HistoryEntry::new(store.page_id(), store.elements(), label);
        self.history.commit(entry)?;
        self.schedule_page_save();
        Ok(())
    }

    // Design tokens

    pub fn design_settings(&self) -> BuilderResult<&DesignSettings> {
        Ok(self.tokens()?.settings())
    }

    pub fn update_design_settings(&mut self, patch: &DesignSettingsPatch) -> BuilderResult<()> {
        self.tokens_mut()?.update_design_settings(patch);
        self.design_changed();
        Ok(())
    }

    /// Returns `Ok(false)` for an unknown theme id.
    pub fn apply_theme(&mut self, theme_id: &str) -> BuilderResult<bool> {
        if !self.tokens_mut()?.apply_theme(theme_id) {
            return Ok(false);
        }
        self.design_changed();
        Ok(true)
    }

    pub fn add_custom_color(&mut self, name: &str, value: &str) -> BuilderResult<()> {
        self.tokens_mut()?.add_custom_color(name, value);
        self.design_changed();
        Ok(())
    }

    pub fn add_custom_font(&mut self, name: &str, url: &str, weights: &[u16]) -> BuilderResult<()> {
        self.tokens_mut()?.add_custom_font(name, url, weights);
        self.design_changed();
        Ok(())
    }

    pub fn set_custom_css(&mut self, css: &str) -> BuilderResult<()> {
        self.tokens_mut()?.set_custom_css(css);
        self.design_changed();
        Ok(())
    }

    fn design_changed(&mut self) {
        if let (Some(worker), Some(project_id), Some(tokens)) =
            (&self.persistence, &self.project_id, &self.tokens)
        {
            worker.submit(SaveRequest::design(
                project_id.clone(),
                tokens.settings().clone(),
            ));
        }
        self.notify(&ChangeEvent::DesignChanged);
    }

    // Viewport

    pub fn viewport(&self) -> Viewport {
        self.viewport.current()
    }

    pub fn set_viewport(&mut self, viewport: Viewport) -> bool {
        if !self.viewport.set_viewport(viewport) {
            return false;
        }
        self.notify(&ChangeEvent::ViewportChanged { viewport });
        true
    }

    // Observers

    pub fn subscribe<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: FnMut(&ChangeEvent) + 'static,
    {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription = self.next_subscription.saturating_add(1);
        self.subscribers.push((id, Box::new(callback)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(existing, _)| *existing != id);
        self.subscribers.len() != before
    }

    fn notify(&mut self, event: &ChangeEvent) {
        for (_, subscriber) in &mut self.subscribers {
            subscriber(event);
        }
    }

    // Internals

    fn store(&self) -> BuilderResult<&ElementStore> {
        self.store.as_ref().ok_or(BuilderError::StoreNotInitialized)
    }

    fn store_mut(&mut self) -> BuilderResult<&mut ElementStore> {
        self.store.as_mut().ok_or(BuilderError::StoreNotInitialized)
    }

    fn tokens(&self) -> BuilderResult<&TokenRegistry> {
        self.tokens.as_ref().ok_or(BuilderError::TokensNotInitialized)
    }

    fn tokens_mut(&mut self) -> BuilderResult<&mut TokenRegistry> {
        self.tokens.as_mut().ok_or(BuilderError::TokensNotInitialized)
    }

    fn schedule_page_save(&self) {
        if let (Some(worker), Some(store)) = (&self.persistence, &self.store) {
            worker.submit(SaveRequest::page(store.page_id(), store.snapshot()));
        }
    }
}
