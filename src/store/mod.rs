use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::element::{Element, ElementId, ElementKind, ElementPatch};
use crate::viewport::Viewport;

#[derive(Debug, Clone)]
pub struct ElementStore {
    page_id: String,
    elements: Vec<Element>,
    id_stamp: u64,
    next_id: u64,
    version: u64,
}

impl ElementStore {
    pub fn new(page_id: impl Into<String>) -> Self {
        Self::with_elements(page_id, Vec::new())
    }

    /// Store preloaded with persisted elements, in their stored order.
    pub fn with_elements(page_id: impl Into<String>, elements: Vec<Element>) -> Self {
        Self::with_id_stamp(page_id, elements, next_id_stamp())
    }

    fn with_id_stamp(page_id: impl Into<String>, elements: Vec<Element>, stamp: u64) -> Self {
        Self {
            page_id: page_id.into(),
            elements,
            id_stamp: stamp,
            next_id: 1,
            version: 0,
        }
    }

    // The stamp is unique per store and the counter only moves forward: a
    // removed id is never handed out again, even after a reload.
    fn allocate_id(&mut self) -> ElementId {
        loop {
            let id = format!("element-{}-{}", self.id_stamp, self.next_id);
            self.next_id = self.next_id.saturating_add(1);
            if !self.contains(&id) {
                return id;
            }
        }
    }

    fn find_mut(&mut self, id: &str) -> Option<&mut Element> {
        self.elements.iter_mut().find(|element| element.id == id)
    }

    fn touch(&mut self) {
        self.version = self.version.wrapping_add(1);
    }

    pub fn page_id(&self) -> &str {
        &self.page_id
    }

    /// Bumped on every mutation.
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.elements.iter().any(|element| element.id == id)
    }

    pub fn get_element(&self, id: &str) -> Option<&Element> {
        self.elements.iter().find(|element| element.id == id)
    }

    /// Creates an element from `partial` and appends it. Missing kind defaults
    /// to a container.
    pub fn add_element(&mut self, partial: &ElementPatch) -> ElementId {
        let id = self.allocate_id();
        let kind = partial.kind.clone().unwrap_or(ElementKind::Container);
        let mut element = Element::new(id.clone(), kind);
        element.apply_patch(partial);
        tracing::debug!(element_id = %id, kind = %element.kind, "add element");
        self.elements.push(element);
        self.touch();
        id
    }

    /// Merges `partial` into the element by category. Unknown ids are a no-op.
    pub fn update_element(&mut self, id: &str, partial: &ElementPatch) -> bool {
        let Some(element) = self.find_mut(id) else {
            tracing::warn!(element_id = %id, "update ignored: element does not exist");
            return false;
        };
        element.apply_patch(partial);
        self.touch();
        true
    }

    pub fn remove_element(&mut self, id: &str) -> Option<Element> {
        let Some(index) = self.elements.iter().position(|element| element.id == id) else {
            tracing::warn!(element_id = %id, "remove ignored: element does not exist");
            return None;
        };
        let removed = self.elements.remove(index);
        self.touch();
        Some(removed)
    }

    /// Sets `responsive[viewport].isVisible`, leaving other breakpoints alone.
    pub fn toggle_visibility(&mut self, id: &str, viewport: Viewport, visible: bool) -> bool {
        let Some(element) = self.find_mut(id) else {
            tracing::warn!(element_id = %id, ?viewport, "visibility toggle ignored: element does not exist");
            return false;
        };
        element.properties.responsive.get_or_insert(viewport).is_visible = Some(visible);
        self.touch();
        true
    }

    /// Deep copy of the current elements.
    pub fn snapshot(&self) -> Vec<Element> {
        self.elements.clone()
    }

    /// Replaces the contents wholesale, as when restoring a history entry.
    pub fn replace_elements(&mut self, elements: Vec<Element>) {
        self.elements = elements;
        self.touch();
    }
}

static LAST_ID_STAMP: AtomicU64 = AtomicU64::new(0);

/// Wall-clock milliseconds, bumped past the previous stamp so two stores
/// created in the same millisecond still differ.
fn next_id_stamp() -> u64 {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX))
        .unwrap_or(0);
    let previous = LAST_ID_STAMP
        .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |last| {
            Some(now.max(last.saturating_add(1)))
        })
        .unwrap_or(now);
    now.max(previous.saturating_add(1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::{AdvancedStyles, ElementProperties, Filters, StyleLayer};

    fn filters_patch(filters: Filters) -> ElementPatch {
        ElementPatch::with_properties(ElementProperties {
            style: StyleLayer {
                filters: Some(filters),
                ..StyleLayer::default()
            },
            ..ElementProperties::default()
        })
    }

    #[test]
    fn ids_are_sequential_and_skip_collisions() {
        let mut store = ElementStore::with_id_stamp(
            "page",
            vec![Element::new("element-7-2", ElementKind::Text)],
            7,
        );
        let first = store.add_element(&ElementPatch::of_kind(ElementKind::Button));
        let second = store.add_element(&ElementPatch::default());

        assert_eq!(first, "element-7-1");
        assert_eq!(second, "element-7-3");
        assert_eq!(
            store.get_element(&second).map(|element| element.kind.clone()),
            Some(ElementKind::Container)
        );
    }

    #[test]
    fn removed_id_is_not_reused_after_reload() {
        let mut first = ElementStore::with_id_stamp("page", Vec::new(), 10);
        let kept = first.add_element(&ElementPatch::of_kind(ElementKind::Text));
        let dropped = first.add_element(&ElementPatch::of_kind(ElementKind::Image));
        assert!(first.remove_element(&dropped).is_some());
        let fresh = first.add_element(&ElementPatch::of_kind(ElementKind::Image));
        assert_ne!(fresh, dropped);

        let mut reloaded = ElementStore::with_id_stamp("page", first.snapshot(), 11);
        assert!(reloaded.remove_element(&fresh).is_some());
        let added = reloaded.add_element(&ElementPatch::of_kind(ElementKind::Image));
        assert_ne!(added, fresh);
        assert_ne!(added, dropped);
        assert_ne!(added, kept);
    }

    #[test]
    fn stores_opened_back_to_back_get_distinct_stamps() {
        let first = next_id_stamp();
        let second = next_id_stamp();
        assert!(second > first);
    }

    #[test]
    fn update_keeps_sibling_leaves() {
        let mut store = ElementStore::new("page");
        let id = store.add_element(&filters_patch(Filters {
            blur: Some(2.0),
            brightness: Some(1.1),
            ..Filters::default()
        }));

        assert!(store.update_element(
            &id,
            &filters_patch(Filters {
                blur: Some(5.0),
                ..Filters::default()
            })
        ));

        let filters = store
            .get_element(&id)
            .and_then(|element| element.properties.style.filters.clone())
            .expect("filters present");
        assert_eq!(filters.blur, Some(5.0));
        assert_eq!(filters.brightness, Some(1.1));
    }

    #[test]
    fn update_of_missing_element_is_a_no_op() {
        let mut store = ElementStore::new("page");
        let version = store.version();
        let patch = ElementPatch::with_properties(ElementProperties {
            style: StyleLayer {
                advanced_styles: Some(AdvancedStyles {
                    z_index: Some(3),
                    ..AdvancedStyles::default()
                }),
                ..StyleLayer::default()
            },
            ..ElementProperties::default()
        });

        assert!(!store.update_element("ghost", &patch));
        assert_eq!(store.version(), version);
        assert!(store.is_empty());
    }

    #[test]
    fn toggle_visibility_is_per_viewport() {
        let mut store = ElementStore::new("page");
        let id = store.add_element(&ElementPatch::of_kind(ElementKind::Image));

        assert!(store.toggle_visibility(&id, Viewport::Mobile, false));
        let element = store.get_element(&id).expect("element exists");
        assert!(!element.is_visible(Viewport::Mobile));
        assert!(element.is_visible(Viewport::Tablet));
        assert!(element.is_visible(Viewport::Desktop));
    }

    #[test]
    fn remove_and_snapshot() {
        let mut store = ElementStore::new("page");
        let a = store.add_element(&ElementPatch::of_kind(ElementKind::Text));
        let b = store.add_element(&ElementPatch::of_kind(ElementKind::Text));
        let before = store.snapshot();

        let removed = store.remove_element(&a).expect("removed");
        assert_eq!(removed.id, a);
        assert!(store.remove_element(&a).is_none());
        assert_eq!(store.len(), 1);
        assert_eq!(before.len(), 2);

        store.replace_elements(before);
        assert!(store.contains(&a));
        assert!(store.contains(&b));
    }
}
