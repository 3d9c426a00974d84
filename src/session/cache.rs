use std::collections::HashMap;

use crate::element::ElementId;
use crate::style::{InteractionState, StyleDescriptor};
use crate::viewport::Viewport;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(super) struct StyleKey {
    pub(super) element_id: ElementId,
    pub(super) viewport: Viewport,
    pub(super) store_version: u64,
    pub(super) design_version: u64,
    pub(super) interaction: InteractionState,
}

/// Memoized descriptors. Entries from older store or design versions are
/// evicted on insert, so a lookup can never return a stale descriptor.
#[derive(Debug, Default)]
pub(super) struct StyleCache {
    entries: HashMap<StyleKey, StyleDescriptor>,
}

impl StyleCache {
    pub(super) fn get(&self, key: &StyleKey) -> Option<&StyleDescriptor> {
        self.entries.get(key)
    }

    pub(super) fn insert(&mut self, key: StyleKey, descriptor: StyleDescriptor) {
        self.entries.retain(|existing, _| {
            existing.store_version == key.store_version
                && existing.design_version == key.design_version
        });
        self.entries.insert(key, descriptor);
    }

    #[cfg(test)]
    pub(super) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(super) fn clear(&mut self) {
        self.entries.clear();
    }
}
