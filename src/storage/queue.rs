use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use crate::element::Element;
use crate::tokens::DesignSettings;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SaveKey {
    Page(String),
    Design(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum SavePayload {
    Elements(Vec<Element>),
    Design(DesignSettings),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SaveRequest {
    pub key: SaveKey,
    pub payload: SavePayload,
}

impl SaveRequest {
    pub fn page(page_id: impl Into<String>, elements: Vec<Element>) -> Self {
        Self {
            key: SaveKey::Page(page_id.into()),
            payload: SavePayload::Elements(elements),
        }
    }

    pub fn design(project_id: impl Into<String>, settings: DesignSettings) -> Self {
        Self {
            key: SaveKey::Design(project_id.into()),
            payload: SavePayload::Design(settings),
        }
    }
}

#[derive(Debug)]
struct Pending {
    due: Instant,
    payload: SavePayload,
}

/// Debounces save requests per key. A newer request for the same key replaces
/// the pending payload and restarts its window, so only the latest state is
/// ever written.
#[derive(Debug)]
pub struct SaveQueue {
    debounce: Duration,
    pending: BTreeMap<SaveKey, Pending>,
}

impl SaveQueue {
    pub fn new(debounce: Duration) -> Self {
        Self {
            debounce,
            pending: BTreeMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Returns `true` when an older pending request was superseded.
    pub fn push(&mut self, request: SaveRequest, now: Instant) -> bool {
        let pending = Pending {
            due: now + self.debounce,
            payload: request.payload,
        };
        let superseded = self.pending.insert(request.key.clone(), pending).is_some();
        if superseded {
            tracing::debug!(key = ?request.key, "superseded pending save");
        }
        superseded
    }

    /// Earliest deadline among pending requests.
    pub fn next_due(&self) -> Option<Instant> {
        self.pending.values().map(|pending| pending.due).min()
    }

    /// Removes and returns every request whose window has elapsed.
    pub fn take_due(&mut self, now: Instant) -> Vec<SaveRequest> {
        let due_keys: Vec<SaveKey> = self
            .pending
            .iter()
            .filter(|(_, pending)| pending.due <= now)
            .map(|(key, _)| key.clone())
            .collect();
        due_keys
            .into_iter()
            .filter_map(|key| {
                self.pending
                    .remove(&key)
                    .map(|pending| SaveRequest {
                        key,
                        payload: pending.payload,
                    })
            })
            .collect()
    }

    pub fn drain(&mut self) -> Vec<SaveRequest> {
        std::mem::take(&mut self.pending)
            .into_iter()
            .map(|(key, pending)| SaveRequest {
                key,
                payload: pending.payload,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::ElementKind;

    fn page(ids: &[&str]) -> SaveRequest {
        SaveRequest::page(
            "home",
            ids.iter()
                .map(|id| Element::new(*id, ElementKind::Text))
                .collect(),
        )
    }

    #[test]
    fn newer_request_supersedes_pending_one() {
        let start = Instant::now();
        let mut queue = SaveQueue::new(Duration::from_millis(800));

        assert!(!queue.push(page(&["a"]), start));
        assert!(queue.push(page(&["a", "b"]), start + Duration::from_millis(500)));
        assert_eq!(queue.len(), 1);

        assert!(queue.take_due(start + Duration::from_millis(900)).is_empty());
        let due = queue.take_due(start + Duration::from_millis(1300));
        assert_eq!(due, vec![page(&["a", "b"])]);
        assert!(queue.is_empty());
    }

    #[test]
    fn keys_are_debounced_independently() {
        let start = Instant::now();
        let mut queue = SaveQueue::new(Duration::from_millis(100));
        queue.push(page(&["a"]), start);
        queue.push(
            SaveRequest::design("acme", DesignSettings::default()),
            start + Duration::from_millis(50),
        );

        assert_eq!(queue.next_due(), Some(start + Duration::from_millis(100)));
        let first = queue.take_due(start + Duration::from_millis(120));
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].key, SaveKey::Page("home".to_string()));

        let rest = queue.drain();
        assert_eq!(rest[0].key, SaveKey::Design("acme".to_string()));
        assert!(queue.next_due().is_none());
    }
}
