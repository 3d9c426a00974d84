use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::element::Element;

pub type HistoryResult<T> = std::result::Result<T, HistoryError>;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum HistoryError {
    #[error("snapshot for page {found} cannot be committed to the history of page {expected}")]
    PageMismatch { expected: String, found: String },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryMetadata {
    pub label: String,
}

/// One committed state of a page. `elements` is an owned copy; nothing in the
/// live store aliases it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub page_id: String,
    pub elements: Vec<Element>,
    pub metadata: HistoryMetadata,
    /// Milliseconds since the Unix epoch.
    pub timestamp: u64,
}

impl HistoryEntry {
    pub fn new(page_id: impl Into<String>, elements: &[Element], label: impl Into<String>) -> Self {
        Self {
            page_id: page_id.into(),
            elements: elements.to_vec(),
            metadata: HistoryMetadata {
                label: label.into(),
            },
            timestamp: now_millis(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryState {
    Empty,
    Active { cursor: usize, len: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Undo,
    Redo,
}

impl Direction {
    const fn empty_message(self) -> &'static str {
        match self {
            Self::Undo => "nothing to undo",
            Self::Redo => "nothing to redo",
        }
    }
}

/// Entries plus a cursor pointing at the state the store currently shows.
#[derive(Debug, Clone, Default)]
pub struct History {
    page_id: Option<String>,
    entries: Vec<HistoryEntry>,
    cursor: Option<usize>,
    limit: Option<usize>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keeps at most `limit` entries; older ones are dropped on commit.
    pub fn with_limit(limit: Option<usize>) -> Self {
        Self {
            limit: limit.filter(|limit| *limit > 0),
            ..Self::default()
        }
    }

    pub fn page_id(&self) -> Option<&str> {
        self.page_id.as_deref()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    pub fn current(&self) -> Option<&HistoryEntry> {
        self.cursor.and_then(|cursor| self.entries.get(cursor))
    }

    pub fn state(&self) -> HistoryState {
        match self.cursor {
            Some(cursor) => HistoryState::Active {
                cursor,
                len: self.entries.len(),
            },
            None => HistoryState::Empty,
        }
    }

    /// Starts a fresh log for `page_id`.
    pub fn reset(&mut self, page_id: impl Into<String>) {
        self.page_id = Some(page_id.into());
        self.entries.clear();
        self.cursor = None;
    }

    /// Appends `entry`, discarding any redo tail first. Returns the new cursor.
    pub fn commit(&mut self, entry: HistoryEntry) -> HistoryResult<usize> {
        match &self.page_id {
            Some(expected) if *expected != entry.page_id => {
                return Err(HistoryError::PageMismatch {
                    expected: expected.clone(),
                    found: entry.page_id,
                });
            }
            Some(_) => {}
            None => self.page_id = Some(entry.page_id.clone()),
        }

        if let Some(cursor) = self.cursor {
            if cursor + 1 < self.entries.len() {
                tracing::debug!(
                    dropped = self.entries.len() - cursor - 1,
                    "discarding redo tail"
                );
                self.entries.truncate(cursor + 1);
            }
        }

        tracing::debug!(label = %entry.metadata.label, "commit history entry");
        self.entries.push(entry);

        if let Some(limit) = self.limit {
            if self.entries.len() > limit {
                let overflow = self.entries.len() - limit;
                self.entries.drain(..overflow);
            }
        }

        let cursor = self.entries.len() - 1;
        self.cursor = Some(cursor);
        Ok(cursor)
    }

    pub fn can_undo(&self) -> bool {
        self.cursor.is_some_and(|cursor| cursor > 0)
    }

    pub fn can_redo(&self) -> bool {
        self.cursor
            .is_some_and(|cursor| cursor + 1 < self.entries.len())
    }

    /// Moves back one entry. `None` at the oldest entry.
    pub fn undo(&mut self) -> Option<&HistoryEntry> {
        self.step(Direction::Undo)
    }

    /// Moves forward one entry. `None` at the newest entry.
    pub fn redo(&mut self) -> Option<&HistoryEntry> {
        self.step(Direction::Redo)
    }

    fn step(&mut self, direction: Direction) -> Option<&HistoryEntry> {
        let allowed = match direction {
            Direction::Undo => self.can_undo(),
            Direction::Redo => self.can_redo(),
        };
        let cursor = match (allowed, self.cursor) {
            (true, Some(cursor)) => cursor,
            _ => {
                tracing::debug!(state = ?self.state(), "{}", direction.empty_message());
                return None;
            }
        };

        let next = match direction {
            Direction::Undo => cursor - 1,
            Direction::Redo => cursor + 1,
        };
        self.cursor = Some(next);
        self.entries.get(next)
    }
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX))
        .unwrap_or(0)
}
