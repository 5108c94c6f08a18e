//! In-process browser history with back/forward support.

use std::sync::{Mutex, PoisonError};

use crate::domain::normalize_path;
use crate::domain::ports::BrowserHistory;

#[derive(Debug)]
struct Entries {
    paths: Vec<String>,
    cursor: usize,
}

/// [`BrowserHistory`] kept in memory, as a browser tab would.
///
/// Pushing discards any forward entries. `back` and `forward` move the cursor
/// and return the path the embedder must report to the coordinator.
///
/// # Examples
/// ```
/// use wiki_client::domain::ports::BrowserHistory;
/// use wiki_client::outbound::MemoryHistory;
///
/// let history = MemoryHistory::new("/teamA");
/// history.push("/teamA/setup");
/// assert_eq!(history.back().as_deref(), Some("/teamA"));
/// assert_eq!(history.forward().as_deref(), Some("/teamA/setup"));
/// ```
#[derive(Debug)]
pub struct MemoryHistory {
    entries: Mutex<Entries>,
}

impl MemoryHistory {
    /// Start with a single entry.
    pub fn new(initial: &str) -> Self {
        Self {
            entries: Mutex::new(Entries {
                paths: vec![normalize_path(initial)],
                cursor: 0,
            }),
        }
    }

    /// Step back one entry.
    pub fn back(&self) -> Option<String> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        let previous = entries.cursor.checked_sub(1)?;
        entries.cursor = previous;
        entries.paths.get(previous).cloned()
    }

    /// Step forward one entry.
    pub fn forward(&self) -> Option<String> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        let next = entries.cursor + 1;
        let path = entries.paths.get(next).cloned()?;
        entries.cursor = next;
        Some(path)
    }

    /// All entries, oldest first.
    pub fn entries(&self) -> Vec<String> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .paths
            .clone()
    }
}

impl BrowserHistory for MemoryHistory {
    fn current_path(&self) -> String {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries
            .paths
            .get(entries.cursor)
            .cloned()
            .unwrap_or_else(|| "/".to_owned())
    }

    fn push(&self, path: &str) {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        let keep = entries.cursor + 1;
        entries.paths.truncate(keep);
        entries.paths.push(normalize_path(path));
        entries.cursor = keep;
    }

    fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .paths
            .len()
    }
}
