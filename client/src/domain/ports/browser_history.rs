//! Driven port for the browser location and session history.

/// Port for reading the current path and pushing history entries.
///
/// Back/forward navigation is driven from outside: the embedder observes the
/// history change and reports the new path to the coordinator.
pub trait BrowserHistory: Send + Sync {
    /// Current location path (no origin).
    fn current_path(&self) -> String;

    /// Push a new entry and make it current.
    fn push(&self, path: &str);

    /// Number of entries in the session history.
    fn len(&self) -> usize;

    /// Whether the history holds no entries.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
