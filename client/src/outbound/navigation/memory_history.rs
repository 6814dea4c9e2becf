//! In-process browser history for the navigation port.
//!
//! Behaves like a tab's session history: `push` drops any forward entries,
//! `replace` rewrites the current entry in place.

use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::domain::QueryParams;
use crate::domain::ports::Navigator;

#[derive(Debug)]
struct History {
    entries: Vec<QueryParams>,
    cursor: usize,
}

/// History stack for one path, keyed only by its query string.
///
/// # Examples
/// ```
/// use shortflix_client::domain::QueryParams;
/// use shortflix_client::domain::ports::Navigator;
/// use shortflix_client::outbound::navigation::MemoryHistory;
///
/// let history = MemoryHistory::new(QueryParams::default());
/// history.push(QueryParams::parse("video=3"));
/// assert_eq!(history.current_url(), "/?video=3");
/// assert!(history.back());
/// assert_eq!(history.current_url(), "/");
/// ```
#[derive(Debug)]
pub struct MemoryHistory {
    path: String,
    state: Mutex<History>,
}

impl MemoryHistory {
    /// History rooted at `/` with one entry.
    pub fn new(initial: QueryParams) -> Self {
        Self::at_path("/", initial)
    }

    /// History for `path` with one entry.
    pub fn at_path(path: impl Into<String>, initial: QueryParams) -> Self {
        Self {
            path: path.into(),
            state: Mutex::new(History {
                entries: vec![initial],
                cursor: 0,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, History> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Step back one entry. Returns false at the oldest entry.
    pub fn back(&self) -> bool {
        let mut history = self.lock();
        if history.cursor == 0 {
            return false;
        }
        history.cursor -= 1;
        true
    }

    /// Step forward one entry. Returns false at the newest entry.
    pub fn forward(&self) -> bool {
        let mut history = self.lock();
        if history.cursor + 1 >= history.entries.len() {
            return false;
        }
        history.cursor += 1;
        true
    }

    /// Number of history entries.
    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    /// Always false: history keeps its first entry.
    pub fn is_empty(&self) -> bool {
        self.lock().entries.is_empty()
    }

    /// Path plus query of the current entry, e.g. `/?video=3`.
    pub fn current_url(&self) -> String {
        let query = self.query().to_query_string();
        if query.is_empty() {
            self.path.clone()
        } else {
            format!("{}?{query}", self.path)
        }
    }
}

impl Navigator for MemoryHistory {
    fn query(&self) -> QueryParams {
        let history = self.lock();
        history
            .entries
            .get(history.cursor)
            .cloned()
            .unwrap_or_default()
    }

    fn push(&self, query: QueryParams) {
        let mut history = self.lock();
        let keep = history.cursor + 1;
        history.entries.truncate(keep);
        history.entries.push(query);
        history.cursor = keep;
    }

    fn replace(&self, query: QueryParams) {
        let mut history = self.lock();
        let cursor = history.cursor;
        if let Some(entry) = history.entries.get_mut(cursor) {
            *entry = query;
        }
    }
}
