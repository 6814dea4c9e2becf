//! URL-derived view state: which short is open in the playback overlay.
//!
//! The overlay has no private state. It is a pure function of one query
//! parameter and the current result list, so refresh, back/forward and shared
//! links all reproduce it.

use std::sync::Arc;

use tracing::debug;
use url::form_urlencoded;

use super::ports::Navigator;
use super::{Short, ShortId};

/// Query parameter carrying the open short's identifier.
pub const SELECTION_PARAM: &str = "video";

/// Ordered query-string parameters.
///
/// # Examples
/// ```
/// use shortflix_client::domain::QueryParams;
///
/// let mut params = QueryParams::parse("?page=2&video=7");
/// assert_eq!(params.get("video"), Some("7"));
/// params.remove("video");
/// assert_eq!(params.to_query_string(), "page=2");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams(Vec<(String, String)>);

impl QueryParams {
    /// Parse a query string, with or without the leading `?`.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.strip_prefix('?').unwrap_or(raw);
        Self(
            form_urlencoded::parse(trimmed.as_bytes())
                .map(|(key, value)| (key.into_owned(), value.into_owned()))
                .collect(),
        )
    }

    /// First value for `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(candidate, _)| candidate == key)
            .map(|(_, value)| value.as_str())
    }

    /// Set `key` to a single value, keeping its position if already present.
    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        let value = value.into();
        let mut seen = false;
        self.0.retain_mut(|(candidate, existing)| {
            if candidate != key {
                return true;
            }
            if seen {
                return false;
            }
            seen = true;
            existing.clone_from(&value);
            true
        });
        if !seen {
            self.0.push((key.to_owned(), value));
        }
    }

    /// Remove every value for `key`, leaving other parameters untouched.
    pub fn remove(&mut self, key: &str) {
        self.0.retain(|(candidate, _)| candidate != key);
    }

    /// Return whether no parameter is set.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Encode without the leading `?`.
    pub fn to_query_string(&self) -> String {
        form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.0.iter())
            .finish()
    }
}

/// Router deriving the playback overlay from the navigable location.
pub struct ViewStateRouter {
    navigator: Arc<dyn Navigator>,
}

impl ViewStateRouter {
    /// Router over `navigator`'s location.
    pub fn new(navigator: Arc<dyn Navigator>) -> Self {
        Self { navigator }
    }

    /// Raw selection key from the location, if any.
    pub fn selection_key(&self) -> Option<String> {
        self.navigator
            .query()
            .get(SELECTION_PARAM)
            .map(str::to_owned)
    }

    /// Open the overlay for `id`, adding a history entry so "back" closes it.
    pub fn open(&self, id: ShortId) {
        let mut query = self.navigator.query();
        query.set(SELECTION_PARAM, id.to_string());
        self.navigator.push(query);
    }

    /// Close the overlay by dropping only the selection parameter.
    pub fn close(&self) {
        let mut query = self.navigator.query();
        if query.get(SELECTION_PARAM).is_none() {
            return;
        }
        query.remove(SELECTION_PARAM);
        self.navigator.push(query);
    }

    /// The short to play, looked up in the current result list.
    ///
    /// Keys that do not parse or do not match any listed short resolve to
    /// `None`: the overlay is simply closed.
    pub fn selected<'a>(&self, results: &'a [Short]) -> Option<&'a Short> {
        let key = self.selection_key()?;
        let Ok(id) = key.parse::<ShortId>() else {
            debug!(%key, "ignoring malformed selection key");
            return None;
        };
        let found = results.iter().find(|short| short.id == id);
        if found.is_none() {
            debug!(%id, "selection not in current results; overlay closed");
        }
        found
    }

    /// Return whether the overlay shows a short from `results`.
    pub fn is_open(&self, results: &[Short]) -> bool {
        self.selected(results).is_some()
    }

    /// Drop a selection key that matches nothing in a settled result list.
    ///
    /// The current history entry is replaced rather than pushed, so "back"
    /// does not return to the dead link. Returns whether the key was dropped.
    pub fn drop_unmatched_selection(&self, results: &[Short]) -> bool {
        if self.selection_key().is_none() || self.selected(results).is_some() {
            return false;
        }
        let mut query = self.navigator.query();
        query.remove(SELECTION_PARAM);
        self.navigator.replace(query);
        true
    }
}
