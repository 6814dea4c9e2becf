//! Driven port for the navigable location (the browser URL).

use crate::domain::QueryParams;

/// Port exposing the query-string half of the current location.
#[cfg_attr(test, mockall::automock)]
pub trait Navigator: Send + Sync {
    /// Query parameters of the current location.
    fn query(&self) -> QueryParams;

    /// Navigate to the same path with `query`, adding a history entry.
    fn push(&self, query: QueryParams);

    /// Swap the current entry's query without adding history.
    fn replace(&self, query: QueryParams);
}
