//! Driven port for listing and creating shorts.

use async_trait::async_trait;

use super::ApiError;
use crate::domain::{FilterSet, Short, ShortDraft};

/// Port for the catalogue endpoints.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CatalogueApi: Send + Sync {
    /// List shorts matching every non-empty field of `filters`.
    async fn list_shorts(&self, filters: &FilterSet) -> Result<Vec<Short>, ApiError>;

    /// Upload a validated draft and return the created item.
    async fn create_short(&self, draft: &ShortDraft) -> Result<Short, ApiError>;
}

/// Fixture catalogue with nothing in it.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixtureCatalogueApi;

#[async_trait]
impl CatalogueApi for FixtureCatalogueApi {
    async fn list_shorts(&self, _filters: &FilterSet) -> Result<Vec<Short>, ApiError> {
        Ok(Vec::new())
    }

    async fn create_short(&self, _draft: &ShortDraft) -> Result<Short, ApiError> {
        Err(ApiError::forbidden("fixture catalogue is read-only"))
    }
}
