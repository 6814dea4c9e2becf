//! Test utilities for the client crate.
//!
//! Shared by unit tests (in `src/`) and integration tests (in `tests/`). Only
//! compiled for tests or with the `test-support` feature.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use tokio::sync::oneshot;

use crate::domain::ports::{ApiError, CatalogueApi};
use crate::domain::{FilterSet, OwnerRef, Short, ShortDraft, ShortId};

/// Build a catalogue item with fixed timestamps.
pub fn short(id: u64, title: &str) -> Short {
    let created_at = Utc
        .with_ymd_and_hms(2025, 11, 2, 9, 30, 0)
        .single()
        .unwrap_or_default();
    Short {
        id: ShortId::new(id),
        title: title.to_owned(),
        description: String::new(),
        tags: Vec::new(),
        media_uri: format!("http://localhost:8000/media/shorts/videos/{id}.mp4"),
        thumbnail_uri: None,
        view_count: 0,
        created_at,
        updated_at: created_at,
        owner: OwnerRef::Username("alice".to_owned()),
    }
}

type ListingResult = Result<Vec<Short>, ApiError>;

enum Scripted {
    Ready(ListingResult),
    Gated(oneshot::Receiver<ListingResult>),
}

/// Catalogue double that records queries and answers from a script.
///
/// Responses are consumed in call order. Gated responses park the call until
/// the returned sender fires, which lets tests resolve overlapping queries in
/// any order. An exhausted script answers with an empty listing.
#[derive(Default)]
pub struct ScriptedCatalogue {
    calls: Mutex<Vec<FilterSet>>,
    script: Mutex<VecDeque<Scripted>>,
    uploads: Mutex<Vec<ShortDraft>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl ScriptedCatalogue {
    /// Queue an immediate answer.
    pub fn push_ready(&self, result: ListingResult) {
        lock(&self.script).push_back(Scripted::Ready(result));
    }

    /// Queue a parked answer released through the returned sender.
    pub fn push_gated(&self) -> oneshot::Sender<ListingResult> {
        let (sender, receiver) = oneshot::channel();
        lock(&self.script).push_back(Scripted::Gated(receiver));
        sender
    }

    /// Filters of every listing call so far.
    pub fn calls(&self) -> Vec<FilterSet> {
        lock(&self.calls).clone()
    }

    /// Drafts passed to `create_short`.
    pub fn uploads(&self) -> Vec<ShortDraft> {
        lock(&self.uploads).clone()
    }
}

#[async_trait]
impl CatalogueApi for ScriptedCatalogue {
    async fn list_shorts(&self, filters: &FilterSet) -> Result<Vec<Short>, ApiError> {
        lock(&self.calls).push(filters.clone());
        let next = lock(&self.script).pop_front();
        match next {
            None => Ok(Vec::new()),
            Some(Scripted::Ready(result)) => result,
            Some(Scripted::Gated(receiver)) => receiver
                .await
                .unwrap_or_else(|_| Err(ApiError::transport("scripted response dropped"))),
        }
    }

    async fn create_short(&self, draft: &ShortDraft) -> Result<Short, ApiError> {
        lock(&self.uploads).push(draft.clone());
        let id = u64::try_from(lock(&self.uploads).len()).unwrap_or(u64::MAX);
        Ok(short(id, &draft.title))
    }
}

/// Let spawned tasks run until they park.
pub async fn settle() {
    for _ in 0..16 {
        tokio::task::yield_now().await;
    }
}
