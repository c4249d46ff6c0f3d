//! Centralised exhibitor store: reducer-driven state plus an async fetch
//! action that goes through the same [`ExhibitorAcquirer`] as the queries.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use shared::{
    domain::{ExhibitorId, ExhibitorRecord},
    error::ApiError,
};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::{
    acquisition::{Acquisition, DataSource, ExhibitorAcquirer},
    catalog::find_exhibitor,
};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StoreState {
    pub data: Vec<ExhibitorRecord>,
    pub loading: bool,
    /// Blocking error; only set by [`StoreAction::FetchRejected`].
    pub error: Option<String>,
    /// Why the current data came from the fallback catalog, if it did.
    pub diagnostic: Option<ApiError>,
    pub last_fetched: Option<DateTime<Utc>>,
    pub data_source: Option<DataSource>,
}

#[derive(Debug, Clone)]
pub enum StoreAction {
    FetchPending,
    FetchFulfilled(Acquisition),
    FetchRejected(String),
    ClearError,
    SetDataSource(DataSource),
}

pub fn reduce(state: &mut StoreState, action: StoreAction) {
    match action {
        StoreAction::FetchPending => {
            state.loading = true;
            state.error = None;
            debug!("fetching exhibitors");
        }
        StoreAction::FetchFulfilled(acquisition) => {
            state.loading = false;
            state.error = None;
            state.last_fetched = Some(Utc::now());
            state.data_source = Some(acquisition.source);
            state.diagnostic = acquisition.error;
            state.data = acquisition.records;
            info!(
                count = state.data.len(),
                source = acquisition.source.label(),
                "exhibitors loaded into store"
            );
        }
        StoreAction::FetchRejected(message) => {
            state.loading = false;
            warn!(error = %message, kept = state.data.len(), "exhibitor fetch rejected");
            state.error = Some(message);
        }
        StoreAction::ClearError => state.error = None,
        StoreAction::SetDataSource(source) => {
            debug!(source = source.label(), "data source set");
            state.data_source = Some(source);
        }
    }
}

pub struct ExhibitorStore {
    acquirer: Arc<ExhibitorAcquirer>,
    state: RwLock<StoreState>,
}

impl ExhibitorStore {
    pub fn new(acquirer: Arc<ExhibitorAcquirer>) -> Self {
        Self {
            acquirer,
            state: RwLock::new(StoreState::default()),
        }
    }

    pub async fn dispatch(&self, action: StoreAction) {
        reduce(&mut *self.state.write().await, action);
    }

    pub async fn snapshot(&self) -> StoreState {
        self.state.read().await.clone()
    }

    /// Pending, acquire, fulfilled. The lock is released while the request
    /// is in flight.
    pub async fn fetch_exhibitors(&self) -> StoreState {
        self.dispatch(StoreAction::FetchPending).await;
        self.complete_fetch().await
    }

    /// Fetches only when nothing is loaded and no fetch is running, as a
    /// profile page does on first render. The check and the pending
    /// transition happen under one write lock, so concurrent callers start
    /// at most one fetch.
    pub async fn ensure_loaded(&self) -> StoreState {
        {
            let mut state = self.state.write().await;
            if !state.data.is_empty() || state.loading {
                return state.clone();
            }
            reduce(&mut state, StoreAction::FetchPending);
        }
        self.complete_fetch().await
    }

    async fn complete_fetch(&self) -> StoreState {
        let acquisition = self.acquirer.fetch_exhibitors().await;
        self.dispatch(StoreAction::FetchFulfilled(acquisition)).await;
        self.snapshot().await
    }

    pub async fn find_exhibitor(&self, id: ExhibitorId) -> Option<ExhibitorRecord> {
        find_exhibitor(&self.state.read().await.data, id).cloned()
    }
}

#[cfg(test)]
#[path = "tests/store_tests.rs"]
mod tests;
