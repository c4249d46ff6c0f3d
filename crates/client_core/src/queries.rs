//! Cached queries over the shared acquisition function: the exhibitor list,
//! product lookups and order views all read the same cache entry.

use std::sync::Arc;

use serde::Serialize;
use shared::{domain::ExhibitorRecord, error::ApiError};
use tracing::debug;

use crate::{
    acquisition::{Acquisition, ExhibitorAcquirer},
    catalog::{find_product, ProductLookup},
    config::CachePolicy,
    order::OrderView,
    query_cache::QueryCache,
};

pub const EXHIBITORS_QUERY: &str = "exhibitors-data";

/// `{ data, is_loading, error }` view handed to presentation code. `error`
/// is diagnostic only: whenever it is set, `data` holds fallback records.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryResult<T> {
    pub data: Option<T>,
    pub is_loading: bool,
    pub error: Option<ApiError>,
}

impl<T> QueryResult<T> {
    /// Result of a disabled query.
    pub fn idle() -> Self {
        Self {
            data: None,
            is_loading: false,
            error: None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> QueryResult<U> {
        QueryResult {
            data: self.data.map(f),
            is_loading: self.is_loading,
            error: self.error,
        }
    }
}

impl From<Acquisition> for QueryResult<Vec<ExhibitorRecord>> {
    fn from(value: Acquisition) -> Self {
        Self {
            data: Some(value.records),
            is_loading: false,
            error: value.error,
        }
    }
}

pub struct ExhibitorQueries {
    acquirer: Arc<ExhibitorAcquirer>,
    cache: QueryCache<&'static str, Acquisition>,
}

impl ExhibitorQueries {
    pub fn new(acquirer: Arc<ExhibitorAcquirer>, policy: CachePolicy) -> Self {
        Self {
            acquirer,
            cache: QueryCache::new(policy),
        }
    }

    pub fn cache(&self) -> &QueryCache<&'static str, Acquisition> {
        &self.cache
    }

    pub async fn exhibitors(&self) -> QueryResult<Vec<ExhibitorRecord>> {
        self.acquisition().await.into()
    }

    /// Reads the cached list without fetching; `is_loading` is set while the
    /// first fetch is still outstanding.
    pub async fn peek_exhibitors(&self) -> QueryResult<Vec<ExhibitorRecord>> {
        let snapshot = self.cache.snapshot(&EXHIBITORS_QUERY).await;
        match snapshot.value {
            Some(acquisition) => acquisition.into(),
            None => QueryResult {
                data: None,
                is_loading: snapshot.is_fetching,
                error: None,
            },
        }
    }

    /// Product lookup across every exhibitor. An empty id disables the query.
    pub async fn product(&self, product_id: &str) -> QueryResult<ProductLookup> {
        if product_id.is_empty() {
            debug!("product query disabled: empty id");
            return QueryResult::idle();
        }
        self.exhibitors()
            .await
            .map(|records| find_product(&records, product_id))
    }

    pub async fn order(&self, product_id: &str, quantity: u32) -> QueryResult<OrderView> {
        self.product(product_id)
            .await
            .map(|lookup| OrderView::build(lookup, quantity))
    }

    /// Drops freshness of the list and fetches it again.
    pub async fn refetch(&self) -> QueryResult<Vec<ExhibitorRecord>> {
        self.cache.invalidate(&EXHIBITORS_QUERY).await;
        self.exhibitors().await
    }

    pub async fn notify_window_focus(&self) {
        self.cache.notify_window_focus().await;
    }

    async fn acquisition(&self) -> Acquisition {
        let acquirer = self.acquirer.clone();
        self.cache
            .get_or_fetch(EXHIBITORS_QUERY, || async move {
                acquirer.fetch_exhibitors().await
            })
            .await
    }
}

#[cfg(test)]
#[path = "tests/queries_tests.rs"]
mod tests;
