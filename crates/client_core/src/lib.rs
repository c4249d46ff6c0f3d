//! Data and navigation core of the exhibition showroom.
//!
//! Exhibitor data is obtained through one [`ExhibitorAcquirer`], which is
//! shared by the cached query layer ([`ExhibitorQueries`]) and the reducer
//! store ([`ExhibitorStore`]) so both always agree on records, fallback and
//! retry behaviour. [`carousel`] selects which exhibitor is on screen.

use std::sync::Arc;

pub mod acquisition;
pub mod carousel;
pub mod catalog;
pub mod config;
pub mod counter;
pub mod error;
pub mod fallback;
pub mod order;
pub mod queries;
pub mod query_cache;
pub mod store;
pub mod transport;

pub use acquisition::{Acquisition, DataSource, Endpoint, ExhibitorAcquirer, FallbackReason};
pub use carousel::{Carousel, Key, Navigation, Slideshow};
pub use config::{load_settings, Settings};
pub use counter::CallCounter;
pub use queries::{ExhibitorQueries, QueryResult};
pub use store::{ExhibitorStore, StoreState};

use transport::{ExhibitorTransport, HttpTransport};

pub struct ShowroomClient {
    settings: Settings,
    acquirer: Arc<ExhibitorAcquirer>,
    queries: ExhibitorQueries,
    store: ExhibitorStore,
}

impl ShowroomClient {
    pub fn new(settings: Settings) -> Self {
        Self::with_transport(settings, Arc::new(HttpTransport::new()), CallCounter::new())
    }

    pub fn with_transport(
        settings: Settings,
        transport: Arc<dyn ExhibitorTransport>,
        counter: CallCounter,
    ) -> Self {
        let acquirer = Arc::new(ExhibitorAcquirer::with_transport(
            transport, &settings, counter,
        ));
        Self {
            queries: ExhibitorQueries::new(acquirer.clone(), settings.cache),
            store: ExhibitorStore::new(acquirer.clone()),
            acquirer,
            settings,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn acquirer(&self) -> &ExhibitorAcquirer {
        &self.acquirer
    }

    pub fn queries(&self) -> &ExhibitorQueries {
        &self.queries
    }

    pub fn store(&self) -> &ExhibitorStore {
        &self.store
    }

    pub fn counter(&self) -> &CallCounter {
        self.acquirer.counter()
    }

    /// Slideshow over the current exhibitor list, fetching it if needed.
    pub async fn slideshow(&self) -> Slideshow {
        let len = self
            .queries
            .exhibitors()
            .await
            .data
            .map_or(0, |records| records.len());
        Slideshow::new(len, self.settings.autoplay_interval)
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
