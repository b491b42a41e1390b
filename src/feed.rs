//! One paginated listing (breaking news or search) and its fetch cycle.

use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, warn};

use crate::connectivity::Connectivity;
use crate::fetcher::NewsService;
use crate::models::{FeedKind, PageResult};
use crate::outcome::{classify, FetchError, Outcome};
use crate::pagination::FeedState;

const OUTCOME_CHANNEL_CAPACITY: usize = 64;

pub type FeedOutcome = Outcome<PageResult>;

pub struct Feed {
    kind: FeedKind,
    service: Arc<dyn NewsService>,
    connectivity: Arc<dyn Connectivity>,
    state: FeedState,
    outcomes: broadcast::Sender<FeedOutcome>,
}

impl Feed {
    pub fn new(
        kind: FeedKind,
        service: Arc<dyn NewsService>,
        connectivity: Arc<dyn Connectivity>,
    ) -> Self {
        let (outcomes, _) = broadcast::channel(OUTCOME_CHANNEL_CAPACITY);
        Self {
            kind,
            service,
            connectivity,
            state: FeedState::new(),
            outcomes,
        }
    }

    pub fn kind(&self) -> FeedKind {
        self.kind
    }

    pub fn state(&self) -> &FeedState {
        &self.state
    }

    /// Receives `Loading` and the terminal outcome of every fetch started after this call
    pub fn subscribe(&self) -> broadcast::Receiver<FeedOutcome> {
        self.outcomes.subscribe()
    }

    /// Fetches the next page for `query` and merges it into the accumulated listing.
    ///
    /// Publishes `Loading` followed by exactly one `Success` or `Error`, and returns
    /// that terminal outcome. A failed attempt leaves the paging state untouched, so
    /// calling again retries the same page.
    pub async fn fetch_next_page(&mut self, query: &str) -> FeedOutcome {
        self.emit(Outcome::Loading);

        let outcome = match self.try_fetch(query).await {
            Ok(accumulated) => Outcome::Success(accumulated),
            Err(e) => {
                warn!(feed = %self.kind, page = self.state.page_number, error = %e, "fetch failed");
                Outcome::Error(e.to_string())
            }
        };

        self.emit(outcome.clone());
        outcome
    }

    async fn try_fetch(&mut self, query: &str) -> Result<PageResult, FetchError> {
        if !self.connectivity.is_connected() {
            return Err(FetchError::NoConnectivity);
        }

        let page = self.state.page_number;
        debug!(feed = %self.kind, query, page, "fetching page");

        let response = match self.kind {
            FeedKind::BreakingNews => self.service.get_breaking_news(query, page).await,
            FeedKind::Search => self.service.search_for_news(query, page).await,
        };
        if let Err(ref fault) = response {
            debug!(feed = %self.kind, %fault, "remote call faulted");
        }

        let fetched = classify(response)?;
        let accumulated = self.state.merge(fetched).clone();
        self.state.query = Some(query.to_string());
        Ok(accumulated)
    }

    /// Drops the accumulated listing and starts again from page 1
    pub fn reset(&mut self) {
        debug!(feed = %self.kind, "reset");
        self.state.reset();
    }

    fn emit(&self, outcome: FeedOutcome) {
        // no subscribers is fine
        let _ = self.outcomes.send(outcome);
    }
}
