use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::broadcast;

use crate::cache::{ArticleStore, SavedArticles};
use crate::connectivity::{Connectivity, ManualConnectivity};
use crate::feed::{Feed, FeedOutcome};
use crate::fetcher::{ApiResponse, CallFault, NewsService};
use crate::models::{Article, FeedKind};

/// Everything a front end talks to: the breaking news feed, the search feed
/// and the saved articles. The two feeds share no state.
pub struct NewsSession {
    breaking_news: Feed,
    search: Feed,
    store: Arc<dyn ArticleStore>,
}

impl NewsSession {
    pub fn new(
        service: Arc<dyn NewsService>,
        connectivity: Arc<dyn Connectivity>,
        store: Arc<dyn ArticleStore>,
    ) -> Self {
        Self {
            breaking_news: Feed::new(FeedKind::BreakingNews, service.clone(), connectivity.clone()),
            search: Feed::new(FeedKind::Search, service, connectivity),
            store,
        }
    }

    /// A session with no network: fetches end in "No Internet Connection"
    /// and only the saved articles are usable. Needs no API credentials.
    pub fn offline(store: Arc<dyn ArticleStore>) -> Self {
        Self::new(
            Arc::new(Disconnected),
            Arc::new(ManualConnectivity::new(false)),
            store,
        )
    }

    pub async fn request_breaking_news(&mut self, country_code: &str) -> FeedOutcome {
        self.breaking_news.fetch_next_page(country_code).await
    }

    pub async fn request_search(&mut self, query: &str) -> FeedOutcome {
        self.search.fetch_next_page(query).await
    }

    pub fn subscribe_breaking_news(&self) -> broadcast::Receiver<FeedOutcome> {
        self.breaking_news.subscribe()
    }

    pub fn subscribe_search(&self) -> broadcast::Receiver<FeedOutcome> {
        self.search.subscribe()
    }

    pub fn reset_breaking_news(&mut self) {
        self.breaking_news.reset();
    }

    pub fn reset_search(&mut self) {
        self.search.reset();
    }

    pub fn breaking_news(&self) -> &Feed {
        &self.breaking_news
    }

    pub fn search(&self) -> &Feed {
        &self.search
    }

    /// Both feeds at once, for driving them concurrently
    pub fn feeds_mut(&mut self) -> (&mut Feed, &mut Feed) {
        (&mut self.breaking_news, &mut self.search)
    }

    pub fn save_article(&self, article: &Article) -> Result<()> {
        self.store.upsert(article)
    }

    pub fn delete_article(&self, article: &Article) -> Result<()> {
        self.store.delete(article)
    }

    pub fn list_saved_articles(&self) -> SavedArticles {
        self.store.list_all()
    }
}

/// Stand-in service for offline sessions; never reached past the connectivity check
struct Disconnected;

#[async_trait]
impl NewsService for Disconnected {
    async fn get_breaking_news(&self, _country_code: &str, _page: u32) -> Result<ApiResponse, CallFault> {
        Err(CallFault::Transport("offline".to_string()))
    }

    async fn search_for_news(&self, _query: &str, _page: u32) -> Result<ApiResponse, CallFault> {
        Err(CallFault::Transport("offline".to_string()))
    }
}
