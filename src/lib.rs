pub mod cache;
pub mod config;
pub mod connectivity;
pub mod feed;
pub mod fetcher;
pub mod models;
pub mod outcome;
pub mod pagination;
pub mod session;

pub use cache::{ArticleCache, ArticleStore, SavedArticles};
pub use config::Config;
pub use connectivity::{Connectivity, ManualConnectivity, TcpProbe};
pub use feed::{Feed, FeedOutcome};
pub use fetcher::{ApiResponse, CallFault, NewsClient, NewsService};
pub use models::{Article, FeedKind, PageResult, Source};
pub use outcome::{FetchError, Outcome};
pub use pagination::FeedState;
pub use session::NewsSession;
