use anyhow::Result;
use clap::{Parser, Subcommand};
use futures::StreamExt;
use std::sync::Arc;

use newsreel::{
    Article, ArticleCache, ArticleStore, Config, FeedKind, NewsClient, NewsSession, Outcome, PageResult, TcpProbe,
};

#[derive(Parser)]
#[command(name = "newsreel")]
#[command(about = "Paged news headlines and search, with articles saved for offline reading", long_about = None)]
struct Cli {
    /// Skip the connectivity probe and behave as if offline
    #[arg(long, global = true)]
    offline: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    Headlines {
        #[arg(short, long)]
        country: Option<String>,
        #[arg(short, long, default_value_t = 1)]
        pages: u32,
        #[arg(short, long)]
        save: bool,
    },
    Search {
        query: String,
        #[arg(short, long, default_value_t = 1)]
        pages: u32,
        #[arg(short, long)]
        save: bool,
    },
    Saved,
    Delete {
        #[arg(short, long)]
        url: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let config = Config::from_env()?;
    let cache = Arc::new(ArticleCache::open(&config.data_dir)?);

    match cli.command {
        Commands::Headlines { country, pages, save } => {
            let country = country.unwrap_or_else(|| config.default_country.clone());
            let mut session = build_session(&config, cli.offline, cache.clone())?;
            let listing = fetch_pages(&mut session, FeedKind::BreakingNews, &country, pages).await;
            finish_listing(&session, listing, save)?;
        }
        Commands::Search { query, pages, save } => {
            let mut session = build_session(&config, cli.offline, cache.clone())?;
            let listing = fetch_pages(&mut session, FeedKind::Search, &query, pages).await;
            finish_listing(&session, listing, save)?;
        }
        Commands::Saved => {
            let saved = cache.list_all().next().await.unwrap_or_default();
            println!("{} saved articles:", saved.len());
            print_articles(&saved);
        }
        Commands::Delete { url } => match cache.find_by_url(&url) {
            Some(article) => {
                cache.delete(&article)?;
                println!("Deleted: {}", article.title);
            }
            None => {
                eprintln!("No saved article with URL {}", url);
                std::process::exit(1);
            }
        },
    }

    Ok(())
}

fn build_session(config: &Config, offline: bool, cache: Arc<ArticleCache>) -> Result<NewsSession> {
    if offline {
        return Ok(NewsSession::offline(cache));
    }

    let client = NewsClient::new(config)?;
    let connectivity = TcpProbe::new(config.probe_addr.clone(), config.probe_timeout);
    Ok(NewsSession::new(Arc::new(client), Arc::new(connectivity), cache))
}

/// Fetches up to `pages` pages, stopping at the first error
async fn fetch_pages(
    session: &mut NewsSession,
    kind: FeedKind,
    query: &str,
    pages: u32,
) -> Option<PageResult> {
    let mut listing = None;

    for _ in 0..pages {
        let page = match kind {
            FeedKind::BreakingNews => session.breaking_news().state().page_number,
            FeedKind::Search => session.search().state().page_number,
        };
        println!("Fetching page {} ({})", page, kind);

        let outcome = match kind {
            FeedKind::BreakingNews => session.request_breaking_news(query).await,
            FeedKind::Search => session.request_search(query).await,
        };

        match outcome {
            Outcome::Success(accumulated) => {
                println!("  ✓ {} of {} articles", accumulated.articles.len(), accumulated.total_results);
                listing = Some(accumulated);
            }
            Outcome::Error(message) => {
                eprintln!("  ✗ {}", message);
                break;
            }
            Outcome::Loading => {}
        }
    }

    listing
}

fn finish_listing(session: &NewsSession, listing: Option<PageResult>, save: bool) -> Result<()> {
    let Some(listing) = listing else {
        return Ok(());
    };

    print_articles(&listing.articles);

    if save {
        for article in &listing.articles {
            session.save_article(article)?;
        }
        println!("Saved {} articles", listing.articles.len());
    }
    Ok(())
}

fn print_articles(articles: &[Article]) {
    for (i, article) in articles.iter().enumerate() {
        let source = article
            .source
            .as_ref()
            .map(|s| s.name.as_str())
            .unwrap_or("unknown source");
        let date = article
            .published_at
            .map(|d| d.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "-".to_string());

        println!("{:>3}. {}", i + 1, article.title);
        println!("     {} · {}", source, date);
        println!("     {}", article.url);
    }
}
