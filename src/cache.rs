use anyhow::{anyhow, Context, Result};
use crate::models::Article;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;
use tracing::info;

/// Live view of the saved articles.
/// Yields the current contents first, then every change.
pub type SavedArticles = WatchStream<Vec<Article>>;

/// Local persistence for articles kept for offline reading, keyed by URL
pub trait ArticleStore: Send + Sync {
    /// Inserts the article, replacing any saved article with the same URL
    fn upsert(&self, article: &Article) -> Result<()>;

    fn delete(&self, article: &Article) -> Result<()>;

    fn list_all(&self) -> SavedArticles;
}

/// File-backed article store
/// Keeps every saved article in one JSON document under the data directory
pub struct ArticleCache {
    path: PathBuf,
    articles: watch::Sender<Vec<Article>>,
    write_lock: Mutex<()>,
}

impl ArticleCache {
    /// Opens the store in `data_dir`, creating the directory structure if it doesn't exist
    pub fn open(data_dir: &Path) -> Result<Self> {
        let saved_dir = data_dir.join("saved");
        fs::create_dir_all(&saved_dir)
            .with_context(|| format!("Failed to create {}", saved_dir.display()))?;

        let path = saved_dir.join("articles.json");
        let articles = if path.exists() {
            let content = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read saved articles: {}", path.display()))?;
            serde_json::from_str(&content)
                .with_context(|| format!("Invalid saved articles file: {}", path.display()))?
        } else {
            Vec::new()
        };

        let (articles, _) = watch::channel(articles);

        Ok(Self {
            path,
            articles,
            write_lock: Mutex::new(()),
        })
    }

    /// Current contents, oldest first
    pub fn snapshot(&self) -> Vec<Article> {
        self.articles.borrow().clone()
    }

    pub fn find_by_url(&self, url: &str) -> Option<Article> {
        self.articles.borrow().iter().find(|a| a.url == url).cloned()
    }

    pub fn len(&self) -> usize {
        self.articles.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Applies `change` to a copy of the contents, writes it to disk, then publishes it.
    /// Nothing is published if the write fails.
    fn update<F>(&self, change: F) -> Result<()>
    where
        F: FnOnce(&mut Vec<Article>),
    {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| anyhow!("Article store lock poisoned"))?;

        let mut articles = self.snapshot();
        change(&mut articles);
        self.persist(&articles)?;
        self.articles.send_replace(articles);
        Ok(())
    }

    fn persist(&self, articles: &[Article]) -> Result<()> {
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_string_pretty(articles)?)
            .with_context(|| format!("Failed to write {}", tmp.display()))?;
        fs::rename(&tmp, &self.path)
            .with_context(|| format!("Failed to replace {}", self.path.display()))?;
        Ok(())
    }
}

impl ArticleStore for ArticleCache {
    fn upsert(&self, article: &Article) -> Result<()> {
        self.update(|articles| {
            articles.retain(|a| a.url != article.url);
            articles.push(article.clone());
        })
        .with_context(|| format!("Failed to save article {}", article.url))?;
        info!(url = %article.url, "saved article");
        Ok(())
    }

    fn delete(&self, article: &Article) -> Result<()> {
        self.update(|articles| articles.retain(|a| a.url != article.url))
            .with_context(|| format!("Failed to delete article {}", article.url))?;
        info!(url = %article.url, "deleted article");
        Ok(())
    }

    fn list_all(&self) -> SavedArticles {
        WatchStream::new(self.articles.subscribe())
    }
}

#[cfg(test)]
#[path = "cache_tests.rs"]
mod tests;
