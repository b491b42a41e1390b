use tracing::debug;

use crate::fetcher::DEFAULT_PAGE;
use crate::models::PageResult;

/// Paging state owned by a single feed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedState {
    pub page_number: u32,
    pub accumulated: Option<PageResult>,
    pub query: Option<String>,
}

impl Default for FeedState {
    fn default() -> Self {
        Self {
            page_number: DEFAULT_PAGE,
            accumulated: None,
            query: None,
        }
    }
}

impl FeedState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds a freshly fetched page into the accumulation and advances the page number.
    /// The first page is kept as-is; later pages have their articles appended.
    /// Only call this with the body of a successful response.
    pub fn merge(&mut self, page: PageResult) -> &PageResult {
        self.page_number += 1;

        match &mut self.accumulated {
            slot @ None => {
                debug!(articles = page.articles.len(), "first page");
                slot.insert(page)
            }
            Some(acc) => {
                acc.articles.extend(page.articles);
                debug!(articles = acc.articles.len(), page = self.page_number - 1, "merged page");
                acc
            }
        }
    }

    /// Back to page 1 with nothing accumulated
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn article_count(&self) -> usize {
        self.accumulated.as_ref().map_or(0, |acc| acc.articles.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Article;

    fn article(url: &str) -> Article {
        Article {
            source: None,
            author: None,
            title: format!("Title for {}", url),
            description: None,
            url: url.to_string(),
            url_to_image: None,
            published_at: None,
            content: None,
        }
    }

    fn page(urls: &[&str], total: u32) -> PageResult {
        PageResult {
            articles: urls.iter().map(|u| article(u)).collect(),
            status: "ok".to_string(),
            total_results: total,
        }
    }

    #[test]
    fn first_page_is_returned_unchanged() {
        let mut state = FeedState::new();
        let first = page(&["https://a/1", "https://a/2"], 40);

        let merged = state.merge(first.clone()).clone();

        assert_eq!(merged, first);
        assert_eq!(state.page_number, 2);
        assert_eq!(state.accumulated, Some(first));
    }

    #[test]
    fn later_pages_are_appended_in_order() {
        let mut state = FeedState::new();
        let p1 = page(&["https://a/1", "https://a/2"], 40);
        let p2 = page(&["https://a/3", "https://a/4", "https://a/5"], 41);

        state.merge(p1.clone());
        let merged = state.merge(p2.clone()).clone();

        let expected: Vec<Article> = p1.articles.iter().chain(p2.articles.iter()).cloned().collect();
        assert_eq!(merged.articles, expected);
        assert_eq!(merged.articles.len(), 5);
        // metadata of the first page is kept
        assert_eq!(merged.total_results, 40);
        assert_eq!(state.page_number, 3);
    }

    #[test]
    fn page_number_tracks_successful_merges() {
        let mut state = FeedState::new();
        for n in 0..6 {
            assert_eq!(state.page_number, 1 + n);
            state.merge(page(&["https://a/x"], 10));
        }
        assert_eq!(state.page_number, 7);
        assert_eq!(state.article_count(), 6);
    }

    #[test]
    fn no_dedup_across_pages() {
        let mut state = FeedState::new();
        state.merge(page(&["https://a/1"], 1));
        state.merge(page(&["https://a/1"], 1));
        assert_eq!(state.article_count(), 2);
    }

    #[test]
    fn reset_starts_over() {
        let mut state = FeedState::new();
        state.query = Some("rust".into());
        state.merge(page(&["https://a/1"], 1));

        state.reset();

        assert_eq!(state, FeedState::new());
        assert_eq!(state.article_count(), 0);
    }
}
