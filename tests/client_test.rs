use newsreel::{CallFault, Config, Feed, FeedKind, ManualConnectivity, NewsClient, NewsService, Outcome};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config_for(base_url: &str) -> Config {
    Config {
        api_key: Some("test-key".to_string()),
        base_url: base_url.to_string(),
        request_timeout: Duration::from_secs(5),
        ..Config::default()
    }
}

fn listing(urls: &[&str]) -> serde_json::Value {
    let articles: Vec<_> = urls
        .iter()
        .map(|url| {
            json!({
                "source": { "id": null, "name": "Example News" },
                "author": "Reporter",
                "title": format!("Headline {}", url),
                "description": "Something happened",
                "url": url,
                "urlToImage": "https://img.test/1.jpg",
                "publishedAt": "2024-05-01T08:30:00Z",
                "content": "Body text"
            })
        })
        .collect();
    json!({ "status": "ok", "totalResults": 42, "articles": articles })
}

#[tokio::test]
async fn breaking_news_sends_expected_query() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/top-headlines"))
        .and(query_param("country", "id"))
        .and(query_param("page", "3"))
        .and(query_param("apiKey", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(listing(&["https://a.test/1"])))
        .expect(1)
        .mount(&server)
        .await;

    let client = NewsClient::new(&config_for(&server.uri())).unwrap();
    let response = client.get_breaking_news("id", 3).await.unwrap();

    assert_eq!(response.status, 200);
    let page = response.body.unwrap();
    assert_eq!(page.total_results, 42);
    assert_eq!(page.articles.len(), 1);
    let article = &page.articles[0];
    assert_eq!(article.url, "https://a.test/1");
    assert_eq!(article.url_to_image.as_deref(), Some("https://img.test/1.jpg"));
    assert_eq!(article.source.as_ref().unwrap().name, "Example News");
    assert_eq!(
        article.published_at.unwrap().to_rfc3339(),
        "2024-05-01T08:30:00+00:00"
    );
}

#[tokio::test]
async fn search_uses_everything_endpoint() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/everything"))
        .and(query_param("q", "climate change"))
        .and(query_param("page", "1"))
        .and(query_param("apiKey", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(listing(&[])))
        .expect(1)
        .mount(&server)
        .await;

    let client = NewsClient::new(&config_for(&server.uri())).unwrap();
    let response = client.search_for_news("climate change", 1).await.unwrap();

    assert!(response.is_successful());
    assert!(response.body.unwrap().articles.is_empty());
}

#[tokio::test]
async fn error_status_keeps_reason_phrase() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/top-headlines"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "status": "error",
            "code": "apiKeyInvalid",
            "message": "Your API key is invalid"
        })))
        .mount(&server)
        .await;

    let client = NewsClient::new(&config_for(&server.uri())).unwrap();
    let response = client.get_breaking_news("id", 1).await.unwrap();

    assert_eq!(response.status, 401);
    assert_eq!(response.message, "Unauthorized");
    assert!(response.body.is_none());
}

#[tokio::test]
async fn malformed_body_is_a_conversion_fault() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/everything"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
        .mount(&server)
        .await;

    let client = NewsClient::new(&config_for(&server.uri())).unwrap();
    let result = client.search_for_news("rust", 1).await;

    assert!(matches!(result, Err(CallFault::Conversion(_))));
}

#[tokio::test]
async fn empty_body_has_no_payload() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/top-headlines"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let client = NewsClient::new(&config_for(&server.uri())).unwrap();
    let response = client.get_breaking_news("id", 1).await.unwrap();

    assert!(response.is_successful());
    assert!(response.body.is_none());
    assert_eq!(response.message, "No Content");
}

#[tokio::test]
async fn unreachable_server_is_a_transport_fault() {
    // nothing listens on port 1
    let client = NewsClient::new(&config_for("http://127.0.0.1:1")).unwrap();
    let result = client.get_breaking_news("id", 1).await;

    assert!(matches!(result, Err(CallFault::Transport(_))));
}

#[tokio::test]
async fn feed_over_http_accumulates_pages() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/top-headlines"))
        .and(query_param("page", "1"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(listing(&["https://a.test/1", "https://a.test/2"])),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v2/top-headlines"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(listing(&["https://a.test/3"])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v2/top-headlines"))
        .and(query_param("page", "3"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&server)
        .await;

    let client = Arc::new(NewsClient::new(&config_for(&server.uri())).unwrap());
    let mut feed = Feed::new(
        FeedKind::BreakingNews,
        client,
        Arc::new(ManualConnectivity::new(true)),
    );

    feed.fetch_next_page("id").await;
    let outcome = feed.fetch_next_page("id").await;
    let urls: Vec<&str> = outcome
        .data()
        .unwrap()
        .articles
        .iter()
        .map(|a| a.url.as_str())
        .collect();
    assert_eq!(urls, vec!["https://a.test/1", "https://a.test/2", "https://a.test/3"]);

    let outcome = feed.fetch_next_page("id").await;
    assert_eq!(outcome, Outcome::Error("Too Many Requests".to_string()));
    assert_eq!(feed.state().page_number, 3);
    assert_eq!(feed.state().article_count(), 3);
}

#[tokio::test]
async fn null_title_does_not_sink_the_page() {
    let server = MockServer::start().await;
    let mut body = listing(&["https://a.test/1", "https://a.test/2"]);
    body["articles"][1]["title"] = serde_json::Value::Null;
    body["articles"][1]["source"]["name"] = serde_json::Value::Null;
    Mock::given(method("GET"))
        .and(path("/v2/top-headlines"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(&server)
        .await;

    let client = Arc::new(NewsClient::new(&config_for(&server.uri())).unwrap());
    let mut feed = Feed::new(
        FeedKind::BreakingNews,
        client,
        Arc::new(ManualConnectivity::new(true)),
    );

    let outcome = feed.fetch_next_page("id").await;
    let page = outcome.data().expect("page with a null title should still load");
    assert_eq!(page.articles.len(), 2);
    assert_eq!(page.articles[1].title, "");
    assert_eq!(page.articles[1].url, "https://a.test/2");
    assert_eq!(feed.state().page_number, 2);
}
