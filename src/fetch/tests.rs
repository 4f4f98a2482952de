//! Tests for fetch module

use super::*;
use crate::decode::PageDecoder;
use crate::error::Error;
use crate::http::{HttpClient, HttpClientConfig};
use crate::pagination::PageNumberConfig;
use crate::types::Record;
use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn fetcher_for(server: &MockServer) -> HttpPageFetcher {
    let config = HttpClientConfig::builder()
        .base_url(server.uri())
        .user_agent("hopstream-test")
        .build();
    HttpPageFetcher::new(HttpClient::with_config(config).unwrap(), "/v2/beers")
}

#[tokio::test]
async fn test_fetch_sends_page_param_and_user_agent() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/beers"))
        .and(query_param("page", "3"))
        .and(header("user-agent", "hopstream-test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"name": "Punk IPA", "tagline": "Post Modern Classic.", "abv": 5.6, "description": "Spiky."}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let page = fetcher_for(&server).fetch(3).await.unwrap();

    assert_eq!(page.index(), 3);
    assert_eq!(
        page.records(),
        &[Record::new("Punk IPA", "Post Modern Classic.", 5.6, "Spiky.")]
    );
}

#[tokio::test]
async fn test_fetch_sends_page_size() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/beers"))
        .and(query_param("page", "1"))
        .and(query_param("per_page", "80"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let fetcher =
        fetcher_for(&server).with_paging(PageNumberConfig::default().with_page_size("per_page", 80));
    let page = fetcher.fetch(1).await.unwrap();

    assert!(page.is_empty());
}

#[tokio::test]
async fn test_fetch_uses_record_path() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/beers"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{"name": "Dead Pony Club", "abv": 3.8}]
        })))
        .mount(&server)
        .await;

    let fetcher = fetcher_for(&server).with_decoder(PageDecoder::with_path("data"));
    let page = fetcher.fetch(1).await.unwrap();

    assert_eq!(page.len(), 1);
    assert_eq!(page.records()[0].name, "Dead Pony Club");
}

#[tokio::test]
async fn test_fetch_non_2xx_is_network_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/beers"))
        .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
        .expect(1)
        .mount(&server)
        .await;

    let err = fetcher_for(&server).fetch(1).await.unwrap_err();

    assert!(err.is_network());
    assert!(matches!(err, Error::HttpStatus { status: 502, .. }));
}

#[tokio::test]
async fn test_fetch_malformed_body_is_decode_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/beers"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let err = fetcher_for(&server).fetch(2).await.unwrap_err();

    assert!(err.is_decode());
    assert!(matches!(err, Error::Decode { page: 2, .. }));
}

#[tokio::test]
async fn test_fetch_rejects_page_below_first() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&server)
        .await;

    let err = fetcher_for(&server).fetch(0).await.unwrap_err();

    assert!(matches!(
        err,
        Error::PageOutOfRange {
            page: 0,
            first_page: 1
        }
    ));
}

#[test]
fn test_first_page_follows_paging() {
    let client = HttpClient::with_config(HttpClientConfig::default()).unwrap();
    let fetcher = HttpPageFetcher::new(client, "/items").with_paging(PageNumberConfig::new("p", 0));

    assert_eq!(fetcher.first_page(), 0);
    assert_eq!(fetcher.paging().page_param, "p");
}
