//! HTTP provider client tests against mock servers.

use evidence_search::config::{CaseLawProviderConfig, SemanticProviderConfig};
use evidence_search::providers::{
    CaseLawClient, ContentFetch, ContentRequest, DocumentSearch, HighlightSpec, OpinionQuery,
    OpinionSearch, SearchRequest, SemanticSearchClient,
};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn semantic_config(base_url: String, api_key: Option<&str>) -> SemanticProviderConfig {
    SemanticProviderConfig {
        base_url,
        api_key: api_key.map(String::from),
        ..Default::default()
    }
}

fn caselaw_config(base_url: String, api_token: Option<&str>) -> CaseLawProviderConfig {
    CaseLawProviderConfig {
        base_url,
        api_token: api_token.map(String::from),
        ..Default::default()
    }
}

fn search_request() -> SearchRequest {
    SearchRequest {
        query: "judicial opinions applying Rule 403".to_string(),
        num_results: 7,
        include_domains: vec!["courtlistener.com".to_string()],
        exclude_domains: Vec::new(),
        return_full_text: false,
        highlights: Some(HighlightSpec {
            query: "the court's balancing".to_string(),
            num_sentences: 2,
            highlights_per_url: 1,
        }),
    }
}

#[tokio::test]
async fn semantic_search_parses_ranked_hits() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/search"))
        .and(header("x-api-key", "test-key"))
        .and(body_partial_json(json!({
            "numResults": 7,
            "includeDomains": ["courtlistener.com"],
            "text": false,
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [
                {
                    "id": "a",
                    "url": "https://www.courtlistener.com/opinion/1/us-v-a/",
                    "title": "United States v. A (2018)",
                    "highlights": ["The court weighed probative value against prejudice."]
                },
                {
                    "id": "b",
                    "url": "https://www.courtlistener.com/opinion/2/us-v-b/",
                    "title": "United States v. B"
                }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = SemanticSearchClient::new(semantic_config(server.uri(), Some("test-key"))).unwrap();
    let hits = client.search(search_request()).await.unwrap();

    assert_eq!(hits.len(), 2);
    assert_eq!(hits[0].id, "a");
    assert_eq!(hits[0].title.as_deref(), Some("United States v. A (2018)"));
    assert_eq!(
        hits[0].highlights.as_deref().unwrap()[0],
        "The court weighed probative value against prejudice."
    );
    assert!(hits[1].highlights.is_none());
}

#[tokio::test]
async fn semantic_search_without_key_degrades_to_empty() {
    // No mock server needed: the client must not issue a request at all
    let client =
        SemanticSearchClient::new(semantic_config("http://127.0.0.1:9".to_string(), None)).unwrap();
    let hits = client.search(search_request()).await.unwrap();
    assert!(hits.is_empty());
}

#[tokio::test]
async fn semantic_search_maps_server_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let client = SemanticSearchClient::new(semantic_config(server.uri(), Some("k"))).unwrap();
    let err = client.search(search_request()).await.unwrap_err();
    assert_eq!(err.category(), "provider");
}

#[tokio::test]
async fn semantic_contents_round_trip() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/contents"))
        .and(body_partial_json(json!({
            "urls": ["https://www.courtlistener.com/opinion/1/us-v-a/"],
            "text": false,
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [
                {
                    "url": "https://www.courtlistener.com/opinion/1/us-v-a/",
                    "highlights": ["We hold the photographs were properly excluded."]
                }
            ]
        })))
        .mount(&server)
        .await;

    let client = SemanticSearchClient::new(semantic_config(server.uri(), Some("k"))).unwrap();
    let items = client
        .fetch_contents(ContentRequest {
            urls: vec!["https://www.courtlistener.com/opinion/1/us-v-a/".to_string()],
            return_full_text: false,
            highlights: Some(HighlightSpec {
                query: "application of the rule".to_string(),
                num_sentences: 2,
                highlights_per_url: 3,
            }),
        })
        .await
        .unwrap();

    assert_eq!(items.len(), 1);
    assert_eq!(
        items[0].highlights.as_deref().unwrap()[0],
        "We hold the photographs were properly excluded."
    );
}

#[tokio::test]
async fn opinion_search_sends_filters_and_parses_results() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/rest/v4/search/"))
        .and(header("Authorization", "Token secret"))
        .and(query_param("type", "o"))
        .and(query_param("court", "ca9"))
        .and(query_param("date_filed_min", "2011-01-01"))
        .and(query_param("page_size", "25"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [
                {
                    "id": 4801,
                    "absolute_url": "/opinion/4801/united-states-v-x/",
                    "caseName": "United States v. X",
                    "dateFiled": "2018-03-15",
                    "court": "ca9"
                }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = CaseLawClient::new(caselaw_config(server.uri(), Some("secret"))).unwrap();
    let hits = client
        .search_opinions(OpinionQuery {
            query: "Rule 403 graphic photos".to_string(),
            court_id: Some("ca9".to_string()),
            date_min: Some("2011-01-01".to_string()),
            only_published: false,
            page_size: 25,
        })
        .await
        .unwrap();

    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].id, "4801");
    assert_eq!(hits[0].case_name.as_deref(), Some("United States v. X"));
    assert_eq!(hits[0].date_filed.as_deref(), Some("2018-03-15"));
    assert_eq!(hits[0].court.as_deref(), Some("ca9"));
}

#[tokio::test]
async fn opinion_search_without_token_degrades_to_empty() {
    let client =
        CaseLawClient::new(caselaw_config("http://127.0.0.1:9".to_string(), None)).unwrap();
    let hits = client
        .search_opinions(OpinionQuery {
            query: "anything".to_string(),
            court_id: None,
            date_min: None,
            only_published: false,
            page_size: 10,
        })
        .await
        .unwrap();
    assert!(hits.is_empty());
}

#[tokio::test]
async fn opinion_search_unauthorized_maps_to_provider_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/rest/v4/search/"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let client = CaseLawClient::new(caselaw_config(server.uri(), Some("bad"))).unwrap();
    let err = client
        .search_opinions(OpinionQuery {
            query: "anything".to_string(),
            court_id: None,
            date_min: None,
            only_published: false,
            page_size: 10,
        })
        .await
        .unwrap_err();
    assert_eq!(err.category(), "provider");
}
