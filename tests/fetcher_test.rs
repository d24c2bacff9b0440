//! Fetcher integration tests using wiremock

use vestnik::config::FetcherConfig;
use vestnik::crawler::{PageFetcher, PageRequest, RunState};
use wiremock::matchers::{body_string, header, headers, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn fetcher() -> PageFetcher {
    PageFetcher::new(&FetcherConfig::default()).unwrap()
}

async fn fetch(fetcher: &PageFetcher, request: &PageRequest) -> Option<String> {
    let limiter = PageFetcher::rate_limiter(100);
    let run_state = RunState::new();
    fetcher.fetch(request, &limiter, &run_state).await
}

#[tokio::test]
async fn test_get_returns_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/politics/russia"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>Новости</html>"))
        .mount(&server)
        .await;

    let fetcher = fetcher();
    let body = fetch(
        &fetcher,
        &PageRequest::Get {
            url: format!("{}/politics/russia", server.uri()),
        },
    )
    .await;

    assert_eq!(body.as_deref(), Some("<html>Новости</html>"));
}

#[tokio::test]
async fn test_browser_headers_are_sent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/check"))
        // wiremock's `header` matcher splits request values on commas, so the
        // comma-separated Accept-Language must be matched as multiple values
        .and(headers(
            "Accept-Language",
            vec!["ru-RU", "ru;q=0.9", "en-US;q=0.8", "en;q=0.7"],
        ))
        .and(header("Referer", "https://www.google.com"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .mount(&server)
        .await;

    let fetcher = fetcher();
    let body = fetch(
        &fetcher,
        &PageRequest::Get {
            url: format!("{}/check", server.uri()),
        },
    )
    .await;

    assert_eq!(body.as_deref(), Some("ok"));
}

#[tokio::test]
async fn test_post_form_unwraps_json_envelope() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/politics/russia"))
        .and(header("X-Requested-With", "XMLHttpRequest"))
        .and(body_string("page=2"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"data": "<div>фрагмент</div>"})),
        )
        .mount(&server)
        .await;

    let fetcher = fetcher();
    let body = fetch(
        &fetcher,
        &PageRequest::PostForm {
            url: format!("{}/politics/russia", server.uri()),
            form: vec![("page".to_string(), "2".to_string())],
        },
    )
    .await;

    assert_eq!(body.as_deref(), Some("<div>фрагмент</div>"));
}

#[tokio::test]
async fn test_envelope_without_data_is_none() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/politics/russia"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"html": "x"})))
        .mount(&server)
        .await;

    let fetcher = fetcher();
    let body = fetch(
        &fetcher,
        &PageRequest::PostForm {
            url: format!("{}/politics/russia", server.uri()),
            form: vec![("page".to_string(), "1".to_string())],
        },
    )
    .await;

    assert_eq!(body, None);
}

#[tokio::test]
async fn test_error_statuses_are_none() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/gone"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let fetcher = fetcher();
    for route in ["/gone", "/broken"] {
        let body = fetch(
            &fetcher,
            &PageRequest::Get {
                url: format!("{}{}", server.uri(), route),
            },
        )
        .await;
        assert_eq!(body, None, "{route} should not yield a body");
    }
}

#[tokio::test]
async fn test_stop_flag_short_circuits() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .mount(&server)
        .await;

    let fetcher = fetcher();
    let limiter = PageFetcher::rate_limiter(100);
    let run_state = RunState::new();
    run_state.request_stop();

    let body = fetcher
        .fetch(
            &PageRequest::Get {
                url: format!("{}/any", server.uri()),
            },
            &limiter,
            &run_state,
        )
        .await;

    assert_eq!(body, None);
    assert!(server.received_requests().await.unwrap().is_empty());
}
