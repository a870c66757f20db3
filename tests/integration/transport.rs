//! Error mapping, rate gating and cancellation of the request pipeline

use exoclick::resources::{CampaignListOptions, CategoryListOptions};
use exoclick::statistics::{StatisticsField, StatisticsQuery};
use exoclick::{Cancellation, ClientError, RequestContext, TrafficCategory};
use chrono::NaiveDate;
use serde_json::json;
use std::time::{Duration, Instant};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::support;

fn campaigns_ok() -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({ "result": [] }))
}

async fn list_campaigns(client: &exoclick::Client, ctx: &RequestContext) -> Result<(), ClientError> {
    client
        .campaigns()
        .list(ctx, &CampaignListOptions::default())
        .await
        .map(|_| ())
}

#[tokio::test]
async fn test_api_error_carries_message() {
    let server = MockServer::start().await;
    support::mount_login(&server).await;
    Mock::given(method("GET"))
        .and(path("/v2/campaigns"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({ "message": "Invalid orderBy" })))
        .mount(&server)
        .await;

    let client = support::client(&server);
    let err = list_campaigns(&client, &RequestContext::new()).await.unwrap_err();

    match err {
        ClientError::Api(response) => {
            assert_eq!(response.status.as_u16(), 400);
            assert_eq!(response.message, "Invalid orderBy");
            assert_eq!(response.method, reqwest::Method::GET);
            assert_eq!(response.url.path(), "/v2/campaigns");
            assert!(response.body.contains("Invalid orderBy"));
        }
        other => panic!("expected API error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_non_json_error_body() {
    let server = MockServer::start().await;
    support::mount_login(&server).await;
    Mock::given(method("GET"))
        .and(path("/v2/campaigns"))
        .respond_with(ResponseTemplate::new(502).set_body_string("<html>Bad Gateway</html>"))
        .mount(&server)
        .await;

    let client = support::client(&server);
    let err = list_campaigns(&client, &RequestContext::new()).await.unwrap_err();

    assert_eq!(err.status(), Some(502));
    match err {
        ClientError::MalformedErrorResponse { body, .. } => assert_eq!(body, "<html>Bad Gateway</html>"),
        other => panic!("expected malformed error response, got {other:?}"),
    }
}

#[tokio::test]
async fn test_malformed_success_body_is_json_error() {
    let server = MockServer::start().await;
    support::mount_login(&server).await;
    Mock::given(method("GET"))
        .and(path("/v2/campaigns"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{\"result\": ["))
        .mount(&server)
        .await;

    let client = support::client(&server);
    let err = list_campaigns(&client, &RequestContext::new()).await.unwrap_err();
    assert!(matches!(err, ClientError::Json(_)), "got {err:?}");
}

#[tokio::test]
async fn test_budget_recorded_per_category() {
    let server = MockServer::start().await;
    support::mount_login(&server).await;
    Mock::given(method("GET"))
        .and(path("/v2/campaigns"))
        .respond_with(support::with_budget(campaigns_ok(), 100, 42, 60))
        .mount(&server)
        .await;

    let client = support::client(&server);
    list_campaigns(&client, &RequestContext::new()).await.unwrap();

    let core = client.rate_budget(TrafficCategory::Core);
    assert_eq!(core.limit, Some(100));
    assert_eq!(core.remaining, Some(42));
    assert!(core.reset.is_some());

    let statistics = client.rate_budget(TrafficCategory::Statistics);
    assert_eq!(statistics, exoclick::client::RateBudget::default());
}

#[tokio::test]
async fn test_exhausted_budget_holds_next_request() {
    let server = MockServer::start().await;
    support::mount_login(&server).await;
    Mock::given(method("GET"))
        .and(path("/v2/campaigns"))
        .respond_with(support::with_budget(campaigns_ok(), 100, 0, 1))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v2/campaigns"))
        .respond_with(support::with_budget(campaigns_ok(), 100, 99, 60))
        .mount(&server)
        .await;

    let client = support::client(&server);
    let ctx = RequestContext::new();

    list_campaigns(&client, &ctx).await.unwrap();

    let started = Instant::now();
    list_campaigns(&client, &ctx).await.unwrap();
    assert!(
        started.elapsed() >= Duration::from_millis(900),
        "second request went out after {:?}",
        started.elapsed()
    );
}

#[tokio::test]
async fn test_exhausted_core_budget_does_not_block_statistics() {
    let server = MockServer::start().await;
    support::mount_login(&server).await;
    Mock::given(method("GET"))
        .and(path("/v2/campaigns"))
        .respond_with(support::with_budget(campaigns_ok(), 100, 0, 60))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v2/statistics/a/global"))
        .respond_with(ResponseTemplate::new(200).set_body_string("clicks\n5\n"))
        .mount(&server)
        .await;

    let client = support::client(&server);
    let ctx = RequestContext::with_timeout(Duration::from_secs(5));
    list_campaigns(&client, &ctx).await.unwrap();

    let day = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    let query = StatisticsQuery::new(day, day, vec![StatisticsField::Clicks]);
    let rows = client.statistics().fetch(&ctx, &query).await.unwrap();
    assert_eq!(rows[0].clicks, 5);
}

#[tokio::test]
async fn test_cancel_during_rate_wait() {
    let server = MockServer::start().await;
    support::mount_login(&server).await;
    Mock::given(method("GET"))
        .and(path("/v2/campaigns"))
        .respond_with(support::with_budget(campaigns_ok(), 100, 0, 30))
        .mount(&server)
        .await;

    let client = support::client(&server);
    let ctx = RequestContext::new();
    list_campaigns(&client, &ctx).await.unwrap();

    let canceller = ctx.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        canceller.cancel();
    });

    let started = Instant::now();
    let err = list_campaigns(&client, &ctx).await.unwrap_err();

    assert!(matches!(err, ClientError::Cancelled(Cancellation::Cancelled)), "got {err:?}");
    assert!(started.elapsed() < Duration::from_secs(5));
    assert_eq!(support::hits(&server, "/v2/campaigns").await.len(), 1);
}

#[tokio::test]
async fn test_deadline_during_slow_response() {
    let server = MockServer::start().await;
    support::mount_login(&server).await;
    Mock::given(method("GET"))
        .and(path("/v2/collections/categories"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "result": [] }))
                .set_delay(Duration::from_secs(10)),
        )
        .mount(&server)
        .await;

    let client = support::client(&server);
    let ctx = RequestContext::with_timeout(Duration::from_millis(200));

    let started = Instant::now();
    let err = client
        .categories()
        .list(&ctx, &CategoryListOptions::default())
        .await
        .unwrap_err();

    assert!(
        matches!(err, ClientError::Cancelled(Cancellation::DeadlineExceeded)),
        "got {err:?}"
    );
    assert!(started.elapsed() < Duration::from_secs(5));
}

#[tokio::test]
async fn test_cancelled_context_sends_nothing() {
    let server = MockServer::start().await;
    support::mount_login(&server).await;

    let client = support::client(&server);
    let ctx = RequestContext::new();
    ctx.cancel();

    let err = list_campaigns(&client, &ctx).await.unwrap_err();
    assert!(err.is_cancelled());
    assert!(server.received_requests().await.unwrap_or_default().is_empty());
}

#[tokio::test]
async fn test_user_agent_sent() {
    let server = MockServer::start().await;
    support::mount_login(&server).await;
    Mock::given(method("GET"))
        .and(path("/v2/campaigns"))
        .respond_with(campaigns_ok())
        .mount(&server)
        .await;

    let client = exoclick::Client::builder(support::API_KEY)
        .base_url(&support::base_url(&server))
        .unwrap()
        .user_agent("reporting-job/2.0")
        .build()
        .unwrap();
    list_campaigns(&client, &RequestContext::new()).await.unwrap();

    for request in server.received_requests().await.unwrap_or_default() {
        assert_eq!(
            request.headers.get("user-agent").unwrap().to_str().unwrap(),
            "reporting-job/2.0"
        );
    }
}
