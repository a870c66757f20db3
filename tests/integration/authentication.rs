//! Token exchange through the request pipeline

use exoclick::resources::CategoryListOptions;
use exoclick::{ClientError, RequestContext};
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::support::{self, API_KEY, TOKEN};

fn categories_ok() -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({ "result": [{ "id": 1, "name": "Sports" }] }))
}

#[tokio::test]
async fn test_bearer_token_attached() {
    let server = MockServer::start().await;
    support::mount_login(&server).await;

    Mock::given(method("GET"))
        .and(path("/v2/collections/categories"))
        .and(header("authorization", format!("Bearer {TOKEN}").as_str()))
        .respond_with(categories_ok())
        .expect(1)
        .mount(&server)
        .await;

    let client = support::client(&server);
    let categories = client
        .categories()
        .list(&RequestContext::new(), &CategoryListOptions::default())
        .await
        .unwrap();

    assert_eq!(categories.len(), 1);
    assert_eq!(client.token_authority().current().await.unwrap().token(), TOKEN);
}

#[tokio::test]
async fn test_login_request_shape() {
    let server = MockServer::start().await;
    support::mount_login(&server).await;
    Mock::given(method("GET"))
        .and(path("/v2/collections/categories"))
        .respond_with(categories_ok())
        .mount(&server)
        .await;

    let client = support::client(&server);
    client
        .categories()
        .list(&RequestContext::new(), &CategoryListOptions::default())
        .await
        .unwrap();

    let logins = support::hits(&server, "/v2/login").await;
    assert_eq!(logins.len(), 1);
    let login = &logins[0];
    assert!(login.headers.get("authorization").is_none());
    assert_eq!(
        login.headers.get("content-type").unwrap().to_str().unwrap(),
        "application/json"
    );
    let body: serde_json::Value = serde_json::from_slice(&login.body).unwrap();
    assert_eq!(body, json!({ "api_token": API_KEY }));
}

#[tokio::test]
async fn test_concurrent_callers_share_one_login() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v2/login"))
        .respond_with(support::login_ok(TOKEN, 3600).set_delay(Duration::from_millis(200)))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v2/collections/categories"))
        .respond_with(categories_ok())
        .expect(8)
        .mount(&server)
        .await;

    let client = support::client(&server);
    let ctx = RequestContext::new();

    let mut tasks = tokio::task::JoinSet::new();
    for _ in 0..8 {
        let client = client.clone();
        let ctx = ctx.clone();
        tasks.spawn(async move {
            client
                .categories()
                .list(&ctx, &CategoryListOptions::default())
                .await
        });
    }

    while let Some(result) = tasks.join_next().await {
        assert_eq!(result.unwrap().unwrap().len(), 1);
    }
}

#[tokio::test]
async fn test_failed_login_retried_on_next_call() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v2/login"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({ "message": "bad key" })))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    support::mount_login(&server).await;
    Mock::given(method("GET"))
        .and(path("/v2/collections/categories"))
        .respond_with(categories_ok())
        .expect(1)
        .mount(&server)
        .await;

    let client = support::client(&server);
    let ctx = RequestContext::new();

    let err = client
        .categories()
        .list(&ctx, &CategoryListOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Auth(_)), "got {err:?}");
    assert!(client.token_authority().current().await.is_none());

    client
        .categories()
        .list(&ctx, &CategoryListOptions::default())
        .await
        .unwrap();
    assert_eq!(support::hits(&server, "/v2/login").await.len(), 2);
}

#[tokio::test]
async fn test_malformed_login_body_is_auth_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v2/login"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let client = support::client(&server);
    let err = client
        .categories()
        .list(&RequestContext::new(), &CategoryListOptions::default())
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::Auth(_)), "got {err:?}");
    assert!(support::hits(&server, "/v2/collections/categories").await.is_empty());
}

#[tokio::test]
async fn test_out_of_range_lifetime_is_auth_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v2/login"))
        .respond_with(support::login_ok(TOKEN, i64::MAX))
        .mount(&server)
        .await;

    let client = support::client(&server);
    let err = client
        .categories()
        .list(&RequestContext::new(), &CategoryListOptions::default())
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::Auth(_)), "got {err:?}");
    assert!(client.token_authority().current().await.is_none());
    assert!(support::hits(&server, "/v2/collections/categories").await.is_empty());
}

#[tokio::test]
async fn test_expired_token_triggers_new_login() {
    let server = MockServer::start().await;

    // A zero lifetime is expired as soon as it is issued.
    Mock::given(method("POST"))
        .and(path("/v2/login"))
        .respond_with(support::login_ok(TOKEN, 0))
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v2/collections/categories"))
        .respond_with(categories_ok())
        .expect(2)
        .mount(&server)
        .await;

    let client = support::client(&server);
    let ctx = RequestContext::new();
    for _ in 0..2 {
        client
            .categories()
            .list(&ctx, &CategoryListOptions::default())
            .await
            .unwrap();
    }
}
