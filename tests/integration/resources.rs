//! Resource endpoints against a mock server

use exoclick::client::ListOptions;
use exoclick::resources::{
    CampaignListOptions, CategoryListOptions, FileListOptions, FileType, MarketplaceListOptions,
};
use exoclick::{ClientError, RequestContext};
use serde_json::json;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::support;

fn empty_result() -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({ "result": [] }))
}

#[tokio::test]
async fn test_campaign_list_default_order_and_paging() {
    let server = MockServer::start().await;
    support::mount_login(&server).await;
    Mock::given(method("GET"))
        .and(path("/v2/campaigns"))
        .and(query_param("orderBy", "d:id"))
        .and(query_param("limit", "25"))
        .and(query_param("offset", "50"))
        .and(query_param("status", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "result": [{ "id": 9, "name": "Winter", "status": 1, "date_created": "2023-12-01" }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = support::client(&server);
    let options = CampaignListOptions {
        status: Some(1),
        list: ListOptions::page(25, 50),
        ..Default::default()
    };
    let campaigns = client.campaigns().list(&RequestContext::new(), &options).await.unwrap();

    assert_eq!(campaigns.len(), 1);
    assert_eq!(campaigns[0].name.as_deref(), Some("Winter"));
}

#[tokio::test]
async fn test_campaign_get_without_detailed_has_no_query() {
    let server = MockServer::start().await;
    support::mount_login(&server).await;
    Mock::given(method("GET"))
        .and(path("/v2/campaigns/9"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "result": { "campaign": { "id": 9 }, "zone_targeting": { "type": 2 } }
        })))
        .mount(&server)
        .await;

    let client = support::client(&server);
    let ctx = RequestContext::new();

    let campaign = client.campaigns().get(&ctx, 9, false).await.unwrap();
    assert_eq!(campaign.campaign.and_then(|c| c.id), Some(9));
    client.campaigns().get(&ctx, 9, true).await.unwrap();

    let requests = support::hits(&server, "/v2/campaigns/9").await;
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].url.query(), None);
    assert_eq!(requests[1].url.query(), Some("detailed=true"));
}

#[tokio::test]
async fn test_target_and_block_categories() {
    let server = MockServer::start().await;
    support::mount_login(&server).await;
    Mock::given(method("POST"))
        .and(path("/v2/campaigns/7/targeted/categories"))
        .and(body_json(json!([3, 4])))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/v2/campaigns/7/targeted/categories"))
        .and(body_json(json!([5])))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let client = support::client(&server);
    let ctx = RequestContext::new();
    client.campaigns().target_categories(&ctx, 7, &[3, 4]).await.unwrap();
    client.campaigns().block_categories(&ctx, 7, &[5]).await.unwrap();
}

#[tokio::test]
async fn test_empty_category_list_rejected_locally() {
    let server = MockServer::start().await;
    support::mount_login(&server).await;

    let client = support::client(&server);
    let err = client
        .campaigns()
        .target_categories(&RequestContext::new(), 7, &[])
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::InvalidArgument(_)), "got {err:?}");
    assert!(server.received_requests().await.unwrap_or_default().is_empty());
}

#[tokio::test]
async fn test_categories_not_found_is_empty() {
    let server = MockServer::start().await;
    support::mount_login(&server).await;
    Mock::given(method("GET"))
        .and(path("/v2/collections/categories"))
        .and(query_param("orderBy", "a:id"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({ "message": "Not found" })))
        .mount(&server)
        .await;

    let client = support::client(&server);
    let categories = client
        .categories()
        .list(&RequestContext::new(), &CategoryListOptions::default())
        .await
        .unwrap();
    assert!(categories.is_empty());
}

#[tokio::test]
async fn test_categories_other_errors_surface() {
    let server = MockServer::start().await;
    support::mount_login(&server).await;
    Mock::given(method("GET"))
        .and(path("/v2/collections/categories"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({ "message": "boom" })))
        .mount(&server)
        .await;

    let client = support::client(&server);
    let err = client
        .categories()
        .list(&RequestContext::new(), &CategoryListOptions::default())
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(500));
}

#[tokio::test]
async fn test_files_query() {
    let server = MockServer::start().await;
    support::mount_login(&server).await;
    Mock::given(method("GET"))
        .and(path("/v2/library/file"))
        .and(query_param("type", "video"))
        .and(query_param("orderBy", "a:id"))
        .respond_with(empty_result())
        .expect(1)
        .mount(&server)
        .await;

    let client = support::client(&server);
    let files = client
        .files()
        .list(&RequestContext::new(), &FileListOptions::new(FileType::Video))
        .await
        .unwrap();
    assert!(files.is_empty());

    let requests = support::hits(&server, "/v2/library/file").await;
    let query = requests[0].url.query().unwrap_or_default();
    assert!(!query.contains("show_archived"), "query was {query}");
}

#[tokio::test]
async fn test_marketplace_custom_order_kept() {
    let server = MockServer::start().await;
    support::mount_login(&server).await;
    Mock::given(method("GET"))
        .and(path("/v2/marketplace"))
        .and(query_param("orderBy", "a:site_hostname"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "result": [{ "site_hostname": "example.com", "idzone": 3, "daily_impressions": 1000 }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = support::client(&server);
    let options = MarketplaceListOptions {
        order_by: Some("a:site_hostname".to_string()),
        ..Default::default()
    };
    let listings = client.marketplace().list(&RequestContext::new(), &options).await.unwrap();
    assert_eq!(listings[0].zone_id, 3);
}

#[tokio::test]
async fn test_missing_result_is_empty() {
    let server = MockServer::start().await;
    support::mount_login(&server).await;
    Mock::given(method("GET"))
        .and(path("/v2/marketplace"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;

    let client = support::client(&server);
    let listings = client
        .marketplace()
        .list(&RequestContext::new(), &MarketplaceListOptions::default())
        .await
        .unwrap();
    assert!(listings.is_empty());
}
