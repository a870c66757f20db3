//! Marketplace listings

use reqwest::Method;
use serde::{Deserialize, Serialize};

use super::Envelope;
use crate::client::{Client, ClientResult, ListOptions};
use crate::context::RequestContext;

/// Default sort of the marketplace: busiest zones first
pub const DEFAULT_MARKETPLACE_ORDER: &str = "d:daily_impressions";

/// Zone offered on the marketplace
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketplaceListing {
    /// Publisher hostname
    pub site_hostname: String,
    /// Publisher name
    pub site_owner: String,
    /// Site description
    pub description: String,
    /// Site URL
    pub url: String,
    /// Main category ID
    #[serde(rename = "maincat")]
    pub main_category_id: i64,
    /// Main category name
    pub category_name: String,
    /// Ad size, e.g. `300x250`
    pub size: String,
    /// Publisher ad type ID
    #[serde(rename = "idpublisher_ad_type")]
    pub publisher_ad_type_id: i64,
    /// Zone ID
    #[serde(rename = "idzone")]
    pub zone_id: i64,
    /// Site ID
    #[serde(rename = "idsite")]
    pub site_id: i64,
    /// Site type code
    pub site_type: i32,
    /// Certification level
    pub certified_level: i32,
    /// Average impressions per day
    pub daily_impressions: i64,
    /// Average clicks per day
    pub daily_clicks: i64,
    /// Traffic type code
    pub traffic_type: i32,
    /// Advertiser ad type ID
    #[serde(rename = "idadvertiser_ad_type")]
    pub advertiser_ad_type_id: i64,
    /// Preview image
    pub img_url: String,
    /// Zone blocked by the advertiser
    pub blacklisted: i32,
    /// Site blocked by the advertiser
    pub site_blacklisted: i32,
    /// Block mode
    pub blacklist_type: i32,
    /// Alexa rank
    pub alexa: i64,
    /// Zone name ID
    #[serde(rename = "idname")]
    pub name_id: i64,
}

/// Query of `GET marketplace`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MarketplaceListOptions {
    /// Sort, defaults to [`DEFAULT_MARKETPLACE_ORDER`]
    #[serde(rename = "orderBy", skip_serializing_if = "Option::is_none")]
    pub order_by: Option<String>,
    /// Paging
    #[serde(flatten)]
    pub list: ListOptions,
}

/// Marketplace endpoints of a [`Client`]
pub struct MarketplaceService<'a> {
    client: &'a Client,
}

impl<'a> MarketplaceService<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// List marketplace zones
    pub async fn list(
        &self,
        ctx: &RequestContext,
        options: &MarketplaceListOptions,
    ) -> ClientResult<Vec<MarketplaceListing>> {
        let mut options = options.clone();
        options
            .order_by
            .get_or_insert_with(|| DEFAULT_MARKETPLACE_ORDER.to_string());

        let request = self
            .client
            .new_request(Method::GET, "marketplace")?
            .query(Some(&options))
            .build()?;

        let envelope: Envelope<Vec<MarketplaceListing>> = self.client.do_json(ctx, request).await?;
        Ok(envelope.into_result())
    }
}
