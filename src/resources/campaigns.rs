//! Campaign endpoints

use chrono::NaiveDate;
use reqwest::Method;
use serde::{Deserialize, Serialize};

use super::categories::Category;
use super::Envelope;
use crate::client::{Client, ClientError, ClientResult, ListOptions};
use crate::context::RequestContext;

/// Default sort of the campaign list: newest first
pub const DEFAULT_CAMPAIGN_ORDER: &str = "d:id";

/// Full campaign as returned by `GET campaigns/{id}`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Campaign {
    /// Campaign settings
    pub campaign: Option<CampaignData>,
    /// Zone-level bids
    pub zones: Option<Vec<CampaignZone>>,
    /// Targeted and blocked categories
    pub categories: Option<CampaignCategories>,
    /// Creatives
    pub variations: Option<Vec<Variation>>,
    /// Zone targeting mode
    pub zone_targeting: Option<ZoneTargeting>,
}

/// Campaign settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CampaignData {
    /// Campaign ID
    pub id: Option<i64>,
    /// Display name
    pub name: Option<String>,
    /// Campaign type
    pub campaign_type: Option<CampaignType>,
    /// Status code
    pub status: Option<i32>,
    /// Pricing model code
    pub pricing_model: Option<i32>,
    /// Bid
    pub price: Option<f64>,
    /// Creation day
    pub date_created: Option<NaiveDate>,
}

/// Campaign type
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CampaignType {
    /// Type ID
    pub id: i64,
    /// Type name
    pub name: String,
}

/// Bid on one zone
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CampaignZone {
    /// Campaign ID
    #[serde(rename = "idcampaign")]
    pub campaign_id: Option<i64>,
    /// Zone ID
    #[serde(rename = "idzone")]
    pub zone_id: Option<i64>,
    /// Zone bid
    pub price: Option<f64>,
    /// Sub-ID targeting mode
    pub sub_id_target_type: Option<i32>,
    /// Site ID
    #[serde(rename = "idsite")]
    pub site_id: Option<i64>,
    /// Targeted sub IDs
    pub sub_ids: Option<Vec<i64>>,
}

/// Category targeting of a campaign
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CampaignCategories {
    /// Targeted categories
    #[serde(default)]
    pub targeted: Vec<Category>,
    /// Blocked categories
    #[serde(default)]
    pub blocked: Vec<Category>,
}

/// Zone targeting mode
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneTargeting {
    /// Mode code
    #[serde(rename = "type")]
    pub kind: i32,
}

/// Campaign creative
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Variation {
    /// Variation ID
    #[serde(rename = "idvariation")]
    pub id: i64,
    /// Display name
    pub name: String,
    /// Free-text description
    pub description: String,
    /// Active flag
    pub active: i32,
    /// Status code
    pub status: i32,
    /// Landing page
    pub url: String,
    /// Creative image URL
    #[serde(rename = "imgurl")]
    pub img_url: String,
    /// Display URL
    #[serde(rename = "durl")]
    pub url_description: String,
    /// Linked offer ID
    pub offer_id: Option<i64>,
    /// Linked offer name
    pub offer_name: String,
    /// Library file ID
    #[serde(rename = "idvariations_file")]
    pub file_id: i64,
    /// Landing page ID
    #[serde(rename = "idvariations_url")]
    pub url_id: i64,
    /// HTML creative ID
    #[serde(rename = "idvariations_html")]
    pub html_id: Option<i64>,
    /// Iframe creative ID
    #[serde(rename = "idvariations_iframe_url")]
    pub iframe_url_id: Option<i64>,
    /// Explicit content
    pub is_explicit: bool,
    /// Preview URL
    pub test_variation_url: String,
    /// Traffic share, in percent
    pub share: i32,
    /// Creative kind
    pub file_type: String,
    /// Status derived by the server
    pub calculated_status: String,
    /// Video length in seconds
    pub duration: f64,
}

/// Query of `GET campaigns`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CampaignListOptions {
    /// Only campaigns with this status
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<i32>,
    /// Free-text search
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_search: Option<String>,
    /// Sort, defaults to [`DEFAULT_CAMPAIGN_ORDER`]
    #[serde(rename = "orderBy", skip_serializing_if = "Option::is_none")]
    pub order_by: Option<String>,
    /// Paging
    #[serde(flatten)]
    pub list: ListOptions,
}

#[derive(Serialize)]
struct DetailedParam {
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    detailed: bool,
}

/// Whether a category change adds or removes targeting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetingType {
    /// Target the categories
    Target,
    /// Block the categories
    Block,
}

impl TargetingType {
    fn method(self) -> Method {
        match self {
            TargetingType::Target => Method::POST,
            TargetingType::Block => Method::DELETE,
        }
    }
}

/// Campaign endpoints of a [`Client`]
pub struct CampaignsService<'a> {
    client: &'a Client,
}

impl<'a> CampaignsService<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// List campaigns
    pub async fn list(
        &self,
        ctx: &RequestContext,
        options: &CampaignListOptions,
    ) -> ClientResult<Vec<CampaignData>> {
        let mut options = options.clone();
        options
            .order_by
            .get_or_insert_with(|| DEFAULT_CAMPAIGN_ORDER.to_string());

        let request = self
            .client
            .new_request(Method::GET, "campaigns")?
            .query(Some(&options))
            .build()?;

        let envelope: Envelope<Vec<CampaignData>> = self.client.do_json(ctx, request).await?;
        Ok(envelope.into_result())
    }

    /// Fetch one campaign, with names resolved when `detailed`
    pub async fn get(&self, ctx: &RequestContext, id: i64, detailed: bool) -> ClientResult<Campaign> {
        let request = self
            .client
            .new_request(Method::GET, &format!("campaigns/{id}"))?
            .query(Some(&DetailedParam { detailed }))
            .build()?;

        let envelope: Envelope<Campaign> = self.client.do_json(ctx, request).await?;
        Ok(envelope.into_result())
    }

    /// Add or remove category targeting
    pub async fn toggle_categories(
        &self,
        ctx: &RequestContext,
        campaign_id: i64,
        categories: &[i64],
        targeting: TargetingType,
    ) -> ClientResult<()> {
        if categories.is_empty() {
            return Err(ClientError::InvalidArgument(
                "categories array cannot be empty".to_string(),
            ));
        }

        let request = self
            .client
            .new_request(
                targeting.method(),
                &format!("campaigns/{campaign_id}/targeted/categories"),
            )?
            .json(categories)
            .build()?;

        self.client.do_empty(ctx, request).await
    }

    /// Target `categories` in a campaign
    pub async fn target_categories(
        &self,
        ctx: &RequestContext,
        campaign_id: i64,
        categories: &[i64],
    ) -> ClientResult<()> {
        self.toggle_categories(ctx, campaign_id, categories, TargetingType::Target)
            .await
    }

    /// Block `categories` in a campaign
    pub async fn block_categories(
        &self,
        ctx: &RequestContext,
        campaign_id: i64,
        categories: &[i64],
    ) -> ClientResult<()> {
        self.toggle_categories(ctx, campaign_id, categories, TargetingType::Block)
            .await
    }
}
