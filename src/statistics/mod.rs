//! Statistics export
//!
//! # Overview
//!
//! The global statistics endpoint answers with CSV. The pipeline:
//!
//! 1. **Validation**: [`validate::validate`] checks the cross-field rules of a
//!    [`StatisticsQuery`] before anything is sent
//! 2. **Request**: `POST statistics/a/global` with the query as JSON and
//!    `Accept: text/csv`
//! 3. **Decoding**: [`decode::decode_statistics`] maps columns to
//!    [`StatisticRecord`] fields by the query's `output_fields` order, not by
//!    the header text the server sends
//!
//! # Example
//!
//! ```no_run
//! use chrono::NaiveDate;
//! use exoclick::statistics::{OrderBy, StatisticsField, StatisticsQuery};
//! use exoclick::{Client, RequestContext};
//!
//! # async fn example() -> Result<(), exoclick::ClientError> {
//! let client = Client::new("my-api-token")?;
//! let query = StatisticsQuery::new(
//!     NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
//!     NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
//!     vec![StatisticsField::Date, StatisticsField::Clicks, StatisticsField::Cost],
//! )
//! .group_by(StatisticsField::Date)
//! .order_by(OrderBy::desc(StatisticsField::Clicks));
//!
//! let rows = client.statistics().fetch(&RequestContext::new(), &query).await?;
//! # Ok(())
//! # }
//! ```

use chrono::NaiveDate;
use reqwest::Method;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, info};

use crate::client::transport::read_body;
use crate::client::{Client, ClientResult, ListOptions};
use crate::context::RequestContext;

pub mod decode;
pub mod validate;

pub use decode::{decode_statistics, DecodeError};
pub use validate::{validate, ValidationError};

/// Path of the global statistics export, relative to the base URL
pub const STATISTICS_PATH: &str = "statistics/a/global";

/// Column of the statistics export
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatisticsField {
    /// Day of the row
    Date,
    /// Hour of day (0-23)
    Hour,
    /// Campaign ID
    CampaignId,
    /// Variation (creative) ID
    VariationId,
    /// Site ID
    SiteId,
    /// Site name, detailed mode only
    SiteName,
    /// Zone ID
    ZoneId,
    /// Zone name, detailed mode only
    ZoneName,
    /// Category ID
    CategoryId,
    /// Clicks
    Clicks,
    /// Impressions
    Impressions,
    /// Video impressions
    VideoImpressions,
    /// Video views
    VideoViews,
    /// Aggregate counter `g1`
    G1,
    /// Aggregate counter `g5`
    G5,
    /// Spend
    Cost,
}

impl StatisticsField {
    /// Every field, in declaration order
    pub const ALL: [StatisticsField; 16] = [
        StatisticsField::Date,
        StatisticsField::Hour,
        StatisticsField::CampaignId,
        StatisticsField::VariationId,
        StatisticsField::SiteId,
        StatisticsField::SiteName,
        StatisticsField::ZoneId,
        StatisticsField::ZoneName,
        StatisticsField::CategoryId,
        StatisticsField::Clicks,
        StatisticsField::Impressions,
        StatisticsField::VideoImpressions,
        StatisticsField::VideoViews,
        StatisticsField::G1,
        StatisticsField::G5,
        StatisticsField::Cost,
    ];

    /// Fields that may appear in `group_by`
    pub const GROUPABLE: [StatisticsField; 7] = [
        StatisticsField::CampaignId,
        StatisticsField::CategoryId,
        StatisticsField::Date,
        StatisticsField::Hour,
        StatisticsField::SiteId,
        StatisticsField::ZoneId,
        StatisticsField::VariationId,
    ];

    /// Fields that need `detailed` enabled
    pub const DETAILED_ONLY: [StatisticsField; 2] =
        [StatisticsField::SiteName, StatisticsField::ZoneName];

    /// Wire name of the field
    pub fn as_str(self) -> &'static str {
        match self {
            StatisticsField::Date => "date",
            StatisticsField::Hour => "hour",
            StatisticsField::CampaignId => "campaign_id",
            StatisticsField::VariationId => "variation_id",
            StatisticsField::SiteId => "site_id",
            StatisticsField::SiteName => "site_name",
            StatisticsField::ZoneId => "zone_id",
            StatisticsField::ZoneName => "zone_name",
            StatisticsField::CategoryId => "category_id",
            StatisticsField::Clicks => "clicks",
            StatisticsField::Impressions => "impressions",
            StatisticsField::VideoImpressions => "video_impressions",
            StatisticsField::VideoViews => "video_views",
            StatisticsField::G1 => "g1",
            StatisticsField::G5 => "g5",
            StatisticsField::Cost => "cost",
        }
    }

    /// Whether the field may be grouped by
    pub fn is_groupable(self) -> bool {
        Self::GROUPABLE.contains(&self)
    }

    /// Whether the field requires detailed mode
    pub fn requires_detailed(self) -> bool {
        Self::DETAILED_ONLY.contains(&self)
    }
}

impl fmt::Display for StatisticsField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StatisticsField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|field| field.as_str() == wanted)
            .ok_or_else(|| format!("Unknown statistics field: {s}"))
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    /// Ascending
    Asc,
    /// Descending
    Desc,
}

impl FromStr for SortDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "asc" => Ok(SortDirection::Asc),
            "desc" => Ok(SortDirection::Desc),
            _ => Err(format!("Invalid sort direction: {s}. Valid options: asc, desc")),
        }
    }
}

/// One `order_by` entry. Both parts are required by the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OrderBy {
    /// Column to sort on
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<StatisticsField>,
    /// Sort direction
    #[serde(rename = "order", skip_serializing_if = "Option::is_none")]
    pub direction: Option<SortDirection>,
}

impl OrderBy {
    /// Ascending on `field`
    pub fn asc(field: StatisticsField) -> Self {
        Self {
            field: Some(field),
            direction: Some(SortDirection::Asc),
        }
    }

    /// Descending on `field`
    pub fn desc(field: StatisticsField) -> Self {
        Self {
            field: Some(field),
            direction: Some(SortDirection::Desc),
        }
    }
}

impl FromStr for OrderBy {
    type Err = String;

    /// Parse `field` or `field:asc|desc` (ascending by default)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (field, direction) = match s.split_once(':') {
            Some((field, direction)) => (field, direction.parse()?),
            None => (s, SortDirection::Asc),
        };
        Ok(Self {
            field: Some(field.parse()?),
            direction: Some(direction),
        })
    }
}

fn serialize_flag<S: Serializer>(flag: &bool, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u8(u8::from(*flag))
}

fn is_false(flag: &bool) -> bool {
    !*flag
}

/// Row filter of a statistics query
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatisticsFilter {
    /// First day, inclusive
    pub date_from: NaiveDate,
    /// Last day, inclusive
    pub date_to: NaiveDate,
    /// Hours of day to keep; requires a timezone
    #[serde(rename = "hour", skip_serializing_if = "Vec::is_empty")]
    pub hours: Vec<i32>,
    /// Restrict to one campaign
    #[serde(skip_serializing_if = "Option::is_none")]
    pub campaign_id: Option<i64>,
    /// Restrict to one variation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variation_id: Option<i64>,
    /// Restrict to one site
    #[serde(skip_serializing_if = "Option::is_none")]
    pub site_id: Option<i64>,
    /// Restrict to one zone
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zone_id: Option<i64>,
    /// Restrict to one category
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<i64>,
    /// Leave out deleted entities
    #[serde(skip_serializing_if = "is_false", serialize_with = "serialize_flag")]
    pub exclude_deleted: bool,
}

impl StatisticsFilter {
    /// Filter covering `date_from..=date_to`
    pub fn new(date_from: NaiveDate, date_to: NaiveDate) -> Self {
        Self {
            date_from,
            date_to,
            hours: Vec::new(),
            campaign_id: None,
            variation_id: None,
            site_id: None,
            zone_id: None,
            category_id: None,
            exclude_deleted: false,
        }
    }
}

/// Statistics export query. Built by the caller, only read by the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatisticsQuery {
    /// IANA timezone name, e.g. `Europe/Madrid`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
    /// Row filter
    pub filter: StatisticsFilter,
    /// Grouping columns, at most 4
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub group_by: Vec<StatisticsField>,
    /// Sort order, at most 2 entries
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub order_by: Vec<OrderBy>,
    /// Columns of the CSV export, in order; at least one
    #[serde(rename = "output_csv_fields", skip_serializing_if = "Vec::is_empty")]
    pub output_fields: Vec<StatisticsField>,
    /// Unlock name columns
    #[serde(skip_serializing_if = "is_false")]
    pub detailed: bool,
    /// Paging
    #[serde(flatten)]
    pub list: ListOptions,
}

impl StatisticsQuery {
    /// Query for `date_from..=date_to` exporting `output_fields`
    pub fn new(date_from: NaiveDate, date_to: NaiveDate, output_fields: Vec<StatisticsField>) -> Self {
        Self {
            timezone: None,
            filter: StatisticsFilter::new(date_from, date_to),
            group_by: Vec::new(),
            order_by: Vec::new(),
            output_fields,
            detailed: false,
            list: ListOptions::default(),
        }
    }

    /// Set the timezone
    pub fn timezone(mut self, timezone: impl Into<String>) -> Self {
        self.timezone = Some(timezone.into());
        self
    }

    /// Add an hour to the filter
    pub fn hour(mut self, hour: i32) -> Self {
        self.filter.hours.push(hour);
        self
    }

    /// Add a grouping column
    pub fn group_by(mut self, field: StatisticsField) -> Self {
        self.group_by.push(field);
        self
    }

    /// Add a sort entry
    pub fn order_by(mut self, order: OrderBy) -> Self {
        self.order_by.push(order);
        self
    }

    /// Enable or disable detailed mode
    pub fn detailed(mut self, detailed: bool) -> Self {
        self.detailed = detailed;
        self
    }

    /// Set paging
    pub fn paging(mut self, list: ListOptions) -> Self {
        self.list = list;
        self
    }
}

/// One decoded export row
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StatisticRecord {
    /// Day, when selected
    pub date: Option<NaiveDate>,
    /// Hour of day, when selected
    pub hour: Option<u8>,
    /// Campaign ID, when selected
    pub campaign_id: Option<i64>,
    /// Variation ID, when selected
    pub variation_id: Option<i64>,
    /// Site ID, when selected
    pub site_id: Option<i64>,
    /// Site name, when selected
    pub site_name: Option<String>,
    /// Zone ID, when selected
    pub zone_id: Option<i64>,
    /// Zone name, when selected
    pub zone_name: Option<String>,
    /// Category ID, when selected
    pub category_id: Option<i64>,
    /// Clicks
    pub clicks: u64,
    /// Impressions
    pub impressions: u64,
    /// Video impressions
    pub video_impressions: u64,
    /// Video views
    pub video_views: u64,
    /// Aggregate counter `g1`
    pub g1: u64,
    /// Aggregate counter `g5`
    pub g5: u64,
    /// Spend
    pub cost: Decimal,
}

impl StatisticRecord {
    /// Text of one column, empty for unselected optional fields
    pub fn field_value(&self, field: StatisticsField) -> String {
        fn opt<T: ToString>(value: &Option<T>) -> String {
            value.as_ref().map(ToString::to_string).unwrap_or_default()
        }

        match field {
            StatisticsField::Date => self
                .date
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
            StatisticsField::Hour => opt(&self.hour),
            StatisticsField::CampaignId => opt(&self.campaign_id),
            StatisticsField::VariationId => opt(&self.variation_id),
            StatisticsField::SiteId => opt(&self.site_id),
            StatisticsField::SiteName => self.site_name.clone().unwrap_or_default(),
            StatisticsField::ZoneId => opt(&self.zone_id),
            StatisticsField::ZoneName => self.zone_name.clone().unwrap_or_default(),
            StatisticsField::CategoryId => opt(&self.category_id),
            StatisticsField::Clicks => self.clicks.to_string(),
            StatisticsField::Impressions => self.impressions.to_string(),
            StatisticsField::VideoImpressions => self.video_impressions.to_string(),
            StatisticsField::VideoViews => self.video_views.to_string(),
            StatisticsField::G1 => self.g1.to_string(),
            StatisticsField::G5 => self.g5.to_string(),
            StatisticsField::Cost => self.cost.to_string(),
        }
    }
}

/// Statistics endpoints of a [`Client`]
pub struct StatisticsService<'a> {
    client: &'a Client,
}

impl<'a> StatisticsService<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// Validate `query`, run the export and decode its rows.
    ///
    /// Validation failures are returned before any request is sent.
    pub async fn fetch(
        &self,
        ctx: &RequestContext,
        query: &StatisticsQuery,
    ) -> ClientResult<Vec<StatisticRecord>> {
        validate(query)?;

        let request = self
            .client
            .new_request(Method::POST, STATISTICS_PATH)?
            .json(query)
            .accept_csv()
            .build()?;

        debug!(
            date_from = %query.filter.date_from,
            date_to = %query.filter.date_to,
            fields = query.output_fields.len(),
            "Requesting statistics export"
        );

        let response = self.client.bare_do(ctx, request).await?;
        let body = read_body(ctx, response).await?;
        let records = decode_statistics(body.as_slice(), &query.output_fields)?;

        info!(rows = records.len(), "Statistics export decoded");
        Ok(records)
    }
}
