//! Per-resource endpoints
//!
//! Thin request builders on top of [`crate::Client`]: each service builds a
//! request, sends it through the shared pipeline and unwraps the
//! `{"result": ...}` envelope the API puts around collections.

use serde::Deserialize;

pub mod campaigns;
pub mod categories;
pub mod files;
pub mod marketplace;

pub use campaigns::{
    Campaign, CampaignCategories, CampaignData, CampaignListOptions, CampaignType, CampaignZone,
    CampaignsService, TargetingType, Variation, ZoneTargeting,
};
pub use categories::{CategoriesService, Category, CategoryListOptions};
pub use files::{File, FileListOptions, FileType, FilesService};
pub use marketplace::{MarketplaceListOptions, MarketplaceListing, MarketplaceService};

/// `{"result": ...}` wrapper used by list and get endpoints
#[derive(Debug, Deserialize)]
pub(crate) struct Envelope<T> {
    #[serde(default)]
    pub result: Option<T>,
}

impl<T: Default> Envelope<T> {
    pub(crate) fn into_result(self) -> T {
        self.result.unwrap_or_default()
    }
}
