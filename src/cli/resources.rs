//! Campaign, category, marketplace and file commands

use clap::{Args, Subcommand};
use tracing::info;

use super::{print_json, Cli, CliError};
use crate::client::ListOptions;
use crate::context::RequestContext;
use crate::resources::{
    CampaignListOptions, CategoryListOptions, FileListOptions, FileType, MarketplaceListOptions,
    TargetingType,
};

/// Paging and sort shared by the list commands
#[derive(Args, Debug, Clone, Default)]
pub struct PageArgs {
    /// Maximum number of rows
    #[arg(long)]
    pub limit: Option<u32>,

    /// Rows to skip
    #[arg(long)]
    pub offset: Option<u32>,

    /// Sort, e.g. `a:id` or `d:daily_impressions`
    #[arg(long)]
    pub order_by: Option<String>,
}

impl PageArgs {
    fn list(&self) -> ListOptions {
        ListOptions {
            limit: self.limit,
            offset: self.offset,
        }
    }
}

/// `exoclick campaigns`
#[derive(Args, Debug)]
pub struct CampaignsCommand {
    #[command(subcommand)]
    action: CampaignsAction,
}

#[derive(Subcommand, Debug)]
enum CampaignsAction {
    /// List campaigns
    List {
        /// Only campaigns with this status code
        #[arg(long)]
        status: Option<i32>,

        /// Free-text search
        #[arg(long)]
        search: Option<String>,

        #[command(flatten)]
        page: PageArgs,
    },

    /// Show one campaign
    Get {
        /// Campaign ID
        id: i64,

        /// Resolve names of zones and categories
        #[arg(long, default_value_t = false)]
        detailed: bool,
    },

    /// Target categories in a campaign
    Target {
        /// Campaign ID
        id: i64,

        /// Category IDs, comma separated
        #[arg(long, value_delimiter = ',', required = true)]
        categories: Vec<i64>,
    },

    /// Block categories in a campaign
    Block {
        /// Campaign ID
        id: i64,

        /// Category IDs, comma separated
        #[arg(long, value_delimiter = ',', required = true)]
        categories: Vec<i64>,
    },
}

impl CampaignsCommand {
    /// Run the campaign action
    pub async fn execute(&self, cli: &Cli, ctx: &RequestContext) -> Result<(), CliError> {
        let client = cli.client()?;
        let campaigns = client.campaigns();

        match &self.action {
            CampaignsAction::List { status, search, page } => {
                let options = CampaignListOptions {
                    status: *status,
                    custom_search: search.clone(),
                    order_by: page.order_by.clone(),
                    list: page.list(),
                };
                print_json(&campaigns.list(ctx, &options).await?)
            }
            CampaignsAction::Get { id, detailed } => {
                print_json(&campaigns.get(ctx, *id, *detailed).await?)
            }
            CampaignsAction::Target { id, categories } => {
                campaigns
                    .toggle_categories(ctx, *id, categories, TargetingType::Target)
                    .await?;
                info!(campaign_id = id, count = categories.len(), "Categories targeted");
                Ok(())
            }
            CampaignsAction::Block { id, categories } => {
                campaigns
                    .toggle_categories(ctx, *id, categories, TargetingType::Block)
                    .await?;
                info!(campaign_id = id, count = categories.len(), "Categories blocked");
                Ok(())
            }
        }
    }
}

/// `exoclick files`
#[derive(Args, Debug)]
pub struct FilesArgs {
    /// File type: image, video or video_banner
    #[arg(long = "type")]
    pub file_type: FileType,

    /// Include archived files
    #[arg(long, default_value_t = false)]
    pub show_archived: bool,

    #[command(flatten)]
    pub page: PageArgs,
}

impl FilesArgs {
    /// List library files
    pub async fn execute(&self, cli: &Cli, ctx: &RequestContext) -> Result<(), CliError> {
        let client = cli.client()?;
        let options = FileListOptions {
            show_archived: self.show_archived,
            order_by: self.page.order_by.clone(),
            list: self.page.list(),
            ..FileListOptions::new(self.file_type)
        };
        print_json(&client.files().list(ctx, &options).await?)
    }
}

/// List content categories
pub async fn list_categories(cli: &Cli, ctx: &RequestContext, page: &PageArgs) -> Result<(), CliError> {
    let client = cli.client()?;
    let options = CategoryListOptions {
        order_by: page.order_by.clone(),
        list: page.list(),
    };
    print_json(&client.categories().list(ctx, &options).await?)
}

/// List marketplace zones
pub async fn list_marketplace(cli: &Cli, ctx: &RequestContext, page: &PageArgs) -> Result<(), CliError> {
    let client = cli.client()?;
    let options = MarketplaceListOptions {
        order_by: page.order_by.clone(),
        list: page.list(),
    };
    print_json(&client.marketplace().list(ctx, &options).await?)
}
