//! Statistics export command

use chrono::NaiveDate;
use clap::Parser;
use std::io::BufWriter;
use std::path::PathBuf;
use tracing::info;

use super::{print_json, Cli, CliError};
use crate::client::ListOptions;
use crate::context::RequestContext;
use crate::output::{OutputWriter, StatisticsCsvWriter, StatisticsWriter};
use crate::statistics::{validate, OrderBy, StatisticsField, StatisticsQuery};

/// Arguments of `exoclick stats`
#[derive(Parser, Debug)]
pub struct StatsArgs {
    /// First day (YYYY-MM-DD), inclusive
    #[arg(long)]
    pub from: NaiveDate,

    /// Last day (YYYY-MM-DD), inclusive
    #[arg(long)]
    pub to: NaiveDate,

    /// Output columns, comma separated (e.g. date,clicks,cost)
    #[arg(long, value_delimiter = ',', required = true)]
    pub fields: Vec<StatisticsField>,

    /// IANA timezone, required with --hour
    #[arg(long)]
    pub timezone: Option<String>,

    /// Keep only this hour of day (repeatable)
    #[arg(long = "hour", allow_negative_numbers = true)]
    pub hours: Vec<i32>,

    /// Grouping column (repeatable, up to 4)
    #[arg(long)]
    pub group_by: Vec<StatisticsField>,

    /// Sort entry `field[:asc|desc]` (repeatable, up to 2)
    #[arg(long)]
    pub order_by: Vec<OrderBy>,

    /// Restrict to one campaign
    #[arg(long)]
    pub campaign_id: Option<i64>,

    /// Restrict to one zone
    #[arg(long)]
    pub zone_id: Option<i64>,

    /// Restrict to one site
    #[arg(long)]
    pub site_id: Option<i64>,

    /// Leave out deleted entities
    #[arg(long, default_value_t = false)]
    pub exclude_deleted: bool,

    /// Resolve site and zone names
    #[arg(long, default_value_t = false)]
    pub detailed: bool,

    /// Maximum number of rows
    #[arg(long)]
    pub limit: Option<u32>,

    /// Rows to skip
    #[arg(long)]
    pub offset: Option<u32>,

    /// Write CSV here instead of stdout
    #[arg(long, short)]
    pub output: Option<PathBuf>,

    /// Validate and print the request body without sending it
    #[arg(long, default_value_t = false)]
    pub dry_run: bool,
}

impl StatsArgs {
    /// Query described by the arguments
    pub fn to_query(&self) -> StatisticsQuery {
        let mut query = StatisticsQuery::new(self.from, self.to, self.fields.clone())
            .detailed(self.detailed)
            .paging(ListOptions {
                limit: self.limit,
                offset: self.offset,
            });

        query.timezone = self.timezone.clone();
        query.filter.hours = self.hours.clone();
        query.filter.campaign_id = self.campaign_id;
        query.filter.zone_id = self.zone_id;
        query.filter.site_id = self.site_id;
        query.filter.exclude_deleted = self.exclude_deleted;
        query.group_by = self.group_by.clone();
        query.order_by = self.order_by.clone();
        query
    }

    /// Run the export
    pub async fn execute(&self, cli: &Cli, ctx: &RequestContext) -> Result<(), CliError> {
        let query = self.to_query();
        validate(&query)?;

        if self.dry_run {
            return print_json(&query);
        }

        let client = cli.client()?;
        let records = client.statistics().fetch(ctx, &query).await?;

        match &self.output {
            Some(path) => {
                let mut writer = StatisticsCsvWriter::create(path, query.output_fields.clone())?;
                writer.write_records(&records)?;
                writer.close()?;
                info!(rows = records.len(), path = %path.display(), "Statistics written");
            }
            None => {
                let stdout = BufWriter::new(std::io::stdout().lock());
                let mut writer = StatisticsCsvWriter::new(stdout, query.output_fields.clone());
                writer.write_records(&records)?;
                writer.close()?;
            }
        }

        Ok(())
    }
}
