//! CSV decoding of the statistics export
//!
//! The server's header text is not used for field identity: column `i` is
//! always `output_fields[i]` of the query that produced the export. Only the
//! header's column count is checked.

use chrono::NaiveDate;
use csv::{ReaderBuilder, StringRecord, Trim};
use rust_decimal::Decimal;
use std::io::Read;
use std::str::FromStr;
use tracing::debug;

use super::{StatisticRecord, StatisticsField};

/// Response decoding errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    /// Header column count differs from the requested output fields
    #[error("invalid header count, expected: {expected}, got: {got}")]
    HeaderMismatch {
        /// Requested output fields
        expected: usize,
        /// Columns in the header row
        got: usize,
    },

    /// Data row column count differs from the requested output fields
    #[error("row {row}: expected {expected} columns, got {got}")]
    ColumnCount {
        /// 1-based data row
        row: usize,
        /// Requested output fields
        expected: usize,
        /// Columns in the row
        got: usize,
    },

    /// Cell that does not parse as its field's type
    #[error("row {row}, field \"{field}\": invalid value {value:?}")]
    InvalidValue {
        /// 1-based data row
        row: usize,
        /// Column the cell belongs to
        field: StatisticsField,
        /// Raw cell text
        value: String,
    },

    /// Malformed CSV
    #[error("CSV error: {0}")]
    Csv(String),
}

/// Decode a statistics export whose columns are `output_fields`, in order.
///
/// An empty body yields no records.
pub fn decode_statistics<R: Read>(
    reader: R,
    output_fields: &[StatisticsField],
) -> Result<Vec<StatisticRecord>, DecodeError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(reader);

    let header = reader
        .headers()
        .map_err(|e| DecodeError::Csv(format!("failed to read header: {e}")))?;

    if header.is_empty() {
        debug!("Statistics export is empty");
        return Ok(Vec::new());
    }

    if header.len() != output_fields.len() {
        return Err(DecodeError::HeaderMismatch {
            expected: output_fields.len(),
            got: header.len(),
        });
    }

    let mut records = Vec::new();
    let mut row = StringRecord::new();
    let mut index = 0;

    while reader
        .read_record(&mut row)
        .map_err(|e| DecodeError::Csv(format!("failed to read row {}: {e}", index + 1)))?
    {
        index += 1;
        records.push(decode_row(&row, index, output_fields)?);
    }

    debug!("Decoded {} statistics rows", records.len());
    Ok(records)
}

fn decode_row(
    row: &StringRecord,
    index: usize,
    output_fields: &[StatisticsField],
) -> Result<StatisticRecord, DecodeError> {
    if row.len() != output_fields.len() {
        return Err(DecodeError::ColumnCount {
            row: index,
            expected: output_fields.len(),
            got: row.len(),
        });
    }

    let mut record = StatisticRecord::default();
    for (field, raw) in output_fields.iter().zip(row.iter()) {
        if raw.is_empty() {
            continue;
        }
        assign(&mut record, *field, raw).ok_or_else(|| DecodeError::InvalidValue {
            row: index,
            field: *field,
            value: raw.to_string(),
        })?;
    }

    Ok(record)
}

/// Store `raw` into the slot for `field`. `None` when the text does not parse.
fn assign(record: &mut StatisticRecord, field: StatisticsField, raw: &str) -> Option<()> {
    match field {
        StatisticsField::Date => record.date = Some(parse_date(raw)?),
        StatisticsField::Hour => record.hour = Some(raw.parse::<u8>().ok().filter(|h| *h < 24)?),
        StatisticsField::CampaignId => record.campaign_id = Some(raw.parse().ok()?),
        StatisticsField::VariationId => record.variation_id = Some(raw.parse().ok()?),
        StatisticsField::SiteId => record.site_id = Some(raw.parse().ok()?),
        StatisticsField::SiteName => record.site_name = Some(raw.to_string()),
        StatisticsField::ZoneId => record.zone_id = Some(raw.parse().ok()?),
        StatisticsField::ZoneName => record.zone_name = Some(raw.to_string()),
        StatisticsField::CategoryId => record.category_id = Some(raw.parse().ok()?),
        StatisticsField::Clicks => record.clicks = raw.parse().ok()?,
        StatisticsField::Impressions => record.impressions = raw.parse().ok()?,
        StatisticsField::VideoImpressions => record.video_impressions = raw.parse().ok()?,
        StatisticsField::VideoViews => record.video_views = raw.parse().ok()?,
        StatisticsField::G1 => record.g1 = raw.parse().ok()?,
        StatisticsField::G5 => record.g5 = raw.parse().ok()?,
        StatisticsField::Cost => record.cost = parse_cost(raw)?,
    }
    Some(())
}

/// `YYYY-MM-DD`, optionally followed by a time part
fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| NaiveDate::parse_from_str(raw.get(..10)?, "%Y-%m-%d").ok())
}

/// Decimal amount, tolerating thousands separators (`1,234.56`)
pub fn parse_cost(raw: &str) -> Option<Decimal> {
    let cleaned: String = raw.chars().filter(|c| *c != ',').collect();
    Decimal::from_str(&cleaned).ok()
}
