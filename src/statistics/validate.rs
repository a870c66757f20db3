//! Cross-field rules for statistics queries
//!
//! Rules are checked in a fixed order and the first violation is reported.

use chrono::NaiveDate;

use super::{StatisticsField, StatisticsQuery};

/// Maximum number of `group_by` columns
pub const MAX_GROUP_BY: usize = 4;
/// Maximum number of `order_by` entries
pub const MAX_ORDER_BY: usize = 2;

/// Query rule violations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// `date_from` is after `date_to`
    #[error("date from ({from}) must be before or equal to date to ({to})")]
    DateRange {
        /// Start of the range
        from: NaiveDate,
        /// End of the range
        to: NaiveDate,
    },

    /// Hour filter without a timezone
    #[error("timezone must be set if filter hour is set")]
    HourWithoutTimezone,

    /// Hour outside 0-23
    #[error("invalid hour: hour must be between 0 and 23, but got {0}")]
    HourOutOfRange(i32),

    /// Too many grouping columns
    #[error("invalid group by: maximum of {} fields allowed, but got {}", MAX_GROUP_BY, .0)]
    TooManyGroupBy(usize),

    /// Too many sort entries
    #[error("invalid order by: maximum of {} fields allowed, but got {}", MAX_ORDER_BY, .0)]
    TooManyOrderBy(usize),

    /// No output columns
    #[error("invalid output csv fields: minimum of 1 field required")]
    NoOutputFields,

    /// Name column requested without detailed mode
    #[error("\"{0}\" field requires detailed enabled")]
    RequiresDetailed(StatisticsField),

    /// Column that cannot be grouped by
    #[error("invalid group by field: \"{0}\"")]
    NotGroupable(StatisticsField),

    /// Grouping column missing from the output
    #[error("invalid output csv fields: must contain all group by fields, but \"{0}\" is missing")]
    GroupByNotInOutput(StatisticsField),

    /// Sort entry without a column
    #[error("missing order by field")]
    MissingOrderByField,

    /// Sort entry without a direction
    #[error("missing order by direction")]
    MissingOrderByDirection,

    /// Sort column missing from the output
    #[error("invalid output csv fields: must contain all order by fields, but \"{0}\" is missing")]
    OrderByNotInOutput(StatisticsField),
}

/// Check `query` against every rule, in order. Never mutates the query.
pub fn validate(query: &StatisticsQuery) -> Result<(), ValidationError> {
    let filter = &query.filter;

    if filter.date_from > filter.date_to {
        return Err(ValidationError::DateRange {
            from: filter.date_from,
            to: filter.date_to,
        });
    }

    if !filter.hours.is_empty() && query.timezone.is_none() {
        return Err(ValidationError::HourWithoutTimezone);
    }

    if let Some(hour) = filter.hours.iter().find(|h| !(0..=23).contains(*h)) {
        return Err(ValidationError::HourOutOfRange(*hour));
    }

    if query.group_by.len() > MAX_GROUP_BY {
        return Err(ValidationError::TooManyGroupBy(query.group_by.len()));
    }

    if query.order_by.len() > MAX_ORDER_BY {
        return Err(ValidationError::TooManyOrderBy(query.order_by.len()));
    }

    if query.output_fields.is_empty() {
        return Err(ValidationError::NoOutputFields);
    }

    if !query.detailed {
        if let Some(field) = query.output_fields.iter().find(|f| f.requires_detailed()) {
            return Err(ValidationError::RequiresDetailed(*field));
        }
    }

    for field in &query.group_by {
        if !field.is_groupable() {
            return Err(ValidationError::NotGroupable(*field));
        }
        if !query.output_fields.contains(field) {
            return Err(ValidationError::GroupByNotInOutput(*field));
        }
    }

    for order in &query.order_by {
        let field = order.field.ok_or(ValidationError::MissingOrderByField)?;
        if order.direction.is_none() {
            return Err(ValidationError::MissingOrderByDirection);
        }
        if !query.output_fields.contains(&field) {
            return Err(ValidationError::OrderByNotInOutput(field));
        }
    }

    Ok(())
}
