//! Statistics query rules

use chrono::NaiveDate;
use exoclick::statistics::{
    validate, OrderBy, SortDirection, StatisticsField, StatisticsQuery, ValidationError,
};

use StatisticsField::*;

fn query(fields: Vec<StatisticsField>) -> StatisticsQuery {
    StatisticsQuery::new(
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
        fields,
    )
}

#[test]
fn test_reversed_dates() {
    let q = StatisticsQuery::new(
        NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        vec![Clicks],
    );
    assert!(matches!(validate(&q), Err(ValidationError::DateRange { .. })));
}

#[test]
fn test_hours_in_range_with_timezone() {
    let q = query(vec![Clicks]).timezone("Europe/Madrid").hour(0).hour(23);
    assert_eq!(validate(&q), Ok(()));

    let q = query(vec![Clicks]).timezone("Europe/Madrid").hour(24);
    assert_eq!(validate(&q), Err(ValidationError::HourOutOfRange(24)));
}

#[test]
fn test_group_by_limit() {
    let q = query(vec![Date, CampaignId, SiteId, ZoneId, CategoryId])
        .group_by(Date)
        .group_by(CampaignId)
        .group_by(SiteId)
        .group_by(ZoneId);
    assert_eq!(validate(&q), Ok(()));

    let q = q.group_by(CategoryId);
    let err = validate(&q).unwrap_err();
    assert_eq!(err, ValidationError::TooManyGroupBy(5));
    assert_eq!(err.to_string(), "invalid group by: maximum of 4 fields allowed, but got 5");
}

#[test]
fn test_order_by_limit() {
    let q = query(vec![Clicks, Impressions, Cost])
        .order_by(OrderBy::desc(Clicks))
        .order_by(OrderBy::asc(Impressions))
        .order_by(OrderBy::asc(Cost));
    assert_eq!(validate(&q), Err(ValidationError::TooManyOrderBy(3)));
}

#[test]
fn test_no_output_fields() {
    assert_eq!(validate(&query(vec![])), Err(ValidationError::NoOutputFields));
}

#[test]
fn test_name_columns_need_detailed() {
    let q = query(vec![ZoneId, ZoneName]);
    assert_eq!(validate(&q), Err(ValidationError::RequiresDetailed(ZoneName)));
    assert_eq!(validate(&q.detailed(true)), Ok(()));

    let q = query(vec![SiteName]);
    assert_eq!(validate(&q), Err(ValidationError::RequiresDetailed(SiteName)));
}

#[test]
fn test_group_by_rules() {
    let q = query(vec![Clicks]).group_by(Clicks);
    assert_eq!(validate(&q), Err(ValidationError::NotGroupable(Clicks)));

    let q = query(vec![Clicks]).group_by(Date);
    assert_eq!(validate(&q), Err(ValidationError::GroupByNotInOutput(Date)));
}

#[test]
fn test_order_by_rules() {
    let q = query(vec![Clicks]).order_by(OrderBy {
        field: None,
        direction: Some(SortDirection::Asc),
    });
    assert_eq!(validate(&q), Err(ValidationError::MissingOrderByField));

    let q = query(vec![Clicks]).order_by(OrderBy::desc(Cost));
    assert_eq!(validate(&q), Err(ValidationError::OrderByNotInOutput(Cost)));
}

#[test]
fn test_validation_does_not_mutate() {
    let q = query(vec![Date, Clicks]).group_by(Date).order_by(OrderBy::desc(Clicks));
    let before = q.clone();
    validate(&q).unwrap();
    assert_eq!(q, before);
}
