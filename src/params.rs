//! Query parameters: pagination, filters and JSON:API options.
//!
//! Filters render as `filter[{field}]=value`, or `filter[{field}][gt|gte|lt|lte]=value`
//! for date ranges. `include`, `fields[...]` and `sort` are passed through untouched.

use crate::{Error, Result};
use chrono::{DateTime, Duration as ChronoDuration, NaiveDate, Utc};
use std::collections::BTreeMap;

/// Largest page the API serves.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Page size for single-page list calls.
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Page size used when iterating over every page.
pub const DEFAULT_ITER_PAGE_SIZE: u32 = 100;

/// Which page to fetch, and how big it is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageParams {
    number: u32,
    size: u32,
}

impl PageParams {
    /// Validated page parameters.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if `number` is 0 or `size` is outside `1..=100`.
    ///
    /// ```
    /// use opengov_api::PageParams;
    ///
    /// assert!(PageParams::new(1, 50).is_ok());
    /// assert!(PageParams::new(0, 50).is_err());
    /// assert!(PageParams::new(1, 101).is_err());
    /// ```
    pub fn new(number: u32, size: u32) -> Result<Self> {
        if number == 0 {
            return Err(Error::Configuration(
                "page number must be at least 1".to_string(),
            ));
        }
        if !(1..=MAX_PAGE_SIZE).contains(&size) {
            return Err(Error::Configuration(format!(
                "page size must be between 1 and {}, got {}",
                MAX_PAGE_SIZE, size
            )));
        }
        Ok(Self { number, size })
    }

    /// First page of the given size.
    ///
    /// # Errors
    ///
    /// As [`PageParams::new`].
    pub fn first(size: u32) -> Result<Self> {
        Self::new(1, size)
    }

    /// 1-based page number.
    pub fn number(&self) -> u32 {
        self.number
    }

    /// Page size.
    pub fn size(&self) -> u32 {
        self.size
    }

    /// The following page, same size.
    pub fn next(self) -> Self {
        Self {
            number: self.number.saturating_add(1),
            size: self.size,
        }
    }

    /// `page[number]` and `page[size]`.
    pub fn to_query_pairs(&self) -> Vec<(String, String)> {
        vec![
            ("page[number]".to_string(), self.number.to_string()),
            ("page[size]".to_string(), self.size.to_string()),
        ]
    }
}

impl Default for PageParams {
    fn default() -> Self {
        Self {
            number: 1,
            size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// A calendar date or an instant, rendered as ISO-8601.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateValue {
    /// `YYYY-MM-DD`
    Date(NaiveDate),
    /// RFC 3339 timestamp in UTC.
    DateTime(DateTime<Utc>),
}

impl DateValue {
    /// `YYYY-MM-DD` for dates, RFC 3339 for instants.
    pub fn to_iso8601(&self) -> String {
        match self {
            DateValue::Date(date) => date.format("%Y-%m-%d").to_string(),
            DateValue::DateTime(instant) => instant.to_rfc3339(),
        }
    }
}

impl From<NaiveDate> for DateValue {
    fn from(date: NaiveDate) -> Self {
        DateValue::Date(date)
    }
}

impl From<DateTime<Utc>> for DateValue {
    fn from(instant: DateTime<Utc>) -> Self {
        DateValue::DateTime(instant)
    }
}

/// A date range with optional bounds on either side.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use opengov_api::params::DateRangeFilter;
///
/// let q1 = DateRangeFilter::new()
///     .gte(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap())
///     .lt(NaiveDate::from_ymd_opt(2025, 4, 1).unwrap());
///
/// assert_eq!(
///     q1.to_query_pairs("createdAt"),
///     vec![
///         ("filter[createdAt][gte]".to_string(), "2025-01-01".to_string()),
///         ("filter[createdAt][lt]".to_string(), "2025-04-01".to_string()),
///     ]
/// );
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRangeFilter {
    /// Strictly after.
    pub gt: Option<DateValue>,
    /// On or after.
    pub gte: Option<DateValue>,
    /// Strictly before.
    pub lt: Option<DateValue>,
    /// On or before.
    pub lte: Option<DateValue>,
}

impl DateRangeFilter {
    /// An unbounded range.
    pub fn new() -> Self {
        Self::default()
    }

    /// Strictly after `value`.
    pub fn gt(mut self, value: impl Into<DateValue>) -> Self {
        self.gt = Some(value.into());
        self
    }

    /// On or after `value`.
    pub fn gte(mut self, value: impl Into<DateValue>) -> Self {
        self.gte = Some(value.into());
        self
    }

    /// Strictly before `value`.
    pub fn lt(mut self, value: impl Into<DateValue>) -> Self {
        self.lt = Some(value.into());
        self
    }

    /// On or before `value`.
    pub fn lte(mut self, value: impl Into<DateValue>) -> Self {
        self.lte = Some(value.into());
        self
    }

    /// The last `days` days, up to now.
    pub fn last_days(days: i64) -> Self {
        Self::last_days_from(Utc::now(), days)
    }

    /// Older than `days` days.
    pub fn older_than_days(days: i64) -> Self {
        Self::older_than_days_from(Utc::now(), days)
    }

    /// Between `start_days_ago` and `end_days_ago` (0 = now), both inclusive.
    pub fn between_days(start_days_ago: i64, end_days_ago: i64) -> Self {
        Self::between_days_from(Utc::now(), start_days_ago, end_days_ago)
    }

    fn last_days_from(now: DateTime<Utc>, days: i64) -> Self {
        Self::new().gte(now - ChronoDuration::days(days))
    }

    fn older_than_days_from(now: DateTime<Utc>, days: i64) -> Self {
        Self::new().lt(now - ChronoDuration::days(days))
    }

    fn between_days_from(now: DateTime<Utc>, start_days_ago: i64, end_days_ago: i64) -> Self {
        Self::new()
            .gte(now - ChronoDuration::days(start_days_ago))
            .lte(now - ChronoDuration::days(end_days_ago))
    }

    /// Renders the set bounds for `field`, in `gt, gte, lt, lte` order.
    pub fn to_query_pairs(&self, field: &str) -> Vec<(String, String)> {
        [
            ("gt", self.gt),
            ("gte", self.gte),
            ("lt", self.lt),
            ("lte", self.lte),
        ]
        .into_iter()
        .filter_map(|(op, value)| {
            value.map(|v| (format!("filter[{}][{}]", field, op), v.to_iso8601()))
        })
        .collect()
    }
}

/// A date filter: either an exact value or a range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateFilter {
    /// `filter[field]=value`
    On(DateValue),
    /// `filter[field][op]=value` for each bound.
    Range(DateRangeFilter),
}

impl From<DateRangeFilter> for DateFilter {
    fn from(range: DateRangeFilter) -> Self {
        DateFilter::Range(range)
    }
}

impl From<NaiveDate> for DateFilter {
    fn from(date: NaiveDate) -> Self {
        DateFilter::On(date.into())
    }
}

impl From<DateTime<Utc>> for DateFilter {
    fn from(instant: DateTime<Utc>) -> Self {
        DateFilter::On(instant.into())
    }
}

/// Parameters for a list endpoint.
///
/// # Examples
///
/// ```
/// use opengov_api::{ListParams, PageParams};
///
/// let params = ListParams::new()
///     .filter("status", "ACTIVE")
///     .filter_bool("isEnabled", true)
///     .page(PageParams::new(2, 50).unwrap())
///     .include(["applicant", "type"])
///     .sort("-createdAt");
///
/// let pairs = params.to_query_pairs();
/// assert!(pairs.contains(&("filter[status]".into(), "ACTIVE".into())));
/// assert!(pairs.contains(&("page[number]".into(), "2".into())));
/// assert!(pairs.contains(&("include".into(), "applicant,type".into())));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListParams {
    filters: Vec<(String, String)>,
    page: PageParams,
    include: Vec<String>,
    fields: BTreeMap<String, Vec<String>>,
    sort: Option<String>,
}

impl ListParams {
    /// No filters, first page of 20.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an equality filter.
    pub fn filter(mut self, field: &str, value: impl Into<String>) -> Self {
        self.filters
            .push((format!("filter[{}]", field), value.into()));
        self
    }

    /// Adds a boolean filter, rendered as `true` / `false`.
    pub fn filter_bool(self, field: &str, value: bool) -> Self {
        self.filter(field, value.to_string())
    }

    /// Adds an exact-date or date-range filter.
    pub fn filter_date(mut self, field: &str, value: impl Into<DateFilter>) -> Self {
        match value.into() {
            DateFilter::On(date) => {
                self.filters
                    .push((format!("filter[{}]", field), date.to_iso8601()));
            }
            DateFilter::Range(range) => self.filters.extend(range.to_query_pairs(field)),
        }
        self
    }

    /// Sets the page to request.
    pub fn page(mut self, page: PageParams) -> Self {
        self.page = page;
        self
    }

    /// Related resources to side-load.
    pub fn include<I, S>(mut self, relationships: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.include.extend(relationships.into_iter().map(Into::into));
        self
    }

    /// Sparse fieldset for one resource type.
    pub fn fields<I, S>(mut self, resource_type: impl Into<String>, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields.insert(
            resource_type.into(),
            fields.into_iter().map(Into::into).collect(),
        );
        self
    }

    /// Sort expression, e.g. `-createdAt`.
    pub fn sort(mut self, sort: impl Into<String>) -> Self {
        self.sort = Some(sort.into());
        self
    }

    /// The page these parameters currently point at.
    pub fn current_page(&self) -> PageParams {
        self.page
    }

    /// Renders filters, page, include, fields and sort, in that order.
    pub fn to_query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = self.filters.clone();
        pairs.extend(self.page.to_query_pairs());
        if !self.include.is_empty() {
            pairs.push(("include".to_string(), self.include.join(",")));
        }
        for (resource_type, fields) in &self.fields {
            pairs.push((format!("fields[{}]", resource_type), fields.join(",")));
        }
        if let Some(sort) = &self.sort {
            pairs.push(("sort".to_string(), sort.clone()));
        }
        pairs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn pair(key: &str, value: &str) -> (String, String) {
        (key.to_string(), value.to_string())
    }

    #[test]
    fn test_page_defaults_and_next() {
        let page = PageParams::default();
        assert_eq!((page.number(), page.size()), (1, 20));

        let next = page.next();
        assert_eq!((next.number(), next.size()), (2, 20));
        assert_eq!(
            next.to_query_pairs(),
            vec![pair("page[number]", "2"), pair("page[size]", "20")]
        );
    }

    #[test]
    fn test_page_bounds() {
        assert!(PageParams::new(1, 1).is_ok());
        assert!(PageParams::new(1, 100).is_ok());
        assert!(matches!(PageParams::new(1, 0), Err(Error::Configuration(_))));
        assert!(matches!(PageParams::first(500), Err(Error::Configuration(_))));
    }

    #[test]
    fn test_datetime_renders_rfc3339() {
        let instant = Utc.with_ymd_and_hms(2025, 3, 1, 10, 30, 0).unwrap();
        assert_eq!(
            DateValue::from(instant).to_iso8601(),
            "2025-03-01T10:30:00+00:00"
        );
    }

    #[test]
    fn test_relative_ranges() {
        let now = Utc.with_ymd_and_hms(2025, 6, 30, 0, 0, 0).unwrap();

        let recent = DateRangeFilter::last_days_from(now, 30);
        assert_eq!(
            recent.to_query_pairs("createdAt"),
            vec![pair("filter[createdAt][gte]", "2025-05-31T00:00:00+00:00")]
        );

        let stale = DateRangeFilter::older_than_days_from(now, 90);
        assert_eq!(stale.lt, Some(DateValue::DateTime(now - ChronoDuration::days(90))));
        assert_eq!(stale.gte, None);

        let window = DateRangeFilter::between_days_from(now, 7, 0);
        assert_eq!(window.lte, Some(DateValue::DateTime(now)));
        assert_eq!(
            window.gte,
            Some(DateValue::DateTime(now - ChronoDuration::days(7)))
        );
    }

    #[test]
    fn test_full_list_params_rendering() {
        let params = ListParams::new()
            .filter("number", "BLD-1")
            .filter_bool("isEnabled", false)
            .filter_date("expiresAt", NaiveDate::from_ymd_opt(2025, 12, 31).unwrap())
            .filter_date(
                "createdAt",
                DateRangeFilter::new().gt(NaiveDate::from_ymd_opt(2025, 3, 1).unwrap()),
            )
            .page(PageParams::new(3, 10).unwrap())
            .include(["applicant"])
            .fields("records", ["name", "number"])
            .sort("number");

        assert_eq!(
            params.to_query_pairs(),
            vec![
                pair("filter[number]", "BLD-1"),
                pair("filter[isEnabled]", "false"),
                pair("filter[expiresAt]", "2025-12-31"),
                pair("filter[createdAt][gt]", "2025-03-01"),
                pair("page[number]", "3"),
                pair("page[size]", "10"),
                pair("include", "applicant"),
                pair("fields[records]", "name,number"),
                pair("sort", "number"),
            ]
        );
    }
}
