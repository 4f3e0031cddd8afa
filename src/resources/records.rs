//! `/records`: permits, licenses and other applications.

use super::{iter_collection, list_request};
use crate::params::{
    DateFilter, ListParams, PageParams, DEFAULT_ITER_PAGE_SIZE, DEFAULT_PAGE_SIZE,
};
use crate::{Client, Document, RequestDescriptor, Resource, Result};
use chrono::{DateTime, Utc};
use futures::Stream;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Lifecycle state of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecordStatus {
    /// Halted before completion.
    Stopped,
    /// Not yet submitted.
    Draft,
    /// Submitted and in progress.
    Active,
    /// Issued or closed.
    Complete,
}

impl RecordStatus {
    /// The wire value, e.g. `"ACTIVE"`.
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordStatus::Stopped => "STOPPED",
            RecordStatus::Draft => "DRAFT",
            RecordStatus::Active => "ACTIVE",
            RecordStatus::Complete => "COMPLETE",
        }
    }
}

impl fmt::Display for RecordStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Record attributes. Every field is optional; unknown fields are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordAttributes {
    /// Display name.
    pub name: Option<String>,
    /// Record number, e.g. `BLD-2025-001`.
    pub number: Option<String>,
    /// Lifecycle state.
    pub status: Option<RecordStatus>,
    /// Id of the record in the legacy system.
    #[serde(rename = "histID")]
    pub hist_id: Option<String>,
    /// Number of the record in the legacy system.
    pub hist_number: Option<String>,
    /// Free-text description.
    pub description: Option<String>,
    /// Whether the record is enabled.
    pub is_enabled: Option<bool>,
    /// Creation time.
    pub created_at: Option<DateTime<Utc>>,
    /// Last modification time.
    pub updated_at: Option<DateTime<Utc>>,
    /// Submission time.
    pub submitted_at: Option<DateTime<Utc>>,
    /// Expiry time, for licenses.
    pub expires_at: Option<DateTime<Utc>>,
    /// Whether a renewal has been submitted.
    pub renewal_submitted: Option<bool>,
    /// Whether the record was submitted through the online portal.
    pub submitted_online: Option<bool>,
    /// Renewal sequence number.
    pub renewal_number: Option<String>,
}

/// A record resource.
pub type Record = Resource<RecordAttributes>;

/// Filters and options for listing records.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use opengov_api::params::DateRangeFilter;
/// use opengov_api::resources::records::{RecordQuery, RecordStatus};
///
/// let query = RecordQuery::new()
///     .status(RecordStatus::Active)
///     .created_at(DateRangeFilter::new().gt(NaiveDate::from_ymd_opt(2025, 3, 1).unwrap()))
///     .page_size(50);
///
/// let pairs = query.to_query_pairs().unwrap();
/// assert!(pairs.contains(&("filter[status]".into(), "ACTIVE".into())));
/// assert!(pairs.contains(&("filter[createdAt][gt]".into(), "2025-03-01".into())));
/// assert!(pairs.contains(&("page[size]".into(), "50".into())));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct RecordQuery {
    params: ListParams,
    page_number: u32,
    page_size: Option<u32>,
}

impl Default for RecordQuery {
    fn default() -> Self {
        Self {
            params: ListParams::new(),
            page_number: 1,
            page_size: None,
        }
    }
}

impl RecordQuery {
    /// No filters, first page.
    pub fn new() -> Self {
        Self::default()
    }

    fn with(mut self, f: impl FnOnce(ListParams) -> ListParams) -> Self {
        self.params = f(self.params);
        self
    }

    /// Filters on record number.
    pub fn number(self, number: impl Into<String>) -> Self {
        self.with(|p| p.filter("number", number))
    }

    /// Filters on legacy id.
    pub fn hist_id(self, hist_id: impl Into<String>) -> Self {
        self.with(|p| p.filter("histID", hist_id))
    }

    /// Filters on legacy number.
    pub fn hist_number(self, hist_number: impl Into<String>) -> Self {
        self.with(|p| p.filter("histNumber", hist_number))
    }

    /// Filters on record type.
    pub fn type_id(self, type_id: impl Into<String>) -> Self {
        self.with(|p| p.filter("typeID", type_id))
    }

    /// Filters on project.
    pub fn project_id(self, project_id: impl Into<String>) -> Self {
        self.with(|p| p.filter("projectID", project_id))
    }

    /// Filters on lifecycle state.
    pub fn status(self, status: RecordStatus) -> Self {
        self.with(|p| p.filter("status", status.as_str()))
    }

    /// Filters on creation date, exact or range.
    pub fn created_at(self, filter: impl Into<DateFilter>) -> Self {
        self.with(|p| p.filter_date("createdAt", filter))
    }

    /// Filters on modification date, exact or range.
    pub fn updated_at(self, filter: impl Into<DateFilter>) -> Self {
        self.with(|p| p.filter_date("updatedAt", filter))
    }

    /// Filters on submission date, exact or range.
    pub fn submitted_at(self, filter: impl Into<DateFilter>) -> Self {
        self.with(|p| p.filter_date("submittedAt", filter))
    }

    /// Filters on expiry date, exact or range.
    pub fn expires_at(self, filter: impl Into<DateFilter>) -> Self {
        self.with(|p| p.filter_date("expiresAt", filter))
    }

    /// Filters on the enabled flag.
    pub fn is_enabled(self, enabled: bool) -> Self {
        self.with(|p| p.filter_bool("isEnabled", enabled))
    }

    /// Filters on whether a renewal was submitted.
    pub fn renewal_submitted(self, submitted: bool) -> Self {
        self.with(|p| p.filter_bool("renewalSubmitted", submitted))
    }

    /// Filters on online submission.
    pub fn submitted_online(self, online: bool) -> Self {
        self.with(|p| p.filter_bool("submittedOnline", online))
    }

    /// Filters on renewal sequence number.
    pub fn renewal_number(self, renewal_number: impl Into<String>) -> Self {
        self.with(|p| p.filter("renewalNumber", renewal_number))
    }

    /// Renewals of the given record.
    pub fn renewal_of_record_id(self, record_id: impl Into<String>) -> Self {
        self.with(|p| p.filter("renewalOfRecordID", record_id))
    }

    /// Related resources to side-load.
    pub fn include<I, S>(self, relationships: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.with(|p| p.include(relationships))
    }

    /// Sparse fieldset for one resource type.
    pub fn fields<I, S>(self, resource_type: impl Into<String>, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.with(|p| p.fields(resource_type, fields))
    }

    /// Sort expression, e.g. `-createdAt`.
    pub fn sort(self, sort: impl Into<String>) -> Self {
        self.with(|p| p.sort(sort))
    }

    /// Page to fetch with [`list_records`]. Ignored by [`iter_records`].
    pub fn page_number(mut self, number: u32) -> Self {
        self.page_number = number;
        self
    }

    /// Page size; defaults to 20 for [`list_records`] and 100 for [`iter_records`].
    pub fn page_size(mut self, size: u32) -> Self {
        self.page_size = Some(size);
        self
    }

    fn page(&self) -> Result<PageParams> {
        PageParams::new(self.page_number, self.page_size.unwrap_or(DEFAULT_PAGE_SIZE))
    }

    /// Query string pairs for a single-page list call.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the page number or size is out of range.
    pub fn to_query_pairs(&self) -> Result<Vec<(String, String)>> {
        Ok(self.params.clone().page(self.page()?).to_query_pairs())
    }
}

/// Lists one page of records.
pub async fn list_records(client: &Client, query: &RecordQuery) -> Result<Document<Record>> {
    let request = list_request("records", &query.params, query.page()?);
    client.execute_as(&request).await
}

/// Streams every record matching `query`, fetching pages on demand.
///
/// # Examples
///
/// ```no_run
/// use futures::{pin_mut, StreamExt};
/// use opengov_api::resources::records::{iter_records, RecordQuery, RecordStatus};
/// use opengov_api::{Client, Configuration};
///
/// # async fn example() -> Result<(), opengov_api::Error> {
/// let client = Client::new(Configuration::from_env())?;
///
/// let records = iter_records(&client, RecordQuery::new().status(RecordStatus::Active));
/// pin_mut!(records);
/// while let Some(record) = records.next().await {
///     let record = record?;
///     println!("{:?}: {:?}", record.attributes.number, record.attributes.name);
/// }
/// # Ok(())
/// # }
/// ```
pub fn iter_records(client: &Client, query: RecordQuery) -> impl Stream<Item = Result<Record>> {
    let page_size = query.page_size.unwrap_or(DEFAULT_ITER_PAGE_SIZE);
    iter_collection(client, "records", query.params, page_size)
}

/// Fetches one record.
pub async fn get_record(client: &Client, record_id: &str) -> Result<Document<Record>> {
    client
        .execute_as(&RequestDescriptor::get(format!("records/{}", record_id)))
        .await
}

/// Creates a record from a JSON:API `{"data": {...}}` body.
pub async fn create_record(client: &Client, body: Value) -> Result<Document<Record>> {
    client
        .execute_as(&RequestDescriptor::post("records", body))
        .await
}

/// Applies a partial update (`PATCH`).
pub async fn update_record(client: &Client, record_id: &str, body: Value) -> Result<Document<Record>> {
    client
        .execute_as(&RequestDescriptor::patch(format!("records/{}", record_id), body))
        .await
}

/// Archives a record. The endpoint returns no body.
pub async fn archive_record(client: &Client, record_id: &str) -> Result<()> {
    client.delete(format!("records/{}", record_id)).await
}
