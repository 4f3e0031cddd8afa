//! JSON:API response documents.
//!
//! Every OpenGov response has the same envelope: the primary `data` (one resource or a
//! list), optional side-loaded `included` resources, pagination `links` and `meta`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Primary data: a single resource or a list of them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PrimaryData<T> {
    /// A collection.
    Many(Vec<T>),
    /// A single resource.
    One(T),
}

/// A JSON:API resource object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(
    serialize = "A: Serialize",
    deserialize = "A: Deserialize<'de> + Default"
))]
pub struct Resource<A = Value> {
    /// Resource id.
    pub id: String,
    /// Resource type, e.g. `"records"`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Resource attributes.
    #[serde(default)]
    pub attributes: A,
    /// Relationships, left as raw JSON.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relationships: Option<Map<String, Value>>,
    /// Resource-level links.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links: Option<Links>,
}

/// Links object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Links {
    /// Link to the current document.
    #[serde(rename = "self", default, skip_serializing_if = "Option::is_none")]
    pub self_link: Option<String>,
    /// Link to a related resource.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub related: Option<String>,
    /// First page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first: Option<String>,
    /// Previous page, absent on the first one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prev: Option<String>,
    /// Next page, absent or empty on the last one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
    /// Last page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last: Option<String>,
}

/// Pagination metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meta {
    /// Current page number (1-based).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u64>,
    /// Page size.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    /// Total number of pages.
    #[serde(
        rename = "totalPages",
        alias = "total_pages",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub total_pages: Option<u64>,
    /// Total number of records across all pages.
    #[serde(
        rename = "totalRecords",
        alias = "total_records",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub total_records: Option<u64>,
}

/// A JSON:API document, as returned by list and get endpoints.
///
/// # Examples
///
/// ```
/// use opengov_api::Document;
///
/// let doc: Document = serde_json::from_str(r#"{
///     "data": [{"id": "1", "type": "records", "attributes": {"name": "Fence permit"}}],
///     "links": {"self": "/records?page[number]=1", "next": "/records?page[number]=2"},
///     "meta": {"page": 1, "size": 1, "totalPages": 2, "totalRecords": 2}
/// }"#).unwrap();
///
/// assert_eq!(doc.items().len(), 1);
/// assert!(doc.has_next_page());
/// assert_eq!(doc.total_records(), Some(2));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(serialize = "T: Serialize", deserialize = "T: Deserialize<'de>"))]
pub struct Document<T = Resource> {
    /// Primary data; absent or `null` for empty documents.
    #[serde(default)]
    pub data: Option<PrimaryData<T>>,
    /// Side-loaded resources requested with `include`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub included: Option<Vec<Value>>,
    /// Pagination links.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links: Option<Links>,
    /// Pagination metadata.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Meta>,
}

impl<T> Document<T> {
    /// The primary resources, in server order. A single resource yields a one-element slice.
    pub fn items(&self) -> &[T] {
        match &self.data {
            Some(PrimaryData::Many(items)) => items,
            Some(PrimaryData::One(item)) => std::slice::from_ref(item),
            None => &[],
        }
    }

    /// Consumes the document, returning its primary resources.
    pub fn into_items(self) -> Vec<T> {
        match self.data {
            Some(PrimaryData::Many(items)) => items,
            Some(PrimaryData::One(item)) => vec![item],
            None => Vec::new(),
        }
    }

    /// Returns `true` iff `links.next` is present and non-empty.
    pub fn has_next_page(&self) -> bool {
        self.next_page_url().is_some_and(|next| !next.is_empty())
    }

    /// Returns `true` iff `links.prev` is present and non-empty.
    pub fn has_prev_page(&self) -> bool {
        self.prev_page_url().is_some_and(|prev| !prev.is_empty())
    }

    /// `meta.page`, the 1-based page number.
    pub fn current_page(&self) -> Option<u64> {
        self.meta.as_ref()?.page
    }

    /// `meta.size`.
    pub fn page_size(&self) -> Option<u64> {
        self.meta.as_ref()?.size
    }

    /// `meta.totalPages`.
    pub fn total_pages(&self) -> Option<u64> {
        self.meta.as_ref()?.total_pages
    }

    /// `meta.totalRecords`.
    pub fn total_records(&self) -> Option<u64> {
        self.meta.as_ref()?.total_records
    }

    /// The raw `links.next` value.
    pub fn next_page_url(&self) -> Option<&str> {
        self.links.as_ref()?.next.as_deref()
    }

    /// The raw `links.prev` value.
    pub fn prev_page_url(&self) -> Option<&str> {
        self.links.as_ref()?.prev.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_single_resource_document() {
        let doc: Document = serde_json::from_value(json!({
            "data": {"id": "u-1", "type": "users", "attributes": {"firstName": "Jane"}}
        }))
        .unwrap();

        assert_eq!(doc.items().len(), 1);
        assert_eq!(doc.items()[0].kind, "users");
        assert_eq!(doc.items()[0].attributes["firstName"], "Jane");
        assert!(!doc.has_next_page());
        assert_eq!(doc.current_page(), None);
    }

    #[test]
    fn test_empty_and_null_data() {
        let doc: Document = serde_json::from_value(json!({"data": []})).unwrap();
        assert!(doc.items().is_empty());

        let doc: Document = serde_json::from_value(json!({"data": null})).unwrap();
        assert!(doc.into_items().is_empty());

        let doc: Document = serde_json::from_value(json!({"meta": {"page": 1}})).unwrap();
        assert!(doc.items().is_empty());
    }

    #[test]
    fn test_empty_next_link_is_not_a_next_page() {
        let doc: Document = serde_json::from_value(json!({
            "data": [],
            "links": {"self": "/records", "next": ""}
        }))
        .unwrap();
        assert!(!doc.has_next_page());

        let doc: Document = serde_json::from_value(json!({
            "data": [],
            "links": {"next": null, "prev": "/records?page[number]=1"}
        }))
        .unwrap();
        assert!(!doc.has_next_page());
        assert!(doc.has_prev_page());
    }

    #[test]
    fn test_meta_accepts_both_spellings() {
        let camel: Meta = serde_json::from_value(json!({"totalPages": 3, "totalRecords": 42})).unwrap();
        let snake: Meta = serde_json::from_value(json!({"total_pages": 3, "total_records": 42})).unwrap();
        assert_eq!(camel, snake);
        assert_eq!(camel.total_pages, Some(3));
    }

    #[test]
    fn test_resource_without_attributes() {
        let resource: Resource = serde_json::from_value(json!({
            "id": "g-1",
            "type": "guests",
            "relationships": {"user": {"data": {"id": "u-1", "type": "users"}}}
        }))
        .unwrap();
        assert_eq!(resource.attributes, Value::Null);
        assert!(resource.relationships.unwrap().contains_key("user"));
    }

    #[test]
    fn test_document_of_non_default_resources() {
        #[derive(Debug, Default, Deserialize)]
        struct Permit {
            number: String,
        }

        let doc: Document<Resource<Permit>> = serde_json::from_value(json!({
            "data": [{"id": "r-1", "type": "records", "attributes": {"number": "BLD-1"}}]
        }))
        .unwrap();
        assert_eq!(doc.items()[0].attributes.number, "BLD-1");

        let doc: Document<Resource<Permit>> = serde_json::from_value(json!({"meta": {}})).unwrap();
        assert!(doc.items().is_empty());
    }

    #[test]
    fn test_included_is_kept() {
        let doc: Document = serde_json::from_value(json!({
            "data": [{"id": "r-1", "type": "records", "attributes": {}}],
            "included": [{"id": "u-1", "type": "users"}]
        }))
        .unwrap();
        assert_eq!(doc.included.unwrap().len(), 1);
    }
}
