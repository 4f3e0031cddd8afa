//! `/locations`

use crate::{Client, Document, RequestDescriptor, Result};
use serde_json::Value;

/// Lists locations.
pub async fn list_locations(client: &Client) -> Result<Document> {
    client.execute_as(&RequestDescriptor::get("locations")).await
}

/// Fetches one location.
pub async fn get_location(client: &Client, location_id: &str) -> Result<Document> {
    client
        .execute_as(&RequestDescriptor::get(format!("locations/{}", location_id)))
        .await
}

/// Creates a location from a JSON:API `{"data": {...}}` body.
pub async fn create_location(client: &Client, body: Value) -> Result<Document> {
    client
        .execute_as(&RequestDescriptor::post("locations", body))
        .await
}

/// Applies a partial update (`PATCH`).
pub async fn update_location(client: &Client, location_id: &str, body: Value) -> Result<Document> {
    client
        .execute_as(&RequestDescriptor::patch(
            format!("locations/{}", location_id),
            body,
        ))
        .await
}

/// Deletes a location. The endpoint returns no body.
pub async fn delete_location(client: &Client, location_id: &str) -> Result<()> {
    client.delete(format!("locations/{}", location_id)).await
}

/// Lists the flags raised on a location.
pub async fn list_location_flags(client: &Client, location_id: &str) -> Result<Document> {
    client
        .execute_as(&RequestDescriptor::get(format!(
            "locations/{}/flags",
            location_id
        )))
        .await
}
