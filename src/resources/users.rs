//! `/users`

use super::{iter_collection, list_request};
use crate::params::{ListParams, PageParams, DEFAULT_ITER_PAGE_SIZE};
use crate::{Client, Document, RequestDescriptor, Resource, Result};
use futures::Stream;
use serde_json::Value;

/// Lists one page of users.
pub async fn list_users(client: &Client, page: PageParams) -> Result<Document> {
    client
        .execute_as(&list_request("users", &ListParams::new(), page))
        .await
}

/// Streams every user, 100 per request.
pub fn iter_users(client: &Client) -> impl Stream<Item = Result<Resource>> {
    iter_collection(client, "users", ListParams::new(), DEFAULT_ITER_PAGE_SIZE)
}

/// Fetches one user.
pub async fn get_user(client: &Client, user_id: &str) -> Result<Document> {
    client
        .execute_as(&RequestDescriptor::get(format!("users/{}", user_id)))
        .await
}

/// Creates a user from a JSON:API `{"data": {...}}` body.
pub async fn create_user(client: &Client, body: Value) -> Result<Document> {
    client
        .execute_as(&RequestDescriptor::post("users", body))
        .await
}

/// Lists the flags raised on a user.
pub async fn list_user_flags(client: &Client, user_id: &str) -> Result<Document> {
    client
        .execute_as(&RequestDescriptor::get(format!("users/{}/flags", user_id)))
        .await
}
