//! Endpoint wrappers.
//!
//! Each function here only builds a [`RequestDescriptor`] and hands it to the
//! [`Client`]; retries, error mapping and decoding happen there. List endpoints also get
//! an `iter_*` variant that walks every page through [`paginate`].

pub mod locations;
pub mod records;
pub mod users;

use crate::pagination::paginate;
use crate::params::{ListParams, PageParams};
use crate::{Client, Document, RequestDescriptor, Result};
use futures::Stream;
use serde::de::DeserializeOwned;

fn list_request(path: &str, params: &ListParams, page: PageParams) -> RequestDescriptor {
    RequestDescriptor::get(path).with_query_params(params.clone().page(page).to_query_pairs())
}

/// Streams every item of the collection at `path`, `page_size` items per request.
fn iter_collection<T>(
    client: &Client,
    path: &'static str,
    params: ListParams,
    page_size: u32,
) -> impl Stream<Item = Result<T>>
where
    T: DeserializeOwned,
{
    let client = client.clone();
    paginate(page_size, move |page| {
        let client = client.clone();
        let request = list_request(path, &params, page);
        async move { client.execute_as::<Document<T>>(&request).await }
    })
}
