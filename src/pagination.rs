//! Lazy traversal of paginated list endpoints.
//!
//! [`paginate`] turns a "fetch page N" function into a [`Stream`] of items. Pages are
//! fetched one at a time, only when the consumer has drained the previous one, and
//! traversal stops at the first page without a `next` link. Each stream is single-pass;
//! to start over, call [`paginate`] again.
//!
//! Items are not de-duplicated. If the collection changes on the server between two
//! page fetches, items may be skipped or seen twice.

use crate::document::Document;
use crate::params::PageParams;
use crate::{Error, Result};
use futures::stream::{self, Stream};
use std::collections::VecDeque;
use std::future::Future;

struct Pager<T, F> {
    fetch: F,
    next_page: Option<PageParams>,
    buffer: VecDeque<T>,
    error: Option<Error>,
}

/// Streams every item of a paginated collection, starting at page 1.
///
/// `fetch` is called with the page to load and must return that page's document;
/// it is typically a list endpoint bound to a client and a set of filters.
///
/// An invalid `page_size` (outside `1..=100`) is reported as the stream's only item.
/// A failed fetch is yielded once and ends the stream.
///
/// # Examples
///
/// ```no_run
/// use futures::TryStreamExt;
/// use opengov_api::{pagination::paginate, Client, Configuration, Document, ListParams, RequestDescriptor};
///
/// # async fn example() -> Result<(), opengov_api::Error> {
/// let client = Client::new(Configuration::from_env())?;
///
/// let users = paginate(100, |page| {
///     let client = client.clone();
///     async move {
///         let request = RequestDescriptor::get("users")
///             .with_query_params(ListParams::new().page(page).to_query_pairs());
///         client.execute_as::<Document>(&request).await
///     }
/// });
///
/// let all: Vec<_> = users.try_collect().await?;
/// println!("{} users", all.len());
/// # Ok(())
/// # }
/// ```
pub fn paginate<T, F, Fut>(page_size: u32, fetch: F) -> impl Stream<Item = Result<T>>
where
    F: FnMut(PageParams) -> Fut,
    Fut: Future<Output = Result<Document<T>>>,
{
    let (next_page, error) = match PageParams::first(page_size) {
        Ok(page) => (Some(page), None),
        Err(e) => (None, Some(e)),
    };

    let pager = Pager {
        fetch,
        next_page,
        buffer: VecDeque::new(),
        error,
    };

    stream::try_unfold(pager, |mut pager| async move {
        if let Some(error) = pager.error.take() {
            return Err(error);
        }

        loop {
            if let Some(item) = pager.buffer.pop_front() {
                return Ok(Some((item, pager)));
            }

            let Some(page) = pager.next_page.take() else {
                return Ok(None);
            };

            tracing::debug!(page = page.number(), size = page.size(), "Fetching page");
            let document = (pager.fetch)(page).await?;
            let has_next = document.has_next_page();
            tracing::debug!(
                page = page.number(),
                items = document.items().len(),
                has_next = has_next,
                "Fetched page"
            );

            if has_next {
                pager.next_page = Some(page.next());
            }
            pager.buffer.extend(document.into_items());
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{Links, PrimaryData};
    use futures::StreamExt;
    use http::StatusCode;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    fn page(items: Vec<u32>, next: Option<&str>) -> Document<u32> {
        Document {
            data: Some(PrimaryData::Many(items)),
            included: None,
            links: Some(Links {
                next: next.map(str::to_owned),
                ..Default::default()
            }),
            meta: None,
        }
    }

    /// Serves `pages` in order and records which page params were requested.
    fn server(
        pages: Vec<Result<Document<u32>>>,
    ) -> (
        impl FnMut(PageParams) -> std::future::Ready<Result<Document<u32>>>,
        Arc<Mutex<Vec<PageParams>>>,
    ) {
        let requested = Arc::new(Mutex::new(Vec::new()));
        let log = requested.clone();
        let fetch = move |params: PageParams| {
            log.lock().unwrap().push(params);
            let index = params.number() as usize - 1;
            std::future::ready(pages[index].clone())
        };
        (fetch, requested)
    }

    #[tokio::test]
    async fn test_concatenates_pages_in_order() {
        let (fetch, requested) = server(vec![
            Ok(page(vec![1, 2], Some("/p2"))),
            Ok(page(vec![3, 4], Some("/p3"))),
            Ok(page(vec![5], None)),
        ]);

        let items: Vec<u32> = paginate(2, fetch)
            .map(|item| item.unwrap())
            .collect()
            .await;

        assert_eq!(items, vec![1, 2, 3, 4, 5]);
        let requested = requested.lock().unwrap();
        assert_eq!(requested.len(), 3);
        assert_eq!(
            requested.iter().map(|p| p.number()).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
        assert!(requested.iter().all(|p| p.size() == 2));
    }

    #[tokio::test]
    async fn test_empty_result_fetches_once() {
        let (fetch, requested) = server(vec![Ok(page(vec![], None))]);

        let items: Vec<_> = paginate(100, fetch).collect().await;

        assert!(items.is_empty());
        assert_eq!(requested.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_single_resource_page() {
        let mut doc = page(vec![], None);
        doc.data = Some(PrimaryData::One(7));
        let (fetch, _) = server(vec![Ok(doc)]);

        let items: Vec<u32> = paginate(20, fetch).map(|i| i.unwrap()).collect().await;
        assert_eq!(items, vec![7]);
    }

    #[tokio::test]
    async fn test_stopping_early_fetches_no_more_pages() {
        let (fetch, requested) = server(vec![
            Ok(page(vec![1, 2], Some("/p2"))),
            Ok(page(vec![3, 4], None)),
        ]);

        let items: Vec<_> = paginate(2, fetch).take(2).collect().await;

        assert_eq!(items.len(), 2);
        assert_eq!(requested.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_fetch_error_ends_stream() {
        let failure = Error::Status(crate::classify_status(StatusCode::INTERNAL_SERVER_ERROR, ""));
        let (fetch, requested) = server(vec![
            Ok(page(vec![1], Some("/p2"))),
            Err(failure),
            Ok(page(vec![3], None)),
        ]);

        let results: Vec<_> = paginate(1, fetch).collect().await;

        assert_eq!(results.len(), 2);
        assert_eq!(*results[0].as_ref().unwrap(), 1);
        assert!(matches!(results[1], Err(Error::Status(_))));
        assert_eq!(requested.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_invalid_page_size_fetches_nothing() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let fetch = move |_page: PageParams| {
            counter.fetch_add(1, Ordering::SeqCst);
            std::future::ready(Ok(page(vec![1], None)))
        };

        let results: Vec<_> = paginate(0, fetch).collect().await;

        assert_eq!(results.len(), 1);
        assert!(matches!(results[0], Err(Error::Configuration(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }
}
