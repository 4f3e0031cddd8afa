//! # opengov-api - An async client for the OpenGov permitting & licensing API
//!
//! `opengov_api` wraps the OpenGov PLC REST API, a JSON:API service scoped to one
//! community (tenant). It handles authentication, retries transient failures with
//! exponential backoff, classifies errors by HTTP status and walks paginated
//! collections lazily.
//!
//! ## Quick Start
//!
//! ```no_run
//! use opengov_api::resources::users;
//! use opengov_api::{Client, Configuration, PageParams};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), opengov_api::Error> {
//!     // Reads OPENGOV_API_KEY and OPENGOV_COMMUNITY
//!     let config = Configuration::from_env();
//!     let client = Client::new(config)?;
//!
//!     let page = users::list_users(&client, PageParams::default()).await?;
//!     for user in page.items() {
//!         println!("{} {}", user.id, user.attributes["email"]);
//!     }
//!     println!("{:?} users in total", page.total_records());
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! Every failure is an [`Error`]. Non-2xx responses carry a [`StatusError`] with the
//! status, a [`StatusKind`], the best message the body offered and the server's
//! request id:
//!
//! ```no_run
//! use opengov_api::resources::records;
//! use opengov_api::{Client, Configuration, Error, StatusKind};
//!
//! # async fn example() -> Result<(), Error> {
//! # let client = Client::new(Configuration::from_env())?;
//! match records::get_record(&client, "rec-1").await {
//!     Ok(doc) => println!("{:?}", doc.items()),
//!     Err(Error::Status(e)) if e.kind == StatusKind::NotFound => {
//!         eprintln!("No such record (request {:?})", e.request_id);
//!     }
//!     Err(e) if e.is_connection() => eprintln!("Network trouble: {}", e),
//!     Err(e) => return Err(e),
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Retries
//!
//! Connection failures, timeouts, 429 and 5xx responses are retried. A 429 with a
//! `Retry-After` header waits as long as the server asks, capped at the policy's
//! maximum delay. The policy lives on the shared [`Configuration`]:
//!
//! ```
//! use opengov_api::{Configuration, RetryPolicyUpdate};
//! use std::time::Duration;
//!
//! let config = Configuration::new();
//! config
//!     .configure_retry_policy(
//!         RetryPolicyUpdate::new()
//!             .max_retries(5)
//!             .initial_delay(Duration::from_millis(500)),
//!     )
//!     .unwrap();
//! assert_eq!(config.retry_policy().max_retries, 5);
//! ```
//!
//! ## Pagination
//!
//! `iter_*` functions return a [`Stream`](futures::Stream) that fetches the next page
//! only when the previous one is drained. See [`pagination`].

mod client;
pub mod config;
pub mod document;
mod error;
pub mod pagination;
pub mod params;
pub mod redact;
mod request;
pub mod resources;
mod response;
pub mod retry;
pub mod transport;

pub use client::{Client, ClientBuilder};
pub use config::{Configuration, RetryPolicyUpdate, Settings};
pub use document::{Document, Links, Meta, PrimaryData, Resource};
pub use error::{classify_status, Error, ErrorBody, Result, StatusError, StatusKind};
pub use params::{ListParams, PageParams};
pub use request::RequestDescriptor;
pub use response::Response;
pub use retry::{classify_failure, compute_delay, RetryPolicy};
