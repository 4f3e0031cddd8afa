//! Pagination example: stream every active record created in the last 30 days.
//!
//! Pages are fetched lazily; stopping early (here after 250 records) means the
//! remaining pages are never requested.
//!
//! Run with: `OPENGOV_API_KEY=... OPENGOV_COMMUNITY=... cargo run --example pagination`

use futures::{pin_mut, StreamExt};
use opengov_api::params::DateRangeFilter;
use opengov_api::resources::records::{self, RecordQuery, RecordStatus};
use opengov_api::{Client, Configuration, Error};

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter("opengov_api=debug,pagination=info")
        .init();

    let client = Client::new(Configuration::from_env())?;

    let query = RecordQuery::new()
        .status(RecordStatus::Active)
        .created_at(DateRangeFilter::last_days(30))
        .sort("-createdAt");

    let stream = records::iter_records(&client, query).take(250);
    pin_mut!(stream);

    let mut count = 0;
    while let Some(record) = stream.next().await {
        let record = record?;
        count += 1;
        println!(
            "{:>4}. {} {}",
            count,
            record.attributes.number.as_deref().unwrap_or("-"),
            record.attributes.name.as_deref().unwrap_or("(unnamed)")
        );
    }

    println!("\nSaw {} records", count);
    Ok(())
}
