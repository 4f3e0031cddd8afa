//! Basic example: configure a client and call a few endpoints.
//!
//! This example shows how to:
//! - Configure credentials and community
//! - List one page of users
//! - Fetch a record and handle a missing one
//! - Inspect response details with `Client::send`
//!
//! Run with: `OPENGOV_API_KEY=... OPENGOV_COMMUNITY=... cargo run --example basic_usage`

use opengov_api::resources::{records, users};
use opengov_api::{Client, Configuration, Error, PageParams, RequestDescriptor, StatusKind};

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter("opengov_api=debug,basic_usage=info")
        .init();

    // Picks up OPENGOV_API_KEY and OPENGOV_COMMUNITY
    let config = Configuration::from_env();
    println!("Using {:?}", config);

    let client = Client::new(config)?;

    println!("=== First page of users ===");
    let page = users::list_users(&client, PageParams::new(1, 10)?).await?;
    for user in page.items() {
        println!("  {} {}", user.id, user.attributes["email"]);
    }
    println!(
        "Page {:?} of {:?} ({:?} users)",
        page.current_page(),
        page.total_pages(),
        page.total_records()
    );

    println!("\n=== Missing record ===");
    match records::get_record(&client, "does-not-exist").await {
        Ok(doc) => println!("Unexpectedly found {:?}", doc.items()),
        Err(Error::Status(e)) if e.kind == StatusKind::NotFound => {
            println!("Not found: {} (request id {:?})", e.message, e.request_id);
        }
        Err(e) => return Err(e),
    }

    println!("\n=== Raw call with response details ===");
    let response = client.send(&RequestDescriptor::get("users").with_query_param("page[size]", "1")).await?;
    println!("Status: {}", response.status);
    println!("Latency: {:?}", response.latency);
    println!("Attempts: {}", response.attempts);
    println!("Request id: {:?}", response.request_id());

    Ok(())
}
