//! Example demonstrating retry configuration.
//!
//! This example shows how to:
//! - Tune the retry policy on a shared configuration
//! - Disable retries for a latency-sensitive call
//! - Tell transient failures from permanent ones
//!
//! Run with: `OPENGOV_API_KEY=... OPENGOV_COMMUNITY=... cargo run --example retry_configuration`

use opengov_api::resources::locations;
use opengov_api::{Client, Configuration, Error, RetryPolicyUpdate};
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter("opengov_api=debug,retry_configuration=info")
        .init();

    let config = Configuration::from_env();
    config.set_timeout(Duration::from_secs(10));
    config.configure_retry_policy(
        RetryPolicyUpdate::new()
            .max_retries(5)
            .initial_delay(Duration::from_millis(250))
            .max_delay(Duration::from_secs(10))
            .backoff_multiplier(3.0),
    )?;
    println!("Retry policy: {:?}", config.retry_policy());

    // Invalid values are rejected and the previous policy stays in force
    if let Err(e) = config.configure_retry_policy(RetryPolicyUpdate::new().jitter_fraction(2.0)) {
        println!("Rejected: {}", e);
    }

    let client = Client::new(config)?;

    match locations::list_locations(&client).await {
        Ok(page) => println!("Fetched {} locations", page.items().len()),
        Err(e) if e.is_retryable() => {
            println!("Gave up after {:?} attempts: {}", e.attempts(), e);
        }
        Err(e) => return Err(e),
    }

    println!("\n=== Without retries ===");
    client
        .configuration()
        .configure_retry_policy(RetryPolicyUpdate::new().max_retries(0))?;

    match locations::get_location(&client, "loc-1").await {
        Ok(doc) => println!("{:?}", doc.items()),
        Err(e) => println!("Failed on first attempt: {}", e),
    }

    Ok(())
}
