//! Page load walkthrough.
//!
//! Simulates one visitor reading four stories on a site with three free
//! views, then registering, plus a crawler visit. No backend is configured,
//! so every quota check is allowed locally.

use paywall_lite::{Configuration, OverlayState, Paywall};
use tracing::Level;

const READER_UA: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 14_5) AppleWebKit/605.1.15 Safari/605.1.15";
const CRAWLER_UA: &str = "Mozilla/5.0 (compatible; PerplexityBot/1.0)";

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_max_level(Level::DEBUG)
        .with_target(false)
        .init();

    // Attributes as they would appear on the embedding script tag
    let config = Configuration::from_attributes([
        ("data-site", "daily-gazette"),
        ("data-free-views", "3"),
        ("data-show-registration", "true"),
        ("data-style", "fade"),
    ])?;
    let paywall = Paywall::builder().with_config(config).build()?;

    println!("=== Metered reader ===\n");
    for story in 1..=4 {
        let path = format!("/stories/{}", story);
        let mut page = paywall.open_page(&path, READER_UA);
        let outcome = page.ready().await;
        println!("{} -> {} ({:?})", path, outcome, page.state());

        if page.state() == OverlayState::FadeAndPaywall {
            println!("\nReader asks to register with an empty field first:");
            page.request_registration();
            page.submit_email("");
            println!("  state: {:?}", page.state());

            page.submit_email("reader@example.com");
            println!("  state after valid email: {:?}", page.state());

            // Let the fade finish dissolving
            tokio::time::sleep(std::time::Duration::from_millis(700)).await;
        }
    }

    println!("\n=== Crawler ===\n");
    let mut page = paywall.open_page("/stories/1", CRAWLER_UA);
    println!("crawler -> {}", page.ready().await);

    let snapshot = paywall.metrics().snapshot();
    println!("\n=== Metrics ===");
    println!("Decisions:    {}", snapshot.total_decisions());
    println!("Granted:      {}", snapshot.granted);
    println!("Denied:       {}", snapshot.denied);
    println!("Bots:         {}", snapshot.bots_granted);
    println!("Registrations: {}", snapshot.registrations);
    println!("Denial rate:  {:.0}%", snapshot.denial_rate() * 100.0);

    Ok(())
}
