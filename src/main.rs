use room_scout::models::{SearchOptions, TradeType};
use room_scout::scrapers::NaverLandScraper;
use tracing::{info, Level};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .init();

    info!("🏠 Room Scout - Naver Land One-Room Search");
    info!("==========================================");
    info!("");

    // Monthly-rent one-rooms, min 20㎡, deposit up to 3,000 / rent up to 70
    let options = SearchOptions {
        trade_type: TradeType::Rent,
        min_size: Some(20.0),
        max_deposit: Some(3_000),
        max_rent: Some(70),
        limit: Some(20),
        ..SearchOptions::default()
    };

    let mut scraper = NaverLandScraper::new();
    scraper.init().await?;

    // Run search
    info!("Starting search over the configured region...");
    info!("Structured listing queries first, rendered pages as fallback");
    info!("");

    // The session comes down whether or not the search worked
    let result = scraper.search(&options).await;
    scraper.close();
    let listings = result?;

    // Display results
    info!("\n✅ Found {} listings\n", listings.len());

    for (i, listing) in listings.iter().enumerate() {
        println!("{}. {} ({})", i + 1, listing.title, listing.price);
        println!("   {}㎡ | {}", listing.size, listing.floor);
        if !listing.address.is_empty() {
            println!("   Area: {}", listing.address);
        }
        if !listing.description.is_empty() {
            println!("   {}", listing.description);
        }
        println!("   ID: {}", listing.id);
        if !listing.link.is_empty() {
            println!("   URL: {}", listing.link);
        }
        println!();
    }

    // Save to JSON file
    let json = serde_json::to_string_pretty(&listings)?;
    tokio::fs::write("room_listings.json", json).await?;
    info!("💾 Saved all listings to room_listings.json");

    Ok(())
}
