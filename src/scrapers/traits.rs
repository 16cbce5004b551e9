use crate::error::ScrapeError;
use crate::models::{Property, SearchOptions};
use async_trait::async_trait;

/// Common trait for all listing scrapers
/// This allows easy addition of new sources (Zigbang, Dabang, etc) in the future
#[async_trait]
pub trait ListingScraper: Send + Sync {
    /// Run one search against the source
    async fn search(&mut self, options: &SearchOptions) -> Result<Vec<Property>, ScrapeError>;

    /// Get the name of the scraper source
    fn source_name(&self) -> &'static str;
}
