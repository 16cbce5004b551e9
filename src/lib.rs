//! One-room listing search over a mobile real-estate portal.
//!
//! The portal clusters listings geographically and throttles automation
//! hard, so a search walks region by region: discover where listings
//! actually are, pull each region through a structured query endpoint with
//! a rendered-page fallback behind it, then normalize, filter and dedup
//! everything into one capped result set.

pub mod config;
pub mod error;
pub mod extract;
pub mod models;
pub mod scrapers;

pub use config::{BoundingBox, RegionMode, ScraperConfig};
pub use error::ScrapeError;
pub use models::{Property, SearchOptions, TradeType};
pub use scrapers::{ListingScraper, NaverLandScraper};
