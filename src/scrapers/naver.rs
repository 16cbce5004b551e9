//! One-room listing scraper for the mobile land portal.
//!
//! `search` is the whole public surface: resolve the regions to visit, pull
//! raw listings per region with the two-tier fetcher, normalize and filter,
//! and accumulate until the result cap fills. A region that fails is logged
//! and skipped; only losing the session itself aborts a search.

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::config::{RegionMode, ScraperConfig};
use crate::error::ScrapeError;
use crate::models::{Property, SearchOptions};
use crate::scrapers::areas::resolve_area;
use crate::scrapers::clusters::discover_clusters;
use crate::scrapers::fetch::{fetch_listings, Location, RawRecord};
use crate::scrapers::normalize::normalize_record;
use crate::scrapers::pipeline::{ResultCollector, SearchFilter};
use crate::scrapers::session::Session;
use crate::scrapers::traits::ListingScraper;

pub struct NaverLandScraper {
    config: ScraperConfig,
    session: Option<Session>,
}

impl NaverLandScraper {
    pub fn new() -> Self {
        Self::with_config(ScraperConfig::default())
    }

    pub fn with_config(config: ScraperConfig) -> Self {
        Self {
            config,
            session: None,
        }
    }

    /// Brings the session up if it is not already there. Repeated calls are
    /// free.
    pub async fn init(&mut self) -> Result<(), ScrapeError> {
        if self.session.is_some() {
            return Ok(());
        }
        info!("Bringing up scraping session");
        self.session = Some(Session::acquire(&self.config).await?);
        Ok(())
    }

    /// Drops the session. The next search acquires a fresh one. Calling
    /// this twice is fine.
    pub fn close(&mut self) {
        if self.session.take().is_some() {
            debug!("Session closed");
        }
    }

    /// Runs one search and returns at most `options.limit()` listings in
    /// discovery order.
    pub async fn search(
        &mut self,
        options: &SearchOptions,
    ) -> Result<Vec<Property>, ScrapeError> {
        self.init().await?;
        let results = match self.session.as_ref() {
            Some(session) => search_all_regions(session, &self.config, options).await,
            // init either failed above or left a session behind
            None => Vec::new(),
        };
        Ok(results)
    }
}

impl Default for NaverLandScraper {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ListingScraper for NaverLandScraper {
    async fn search(&mut self, options: &SearchOptions) -> Result<Vec<Property>, ScrapeError> {
        NaverLandScraper::search(self, options).await
    }

    fn source_name(&self) -> &'static str {
        "naver-land"
    }
}

async fn search_all_regions(
    session: &Session,
    config: &ScraperConfig,
    options: &SearchOptions,
) -> Vec<Property> {
    let filter = SearchFilter::new(options);
    let mut collector = ResultCollector::new(options.limit());

    let locations = resolve_locations(session, config, options).await;
    if locations.is_empty() {
        warn!("No searchable locations for this request");
        return Vec::new();
    }
    info!(count = locations.len(), "Searching locations");

    for (index, location) in locations.iter().enumerate() {
        if collector.is_full() {
            debug!("Result cap reached, remaining locations skipped");
            break;
        }
        if index > 0 {
            tokio::time::sleep(Duration::from_millis(config.request_delay_ms)).await;
        }

        match fetch_listings(session, config, options, location).await {
            Ok(records) => {
                let fetched = records.len();
                let kept = absorb_records(records, location, config, &filter, &mut collector);
                info!(%location, fetched, kept, total = collector.len(), "Location done");
            }
            Err(e) => {
                warn!(%location, error = %e, "Location failed, moving on");
            }
        }
    }

    collector.into_items()
}

/// Normalizes, filters and accumulates one region's records. Returns how
/// many were kept.
fn absorb_records(
    records: Vec<RawRecord>,
    location: &Location,
    config: &ScraperConfig,
    filter: &SearchFilter<'_>,
    collector: &mut ResultCollector,
) -> usize {
    let mut kept = 0;
    for record in records {
        if collector.is_full() {
            break;
        }
        let Some(property) = normalize_record(record, location, config) else {
            continue;
        };
        if filter.accepts(&property) && collector.push(property) {
            kept += 1;
        }
    }
    kept
}

async fn resolve_locations(
    session: &Session,
    config: &ScraperConfig,
    options: &SearchOptions,
) -> Vec<Location> {
    if config.region_mode == RegionMode::NamedAreas && !options.areas.is_empty() {
        return named_locations(&options.areas);
    }
    if !options.areas.is_empty() {
        debug!("Configured for bounding-box clustering, named areas ignored");
    }
    discover_clusters(session, config, options.trade_type)
        .await
        .into_iter()
        .map(|cluster| Location::Cluster {
            id: cluster.cluster_id,
            lat: cluster.lat,
            lon: cluster.lon,
        })
        .collect()
}

/// Maps area names through the curated table, in caller order. Names the
/// table does not know are logged and skipped; they never shrink what the
/// other areas return.
fn named_locations(area_names: &[String]) -> Vec<Location> {
    let mut locations = Vec::new();
    for name in area_names {
        match resolve_area(name) {
            Some(code) => locations.push(Location::Area {
                name: name.clone(),
                code: code.to_string(),
            }),
            None => warn!(area = %name, "Unknown area name, skipping"),
        }
    }
    locations
}
