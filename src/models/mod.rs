use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Trade kind of a listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TradeType {
    /// Monthly rent: deposit plus a recurring payment
    Rent,
    /// Jeonse-style full deposit, no recurring rent
    LeaseDeposit,
    /// Accept both kinds
    Any,
}

impl TradeType {
    /// Fixed upstream trade-type code pair. Not configurable per call.
    pub fn upstream_code(&self) -> &'static str {
        match self {
            TradeType::Rent => "B2",
            TradeType::LeaseDeposit => "B1",
            TradeType::Any => "B1:B2",
        }
    }
}

/// Search criteria for one scrape invocation. Read-only once built.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchOptions {
    /// Named areas to search, in order. Empty means the whole configured
    /// bounding region.
    pub areas: Vec<String>,
    /// Minimum floor area in square meters
    pub min_size: Option<f64>,
    /// Maximum floor area in square meters
    pub max_size: Option<f64>,
    /// Lowest acceptable floor (defaults to 2)
    pub min_floor: Option<i32>,
    pub trade_type: TradeType,
    /// Deposit cap in 10-thousand-won units
    pub max_deposit: Option<u64>,
    /// Monthly rent cap in 10-thousand-won units
    pub max_rent: Option<u64>,
    /// Result cap (defaults to 20)
    pub limit: Option<usize>,
}

impl SearchOptions {
    pub fn min_floor(&self) -> i32 {
        self.min_floor.unwrap_or(2)
    }

    pub fn limit(&self) -> usize {
        self.limit.unwrap_or(20)
    }
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            areas: Vec::new(),
            min_size: None,
            max_size: None,
            min_floor: None,
            trade_type: TradeType::Any,
            max_deposit: None,
            max_rent: None,
            limit: None,
        }
    }
}

/// One normalized listing.
///
/// Every text field is empty when the source could not supply it. `id` is
/// the upstream article number when available, otherwise a locally generated
/// token that is only unique within a single result set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Property {
    pub id: String,
    pub title: String,
    /// Formatted as "<deposit>/<rent>" when both components exist
    pub price: String,
    /// Floor area text, square meters
    pub size: String,
    /// Floor text, e.g. "3/15", "2층", "반지하"
    pub floor: String,
    pub address: String,
    pub description: String,
    /// Detail page URL
    pub link: String,
    pub scraped_at: DateTime<Utc>,
}

/// A server-aggregated listing-density cell inside the bounding region.
/// Denser clusters are fetched first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationCluster {
    pub cluster_id: String,
    pub count: u32,
    pub lat: f64,
    pub lon: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trade_type_codes_are_fixed() {
        assert_eq!(TradeType::Rent.upstream_code(), "B2");
        assert_eq!(TradeType::LeaseDeposit.upstream_code(), "B1");
        assert_eq!(TradeType::Any.upstream_code(), "B1:B2");
    }

    #[test]
    fn options_defaults() {
        let options = SearchOptions::default();
        assert_eq!(options.min_floor(), 2);
        assert_eq!(options.limit(), 20);
        assert!(options.areas.is_empty());
    }
}
