//! Authoritative filtering and result accumulation.
//!
//! Upstream pre-filtering is only an optimization; every normalized record
//! passes through [`SearchFilter`] regardless of which strategy produced
//! it. [`ResultCollector`] then enforces identity dedup and the result cap
//! while keeping discovery order.

use std::collections::HashSet;

use crate::extract::{
    contains_basement_marker, extract_trade_kind, parse_floor_number, split_price_amounts,
};
use crate::models::{Property, SearchOptions, TradeType};

/// Predicate set for one search. All predicates must hold; an absent or
/// unreadable value never rejects on its own.
pub(crate) struct SearchFilter<'a> {
    options: &'a SearchOptions,
}

impl<'a> SearchFilter<'a> {
    pub(crate) fn new(options: &'a SearchOptions) -> Self {
        Self { options }
    }

    pub(crate) fn accepts(&self, property: &Property) -> bool {
        self.floor_ok(property)
            && self.size_ok(property)
            && self.price_ok(property)
            && self.trade_ok(property)
    }

    /// Below-ground markers reject before any number is read; `"B1/4"`
    /// would otherwise pass as floor 1 of 4.
    fn floor_ok(&self, property: &Property) -> bool {
        let floor = property.floor.trim();
        if contains_basement_marker(floor) {
            return false;
        }
        match parse_floor_number(floor) {
            Some(number) => number >= self.options.min_floor(),
            None => true,
        }
    }

    fn size_ok(&self, property: &Property) -> bool {
        let Ok(size) = property.size.trim().parse::<f64>() else {
            return true;
        };
        if let Some(min_size) = self.options.min_size {
            if size < min_size {
                return false;
            }
        }
        if let Some(max_size) = self.options.max_size {
            if size > max_size {
                return false;
            }
        }
        true
    }

    fn price_ok(&self, property: &Property) -> bool {
        let (deposit, rent) = split_price_amounts(&property.price);
        if let (Some(cap), Some(deposit)) = (self.options.max_deposit, deposit) {
            if deposit > cap {
                return false;
            }
        }
        if let (Some(cap), Some(rent)) = (self.options.max_rent, rent) {
            if rent > cap {
                return false;
            }
        }
        true
    }

    /// Rejects only when the record's trade kind is determinate and
    /// conflicts with the requested one.
    fn trade_ok(&self, property: &Property) -> bool {
        let wanted = self.options.trade_type;
        if wanted == TradeType::Any {
            return true;
        }
        if let Some(kind) = extract_trade_kind(&property.description) {
            return kind == wanted;
        }
        // No trade word anywhere; a deposit/rent pair still implies
        // recurring rent.
        let (_, rent) = split_price_amounts(&property.price);
        match wanted {
            TradeType::LeaseDeposit => rent.is_none(),
            _ => true,
        }
    }
}

/// Accumulates accepted listings across regions: first sighting of an id
/// wins, discovery order is kept, and nothing past the cap is stored.
pub(crate) struct ResultCollector {
    seen: HashSet<String>,
    items: Vec<Property>,
    limit: usize,
}

impl ResultCollector {
    pub(crate) fn new(limit: usize) -> Self {
        Self {
            seen: HashSet::new(),
            items: Vec::new(),
            limit,
        }
    }

    /// True when the listing was kept; false for duplicates and overflow.
    pub(crate) fn push(&mut self, property: Property) -> bool {
        if self.is_full() {
            return false;
        }
        if !self.seen.insert(property.id.clone()) {
            return false;
        }
        self.items.push(property);
        true
    }

    pub(crate) fn is_full(&self) -> bool {
        self.items.len() >= self.limit
    }

    pub(crate) fn len(&self) -> usize {
        self.items.len()
    }

    pub(crate) fn into_items(self) -> Vec<Property> {
        self.items
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn property(id: &str, floor: &str, size: &str, price: &str, description: &str) -> Property {
        Property {
            id: id.to_string(),
            title: "원룸".to_string(),
            price: price.to_string(),
            size: size.to_string(),
            floor: floor.to_string(),
            address: String::new(),
            description: description.to_string(),
            link: String::new(),
            scraped_at: Utc::now(),
        }
    }

    fn options() -> SearchOptions {
        SearchOptions::default()
    }

    #[test]
    fn default_floor_rejects_first_floor() {
        let options = options();
        let filter = SearchFilter::new(&options);
        assert!(!filter.accepts(&property("a", "1층", "", "", "")));
        assert!(filter.accepts(&property("b", "2층", "", "", "")));
    }

    #[test]
    fn min_floor_three_rejects_second_floor() {
        let mut options = options();
        options.min_floor = Some(3);
        let filter = SearchFilter::new(&options);
        assert!(!filter.accepts(&property("a", "2층", "", "", "")));
        assert!(!filter.accepts(&property("b", "2/15", "", "", "")));
        assert!(filter.accepts(&property("c", "3/15", "", "", "")));
    }

    #[test]
    fn basement_always_rejected() {
        let options = options();
        let filter = SearchFilter::new(&options);
        for floor in ["반지하", "지하 1층", "지하 3층", "B1/4", "B2/5"] {
            assert!(!filter.accepts(&property("a", floor, "", "", "")), "{floor}");
        }
    }

    #[test]
    fn missing_floor_is_accepted() {
        let options = options();
        let filter = SearchFilter::new(&options);
        assert!(filter.accepts(&property("a", "", "", "", "")));
        assert!(filter.accepts(&property("b", "옥탑", "", "", "")));
    }

    #[test]
    fn size_bounds_apply_when_readable() {
        let mut options = options();
        options.min_size = Some(20.0);
        options.max_size = Some(40.0);
        let filter = SearchFilter::new(&options);
        assert!(!filter.accepts(&property("a", "3층", "16.5", "", "")));
        assert!(filter.accepts(&property("b", "3층", "23.14", "", "")));
        assert!(!filter.accepts(&property("c", "3층", "44", "", "")));
        assert!(filter.accepts(&property("d", "3층", "", "", "")));
        assert!(filter.accepts(&property("e", "3층", "문의", "", "")));
    }

    #[test]
    fn deposit_cap_reads_korean_amounts() {
        let mut options = options();
        options.max_deposit = Some(10_000);
        let filter = SearchFilter::new(&options);
        assert!(filter.accepts(&property("a", "3층", "", "1억/50", "")));
        assert!(!filter.accepts(&property("b", "3층", "", "1억 5,000/50", "")));
        assert!(filter.accepts(&property("c", "3층", "", "5,000", "")));
    }

    #[test]
    fn rent_cap_applies_to_second_component() {
        let mut options = options();
        options.max_rent = Some(40);
        let filter = SearchFilter::new(&options);
        assert!(filter.accepts(&property("a", "3층", "", "1,000/40", "")));
        assert!(!filter.accepts(&property("b", "3층", "", "1,000/50", "")));
        assert!(filter.accepts(&property("c", "3층", "", "1억", "")));
    }

    #[test]
    fn unreadable_price_passes_caps() {
        let mut options = options();
        options.max_deposit = Some(1);
        options.max_rent = Some(1);
        let filter = SearchFilter::new(&options);
        assert!(filter.accepts(&property("a", "3층", "", "가격문의", "")));
        assert!(filter.accepts(&property("b", "3층", "", "", "")));
    }

    #[test]
    fn absurd_price_amount_is_unreadable_not_fatal() {
        let mut options = options();
        options.max_deposit = Some(1);
        let filter = SearchFilter::new(&options);
        assert!(filter.accepts(&property("a", "3층", "", "9999999999999999999억", "")));
    }

    #[test]
    fn trade_kind_conflict_rejects() {
        let mut options = options();
        options.trade_type = TradeType::LeaseDeposit;
        let filter = SearchFilter::new(&options);
        assert!(!filter.accepts(&property("a", "3층", "", "", "월세 1,000/50 역세권")));
        assert!(filter.accepts(&property("b", "3층", "", "2억", "전세 신축")));
        assert!(!filter.accepts(&property("c", "3층", "", "1,000/50", "역세권")));
        assert!(filter.accepts(&property("d", "3층", "", "2억", "역세권")));
    }

    #[test]
    fn any_trade_accepts_both_kinds() {
        let options = options();
        let filter = SearchFilter::new(&options);
        assert!(filter.accepts(&property("a", "3층", "", "1,000/50", "월세")));
        assert!(filter.accepts(&property("b", "3층", "", "2억", "전세")));
    }

    #[test]
    fn collector_keeps_first_sighting_of_an_id() {
        let mut collector = ResultCollector::new(20);
        assert!(collector.push(property("dup", "2층", "", "", "첫번째")));
        assert!(!collector.push(property("dup", "2층", "", "", "두번째")));
        let items = collector.into_items();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].description, "첫번째");
    }

    #[test]
    fn collector_stops_at_limit() {
        let mut collector = ResultCollector::new(5);
        for i in 0..8 {
            collector.push(property(&format!("id-{i}"), "2층", "", "", ""));
        }
        assert!(collector.is_full());
        let items = collector.into_items();
        assert_eq!(items.len(), 5);
        assert_eq!(items[0].id, "id-0");
        assert_eq!(items[4].id, "id-4");
    }

    #[test]
    fn collector_preserves_discovery_order() {
        let mut collector = ResultCollector::new(20);
        for id in ["c", "a", "b"] {
            collector.push(property(id, "2층", "", "", ""));
        }
        let ids: Vec<String> = collector.into_items().into_iter().map(|p| p.id).collect();
        assert_eq!(ids, ["c", "a", "b"]);
    }
}
