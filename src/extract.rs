//! Pattern extraction over listing text.
//!
//! The rendered fallback hands us free-form card text and the structured
//! payload hands us loosely formatted strings; everything that turns those
//! into numbers or canonical tokens lives here as pure functions so it can
//! be tested against literal strings.

use regex::Regex;

use crate::models::TradeType;

/// Suffixes the upstream uses for floor area
pub const AREA_UNIT_MARKERS: &[&str] = &["㎡", "m²"];

/// Suffix the upstream uses for a numbered floor
pub const FLOOR_UNIT_MARKERS: &[&str] = &["층"];

/// Tokens denoting a below-ground floor. `지하` also matches `반지하`.
const BASEMENT_MARKERS: &[&str] = &["지하", "B1", "B2"];

/// Token denoting a rooftop unit
const ROOFTOP_MARKER: &str = "옥탑";

/// First decimal number immediately followed by one of the unit markers.
///
/// `extract_numeric_token("원룸 23.14㎡ 5층", AREA_UNIT_MARKERS)` is `23.14`.
pub fn extract_numeric_token(text: &str, unit_markers: &[&str]) -> Option<f64> {
    if text.is_empty() || unit_markers.is_empty() {
        return None;
    }
    let alternatives = unit_markers
        .iter()
        .map(|marker| regex::escape(marker))
        .collect::<Vec<_>>()
        .join("|");
    let pattern = format!(r"(\d+(?:\.\d+)?)\s*(?:{alternatives})");
    let re = Regex::new(&pattern).ok()?;
    re.captures(text)?.get(1)?.as_str().parse().ok()
}

/// First integer in a floor field, e.g. `"3/15"` is `3` and `"2층"` is `2`.
///
/// Callers must check [`contains_basement_marker`] first; `"B1/4"` would
/// otherwise parse as floor 1.
pub fn parse_floor_number(text: &str) -> Option<i32> {
    let re = Regex::new(r"\d+").ok()?;
    re.find(text)?.as_str().parse().ok()
}

pub fn contains_basement_marker(text: &str) -> bool {
    BASEMENT_MARKERS.iter().any(|marker| text.contains(marker))
}

pub fn contains_rooftop_marker(text: &str) -> bool {
    text.contains(ROOFTOP_MARKER)
}

/// Floor segment of free-form card text: a below-ground or rooftop word
/// when present, otherwise the `층`-suffixed token, e.g. `"3/15층"` from
/// `"원룸 23.14㎡ 3/15층 남향"`.
pub fn extract_floor_token(text: &str) -> Option<String> {
    for word in ["반지하", "지하", "옥탑"] {
        if text.contains(word) {
            return Some(word.to_string());
        }
    }
    let re = Regex::new(r"\d+(?:/\d+)?\s*층").ok()?;
    re.find(text).map(|m| m.as_str().replace(' ', ""))
}

/// Canonical price display: both components joined with `/`, a single
/// component alone, otherwise whatever combined string the source gave us.
pub fn format_price(
    deposit: Option<&str>,
    rent: Option<&str>,
    combined: Option<&str>,
) -> String {
    let deposit = deposit.map(str::trim).filter(|s| !s.is_empty());
    let rent = rent.map(str::trim).filter(|s| !s.is_empty());
    match (deposit, rent) {
        (Some(deposit), Some(rent)) => format!("{deposit}/{rent}"),
        (Some(deposit), None) => deposit.to_string(),
        (None, Some(rent)) => rent.to_string(),
        (None, None) => combined.map(str::trim).unwrap_or_default().to_string(),
    }
}

/// Korean-formatted price in 10-thousand-won units.
///
/// `"1억"` is `10_000`, `"1억 5,000"` is `15_000`, `"5,000"` is `5_000`.
/// Returns `None` for anything it cannot read exactly.
pub fn parse_korean_price(text: &str) -> Option<u64> {
    let cleaned = text.replace(',', "").replace(' ', "");
    if cleaned.is_empty() {
        return None;
    }
    match cleaned.split_once('억') {
        Some((eok, rest)) => {
            let eok: u64 = eok.parse().ok()?;
            let rest: u64 = if rest.is_empty() { 0 } else { rest.parse().ok()? };
            eok.checked_mul(10_000)?.checked_add(rest)
        }
        None => cleaned.parse().ok(),
    }
}

/// Splits a price display into (deposit, rent) amounts. A single component
/// is read as the deposit.
pub fn split_price_amounts(price: &str) -> (Option<u64>, Option<u64>) {
    match price.split_once('/') {
        Some((deposit, rent)) => (
            parse_korean_price(deposit.trim()),
            parse_korean_price(rent.trim()),
        ),
        None => (parse_korean_price(price.trim()), None),
    }
}

/// Price token following a trade-kind word in rendered card text,
/// e.g. `"월세 1,000/50 역세권"` yields `"1,000/50"`.
///
/// After an `억` amount, a following bare number is only taken as the
/// remainder when it is shaped like one (`5,000` or `3000`); card text runs
/// prices and floor areas together, so `"1억 33㎡"` must stay `"1억"`.
pub fn extract_price_token(text: &str) -> Option<String> {
    let re = Regex::new(
        r"(?:월세|전세)\s*((?:\d[\d,.]*억(?:\s?\d{1,2},\d{3}|\s?\d{3,4})?|\d[\d,.]*)(?:\s*/\s*\d[\d,]*)?)",
    )
    .ok()?;
    let token = re.captures(text)?.get(1)?.as_str().trim().to_string();
    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}

/// Trade kind named in free text, when it names exactly one.
pub fn extract_trade_kind(text: &str) -> Option<TradeType> {
    let rent = text.contains("월세");
    let lease = text.contains("전세");
    match (rent, lease) {
        (true, false) => Some(TradeType::Rent),
        (false, true) => Some(TradeType::LeaseDeposit),
        _ => None,
    }
}
