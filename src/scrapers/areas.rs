//! Named-area resolution.
//!
//! Legacy region strategy: a curated table mapping human-readable
//! neighborhood names to the upstream's area codes. Unknown names are a
//! per-area miss, never a search failure. Bounding-box clustering is the
//! authoritative mode and needs none of this.

/// Area codes are the upstream's 10-digit administrative-district keys.
/// The table is deployment-curated; extend it rather than guessing codes.
const AREA_CODES: &[(&str, &str)] = &[
    ("마포구 서교동", "1144012000"),
    ("마포구 합정동", "1144012500"),
    ("마포구 망원동", "1144011700"),
    ("마포구 연남동", "1144013000"),
    ("용산구 이태원동", "1117013100"),
    ("강남구 역삼동", "1168010100"),
    ("강남구 논현동", "1168010800"),
    ("관악구 신림동", "1162010200"),
    ("성동구 성수동1가", "1120011400"),
    ("서대문구 연희동", "1141011700"),
];

/// Looks up one area name. `None` means the name is not in the table; the
/// caller logs the miss and continues with the remaining areas.
pub fn resolve_area(name: &str) -> Option<&'static str> {
    let name = name.trim();
    AREA_CODES
        .iter()
        .find(|(known, _)| *known == name)
        .map(|(_, code)| *code)
}

/// Reverse lookup, used to label listings with a readable district name
/// when the upstream only gave us the code.
pub fn area_name_for_code(code: &str) -> Option<&'static str> {
    AREA_CODES
        .iter()
        .find(|(_, known)| *known == code)
        .map(|(name, _)| *name)
}

/// Every name the table can resolve, in table order.
pub fn known_area_names() -> impl Iterator<Item = &'static str> {
    AREA_CODES.iter().map(|(name, _)| *name)
}
