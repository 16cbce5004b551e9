//! Raw-record normalization.
//!
//! Both retrieval strategies land here. A structured article maps field by
//! field; a rendered card only has its flattened text, so everything is
//! recovered with the pattern extractors. Missing values become empty
//! strings rather than sinking the record.

use chrono::Utc;

use crate::config::ScraperConfig;
use crate::extract::{
    extract_floor_token, extract_numeric_token, extract_price_token, format_price,
    AREA_UNIT_MARKERS,
};
use crate::models::Property;
use crate::scrapers::areas::area_name_for_code;
use crate::scrapers::fetch::{Article, Location, RawRecord};

/// Normalizes one raw record. `None` means the record carried too little to
/// identify a listing and is dropped without failing the batch.
pub(crate) fn normalize_record(
    record: RawRecord,
    location: &Location,
    config: &ScraperConfig,
) -> Option<Property> {
    match record {
        RawRecord::Structured(article) => normalize_article(article, location, config),
        RawRecord::Rendered {
            text,
            href,
            ordinal,
        } => normalize_card(&text, href.as_deref(), ordinal, location, config),
    }
}

fn normalize_article(
    article: Article,
    location: &Location,
    config: &ScraperConfig,
) -> Option<Property> {
    // Without an article number there is no identity and no detail page.
    let id = article.atcl_no?;

    let rent = article
        .rent_prc
        .filter(|rent| *rent > 0)
        .map(|rent| rent.to_string());
    // hanPrc and prc both carry the deposit; prc is the bare numeric form.
    let numeric_deposit = article.prc.map(|prc| prc.to_string());
    let deposit = article
        .han_prc
        .filter(|deposit| !deposit.trim().is_empty())
        .or(numeric_deposit);
    let price = format_price(deposit.as_deref(), rent.as_deref(), None);

    let size = article
        .spc2
        .or(article.spc1)
        .map(|s| s.trim().to_string())
        .unwrap_or_default();

    let mut parts: Vec<String> = Vec::new();
    if let Some(desc) = article.atcl_fetr_desc {
        let desc = desc.trim();
        if !desc.is_empty() {
            parts.push(desc.to_string());
        }
    }
    if let Some(tags) = article.tag_list {
        let tags = tags.join(" ");
        if !tags.is_empty() {
            parts.push(tags);
        }
    }
    if let Some(direction) = article.direction {
        let direction = direction.trim();
        if !direction.is_empty() {
            parts.push(direction.to_string());
        }
    }
    let description = parts.join(" ");

    // District code back to a readable name when the table knows it; a
    // named-area search labels by the area it asked for.
    let address = article
        .cortar_no
        .as_deref()
        .and_then(area_name_for_code)
        .map(str::to_string)
        .or_else(|| searched_area_name(location))
        .unwrap_or_default();

    let link = config.article_detail_url(&id);
    Some(Property {
        id,
        title: article.atcl_nm.unwrap_or_default(),
        price,
        size,
        floor: article.flr_info.unwrap_or_default(),
        address,
        description,
        link,
        scraped_at: Utc::now(),
    })
}

fn normalize_card(
    text: &str,
    href: Option<&str>,
    ordinal: usize,
    location: &Location,
    config: &ScraperConfig,
) -> Option<Property> {
    if text.trim().is_empty() {
        return None;
    }

    // A card link to a detail page recovers the real article id; otherwise
    // the id is only unique within this result set.
    let (id, link) = match href.and_then(article_id_from_href) {
        Some(article_no) => {
            let link = config.article_detail_url(&article_no);
            (article_no, link)
        }
        None => (format!("{}-{}", location.key(), ordinal), String::new()),
    };

    let size = extract_numeric_token(text, AREA_UNIT_MARKERS)
        .map(format_size)
        .unwrap_or_default();

    Some(Property {
        id,
        title: text.split_whitespace().next().unwrap_or_default().to_string(),
        price: extract_price_token(text).unwrap_or_default(),
        size,
        floor: extract_floor_token(text).unwrap_or_default(),
        address: searched_area_name(location).unwrap_or_default(),
        description: text.to_string(),
        link,
        scraped_at: Utc::now(),
    })
}

fn searched_area_name(location: &Location) -> Option<String> {
    match location {
        Location::Area { name, .. } => Some(name.clone()),
        Location::Cluster { .. } => None,
    }
}

fn article_id_from_href(href: &str) -> Option<String> {
    let tail = href.split("/article/info/").nth(1)?;
    let id: String = tail.chars().take_while(char::is_ascii_digit).collect();
    if id.is_empty() {
        None
    } else {
        Some(id)
    }
}

fn format_size(size: f64) -> String {
    if size.fract() == 0.0 {
        format!("{}", size as i64)
    } else {
        size.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ScraperConfig {
        ScraperConfig::default()
    }

    fn cluster() -> Location {
        Location::Cluster {
            id: "2130613117".to_string(),
            lat: 37.5541,
            lon: 126.9198,
        }
    }

    fn area() -> Location {
        Location::Area {
            name: "마포구 서교동".to_string(),
            code: "1144012000".to_string(),
        }
    }

    fn article() -> Article {
        Article {
            atcl_no: Some("2412345678".to_string()),
            atcl_nm: Some("마포 신축 원룸".to_string()),
            han_prc: Some("1,000".to_string()),
            rent_prc: Some(50),
            prc: None,
            spc1: Some("26".to_string()),
            spc2: Some("23.14".to_string()),
            flr_info: Some("3/15".to_string()),
            atcl_fetr_desc: Some("역세권 풀옵션".to_string()),
            tag_list: Some(vec!["신축".to_string(), "주차가능".to_string()]),
            direction: Some("남향".to_string()),
            cortar_no: Some("1144012000".to_string()),
        }
    }

    #[test]
    fn structured_record_maps_field_by_field() {
        let property = normalize_article(article(), &cluster(), &config()).unwrap();
        assert_eq!(property.id, "2412345678");
        assert_eq!(property.title, "마포 신축 원룸");
        assert_eq!(property.price, "1,000/50");
        assert_eq!(property.size, "23.14");
        assert_eq!(property.floor, "3/15");
        assert_eq!(property.description, "역세권 풀옵션 신축 주차가능 남향");
        assert_eq!(property.address, "마포구 서교동");
        assert_eq!(
            property.link,
            "https://m.land.naver.com/article/info/2412345678"
        );
    }

    #[test]
    fn zero_rent_means_deposit_only_price() {
        let mut a = article();
        a.han_prc = Some("2억".to_string());
        a.rent_prc = Some(0);
        let property = normalize_article(a, &cluster(), &config()).unwrap();
        assert_eq!(property.price, "2억");
    }

    #[test]
    fn numeric_deposit_backfills_missing_formatted_price() {
        let mut a = article();
        a.han_prc = None;
        a.prc = Some(1000);
        let property = normalize_article(a, &cluster(), &config()).unwrap();
        assert_eq!(property.price, "1000/50");
    }

    #[test]
    fn formatted_deposit_wins_over_numeric() {
        let mut a = article();
        a.prc = Some(9999);
        let property = normalize_article(a, &cluster(), &config()).unwrap();
        assert_eq!(property.price, "1,000/50");
    }

    #[test]
    fn exclusive_area_preferred_over_supply_area() {
        let mut a = article();
        a.spc2 = None;
        let property = normalize_article(a, &cluster(), &config()).unwrap();
        assert_eq!(property.size, "26");
    }

    #[test]
    fn article_without_id_is_dropped() {
        let mut a = article();
        a.atcl_no = None;
        assert!(normalize_article(a, &cluster(), &config()).is_none());
    }

    #[test]
    fn unknown_district_code_falls_back_to_searched_area() {
        let mut a = article();
        a.cortar_no = Some("9999999999".to_string());
        let property = normalize_article(a, &area(), &config()).unwrap();
        assert_eq!(property.address, "마포구 서교동");

        let mut a = article();
        a.cortar_no = None;
        let property = normalize_article(a, &cluster(), &config()).unwrap();
        assert_eq!(property.address, "");
    }

    #[test]
    fn missing_fields_become_empty_strings() {
        let a = Article {
            atcl_no: Some("9".to_string()),
            ..Article::default()
        };
        let property = normalize_article(a, &cluster(), &config()).unwrap();
        assert_eq!(property.title, "");
        assert_eq!(property.price, "");
        assert_eq!(property.size, "");
        assert_eq!(property.floor, "");
        assert_eq!(property.address, "");
        assert_eq!(property.description, "");
    }

    #[test]
    fn rendered_card_recovers_fields_from_text() {
        let text = "원룸 월세 1,000/50 23.14㎡ 3/15층 남향 역세권 풀옵션";
        let property = normalize_card(
            text,
            Some("/article/info/2412345678"),
            0,
            &cluster(),
            &config(),
        )
        .unwrap();
        assert_eq!(property.id, "2412345678");
        assert_eq!(property.title, "원룸");
        assert_eq!(property.price, "1,000/50");
        assert_eq!(property.size, "23.14");
        assert_eq!(property.floor, "3/15층");
        assert_eq!(property.description, text);
        assert_eq!(
            property.link,
            "https://m.land.naver.com/article/info/2412345678"
        );
    }

    #[test]
    fn rendered_card_without_link_gets_local_id() {
        let property =
            normalize_card("원룸 전세 1억 33㎡ 2층", None, 3, &cluster(), &config()).unwrap();
        assert_eq!(property.id, "2130613117-3");
        assert_eq!(property.link, "");
        assert_eq!(property.price, "1억");
        assert_eq!(property.size, "33");
        assert_eq!(property.floor, "2층");
    }

    #[test]
    fn rendered_card_in_named_area_carries_its_name() {
        let property = normalize_card("원룸 월세 500/40", None, 1, &area(), &config()).unwrap();
        assert_eq!(property.id, "1144012000-1");
        assert_eq!(property.address, "마포구 서교동");
    }

    #[test]
    fn rendered_card_with_foreign_link_gets_local_id() {
        let property = normalize_card(
            "원룸 월세 500/40",
            Some("/event/promo"),
            1,
            &cluster(),
            &config(),
        )
        .unwrap();
        assert_eq!(property.id, "2130613117-1");
        assert_eq!(property.link, "");
    }

    #[test]
    fn blank_card_is_dropped() {
        assert!(normalize_card("   ", None, 0, &cluster(), &config()).is_none());
    }
}
