//! Listing retrieval for a single location.
//!
//! Two strategies, tried in order: the structured listing-query endpoint,
//! then a rendered page driven through the browser when the structured pass
//! fails or comes back empty. Both produce [`RawRecord`]s; nothing here
//! interprets listing content beyond pulling it off the wire.

use std::fmt;
use std::time::Duration;

use headless_chrome::Tab;
use scraper::{Html, Selector};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::ScraperConfig;
use crate::error::FetchError;
use crate::models::SearchOptions;
use crate::scrapers::session::Session;

/// Scope for one retrieval pass.
#[derive(Debug, Clone)]
pub(crate) enum Location {
    /// Entry from the curated area table
    Area { name: String, code: String },
    /// Discovered density cluster
    Cluster { id: String, lat: f64, lon: f64 },
}

impl Location {
    /// Stable token used to localize generated record ids.
    pub(crate) fn key(&self) -> &str {
        match self {
            Location::Area { code, .. } => code,
            Location::Cluster { id, .. } => id,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::Area { name, code } => write!(f, "area {name} ({code})"),
            Location::Cluster { id, .. } => write!(f, "cluster {id}"),
        }
    }
}

/// One listing as it came off the wire, before normalization.
#[derive(Debug, Clone)]
pub(crate) enum RawRecord {
    /// Article object from the structured endpoint
    Structured(Article),
    /// Flattened text of one rendered listing card
    Rendered {
        text: String,
        href: Option<String>,
        ordinal: usize,
    },
}

/// Structured listing object. The field set is upstream-owned and shifts
/// without notice, so every field is optional and unknown ones are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Article {
    #[serde(default)]
    pub atcl_no: Option<String>,
    #[serde(default)]
    pub atcl_nm: Option<String>,
    /// Deposit (or jeonse/sale amount) as display text, e.g. "1억"
    #[serde(default)]
    pub han_prc: Option<String>,
    /// Monthly rent in 10-thousand-won units; 0 means none
    #[serde(default)]
    pub rent_prc: Option<u64>,
    #[serde(default)]
    pub prc: Option<u64>,
    #[serde(default)]
    pub spc1: Option<String>,
    /// Exclusive-use area; preferred over `spc1` when both exist
    #[serde(default)]
    pub spc2: Option<String>,
    #[serde(default)]
    pub flr_info: Option<String>,
    #[serde(default)]
    pub atcl_fetr_desc: Option<String>,
    #[serde(default)]
    pub tag_list: Option<Vec<String>>,
    #[serde(default)]
    pub direction: Option<String>,
    #[serde(default)]
    pub cortar_no: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ArticleListResponse {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    more: Option<bool>,
    #[serde(default)]
    body: Option<Vec<serde_json::Value>>,
}

/// Two-tier retrieval for one location. The rendered fallback only runs
/// when the structured pass errored or produced nothing.
pub(crate) async fn fetch_listings(
    session: &Session,
    config: &ScraperConfig,
    options: &SearchOptions,
    location: &Location,
) -> Result<Vec<RawRecord>, FetchError> {
    let structured = fetch_structured(session, config, options, location).await;
    if !should_fall_back(&structured) {
        return structured;
    }
    match &structured {
        Ok(_) => debug!(%location, "Structured pass empty, trying rendered page"),
        Err(e) => warn!(%location, error = %e, "Structured pass failed, trying rendered page"),
    }
    tokio::time::sleep(Duration::from_millis(config.request_delay_ms)).await;
    fetch_rendered(session, config, options, location).await
}

/// A rendered page costs a browser round trip, so it only runs when the
/// structured pass produced nothing usable.
fn should_fall_back(structured: &Result<Vec<RawRecord>, FetchError>) -> bool {
    match structured {
        Ok(records) => records.is_empty(),
        Err(_) => true,
    }
}

/// Pages through the structured endpoint until the upstream reports no
/// more, a page comes back empty, or the page cap is reached.
pub(crate) async fn fetch_structured(
    session: &Session,
    config: &ScraperConfig,
    options: &SearchOptions,
    location: &Location,
) -> Result<Vec<RawRecord>, FetchError> {
    let url = config.article_list_url();
    let mut records = Vec::new();

    for page in 1..=config.max_pages {
        if page > 1 {
            tokio::time::sleep(Duration::from_millis(config.request_delay_ms)).await;
        }

        let mut query: Vec<(&str, String)> = vec![
            ("rletTpCd", config.realty_type.clone()),
            ("tradTpCd", options.trade_type.upstream_code().to_string()),
            ("page", page.to_string()),
        ];
        match location {
            Location::Area { code, .. } => query.push(("cortarNo", code.clone())),
            Location::Cluster { id, .. } => {
                query.push(("itemId", id.clone()));
                query.push(("lgeo", id.clone()));
            }
        }
        // The upstream can pre-filter; the authoritative filters still run
        // on every record afterwards.
        if let Some(max_deposit) = options.max_deposit {
            query.push(("wprcMax", max_deposit.to_string()));
        }
        if let Some(max_rent) = options.max_rent {
            query.push(("rprcMax", max_rent.to_string()));
        }
        if let Some(min_size) = options.min_size {
            query.push(("spcMin", min_size.to_string()));
        }
        if let Some(max_size) = options.max_size {
            query.push(("spcMax", max_size.to_string()));
        }

        let response = session
            .http()
            .get(&url)
            .header(reqwest::header::REFERER, config.base_url.as_str())
            .header(reqwest::header::ACCEPT, "application/json")
            .query(&query)
            .send()
            .await
            .map_err(|source| FetchError::Transport {
                url: url.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status { url, status });
        }

        let payload = response
            .text()
            .await
            .map_err(|source| FetchError::Transport {
                url: url.clone(),
                source,
            })?;

        let (articles, more) = parse_article_payload(&payload)
            .map_err(|reason| FetchError::Payload {
                url: url.clone(),
                reason,
            })?;

        let page_count = articles.len();
        debug!(%location, page, count = page_count, "Structured page fetched");
        records.extend(articles.into_iter().map(RawRecord::Structured));

        if page_count == 0 || !more {
            break;
        }
    }

    Ok(records)
}

/// Decodes a listing-query payload into articles plus the more-pages flag.
/// Individual articles that fail to decode are dropped; one bad record must
/// not sink the page.
fn parse_article_payload(payload: &str) -> Result<(Vec<Article>, bool), String> {
    let decoded: ArticleListResponse =
        serde_json::from_str(payload).map_err(|e| e.to_string())?;

    // A decodable body with a non-success code is a zero-listing page, not
    // a failure; records from earlier pages stay valid.
    if decoded.code.as_deref() != Some("success") {
        debug!(
            code = decoded.code.as_deref().unwrap_or("no status"),
            "Listing query reported non-success"
        );
        return Ok((Vec::new(), false));
    }

    let raw_articles = decoded.body.unwrap_or_default();
    let total = raw_articles.len();
    let articles: Vec<Article> = raw_articles
        .into_iter()
        .filter_map(|value| serde_json::from_value(value).ok())
        .collect();
    if articles.len() < total {
        debug!(dropped = total - articles.len(), "Dropped undecodable articles");
    }

    Ok((articles, decoded.more.unwrap_or(false)))
}

/// Renders the location's listing page in a fresh tab and takes the text of
/// up to `max_rendered_items` cards.
pub(crate) async fn fetch_rendered(
    session: &Session,
    config: &ScraperConfig,
    options: &SearchOptions,
    location: &Location,
) -> Result<Vec<RawRecord>, FetchError> {
    let url = match location {
        Location::Area { name, .. } => config.area_page_url(name),
        Location::Cluster { lat, lon, .. } => {
            config.map_page_url(*lat, *lon, options.trade_type.upstream_code())
        }
    };

    let tab = session.open_tab().map_err(FetchError::Render)?;
    let settle = Duration::from_secs(config.render_settle_secs);
    let page_url = url.clone();

    // The browser protocol is synchronous and the settle wait blocks, so
    // the whole navigation runs off the runtime threads. The tab is closed
    // whether or not the render worked.
    let html = tokio::task::spawn_blocking(move || {
        let content = render_page(&tab, &page_url, settle);
        let _ = tab.close(false);
        content
    })
    .await
    .map_err(|e| FetchError::Render(anyhow::Error::new(e)))?
    .map_err(FetchError::Render)?;

    let records = extract_card_records(&html, config.max_rendered_items);
    debug!(%location, count = records.len(), url = %url, "Rendered page extracted");
    Ok(records)
}

fn render_page(tab: &Tab, url: &str, settle: Duration) -> anyhow::Result<String> {
    tab.navigate_to(url)?;
    tab.wait_until_navigated()?;
    std::thread::sleep(settle);
    tab.get_content()
}

/// Candidate card selectors, most specific first. The mobile markup drifts,
/// so the first selector that matches anything wins.
const CARD_SELECTORS: &[&str] = &[".item_link", ".item_inner", "div.item", "li.item"];

/// Pulls listing cards out of rendered HTML as flattened text plus the card
/// link when the markup carries one.
fn extract_card_records(html: &str, max_items: usize) -> Vec<RawRecord> {
    let document = Html::parse_document(html);

    for candidate in CARD_SELECTORS {
        let Ok(selector) = Selector::parse(candidate) else {
            continue;
        };
        let anchor = Selector::parse("a").unwrap();

        let records: Vec<RawRecord> = document
            .select(&selector)
            .take(max_items)
            .enumerate()
            .map(|(ordinal, card)| {
                let text = card
                    .text()
                    .collect::<Vec<_>>()
                    .join(" ")
                    .split_whitespace()
                    .collect::<Vec<_>>()
                    .join(" ");
                let href = card
                    .value()
                    .attr("href")
                    .map(str::to_string)
                    .or_else(|| {
                        card.select(&anchor)
                            .find_map(|a| a.value().attr("href"))
                            .map(str::to_string)
                    });
                RawRecord::Rendered {
                    text,
                    href,
                    ordinal,
                }
            })
            .collect();

        if !records.is_empty() {
            return records;
        }
    }

    Vec::new()
}
