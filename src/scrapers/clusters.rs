//! Listing-density cluster discovery.
//!
//! In bounding-box mode the upstream is asked once which cells inside the
//! configured region actually hold listings; the densest cells are then
//! fetched first. Discovery failure is not fatal, it just means the region
//! contributes nothing to this search.

use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::ScraperConfig;
use crate::error::FetchError;
use crate::models::{LocationCluster, TradeType};
use crate::scrapers::session::Session;

/// Aggregate envelope. Field names belong to the upstream; every read is
/// optional because cells come back partially filled near region edges.
#[derive(Debug, Deserialize)]
struct ClusterListResponse {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    data: Option<ClusterData>,
}

#[derive(Debug, Deserialize)]
struct ClusterData {
    #[serde(rename = "ARTICLE", default)]
    article: Vec<ClusterCell>,
}

#[derive(Debug, Deserialize)]
struct ClusterCell {
    #[serde(default)]
    lgeo: Option<String>,
    #[serde(default)]
    count: Option<u32>,
    #[serde(default)]
    lat: Option<f64>,
    #[serde(default)]
    lon: Option<f64>,
}

/// Runs the aggregate query over the configured box and returns the densest
/// clusters first, capped at `max_clusters`. Any failure is logged and
/// yields an empty sequence so the surrounding search keeps going.
pub(crate) async fn discover_clusters(
    session: &Session,
    config: &ScraperConfig,
    trade_type: TradeType,
) -> Vec<LocationCluster> {
    match fetch_cluster_list(session, config, trade_type).await {
        Ok(clusters) => {
            debug!(count = clusters.len(), "Discovered listing clusters");
            clusters
        }
        Err(e) => {
            warn!(error = %e, "Cluster discovery failed, region yields nothing");
            Vec::new()
        }
    }
}

async fn fetch_cluster_list(
    session: &Session,
    config: &ScraperConfig,
    trade_type: TradeType,
) -> Result<Vec<LocationCluster>, FetchError> {
    let url = config.cluster_list_url();
    let bbox = &config.bounding_box;
    let query = [
        ("view", "atcl".to_string()),
        ("rletTpCd", config.realty_type.clone()),
        ("tradTpCd", trade_type.upstream_code().to_string()),
        ("z", bbox.zoom.to_string()),
        ("lat", bbox.center_lat().to_string()),
        ("lon", bbox.center_lon().to_string()),
        ("btm", bbox.bottom.to_string()),
        ("lft", bbox.left.to_string()),
        ("top", bbox.top.to_string()),
        ("rgt", bbox.right.to_string()),
    ];

    let response = session
        .http()
        .get(&url)
        .header(reqwest::header::REFERER, config.base_url.as_str())
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

    parse_cluster_payload(
        &payload,
        bbox.center_lat(),
        bbox.center_lon(),
        config.max_clusters,
    )
    .map_err(|reason| FetchError::Payload { url, reason })
}

/// Decodes the aggregate payload and ranks cells densest first. Cells with
/// no id are dropped; cells with no coordinate inherit the region center so
/// the fallback page still lands inside the box.
fn parse_cluster_payload(
    payload: &str,
    center_lat: f64,
    center_lon: f64,
    max_clusters: usize,
) -> Result<Vec<LocationCluster>, String> {
    let decoded: ClusterListResponse =
        serde_json::from_str(payload).map_err(|e| e.to_string())?;

    if decoded.code.as_deref() != Some("success") {
        return Err(format!(
            "upstream reported {}",
            decoded.code.as_deref().unwrap_or("no status")
        ));
    }

    let mut clusters: Vec<LocationCluster> = decoded
        .data
        .map(|data| data.article)
        .unwrap_or_default()
        .into_iter()
        .filter_map(|cell| {
            let cluster_id = cell.lgeo?;
            Some(LocationCluster {
                cluster_id,
                count: cell.count.unwrap_or(0),
                lat: cell.lat.unwrap_or(center_lat),
                lon: cell.lon.unwrap_or(center_lon),
            })
        })
        .collect();

    clusters.sort_by(|a, b| b.count.cmp(&a.count));
    clusters.truncate(max_clusters);
    Ok(clusters)
}

#[cfg(test)]
mod tests {
    use super::*;

    const CLUSTER_PAYLOAD: &str = r#"{
        "code": "success",
        "data": {
            "ARTICLE": [
                {"lgeo": "2130613116", "count": 37, "z": 14, "lat": 37.5563, "lon": 126.9221},
                {"lgeo": "2130613117", "count": 112, "z": 14, "lat": 37.5541, "lon": 126.9198},
                {"lgeo": "2130613118", "count": 4, "z": 14, "lat": 37.5587, "lon": 126.9253}
            ]
        }
    }"#;

    #[test]
    fn densest_cluster_comes_first() {
        let clusters = parse_cluster_payload(CLUSTER_PAYLOAD, 37.55, 126.92, 5).unwrap();
        assert_eq!(clusters.len(), 3);
        assert_eq!(clusters[0].cluster_id, "2130613117");
        assert_eq!(clusters[0].count, 112);
        assert_eq!(clusters[2].count, 4);
    }

    #[test]
    fn cluster_cap_applies_after_ranking() {
        let clusters = parse_cluster_payload(CLUSTER_PAYLOAD, 37.55, 126.92, 2).unwrap();
        assert_eq!(clusters.len(), 2);
        assert_eq!(clusters[0].count, 112);
        assert_eq!(clusters[1].count, 37);
    }

    #[test]
    fn cell_without_id_is_dropped() {
        let payload = r#"{
            "code": "success",
            "data": {"ARTICLE": [{"count": 9}, {"lgeo": "a", "count": 1, "lat": 1.0, "lon": 2.0}]}
        }"#;
        let clusters = parse_cluster_payload(payload, 37.55, 126.92, 5).unwrap();
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].cluster_id, "a");
    }

    #[test]
    fn missing_coordinates_inherit_region_center() {
        let payload = r#"{"code": "success", "data": {"ARTICLE": [{"lgeo": "b", "count": 2}]}}"#;
        let clusters = parse_cluster_payload(payload, 37.55, 126.92, 5).unwrap();
        assert_eq!(clusters[0].lat, 37.55);
        assert_eq!(clusters[0].lon, 126.92);
    }

    #[test]
    fn non_success_status_is_an_error() {
        let payload = r#"{"code": "error"}"#;
        assert!(parse_cluster_payload(payload, 0.0, 0.0, 5).is_err());
    }

    #[test]
    fn empty_data_is_fine() {
        let payload = r#"{"code": "success"}"#;
        let clusters = parse_cluster_payload(payload, 0.0, 0.0, 5).unwrap();
        assert!(clusters.is_empty());
    }

    #[test]
    fn garbage_payload_is_an_error() {
        assert!(parse_cluster_payload("<html>blocked</html>", 0.0, 0.0, 5).is_err());
    }
}
