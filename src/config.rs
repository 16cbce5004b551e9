//! Deployment configuration for the scraper.
//!
//! Everything the upstream forces on us lives here: endpoint bases, the
//! fixed bounding region, throttle and timeout values, and the caps that
//! bound total request volume. None of it is user-supplied per search.

/// Which region-iteration strategy feeds the listing fetcher.
///
/// Bounding-box clustering is the authoritative mode; the named-area table
/// is kept for deployments that still rely on the curated code list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegionMode {
    NamedAreas,
    BoundingBox,
}

/// Geographic box the cluster query runs over, WGS84 degrees.
#[derive(Debug, Clone, Copy)]
pub struct BoundingBox {
    pub top: f64,
    pub bottom: f64,
    pub left: f64,
    pub right: f64,
    /// Map zoom level the upstream aggregates clusters at
    pub zoom: u8,
}

impl BoundingBox {
    pub fn center_lat(&self) -> f64 {
        (self.top + self.bottom) / 2.0
    }

    pub fn center_lon(&self) -> f64 {
        (self.left + self.right) / 2.0
    }
}

#[derive(Debug, Clone)]
pub struct ScraperConfig {
    /// Mobile site base, no trailing slash
    pub base_url: String,
    /// Mobile user agent sent on every request, browser included
    pub user_agent: String,
    /// Upstream realty-type code (one-room)
    pub realty_type: String,
    pub region_mode: RegionMode,
    pub bounding_box: BoundingBox,
    /// Minimum spacing between upstream requests
    pub request_delay_ms: u64,
    /// Applies to every upstream call; expiry counts as a failed fetch
    pub request_timeout_secs: u64,
    /// Wait after navigation before the rendered page is read
    pub render_settle_secs: u64,
    /// Densest-first cluster cap per search
    pub max_clusters: usize,
    /// Element cap when extracting from a rendered page
    pub max_rendered_items: usize,
    /// Page cap per location identifier on the structured endpoint
    pub max_pages: u32,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            base_url: "https://m.land.naver.com".to_string(),
            user_agent: "Mozilla/5.0 (iPhone; CPU iPhone OS 16_5 like Mac OS X) \
                         AppleWebKit/605.1.15 (KHTML, like Gecko) Version/16.5 \
                         Mobile/15E148 Safari/604.1"
                .to_string(),
            realty_type: "OR".to_string(),
            region_mode: RegionMode::BoundingBox,
            // Hongdae / Mapo-gu cell
            bounding_box: BoundingBox {
                top: 37.5663,
                bottom: 37.5450,
                left: 126.9035,
                right: 126.9370,
                zoom: 14,
            },
            request_delay_ms: 400,
            request_timeout_secs: 15,
            render_settle_secs: 3,
            max_clusters: 5,
            max_rendered_items: 30,
            max_pages: 3,
        }
    }
}

impl ScraperConfig {
    /// Structured listing-query endpoint
    pub fn article_list_url(&self) -> String {
        format!("{}/cluster/ajax/articleList", self.base_url)
    }

    /// Aggregate density-cluster endpoint
    pub fn cluster_list_url(&self) -> String {
        format!("{}/cluster/clusterList", self.base_url)
    }

    /// Canonical detail page for a listing id
    pub fn article_detail_url(&self, article_no: &str) -> String {
        format!("{}/article/info/{}", self.base_url, article_no)
    }

    /// Rendered map page centered on a coordinate, used by the fallback
    /// strategy for a cluster cell.
    pub fn map_page_url(&self, lat: f64, lon: f64, trade_code: &str) -> String {
        format!(
            "{}/map/{}:{}:{}/{}/{}",
            self.base_url, lat, lon, self.bounding_box.zoom, self.realty_type, trade_code
        )
    }

    /// Rendered search-result page for a named area, used by the fallback
    /// strategy in named-area mode.
    pub fn area_page_url(&self, area_name: &str) -> String {
        format!(
            "{}/search/result/{}",
            self.base_url,
            urlencoding::encode(area_name)
        )
    }
}
