use thiserror::Error;

/// Failures that abort a search.
///
/// Only session acquisition is fatal; every other failure class is recovered
/// inside the search loop and surfaces as a smaller result set.
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("failed to launch the browser session")]
    BrowserLaunch(#[source] anyhow::Error),

    #[error("failed to build the http client")]
    HttpClient(#[source] reqwest::Error),
}

/// Per-location failures inside a search.
///
/// The orchestrating loop logs these and treats the location as having
/// yielded zero records; they never cross the public boundary.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} failed")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned status {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("unusable payload from {url}: {reason}")]
    Payload { url: String, reason: String },

    #[error("rendered-page extraction failed")]
    Render(#[source] anyhow::Error),
}
