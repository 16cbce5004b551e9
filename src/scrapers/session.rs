//! Browsing/network session lifecycle.
//!
//! A session bundles the HTTP client the structured strategy talks through
//! and the headless browser the rendered fallback drives. It is owned by
//! exactly one scraper instance and must never be shared across concurrent
//! searches; isolation between regions comes from opening a fresh tab per
//! region.

use std::ffi::OsStr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use headless_chrome::{Browser, LaunchOptions, Tab};
use reqwest::Client;

use crate::config::ScraperConfig;
use crate::error::ScrapeError;

pub struct Session {
    http: Client,
    browser: Browser,
    user_agent: String,
}

impl Session {
    /// Acquires a fresh session. Failure here is fatal to the whole search,
    /// so both resources must come up before anything is fetched.
    pub(crate) async fn acquire(config: &ScraperConfig) -> Result<Self, ScrapeError> {
        let http = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .cookie_store(true)
            .build()
            .map_err(ScrapeError::HttpClient)?;

        // Chrome launch is synchronous; keep it off the runtime threads.
        let browser = tokio::task::spawn_blocking(launch_browser)
            .await
            .map_err(|e| ScrapeError::BrowserLaunch(anyhow::Error::new(e)))?
            .map_err(ScrapeError::BrowserLaunch)?;

        Ok(Self {
            http,
            browser,
            user_agent: config.user_agent.clone(),
        })
    }

    pub(crate) fn http(&self) -> &Client {
        &self.http
    }

    /// Opens an isolated tab for one region, already wearing the mobile
    /// user agent. The caller closes it when the region is done.
    pub(crate) fn open_tab(&self) -> Result<Arc<Tab>> {
        let tab = self.browser.new_tab()?;
        tab.set_user_agent(&self.user_agent, None, None)?;
        Ok(tab)
    }
}

fn launch_browser() -> Result<Browser> {
    let options = LaunchOptions::default_builder()
        .headless(true)
        .sandbox(false)
        .args(vec![
            OsStr::new("--disable-gpu"),
            OsStr::new("--disable-dev-shm-usage"),
        ])
        .idle_browser_timeout(Duration::from_secs(600))
        .build()
        .context("Failed to build launch options")?;

    Browser::new(options).context("Failed to launch Chrome browser")
}
