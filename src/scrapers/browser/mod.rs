//! Headless browser used to bootstrap portal session cookies.
//!
//! Uses chromiumoxide (CDP). The browser visits the portal home page once,
//! the cookies it receives are captured, and the browser is shut down before
//! any crawl traffic starts.

mod config;
mod cookies;
mod types;

pub use config::{BrowserEngineConfig, BrowserEngineType};
pub use cookies::{load_cookies, save_cookies};
pub use types::BrowserCookie;

#[cfg(feature = "browser")]
use std::path::PathBuf;
#[cfg(feature = "browser")]
use std::time::Duration;

#[cfg(feature = "browser")]
use chromiumoxide::cdp::browser_protocol::network::{GetCookiesParams, SetUserAgentOverrideParams};
#[cfg(feature = "browser")]
use chromiumoxide::{Browser, BrowserConfig, Page};
#[cfg(feature = "browser")]
use futures::StreamExt;
#[cfg(feature = "browser")]
use tokio::task::JoinHandle;
#[cfg(feature = "browser")]
use tracing::{debug, info, warn};

use super::error::TransportError;

#[cfg(feature = "browser")]
fn browser_error(context: &str, e: impl std::fmt::Display) -> TransportError {
    TransportError::Browser(format!("{}: {}", context, e))
}

/// Browser driver that captures the cookies a page sets.
#[cfg(feature = "browser")]
pub struct BrowserFetcher {
    config: BrowserEngineConfig,
    user_agent: String,
    browser: Option<Browser>,
    handler: Option<JoinHandle<()>>,
}

#[cfg(feature = "browser")]
impl BrowserFetcher {
    /// Common Chrome executable paths to check.
    const CHROME_PATHS: &'static [&'static str] = &[
        // Linux
        "/usr/bin/google-chrome",
        "/usr/bin/google-chrome-stable",
        "/usr/bin/chromium",
        "/usr/bin/chromium-browser",
        "/snap/bin/chromium",
        // macOS
        "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
        "/Applications/Chromium.app/Contents/MacOS/Chromium",
        // Common install locations
        "/opt/google/chrome/google-chrome",
    ];

    const CHROME_COMMANDS: &'static [&'static str] = &[
        "google-chrome",
        "google-chrome-stable",
        "chromium",
        "chromium-browser",
    ];

    /// `user_agent` must match the HTTP session that will reuse the cookies.
    pub fn new(config: BrowserEngineConfig, user_agent: String) -> Self {
        Self {
            config,
            user_agent,
            browser: None,
            handler: None,
        }
    }

    /// Find a Chrome executable: configured path, well-known paths, then `PATH`.
    fn find_chrome(&self) -> Result<PathBuf, TransportError> {
        if let Some(ref path) = self.config.executable {
            if path.exists() {
                return Ok(path.clone());
            }
            return Err(TransportError::Browser(format!(
                "configured browser executable not found: {}",
                path.display()
            )));
        }

        for path in Self::CHROME_PATHS {
            let p = std::path::Path::new(path);
            if p.exists() {
                info!("Found Chrome at: {}", path);
                return Ok(p.to_path_buf());
            }
        }

        for cmd in Self::CHROME_COMMANDS {
            if let Ok(path) = which::which(cmd) {
                info!("Found Chrome in PATH: {}", path.display());
                return Ok(path);
            }
        }

        Err(TransportError::Browser(
            "Chrome/Chromium not found. Install chromium, set browser.executable, \
             or point EDISCLOSE_BROWSER_URL at a running DevTools endpoint"
                .to_string(),
        ))
    }

    /// Launch or connect to browser if not already running.
    async fn ensure_browser(&mut self) -> Result<(), TransportError> {
        if self.browser.is_some() {
            return Ok(());
        }

        if let Some(remote_url) = self.config.remote_url.clone() {
            return self.connect_remote(&remote_url).await;
        }

        info!("Launching browser (headless={})", self.config.headless);
        let chrome_path = self.find_chrome()?;

        let mut builder = BrowserConfig::builder().chrome_executable(chrome_path);

        // with_head means NOT headless
        if !self.config.headless {
            builder = builder.with_head();
        }

        if let Some(ref proxy) = self.config.proxy {
            builder = builder.arg(format!("--proxy-server={}", proxy));
        }

        builder = builder
            .arg("--disable-blink-features=AutomationControlled")
            .arg("--disable-infobars")
            .arg("--disable-dev-shm-usage")
            .arg("--no-first-run")
            .arg("--no-default-browser-check")
            .arg("--disable-background-networking")
            .arg("--disable-sync")
            .arg("--no-sandbox")
            .arg("--disable-gpu");

        for arg in &self.config.chrome_args {
            builder = builder.arg(arg);
        }

        let config = builder
            .build()
            .map_err(|e| browser_error("Failed to build browser config", e))?;

        let (browser, handler) = Browser::launch(config)
            .await
            .map_err(|e| browser_error("Failed to launch browser", e))?;

        self.attach(browser, handler);
        Ok(())
    }

    /// Connect to a remote Chrome instance.
    async fn connect_remote(&mut self, url: &str) -> Result<(), TransportError> {
        info!("Connecting to remote browser at {}", url);

        // Resolve the WebSocket URL from the /json/version endpoint
        let http_url = url
            .replace("ws://", "http://")
            .replace("wss://", "https://");
        let version_url = format!("{}/json/version", http_url.trim_end_matches('/'));

        let resp: serde_json::Value = reqwest::Client::new()
            .get(&version_url)
            .timeout(Duration::from_secs(self.config.timeout))
            .send()
            .await
            .map_err(|e| browser_error("Failed to connect to remote browser", e))?
            .json()
            .await
            .map_err(|e| browser_error("Failed to parse browser version info", e))?;

        let ws_url = resp
            .get("webSocketDebuggerUrl")
            .and_then(|v| v.as_str())
            .ok_or_else(|| {
                TransportError::Browser("remote browser did not report webSocketDebuggerUrl".into())
            })?;

        let (browser, handler) = Browser::connect(ws_url)
            .await
            .map_err(|e| browser_error("Failed to connect to remote browser", e))?;

        self.attach(browser, handler);
        Ok(())
    }

    fn attach(&mut self, browser: Browser, mut handler: chromiumoxide::Handler) {
        let task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });
        self.browser = Some(browser);
        self.handler = Some(task);
    }

    /// Visit `url` and return every cookie the browser holds for it.
    pub async fn capture_cookies(&mut self, url: &str) -> Result<Vec<BrowserCookie>, TransportError> {
        self.ensure_browser().await?;

        let browser = self
            .browser
            .as_ref()
            .ok_or_else(|| TransportError::Browser("browser not initialized".into()))?;
        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| browser_error("Failed to open page", e))?;

        // Close the page whatever the outcome
        let result = self.capture_inner(&page, url).await;
        if let Err(e) = page.close().await {
            warn!("Failed to close page: {}", e);
        }
        result
    }

    async fn capture_inner(
        &self,
        page: &Page,
        url: &str,
    ) -> Result<Vec<BrowserCookie>, TransportError> {
        page.execute(SetUserAgentOverrideParams::new(self.user_agent.clone()))
            .await
            .map_err(|e| browser_error("Failed to set user agent", e))?;

        info!("Navigating to {}", url);
        let timeout = Duration::from_secs(self.config.timeout);
        tokio::time::timeout(timeout, page.goto(url))
            .await
            .map_err(|_| {
                TransportError::Browser(format!(
                    "Navigation timed out after {}s for {}",
                    self.config.timeout, url
                ))
            })?
            .map_err(|e| browser_error(&format!("Navigation failed for {}", url), e))?;

        let params = GetCookiesParams::builder()
            .urls(vec![url.to_string()])
            .build();
        let cookies = match page.execute(params).await {
            Ok(result) => result.result.cookies,
            Err(e) => {
                warn!("Failed to get cookies via CDP: {}, trying page.get_cookies()", e);
                page.get_cookies()
                    .await
                    .map_err(|e| browser_error("Failed to read cookies", e))?
            }
        };

        debug!("Got {} cookies from browser", cookies.len());
        Ok(cookies
            .iter()
            .map(|c| BrowserCookie {
                name: c.name.clone(),
                value: c.value.clone(),
                domain: c.domain.clone(),
                path: c.path.clone(),
                secure: c.secure,
                http_only: c.http_only,
            })
            .collect())
    }

    /// Shut the browser down (or disconnect from a remote one).
    pub async fn close(&mut self) {
        if let Some(mut browser) = self.browser.take() {
            if self.config.remote_url.is_none() {
                if let Err(e) = browser.close().await {
                    warn!("Failed to close browser: {}", e);
                }
                if let Err(e) = browser.wait().await {
                    warn!("Failed waiting for browser exit: {}", e);
                }
            }
        }
        if let Some(handler) = self.handler.take() {
            handler.abort();
        }
    }
}

/// Placeholder when built without the `browser` feature.
#[cfg(not(feature = "browser"))]
pub struct BrowserFetcher {
    _config: BrowserEngineConfig,
}

#[cfg(not(feature = "browser"))]
impl BrowserFetcher {
    pub fn new(config: BrowserEngineConfig, _user_agent: String) -> Self {
        Self { _config: config }
    }

    pub async fn capture_cookies(
        &mut self,
        _url: &str,
    ) -> Result<Vec<BrowserCookie>, TransportError> {
        Err(TransportError::Browser(
            "built without the `browser` feature; use the cookies engine".to_string(),
        ))
    }

    pub async fn close(&mut self) {}
}
