//! Session bootstrap: obtain portal cookies, hand them to an HTTP session.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use tracing::info;

use super::browser::{
    load_cookies, save_cookies, BrowserCookie, BrowserEngineConfig, BrowserEngineType,
    BrowserFetcher,
};
use super::config::PortalConfig;
use super::error::TransportError;
use super::http_client::{resolve_user_agent, HttpSession, PortalTransport};
use crate::config::Config;

/// Source of an authenticated portal session.
#[async_trait]
pub trait SessionProvider: Send + Sync {
    type Session: PortalTransport;

    /// Obtain a ready-to-use session. Failure is fatal for the run.
    async fn acquire_session(&self) -> Result<Self::Session, TransportError>;
}

/// Drives a real browser to the portal home page and reuses its cookies.
pub struct BrowserSessionProvider {
    portal: PortalConfig,
    browser: BrowserEngineConfig,
    save_cookies_to: Option<PathBuf>,
}

impl BrowserSessionProvider {
    pub fn new(portal: PortalConfig, browser: BrowserEngineConfig) -> Self {
        Self {
            portal,
            browser,
            save_cookies_to: None,
        }
    }

    /// Also write the captured cookies to `path`.
    pub fn with_saved_cookies(mut self, path: PathBuf) -> Self {
        self.save_cookies_to = Some(path);
        self
    }
}

#[async_trait]
impl SessionProvider for BrowserSessionProvider {
    type Session = HttpSession;

    async fn acquire_session(&self) -> Result<HttpSession, TransportError> {
        let user_agent = resolve_user_agent(self.portal.user_agent.as_deref());
        info!("Fetching session cookies from {}", self.portal.home_url);

        let mut fetcher = BrowserFetcher::new(self.browser.clone(), user_agent.clone());
        let captured = fetcher.capture_cookies(&self.portal.home_url).await;
        // The browser is gone before any crawl request is made.
        fetcher.close().await;
        let cookies = captured?;

        if let Some(ref path) = self.save_cookies_to {
            save_cookies(&cookies, path)?;
        }

        build_session(&self.portal, &cookies, &user_agent)
    }
}

/// Reuses cookies saved earlier instead of launching a browser.
pub struct CookieFileSessionProvider {
    portal: PortalConfig,
    path: PathBuf,
}

impl CookieFileSessionProvider {
    pub fn new(portal: PortalConfig, path: PathBuf) -> Self {
        Self { portal, path }
    }
}

#[async_trait]
impl SessionProvider for CookieFileSessionProvider {
    type Session = HttpSession;

    async fn acquire_session(&self) -> Result<HttpSession, TransportError> {
        let cookies = load_cookies(&self.path)?;
        let user_agent = resolve_user_agent(self.portal.user_agent.as_deref());
        build_session(&self.portal, &cookies, &user_agent)
    }
}

/// Provider selected by `browser.engine`.
pub enum PortalSessionProvider {
    Browser(BrowserSessionProvider),
    CookieFile(CookieFileSessionProvider),
}

impl PortalSessionProvider {
    pub fn from_config(
        config: &Config,
        save_cookies_to: Option<PathBuf>,
    ) -> Result<Self, TransportError> {
        match config.browser.engine {
            BrowserEngineType::Chrome => {
                let mut provider =
                    BrowserSessionProvider::new(config.portal.clone(), config.browser.clone());
                if let Some(path) = save_cookies_to {
                    provider = provider.with_saved_cookies(path);
                }
                Ok(Self::Browser(provider))
            }
            BrowserEngineType::Cookies => {
                let path = config.browser.cookies_file.clone().ok_or_else(|| {
                    TransportError::Cookies {
                        path: String::new(),
                        reason: "browser.cookies_file is required for the cookies engine"
                            .to_string(),
                    }
                })?;
                Ok(Self::CookieFile(CookieFileSessionProvider::new(
                    config.portal.clone(),
                    path,
                )))
            }
        }
    }
}

#[async_trait]
impl SessionProvider for PortalSessionProvider {
    type Session = HttpSession;

    async fn acquire_session(&self) -> Result<HttpSession, TransportError> {
        match self {
            Self::Browser(p) => p.acquire_session().await,
            Self::CookieFile(p) => p.acquire_session().await,
        }
    }
}

fn build_session(
    portal: &PortalConfig,
    cookies: &[BrowserCookie],
    user_agent: &str,
) -> Result<HttpSession, TransportError> {
    let session = HttpSession::with_cookies(
        cookies,
        &portal.home_url,
        user_agent,
        Duration::from_secs(portal.request_timeout),
    )?;
    info!("Session ready with {} cookies", session.cookie_count());
    Ok(session)
}
