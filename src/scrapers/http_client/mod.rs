//! Cookie-seeded HTTP session used for all crawl traffic.

mod user_agent;

pub use user_agent::{resolve_user_agent, BROWSER_USER_AGENT};

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::cookie::Jar;
use reqwest::{Client, Response, Url};
use tracing::debug;

use super::browser::BrowserCookie;
use super::error::TransportError;

/// Authenticated request surface the crawl depends on.
///
/// Both calls return the response body and treat any non-2xx status as an
/// error.
#[async_trait]
pub trait PortalTransport: Send + Sync {
    /// POST a form-encoded payload.
    async fn post_form(&self, url: &str, form: &[(String, String)])
        -> Result<String, TransportError>;

    /// GET a page.
    async fn get(&self, url: &str) -> Result<String, TransportError>;
}

/// HTTP session carrying the cookies captured during bootstrap.
#[derive(Clone)]
pub struct HttpSession {
    client: Client,
    cookie_count: usize,
}

impl HttpSession {
    /// Build a session whose cookie jar is seeded with `cookies`.
    ///
    /// Cookies without a domain are scoped to `base_url`.
    pub fn with_cookies(
        cookies: &[BrowserCookie],
        base_url: &str,
        user_agent: &str,
        timeout: Duration,
    ) -> Result<Self, TransportError> {
        let base: Url = base_url.parse().map_err(|e: url::ParseError| {
            TransportError::InvalidUrl {
                url: base_url.to_string(),
                reason: e.to_string(),
            }
        })?;

        let jar = Jar::default();
        let mut installed = 0;
        for cookie in cookies {
            if cookie.name.is_empty() {
                continue;
            }
            let origin = cookie_origin(cookie, &base);
            jar.add_cookie_str(&cookie.header_value(), &origin);
            debug!("Installed cookie {} for {}", cookie.name, origin);
            installed += 1;
        }

        let client = Client::builder()
            .cookie_provider(Arc::new(jar))
            .user_agent(user_agent)
            .timeout(timeout)
            .gzip(true)
            .brotli(true)
            .build()
            .map_err(TransportError::Client)?;

        Ok(Self {
            client,
            cookie_count: installed,
        })
    }

    /// Number of cookies the session was seeded with.
    pub fn cookie_count(&self) -> usize {
        self.cookie_count
    }
}

#[async_trait]
impl PortalTransport for HttpSession {
    async fn post_form(
        &self,
        url: &str,
        form: &[(String, String)],
    ) -> Result<String, TransportError> {
        debug!("POST {} ({} fields)", url, form.len());
        let response = self
            .client
            .post(url)
            .form(form)
            .send()
            .await
            .map_err(|source| TransportError::Request {
                url: url.to_string(),
                source,
            })?;
        read_body(url, response).await
    }

    async fn get(&self, url: &str) -> Result<String, TransportError> {
        debug!("GET {}", url);
        let response =
            self.client
                .get(url)
                .send()
                .await
                .map_err(|source| TransportError::Request {
                    url: url.to_string(),
                    source,
                })?;
        read_body(url, response).await
    }
}

/// Reject non-success statuses, otherwise return the decoded body.
async fn read_body(url: &str, response: Response) -> Result<String, TransportError> {
    let status = response.status();
    if !status.is_success() {
        return Err(TransportError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }
    response
        .text()
        .await
        .map_err(|source| TransportError::Request {
            url: url.to_string(),
            source,
        })
}

/// URL a cookie should be registered under in the jar.
fn cookie_origin(cookie: &BrowserCookie, base: &Url) -> Url {
    let host = cookie.domain.trim_start_matches('.');
    if host.is_empty() {
        return base.clone();
    }
    format!("{}://{}/", base.scheme(), host)
        .parse()
        .unwrap_or_else(|_| base.clone())
}
