//! Portal access: session bootstrap, search listing, detail pages.

pub mod browser;
pub mod config;
pub mod detail;
pub mod error;
mod http_client;
pub mod listing;
pub mod search;
pub mod session;

pub use browser::{BrowserCookie, BrowserEngineConfig, BrowserEngineType, BrowserFetcher};
pub use config::{PortalConfig, SearchConfig};
pub use detail::{extract_summary, fetch_detail};
pub use error::{ParseError, ScrapeError, TransportError};
pub use http_client::{resolve_user_agent, HttpSession, PortalTransport, BROWSER_USER_AGENT};
pub use listing::ListingPage;
pub use search::fetch_page;
pub use session::{
    BrowserSessionProvider, CookieFileSessionProvider, PortalSessionProvider, SessionProvider,
};
