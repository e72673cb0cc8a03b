//! Cookie loading and saving for browser sessions.

use std::path::Path;

use tracing::info;

use super::types::BrowserCookie;
use crate::scrapers::error::TransportError;

fn cookies_error(path: &Path, reason: impl ToString) -> TransportError {
    TransportError::Cookies {
        path: path.display().to_string(),
        reason: reason.to_string(),
    }
}

/// Load cookies from a JSON file (an array of cookie objects, as written by
/// [`save_cookies`] or exported from browser dev tools).
pub fn load_cookies(path: &Path) -> Result<Vec<BrowserCookie>, TransportError> {
    if !path.exists() {
        return Err(cookies_error(path, "file not found"));
    }

    let content = std::fs::read_to_string(path).map_err(|e| cookies_error(path, e))?;
    let cookies: Vec<BrowserCookie> =
        serde_json::from_str(&content).map_err(|e| cookies_error(path, e))?;

    if cookies.is_empty() {
        return Err(cookies_error(path, "no cookies in file"));
    }

    info!("Loaded {} cookies from {:?}", cookies.len(), path);
    Ok(cookies)
}

/// Save cookies to a JSON file, creating parent directories.
pub fn save_cookies(cookies: &[BrowserCookie], path: &Path) -> Result<(), TransportError> {
    let json = serde_json::to_string_pretty(cookies).map_err(|e| cookies_error(path, e))?;
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|e| cookies_error(path, e))?;
        }
    }
    std::fs::write(path, json).map_err(|e| cookies_error(path, e))?;

    info!("Saved {} cookies to {:?}", cookies.len(), path);
    Ok(())
}
