//! User agent handling for portal requests.

/// User agent shared by the bootstrap browser and the HTTP session.
///
/// Session cookies issued to the browser are only honoured for requests that
/// look like they come from the same client.
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";

/// Resolve user agent from config value.
/// - None or empty => browser user agent
/// - other => custom user agent string
pub fn resolve_user_agent(config: Option<&str>) -> String {
    match config.map(str::trim) {
        None | Some("") => BROWSER_USER_AGENT.to_string(),
        Some(custom) => custom.to_string(),
    }
}
