//! Browser session types.

use serde::{Deserialize, Serialize};

/// Cookie extracted from a browser session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrowserCookie {
    #[serde(alias = "key")]
    pub name: String,
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub domain: String,
    #[serde(default = "default_path")]
    pub path: String,
    #[serde(default)]
    pub secure: bool,
    #[serde(default, alias = "httpOnly")]
    pub http_only: bool,
}

fn default_path() -> String {
    "/".to_string()
}

impl BrowserCookie {
    /// `Set-Cookie` style string for installing into an HTTP cookie jar.
    pub fn header_value(&self) -> String {
        let mut value = format!("{}={}", self.name, self.value);
        if !self.domain.is_empty() {
            value.push_str(&format!("; Domain={}", self.domain));
        }
        if !self.path.is_empty() {
            value.push_str(&format!("; Path={}", self.path));
        }
        if self.secure {
            value.push_str("; Secure");
        }
        if self.http_only {
            value.push_str("; HttpOnly");
        }
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_value() {
        let cookie = BrowserCookie {
            name: "sid".to_string(),
            value: "abc".to_string(),
            domain: ".portal.test".to_string(),
            path: "/".to_string(),
            secure: true,
            http_only: true,
        };
        assert_eq!(
            cookie.header_value(),
            "sid=abc; Domain=.portal.test; Path=/; Secure; HttpOnly"
        );
    }

    #[test]
    fn test_deserialize_devtools_export() {
        let cookie: BrowserCookie =
            serde_json::from_str(r#"{"key": "sid", "value": "1", "domain": "portal.test", "httpOnly": true}"#)
                .unwrap();
        assert_eq!(cookie.name, "sid");
        assert_eq!(cookie.path, "/");
        assert!(cookie.http_only);
        assert!(!cookie.secure);
    }
}
