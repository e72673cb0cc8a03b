//! Listing and enriched disclosure records.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::ContentHash;

/// Timestamp layout used inside content hashes.
const HASH_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// One row of a search result page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingRecord {
    /// Event ID taken from the detail link query string, when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Publication time as shown by the portal (portal local time).
    pub timestamp: NaiveDateTime,
    pub organization: String,
    pub title: String,
    /// Absolute URL of the detail page.
    pub detail_url: String,
}

impl ListingRecord {
    /// Content hash over all listing fields.
    ///
    /// This is both the in-page dedup key and the cache key.
    pub fn content_hash(&self) -> ContentHash {
        ContentHash::of_fields([
            ("id", self.id.as_deref().map_or(Value::Null, |id| json!(id))),
            (
                "timestamp",
                json!(self.timestamp.format(HASH_TIMESTAMP_FORMAT).to_string()),
            ),
            ("organization", json!(self.organization)),
            ("title", json!(self.title)),
            ("detail_url", json!(self.detail_url)),
        ])
    }

    /// Attach the detail page text.
    pub fn enrich(self, summary: String) -> EnrichedRecord {
        EnrichedRecord {
            listing: self,
            summary,
        }
    }
}

/// A listing record together with the full text of its detail page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrichedRecord {
    #[serde(flatten)]
    pub listing: ListingRecord,
    pub summary: String,
}

impl EnrichedRecord {
    pub fn content_hash(&self) -> ContentHash {
        self.listing.content_hash()
    }

    pub fn timestamp(&self) -> NaiveDateTime {
        self.listing.timestamp
    }

    pub fn organization(&self) -> &str {
        &self.listing.organization
    }

    pub fn title(&self) -> &str {
        &self.listing.title
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn listing() -> ListingRecord {
        ListingRecord {
            id: Some("42".to_string()),
            timestamp: NaiveDate::from_ymd_opt(2024, 3, 1)
                .unwrap()
                .and_hms_opt(10, 30, 0)
                .unwrap(),
            organization: "Acme".to_string(),
            title: "Board meeting".to_string(),
            detail_url: "https://portal.test/event?EventId=42".to_string(),
        }
    }

    #[test]
    fn test_hash_ignores_summary() {
        let record = listing();
        let hash = record.content_hash();
        let enriched = record.enrich("Full text".to_string());
        assert_eq!(enriched.content_hash(), hash);
    }

    #[test]
    fn test_hash_depends_on_every_field() {
        let base = listing().content_hash();

        let mut other = listing();
        other.id = None;
        assert_ne!(other.content_hash(), base);

        let mut other = listing();
        other.title.push('!');
        assert_ne!(other.content_hash(), base);

        let mut other = listing();
        other.timestamp = other.timestamp + chrono::Duration::minutes(1);
        assert_ne!(other.content_hash(), base);
    }

    #[test]
    fn test_enriched_serializes_flat() {
        let enriched = listing().enrich("Body".to_string());
        let value = serde_json::to_value(&enriched).unwrap();
        assert_eq!(value["organization"], "Acme");
        assert_eq!(value["summary"], "Body");

        let back: EnrichedRecord = serde_json::from_value(value).unwrap();
        assert_eq!(back, enriched);
    }
}
