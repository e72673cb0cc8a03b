//! Detail page retrieval.

use scraper::{ElementRef, Html, Node, Selector};
use tracing::debug;

use super::config::PortalConfig;
use super::error::{ParseError, ScrapeError};
use super::http_client::PortalTransport;
use crate::models::{EnrichedRecord, ListingRecord};
use crate::utils::collapse_whitespace;

/// Elements whose start begins a new line of summary text.
const BLOCK_TAGS: &[&str] = &[
    "br", "p", "div", "tr", "li", "h1", "h2", "h3", "h4", "h5", "h6", "table", "ul", "ol",
];

/// GET the record's detail page and attach its text as the summary.
pub async fn fetch_detail<T: PortalTransport + ?Sized>(
    transport: &T,
    portal: &PortalConfig,
    record: ListingRecord,
) -> Result<EnrichedRecord, ScrapeError> {
    let html = transport.get(&record.detail_url).await?;
    let summary = extract_summary(&html, &portal.content_selector, &record.detail_url)?;
    debug!(
        "Fetched detail for {} ({} chars)",
        record.detail_url,
        summary.chars().count()
    );
    Ok(record.enrich(summary))
}

/// Text of the first element matching `content_selector`.
///
/// Block elements start new lines; whitespace inside a line is collapsed and
/// blank lines are dropped.
pub fn extract_summary(
    html: &str,
    content_selector: &str,
    url: &str,
) -> Result<String, ParseError> {
    let selector = Selector::parse(content_selector).map_err(|_| ParseError::Selector {
        selector: content_selector.to_string(),
    })?;
    let document = Html::parse_document(html);
    let region = document
        .select(&selector)
        .next()
        .ok_or_else(|| ParseError::MissingContent {
            url: url.to_string(),
            selector: content_selector.to_string(),
        })?;
    Ok(block_text(region))
}

fn block_text(region: ElementRef<'_>) -> String {
    let mut raw = String::new();
    for node in region.descendants() {
        match node.value() {
            Node::Text(text) => raw.push_str(text),
            Node::Element(el) if BLOCK_TAGS.contains(&el.name()) => raw.push('\n'),
            _ => {}
        }
    }

    raw.lines()
        .map(collapse_whitespace)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scrapers::error::TransportError;
    use async_trait::async_trait;
    use chrono::NaiveDate;

    const PAGE: &str = r#"
        <html><body>
          <div id="menu">Menu</div>
          <div id="cont_wrap">
            <h2>Сообщение</h2>
            <p>Полное   фирменное наименование: <b>ПАО</b> «Ромашка»</p>

            <p>Дата&nbsp;события: 01.02.2024</p>
          </div>
        </body></html>"#;

    struct PageTransport {
        status: Option<u16>,
    }

    #[async_trait]
    impl PortalTransport for PageTransport {
        async fn post_form(
            &self,
            url: &str,
            _form: &[(String, String)],
        ) -> Result<String, TransportError> {
            Err(TransportError::Status {
                url: url.to_string(),
                status: 405,
            })
        }

        async fn get(&self, url: &str) -> Result<String, TransportError> {
            match self.status {
                Some(status) => Err(TransportError::Status {
                    url: url.to_string(),
                    status,
                }),
                None => Ok(PAGE.to_string()),
            }
        }
    }

    fn listing() -> ListingRecord {
        ListingRecord {
            id: Some("1".to_string()),
            timestamp: NaiveDate::from_ymd_opt(2024, 2, 1)
                .unwrap()
                .and_hms_opt(12, 0, 0)
                .unwrap(),
            organization: "ПАО «Ромашка»".to_string(),
            title: "Сообщение".to_string(),
            detail_url: "https://portal.test/event?EventId=1".to_string(),
        }
    }

    #[test]
    fn test_extract_summary_keeps_blocks_on_lines() {
        let summary = extract_summary(PAGE, "div#cont_wrap", "u").unwrap();
        assert_eq!(
            summary,
            "Сообщение\nПолное фирменное наименование: ПАО «Ромашка»\nДата события: 01.02.2024"
        );
    }

    #[test]
    fn test_missing_region_is_error() {
        let err = extract_summary(PAGE, "div#content", "https://portal.test/e").unwrap_err();
        assert!(matches!(err, ParseError::MissingContent { .. }));
    }

    #[test]
    fn test_bad_selector_is_error() {
        assert!(matches!(
            extract_summary(PAGE, "div[", "u"),
            Err(ParseError::Selector { .. })
        ));
    }

    #[tokio::test]
    async fn test_fetch_detail_enriches_record() {
        let transport = PageTransport { status: None };
        let enriched = fetch_detail(&transport, &PortalConfig::default(), listing())
            .await
            .unwrap();
        assert_eq!(enriched.listing, listing());
        assert!(enriched.summary.starts_with("Сообщение\n"));
    }

    #[tokio::test]
    async fn test_fetch_detail_status_is_fatal() {
        let transport = PageTransport { status: Some(500) };
        let err = fetch_detail(&transport, &PortalConfig::default(), listing())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ScrapeError::Transport(TransportError::Status { status: 500, .. })
        ));
    }
}
