//! Search result page parsing.
//!
//! A result page is a table whose rows look like
//!
//! ```text
//! <tr>
//!   <td>17.10.2024 14:35</td>
//!   <td><a href="/company?id=1">Organization</a> <a href="/event?EventId=9">Title</a></td>
//! </tr>
//! ```

use scraper::{ElementRef, Html, Selector};
use url::Url;

use super::error::ParseError;
use crate::models::ListingRecord;
use crate::utils::{collapse_whitespace, parse_portal_timestamp};

fn selector(s: &str) -> Result<Selector, ParseError> {
    Selector::parse(s).map_err(|_| ParseError::Selector {
        selector: s.to_string(),
    })
}

fn element_text(el: ElementRef<'_>) -> String {
    collapse_whitespace(&el.text().collect::<String>())
}

/// One parsed result page.
///
/// Rows are turned into records lazily by [`ListingPage::records`]. The parsed
/// document is not `Send`, so a page must be consumed before the next await.
pub struct ListingPage {
    document: Html,
    rows: Selector,
    cells: Selector,
    anchors: Selector,
}

impl ListingPage {
    pub fn parse(html: &str) -> Result<Self, ParseError> {
        Ok(Self {
            document: Html::parse_document(html),
            rows: selector("tr")?,
            cells: selector("td")?,
            anchors: selector("a")?,
        })
    }

    /// Records in page order.
    ///
    /// Rows without any `td` (header rows) are skipped. Every other row must
    /// be well formed; a malformed row yields an error in its place.
    /// `base_url` resolves relative detail links and `id_param` names the
    /// query parameter carrying the event ID (matched case-insensitively).
    pub fn records<'a>(
        &'a self,
        base_url: &'a Url,
        id_param: &'a str,
    ) -> impl Iterator<Item = Result<ListingRecord, ParseError>> + 'a {
        self.document
            .select(&self.rows)
            .enumerate()
            .filter_map(move |(index, row)| self.parse_row(index + 1, row, base_url, id_param))
    }

    fn parse_row(
        &self,
        row_number: usize,
        row: ElementRef<'_>,
        base_url: &Url,
        id_param: &str,
    ) -> Option<Result<ListingRecord, ParseError>> {
        let cells: Vec<ElementRef<'_>> = row.select(&self.cells).collect();
        if cells.is_empty() {
            return None;
        }
        Some(self.build_record(row_number, &cells, base_url, id_param))
    }

    fn build_record(
        &self,
        row: usize,
        cells: &[ElementRef<'_>],
        base_url: &Url,
        id_param: &str,
    ) -> Result<ListingRecord, ParseError> {
        if cells.len() < 2 {
            return Err(ParseError::MissingCells {
                row,
                found: cells.len(),
            });
        }

        let raw_timestamp = element_text(cells[0]);
        let timestamp =
            parse_portal_timestamp(&raw_timestamp).ok_or_else(|| ParseError::BadTimestamp {
                row,
                value: raw_timestamp.clone(),
            })?;

        let anchors: Vec<ElementRef<'_>> = cells[1].select(&self.anchors).collect();
        if anchors.len() < 2 {
            return Err(ParseError::MissingAnchors {
                row,
                found: anchors.len(),
            });
        }

        let organization = element_text(anchors[0]);
        let title = element_text(anchors[1]);
        let href = anchors[1]
            .value()
            .attr("href")
            .map(str::trim)
            .filter(|h| !h.is_empty())
            .ok_or(ParseError::MissingHref { row })?;
        let detail_url = base_url.join(href).map_err(|_| ParseError::BadDetailUrl {
            row,
            href: href.to_string(),
        })?;

        Ok(ListingRecord {
            id: event_id(&detail_url, id_param),
            timestamp,
            organization,
            title,
            detail_url: detail_url.to_string(),
        })
    }
}

/// Value of the `id_param` query parameter, if present and non-empty.
fn event_id(url: &Url, id_param: &str) -> Option<String> {
    url.query_pairs()
        .find(|(key, _)| key.eq_ignore_ascii_case(id_param))
        .map(|(_, value)| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
