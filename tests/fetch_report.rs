//! Fetch → cache → report flow against a stub portal.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::NaiveDate;
use tempfile::tempdir;

use edisclose::crawl::{CrawlConfig, CrawlError, Crawler, ExhaustPages, StopReason};
use edisclose::report::{render_reports, ReportFilter};
use edisclose::repository::{RecordCache, SqliteRecordCache};
use edisclose::scrapers::{
    PortalConfig, PortalTransport, SearchConfig, SessionProvider, TransportError,
};
use edisclose::utils::DateRange;

#[derive(Clone, Copy)]
struct Event {
    id: &'static str,
    timestamp: &'static str,
    org: &'static str,
    title: &'static str,
    body: &'static str,
}

/// Result pages (newest first) plus detail pages keyed by URL.
#[derive(Clone)]
struct StubPortal {
    pages: Vec<String>,
    details: HashMap<String, String>,
    /// Result page answered with HTTP 500.
    failing_page: Option<usize>,
}

impl StubPortal {
    fn new(pages: &[&[Event]]) -> Self {
        let mut details = HashMap::new();
        let pages = pages
            .iter()
            .map(|events| {
                let mut html = String::from("<table><tr><th>Дата</th><th>Событие</th></tr>");
                for e in events.iter() {
                    details.insert(
                        detail_url(e.id),
                        format!(
                            r#"<html><body><div id="cont_wrap"><p>{}</p><p></p><p>{}</p></div></body></html>"#,
                            e.title, e.body
                        ),
                    );
                    html.push_str(&format!(
                        r#"<tr><td>{}</td><td><a href="/portal/company.aspx?id=7">{}</a><br><a href="/portal/event.aspx?EventId={}">{}</a></td></tr>"#,
                        e.timestamp, e.org, e.id, e.title
                    ));
                }
                html.push_str("</table>");
                html
            })
            .collect();
        Self {
            pages,
            details,
            failing_page: None,
        }
    }

    fn failing_on(mut self, page: usize) -> Self {
        self.failing_page = Some(page);
        self
    }
}

fn detail_url(id: &str) -> String {
    format!("https://e-disclosure.ru/portal/event.aspx?EventId={}", id)
}

/// Session handed out by the stub provider; counts requests.
struct StubSession {
    portal: StubPortal,
    requests: Mutex<Vec<String>>,
}

#[async_trait]
impl PortalTransport for StubSession {
    async fn post_form(
        &self,
        url: &str,
        form: &[(String, String)],
    ) -> Result<String, TransportError> {
        let page: usize = form
            .iter()
            .find(|(k, _)| k == "lastPageNumber")
            .and_then(|(_, v)| v.parse().ok())
            .unwrap();
        self.requests
            .lock()
            .unwrap()
            .push(format!("POST {} page {}", url, page));
        if self.portal.failing_page == Some(page) {
            return Err(TransportError::Status {
                url: url.to_string(),
                status: 500,
            });
        }
        Ok(self
            .portal
            .pages
            .get(page - 1)
            .cloned()
            .unwrap_or_else(|| "<p>Ничего не найдено</p>".to_string()))
    }

    async fn get(&self, url: &str) -> Result<String, TransportError> {
        self.requests.lock().unwrap().push(format!("GET {}", url));
        self.portal
            .details
            .get(url)
            .cloned()
            .ok_or_else(|| TransportError::Status {
                url: url.to_string(),
                status: 404,
            })
    }
}

struct StubProvider {
    portal: StubPortal,
}

#[async_trait]
impl SessionProvider for StubProvider {
    type Session = StubSession;

    async fn acquire_session(&self) -> Result<StubSession, TransportError> {
        Ok(StubSession {
            portal: self.portal.clone(),
            requests: Mutex::new(Vec::new()),
        })
    }
}

fn crawler() -> Crawler {
    Crawler::new(
        PortalConfig::default(),
        SearchConfig::default(),
        CrawlConfig {
            page_delay_ms: 0,
            max_pages: 0,
        },
    )
}

fn range() -> DateRange {
    DateRange::last_days(NaiveDate::from_ymd_opt(2024, 10, 17).unwrap(), 30)
}

const OLD: [Event; 2] = [
    Event {
        id: "100",
        timestamp: "15.10.2024 12:00",
        org: "ПАО «Ромашка»",
        title: "Решение совета директоров",
        body: "Совет директоров принял решение о выплате дивидендов",
    },
    Event {
        id: "99",
        timestamp: "14.10.2024 09:30",
        org: "Acme Holdings",
        title: "Quarterly report published",
        body: "The quarterly report is available",
    },
];

const NEW: [Event; 1] = [Event {
    id: "101",
    timestamp: "17.10.2024 14:35",
    org: "Globex",
    title: "Change of auditor",
    body: "The company appointed a new auditor",
}];

#[tokio::test]
async fn test_incremental_fetch_then_report() {
    let dir = tempdir().unwrap();
    let cache = SqliteRecordCache::new(&dir.path().join("disclosures.db")).unwrap();

    // First run sees the two older events on one page.
    let first = StubProvider {
        portal: StubPortal::new(&[&OLD]),
    };
    let session = first.acquire_session().await.unwrap();
    let outcome = crawler().run(&session, &cache, &range()).await.unwrap();
    assert_eq!(outcome.inserted, 2);
    assert_eq!(outcome.stop_reason, StopReason::EmptyPage);

    // Second run: the new event is listed first, followed by the cached ones
    // and a further page that must never be requested.
    let second = StubProvider {
        portal: StubPortal::new(&[&[NEW[0], OLD[0]], &OLD]),
    };
    let session = second.acquire_session().await.unwrap();
    let outcome = crawler().run(&session, &cache, &range()).await.unwrap();
    assert_eq!(outcome.inserted, 1);
    assert_eq!(outcome.stop_reason, StopReason::AlreadyCached);

    let requests = session.requests.lock().unwrap().clone();
    assert_eq!(
        requests,
        vec![
            "POST https://e-disclosure.ru/poisk-po-soobshheniyam page 1".to_string(),
            format!("GET {}", detail_url("101")),
        ]
    );
    assert_eq!(cache.len().unwrap(), 3);

    // Reports: everything, then a Cyrillic organization filter.
    let reports = dir.path().join("reports");
    let all = render_reports(&cache, &ReportFilter::default(), &reports).unwrap();
    assert_eq!(all.len(), 3);

    let filtered = render_reports(
        &cache,
        &ReportFilter::new(["РОМАШКА"], ["дивиденд"]),
        &reports,
    )
    .unwrap();
    assert_eq!(filtered.len(), 1);
    assert!(filtered[0].starts_with(reports.join("2024-10-15")));

    let body = std::fs::read_to_string(&filtered[0]).unwrap();
    assert_eq!(
        body,
        "\n[2024-10-15 12:00]\n\"ПАО «Ромашка»\"\n---\nРешение совета директоров\n---\n\
         Решение совета директоров\nСовет директоров принял решение о выплате дивидендов\n---\n"
    );
}

#[tokio::test]
async fn test_failed_result_page_aborts_and_full_rerun_recovers() {
    let dir = tempdir().unwrap();
    let cache = SqliteRecordCache::new(&dir.path().join("disclosures.db")).unwrap();
    let pages: &[&[Event]] = &[&NEW, &OLD];

    let broken = StubProvider {
        portal: StubPortal::new(pages).failing_on(2),
    };
    let session = broken.acquire_session().await.unwrap();
    let err = crawler().run(&session, &cache, &range()).await.unwrap_err();
    assert!(matches!(
        err,
        CrawlError::Transport(TransportError::Status { status: 500, .. })
    ));

    // Page 1 was complete and stays cached; nothing from page 2 is.
    let titles: Vec<String> = cache
        .records()
        .unwrap()
        .into_iter()
        .map(|c| c.record.listing.title)
        .collect();
    assert_eq!(titles, vec!["Change of auditor"]);
    let requests = session.requests.lock().unwrap().clone();
    assert_eq!(
        requests.last().map(String::as_str),
        Some("POST https://e-disclosure.ru/poisk-po-soobshheniyam page 2")
    );
    assert!(!requests
        .iter()
        .any(|r| r.contains("EventId=100") || r.contains("EventId=99")));

    // A full rescan picks up the page that failed.
    let fixed = StubProvider {
        portal: StubPortal::new(pages),
    };
    let session = fixed.acquire_session().await.unwrap();
    let outcome = crawler()
        .with_policy(ExhaustPages)
        .run(&session, &cache, &range())
        .await
        .unwrap();
    assert_eq!(outcome.inserted, 2);
    assert_eq!(outcome.skipped, 1);
    assert_eq!(cache.len().unwrap(), 3);
}
