//! Paginated event search.

use tracing::debug;

use super::config::{PortalConfig, SearchConfig};
use super::error::TransportError;
use super::http_client::PortalTransport;
use crate::utils::DateRange;

/// POST the search form for `page_number` and return the raw result markup.
///
/// Pages are numbered from 1. Any non-success status is returned as an error.
pub async fn fetch_page<T: PortalTransport + ?Sized>(
    transport: &T,
    portal: &PortalConfig,
    search: &SearchConfig,
    page_number: u32,
    range: &DateRange,
) -> Result<String, TransportError> {
    let form = search.payload(page_number, range);
    debug!(
        "Search page {} ({} - {}), {} form fields",
        page_number,
        range.start_param(),
        range.finish_param(),
        form.len()
    );
    transport.post_form(&portal.search_url, &form).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingTransport {
        posts: Mutex<Vec<(String, Vec<(String, String)>)>>,
    }

    #[async_trait]
    impl PortalTransport for RecordingTransport {
        async fn post_form(
            &self,
            url: &str,
            form: &[(String, String)],
        ) -> Result<String, TransportError> {
            self.posts
                .lock()
                .unwrap()
                .push((url.to_string(), form.to_vec()));
            Ok("<table></table>".to_string())
        }

        async fn get(&self, url: &str) -> Result<String, TransportError> {
            Err(TransportError::Status {
                url: url.to_string(),
                status: 404,
            })
        }
    }

    #[tokio::test]
    async fn test_fetch_page_posts_to_search_url() {
        let transport = RecordingTransport::default();
        let portal = PortalConfig {
            search_url: "https://portal.test/search".to_string(),
            ..Default::default()
        };
        let range = DateRange::last_days(NaiveDate::from_ymd_opt(2024, 5, 10).unwrap(), 1);

        let body = fetch_page(&transport, &portal, &SearchConfig::default(), 7, &range)
            .await
            .unwrap();
        assert_eq!(body, "<table></table>");

        let posts = transport.posts.lock().unwrap();
        assert_eq!(posts.len(), 1);
        let (url, form) = &posts[0];
        assert_eq!(url, "https://portal.test/search");
        assert!(form.contains(&("lastPageNumber".to_string(), "7".to_string())));
        assert!(form.contains(&("dateStart".to_string(), "09.05.2024".to_string())));
        assert!(form.contains(&("dateFinish".to_string(), "10.05.2024".to_string())));
    }
}
