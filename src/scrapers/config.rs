//! Portal and search configuration types.
//!
//! Endpoints and the fixed part of the search payload are plain data passed
//! into the fetchers, so the crawl can be pointed at any compatible portal
//! (or a test double).

use serde::{Deserialize, Serialize};

use crate::utils::DateRange;

/// Portal endpoints and page layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PortalConfig {
    /// Home page visited by the browser to obtain session cookies.
    pub home_url: String,
    /// Event search endpoint receiving the paginated POST.
    pub search_url: String,
    /// CSS selector of the detail page region holding the event text.
    pub content_selector: String,
    /// Query string parameter of detail links that carries the event ID.
    pub id_param: String,
    /// User agent override (defaults to the bootstrap browser's).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    /// HTTP request timeout in seconds.
    pub request_timeout: u64,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            home_url: "https://e-disclosure.ru/".to_string(),
            search_url: "https://e-disclosure.ru/poisk-po-soobshheniyam".to_string(),
            content_selector: "div#cont_wrap".to_string(),
            id_param: "EventId".to_string(),
            user_agent: None,
            request_timeout: 30,
        }
    }
}

/// Fixed part of the event search form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Rows per result page (`lastPageSize`).
    pub page_size: u32,
    /// Event type filter, one `eventTypeCheckboxGroup` entry per value.
    pub event_types: Vec<u32>,
    /// Region scope selector (`radReg`).
    pub region_scope: String,
    pub districts: String,
    pub regions: String,
    pub branches: String,
    /// Free-text event query.
    pub query: String,
    /// Company name filter.
    pub company: String,
    /// Result view mode (`radView`).
    pub view: String,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            page_size: 50,
            event_types: vec![
                97, 81, 100, 101, 102, 103, 105, 106, 107, 150, 205, 206, 232,
            ],
            region_scope: "FederalDistricts".to_string(),
            districts: "-1".to_string(),
            regions: "-1".to_string(),
            branches: "-1".to_string(),
            query: String::new(),
            company: String::new(),
            view: "0".to_string(),
        }
    }
}

impl SearchConfig {
    /// Build the form payload for one result page.
    ///
    /// Event types are sent as repeated keys, the way an HTML checkbox group
    /// submits.
    pub fn payload(&self, page_number: u32, range: &DateRange) -> Vec<(String, String)> {
        let mut form: Vec<(String, String)> = vec![
            ("lastPageSize".into(), self.page_size.to_string()),
            ("lastPageNumber".into(), page_number.to_string()),
            ("query".into(), self.query.clone()),
            ("queryEvent".into(), String::new()),
            ("eventTypeTerm".into(), String::new()),
            ("radView".into(), self.view.clone()),
        ];
        form.extend(
            self.event_types
                .iter()
                .map(|t| ("eventTypeCheckboxGroup".to_string(), t.to_string())),
        );
        form.extend([
            ("textfieldEvent".into(), String::new()),
            ("radReg".into(), self.region_scope.clone()),
            ("districtsCheckboxGroup".into(), self.districts.clone()),
            ("regionsCheckboxGroup".into(), self.regions.clone()),
            ("branchesCheckboxGroup".into(), self.branches.clone()),
            ("textfieldCompany".into(), self.company.clone()),
            ("dateStart".into(), range.start_param()),
            ("dateFinish".into(), range.finish_param()),
        ]);
        form
    }
}
