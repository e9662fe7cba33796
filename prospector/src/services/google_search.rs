use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;

use crate::configuration::{GoogleCredentials, SearchSettings};

/// Client for the Custom Search JSON API.
pub struct GoogleSearchClient {
    client: Client,
    endpoint: Url,
}

#[derive(Serialize)]
struct SearchQuery<'a> {
    key: &'a str,
    cx: &'a str,
    q: &'a str,
    start: u32,
}

#[derive(Deserialize)]
struct SearchResponse {
    items: Option<Vec<Value>>,
}

/// Why a page produced nothing. Only ever logged, never returned to callers
/// of the pipeline.
#[derive(Debug)]
pub enum FetchFailure {
    Status { status: StatusCode, body: String },
    Transport(reqwest::Error),
    Decode(reqwest::Error),
}

#[derive(Debug)]
pub enum PageOutcome {
    Items(Vec<Value>),
    /// A successful response without any items.
    Exhausted,
    Failed(FetchFailure),
}

impl GoogleSearchClient {
    pub fn new(settings: &SearchSettings) -> Result<Self, anyhow::Error> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;
        let endpoint = Url::parse(&settings.endpoint)?;

        Ok(GoogleSearchClient { client, endpoint })
    }

    /// Requests one page of results starting at the 1-based offset `start`.
    pub async fn fetch_page(
        &self,
        credentials: &GoogleCredentials,
        query: &str,
        start: u32,
    ) -> PageOutcome {
        log::info!(
            "Making API request to Google Custom Search: query='{}', start={}",
            query,
            start
        );

        let req = self.client.get(self.endpoint.clone()).query(&SearchQuery {
            key: &credentials.api_key,
            cx: &credentials.search_engine_id,
            q: query,
            start,
        });

        let res = match req.send().await {
            Ok(res) => res,
            Err(e) => {
                log::error!("Request exception during API call: {}", e);
                return PageOutcome::Failed(FetchFailure::Transport(e));
            }
        };

        let status = res.status();
        if status != StatusCode::OK {
            let body = res.text().await.unwrap_or_default();
            log::error!("API request failed with status {}: {}", status.as_u16(), body);
            return PageOutcome::Failed(FetchFailure::Status { status, body });
        }

        match res.json::<SearchResponse>().await {
            Ok(data) => {
                let items = data.items.unwrap_or_default();
                log::info!("API request successful: found {} items", items.len());
                match items.is_empty() {
                    true => PageOutcome::Exhausted,
                    false => PageOutcome::Items(items),
                }
            }
            Err(e) => {
                log::error!("Failed to decode API response at start={}: {}", start, e);
                PageOutcome::Failed(FetchFailure::Decode(e))
            }
        }
    }
}
