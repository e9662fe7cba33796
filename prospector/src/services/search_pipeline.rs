use serde::Serialize;

use crate::{
    configuration::{ApiKeySettings, SearchSettings},
    domain::{
        csv_export::leads_to_csv,
        lead::{parse_result, LeadRecord},
        query::build_search_query,
        search_request::SearchRequest,
    },
    error::SearchError,
};

use super::{GoogleSearchClient, PageOutcome};

#[derive(Debug, Clone, Serialize)]
pub struct SearchOutcome {
    pub records: Vec<LeadRecord>,
    pub total_processed: usize,
    pub items_without_email: usize,
    pub csv: String,
}

/// Query -> paginated fetch -> parse -> CSV, for one request at a time.
pub struct SearchPipeline {
    client: GoogleSearchClient,
    settings: SearchSettings,
    api_keys: ApiKeySettings,
}

impl SearchPipeline {
    pub fn new(settings: SearchSettings, api_keys: ApiKeySettings) -> Result<Self, SearchError> {
        let client = GoogleSearchClient::new(&settings)?;

        Ok(SearchPipeline {
            client,
            settings,
            api_keys,
        })
    }

    pub fn api_keys(&self) -> &ApiKeySettings {
        &self.api_keys
    }

    pub async fn run_search(&self, request: &SearchRequest) -> Result<SearchOutcome, SearchError> {
        let credentials = self.api_keys.google_credentials().inspect_err(|e| {
            log::error!("{}", e);
        })?;

        let query = build_search_query(request);
        log::info!("Constructed search query: {}", query);

        let mut records = vec![];

        for start in self.settings.page_offsets() {
            let items = match self.client.fetch_page(&credentials, &query, start).await {
                PageOutcome::Items(items) => items,
                PageOutcome::Exhausted => {
                    log::info!("No more results found at offset {}", start - 1);
                    break;
                }
                PageOutcome::Failed(failure) => {
                    log::warn!(
                        "Stopping pagination at offset {} after fetch failure: {:?}",
                        start - 1,
                        failure
                    );
                    break;
                }
            };

            records.extend(
                items
                    .iter()
                    .map(|item| parse_result(item, self.settings.max_extraction_depth)),
            );
        }

        let total_processed = records.len();
        let items_without_email = records.iter().filter(|r| !r.has_emails()).count();
        log::info!(
            "Search completed: {} total results, {} without emails",
            total_processed,
            items_without_email
        );

        let csv = leads_to_csv(&records);

        Ok(SearchOutcome {
            records,
            total_processed,
            items_without_email,
            csv,
        })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::{
        matchers::{method, query_param},
        Mock, MockServer, ResponseTemplate,
    };

    use super::SearchPipeline;
    use crate::{
        configuration::{ApiKeySettings, SearchSettings},
        domain::search_request::SearchRequest,
        error::SearchError,
    };

    fn keys() -> ApiKeySettings {
        ApiKeySettings {
            google_api_key: Some("key".to_string()),
            search_engine_id: Some("cx".to_string()),
            client_key: Some("client".to_string()),
        }
    }

    fn pipeline(server: &MockServer, api_keys: ApiKeySettings) -> SearchPipeline {
        let settings = SearchSettings {
            endpoint: server.uri(),
            timeout_secs: 5,
            ..SearchSettings::default()
        };
        SearchPipeline::new(settings, api_keys).unwrap()
    }

    fn request() -> SearchRequest {
        SearchRequest::parse(
            Some("example.com".to_string()),
            Some("Austin".to_string()),
            Some("Engineer".to_string()),
            Some("example.com".to_string()),
        )
        .unwrap()
    }

    fn page(start: u32, count: usize) -> serde_json::Value {
        let items: Vec<_> = (0..count)
            .map(|i| json!({"title": format!("hit {}", start as usize + i), "snippet": format!("p{}i{}@example.com", start, i)}))
            .collect();
        json!({ "items": items })
    }

    #[tokio::test]
    async fn stops_on_first_empty_page() {
        let server = MockServer::start().await;
        for start in [1, 11] {
            Mock::given(method("GET"))
                .and(query_param("start", start.to_string()))
                .respond_with(ResponseTemplate::new(200).set_body_json(page(start, 10)))
                .expect(1)
                .mount(&server)
                .await;
        }
        Mock::given(method("GET"))
            .and(query_param("start", "21"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"items": []})))
            .expect(1)
            .mount(&server)
            .await;

        let outcome = pipeline(&server, keys()).run_search(&request()).await.unwrap();

        assert_eq!(outcome.total_processed, 20);
        assert_eq!(outcome.records.len(), outcome.total_processed);
        assert_eq!(outcome.items_without_email, 0);
        assert_eq!(outcome.records[0].title, "hit 1");
        assert_eq!(outcome.records[19].title, "hit 20");
    }

    #[tokio::test]
    async fn never_exceeds_page_ceiling() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(page(1, 1)))
            .expect(100)
            .mount(&server)
            .await;

        let outcome = pipeline(&server, keys()).run_search(&request()).await.unwrap();

        assert_eq!(outcome.total_processed, 100);
    }

    #[tokio::test]
    async fn missing_credentials_fail_before_any_request() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(page(1, 1)))
            .expect(0)
            .mount(&server)
            .await;

        let api_keys = ApiKeySettings {
            google_api_key: None,
            ..keys()
        };
        let result = pipeline(&server, api_keys).run_search(&request()).await;

        assert!(matches!(result, Err(SearchError::Configuration(_))));
    }

    #[tokio::test]
    async fn counts_items_without_email() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("start", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [
                    {"title": "With", "link": "https://linkedin.com/in/a", "snippet": "a@example.com"},
                    {"title": "Without", "link": "https://example.com"},
                    {"title": "Also without", "link": "https://example.com/b"}
                ]
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(query_param("start", "11"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let outcome = pipeline(&server, keys()).run_search(&request()).await.unwrap();

        assert_eq!(outcome.total_processed, 3);
        assert_eq!(outcome.items_without_email, 2);
        assert_eq!(outcome.csv.lines().count(), 4);
    }
}
