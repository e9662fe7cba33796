use std::fmt;

use actix_web::{
    http::header::{ContentDisposition, DispositionParam, DispositionType},
    post, web, HttpResponse,
};
use serde::{Deserialize, Serialize};
use subtle::ConstantTimeEq;

use crate::{
    domain::{
        csv_export::CSV_FILENAME,
        search_request::{required, SearchRequest},
    },
    error::{ErrorBody, SearchError},
    services::SearchPipeline,
};

#[derive(Deserialize)]
pub struct SearchBody {
    website: Option<String>,
    city: Option<String>,
    occupation: Option<String>,
    email_domain: Option<String>,
    key: Option<String>,
}

impl fmt::Debug for SearchBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SearchBody")
            .field("website", &self.website)
            .field("city", &self.city)
            .field("occupation", &self.occupation)
            .field("email_domain", &self.email_domain)
            .field("key", &self.key.as_ref().map(|_| "[redacted]"))
            .finish()
    }
}

#[derive(Serialize)]
struct SearchResponse {
    success: bool,
    message: String,
    csv_data: String,
    results_count: usize,
    total_processed: usize,
    items_without_emails: usize,
}

#[derive(Deserialize)]
pub struct DownloadBody {
    csv_data: Option<String>,
}

#[post("/search")]
pub async fn search(
    body: web::Json<SearchBody>,
    pipeline: web::Data<SearchPipeline>,
) -> HttpResponse {
    let body = body.into_inner();
    log::info!("Search request received: {:?}", body);

    match run_search(body, &pipeline).await {
        Ok(res) => {
            log::info!(
                "Search response: {} results, {} processed, {} without emails",
                res.results_count,
                res.total_processed,
                res.items_without_emails
            );
            HttpResponse::Ok().json(res)
        }
        Err(e) => {
            match &e {
                SearchError::Validation { .. } => log::error!("Validation error: {}", e),
                SearchError::Authorization => log::error!("Authentication error: {}", e),
                SearchError::Configuration(_) => log::error!("{}", e),
                SearchError::Unexpected(inner) => {
                    log::error!("Unexpected error during search: {:?}", inner)
                }
            }
            actix_web::ResponseError::error_response(&e)
        }
    }
}

async fn run_search(
    body: SearchBody,
    pipeline: &SearchPipeline,
) -> Result<SearchResponse, SearchError> {
    let request = SearchRequest::parse(body.website, body.city, body.occupation, body.email_domain)?;
    let key = required("key", body.key)?;

    let expected = pipeline.api_keys().client_key()?;
    if !keys_match(&key, expected) {
        return Err(SearchError::Authorization);
    }

    let outcome = pipeline.run_search(&request).await?;
    let results_count = outcome.records.len();

    Ok(SearchResponse {
        success: true,
        message: format!("Found {} results", results_count),
        csv_data: outcome.csv,
        results_count,
        total_processed: outcome.total_processed,
        items_without_emails: outcome.items_without_email,
    })
}

#[post("/download-csv")]
pub async fn download_csv(body: web::Json<DownloadBody>) -> HttpResponse {
    let csv_data = match body.into_inner().csv_data {
        Some(data) if !data.is_empty() => data,
        _ => {
            log::error!("Download error: No CSV data provided");
            return HttpResponse::BadRequest().json(ErrorBody::new("No CSV data provided"));
        }
    };

    log::info!("CSV download requested");

    HttpResponse::Ok()
        .content_type("text/csv; charset=utf-8")
        .insert_header(ContentDisposition {
            disposition: DispositionType::Attachment,
            parameters: vec![DispositionParam::Filename(CSV_FILENAME.to_string())],
        })
        .body(csv_data.into_bytes())
}

fn keys_match(provided: &str, expected: &str) -> bool {
    provided.as_bytes().ct_eq(expected.as_bytes()).into()
}
