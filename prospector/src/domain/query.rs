use super::search_request::SearchRequest;

/// Builds the Custom Search query for a lead request.
///
/// Quotes inside the inputs are passed through as-is.
pub fn build_search_query(request: &SearchRequest) -> String {
    format!(
        r#"site:{} "{}" "{}" "@{}""#,
        request.website(),
        request.city(),
        request.occupation(),
        request.email_domain()
    )
}
