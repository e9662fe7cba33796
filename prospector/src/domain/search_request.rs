use crate::error::SearchError;

/// Validated input for one pipeline run.
///
/// All four fields are guaranteed non-blank once constructed.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchRequest {
    website: String,
    city: String,
    occupation: String,
    email_domain: String,
}

impl SearchRequest {
    pub fn parse(
        website: Option<String>,
        city: Option<String>,
        occupation: Option<String>,
        email_domain: Option<String>,
    ) -> Result<Self, SearchError> {
        Ok(SearchRequest {
            website: required("website", website)?,
            city: required("city", city)?,
            occupation: required("occupation", occupation)?,
            email_domain: required("email_domain", email_domain)?,
        })
    }

    pub fn website(&self) -> &str {
        &self.website
    }

    pub fn city(&self) -> &str {
        &self.city
    }

    pub fn occupation(&self) -> &str {
        &self.occupation
    }

    pub fn email_domain(&self) -> &str {
        &self.email_domain
    }
}

/// Returns the value untouched unless it is absent or blank.
pub fn required(field: &'static str, value: Option<String>) -> Result<String, SearchError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(SearchError::Validation { field }),
    }
}

#[cfg(test)]
mod tests {
    use super::SearchRequest;
    use crate::error::SearchError;

    fn some(s: &str) -> Option<String> {
        Some(s.to_string())
    }

    #[test]
    fn parse_valid_request() {
        let req = SearchRequest::parse(
            some("example.com"),
            some("Austin"),
            some("Engineer"),
            some("example.com"),
        )
        .unwrap();

        assert_eq!(req.website(), "example.com");
        assert_eq!(req.city(), "Austin");
        assert_eq!(req.occupation(), "Engineer");
        assert_eq!(req.email_domain(), "example.com");
    }

    #[test]
    fn each_missing_field_is_reported_by_name() {
        let cases = [
            (None, some("Austin"), some("Engineer"), some("x.com"), "website"),
            (some("x.com"), None, some("Engineer"), some("x.com"), "city"),
            (some("x.com"), some("Austin"), None, some("x.com"), "occupation"),
            (some("x.com"), some("Austin"), some("Engineer"), None, "email_domain"),
        ];

        for (website, city, occupation, email_domain, expected) in cases {
            match SearchRequest::parse(website, city, occupation, email_domain) {
                Err(SearchError::Validation { field }) => assert_eq!(field, expected),
                other => panic!("expected validation error for {}, got {:?}", expected, other),
            }
        }
    }

    #[test]
    fn blank_field_is_rejected() {
        let result = SearchRequest::parse(some("x.com"), some("  "), some("Engineer"), some("x.com"));

        assert!(matches!(
            result,
            Err(SearchError::Validation { field: "city" })
        ));
    }

    #[test]
    fn first_missing_field_wins() {
        let result = SearchRequest::parse(None, None, None, None);

        assert!(matches!(
            result,
            Err(SearchError::Validation { field: "website" })
        ));
    }
}
