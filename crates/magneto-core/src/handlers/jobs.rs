//! `GET /jobs/search?q=<query>`

use super::AppState;
use crate::{Request, Response, Result};

/// Query parameter holding the search text
pub const QUERY_PARAM: &str = "q";

pub fn search(state: &AppState, req: &Request) -> Result<Response> {
    let query = req.query_param(QUERY_PARAM);
    let results = state.catalog.search(query.as_deref());

    tracing::debug!(
        query = query.as_deref().unwrap_or(""),
        matches = results.jobs.len(),
        "job search"
    );

    Response::json(&results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Method, RequestBuilder};
    use serde_json::Value;

    fn titles(res: &Response) -> Vec<String> {
        let body: Value = serde_json::from_slice(&res.body).unwrap();
        body["jobs"]
            .as_array()
            .unwrap()
            .iter()
            .map(|job| job["title"].as_str().unwrap().to_string())
            .collect()
    }

    #[test]
    fn test_search_without_query() {
        let state = AppState::default();
        let req = RequestBuilder::new(Method::Get, "/jobs/search").build();

        assert_eq!(titles(&search(&state, &req).unwrap()).len(), 4);
    }

    #[test]
    fn test_search_with_blank_query() {
        let state = AppState::default();
        let req = RequestBuilder::new(Method::Get, "/jobs/search").query("q=").build();

        assert_eq!(titles(&search(&state, &req).unwrap()).len(), 4);
    }

    #[test]
    fn test_search_encoded_query() {
        let state = AppState::default();
        let req = RequestBuilder::new(Method::Get, "/jobs/search")
            .query("q=Medell%C3%ADn")
            .build();

        assert_eq!(titles(&search(&state, &req).unwrap()), vec!["Diseñador UI/UX Senior"]);
    }

    #[test]
    fn test_listing_fields_are_serialized() {
        let state = AppState::default();
        let req = RequestBuilder::new(Method::Get, "/jobs/search").query("q=python").build();

        let body: Value = serde_json::from_slice(&search(&state, &req).unwrap().body).unwrap();
        assert_eq!(
            body["jobs"][0],
            serde_json::json!({
                "title": "Backend Engineer Python",
                "company": "CloudWare",
                "location": "Remoto",
                "salary": "USD 3k - 5k",
                "description": "APIs con FastAPI, MongoDB y arquitectura escalable.",
                "url": "https://example.com/jobs/backend-python",
            })
        );
    }
}
