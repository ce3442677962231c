//! `GET /test` - database diagnostic report
//!
//! Always 200. Problems with the database show up inside the report.

use super::AppState;
use crate::{Request, Response, Result};

pub fn test_database(state: &AppState, _req: &Request) -> Result<Response> {
    Response::json(&state.probe.run())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::{DatabaseHandle, DatabaseResolver, ResolveError};
    use crate::{Catalog, Method, Probe, RequestBuilder, StatusCode};
    use std::collections::HashMap;
    use std::sync::Arc;

    struct Broken;

    impl DatabaseResolver for Broken {
        fn resolve(&self) -> std::result::Result<DatabaseHandle, ResolveError> {
            Err(ResolveError::Other("authentication failed for user magneto".into()))
        }
    }

    #[test]
    fn test_errors_are_reported_with_ok_status() {
        let state = AppState {
            catalog: Catalog::sample(),
            probe: Probe::new(Arc::new(Broken), Arc::new(HashMap::<String, String>::new())),
        };
        let req = RequestBuilder::new(Method::Get, "/test").build();

        let res = test_database(&state, &req).unwrap();
        assert_eq!(res.status, StatusCode::OK);

        let report: serde_json::Value = serde_json::from_slice(&res.body).unwrap();
        assert_eq!(report["database"], "❌ Error: authentication failed for user magneto");
        assert_eq!(report["connection_status"], "Not Connected");
    }
}
