//! Greeting endpoints: `GET /` and `GET /api/hello`

use super::AppState;
use crate::{Request, Response, Result};
use serde::Serialize;

#[derive(Debug, Serialize)]
struct Message {
    message: &'static str,
}

pub fn root(_state: &AppState, _req: &Request) -> Result<Response> {
    Response::json(&Message {
        message: "Hello from Magneto Jobs Backend!",
    })
}

pub fn hello(_state: &AppState, _req: &Request) -> Result<Response> {
    Response::json(&Message {
        message: "Hello from the backend API!",
    })
}
