//! Request handlers
//!
//! Every handler is synchronous and reads only immutable state.

pub mod diagnostics;
pub mod jobs;
pub mod root;

use crate::{Catalog, Probe};

/// State shared by all handlers
#[derive(Debug, Clone, Default)]
pub struct AppState {
    pub catalog: Catalog,
    pub probe: Probe,
}
