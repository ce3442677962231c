//! Method + path router
//!
//! Paths are matched exactly. A path that exists under another method is
//! reported separately so the caller can answer 405 instead of 404.

use crate::Method;
use smallvec::SmallVec;
use std::collections::HashMap;

/// Route lookup result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteMatch<T> {
    /// Route registered for this method and path
    Found(T),
    /// Path is registered, but not for this method
    MethodNotAllowed,
    /// Unknown path
    NotFound,
}

/// Exact-match HTTP router
#[derive(Debug, Clone)]
pub struct Router<T> {
    // Path -> per-method routes
    routes: HashMap<String, SmallVec<[(Method, T); 2]>>,
}

impl<T: Copy> Router<T> {
    /// Create a new router
    pub fn new() -> Self {
        Self {
            routes: HashMap::new(),
        }
    }

    /// Add a route, replacing any previous value for the same method and path
    pub fn route(&mut self, method: Method, path: &str, value: T) -> &mut Self {
        let methods = self.routes.entry(path.to_string()).or_default();
        match methods.iter_mut().find(|(m, _)| *m == method) {
            Some(slot) => slot.1 = value,
            None => methods.push((method, value)),
        }
        self
    }

    /// Add a GET route
    pub fn get(&mut self, path: &str, value: T) -> &mut Self {
        self.route(Method::Get, path, value)
    }

    /// Match a request
    ///
    /// HEAD falls back to the GET route.
    pub fn match_route(&self, method: Method, path: &str) -> RouteMatch<T> {
        let Some(methods) = self.routes.get(path) else {
            return RouteMatch::NotFound;
        };

        let lookup = |wanted: Method| {
            methods
                .iter()
                .find(|(m, _)| *m == wanted)
                .map(|(_, value)| *value)
        };

        let found = match method {
            Method::Head => lookup(Method::Head).or_else(|| lookup(Method::Get)),
            other => lookup(other),
        };

        found.map_or(RouteMatch::MethodNotAllowed, RouteMatch::Found)
    }

    /// Methods registered for a path
    pub fn allowed_methods(&self, path: &str) -> Vec<Method> {
        self.routes
            .get(path)
            .map(|methods| methods.iter().map(|(m, _)| *m).collect())
            .unwrap_or_default()
    }
}

impl<T: Copy> Default for Router<T> {
    fn default() -> Self {
        Self::new()
    }
}
