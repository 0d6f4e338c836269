//! Radix-tree request router.
//!
//! One tree per HTTP method. O(path-length) lookup. You register a path,
//! you get a handler.

use std::collections::HashMap;
use std::sync::Arc;

use matchit::Router as MatchitRouter;
use tracing::debug;

use crate::handler::{BoxedHandler, Handler};
use crate::method::Method;
use crate::request::Request;
use crate::response::Response;
use crate::status::Status;

/// The application router.
///
/// Build it once at startup; pass it to [`Server::serve`](crate::Server::serve)
/// or drive it in-process with [`Router::handle`]. Each [`Router::on`] call
/// returns `self` so registrations chain naturally.
pub struct Router {
    routes: HashMap<Method, MatchitRouter<BoxedHandler>>,
}

pub(crate) enum Lookup {
    Found(BoxedHandler, HashMap<String, String>),
    MethodNotAllowed,
    NotFound,
}

impl Router {
    pub fn new() -> Self {
        Self { routes: HashMap::new() }
    }

    /// Register a handler for a method + path pair. Returns `self` for chaining.
    ///
    /// Path parameters use `{name}` syntax — `req.param("name")` retrieves them.
    ///
    /// # Panics
    ///
    /// Panics if `path` is not a valid route or conflicts with one already
    /// registered for `method`. Routes are fixed at startup, so this is a
    /// programming error.
    pub fn on(mut self, method: Method, path: &str, handler: impl Handler) -> Self {
        self.routes
            .entry(method)
            .or_default()
            .insert(path, handler.into_boxed_handler())
            .unwrap_or_else(|e| panic!("invalid route `{path}`: {e}"));
        self
    }

    pub(crate) fn lookup(&self, method: Method, path: &str) -> Lookup {
        if let Some(matched) = self.routes.get(&method).and_then(|tree| tree.at(path).ok()) {
            let params = matched.params.iter()
                .map(|(k, v)| (k.to_owned(), v.to_owned()))
                .collect();
            return Lookup::Found(Arc::clone(matched.value), params);
        }

        let other_method = Method::ALL.iter()
            .filter(|m| **m != method)
            .filter_map(|m| self.routes.get(m))
            .any(|tree| tree.at(path).is_ok());

        if other_method { Lookup::MethodNotAllowed } else { Lookup::NotFound }
    }

    /// Routes one request and produces one response.
    ///
    /// Unknown paths are `404`; known paths under another method are `405`.
    pub async fn handle(&self, mut req: Request) -> Response {
        match self.lookup(req.method, &req.path) {
            Lookup::Found(handler, params) => {
                req.params = params;
                handler.call(req).await
            }
            Lookup::MethodNotAllowed => {
                debug!(method = %req.method, path = %req.path, "method not allowed");
                Response::status(Status::MethodNotAllowed)
            }
            Lookup::NotFound => {
                debug!(method = %req.method, path = %req.path, "no route");
                Response::status(Status::NotFound)
            }
        }
    }
}

impl Default for Router {
    fn default() -> Self { Self::new() }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn show(req: Request) -> String {
        format!("user {}", req.param("id").unwrap_or("?"))
    }

    fn app() -> Router {
        Router::new().on(Method::Get, "/user/{id}", show)
    }

    #[tokio::test]
    async fn path_params_reach_the_handler() {
        let res = app().handle(Request::new(Method::Get, "/user/42", Vec::new())).await;

        assert_eq!(res.status_code(), 200);
        assert_eq!(res.body(), b"user 42");
    }

    #[tokio::test]
    async fn unknown_path_is_404_and_wrong_method_is_405() {
        let app = app();

        let missing = app.handle(Request::new(Method::Get, "/nope", Vec::new())).await;
        let wrong = app.handle(Request::new(Method::Delete, "/user/42", Vec::new())).await;

        assert_eq!(missing.status_code(), 404);
        assert_eq!(wrong.status_code(), 405);
    }
}
