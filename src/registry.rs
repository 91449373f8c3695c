//! `Router<T>`: a per-method collection of [`tree::Node`] roots plus the
//! dispatch decision tree. Generic over the handler payload `T`; the
//! `service` module fixes `T = Arc<dyn Handler>` for real `hyper` serving.
//!
//! Builder methods toggle dispatch policy, `.allowed()` computes the
//! `Allow` header's method list, and `.dispatch()` resolves a request in
//! priority order: exact match → TSR redirect → fixed-path redirect →
//! OPTIONS → method-not-allowed → not-found.

use std::collections::HashMap;

use crate::params::Params;
use crate::path;
use crate::tree::Node;

/// A pattern string paired with the HTTP method it was registered under —
/// part of [`RouterError`]/panic messages, not the happy path.
pub type Method = http::Method;

/// Outcome of [`Router::dispatch`]. Each non-`Matched` variant carries
/// exactly what its caller (the `service` adapter, or a direct embedder)
/// needs to build a response without reaching back into the router.
pub enum Dispatch<'r, T> {
    /// A route matched exactly.
    Matched { handler: &'r T, params: Params },
    /// No route matched, but one does at `location` with the trailing
    /// slash toggled. Callers issue a redirect (301 for GET, 307
    /// otherwise).
    RedirectTrailingSlash { location: String },
    /// No route matched, but a case-insensitive match exists at
    /// `location`.
    RedirectFixedPath { location: String },
    /// `OPTIONS *` or `OPTIONS <path>` with at least one registered method.
    Options { allow: String },
    /// The path matches a route under a different method.
    MethodNotAllowed { allow: String },
    /// Nothing matched, and none of the above recoveries apply.
    NotFound,
}

/// Method → root node map, plus dispatch policy flags. Construct with
/// [`Router::new`] and register routes with [`Router::handle`] before
/// serving; `handle` panics on malformed patterns or conflicts — route
/// registration is a startup-time concern, and a bad pattern should stop
/// the program before it serves a single request.
pub struct Router<T> {
    trees: HashMap<Method, Node<T>>,
    pub redirect_trailing_slash: bool,
    pub redirect_fixed_path: bool,
    pub handle_method_not_allowed: bool,
    pub handle_options: bool,
}

impl<T> Default for Router<T> {
    fn default() -> Self {
        Router {
            trees: HashMap::new(),
            redirect_trailing_slash: true,
            redirect_fixed_path: true,
            handle_method_not_allowed: true,
            handle_options: true,
        }
    }
}

impl<T> Router<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `pattern` under `method`. Panics with a [`RouterError`]
    /// `Display` message on a malformed pattern or a conflicting route —
    /// both are configuration mistakes the program should not start with.
    pub fn handle(&mut self, method: Method, pattern: &str, handler: T) {
        if !pattern.starts_with('/') {
            panic!(
                "{}",
                crate::error::RouterError::MissingLeadingSlash(pattern.to_string())
            );
        }

        let tree = self.trees.entry(method).or_insert_with(Node::new);
        if let Err(e) = tree.add_route(pattern, handler) {
            panic!("{}", describe_insert_error(pattern, e));
        }
    }

    pub fn get(&mut self, pattern: &str, handler: T) {
        self.handle(Method::GET, pattern, handler);
    }

    pub fn post(&mut self, pattern: &str, handler: T) {
        self.handle(Method::POST, pattern, handler);
    }

    pub fn put(&mut self, pattern: &str, handler: T) {
        self.handle(Method::PUT, pattern, handler);
    }

    pub fn patch(&mut self, pattern: &str, handler: T) {
        self.handle(Method::PATCH, pattern, handler);
    }

    pub fn delete(&mut self, pattern: &str, handler: T) {
        self.handle(Method::DELETE, pattern, handler);
    }

    /// Every method, other than the one being dispatched, that has a
    /// route registered at `path`. Drives both the `Allow` header on an
    /// `OPTIONS` response and a 405's `Allow` header.
    pub fn allowed(&self, path: &str) -> Vec<&str> {
        let mut methods = Vec::new();

        if path == "*" {
            for method in self.trees.keys() {
                if method != Method::OPTIONS {
                    methods.push(method.as_str());
                }
            }
            return methods;
        }

        for (method, tree) in &self.trees {
            if method == Method::OPTIONS {
                continue;
            }
            if tree.get_value(path).handler.is_some() {
                methods.push(method.as_str());
            }
        }
        methods
    }

    /// The full priority-ordered dispatch: exact match, then (unless
    /// `method` is `CONNECT`) trailing-slash and fixed-path redirects,
    /// then OPTIONS, then method-not-allowed, then not-found.
    pub fn dispatch(&self, method: &Method, request_path: &str) -> Dispatch<'_, T> {
        if let Some(tree) = self.trees.get(method) {
            let result = tree.get_value(request_path);
            if let (Some(handler), Some(params)) = (result.handler, result.params) {
                return Dispatch::Matched { handler, params };
            }

            if method != Method::CONNECT && request_path != "/" {
                if result.tsr && self.redirect_trailing_slash {
                    let location = toggle_trailing_slash(request_path);
                    return Dispatch::RedirectTrailingSlash { location };
                }

                if self.redirect_fixed_path {
                    let cleaned = path::clean(request_path);
                    if let Some(fixed) =
                        tree.find_case_insensitive_path(&cleaned, self.redirect_trailing_slash)
                    {
                        return Dispatch::RedirectFixedPath { location: fixed };
                    }
                }
            }
        }

        if method == Method::OPTIONS && self.handle_options {
            let allow = self.allowed(request_path);
            if !allow.is_empty() {
                return Dispatch::Options {
                    allow: allow.join(", "),
                };
            }
        } else if self.handle_method_not_allowed {
            let allow = self.allowed(request_path);
            if !allow.is_empty() {
                return Dispatch::MethodNotAllowed {
                    allow: allow.join(", "),
                };
            }
        }

        Dispatch::NotFound
    }
}

fn toggle_trailing_slash(path: &str) -> String {
    if let Some(stripped) = path.strip_suffix('/') {
        stripped.to_string()
    } else {
        format!("{path}/")
    }
}

fn describe_insert_error(pattern: &str, err: crate::tree::InsertError) -> String {
    use crate::tree::InsertError;
    match err {
        InsertError::Conflict { pattern, existing } => crate::error::RouterError::WildcardConflict {
            pattern,
            at: existing,
        }
        .to_string(),
        InsertError::Duplicate { pattern } => {
            crate::error::RouterError::DuplicateRoute(pattern).to_string()
        }
        InsertError::EmptyParamName => {
            crate::error::RouterError::EmptyParamName(pattern.to_string()).to_string()
        }
        InsertError::CatchAllNotFinal => {
            crate::error::RouterError::CatchAllNotFinal(pattern.to_string()).to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn router() -> Router<&'static str> {
        let mut r = Router::new();
        r.get("/", "root");
        r.get("/users/:id", "user");
        r.get("/files/*filepath", "files");
        r.post("/users/:id", "update-user");
        r
    }

    #[test]
    fn exact_match_dispatch() {
        let r = router();
        match r.dispatch(&Method::GET, "/users/7") {
            Dispatch::Matched { handler, params } => {
                assert_eq!(*handler, "user");
                assert_eq!(params.get("id"), Some("7"));
            }
            _ => panic!("expected a match"),
        }
    }

    #[test]
    fn trailing_slash_redirect() {
        let mut r: Router<&'static str> = Router::new();
        r.get("/users/", "users");
        match r.dispatch(&Method::GET, "/users") {
            Dispatch::RedirectTrailingSlash { location } => assert_eq!(location, "/users/"),
            _ => panic!("expected a trailing-slash redirect"),
        }
    }

    #[test]
    fn fixed_path_redirect() {
        let mut r: Router<&'static str> = Router::new();
        r.get("/Users", "users");
        match r.dispatch(&Method::GET, "/users") {
            Dispatch::RedirectFixedPath { location } => assert_eq!(location, "/Users"),
            _ => panic!("expected a fixed-path redirect"),
        }
    }

    #[test]
    fn options_lists_allowed_methods() {
        let r = router();
        match r.dispatch(&Method::OPTIONS, "/users/7") {
            Dispatch::Options { allow } => {
                assert!(allow.contains("GET"));
                assert!(allow.contains("POST"));
            }
            _ => panic!("expected an options response"),
        }
    }

    #[test]
    fn method_not_allowed_lists_allowed_methods() {
        let r = router();
        match r.dispatch(&Method::DELETE, "/users/7") {
            Dispatch::MethodNotAllowed { allow } => {
                assert!(allow.contains("GET"));
                assert!(allow.contains("POST"));
            }
            _ => panic!("expected a method-not-allowed response"),
        }
    }

    #[test]
    fn unmatched_path_is_not_found() {
        let r = router();
        assert!(matches!(
            r.dispatch(&Method::GET, "/nope"),
            Dispatch::NotFound
        ));
    }

    #[test]
    fn connect_never_triggers_path_rewrites() {
        let mut r: Router<&'static str> = Router::new();
        r.handle(Method::CONNECT, "/users/", "users");
        assert!(matches!(
            r.dispatch(&Method::CONNECT, "/users"),
            Dispatch::NotFound
        ));
    }

    #[test]
    #[should_panic]
    fn duplicate_registration_panics() {
        let mut r: Router<&'static str> = Router::new();
        r.get("/users", "a");
        r.get("/users", "b");
    }

    #[test]
    #[should_panic]
    fn missing_leading_slash_panics() {
        let mut r: Router<&'static str> = Router::new();
        r.get("users", "a");
    }
}
