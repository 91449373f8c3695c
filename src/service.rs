//! A thin `hyper` [`Service`] adapter over [`Router`], fixing the handler
//! payload to `Arc<dyn Handler>`. Modeled on `ibraheemdev/httprouter-rs`'s
//! `RouterService`/`into_service()` pair: the router itself stays
//! transport-agnostic (see [`crate::registry`]), and this module is the
//! only place that knows about `hyper` request/response types.

use std::convert::Infallible;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use bytes::Bytes;
use http::{Method, Request, Response, StatusCode};
use http_body_util::Full;
use hyper::body::Incoming;
use hyper::service::Service;

use crate::params::Params;
use crate::registry::{Dispatch, Router};

pub type Body = Full<Bytes>;
pub type HandlerFuture = Pin<Box<dyn Future<Output = Response<Body>> + Send>>;

/// Something that can answer a matched request. `params` carries the
/// dynamic-segment bindings captured for this request.
pub trait Handler: Send + Sync {
    fn call(&self, req: Request<Incoming>, params: Params) -> HandlerFuture;
}

impl<F, Fut> Handler for F
where
    F: Fn(Request<Incoming>, Params) -> Fut + Send + Sync,
    Fut: Future<Output = Response<Body>> + Send + 'static,
{
    fn call(&self, req: Request<Incoming>, params: Params) -> HandlerFuture {
        Box::pin((self)(req, params))
    }
}

/// A [`Router`] fixed to `Arc<dyn Handler>`, ready to be wrapped in
/// [`HttpRouter::into_service`] and served with `hyper_util`.
pub type HandlerRouter = Router<Arc<dyn Handler>>;

/// The `hyper::service::Service` adapter itself. Cheap to clone — it is
/// just an `Arc` handle to the router — so it can be handed to one task
/// per accepted connection.
#[derive(Clone)]
pub struct HttpRouter {
    router: Arc<HandlerRouter>,
}

impl HttpRouter {
    pub fn new(router: HandlerRouter) -> Self {
        Self {
            router: Arc::new(router),
        }
    }
}

impl Service<Request<Incoming>> for HttpRouter {
    type Response = Response<Body>;
    type Error = Infallible;
    type Future = HandlerFuture;

    fn call(&self, req: Request<Incoming>) -> Self::Future {
        let router = Arc::clone(&self.router);

        Box::pin(async move {
            let method = req.method().clone();
            let path = req.uri().path().to_string();

            match router.dispatch(&method, &path) {
                Dispatch::Matched { handler, params } => {
                    let handler = Arc::clone(handler);
                    handler.call(req, params).await
                }
                Dispatch::RedirectTrailingSlash { location } | Dispatch::RedirectFixedPath { location } => {
                    let status = if method == Method::GET {
                        StatusCode::MOVED_PERMANENTLY
                    } else {
                        StatusCode::PERMANENT_REDIRECT
                    };
                    redirect(status, &location)
                }
                Dispatch::Options { allow } => Response::builder()
                    .status(StatusCode::NO_CONTENT)
                    .header(http::header::ALLOW, allow)
                    .body(Body::new(Bytes::new()))
                    .expect("static response is well-formed"),
                Dispatch::MethodNotAllowed { allow } => Response::builder()
                    .status(StatusCode::METHOD_NOT_ALLOWED)
                    .header(http::header::ALLOW, allow)
                    .body(Body::new(Bytes::new()))
                    .expect("static response is well-formed"),
                Dispatch::NotFound => Response::builder()
                    .status(StatusCode::NOT_FOUND)
                    .body(Body::new(Bytes::from_static(b"404 page not found\n")))
                    .expect("static response is well-formed"),
            }
        })
    }
}

fn redirect(status: StatusCode, location: &str) -> Response<Body> {
    Response::builder()
        .status(status)
        .header(http::header::LOCATION, location)
        .body(Body::new(Bytes::new()))
        .expect("static response is well-formed")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handler_router_type_compiles_with_boxed_handlers() {
        let mut router: HandlerRouter = Router::new();
        let handler: Arc<dyn Handler> = Arc::new(|_req: Request<Incoming>, _params: Params| async {
            Response::new(Body::new(Bytes::from_static(b"ok")))
        });
        router.get("/", handler);
        assert!(matches!(
            router.dispatch(&Method::GET, "/"),
            Dispatch::Matched { .. }
        ));
    }
}
