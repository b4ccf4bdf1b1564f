//! Rejects every method but GET with `405 {code, message}`.

use crate::domain::ApiError;
use axum::{
    body::Body,
    http::{Method, Request},
    response::{IntoResponse, Response},
};
use std::task::{Context, Poll};
use tower::{Layer, Service};
use tracing::debug;

#[derive(Clone, Copy, Default)]
pub struct MethodGateLayer;

impl MethodGateLayer {
    pub fn new() -> Self {
        Self
    }
}

impl<S> Layer<S> for MethodGateLayer {
    type Service = MethodGateService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        MethodGateService { inner }
    }
}

#[derive(Clone)]
pub struct MethodGateService<S> {
    inner: S,
}

impl<S> Service<Request<Body>> for MethodGateService<S>
where
    S: Service<Request<Body>, Response = Response> + Clone + Send + 'static,
    S::Future: Send,
{
    type Response = Response;
    type Error = S::Error;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        if req.method() != Method::GET {
            debug!(method = %req.method(), path = %req.uri().path(), "Method not allowed");
            return Box::pin(async { Ok(ApiError::method_not_allowed().into_response()) });
        }

        let mut inner = self.inner.clone();
        Box::pin(async move { inner.call(req).await })
    }
}
