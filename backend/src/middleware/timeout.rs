//! Per-request deadline.
//!
//! Requests still running when the deadline passes are dropped and fail with
//! a `service_unavailable` domain error, rendered as a 503 by its
//! `ResponseError` mapping.

use std::task::{Context, Poll};
use std::time::Duration;

use actix_web::Error;
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use tracing::warn;

use crate::domain::Error as DomainError;

/// Default request deadline.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Middleware bounding each request by a deadline.
#[derive(Debug, Clone, Copy)]
pub struct RequestTimeout {
    duration: Duration,
}

impl RequestTimeout {
    /// Bound each request by `duration`.
    pub fn new(duration: Duration) -> Self {
        Self { duration }
    }
}

impl Default for RequestTimeout {
    fn default() -> Self {
        Self::new(DEFAULT_REQUEST_TIMEOUT)
    }
}

impl<S, B> Transform<S, ServiceRequest> for RequestTimeout
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = RequestTimeoutMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequestTimeoutMiddleware {
            service,
            duration: self.duration,
        }))
    }
}

/// Service wrapper produced by [`RequestTimeout`].
pub struct RequestTimeoutMiddleware<S> {
    service: S,
    duration: Duration,
}

impl<S, B> Service<ServiceRequest> for RequestTimeoutMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        // The router needs sole ownership of the request, so only the path is
        // kept for the log line.
        let duration = self.duration;
        let path = req.path().to_owned();
        let fut = self.service.call(req);
        Box::pin(async move {
            match tokio::time::timeout(duration, fut).await {
                Ok(result) => result,
                Err(_) => {
                    warn!(%path, timeout_ms = duration.as_millis(), "request timed out");
                    Err(DomainError::service_unavailable("request timed out").into())
                }
            }
        })
    }
}
