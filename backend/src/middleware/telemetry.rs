//! Request telemetry middleware.
//!
//! Records method, matched route, status and latency for every request into
//! an injected [`RequestTelemetry`] sink. Recording failures are logged and
//! never change the response.

use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Instant;

use actix_web::Error;
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use tracing::warn;

use crate::domain::ports::{RequestSample, RequestTelemetry};

const UNMATCHED_ROUTE: &str = "unmatched";

/// Middleware feeding a [`RequestTelemetry`] sink.
#[derive(Clone)]
pub struct RequestMetrics {
    telemetry: Arc<dyn RequestTelemetry>,
}

impl RequestMetrics {
    /// Record every request into `telemetry`.
    pub fn new(telemetry: Arc<dyn RequestTelemetry>) -> Self {
        Self { telemetry }
    }
}

impl<S, B> Transform<S, ServiceRequest> for RequestMetrics
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = RequestMetricsMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequestMetricsMiddleware {
            service,
            telemetry: Arc::clone(&self.telemetry),
        }))
    }
}

/// Service wrapper produced by [`RequestMetrics`].
pub struct RequestMetricsMiddleware<S> {
    service: S,
    telemetry: Arc<dyn RequestTelemetry>,
}

impl<S, B> Service<ServiceRequest> for RequestMetricsMiddleware<S>
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
        let started = Instant::now();
        let method = req.method().to_string();
        let route = req
            .match_pattern()
            .unwrap_or_else(|| UNMATCHED_ROUTE.to_owned());
        let telemetry = Arc::clone(&self.telemetry);
        let fut = self.service.call(req);

        Box::pin(async move {
            let result = fut.await;
            let status = match &result {
                Ok(res) => res.status(),
                Err(err) => err.as_response_error().status_code(),
            };
            let sample = RequestSample {
                method,
                route,
                status: status.as_u16(),
                duration: started.elapsed(),
            };
            if let Err(error) = telemetry.record_request(&sample).await {
                warn!(%error, route = %sample.route, "failed to record request telemetry");
            }
            result
        })
    }
}
