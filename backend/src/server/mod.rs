//! Server construction and middleware wiring.

mod config;
mod state_builders;

pub use config::ServerConfig;

use state_builders::build_http_state;

use std::sync::Arc;
use std::time::Duration;

use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, body::BoxBody, web};

use subscriber_api::Trace;
#[cfg(debug_assertions)]
use subscriber_api::doc::ApiDoc;
use subscriber_api::domain::ports::RequestTelemetry;
#[cfg(not(feature = "metrics"))]
use subscriber_api::domain::ports::NoOpRequestTelemetry;
use subscriber_api::inbound::http::configure;
use subscriber_api::inbound::http::health::{HealthState, live, ready};
#[cfg(feature = "metrics")]
use subscriber_api::inbound::http::metrics::metrics;
use subscriber_api::inbound::http::state::HttpState;
use subscriber_api::middleware::{RequestMetrics, RequestTimeout};
#[cfg(feature = "metrics")]
use subscriber_api::outbound::metrics::PrometheusRequestTelemetry;
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

#[derive(Clone)]
struct AppDependencies {
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
    telemetry: Arc<dyn RequestTelemetry>,
    request_timeout: Duration,
    #[cfg(feature = "metrics")]
    registry: Option<web::Data<prometheus::Registry>>,
}

fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<BoxBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppDependencies {
        health_state,
        http_state,
        telemetry,
        request_timeout,
        #[cfg(feature = "metrics")]
        registry,
    } = deps;

    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .configure(configure)
        .service(ready)
        .service(live);

    #[cfg(feature = "metrics")]
    let app = match registry {
        Some(registry) => app.app_data(registry).service(metrics),
        None => app,
    };

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));

    app.wrap(RequestTimeout::new(request_timeout))
        .wrap(RequestMetrics::new(telemetry))
        .wrap(Trace)
}

/// Select the request telemetry sink.
///
/// # Errors
///
/// Returns [`std::io::Error`] if Prometheus metric registration fails.
#[cfg(feature = "metrics")]
fn build_telemetry(config: &ServerConfig) -> std::io::Result<Arc<dyn RequestTelemetry>> {
    match &config.registry {
        Some(registry) => {
            let telemetry = PrometheusRequestTelemetry::new(registry).map_err(|err| {
                std::io::Error::other(format!("request metrics registration failed: {err}"))
            })?;
            Ok(Arc::new(telemetry))
        }
        None => Ok(Arc::new(
            subscriber_api::domain::ports::NoOpRequestTelemetry,
        )),
    }
}

#[cfg(not(feature = "metrics"))]
fn build_telemetry(_config: &ServerConfig) -> std::io::Result<Arc<dyn RequestTelemetry>> {
    Ok(Arc::new(NoOpRequestTelemetry))
}

/// Construct the Actix HTTP server.
///
/// Marks `health_state` ready once the listener is bound.
///
/// # Errors
/// Propagates [`std::io::Error`] when adapter setup, metric registration or
/// binding the socket fails.
pub fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let http_state = build_http_state(&config)?;
    let telemetry = build_telemetry(&config)?;
    let deps = AppDependencies {
        health_state: health_state.clone(),
        http_state,
        telemetry,
        request_timeout: config.request_timeout,
        #[cfg(feature = "metrics")]
        registry: config.registry.clone().map(web::Data::new),
    };

    let server = HttpServer::new(move || build_app(deps.clone()))
        .bind(config.bind_addr)?
        .run();

    health_state.mark_ready();
    Ok(server)
}
