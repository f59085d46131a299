//! HTTP surface: router, layers and server lifecycle.

use anyhow::Result;
use axum::{
    Extension, Router,
    body::{Body, Bytes, to_bytes},
    extract::{MatchedPath, Request},
    http::{
        HeaderName, HeaderValue, Method, StatusCode,
        header::{AUTHORIZATION, CONTENT_LENGTH, CONTENT_TYPE},
    },
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::get,
};
use serde_json::Value;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::PropagateRequestIdLayer,
    set_header::SetRequestHeaderLayer,
    trace::TraceLayer,
};
use tracing::{Span, debug, info, info_span};
use ulid::Ulid;
use utoipa_axum::router::OpenApiRouter;
use utoipa_swagger_ui::SwaggerUi;

pub mod error;
pub(crate) mod handlers;
mod openapi;
pub mod state;

#[cfg(test)]
mod tests;

pub use error::{ApiError, Environment, MessageResponse};
pub use openapi::openapi;
pub use state::{AppState, AuthState, PaymentState};

use handlers::root;

const REQUEST_ID: &str = "x-request-id";
const MAX_LOGGED_BODY_BYTES: usize = 2 * 1024 * 1024;
const REDACTED_FIELDS: [&str; 3] = ["password", "otp", "razorpay_signature"];

/// Build the API router with all documented routes registered.
#[must_use]
pub fn router() -> OpenApiRouter {
    openapi::api_router()
}

/// Full application: documented routes plus `/`, Swagger UI, fallback and layers.
pub fn app(state: AppState) -> Router {
    let (router, openapi) = router().split_for_parts();
    let mut app = router
        .route("/", get(root::root))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi))
        .fallback(root::not_found);

    if !state.environment.is_production() {
        app = app.layer(middleware::from_fn(log_request));
    }

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION]);

    app.layer(
        ServiceBuilder::new()
            .layer(middleware::from_fn(options_no_content))
            .layer(SetRequestHeaderLayer::if_not_present(
                HeaderName::from_static(REQUEST_ID),
                |_req: &_| HeaderValue::from_str(Ulid::new().to_string().as_str()).ok(),
            ))
            .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
                REQUEST_ID,
            )))
            .layer(TraceLayer::new_for_http().make_span_with(make_span))
            .layer(cors)
            .layer(Extension(state.auth))
            .layer(Extension(state.payment))
            .layer(Extension(state.environment)),
    )
}

/// Start the server
/// # Errors
/// Return error if failed to bind or serve
pub async fn new(port: u16, state: AppState) -> Result<()> {
    let app = app(state);

    let listener = TcpListener::bind(format!("::0:{port}")).await?;

    info!("Listening on [::]:{}", port);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {err}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!("Failed to listen for SIGTERM: {err}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!("Gracefully shutdown");
}

fn make_span(request: &Request<Body>) -> Span {
    let request_id = request
        .headers()
        .get(REQUEST_ID)
        .and_then(|val| val.to_str().ok())
        .unwrap_or("none");
    let matched_path = request
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| request.uri().path(), MatchedPath::as_str);

    info_span!(
        "http.request",
        http.method = %request.method(),
        http.route = matched_path,
        request_id
    )
}

/// Every `OPTIONS` request is answered with an empty 204, keeping CORS headers.
async fn options_no_content(request: Request, next: Next) -> Response {
    let is_options = request.method() == Method::OPTIONS;
    let response = next.run(request).await;
    if !is_options {
        return response;
    }

    let (mut parts, _body) = response.into_parts();
    parts.status = StatusCode::NO_CONTENT;
    parts.headers.remove(CONTENT_TYPE);
    parts.headers.remove(CONTENT_LENGTH);
    Response::from_parts(parts, Body::empty())
}

/// Development-only request log: `[METHOD] path - body`, secrets redacted.
async fn log_request(request: Request, next: Next) -> Response {
    let (parts, body) = request.into_parts();
    let bytes = match to_bytes(body, MAX_LOGGED_BODY_BYTES).await {
        Ok(bytes) => bytes,
        Err(err) => {
            debug!("Failed to buffer request body: {err}");
            return ApiError::new(StatusCode::PAYLOAD_TOO_LARGE, "Request body too large")
                .into_response();
        }
    };

    debug!(
        "[{}] {} - {}",
        parts.method,
        parts.uri.path(),
        redacted_body(&bytes)
    );

    next.run(Request::from_parts(parts, Body::from(bytes))).await
}

fn redacted_body(bytes: &Bytes) -> String {
    if bytes.is_empty() {
        return "{}".to_string();
    }
    match serde_json::from_slice::<Value>(bytes) {
        Ok(Value::Object(mut map)) => {
            for field in REDACTED_FIELDS {
                if let Some(value) = map.get_mut(field) {
                    *value = Value::String("***".to_string());
                }
            }
            Value::Object(map).to_string()
        }
        Ok(other) => other.to_string(),
        Err(_) => format!("<{} bytes>", bytes.len()),
    }
}
