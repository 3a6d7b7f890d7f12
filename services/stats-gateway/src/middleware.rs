//! Request logging and CORS middleware

use axum::{
    extract::Request,
    http::{HeaderName, HeaderValue, Method},
    middleware::Next,
    response::Response,
};
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::config::GatewayConfig;

/// Request logging middleware
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let start = std::time::Instant::now();
    let method = request.method().clone();
    let uri = request.uri().clone();
    let client_ip = get_client_ip(&request);

    let response = next.run(request).await;

    let duration = start.elapsed();
    let status = response.status();

    info!(
        method = %method,
        uri = %uri,
        status = %status,
        duration_ms = duration.as_millis(),
        client_ip = %client_ip,
        "Request processed"
    );

    response
}

/// CORS layer factory
pub fn create_cors_layer(config: &GatewayConfig) -> CorsLayer {
    let mut cors =
        CorsLayer::new().max_age(std::time::Duration::from_secs(config.cors.max_age_seconds));

    if config.cors.allowed_origins.iter().any(|origin| origin == "*") {
        cors = cors.allow_origin(tower_http::cors::Any);
    } else {
        let origins: Vec<HeaderValue> = config
            .cors
            .allowed_origins
            .iter()
            .filter_map(|origin| HeaderValue::from_str(origin).ok())
            .collect();
        cors = cors.allow_origin(origins);
    }

    let methods: Result<Vec<Method>, _> = config
        .cors
        .allowed_methods
        .iter()
        .map(|method| method.parse())
        .collect();

    if let Ok(methods) = methods {
        cors = cors.allow_methods(methods);
    }

    let headers: Result<Vec<HeaderName>, _> = config
        .cors
        .allowed_headers
        .iter()
        .map(|header| header.parse())
        .collect();

    if let Ok(headers) = headers {
        cors = cors.allow_headers(headers);
    }

    cors
}

/// Extract client IP from proxy headers
fn get_client_ip(request: &Request) -> String {
    if let Some(first_ip) =
        header_str(request, "X-Forwarded-For").and_then(|value| value.split(',').next())
    {
        return first_ip.trim().to_string();
    }

    header_str(request, "X-Real-IP").map_or_else(|| "unknown".to_string(), str::to_string)
}

fn header_str<'a>(request: &'a Request, name: &str) -> Option<&'a str> {
    request
        .headers()
        .get(name)
        .and_then(|value| value.to_str().ok())
}
