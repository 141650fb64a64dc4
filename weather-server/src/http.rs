//! HTTP surface: `GET /weather?cep=...`.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{RawQuery, State},
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use tokio::net::TcpListener;
use tower_http::{set_header::SetResponseHeaderLayer, trace::TraceLayer};
use weather_core::{ErrorKind, ErrorResponse, LookupError, WeatherService};

/// Client-facing wrapper that turns a [`LookupError`] into a JSON response.
#[derive(Debug)]
pub struct ApiError(pub LookupError);

impl ApiError {
    fn status(&self) -> StatusCode {
        match self.0.kind() {
            ErrorKind::Validation if matches!(self.0, LookupError::MissingCep) => {
                StatusCode::BAD_REQUEST
            }
            ErrorKind::Validation => StatusCode::UNPROCESSABLE_ENTITY,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Upstream => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<LookupError> for ApiError {
    fn from(err: LookupError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.0.to_string();
        if status.is_server_error() {
            // Upstream detail stays in the logs.
            tracing::error!("{:#}", anyhow::Error::new(self.0));
        } else {
            tracing::debug!(status = %status, "{}", message);
        }
        (status, Json(ErrorResponse::new(message))).into_response()
    }
}

/// First value of `key` in a raw query string. Repeated keys keep the first.
fn first_query_value(query: Option<&str>, key: &str) -> Option<String> {
    url::form_urlencoded::parse(query?.as_bytes())
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.into_owned())
}

pub async fn weather_handler(
    State(service): State<Arc<WeatherService>>,
    RawQuery(query): RawQuery,
) -> Result<impl IntoResponse, ApiError> {
    let cep = first_query_value(query.as_deref(), "cep");
    let temperature = service.temperature_for(cep.as_deref()).await?;
    Ok(Json(temperature))
}

/// Build the router with CORS headers on every response.
pub fn router(service: Arc<WeatherService>) -> Router {
    Router::new()
        .route("/weather", get(weather_handler))
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static("*"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static("GET, POST, OPTIONS"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static("Content-Type"),
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(service)
}

/// Serve until Ctrl-C.
pub async fn serve(listen_addr: &str, service: Arc<WeatherService>) -> anyhow::Result<()> {
    let listener = TcpListener::bind(listen_addr).await?;
    tracing::info!("cep-weather listening on {}", listener.local_addr()?);

    axum::serve(listener, router(service))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;
    use weather_core::Config;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn app_with(viacep: &MockServer, weatherapi: &MockServer) -> Router {
        let mut cfg = Config::default();
        cfg.viacep.base_url = format!("{}/ws", viacep.uri());
        cfg.weatherapi.base_url = format!("{}/v1", weatherapi.uri());
        cfg.set_weatherapi_key("TEST_KEY".to_string());

        let service = WeatherService::from_config(&cfg).expect("service builds");
        router(Arc::new(service))
    }

    async fn send_get(app: Router, uri: &str) -> (StatusCode, Response) {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        let response = app.oneshot(request).await.unwrap();
        (response.status(), response)
    }

    async fn json_body(response: Response) -> serde_json::Value {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    async fn mount_city(server: &MockServer, cep: &str, city: &str) {
        Mock::given(method("GET"))
            .and(path(format!("/ws/{cep}/json/")))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "cep": cep,
                "localidade": city,
                "uf": "SP"
            })))
            .mount(server)
            .await;
    }

    async fn mount_temp(server: &MockServer, city: &str, temp_c: f64) {
        Mock::given(method("GET"))
            .and(path("/v1/current.json"))
            .and(query_param("q", city))
            .and(query_param("key", "TEST_KEY"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "location": { "name": city, "region": "", "country": "Brazil" },
                "current": { "temp_c": temp_c, "temp_f": -999.0 }
            })))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn missing_cep_returns_400() {
        let (viacep, weatherapi) = (MockServer::start().await, MockServer::start().await);
        let app = app_with(&viacep, &weatherapi);

        let (status, response) = send_get(app, "/weather").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["message"], "postal code not provided");
    }

    #[tokio::test]
    async fn empty_cep_returns_400() {
        let (viacep, weatherapi) = (MockServer::start().await, MockServer::start().await);
        let app = app_with(&viacep, &weatherapi);

        let (status, _) = send_get(app, "/weather?cep=").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn short_cep_returns_422() {
        let (viacep, weatherapi) = (MockServer::start().await, MockServer::start().await);
        let app = app_with(&viacep, &weatherapi);

        let (status, response) = send_get(app, "/weather?cep=123").await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(json_body(response).await["message"], "invalid zipcode");
    }

    #[tokio::test]
    async fn repeated_cep_uses_first_value() {
        let (viacep, weatherapi) = (MockServer::start().await, MockServer::start().await);
        mount_city(&viacep, "01310100", "São Paulo").await;
        mount_temp(&weatherapi, "São Paulo", 20.0).await;
        let app = app_with(&viacep, &weatherapi);

        let (status, response) = send_get(app.clone(), "/weather?cep=123&cep=01310100").await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/json");
        assert_eq!(json_body(response).await["message"], "invalid zipcode");

        let (status, response) = send_get(app, "/weather?cep=01310100&cep=x").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json_body(response).await["temp_C"], 20.0);
    }

    #[test]
    fn first_query_value_decodes_and_ignores_other_keys() {
        assert_eq!(
            first_query_value(Some("a=1&cep=01310%2D100"), "cep").as_deref(),
            Some("01310-100")
        );
        assert_eq!(first_query_value(Some("cep=1&cep=2"), "cep").as_deref(), Some("1"));
        assert_eq!(first_query_value(Some("a=1"), "cep"), None);
        assert_eq!(first_query_value(None, "cep"), None);
    }

    #[test]
    fn status_follows_error_kind() {
        let status = |err| ApiError(err).status();
        assert_eq!(status(LookupError::MissingCep), StatusCode::BAD_REQUEST);
        assert_eq!(status(LookupError::InvalidCep), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(status(LookupError::NotFound), StatusCode::NOT_FOUND);
        assert_eq!(
            status(LookupError::Weather(anyhow::anyhow!("down"))),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn hyphenated_cep_resolves_and_derives_units() {
        let (viacep, weatherapi) = (MockServer::start().await, MockServer::start().await);
        mount_city(&viacep, "01310100", "São Paulo").await;
        mount_temp(&weatherapi, "São Paulo", 25.0).await;
        let app = app_with(&viacep, &weatherapi);

        let (status, response) = send_get(app, "/weather?cep=01310-100").await;
        assert_eq!(status, StatusCode::OK);

        let body = json_body(response).await;
        assert_eq!(body, serde_json::json!({ "temp_C": 25.0, "temp_F": 77.0, "temp_K": 298.0 }));
    }

    #[tokio::test]
    async fn derived_units_follow_formulas() {
        let (viacep, weatherapi) = (MockServer::start().await, MockServer::start().await);
        mount_city(&viacep, "29108790", "Vila Velha").await;
        mount_temp(&weatherapi, "Vila Velha", 18.3).await;
        let app = app_with(&viacep, &weatherapi);

        let (status, response) = send_get(app, "/weather?cep=29108790").await;
        assert_eq!(status, StatusCode::OK);

        let body = json_body(response).await;
        let c = body["temp_C"].as_f64().unwrap();
        assert_eq!(c, 18.3);
        assert!((body["temp_F"].as_f64().unwrap() - (c * 1.8 + 32.0)).abs() < 1e-9);
        assert!((body["temp_K"].as_f64().unwrap() - (c + 273.0)).abs() < 1e-9);
    }

    #[tokio::test]
    async fn repeated_requests_are_identical() {
        let (viacep, weatherapi) = (MockServer::start().await, MockServer::start().await);
        mount_city(&viacep, "29108790", "Vila Velha").await;
        mount_temp(&weatherapi, "Vila Velha", 21.0).await;
        let app = app_with(&viacep, &weatherapi);

        let (_, first) = send_get(app.clone(), "/weather?cep=29108790").await;
        let (_, second) = send_get(app, "/weather?cep=29108790").await;
        assert_eq!(json_body(first).await, json_body(second).await);
    }

    #[tokio::test]
    async fn unknown_cep_returns_404() {
        let (viacep, weatherapi) = (MockServer::start().await, MockServer::start().await);
        Mock::given(method("GET"))
            .and(path("/ws/99999999/json/"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "erro": true })),
            )
            .mount(&viacep)
            .await;
        let app = app_with(&viacep, &weatherapi);

        let (status, response) = send_get(app, "/weather?cep=99999999").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json_body(response).await["message"], "can not find zipcode");
    }

    #[tokio::test]
    async fn empty_city_returns_500() {
        let (viacep, weatherapi) = (MockServer::start().await, MockServer::start().await);
        mount_city(&viacep, "29108790", "").await;
        let app = app_with(&viacep, &weatherapi);

        let (status, response) = send_get(app, "/weather?cep=29108790").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json_body(response).await["message"], "failed to resolve location");
    }

    #[tokio::test]
    async fn weather_failure_returns_500_without_detail() {
        let (viacep, weatherapi) = (MockServer::start().await, MockServer::start().await);
        mount_city(&viacep, "29108790", "Vila Velha").await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401).set_body_string("API key is invalid."))
            .mount(&weatherapi)
            .await;
        let app = app_with(&viacep, &weatherapi);

        let (status, response) = send_get(app, "/weather?cep=29108790").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

        let body = json_body(response).await;
        assert_eq!(body, serde_json::json!({ "message": "failed to fetch temperature" }));
    }

    #[tokio::test]
    async fn cors_headers_on_every_response() {
        let (viacep, weatherapi) = (MockServer::start().await, MockServer::start().await);
        let app = app_with(&viacep, &weatherapi);

        for uri in ["/weather", "/weather?cep=123"] {
            let (_, response) = send_get(app.clone(), uri).await;
            let headers = response.headers();
            assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
            assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_METHODS], "GET, POST, OPTIONS");
            assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_HEADERS], "Content-Type");
        }
    }
}
