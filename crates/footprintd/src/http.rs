use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::{header, HeaderValue, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use serde::Serialize;
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;

use footprint_core::{tool_catalog, FootprintError, ScanReport, ScanRequest, ScanWorkflow};

const INTERNAL_ERROR_DETAIL: &str = "Scan failed due to an internal error";

/// Local frontend dev servers allowed by default.
pub const DEFAULT_CORS_ORIGINS: [&str; 3] = [
    "http://localhost:8080",
    "http://localhost:5173",
    "http://localhost:3000",
];

#[derive(Clone)]
pub struct AppState {
    workflow: Arc<ScanWorkflow>,
}

/// Credentialed CORS for exactly `origins`.
pub fn cors_layer<S: AsRef<str>>(origins: &[S]) -> anyhow::Result<CorsLayer> {
    let origins = origins
        .iter()
        .map(|o| {
            HeaderValue::from_str(o.as_ref().trim())
                .map_err(|_| anyhow::anyhow!("invalid CORS origin: {}", o.as_ref()))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;
    Ok(CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT])
        .allow_credentials(true))
}

pub fn router(workflow: Arc<ScanWorkflow>, cors: CorsLayer) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/api/scan", post(scan))
        .route("/api/tools/status", get(tools_status))
        .layer(cors)
        .with_state(AppState { workflow })
}

async fn root() -> Json<Value> {
    Json(json!({
        "service": "FootprintGuard API",
        "status": "operational",
        "version": footprint_core::VERSION,
    }))
}

async fn health() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": Utc::now().to_rfc3339(),
        "components": {
            "api": "operational",
            "tools": "operational",
        },
    }))
}

async fn tools_status() -> Json<Value> {
    Json(json!({ "tools": tool_catalog() }))
}

async fn scan(
    State(state): State<AppState>,
    payload: Result<Json<ScanRequest>, JsonRejection>,
) -> Result<Json<ScanReport>, ApiError> {
    let Json(request) = payload.map_err(ApiError::Body)?;
    let report = state.workflow.scan(&request).await?;
    Ok(Json(report))
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    detail: String,
}

/// Maps request and workflow errors onto `{"detail": ...}` responses.
///
/// Unreadable bodies keep the extractor's status; validation failures are
/// echoed back as 400; anything else is logged in full and reported with a
/// generic 500 detail.
#[derive(Debug)]
pub enum ApiError {
    Body(JsonRejection),
    Scan(FootprintError),
}

impl From<FootprintError> for ApiError {
    fn from(err: FootprintError) -> Self {
        ApiError::Scan(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = match &self {
            ApiError::Body(rejection) => (rejection.status(), rejection.body_text()),
            ApiError::Scan(e) if e.is_client_error() => (StatusCode::BAD_REQUEST, e.to_string()),
            ApiError::Scan(other) => {
                tracing::error!(error = %other, "scan request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    INTERNAL_ERROR_DETAIL.to_string(),
                )
            }
        };
        (status, Json(ErrorBody { detail })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;
    use footprint_core::fakes::{PanickingGenerator, StaticProviders};
    use footprint_core::{
        BreachFindings, EvidenceEvaluator, EvidenceGatherer, RevisionController, RiskLevel,
        TaskPlanner,
    };

    fn state(workflow: ScanWorkflow) -> State<AppState> {
        State(AppState {
            workflow: Arc::new(workflow),
        })
    }

    fn breached() -> ScanWorkflow {
        let providers = StaticProviders {
            breach: BreachFindings {
                found: true,
                sources: vec!["Adobe".to_string(), "Dropbox".to_string()],
            },
            ..Default::default()
        };
        ScanWorkflow::rule_based(providers.into_provider_set(), 2)
    }

    async fn body_json(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_scan_returns_report() {
        let request = ScanRequest {
            email: Some("victim@example.com".to_string()),
            ..Default::default()
        };
        let Json(report) = scan(state(breached()), Ok(Json(request))).await.unwrap();
        assert_eq!(report.risk_score, 20);
        assert_eq!(report.risk_level, RiskLevel::Low);

        let wire = serde_json::to_value(&report).unwrap();
        for key in ["riskScore", "riskLevel", "riskFactors", "mitigations", "evidence", "timestamp"] {
            assert!(wire.get(key).is_some(), "missing {key}");
        }
    }

    #[tokio::test]
    async fn test_empty_scan_is_bad_request() {
        let err = scan(state(breached()), Ok(Json(ScanRequest::default())))
            .await
            .unwrap_err();
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert!(body["detail"].as_str().unwrap().contains("must be provided"));
    }

    #[tokio::test]
    async fn test_invalid_email_is_bad_request() {
        let request = ScanRequest {
            email: Some("not-an-email".to_string()),
            ..Default::default()
        };
        let err = scan(state(breached()), Ok(Json(request))).await.unwrap_err();
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_workflow_failure_is_generic_500() {
        let workflow = ScanWorkflow::new(
            TaskPlanner::Deterministic,
            EvidenceGatherer::new(StaticProviders::quiet().into_provider_set()),
            Arc::new(PanickingGenerator),
            Arc::new(EvidenceEvaluator),
            RevisionController::default(),
        );
        let request = ScanRequest {
            github_username: Some("octocat".to_string()),
            ..Default::default()
        };
        let err = scan(state(workflow), Ok(Json(request))).await.unwrap_err();
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(response).await;
        assert_eq!(body["detail"], INTERNAL_ERROR_DETAIL);
    }

    #[tokio::test]
    async fn test_informational_endpoints() {
        let Json(root) = root().await;
        assert_eq!(root["status"], "operational");

        let Json(health) = health().await;
        assert_eq!(health["status"], "healthy");
        assert!(health["timestamp"].is_string());

        let Json(tools) = tools_status().await;
        assert_eq!(tools["tools"].as_array().unwrap().len(), 3);
    }

    fn app(workflow: ScanWorkflow) -> Router {
        router(Arc::new(workflow), cors_layer(&DEFAULT_CORS_ORIGINS).unwrap())
    }

    fn post_scan(body: &str) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri("/api/scan")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_routed_scan_returns_report() {
        let response = app(breached())
            .oneshot(post_scan(r#"{"email": "victim@example.com"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["riskScore"], 20);
        assert_eq!(body["riskLevel"], "Low");
    }

    #[tokio::test]
    async fn test_routed_empty_scan_is_detail_400() {
        let response = app(breached()).oneshot(post_scan("{}")).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert!(body["detail"].as_str().unwrap().contains("must be provided"));
    }

    #[tokio::test]
    async fn test_malformed_body_keeps_detail_shape() {
        let response = app(breached())
            .oneshot(post_scan(r#"{"email": "#))
            .await
            .unwrap();
        assert!(response.status().is_client_error());
        let body = body_json(response).await;
        assert!(!body["detail"].as_str().unwrap().is_empty());

        let response = app(breached())
            .oneshot(post_scan(r#"{"email": 42}"#))
            .await
            .unwrap();
        assert!(response.status().is_client_error());
        assert!(body_json(response).await["detail"].is_string());
    }

    #[tokio::test]
    async fn test_missing_content_type_keeps_detail_shape() {
        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/scan")
            .body(Body::from("{}"))
            .unwrap();
        let response = app(breached()).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
        assert!(body_json(response).await["detail"].is_string());
    }

    #[tokio::test]
    async fn test_routed_tools_status() {
        let response = app(breached())
            .oneshot(get_request("/api/tools/status"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        let tools = body["tools"].as_array().unwrap();
        assert_eq!(tools.len(), 3);
        for tool in tools {
            assert!(tool["name"].is_string());
            assert!(tool["status"].is_string());
            assert!(tool["description"].is_string());
        }
    }

    #[tokio::test]
    async fn test_routed_health_shape() {
        let response = app(breached()).oneshot(get_request("/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["status"], "healthy");
        let timestamp = body["timestamp"].as_str().unwrap();
        assert!(chrono::DateTime::parse_from_rfc3339(timestamp).is_ok());
        assert_eq!(body["components"]["api"], "operational");
        assert_eq!(body["components"]["tools"], "operational");
    }

    #[tokio::test]
    async fn test_preflight_allows_configured_origin() {
        let preflight = Request::builder()
            .method(Method::OPTIONS)
            .uri("/api/scan")
            .header(header::ORIGIN, "http://localhost:5173")
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
            .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type")
            .body(Body::empty())
            .unwrap();
        let response = app(breached()).oneshot(preflight).await.unwrap();
        assert!(response.status().is_success());
        let headers = response.headers();
        assert_eq!(
            headers[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "http://localhost:5173"
        );
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_CREDENTIALS], "true");
        assert!(headers[header::ACCESS_CONTROL_ALLOW_METHODS]
            .to_str()
            .unwrap()
            .contains("POST"));
    }

    #[tokio::test]
    async fn test_unlisted_origin_gets_no_cors_grant() {
        let preflight = Request::builder()
            .method(Method::OPTIONS)
            .uri("/api/scan")
            .header(header::ORIGIN, "https://evil.example")
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
            .body(Body::empty())
            .unwrap();
        let response = app(breached()).oneshot(preflight).await.unwrap();
        assert!(response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .is_none());
    }

    #[tokio::test]
    async fn test_configured_origins_replace_defaults() {
        let app = router(
            Arc::new(breached()),
            cors_layer(&["https://footprint.example"]).unwrap(),
        );
        let mut request = get_request("/health");
        request
            .headers_mut()
            .insert(header::ORIGIN, HeaderValue::from_static("https://footprint.example"));
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(
            response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "https://footprint.example"
        );

        let mut request = get_request("/health");
        request
            .headers_mut()
            .insert(header::ORIGIN, HeaderValue::from_static("http://localhost:3000"));
        let response = app.oneshot(request).await.unwrap();
        assert!(response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .is_none());
    }

    #[test]
    fn test_bad_origin_is_rejected() {
        assert!(cors_layer(&["http://ok.example", "bad\norigin"]).is_err());
    }
}
