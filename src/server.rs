// 🌐 Web Server - upload page, report API and CSV download
// REST API with Axum; one report session shared behind a mutex

use crate::aggregate::HcAnalysis;
use crate::config::ServerConfig;
use crate::error::Error;
use crate::model::QuarterlyReport;
use crate::render::render_report;
use crate::report::{Report, ReportKind};
use crate::session::{ReportSession, SelectedFile};
use crate::upstream::UpstreamClient;
use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, Multipart, Path, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard};
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};
use uuid::Uuid;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    session: Arc<Mutex<ReportSession>>,
    upstream: UpstreamClient,
}

impl AppState {
    pub fn new(upstream: UpstreamClient) -> Self {
        AppState {
            session: Arc::new(Mutex::new(ReportSession::default())),
            upstream,
        }
    }

    /// Lock the session. A panic in another handler does not leave the
    /// session unusable; its last written state is kept.
    pub fn session(&self) -> MutexGuard<'_, ReportSession> {
        self.session
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

// ============================================================================
// Responses
// ============================================================================

/// API Response wrapper
#[derive(Serialize)]
struct ApiResponse<T> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<T> ApiResponse<T> {
    fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }
}

/// Library error carried out of a handler
struct ApiError(Error);

impl From<Error> for ApiError {
    fn from(e: Error) -> Self {
        ApiError(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            Error::NoReport => StatusCode::NOT_FOUND,
            Error::Upstream(_) => StatusCode::BAD_GATEWAY,
            e if e.is_client_error() => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            error!("request failed: {}", self.0);
        } else {
            warn!("request rejected: {}", self.0);
        }

        let body = ApiResponse::<()> {
            success: false,
            data: None,
            error: Some(self.0.to_string()),
        };
        (status, Json(body)).into_response()
    }
}

/// Upload response: the decoded report plus its rendered fragment
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct UploadResponse<'a> {
    cycle_id: Uuid,
    kind: ReportKind,
    report: &'a Report,
    html: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    source_file: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    size_label: Option<String>,
}

impl<'a> UploadResponse<'a> {
    fn from_session(session: &'a ReportSession) -> Result<Self, Error> {
        let current = session.current().ok_or(Error::NoReport)?;
        let source_file = current.source_file.as_deref();
        let selected = session
            .selected()
            .filter(|file| source_file == Some(file.name.as_str()));

        Ok(UploadResponse {
            cycle_id: current.cycle_id,
            kind: current.report.kind(),
            report: &current.report,
            html: render_report(&current.report),
            source_file,
            size_label: selected.map(SelectedFile::size_label),
        })
    }
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/health - Health check
async fn health_check() -> impl IntoResponse {
    Json(ApiResponse::ok("OK"))
}

/// POST /api/upload/:kind - Forward a file to the analysis service and
/// make the result the current report
///
/// The session is only touched once the analysis has decoded.
async fn upload(
    State(state): State<AppState>,
    Path(kind): Path<String>,
    mut multipart: Multipart,
) -> Result<Response, ApiError> {
    let kind: ReportKind = kind.parse()?;

    let mut file: Option<(String, Vec<u8>)> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| Error::UnsupportedFile(format!("Failed to read form field: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let name = field.file_name().unwrap_or("").to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| Error::UnsupportedFile(format!("Failed to read file data: {}", e)))?;
        file = Some((name, bytes.to_vec()));
    }

    let (filename, bytes) =
        file.ok_or_else(|| Error::UnsupportedFile("No file in upload".to_string()))?;
    kind.check_file(&filename)?;
    let size = bytes.len() as u64;

    let body = state.upstream.analyze(kind, &filename, bytes).await?;
    let report = Report::decode(kind, &body)
        .map_err(|e| Error::Upstream(format!("Unexpected response from analysis service: {}", e)))?;

    let mut session = state.session();
    session.set_kind(kind);
    session.select_file(&filename, size)?;
    let cycle_id = session.install(report).cycle_id;
    info!(%cycle_id, file = %filename, "upload processed");

    let response = UploadResponse::from_session(&session)?;
    Ok(Json(ApiResponse::ok(response)).into_response())
}

/// POST /api/hc-analysis - Headcount split of a quarterly report body
async fn hc_analysis(body: Bytes) -> Result<Response, ApiError> {
    let report: QuarterlyReport = serde_json::from_slice(&body).map_err(Error::from)?;
    Ok(Json(ApiResponse::ok(HcAnalysis::from_report(&report))).into_response())
}

/// GET /api/report - The report currently on screen
async fn get_report(State(state): State<AppState>) -> Result<Response, ApiError> {
    let session = state.session();
    let response = UploadResponse::from_session(&session)?;
    Ok(Json(ApiResponse::ok(response)).into_response())
}

/// GET /api/export - Current report as a CSV download
async fn export_csv(State(state): State<AppState>) -> Result<Response, ApiError> {
    let today = chrono::Local::now().date_naive();
    let (filename, csv) = state.session().export(today)?;

    let disposition = format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        filename,
        urlencoding::encode(&filename)
    );

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        csv,
    )
        .into_response())
}

/// POST /api/reset - Clear the selected file and the current report
async fn reset(State(state): State<AppState>) -> impl IntoResponse {
    state.session().reset();
    Json(ApiResponse::ok("reset"))
}

/// GET / - Serve index.html
async fn serve_index() -> impl IntoResponse {
    Html(include_str!("../web/index.html"))
}

// ============================================================================
// Router
// ============================================================================

pub fn create_router(state: AppState, config: &ServerConfig) -> Router {
    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/upload/:kind", post(upload))
        .route("/hc-analysis", post(hc_analysis))
        .route("/report", get(get_report))
        .route("/export", get(export_csv))
        .route("/reset", post(reset))
        .with_state(state);

    Router::new()
        .route("/", get(serve_index))
        .nest("/api", api_routes)
        .nest_service("/static", ServeDir::new(&config.static_dir))
        .layer(DefaultBodyLimit::max(config.max_upload_bytes()))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::DepartmentData;
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    const QUARTERLY_BODY: &str = r#"{
        "companyName": "Acme Inc",
        "period": "Q1 2025",
        "departments": { "Sales": { "lineItems": { "61000 - Salaries": 100 } } }
    }"#;

    fn setup_test_app() -> (AppState, Router) {
        // Nothing listens here; tests never reach the upstream call
        setup_app_with_upstream("http://127.0.0.1:9")
    }

    fn setup_app_with_upstream(url: &str) -> (AppState, Router) {
        let state = AppState::new(UpstreamClient::new(url));
        let router = create_router(state.clone(), &ServerConfig::default());
        (state, router)
    }

    /// Serve `upstream` on an ephemeral port and return its base URL
    async fn spawn_upstream(upstream: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, upstream).await.unwrap();
        });
        format!("http://{}", addr)
    }

    async fn get_body_text(response: Response) -> String {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    async fn get_body_json(response: Response) -> serde_json::Value {
        serde_json::from_str(&get_body_text(response).await).unwrap()
    }

    fn multipart_upload(uri: &str, filename: &str) -> Request<Body> {
        let body = format!(
            "--XBOUNDARY\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{}\"\r\nContent-Type: application/octet-stream\r\n\r\na,b\r\n--XBOUNDARY--\r\n",
            filename
        );
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "multipart/form-data; boundary=XBOUNDARY")
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let (_, app) = setup_test_app();

        let response = app
            .oneshot(Request::builder().uri("/api/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = get_body_json(response).await;
        assert_eq!(json["success"], true);
        assert_eq!(json["data"], "OK");
    }

    #[tokio::test]
    async fn test_hc_analysis_endpoint() {
        let (_, app) = setup_test_app();
        let body = r#"{
            "companyName": "Acme Inc",
            "departments": {
                "Sales": { "lineItems": { "61000 - Salaries": 100, "62500 - Travel": 50, "Total - 60000 - Operating": 150 } },
                "sales": { "lineItems": { "61000 - Salaries": 10 } }
            }
        }"#;

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/hc-analysis")
                    .header("content-type", "application/json")
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = get_body_json(response).await;
        let sales = &json["data"]["departments"]["Sales"];
        assert_eq!(sales["hc"], 110.0);
        assert_eq!(sales["total"], 150.0);
        assert_eq!(sales["nonHc"], 40.0);
        assert_eq!(json["data"]["totals"]["totalAll"], 150.0);
    }

    #[tokio::test]
    async fn test_hc_analysis_rejects_malformed_body() {
        let (_, app) = setup_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/hc-analysis")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"departments":"oops"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let content_type = response.headers()[header::CONTENT_TYPE].to_str().unwrap();
        assert!(content_type.starts_with("application/json"));
        let json = get_body_json(response).await;
        assert_eq!(json["success"], false);
        assert!(json["error"].as_str().unwrap().starts_with("Invalid report JSON"));
    }

    #[tokio::test]
    async fn test_upload_installs_analyzed_report() {
        let upstream = Router::new().route(
            "/api/quarterly",
            post(|_: Bytes| async { (StatusCode::OK, QUARTERLY_BODY) }),
        );
        let url = spawn_upstream(upstream).await;
        let (state, app) = setup_app_with_upstream(&url);

        let response = app
            .oneshot(multipart_upload("/api/upload/quarterly", "q1.xlsx"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = get_body_json(response).await;
        let data = &json["data"];
        assert!(data["cycleId"].is_string());
        assert_eq!(data["kind"], "quarterly");
        assert_eq!(data["report"]["kind"], "quarterly");
        assert_eq!(data["report"]["data"]["companyName"], "Acme Inc");
        assert!(data["html"].as_str().unwrap().contains("Acme Inc"));
        assert_eq!(data["sourceFile"], "q1.xlsx");
        assert_eq!(data["sizeLabel"], "Size: 3 B");

        let session = state.session();
        assert_eq!(session.kind(), ReportKind::Quarterly);
        assert_eq!(session.selected().unwrap().name, "q1.xlsx");
        assert_eq!(
            session.current().unwrap().cycle_id.to_string(),
            data["cycleId"].as_str().unwrap()
        );
    }

    #[tokio::test]
    async fn test_upload_upstream_failure_is_bad_gateway() {
        let upstream = Router::new()
            .route(
                "/api/quarterly",
                post(|_: Bytes| async {
                    (StatusCode::INTERNAL_SERVER_ERROR, "Failed to parse CSV: bad header\n")
                }),
            )
            .route(
                "/api/analyze",
                post(|_: Bytes| async { StatusCode::INTERNAL_SERVER_ERROR }),
            );
        let url = spawn_upstream(upstream).await;
        let (_, app) = setup_app_with_upstream(&url);

        let response = app
            .clone()
            .oneshot(multipart_upload("/api/upload/quarterly", "q1.xlsx"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let json = get_body_json(response).await;
        assert_eq!(json["success"], false);
        assert_eq!(
            json["error"],
            "Upstream analysis failed: Failed to parse CSV: bad header"
        );

        let response = app
            .oneshot(multipart_upload("/api/upload/transaction-detail", "export.csv"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let json = get_body_json(response).await;
        assert_eq!(json["error"], "Upstream analysis failed: Failed to analyze file");
    }

    #[tokio::test]
    async fn test_upload_undecodable_analysis_is_bad_gateway() {
        let upstream = Router::new().route(
            "/api/quarterly",
            post(|_: Bytes| async { (StatusCode::OK, "<html>maintenance</html>") }),
        );
        let url = spawn_upstream(upstream).await;
        let (state, app) = setup_app_with_upstream(&url);

        let response = app
            .oneshot(multipart_upload("/api/upload/hc-analysis", "q1.xlsx"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let json = get_body_json(response).await;
        assert!(json["error"]
            .as_str()
            .unwrap()
            .contains("Unexpected response from analysis service"));
        assert!(state.session().current().is_none());
    }

    #[tokio::test]
    async fn test_failed_upload_keeps_previous_session() {
        let upstream = Router::new().route(
            "/api/quarterly",
            post(|_: Bytes| async { StatusCode::INTERNAL_SERVER_ERROR }),
        );
        let url = spawn_upstream(upstream).await;
        let (state, app) = setup_app_with_upstream(&url);
        state
            .session()
            .install(Report::TransactionDetail(Default::default()));

        let response = app
            .oneshot(multipart_upload("/api/upload/hc-analysis", "q1.xlsx"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

        let session = state.session();
        assert_eq!(session.kind(), ReportKind::TransactionDetail);
        assert!(session.selected().is_none());
        assert_eq!(
            session.current().unwrap().report.kind(),
            ReportKind::TransactionDetail
        );
    }

    #[tokio::test]
    async fn test_report_and_export_404_without_report() {
        let (_, app) = setup_test_app();

        let response = app
            .clone()
            .oneshot(Request::builder().uri("/api/report").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let json = get_body_json(response).await;
        assert_eq!(json["success"], false);
        assert_eq!(json["error"], "No report loaded");

        let response = app
            .oneshot(Request::builder().uri("/api/export").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_export_current_report() {
        let (state, app) = setup_test_app();
        let quarterly = QuarterlyReport {
            company_name: "O'Brien, Inc.".into(),
            departments: vec![DepartmentData::new(
                "Sales",
                [("61000 - Salaries", 100.0)].into_iter().collect(),
            )],
            ..Default::default()
        };
        state
            .session()
            .install(Report::HcAnalysis(HcAnalysis::from_report(&quarterly)));

        let response = app
            .oneshot(Request::builder().uri("/api/export").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let content_type = response.headers()[header::CONTENT_TYPE].to_str().unwrap();
        assert!(content_type.starts_with("text/csv"));
        let disposition = response.headers()[header::CONTENT_DISPOSITION]
            .to_str()
            .unwrap()
            .to_string();
        assert!(disposition.contains("hc-analysis-"));

        let csv = get_body_text(response).await;
        assert!(csv.starts_with("Headcount Analysis\nCompany,\"O'Brien, Inc.\""));
        assert!(csv.ends_with("TOTAL,$100.00,$0.00,$100.00,100.0%"));
    }

    #[tokio::test]
    async fn test_get_report_includes_html() {
        let (state, app) = setup_test_app();
        state
            .session()
            .install(Report::Quarterly(QuarterlyReport::default()));

        let response = app
            .oneshot(Request::builder().uri("/api/report").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = get_body_json(response).await;
        assert_eq!(json["data"]["kind"], "quarterly");
        assert!(json["data"]["html"].as_str().unwrap().contains("Quarterly Income Statement"));
        assert!(json["data"]["cycleId"].is_string());
    }

    #[tokio::test]
    async fn test_upload_rejects_unknown_kind() {
        let (_, app) = setup_test_app();

        let response = app
            .oneshot(multipart_upload("/api/upload/balance-sheet", "q1.xlsx"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = get_body_json(response).await;
        assert_eq!(json["error"], "Unknown report kind: balance-sheet");
    }

    #[tokio::test]
    async fn test_upload_rejects_wrong_extension() {
        let (state, app) = setup_test_app();

        let response = app
            .oneshot(multipart_upload("/api/upload/quarterly", "q1.csv"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = get_body_json(response).await;
        assert!(json["error"].as_str().unwrap().contains(".xlsx"));
        assert!(state.session().current().is_none());
    }

    #[tokio::test]
    async fn test_reset_clears_report() {
        let (state, app) = setup_test_app();
        state
            .session()
            .install(Report::Quarterly(QuarterlyReport::default()));

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/reset")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(state.session().current().is_none());
    }
}
