// 🌐 Upstream Client - forwards uploads to the analysis service
// The service parses the spreadsheet and answers with the report JSON.

use crate::error::{Error, Result};
use crate::report::ReportKind;
use reqwest::multipart::{Form, Part};
use tracing::{info, warn};

#[derive(Clone)]
pub struct UpstreamClient {
    http: reqwest::Client,
    base_url: String,
}

impl UpstreamClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        UpstreamClient {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    pub fn url_for(&self, kind: ReportKind) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), kind.endpoint())
    }

    /// POST the file as multipart field `file` and return the body text.
    ///
    /// No retries and no timeout: a hung service keeps the request open.
    pub async fn analyze(&self, kind: ReportKind, filename: &str, bytes: Vec<u8>) -> Result<String> {
        let url = self.url_for(kind);
        info!(%url, file = filename, size = bytes.len(), "forwarding upload");

        let part = Part::bytes(bytes).file_name(filename.to_string());
        let form = Form::new().part("file", part);

        let response = self
            .http
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| Error::Upstream(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| Error::Upstream(e.to_string()))?;

        if !status.is_success() {
            warn!(%status, "analysis service rejected upload");
            return Err(Error::Upstream(upstream_message(&body)));
        }

        Ok(body)
    }
}

/// Error text to show the user for a failed analysis
fn upstream_message(body: &str) -> String {
    let body = body.trim();
    if body.is_empty() {
        "Failed to analyze file".to_string()
    } else {
        body.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_for_kind() {
        let client = UpstreamClient::new("http://svc:8080/");
        assert_eq!(client.url_for(ReportKind::TransactionDetail), "http://svc:8080/api/analyze");
        assert_eq!(client.url_for(ReportKind::HcAnalysis), "http://svc:8080/api/quarterly");
    }

    async fn spawn_upstream(upstream: axum::Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, upstream).await.unwrap();
        });
        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn test_analyze_returns_body_and_maps_failures() {
        use axum::{body::Bytes, http::StatusCode, routing::post};

        let upstream = axum::Router::new()
            .route("/api/analyze", post(|body: Bytes| async move { body }))
            .route(
                "/api/quarterly",
                post(|_: Bytes| async { (StatusCode::BAD_REQUEST, "  Sheet not found\n") }),
            );
        let client = UpstreamClient::new(spawn_upstream(upstream).await);

        let body = client
            .analyze(ReportKind::TransactionDetail, "export.csv", b"a,b".to_vec())
            .await
            .unwrap();
        assert!(body.contains("name=\"file\""));
        assert!(body.contains("filename=\"export.csv\""));

        let err = client
            .analyze(ReportKind::Quarterly, "q1.xlsx", Vec::new())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Upstream(message) if message == "Sheet not found"));
    }

    #[test]
    fn test_upstream_message() {
        assert_eq!(upstream_message("  \n"), "Failed to analyze file");
        assert_eq!(
            upstream_message("Failed to parse CSV: bad header\n"),
            "Failed to parse CSV: bad header"
        );
    }
}
