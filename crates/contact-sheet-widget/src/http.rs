//! HTTP selection persistence
//!
//! Posts `{ node_id, selection }` as JSON to the backend route and reads back
//! `{ selection }`. Any non-success status is reported as
//! [`PersistError::Status`].

use async_trait::async_trait;
use contact_sheet_core::{
    PersistError, SelectionBackend, SelectionUpdateRequest, SelectionUpdateResponse, SheetConfig,
};
use reqwest::Client;
use std::time::Duration;

/// Default request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// [`SelectionBackend`] talking to the host's HTTP server
#[derive(Debug, Clone)]
pub struct HttpSelectionBackend {
    client: Client,
    url: String,
}

impl HttpSelectionBackend {
    /// Create a backend posting to `base_url` + the configured endpoint
    ///
    /// # Errors
    /// `PersistError::Transport` when the HTTP client cannot be built
    pub fn new(base_url: &str, config: &SheetConfig) -> Result<Self, PersistError> {
        Self::with_timeout(base_url, config, DEFAULT_TIMEOUT)
    }

    /// Same as [`new`](Self::new) with an explicit request timeout
    ///
    /// # Errors
    /// `PersistError::Transport` when the HTTP client cannot be built
    pub fn with_timeout(
        base_url: &str,
        config: &SheetConfig,
        timeout: Duration,
    ) -> Result<Self, PersistError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(2))
            .timeout(timeout)
            .build()
            .map_err(|e| PersistError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            url: join_url(base_url, &config.endpoint),
        })
    }

    /// Full URL requests are posted to
    #[inline]
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl SelectionBackend for HttpSelectionBackend {
    async fn update_selection(
        &self,
        request: SelectionUpdateRequest,
    ) -> Result<SelectionUpdateResponse, PersistError> {
        tracing::debug!(
            url = %self.url,
            node_id = %request.node_id,
            selection = ?request.selection,
            "posting selection"
        );

        let response = self
            .client
            .post(&self.url)
            .json(&request)
            .send()
            .await
            .map_err(|e| PersistError::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| PersistError::Transport(e.to_string()))?;

        parse_response(status, &body)
    }
}

/// Interpret a status code and body from the selection route
///
/// # Errors
/// `PersistError::Status` for non-2xx codes, `PersistError::Decode` for a
/// body that is not a selection response
pub fn parse_response(status: u16, body: &str) -> Result<SelectionUpdateResponse, PersistError> {
    if !(200..300).contains(&status) {
        return Err(PersistError::Status {
            status,
            body: body.to_string(),
        });
    }
    if body.trim().is_empty() {
        return Ok(SelectionUpdateResponse::default());
    }
    serde_json::from_str(body).map_err(|e| PersistError::Decode(e.to_string()))
}

fn join_url(base: &str, endpoint: &str) -> String {
    let base = base.trim_end_matches('/');
    if endpoint.starts_with('/') {
        format!("{base}{endpoint}")
    } else {
        format!("{base}/{endpoint}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joins_base_and_endpoint() {
        assert_eq!(
            join_url("http://127.0.0.1:8188/", "/contact-sheet-selector/selection"),
            "http://127.0.0.1:8188/contact-sheet-selector/selection"
        );
        assert_eq!(join_url("http://h", "api/sel"), "http://h/api/sel");
    }

    #[test]
    fn backend_url_uses_configured_endpoint() {
        let backend =
            HttpSelectionBackend::new("http://localhost:8188", &SheetConfig::new()).unwrap();
        assert_eq!(backend.url(), "http://localhost:8188/contact-sheet-selector/selection");
    }

    #[test]
    fn parses_sanitized_selection() {
        let response = parse_response(200, r#"{"selection":[1,2]}"#).unwrap();
        assert_eq!(response.selection, Some(vec![1, 2]));
    }

    #[test]
    fn missing_selection_field_is_none() {
        assert_eq!(parse_response(200, "{}").unwrap().selection, None);
        assert_eq!(parse_response(204, "").unwrap().selection, None);
    }

    #[test]
    fn error_status_is_reported() {
        let err = parse_response(400, r#"{"error":"missing_node_id"}"#).unwrap_err();
        assert!(matches!(err, PersistError::Status { status: 400, .. }));
        assert!(!err.is_retryable());
        assert!(parse_response(503, "").unwrap_err().is_retryable());
    }

    #[test]
    fn garbage_body_is_a_decode_error() {
        assert!(matches!(
            parse_response(200, "not json").unwrap_err(),
            PersistError::Decode(_)
        ));
    }
}
