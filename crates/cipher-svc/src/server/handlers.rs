//! Axum request handlers for all service endpoints.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use common::protocol::{
    ErrorResponse, GatewayRequest, GatewayResponse, HealthResponse, OpenResponse, SealRequest,
};
use common::ServiceError;
use envelope::CipherError;
use tracing::{info, warn};

use super::state::AppState;

/// `POST /terminals/:terminal_id/seal` — encrypt a payload for the gateway.
///
/// The payload is serialised to JSON text, sealed into an envelope with a
/// fresh cipher for the terminal, and returned as the gateway request body
/// `{"mid", "req", "terminalId"}`.
pub async fn seal(
    State(state): State<AppState>,
    Path(terminal_id): Path<String>,
    Json(req): Json<SealRequest>,
) -> Response {
    let terminal = match state.registry.get(&terminal_id) {
        Ok(t) => t,
        Err(e) => return error_response(&ServiceError::NotFound(e.to_string())),
    };

    let cipher = terminal.cipher();
    let payload = req.payload;
    let envelope = match tokio::task::spawn_blocking(move || cipher.encrypt_json(&payload)).await
    {
        Ok(Ok(envelope)) => envelope,
        Ok(Err(e)) => {
            warn!(terminal_id = %terminal.id, error = %e, "seal failed");
            return cipher_error_response(&e);
        }
        Err(e) => {
            warn!(terminal_id = %terminal.id, error = %e, "seal task aborted");
            return error_response(&ServiceError::Internal("encryption failed".into()));
        }
    };

    info!(terminal_id = %terminal.id, envelope_len = envelope.len(), "payload sealed");
    let body = GatewayRequest {
        mid: terminal.mid.clone(),
        req: envelope,
        terminal_id: terminal.id.clone(),
    };
    (StatusCode::OK, Json(body)).into_response()
}

/// `POST /terminals/:terminal_id/open` — decrypt a gateway response.
///
/// Takes the gateway's `{"response": "<envelope>"}` body and returns the
/// decrypted JSON payload.
pub async fn open(
    State(state): State<AppState>,
    Path(terminal_id): Path<String>,
    Json(resp): Json<GatewayResponse>,
) -> Response {
    let terminal = match state.registry.get(&terminal_id) {
        Ok(t) => t,
        Err(e) => return error_response(&ServiceError::NotFound(e.to_string())),
    };

    let cipher = terminal.cipher();
    let envelope = resp.response;
    let opened = tokio::task::spawn_blocking(move || {
        cipher.decrypt_json::<serde_json::Value>(&envelope)
    })
    .await;

    let payload = match opened {
        Ok(Ok(payload)) => payload,
        Ok(Err(e)) => {
            warn!(terminal_id = %terminal.id, code = e.code(), "open failed");
            return cipher_error_response(&e);
        }
        Err(e) => {
            warn!(terminal_id = %terminal.id, error = %e, "open task aborted");
            return error_response(&ServiceError::Internal("decryption failed".into()));
        }
    };

    info!(terminal_id = %terminal.id, "gateway response opened");
    (StatusCode::OK, Json(OpenResponse { payload })).into_response()
}

/// `GET /health` — liveness and readiness check.
///
/// Returns `200 OK` when at least one terminal is configured.
/// Returns `503 Service Unavailable` otherwise.
pub async fn health(State(state): State<AppState>) -> Response {
    let (status_code, status_str) = if state.registry.is_empty() {
        (StatusCode::SERVICE_UNAVAILABLE, "degraded")
    } else {
        (StatusCode::OK, "ok")
    };

    let body = HealthResponse {
        status: status_str.into(),
        terminals_loaded: state.registry.len(),
    };
    (status_code, Json(body)).into_response()
}

/// Catch-all 404 handler.
pub async fn not_found() -> impl IntoResponse {
    let err = ErrorResponse::new("not_found", "the requested resource does not exist");
    (StatusCode::NOT_FOUND, Json(err))
}

// ---------------------------------------------------------------------------
// Error mapping
// ---------------------------------------------------------------------------

/// Map a cipher failure onto the service error taxonomy.
///
/// Key-derivation and AEAD-internal failures are reported as a generic
/// internal error; their detail stays in the logs.
fn service_error(err: &CipherError) -> ServiceError {
    match err {
        CipherError::MalformedEnvelope => ServiceError::BadRequest(err.to_string()),
        CipherError::AuthenticationFailure | CipherError::Encoding(_) => {
            ServiceError::Unprocessable(err.to_string())
        }
        CipherError::Configuration(_) | CipherError::EncryptionFailure => {
            ServiceError::Internal("cipher failure".into())
        }
    }
}

fn status_of(err: &ServiceError) -> StatusCode {
    StatusCode::from_u16(err.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

fn error_response(err: &ServiceError) -> Response {
    let body = ErrorResponse::new(err.code(), err.to_string());
    (status_of(err), Json(body)).into_response()
}

/// Like [`error_response`] but carries the cipher's own error code.
fn cipher_error_response(err: &CipherError) -> Response {
    let mapped = service_error(err);
    let body = ErrorResponse::new(err.code(), mapped.to_string());
    (status_of(&mapped), Json(body)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::router;
    use crate::terminals::{Terminal, TerminalRegistry};
    use axum::{body::Body, http::Request, Router};
    use base64::{engine::general_purpose::STANDARD, Engine as _};
    use envelope::SharedSecret;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn test_state() -> AppState {
        let registry = TerminalRegistry::new();
        registry.replace_all(vec![Terminal::new(
            "T-0001",
            "108",
            SharedSecret::new("hlnuyA9b4YxDq6oJSZFl8g==", "hlnuyA9b4YxDq6oJSZFl8g==").unwrap(),
        )]);
        AppState::new(registry)
    }

    fn test_router() -> Router {
        router::build(test_state())
    }

    async fn post_json(app: Router, uri: &str, body: Value) -> (StatusCode, Value) {
        let req = Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn seal_returns_gateway_request() {
        let (status, body) = post_json(
            test_router(),
            "/terminals/T-0001/seal",
            json!({"payload": {"mid": "108", "amount": "100.00"}}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["mid"], "108");
        assert_eq!(body["terminalId"], "T-0001");

        let envelope = body["req"].as_str().unwrap();
        let terminal = test_state().registry.get("T-0001").unwrap();
        let plaintext: Value = terminal.cipher().decrypt_json(envelope).unwrap();
        assert_eq!(plaintext, json!({"mid": "108", "amount": "100.00"}));
    }

    #[tokio::test]
    async fn open_returns_payload() {
        let terminal = test_state().registry.get("T-0001").unwrap();
        let envelope = terminal
            .cipher()
            .encrypt(r#"{"redirectUrl":"https://gateway.example/pay/42"}"#)
            .unwrap();

        let (status, body) = post_json(
            test_router(),
            "/terminals/T-0001/open",
            json!({"response": envelope}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["payload"]["redirectUrl"], "https://gateway.example/pay/42");
    }

    #[tokio::test]
    async fn seal_then_open_round_trip() {
        let (_, sealed) = post_json(
            test_router(),
            "/terminals/T-0001/seal",
            json!({"payload": {"orderId": "A-17"}}),
        )
        .await;
        let (status, opened) = post_json(
            test_router(),
            "/terminals/T-0001/open",
            json!({"response": sealed["req"]}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(opened["payload"], json!({"orderId": "A-17"}));
    }

    #[tokio::test]
    async fn unknown_terminal_returns_404() {
        let (status, body) = post_json(
            test_router(),
            "/terminals/T-9999/seal",
            json!({"payload": {}}),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "not_found");
    }

    #[tokio::test]
    async fn short_envelope_returns_400() {
        let (status, body) = post_json(
            test_router(),
            "/terminals/T-0001/open",
            json!({"response": STANDARD.encode([0u8; 10])}),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "malformed_envelope");
    }

    #[tokio::test]
    async fn tampered_envelope_returns_422() {
        let terminal = test_state().registry.get("T-0001").unwrap();
        let mut raw = STANDARD
            .decode(terminal.cipher().encrypt("{}").unwrap())
            .unwrap();
        let last = raw.len() - 1;
        raw[last] ^= 0x80;

        let (status, body) = post_json(
            test_router(),
            "/terminals/T-0001/open",
            json!({"response": STANDARD.encode(&raw)}),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["code"], "authentication_failure");
    }

    #[tokio::test]
    async fn non_json_plaintext_returns_422() {
        let terminal = test_state().registry.get("T-0001").unwrap();
        let envelope = terminal.cipher().encrypt("plain text").unwrap();
        let (status, body) = post_json(
            test_router(),
            "/terminals/T-0001/open",
            json!({"response": envelope}),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["code"], "encoding_error");
    }

    #[tokio::test]
    async fn health_ok_with_terminals() {
        let req = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();
        let resp = test_router().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[test]
    fn internal_failures_are_generic() {
        let mapped = service_error(&CipherError::Configuration("PBKDF2 detail".into()));
        assert_eq!(mapped.http_status(), 500);
        assert!(!mapped.to_string().contains("PBKDF2"));
    }
}
