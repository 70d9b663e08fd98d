//! Axum request handlers for all service endpoints.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use common::protocol::{
    DecryptRequest, DecryptResponse, EncryptRequest, EncryptResponse, ErrorResponse,
    HealthResponse,
};
use common::ServiceError;
use engine::request::parse_mode;
use engine::{Algorithm, BlockMode, CipherError, CipherRequest, CipherResult, EncryptionContext};
use tracing::{info, warn};

use super::state::AppState;

/// `POST /encrypt`: encrypt `text` with the requested algorithm.
///
/// RSA requests without a public key generate a key pair, which is CPU-bound
/// and runs on the blocking pool.
pub async fn encrypt(
    State(state): State<AppState>,
    body: Result<Json<EncryptRequest>, JsonRejection>,
) -> Response {
    let Json(req) = match body {
        Ok(b) => b,
        Err(rejection) => return rejected(rejection),
    };
    let request = match CipherRequest::parse(
        &req.algorithm,
        req.mode.as_deref(),
        req.text,
        req.key.unwrap_or_default(),
    ) {
        Ok(r) => r,
        Err(e) => return cipher_failure("encrypt", e),
    };
    let algorithm = request.algorithm;

    let result = if request.needs_key_generation() {
        let engine = state.engine;
        info!(bits = engine.rsa_key_bits(), "generating RSA key pair");
        match tokio::task::spawn_blocking(move || engine.encrypt(&request)).await {
            Ok(r) => r,
            Err(e) => {
                warn!(error = %e, "key generation task failed");
                return service_failure(ServiceError::Internal("encryption failed".into()));
            }
        }
    } else {
        state.engine.encrypt(&request)
    };

    match result {
        Ok(res) => (StatusCode::OK, Json(encrypt_response(algorithm, res))).into_response(),
        Err(e) => cipher_failure("encrypt", e),
    }
}

/// `POST /decrypt`: decrypt `text` using the context from the encrypt call.
pub async fn decrypt(
    State(state): State<AppState>,
    body: Result<Json<DecryptRequest>, JsonRejection>,
) -> Response {
    let Json(req) = match body {
        Ok(b) => b,
        Err(rejection) => return rejected(rejection),
    };
    let request = match CipherRequest::parse(
        &req.algorithm,
        req.mode.as_deref(),
        req.text,
        req.key,
    ) {
        Ok(r) => r,
        Err(e) => return cipher_failure("decrypt", e),
    };
    let recorded = match recorded_mode(
        request.algorithm,
        req.mode.as_deref(),
        req.encryption_mode.as_deref(),
    ) {
        Ok(m) => m,
        Err(e) => return cipher_failure("decrypt", e),
    };
    let context = EncryptionContext::new(recorded, req.iv.filter(|iv| !iv.is_empty()));

    match state.engine.decrypt(&request, &context) {
        Ok(decrypted) => (StatusCode::OK, Json(DecryptResponse { decrypted })).into_response(),
        Err(e) => cipher_failure("decrypt", e),
    }
}

/// `GET /health`: liveness check.
pub async fn health() -> Response {
    let body = HealthResponse {
        status: "ok".into(),
        version: env!("CARGO_PKG_VERSION").into(),
    };
    (StatusCode::OK, Json(body)).into_response()
}

/// Catch-all 404 handler.
pub async fn not_found() -> impl IntoResponse {
    let err = ErrorResponse::new("not_found", "the requested resource does not exist");
    (StatusCode::NOT_FOUND, Json(err))
}

/// Mode the caller recorded at encryption time.
///
/// A missing `encryptionMode` pairs only with a missing `mode` (both mean ECB);
/// any declared mode without a recorded one is a mismatch.
fn recorded_mode(
    algorithm: Algorithm,
    declared: Option<&str>,
    recorded: Option<&str>,
) -> Result<Option<BlockMode>, CipherError> {
    let blank = |m: Option<&str>| m.map_or(true, |m| m.trim().is_empty());
    if blank(recorded) && !blank(declared) {
        return Ok(None);
    }
    parse_mode(algorithm, recorded)
}

fn encrypt_response(algorithm: Algorithm, res: CipherResult) -> EncryptResponse {
    let (public_key, private_key) = match res.generated_key_pair {
        Some(pair) => (Some(pair.public_key_pem), Some(pair.private_key_pem)),
        None => (None, None),
    };
    EncryptResponse {
        encrypted: res.ciphertext,
        iv: algorithm.is_block().then_some(res.iv),
        key: res.generated_key,
        public_key,
        private_key,
    }
}

fn cipher_failure(operation: &'static str, e: CipherError) -> Response {
    let err = if e.is_client_error() {
        info!(operation, code = e.code(), "request rejected");
        ServiceError::bad_request(e.code(), e.to_string())
    } else {
        warn!(operation, code = e.code(), error = %e, "operation failed");
        ServiceError::Internal(e.to_string())
    };
    service_failure(err)
}

fn service_failure(err: ServiceError) -> Response {
    let status =
        StatusCode::from_u16(err.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(err.to_response())).into_response()
}

fn rejected(rejection: JsonRejection) -> Response {
    let err = ErrorResponse::new("bad_request", rejection.body_text());
    (rejection.status(), Json(err)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::routing::{get, post};
    use axum::{body::Body, http::Request, Router};
    use axum_test::TestServer;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn test_router() -> Router {
        Router::new()
            .route("/encrypt", post(encrypt))
            .route("/decrypt", post(decrypt))
            .route("/health", get(health))
            .with_state(AppState::default())
    }

    fn test_server() -> TestServer {
        TestServer::new(test_router()).unwrap()
    }

    #[tokio::test]
    async fn health_returns_ok() {
        let app = test_router();
        let req = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn aes_ecb_returns_null_iv_and_round_trips() {
        let server = test_server();
        let resp = server
            .post("/encrypt")
            .json(&json!({"text": "hello world", "key": "abc", "algorithm": "AES", "mode": "ecb"}))
            .await;
        resp.assert_status_ok();
        let body: Value = resp.json();
        assert_eq!(body["encrypted"], "AlcyxMFZynSFzgCeb06m7w==");
        assert!(body["iv"].is_null());
        assert!(body.as_object().unwrap().contains_key("iv"));

        let resp = server
            .post("/decrypt")
            .json(&json!({
                "text": body["encrypted"], "key": "abc", "algorithm": "AES",
                "mode": "ecb", "iv": null, "encryptionMode": "ecb"
            }))
            .await;
        resp.assert_status_ok();
        assert_eq!(resp.json::<DecryptResponse>().decrypted, "hello world");
    }

    #[tokio::test]
    async fn triple_des_cbc_round_trip() {
        let server = test_server();
        let enc: EncryptResponse = server
            .post("/encrypt")
            .json(&json!({"text": "attack at dawn", "key": "secret", "algorithm": "3DES", "mode": "cbc"}))
            .await
            .json();
        let iv = enc.iv.clone().flatten().expect("cbc carries an iv");

        let resp = server
            .post("/decrypt")
            .json(&json!({
                "text": enc.encrypted, "key": "secret", "algorithm": "3DES",
                "mode": "cbc", "iv": iv, "encryptionMode": "cbc"
            }))
            .await;
        resp.assert_status_ok();
        assert_eq!(resp.json::<DecryptResponse>().decrypted, "attack at dawn");
    }

    #[tokio::test]
    async fn mode_mismatch_is_rejected() {
        let server = test_server();
        let resp = server
            .post("/decrypt")
            .json(&json!({
                "text": "AlcyxMFZynSFzgCeb06m7w==", "key": "abc", "algorithm": "AES",
                "mode": "ecb", "encryptionMode": "cbc"
            }))
            .await;
        resp.assert_status(StatusCode::BAD_REQUEST);
        let err: ErrorResponse = resp.json();
        assert_eq!(err.code, "mode_mismatch");
        assert_eq!(err.error, "Decryption mode must match the encryption mode.");
    }

    #[tokio::test]
    async fn declared_mode_without_recorded_mode_is_rejected() {
        let server = test_server();
        let resp = server
            .post("/decrypt")
            .json(&json!({
                "text": "AlcyxMFZynSFzgCeb06m7w==", "key": "abc", "algorithm": "AES", "mode": "ecb"
            }))
            .await;
        resp.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(resp.json::<ErrorResponse>().code, "mode_mismatch");
    }

    #[tokio::test]
    async fn otp_returns_key_and_omits_iv() {
        let server = test_server();
        let resp = server
            .post("/encrypt")
            .json(&json!({"text": "HELLO", "algorithm": "OTP"}))
            .await;
        resp.assert_status_ok();
        let body: Value = resp.json();
        assert!(body.get("iv").is_none());
        let key = body["key"].as_str().unwrap().to_owned();
        assert_eq!(key.len(), 5);

        let resp = server
            .post("/decrypt")
            .json(&json!({"text": body["encrypted"], "key": key, "algorithm": "OTP"}))
            .await;
        resp.assert_status_ok();
        assert_eq!(resp.json::<DecryptResponse>().decrypted, "HELLO");
    }

    #[tokio::test]
    async fn otp_key_length_mismatch_is_rejected() {
        let server = test_server();
        let resp = server
            .post("/decrypt")
            .json(&json!({"text": "KSs=", "key": "abc", "algorithm": "OTP"}))
            .await;
        resp.assert_status(StatusCode::BAD_REQUEST);
        let err: ErrorResponse = resp.json();
        assert_eq!(err.error, "Key length must be equal to text length for OTP.");
    }

    #[tokio::test]
    async fn unsupported_algorithm_is_rejected() {
        let server = test_server();
        let resp = server
            .post("/encrypt")
            .json(&json!({"text": "hi", "key": "k", "algorithm": "ROT13"}))
            .await;
        resp.assert_status(StatusCode::BAD_REQUEST);
        let err: ErrorResponse = resp.json();
        assert_eq!(err.code, "unsupported_algorithm");
        assert_eq!(err.error, "Unsupported algorithm: ROT13");
    }

    #[tokio::test]
    async fn rsa_generates_pair_and_round_trips() {
        let server = test_server();
        let enc: EncryptResponse = server
            .post("/encrypt")
            .json(&json!({"text": "asymmetric", "algorithm": "RSA"}))
            .await
            .json();
        assert!(enc.iv.is_none());
        let public_key = enc.public_key.expect("generated public key");
        let private_key = enc.private_key.expect("generated private key");
        assert!(public_key.starts_with("-----BEGIN PUBLIC KEY-----"));

        let resp = server
            .post("/decrypt")
            .json(&json!({"text": enc.encrypted, "key": private_key, "algorithm": "RSA"}))
            .await;
        resp.assert_status_ok();
        assert_eq!(resp.json::<DecryptResponse>().decrypted, "asymmetric");
    }

    #[tokio::test]
    async fn invalid_public_key_names_expected_format() {
        let server = test_server();
        let resp = server
            .post("/encrypt")
            .json(&json!({"text": "hi", "key": "not a key", "algorithm": "RSA"}))
            .await;
        resp.assert_status(StatusCode::BAD_REQUEST);
        let err: ErrorResponse = resp.json();
        assert_eq!(err.code, "invalid_key_format");
        assert!(err.error.contains("-----BEGIN PUBLIC KEY-----"));
    }

    #[tokio::test]
    async fn malformed_json_gets_error_body() {
        let server = test_server();
        let resp = server
            .post("/encrypt")
            .content_type("application/json")
            .bytes("{not json".into())
            .await;
        assert!(resp.status_code().is_client_error());
        assert_eq!(resp.json::<ErrorResponse>().code, "bad_request");
    }

    #[test]
    fn absent_modes_pair_as_ecb() {
        assert_eq!(recorded_mode(Algorithm::Aes, None, None), Ok(Some(BlockMode::Ecb)));
        assert_eq!(recorded_mode(Algorithm::Aes, Some("cbc"), None), Ok(None));
        assert_eq!(recorded_mode(Algorithm::Otp, Some("cbc"), Some("cbc")), Ok(None));
        assert!(recorded_mode(Algorithm::Aes, None, Some("xts")).is_err());
    }
}
