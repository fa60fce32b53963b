//! Admission webhook server.
//!
//! Serves the label validation endpoint for the Kubernetes API server.
//!
//! To enable the webhook:
//! 1. Deploy cert-manager for TLS certificates
//! 2. Apply the ValidatingWebhookConfiguration printed by `webhookgen`
//! 3. Mount the TLS certificate secret to the webhook pod at /etc/webhook/certs/

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use axum::extract::rejection::JsonRejection;
use axum::{Json, Router, extract::State, http::StatusCode, routing::post};
use axum_server::tls_rustls::RustlsConfig;
use kube::core::DynamicObject;
use kube::core::admission::{AdmissionRequest, AdmissionResponse, AdmissionReview};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, error, info, warn};

use super::policies::operation::operation_name;
use super::policies::{LabelValidator, ReviewRequest, Verdict};
use super::registration::LABEL_VALIDATION_PATH;
use crate::health::HealthState;

/// Shared state for webhook handlers
pub struct WebhookState {
    pub validator: LabelValidator,
    pub health: Arc<HealthState>,
}

impl WebhookState {
    pub fn new(validator: LabelValidator, health: Arc<HealthState>) -> Self {
        Self { validator, health }
    }
}

/// Build the admission response for a verdict.
///
/// Denials carry 403/Forbidden and errors their own code with BadRequest,
/// so the API server can tell policy rejections from unusable requests.
pub fn verdict_response(
    request: &AdmissionRequest<DynamicObject>,
    verdict: &Verdict,
) -> AdmissionResponse {
    match verdict {
        Verdict::Allowed => AdmissionResponse::from(request),
        Verdict::Denied(reason) => {
            let mut response = AdmissionResponse::from(request).deny(reason);
            response.result.code = 403;
            response.result.reason = "Forbidden".to_string();
            response
        }
        Verdict::Errored { code, cause } => {
            let mut response = AdmissionResponse::from(request).deny(cause);
            response.result.code = *code;
            response.result.reason = "BadRequest".to_string();
            response
        }
    }
}

/// Create the webhook router
pub fn create_webhook_router(state: Arc<WebhookState>) -> Router {
    Router::new()
        .route(LABEL_VALIDATION_PATH, post(validate_label))
        .with_state(state)
}

type ReviewReply = (StatusCode, Json<AdmissionReview<DynamicObject>>);

/// Reply for a body that is not a usable AdmissionReview
fn invalid_review(reason: String) -> ReviewReply {
    (
        StatusCode::BAD_REQUEST,
        Json(AdmissionResponse::invalid(reason).into_review()),
    )
}

/// Take `request.oldObject` and `request.object` out of a review body.
///
/// The objects are returned as raw JSON bytes and left as `null` in the body,
/// so a malformed object reaches the decoder instead of failing the whole
/// review. Absent or `null` objects become empty payloads.
pub(crate) fn take_objects(body: &mut Value) -> (Vec<u8>, Vec<u8>) {
    let Some(request) = body.get_mut("request").and_then(Value::as_object_mut) else {
        return (Vec::new(), Vec::new());
    };
    (take_raw(request, "oldObject"), take_raw(request, "object"))
}

fn take_raw(request: &mut Map<String, Value>, field: &str) -> Vec<u8> {
    match request.get_mut(field).map(Value::take) {
        None | Some(Value::Null) => Vec::new(),
        Some(object) => serde_json::to_vec(&object).unwrap_or_default(),
    }
}

/// Label validation admission webhook handler
async fn validate_label(
    State(state): State<Arc<WebhookState>>,
    body: Result<Json<Value>, JsonRejection>,
) -> ReviewReply {
    let mut body = match body {
        Ok(Json(body)) => body,
        Err(rejection) => {
            error!(error = %rejection, "Failed to read admission review body");
            return invalid_review(format!(
                "Invalid AdmissionReview: {}",
                rejection.body_text()
            ));
        }
    };

    let (old_object, object) = take_objects(&mut body);

    let review: AdmissionReview<DynamicObject> = match serde_json::from_value(body) {
        Ok(review) => review,
        Err(e) => {
            error!(error = %e, "Failed to parse admission review");
            return invalid_review(format!("Invalid AdmissionReview: {}", e));
        }
    };

    let request: AdmissionRequest<DynamicObject> = match review.try_into() {
        Ok(req) => req,
        Err(e) => {
            error!(error = %e, "Failed to extract admission request");
            return invalid_review(format!("Invalid AdmissionReview: {}", e));
        }
    };

    let uid = &request.uid;
    debug!(
        uid = %uid,
        group = %request.kind.group,
        kind = %request.kind.kind,
        operation = %operation_name(&request.operation),
        namespace = ?request.namespace,
        name = ?request.name,
        "Processing admission request"
    );

    let started = Instant::now();
    let verdict = state
        .validator
        .review(&ReviewRequest::new(&request, old_object, object));
    state.health.metrics.record_review(
        state.validator.resolve_kind(&request.kind.kind).ok(),
        verdict.outcome(),
        started.elapsed().as_secs_f64(),
    );

    match &verdict {
        Verdict::Allowed => info!(uid = %uid, "Admission request allowed"),
        Verdict::Denied(reason) => {
            warn!(uid = %uid, reason = %reason, "Admission request denied")
        }
        Verdict::Errored { code, cause } => {
            warn!(uid = %uid, code = *code, cause = %cause, "Admission request errored")
        }
    }

    (
        StatusCode::OK,
        Json(verdict_response(&request, &verdict).into_review()),
    )
}

/// Errors that can occur when running the webhook server
#[derive(Error, Debug)]
pub enum WebhookError {
    /// TLS configuration error
    #[error("TLS configuration error: {0}")]
    TlsConfig(std::io::Error),

    /// Server error
    #[error("Webhook server error: {0}")]
    Server(std::io::Error),
}

/// Run the webhook server with TLS on `0.0.0.0:<port>`.
///
/// Marks the health state ready once the certificate pair has loaded.
pub async fn run_webhook_server(
    state: Arc<WebhookState>,
    port: u16,
    cert_path: &Path,
    key_path: &Path,
) -> Result<(), WebhookError> {
    let config = RustlsConfig::from_pem_file(cert_path, key_path)
        .await
        .map_err(WebhookError::TlsConfig)?;

    let health = state.health.clone();
    let app = create_webhook_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!(port, path = LABEL_VALIDATION_PATH, "Webhook server listening with TLS");
    health.set_ready(true).await;

    axum_server::bind_rustls(addr, config)
        .serve(app.into_make_service())
        .await
        .map_err(WebhookError::Server)?;

    Ok(())
}
