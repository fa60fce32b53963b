//! Webhook module for validating admission requests.
//!
//! Provides the ValidatingAdmissionWebhook that keeps the SDEWAN purpose
//! label immutable across updates:
//! - `kind`: resolves the request kind and decodes object snapshots
//! - `policies`: the staged decision engine producing a `Verdict`
//! - `registration`: the ValidatingWebhookConfiguration served by this process
//! - `server`: the HTTPS endpoint the API server calls

pub mod error;
pub mod kind;
pub mod policies;
pub mod registration;
mod server;

pub use error::{DecodeFailure, ReviewError};
pub use kind::{SdewanKind, Snapshot};
pub use policies::immutability::{HasLabels, PURPOSE_LABEL};
pub use policies::{LabelPolicy, LabelValidator, ReviewRequest, Verdict};
pub use registration::{LABEL_VALIDATION_PATH, ServiceTarget, validating_webhook_configuration};
pub use server::{
    WebhookError, WebhookState, create_webhook_router, run_webhook_server, verdict_response,
};

// Re-export kube-rs admission types for contract testing
pub use kube::core::admission::{AdmissionRequest, AdmissionResponse, AdmissionReview, Operation};
