//! sdewan-label-webhook library crate
//!
//! This module exports the SDEWAN CRD definitions, the label immutability
//! decision engine, and the webhook and health servers that host it.

pub mod config;
pub mod crd;
pub mod health;
pub mod webhooks;

pub use config::{Config, ConfigError};
pub use health::HealthState;
pub use webhooks::{
    LabelPolicy, LabelValidator, ReviewRequest, Verdict, WebhookError, WebhookState,
    run_webhook_server,
};
