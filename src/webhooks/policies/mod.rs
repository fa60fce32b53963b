//! Label validation policies for SDEWAN admission webhooks.
//!
//! A review runs through fixed stages, stopping at the first that does not
//! pass:
//! 1. Group check: request must target the SDEWAN group (client error)
//! 2. Kind resolution: kind must be a supported SDEWAN kind (client error)
//! 3. Operation gate: only UPDATE is accepted (policy denial)
//! 4. Decode: both snapshots must decode into the kind's type (client error)
//! 5. Immutability: the protected label must not change (policy denial)

pub mod immutability;
pub mod operation;

use std::collections::BTreeSet;

use kube::core::DynamicObject;
use kube::core::admission::{AdmissionRequest, Operation};
use tracing::debug;

use super::error::ReviewError;
use super::kind::{SdewanKind, decode_pair};
use crate::crd::SDEWAN_GROUP;
use immutability::PURPOSE_LABEL;

/// Outcome of a single admission review
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Verdict {
    /// The request may proceed
    Allowed,
    /// Well-formed request rejected by policy
    Denied(String),
    /// Request could not be evaluated
    Errored { code: u16, cause: ReviewError },
}

impl Verdict {
    /// Create a policy denial
    pub fn denied(reason: impl Into<String>) -> Self {
        Verdict::Denied(reason.into())
    }

    /// Create an error verdict carrying the cause's status code
    pub fn errored(cause: ReviewError) -> Self {
        Verdict::Errored {
            code: cause.status_code(),
            cause,
        }
    }

    pub fn is_allowed(&self) -> bool {
        matches!(self, Verdict::Allowed)
    }

    /// Short label used in logs and metrics
    pub fn outcome(&self) -> &'static str {
        match self {
            Verdict::Allowed => "allowed",
            Verdict::Denied(_) => "denied",
            Verdict::Errored { .. } => "errored",
        }
    }
}

/// What the engine needs to know about one admission request
#[derive(Clone, Debug)]
pub struct ReviewRequest {
    /// API group of the target resource
    pub group: String,
    /// Kind of the target resource
    pub kind: String,
    pub operation: Operation,
    /// Serialized object before the operation (empty on CREATE)
    pub old_object: Vec<u8>,
    /// Serialized object after the operation (empty on DELETE)
    pub object: Vec<u8>,
}

impl ReviewRequest {
    /// Build a request from the admission metadata and the raw object bytes.
    ///
    /// The objects are passed separately because they are taken out of the
    /// review body before it is parsed; an absent object is an empty payload.
    pub fn new(
        request: &AdmissionRequest<DynamicObject>,
        old_object: Vec<u8>,
        object: Vec<u8>,
    ) -> Self {
        Self {
            group: request.kind.group.clone(),
            kind: request.kind.kind.clone(),
            operation: request.operation.clone(),
            old_object,
            object,
        }
    }
}

/// Configuration for the label validator
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LabelPolicy {
    /// The only API group accepted
    pub group: String,
    /// Label whose value must not change on UPDATE
    pub label_key: String,
    /// Kinds the validator accepts
    pub kinds: BTreeSet<SdewanKind>,
}

impl Default for LabelPolicy {
    fn default() -> Self {
        Self {
            group: SDEWAN_GROUP.to_string(),
            label_key: PURPOSE_LABEL.to_string(),
            kinds: SdewanKind::ALL.into_iter().collect(),
        }
    }
}

impl LabelPolicy {
    /// Guard a different label
    pub fn with_label_key(mut self, label_key: impl Into<String>) -> Self {
        self.label_key = label_key.into();
        self
    }

    /// Restrict the accepted kinds
    pub fn with_kinds(mut self, kinds: impl IntoIterator<Item = SdewanKind>) -> Self {
        self.kinds = kinds.into_iter().collect();
        self
    }
}

/// Stateless decision engine for label immutability reviews.
///
/// Holds only its configuration, so one instance can serve concurrent
/// requests without coordination.
#[derive(Clone, Debug, Default)]
pub struct LabelValidator {
    policy: LabelPolicy,
}

impl LabelValidator {
    pub fn new(policy: LabelPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &LabelPolicy {
        &self.policy
    }

    /// Resolve a kind name to a supported kind
    pub fn resolve_kind(&self, kind: &str) -> Result<SdewanKind, ReviewError> {
        let resolved: SdewanKind = kind.parse()?;
        if !self.policy.kinds.contains(&resolved) {
            return Err(ReviewError::UnsupportedKind(kind.to_string()));
        }
        Ok(resolved)
    }

    /// Run every stage and produce exactly one verdict
    pub fn review(&self, request: &ReviewRequest) -> Verdict {
        if request.group != self.policy.group {
            debug!(group = %request.group, "Rejecting request for foreign group");
            return Verdict::errored(ReviewError::GroupMismatch {
                expected: self.policy.group.clone(),
                actual: request.group.clone(),
            });
        }

        let kind = match self.resolve_kind(&request.kind) {
            Ok(kind) => kind,
            Err(cause) => {
                debug!(kind = %request.kind, "Rejecting request for unsupported kind");
                return Verdict::errored(cause);
            }
        };

        let verdict = operation::validate(&request.operation);
        if !verdict.is_allowed() {
            return verdict;
        }

        let (old, new) = match decode_pair(kind, &request.old_object, &request.object) {
            Ok(pair) => pair,
            Err(failure) => {
                debug!(kind = %kind, failure = %failure, "Failed to decode snapshots");
                return Verdict::errored(ReviewError::Decode(failure));
            }
        };

        immutability::validate(&self.policy.label_key, old.as_ref(), new.as_ref())
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::panic
)]
mod tests {
    use super::*;
    use crate::webhooks::error::DecodeFailure;
    use serde_json::json;

    fn payload(kind: &str, purpose: Option<&str>) -> Vec<u8> {
        let mut metadata = json!({ "name": "test", "namespace": "default" });
        if let Some(purpose) = purpose {
            metadata["labels"] = json!({ "purpose": purpose });
        }
        serde_json::to_vec(&json!({
            "apiVersion": "batch.sdewan.akraino.org/v1alpha1",
            "kind": kind,
            "metadata": metadata,
            "spec": {},
        }))
        .unwrap()
    }

    fn update(kind: &str, old: Option<&str>, new: Option<&str>) -> ReviewRequest {
        ReviewRequest {
            group: SDEWAN_GROUP.to_string(),
            kind: kind.to_string(),
            operation: Operation::Update,
            old_object: payload(kind, old),
            object: payload(kind, new),
        }
    }

    fn validator() -> LabelValidator {
        LabelValidator::new(LabelPolicy::default().with_label_key("purpose"))
    }

    #[test]
    fn test_default_policy() {
        let policy = LabelPolicy::default();
        assert_eq!(policy.group, "batch.sdewan.akraino.org");
        assert_eq!(policy.label_key, "sdewanPurpose");
        assert_eq!(policy.kinds.len(), 7);
    }

    #[test]
    fn test_label_changed_denied() {
        let verdict = validator().review(&update("Mwan3Policy", Some("voice"), Some("data")));
        assert_eq!(
            verdict,
            Verdict::Denied("label of purpose is immutable".to_string())
        );
    }

    #[test]
    fn test_label_unchanged_allowed() {
        let verdict = validator().review(&update("Mwan3Policy", Some("voice"), Some("voice")));
        assert_eq!(verdict, Verdict::Allowed);
    }

    #[test]
    fn test_unknown_kind_errored() {
        let verdict = validator().review(&update("Unknown", Some("voice"), Some("voice")));
        match verdict {
            Verdict::Errored { code, cause } => {
                assert_eq!(code, 400);
                assert!(cause.to_string().starts_with("kind is not supported"));
            }
            other => panic!("expected error, got {:?}", other),
        }
    }

    #[test]
    fn test_kind_outside_registry_errored() {
        let validator = LabelValidator::new(
            LabelPolicy::default()
                .with_label_key("purpose")
                .with_kinds([SdewanKind::Mwan3Policy]),
        );
        let verdict = validator.review(&update("FirewallZone", Some("a"), Some("a")));
        assert_eq!(
            verdict,
            Verdict::errored(ReviewError::UnsupportedKind("FirewallZone".to_string()))
        );

        let verdict = validator.review(&update("Mwan3Policy", Some("a"), Some("a")));
        assert_eq!(verdict, Verdict::Allowed);
    }

    #[test]
    fn test_group_mismatch_errored_before_kind() {
        let mut request = update("Unknown", Some("a"), Some("a"));
        request.group = "apps".to_string();
        let verdict = validator().review(&request);
        assert_eq!(
            verdict,
            Verdict::errored(ReviewError::GroupMismatch {
                expected: SDEWAN_GROUP.to_string(),
                actual: "apps".to_string(),
            })
        );
    }

    #[test]
    fn test_group_comparison_is_exact() {
        let mut request = update("FirewallRule", Some("a"), Some("a"));
        request.group = "Batch.sdewan.akraino.org".to_string();
        assert_eq!(validator().review(&request).outcome(), "errored");
    }

    #[test]
    fn test_non_update_denied_without_decoding() {
        for operation in [Operation::Create, Operation::Delete, Operation::Connect] {
            let request = ReviewRequest {
                group: SDEWAN_GROUP.to_string(),
                kind: "FirewallRule".to_string(),
                operation: operation.clone(),
                old_object: b"garbage".to_vec(),
                object: Vec::new(),
            };
            let verdict = validator().review(&request);
            assert_eq!(verdict.outcome(), "denied");
            match verdict {
                Verdict::Denied(reason) => assert!(reason.contains("is not supported")),
                other => panic!("expected denial, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_decode_error_even_when_labels_match() {
        let mut request = update("FirewallSNAT", Some("a"), Some("a"));
        request.old_object = b"{".to_vec();
        match validator().review(&request) {
            Verdict::Errored {
                code,
                cause: ReviewError::Decode(DecodeFailure { old, new }),
            } => {
                assert_eq!(code, 400);
                assert!(old.is_some());
                assert!(new.is_none());
            }
            other => panic!("expected decode error, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_old_object_is_decode_error() {
        let mut request = update("FirewallDNAT", Some("a"), Some("a"));
        request.old_object = Vec::new();
        let verdict = validator().review(&request);
        assert_eq!(verdict.outcome(), "errored");
    }

    #[test]
    fn test_review_is_idempotent() {
        let validator = validator();
        let request = update("FirewallForwarding", Some("a"), Some("b"));
        let first = validator.review(&request);
        let second = validator.review(&request);
        assert_eq!(first, second);
    }

    #[test]
    fn test_verdict_outcomes() {
        assert_eq!(Verdict::Allowed.outcome(), "allowed");
        assert_eq!(Verdict::denied("no").outcome(), "denied");
        assert_eq!(
            Verdict::errored(ReviewError::UnsupportedKind("x".to_string())).outcome(),
            "errored"
        );
    }
}
