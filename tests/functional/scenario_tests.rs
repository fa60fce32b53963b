//! Engine-level scenarios covering every stage of a review.

use sdewan_label_webhook::webhooks::{
    LabelPolicy, LabelValidator, Operation, ReviewError, SdewanKind, Verdict,
};

use crate::common::fixtures::{SdewanObjectBuilder, label_update, review_request};

fn purpose_validator() -> LabelValidator {
    LabelValidator::new(LabelPolicy::default().with_label_key("purpose"))
}

#[test]
fn test_purpose_change_denied() {
    let verdict = purpose_validator().review(&label_update(
        "Mwan3Policy",
        "purpose",
        Some("voice"),
        Some("data"),
    ));
    assert_eq!(
        verdict,
        Verdict::Denied("label of purpose is immutable".to_string())
    );
}

#[test]
fn test_purpose_unchanged_allowed() {
    let verdict = purpose_validator().review(&label_update(
        "Mwan3Policy",
        "purpose",
        Some("voice"),
        Some("voice"),
    ));
    assert_eq!(verdict, Verdict::Allowed);
}

#[test]
fn test_unknown_kind_rejected() {
    let verdict = purpose_validator().review(&label_update(
        "Unknown",
        "purpose",
        Some("voice"),
        Some("voice"),
    ));
    match verdict {
        Verdict::Errored { code, cause } => {
            assert_eq!(code, 400);
            assert!(cause.to_string().starts_with("kind is not supported"));
        }
        other => panic!("expected client error, got {:?}", other),
    }
}

#[test]
fn test_every_kind_enforces_label() {
    let validator = LabelValidator::default();
    for kind in SdewanKind::ALL {
        let denied = validator.review(&label_update(
            kind.as_str(),
            "sdewanPurpose",
            Some("cnf1"),
            Some("cnf2"),
        ));
        assert_eq!(denied.outcome(), "denied", "kind {}", kind);

        let allowed = validator.review(&label_update(
            kind.as_str(),
            "sdewanPurpose",
            Some("cnf1"),
            Some("cnf1"),
        ));
        assert_eq!(allowed, Verdict::Allowed, "kind {}", kind);
    }
}

#[test]
fn test_label_added_after_creation_denied() {
    let verdict = LabelValidator::default().review(&label_update(
        "FirewallZone",
        "sdewanPurpose",
        None,
        Some("cnf1"),
    ));
    assert_eq!(verdict.outcome(), "denied");
}

#[test]
fn test_spec_change_with_same_label_allowed() {
    let old = SdewanObjectBuilder::new("FirewallRule")
        .label("sdewanPurpose", "cnf1")
        .spec(serde_json::json!({ "src": "lan", "target": "ACCEPT" }))
        .to_bytes();
    let new = SdewanObjectBuilder::new("FirewallRule")
        .label("sdewanPurpose", "cnf1")
        .label("team", "net")
        .spec(serde_json::json!({ "src": "lan", "target": "DROP" }))
        .to_bytes();

    let verdict =
        LabelValidator::default().review(&review_request("FirewallRule", Operation::Update, old, new));
    assert_eq!(verdict, Verdict::Allowed);
}

#[test]
fn test_create_and_delete_denied_without_decoding() {
    let validator = LabelValidator::default();

    let create = review_request("Mwan3Rule", Operation::Create, Vec::new(), b"{{{".to_vec());
    assert_eq!(
        validator.review(&create),
        Verdict::Denied("operation type CREATE is not supported".to_string())
    );

    let delete = review_request("Mwan3Rule", Operation::Delete, b"}}}".to_vec(), Vec::new());
    assert_eq!(
        validator.review(&delete),
        Verdict::Denied("operation type DELETE is not supported".to_string())
    );
}

#[test]
fn test_unsupported_kind_wins_over_operation() {
    let request = review_request("Pod", Operation::Delete, Vec::new(), Vec::new());
    assert_eq!(
        LabelValidator::default().review(&request),
        Verdict::errored(ReviewError::UnsupportedKind("Pod".to_string()))
    );
}

#[test]
fn test_foreign_group_rejected_for_valid_payload() {
    let mut request = label_update("FirewallZone", "sdewanPurpose", Some("a"), Some("a"));
    request.group = "apps".to_string();
    match LabelValidator::default().review(&request) {
        Verdict::Errored { code, cause } => {
            assert_eq!(code, 400);
            assert_eq!(cause.to_string(), "group is not batch.sdewan.akraino.org");
        }
        other => panic!("expected client error, got {:?}", other),
    }
}

#[test]
fn test_wrong_spec_shape_is_decode_error() {
    let old = SdewanObjectBuilder::new("FirewallForwarding")
        .label("sdewanPurpose", "cnf1")
        .to_bytes();
    let new = SdewanObjectBuilder::new("FirewallForwarding")
        .label("sdewanPurpose", "cnf1")
        .spec(serde_json::json!({ "src": ["not", "a", "string"] }))
        .to_bytes();

    match LabelValidator::default().review(&review_request(
        "FirewallForwarding",
        Operation::Update,
        old,
        new,
    )) {
        Verdict::Errored {
            cause: ReviewError::Decode(failure),
            ..
        } => {
            assert!(failure.old.is_none());
            assert!(failure.new.is_some());
        }
        other => panic!("expected decode error, got {:?}", other),
    }
}

#[test]
fn test_validator_shared_across_threads() {
    let validator = std::sync::Arc::new(LabelValidator::default());
    let handles: Vec<_> = (0..8)
        .map(|i| {
            let validator = validator.clone();
            std::thread::spawn(move || {
                let new_value = if i % 2 == 0 { "cnf1" } else { "cnf2" };
                validator.review(&label_update(
                    "FirewallDNAT",
                    "sdewanPurpose",
                    Some("cnf1"),
                    Some(new_value),
                ))
            })
        })
        .collect();

    for (i, handle) in handles.into_iter().enumerate() {
        let verdict = handle.join().unwrap();
        assert_eq!(verdict.is_allowed(), i % 2 == 0);
    }
}
