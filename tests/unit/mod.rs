// Test code is allowed to panic on failure
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::panic
)]

//! Unit tests for sdewan-label-webhook.
//!
//! These tests run without a Kubernetes cluster and exercise the public API
//! of each component in isolation.

#[path = "../common/mod.rs"]
mod common;

mod crd_tests {
    use kube::{CustomResourceExt, Resource};
    use sdewan_label_webhook::crd::{
        FirewallDNAT, FirewallSNAT, Mwan3Rule, SDEWAN_GROUP, SDEWAN_VERSION, all_crds,
    };

    #[test]
    fn test_crd_names() {
        let names: Vec<String> = all_crds()
            .into_iter()
            .map(|crd| crd.metadata.name.unwrap())
            .collect();
        assert_eq!(
            names,
            vec![
                "mwan3policies.batch.sdewan.akraino.org",
                "mwan3rules.batch.sdewan.akraino.org",
                "firewallzones.batch.sdewan.akraino.org",
                "firewallforwardings.batch.sdewan.akraino.org",
                "firewallrules.batch.sdewan.akraino.org",
                "firewallsnats.batch.sdewan.akraino.org",
                "firewalldnats.batch.sdewan.akraino.org",
            ]
        );
    }

    #[test]
    fn test_nat_kinds_keep_uppercase_wire_names() {
        assert_eq!(FirewallSNAT::kind(&()), "FirewallSNAT");
        assert_eq!(FirewallDNAT::kind(&()), "FirewallDNAT");
        assert_eq!(FirewallSNAT::crd().spec.names.kind, "FirewallSNAT");
    }

    #[test]
    fn test_api_version() {
        assert_eq!(
            Mwan3Rule::api_version(&()),
            format!("{}/{}", SDEWAN_GROUP, SDEWAN_VERSION)
        );
    }

    #[test]
    fn test_decode_snat_with_spec_fields() {
        let snat: FirewallSNAT = serde_json::from_value(serde_json::json!({
            "apiVersion": "batch.sdewan.akraino.org/v1alpha1",
            "kind": "FirewallSNAT",
            "metadata": { "name": "snat1", "labels": { "sdewanPurpose": "cnf1" } },
            "spec": { "src": "lan", "src_dip": "192.168.1.1", "proto": "tcp" },
        }))
        .unwrap();
        assert_eq!(
            snat.spec.nat.src.as_ref().and_then(|v| v.as_text()),
            Some("lan")
        );
        assert_eq!(
            snat.spec.nat.src_dip.as_ref().and_then(|v| v.as_text()),
            Some("192.168.1.1")
        );
    }
}

mod kind_tests {
    use sdewan_label_webhook::webhooks::{ReviewError, SdewanKind};

    #[test]
    fn test_all_kinds_unique() {
        let mut names: Vec<&str> = SdewanKind::ALL.iter().map(|k| k.as_str()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), SdewanKind::ALL.len());
    }

    #[test]
    fn test_display_matches_wire_name() {
        assert_eq!(SdewanKind::FirewallDnat.to_string(), "FirewallDNAT");
        assert_eq!(SdewanKind::Mwan3Policy.to_string(), "Mwan3Policy");
    }

    #[test]
    fn test_unknown_kind() {
        assert_eq!(
            "Unknown".parse::<SdewanKind>(),
            Err(ReviewError::UnsupportedKind("Unknown".to_string()))
        );
    }
}

mod validator_tests {
    use super::common::fixtures::label_update;
    use sdewan_label_webhook::webhooks::{LabelPolicy, LabelValidator, PURPOSE_LABEL, Verdict};

    #[test]
    fn test_default_validator_guards_purpose_label() {
        let validator = LabelValidator::default();
        assert_eq!(validator.policy().label_key, PURPOSE_LABEL);

        let verdict = validator.review(&label_update(
            "FirewallRule",
            PURPOSE_LABEL,
            Some("cnf1"),
            Some("cnf2"),
        ));
        assert_eq!(
            verdict,
            Verdict::Denied("label of sdewanPurpose is immutable".to_string())
        );
    }

    #[test]
    fn test_other_labels_are_ignored() {
        let validator = LabelValidator::new(LabelPolicy::default());
        let verdict = validator.review(&label_update(
            "FirewallRule",
            "app",
            Some("one"),
            Some("two"),
        ));
        assert_eq!(verdict, Verdict::Allowed);
    }
}

mod config_tests {
    use sdewan_label_webhook::Config;
    use sdewan_label_webhook::webhooks::validating_webhook_configuration;

    #[test]
    fn test_registration_uses_configured_service() {
        let config = Config::from_lookup(|var| match var {
            "WEBHOOK_SERVICE_NAME" => Some("label-webhook".to_string()),
            "WEBHOOK_SERVICE_NAMESPACE" => Some("sdewan".to_string()),
            _ => None,
        })
        .unwrap();

        let registration = validating_webhook_configuration(&config.service_target(), None);
        let webhook = &registration.webhooks.unwrap()[0];
        let service = webhook.client_config.service.as_ref().unwrap();
        assert_eq!(service.name, "label-webhook");
        assert_eq!(service.namespace, "sdewan");
        assert_eq!(service.port, Some(443));
        assert_eq!(
            registration.metadata.annotations.unwrap()["cert-manager.io/inject-ca-from"],
            "sdewan/sdewan-serving-cert"
        );
    }
}
