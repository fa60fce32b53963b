//! ValidatingWebhookConfiguration for the label webhook.
//!
//! The rule's resource list is built from [`SdewanKind::ALL`], the same table
//! the kind resolver matches against.

use std::collections::BTreeMap;

use k8s_openapi::ByteString;
use k8s_openapi::api::admissionregistration::v1::{
    RuleWithOperations, ServiceReference, ValidatingWebhook, ValidatingWebhookConfiguration,
    WebhookClientConfig,
};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;

use super::kind::SdewanKind;
use crate::crd::{SDEWAN_GROUP, SDEWAN_VERSION};

/// HTTP path the label webhook is served on
pub const LABEL_VALIDATION_PATH: &str = "/validate-label";

/// Name of the webhook inside the configuration
pub const WEBHOOK_NAME: &str = "validate-label.akraino.org";

/// Name of the ValidatingWebhookConfiguration object
pub const WEBHOOK_CONFIGURATION_NAME: &str = "sdewan-validating-webhook-configuration";

/// Annotation asking cert-manager's CA injector to fill in `caBundle`
pub const INJECT_CA_FROM_ANNOTATION: &str = "cert-manager.io/inject-ca-from";

/// Service the API server calls to reach the webhook
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServiceTarget {
    pub name: String,
    pub namespace: String,
    pub port: u16,
    /// cert-manager Certificate (in `namespace`) that issued the serving cert
    pub certificate: String,
}

/// Plural resource names the webhook is registered for
pub fn registered_resources() -> Vec<String> {
    SdewanKind::ALL
        .iter()
        .map(|kind| kind.plural().to_string())
        .collect()
}

/// Build the webhook configuration.
///
/// `ca_bundle` is the PEM CA that signed the serving certificate. Without it
/// the configuration is annotated with `cert-manager.io/inject-ca-from`
/// pointing at the target's Certificate, and cert-manager's CA injector
/// fills the bundle in.
pub fn validating_webhook_configuration(
    target: &ServiceTarget,
    ca_bundle: Option<Vec<u8>>,
) -> ValidatingWebhookConfiguration {
    let inject_ca_from = ca_bundle.is_none();
    let webhook = ValidatingWebhook {
        name: WEBHOOK_NAME.to_string(),
        admission_review_versions: vec!["v1".to_string()],
        client_config: WebhookClientConfig {
            ca_bundle: ca_bundle.map(ByteString),
            service: Some(ServiceReference {
                name: target.name.clone(),
                namespace: target.namespace.clone(),
                path: Some(LABEL_VALIDATION_PATH.to_string()),
                port: Some(i32::from(target.port)),
            }),
            url: None,
        },
        failure_policy: Some("Fail".to_string()),
        side_effects: "None".to_string(),
        rules: Some(vec![RuleWithOperations {
            api_groups: Some(vec![SDEWAN_GROUP.to_string()]),
            api_versions: Some(vec![SDEWAN_VERSION.to_string()]),
            operations: Some(vec!["UPDATE".to_string()]),
            resources: Some(registered_resources()),
            scope: None,
        }]),
        ..Default::default()
    };

    let annotations = inject_ca_from.then(|| {
        BTreeMap::from([(
            INJECT_CA_FROM_ANNOTATION.to_string(),
            format!("{}/{}", target.namespace, target.certificate),
        )])
    });

    ValidatingWebhookConfiguration {
        metadata: ObjectMeta {
            name: Some(WEBHOOK_CONFIGURATION_NAME.to_string()),
            annotations,
            ..Default::default()
        },
        webhooks: Some(vec![webhook]),
    }
}
