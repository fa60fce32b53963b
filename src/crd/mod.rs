//! Custom Resource Definitions for the SDEWAN API group.
//!
//! - `Mwan3Policy`, `Mwan3Rule`: multi-WAN load balancing policies and matchers
//! - `FirewallZone`, `FirewallForwarding`, `FirewallRule`, `FirewallSNAT`,
//!   `FirewallDNAT`: CNF firewall configuration
//!
//! Every kind shares the same [`SdewanStatus`] subresource.
//!
//! The SDEWAN controllers own the spec schema. Spec fields here decode
//! leniently, unknown fields are ignored, and the CRDs emitted by
//! [`all_crds`] leave `spec` open with `x-kubernetes-preserve-unknown-fields`.

mod firewall;
mod mwan3;

pub use firewall::*;
pub use mwan3::*;

use k8s_openapi::apiextensions_apiserver::pkg::apis::apiextensions::v1::{
    CustomResourceDefinition, JSONSchemaProps,
};
use kube::CustomResourceExt;
use schemars::JsonSchema;
use schemars::r#gen::SchemaGenerator;
use schemars::schema::{Schema, SchemaObject};
use serde::{Deserialize, Serialize};

/// API group shared by all SDEWAN custom resources
pub const SDEWAN_GROUP: &str = "batch.sdewan.akraino.org";

/// API version served for all SDEWAN custom resources
pub const SDEWAN_VERSION: &str = "v1alpha1";

/// Status reported by the SDEWAN controllers after pushing config to a CNF.
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SdewanStatus {
    /// Version of the spec last applied to the CNF.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub applied_version: Option<String>,

    /// RFC 3339 timestamp of the last apply.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub applied_time: Option<String>,

    /// Whether the CNF configuration matches the spec.
    #[serde(default)]
    pub in_sync: bool,

    /// Human-readable detail for the last apply attempt.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// A spec value the CNF accepts as a string, a number or a boolean.
///
/// Controllers write `"1"`, `1` and `true` interchangeably for flags and
/// counters, so all three decode.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum Scalar {
    Text(String),
    Number(serde_json::Number),
    Flag(bool),
}

impl Scalar {
    /// The value when it was written as a string
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Scalar::Text(text) => Some(text),
            Scalar::Number(_) | Scalar::Flag(_) => None,
        }
    }
}

impl From<&str> for Scalar {
    fn from(text: &str) -> Self {
        Scalar::Text(text.to_string())
    }
}

impl JsonSchema for Scalar {
    fn schema_name() -> String {
        "Scalar".to_string()
    }

    fn is_referenceable() -> bool {
        false
    }

    fn json_schema(_: &mut SchemaGenerator) -> Schema {
        SchemaObject {
            extensions: [(
                "x-kubernetes-int-or-string".to_string(),
                serde_json::Value::Bool(true),
            )]
            .into_iter()
            .collect(),
            ..Default::default()
        }
        .into()
    }
}

/// CRD manifests for every SDEWAN kind, in registration order.
pub fn all_crds() -> Vec<CustomResourceDefinition> {
    vec![
        Mwan3Policy::crd(),
        Mwan3Rule::crd(),
        FirewallZone::crd(),
        FirewallForwarding::crd(),
        FirewallRule::crd(),
        FirewallSNAT::crd(),
        FirewallDNAT::crd(),
    ]
    .into_iter()
    .map(open_spec_schema)
    .collect()
}

/// Replace the derived `spec` schema with an open object so applying these
/// CRDs never prunes fields the controllers define.
fn open_spec_schema(mut crd: CustomResourceDefinition) -> CustomResourceDefinition {
    for version in &mut crd.spec.versions {
        let spec = version
            .schema
            .as_mut()
            .and_then(|validation| validation.open_api_v3_schema.as_mut())
            .and_then(|root| root.properties.as_mut())
            .and_then(|properties| properties.get_mut("spec"));

        if let Some(spec) = spec {
            *spec = JSONSchemaProps {
                description: spec.description.take(),
                type_: Some("object".to_string()),
                x_kubernetes_preserve_unknown_fields: Some(true),
                ..Default::default()
            };
        }
    }
    crd
}
