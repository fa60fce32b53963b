//! Multi-WAN (mwan3) policy and rule resources.

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::{Scalar, SdewanStatus};

/// Mwan3Policy distributes traffic across WAN interfaces.
///
/// Example:
/// ```yaml
/// apiVersion: batch.sdewan.akraino.org/v1alpha1
/// kind: Mwan3Policy
/// metadata:
///   name: balance1
///   labels:
///     sdewanPurpose: cnf1
/// spec:
///   members:
///     - network: ovn-net1
///       metric: 2
///       weight: 2
/// ```
#[derive(CustomResource, Clone, Debug, Default, Deserialize, Serialize, JsonSchema)]
#[kube(
    group = "batch.sdewan.akraino.org",
    version = "v1alpha1",
    kind = "Mwan3Policy",
    plural = "mwan3policies",
    status = "SdewanStatus",
    namespaced
)]
pub struct Mwan3PolicySpec {
    /// Interfaces taking part in the policy.
    #[serde(default)]
    pub members: Vec<Mwan3PolicyMember>,
}

/// One WAN interface participating in a policy.
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
pub struct Mwan3PolicyMember {
    /// Network attachment the member routes through.
    #[serde(default)]
    pub network: String,
    /// Lower metrics are preferred.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metric: Option<Scalar>,
    /// Relative share among members with the same metric.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<Scalar>,
}

/// Mwan3Rule selects traffic and binds it to an `Mwan3Policy`.
#[derive(CustomResource, Clone, Debug, Default, Deserialize, Serialize, JsonSchema)]
#[kube(
    group = "batch.sdewan.akraino.org",
    version = "v1alpha1",
    kind = "Mwan3Rule",
    plural = "mwan3rules",
    status = "SdewanStatus",
    namespaced
)]
pub struct Mwan3RuleSpec {
    /// Name of the `Mwan3Policy` matched traffic is sent to.
    #[serde(default)]
    pub policy: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src_ip: Option<Scalar>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src_port: Option<Scalar>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dest_ip: Option<Scalar>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dest_port: Option<Scalar>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proto: Option<Scalar>,
    /// `ipv4`, `ipv6` or `any`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub family: Option<Scalar>,
    /// Keep a flow on the interface it was first routed through.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sticky: Option<Scalar>,
    /// Sticky timeout in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<Scalar>,
}
