//! Firewall resources pushed to the SDEWAN CNF.
//!
//! Field names follow the CNF firewall configuration; every field is optional
//! so objects written by older controllers still decode.

#![allow(clippy::upper_case_acronyms)]

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::{Scalar, SdewanStatus};

/// FirewallZone groups networks under a shared default policy.
#[derive(CustomResource, Clone, Debug, Default, Deserialize, Serialize, JsonSchema)]
#[kube(
    group = "batch.sdewan.akraino.org",
    version = "v1alpha1",
    kind = "FirewallZone",
    plural = "firewallzones",
    status = "SdewanStatus",
    namespaced
)]
pub struct FirewallZoneSpec {
    /// Networks attached to the zone.
    #[serde(default)]
    pub network: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub masq: Option<Scalar>,
    #[serde(default)]
    pub masq_src: Vec<String>,
    #[serde(default)]
    pub masq_dest: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub masq_allow_invalid: Option<Scalar>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mtu_fix: Option<Scalar>,
    /// Default policy (`ACCEPT`, `REJECT`, `DROP`) for incoming traffic.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input: Option<Scalar>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub forward: Option<Scalar>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<Scalar>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub family: Option<Scalar>,
    #[serde(default)]
    pub subnet: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra_src: Option<Scalar>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra_dest: Option<Scalar>,
}

/// FirewallForwarding allows traffic to flow from one zone to another.
#[derive(CustomResource, Clone, Debug, Default, Deserialize, Serialize, JsonSchema)]
#[kube(
    group = "batch.sdewan.akraino.org",
    version = "v1alpha1",
    kind = "FirewallForwarding",
    plural = "firewallforwardings",
    status = "SdewanStatus",
    namespaced
)]
pub struct FirewallForwardingSpec {
    /// Source zone.
    #[serde(default)]
    pub src: String,
    /// Destination zone.
    #[serde(default)]
    pub dest: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub family: Option<Scalar>,
}

/// FirewallRule matches traffic between zones and applies a target.
#[derive(CustomResource, Clone, Debug, Default, Deserialize, Serialize, JsonSchema)]
#[kube(
    group = "batch.sdewan.akraino.org",
    version = "v1alpha1",
    kind = "FirewallRule",
    plural = "firewallrules",
    status = "SdewanStatus",
    namespaced
)]
pub struct FirewallRuleSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src: Option<Scalar>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src_ip: Option<Scalar>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src_mac: Option<Scalar>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src_port: Option<Scalar>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proto: Option<Scalar>,
    #[serde(default)]
    pub icmp_type: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dest: Option<Scalar>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dest_ip: Option<Scalar>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dest_port: Option<Scalar>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mark: Option<Scalar>,
    /// `ACCEPT`, `REJECT`, `DROP`, `MARK` or `NOTRACK`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<Scalar>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub set_mark: Option<Scalar>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub set_xmark: Option<Scalar>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub family: Option<Scalar>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra: Option<Scalar>,
}

/// Translation fields shared by source and destination NAT rules.
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
pub struct NatSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src: Option<Scalar>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src_ip: Option<Scalar>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src_dip: Option<Scalar>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src_mac: Option<Scalar>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src_port: Option<Scalar>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src_dport: Option<Scalar>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proto: Option<Scalar>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dest: Option<Scalar>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dest_ip: Option<Scalar>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dest_port: Option<Scalar>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mark: Option<Scalar>,
    /// `SNAT` or `DNAT`; the CNF infers it from the kind when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<Scalar>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub family: Option<Scalar>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reflection: Option<Scalar>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reflection_src: Option<Scalar>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<Scalar>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit_burst: Option<Scalar>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra: Option<Scalar>,
}

/// FirewallSNAT rewrites the source address of matched traffic.
#[derive(CustomResource, Clone, Debug, Default, Deserialize, Serialize, JsonSchema)]
#[kube(
    group = "batch.sdewan.akraino.org",
    version = "v1alpha1",
    kind = "FirewallSNAT",
    plural = "firewallsnats",
    status = "SdewanStatus",
    namespaced
)]
pub struct FirewallSNATSpec {
    #[serde(flatten)]
    pub nat: NatSpec,
}

/// FirewallDNAT rewrites the destination address of matched traffic.
#[derive(CustomResource, Clone, Debug, Default, Deserialize, Serialize, JsonSchema)]
#[kube(
    group = "batch.sdewan.akraino.org",
    version = "v1alpha1",
    kind = "FirewallDNAT",
    plural = "firewalldnats",
    status = "SdewanStatus",
    namespaced
)]
pub struct FirewallDNATSpec {
    #[serde(flatten)]
    pub nat: NatSpec,
}
