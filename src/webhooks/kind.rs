//! Kind resolution and snapshot decoding.
//!
//! Maps the `kind` discriminator of an admission request onto one of the
//! SDEWAN resource types and decodes raw object payloads into it.

use std::fmt;
use std::str::FromStr;

use serde::de::DeserializeOwned;

use super::error::{DecodeFailure, ReviewError};
use super::policies::immutability::HasLabels;
use crate::crd::{
    FirewallDNAT, FirewallForwarding, FirewallRule, FirewallSNAT, FirewallZone, Mwan3Policy,
    Mwan3Rule,
};

/// A decoded resource, accessed only through its labels.
pub type Snapshot = Box<dyn HasLabels + Send + Sync>;

/// The closed set of kinds the label webhook guards
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SdewanKind {
    Mwan3Policy,
    Mwan3Rule,
    FirewallZone,
    FirewallForwarding,
    FirewallRule,
    FirewallSnat,
    FirewallDnat,
}

impl SdewanKind {
    /// Every supported kind, in registration order
    pub const ALL: [SdewanKind; 7] = [
        SdewanKind::Mwan3Policy,
        SdewanKind::Mwan3Rule,
        SdewanKind::FirewallZone,
        SdewanKind::FirewallForwarding,
        SdewanKind::FirewallRule,
        SdewanKind::FirewallSnat,
        SdewanKind::FirewallDnat,
    ];

    /// Kind name as it appears on the wire
    pub fn as_str(self) -> &'static str {
        match self {
            SdewanKind::Mwan3Policy => "Mwan3Policy",
            SdewanKind::Mwan3Rule => "Mwan3Rule",
            SdewanKind::FirewallZone => "FirewallZone",
            SdewanKind::FirewallForwarding => "FirewallForwarding",
            SdewanKind::FirewallRule => "FirewallRule",
            SdewanKind::FirewallSnat => "FirewallSNAT",
            SdewanKind::FirewallDnat => "FirewallDNAT",
        }
    }

    /// Plural resource name used in API paths and webhook rules
    pub fn plural(self) -> &'static str {
        match self {
            SdewanKind::Mwan3Policy => "mwan3policies",
            SdewanKind::Mwan3Rule => "mwan3rules",
            SdewanKind::FirewallZone => "firewallzones",
            SdewanKind::FirewallForwarding => "firewallforwardings",
            SdewanKind::FirewallRule => "firewallrules",
            SdewanKind::FirewallSnat => "firewallsnats",
            SdewanKind::FirewallDnat => "firewalldnats",
        }
    }

    /// Decode a raw JSON payload into a fresh instance of this kind.
    pub fn decode(self, payload: &[u8]) -> Result<Snapshot, serde_json::Error> {
        match self {
            SdewanKind::Mwan3Policy => decode_as::<Mwan3Policy>(payload),
            SdewanKind::Mwan3Rule => decode_as::<Mwan3Rule>(payload),
            SdewanKind::FirewallZone => decode_as::<FirewallZone>(payload),
            SdewanKind::FirewallForwarding => decode_as::<FirewallForwarding>(payload),
            SdewanKind::FirewallRule => decode_as::<FirewallRule>(payload),
            SdewanKind::FirewallSnat => decode_as::<FirewallSNAT>(payload),
            SdewanKind::FirewallDnat => decode_as::<FirewallDNAT>(payload),
        }
    }
}

impl fmt::Display for SdewanKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SdewanKind {
    type Err = ReviewError;

    fn from_str(kind: &str) -> Result<Self, Self::Err> {
        match kind {
            "Mwan3Policy" => Ok(SdewanKind::Mwan3Policy),
            "Mwan3Rule" => Ok(SdewanKind::Mwan3Rule),
            "FirewallZone" => Ok(SdewanKind::FirewallZone),
            "FirewallForwarding" => Ok(SdewanKind::FirewallForwarding),
            "FirewallRule" => Ok(SdewanKind::FirewallRule),
            "FirewallSNAT" => Ok(SdewanKind::FirewallSnat),
            "FirewallDNAT" => Ok(SdewanKind::FirewallDnat),
            other => Err(ReviewError::UnsupportedKind(other.to_string())),
        }
    }
}

fn decode_as<K>(payload: &[u8]) -> Result<Snapshot, serde_json::Error>
where
    K: DeserializeOwned + HasLabels + Send + Sync + 'static,
{
    let resource: K = serde_json::from_slice(payload)?;
    Ok(Box::new(resource))
}

/// Decode the old and new payloads into two independent snapshots.
///
/// Both payloads are always decoded so a failure on one side never hides a
/// failure on the other.
pub fn decode_pair(
    kind: SdewanKind,
    old_payload: &[u8],
    new_payload: &[u8],
) -> Result<(Snapshot, Snapshot), DecodeFailure> {
    let old = kind.decode(old_payload);
    let new = kind.decode(new_payload);

    match (old, new) {
        (Ok(old), Ok(new)) => Ok((old, new)),
        (old, new) => Err(DecodeFailure {
            old: old.err().map(|e| e.to_string()),
            new: new.err().map(|e| e.to_string()),
        }),
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
    use kube::Resource;
    use serde_json::json;

    fn payload(kind: SdewanKind, purpose: Option<&str>) -> Vec<u8> {
        let mut metadata = json!({ "name": "test", "namespace": "default" });
        if let Some(purpose) = purpose {
            metadata["labels"] = json!({ "sdewanPurpose": purpose });
        }
        serde_json::to_vec(&json!({
            "apiVersion": "batch.sdewan.akraino.org/v1alpha1",
            "kind": kind.as_str(),
            "metadata": metadata,
            "spec": {},
        }))
        .unwrap()
    }

    #[test]
    fn test_wire_names_match_resource_types() {
        assert_eq!(SdewanKind::Mwan3Policy.as_str(), Mwan3Policy::kind(&()));
        assert_eq!(SdewanKind::Mwan3Rule.as_str(), Mwan3Rule::kind(&()));
        assert_eq!(SdewanKind::FirewallZone.as_str(), FirewallZone::kind(&()));
        assert_eq!(
            SdewanKind::FirewallForwarding.as_str(),
            FirewallForwarding::kind(&())
        );
        assert_eq!(SdewanKind::FirewallRule.as_str(), FirewallRule::kind(&()));
        assert_eq!(SdewanKind::FirewallSnat.as_str(), FirewallSNAT::kind(&()));
        assert_eq!(SdewanKind::FirewallDnat.as_str(), FirewallDNAT::kind(&()));
    }

    #[test]
    fn test_plurals_match_resource_types() {
        assert_eq!(SdewanKind::Mwan3Policy.plural(), Mwan3Policy::plural(&()));
        assert_eq!(SdewanKind::Mwan3Rule.plural(), Mwan3Rule::plural(&()));
        assert_eq!(SdewanKind::FirewallZone.plural(), FirewallZone::plural(&()));
        assert_eq!(
            SdewanKind::FirewallForwarding.plural(),
            FirewallForwarding::plural(&())
        );
        assert_eq!(SdewanKind::FirewallRule.plural(), FirewallRule::plural(&()));
        assert_eq!(SdewanKind::FirewallSnat.plural(), FirewallSNAT::plural(&()));
        assert_eq!(SdewanKind::FirewallDnat.plural(), FirewallDNAT::plural(&()));
    }

    #[test]
    fn test_parse_round_trips_every_kind() {
        for kind in SdewanKind::ALL {
            assert_eq!(kind.as_str().parse::<SdewanKind>().unwrap(), kind);
        }
    }

    #[test]
    fn test_parse_rejects_unknown_and_wrong_case() {
        for name in ["Unknown", "Pod", "firewallzone", "FirewallSnat", ""] {
            let err = name.parse::<SdewanKind>().unwrap_err();
            assert_eq!(err, ReviewError::UnsupportedKind(name.to_string()));
        }
    }

    #[test]
    fn test_decode_every_kind() {
        for kind in SdewanKind::ALL {
            let snapshot = kind.decode(&payload(kind, Some("cnf1"))).unwrap();
            assert_eq!(snapshot.label("sdewanPurpose"), "cnf1");
        }
    }

    fn realistic_spec(kind: SdewanKind) -> serde_json::Value {
        match kind {
            SdewanKind::Mwan3Policy => json!({
                "members": [
                    { "network": "ovn-net1", "metric": 2, "weight": "3" },
                    { "network": "ovn-net2", "metric": "2", "weight": 2 }
                ]
            }),
            SdewanKind::Mwan3Rule => json!({
                "policy": "balance1",
                "src_ip": "10.10.10.0/24",
                "dest_ip": "0.0.0.0/0",
                "proto": "all",
                "family": "ipv4",
                "sticky": "1",
                "timeout": "600"
            }),
            SdewanKind::FirewallZone => json!({
                "network": ["ovn-network", "wan"],
                "input": "ACCEPT",
                "output": "ACCEPT",
                "forward": "REJECT",
                "masq": "1",
                "mtu_fix": 1
            }),
            SdewanKind::FirewallForwarding => json!({ "src": "lan", "dest": "wan" }),
            SdewanKind::FirewallRule => json!({
                "src": "wan",
                "src_ip": "192.168.1.2",
                "dest_port": 22,
                "proto": "tcp",
                "target": "REJECT",
                "icmp_type": ["echo-request"],
                "enabled": true
            }),
            SdewanKind::FirewallSnat => json!({
                "src": "lan",
                "src_dip": "192.168.1.1",
                "dest": "wan",
                "proto": "icmp",
                "reflection": false
            }),
            SdewanKind::FirewallDnat => json!({
                "src": "wan",
                "src_dport": 19900,
                "dest": "lan",
                "dest_ip": "192.168.1.1",
                "dest_port": "22",
                "proto": "tcp"
            }),
        }
    }

    #[test]
    fn test_decode_realistic_spec_every_kind() {
        for kind in SdewanKind::ALL {
            let payload = serde_json::to_vec(&json!({
                "apiVersion": "batch.sdewan.akraino.org/v1alpha1",
                "kind": kind.as_str(),
                "metadata": {
                    "name": "sample",
                    "namespace": "default",
                    "labels": { "sdewanPurpose": "cnf1" },
                    "resourceVersion": "1024",
                    "generation": 3
                },
                "spec": realistic_spec(kind),
                "status": { "appliedVersion": "2", "inSync": true }
            }))
            .unwrap();

            let snapshot = kind
                .decode(&payload)
                .unwrap_or_else(|e| panic!("{} failed to decode: {}", kind, e));
            assert_eq!(snapshot.label("sdewanPurpose"), "cnf1");
        }
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(SdewanKind::FirewallRule.decode(b"").is_err());
        assert!(SdewanKind::FirewallRule.decode(b"{not json").is_err());
        let wrong_spec = br#"{"metadata":{"name":"x"},"spec":5}"#;
        assert!(SdewanKind::FirewallRule.decode(wrong_spec).is_err());
    }

    #[test]
    fn test_decode_pair_snapshots_are_independent() {
        let kind = SdewanKind::FirewallZone;
        let (old, new) =
            decode_pair(kind, &payload(kind, Some("voice")), &payload(kind, Some("data")))
                .unwrap();
        assert_eq!(old.label("sdewanPurpose"), "voice");
        assert_eq!(new.label("sdewanPurpose"), "data");
    }

    #[test]
    fn test_decode_pair_reports_both_failures() {
        let failure = decode_pair(SdewanKind::Mwan3Rule, b"", b"[]").err().unwrap();
        assert!(failure.old.is_some());
        assert!(failure.new.is_some());
    }

    #[test]
    fn test_decode_pair_reports_one_side() {
        let kind = SdewanKind::Mwan3Rule;
        let failure = decode_pair(kind, &payload(kind, None), b"{")
            .err()
            .unwrap();
        assert!(failure.old.is_none());
        assert!(failure.new.is_some());
    }
}
