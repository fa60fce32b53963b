//! Label immutability policy.
//!
//! Compares the protected label between the old and new snapshot of an
//! UPDATE. A label that is missing reads as the empty string, so adding the
//! label to an object created without it is a change as well.

use std::collections::BTreeMap;

use kube::Resource;

use super::Verdict;

/// Label that must keep its value for the lifetime of an SDEWAN resource
pub const PURPOSE_LABEL: &str = "sdewanPurpose";

/// Read access to a resource's metadata labels.
///
/// Implemented for every `kube::Resource`, which covers all SDEWAN kinds.
pub trait HasLabels {
    /// The `metadata.labels` map, if the object has one
    fn label_map(&self) -> Option<&BTreeMap<String, String>>;

    /// Value of `key`, or `""` when the label (or the whole map) is absent
    fn label(&self, key: &str) -> &str {
        self.label_map()
            .and_then(|labels| labels.get(key))
            .map(String::as_str)
            .unwrap_or("")
    }
}

impl<K: Resource> HasLabels for K {
    fn label_map(&self) -> Option<&BTreeMap<String, String>> {
        self.meta().labels.as_ref()
    }
}

/// Deny the update if `label_key` differs between `old` and `new`
pub fn validate(label_key: &str, old: &dyn HasLabels, new: &dyn HasLabels) -> Verdict {
    if old.label(label_key) != new.label(label_key) {
        return Verdict::denied(format!("label of {} is immutable", label_key));
    }

    Verdict::Allowed
}
