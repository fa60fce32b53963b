//! Test fixtures and builder patterns for SDEWAN objects and admission reviews.

use std::collections::BTreeMap;

use sdewan_label_webhook::crd::SDEWAN_GROUP;
use sdewan_label_webhook::webhooks::{Operation, ReviewRequest, SdewanKind};
use serde_json::{Value, json};

/// Builder for SDEWAN resource objects in their JSON wire form.
///
/// # Example
/// ```
/// let object = SdewanObjectBuilder::new("FirewallZone")
///     .name("lan")
///     .label("sdewanPurpose", "cnf1")
///     .build();
/// ```
#[derive(Clone, Debug)]
pub struct SdewanObjectBuilder {
    kind: String,
    name: String,
    namespace: String,
    labels: Option<BTreeMap<String, String>>,
    spec: Value,
}

impl SdewanObjectBuilder {
    /// Create a new builder for the given kind.
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            name: "test".to_string(),
            namespace: "default".to_string(),
            labels: None,
            spec: json!({}),
        }
    }

    /// Set the object name.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Add a metadata label.
    pub fn label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels
            .get_or_insert_with(BTreeMap::new)
            .insert(key.into(), value.into());
        self
    }

    /// Add a metadata label only when `value` is set.
    pub fn maybe_label(self, key: &str, value: Option<&str>) -> Self {
        match value {
            Some(value) => self.label(key, value),
            None => self,
        }
    }

    /// Replace the spec.
    pub fn spec(mut self, spec: Value) -> Self {
        self.spec = spec;
        self
    }

    /// Build the object as JSON.
    pub fn build(self) -> Value {
        let mut metadata = json!({ "name": self.name, "namespace": self.namespace });
        if let Some(labels) = self.labels {
            metadata["labels"] = json!(labels);
        }
        json!({
            "apiVersion": format!("{}/v1alpha1", SDEWAN_GROUP),
            "kind": self.kind,
            "metadata": metadata,
            "spec": self.spec,
        })
    }

    /// Build the object as serialized bytes.
    pub fn to_bytes(self) -> Vec<u8> {
        serde_json::to_vec(&self.build()).unwrap()
    }
}

/// Builder for `admission.k8s.io/v1` AdmissionReview request bodies.
#[derive(Clone, Debug)]
pub struct AdmissionReviewBuilder {
    uid: String,
    group: String,
    kind: String,
    operation: String,
    object: Option<Value>,
    old_object: Option<Value>,
}

impl AdmissionReviewBuilder {
    /// Create an UPDATE review for `kind` in the SDEWAN group.
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            uid: "3a1d2c9e-6b1f-4c1e-9d55-2f4b1e0c7a10".to_string(),
            group: SDEWAN_GROUP.to_string(),
            kind: kind.into(),
            operation: "UPDATE".to_string(),
            object: None,
            old_object: None,
        }
    }

    pub fn uid(mut self, uid: impl Into<String>) -> Self {
        self.uid = uid.into();
        self
    }

    pub fn group(mut self, group: impl Into<String>) -> Self {
        self.group = group.into();
        self
    }

    pub fn operation(mut self, operation: impl Into<String>) -> Self {
        self.operation = operation.into();
        self
    }

    pub fn object(mut self, object: Value) -> Self {
        self.object = Some(object);
        self
    }

    pub fn old_object(mut self, old_object: Value) -> Self {
        self.old_object = Some(old_object);
        self
    }

    /// Build the review body.
    pub fn build(self) -> Value {
        let resource = self
            .kind
            .parse::<SdewanKind>()
            .map(|kind| kind.plural().to_string())
            .unwrap_or_else(|_| self.kind.to_lowercase());

        json!({
            "apiVersion": "admission.k8s.io/v1",
            "kind": "AdmissionReview",
            "request": {
                "uid": self.uid,
                "kind": { "group": self.group, "version": "v1alpha1", "kind": self.kind },
                "resource": { "group": self.group, "version": "v1alpha1", "resource": resource },
                "name": "test",
                "namespace": "default",
                "operation": self.operation,
                "userInfo": { "username": "system:serviceaccount:sdewan-system:controller" },
                "object": self.object,
                "oldObject": self.old_object,
                "dryRun": false
            }
        })
    }
}

/// Engine-level request for `kind` with the given snapshots.
pub fn review_request(
    kind: &str,
    operation: Operation,
    old_object: Vec<u8>,
    object: Vec<u8>,
) -> ReviewRequest {
    ReviewRequest {
        group: SDEWAN_GROUP.to_string(),
        kind: kind.to_string(),
        operation,
        old_object,
        object,
    }
}

/// UPDATE request whose snapshots differ only in the value of `label`.
pub fn label_update(
    kind: &str,
    label: &str,
    old_value: Option<&str>,
    new_value: Option<&str>,
) -> ReviewRequest {
    review_request(
        kind,
        Operation::Update,
        SdewanObjectBuilder::new(kind)
            .maybe_label(label, old_value)
            .to_bytes(),
        SdewanObjectBuilder::new(kind)
            .maybe_label(label, new_value)
            .to_bytes(),
    )
}
