//! Operation gate.
//!
//! Only UPDATE carries meaning for label immutability. Every other operation
//! reaching this endpoint is denied outright, before any payload is decoded.

use kube::core::admission::Operation;

use super::Verdict;

/// Wire name of an operation (`CREATE`, `UPDATE`, ...)
pub fn operation_name(operation: &Operation) -> String {
    format!("{:?}", operation).to_uppercase()
}

/// Allow only UPDATE through to the label check
pub fn validate(operation: &Operation) -> Verdict {
    if *operation == Operation::Update {
        return Verdict::Allowed;
    }

    Verdict::denied(format!(
        "operation type {} is not supported",
        operation_name(operation)
    ))
}
