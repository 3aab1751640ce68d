use schemars::{schema_for, JsonSchema};
use serde_json::Value;

use crate::model::{IcpReport, OutreachDraft};

/// JSON Schema for `T`, sent as the model's `responseJsonSchema`. Derived
/// from the serde types, so the contract and the parser cannot drift.
pub fn response_schema<T: JsonSchema>() -> Value {
    let mut schema = schema_for!(T).to_value();
    if let Some(root) = schema.as_object_mut() {
        root.remove("$schema");
    }
    schema
}

pub fn icp_schema() -> Value {
    response_schema::<IcpReport>()
}

pub fn refinement_schema() -> Value {
    response_schema::<OutreachDraft>()
}
