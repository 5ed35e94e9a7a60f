//! Encoding between core document types and the backend's wire shapes.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use serde::Serialize;
use serde_json::{Map, Value};

use agora_core::document::{Document, FieldOp, Filter, FilterOp, Patch};

/// One patch op in the shape the `apply_patch` RPC expects.
#[derive(Debug, Serialize)]
pub struct WireOp {
  pub field: String,
  pub op:    &'static str,
  pub value: Value,
}

/// Encode a [`Patch`] for the `apply_patch` RPC, preserving op order.
pub fn patch_ops(patch: &Patch) -> Vec<WireOp> {
  patch
    .ops
    .iter()
    .map(|(field, op)| match op {
      FieldOp::Set(value) => WireOp {
        field: field.clone(),
        op:    "set",
        value: value.clone(),
      },
      FieldOp::ArrayUnion(values) => WireOp {
        field: field.clone(),
        op:    "array_union",
        value: Value::Array(values.clone()),
      },
      FieldOp::ArrayRemove(values) => WireOp {
        field: field.clone(),
        op:    "array_remove",
        value: Value::Array(values.clone()),
      },
    })
    .collect()
}

/// Encode a [`Filter`] as a query parameter pair. `Eq` maps to `eq.`,
/// `ArrayContains` to `cs.` with a one-element array literal.
pub fn filter_pair(filter: &Filter) -> (String, String) {
  let value = match filter.op {
    FilterOp::Eq => match &filter.value {
      Value::String(s) => format!("eq.{s}"),
      other => format!("eq.{other}"),
    },
    FilterOp::ArrayContains => match &filter.value {
      Value::String(s) => format!("cs.{{\"{s}\"}}"),
      other => format!("cs.{{{other}}}"),
    },
  };
  (filter.field.clone(), value)
}

/// Strip the `id` column out of a row and build a [`Document`].
pub fn into_document(mut row: Map<String, Value>) -> Document {
  let id = match row.remove("id") {
    Some(Value::String(id)) => id,
    Some(other) => other.to_string(),
    None => String::new(),
  };
  Document::new(id, row)
}

/// Length-and-digest summary of a response body, safe for logs and error
/// chains.
pub fn summarize_body(body: &str) -> String {
  let mut hasher = DefaultHasher::new();
  body.hash(&mut hasher);
  format!("len={},digest={:016x}", body.len(), hasher.finish())
}
