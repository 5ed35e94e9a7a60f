//! The document value model shared by every backend.
//!
//! Documents are schemaless JSON objects addressed by `(collection, id)`.
//! Mutations are expressed as [`Patch`]es: ordered lists of per-field
//! operations. [`Patch::apply`] is the normative merge semantics: a backend
//! either runs it locally under a transaction (`agora-store-sqlite`) or
//! ships the ops to a server that implements the same rules
//! (`agora-store-rest`).

use serde_json::{Map, Value};

// ─── Documents ───────────────────────────────────────────────────────────────

/// Store-assigned identifier of a persisted document.
///
/// The empty string marks a record that has not been persisted yet. The
/// store mints the real id on [`add`](crate::store::DocumentStore::add) and
/// never reassigns it afterwards.
pub type DocumentId = String;

/// A schemaless record: an id plus a JSON object of fields.
///
/// The id lives next to the fields, not inside them; backends that keep an
/// `id` column (or an `id` JSON key) strip it when constructing a
/// `Document`.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
  pub id:     DocumentId,
  pub fields: Map<String, Value>,
}

impl Document {
  pub fn new(id: impl Into<DocumentId>, fields: Map<String, Value>) -> Self {
    Self { id: id.into(), fields }
  }
}

// ─── Patches ─────────────────────────────────────────────────────────────────

/// A single-field mutation.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldOp {
  /// Insert or replace the field.
  Set(Value),
  /// Append each element not already present, preserving the order of first
  /// insertion (set semantics). A missing or non-array field is replaced by
  /// a fresh array first.
  ArrayUnion(Vec<Value>),
  /// Remove every occurrence of each element. A missing or non-array field
  /// is left untouched.
  ArrayRemove(Vec<Value>),
}

/// An ordered list of field operations applied as one atomic unit.
///
/// Ordering matters: a later operation on a field observes the effect of an
/// earlier one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Patch {
  pub ops: Vec<(String, FieldOp)>,
}

impl Patch {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn is_empty(&self) -> bool {
    self.ops.is_empty()
  }

  /// Queue a [`FieldOp::Set`] of `value` on `field`.
  pub fn set(mut self, field: impl Into<String>, value: Value) -> Self {
    self.ops.push((field.into(), FieldOp::Set(value)));
    self
  }

  /// Queue a [`FieldOp::ArrayUnion`] of `values` on `field`.
  pub fn array_union(mut self, field: impl Into<String>, values: Vec<Value>) -> Self {
    self.ops.push((field.into(), FieldOp::ArrayUnion(values)));
    self
  }

  /// Queue a [`FieldOp::ArrayRemove`] of `values` on `field`.
  pub fn array_remove(mut self, field: impl Into<String>, values: Vec<Value>) -> Self {
    self.ops.push((field.into(), FieldOp::ArrayRemove(values)));
    self
  }

  /// Apply every operation, in order, to `fields`. Infallible: malformed
  /// targets are coerced (union) or skipped (remove) per the op docs.
  pub fn apply(&self, fields: &mut Map<String, Value>) {
    for (field, op) in &self.ops {
      match op {
        FieldOp::Set(value) => {
          fields.insert(field.clone(), value.clone());
        }
        FieldOp::ArrayUnion(values) => {
          let slot = fields
            .entry(field.clone())
            .or_insert_with(|| Value::Array(Vec::new()));
          if !slot.is_array() {
            *slot = Value::Array(Vec::new());
          }
          if let Value::Array(items) = slot {
            for value in values {
              if !items.contains(value) {
                items.push(value.clone());
              }
            }
          }
        }
        FieldOp::ArrayRemove(values) => {
          if let Some(Value::Array(items)) = fields.get_mut(field) {
            items.retain(|item| !values.contains(item));
          }
        }
      }
    }
  }
}

// ─── Queries ─────────────────────────────────────────────────────────────────

/// Comparison operator of a [`Filter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
  /// The field equals the value.
  Eq,
  /// The field is an array containing the value.
  ArrayContains,
}

/// A single-field query predicate, the only query shape the stores support.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
  pub field: String,
  pub op:    FilterOp,
  pub value: Value,
}

impl Filter {
  /// Match documents whose `field` equals `value`.
  pub fn field_eq(field: impl Into<String>, value: Value) -> Self {
    Self { field: field.into(), op: FilterOp::Eq, value }
  }

  /// Match documents whose array `field` contains `value`.
  pub fn array_contains(field: impl Into<String>, value: Value) -> Self {
    Self { field: field.into(), op: FilterOp::ArrayContains, value }
  }

  /// Evaluate the predicate against a document body. A missing field never
  /// matches; `ArrayContains` on a non-array never matches.
  pub fn matches(&self, fields: &Map<String, Value>) -> bool {
    match self.op {
      FilterOp::Eq => fields.get(&self.field) == Some(&self.value),
      FilterOp::ArrayContains => match fields.get(&self.field) {
        Some(Value::Array(items)) => items.contains(&self.value),
        _ => false,
      },
    }
  }
}
