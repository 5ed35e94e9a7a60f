//! The stored shape of an expense.

use chrono::{DateTime, Utc};
use serde::{ser::Error as _, Deserialize, Serialize};
use serde_json::{Map, Value};

use agora_core::{auth::UserId, document::Document};

/// Categories offered by the filter UI. Stored categories are free text;
/// this list only bounds what the picker shows.
pub const CATEGORIES: &[&str] = &[
  "Food",
  "Transport",
  "Entertainment",
  "Health",
  "Education",
  "Housing",
  "Utilities",
  "Shopping",
  "Other",
];

/// A personal expense, as stored in the `expenses` collection. Decoding is
/// lenient; every field carries a serde default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
  /// Store-assigned id. Lives outside the document body.
  #[serde(skip)]
  pub id: String,

  /// Owner. Stamped on creation and never rewritten.
  #[serde(default)]
  pub user_id:     UserId,
  #[serde(default)]
  pub name:        String,
  #[serde(default)]
  pub amount:      f64,
  #[serde(default)]
  pub category:    String,
  #[serde(default = "Utc::now")]
  pub date:        DateTime<Utc>,
  #[serde(default)]
  pub description: String,
}

impl Expense {
  /// Encode into a document body. The id is not written into the fields.
  pub fn to_fields(&self) -> serde_json::Result<Map<String, Value>> {
    match serde_json::to_value(self)? {
      Value::Object(map) => Ok(map),
      _ => Err(serde_json::Error::custom("expense did not encode to an object")),
    }
  }

  /// Decode a stored document, attaching its store id.
  pub fn from_document(document: Document) -> serde_json::Result<Self> {
    let mut expense: Expense = serde_json::from_value(Value::Object(document.fields))?;
    expense.id = document.id;
    Ok(expense)
  }
}

/// Caller-supplied fields for [`add`](crate::ExpenseRepository::add). The
/// owner is stamped by the repository.
#[derive(Debug, Clone)]
pub struct NewExpense {
  pub name:        String,
  pub amount:      f64,
  pub category:    String,
  pub date:        DateTime<Utc>,
  pub description: String,
}
