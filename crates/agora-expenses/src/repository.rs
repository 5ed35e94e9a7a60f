//! [`ExpenseRepository`] — normalized access to the `expenses` collection.
//!
//! Expenses are private per user: every read is scoped by `user_id`.
//! Writes carry no client-side owner guard; the backend's row rules are
//! the authority on who may touch a record.

use std::{cmp::Reverse, sync::Arc};

use chrono::Datelike;
use serde_json::json;

use agora_core::{
  auth::AuthUser,
  document::{Document, Filter, Patch},
  session::Session,
  store::DocumentStore,
  Error, Result,
};

use crate::model::{Expense, NewExpense};

const COLLECTION: &str = "expenses";

/// Data access for the expense tracker, generic over the storage backend.
pub struct ExpenseRepository<S> {
  store:   Arc<S>,
  session: Session,
}

impl<S> Clone for ExpenseRepository<S> {
  fn clone(&self) -> Self {
    Self { store: Arc::clone(&self.store), session: self.session.clone() }
  }
}

impl<S: DocumentStore> ExpenseRepository<S> {
  pub fn new(store: Arc<S>, session: Session) -> Self {
    Self { store, session }
  }

  /// Record a new expense owned by the signed-in user; returns the new id.
  pub async fn add(&self, input: NewExpense) -> Result<String> {
    let user = self.require_user()?;

    let expense = Expense {
      id:          String::new(),
      user_id:     user.uid,
      name:        input.name,
      amount:      input.amount,
      category:    input.category,
      date:        input.date,
      description: input.description,
    };

    let fields = expense.to_fields().map_err(|e| Error::Store(Box::new(e)))?;
    self
      .store
      .add(COLLECTION, fields)
      .await
      .map_err(|e| Error::Store(Box::new(e)))
  }

  /// The signed-in user's expenses, newest first.
  pub async fn list_mine(&self) -> Result<Vec<Expense>> {
    let user = self.require_user()?;
    let filter = Filter::field_eq("user_id", json!(user.uid));
    let documents = self
      .store
      .query(COLLECTION, &filter)
      .await
      .map_err(|e| Error::Store(Box::new(e)))?;

    let mut expenses = decode_list(documents);
    expenses.sort_by_key(|expense| Reverse(expense.date));
    Ok(expenses)
  }

  /// Rewrite the editable fields of `expense`, addressed by its id. The
  /// owner field passes through unchanged.
  pub async fn update(&self, expense: &Expense) -> Result<()> {
    let patch = Patch::new()
      .set("name", json!(expense.name))
      .set("amount", json!(expense.amount))
      .set("category", json!(expense.category))
      .set("date", json!(expense.date))
      .set("description", json!(expense.description));

    self
      .store
      .update(COLLECTION, &expense.id, patch)
      .await
      .map_err(|e| Error::Store(Box::new(e)))
  }

  /// Remove an expense by id.
  pub async fn delete(&self, expense_id: &str) -> Result<()> {
    self
      .store
      .delete(COLLECTION, expense_id)
      .await
      .map_err(|e| Error::Store(Box::new(e)))
  }

  /// Sum of the signed-in user's expenses dated in the given calendar
  /// month.
  pub async fn monthly_total(&self, year: i32, month: u32) -> Result<f64> {
    let expenses = self.list_mine().await?;
    Ok(
      expenses
        .iter()
        .filter(|expense| expense.date.year() == year && expense.date.month() == month)
        .map(|expense| expense.amount)
        .sum(),
    )
  }

  fn require_user(&self) -> Result<AuthUser> {
    self.session.current_user().ok_or(Error::AuthRequired)
  }
}

/// Decode a fetched list. Undecodable records are skipped rather than
/// failing the whole list.
fn decode_list(documents: Vec<Document>) -> Vec<Expense> {
  documents
    .into_iter()
    .filter_map(|document| Expense::from_document(document).ok())
    .collect()
}
