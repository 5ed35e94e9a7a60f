//! [`ExpenseViewModel`] — observable state for the expense screens.
//!
//! One state value carries the list triple, the running monthly total, the
//! last mutation's confirmation notice and the view-side filters. Mutations
//! refresh both the list and the total before they settle, so the two never
//! drift apart on screen.

use chrono::{Datelike, Utc};
use tokio::sync::watch;

use agora_core::{state::ViewState, store::DocumentStore, Result};

use crate::{
  model::{Expense, NewExpense},
  repository::ExpenseRepository,
};

// ─── State ───────────────────────────────────────────────────────────────────

/// View-side filters. `None` means unfiltered; filtering never reaches the
/// store.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExpenseFilter {
  pub category: Option<String>,
  /// Calendar `(year, month)` of the expense date.
  pub month:    Option<(i32, u32)>,
}

/// Observable output of the expense screens.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExpensesState {
  pub list:          ViewState<Expense>,
  /// Sum for the current calendar month, refreshed alongside the list.
  pub monthly_total: f64,
  /// Short confirmation of the last mutation, until cleared.
  pub notice:        Option<String>,
  pub filter:        ExpenseFilter,
}

impl ExpensesState {
  /// The loaded list with the view-side filters applied.
  pub fn filtered(&self) -> Vec<Expense> {
    self
      .list
      .items
      .iter()
      .filter(|expense| match &self.filter.category {
        Some(category) => expense.category == *category,
        None => true,
      })
      .filter(|expense| match self.filter.month {
        Some((year, month)) => {
          expense.date.year() == year && expense.date.month() == month
        }
        None => true,
      })
      .cloned()
      .collect()
  }
}

// ─── View-model ──────────────────────────────────────────────────────────────

/// View-model for the expense screens.
///
/// Mutation intents run the usual cycle: `begin` (loading up, stale error
/// and notice cleared), one repository call, then either a refresh of the
/// list plus the current month's total, or the error with the collection
/// kept.
pub struct ExpenseViewModel<S> {
  repo:  ExpenseRepository<S>,
  state: watch::Sender<ExpensesState>,
}

impl<S: DocumentStore> ExpenseViewModel<S> {
  pub fn new(repo: ExpenseRepository<S>) -> Self {
    let (state, _rx) = watch::channel(ExpensesState::default());
    Self { repo, state }
  }

  /// Subscribe to state changes.
  pub fn subscribe(&self) -> watch::Receiver<ExpensesState> {
    self.state.subscribe()
  }

  /// Snapshot of the current state.
  pub fn state(&self) -> ExpensesState {
    self.state.borrow().clone()
  }

  // ─── Loads ─────────────────────────────────────────────────────────────────

  /// Load the signed-in user's expenses.
  pub async fn load_expenses(&self) {
    self.state.send_modify(|s| s.list.begin());
    match self.repo.list_mine().await {
      Ok(expenses) => self.state.send_modify(|s| s.list.finish(expenses)),
      Err(e) => self.state.send_modify(|s| s.list.fail(e.to_string())),
    }
  }

  /// Recompute the total for the current calendar month (UTC). Does not
  /// touch the list or its loading flag.
  pub async fn load_monthly_total(&self) {
    let now = Utc::now();
    match self.repo.monthly_total(now.year(), now.month()).await {
      Ok(total) => self.state.send_modify(|s| s.monthly_total = total),
      Err(e) => self.state.send_modify(|s| s.list.fail(e.to_string())),
    }
  }

  // ─── Mutations ─────────────────────────────────────────────────────────────

  /// Record an expense, then refresh the list and the monthly total.
  pub async fn add(&self, input: NewExpense) {
    self.begin_mutation();
    let outcome = self.repo.add(input).await.map(|_id| ());
    self.settle_mutation(outcome, "expense added").await;
  }

  /// Rewrite an expense, then refresh the list and the monthly total.
  pub async fn update(&self, expense: &Expense) {
    self.begin_mutation();
    let outcome = self.repo.update(expense).await;
    self.settle_mutation(outcome, "expense updated").await;
  }

  /// Remove an expense, then refresh the list and the monthly total.
  pub async fn delete(&self, expense_id: &str) {
    self.begin_mutation();
    let outcome = self.repo.delete(expense_id).await;
    self.settle_mutation(outcome, "expense deleted").await;
  }

  // ─── Filters and notices ───────────────────────────────────────────────────

  /// Show only `category`. Pure view-side; the loaded list is untouched.
  pub fn set_category_filter(&self, category: impl Into<String>) {
    let category = category.into();
    self.state.send_modify(|s| s.filter.category = Some(category));
  }

  /// Show only expenses dated in calendar `(year, month)`.
  pub fn set_month_filter(&self, year: i32, month: u32) {
    self.state.send_modify(|s| s.filter.month = Some((year, month)));
  }

  /// Drop both filters.
  pub fn clear_filters(&self) {
    self.state.send_modify(|s| s.filter = ExpenseFilter::default());
  }

  /// Drop the last mutation's confirmation notice.
  pub fn clear_notice(&self) {
    self.state.send_modify(|s| s.notice = None);
  }

  // ─── Cycle ─────────────────────────────────────────────────────────────────

  fn begin_mutation(&self) {
    self.state.send_modify(|s| {
      s.list.begin();
      s.notice = None;
    });
  }

  /// On success refresh the list and the current month's total, then post
  /// the confirmation; on any failure publish the error and keep the
  /// collection.
  async fn settle_mutation(&self, outcome: Result<()>, notice: &str) {
    let refreshed = match outcome {
      Ok(()) => self.refresh().await,
      Err(e) => Err(e),
    };
    match refreshed {
      Ok((expenses, total)) => self.state.send_modify(|s| {
        s.list.finish(expenses);
        s.monthly_total = total;
        s.notice = Some(notice.to_owned());
      }),
      Err(e) => self.state.send_modify(|s| s.list.fail(e.to_string())),
    }
  }

  async fn refresh(&self) -> Result<(Vec<Expense>, f64)> {
    let expenses = self.repo.list_mine().await?;
    let now = Utc::now();
    let total = self.repo.monthly_total(now.year(), now.month()).await?;
    Ok((expenses, total))
  }
}
