//! Client data layer for the personal expense tracker.
//!
//! Same architecture as the events app: a serde model, a repository
//! normalizing store outcomes, and a view-model publishing observable
//! screen state. Expenses are strictly per-user: every list and total is
//! scoped to the signed-in user.

pub mod model;
pub mod repository;
pub mod view_model;

pub use model::{Expense, NewExpense, CATEGORIES};
pub use repository::ExpenseRepository;
pub use view_model::{ExpenseFilter, ExpenseViewModel, ExpensesState};
