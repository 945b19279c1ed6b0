//! SQLite storage implementation for monthly budgets.

mod model;
mod repository;

pub use model::BudgetDB;
pub use repository::BudgetRepository;
