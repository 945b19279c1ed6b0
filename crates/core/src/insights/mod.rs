//! Insights module - aggregates a user's finances into a summary for the assistant.

mod context_format;
mod insights_model;
mod insights_service;
mod insights_traits;

pub use context_format::{format_financial_context, format_idr};
pub use insights_model::{
    BudgetSummary, CategorySummary, CategoryTrend, FinancialOverview, FinancialSummary,
    GoalSummary, PortfolioSummary,
};
pub use insights_service::FinancialContextBuilder;
pub use insights_traits::FinancialContextServiceTrait;
