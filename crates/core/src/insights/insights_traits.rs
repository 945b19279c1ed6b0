use chrono::{DateTime, Utc};

use crate::errors::Result;
use crate::insights::insights_model::FinancialSummary;
use async_trait::async_trait;

/// Trait for building a user's financial snapshot
#[async_trait]
pub trait FinancialContextServiceTrait: Send + Sync {
    async fn get_financial_summary(&self, user_id: &str) -> Result<FinancialSummary>;
    async fn get_financial_summary_at(
        &self,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> Result<FinancialSummary>;
    /// The summary rendered as a prompt block for the assistant.
    async fn build_financial_context(&self, user_id: &str) -> Result<String>;
}
