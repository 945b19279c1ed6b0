//! FinBot Core - Domain entities, services, and traits.
//!
//! This crate contains the business logic behind the FinBot assistant: the
//! per-user finance records, the in-memory request rate limiter, and the
//! financial context builder that summarizes a user's data for the LLM.
//! It is database-agnostic and defines traits that are implemented by the
//! `storage-sqlite` crate.

pub mod budgets;
pub mod constants;
pub mod errors;
pub mod goals;
pub mod insights;
pub mod portfolio;
pub mod rate_limit;
pub mod transactions;
pub mod users;
pub mod utils;

// Re-export error types
pub use errors::Error;
pub use errors::Result;

#[cfg(test)]
pub(crate) mod test_support;
