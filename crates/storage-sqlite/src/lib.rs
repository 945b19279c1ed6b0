//! SQLite storage implementation for FinBot.
//!
//! This crate provides all database-related functionality using Diesel ORM with SQLite.
//! It implements the repository traits defined in `finbot-core` and `finbot-ai` and contains:
//! - Database connection pooling and management
//! - Diesel migrations
//! - Repository implementations for all domain entities
//! - Database-specific model types (with Diesel derives)
//!
//! # Architecture
//!
//! This crate is the only place in the application where Diesel dependencies exist.
//! The other crates (`core`, `ai`) are database-agnostic and work with traits.
//!
//! ```text
//! core (domain)            ai (chat)
//!       │                      │
//!       └──────────┬───────────┘
//!                  │
//!                  ▼
//!          storage-sqlite (this crate)
//!                  │
//!                  ▼
//!              SQLite DB
//! ```

pub mod db;
pub mod errors;
pub mod schema;
pub mod utils;

// Repository implementations
pub mod budgets;
pub mod conversations;
pub mod goals;
pub mod portfolio;
pub mod transactions;
pub mod users;

#[cfg(test)]
pub(crate) mod test_support;

// Re-export database utilities
pub use db::{
    create_pool, get_connection, init, run_blocking, run_migrations, spawn_writer, DbConnection,
    DbPool, WriteHandle,
};

// Re-export storage errors and conversion helpers
pub use errors::{IntoCore, StorageError};

// Re-export repositories
pub use budgets::BudgetRepository;
pub use conversations::ConversationRepository;
pub use goals::GoalRepository;
pub use portfolio::PortfolioRepository;
pub use transactions::TransactionRepository;
pub use users::UserRepository;

// Re-export from finbot-core for convenience
pub use finbot_core::errors::{DatabaseError, Error, Result};
