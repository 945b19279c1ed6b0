//! SQLite storage implementation for portfolio holdings.

mod model;
mod repository;

pub use model::PortfolioHoldingDB;
pub use repository::PortfolioRepository;
