//! Portfolio module - investment holdings tracked by value.

mod portfolio_model;
mod portfolio_service;
mod portfolio_traits;

pub use portfolio_model::{
    HoldingType, NewPortfolioHolding, PortfolioHolding, PortfolioHoldingUpdate,
};
pub use portfolio_service::PortfolioService;
pub use portfolio_traits::{PortfolioRepositoryTrait, PortfolioServiceTrait};
