//! Portfolio holding domain models.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::constants::OTHER_HOLDING_TYPE;
use crate::errors::{Error, Result};
use crate::utils::decimal_utils::checked_product;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum HoldingType {
    Stock,
    Crypto,
    Fund,
    Property,
    Bond,
    Other,
}

impl HoldingType {
    pub fn as_str(&self) -> &'static str {
        match self {
            HoldingType::Stock => "stock",
            HoldingType::Crypto => "crypto",
            HoldingType::Fund => "fund",
            HoldingType::Property => "property",
            HoldingType::Bond => "bond",
            HoldingType::Other => OTHER_HOLDING_TYPE,
        }
    }
}

impl fmt::Display for HoldingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HoldingType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "stock" => Ok(HoldingType::Stock),
            "crypto" => Ok(HoldingType::Crypto),
            "fund" => Ok(HoldingType::Fund),
            "property" => Ok(HoldingType::Property),
            "bond" => Ok(HoldingType::Bond),
            "other" => Ok(HoldingType::Other),
            other => Err(Error::invalid_input(format!("Unknown holding type '{}'", other))),
        }
    }
}

/// Domain model representing an investment holding.
///
/// `holding_type` is kept as free text since rows written by older clients may
/// carry an empty type; those are bucketed as `other` in summaries.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioHolding {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub holding_type: String,
    pub symbol: Option<String>,
    pub quantity: Decimal,
    pub purchase_price: Option<Decimal>,
    pub current_value: Decimal,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl PortfolioHolding {
    /// `current_value * quantity`
    pub fn market_value(&self) -> Result<Decimal> {
        checked_product(self.current_value, self.quantity)
    }

    /// `purchase_price * quantity`, falling back to the current value when no
    /// purchase price was recorded.
    pub fn cost_basis(&self) -> Result<Decimal> {
        checked_product(
            self.purchase_price.unwrap_or(self.current_value),
            self.quantity,
        )
    }

    /// Allocation bucket name; empty types map to `other`.
    pub fn allocation_key(&self) -> &str {
        let trimmed = self.holding_type.trim();
        if trimmed.is_empty() {
            OTHER_HOLDING_TYPE
        } else {
            trimmed
        }
    }
}

/// Input model for creating a new holding
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPortfolioHolding {
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub name: String,
    pub holding_type: HoldingType,
    pub symbol: Option<String>,
    pub quantity: Decimal,
    pub purchase_price: Option<Decimal>,
    pub current_value: Decimal,
}

/// Partial update for an existing holding
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioHoldingUpdate {
    pub name: Option<String>,
    pub holding_type: Option<HoldingType>,
    pub symbol: Option<String>,
    pub quantity: Option<Decimal>,
    pub purchase_price: Option<Decimal>,
    pub current_value: Option<Decimal>,
}

impl PortfolioHoldingUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.holding_type.is_none()
            && self.symbol.is_none()
            && self.quantity.is_none()
            && self.purchase_price.is_none()
            && self.current_value.is_none()
    }
}
