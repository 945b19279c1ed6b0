//! Database models for portfolio holdings.

use chrono::NaiveDateTime;
use diesel::prelude::*;
use finbot_core::portfolio::PortfolioHolding;

use crate::utils::parse_decimal_tolerant;

/// Database model for portfolio holdings
#[derive(
    Queryable, Identifiable, Insertable, AsChangeset, Selectable, PartialEq, Debug, Clone,
)]
#[diesel(table_name = crate::schema::portfolio_holdings)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[diesel(treat_none_as_null = true)]
pub struct PortfolioHoldingDB {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub holding_type: String,
    pub symbol: Option<String>,
    pub quantity: String,
    pub purchase_price: Option<String>,
    pub current_value: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl From<PortfolioHoldingDB> for PortfolioHolding {
    fn from(db: PortfolioHoldingDB) -> Self {
        Self {
            quantity: parse_decimal_tolerant(&db.quantity, "quantity"),
            purchase_price: db
                .purchase_price
                .as_deref()
                .map(|p| parse_decimal_tolerant(p, "purchase_price")),
            current_value: parse_decimal_tolerant(&db.current_value, "current_value"),
            id: db.id,
            user_id: db.user_id,
            name: db.name,
            holding_type: db.holding_type,
            symbol: db.symbol,
            created_at: db.created_at,
            updated_at: db.updated_at,
        }
    }
}
