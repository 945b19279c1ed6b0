use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel::r2d2::{self, Pool};
use diesel::sqlite::SqliteConnection;
use std::sync::Arc;

use finbot_core::errors::Error;
use finbot_core::portfolio::{
    NewPortfolioHolding, PortfolioHolding, PortfolioHoldingUpdate, PortfolioRepositoryTrait,
};
use finbot_core::Result;

use super::model::PortfolioHoldingDB;
use crate::db::{get_connection, run_blocking, WriteHandle};
use crate::errors::StorageError;
use crate::schema::portfolio_holdings;
use crate::utils::decimal_to_db;

pub struct PortfolioRepository {
    pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
    writer: WriteHandle,
}

impl PortfolioRepository {
    pub fn new(
        pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
        writer: WriteHandle,
    ) -> Self {
        Self { pool, writer }
    }
}

fn find_owned(
    conn: &mut SqliteConnection,
    owner: &str,
    holding_id: &str,
) -> Result<PortfolioHoldingDB> {
    portfolio_holdings::table
        .filter(portfolio_holdings::id.eq(holding_id))
        .filter(portfolio_holdings::user_id.eq(owner))
        .select(PortfolioHoldingDB::as_select())
        .first::<PortfolioHoldingDB>(conn)
        .optional()
        .map_err(StorageError::from)?
        .ok_or_else(|| Error::NotFound(format!("Holding {}", holding_id)))
}

#[async_trait]
impl PortfolioRepositoryTrait for PortfolioRepository {
    async fn find_all_portfolio_holdings(&self, user_id: &str) -> Result<Vec<PortfolioHolding>> {
        let owner = user_id.to_string();
        run_blocking(&self.pool, move |conn| {
            let rows = portfolio_holdings::table
                .filter(portfolio_holdings::user_id.eq(owner))
                .order((portfolio_holdings::created_at.asc(), portfolio_holdings::id.asc()))
                .select(PortfolioHoldingDB::as_select())
                .load::<PortfolioHoldingDB>(conn)
                .map_err(StorageError::from)?;
            Ok(rows.into_iter().map(PortfolioHolding::from).collect())
        })
        .await
    }

    fn get_holding(&self, user_id: &str, holding_id: &str) -> Result<PortfolioHolding> {
        let mut conn = get_connection(&self.pool)?;
        find_owned(&mut conn, user_id, holding_id).map(PortfolioHolding::from)
    }

    async fn create_holding(&self, new_holding: NewPortfolioHolding) -> Result<PortfolioHolding> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<PortfolioHolding> {
                let now = Utc::now().naive_utc();
                let row = PortfolioHoldingDB {
                    id: uuid::Uuid::now_v7().to_string(),
                    user_id: new_holding.user_id,
                    name: new_holding.name,
                    holding_type: new_holding.holding_type.as_str().to_string(),
                    symbol: new_holding.symbol,
                    quantity: decimal_to_db(new_holding.quantity),
                    purchase_price: new_holding.purchase_price.map(decimal_to_db),
                    current_value: decimal_to_db(new_holding.current_value),
                    created_at: now,
                    updated_at: now,
                };
                diesel::insert_into(portfolio_holdings::table)
                    .values(&row)
                    .execute(conn)
                    .map_err(StorageError::from)?;
                Ok(PortfolioHolding::from(row))
            })
            .await
    }

    async fn update_holding(
        &self,
        user_id: &str,
        holding_id: &str,
        update: PortfolioHoldingUpdate,
    ) -> Result<PortfolioHolding> {
        let owner = user_id.to_string();
        let target = holding_id.to_string();
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<PortfolioHolding> {
                let mut row = find_owned(conn, &owner, &target)?;
                if let Some(name) = update.name {
                    row.name = name;
                }
                if let Some(holding_type) = update.holding_type {
                    row.holding_type = holding_type.as_str().to_string();
                }
                if let Some(symbol) = update.symbol {
                    row.symbol = Some(symbol);
                }
                if let Some(quantity) = update.quantity {
                    row.quantity = decimal_to_db(quantity);
                }
                if let Some(price) = update.purchase_price {
                    row.purchase_price = Some(decimal_to_db(price));
                }
                if let Some(value) = update.current_value {
                    row.current_value = decimal_to_db(value);
                }
                row.updated_at = Utc::now().naive_utc();

                diesel::update(portfolio_holdings::table.find(&row.id))
                    .set(&row)
                    .execute(conn)
                    .map_err(StorageError::from)?;
                Ok(PortfolioHolding::from(row))
            })
            .await
    }

    async fn delete_holding(&self, user_id: &str, holding_id: &str) -> Result<usize> {
        let owner = user_id.to_string();
        let target = holding_id.to_string();
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<usize> {
                Ok(diesel::delete(
                    portfolio_holdings::table
                        .filter(portfolio_holdings::id.eq(target))
                        .filter(portfolio_holdings::user_id.eq(owner)),
                )
                .execute(conn)
                .map_err(StorageError::from)?)
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{insert_user, setup};
    use finbot_core::portfolio::HoldingType;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn holdings_round_trip_with_optional_purchase_price() {
        let ctx = setup();
        insert_user(&ctx, "u1");
        insert_user(&ctx, "u2");
        let repo = PortfolioRepository::new(ctx.pool.clone(), ctx.writer.clone());

        let bbca = repo
            .create_holding(NewPortfolioHolding {
                user_id: "u1".to_string(),
                name: "Bank Central Asia".to_string(),
                holding_type: HoldingType::Stock,
                symbol: Some("BBCA".to_string()),
                quantity: dec!(100),
                purchase_price: Some(dec!(8500)),
                current_value: dec!(9200),
            })
            .await
            .unwrap();
        repo.create_holding(NewPortfolioHolding {
            user_id: "u1".to_string(),
            name: "Reksa Dana".to_string(),
            holding_type: HoldingType::Fund,
            symbol: None,
            quantity: dec!(1),
            purchase_price: None,
            current_value: dec!(5000000),
        })
        .await
        .unwrap();

        let holdings = repo.find_all_portfolio_holdings("u1").await.unwrap();
        assert_eq!(holdings.len(), 2);
        assert_eq!(holdings[0].holding_type, "stock");
        assert_eq!(holdings[0].cost_basis().unwrap(), dec!(850000));
        assert_eq!(holdings[1].purchase_price, None);
        assert!(repo.find_all_portfolio_holdings("u2").await.unwrap().is_empty());

        let updated = repo
            .update_holding(
                "u1",
                &bbca.id,
                PortfolioHoldingUpdate { current_value: Some(dec!(9500)), ..Default::default() },
            )
            .await
            .unwrap();
        assert_eq!(updated.market_value().unwrap(), dec!(950000));
        assert!(matches!(repo.get_holding("u2", &bbca.id), Err(Error::NotFound(_))));
        assert_eq!(repo.delete_holding("u1", &bbca.id).await.unwrap(), 1);
    }
}
