use async_trait::async_trait;
use chrono::{NaiveDateTime, Utc};
use diesel::prelude::*;
use diesel::r2d2::{self, Pool};
use diesel::sqlite::SqliteConnection;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Arc;

use finbot_core::constants::UNCATEGORIZED_CATEGORY;
use finbot_core::errors::Error;
use finbot_core::transactions::{
    CategoryTotal, NewTransaction, Transaction, TransactionRepositoryTrait, TransactionType,
    TransactionUpdate,
};
use finbot_core::utils::decimal_utils::checked_sum;
use finbot_core::Result;

use super::model::TransactionDB;
use crate::db::{get_connection, run_blocking, WriteHandle};
use crate::errors::StorageError;
use crate::schema::transactions;
use crate::utils::{decimal_to_db, parse_decimal_tolerant};

pub struct TransactionRepository {
    pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
    writer: WriteHandle,
}

impl TransactionRepository {
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
    transaction_id: &str,
) -> Result<TransactionDB> {
    transactions::table
        .filter(transactions::id.eq(transaction_id))
        .filter(transactions::user_id.eq(owner))
        .select(TransactionDB::as_select())
        .first::<TransactionDB>(conn)
        .optional()
        .map_err(StorageError::from)?
        .ok_or_else(|| Error::NotFound(format!("Transaction {}", transaction_id)))
}

#[async_trait]
impl TransactionRepositoryTrait for TransactionRepository {
    async fn find_transactions_in_range(
        &self,
        user_id: &str,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<Transaction>> {
        let owner = user_id.to_string();
        run_blocking(&self.pool, move |conn| {
            let rows = transactions::table
                .filter(transactions::user_id.eq(owner))
                .filter(transactions::date.ge(start))
                .filter(transactions::date.le(end))
                .order(transactions::date.desc())
                .select(TransactionDB::as_select())
                .load::<TransactionDB>(conn)
                .map_err(StorageError::from)?;
            Ok(rows.into_iter().map(Transaction::from).collect())
        })
        .await
    }

    async fn sum_expenses_by_category(
        &self,
        user_id: &str,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<CategoryTotal>> {
        let owner = user_id.to_string();
        run_blocking(&self.pool, move |conn| {
            // Amounts are TEXT, so the sum happens here rather than in SQL.
            let rows = transactions::table
                .filter(transactions::user_id.eq(owner))
                .filter(transactions::transaction_type.eq(TransactionType::Expense.as_str()))
                .filter(transactions::date.ge(start))
                .filter(transactions::date.lt(end))
                .select((transactions::category, transactions::amount))
                .load::<(String, String)>(conn)
                .map_err(StorageError::from)?;

            let mut totals: HashMap<String, Decimal> = HashMap::new();
            for (category, amount) in rows {
                let key = if category.trim().is_empty() {
                    UNCATEGORIZED_CATEGORY.to_string()
                } else {
                    category
                };
                let total = totals.entry(key).or_insert(Decimal::ZERO);
                *total = checked_sum(*total, parse_decimal_tolerant(&amount, "amount"))?;
            }

            let mut result: Vec<CategoryTotal> = totals
                .into_iter()
                .map(|(category, total)| CategoryTotal { category, total })
                .collect();
            result.sort_by(|a, b| a.category.cmp(&b.category));
            Ok(result)
        })
        .await
    }

    fn list_transactions(&self, user_id: &str) -> Result<Vec<Transaction>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = transactions::table
            .filter(transactions::user_id.eq(user_id))
            .order((transactions::date.desc(), transactions::created_at.desc()))
            .select(TransactionDB::as_select())
            .load::<TransactionDB>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(rows.into_iter().map(Transaction::from).collect())
    }

    fn get_transaction(&self, user_id: &str, transaction_id: &str) -> Result<Transaction> {
        let mut conn = get_connection(&self.pool)?;
        find_owned(&mut conn, user_id, transaction_id).map(Transaction::from)
    }

    async fn create_transaction(&self, new_transaction: NewTransaction) -> Result<Transaction> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Transaction> {
                let now = Utc::now().naive_utc();
                let row = TransactionDB {
                    id: uuid::Uuid::now_v7().to_string(),
                    user_id: new_transaction.user_id,
                    transaction_type: new_transaction.transaction_type.as_str().to_string(),
                    category: new_transaction.category,
                    amount: decimal_to_db(new_transaction.amount),
                    date: new_transaction.date.unwrap_or(now),
                    description: new_transaction.description,
                    created_at: now,
                    updated_at: now,
                };
                diesel::insert_into(transactions::table)
                    .values(&row)
                    .execute(conn)
                    .map_err(StorageError::from)?;
                Ok(Transaction::from(row))
            })
            .await
    }

    async fn update_transaction(
        &self,
        user_id: &str,
        transaction_id: &str,
        update: TransactionUpdate,
    ) -> Result<Transaction> {
        let owner = user_id.to_string();
        let target = transaction_id.to_string();
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Transaction> {
                let mut row = find_owned(conn, &owner, &target)?;
                if let Some(kind) = update.transaction_type {
                    row.transaction_type = kind.as_str().to_string();
                }
                if let Some(category) = update.category {
                    row.category = category;
                }
                if let Some(amount) = update.amount {
                    row.amount = decimal_to_db(amount);
                }
                if let Some(date) = update.date {
                    row.date = date;
                }
                if let Some(description) = update.description {
                    row.description = Some(description);
                }
                row.updated_at = Utc::now().naive_utc();

                diesel::update(transactions::table.find(&row.id))
                    .set(&row)
                    .execute(conn)
                    .map_err(StorageError::from)?;
                Ok(Transaction::from(row))
            })
            .await
    }

    async fn delete_transaction(&self, user_id: &str, transaction_id: &str) -> Result<usize> {
        let owner = user_id.to_string();
        let target = transaction_id.to_string();
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<usize> {
                Ok(diesel::delete(
                    transactions::table
                        .filter(transactions::id.eq(target))
                        .filter(transactions::user_id.eq(owner)),
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
    use crate::test_support::{at, insert_user, setup};
    use rust_decimal_macros::dec;

    fn expense(user: &str, category: &str, amount: Decimal, date: NaiveDateTime) -> NewTransaction {
        NewTransaction {
            user_id: user.to_string(),
            transaction_type: TransactionType::Expense,
            category: category.to_string(),
            amount,
            date: Some(date),
            description: None,
        }
    }

    #[tokio::test]
    async fn range_query_is_inclusive_and_user_scoped() {
        let ctx = setup();
        insert_user(&ctx, "u1");
        insert_user(&ctx, "u2");
        let repo = TransactionRepository::new(ctx.pool.clone(), ctx.writer.clone());

        repo.create_transaction(expense("u1", "Food", dec!(100), at(2026, 10, 1))).await.unwrap();
        repo.create_transaction(expense("u1", "Food", dec!(50), at(2026, 10, 16))).await.unwrap();
        repo.create_transaction(expense("u1", "Food", dec!(25), at(2026, 9, 1))).await.unwrap();
        repo.create_transaction(expense("u2", "Food", dec!(999), at(2026, 10, 5))).await.unwrap();

        let found = repo
            .find_transactions_in_range("u1", at(2026, 10, 1), at(2026, 10, 16))
            .await
            .unwrap();
        assert_eq!(found.len(), 2);
        assert!(found.iter().all(|t| t.user_id == "u1"));
    }

    #[tokio::test]
    async fn category_sums_skip_income_and_exclusive_end() {
        let ctx = setup();
        insert_user(&ctx, "u1");
        let repo = TransactionRepository::new(ctx.pool.clone(), ctx.writer.clone());

        repo.create_transaction(expense("u1", "Food", dec!(100000), at(2026, 10, 2))).await.unwrap();
        repo.create_transaction(expense("u1", "Food", dec!(50000.5), at(2026, 10, 3))).await.unwrap();
        repo.create_transaction(expense("u1", "Transport", dec!(20000), at(2026, 10, 4))).await.unwrap();
        repo.create_transaction(expense("u1", "Rent", dec!(10), at(2026, 11, 1))).await.unwrap();
        let mut salary = expense("u1", "Salary", dec!(500000), at(2026, 10, 1));
        salary.transaction_type = TransactionType::Income;
        repo.create_transaction(salary).await.unwrap();

        let start = at(2026, 10, 1).date().and_hms_opt(0, 0, 0).unwrap();
        let end = at(2026, 11, 1).date().and_hms_opt(12, 0, 0).unwrap();
        // End is exclusive: the Rent row sits exactly on it.
        let totals = repo.sum_expenses_by_category("u1", start, end).await.unwrap();
        assert_eq!(
            totals,
            vec![
                CategoryTotal { category: "Food".to_string(), total: dec!(150000.5) },
                CategoryTotal { category: "Transport".to_string(), total: dec!(20000) },
            ]
        );
    }

    #[tokio::test]
    async fn update_and_delete_are_owner_scoped() {
        let ctx = setup();
        insert_user(&ctx, "u1");
        insert_user(&ctx, "u2");
        let repo = TransactionRepository::new(ctx.pool.clone(), ctx.writer.clone());

        let created = repo
            .create_transaction(expense("u1", "Food", dec!(100), at(2026, 10, 1)))
            .await
            .unwrap();

        let err = repo
            .update_transaction("u2", &created.id, TransactionUpdate { amount: Some(dec!(1)), ..Default::default() })
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));

        let updated = repo
            .update_transaction("u1", &created.id, TransactionUpdate { amount: Some(dec!(75)), ..Default::default() })
            .await
            .unwrap();
        assert_eq!(updated.amount, dec!(75));
        assert_eq!(repo.get_transaction("u1", &created.id).unwrap().amount, dec!(75));

        assert_eq!(repo.delete_transaction("u2", &created.id).await.unwrap(), 0);
        assert_eq!(repo.delete_transaction("u1", &created.id).await.unwrap(), 1);
        assert!(repo.list_transactions("u1").unwrap().is_empty());
    }
}
