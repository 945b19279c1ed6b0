use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel::r2d2::{self, Pool};
use diesel::sqlite::SqliteConnection;
use std::sync::Arc;

use finbot_core::errors::{DatabaseError, Error};
use finbot_core::users::{NewUser, ProfileUpdate, User, UserRepositoryTrait};
use finbot_core::Result;

use super::model::UserDB;
use crate::db::{get_connection, WriteHandle};
use crate::errors::{IntoCore, StorageError};
use crate::schema::users;

pub struct UserRepository {
    pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
    writer: WriteHandle,
}

impl UserRepository {
    pub fn new(
        pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
        writer: WriteHandle,
    ) -> Self {
        Self { pool, writer }
    }
}

#[async_trait]
impl UserRepositoryTrait for UserRepository {
    fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let mut conn = get_connection(&self.pool)?;
        let normalized = email.trim().to_lowercase();
        let user = users::table
            .filter(users::email.eq(normalized))
            .select(UserDB::as_select())
            .first::<UserDB>(&mut conn)
            .optional()
            .into_core()?;
        Ok(user.map(User::from))
    }

    fn get_by_id(&self, user_id: &str) -> Result<User> {
        let mut conn = get_connection(&self.pool)?;
        let user = users::table
            .find(user_id)
            .select(UserDB::as_select())
            .first::<UserDB>(&mut conn)
            .optional()
            .into_core()?;
        user.map(User::from)
            .ok_or_else(|| Error::NotFound(format!("User {}", user_id)))
    }

    async fn create_user(&self, new_user: NewUser) -> Result<User> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<User> {
                let email = new_user.normalized_email();
                let taken = users::table
                    .filter(users::email.eq(&email))
                    .count()
                    .get_result::<i64>(conn)
                    .map_err(StorageError::from)?;
                if taken > 0 {
                    return Err(Error::ConstraintViolation(
                        "Email already registered".to_string(),
                    ));
                }

                let now = Utc::now().naive_utc();
                let user_db = UserDB {
                    id: uuid::Uuid::now_v7().to_string(),
                    name: new_user.name.trim().to_string(),
                    email,
                    password_hash: new_user.password_hash,
                    created_at: now,
                    updated_at: now,
                    bio: None,
                    avatar: None,
                };

                diesel::insert_into(users::table)
                    .values(&user_db)
                    .execute(conn)
                    .map_err(|e| match Error::from(StorageError::from(e)) {
                        Error::Database(DatabaseError::UniqueViolation(msg)) => {
                            Error::ConstraintViolation(msg)
                        }
                        other => other,
                    })?;

                Ok(User::from(user_db))
            })
            .await
    }

    async fn update_profile(&self, user_id: &str, update: ProfileUpdate) -> Result<User> {
        let target = user_id.to_string();
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<User> {
                let mut row = users::table
                    .find(&target)
                    .select(UserDB::as_select())
                    .first::<UserDB>(conn)
                    .optional()
                    .into_core()?
                    .ok_or_else(|| Error::NotFound(format!("User {}", target)))?;

                if let Some(name) = update.name {
                    row.name = name;
                }
                if let Some(bio) = update.bio {
                    row.bio = Some(bio).filter(|b| !b.is_empty());
                }
                if let Some(avatar) = update.avatar {
                    row.avatar = Some(avatar).filter(|a| !a.is_empty());
                }
                row.updated_at = Utc::now().naive_utc();

                diesel::update(users::table.find(&row.id))
                    .set((
                        users::name.eq(&row.name),
                        users::bio.eq(&row.bio),
                        users::avatar.eq(&row.avatar),
                        users::updated_at.eq(row.updated_at),
                    ))
                    .execute(conn)
                    .map_err(StorageError::from)?;
                Ok(User::from(row))
            })
            .await
    }
}
