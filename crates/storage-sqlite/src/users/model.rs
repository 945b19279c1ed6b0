//! Database models for users.

use chrono::NaiveDateTime;
use diesel::prelude::*;
use finbot_core::users::User;

/// Database model for users
#[derive(Queryable, Identifiable, Insertable, Selectable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::users)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct UserDB {
    pub id: String,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    pub bio: Option<String>,
    pub avatar: Option<String>,
}

impl From<UserDB> for User {
    fn from(db: UserDB) -> Self {
        Self {
            id: db.id,
            name: db.name,
            email: db.email,
            password_hash: db.password_hash,
            bio: db.bio,
            avatar: db.avatar,
            created_at: db.created_at,
            updated_at: db.updated_at,
        }
    }
}
