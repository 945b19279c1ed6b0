//! Temporary databases for repository tests.

use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime, Utc};
use diesel::prelude::*;
use tempfile::TempDir;

use crate::db::{create_pool, get_connection, init, run_migrations, spawn_writer, DbPool, WriteHandle};
use crate::schema::users;
use crate::users::UserDB;

pub struct TestDb {
    // Dropping the directory deletes the database, so it lives as long as the pool.
    _dir: TempDir,
    pub pool: Arc<DbPool>,
    pub writer: WriteHandle,
}

/// Creates a migrated database in a fresh temp dir. Must run inside a Tokio runtime.
pub fn setup() -> TestDb {
    let dir = tempfile::tempdir().expect("tempdir");
    let db_path = dir.path().join("test.db");
    let db_path = init(db_path.to_str().expect("utf8 path")).expect("init");
    let pool = create_pool(&db_path).expect("pool");
    run_migrations(&pool).expect("migrations");
    let writer = spawn_writer((*pool).clone());
    TestDb {
        _dir: dir,
        pool,
        writer,
    }
}

/// Inserts a bare user row so foreign keys are satisfied.
pub fn insert_user(db: &TestDb, id: &str) {
    let mut conn = get_connection(&db.pool).expect("conn");
    let now = Utc::now().naive_utc();
    diesel::insert_into(users::table)
        .values(&UserDB {
            id: id.to_string(),
            name: id.to_string(),
            email: format!("{}@example.com", id),
            password_hash: "hash".to_string(),
            created_at: now,
            updated_at: now,
            bio: None,
            avatar: None,
        })
        .execute(&mut conn)
        .expect("insert user");
}

pub fn at(y: i32, m: u32, d: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .and_then(|date| date.and_hms_opt(12, 0, 0))
        .expect("valid date")
}
