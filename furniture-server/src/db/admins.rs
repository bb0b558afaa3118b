//! Admin Repository

use super::{RepoError, RepoResult};
use shared::models::AdminProfile;
use sqlx::SqlitePool;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AdminRecord {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub hashed_password: String,
    pub created_at: i64,
}

impl AdminRecord {
    pub fn profile(&self) -> AdminProfile {
        AdminProfile {
            name: self.name.clone(),
            email: self.email.clone(),
            created_at: self.created_at,
        }
    }
}

pub async fn create(
    pool: &SqlitePool,
    id: i64,
    name: &str,
    email: &str,
    hashed_password: &str,
    now: i64,
) -> RepoResult<AdminRecord> {
    sqlx::query(
        "INSERT INTO admins (id, name, email, hashed_password, created_at) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(id)
    .bind(name)
    .bind(email)
    .bind(hashed_password)
    .bind(now)
    .execute(pool)
    .await?;

    find_by_email(pool, email)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to read back created admin".into()))
}

pub async fn find_by_email(pool: &SqlitePool, email: &str) -> RepoResult<Option<AdminRecord>> {
    let row = sqlx::query_as::<_, AdminRecord>(
        "SELECT id, name, email, hashed_password, created_at FROM admins WHERE email = ?",
    )
    .bind(email)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}
