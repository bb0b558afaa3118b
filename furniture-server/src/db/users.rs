//! User Repository

use super::{RepoError, RepoResult};
use shared::models::{LoginUser, UserProfile};
use sqlx::SqlitePool;

const USER_COLUMNS: &str = "id, name, email, hashed_password, phone, address, is_verified, email_otp, created_at, updated_at";

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserRecord {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub hashed_password: String,
    pub phone: String,
    pub address: String,
    pub is_verified: bool,
    pub email_otp: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl UserRecord {
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            name: self.name.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
            address: self.address.clone(),
            is_verified: self.is_verified,
            created_at: self.created_at,
        }
    }

    pub fn login_user(&self) -> LoginUser {
        LoginUser {
            name: self.name.clone(),
            email: self.email.clone(),
            created_at: self.created_at,
        }
    }
}

pub struct NewUser<'a> {
    pub id: i64,
    pub name: &'a str,
    pub email: &'a str,
    pub hashed_password: &'a str,
    pub phone: &'a str,
    pub address: &'a str,
    pub email_otp: i64,
    pub now: i64,
}

/// Insert an unverified user. A taken email surfaces as [`RepoError::Duplicate`].
pub async fn create(pool: &SqlitePool, user: &NewUser<'_>) -> RepoResult<UserRecord> {
    sqlx::query(
        "INSERT INTO users (id, name, email, hashed_password, phone, address, is_verified, email_otp, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, 0, ?7, ?8, ?8)",
    )
    .bind(user.id)
    .bind(user.name)
    .bind(user.email)
    .bind(user.hashed_password)
    .bind(user.phone)
    .bind(user.address)
    .bind(user.email_otp)
    .bind(user.now)
    .execute(pool)
    .await?;

    find_by_id(pool, user.id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to read back created user".into()))
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<UserRecord>> {
    let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?");
    let row = sqlx::query_as::<_, UserRecord>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

pub async fn find_by_email(pool: &SqlitePool, email: &str) -> RepoResult<Option<UserRecord>> {
    let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?");
    let row = sqlx::query_as::<_, UserRecord>(&sql)
        .bind(email)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

/// Unverified users currently holding `otp`
pub async fn find_pending_by_otp(pool: &SqlitePool, otp: i64) -> RepoResult<Vec<UserRecord>> {
    let sql = format!(
        "SELECT {USER_COLUMNS} FROM users WHERE email_otp = ? AND is_verified = 0 LIMIT 2"
    );
    let rows = sqlx::query_as::<_, UserRecord>(&sql)
        .bind(otp)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

pub async fn otp_in_use(pool: &SqlitePool, otp: i64) -> RepoResult<bool> {
    let found: Option<(i64,)> =
        sqlx::query_as("SELECT 1 FROM users WHERE email_otp = ? AND is_verified = 0 LIMIT 1")
            .bind(otp)
            .fetch_optional(pool)
            .await?;
    Ok(found.is_some())
}

/// Flip to verified and clear the OTP, only if `otp` still matches.
///
/// Returns false when another request consumed the OTP first.
pub async fn consume_otp(pool: &SqlitePool, id: i64, otp: i64, now: i64) -> RepoResult<bool> {
    let result = sqlx::query(
        "UPDATE users SET is_verified = 1, email_otp = NULL, updated_at = ?
         WHERE id = ? AND email_otp = ? AND is_verified = 0",
    )
    .bind(now)
    .bind(id)
    .bind(otp)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() == 1)
}

pub async fn set_otp(pool: &SqlitePool, id: i64, otp: i64, now: i64) -> RepoResult<()> {
    let result = sqlx::query(
        "UPDATE users SET email_otp = ?, updated_at = ? WHERE id = ? AND is_verified = 0",
    )
    .bind(otp)
    .bind(now)
    .bind(id)
    .execute(pool)
    .await?;
    if result.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("pending user {id}")));
    }
    Ok(())
}

pub async fn update_profile(
    pool: &SqlitePool,
    id: i64,
    name: &str,
    phone: Option<&str>,
    address: Option<&str>,
    now: i64,
) -> RepoResult<UserRecord> {
    let result = sqlx::query(
        "UPDATE users SET name = ?1, phone = COALESCE(?2, phone), address = COALESCE(?3, address), updated_at = ?4
         WHERE id = ?5",
    )
    .bind(name)
    .bind(phone)
    .bind(address)
    .bind(now)
    .bind(id)
    .execute(pool)
    .await?;
    if result.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("user {id}")));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("user {id}")))
}

pub async fn update_password(
    pool: &SqlitePool,
    id: i64,
    hashed_password: &str,
    now: i64,
) -> RepoResult<()> {
    sqlx::query("UPDATE users SET hashed_password = ?, updated_at = ? WHERE id = ?")
        .bind(hashed_password)
        .bind(now)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn count(pool: &SqlitePool) -> RepoResult<i64> {
    let (n,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
        .fetch_one(pool)
        .await?;
    Ok(n)
}
