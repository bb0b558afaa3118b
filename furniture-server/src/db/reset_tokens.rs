//! Password Reset Token Repository
//!
//! Only SHA-256 digests of tokens are stored.

use super::RepoResult;
use sqlx::SqlitePool;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ResetTokenRecord {
    pub token_hash: String,
    pub user_id: i64,
    pub expires_at: i64,
    pub created_at: i64,
}

/// Store a new token for `user_id`, dropping any previously issued ones
pub async fn replace_for_user(
    pool: &SqlitePool,
    user_id: i64,
    token_hash: &str,
    expires_at: i64,
    now: i64,
) -> RepoResult<()> {
    let mut tx = pool.begin().await?;
    sqlx::query("DELETE FROM password_reset_tokens WHERE user_id = ?")
        .bind(user_id)
        .execute(&mut *tx)
        .await?;
    sqlx::query(
        "INSERT INTO password_reset_tokens (token_hash, user_id, expires_at, created_at) VALUES (?, ?, ?, ?)",
    )
    .bind(token_hash)
    .bind(user_id)
    .bind(expires_at)
    .bind(now)
    .execute(&mut *tx)
    .await?;
    tx.commit().await?;
    Ok(())
}

pub async fn find(pool: &SqlitePool, token_hash: &str) -> RepoResult<Option<ResetTokenRecord>> {
    let row = sqlx::query_as::<_, ResetTokenRecord>(
        "SELECT token_hash, user_id, expires_at, created_at FROM password_reset_tokens WHERE token_hash = ?",
    )
    .bind(token_hash)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

/// Delete a token. Returns false if someone else already consumed it.
pub async fn delete(pool: &SqlitePool, token_hash: &str) -> RepoResult<bool> {
    let result = sqlx::query("DELETE FROM password_reset_tokens WHERE token_hash = ?")
        .bind(token_hash)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() == 1)
}

/// Purge expired tokens, returning how many were removed
pub async fn delete_expired(pool: &SqlitePool, now: i64) -> RepoResult<u64> {
    let result = sqlx::query("DELETE FROM password_reset_tokens WHERE expires_at <= ?")
        .bind(now)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{test_pool, users};

    async fn seed_user(pool: &SqlitePool) {
        users::create(
            pool,
            &users::NewUser {
                id: 1,
                name: "Asha",
                email: "a@x.com",
                hashed_password: "h",
                phone: "1",
                address: "Pune",
                email_otp: 123456,
                now: 0,
            },
        )
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn new_token_replaces_old() {
        let pool = test_pool().await;
        seed_user(&pool).await;
        replace_for_user(&pool, 1, "aaa", 100, 0).await.unwrap();
        replace_for_user(&pool, 1, "bbb", 200, 50).await.unwrap();
        assert!(find(&pool, "aaa").await.unwrap().is_none());
        let rec = find(&pool, "bbb").await.unwrap().unwrap();
        assert_eq!(rec.user_id, 1);
        assert_eq!(rec.expires_at, 200);
    }

    #[tokio::test]
    async fn delete_is_single_use() {
        let pool = test_pool().await;
        seed_user(&pool).await;
        replace_for_user(&pool, 1, "aaa", 100, 0).await.unwrap();
        assert!(delete(&pool, "aaa").await.unwrap());
        assert!(!delete(&pool, "aaa").await.unwrap());
    }

    #[tokio::test]
    async fn purge_expired() {
        let pool = test_pool().await;
        seed_user(&pool).await;
        replace_for_user(&pool, 1, "aaa", 100, 0).await.unwrap();
        assert_eq!(delete_expired(&pool, 99).await.unwrap(), 0);
        assert_eq!(delete_expired(&pool, 100).await.unwrap(), 1);
    }
}
