//! Favourite Repository
//!
//! One row per (user, product); the composite key gives set semantics.

use super::RepoResult;
use sqlx::SqlitePool;

/// Add a favourite. An existing pair surfaces as [`super::RepoError::Duplicate`].
pub async fn add(pool: &SqlitePool, user_id: i64, product_id: i64, now: i64) -> RepoResult<()> {
    sqlx::query("INSERT INTO user_favourites (user_id, product_id, created_at) VALUES (?, ?, ?)")
        .bind(user_id)
        .bind(product_id)
        .bind(now)
        .execute(pool)
        .await?;
    Ok(())
}

/// Remove a favourite. Returns false when it was not present.
pub async fn remove(pool: &SqlitePool, user_id: i64, product_id: i64) -> RepoResult<bool> {
    let result = sqlx::query("DELETE FROM user_favourites WHERE user_id = ? AND product_id = ?")
        .bind(user_id)
        .bind(product_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Favourite product ids in the order they were added
pub async fn list(pool: &SqlitePool, user_id: i64) -> RepoResult<Vec<i64>> {
    let rows: Vec<(i64,)> = sqlx::query_as(
        "SELECT product_id FROM user_favourites WHERE user_id = ? ORDER BY created_at, rowid",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().map(|(id,)| id).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{RepoError, test_pool, users};

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
    async fn add_is_set_like() {
        let pool = test_pool().await;
        seed_user(&pool).await;
        add(&pool, 1, 7, 1).await.unwrap();
        add(&pool, 1, 3, 2).await.unwrap();
        let err = add(&pool, 1, 7, 3).await.unwrap_err();
        assert!(matches!(err, RepoError::Duplicate(_)));
        assert_eq!(list(&pool, 1).await.unwrap(), vec![7, 3]);
    }

    #[tokio::test]
    async fn remove_reports_presence() {
        let pool = test_pool().await;
        seed_user(&pool).await;
        add(&pool, 1, 7, 1).await.unwrap();
        assert!(remove(&pool, 1, 7).await.unwrap());
        assert!(!remove(&pool, 1, 7).await.unwrap());
        assert!(list(&pool, 1).await.unwrap().is_empty());
    }
}
