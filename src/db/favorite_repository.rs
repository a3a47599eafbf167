// src/db/favorite_repository.rs
// DOCUMENTATION: Favorite places and the place favorite counter
// PURPOSE: Toggle favorites while keeping favorite_count in step

use crate::errors::{db_error, TravelError};
use crate::models::{FavoritePlace, FavoriteStatus};
use sqlx::PgPool;
use uuid::Uuid;

pub struct FavoriteRepository;

impl FavoriteRepository {
    pub async fn is_favorite(pool: &PgPool, user_id: Uuid, place_id: i64) -> Result<bool, TravelError> {
        let (exists,): (bool,) = sqlx::query_as(
            "SELECT EXISTS(SELECT 1 FROM user_favorite_place WHERE user_id = $1 AND place_id = $2)",
        )
        .bind(user_id)
        .bind(place_id)
        .fetch_one(pool)
        .await
        .map_err(|e| db_error("Check favorite", e))?;

        Ok(exists)
    }

    /// Flip the favorite flag for (user, place)
    /// DOCUMENTATION: Runs in one transaction. The place row is locked so that
    /// the counter read and write are not interleaved with another toggle.
    pub async fn toggle(pool: &PgPool, user_id: Uuid, place_id: i64) -> Result<FavoriteStatus, TravelError> {
        let mut tx = pool.begin().await.map_err(|e| db_error("Begin transaction", e))?;

        let current: Option<(i32,)> =
            sqlx::query_as("SELECT favorite_count FROM place WHERE place_id = $1 FOR UPDATE")
                .bind(place_id)
                .fetch_optional(&mut *tx)
                .await
                .map_err(|e| db_error("Lock place", e))?;
        let (current,) =
            current.ok_or_else(|| TravelError::NotFound(format!("Place {}", place_id)))?;

        let removed = sqlx::query(
            "DELETE FROM user_favorite_place WHERE user_id = $1 AND place_id = $2",
        )
        .bind(user_id)
        .bind(place_id)
        .execute(&mut *tx)
        .await
        .map_err(|e| db_error("Remove favorite", e))?
        .rows_affected();

        let is_favorite = removed == 0;
        if is_favorite {
            sqlx::query("INSERT INTO user_favorite_place (user_id, place_id) VALUES ($1, $2)")
                .bind(user_id)
                .bind(place_id)
                .execute(&mut *tx)
                .await
                .map_err(|e| db_error("Add favorite", e))?;
        }

        let favorite_count = next_favorite_count(current, is_favorite);
        sqlx::query("UPDATE place SET favorite_count = $1 WHERE place_id = $2")
            .bind(favorite_count)
            .bind(place_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| db_error("Update favorite count", e))?;

        tx.commit().await.map_err(|e| db_error("Commit favorite", e))?;

        log::info!(
            "User {} {} place {} (count {})",
            user_id,
            if is_favorite { "favorited" } else { "unfavorited" },
            place_id,
            favorite_count
        );

        Ok(FavoriteStatus {
            place_id,
            is_favorite,
            favorite_count,
        })
    }

    /// Favorite places of a user, newest first
    pub async fn list_by_user(pool: &PgPool, user_id: Uuid) -> Result<Vec<FavoritePlace>, TravelError> {
        sqlx::query_as::<_, FavoritePlace>(
            r#"
            SELECT
                p.place_id, p.region_id, rg.name AS region_name,
                p.name, p.category, p.address, p.description, p.image_url,
                p.latitude, p.longitude,
                p.average_rating, p.review_count, p.favorite_count,
                p.created_at,
                f.created_at AS favorited_at
            FROM user_favorite_place f
            JOIN place p ON p.place_id = f.place_id
            LEFT JOIN region rg ON rg.region_id = p.region_id
            WHERE f.user_id = $1
            ORDER BY f.created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
        .map_err(|e| db_error("Fetch favorites", e))
    }
}

/// Counter after a toggle; removal never goes below zero
pub fn next_favorite_count(current: i32, added: bool) -> i32 {
    if added {
        current.saturating_add(1)
    } else {
        (current - 1).max(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_favorite_count() {
        assert_eq!(next_favorite_count(0, true), 1);
        assert_eq!(next_favorite_count(4, false), 3);
        assert_eq!(next_favorite_count(0, false), 0);
        assert_eq!(next_favorite_count(-2, false), 0);
        assert_eq!(next_favorite_count(i32::MAX, true), i32::MAX);
    }
}
