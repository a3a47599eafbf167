// src/db/profile_repository.rs
// DOCUMENTATION: User profile database operations

use crate::errors::{db_error, TravelError};
use crate::models::{UpsertProfileRequest, UserProfile};
use sqlx::PgPool;
use uuid::Uuid;

pub struct ProfileRepository;

impl ProfileRepository {
    pub async fn get(pool: &PgPool, user_id: Uuid) -> Result<UserProfile, TravelError> {
        sqlx::query_as::<_, UserProfile>(
            r#"
            SELECT user_id, nickname, avatar_url, bio, created_at, updated_at
            FROM user_profile
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(pool)
        .await
        .map_err(|e| db_error("Fetch profile", e))?
        .ok_or_else(|| TravelError::NotFound(format!("Profile {}", user_id)))
    }

    /// Create the profile on first save, update it afterwards
    pub async fn upsert(
        pool: &PgPool,
        user_id: Uuid,
        req: &UpsertProfileRequest,
    ) -> Result<UserProfile, TravelError> {
        let profile = sqlx::query_as::<_, UserProfile>(
            r#"
            INSERT INTO user_profile (user_id, nickname, avatar_url, bio)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (user_id) DO UPDATE
            SET nickname = EXCLUDED.nickname,
                avatar_url = EXCLUDED.avatar_url,
                bio = EXCLUDED.bio,
                updated_at = NOW()
            RETURNING user_id, nickname, avatar_url, bio, created_at, updated_at
            "#,
        )
        .bind(user_id)
        .bind(req.nickname.trim())
        .bind(&req.avatar_url)
        .bind(&req.bio)
        .fetch_one(pool)
        .await
        .map_err(|e| db_error("Upsert profile", e))?;

        log::info!("Saved profile for user {}", user_id);
        Ok(profile)
    }
}
