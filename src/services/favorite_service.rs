// src/services/favorite_service.rs
// DOCUMENTATION: Favorites and user profiles

use crate::db::{FavoriteRepository, PlaceRepository, ProfileRepository};
use crate::errors::TravelError;
use crate::models::{FavoritePlace, FavoriteStatus, UpsertProfileRequest, UserProfile};
use crate::services::ListCache;
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

pub struct FavoriteService;

impl FavoriteService {
    /// Toggle and drop cached listings that show favorite counts
    pub async fn toggle(
        pool: &PgPool,
        cache: &ListCache,
        user_id: Uuid,
        place_id: i64,
    ) -> Result<FavoriteStatus, TravelError> {
        let status = FavoriteRepository::toggle(pool, user_id, place_id).await?;
        cache.invalidate_places().await;
        Ok(status)
    }

    pub async fn status(pool: &PgPool, user_id: Uuid, place_id: i64) -> Result<FavoriteStatus, TravelError> {
        let place = PlaceRepository::get_by_id(pool, place_id).await?;
        let is_favorite = FavoriteRepository::is_favorite(pool, user_id, place_id).await?;
        Ok(FavoriteStatus {
            place_id,
            is_favorite,
            favorite_count: place.favorite_count,
        })
    }

    pub async fn list(pool: &PgPool, user_id: Uuid) -> Result<Vec<FavoritePlace>, TravelError> {
        FavoriteRepository::list_by_user(pool, user_id).await
    }
}

pub struct ProfileService;

impl ProfileService {
    pub async fn get(pool: &PgPool, user_id: Uuid) -> Result<UserProfile, TravelError> {
        ProfileRepository::get(pool, user_id).await
    }

    pub async fn upsert(
        pool: &PgPool,
        user_id: Uuid,
        req: UpsertProfileRequest,
    ) -> Result<UserProfile, TravelError> {
        req.validate()?;
        if req.nickname.trim().chars().count() < 2 {
            return Err(TravelError::ValidationError(
                "nickname must have at least 2 visible characters".to_string(),
            ));
        }
        ProfileRepository::upsert(pool, user_id, &req).await
    }
}
