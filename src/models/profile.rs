// src/models/profile.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use super::Place;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserProfile {
    pub user_id: Uuid,
    pub nickname: String,
    pub avatar_url: Option<String>,
    pub bio: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// PUT /me/profile
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpsertProfileRequest {
    #[validate(length(min = 2, max = 30))]
    pub nickname: String,
    #[validate(url)]
    pub avatar_url: Option<String>,
    #[validate(length(max = 300))]
    pub bio: Option<String>,
}

/// Favorite place joined with when it was saved
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct FavoritePlace {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub place: Place,
    pub favorited_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FavoriteStatus {
    pub place_id: i64,
    pub is_favorite: bool,
    pub favorite_count: i32,
}
