// src/handlers/reviews.rs
// DOCUMENTATION: HTTP handlers for reviews and user pages

use crate::auth::AuthenticatedUser;
use crate::errors::TravelError;
use crate::models::{CreateReviewRequest, UpdateReviewRequest, UpsertProfileRequest};
use crate::services::{FavoriteService, ListCache, ProfileService, ReviewService};
use actix_web::{web, HttpResponse, Responder};
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

/// POST /reviews
pub async fn create_review(
    pool: web::Data<PgPool>,
    cache: web::Data<Arc<ListCache>>,
    user: AuthenticatedUser,
    req: web::Json<CreateReviewRequest>,
) -> Result<impl Responder, TravelError> {
    let review =
        ReviewService::create_review(pool.get_ref(), cache.get_ref(), user.user_id, req.into_inner())
            .await?;
    Ok(HttpResponse::Created().json(review))
}

/// PUT /reviews/{id}
pub async fn update_review(
    pool: web::Data<PgPool>,
    cache: web::Data<Arc<ListCache>>,
    user: AuthenticatedUser,
    path: web::Path<i64>,
    req: web::Json<UpdateReviewRequest>,
) -> Result<impl Responder, TravelError> {
    let review = ReviewService::update_review(
        pool.get_ref(),
        cache.get_ref(),
        user.user_id,
        path.into_inner(),
        req.into_inner(),
    )
    .await?;
    Ok(HttpResponse::Ok().json(review))
}

/// DELETE /reviews/{id}
pub async fn delete_review(
    pool: web::Data<PgPool>,
    cache: web::Data<Arc<ListCache>>,
    user: AuthenticatedUser,
    path: web::Path<i64>,
) -> Result<impl Responder, TravelError> {
    ReviewService::delete_review(pool.get_ref(), cache.get_ref(), user.user_id, path.into_inner())
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

/// POST /reviews/{id}/helpful
pub async fn mark_helpful(
    pool: web::Data<PgPool>,
    path: web::Path<i64>,
) -> Result<impl Responder, TravelError> {
    let result = ReviewService::mark_helpful(pool.get_ref(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(result))
}

/// GET /users/{id}/profile
pub async fn get_profile(
    pool: web::Data<PgPool>,
    path: web::Path<Uuid>,
) -> Result<impl Responder, TravelError> {
    let profile = ProfileService::get(pool.get_ref(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(profile))
}

/// GET /users/{id}/reviews
pub async fn list_user_reviews(
    pool: web::Data<PgPool>,
    path: web::Path<Uuid>,
) -> Result<impl Responder, TravelError> {
    let reviews = ReviewService::list_user_reviews(pool.get_ref(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(reviews))
}

/// GET /me/profile
pub async fn get_my_profile(
    pool: web::Data<PgPool>,
    user: AuthenticatedUser,
) -> Result<impl Responder, TravelError> {
    let profile = ProfileService::get(pool.get_ref(), user.user_id).await?;
    Ok(HttpResponse::Ok().json(profile))
}

/// PUT /me/profile
pub async fn upsert_my_profile(
    pool: web::Data<PgPool>,
    user: AuthenticatedUser,
    req: web::Json<UpsertProfileRequest>,
) -> Result<impl Responder, TravelError> {
    let profile = ProfileService::upsert(pool.get_ref(), user.user_id, req.into_inner()).await?;
    Ok(HttpResponse::Ok().json(profile))
}

/// GET /me/favorites
pub async fn list_my_favorites(
    pool: web::Data<PgPool>,
    user: AuthenticatedUser,
) -> Result<impl Responder, TravelError> {
    let favorites = FavoriteService::list(pool.get_ref(), user.user_id).await?;
    Ok(HttpResponse::Ok().json(favorites))
}

/// GET /me/reviews
pub async fn list_my_reviews(
    pool: web::Data<PgPool>,
    user: AuthenticatedUser,
) -> Result<impl Responder, TravelError> {
    let reviews = ReviewService::list_user_reviews(pool.get_ref(), user.user_id).await?;
    Ok(HttpResponse::Ok().json(reviews))
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/reviews")
            .route("", web::post().to(create_review))
            .route("/{id}", web::put().to(update_review))
            .route("/{id}", web::delete().to(delete_review))
            .route("/{id}/helpful", web::post().to(mark_helpful)),
    )
    .service(
        web::scope("/users")
            .route("/{id}/profile", web::get().to(get_profile))
            .route("/{id}/reviews", web::get().to(list_user_reviews)),
    )
    .service(
        web::scope("/me")
            .route("/profile", web::get().to(get_my_profile))
            .route("/profile", web::put().to(upsert_my_profile))
            .route("/favorites", web::get().to(list_my_favorites))
            .route("/reviews", web::get().to(list_my_reviews)),
    );
}
