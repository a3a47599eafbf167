// src/handlers/places.rs
// DOCUMENTATION: HTTP handlers for home, places, regions and favorites
// PURPOSE: Parse requests, call services, return responses

use crate::auth::{AuthenticatedUser, MaybeUser};
use crate::errors::TravelError;
use crate::models::{PlaceQuery, ReviewQuery};
use crate::services::{FavoriteService, ListCache, PlaceService, ReviewService};
use actix_web::{web, HttpResponse, Responder};
use sqlx::PgPool;
use std::sync::Arc;

/// GET /home
pub async fn home(
    pool: web::Data<PgPool>,
    cache: web::Data<Arc<ListCache>>,
) -> Result<impl Responder, TravelError> {
    let home = PlaceService::home(pool.get_ref(), cache.get_ref()).await?;
    Ok(HttpResponse::Ok().json(home))
}

/// GET /places
pub async fn list_places(
    pool: web::Data<PgPool>,
    cache: web::Data<Arc<ListCache>>,
    query: web::Query<PlaceQuery>,
) -> Result<impl Responder, TravelError> {
    let result = PlaceService::list_places(pool.get_ref(), cache.get_ref(), query.into_inner()).await?;
    Ok(HttpResponse::Ok().json(result))
}

/// GET /places/{id}
pub async fn get_place(
    pool: web::Data<PgPool>,
    viewer: MaybeUser,
    path: web::Path<i64>,
) -> Result<impl Responder, TravelError> {
    let place = PlaceService::get_place(pool.get_ref(), path.into_inner(), viewer.user_id()).await?;
    Ok(HttpResponse::Ok().json(place))
}

/// GET /places/{id}/reviews
pub async fn list_place_reviews(
    pool: web::Data<PgPool>,
    path: web::Path<i64>,
    query: web::Query<ReviewQuery>,
) -> Result<impl Responder, TravelError> {
    let reviews =
        ReviewService::list_place_reviews(pool.get_ref(), path.into_inner(), query.into_inner())
            .await?;
    Ok(HttpResponse::Ok().json(reviews))
}

/// POST /places/{id}/favorite
/// Toggle the caller's favorite
pub async fn toggle_favorite(
    pool: web::Data<PgPool>,
    cache: web::Data<Arc<ListCache>>,
    user: AuthenticatedUser,
    path: web::Path<i64>,
) -> Result<impl Responder, TravelError> {
    let status =
        FavoriteService::toggle(pool.get_ref(), cache.get_ref(), user.user_id, path.into_inner())
            .await?;
    Ok(HttpResponse::Ok().json(status))
}

/// GET /places/{id}/favorite
pub async fn favorite_status(
    pool: web::Data<PgPool>,
    user: AuthenticatedUser,
    path: web::Path<i64>,
) -> Result<impl Responder, TravelError> {
    let status = FavoriteService::status(pool.get_ref(), user.user_id, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(status))
}

/// GET /regions
pub async fn list_regions(pool: web::Data<PgPool>) -> Result<impl Responder, TravelError> {
    let regions = PlaceService::list_regions(pool.get_ref()).await?;
    Ok(HttpResponse::Ok().json(regions))
}

/// GET /regions/{id}
pub async fn get_region(
    pool: web::Data<PgPool>,
    path: web::Path<i64>,
) -> Result<impl Responder, TravelError> {
    let region = PlaceService::get_region(pool.get_ref(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(region))
}

/// GET /regions/{id}/places
pub async fn list_region_places(
    pool: web::Data<PgPool>,
    cache: web::Data<Arc<ListCache>>,
    path: web::Path<i64>,
    query: web::Query<PlaceQuery>,
) -> Result<impl Responder, TravelError> {
    let result = PlaceService::list_region_places(
        pool.get_ref(),
        cache.get_ref(),
        path.into_inner(),
        query.into_inner(),
    )
    .await?;
    Ok(HttpResponse::Ok().json(result))
}

/// Configuration for place and region routes
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.route("/home", web::get().to(home))
        .service(
            web::scope("/places")
                .route("", web::get().to(list_places))
                .route("/{id}", web::get().to(get_place))
                .route("/{id}/reviews", web::get().to(list_place_reviews))
                .route("/{id}/favorite", web::post().to(toggle_favorite))
                .route("/{id}/favorite", web::get().to(favorite_status)),
        )
        .service(
            web::scope("/regions")
                .route("", web::get().to(list_regions))
                .route("/{id}", web::get().to(get_region))
                .route("/{id}/places", web::get().to(list_region_places)),
        );
}
