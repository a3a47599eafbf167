// src/handlers/trips.rs
// DOCUMENTATION: HTTP handlers for trip plans and the itinerary editor
// PURPOSE: Every route requires the plan owner's token

use crate::auth::AuthenticatedUser;
use crate::errors::TravelError;
use crate::models::{
    CreateDetailRequest, CreateTripRequest, MoveDetailRequest, ReorderDayRequest,
    UpdateDetailRequest, UpdateTripRequest,
};
use crate::services::TripService;
use actix_web::{web, HttpResponse, Responder};
use sqlx::PgPool;

/// GET /trips
pub async fn list_trips(
    pool: web::Data<PgPool>,
    user: AuthenticatedUser,
) -> Result<impl Responder, TravelError> {
    let trips = TripService::list_trips(pool.get_ref(), user.user_id).await?;
    Ok(HttpResponse::Ok().json(trips))
}

/// POST /trips
pub async fn create_trip(
    pool: web::Data<PgPool>,
    user: AuthenticatedUser,
    req: web::Json<CreateTripRequest>,
) -> Result<impl Responder, TravelError> {
    let trip = TripService::create_trip(pool.get_ref(), user.user_id, req.into_inner()).await?;
    Ok(HttpResponse::Created().json(trip))
}

/// GET /trips/{id}
pub async fn get_trip(
    pool: web::Data<PgPool>,
    user: AuthenticatedUser,
    path: web::Path<i64>,
) -> Result<impl Responder, TravelError> {
    let trip = TripService::get_trip(pool.get_ref(), user.user_id, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(trip))
}

/// PUT /trips/{id}
pub async fn update_trip(
    pool: web::Data<PgPool>,
    user: AuthenticatedUser,
    path: web::Path<i64>,
    req: web::Json<UpdateTripRequest>,
) -> Result<impl Responder, TravelError> {
    let trip =
        TripService::update_trip(pool.get_ref(), user.user_id, path.into_inner(), req.into_inner())
            .await?;
    Ok(HttpResponse::Ok().json(trip))
}

/// DELETE /trips/{id}
pub async fn delete_trip(
    pool: web::Data<PgPool>,
    user: AuthenticatedUser,
    path: web::Path<i64>,
) -> Result<impl Responder, TravelError> {
    TripService::delete_trip(pool.get_ref(), user.user_id, path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// POST /trips/{id}/details
pub async fn add_detail(
    pool: web::Data<PgPool>,
    user: AuthenticatedUser,
    path: web::Path<i64>,
    req: web::Json<CreateDetailRequest>,
) -> Result<impl Responder, TravelError> {
    let detail =
        TripService::add_detail(pool.get_ref(), user.user_id, path.into_inner(), req.into_inner())
            .await?;
    Ok(HttpResponse::Created().json(detail))
}

/// PUT /trips/{id}/days/{day}/order
/// Save the order of a day after a drag-and-drop
pub async fn reorder_day(
    pool: web::Data<PgPool>,
    user: AuthenticatedUser,
    path: web::Path<(i64, i32)>,
    req: web::Json<ReorderDayRequest>,
) -> Result<impl Responder, TravelError> {
    let (plan_id, day_number) = path.into_inner();
    let trip = TripService::reorder_day(
        pool.get_ref(),
        user.user_id,
        plan_id,
        day_number,
        req.into_inner(),
    )
    .await?;
    Ok(HttpResponse::Ok().json(trip))
}

/// PUT /trip-details/{id}
pub async fn update_detail(
    pool: web::Data<PgPool>,
    user: AuthenticatedUser,
    path: web::Path<i64>,
    req: web::Json<UpdateDetailRequest>,
) -> Result<impl Responder, TravelError> {
    let detail =
        TripService::update_detail(pool.get_ref(), user.user_id, path.into_inner(), req.into_inner())
            .await?;
    Ok(HttpResponse::Ok().json(detail))
}

/// DELETE /trip-details/{id}
pub async fn delete_detail(
    pool: web::Data<PgPool>,
    user: AuthenticatedUser,
    path: web::Path<i64>,
) -> Result<impl Responder, TravelError> {
    TripService::delete_detail(pool.get_ref(), user.user_id, path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// POST /trip-details/{id}/move
pub async fn move_detail(
    pool: web::Data<PgPool>,
    user: AuthenticatedUser,
    path: web::Path<i64>,
    req: web::Json<MoveDetailRequest>,
) -> Result<impl Responder, TravelError> {
    let trip =
        TripService::move_detail(pool.get_ref(), user.user_id, path.into_inner(), req.into_inner())
            .await?;
    Ok(HttpResponse::Ok().json(trip))
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/trips")
            .route("", web::get().to(list_trips))
            .route("", web::post().to(create_trip))
            .route("/{id}", web::get().to(get_trip))
            .route("/{id}", web::put().to(update_trip))
            .route("/{id}", web::delete().to(delete_trip))
            .route("/{id}/details", web::post().to(add_detail))
            .route("/{id}/days/{day}/order", web::put().to(reorder_day)),
    )
    .service(
        web::scope("/trip-details")
            .route("/{id}", web::put().to(update_detail))
            .route("/{id}", web::delete().to(delete_detail))
            .route("/{id}/move", web::post().to(move_detail)),
    );
}
