// src/services/place_service.rs
// DOCUMENTATION: Business logic for places and regions
// PURPOSE: Intermediary between handlers and repositories, owns list caching

use crate::db::{FavoriteRepository, PlaceRepository, RegionRepository, ReviewRepository};
use crate::errors::TravelError;
use crate::models::{
    HomeResponse, PlaceDetailResponse, PlaceListResponse, PlaceQuery, PlaceSort, Region,
    ReviewQuery, ReviewSort, ReviewSummary,
};
use crate::services::{ListCache, ReviewService, HOME_CACHE, PLACE_CACHE};
use sqlx::PgPool;
use uuid::Uuid;

const HOME_SECTION_SIZE: i64 = 8;
const DETAIL_REVIEW_COUNT: i64 = 3;

pub struct PlaceService;

impl PlaceService {
    /// Listing with filters, served from the place cache when fresh
    pub async fn list_places(
        pool: &PgPool,
        cache: &ListCache,
        query: PlaceQuery,
    ) -> Result<PlaceListResponse, TravelError> {
        let key = format!("{}{}", PLACE_CACHE, query.cache_key());
        if let Some(cached) = cache.get_json::<PlaceListResponse>(&key).await {
            return Ok(cached);
        }

        let (places, total_count) = PlaceRepository::list(pool, &query).await?;
        let response = PlaceListResponse {
            data: places,
            total_count,
            page: query.page(),
            limit: query.limit(),
            has_more: total_count > query.offset() + query.limit(),
        };

        cache.set_json(key, &response).await;
        Ok(response)
    }

    /// Place page: row, review summary, a few recent reviews, caller's favorite flag
    pub async fn get_place(
        pool: &PgPool,
        place_id: i64,
        viewer: Option<Uuid>,
    ) -> Result<PlaceDetailResponse, TravelError> {
        let place = PlaceRepository::get_by_id(pool, place_id).await?;
        let counts = ReviewRepository::rating_counts(pool, place_id).await?;

        let recent = ReviewService::list_place_reviews(
            pool,
            place_id,
            ReviewQuery {
                sort: ReviewSort::Recent,
                page: Some(1),
                limit: Some(DETAIL_REVIEW_COUNT),
            },
        )
        .await?;

        let is_favorite = match viewer {
            Some(user_id) => FavoriteRepository::is_favorite(pool, user_id, place_id).await?,
            None => false,
        };

        Ok(PlaceDetailResponse {
            place,
            is_favorite,
            review_summary: ReviewSummary::from_counts(&counts),
            recent_reviews: recent.data,
        })
    }

    /// Home page sections, cached as one blob
    pub async fn home(pool: &PgPool, cache: &ListCache) -> Result<HomeResponse, TravelError> {
        let key = format!("{}v1", HOME_CACHE);
        if let Some(cached) = cache.get_json::<HomeResponse>(&key).await {
            return Ok(cached);
        }

        let response = HomeResponse {
            popular_places: PlaceRepository::top(pool, PlaceSort::Popular, HOME_SECTION_SIZE).await?,
            top_rated_places: PlaceRepository::top(pool, PlaceSort::Rating, HOME_SECTION_SIZE).await?,
            regions: RegionRepository::list(pool).await?,
        };

        cache.set_json(key, &response).await;
        Ok(response)
    }

    pub async fn list_regions(pool: &PgPool) -> Result<Vec<Region>, TravelError> {
        RegionRepository::list(pool).await
    }

    pub async fn get_region(pool: &PgPool, region_id: i64) -> Result<Region, TravelError> {
        RegionRepository::get_by_id(pool, region_id).await
    }

    /// Places of one region; the path id wins over any region_id in the query
    pub async fn list_region_places(
        pool: &PgPool,
        cache: &ListCache,
        region_id: i64,
        query: PlaceQuery,
    ) -> Result<PlaceListResponse, TravelError> {
        RegionRepository::get_by_id(pool, region_id).await?;
        Self::list_places(
            pool,
            cache,
            PlaceQuery {
                region_id: Some(region_id),
                ..query
            },
        )
        .await
    }
}
