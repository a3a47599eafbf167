// src/services/review_service.rs
// DOCUMENTATION: Business logic for reviews
// PURPOSE: Ownership checks, image attachment and cache invalidation around review writes

use crate::db::{PlaceRepository, ReviewRepository};
use crate::errors::TravelError;
use crate::models::{
    CreateReviewRequest, HelpfulResponse, Review, ReviewListResponse, ReviewQuery, ReviewResponse,
    UpdateReviewRequest,
};
use crate::services::ListCache;
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

pub struct ReviewService;

impl ReviewService {
    pub async fn list_place_reviews(
        pool: &PgPool,
        place_id: i64,
        query: ReviewQuery,
    ) -> Result<ReviewListResponse, TravelError> {
        let (reviews, total_count) = ReviewRepository::list_by_place(pool, place_id, &query).await?;
        let data = Self::attach_images(pool, reviews).await?;

        Ok(ReviewListResponse {
            data,
            total_count,
            page: query.page(),
            limit: query.limit(),
            has_more: total_count > query.offset() + query.limit(),
        })
    }

    pub async fn list_user_reviews(
        pool: &PgPool,
        user_id: Uuid,
    ) -> Result<Vec<ReviewResponse>, TravelError> {
        let reviews = ReviewRepository::list_by_user(pool, user_id).await?;
        Self::attach_images(pool, reviews).await
    }

    pub async fn create_review(
        pool: &PgPool,
        cache: &ListCache,
        user_id: Uuid,
        req: CreateReviewRequest,
    ) -> Result<ReviewResponse, TravelError> {
        req.validate()?;
        let req = CreateReviewRequest {
            content: clean_content(&req.content)?,
            ..req
        };

        PlaceRepository::get_by_id(pool, req.place_id).await?;
        let review_id = ReviewRepository::create(pool, user_id, &req).await.map_err(|e| match e {
            TravelError::Conflict(_) => {
                TravelError::Conflict(format!("already reviewed place {}", req.place_id))
            }
            other => other,
        })?;

        cache.invalidate_places().await;
        Self::get_review(pool, review_id).await
    }

    pub async fn update_review(
        pool: &PgPool,
        cache: &ListCache,
        user_id: Uuid,
        review_id: i64,
        req: UpdateReviewRequest,
    ) -> Result<ReviewResponse, TravelError> {
        req.validate()?;
        let req = UpdateReviewRequest {
            content: req.content.as_deref().map(clean_content).transpose()?,
            ..req
        };
        let review = Self::owned_review(pool, user_id, review_id).await?;

        ReviewRepository::update(pool, &review, &req).await?;
        cache.invalidate_places().await;
        Self::get_review(pool, review_id).await
    }

    pub async fn delete_review(
        pool: &PgPool,
        cache: &ListCache,
        user_id: Uuid,
        review_id: i64,
    ) -> Result<(), TravelError> {
        let review = Self::owned_review(pool, user_id, review_id).await?;
        ReviewRepository::delete(pool, &review).await?;
        cache.invalidate_places().await;
        Ok(())
    }

    pub async fn mark_helpful(pool: &PgPool, review_id: i64) -> Result<HelpfulResponse, TravelError> {
        let helpful_count = ReviewRepository::increment_helpful(pool, review_id).await?;
        Ok(HelpfulResponse {
            review_id,
            helpful_count,
        })
    }

    async fn get_review(pool: &PgPool, review_id: i64) -> Result<ReviewResponse, TravelError> {
        let review = ReviewRepository::get_by_id(pool, review_id).await?;
        let mut with_images = Self::attach_images(pool, vec![review]).await?;
        with_images
            .pop()
            .ok_or_else(|| TravelError::NotFound(format!("Review {}", review_id)))
    }

    async fn owned_review(pool: &PgPool, user_id: Uuid, review_id: i64) -> Result<Review, TravelError> {
        let review = ReviewRepository::get_by_id(pool, review_id).await?;
        if review.user_id != user_id {
            log::warn!("User {} tried to modify review {}", user_id, review_id);
            return Err(TravelError::Forbidden);
        }
        Ok(review)
    }

    async fn attach_images(
        pool: &PgPool,
        reviews: Vec<Review>,
    ) -> Result<Vec<ReviewResponse>, TravelError> {
        let ids: Vec<i64> = reviews.iter().map(|r| r.review_id).collect();
        let mut images = ReviewRepository::images_for(pool, &ids).await?;

        Ok(reviews
            .into_iter()
            .map(|review| ReviewResponse {
                images: images.remove(&review.review_id).unwrap_or_default(),
                review,
            })
            .collect())
    }
}

/// Trimmed review text; whitespace-only text is rejected
pub fn clean_content(content: &str) -> Result<String, TravelError> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Err(TravelError::ValidationError("content must not be blank".to_string()));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_content() {
        assert_eq!(clean_content("  Great view \n").unwrap(), "Great view");
        assert!(matches!(
            clean_content("   "),
            Err(TravelError::ValidationError(_))
        ));
        assert!(clean_content("").is_err());
    }

    #[test]
    fn test_blank_update_content_is_rejected() {
        let req = UpdateReviewRequest {
            rating: None,
            content: Some("   ".to_string()),
            image_urls: None,
        };
        // passes the length rule, fails once trimmed
        assert!(req.validate().is_ok());
        assert!(req.content.as_deref().map(clean_content).transpose().is_err());

        let untouched = UpdateReviewRequest { content: None, ..req };
        assert_eq!(
            untouched.content.as_deref().map(clean_content).transpose().unwrap(),
            None
        );
    }
}
