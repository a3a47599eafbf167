// src/db/review_repository.rs
// DOCUMENTATION: Review database operations
// PURPOSE: Handle CRUD operations for reviews, their images and place aggregates

use crate::errors::{db_error, TravelError};
use crate::models::{CreateReviewRequest, Review, ReviewImage, ReviewQuery, UpdateReviewRequest};
use sqlx::{PgConnection, PgPool};
use std::collections::HashMap;
use uuid::Uuid;

const REVIEW_SELECT: &str = r#"
    SELECT
        r.review_id, r.place_id, r.user_id, up.nickname, p.name AS place_name,
        r.rating, r.content, r.helpful_count, r.created_at, r.updated_at
    FROM review r
    LEFT JOIN user_profile up ON up.user_id = r.user_id
    LEFT JOIN place p ON p.place_id = r.place_id
"#;

pub struct ReviewRepository;

impl ReviewRepository {
    pub async fn get_by_id(pool: &PgPool, review_id: i64) -> Result<Review, TravelError> {
        let sql = format!("{} WHERE r.review_id = $1", REVIEW_SELECT);
        sqlx::query_as::<_, Review>(&sql)
            .bind(review_id)
            .fetch_optional(pool)
            .await
            .map_err(|e| db_error("Fetch review", e))?
            .ok_or_else(|| TravelError::NotFound(format!("Review {}", review_id)))
    }

    /// Page of reviews for a place plus the total count
    pub async fn list_by_place(
        pool: &PgPool,
        place_id: i64,
        query: &ReviewQuery,
    ) -> Result<(Vec<Review>, i64), TravelError> {
        let (total,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM review WHERE place_id = $1")
            .bind(place_id)
            .fetch_one(pool)
            .await
            .map_err(|e| db_error("Count reviews", e))?;

        let sql = format!(
            "{} WHERE r.place_id = $1 ORDER BY {} LIMIT $2 OFFSET $3",
            REVIEW_SELECT,
            query.sort.order_by()
        );
        let reviews = sqlx::query_as::<_, Review>(&sql)
            .bind(place_id)
            .bind(query.limit())
            .bind(query.offset())
            .fetch_all(pool)
            .await
            .map_err(|e| {
                log::error!("Failed to fetch reviews for place {}: {}", place_id, e);
                TravelError::DatabaseError(format!("Fetch reviews failed: {}", e))
            })?;

        Ok((reviews, total))
    }

    pub async fn list_by_user(pool: &PgPool, user_id: Uuid) -> Result<Vec<Review>, TravelError> {
        let sql = format!(
            "{} WHERE r.user_id = $1 ORDER BY r.created_at DESC",
            REVIEW_SELECT
        );
        sqlx::query_as::<_, Review>(&sql)
            .bind(user_id)
            .fetch_all(pool)
            .await
            .map_err(|e| db_error("Fetch user reviews", e))
    }

    /// `(rating, count)` rows for a place
    pub async fn rating_counts(pool: &PgPool, place_id: i64) -> Result<Vec<(i32, i64)>, TravelError> {
        sqlx::query_as::<_, (i32, i64)>(
            "SELECT rating, COUNT(*) FROM review WHERE place_id = $1 GROUP BY rating",
        )
        .bind(place_id)
        .fetch_all(pool)
        .await
        .map_err(|e| db_error("Fetch rating counts", e))
    }

    /// Images for a set of reviews, grouped by review id and ordered
    pub async fn images_for(
        pool: &PgPool,
        review_ids: &[i64],
    ) -> Result<HashMap<i64, Vec<String>>, TravelError> {
        if review_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let images = sqlx::query_as::<_, ReviewImage>(
            r#"
            SELECT image_id, review_id, image_url, display_order
            FROM review_image
            WHERE review_id = ANY($1)
            ORDER BY review_id, display_order ASC, image_id ASC
            "#,
        )
        .bind(review_ids)
        .fetch_all(pool)
        .await
        .map_err(|e| db_error("Fetch review images", e))?;

        let mut grouped: HashMap<i64, Vec<String>> = HashMap::new();
        for image in images {
            grouped.entry(image.review_id).or_default().push(image.image_url);
        }
        Ok(grouped)
    }

    /// Insert a review with its images and refresh the place aggregates
    /// DOCUMENTATION: One transaction; a second review by the same user is a Conflict
    pub async fn create(
        pool: &PgPool,
        user_id: Uuid,
        req: &CreateReviewRequest,
    ) -> Result<i64, TravelError> {
        let mut tx = pool.begin().await.map_err(|e| db_error("Begin transaction", e))?;

        let (review_id,): (i64,) = sqlx::query_as(
            r#"
            INSERT INTO review (place_id, user_id, rating, content)
            VALUES ($1, $2, $3, $4)
            RETURNING review_id
            "#,
        )
        .bind(req.place_id)
        .bind(user_id)
        .bind(req.rating)
        .bind(&req.content)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| db_error("Create review", e))?;

        Self::insert_images(&mut tx, review_id, &req.image_urls).await?;
        Self::refresh_place_aggregates(&mut tx, req.place_id).await?;

        tx.commit().await.map_err(|e| db_error("Commit review", e))?;

        log::info!("Created review {} for place {}", review_id, req.place_id);
        Ok(review_id)
    }

    /// Partial update; images are replaced when provided
    pub async fn update(
        pool: &PgPool,
        review: &Review,
        req: &UpdateReviewRequest,
    ) -> Result<(), TravelError> {
        let mut tx = pool.begin().await.map_err(|e| db_error("Begin transaction", e))?;

        sqlx::query(
            r#"
            UPDATE review
            SET rating = COALESCE($1, rating),
                content = COALESCE($2, content),
                updated_at = NOW()
            WHERE review_id = $3
            "#,
        )
        .bind(req.rating)
        .bind(&req.content)
        .bind(review.review_id)
        .execute(&mut *tx)
        .await
        .map_err(|e| db_error("Update review", e))?;

        if let Some(urls) = &req.image_urls {
            sqlx::query("DELETE FROM review_image WHERE review_id = $1")
                .bind(review.review_id)
                .execute(&mut *tx)
                .await
                .map_err(|e| db_error("Clear review images", e))?;
            Self::insert_images(&mut tx, review.review_id, urls).await?;
        }

        Self::refresh_place_aggregates(&mut tx, review.place_id).await?;
        tx.commit().await.map_err(|e| db_error("Commit review", e))?;

        log::info!("Updated review {}", review.review_id);
        Ok(())
    }

    pub async fn delete(pool: &PgPool, review: &Review) -> Result<(), TravelError> {
        let mut tx = pool.begin().await.map_err(|e| db_error("Begin transaction", e))?;

        sqlx::query("DELETE FROM review WHERE review_id = $1")
            .bind(review.review_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| db_error("Delete review", e))?;

        Self::refresh_place_aggregates(&mut tx, review.place_id).await?;
        tx.commit().await.map_err(|e| db_error("Commit review", e))?;

        log::info!("Deleted review {}", review.review_id);
        Ok(())
    }

    /// Increment the helpful counter and return its new value
    pub async fn increment_helpful(pool: &PgPool, review_id: i64) -> Result<i32, TravelError> {
        let row: Option<(i32,)> = sqlx::query_as(
            r#"
            UPDATE review
            SET helpful_count = helpful_count + 1
            WHERE review_id = $1
            RETURNING helpful_count
            "#,
        )
        .bind(review_id)
        .fetch_optional(pool)
        .await
        .map_err(|e| db_error("Increment helpful count", e))?;

        row.map(|(count,)| count)
            .ok_or_else(|| TravelError::NotFound(format!("Review {}", review_id)))
    }

    async fn insert_images(
        conn: &mut PgConnection,
        review_id: i64,
        urls: &[String],
    ) -> Result<(), TravelError> {
        for (order, url) in urls.iter().enumerate() {
            sqlx::query(
                "INSERT INTO review_image (review_id, image_url, display_order) VALUES ($1, $2, $3)",
            )
            .bind(review_id)
            .bind(url)
            .bind(order as i32)
            .execute(&mut *conn)
            .await
            .map_err(|e| db_error("Insert review image", e))?;
        }
        Ok(())
    }

    async fn refresh_place_aggregates(
        conn: &mut PgConnection,
        place_id: i64,
    ) -> Result<(), TravelError> {
        sqlx::query(
            r#"
            UPDATE place
            SET average_rating = COALESCE(
                    (SELECT ROUND(AVG(rating)::numeric, 1)::float8 FROM review WHERE place_id = $1),
                    0
                ),
                review_count = (SELECT COUNT(*) FROM review WHERE place_id = $1)
            WHERE place_id = $1
            "#,
        )
        .bind(place_id)
        .execute(&mut *conn)
        .await
        .map_err(|e| db_error("Refresh place aggregates", e))?;
        Ok(())
    }
}
