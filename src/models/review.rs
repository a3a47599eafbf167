// src/models/review.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::{Validate, ValidationError};

/// Review row joined with the author's nickname
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Review {
    pub review_id: i64,
    pub place_id: i64,
    pub user_id: Uuid,
    #[sqlx(default)]
    pub nickname: Option<String>,
    #[sqlx(default)]
    pub place_name: Option<String>,
    pub rating: i32,
    pub content: String,
    pub helpful_count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ReviewImage {
    pub image_id: i64,
    pub review_id: i64,
    pub image_url: String,
    pub display_order: i32,
}

pub const MAX_IMAGE_URL_LEN: usize = 500;

fn validate_image_urls(urls: &[String]) -> Result<(), ValidationError> {
    for url in urls {
        if url.len() > MAX_IMAGE_URL_LEN {
            return Err(ValidationError::new("image_url_too_long"));
        }
        if !validator::validate_url(url.as_str()) {
            return Err(ValidationError::new("image_url_invalid"));
        }
    }
    Ok(())
}

/// POST /reviews
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateReviewRequest {
    pub place_id: i64,
    #[validate(range(min = 1, max = 5))]
    pub rating: i32,
    #[validate(length(min = 1, max = 2000))]
    pub content: String,
    #[validate(length(max = 5), custom = "validate_image_urls")]
    #[serde(default)]
    pub image_urls: Vec<String>,
}

/// PUT /reviews/{id}; images are replaced only when `image_urls` is present
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateReviewRequest {
    #[validate(range(min = 1, max = 5))]
    pub rating: Option<i32>,
    #[validate(length(min = 1, max = 2000))]
    pub content: Option<String>,
    #[validate(length(max = 5), custom = "validate_image_urls")]
    pub image_urls: Option<Vec<String>>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewSort {
    #[default]
    Recent,
    Helpful,
    Rating,
}

impl ReviewSort {
    pub fn order_by(&self) -> &'static str {
        match self {
            ReviewSort::Recent => "r.created_at DESC, r.review_id DESC",
            ReviewSort::Helpful => "r.helpful_count DESC, r.created_at DESC",
            ReviewSort::Rating => "r.rating DESC, r.created_at DESC",
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReviewQuery {
    #[serde(default)]
    pub sort: ReviewSort,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

impl ReviewQuery {
    pub fn page(&self) -> i64 {
        self.page.unwrap_or(1).clamp(1, super::MAX_PAGE)
    }

    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(10).clamp(1, 50)
    }

    pub fn offset(&self) -> i64 {
        (self.page() - 1) * self.limit()
    }
}

/// Review with its images, as exposed via API
#[derive(Debug, Clone, Serialize)]
pub struct ReviewResponse {
    #[serde(flatten)]
    pub review: Review,
    pub images: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReviewListResponse {
    pub data: Vec<ReviewResponse>,
    pub total_count: i64,
    pub page: i64,
    pub limit: i64,
    pub has_more: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct HelpfulResponse {
    pub review_id: i64,
    pub helpful_count: i32,
}

/// Rating summary shown on the place page
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReviewSummary {
    pub review_count: i64,
    pub average_rating: f64,
    /// Counts for ratings 1..=5, index 0 is one star
    pub distribution: [i64; 5],
}

impl ReviewSummary {
    /// Build from `(rating, count)` rows; out-of-range ratings are ignored
    pub fn from_counts(rows: &[(i32, i64)]) -> Self {
        let mut distribution = [0i64; 5];
        for &(rating, count) in rows {
            if (1..=5).contains(&rating) {
                distribution[(rating - 1) as usize] += count;
            }
        }

        let review_count: i64 = distribution.iter().sum();
        let weighted: i64 = distribution
            .iter()
            .enumerate()
            .map(|(i, c)| (i as i64 + 1) * c)
            .sum();
        let average_rating = if review_count == 0 {
            0.0
        } else {
            ((weighted as f64 / review_count as f64) * 10.0).round() / 10.0
        };

        ReviewSummary {
            review_count,
            average_rating,
            distribution,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_from_counts() {
        let summary = ReviewSummary::from_counts(&[(5, 3), (4, 1), (1, 1)]);
        assert_eq!(summary.review_count, 5);
        assert_eq!(summary.distribution, [1, 0, 0, 1, 3]);
        // (5*3 + 4 + 1) / 5 = 4.0
        assert_eq!(summary.average_rating, 4.0);
    }

    #[test]
    fn test_summary_empty_and_out_of_range() {
        let summary = ReviewSummary::from_counts(&[(0, 4), (6, 2)]);
        assert_eq!(summary.review_count, 0);
        assert_eq!(summary.average_rating, 0.0);
    }

    #[test]
    fn test_summary_rounds_to_one_decimal() {
        let summary = ReviewSummary::from_counts(&[(5, 2), (4, 1)]);
        assert_eq!(summary.average_rating, 4.7);
    }

    #[test]
    fn test_review_paging_caps_page() {
        let query = ReviewQuery {
            page: Some(i64::MAX),
            limit: Some(50),
            ..Default::default()
        };
        assert_eq!(query.page(), crate::models::MAX_PAGE);
        assert_eq!(query.offset(), (crate::models::MAX_PAGE - 1) * 50);
    }

    #[test]
    fn test_create_review_validation() {
        let mut req = CreateReviewRequest {
            place_id: 1,
            rating: 6,
            content: "Great view".to_string(),
            image_urls: vec![],
        };
        assert!(req.validate().is_err());

        req.rating = 5;
        assert!(req.validate().is_ok());

        req.image_urls = (0..6).map(|i| format!("https://img/{}.jpg", i)).collect();
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_image_urls_must_be_urls() {
        let mut req = CreateReviewRequest {
            place_id: 1,
            rating: 4,
            content: "Nice".to_string(),
            image_urls: vec!["https://cdn.example.com/a.jpg".to_string()],
        };
        assert!(req.validate().is_ok());

        req.image_urls = vec!["not a url".to_string()];
        assert!(req.validate().is_err());

        req.image_urls = vec![format!("https://cdn.example.com/{}", "a".repeat(MAX_IMAGE_URL_LEN))];
        assert!(req.validate().is_err());

        let update = UpdateReviewRequest {
            rating: None,
            content: None,
            image_urls: Some(vec!["not a url".to_string()]),
        };
        assert!(update.validate().is_err());
    }
}
