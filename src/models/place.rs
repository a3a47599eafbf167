// src/models/place.rs
// DOCUMENTATION: Data structures for places and regions
// PURPOSE: Serialization models for API and database

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::{ReviewResponse, ReviewSummary};

/// Place row joined with its region name
/// DOCUMENTATION: Aggregate columns (average_rating, review_count, favorite_count)
/// are maintained by the review and favorite repositories
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Place {
    pub place_id: i64,
    pub region_id: Option<i64>,
    #[sqlx(default)]
    pub region_name: Option<String>,
    pub name: String,
    pub category: Option<String>,
    pub address: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub average_rating: f64,
    pub review_count: i32,
    pub favorite_count: i32,
    pub created_at: DateTime<Utc>,
}

/// Region (destination) row
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Region {
    pub region_id: i64,
    pub name: String,
    pub country: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    #[sqlx(default)]
    pub place_count: Option<i64>,
}

/// Sort order for place listings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaceSort {
    #[default]
    Popular,
    Rating,
    Recent,
    Reviews,
}

impl PlaceSort {
    /// ORDER BY clause, always ending on the primary key for stable paging
    pub fn order_by(&self) -> &'static str {
        match self {
            PlaceSort::Popular => "p.favorite_count DESC, p.place_id ASC",
            PlaceSort::Rating => "p.average_rating DESC, p.review_count DESC, p.place_id ASC",
            PlaceSort::Recent => "p.created_at DESC, p.place_id DESC",
            PlaceSort::Reviews => "p.review_count DESC, p.place_id ASC",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PlaceSort::Popular => "popular",
            PlaceSort::Rating => "rating",
            PlaceSort::Recent => "recent",
            PlaceSort::Reviews => "reviews",
        }
    }
}

/// Query parameters for place listings
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlaceQuery {
    pub region_id: Option<i64>,
    pub category: Option<String>,
    /// Free text matched against name and address
    pub q: Option<String>,
    #[serde(default)]
    pub sort: PlaceSort,
    /// Page number (1-based)
    pub page: Option<i64>,
    /// Results per page (max 100)
    pub limit: Option<i64>,
}

/// Deepest page a listing will serve
pub const MAX_PAGE: i64 = 10_000;

impl PlaceQuery {
    pub fn page(&self) -> i64 {
        self.page.unwrap_or(1).clamp(1, MAX_PAGE)
    }

    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(20).clamp(1, 100)
    }

    pub fn offset(&self) -> i64 {
        (self.page() - 1) * self.limit()
    }

    /// Stable cache key; blank text filters are treated as absent
    pub fn cache_key(&self) -> String {
        format!(
            "region={}:category={}:q={}:sort={}:page={}:limit={}",
            self.region_id.map(|r| r.to_string()).unwrap_or_default(),
            normalized(&self.category),
            normalized(&self.q),
            self.sort.as_str(),
            self.page(),
            self.limit()
        )
    }
}

fn normalized(value: &Option<String>) -> String {
    value
        .as_deref()
        .map(|v| v.trim().to_lowercase())
        .unwrap_or_default()
}

/// Paginated listing response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaceListResponse {
    pub data: Vec<Place>,
    pub total_count: i64,
    pub page: i64,
    pub limit: i64,
    pub has_more: bool,
}

/// GET /places/{id}
#[derive(Debug, Serialize)]
pub struct PlaceDetailResponse {
    #[serde(flatten)]
    pub place: Place,
    pub is_favorite: bool,
    pub review_summary: ReviewSummary,
    pub recent_reviews: Vec<ReviewResponse>,
}

/// Home page payload (cached)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HomeResponse {
    pub popular_places: Vec<Place>,
    pub top_rated_places: Vec<Place>,
    pub regions: Vec<Region>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paging_bounds() {
        let query = PlaceQuery {
            page: Some(0),
            limit: Some(500),
            ..Default::default()
        };
        assert_eq!(query.page(), 1);
        assert_eq!(query.limit(), 100);
        assert_eq!(query.offset(), 0);

        let query = PlaceQuery {
            page: Some(3),
            limit: Some(10),
            ..Default::default()
        };
        assert_eq!(query.offset(), 20);
    }

    #[test]
    fn test_huge_page_is_capped() {
        let query = PlaceQuery {
            page: Some(i64::MAX),
            limit: Some(100),
            ..Default::default()
        };
        assert_eq!(query.page(), MAX_PAGE);
        assert_eq!(query.offset(), (MAX_PAGE - 1) * 100);
    }

    #[test]
    fn test_cache_key_normalizes_text() {
        let a = PlaceQuery {
            q: Some("  Seoul ".to_string()),
            category: Some("Cafe".to_string()),
            ..Default::default()
        };
        let b = PlaceQuery {
            q: Some("seoul".to_string()),
            category: Some("cafe".to_string()),
            page: Some(1),
            limit: Some(20),
            ..Default::default()
        };
        assert_eq!(a.cache_key(), b.cache_key());

        let c = PlaceQuery {
            sort: PlaceSort::Rating,
            ..b
        };
        assert_ne!(a.cache_key(), c.cache_key());
    }

    #[test]
    fn test_sort_deserializes_lowercase() {
        let query: PlaceQuery = serde_json::from_str(r#"{"sort":"recent"}"#).unwrap();
        assert_eq!(query.sort, PlaceSort::Recent);
        let query: PlaceQuery = serde_json::from_str("{}").unwrap();
        assert_eq!(query.sort, PlaceSort::Popular);
    }
}
