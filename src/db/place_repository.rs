// src/db/place_repository.rs
// DOCUMENTATION: Database access for places and regions
// PURPOSE: All SQL touching the place and region tables

use crate::errors::{db_error, TravelError};
use crate::models::{Place, PlaceQuery, PlaceSort, Region};
use sqlx::{PgPool, Postgres, QueryBuilder};

/// Base SELECT shared by every place query; region name comes from a LEFT JOIN
const PLACE_SELECT: &str = r#"
    SELECT
        p.place_id, p.region_id, rg.name AS region_name,
        p.name, p.category, p.address, p.description, p.image_url,
        p.latitude, p.longitude,
        p.average_rating, p.review_count, p.favorite_count,
        p.created_at
    FROM place p
    LEFT JOIN region rg ON rg.region_id = p.region_id
"#;

pub struct PlaceRepository;

impl PlaceRepository {
    /// Get a place by id
    pub async fn get_by_id(pool: &PgPool, place_id: i64) -> Result<Place, TravelError> {
        let sql = format!("{} WHERE p.place_id = $1", PLACE_SELECT);

        sqlx::query_as::<_, Place>(&sql)
            .bind(place_id)
            .fetch_optional(pool)
            .await
            .map_err(|e| db_error("Fetch place", e))?
            .ok_or_else(|| {
                log::warn!("Place not found: {}", place_id);
                TravelError::NotFound(format!("Place {}", place_id))
            })
    }

    /// Filtered, sorted, paginated listing
    /// DOCUMENTATION: Returns (page of results, total matches)
    pub async fn list(pool: &PgPool, query: &PlaceQuery) -> Result<(Vec<Place>, i64), TravelError> {
        let mut count_builder: QueryBuilder<Postgres> =
            QueryBuilder::new("SELECT COUNT(*) FROM place p");
        Self::push_filters(&mut count_builder, query);

        let (total,) = count_builder
            .build_query_as::<(i64,)>()
            .fetch_one(pool)
            .await
            .map_err(|e| db_error("Count places", e))?;

        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(PLACE_SELECT);
        Self::push_filters(&mut builder, query);
        builder.push(" ORDER BY ");
        builder.push(query.sort.order_by());
        builder.push(" LIMIT ");
        builder.push_bind(query.limit());
        builder.push(" OFFSET ");
        builder.push_bind(query.offset());

        let places = builder
            .build_query_as::<Place>()
            .fetch_all(pool)
            .await
            .map_err(|e| db_error("List places", e))?;

        log::debug!(
            "Place listing: {} results, {} total (page {})",
            places.len(),
            total,
            query.page()
        );

        Ok((places, total))
    }

    fn push_filters(builder: &mut QueryBuilder<Postgres>, query: &PlaceQuery) {
        builder.push(" WHERE TRUE");

        if let Some(region_id) = query.region_id {
            builder.push(" AND p.region_id = ");
            builder.push_bind(region_id);
        }

        if let Some(category) = query.category.as_deref().map(str::trim).filter(|c| !c.is_empty()) {
            builder.push(" AND p.category ILIKE ");
            builder.push_bind(category.to_string());
        }

        if let Some(q) = query.q.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
            let pattern = format!("%{}%", escape_like(q));
            builder.push(" AND (p.name ILIKE ");
            builder.push_bind(pattern.clone());
            builder.push(" OR p.address ILIKE ");
            builder.push_bind(pattern);
            builder.push(")");
        }
    }

    /// Top places for the home page
    pub async fn top(pool: &PgPool, sort: PlaceSort, limit: i64) -> Result<Vec<Place>, TravelError> {
        let sql = format!("{} ORDER BY {} LIMIT $1", PLACE_SELECT, sort.order_by());

        sqlx::query_as::<_, Place>(&sql)
            .bind(limit)
            .fetch_all(pool)
            .await
            .map_err(|e| db_error("Fetch top places", e))
    }
}

/// Escape LIKE wildcards in user text
pub fn escape_like(input: &str) -> String {
    input
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

pub struct RegionRepository;

impl RegionRepository {
    /// All regions with how many places each holds
    pub async fn list(pool: &PgPool) -> Result<Vec<Region>, TravelError> {
        sqlx::query_as::<_, Region>(
            r#"
            SELECT
                rg.region_id, rg.name, rg.country, rg.description, rg.image_url,
                (SELECT COUNT(*) FROM place p WHERE p.region_id = rg.region_id) AS place_count
            FROM region rg
            ORDER BY rg.name ASC
            "#,
        )
        .fetch_all(pool)
        .await
        .map_err(|e| db_error("List regions", e))
    }

    pub async fn get_by_id(pool: &PgPool, region_id: i64) -> Result<Region, TravelError> {
        sqlx::query_as::<_, Region>(
            r#"
            SELECT
                rg.region_id, rg.name, rg.country, rg.description, rg.image_url,
                (SELECT COUNT(*) FROM place p WHERE p.region_id = rg.region_id) AS place_count
            FROM region rg
            WHERE rg.region_id = $1
            "#,
        )
        .bind(region_id)
        .fetch_optional(pool)
        .await
        .map_err(|e| db_error("Fetch region", e))?
        .ok_or_else(|| TravelError::NotFound(format!("Region {}", region_id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("100%_done"), "100\\%\\_done");
        assert_eq!(escape_like("plain"), "plain");
    }

    #[test]
    fn test_listing_sql_binds_user_text() {
        let query = PlaceQuery {
            region_id: Some(3),
            q: Some("O'Hare".to_string()),
            category: Some("  ".to_string()),
            ..Default::default()
        };
        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new("SELECT 1 FROM place p");
        PlaceRepository::push_filters(&mut builder, &query);
        let sql = builder.sql();

        assert!(sql.contains("p.region_id = $1"));
        assert!(sql.contains("p.name ILIKE $2"));
        assert!(sql.contains("p.address ILIKE $3"));
        assert!(!sql.contains("category"));
        assert!(!sql.contains("O'Hare"));
    }
}
