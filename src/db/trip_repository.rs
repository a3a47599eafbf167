// src/db/trip_repository.rs
// DOCUMENTATION: Trip plan and itinerary item database operations
// PURPOSE: CRUD for trip_plan / trip_plan_detail plus persisting day order

use crate::errors::{db_error, TravelError};
use crate::models::{
    CreateDetailRequest, CreateTripRequest, TripPlan, TripPlanDetail, UpdateDetailRequest,
    UpdateTripRequest,
};
use chrono::NaiveTime;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

const PLAN_COLUMNS: &str = r#"
    plan_id, user_id, title, region_id, destination, start_date, end_date,
    companions, travel_style, pace, transport, summary, is_ai_generated,
    created_at, updated_at
"#;

const DETAIL_SELECT: &str = r#"
    SELECT
        d.detail_id, d.plan_id, d.day_number, d.sort_order, d.place_id,
        p.name AS place_name, d.title, d.memo, d.start_time, d.created_at
    FROM trip_plan_detail d
    LEFT JOIN place p ON p.place_id = d.place_id
"#;

/// Itinerary item to insert together with a new plan
#[derive(Debug, Clone, PartialEq)]
pub struct NewTripDetail {
    pub day_number: i32,
    pub sort_order: i32,
    pub place_id: Option<i64>,
    pub title: String,
    pub memo: Option<String>,
    pub start_time: Option<NaiveTime>,
}

/// Positions to persist for one day, as (detail_id, sort_order)
#[derive(Debug, Clone, PartialEq)]
pub struct DayOrder {
    pub day_number: i32,
    pub positions: Vec<(i64, i32)>,
}

pub struct TripRepository;

impl TripRepository {
    pub async fn list_by_user(pool: &PgPool, user_id: Uuid) -> Result<Vec<TripPlan>, TravelError> {
        let sql = format!(
            "SELECT {} FROM trip_plan WHERE user_id = $1 ORDER BY start_date DESC, plan_id DESC",
            PLAN_COLUMNS
        );
        sqlx::query_as::<_, TripPlan>(&sql)
            .bind(user_id)
            .fetch_all(pool)
            .await
            .map_err(|e| db_error("List trip plans", e))
    }

    pub async fn get_plan(pool: &PgPool, plan_id: i64) -> Result<TripPlan, TravelError> {
        let sql = format!("SELECT {} FROM trip_plan WHERE plan_id = $1", PLAN_COLUMNS);
        sqlx::query_as::<_, TripPlan>(&sql)
            .bind(plan_id)
            .fetch_optional(pool)
            .await
            .map_err(|e| db_error("Fetch trip plan", e))?
            .ok_or_else(|| TravelError::NotFound(format!("Trip plan {}", plan_id)))
    }

    /// All items of a plan ordered by day, then position
    pub async fn details(pool: &PgPool, plan_id: i64) -> Result<Vec<TripPlanDetail>, TravelError> {
        let mut conn = pool.acquire().await.map_err(|e| db_error("Acquire connection", e))?;
        Self::details_in(&mut conn, plan_id).await
    }

    pub async fn get_detail(pool: &PgPool, detail_id: i64) -> Result<TripPlanDetail, TravelError> {
        let sql = format!("{} WHERE d.detail_id = $1", DETAIL_SELECT);
        sqlx::query_as::<_, TripPlanDetail>(&sql)
            .bind(detail_id)
            .fetch_optional(pool)
            .await
            .map_err(|e| db_error("Fetch trip detail", e))?
            .ok_or_else(|| TravelError::NotFound(format!("Trip detail {}", detail_id)))
    }

    /// Insert a plan and its items in one transaction
    pub async fn create(
        pool: &PgPool,
        user_id: Uuid,
        req: &CreateTripRequest,
        summary: Option<&str>,
        is_ai_generated: bool,
        details: &[NewTripDetail],
    ) -> Result<i64, TravelError> {
        let mut tx = pool.begin().await.map_err(|e| db_error("Begin transaction", e))?;

        let (plan_id,): (i64,) = sqlx::query_as(
            r#"
            INSERT INTO trip_plan (
                user_id, title, region_id, destination, start_date, end_date,
                companions, travel_style, pace, transport, summary, is_ai_generated
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING plan_id
            "#,
        )
        .bind(user_id)
        .bind(&req.title)
        .bind(req.region_id)
        .bind(&req.destination)
        .bind(req.start_date)
        .bind(req.end_date)
        .bind(&req.companions)
        .bind(&req.travel_style)
        .bind(&req.pace)
        .bind(&req.transport)
        .bind(summary)
        .bind(is_ai_generated)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| db_error("Create trip plan", e))?;

        for detail in details {
            Self::insert_detail(&mut tx, plan_id, detail).await?;
        }

        tx.commit().await.map_err(|e| db_error("Commit trip plan", e))?;

        log::info!(
            "Created trip plan {} ({} items, ai={})",
            plan_id,
            details.len(),
            is_ai_generated
        );
        Ok(plan_id)
    }

    pub async fn update(pool: &PgPool, plan_id: i64, req: &UpdateTripRequest) -> Result<(), TravelError> {
        sqlx::query(
            r#"
            UPDATE trip_plan
            SET title = COALESCE($1, title),
                destination = COALESCE($2, destination),
                start_date = COALESCE($3, start_date),
                end_date = COALESCE($4, end_date),
                companions = COALESCE($5, companions),
                travel_style = COALESCE($6, travel_style),
                pace = COALESCE($7, pace),
                transport = COALESCE($8, transport),
                updated_at = NOW()
            WHERE plan_id = $9
            "#,
        )
        .bind(&req.title)
        .bind(&req.destination)
        .bind(req.start_date)
        .bind(req.end_date)
        .bind(&req.companions)
        .bind(&req.travel_style)
        .bind(&req.pace)
        .bind(&req.transport)
        .bind(plan_id)
        .execute(pool)
        .await
        .map_err(|e| db_error("Update trip plan", e))?;

        log::info!("Updated trip plan {}", plan_id);
        Ok(())
    }

    /// Delete a plan; items go with it (ON DELETE CASCADE)
    pub async fn delete(pool: &PgPool, plan_id: i64) -> Result<(), TravelError> {
        let rows = sqlx::query("DELETE FROM trip_plan WHERE plan_id = $1")
            .bind(plan_id)
            .execute(pool)
            .await
            .map_err(|e| db_error("Delete trip plan", e))?
            .rows_affected();

        if rows == 0 {
            return Err(TravelError::NotFound(format!("Trip plan {}", plan_id)));
        }

        log::info!("Deleted trip plan {}", plan_id);
        Ok(())
    }

    /// Append an item at the end of its day, holding the plan lock
    pub async fn add_detail(
        pool: &PgPool,
        plan_id: i64,
        req: &CreateDetailRequest,
    ) -> Result<i64, TravelError> {
        let mut tx = pool.begin().await.map_err(|e| db_error("Begin transaction", e))?;
        Self::lock_plan(&mut tx, plan_id).await?;

        let (detail_id,): (i64,) = sqlx::query_as(
            r#"
            INSERT INTO trip_plan_detail (plan_id, day_number, sort_order, place_id, title, memo, start_time)
            VALUES (
                $1, $2,
                (SELECT COUNT(*)::int
                   FROM trip_plan_detail WHERE plan_id = $1 AND day_number = $2),
                $3, $4, $5, $6
            )
            RETURNING detail_id
            "#,
        )
        .bind(plan_id)
        .bind(req.day_number)
        .bind(req.place_id)
        .bind(&req.title)
        .bind(&req.memo)
        .bind(req.start_time)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| db_error("Add trip detail", e))?;

        tx.commit().await.map_err(|e| db_error("Commit trip detail", e))?;

        log::info!("Added detail {} to plan {} day {}", detail_id, plan_id, req.day_number);
        Ok(detail_id)
    }

    pub async fn update_detail(
        pool: &PgPool,
        detail_id: i64,
        req: &UpdateDetailRequest,
    ) -> Result<(), TravelError> {
        sqlx::query(
            r#"
            UPDATE trip_plan_detail
            SET place_id = COALESCE($1, place_id),
                title = COALESCE($2, title),
                memo = COALESCE($3, memo),
                start_time = COALESCE($4, start_time)
            WHERE detail_id = $5
            "#,
        )
        .bind(req.place_id)
        .bind(&req.title)
        .bind(&req.memo)
        .bind(req.start_time)
        .bind(detail_id)
        .execute(pool)
        .await
        .map_err(|e| db_error("Update trip detail", e))?;

        Ok(())
    }

    /// Delete an item, then let `plan` renumber what is left of the plan
    pub async fn delete_detail<F>(
        pool: &PgPool,
        detail: &TripPlanDetail,
        plan: F,
    ) -> Result<(), TravelError>
    where
        F: FnOnce(&[TripPlanDetail]) -> Result<Vec<DayOrder>, TravelError>,
    {
        let mut tx = pool.begin().await.map_err(|e| db_error("Begin transaction", e))?;
        Self::lock_plan(&mut tx, detail.plan_id).await?;

        let rows = sqlx::query("DELETE FROM trip_plan_detail WHERE detail_id = $1")
            .bind(detail.detail_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| db_error("Delete trip detail", e))?
            .rows_affected();
        if rows == 0 {
            return Err(TravelError::NotFound(format!("Trip detail {}", detail.detail_id)));
        }

        let remaining = Self::details_in(&mut tx, detail.plan_id).await?;
        for order in plan(&remaining)? {
            Self::write_order(&mut tx, detail.plan_id, &order).await?;
        }
        tx.commit().await.map_err(|e| db_error("Commit trip detail", e))?;

        log::info!("Deleted trip detail {}", detail.detail_id);
        Ok(())
    }

    /// Rewrite item order with the plan row locked. `plan` sees the items as
    /// they are inside the transaction and returns the day orders to write.
    pub async fn reorder<F>(pool: &PgPool, plan_id: i64, plan: F) -> Result<(), TravelError>
    where
        F: FnOnce(&[TripPlanDetail]) -> Result<Vec<DayOrder>, TravelError>,
    {
        let mut tx = pool.begin().await.map_err(|e| db_error("Begin transaction", e))?;
        Self::lock_plan(&mut tx, plan_id).await?;

        let details = Self::details_in(&mut tx, plan_id).await?;
        let orders = plan(&details)?;
        for order in &orders {
            Self::write_order(&mut tx, plan_id, order).await?;
        }
        tx.commit().await.map_err(|e| db_error("Commit day order", e))?;

        log::debug!("Saved order of {} day(s) for plan {}", orders.len(), plan_id);
        Ok(())
    }

    /// Serializes every write to a plan's items
    async fn lock_plan(conn: &mut PgConnection, plan_id: i64) -> Result<(), TravelError> {
        sqlx::query_scalar::<_, i64>("SELECT plan_id FROM trip_plan WHERE plan_id = $1 FOR UPDATE")
            .bind(plan_id)
            .fetch_optional(&mut *conn)
            .await
            .map_err(|e| db_error("Lock trip plan", e))?
            .map(|_| ())
            .ok_or_else(|| TravelError::NotFound(format!("Trip plan {}", plan_id)))
    }

    async fn details_in(conn: &mut PgConnection, plan_id: i64) -> Result<Vec<TripPlanDetail>, TravelError> {
        let sql = format!(
            "{} WHERE d.plan_id = $1 ORDER BY d.day_number ASC, d.sort_order ASC, d.detail_id ASC",
            DETAIL_SELECT
        );
        sqlx::query_as::<_, TripPlanDetail>(&sql)
            .bind(plan_id)
            .fetch_all(&mut *conn)
            .await
            .map_err(|e| db_error("Fetch trip details", e))
    }

    async fn write_order(
        conn: &mut PgConnection,
        plan_id: i64,
        order: &DayOrder,
    ) -> Result<(), TravelError> {
        for (detail_id, sort_order) in &order.positions {
            sqlx::query(
                r#"
                UPDATE trip_plan_detail
                SET day_number = $1, sort_order = $2
                WHERE detail_id = $3 AND plan_id = $4
                "#,
            )
            .bind(order.day_number)
            .bind(sort_order)
            .bind(detail_id)
            .bind(plan_id)
            .execute(&mut *conn)
            .await
            .map_err(|e| db_error("Write item order", e))?;
        }
        Ok(())
    }

    async fn insert_detail(
        conn: &mut PgConnection,
        plan_id: i64,
        detail: &NewTripDetail,
    ) -> Result<(), TravelError> {
        sqlx::query(
            r#"
            INSERT INTO trip_plan_detail (plan_id, day_number, sort_order, place_id, title, memo, start_time)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(plan_id)
        .bind(detail.day_number)
        .bind(detail.sort_order)
        .bind(detail.place_id)
        .bind(&detail.title)
        .bind(&detail.memo)
        .bind(detail.start_time)
        .execute(&mut *conn)
        .await
        .map_err(|e| db_error("Insert trip detail", e))?;
        Ok(())
    }
}
