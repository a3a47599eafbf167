// src/models/trip.rs
// DOCUMENTATION: Trip plans and their day-by-day items
// PURPOSE: Models for the itinerary editor and for saved AI plans

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::{Validate, ValidationError};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TripPlan {
    pub plan_id: i64,
    pub user_id: Uuid,
    pub title: String,
    pub region_id: Option<i64>,
    pub destination: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub companions: Option<String>,
    pub travel_style: Option<Vec<String>>,
    pub pace: Option<String>,
    pub transport: Option<String>,
    pub summary: Option<String>,
    pub is_ai_generated: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TripPlan {
    /// Number of itinerary days, inclusive of both ends
    pub fn day_count(&self) -> i32 {
        trip_day_count(self.start_date, self.end_date)
    }
}

pub fn trip_day_count(start: NaiveDate, end: NaiveDate) -> i32 {
    ((end - start).num_days() + 1).max(0) as i32
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TripPlanDetail {
    pub detail_id: i64,
    pub plan_id: i64,
    pub day_number: i32,
    pub sort_order: i32,
    pub place_id: Option<i64>,
    #[sqlx(default)]
    pub place_name: Option<String>,
    pub title: String,
    pub memo: Option<String>,
    pub start_time: Option<NaiveTime>,
    pub created_at: DateTime<Utc>,
}

pub const MAX_TRIP_DAYS: i32 = 30;

/// Date rules shared by trip creation and updates; the error is a validation code
pub fn check_trip_dates(start: NaiveDate, end: NaiveDate) -> Result<(), &'static str> {
    if end < start {
        return Err("end_date_before_start_date");
    }
    if trip_day_count(start, end) > MAX_TRIP_DAYS {
        return Err("trip_too_long");
    }
    Ok(())
}

fn validate_date_range(req: &CreateTripRequest) -> Result<(), ValidationError> {
    check_trip_dates(req.start_date, req.end_date).map_err(ValidationError::new)
}

/// POST /trips
#[derive(Debug, Clone, Deserialize, Validate)]
#[validate(schema(function = "validate_date_range", skip_on_field_errors = false))]
pub struct CreateTripRequest {
    #[validate(length(min = 1, max = 100))]
    pub title: String,
    pub region_id: Option<i64>,
    pub destination: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub companions: Option<String>,
    #[serde(default)]
    pub travel_style: Vec<String>,
    pub pace: Option<String>,
    pub transport: Option<String>,
}

/// PUT /trips/{id}
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateTripRequest {
    #[validate(length(min = 1, max = 100))]
    pub title: Option<String>,
    pub destination: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub companions: Option<String>,
    pub travel_style: Option<Vec<String>>,
    pub pace: Option<String>,
    pub transport: Option<String>,
}

/// POST /trips/{id}/details
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateDetailRequest {
    #[validate(range(min = 1))]
    pub day_number: i32,
    pub place_id: Option<i64>,
    #[validate(length(min = 1, max = 100))]
    pub title: String,
    #[validate(length(max = 500))]
    pub memo: Option<String>,
    pub start_time: Option<NaiveTime>,
}

/// PUT /trip-details/{id}
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateDetailRequest {
    pub place_id: Option<i64>,
    #[validate(length(min = 1, max = 100))]
    pub title: Option<String>,
    #[validate(length(max = 500))]
    pub memo: Option<String>,
    pub start_time: Option<NaiveTime>,
}

/// PUT /trips/{id}/days/{day}/order
#[derive(Debug, Clone, Deserialize)]
pub struct ReorderDayRequest {
    pub detail_ids: Vec<i64>,
}

/// POST /trip-details/{id}/move
#[derive(Debug, Clone, Deserialize)]
pub struct MoveDetailRequest {
    pub to_day: i32,
    pub to_index: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct TripDay {
    pub day_number: i32,
    pub date: NaiveDate,
    pub items: Vec<TripPlanDetail>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TripPlanResponse {
    #[serde(flatten)]
    pub plan: TripPlan,
    pub days: Vec<TripDay>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_day_count_inclusive() {
        assert_eq!(trip_day_count(date("2026-05-01"), date("2026-05-01")), 1);
        assert_eq!(trip_day_count(date("2026-05-01"), date("2026-05-03")), 3);
        assert_eq!(trip_day_count(date("2026-05-03"), date("2026-05-01")), 0);
    }

    #[test]
    fn test_create_trip_rejects_reversed_dates() {
        let req = CreateTripRequest {
            title: "Jeju".to_string(),
            region_id: None,
            destination: Some("Jeju".to_string()),
            start_date: date("2026-05-03"),
            end_date: date("2026-05-01"),
            companions: None,
            travel_style: vec![],
            pace: None,
            transport: None,
        };
        assert!(req.validate().is_err());

        let ok = CreateTripRequest {
            start_date: date("2026-05-01"),
            end_date: date("2026-05-03"),
            ..req
        };
        assert!(ok.validate().is_ok());
    }

    #[test]
    fn test_check_trip_dates_caps_length() {
        assert_eq!(check_trip_dates(date("2026-05-01"), date("2026-05-30")), Ok(()));
        assert_eq!(
            check_trip_dates(date("2026-05-01"), date("2026-05-31")),
            Err("trip_too_long")
        );
        assert_eq!(
            check_trip_dates(date("0001-01-01"), date("9999-12-31")),
            Err("trip_too_long")
        );
        assert_eq!(
            check_trip_dates(date("2026-05-02"), date("2026-05-01")),
            Err("end_date_before_start_date")
        );
    }
}
