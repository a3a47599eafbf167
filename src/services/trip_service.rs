// src/services/trip_service.rs
// DOCUMENTATION: Business logic for trip plans and the itinerary editor
// PURPOSE: Ownership checks, day bounds, and drag-and-drop ordering of items

use crate::db::{DayOrder, PlaceRepository, TripRepository};
use crate::errors::TravelError;
use crate::models::{
    check_trip_dates, trip_day_count, CreateDetailRequest, CreateTripRequest, MoveDetailRequest, ReorderDayRequest,
    TripDay, TripPlan, TripPlanDetail, TripPlanResponse, UpdateDetailRequest, UpdateTripRequest,
};
use chrono::{Duration, NaiveDate};
use sqlx::PgPool;
use std::collections::{BTreeMap, HashSet};
use uuid::Uuid;
use validator::Validate;

pub struct TripService;

impl TripService {
    pub async fn list_trips(pool: &PgPool, user_id: Uuid) -> Result<Vec<TripPlan>, TravelError> {
        TripRepository::list_by_user(pool, user_id).await
    }

    pub async fn get_trip(pool: &PgPool, user_id: Uuid, plan_id: i64) -> Result<TripPlanResponse, TravelError> {
        let plan = Self::owned_plan(pool, user_id, plan_id).await?;
        Self::assemble(pool, plan).await
    }

    pub async fn create_trip(
        pool: &PgPool,
        user_id: Uuid,
        req: CreateTripRequest,
    ) -> Result<TripPlanResponse, TravelError> {
        req.validate()?;
        let plan_id = TripRepository::create(pool, user_id, &req, None, false, &[]).await?;
        Self::get_trip(pool, user_id, plan_id).await
    }

    pub async fn update_trip(
        pool: &PgPool,
        user_id: Uuid,
        plan_id: i64,
        req: UpdateTripRequest,
    ) -> Result<TripPlanResponse, TravelError> {
        req.validate()?;
        let plan = Self::owned_plan(pool, user_id, plan_id).await?;

        let details = TripRepository::details(pool, plan_id).await?;
        check_new_dates(&plan, &req, &details)?;

        TripRepository::update(pool, plan_id, &req).await?;
        Self::get_trip(pool, user_id, plan_id).await
    }

    pub async fn delete_trip(pool: &PgPool, user_id: Uuid, plan_id: i64) -> Result<(), TravelError> {
        Self::owned_plan(pool, user_id, plan_id).await?;
        TripRepository::delete(pool, plan_id).await
    }

    pub async fn add_detail(
        pool: &PgPool,
        user_id: Uuid,
        plan_id: i64,
        req: CreateDetailRequest,
    ) -> Result<TripPlanDetail, TravelError> {
        req.validate()?;
        let plan = Self::owned_plan(pool, user_id, plan_id).await?;
        check_day(&plan, req.day_number)?;
        if let Some(place_id) = req.place_id {
            PlaceRepository::get_by_id(pool, place_id).await?;
        }

        let detail_id = TripRepository::add_detail(pool, plan_id, &req).await?;
        TripRepository::get_detail(pool, detail_id).await
    }

    pub async fn update_detail(
        pool: &PgPool,
        user_id: Uuid,
        detail_id: i64,
        req: UpdateDetailRequest,
    ) -> Result<TripPlanDetail, TravelError> {
        req.validate()?;
        Self::owned_detail(pool, user_id, detail_id).await?;
        if let Some(place_id) = req.place_id {
            PlaceRepository::get_by_id(pool, place_id).await?;
        }

        TripRepository::update_detail(pool, detail_id, &req).await?;
        TripRepository::get_detail(pool, detail_id).await
    }

    pub async fn delete_detail(pool: &PgPool, user_id: Uuid, detail_id: i64) -> Result<(), TravelError> {
        let detail = Self::owned_detail(pool, user_id, detail_id).await?;
        TripRepository::delete_detail(pool, &detail, |remaining| Ok(renumber_days(remaining))).await
    }

    /// Persist a full day order as sent by the editor after a drop
    pub async fn reorder_day(
        pool: &PgPool,
        user_id: Uuid,
        plan_id: i64,
        day_number: i32,
        req: ReorderDayRequest,
    ) -> Result<TripPlanResponse, TravelError> {
        let plan = Self::owned_plan(pool, user_id, plan_id).await?;
        check_day(&plan, day_number)?;

        TripRepository::reorder(pool, plan_id, |details| {
            plan_reorder(details, day_number, &req.detail_ids)
        })
        .await?;
        Self::assemble(pool, plan).await
    }

    /// Move one item to a position in the same or another day
    pub async fn move_detail(
        pool: &PgPool,
        user_id: Uuid,
        detail_id: i64,
        req: MoveDetailRequest,
    ) -> Result<TripPlanResponse, TravelError> {
        let detail = Self::owned_detail(pool, user_id, detail_id).await?;
        let plan = TripRepository::get_plan(pool, detail.plan_id).await?;
        check_day(&plan, req.to_day)?;

        TripRepository::reorder(pool, plan.plan_id, |details| {
            plan_detail_move(details, detail_id, req.to_day, req.to_index)
        })
        .await?;
        Self::assemble(pool, plan).await
    }

    pub(crate) async fn assemble(pool: &PgPool, plan: TripPlan) -> Result<TripPlanResponse, TravelError> {
        let details = TripRepository::details(pool, plan.plan_id).await?;
        let days = group_by_day(details, plan.start_date, plan.day_count());
        Ok(TripPlanResponse { plan, days })
    }

    async fn owned_plan(pool: &PgPool, user_id: Uuid, plan_id: i64) -> Result<TripPlan, TravelError> {
        let plan = TripRepository::get_plan(pool, plan_id).await?;
        if plan.user_id != user_id {
            log::warn!("User {} tried to access trip plan {}", user_id, plan_id);
            return Err(TravelError::Forbidden);
        }
        Ok(plan)
    }

    async fn owned_detail(pool: &PgPool, user_id: Uuid, detail_id: i64) -> Result<TripPlanDetail, TravelError> {
        let detail = TripRepository::get_detail(pool, detail_id).await?;
        Self::owned_plan(pool, user_id, detail.plan_id).await?;
        Ok(detail)
    }
}

/// Dates after applying `req` must stay within the length cap and keep every item
pub fn check_new_dates(
    plan: &TripPlan,
    req: &UpdateTripRequest,
    details: &[TripPlanDetail],
) -> Result<(), TravelError> {
    let start = req.start_date.unwrap_or(plan.start_date);
    let end = req.end_date.unwrap_or(plan.end_date);
    check_trip_dates(start, end).map_err(|code| TravelError::ValidationError(code.to_string()))?;

    let last_used_day = details.iter().map(|d| d.day_number).max().unwrap_or(0);
    if last_used_day > trip_day_count(start, end) {
        return Err(TravelError::InvalidInput(format!(
            "day {} still has items; move or delete them before shortening the trip",
            last_used_day
        )));
    }
    Ok(())
}

fn check_day(plan: &TripPlan, day_number: i32) -> Result<(), TravelError> {
    if day_number < 1 || day_number > plan.day_count() {
        return Err(TravelError::InvalidInput(format!(
            "day {} is outside the trip (1..={})",
            day_number,
            plan.day_count()
        )));
    }
    Ok(())
}

/// Move the element at `from` so that it ends up at `to` (clamped to the end)
pub fn move_item<T>(list: &mut Vec<T>, from: usize, to: usize) {
    if from >= list.len() {
        return;
    }
    let item = list.remove(from);
    let to = to.min(list.len());
    list.insert(to, item);
}

/// Current order of item ids per day
pub fn day_orders(details: &[TripPlanDetail]) -> BTreeMap<i32, Vec<i64>> {
    let mut sorted: Vec<&TripPlanDetail> = details.iter().collect();
    sorted.sort_by_key(|d| (d.day_number, d.sort_order, d.detail_id));

    let mut days: BTreeMap<i32, Vec<i64>> = BTreeMap::new();
    for detail in sorted {
        days.entry(detail.day_number).or_default().push(detail.detail_id);
    }
    days
}

/// Positions 0..n in list order
pub fn renumber(ids: &[i64]) -> Vec<(i64, i32)> {
    ids.iter()
        .enumerate()
        .map(|(position, id)| (*id, position as i32))
        .collect()
}

fn day_order(day_number: i32, ids: &[i64]) -> DayOrder {
    DayOrder {
        day_number,
        positions: renumber(ids),
    }
}

/// Contiguous positions for every day that still has items
pub fn renumber_days(details: &[TripPlanDetail]) -> Vec<DayOrder> {
    day_orders(details)
        .iter()
        .map(|(day, ids)| day_order(*day, ids))
        .collect()
}

/// Order for one day as submitted, checked against the day's current items
pub fn plan_reorder(
    details: &[TripPlanDetail],
    day_number: i32,
    submitted: &[i64],
) -> Result<Vec<DayOrder>, TravelError> {
    let days = day_orders(details);
    let current = days.get(&day_number).cloned().unwrap_or_default();
    check_same_items(&current, submitted)?;
    Ok(vec![day_order(day_number, submitted)])
}

/// Orders of the days touched by moving `detail_id`, from wherever it is now
pub fn plan_detail_move(
    details: &[TripPlanDetail],
    detail_id: i64,
    to_day: i32,
    to_index: usize,
) -> Result<Vec<DayOrder>, TravelError> {
    let from_day = details
        .iter()
        .find(|d| d.detail_id == detail_id)
        .map(|d| d.day_number)
        .ok_or_else(|| TravelError::NotFound(format!("Trip detail {}", detail_id)))?;

    let changes = plan_move(&day_orders(details), detail_id, from_day, to_day, to_index)?;
    Ok(changes
        .iter()
        .map(|(day, ids)| day_order(*day, ids))
        .collect())
}

/// The new orders of the days touched by moving `detail_id`
pub fn plan_move(
    days: &BTreeMap<i32, Vec<i64>>,
    detail_id: i64,
    from_day: i32,
    to_day: i32,
    to_index: usize,
) -> Result<Vec<(i32, Vec<i64>)>, TravelError> {
    let mut source = days.get(&from_day).cloned().unwrap_or_default();
    let from_index = source
        .iter()
        .position(|id| *id == detail_id)
        .ok_or_else(|| TravelError::NotFound(format!("Trip detail {}", detail_id)))?;

    if from_day == to_day {
        move_item(&mut source, from_index, to_index);
        return Ok(vec![(from_day, source)]);
    }

    source.remove(from_index);
    let mut target = days.get(&to_day).cloned().unwrap_or_default();
    let to_index = to_index.min(target.len());
    target.insert(to_index, detail_id);

    Ok(vec![(from_day, source), (to_day, target)])
}

/// The submitted order must be a permutation of the day's items
pub fn check_same_items(current: &[i64], submitted: &[i64]) -> Result<(), TravelError> {
    let current_set: HashSet<i64> = current.iter().copied().collect();
    let submitted_set: HashSet<i64> = submitted.iter().copied().collect();

    if submitted_set.len() != submitted.len() {
        return Err(TravelError::InvalidInput("duplicate item in order".to_string()));
    }
    if current_set != submitted_set {
        return Err(TravelError::InvalidInput(
            "order must list exactly the items of the day".to_string(),
        ));
    }
    Ok(())
}

/// Bucket items into days 1..=day_count, with dates; items keep their order
pub fn group_by_day(details: Vec<TripPlanDetail>, start_date: NaiveDate, day_count: i32) -> Vec<TripDay> {
    let last_day = details
        .iter()
        .map(|d| d.day_number)
        .max()
        .unwrap_or(0)
        .max(day_count);

    let mut days: Vec<TripDay> = (1..=last_day)
        .map(|day_number| TripDay {
            day_number,
            date: start_date + Duration::days(i64::from(day_number - 1)),
            items: Vec::new(),
        })
        .collect();

    for detail in details {
        if detail.day_number >= 1 {
            days[(detail.day_number - 1) as usize].items.push(detail);
        }
    }
    for day in &mut days {
        day.items.sort_by_key(|d| (d.sort_order, d.detail_id));
    }
    days
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn detail(detail_id: i64, day_number: i32, sort_order: i32) -> TripPlanDetail {
        TripPlanDetail {
            detail_id,
            plan_id: 1,
            day_number,
            sort_order,
            place_id: None,
            place_name: None,
            title: format!("item {}", detail_id),
            memo: None,
            start_time: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_move_item() {
        let mut list = vec!['a', 'b', 'c', 'd'];
        move_item(&mut list, 0, 2);
        assert_eq!(list, vec!['b', 'c', 'a', 'd']);

        move_item(&mut list, 3, 0);
        assert_eq!(list, vec!['d', 'b', 'c', 'a']);

        move_item(&mut list, 1, 99);
        assert_eq!(list, vec!['d', 'c', 'a', 'b']);

        move_item(&mut list, 9, 0);
        assert_eq!(list, vec!['d', 'c', 'a', 'b']);
    }

    #[test]
    fn test_day_orders_uses_sort_order() {
        let details = vec![detail(10, 1, 1), detail(11, 1, 0), detail(12, 2, 0)];
        let days = day_orders(&details);
        assert_eq!(days[&1], vec![11, 10]);
        assert_eq!(days[&2], vec![12]);
    }

    #[test]
    fn test_plan_move_within_day() {
        let days = day_orders(&[detail(1, 1, 0), detail(2, 1, 1), detail(3, 1, 2)]);
        let changes = plan_move(&days, 3, 1, 1, 0).unwrap();
        assert_eq!(changes, vec![(1, vec![3, 1, 2])]);
    }

    #[test]
    fn test_plan_move_across_days() {
        let days = day_orders(&[detail(1, 1, 0), detail(2, 1, 1), detail(3, 2, 0)]);
        let changes = plan_move(&days, 1, 1, 2, 5).unwrap();
        assert_eq!(changes, vec![(1, vec![2]), (2, vec![3, 1])]);

        let changes = plan_move(&days, 2, 1, 3, 0).unwrap();
        assert_eq!(changes, vec![(1, vec![1]), (3, vec![2])]);
    }

    #[test]
    fn test_plan_move_unknown_item() {
        let days = day_orders(&[detail(1, 1, 0)]);
        assert!(plan_move(&days, 42, 1, 1, 0).is_err());
    }

    #[test]
    fn test_check_same_items() {
        assert!(check_same_items(&[1, 2, 3], &[3, 1, 2]).is_ok());
        assert!(check_same_items(&[1, 2, 3], &[1, 2]).is_err());
        assert!(check_same_items(&[1, 2], &[1, 2, 2]).is_err());
        assert!(check_same_items(&[1, 2], &[1, 4]).is_err());
        assert!(check_same_items(&[], &[]).is_ok());
    }

    #[test]
    fn test_renumber_is_contiguous() {
        assert_eq!(renumber(&[7, 3, 9]), vec![(7, 0), (3, 1), (9, 2)]);
        assert!(renumber(&[]).is_empty());
    }

    #[test]
    fn test_renumber_days_closes_gaps() {
        // day 1 lost its middle item
        let remaining = vec![detail(1, 1, 0), detail(3, 1, 2), detail(4, 2, 5)];
        let orders = renumber_days(&remaining);
        assert_eq!(
            orders,
            vec![
                DayOrder { day_number: 1, positions: vec![(1, 0), (3, 1)] },
                DayOrder { day_number: 2, positions: vec![(4, 0)] },
            ]
        );
    }

    #[test]
    fn test_plan_reorder_checks_current_items() {
        let details = vec![detail(1, 1, 0), detail(2, 1, 1), detail(3, 2, 0)];
        let orders = plan_reorder(&details, 1, &[2, 1]).unwrap();
        assert_eq!(orders, vec![DayOrder { day_number: 1, positions: vec![(2, 0), (1, 1)] }]);

        // item 3 was moved to day 1 by someone else meanwhile
        let moved = vec![detail(1, 1, 0), detail(2, 1, 1), detail(3, 1, 2)];
        assert!(plan_reorder(&moved, 1, &[2, 1]).is_err());
    }

    #[test]
    fn test_plan_detail_move_uses_current_day() {
        let details = vec![detail(1, 1, 0), detail(2, 2, 0), detail(3, 2, 1)];
        let orders = plan_detail_move(&details, 3, 1, 0).unwrap();
        assert_eq!(
            orders,
            vec![
                DayOrder { day_number: 2, positions: vec![(2, 0)] },
                DayOrder { day_number: 1, positions: vec![(3, 0), (1, 1)] },
            ]
        );
        assert!(matches!(
            plan_detail_move(&details, 99, 1, 0),
            Err(TravelError::NotFound(_))
        ));
    }

    fn plan(start: &str, end: &str) -> TripPlan {
        TripPlan {
            plan_id: 1,
            user_id: Uuid::nil(),
            title: "Jeju".to_string(),
            region_id: None,
            destination: None,
            start_date: NaiveDate::parse_from_str(start, "%Y-%m-%d").unwrap(),
            end_date: NaiveDate::parse_from_str(end, "%Y-%m-%d").unwrap(),
            companions: None,
            travel_style: None,
            pace: None,
            transport: None,
            summary: None,
            is_ai_generated: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn date_change(start: Option<&str>, end: Option<&str>) -> UpdateTripRequest {
        let parse = |d: &str| NaiveDate::parse_from_str(d, "%Y-%m-%d").unwrap();
        UpdateTripRequest {
            title: None,
            destination: None,
            start_date: start.map(parse),
            end_date: end.map(parse),
            companions: None,
            travel_style: None,
            pace: None,
            transport: None,
        }
    }

    #[test]
    fn test_update_dates_respect_length_cap() {
        let trip = plan("2026-05-01", "2026-05-03");

        let huge = date_change(Some("0001-01-01"), Some("9999-12-31"));
        assert!(matches!(
            check_new_dates(&trip, &huge, &[]),
            Err(TravelError::ValidationError(_))
        ));

        let longer = date_change(None, Some("2026-05-30"));
        assert!(check_new_dates(&trip, &longer, &[]).is_ok());

        let reversed = date_change(Some("2026-05-04"), None);
        assert!(check_new_dates(&trip, &reversed, &[]).is_err());
    }

    #[test]
    fn test_update_dates_keep_items() {
        let trip = plan("2026-05-01", "2026-05-03");
        let shorter = date_change(None, Some("2026-05-02"));

        assert!(check_new_dates(&trip, &shorter, &[detail(1, 2, 0)]).is_ok());
        assert!(matches!(
            check_new_dates(&trip, &shorter, &[detail(1, 3, 0)]),
            Err(TravelError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_group_by_day() {
        let start = NaiveDate::from_ymd_opt(2026, 5, 1).unwrap();
        let days = group_by_day(vec![detail(2, 2, 1), detail(1, 2, 0), detail(3, 1, 0)], start, 3);

        assert_eq!(days.len(), 3);
        assert_eq!(days[0].date, start);
        assert_eq!(days[2].date, NaiveDate::from_ymd_opt(2026, 5, 3).unwrap());
        assert_eq!(days[0].items.iter().map(|d| d.detail_id).collect::<Vec<_>>(), vec![3]);
        assert_eq!(days[1].items.iter().map(|d| d.detail_id).collect::<Vec<_>>(), vec![1, 2]);
        assert!(days[2].items.is_empty());
    }
}
