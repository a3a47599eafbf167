// src/services/planner_service.rs
// DOCUMENTATION: AI trip planner wizard
// PURPOSE: Validate the query-string state of each wizard step, build the prompt,
// read the model's JSON plan and optionally save it as a trip

use crate::db::{NewTripDetail, TripRepository};
use crate::errors::TravelError;
use crate::models::{
    AiPlan, CreateTripRequest, GenerateResponse, PlannerRequest, StepOptions, StepStateResponse,
    WizardParams, WizardStep, COMPANION_OPTIONS, MAX_TRIP_DAYS, PACE_OPTIONS, STYLE_OPTIONS,
    TRANSPORT_OPTIONS,
};
use crate::services::{GeminiClient, TripService};
use chrono::NaiveTime;
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use sqlx::PgPool;
use std::num::NonZeroU32;
use uuid::Uuid;

const MAX_DESTINATION_LEN: usize = 100;
const MAX_TITLE_LEN: usize = 100;
const MAX_MEMO_LEN: usize = 500;

/// Limiter shared by every generation request
pub fn planner_rate_limiter(per_minute: u32) -> DefaultDirectRateLimiter {
    let quota = Quota::per_minute(NonZeroU32::new(per_minute).unwrap_or(NonZeroU32::MIN));
    RateLimiter::direct(quota)
}

pub struct PlannerService;

impl PlannerService {
    /// State of one wizard page: earlier steps must be complete
    pub fn step_state(step: WizardStep, params: WizardParams) -> Result<StepStateResponse, TravelError> {
        for earlier in WizardStep::ALL.iter().take_while(|s| **s < step) {
            check_step(*earlier, &params).map_err(|msg| {
                TravelError::InvalidInput(format!("step '{}' is incomplete: {}", earlier.slug(), msg))
            })?;
        }

        let query = encode_params(&params)?;
        let with_query = |path: String| {
            if query.is_empty() {
                path
            } else {
                format!("{}?{}", path, query)
            }
        };

        let next = match step.next() {
            Some(next) => with_query(format!("/planner/steps/{}", next.slug())),
            None => with_query("/planner/generate".to_string()),
        };
        let previous = step
            .previous()
            .map(|prev| with_query(format!("/planner/steps/{}", prev.slug())));

        Ok(StepStateResponse {
            step,
            step_number: step.number(),
            total_steps: WizardStep::ALL.len(),
            options: step_options(step),
            params,
            query,
            previous,
            next,
        })
    }

    /// Run the final step: one model call, then optionally persist the plan
    pub async fn generate(
        pool: &PgPool,
        client: &GeminiClient,
        limiter: &DefaultDirectRateLimiter,
        params: WizardParams,
        save_for: Option<Uuid>,
    ) -> Result<GenerateResponse, TravelError> {
        let request = to_planner_request(&params)?;

        if limiter.check().is_err() {
            log::warn!("Planner generation rate limit reached");
            return Err(TravelError::RateLimitExceeded);
        }

        log::info!(
            "Generating {}-day plan for {}",
            request.day_count(),
            request.destination
        );

        let prompt = build_prompt(&request);
        let reply = client.generate(&prompt).await?;
        let plan = parse_plan(&reply, request.day_count())?;

        let saved_trip = match save_for {
            Some(user_id) => {
                let trip = CreateTripRequest {
                    title: plan.title.clone(),
                    region_id: request.region_id,
                    destination: Some(request.destination.clone()),
                    start_date: request.start_date,
                    end_date: request.end_date,
                    companions: Some(request.companions.clone()),
                    travel_style: request.styles.clone(),
                    pace: Some(request.pace.clone()),
                    transport: Some(request.transport.clone()),
                };
                let details = plan_details(&plan);
                let plan_id = TripRepository::create(
                    pool,
                    user_id,
                    &trip,
                    plan.summary.as_deref(),
                    true,
                    &details,
                )
                .await?;
                let stored = TripRepository::get_plan(pool, plan_id).await?;
                Some(TripService::assemble(pool, stored).await?)
            }
            None => None,
        };

        Ok(GenerateResponse { plan, saved_trip })
    }
}

fn encode_params(params: &WizardParams) -> Result<String, TravelError> {
    serde_urlencoded::to_string(params)
        .map_err(|e| TravelError::InvalidInput(format!("could not encode wizard state: {}", e)))
}

fn choice_in(value: Option<&str>, field: &str, options: &[&str]) -> Result<(), String> {
    match value.map(str::trim) {
        None | Some("") => Err(format!("{} is required", field)),
        Some(v) if options.contains(&v.to_lowercase().as_str()) => Ok(()),
        Some(v) => Err(format!("unknown {} '{}'", field, v)),
    }
}

/// Whether the fields owned by `step` are present and valid
pub fn check_step(step: WizardStep, params: &WizardParams) -> Result<(), String> {
    match step {
        WizardStep::Schedule => {
            let (start, end) = match (params.start_date, params.end_date) {
                (Some(start), Some(end)) => (start, end),
                _ => return Err("start_date and end_date are required".to_string()),
            };
            if end < start {
                return Err("end_date must not be before start_date".to_string());
            }
            if crate::models::trip_day_count(start, end) > MAX_TRIP_DAYS {
                return Err(format!("trips are limited to {} days", MAX_TRIP_DAYS));
            }
            Ok(())
        }
        WizardStep::Destination => match params.destination.as_deref().map(str::trim) {
            None | Some("") => Err("destination is required".to_string()),
            Some(d) if d.chars().count() > MAX_DESTINATION_LEN => {
                Err("destination is too long".to_string())
            }
            Some(_) => Ok(()),
        },
        WizardStep::Companions => choice_in(params.companions.as_deref(), "companions", COMPANION_OPTIONS),
        WizardStep::Style => {
            let styles = params.styles();
            if styles.is_empty() {
                return Err("choose at least one style".to_string());
            }
            match styles.iter().find(|s| !STYLE_OPTIONS.contains(&s.as_str())) {
                Some(unknown) => Err(format!("unknown style '{}'", unknown)),
                None => Ok(()),
            }
        }
        WizardStep::PaceTransport => {
            choice_in(params.pace.as_deref(), "pace", PACE_OPTIONS)?;
            choice_in(params.transport.as_deref(), "transport", TRANSPORT_OPTIONS)
        }
    }
}

fn step_options(step: WizardStep) -> Vec<StepOptions> {
    let single = |field, choices: &[&'static str]| StepOptions {
        field,
        choices: choices.to_vec(),
        multiple: false,
    };

    match step {
        WizardStep::Schedule | WizardStep::Destination => Vec::new(),
        WizardStep::Companions => vec![single("companions", COMPANION_OPTIONS)],
        WizardStep::Style => vec![StepOptions {
            field: "style",
            choices: STYLE_OPTIONS.to_vec(),
            multiple: true,
        }],
        WizardStep::PaceTransport => vec![
            single("pace", PACE_OPTIONS),
            single("transport", TRANSPORT_OPTIONS),
        ],
    }
}

/// All five steps complete, normalized
pub fn to_planner_request(params: &WizardParams) -> Result<PlannerRequest, TravelError> {
    for step in WizardStep::ALL {
        check_step(step, params).map_err(|msg| {
            TravelError::InvalidInput(format!("step '{}' is incomplete: {}", step.slug(), msg))
        })?;
    }

    let text = |v: &Option<String>| v.as_deref().unwrap_or_default().trim().to_string();

    match (params.start_date, params.end_date) {
        (Some(start_date), Some(end_date)) => Ok(PlannerRequest {
            start_date,
            end_date,
            destination: text(&params.destination),
            region_id: params.region_id,
            companions: text(&params.companions).to_lowercase(),
            styles: params.styles(),
            pace: text(&params.pace).to_lowercase(),
            transport: text(&params.transport).to_lowercase(),
        }),
        _ => Err(TravelError::InvalidInput("trip dates are required".to_string())),
    }
}

/// Natural-language prompt with the exact JSON shape expected back
pub fn build_prompt(req: &PlannerRequest) -> String {
    let day_count = req.day_count();
    format!(
        "You are a travel planner. Create a {days}-day itinerary for a trip to {destination} \
         from {start} to {end}.\n\
         Travelers: {companions}.\n\
         Travel style: {styles}.\n\
         Pace: {pace} (relaxed = 2-3 stops per day, moderate = 3-4, packed = 5 or more).\n\
         Getting around: {transport}.\n\
         Suggest real places that exist at the destination and order each day so that \
         consecutive stops are close to each other.\n\
         Answer with JSON only, no commentary, using exactly this shape:\n\
         {{\"title\": string, \"summary\": string, \"days\": [{{\"day\": number, \"items\": \
         [{{\"time\": \"HH:MM\", \"place_name\": string, \"description\": string}}]}}]}}\n\
         Include every day from 1 to {days}.",
        days = day_count,
        destination = req.destination,
        start = req.start_date.format("%Y-%m-%d"),
        end = req.end_date.format("%Y-%m-%d"),
        companions = req.companions,
        styles = req.styles.join(", "),
        pace = req.pace,
        transport = req.transport,
    )
}

/// Remove a ```json ... ``` (or bare ```) wrapper around the reply
pub fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let without_open = if let Some(rest) = trimmed.strip_prefix("```json") {
        rest
    } else if let Some(rest) = trimmed.strip_prefix("```") {
        rest
    } else {
        return trimmed;
    };
    without_open
        .trim_end()
        .strip_suffix("```")
        .unwrap_or(without_open)
        .trim()
}

/// Parse the model reply; days outside the trip are dropped, days are sorted
pub fn parse_plan(text: &str, day_count: i32) -> Result<AiPlan, TravelError> {
    let body = strip_code_fence(text);
    let mut plan: AiPlan = serde_json::from_str(body).map_err(|e| {
        log::error!("Model reply is not a valid plan: {}", e);
        TravelError::AiResponseParse(e.to_string())
    })?;

    plan.days.retain(|d| d.day >= 1 && d.day <= day_count);
    plan.days.sort_by_key(|d| d.day);
    plan.days.dedup_by_key(|d| d.day);

    if plan.days.iter().all(|d| d.items.is_empty()) {
        return Err(TravelError::AiResponseParse("plan has no items".to_string()));
    }
    plan.title = truncate_chars(&plan.title, MAX_TITLE_LEN);
    if plan.title.is_empty() {
        plan.title = "AI trip plan".to_string();
    }

    Ok(plan)
}

/// Trimmed and cut to at most `max` characters, the limits the editor enforces
fn truncate_chars(text: &str, max: usize) -> String {
    text.trim().chars().take(max).collect()
}

/// Itinerary rows for a generated plan, in reply order within each day
pub fn plan_details(plan: &AiPlan) -> Vec<NewTripDetail> {
    plan.days
        .iter()
        .flat_map(|day| {
            day.items.iter().enumerate().map(move |(index, item)| NewTripDetail {
                day_number: day.day,
                sort_order: index as i32,
                place_id: None,
                title: truncate_chars(&item.place_name, MAX_TITLE_LEN),
                memo: item
                    .description
                    .as_deref()
                    .map(|d| truncate_chars(d, MAX_MEMO_LEN)),
                start_time: item
                    .time
                    .as_deref()
                    .and_then(|t| NaiveTime::parse_from_str(t.trim(), "%H:%M").ok()),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn complete_params() -> WizardParams {
        WizardParams {
            start_date: NaiveDate::from_ymd_opt(2026, 5, 1),
            end_date: NaiveDate::from_ymd_opt(2026, 5, 3),
            destination: Some("Busan".to_string()),
            region_id: Some(2),
            companions: Some("Friends".to_string()),
            style: Some("food,nature".to_string()),
            pace: Some("moderate".to_string()),
            transport: Some("public".to_string()),
        }
    }

    #[test]
    fn test_step_state_requires_earlier_steps() {
        let params = WizardParams {
            start_date: NaiveDate::from_ymd_opt(2026, 5, 1),
            end_date: NaiveDate::from_ymd_opt(2026, 5, 3),
            ..Default::default()
        };

        assert!(PlannerService::step_state(WizardStep::Destination, params.clone()).is_ok());
        let err = PlannerService::step_state(WizardStep::Companions, params).unwrap_err();
        assert!(err.to_string().contains("destination"));
    }

    #[test]
    fn test_step_state_carries_query_forward() {
        let params = WizardParams {
            start_date: NaiveDate::from_ymd_opt(2026, 5, 1),
            end_date: NaiveDate::from_ymd_opt(2026, 5, 3),
            destination: Some("Jeju Island".to_string()),
            ..Default::default()
        };
        let state = PlannerService::step_state(WizardStep::Companions, params.clone()).unwrap();

        assert_eq!(state.step_number, 3);
        assert_eq!(state.total_steps, 5);
        assert_eq!(state.options[0].field, "companions");
        assert!(state.next.starts_with("/planner/steps/style?"));
        assert!(state.previous.as_deref().unwrap().starts_with("/planner/steps/destination?"));

        let decoded: WizardParams = serde_urlencoded::from_str(&state.query).unwrap();
        assert_eq!(decoded, params);
    }

    #[test]
    fn test_first_and_last_step_links() {
        let first = PlannerService::step_state(WizardStep::Schedule, WizardParams::default()).unwrap();
        assert_eq!(first.next, "/planner/steps/destination");
        assert!(first.previous.is_none());

        let last = PlannerService::step_state(WizardStep::PaceTransport, complete_params()).unwrap();
        assert!(last.next.starts_with("/planner/generate?"));
        assert_eq!(last.options.len(), 2);
    }

    #[test]
    fn test_check_step_rules() {
        let mut params = complete_params();
        assert!(WizardStep::ALL.iter().all(|s| check_step(*s, &params).is_ok()));

        params.end_date = NaiveDate::from_ymd_opt(2026, 4, 30);
        assert!(check_step(WizardStep::Schedule, &params).is_err());

        params = complete_params();
        params.end_date = NaiveDate::from_ymd_opt(2026, 7, 1);
        assert!(check_step(WizardStep::Schedule, &params).is_err());

        params = complete_params();
        params.destination = Some("   ".to_string());
        assert!(check_step(WizardStep::Destination, &params).is_err());

        params = complete_params();
        params.style = Some("food,skydiving".to_string());
        assert!(check_step(WizardStep::Style, &params)
            .unwrap_err()
            .contains("skydiving"));

        params = complete_params();
        params.transport = Some("teleport".to_string());
        assert!(check_step(WizardStep::PaceTransport, &params).is_err());
    }

    #[test]
    fn test_to_planner_request_normalizes() {
        let req = to_planner_request(&complete_params()).unwrap();
        assert_eq!(req.companions, "friends");
        assert_eq!(req.styles, vec!["food", "nature"]);
        assert_eq!(req.day_count(), 3);

        let mut incomplete = complete_params();
        incomplete.pace = None;
        assert!(matches!(
            to_planner_request(&incomplete),
            Err(TravelError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_build_prompt_mentions_choices() {
        let prompt = build_prompt(&to_planner_request(&complete_params()).unwrap());
        assert!(prompt.contains("3-day itinerary"));
        assert!(prompt.contains("Busan"));
        assert!(prompt.contains("2026-05-01"));
        assert!(prompt.contains("food, nature"));
        assert!(prompt.contains("\"place_name\""));
    }

    #[test]
    fn test_strip_code_fence() {
        assert_eq!(strip_code_fence("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fence("```\n{\"a\":1}\n```  "), "{\"a\":1}");
        assert_eq!(strip_code_fence("  {\"a\":1} "), "{\"a\":1}");
        assert_eq!(strip_code_fence("```json\n{\"a\":1}"), "{\"a\":1}");
    }

    #[test]
    fn test_parse_plan() {
        let reply = r#"```json
        {"title": "Busan in 3 days", "summary": "Beaches and markets",
         "days": [
           {"day": 2, "items": [{"time": "10:00", "place_name": "Gamcheon Village", "description": "Walk"}]},
           {"day": 1, "items": [{"time": "09:30", "place_name": "Haeundae Beach"},
                                 {"place_name": "Jagalchi Market", "description": "Seafood"}]},
           {"day": 9, "items": [{"place_name": "Out of range"}]}
         ]}
        ```"#;

        let plan = parse_plan(reply, 3).unwrap();
        assert_eq!(plan.title, "Busan in 3 days");
        assert_eq!(plan.days.iter().map(|d| d.day).collect::<Vec<_>>(), vec![1, 2]);

        let details = plan_details(&plan);
        assert_eq!(details.len(), 3);
        assert_eq!(details[0].title, "Haeundae Beach");
        assert_eq!(details[0].start_time, NaiveTime::from_hms_opt(9, 30, 0));
        assert_eq!(details[1].sort_order, 1);
        assert_eq!(details[1].start_time, None);
        assert_eq!(details[2].day_number, 2);
    }

    #[test]
    fn test_generated_text_fits_editor_limits() {
        let reply = serde_json::json!({
            "title": "T".repeat(150),
            "days": [{"day": 1, "items": [{
                "place_name": "P".repeat(120),
                "description": "D".repeat(800)
            }]}]
        })
        .to_string();

        let plan = parse_plan(&reply, 1).unwrap();
        assert_eq!(plan.title.chars().count(), 100);

        let details = plan_details(&plan);
        assert_eq!(details[0].title.chars().count(), 100);
        assert_eq!(details[0].memo.as_ref().map(|m| m.chars().count()), Some(500));
    }

    #[test]
    fn test_parse_plan_rejects_bad_replies() {
        assert!(matches!(
            parse_plan("Sorry, I can't help with that.", 3),
            Err(TravelError::AiResponseParse(_))
        ));
        assert!(parse_plan(r#"{"title":"x","days":[{"day":1,"items":[]}]}"#, 3).is_err());
    }

    #[test]
    fn test_rate_limiter_quota() {
        let limiter = planner_rate_limiter(2);
        assert!(limiter.check().is_ok());
        assert!(limiter.check().is_ok());
        assert!(limiter.check().is_err());
    }
}
