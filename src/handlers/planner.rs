// src/handlers/planner.rs
// DOCUMENTATION: HTTP handlers for the AI planner wizard
// PURPOSE: Wizard state travels in the query string from step to step

use crate::auth::MaybeUser;
use crate::errors::TravelError;
use crate::models::{GenerateQuery, WizardParams, WizardStep};
use crate::services::{GeminiClient, PlannerService};
use actix_web::{web, HttpResponse, Responder};
use governor::DefaultDirectRateLimiter;
use sqlx::PgPool;

/// GET /planner/steps/{step}
pub async fn step_state(
    path: web::Path<String>,
    params: web::Query<WizardParams>,
) -> Result<impl Responder, TravelError> {
    let slug = path.into_inner();
    let step = WizardStep::from_slug(&slug)
        .ok_or_else(|| TravelError::NotFound(format!("Planner step '{}'", slug)))?;

    let state = PlannerService::step_state(step, params.into_inner())?;
    Ok(HttpResponse::Ok().json(state))
}

/// POST /planner/generate
/// `?save=true` stores the plan for an authenticated caller
pub async fn generate(
    pool: web::Data<PgPool>,
    client: web::Data<GeminiClient>,
    limiter: web::Data<DefaultDirectRateLimiter>,
    viewer: MaybeUser,
    params: web::Query<WizardParams>,
    options: web::Query<GenerateQuery>,
) -> Result<impl Responder, TravelError> {
    let save_for = match (options.save, viewer.user_id()) {
        (true, Some(user_id)) => Some(user_id),
        (true, None) => {
            return Err(TravelError::Unauthorized(
                "sign in to save a generated plan".to_string(),
            ))
        }
        (false, _) => None,
    };

    let result = PlannerService::generate(
        pool.get_ref(),
        client.get_ref(),
        limiter.get_ref(),
        params.into_inner(),
        save_for,
    )
    .await?;

    if result.saved_trip.is_some() {
        Ok(HttpResponse::Created().json(result))
    } else {
        Ok(HttpResponse::Ok().json(result))
    }
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/planner")
            .route("/steps/{step}", web::get().to(step_state))
            .route("/generate", web::post().to(generate)),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_config;
    use crate::services::planner_rate_limiter;
    use actix_web::{http::StatusCode, test, App};
    use sqlx::postgres::PgPoolOptions;

    const COMPLETE: &str = "start_date=2026-05-01&end_date=2026-05-02&destination=Gyeongju\
        &companions=family&style=culture&pace=relaxed&transport=car";

    macro_rules! planner_app {
        () => {{
            let config = test_config();
            let pool = PgPoolOptions::new()
                .connect_lazy("postgresql://localhost/unused")
                .unwrap();
            test::init_service(
                App::new()
                    .app_data(web::Data::new(pool))
                    .app_data(web::Data::new(GeminiClient::from_config(&config)))
                    .app_data(web::Data::new(planner_rate_limiter(5)))
                    .app_data(web::Data::new(config))
                    .configure(config_routes),
            )
            .await
        }};
    }

    fn config_routes(cfg: &mut web::ServiceConfig) {
        config(cfg);
    }

    #[actix_web::test]
    async fn test_step_endpoint() {
        let app = planner_app!();

        let req = test::TestRequest::get()
            .uri("/planner/steps/destination?start_date=2026-05-01&end_date=2026-05-02")
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["step"], "destination");
        assert_eq!(body["step_number"], 2);
        assert_eq!(
            body["next"],
            "/planner/steps/companions?start_date=2026-05-01&end_date=2026-05-02"
        );

        let req = test::TestRequest::get()
            .uri("/planner/steps/style?start_date=2026-05-01&end_date=2026-05-02")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let req = test::TestRequest::get().uri("/planner/steps/budget").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn test_generate_validation_and_configuration() {
        let app = planner_app!();

        let req = test::TestRequest::post()
            .uri("/planner/generate?start_date=2026-05-01&end_date=2026-05-02")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let req = test::TestRequest::post()
            .uri(&format!("/planner/generate?{}&save=true", COMPLETE))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        // No API key in the test config
        let req = test::TestRequest::post()
            .uri(&format!("/planner/generate?{}", COMPLETE))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
