// src/handlers/health.rs
// DOCUMENTATION: Health check handler
// PURPOSE: Simple endpoint to verify service status

use crate::services::ListCache;
use actix_web::{web, HttpResponse, Responder};
use serde_json::json;
use std::sync::Arc;

pub async fn health_check(cache: Option<web::Data<Arc<ListCache>>>) -> impl Responder {
    let cache_stats = match cache {
        Some(cache) => Some(cache.stats().await),
        None => None,
    };

    HttpResponse::Ok().json(json!({
        "status": "ok",
        "service": "travel-planner-api",
        "version": env!("CARGO_PKG_VERSION"),
        "cache": cache_stats
    }))
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health_check));
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{test, App};

    #[actix_web::test]
    async fn test_health_check() {
        let app = test::init_service(App::new().configure(config)).await;
        let req = test::TestRequest::get().uri("/health").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["status"], "ok");
        assert_eq!(body["service"], "travel-planner-api");
        assert!(body["cache"].is_null());
    }

    #[actix_web::test]
    async fn test_health_reports_cache() {
        let cache = Arc::new(ListCache::new(60));
        cache.set("home:v1".to_string(), "{}".to_string()).await;

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(cache))
                .configure(config),
        )
        .await;
        let req = test::TestRequest::get().uri("/health").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["cache"]["active_entries"], 1);
    }
}
