// src/main.rs
// DOCUMENTATION: Application entry point
// PURPOSE: Initialize config, database, caches and start HTTP server

mod auth;
mod config;
mod db;
mod errors;
mod handlers;
mod models;
mod services;

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use config::Config;
use dotenv::dotenv;
use services::{planner_rate_limiter, start_cleanup_task, GeminiClient, ListCache};
use std::io;
use std::sync::Arc;

#[actix_web::main]
async fn main() -> io::Result<()> {
    // 1. Load environment variables
    dotenv().ok();

    // 2. Load configuration
    let config = Config::from_env();

    // 3. Initialize logging
    if std::env::var("RUST_LOG").is_err() {
        let log_level = if !config.log_level.is_empty() {
            config.log_level.clone()
        } else {
            "info,actix_web=info,sqlx=warn".to_string()
        };
        std::env::set_var("RUST_LOG", log_level);
    }
    env_logger::init();

    if let Err(e) = config.validate() {
        log::error!("Configuration error: {}", e);
        std::process::exit(1);
    }

    log::info!("Starting travel-planner-api...");
    log::info!("Environment: {}", config.environment);
    log::info!(
        "Server Address: {}:{}",
        config.server_address,
        config.server_port
    );

    // 4. Initialize database connection pool
    let pool = match config::init_db_pool(&config).await {
        Ok(pool) => pool,
        Err(e) => {
            log::error!("Failed to connect to database: {}", e);
            std::process::exit(1);
        }
    };

    // 5. List caches (home page and place listings)
    let cache = Arc::new(ListCache::new(config.cache_ttl_seconds));
    log::info!("Initialized list cache (TTL: {}s)", config.cache_ttl_seconds);
    start_cleanup_task(cache.clone(), config.cache_ttl_seconds.max(60));

    // 6. AI planner client and its rate limiter
    let gemini = web::Data::new(GeminiClient::from_config(&config));
    let limiter = web::Data::new(planner_rate_limiter(config.planner_requests_per_minute));
    log::info!(
        "AI planner: model {}, {} generations/minute",
        config.gemini_model,
        config.planner_requests_per_minute
    );

    // 7. Start HTTP server
    let server_addr = format!("{}:{}", config.server_address, config.server_port);
    let config_clone = config.clone();

    HttpServer::new(move || {
        let cors = if config_clone.cors_allowed_origin == "*" && !config_clone.is_production() {
            Cors::permissive()
        } else {
            Cors::default()
                .allowed_origin(&config_clone.cors_allowed_origin)
                .allowed_methods(vec!["GET", "POST", "PUT", "DELETE"])
                .allowed_headers(vec![
                    actix_web::http::header::AUTHORIZATION,
                    actix_web::http::header::CONTENT_TYPE,
                ])
                .max_age(3600)
        };

        App::new()
            // Application state
            .app_data(web::Data::new(pool.clone()))
            .app_data(web::Data::new(config_clone.clone()))
            .app_data(web::Data::new(cache.clone()))
            .app_data(gemini.clone())
            .app_data(limiter.clone())
            // Middleware
            .wrap(cors)
            .wrap(Logger::default())
            .wrap(actix_web::middleware::Compress::default())
            // Routes
            .configure(handlers::health_config)
            .configure(handlers::places_config)
            .configure(handlers::reviews_config)
            .configure(handlers::trips_config)
            .configure(handlers::planner_config)
    })
    .bind(&server_addr)?
    .run()
    .await
}
