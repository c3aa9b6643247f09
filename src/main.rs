use actix_cors::Cors;
use actix_web::http::header;
use actix_web::{middleware::Logger, web, App, HttpResponse, HttpServer};
use sqlx::{sqlite::SqliteConnectOptions, SqlitePool};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod alert_handlers;
mod config;
mod db;
mod error;
mod inspection_handlers;
mod inventory_handlers;
mod machine_handlers;
mod models;
mod schedule_handlers;

use config::{load_config, Config};

pub struct AppState {
    pub db_pool: SqlitePool,
    pub config: Config,
}

// ==================== ROUTES ====================

/// All API routes under /api. Collection-level paths (stats, alerts, week,
/// generate) are registered before the `{id}` routes so they are not
/// swallowed by the id matcher.
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("", web::get().to(api_index))
            .route("/health", web::get().to(health))
            .service(
                web::scope("/schedules")
                    .route("", web::get().to(schedule_handlers::get_schedules))
                    .route("", web::post().to(schedule_handlers::create_schedule))
                    .route("/week/{date}", web::get().to(schedule_handlers::get_week_schedules))
                    .route("/{id}", web::get().to(schedule_handlers::get_schedule))
                    .route("/{id}", web::put().to(schedule_handlers::update_schedule))
                    .route("/{id}", web::delete().to(schedule_handlers::delete_schedule)),
            )
            .service(
                web::scope("/inventory")
                    .route("", web::get().to(inventory_handlers::get_inventory))
                    .route("", web::post().to(inventory_handlers::create_inventory_item))
                    .route("/alerts", web::get().to(inventory_handlers::get_stock_alerts))
                    .route("/{id}", web::get().to(inventory_handlers::get_inventory_item))
                    .route("/{id}", web::put().to(inventory_handlers::update_inventory_item))
                    .route("/{id}/usage", web::post().to(inventory_handlers::record_usage))
                    .route("/{id}", web::delete().to(inventory_handlers::delete_inventory_item)),
            )
            .service(
                web::scope("/machines")
                    .route("", web::get().to(machine_handlers::get_machines))
                    .route("", web::post().to(machine_handlers::create_machine))
                    .route("/stats", web::get().to(machine_handlers::get_machine_stats))
                    .route("/{id}", web::get().to(machine_handlers::get_machine))
                    .route("/{id}", web::put().to(machine_handlers::update_machine))
                    .route("/{id}/job", web::post().to(machine_handlers::assign_job))
                    .route("/{id}/complete", web::post().to(machine_handlers::complete_job))
                    .route("/{id}", web::delete().to(machine_handlers::delete_machine)),
            )
            .service(
                web::scope("/inspections")
                    .route("", web::get().to(inspection_handlers::get_inspections))
                    .route("", web::post().to(inspection_handlers::create_inspection))
                    .route("/stats", web::get().to(inspection_handlers::get_inspection_stats))
                    .route("/{id}", web::get().to(inspection_handlers::get_inspection))
                    .route("/{id}", web::put().to(inspection_handlers::update_inspection))
                    .route("/{id}", web::delete().to(inspection_handlers::delete_inspection)),
            )
            .service(
                web::scope("/alerts")
                    .route("", web::get().to(alert_handlers::get_alerts))
                    .route("", web::post().to(alert_handlers::create_alert))
                    .route("/generate", web::post().to(alert_handlers::generate_alerts))
                    .route("/{id}", web::get().to(alert_handlers::get_alert))
                    .route("/{id}/read", web::patch().to(alert_handlers::mark_alert_read))
                    .route("/{id}", web::delete().to(alert_handlers::delete_alert)),
            ),
    );
}

async fn api_index() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "name": "DyeTrack API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "schedules": "/api/schedules",
            "inventory": "/api/inventory",
            "machines": "/api/machines",
            "inspections": "/api/inspections",
            "alerts": "/api/alerts",
        },
    }))
}

async fn health() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}

// ==================== MAIN ====================

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = load_config()?;
    setup_logging(&config)?;

    let pool = create_database_pool(&config.database).await?;
    db::run_migrations(&pool).await?;

    let app_state = Arc::new(AppState {
        db_pool: pool,
        config: config.clone(),
    });

    let bind_address = format!("{}:{}", config.server.host, config.server.port);
    log::info!("Starting server at http://{}", bind_address);

    HttpServer::new(move || {
        let cors = setup_cors(&config.server.allowed_origins);

        App::new()
            .wrap(cors)
            .wrap(Logger::default())
            .app_data(web::Data::new(app_state.clone()))
            .configure(configure_api)
    })
    .bind(&bind_address)?
    .run()
    .await?;

    Ok(())
}

fn setup_logging(config: &Config) -> anyhow::Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(config.logging.level.as_str()));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    Ok(())
}

fn setup_cors(allowed_origins: &[String]) -> Cors {
    let mut cors = Cors::default()
        .allowed_methods(vec!["GET", "POST", "PUT", "PATCH", "DELETE", "OPTIONS"])
        .allowed_headers(vec![header::CONTENT_TYPE, header::ACCEPT])
        .max_age(3600);

    if allowed_origins.contains(&"*".to_string()) {
        cors = cors.allow_any_origin();
    } else {
        for origin in allowed_origins {
            if origin.is_empty() {
                continue;
            }
            cors = cors.allowed_origin(origin);
        }
    }

    cors
}

async fn create_database_pool(db_config: &config::DatabaseConfig) -> anyhow::Result<SqlitePool> {
    let filename = db_config
        .url
        .strip_prefix("sqlite:")
        .unwrap_or(&db_config.url);

    let options = SqliteConnectOptions::new()
        .filename(filename)
        .create_if_missing(true);

    let pool = sqlx::sqlite::SqlitePoolOptions::new()
        .max_connections(db_config.max_connections)
        .connect_with(options)
        .await?;

    Ok(pool)
}

#[cfg(test)]
pub(crate) mod test_util {
    use super::*;

    /// Fresh in-memory database per test. A single connection keeps every
    /// query on the same :memory: instance.
    pub async fn test_state() -> web::Data<Arc<AppState>> {
        let pool = sqlx::sqlite::SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        db::run_migrations(&pool).await.unwrap();

        web::Data::new(Arc::new(AppState {
            db_pool: pool,
            config: Config::default(),
        }))
    }
}
