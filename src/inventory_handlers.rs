// src/inventory_handlers.rs
//! Handlers for dye and chemical stock.
//!
//! `stock_level` and `status` are derived here on every write so the stored
//! urgency can never contradict the stock figure.

use actix_web::{web, HttpResponse};
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::config::ThresholdConfig;
use crate::error::{ApiError, ApiResult};
use crate::models::{
    CreateInventoryRequest, Inventory, RecordUsageRequest, StockStatus, UpdateInventoryRequest,
    WeeklyUsage,
};
use crate::AppState;

#[derive(Debug, serde::Deserialize)]
pub struct InventoryListQuery {
    pub category: Option<String>,
    pub status: Option<String>,
}

/// Stock level (%) and derived urgency for a given stock against capacity.
pub(crate) fn derive_stock_status(
    stock: f64,
    max_capacity: f64,
    thresholds: &ThresholdConfig,
) -> (i64, StockStatus) {
    let stock_level = ((stock / max_capacity) * 100.0).round() as i64;
    let status = if stock_level <= thresholds.stock_critical_pct {
        StockStatus::Critical
    } else if stock_level <= thresholds.stock_low_pct {
        StockStatus::Low
    } else {
        StockStatus::Ok
    };
    (stock_level, status)
}

pub async fn get_inventory(
    app_state: web::Data<Arc<AppState>>,
    query: web::Query<InventoryListQuery>,
) -> ApiResult<HttpResponse> {
    let mut sql = String::from("SELECT * FROM inventory");
    let mut conditions: Vec<&str> = Vec::new();
    let mut params: Vec<String> = Vec::new();

    if let Some(ref category) = query.category {
        conditions.push("category = ?");
        params.push(category.clone());
    }
    if let Some(ref status) = query.status {
        conditions.push("status = ?");
        params.push(status.clone());
    }

    if !conditions.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&conditions.join(" AND "));
    }
    sql.push_str(" ORDER BY name ASC");

    let mut select = sqlx::query_as::<_, Inventory>(&sql);
    for param in &params {
        select = select.bind(param);
    }
    let items = select.fetch_all(&app_state.db_pool).await?;

    Ok(HttpResponse::Ok().json(items))
}

/// Low/critical stock, most urgent first: critical before low, then by the
/// smallest remaining stock.
pub async fn get_stock_alerts(app_state: web::Data<Arc<AppState>>) -> ApiResult<HttpResponse> {
    let items: Vec<Inventory> = sqlx::query_as(
        r#"SELECT * FROM inventory
           WHERE status IN ('low', 'critical')
           ORDER BY CASE status WHEN 'critical' THEN 0 ELSE 1 END, stock ASC"#,
    )
    .fetch_all(&app_state.db_pool)
    .await?;

    Ok(HttpResponse::Ok().json(items))
}

pub async fn get_inventory_item(
    app_state: web::Data<Arc<AppState>>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let item_id = path.into_inner();

    let item: Option<Inventory> = sqlx::query_as("SELECT * FROM inventory WHERE id = ?")
        .bind(&item_id)
        .fetch_optional(&app_state.db_pool)
        .await?;

    match item {
        Some(i) => Ok(HttpResponse::Ok().json(i)),
        None => Err(ApiError::item_not_found(&item_id)),
    }
}

pub async fn create_inventory_item(
    app_state: web::Data<Arc<AppState>>,
    item: web::Json<CreateInventoryRequest>,
) -> ApiResult<HttpResponse> {
    item.validate()?;

    let id = Uuid::new_v4().to_string();
    let now = Utc::now();
    let min_threshold = item.min_threshold.unwrap_or(100.0);
    let max_capacity = item.max_capacity.unwrap_or(500.0);
    let usage = item.weekly_usage.clone().unwrap_or_default();
    let (stock_level, status) =
        derive_stock_status(item.stock, max_capacity, &app_state.config.thresholds);

    sqlx::query(
        r#"INSERT INTO inventory
           (id, name, category, stock, min_threshold, max_capacity,
            usage_sun, usage_mon, usage_tue, usage_wed, usage_thu, usage_fri,
            stock_level, status, created_at, updated_at)
           VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
    )
    .bind(&id)
    .bind(&item.name)
    .bind(item.category)
    .bind(item.stock)
    .bind(min_threshold)
    .bind(max_capacity)
    .bind(usage.sun)
    .bind(usage.mon)
    .bind(usage.tue)
    .bind(usage.wed)
    .bind(usage.thu)
    .bind(usage.fri)
    .bind(stock_level)
    .bind(status)
    .bind(now)
    .bind(now)
    .execute(&app_state.db_pool)
    .await
    .map_err(|e| match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            ApiError::item_already_exists(&item.name)
        }
        _ => ApiError::from(e),
    })?;

    let created: Inventory = sqlx::query_as("SELECT * FROM inventory WHERE id = ?")
        .bind(&id)
        .fetch_one(&app_state.db_pool)
        .await?;

    Ok(HttpResponse::Created().json(created))
}

pub async fn update_inventory_item(
    app_state: web::Data<Arc<AppState>>,
    path: web::Path<String>,
    update: web::Json<UpdateInventoryRequest>,
) -> ApiResult<HttpResponse> {
    update.validate()?;
    let item_id = path.into_inner();

    let existing: Option<Inventory> = sqlx::query_as("SELECT * FROM inventory WHERE id = ?")
        .bind(&item_id)
        .fetch_optional(&app_state.db_pool)
        .await?;

    let mut item = match existing {
        Some(i) => i,
        None => return Err(ApiError::item_not_found(&item_id)),
    };

    if let Some(ref name) = update.name {
        item.name = name.clone();
    }
    if let Some(category) = update.category {
        item.category = category;
    }
    if let Some(stock) = update.stock {
        item.stock = stock;
    }
    if let Some(min_threshold) = update.min_threshold {
        item.min_threshold = min_threshold;
    }
    if let Some(max_capacity) = update.max_capacity {
        item.max_capacity = max_capacity;
    }

    let (stock_level, status) =
        derive_stock_status(item.stock, item.max_capacity, &app_state.config.thresholds);

    sqlx::query(
        r#"UPDATE inventory
           SET name = ?, category = ?, stock = ?, min_threshold = ?, max_capacity = ?,
               stock_level = ?, status = ?, updated_at = ?
           WHERE id = ?"#,
    )
    .bind(&item.name)
    .bind(item.category)
    .bind(item.stock)
    .bind(item.min_threshold)
    .bind(item.max_capacity)
    .bind(stock_level)
    .bind(status)
    .bind(Utc::now())
    .bind(&item_id)
    .execute(&app_state.db_pool)
    .await
    .map_err(|e| match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            ApiError::item_already_exists(&item.name)
        }
        _ => ApiError::from(e),
    })?;

    let updated: Inventory = sqlx::query_as("SELECT * FROM inventory WHERE id = ?")
        .bind(&item_id)
        .fetch_one(&app_state.db_pool)
        .await?;

    Ok(HttpResponse::Ok().json(updated))
}

/// Record one day's consumption: stores the figure against the day and draws
/// it down from stock (floored at zero).
pub async fn record_usage(
    app_state: web::Data<Arc<AppState>>,
    path: web::Path<String>,
    usage: web::Json<RecordUsageRequest>,
) -> ApiResult<HttpResponse> {
    let item_id = path.into_inner();

    let existing: Option<Inventory> = sqlx::query_as("SELECT * FROM inventory WHERE id = ?")
        .bind(&item_id)
        .fetch_optional(&app_state.db_pool)
        .await?;

    let item = match existing {
        Some(i) => i,
        None => return Err(ApiError::item_not_found(&item_id)),
    };

    usage.validate()?;

    let day_column = match usage.day.as_str() {
        "sun" => "usage_sun",
        "mon" => "usage_mon",
        "tue" => "usage_tue",
        "wed" => "usage_wed",
        "thu" => "usage_thu",
        "fri" => "usage_fri",
        other => {
            return Err(ApiError::BadRequest(format!(
                "Invalid day '{}', expected one of sun/mon/tue/wed/thu/fri",
                other
            )))
        }
    };

    let new_stock = (item.stock - usage.amount).max(0.0);
    let (stock_level, status) =
        derive_stock_status(new_stock, item.max_capacity, &app_state.config.thresholds);

    // day_column comes from the match above, never from the request string
    let sql = format!(
        "UPDATE inventory SET {} = ?, stock = ?, stock_level = ?, status = ?, updated_at = ? WHERE id = ?",
        day_column
    );
    sqlx::query(&sql)
        .bind(usage.amount)
        .bind(new_stock)
        .bind(stock_level)
        .bind(status)
        .bind(Utc::now())
        .bind(&item_id)
        .execute(&app_state.db_pool)
        .await?;

    let updated: Inventory = sqlx::query_as("SELECT * FROM inventory WHERE id = ?")
        .bind(&item_id)
        .fetch_one(&app_state.db_pool)
        .await?;

    Ok(HttpResponse::Ok().json(updated))
}

pub async fn delete_inventory_item(
    app_state: web::Data<Arc<AppState>>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let item_id = path.into_inner();

    let result = sqlx::query("DELETE FROM inventory WHERE id = ?")
        .bind(&item_id)
        .execute(&app_state.db_pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::item_not_found(&item_id));
    }

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Item deleted successfully"
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::test_state;
    use actix_web::http::StatusCode;
    use actix_web::{test, App};
    use serde_json::json;

    #[::core::prelude::v1::test]
    fn test_derive_stock_status_thresholds() {
        let thresholds = ThresholdConfig::default();
        // 500 capacity: 100kg -> 20% critical, 250kg -> 50% low, 400kg -> 80% ok
        assert_eq!(
            derive_stock_status(100.0, 500.0, &thresholds),
            (20, StockStatus::Critical)
        );
        assert_eq!(
            derive_stock_status(250.0, 500.0, &thresholds),
            (50, StockStatus::Low)
        );
        assert_eq!(
            derive_stock_status(400.0, 500.0, &thresholds),
            (80, StockStatus::Ok)
        );
        assert_eq!(
            derive_stock_status(0.0, 500.0, &thresholds),
            (0, StockStatus::Critical)
        );
    }

    fn item_body(name: &str, stock: f64) -> serde_json::Value {
        json!({
            "name": name,
            "category": "Dye",
            "stock": stock,
            "maxCapacity": 500.0,
        })
    }

    #[actix_rt::test]
    async fn test_create_derives_status() {
        let state = test_state().await;
        let app = test::init_service(
            App::new()
                .app_data(state.clone())
                .configure(crate::configure_api),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/inventory")
            .set_json(item_body("BLACK B (SF) Divine", 75.0))
            .to_request();
        let created: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(created["status"], "critical");
        assert_eq!(created["stockLevel"], 15);
    }

    #[actix_rt::test]
    async fn test_duplicate_name_is_rejected() {
        let state = test_state().await;
        let app = test::init_service(
            App::new()
                .app_data(state.clone())
                .configure(crate::configure_api),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/inventory")
            .set_json(item_body("Wetting Oil", 400.0))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);

        let req = test::TestRequest::post()
            .uri("/api/inventory")
            .set_json(item_body("Wetting Oil", 100.0))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_rt::test]
    async fn test_stock_alerts_most_urgent_first() {
        let state = test_state().await;
        let app = test::init_service(
            App::new()
                .app_data(state.clone())
                .configure(crate::configure_api),
        )
        .await;

        // Statuses derived from stock/500: ok, low, critical, ok, low
        for (name, stock) in [
            ("A", 400.0),
            ("B", 240.0),
            ("C", 50.0),
            ("D", 450.0),
            ("E", 200.0),
        ] {
            let req = test::TestRequest::post()
                .uri("/api/inventory")
                .set_json(item_body(name, stock))
                .to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::CREATED);
        }

        let req = test::TestRequest::get()
            .uri("/api/inventory/alerts")
            .to_request();
        let list: Vec<serde_json::Value> = test::call_and_read_body_json(&app, req).await;
        let names: Vec<&str> = list.iter().map(|i| i["name"].as_str().unwrap()).collect();
        // Critical C first, then low items by stock ascending
        assert_eq!(names, vec!["C", "E", "B"]);
    }

    #[actix_rt::test]
    async fn test_record_usage_draws_down_stock() {
        let state = test_state().await;
        let app = test::init_service(
            App::new()
                .app_data(state.clone())
                .configure(crate::configure_api),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/inventory")
            .set_json(item_body("Soda Ash", 300.0))
            .to_request();
        let created: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        let id = created["id"].as_str().unwrap();
        assert_eq!(created["status"], "ok");

        let req = test::TestRequest::post()
            .uri(&format!("/api/inventory/{}/usage", id))
            .set_json(json!({ "day": "mon", "amount": 60.0 }))
            .to_request();
        let updated: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(updated["stock"], 240.0);
        assert_eq!(updated["weeklyUsage"]["mon"], 60.0);
        // 240/500 = 48% -> low
        assert_eq!(updated["status"], "low");
    }

    #[actix_rt::test]
    async fn test_record_usage_rejects_bad_day() {
        let state = test_state().await;
        let app = test::init_service(
            App::new()
                .app_data(state.clone())
                .configure(crate::configure_api),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/inventory")
            .set_json(item_body("Salt", 300.0))
            .to_request();
        let created: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        let id = created["id"].as_str().unwrap();

        let req = test::TestRequest::post()
            .uri(&format!("/api/inventory/{}/usage", id))
            .set_json(json!({ "day": "sat", "amount": 10.0 }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_rt::test]
    async fn test_update_rederives_status_from_stock() {
        let state = test_state().await;
        let app = test::init_service(
            App::new()
                .app_data(state.clone())
                .configure(crate::configure_api),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/inventory")
            .set_json(item_body("BLUE RR", 400.0))
            .to_request();
        let created: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        let id = created["id"].as_str().unwrap();
        assert_eq!(created["status"], "ok");

        let req = test::TestRequest::put()
            .uri(&format!("/api/inventory/{}", id))
            .set_json(json!({ "stock": 40.0 }))
            .to_request();
        let updated: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(updated["status"], "critical");
        assert_eq!(updated["stockLevel"], 8);
        // Untouched fields survive
        assert_eq!(updated["name"], "BLUE RR");
        assert_eq!(updated["category"], "Dye");
    }

    #[actix_rt::test]
    async fn test_filter_by_category() {
        let state = test_state().await;
        let app = test::init_service(
            App::new()
                .app_data(state.clone())
                .configure(crate::configure_api),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/inventory")
            .set_json(item_body("Navy Dye", 400.0))
            .to_request();
        test::call_service(&app, req).await;

        let req = test::TestRequest::post()
            .uri("/api/inventory")
            .set_json(json!({
                "name": "Soaping Oil",
                "category": "Chemical",
                "stock": 300.0,
            }))
            .to_request();
        test::call_service(&app, req).await;

        let req = test::TestRequest::get()
            .uri("/api/inventory?category=Chemical")
            .to_request();
        let list: Vec<serde_json::Value> = test::call_and_read_body_json(&app, req).await;
        assert_eq!(list.len(), 1);
        assert_eq!(list[0]["name"], "Soaping Oil");
    }
}
