// src/alert_handlers.rs
//! Handlers for operational alerts: CRUD, the read-state flag and
//! auto-generation from inventory and machine conditions.

use actix_web::{web, HttpResponse};
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::error::{ApiError, ApiResult};
use crate::models::{
    Alert, AlertCategory, AlertType, CreateAlertRequest, Inventory, Machine, StockStatus,
};
use crate::AppState;

#[derive(Debug, serde::Deserialize)]
pub struct AlertListQuery {
    #[serde(rename = "type")]
    pub alert_type: Option<String>,
    pub category: Option<String>,
    pub read: Option<bool>,
}

/// Newest first.
pub async fn get_alerts(
    app_state: web::Data<Arc<AppState>>,
    query: web::Query<AlertListQuery>,
) -> ApiResult<HttpResponse> {
    let mut sql = String::from("SELECT * FROM alerts");
    let mut conditions: Vec<&str> = Vec::new();
    let mut params: Vec<String> = Vec::new();

    if let Some(ref alert_type) = query.alert_type {
        conditions.push("type = ?");
        params.push(alert_type.clone());
    }
    if let Some(ref category) = query.category {
        conditions.push("category = ?");
        params.push(category.clone());
    }
    if let Some(read) = query.read {
        conditions.push("read = ?");
        params.push(if read { "1".to_string() } else { "0".to_string() });
    }

    if !conditions.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&conditions.join(" AND "));
    }
    sql.push_str(" ORDER BY created_at DESC");

    let mut select = sqlx::query_as::<_, Alert>(&sql);
    for param in &params {
        select = select.bind(param);
    }
    let alerts = select.fetch_all(&app_state.db_pool).await?;

    Ok(HttpResponse::Ok().json(alerts))
}

pub async fn get_alert(
    app_state: web::Data<Arc<AppState>>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let alert_id = path.into_inner();

    let alert: Option<Alert> = sqlx::query_as("SELECT * FROM alerts WHERE id = ?")
        .bind(&alert_id)
        .fetch_optional(&app_state.db_pool)
        .await?;

    match alert {
        Some(a) => Ok(HttpResponse::Ok().json(a)),
        None => Err(ApiError::alert_not_found(&alert_id)),
    }
}

pub async fn create_alert(
    app_state: web::Data<Arc<AppState>>,
    alert: web::Json<CreateAlertRequest>,
) -> ApiResult<HttpResponse> {
    alert.validate()?;

    let created = insert_alert(
        &app_state.db_pool,
        alert.alert_type,
        alert.category,
        &alert.title,
        &alert.message,
        alert.actionable.unwrap_or(false),
        alert.related_id.as_deref(),
    )
    .await?;

    Ok(HttpResponse::Created().json(created))
}

/// Flip the read flag to true, touching nothing else. Safe to repeat.
pub async fn mark_alert_read(
    app_state: web::Data<Arc<AppState>>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let alert_id = path.into_inner();

    let result = sqlx::query("UPDATE alerts SET read = 1, updated_at = ? WHERE id = ?")
        .bind(Utc::now())
        .bind(&alert_id)
        .execute(&app_state.db_pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::alert_not_found(&alert_id));
    }

    let updated: Alert = sqlx::query_as("SELECT * FROM alerts WHERE id = ?")
        .bind(&alert_id)
        .fetch_one(&app_state.db_pool)
        .await?;

    Ok(HttpResponse::Ok().json(updated))
}

/// Scan inventory and the machine floor for alert-worthy conditions. An item
/// or machine that already has an unread alert in its category is skipped so
/// repeated scans do not pile up duplicates.
pub async fn generate_alerts(app_state: web::Data<Arc<AppState>>) -> ApiResult<HttpResponse> {
    let mut generated: Vec<Alert> = Vec::new();

    let low_stock: Vec<Inventory> =
        sqlx::query_as("SELECT * FROM inventory WHERE status IN ('low', 'critical')")
            .fetch_all(&app_state.db_pool)
            .await?;

    for item in &low_stock {
        if has_unread_alert(&app_state.db_pool, AlertCategory::Inventory, &item.id).await? {
            continue;
        }

        let critical = item.status == StockStatus::Critical;
        let alert = insert_alert(
            &app_state.db_pool,
            if critical { AlertType::Critical } else { AlertType::Warning },
            AlertCategory::Inventory,
            &format!("{} Stock Level", if critical { "Critical" } else { "Low" }),
            &format!(
                "{} is at {}% stock level ({} kg remaining)",
                item.name, item.stock_level, item.stock
            ),
            true,
            Some(&item.id),
        )
        .await?;
        generated.push(alert);
    }

    let threshold = app_state.config.thresholds.efficiency_warn;
    let running: Vec<Machine> = sqlx::query_as("SELECT * FROM machines WHERE status = 'running'")
        .fetch_all(&app_state.db_pool)
        .await?;

    for machine in &running {
        if machine.efficiency == 0 || machine.efficiency >= threshold {
            continue;
        }
        if has_unread_alert(&app_state.db_pool, AlertCategory::Machine, &machine.id).await? {
            continue;
        }

        let alert = insert_alert(
            &app_state.db_pool,
            AlertType::Warning,
            AlertCategory::Machine,
            "Machine Efficiency Drop",
            &format!(
                "{} efficiency dropped to {}% - below threshold",
                machine.name, machine.efficiency
            ),
            true,
            Some(&machine.id),
        )
        .await?;
        generated.push(alert);
    }

    if !generated.is_empty() {
        log::info!("Generated {} new alerts", generated.len());
    }

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": format!("Generated {} new alerts", generated.len()),
        "alerts": generated,
    })))
}

pub async fn delete_alert(
    app_state: web::Data<Arc<AppState>>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let alert_id = path.into_inner();

    let result = sqlx::query("DELETE FROM alerts WHERE id = ?")
        .bind(&alert_id)
        .execute(&app_state.db_pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::alert_not_found(&alert_id));
    }

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Alert deleted successfully"
    })))
}

async fn has_unread_alert(
    pool: &sqlx::SqlitePool,
    category: AlertCategory,
    related_id: &str,
) -> Result<bool, sqlx::Error> {
    let existing: Option<(String,)> = sqlx::query_as(
        "SELECT id FROM alerts WHERE category = ? AND related_id = ? AND read = 0",
    )
    .bind(category)
    .bind(related_id)
    .fetch_optional(pool)
    .await?;

    Ok(existing.is_some())
}

async fn insert_alert(
    pool: &sqlx::SqlitePool,
    alert_type: AlertType,
    category: AlertCategory,
    title: &str,
    message: &str,
    actionable: bool,
    related_id: Option<&str>,
) -> Result<Alert, sqlx::Error> {
    let id = Uuid::new_v4().to_string();
    let now = Utc::now();

    sqlx::query(
        r#"INSERT INTO alerts
           (id, type, category, title, message, read, actionable, related_id,
            created_at, updated_at)
           VALUES (?, ?, ?, ?, ?, 0, ?, ?, ?, ?)"#,
    )
    .bind(&id)
    .bind(alert_type)
    .bind(category)
    .bind(title)
    .bind(message)
    .bind(actionable)
    .bind(related_id)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await?;

    sqlx::query_as("SELECT * FROM alerts WHERE id = ?")
        .bind(&id)
        .fetch_one(pool)
        .await
}
