// src/inspection_handlers.rs
//! Handlers for color inspections and their quality statistics.

use actix_web::{web, HttpResponse};
use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::error::{ApiError, ApiResult};
use crate::models::{
    CreateInspectionRequest, Inspection, InspectionStatus, UpdateInspectionRequest,
};
use crate::AppState;

#[derive(Debug, serde::Deserialize)]
pub struct InspectionListQuery {
    pub status: Option<String>,
    pub date: Option<String>,
}

#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InspectionStats {
    pub total: i64,
    pub approved: i64,
    pub pending: i64,
    pub rejected: i64,
    pub approval_rate: i64,
    pub avg_delta_e: String,
}

/// Quality summary over all inspections. The delta E average covers only
/// measured records and is reported to two decimals.
pub(crate) fn compute_inspection_stats(inspections: &[Inspection]) -> InspectionStats {
    let by_status = |status: InspectionStatus| -> i64 {
        inspections.iter().filter(|i| i.status == status).count() as i64
    };

    let total = inspections.len() as i64;
    let approved = by_status(InspectionStatus::Approved);
    let approval_rate = if total > 0 {
        ((approved as f64 / total as f64) * 100.0).round() as i64
    } else {
        0
    };

    let measured: Vec<f64> = inspections.iter().filter_map(|i| i.delta_e).collect();
    let avg_delta_e = if measured.is_empty() {
        "0.00".to_string()
    } else {
        format!("{:.2}", measured.iter().sum::<f64>() / measured.len() as f64)
    };

    InspectionStats {
        total,
        approved,
        pending: by_status(InspectionStatus::Pending),
        rejected: by_status(InspectionStatus::Rejected),
        approval_rate,
        avg_delta_e,
    }
}

/// Newest first.
pub async fn get_inspections(
    app_state: web::Data<Arc<AppState>>,
    query: web::Query<InspectionListQuery>,
) -> ApiResult<HttpResponse> {
    let mut sql = String::from("SELECT * FROM inspections");
    let mut conditions: Vec<&str> = Vec::new();
    let mut params: Vec<String> = Vec::new();

    if let Some(ref status) = query.status {
        conditions.push("status = ?");
        params.push(status.clone());
    }
    if let Some(ref date) = query.date {
        conditions.push("date = ?");
        params.push(date.clone());
    }

    if !conditions.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&conditions.join(" AND "));
    }
    sql.push_str(" ORDER BY created_at DESC");

    let mut select = sqlx::query_as::<_, Inspection>(&sql);
    for param in &params {
        select = select.bind(param);
    }
    let inspections = select.fetch_all(&app_state.db_pool).await?;

    Ok(HttpResponse::Ok().json(inspections))
}

/// Recomputed from the full collection on every call.
pub async fn get_inspection_stats(app_state: web::Data<Arc<AppState>>) -> ApiResult<HttpResponse> {
    let inspections: Vec<Inspection> = sqlx::query_as("SELECT * FROM inspections")
        .fetch_all(&app_state.db_pool)
        .await?;

    Ok(HttpResponse::Ok().json(compute_inspection_stats(&inspections)))
}

pub async fn get_inspection(
    app_state: web::Data<Arc<AppState>>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let inspection_id = path.into_inner();

    let inspection: Option<Inspection> = sqlx::query_as("SELECT * FROM inspections WHERE id = ?")
        .bind(&inspection_id)
        .fetch_optional(&app_state.db_pool)
        .await?;

    match inspection {
        Some(i) => Ok(HttpResponse::Ok().json(i)),
        None => Err(ApiError::inspection_not_found(&inspection_id)),
    }
}

pub async fn create_inspection(
    app_state: web::Data<Arc<AppState>>,
    inspection: web::Json<CreateInspectionRequest>,
) -> ApiResult<HttpResponse> {
    inspection.validate()?;

    let id = Uuid::new_v4().to_string();
    let now = Utc::now();

    sqlx::query(
        r#"INSERT INTO inspections
           (id, date, color, client, lot_no, delta_e, status, notes, created_at, updated_at)
           VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
    )
    .bind(&id)
    .bind(&inspection.date)
    .bind(&inspection.color)
    .bind(&inspection.client)
    .bind(&inspection.lot_no)
    .bind(inspection.delta_e)
    .bind(inspection.status.unwrap_or_default())
    .bind(inspection.notes.as_deref().unwrap_or(""))
    .bind(now)
    .bind(now)
    .execute(&app_state.db_pool)
    .await?;

    let created: Inspection = sqlx::query_as("SELECT * FROM inspections WHERE id = ?")
        .bind(&id)
        .fetch_one(&app_state.db_pool)
        .await?;

    Ok(HttpResponse::Created().json(created))
}

pub async fn update_inspection(
    app_state: web::Data<Arc<AppState>>,
    path: web::Path<String>,
    update: web::Json<UpdateInspectionRequest>,
) -> ApiResult<HttpResponse> {
    update.validate()?;
    let inspection_id = path.into_inner();

    let existing: Option<Inspection> = sqlx::query_as("SELECT * FROM inspections WHERE id = ?")
        .bind(&inspection_id)
        .fetch_optional(&app_state.db_pool)
        .await?;

    let mut inspection = match existing {
        Some(i) => i,
        None => return Err(ApiError::inspection_not_found(&inspection_id)),
    };

    if let Some(ref date) = update.date {
        inspection.date = date.clone();
    }
    if let Some(ref color) = update.color {
        inspection.color = color.clone();
    }
    if let Some(ref client) = update.client {
        inspection.client = client.clone();
    }
    if let Some(ref lot_no) = update.lot_no {
        inspection.lot_no = lot_no.clone();
    }
    if let Some(delta_e) = update.delta_e {
        inspection.delta_e = Some(delta_e);
    }
    if let Some(status) = update.status {
        inspection.status = status;
    }
    if let Some(ref notes) = update.notes {
        inspection.notes = notes.clone();
    }

    sqlx::query(
        r#"UPDATE inspections
           SET date = ?, color = ?, client = ?, lot_no = ?, delta_e = ?, status = ?,
               notes = ?, updated_at = ?
           WHERE id = ?"#,
    )
    .bind(&inspection.date)
    .bind(&inspection.color)
    .bind(&inspection.client)
    .bind(&inspection.lot_no)
    .bind(inspection.delta_e)
    .bind(inspection.status)
    .bind(&inspection.notes)
    .bind(Utc::now())
    .bind(&inspection_id)
    .execute(&app_state.db_pool)
    .await?;

    let updated: Inspection = sqlx::query_as("SELECT * FROM inspections WHERE id = ?")
        .bind(&inspection_id)
        .fetch_one(&app_state.db_pool)
        .await?;

    Ok(HttpResponse::Ok().json(updated))
}

pub async fn delete_inspection(
    app_state: web::Data<Arc<AppState>>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let inspection_id = path.into_inner();

    let result = sqlx::query("DELETE FROM inspections WHERE id = ?")
        .bind(&inspection_id)
        .execute(&app_state.db_pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::inspection_not_found(&inspection_id));
    }

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Inspection deleted successfully"
    })))
}
