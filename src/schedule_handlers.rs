// src/schedule_handlers.rs
//! Handlers for the production schedule calendar.

use actix_web::{web, HttpResponse};
use chrono::{Duration, NaiveDate, Utc};
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::error::{ApiError, ApiResult};
use crate::models::{CreateScheduleRequest, Schedule, UpdateScheduleRequest};
use crate::AppState;

#[derive(Debug, serde::Deserialize)]
pub struct ScheduleListQuery {
    pub status: Option<String>,
    pub date: Option<String>,
}

/// List schedules, optionally filtered by exact status and/or date.
/// Latest production day first, slots within a day in time order.
pub async fn get_schedules(
    app_state: web::Data<Arc<AppState>>,
    query: web::Query<ScheduleListQuery>,
) -> ApiResult<HttpResponse> {
    let mut sql = String::from("SELECT * FROM schedules");
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
    sql.push_str(" ORDER BY date DESC, time ASC");

    let mut select = sqlx::query_as::<_, Schedule>(&sql);
    for param in &params {
        select = select.bind(param);
    }
    let schedules = select.fetch_all(&app_state.db_pool).await?;

    Ok(HttpResponse::Ok().json(schedules))
}

/// Calendar week view: all schedules in the seven days starting at {date}.
pub async fn get_week_schedules(
    app_state: web::Data<Arc<AppState>>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let start = NaiveDate::parse_from_str(&path.into_inner(), "%Y-%m-%d")
        .map_err(|_| ApiError::BadRequest("Invalid date, expected YYYY-MM-DD".to_string()))?;
    let end = start + Duration::days(6);

    let schedules: Vec<Schedule> = sqlx::query_as(
        "SELECT * FROM schedules WHERE date >= ? AND date <= ? ORDER BY date ASC, time ASC",
    )
    .bind(start.format("%Y-%m-%d").to_string())
    .bind(end.format("%Y-%m-%d").to_string())
    .fetch_all(&app_state.db_pool)
    .await?;

    Ok(HttpResponse::Ok().json(schedules))
}

pub async fn get_schedule(
    app_state: web::Data<Arc<AppState>>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let schedule_id = path.into_inner();

    let schedule: Option<Schedule> = sqlx::query_as("SELECT * FROM schedules WHERE id = ?")
        .bind(&schedule_id)
        .fetch_optional(&app_state.db_pool)
        .await?;

    match schedule {
        Some(s) => Ok(HttpResponse::Ok().json(s)),
        None => Err(ApiError::schedule_not_found(&schedule_id)),
    }
}

pub async fn create_schedule(
    app_state: web::Data<Arc<AppState>>,
    schedule: web::Json<CreateScheduleRequest>,
) -> ApiResult<HttpResponse> {
    schedule.validate()?;

    let id = Uuid::new_v4().to_string();
    let now = Utc::now();

    sqlx::query(
        r#"INSERT INTO schedules
           (id, date, time, machine, party, color, lot_no, quantity, duration,
            priority, status, created_at, updated_at)
           VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
    )
    .bind(&id)
    .bind(&schedule.date)
    .bind(&schedule.time)
    .bind(&schedule.machine)
    .bind(&schedule.party)
    .bind(&schedule.color)
    .bind(&schedule.lot_no)
    .bind(&schedule.quantity)
    .bind(&schedule.duration)
    .bind(schedule.priority.unwrap_or_default())
    .bind(schedule.status.unwrap_or_default())
    .bind(now)
    .bind(now)
    .execute(&app_state.db_pool)
    .await?;

    let created: Schedule = sqlx::query_as("SELECT * FROM schedules WHERE id = ?")
        .bind(&id)
        .fetch_one(&app_state.db_pool)
        .await?;

    Ok(HttpResponse::Created().json(created))
}

pub async fn update_schedule(
    app_state: web::Data<Arc<AppState>>,
    path: web::Path<String>,
    update: web::Json<UpdateScheduleRequest>,
) -> ApiResult<HttpResponse> {
    update.validate()?;
    let schedule_id = path.into_inner();

    let existing: Option<Schedule> = sqlx::query_as("SELECT * FROM schedules WHERE id = ?")
        .bind(&schedule_id)
        .fetch_optional(&app_state.db_pool)
        .await?;

    let mut schedule = match existing {
        Some(s) => s,
        None => return Err(ApiError::schedule_not_found(&schedule_id)),
    };

    // Absent fields keep their stored values
    if let Some(ref date) = update.date {
        schedule.date = date.clone();
    }
    if let Some(ref time) = update.time {
        schedule.time = time.clone();
    }
    if let Some(ref machine) = update.machine {
        schedule.machine = machine.clone();
    }
    if let Some(ref party) = update.party {
        schedule.party = party.clone();
    }
    if let Some(ref color) = update.color {
        schedule.color = color.clone();
    }
    if let Some(ref lot_no) = update.lot_no {
        schedule.lot_no = lot_no.clone();
    }
    if let Some(ref quantity) = update.quantity {
        schedule.quantity = quantity.clone();
    }
    if let Some(ref duration) = update.duration {
        schedule.duration = duration.clone();
    }
    if let Some(priority) = update.priority {
        schedule.priority = priority;
    }
    if let Some(status) = update.status {
        schedule.status = status;
    }

    sqlx::query(
        r#"UPDATE schedules
           SET date = ?, time = ?, machine = ?, party = ?, color = ?, lot_no = ?,
               quantity = ?, duration = ?, priority = ?, status = ?, updated_at = ?
           WHERE id = ?"#,
    )
    .bind(&schedule.date)
    .bind(&schedule.time)
    .bind(&schedule.machine)
    .bind(&schedule.party)
    .bind(&schedule.color)
    .bind(&schedule.lot_no)
    .bind(&schedule.quantity)
    .bind(&schedule.duration)
    .bind(schedule.priority)
    .bind(schedule.status)
    .bind(Utc::now())
    .bind(&schedule_id)
    .execute(&app_state.db_pool)
    .await?;

    let updated: Schedule = sqlx::query_as("SELECT * FROM schedules WHERE id = ?")
        .bind(&schedule_id)
        .fetch_one(&app_state.db_pool)
        .await?;

    Ok(HttpResponse::Ok().json(updated))
}

pub async fn delete_schedule(
    app_state: web::Data<Arc<AppState>>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let schedule_id = path.into_inner();

    let result = sqlx::query("DELETE FROM schedules WHERE id = ?")
        .bind(&schedule_id)
        .execute(&app_state.db_pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::schedule_not_found(&schedule_id));
    }

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Schedule deleted successfully"
    })))
}
