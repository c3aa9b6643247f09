// src/machine_handlers.rs
//! Handlers for dyeing machines: CRUD, floor statistics and the
//! assign-job / complete-job transitions.

use actix_web::{web, HttpResponse};
use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::error::{ApiError, ApiResult};
use crate::models::{
    AssignJobRequest, CreateMachineRequest, Machine, MachineStatus, UpdateMachineRequest,
};
use crate::AppState;

#[derive(Debug, serde::Deserialize)]
pub struct MachineListQuery {
    pub status: Option<String>,
}

#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MachineStats {
    pub total: i64,
    pub running: i64,
    pub idle: i64,
    pub maintenance: i64,
    pub avg_efficiency: i64,
    pub total_production: i64,
}

/// Summary over the whole machine floor. Efficiency is averaged only over
/// machines reporting a non-zero figure; production sums the leading number
/// of each running machine's quantity ("331 kg" counts 331).
pub(crate) fn compute_machine_stats(machines: &[Machine]) -> MachineStats {
    let by_status = |status: MachineStatus| -> i64 {
        machines.iter().filter(|m| m.status == status).count() as i64
    };

    let efficiencies: Vec<i64> = machines
        .iter()
        .filter(|m| m.efficiency > 0)
        .map(|m| m.efficiency)
        .collect();
    let avg_efficiency = if efficiencies.is_empty() {
        0
    } else {
        (efficiencies.iter().sum::<i64>() as f64 / efficiencies.len() as f64).round() as i64
    };

    let total_production = machines
        .iter()
        .filter(|m| m.status == MachineStatus::Running)
        .map(|m| leading_number(&m.quantity))
        .sum();

    MachineStats {
        total: machines.len() as i64,
        running: by_status(MachineStatus::Running),
        idle: by_status(MachineStatus::Idle),
        maintenance: by_status(MachineStatus::Maintenance),
        avg_efficiency,
        total_production,
    }
}

fn leading_number(quantity: &str) -> i64 {
    quantity
        .trim()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect::<String>()
        .parse()
        .unwrap_or(0)
}

pub async fn get_machines(
    app_state: web::Data<Arc<AppState>>,
    query: web::Query<MachineListQuery>,
) -> ApiResult<HttpResponse> {
    let mut sql = String::from("SELECT * FROM machines");
    let mut params: Vec<String> = Vec::new();

    if let Some(ref status) = query.status {
        sql.push_str(" WHERE status = ?");
        params.push(status.clone());
    }
    sql.push_str(" ORDER BY machine_id ASC");

    let mut select = sqlx::query_as::<_, Machine>(&sql);
    for param in &params {
        select = select.bind(param);
    }
    let machines = select.fetch_all(&app_state.db_pool).await?;

    Ok(HttpResponse::Ok().json(machines))
}

/// Recomputed from the full collection on every call.
pub async fn get_machine_stats(app_state: web::Data<Arc<AppState>>) -> ApiResult<HttpResponse> {
    let machines: Vec<Machine> = sqlx::query_as("SELECT * FROM machines")
        .fetch_all(&app_state.db_pool)
        .await?;

    Ok(HttpResponse::Ok().json(compute_machine_stats(&machines)))
}

pub async fn get_machine(
    app_state: web::Data<Arc<AppState>>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let machine_id = path.into_inner();

    let machine: Option<Machine> = sqlx::query_as("SELECT * FROM machines WHERE id = ?")
        .bind(&machine_id)
        .fetch_optional(&app_state.db_pool)
        .await?;

    match machine {
        Some(m) => Ok(HttpResponse::Ok().json(m)),
        None => Err(ApiError::machine_not_found(&machine_id)),
    }
}

pub async fn create_machine(
    app_state: web::Data<Arc<AppState>>,
    machine: web::Json<CreateMachineRequest>,
) -> ApiResult<HttpResponse> {
    machine.validate()?;

    let id = Uuid::new_v4().to_string();
    let now = Utc::now();

    sqlx::query(
        r#"INSERT INTO machines
           (id, machine_id, name, status, party, color, lot_no, quantity, stage,
            efficiency, runtime, start_time, created_at, updated_at)
           VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, NULL, ?, ?)"#,
    )
    .bind(&id)
    .bind(&machine.machine_id)
    .bind(&machine.name)
    .bind(machine.status.unwrap_or_default())
    .bind(machine.party.as_deref().unwrap_or(""))
    .bind(machine.color.as_deref().unwrap_or(""))
    .bind(machine.lot_no.as_deref().unwrap_or(""))
    .bind(machine.quantity.as_deref().unwrap_or(""))
    .bind(machine.stage.as_deref().unwrap_or(""))
    .bind(machine.efficiency.unwrap_or(0))
    .bind(machine.runtime.as_deref().unwrap_or(""))
    .bind(now)
    .bind(now)
    .execute(&app_state.db_pool)
    .await
    .map_err(|e| match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            ApiError::machine_already_exists(&machine.machine_id)
        }
        _ => ApiError::from(e),
    })?;

    let created: Machine = sqlx::query_as("SELECT * FROM machines WHERE id = ?")
        .bind(&id)
        .fetch_one(&app_state.db_pool)
        .await?;

    Ok(HttpResponse::Created().json(created))
}

pub async fn update_machine(
    app_state: web::Data<Arc<AppState>>,
    path: web::Path<String>,
    update: web::Json<UpdateMachineRequest>,
) -> ApiResult<HttpResponse> {
    update.validate()?;
    let machine_id = path.into_inner();

    let existing: Option<Machine> = sqlx::query_as("SELECT * FROM machines WHERE id = ?")
        .bind(&machine_id)
        .fetch_optional(&app_state.db_pool)
        .await?;

    let mut machine = match existing {
        Some(m) => m,
        None => return Err(ApiError::machine_not_found(&machine_id)),
    };

    if let Some(ref name) = update.name {
        machine.name = name.clone();
    }
    if let Some(status) = update.status {
        machine.status = status;
    }
    if let Some(ref party) = update.party {
        machine.party = party.clone();
    }
    if let Some(ref color) = update.color {
        machine.color = color.clone();
    }
    if let Some(ref lot_no) = update.lot_no {
        machine.lot_no = lot_no.clone();
    }
    if let Some(ref quantity) = update.quantity {
        machine.quantity = quantity.clone();
    }
    if let Some(ref stage) = update.stage {
        machine.stage = stage.clone();
    }
    if let Some(efficiency) = update.efficiency {
        machine.efficiency = efficiency;
    }
    if let Some(ref runtime) = update.runtime {
        machine.runtime = runtime.clone();
    }

    sqlx::query(
        r#"UPDATE machines
           SET name = ?, status = ?, party = ?, color = ?, lot_no = ?, quantity = ?,
               stage = ?, efficiency = ?, runtime = ?, updated_at = ?
           WHERE id = ?"#,
    )
    .bind(&machine.name)
    .bind(machine.status)
    .bind(&machine.party)
    .bind(&machine.color)
    .bind(&machine.lot_no)
    .bind(&machine.quantity)
    .bind(&machine.stage)
    .bind(machine.efficiency)
    .bind(&machine.runtime)
    .bind(Utc::now())
    .bind(&machine_id)
    .execute(&app_state.db_pool)
    .await?;

    let updated: Machine = sqlx::query_as("SELECT * FROM machines WHERE id = ?")
        .bind(&machine_id)
        .fetch_one(&app_state.db_pool)
        .await?;

    Ok(HttpResponse::Ok().json(updated))
}

/// Put a machine on a new dyeing job. An already-running machine is simply
/// handed the new job; the overwrite is logged so the floor can audit it.
pub async fn assign_job(
    app_state: web::Data<Arc<AppState>>,
    path: web::Path<String>,
    job: web::Json<AssignJobRequest>,
) -> ApiResult<HttpResponse> {
    let machine_id = path.into_inner();

    let existing: Option<Machine> = sqlx::query_as("SELECT * FROM machines WHERE id = ?")
        .bind(&machine_id)
        .fetch_optional(&app_state.db_pool)
        .await?;

    let machine = match existing {
        Some(m) => m,
        None => return Err(ApiError::machine_not_found(&machine_id)),
    };

    job.validate()?;

    if machine.status == MachineStatus::Running {
        log::warn!(
            "Machine {} re-assigned while running, replacing lot {}",
            machine.machine_id,
            machine.lot_no
        );
    }

    let now = Utc::now();

    sqlx::query(
        r#"UPDATE machines
           SET status = 'running', party = ?, color = ?, lot_no = ?, quantity = ?,
               stage = ?, efficiency = ?, runtime = ?, start_time = ?, updated_at = ?
           WHERE id = ?"#,
    )
    .bind(&job.party)
    .bind(&job.color)
    .bind(&job.lot_no)
    .bind(&job.quantity)
    .bind(job.stage.as_deref().unwrap_or("Dyeing"))
    .bind(job.efficiency.unwrap_or(0))
    .bind(job.runtime.as_deref().unwrap_or("0h 0m"))
    .bind(now)
    .bind(now)
    .bind(&machine_id)
    .execute(&app_state.db_pool)
    .await?;

    let updated: Machine = sqlx::query_as("SELECT * FROM machines WHERE id = ?")
        .bind(&machine_id)
        .fetch_one(&app_state.db_pool)
        .await?;

    log::info!(
        "Machine {} assigned lot {} for {}",
        updated.machine_id,
        updated.lot_no,
        updated.party
    );

    Ok(HttpResponse::Ok().json(updated))
}

/// Return a machine to idle and clear every job field. Calling this on a
/// machine that was never running is a field-wise no-op.
pub async fn complete_job(
    app_state: web::Data<Arc<AppState>>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let machine_id = path.into_inner();

    let result = sqlx::query(
        r#"UPDATE machines
           SET status = 'idle', party = '', color = '', lot_no = '', quantity = '',
               stage = '', efficiency = 0, runtime = '', start_time = NULL, updated_at = ?
           WHERE id = ?"#,
    )
    .bind(Utc::now())
    .bind(&machine_id)
    .execute(&app_state.db_pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::machine_not_found(&machine_id));
    }

    let updated: Machine = sqlx::query_as("SELECT * FROM machines WHERE id = ?")
        .bind(&machine_id)
        .fetch_one(&app_state.db_pool)
        .await?;

    log::info!("Machine {} completed its job", updated.machine_id);

    Ok(HttpResponse::Ok().json(updated))
}

pub async fn delete_machine(
    app_state: web::Data<Arc<AppState>>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let machine_id = path.into_inner();

    let result = sqlx::query("DELETE FROM machines WHERE id = ?")
        .bind(&machine_id)
        .execute(&app_state.db_pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::machine_not_found(&machine_id));
    }

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Machine deleted successfully"
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::test_state;
    use actix_web::http::StatusCode;
    use actix_web::{test, App};
    use chrono::Utc;
    use serde_json::json;

    fn machine(status: MachineStatus, efficiency: i64, quantity: &str) -> Machine {
        let now = Utc::now();
        Machine {
            id: Uuid::new_v4().to_string(),
            machine_id: "SF-01".to_string(),
            name: "Softflow 1".to_string(),
            status,
            party: String::new(),
            color: String::new(),
            lot_no: String::new(),
            quantity: quantity.to_string(),
            stage: String::new(),
            efficiency,
            runtime: String::new(),
            start_time: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[::core::prelude::v1::test]
    fn test_stats_over_empty_collection() {
        let stats = compute_machine_stats(&[]);
        assert_eq!(stats.total, 0);
        assert_eq!(stats.avg_efficiency, 0);
        assert_eq!(stats.total_production, 0);
    }

    #[::core::prelude::v1::test]
    fn test_stats_all_zero_efficiency() {
        let machines = vec![
            machine(MachineStatus::Idle, 0, ""),
            machine(MachineStatus::Maintenance, 0, ""),
        ];
        let stats = compute_machine_stats(&machines);
        assert_eq!(stats.avg_efficiency, 0);
        assert_eq!(stats.idle, 1);
        assert_eq!(stats.maintenance, 1);
    }

    #[::core::prelude::v1::test]
    fn test_stats_counts_and_averages() {
        let machines = vec![
            machine(MachineStatus::Running, 94, "331 kg"),
            machine(MachineStatus::Running, 88, "504 kg"),
            machine(MachineStatus::Idle, 0, ""),
            machine(MachineStatus::Maintenance, 0, ""),
        ];
        let stats = compute_machine_stats(&machines);
        assert_eq!(stats.total, 4);
        assert_eq!(stats.running, 2);
        assert_eq!(stats.idle, 1);
        assert_eq!(stats.maintenance, 1);
        // (94 + 88) / 2 = 91
        assert_eq!(stats.avg_efficiency, 91);
        assert_eq!(stats.total_production, 835);
    }

    #[::core::prelude::v1::test]
    fn test_leading_number_parsing() {
        assert_eq!(leading_number("331 kg"), 331);
        assert_eq!(leading_number("  504kg"), 504);
        assert_eq!(leading_number("kg"), 0);
        assert_eq!(leading_number(""), 0);
    }

    fn machine_body(machine_id: &str) -> serde_json::Value {
        json!({ "machineId": machine_id, "name": format!("Softflow {}", machine_id) })
    }

    #[actix_rt::test]
    async fn test_assign_then_complete_clears_job_fields() {
        let state = test_state().await;
        let app = test::init_service(
            App::new()
                .app_data(state.clone())
                .configure(crate::configure_api),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/machines")
            .set_json(machine_body("SF-01"))
            .to_request();
        let created: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        let id = created["id"].as_str().unwrap();
        assert_eq!(created["status"], "idle");

        let req = test::TestRequest::post()
            .uri(&format!("/api/machines/{}/job", id))
            .set_json(json!({
                "party": "LUX",
                "color": "Navy",
                "lotNo": "2384/2385",
                "quantity": "331 kg",
            }))
            .to_request();
        let running: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(running["status"], "running");
        assert_eq!(running["stage"], "Dyeing");
        assert_eq!(running["runtime"], "0h 0m");
        assert_eq!(running["efficiency"], 0);
        assert!(!running["startTime"].is_null());

        let req = test::TestRequest::post()
            .uri(&format!("/api/machines/{}/complete", id))
            .to_request();
        let done: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(done["status"], "idle");
        assert_eq!(done["party"], "");
        assert_eq!(done["color"], "");
        assert_eq!(done["lotNo"], "");
        assert_eq!(done["quantity"], "");
        assert_eq!(done["stage"], "");
        assert_eq!(done["efficiency"], 0);
        assert_eq!(done["runtime"], "");
        assert!(done["startTime"].is_null());
    }

    #[actix_rt::test]
    async fn test_assign_overwrites_running_job() {
        let state = test_state().await;
        let app = test::init_service(
            App::new()
                .app_data(state.clone())
                .configure(crate::configure_api),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/machines")
            .set_json(machine_body("SF-02"))
            .to_request();
        let created: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        let id = created["id"].as_str().unwrap();

        for lot in ["001", "002"] {
            let req = test::TestRequest::post()
                .uri(&format!("/api/machines/{}/job", id))
                .set_json(json!({
                    "party": "JG",
                    "color": "Petrol Blue",
                    "lotNo": lot,
                    "quantity": "504 kg",
                }))
                .to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::OK);
        }

        let req = test::TestRequest::get()
            .uri(&format!("/api/machines/{}", id))
            .to_request();
        let fetched: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(fetched["lotNo"], "002");
        assert_eq!(fetched["status"], "running");
    }

    #[actix_rt::test]
    async fn test_lifecycle_unknown_machine_not_found() {
        let state = test_state().await;
        let app = test::init_service(
            App::new()
                .app_data(state.clone())
                .configure(crate::configure_api),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/machines/nope/job")
            .set_json(json!({
                "party": "LUX",
                "color": "Navy",
                "lotNo": "1",
                "quantity": "1 kg",
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let req = test::TestRequest::post()
            .uri("/api/machines/nope/complete")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_rt::test]
    async fn test_stats_route_not_captured_by_id() {
        let state = test_state().await;
        let app = test::init_service(
            App::new()
                .app_data(state.clone())
                .configure(crate::configure_api),
        )
        .await;

        let req = test::TestRequest::get().uri("/api/machines/stats").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let stats: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(stats["total"], 0);
        assert_eq!(stats["avgEfficiency"], 0);
    }

    #[actix_rt::test]
    async fn test_list_sorted_by_machine_id() {
        let state = test_state().await;
        let app = test::init_service(
            App::new()
                .app_data(state.clone())
                .configure(crate::configure_api),
        )
        .await;

        for machine_id in ["SF-03", "SF-01", "SF-02"] {
            let req = test::TestRequest::post()
                .uri("/api/machines")
                .set_json(machine_body(machine_id))
                .to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::CREATED);
        }

        let req = test::TestRequest::get().uri("/api/machines").to_request();
        let list: Vec<serde_json::Value> = test::call_and_read_body_json(&app, req).await;
        let ids: Vec<&str> = list.iter().map(|m| m["machineId"].as_str().unwrap()).collect();
        assert_eq!(ids, vec!["SF-01", "SF-02", "SF-03"]);
    }
}
