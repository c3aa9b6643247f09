// src/models.rs
//! Data models for the dyeing production tracker.
//!
//! Each resource has a persisted document struct plus typed Create/Update
//! request structs. Update requests use `Option` per field: absent fields
//! are left untouched by the handlers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

// ==================== SCHEDULE ====================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "TEXT", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum SchedulePriority {
    High,
    Medium,
    Low,
}

impl Default for SchedulePriority {
    fn default() -> Self {
        SchedulePriority::Medium
    }
}

impl SchedulePriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            SchedulePriority::High => "high",
            SchedulePriority::Medium => "medium",
            SchedulePriority::Low => "low",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "TEXT", rename_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum ScheduleStatus {
    Scheduled,
    InProgress,
    Completed,
    Cancelled,
}

impl Default for ScheduleStatus {
    fn default() -> Self {
        ScheduleStatus::Scheduled
    }
}

impl ScheduleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScheduleStatus::Scheduled => "scheduled",
            ScheduleStatus::InProgress => "in-progress",
            ScheduleStatus::Completed => "completed",
            ScheduleStatus::Cancelled => "cancelled",
        }
    }
}

/// A dyeing batch slot on the production calendar.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Schedule {
    pub id: String,
    pub date: String,
    pub time: String,
    pub machine: String,
    pub party: String,
    pub color: String,
    pub lot_no: String,
    pub quantity: String,
    pub duration: String,
    pub priority: SchedulePriority,
    pub status: ScheduleStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateScheduleRequest {
    #[validate(length(min = 1, max = 10, message = "Date is required (YYYY-MM-DD)"))]
    pub date: String,

    #[validate(length(min = 1, max = 10, message = "Time is required (HH:MM)"))]
    pub time: String,

    #[validate(length(min = 1, max = 50, message = "Machine is required"))]
    pub machine: String,

    #[validate(length(min = 1, max = 255, message = "Party is required"))]
    pub party: String,

    #[validate(length(min = 1, max = 255, message = "Color is required"))]
    pub color: String,

    #[validate(length(min = 1, max = 100, message = "Lot number is required"))]
    pub lot_no: String,

    #[validate(length(min = 1, max = 50, message = "Quantity is required"))]
    pub quantity: String,

    #[validate(length(min = 1, max = 50, message = "Duration is required"))]
    pub duration: String,

    pub priority: Option<SchedulePriority>,
    pub status: Option<ScheduleStatus>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateScheduleRequest {
    #[validate(length(min = 1, max = 10, message = "Date cannot be empty"))]
    pub date: Option<String>,

    #[validate(length(min = 1, max = 10, message = "Time cannot be empty"))]
    pub time: Option<String>,

    #[validate(length(min = 1, max = 50, message = "Machine cannot be empty"))]
    pub machine: Option<String>,

    #[validate(length(min = 1, max = 255, message = "Party cannot be empty"))]
    pub party: Option<String>,

    #[validate(length(min = 1, max = 255, message = "Color cannot be empty"))]
    pub color: Option<String>,

    #[validate(length(min = 1, max = 100, message = "Lot number cannot be empty"))]
    pub lot_no: Option<String>,

    #[validate(length(min = 1, max = 50, message = "Quantity cannot be empty"))]
    pub quantity: Option<String>,

    #[validate(length(min = 1, max = 50, message = "Duration cannot be empty"))]
    pub duration: Option<String>,

    pub priority: Option<SchedulePriority>,
    pub status: Option<ScheduleStatus>,
}

// ==================== INVENTORY ====================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "TEXT", rename_all = "PascalCase")]
#[serde(rename_all = "PascalCase")]
pub enum InventoryCategory {
    Dye,
    Chemical,
}

/// Stock urgency, derived from the stock level against configured thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "TEXT", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum StockStatus {
    Ok,
    Low,
    Critical,
}

impl StockStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            StockStatus::Ok => "ok",
            StockStatus::Low => "low",
            StockStatus::Critical => "critical",
        }
    }
}

/// Recorded consumption per working day (the plant runs Sunday-Friday).
#[derive(Debug, Clone, Default, Serialize, Deserialize, sqlx::FromRow)]
pub struct WeeklyUsage {
    #[sqlx(rename = "usage_sun")]
    pub sun: f64,
    #[sqlx(rename = "usage_mon")]
    pub mon: f64,
    #[sqlx(rename = "usage_tue")]
    pub tue: f64,
    #[sqlx(rename = "usage_wed")]
    pub wed: f64,
    #[sqlx(rename = "usage_thu")]
    pub thu: f64,
    #[sqlx(rename = "usage_fri")]
    pub fri: f64,
}

/// A dye or chemical stock item.
///
/// `stock_level` and `status` are derived from `stock` / `max_capacity` on
/// every write; they are never accepted from clients.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Inventory {
    pub id: String,
    pub name: String,
    pub category: InventoryCategory,
    pub stock: f64,
    pub min_threshold: f64,
    pub max_capacity: f64,
    #[sqlx(flatten)]
    pub weekly_usage: WeeklyUsage,
    pub stock_level: i64,
    pub status: StockStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateInventoryRequest {
    #[validate(length(min = 1, max = 255, message = "Name is required"))]
    pub name: String,

    pub category: InventoryCategory,

    #[validate(range(min = 0.0, message = "Stock must be non-negative"))]
    pub stock: f64,

    #[validate(range(min = 0.0, message = "Minimum threshold must be non-negative"))]
    pub min_threshold: Option<f64>,

    #[validate(range(min = 1.0, message = "Max capacity must be positive"))]
    pub max_capacity: Option<f64>,

    pub weekly_usage: Option<WeeklyUsage>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateInventoryRequest {
    #[validate(length(min = 1, max = 255, message = "Name cannot be empty"))]
    pub name: Option<String>,

    pub category: Option<InventoryCategory>,

    #[validate(range(min = 0.0, message = "Stock must be non-negative"))]
    pub stock: Option<f64>,

    #[validate(range(min = 0.0, message = "Minimum threshold must be non-negative"))]
    pub min_threshold: Option<f64>,

    #[validate(range(min = 1.0, message = "Max capacity must be positive"))]
    pub max_capacity: Option<f64>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct RecordUsageRequest {
    pub day: String,

    #[validate(range(min = 0.0, message = "Amount must be non-negative"))]
    pub amount: f64,
}

// ==================== MACHINE ====================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "TEXT", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum MachineStatus {
    Idle,
    Running,
    Maintenance,
}

impl Default for MachineStatus {
    fn default() -> Self {
        MachineStatus::Idle
    }
}

impl MachineStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MachineStatus::Idle => "idle",
            MachineStatus::Running => "running",
            MachineStatus::Maintenance => "maintenance",
        }
    }
}

impl std::fmt::Display for MachineStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A dyeing machine. Job fields (party through start_time) carry data only
/// while the machine is running; CompleteJob resets all of them.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Machine {
    pub id: String,
    pub machine_id: String,
    pub name: String,
    pub status: MachineStatus,
    pub party: String,
    pub color: String,
    pub lot_no: String,
    pub quantity: String,
    pub stage: String,
    pub efficiency: i64,
    pub runtime: String,
    pub start_time: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateMachineRequest {
    #[validate(length(min = 1, max = 50, message = "Machine ID is required"))]
    pub machine_id: String,

    #[validate(length(min = 1, max = 255, message = "Name is required"))]
    pub name: String,

    pub status: Option<MachineStatus>,

    #[validate(length(max = 255, message = "Party cannot exceed 255 characters"))]
    pub party: Option<String>,

    #[validate(length(max = 255, message = "Color cannot exceed 255 characters"))]
    pub color: Option<String>,

    #[validate(length(max = 100, message = "Lot number cannot exceed 100 characters"))]
    pub lot_no: Option<String>,

    #[validate(length(max = 50, message = "Quantity cannot exceed 50 characters"))]
    pub quantity: Option<String>,

    #[validate(length(max = 50, message = "Stage cannot exceed 50 characters"))]
    pub stage: Option<String>,

    #[validate(range(min = 0, max = 100, message = "Efficiency must be between 0 and 100"))]
    pub efficiency: Option<i64>,

    #[validate(length(max = 50, message = "Runtime cannot exceed 50 characters"))]
    pub runtime: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMachineRequest {
    #[validate(length(min = 1, max = 255, message = "Name cannot be empty"))]
    pub name: Option<String>,

    pub status: Option<MachineStatus>,

    #[validate(length(max = 255, message = "Party cannot exceed 255 characters"))]
    pub party: Option<String>,

    #[validate(length(max = 255, message = "Color cannot exceed 255 characters"))]
    pub color: Option<String>,

    #[validate(length(max = 100, message = "Lot number cannot exceed 100 characters"))]
    pub lot_no: Option<String>,

    #[validate(length(max = 50, message = "Quantity cannot exceed 50 characters"))]
    pub quantity: Option<String>,

    #[validate(length(max = 50, message = "Stage cannot exceed 50 characters"))]
    pub stage: Option<String>,

    #[validate(range(min = 0, max = 100, message = "Efficiency must be between 0 and 100"))]
    pub efficiency: Option<i64>,

    #[validate(length(max = 50, message = "Runtime cannot exceed 50 characters"))]
    pub runtime: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AssignJobRequest {
    #[validate(length(min = 1, max = 255, message = "Party is required"))]
    pub party: String,

    #[validate(length(min = 1, max = 255, message = "Color is required"))]
    pub color: String,

    #[validate(length(min = 1, max = 100, message = "Lot number is required"))]
    pub lot_no: String,

    #[validate(length(min = 1, max = 50, message = "Quantity is required"))]
    pub quantity: String,

    #[validate(length(min = 1, max = 50, message = "Stage cannot be empty"))]
    pub stage: Option<String>,

    #[validate(range(min = 0, max = 100, message = "Efficiency must be between 0 and 100"))]
    pub efficiency: Option<i64>,

    #[validate(length(min = 1, max = 50, message = "Runtime cannot be empty"))]
    pub runtime: Option<String>,
}

// ==================== INSPECTION ====================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "TEXT", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum InspectionStatus {
    Pending,
    Approved,
    Rejected,
}

impl Default for InspectionStatus {
    fn default() -> Self {
        InspectionStatus::Pending
    }
}

impl InspectionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InspectionStatus::Pending => "pending",
            InspectionStatus::Approved => "approved",
            InspectionStatus::Rejected => "rejected",
        }
    }
}

/// A color inspection record. `delta_e` is the measured color difference
/// against the lab standard; it is absent until the lab measures the lot.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Inspection {
    pub id: String,
    pub date: String,
    pub color: String,
    pub client: String,
    pub lot_no: String,
    pub delta_e: Option<f64>,
    pub status: InspectionStatus,
    pub notes: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateInspectionRequest {
    #[validate(length(min = 1, max = 10, message = "Date is required (YYYY-MM-DD)"))]
    pub date: String,

    #[validate(length(min = 1, max = 255, message = "Color is required"))]
    pub color: String,

    #[validate(length(min = 1, max = 255, message = "Client is required"))]
    pub client: String,

    #[validate(length(min = 1, max = 100, message = "Lot number is required"))]
    pub lot_no: String,

    #[validate(range(min = 0.0, message = "Delta E must be non-negative"))]
    pub delta_e: Option<f64>,

    pub status: Option<InspectionStatus>,

    #[validate(length(max = 1000, message = "Notes cannot exceed 1000 characters"))]
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateInspectionRequest {
    #[validate(length(min = 1, max = 10, message = "Date cannot be empty"))]
    pub date: Option<String>,

    #[validate(length(min = 1, max = 255, message = "Color cannot be empty"))]
    pub color: Option<String>,

    #[validate(length(min = 1, max = 255, message = "Client cannot be empty"))]
    pub client: Option<String>,

    #[validate(length(min = 1, max = 100, message = "Lot number cannot be empty"))]
    pub lot_no: Option<String>,

    #[validate(range(min = 0.0, message = "Delta E must be non-negative"))]
    pub delta_e: Option<f64>,

    pub status: Option<InspectionStatus>,

    #[validate(length(max = 1000, message = "Notes cannot exceed 1000 characters"))]
    pub notes: Option<String>,
}

// ==================== ALERT ====================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "TEXT", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum AlertType {
    Critical,
    Warning,
    Info,
}

impl AlertType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertType::Critical => "critical",
            AlertType::Warning => "warning",
            AlertType::Info => "info",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "TEXT", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum AlertCategory {
    Inventory,
    Machine,
    Quality,
    Production,
    Maintenance,
}

impl AlertCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertCategory::Inventory => "inventory",
            AlertCategory::Machine => "machine",
            AlertCategory::Quality => "quality",
            AlertCategory::Production => "production",
            AlertCategory::Maintenance => "maintenance",
        }
    }
}

/// An operational alert. `read` starts false and only ever flips to true.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    pub id: String,
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub alert_type: AlertType,
    pub category: AlertCategory,
    pub title: String,
    pub message: String,
    pub read: bool,
    pub actionable: bool,
    pub related_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateAlertRequest {
    #[serde(rename = "type")]
    pub alert_type: AlertType,

    pub category: AlertCategory,

    #[validate(length(min = 1, max = 255, message = "Title is required"))]
    pub title: String,

    #[validate(length(min = 1, max = 1000, message = "Message is required"))]
    pub message: String,

    pub actionable: Option<bool>,

    #[validate(length(max = 100, message = "Related ID cannot exceed 100 characters"))]
    pub related_id: Option<String>,
}
