// src/error.rs
use actix_web::{HttpResponse, ResponseError};
use serde::Serialize;
use std::fmt;

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    NotFound(String),
    ValidationError(String),
    DatabaseError(sqlx::Error),
    InternalServerError(String),
}

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Serialize)]
struct ErrorResponse {
    message: String,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ApiError::BadRequest(msg) => write!(f, "{}", msg),
            ApiError::NotFound(msg) => write!(f, "{}", msg),
            ApiError::ValidationError(msg) => write!(f, "{}", msg),
            // The sqlx detail is logged at the response boundary, not sent to clients
            ApiError::DatabaseError(_) => write!(f, "A database error occurred"),
            ApiError::InternalServerError(msg) => write!(f, "{}", msg),
        }
    }
}

impl ResponseError for ApiError {
    fn error_response(&self) -> HttpResponse {
        if let ApiError::DatabaseError(err) = self {
            log::error!("Database error: {}", err);
        }

        let body = ErrorResponse {
            message: self.to_string(),
        };

        match self {
            ApiError::BadRequest(_) => HttpResponse::BadRequest().json(body),
            ApiError::ValidationError(_) => HttpResponse::BadRequest().json(body),
            ApiError::NotFound(_) => HttpResponse::NotFound().json(body),
            ApiError::DatabaseError(_) => HttpResponse::InternalServerError().json(body),
            ApiError::InternalServerError(_) => HttpResponse::InternalServerError().json(body),
        }
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        ApiError::DatabaseError(err)
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(err: validator::ValidationErrors) -> Self {
        ApiError::ValidationError(err.to_string())
    }
}

impl ApiError {
    pub fn schedule_not_found(id: &str) -> Self {
        ApiError::NotFound(format!("Schedule with ID '{}' not found", id))
    }

    pub fn item_not_found(id: &str) -> Self {
        ApiError::NotFound(format!("Inventory item with ID '{}' not found", id))
    }

    pub fn machine_not_found(id: &str) -> Self {
        ApiError::NotFound(format!("Machine with ID '{}' not found", id))
    }

    pub fn inspection_not_found(id: &str) -> Self {
        ApiError::NotFound(format!("Inspection with ID '{}' not found", id))
    }

    pub fn alert_not_found(id: &str) -> Self {
        ApiError::NotFound(format!("Alert with ID '{}' not found", id))
    }

    pub fn item_already_exists(name: &str) -> Self {
        ApiError::BadRequest(format!("Inventory item '{}' already exists", name))
    }

    pub fn machine_already_exists(machine_id: &str) -> Self {
        ApiError::BadRequest(format!("Machine '{}' already exists", machine_id))
    }
}
