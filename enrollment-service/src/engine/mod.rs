//! Validate-and-commit pipelines for enroll and cancel, and the shared
//! machinery (error taxonomy, lock acquisition, retry-on-busy) both go
//! through.

mod cancel;
mod enroll;

pub use cancel::cancel;
pub use enroll::{enroll, ConflictingCourse};

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

use crate::domain::{CourseId, StudentId};
use crate::locks::LockRegistry;
use crate::store::{Store, StoreError};

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("student not found")]
    StudentNotFound,
    #[error("course not found")]
    CourseNotFound,
    #[error("enrollment not found")]
    EnrollmentNotFound,
    #[error("capacity exceeded")]
    CapacityExceeded { capacity: i64, enrolled: i64 },
    #[error("credit limit exceeded")]
    CreditExceeded {
        current_credits: i64,
        adding_credits: i64,
        max_credits: i64,
    },
    #[error("schedule conflict")]
    TimeConflict { conflicting: Vec<ConflictingCourse> },
    #[error("already enrolled")]
    AlreadyEnrolled { course_id: CourseId },
    #[error("invalid request: {0}")]
    InvalidInput(String),
    #[error("database error")]
    Database,
    #[error("service temporarily unavailable, retry")]
    Deadlock,
    #[error("internal error")]
    Internal,
}

impl From<StoreError> for EngineError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Busy => EngineError::Deadlock,
            StoreError::Database(_) => EngineError::Database,
        }
    }
}

impl IntoResponse for EngineError {
    fn into_response(self) -> Response {
        let (status, code, message, detail) = match &self {
            EngineError::StudentNotFound => {
                (StatusCode::NOT_FOUND, "STUDENT_NOT_FOUND", self.to_string(), json!({}))
            }
            EngineError::CourseNotFound => {
                (StatusCode::NOT_FOUND, "COURSE_NOT_FOUND", self.to_string(), json!({}))
            }
            EngineError::EnrollmentNotFound => (
                StatusCode::NOT_FOUND,
                "ENROLLMENT_NOT_FOUND",
                self.to_string(),
                json!({}),
            ),
            EngineError::CapacityExceeded { capacity, enrolled } => (
                StatusCode::BAD_REQUEST,
                "CAPACITY_EXCEEDED",
                self.to_string(),
                json!({ "capacity": capacity, "enrolled": enrolled }),
            ),
            EngineError::CreditExceeded {
                current_credits,
                adding_credits,
                max_credits,
            } => (
                StatusCode::BAD_REQUEST,
                "CREDIT_EXCEEDED",
                self.to_string(),
                json!({
                    "current_credits": current_credits,
                    "adding_credits": adding_credits,
                    "max_credits": max_credits,
                }),
            ),
            EngineError::TimeConflict { conflicting } => (
                StatusCode::CONFLICT,
                "TIME_CONFLICT",
                self.to_string(),
                json!({ "conflicting_courses": conflicting }),
            ),
            EngineError::AlreadyEnrolled { course_id } => (
                StatusCode::CONFLICT,
                "ALREADY_ENROLLED",
                self.to_string(),
                json!({ "course_id": course_id.get() }),
            ),
            EngineError::InvalidInput(_) => (
                StatusCode::BAD_REQUEST,
                "INVALID_INPUT",
                self.to_string(),
                json!({}),
            ),
            EngineError::Database => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "DATABASE_ERROR",
                self.to_string(),
                json!({}),
            ),
            EngineError::Deadlock => (
                StatusCode::SERVICE_UNAVAILABLE,
                "DEADLOCK",
                self.to_string(),
                json!({}),
            ),
            EngineError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                self.to_string(),
                json!({}),
            ),
        };

        let mut body = json!({ "code": code, "message": message });
        if let Some(map) = body.as_object_mut() {
            if let Some(detail_map) = detail.as_object() {
                for (k, v) in detail_map {
                    map.insert(k.clone(), v.clone());
                }
            }
        }

        (status, Json(body)).into_response()
    }
}

#[derive(Clone)]
pub struct Engine {
    store: Store,
    locks: Arc<LockRegistry>,
    max_credits_per_semester: u32,
}

impl Engine {
    pub fn new(store: Store, locks: Arc<LockRegistry>, max_credits_per_semester: u32) -> Self {
        Self {
            store,
            locks,
            max_credits_per_semester,
        }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn locks(&self) -> &LockRegistry {
        &self.locks
    }

    pub fn max_credits_per_semester(&self) -> i64 {
        self.max_credits_per_semester as i64
    }

    pub async fn enroll(&self, student_id: StudentId, course_id: CourseId) -> Result<crate::domain::Enrollment, EngineError> {
        run_in_unit_of_work(|| enroll::enroll(self, student_id, course_id)).await
    }

    pub async fn cancel(
        &self,
        student_id: StudentId,
        enrollment_id: crate::domain::EnrollmentId,
    ) -> Result<crate::domain::Enrollment, EngineError> {
        run_in_unit_of_work(|| cancel::cancel(self, student_id, enrollment_id)).await
    }
}

/// Retries exactly once on a transient `StoreError::Busy`/`EngineError::Deadlock`
/// before surfacing 503 to the caller. Every public engine entry point routes
/// through this so the policy lives in one place.
async fn run_in_unit_of_work<F, Fut, T>(mut op: F) -> Result<T, EngineError>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T, EngineError>>,
{
    match op().await {
        Err(EngineError::Deadlock) => {
            tokio::time::sleep(Duration::from_millis(50)).await;
            op().await
        }
        other => other,
    }
}
