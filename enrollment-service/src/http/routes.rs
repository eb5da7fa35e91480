use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json};
use axum::routing::{delete, get, post};
use axum::Router;
use std::str::FromStr;
use std::sync::Arc;

use shared::Settings;

use super::dto::{CourseFilter, EnrollRequest, EnrollmentFilter, HealthResponse, Pagination};
use crate::domain::{CourseId, EnrollmentId, EnrollmentStatus, StudentId};
use crate::engine::{Engine, EngineError};
use crate::query;
use crate::store;

#[derive(Clone)]
pub struct AppState {
    pub engine: Engine,
    pub settings: Arc<Settings>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/v1/students", get(list_students))
        .route("/api/v1/students/:id", get(get_student))
        .route("/api/v1/students/:id/schedule", get(get_student_schedule))
        .route(
            "/api/v1/students/:id/enrollments",
            get(list_enrollments).post(create_enrollment),
        )
        .route(
            "/api/v1/students/:id/enrollments/:eid",
            delete(cancel_enrollment),
        )
        .route("/api/v1/courses", get(list_courses))
        .route("/api/v1/courses/:id", get(get_course))
        .route("/api/v1/professors", get(list_professors))
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    match store::ping(state.engine.store().pool()).await {
        Ok(()) => Json(HealthResponse {
            status: "ok",
            database: "up",
        }),
        Err(_) => Json(HealthResponse {
            status: "unhealthy",
            database: "down",
        }),
    }
}

async fn list_students(
    State(state): State<AppState>,
    Query(page): Query<Pagination>,
) -> Result<impl IntoResponse, EngineError> {
    let students = query::list_students(state.engine.store(), page.skip, page.limit).await?;
    Ok(Json(students))
}

async fn get_student(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, EngineError> {
    let student = query::get_student(state.engine.store(), StudentId(id)).await?;
    Ok(Json(student))
}

async fn get_student_schedule(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, EngineError> {
    let schedule = query::student_schedule(state.engine.store(), StudentId(id)).await?;
    Ok(Json(schedule))
}

async fn list_enrollments(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(filter): Query<EnrollmentFilter>,
) -> Result<impl IntoResponse, EngineError> {
    let status = match filter.status {
        Some(raw) => Some(
            EnrollmentStatus::from_str(&raw)
                .map_err(|_| EngineError::InvalidInput(format!("unknown status '{raw}'")))?,
        ),
        None => None,
    };
    let enrollments = query::list_enrollments(state.engine.store(), StudentId(id), status).await?;
    Ok(Json(enrollments))
}

async fn create_enrollment(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<EnrollRequest>,
) -> Result<impl IntoResponse, EngineError> {
    let enrollment = state
        .engine
        .enroll(StudentId(id), CourseId(body.course_id))
        .await?;
    Ok((StatusCode::CREATED, Json(enrollment)))
}

async fn cancel_enrollment(
    State(state): State<AppState>,
    Path((id, eid)): Path<(i64, i64)>,
) -> Result<impl IntoResponse, EngineError> {
    let enrollment = state
        .engine
        .cancel(StudentId(id), EnrollmentId(eid))
        .await?;
    Ok(Json(enrollment))
}

async fn list_courses(
    State(state): State<AppState>,
    Query(filter): Query<CourseFilter>,
) -> Result<impl IntoResponse, EngineError> {
    let department_id = filter.department_id.map(crate::domain::DepartmentId);
    let courses = query::list_courses(
        state.engine.store(),
        department_id,
        filter.page.skip,
        filter.page.limit,
    )
    .await?;
    Ok(Json(courses))
}

async fn get_course(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, EngineError> {
    let course = query::get_course(state.engine.store(), CourseId(id)).await?;
    Ok(Json(course))
}

async fn list_professors(
    State(state): State<AppState>,
    Query(page): Query<Pagination>,
) -> Result<impl IntoResponse, EngineError> {
    let professors = query::list_professors(state.engine.store(), page.skip, page.limit).await?;
    Ok(Json(professors))
}
