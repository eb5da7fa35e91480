use chrono::Utc;
use serde::Serialize;
use tracing::{info, warn};

use super::{Engine, EngineError};
use crate::domain::{CourseId, Enrollment, StudentId};
use crate::locks;
use crate::store;

#[derive(Debug, Clone, Serialize)]
pub struct ConflictingCourse {
    pub id: i64,
    pub name: String,
    pub schedule: String,
}

pub async fn enroll(
    engine: &Engine,
    student_id: StudentId,
    course_id: CourseId,
) -> Result<Enrollment, EngineError> {
    let keys = [
        locks::course_key(course_id.get()),
        locks::student_key(student_id.get()),
    ];
    let _guard = engine.locks().acquire_sorted(&keys).await;

    let mut tx = engine.store().begin().await?;

    let student = store::find_student(&mut tx, student_id)
        .await?
        .ok_or(EngineError::StudentNotFound)?;
    let course = store::find_course(&mut tx, course_id)
        .await?
        .ok_or(EngineError::CourseNotFound)?;

    if store::find_active_enrollment(&mut tx, student.id, course.id)
        .await?
        .is_some()
    {
        return Err(EngineError::AlreadyEnrolled { course_id: course.id });
    }

    let current_credits = store::sum_active_credits(&mut tx, student.id).await?;
    let adding_credits = course.credits.get() as i64;
    if current_credits + adding_credits > engine.max_credits_per_semester() {
        return Err(EngineError::CreditExceeded {
            current_credits,
            adding_credits,
            max_credits: engine.max_credits_per_semester(),
        });
    }

    if let Some(target_schedule) = store::find_schedule(&mut tx, course.id).await? {
        let active = store::list_active_enrollments(&mut tx, student.id).await?;
        let mut conflicting = Vec::new();
        for existing in &active {
            if let Some(existing_schedule) = store::find_schedule(&mut tx, existing.course_id).await? {
                if target_schedule.conflicts_with(&existing_schedule) {
                    if let Some(existing_course) = store::find_course(&mut tx, existing.course_id).await? {
                        conflicting.push(ConflictingCourse {
                            id: existing_course.id.get(),
                            name: existing_course.name,
                            schedule: existing_schedule.display_string(),
                        });
                    }
                }
            }
        }
        if !conflicting.is_empty() {
            return Err(EngineError::TimeConflict { conflicting });
        }
    }

    if !store::conditional_increment_enrolled(&mut tx, course.id).await? {
        let refreshed = store::find_course(&mut tx, course.id)
            .await?
            .unwrap_or(course);
        return Err(EngineError::CapacityExceeded {
            capacity: refreshed.capacity,
            enrolled: refreshed.enrolled,
        });
    }

    let enrollment = match store::insert_enrollment(&mut tx, student.id, course.id, Utc::now()).await {
        Ok(enrollment) => enrollment,
        Err(err) => {
            warn!(course_id = course.id.get(), "rolling back after enrollment insert failure");
            store::rollback(tx).await.ok();
            if store::is_unique_violation(&err) {
                return Err(EngineError::AlreadyEnrolled { course_id: course.id });
            }
            return Err(err.into());
        }
    };

    store::commit(tx).await?;

    info!(
        student_id = student.id.get(),
        course_id = course.id.get(),
        enrolled = course.enrolled + 1,
        "student enrolled"
    );

    Ok(enrollment)
}
