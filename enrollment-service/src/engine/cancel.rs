use chrono::Utc;
use tracing::error;

use super::{Engine, EngineError};
use crate::domain::{Enrollment, EnrollmentId, EnrollmentStatus, StudentId};
use crate::locks;
use crate::store;

pub async fn cancel(
    engine: &Engine,
    student_id: StudentId,
    enrollment_id: EnrollmentId,
) -> Result<Enrollment, EngineError> {
    let keys = [
        locks::student_key(student_id.get()),
        locks::enrollment_key(enrollment_id.get()),
    ];
    let _guard = engine.locks().acquire_sorted(&keys).await;

    let mut tx = engine.store().begin().await?;

    let enrollment = store::find_enrollment(&mut tx, enrollment_id)
        .await?
        .filter(|e| e.student_id == student_id)
        .filter(|e| e.status == EnrollmentStatus::Enrolled)
        .ok_or(EngineError::EnrollmentNotFound)?;

    if !store::conditional_decrement_enrolled(&mut tx, enrollment.course_id).await? {
        error!(
            enrollment_id = enrollment.id.get(),
            course_id = enrollment.course_id.get(),
            "decrement found enrolled already at zero, a prior capacity invariant was violated"
        );
        return Err(EngineError::Internal);
    }

    let cancelled_at = Utc::now();
    store::update_enrollment_status(
        &mut tx,
        enrollment.id,
        EnrollmentStatus::Cancelled,
        Some(cancelled_at),
    )
    .await?;

    store::commit(tx).await?;

    Ok(Enrollment {
        status: EnrollmentStatus::Cancelled,
        cancelled_at: Some(cancelled_at),
        ..enrollment
    })
}
