//! Read-only projections. No locks beyond the transactional isolation the
//! store already provides — these never race with the engine for
//! correctness, only for a possibly-stale read.

use serde::Serialize;

use crate::domain::{CourseId, DepartmentId, Enrollment, EnrollmentStatus, Professor, Student, StudentId};
use crate::engine::EngineError;
use crate::http::dto::{CourseDetail, CourseListItem};
use crate::store::{self, Store};

#[derive(Debug, Serialize)]
pub struct CourseScheduleEntry {
    pub id: i64,
    pub code: String,
    pub name: String,
    pub credits: u8,
    pub capacity: i64,
    pub enrolled: i64,
    pub professor_id: i64,
    pub department_id: i64,
    pub schedule: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct StudentSchedule {
    pub student_id: String,
    pub student_name: String,
    pub total_credits: i64,
    pub courses: Vec<CourseScheduleEntry>,
}

pub async fn student_schedule(store: &Store, student_id: StudentId) -> Result<StudentSchedule, EngineError> {
    let mut tx = store.begin().await?;

    let student = store::find_student(&mut tx, student_id)
        .await?
        .ok_or(EngineError::StudentNotFound)?;

    let active = store::list_active_enrollments(&mut tx, student.id).await?;

    let mut courses = Vec::with_capacity(active.len());
    let mut total_credits = 0i64;
    for enrollment in &active {
        let Some(course) = store::find_course(&mut tx, enrollment.course_id).await? else {
            continue;
        };
        let schedule = store::find_schedule(&mut tx, course.id)
            .await?
            .map(|s| s.display_string());
        total_credits += course.credits.get() as i64;
        courses.push(CourseScheduleEntry {
            id: course.id.get(),
            code: course.code,
            name: course.name,
            credits: course.credits.get(),
            capacity: course.capacity,
            enrolled: course.enrolled,
            professor_id: course.professor_id.get(),
            department_id: course.department_id.get(),
            schedule,
        });
    }

    store::commit(tx).await?;

    Ok(StudentSchedule {
        student_id: student.student_id,
        student_name: student.name,
        total_credits,
        courses,
    })
}

pub async fn list_courses(
    store: &Store,
    department_id: Option<DepartmentId>,
    skip: i64,
    limit: i64,
) -> Result<Vec<CourseListItem>, EngineError> {
    let mut tx = store.begin().await?;
    let courses = store::list_courses(&mut tx, department_id, skip, limit).await?;
    let mut items = Vec::with_capacity(courses.len());
    for course in courses {
        let schedule = store::find_schedule(&mut tx, course.id).await?;
        items.push(CourseListItem::new(course, schedule));
    }
    store::commit(tx).await?;
    Ok(items)
}

pub async fn get_course(store: &Store, course_id: CourseId) -> Result<CourseDetail, EngineError> {
    let mut tx = store.begin().await?;
    let course = store::find_course(&mut tx, course_id)
        .await?
        .ok_or(EngineError::CourseNotFound)?;
    let schedule = store::find_schedule(&mut tx, course.id).await?;
    store::commit(tx).await?;
    Ok(CourseDetail::new(course, schedule))
}

pub async fn get_student(store: &Store, student_id: StudentId) -> Result<Student, EngineError> {
    let mut tx = store.begin().await?;
    let student = store::find_student(&mut tx, student_id)
        .await?
        .ok_or(EngineError::StudentNotFound)?;
    store::commit(tx).await?;
    Ok(student)
}

pub async fn list_enrollments(
    store: &Store,
    student_id: StudentId,
    status: Option<EnrollmentStatus>,
) -> Result<Vec<Enrollment>, EngineError> {
    let mut tx = store.begin().await?;
    store::find_student(&mut tx, student_id)
        .await?
        .ok_or(EngineError::StudentNotFound)?;
    let enrollments = store::list_enrollments_for_student(&mut tx, student_id, status).await?;
    store::commit(tx).await?;
    Ok(enrollments)
}

pub async fn list_students(store: &Store, skip: i64, limit: i64) -> Result<Vec<Student>, EngineError> {
    let mut tx = store.begin().await?;
    let students = store::list_students(&mut tx, skip, limit).await?;
    store::commit(tx).await?;
    Ok(students)
}

pub async fn list_professors(store: &Store, skip: i64, limit: i64) -> Result<Vec<Professor>, EngineError> {
    let mut tx = store.begin().await?;
    let professors = store::list_professors(&mut tx, skip, limit).await?;
    store::commit(tx).await?;
    Ok(professors)
}
