//! SQLite-backed persistence.
//!
//! Every primitive below takes an open transaction rather than the pool
//! directly — the engine controls the unit of work, the store only knows how
//! to read and write rows inside it. Queries are written by hand with
//! `sqlx::query`/`sqlx::query_as` rather than the `query!` macros, since
//! those macros need a live database at compile time.

mod migrations;

use chrono::{DateTime, NaiveTime, Utc};
use sqlx::sqlite::{SqlitePoolOptions, SqliteRow};
use sqlx::{Row, Sqlite, SqlitePool, Transaction};
use std::str::FromStr;

use crate::domain::{
    Course, CourseId, Credits, DayOfWeek, Department, DepartmentId, Enrollment, EnrollmentId,
    EnrollmentStatus, Professor, ProfessorId, Schedule, Student, StudentId,
};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database busy")]
    Busy,
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

fn classify(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(ref db_err) = err {
        if db_err.code().as_deref() == Some("5") {
            return StoreError::Busy;
        }
        let message = db_err.message();
        if message.contains("database is locked") || message.contains("busy") {
            return StoreError::Busy;
        }
    }
    StoreError::Database(err)
}

pub type Tx<'a> = Transaction<'a, Sqlite>;

/// True if `err` is the partial unique index on `(student_id, course_id)`
/// rejecting a duplicate active enrollment — the defense-in-depth path
/// behind the engine's own point check.
pub fn is_unique_violation(err: &StoreError) -> bool {
    matches!(err, StoreError::Database(sqlx::Error::Database(db_err)) if db_err.is_unique_violation())
}

#[derive(Clone)]
pub struct Store {
    pool: SqlitePool,
}

impl Store {
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(16)
            .connect(database_url)
            .await
            .map_err(classify)?;

        sqlx::query("PRAGMA journal_mode = WAL")
            .execute(&pool)
            .await
            .map_err(classify)?;
        sqlx::query("PRAGMA busy_timeout = 5000")
            .execute(&pool)
            .await
            .map_err(classify)?;

        Ok(Self { pool })
    }

    pub async fn run_migrations(&self) -> Result<(), StoreError> {
        for statement in migrations::SCHEMA.split(';') {
            let statement = statement.trim();
            if statement.is_empty() {
                continue;
            }
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(classify)?;
        }
        Ok(())
    }

    pub async fn begin(&self) -> Result<Tx<'static>, StoreError> {
        self.pool.begin().await.map_err(classify)
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

pub async fn commit(tx: Tx<'static>) -> Result<(), StoreError> {
    tx.commit().await.map_err(classify)
}

pub async fn rollback(tx: Tx<'static>) -> Result<(), StoreError> {
    tx.rollback().await.map_err(classify)
}

fn row_to_department(row: SqliteRow) -> Department {
    Department {
        id: DepartmentId(row.get::<i64, _>("id")),
        name: row.get("name"),
    }
}

fn row_to_professor(row: SqliteRow) -> Professor {
    Professor {
        id: ProfessorId(row.get::<i64, _>("id")),
        name: row.get("name"),
        email: row.get("email"),
        department_id: DepartmentId(row.get::<i64, _>("department_id")),
    }
}

fn row_to_course(row: SqliteRow) -> Course {
    let credits: i64 = row.get("credits");
    Course {
        id: CourseId(row.get::<i64, _>("id")),
        code: row.get("code"),
        name: row.get("name"),
        credits: Credits::try_from(credits as u8).expect("credits column holds a valid value"),
        capacity: row.get("capacity"),
        enrolled: row.get("enrolled"),
        professor_id: ProfessorId(row.get::<i64, _>("professor_id")),
        department_id: DepartmentId(row.get::<i64, _>("department_id")),
    }
}

fn row_to_schedule(row: SqliteRow) -> Schedule {
    let day: String = row.get("day_of_week");
    let start: String = row.get("start_time");
    let end: String = row.get("end_time");
    Schedule {
        id: row.get("id"),
        course_id: CourseId(row.get::<i64, _>("course_id")),
        day_of_week: DayOfWeek::from_str(&day).expect("day_of_week column holds a valid day"),
        start_time: NaiveTime::parse_from_str(&start, "%H:%M:%S")
            .expect("start_time column holds a valid time"),
        end_time: NaiveTime::parse_from_str(&end, "%H:%M:%S")
            .expect("end_time column holds a valid time"),
    }
}

fn row_to_student(row: SqliteRow) -> Student {
    Student {
        id: StudentId(row.get::<i64, _>("id")),
        student_id: row.get("student_id"),
        name: row.get("name"),
        email: row.get("email"),
        department_id: DepartmentId(row.get::<i64, _>("department_id")),
    }
}

fn row_to_enrollment(row: SqliteRow) -> Enrollment {
    let status: String = row.get("status");
    let enrolled_at: DateTime<Utc> = row.get("enrolled_at");
    let cancelled_at: Option<DateTime<Utc>> = row.get("cancelled_at");
    Enrollment {
        id: EnrollmentId(row.get::<i64, _>("id")),
        student_id: StudentId(row.get::<i64, _>("student_id")),
        course_id: CourseId(row.get::<i64, _>("course_id")),
        status: EnrollmentStatus::from_str(&status).expect("status column holds a valid status"),
        enrolled_at,
        cancelled_at,
    }
}

pub async fn find_student(tx: &mut Tx<'_>, id: StudentId) -> Result<Option<Student>, StoreError> {
    sqlx::query("SELECT * FROM student WHERE id = ?")
        .bind(id.get())
        .fetch_optional(&mut **tx)
        .await
        .map(|opt| opt.map(row_to_student))
        .map_err(classify)
}

pub async fn find_course(tx: &mut Tx<'_>, id: CourseId) -> Result<Option<Course>, StoreError> {
    sqlx::query("SELECT * FROM course WHERE id = ?")
        .bind(id.get())
        .fetch_optional(&mut **tx)
        .await
        .map(|opt| opt.map(row_to_course))
        .map_err(classify)
}

pub async fn find_active_enrollment(
    tx: &mut Tx<'_>,
    student_id: StudentId,
    course_id: CourseId,
) -> Result<Option<Enrollment>, StoreError> {
    sqlx::query("SELECT * FROM enrollment WHERE student_id = ? AND course_id = ? AND status = 'ENROLLED'")
        .bind(student_id.get())
        .bind(course_id.get())
        .fetch_optional(&mut **tx)
        .await
        .map(|opt| opt.map(row_to_enrollment))
        .map_err(classify)
}

pub async fn find_enrollment(
    tx: &mut Tx<'_>,
    id: EnrollmentId,
) -> Result<Option<Enrollment>, StoreError> {
    sqlx::query("SELECT * FROM enrollment WHERE id = ?")
        .bind(id.get())
        .fetch_optional(&mut **tx)
        .await
        .map(|opt| opt.map(row_to_enrollment))
        .map_err(classify)
}

pub async fn list_active_enrollments(
    tx: &mut Tx<'_>,
    student_id: StudentId,
) -> Result<Vec<Enrollment>, StoreError> {
    sqlx::query("SELECT * FROM enrollment WHERE student_id = ? AND status = 'ENROLLED'")
        .bind(student_id.get())
        .fetch_all(&mut **tx)
        .await
        .map(|rows| rows.into_iter().map(row_to_enrollment).collect())
        .map_err(classify)
}

pub async fn list_enrollments_for_student(
    tx: &mut Tx<'_>,
    student_id: StudentId,
    status: Option<EnrollmentStatus>,
) -> Result<Vec<Enrollment>, StoreError> {
    let rows = match status {
        Some(status) => {
            sqlx::query("SELECT * FROM enrollment WHERE student_id = ? AND status = ? ORDER BY id")
                .bind(student_id.get())
                .bind(status.as_str())
                .fetch_all(&mut **tx)
                .await
        }
        None => {
            sqlx::query("SELECT * FROM enrollment WHERE student_id = ? ORDER BY id")
                .bind(student_id.get())
                .fetch_all(&mut **tx)
                .await
        }
    }
    .map_err(classify)?;

    Ok(rows.into_iter().map(row_to_enrollment).collect())
}

pub async fn find_schedule(
    tx: &mut Tx<'_>,
    course_id: CourseId,
) -> Result<Option<Schedule>, StoreError> {
    sqlx::query("SELECT * FROM schedule WHERE course_id = ?")
        .bind(course_id.get())
        .fetch_optional(&mut **tx)
        .await
        .map(|opt| opt.map(row_to_schedule))
        .map_err(classify)
}

pub async fn sum_active_credits(tx: &mut Tx<'_>, student_id: StudentId) -> Result<i64, StoreError> {
    let row = sqlx::query(
        "SELECT COALESCE(SUM(course.credits), 0) AS total
         FROM enrollment
         JOIN course ON course.id = enrollment.course_id
         WHERE enrollment.student_id = ? AND enrollment.status = 'ENROLLED'",
    )
    .bind(student_id.get())
    .fetch_one(&mut **tx)
    .await
    .map_err(classify)?;

    Ok(row.get::<i64, _>("total"))
}

/// Atomically reserves a seat. Returns `true` iff the row was under capacity
/// and the increment was applied.
pub async fn conditional_increment_enrolled(
    tx: &mut Tx<'_>,
    course_id: CourseId,
) -> Result<bool, StoreError> {
    let result = sqlx::query(
        "UPDATE course SET enrolled = enrolled + 1 WHERE id = ? AND enrolled < capacity",
    )
    .bind(course_id.get())
    .execute(&mut **tx)
    .await
    .map_err(classify)?;

    Ok(result.rows_affected() == 1)
}

/// Atomically releases a seat. Returns `true` iff `enrolled > 0` held.
pub async fn conditional_decrement_enrolled(
    tx: &mut Tx<'_>,
    course_id: CourseId,
) -> Result<bool, StoreError> {
    let result = sqlx::query("UPDATE course SET enrolled = enrolled - 1 WHERE id = ? AND enrolled > 0")
        .bind(course_id.get())
        .execute(&mut **tx)
        .await
        .map_err(classify)?;

    Ok(result.rows_affected() == 1)
}

pub async fn insert_enrollment(
    tx: &mut Tx<'_>,
    student_id: StudentId,
    course_id: CourseId,
    enrolled_at: DateTime<Utc>,
) -> Result<Enrollment, StoreError> {
    let result = sqlx::query(
        "INSERT INTO enrollment (student_id, course_id, status, enrolled_at, cancelled_at)
         VALUES (?, ?, 'ENROLLED', ?, NULL)",
    )
    .bind(student_id.get())
    .bind(course_id.get())
    .bind(enrolled_at)
    .execute(&mut **tx)
    .await
    .map_err(classify)?;

    Ok(Enrollment {
        id: EnrollmentId(result.last_insert_rowid()),
        student_id,
        course_id,
        status: EnrollmentStatus::Enrolled,
        enrolled_at,
        cancelled_at: None,
    })
}

pub async fn update_enrollment_status(
    tx: &mut Tx<'_>,
    id: EnrollmentId,
    status: EnrollmentStatus,
    cancelled_at: Option<DateTime<Utc>>,
) -> Result<(), StoreError> {
    sqlx::query("UPDATE enrollment SET status = ?, cancelled_at = ? WHERE id = ?")
        .bind(status.as_str())
        .bind(cancelled_at)
        .bind(id.get())
        .execute(&mut **tx)
        .await
        .map_err(classify)?;

    Ok(())
}

pub async fn list_courses(
    tx: &mut Tx<'_>,
    department_id: Option<DepartmentId>,
    skip: i64,
    limit: i64,
) -> Result<Vec<Course>, StoreError> {
    let rows = match department_id {
        Some(department_id) => {
            sqlx::query("SELECT * FROM course WHERE department_id = ? ORDER BY id LIMIT ? OFFSET ?")
                .bind(department_id.get())
                .bind(limit)
                .bind(skip)
                .fetch_all(&mut **tx)
                .await
        }
        None => {
            sqlx::query("SELECT * FROM course ORDER BY id LIMIT ? OFFSET ?")
                .bind(limit)
                .bind(skip)
                .fetch_all(&mut **tx)
                .await
        }
    }
    .map_err(classify)?;

    Ok(rows.into_iter().map(row_to_course).collect())
}

pub async fn list_students(tx: &mut Tx<'_>, skip: i64, limit: i64) -> Result<Vec<Student>, StoreError> {
    sqlx::query("SELECT * FROM student ORDER BY id LIMIT ? OFFSET ?")
        .bind(limit)
        .bind(skip)
        .fetch_all(&mut **tx)
        .await
        .map(|rows| rows.into_iter().map(row_to_student).collect())
        .map_err(classify)
}

pub async fn list_professors(
    tx: &mut Tx<'_>,
    skip: i64,
    limit: i64,
) -> Result<Vec<Professor>, StoreError> {
    sqlx::query("SELECT * FROM professor ORDER BY id LIMIT ? OFFSET ?")
        .bind(limit)
        .bind(skip)
        .fetch_all(&mut **tx)
        .await
        .map(|rows| rows.into_iter().map(row_to_professor).collect())
        .map_err(classify)
}

// --- Bootstrap-only writers ---

pub async fn insert_department(tx: &mut Tx<'_>, name: &str) -> Result<DepartmentId, StoreError> {
    let result = sqlx::query("INSERT INTO department (name) VALUES (?)")
        .bind(name)
        .execute(&mut **tx)
        .await
        .map_err(classify)?;
    Ok(DepartmentId(result.last_insert_rowid()))
}

pub async fn insert_professor(
    tx: &mut Tx<'_>,
    name: &str,
    email: &str,
    department_id: DepartmentId,
) -> Result<ProfessorId, StoreError> {
    let result = sqlx::query("INSERT INTO professor (name, email, department_id) VALUES (?, ?, ?)")
        .bind(name)
        .bind(email)
        .bind(department_id.get())
        .execute(&mut **tx)
        .await
        .map_err(classify)?;
    Ok(ProfessorId(result.last_insert_rowid()))
}

#[allow(clippy::too_many_arguments)]
pub async fn insert_course(
    tx: &mut Tx<'_>,
    code: &str,
    name: &str,
    credits: Credits,
    capacity: i64,
    professor_id: ProfessorId,
    department_id: DepartmentId,
) -> Result<CourseId, StoreError> {
    let result = sqlx::query(
        "INSERT INTO course (code, name, credits, capacity, enrolled, professor_id, department_id)
         VALUES (?, ?, ?, ?, 0, ?, ?)",
    )
    .bind(code)
    .bind(name)
    .bind(credits.get() as i64)
    .bind(capacity)
    .bind(professor_id.get())
    .bind(department_id.get())
    .execute(&mut **tx)
    .await
    .map_err(classify)?;
    Ok(CourseId(result.last_insert_rowid()))
}

pub async fn insert_schedule(
    tx: &mut Tx<'_>,
    course_id: CourseId,
    day_of_week: DayOfWeek,
    start_time: NaiveTime,
    end_time: NaiveTime,
) -> Result<(), StoreError> {
    sqlx::query("INSERT INTO schedule (course_id, day_of_week, start_time, end_time) VALUES (?, ?, ?, ?)")
        .bind(course_id.get())
        .bind(day_of_week.as_str())
        .bind(start_time.format("%H:%M:%S").to_string())
        .bind(end_time.format("%H:%M:%S").to_string())
        .execute(&mut **tx)
        .await
        .map_err(classify)?;
    Ok(())
}

pub async fn insert_student(
    tx: &mut Tx<'_>,
    student_id: &str,
    name: &str,
    email: &str,
    department_id: DepartmentId,
) -> Result<StudentId, StoreError> {
    let result = sqlx::query("INSERT INTO student (student_id, name, email, department_id) VALUES (?, ?, ?, ?)")
        .bind(student_id)
        .bind(name)
        .bind(email)
        .bind(department_id.get())
        .execute(&mut **tx)
        .await
        .map_err(classify)?;
    Ok(StudentId(result.last_insert_rowid()))
}

pub async fn count_departments(tx: &mut Tx<'_>) -> Result<i64, StoreError> {
    let row = sqlx::query("SELECT COUNT(*) AS n FROM department")
        .fetch_one(&mut **tx)
        .await
        .map_err(classify)?;
    Ok(row.get("n"))
}

pub async fn ping(pool: &SqlitePool) -> Result<(), StoreError> {
    sqlx::query("SELECT 1")
        .fetch_one(pool)
        .await
        .map_err(classify)?;
    Ok(())
}
