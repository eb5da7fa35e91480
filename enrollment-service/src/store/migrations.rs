//! Embedded schema. Run once at start-up against a fresh or existing
//! database; every statement is `CREATE ... IF NOT EXISTS` so it is safe to
//! run against a database that already has the tables.

pub const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS department (
    id   INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS professor (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    name          TEXT NOT NULL,
    email         TEXT NOT NULL UNIQUE,
    department_id INTEGER NOT NULL REFERENCES department(id)
);

CREATE TABLE IF NOT EXISTS course (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    code          TEXT NOT NULL UNIQUE,
    name          TEXT NOT NULL,
    credits       INTEGER NOT NULL,
    capacity      INTEGER NOT NULL,
    enrolled      INTEGER NOT NULL DEFAULT 0,
    professor_id  INTEGER NOT NULL REFERENCES professor(id),
    department_id INTEGER NOT NULL REFERENCES department(id)
);

CREATE TABLE IF NOT EXISTS schedule (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    course_id   INTEGER NOT NULL UNIQUE REFERENCES course(id),
    day_of_week TEXT NOT NULL,
    start_time  TEXT NOT NULL,
    end_time    TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS student (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    student_id    TEXT NOT NULL UNIQUE,
    name          TEXT NOT NULL,
    email         TEXT NOT NULL UNIQUE,
    department_id INTEGER NOT NULL REFERENCES department(id)
);

CREATE TABLE IF NOT EXISTS enrollment (
    id           INTEGER PRIMARY KEY AUTOINCREMENT,
    student_id   INTEGER NOT NULL REFERENCES student(id),
    course_id    INTEGER NOT NULL REFERENCES course(id),
    status       TEXT NOT NULL,
    enrolled_at  TEXT NOT NULL,
    cancelled_at TEXT
);

CREATE UNIQUE INDEX IF NOT EXISTS idx_enrollment_active_unique
    ON enrollment(student_id, course_id)
    WHERE status = 'ENROLLED';

CREATE INDEX IF NOT EXISTS idx_enrollment_student ON enrollment(student_id);
CREATE INDEX IF NOT EXISTS idx_enrollment_course ON enrollment(course_id);
CREATE INDEX IF NOT EXISTS idx_course_department ON course(department_id);
CREATE INDEX IF NOT EXISTS idx_professor_department ON professor(department_id);
CREATE INDEX IF NOT EXISTS idx_student_department ON student(department_id);
"#;
