//! Request/response shapes. Pagination and the enroll body validate inside
//! their `Deserialize` impl so a bad request never reaches a handler.

use chrono::NaiveTime;
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};

use crate::domain::{Course, DayOfWeek, Department, Enrollment, Professor, Schedule, Student};

#[derive(Debug, Clone, Copy)]
pub struct Pagination {
    pub skip: i64,
    pub limit: i64,
}

impl<'de> Deserialize<'de> for Pagination {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Raw {
            #[serde(default)]
            skip: Option<i64>,
            #[serde(default)]
            limit: Option<i64>,
        }

        let raw = Raw::deserialize(deserializer)?;
        let skip = raw.skip.unwrap_or(0);
        let limit = raw.limit.unwrap_or(100);

        if skip < 0 {
            return Err(de::Error::custom("skip must be >= 0"));
        }
        if !(1..=1000).contains(&limit) {
            return Err(de::Error::custom("limit must be between 1 and 1000"));
        }

        Ok(Pagination { skip, limit })
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct CourseFilter {
    #[serde(default)]
    pub department_id: Option<i64>,
    #[serde(flatten)]
    pub page: Pagination,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct EnrollmentFilter {
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Clone, Copy)]
pub struct EnrollRequest {
    pub course_id: i64,
}

impl<'de> Deserialize<'de> for EnrollRequest {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Raw {
            course_id: i64,
        }

        let raw = Raw::deserialize(deserializer)?;
        if raw.course_id <= 0 {
            return Err(de::Error::custom("course_id must be > 0"));
        }

        Ok(EnrollRequest {
            course_id: raw.course_id,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub database: &'static str,
}

pub type DepartmentDto = Department;
pub type ProfessorDto = Professor;
pub type StudentDto = Student;
pub type EnrollmentDto = Enrollment;

/// A course's schedule, structured — carried on the single-course detail
/// response.
#[derive(Debug, Clone, Serialize)]
pub struct ScheduleDto {
    pub id: i64,
    pub day_of_week: DayOfWeek,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}

impl From<Schedule> for ScheduleDto {
    fn from(schedule: Schedule) -> Self {
        ScheduleDto {
            id: schedule.id,
            day_of_week: schedule.day_of_week,
            start_time: schedule.start_time,
            end_time: schedule.end_time,
        }
    }
}

/// `GET /courses/{id}` response: a course with its schedule as a structured
/// sub-object.
#[derive(Debug, Clone, Serialize)]
pub struct CourseDetail {
    pub id: i64,
    pub code: String,
    pub name: String,
    pub credits: u8,
    pub capacity: i64,
    pub enrolled: i64,
    pub professor_id: i64,
    pub department_id: i64,
    pub schedule: Option<ScheduleDto>,
}

impl CourseDetail {
    pub fn new(course: Course, schedule: Option<Schedule>) -> Self {
        CourseDetail {
            id: course.id.get(),
            code: course.code,
            name: course.name,
            credits: course.credits.get(),
            capacity: course.capacity,
            enrolled: course.enrolled,
            professor_id: course.professor_id.get(),
            department_id: course.department_id.get(),
            schedule: schedule.map(ScheduleDto::from),
        }
    }
}

/// `GET /courses` response: a course with its schedule collapsed to the
/// `"DAY HH:MM-HH:MM"` display form, matching the lighter list-item shape.
#[derive(Debug, Clone, Serialize)]
pub struct CourseListItem {
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

impl CourseListItem {
    pub fn new(course: Course, schedule: Option<Schedule>) -> Self {
        CourseListItem {
            id: course.id.get(),
            code: course.code,
            name: course.name,
            credits: course.credits.get(),
            capacity: course.capacity,
            enrolled: course.enrolled,
            professor_id: course.professor_id.get(),
            department_id: course.department_id.get(),
            schedule: schedule.map(|s| s.display_string()),
        }
    }
}
