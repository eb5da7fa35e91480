//! Seed data generator, run once at start-up before the listener binds.
//!
//! Mirrors the shape of the original system's seed routine: a fixed
//! department pool, professors assigned a random department, courses split
//! evenly per department with a random professor/credits/capacity and one
//! generated schedule, and students batched so a single transaction doesn't
//! grow unboundedly.

use chrono::NaiveTime;
use rand::seq::SliceRandom;
use rand::Rng;
use tracing::info;

use crate::domain::{Credits, DayOfWeek, DepartmentId, ProfessorId};
use crate::store::{self, Store, StoreError};

const DEPARTMENT_NAMES: &[&str] = &[
    "Computer Science",
    "Electrical Engineering",
    "Mechanical Engineering",
    "Chemical Engineering",
    "Physics",
    "Mathematics",
    "Statistics",
    "Business Administration",
    "Economics",
    "Law",
];

const FIRST_NAMES: &[&str] = &[
    "James", "Mary", "Robert", "Patricia", "John", "Jennifer", "Michael", "Linda", "David",
    "Elizabeth", "William", "Barbara", "Richard", "Susan", "Joseph", "Jessica", "Thomas",
    "Sarah", "Charles", "Karen",
];

const LAST_NAMES: &[&str] = &[
    "Smith", "Johnson", "Williams", "Brown", "Jones", "Garcia", "Miller", "Davis", "Rodriguez",
    "Martinez", "Hernandez", "Lopez", "Gonzalez", "Wilson", "Anderson", "Thomas", "Taylor",
    "Moore", "Jackson", "Martin",
];

const COURSE_NAME_PREFIXES: &[&str] = &[
    "Data Structures",
    "Algorithms",
    "Databases",
    "Operating Systems",
    "Computer Networks",
    "Web Programming",
    "Mobile Applications",
    "Machine Learning",
    "Deep Learning",
    "Big Data",
    "Software Engineering",
    "Natural Language Processing",
    "Computer Vision",
    "Graphics",
    "Security",
    "Distributed Systems",
    "Cloud Computing",
    "Embedded Systems",
    "High-Performance Computing",
    "Quantum Computing",
];

pub struct BootstrapCounts {
    pub departments: usize,
    pub professors: usize,
    pub courses: usize,
    pub students: usize,
}

pub async fn run(
    store: &Store,
    init_departments: usize,
    init_professors: usize,
    init_courses: usize,
    init_students: usize,
) -> Result<BootstrapCounts, StoreError> {
    let mut tx = store.begin().await?;
    let existing = store::count_departments(&mut tx).await?;
    store::commit(tx).await?;

    if existing > 0 {
        info!("database already seeded, skipping bootstrap");
        return Ok(BootstrapCounts {
            departments: 0,
            professors: 0,
            courses: 0,
            students: 0,
        });
    }

    let mut rng = rand::thread_rng();

    let department_ids = create_departments(store, init_departments).await?;
    let professor_ids = create_professors(store, &department_ids, init_professors, &mut rng).await?;
    let course_count = create_courses(store, &department_ids, &professor_ids, init_courses, &mut rng).await?;
    let student_count = create_students(store, &department_ids, init_students, &mut rng).await?;

    info!(
        departments = department_ids.len(),
        professors = professor_ids.len(),
        courses = course_count,
        students = student_count,
        "bootstrap complete"
    );

    Ok(BootstrapCounts {
        departments: department_ids.len(),
        professors: professor_ids.len(),
        courses: course_count,
        students: student_count,
    })
}

async fn create_departments(store: &Store, count: usize) -> Result<Vec<(DepartmentId, String)>, StoreError> {
    let mut tx = store.begin().await?;
    let mut ids = Vec::with_capacity(count);
    for name in DEPARTMENT_NAMES.iter().take(count) {
        let id = store::insert_department(&mut tx, name).await?;
        ids.push((id, name.to_string()));
    }
    store::commit(tx).await?;
    Ok(ids)
}

async fn create_professors(
    store: &Store,
    departments: &[(DepartmentId, String)],
    count: usize,
    rng: &mut impl Rng,
) -> Result<Vec<(ProfessorId, DepartmentId)>, StoreError> {
    let mut tx = store.begin().await?;
    let mut ids = Vec::with_capacity(count);
    for i in 0..count {
        let (department_id, _) = departments.choose(rng).expect("department pool is non-empty");
        let name = format!(
            "{} {}",
            FIRST_NAMES.choose(rng).unwrap(),
            LAST_NAMES.choose(rng).unwrap()
        );
        let email = format!("prof{i:03}@university.edu");
        let id = store::insert_professor(&mut tx, &name, &email, *department_id).await?;
        ids.push((id, *department_id));
    }
    store::commit(tx).await?;
    Ok(ids)
}

async fn create_courses(
    store: &Store,
    departments: &[(DepartmentId, String)],
    professors: &[(ProfessorId, DepartmentId)],
    total: usize,
    rng: &mut impl Rng,
) -> Result<usize, StoreError> {
    if departments.is_empty() {
        return Ok(0);
    }
    let per_department = total / departments.len();
    let mut tx = store.begin().await?;
    let mut course_idx = 0usize;
    let mut created = 0usize;

    for (department_id, department_name) in departments {
        let department_professors: Vec<ProfessorId> = professors
            .iter()
            .filter(|(_, dept)| dept == department_id)
            .map(|(id, _)| *id)
            .collect();
        let code_prefix: String = department_name.chars().take(3).collect::<String>().to_uppercase();

        for i in 0..per_department {
            course_idx += 1;

            let professor_id = *department_professors
                .choose(rng)
                .or_else(|| professors.first().map(|(id, _)| id))
                .expect("at least one professor exists");

            let name_prefix = COURSE_NAME_PREFIXES.choose(rng).unwrap();
            let name = format!("{} {}", name_prefix, i % 3 + 1);
            let code = format!("{code_prefix}{course_idx:04}");
            let credits = Credits::try_from(*[1u8, 2, 3, 4].choose(rng).unwrap()).expect("credits in range");
            let capacity = rng.gen_range(20..=50);

            let course_id = store::insert_course(&mut tx, &code, &name, credits, capacity, professor_id, *department_id).await?;

            let day = *DayOfWeek::all().choose(rng).unwrap();
            let hour = rng.gen_range(8..=16);
            let start_time = NaiveTime::from_hms_opt(hour, 0, 0).expect("valid hour");
            let end_time = NaiveTime::from_hms_opt(hour + 1, 30, 0).expect("valid hour");
            store::insert_schedule(&mut tx, course_id, day, start_time, end_time).await?;

            created += 1;
        }
    }

    store::commit(tx).await?;
    Ok(created)
}

async fn create_students(
    store: &Store,
    departments: &[(DepartmentId, String)],
    total: usize,
    rng: &mut impl Rng,
) -> Result<usize, StoreError> {
    const BATCH_SIZE: usize = 1000;
    let mut created = 0usize;

    let mut batch_start = 0usize;
    while batch_start < total {
        let batch_end = (batch_start + BATCH_SIZE).min(total);
        let mut tx = store.begin().await?;
        for i in batch_start..batch_end {
            let (department_id, _) = departments.choose(rng).expect("department pool is non-empty");
            let name = format!(
                "{} {}",
                FIRST_NAMES.choose(rng).unwrap(),
                LAST_NAMES.choose(rng).unwrap()
            );
            let student_id = format!("2024{i:06}");
            let email = format!("student{i:06}@university.edu");
            store::insert_student(&mut tx, &student_id, &name, &email, *department_id).await?;
            created += 1;
        }
        store::commit(tx).await?;
        batch_start = batch_end;
    }

    Ok(created)
}
