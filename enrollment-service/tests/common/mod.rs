use chrono::NaiveTime;
use enrollment_service::domain::{Credits, DayOfWeek, DepartmentId, StudentId};
use enrollment_service::engine::Engine;
use enrollment_service::locks::LockRegistry;
use enrollment_service::store::{self, Store};
use std::sync::Arc;

pub struct Fixture {
    pub store: Store,
    pub engine: Engine,
    _db_path: tempfile::TempPath,
}

pub async fn fresh() -> Fixture {
    let file = tempfile::NamedTempFile::new().expect("create temp db file");
    let db_path = file.into_temp_path();
    let url = format!("sqlite://{}", db_path.display());

    let store = Store::connect(&url).await.expect("connect to temp sqlite db");
    store.run_migrations().await.expect("run schema migrations");

    let engine = Engine::new(store.clone(), Arc::new(LockRegistry::new()), 18);

    Fixture {
        store,
        engine,
        _db_path: db_path,
    }
}

pub async fn seed_department(store: &Store) -> DepartmentId {
    let mut tx = store.begin().await.unwrap();
    let id = store::insert_department(&mut tx, "Computer Science").await.unwrap();
    store::commit(tx).await.unwrap();
    id
}

pub async fn seed_course(
    store: &Store,
    department_id: DepartmentId,
    capacity: i64,
    credits: u8,
    day: DayOfWeek,
    start: (u32, u32),
    end: (u32, u32),
) -> i64 {
    let mut tx = store.begin().await.unwrap();
    let suffix = rand_suffix();
    let professor_id = store::insert_professor(&mut tx, "Alice Doe", &format!("alice{suffix}@university.edu"), department_id)
        .await
        .unwrap();
    let code = format!("CS{:04}", suffix);
    let course_id = store::insert_course(
        &mut tx,
        &code,
        "Test Course",
        Credits::try_from(credits).unwrap(),
        capacity,
        professor_id,
        department_id,
    )
    .await
    .unwrap();
    store::insert_schedule(
        &mut tx,
        course_id,
        day,
        NaiveTime::from_hms_opt(start.0, start.1, 0).unwrap(),
        NaiveTime::from_hms_opt(end.0, end.1, 0).unwrap(),
    )
    .await
    .unwrap();
    store::commit(tx).await.unwrap();
    course_id.get()
}

pub async fn seed_student(store: &Store, department_id: DepartmentId, suffix: usize) -> StudentId {
    let mut tx = store.begin().await.unwrap();
    let id = store::insert_student(
        &mut tx,
        &format!("2024{suffix:06}"),
        "Test Student",
        &format!("student{suffix:06}@university.edu"),
        department_id,
    )
    .await
    .unwrap();
    store::commit(tx).await.unwrap();
    id
}

fn rand_suffix() -> u32 {
    use std::sync::atomic::{AtomicU32, Ordering};
    static COUNTER: AtomicU32 = AtomicU32::new(1);
    COUNTER.fetch_add(1, Ordering::SeqCst)
}
