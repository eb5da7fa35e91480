mod common;

use enrollment_service::domain::{CourseId, DayOfWeek, EnrollmentId};
use enrollment_service::engine::EngineError;
use enrollment_service::store;
use futures::future::join_all;

#[tokio::test(flavor = "multi_thread")]
async fn single_seat_stampede_fifty_students() {
    let fx = common::fresh().await;
    let dept = common::seed_department(&fx.store).await;
    let course_id = common::seed_course(&fx.store, dept, 1, 3, DayOfWeek::Mon, (9, 0), (10, 30)).await;

    let mut handles = Vec::new();
    for i in 0..50 {
        let engine = fx.engine.clone();
        let store = fx.store.clone();
        let dept = dept;
        handles.push(tokio::spawn(async move {
            let student_id = common::seed_student(&store, dept, 10_000 + i).await;
            engine.enroll(student_id, CourseId(course_id)).await
        }));
    }

    let results = join_all(handles).await;
    let mut successes = 0;
    let mut capacity_failures = 0;
    for result in results {
        match result.unwrap() {
            Ok(_) => successes += 1,
            Err(EngineError::CapacityExceeded { .. }) => capacity_failures += 1,
            Err(other) => panic!("unexpected error: {other:?}"),
        }
    }

    assert_eq!(successes, 1);
    assert_eq!(capacity_failures, 49);

    let mut tx = fx.store.begin().await.unwrap();
    let course = store::find_course(&mut tx, CourseId(course_id)).await.unwrap().unwrap();
    assert_eq!(course.enrolled, 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn single_seat_stampede_hundred_students() {
    let fx = common::fresh().await;
    let dept = common::seed_department(&fx.store).await;
    let course_id = common::seed_course(&fx.store, dept, 1, 3, DayOfWeek::Tue, (9, 0), (10, 30)).await;

    let mut handles = Vec::new();
    for i in 0..100 {
        let engine = fx.engine.clone();
        let store = fx.store.clone();
        handles.push(tokio::spawn(async move {
            let student_id = common::seed_student(&store, dept, 20_000 + i).await;
            engine.enroll(student_id, CourseId(course_id)).await
        }));
    }

    let results = join_all(handles).await;
    let successes = results.iter().filter(|r| r.as_ref().unwrap().is_ok()).count();
    assert_eq!(successes, 1);

    let mut tx = fx.store.begin().await.unwrap();
    let course = store::find_course(&mut tx, CourseId(course_id)).await.unwrap().unwrap();
    assert_eq!(course.enrolled, 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn independent_courses_do_not_contend() {
    let fx = common::fresh().await;
    let dept = common::seed_department(&fx.store).await;
    let course_a = common::seed_course(&fx.store, dept, 1, 3, DayOfWeek::Mon, (9, 0), (10, 0)).await;
    let course_b = common::seed_course(&fx.store, dept, 1, 3, DayOfWeek::Tue, (9, 0), (10, 0)).await;

    let student_a = common::seed_student(&fx.store, dept, 1).await;
    let student_b = common::seed_student(&fx.store, dept, 2).await;

    let engine_a = fx.engine.clone();
    let engine_b = fx.engine.clone();
    let (result_a, result_b) = tokio::join!(
        engine_a.enroll(student_a, CourseId(course_a)),
        engine_b.enroll(student_b, CourseId(course_b)),
    );

    assert!(result_a.is_ok());
    assert!(result_b.is_ok());

    let mut tx = fx.store.begin().await.unwrap();
    assert_eq!(store::find_course(&mut tx, CourseId(course_a)).await.unwrap().unwrap().enrolled, 1);
    assert_eq!(store::find_course(&mut tx, CourseId(course_b)).await.unwrap().unwrap().enrolled, 1);
}

#[tokio::test]
async fn time_conflict_blocks_second_enrollment() {
    let fx = common::fresh().await;
    let dept = common::seed_department(&fx.store).await;
    let course_a = common::seed_course(&fx.store, dept, 10, 3, DayOfWeek::Mon, (9, 0), (10, 30)).await;
    let course_b = common::seed_course(&fx.store, dept, 10, 3, DayOfWeek::Mon, (9, 0), (10, 30)).await;
    let student = common::seed_student(&fx.store, dept, 1).await;

    fx.engine.enroll(student, CourseId(course_a)).await.unwrap();
    let result = fx.engine.enroll(student, CourseId(course_b)).await;

    match result {
        Err(EngineError::TimeConflict { conflicting }) => {
            assert_eq!(conflicting.len(), 1);
            assert_eq!(conflicting[0].id, course_a);
        }
        other => panic!("expected TIME_CONFLICT, got {other:?}"),
    }

    let mut tx = fx.store.begin().await.unwrap();
    assert_eq!(store::find_course(&mut tx, CourseId(course_b)).await.unwrap().unwrap().enrolled, 0);
}

#[tokio::test]
async fn credit_ceiling_rejects_overage() {
    let fx = common::fresh().await;
    let dept = common::seed_department(&fx.store).await;
    let student = common::seed_student(&fx.store, dept, 1).await;

    // Four 4-credit courses on distinct days get the student to 16 credits.
    let days = [DayOfWeek::Mon, DayOfWeek::Tue, DayOfWeek::Wed, DayOfWeek::Thu];
    for day in days {
        let course_id = common::seed_course(&fx.store, dept, 10, 4, day, (9, 0), (10, 0)).await;
        fx.engine.enroll(student, CourseId(course_id)).await.unwrap();
    }

    let overflow_course = common::seed_course(&fx.store, dept, 10, 3, DayOfWeek::Fri, (9, 0), (10, 0)).await;
    let result = fx.engine.enroll(student, CourseId(overflow_course)).await;

    match result {
        Err(EngineError::CreditExceeded {
            current_credits,
            adding_credits,
            max_credits,
        }) => {
            assert_eq!(current_credits, 16);
            assert_eq!(adding_credits, 3);
            assert_eq!(max_credits, 18);
        }
        other => panic!("expected CREDIT_EXCEEDED, got {other:?}"),
    }
}

#[tokio::test]
async fn duplicate_enrollment_is_rejected() {
    let fx = common::fresh().await;
    let dept = common::seed_department(&fx.store).await;
    let course_id = common::seed_course(&fx.store, dept, 10, 3, DayOfWeek::Mon, (9, 0), (10, 0)).await;
    let student = common::seed_student(&fx.store, dept, 1).await;

    fx.engine.enroll(student, CourseId(course_id)).await.unwrap();
    let result = fx.engine.enroll(student, CourseId(course_id)).await;

    match result {
        Err(EngineError::AlreadyEnrolled { course_id: id }) => assert_eq!(id, CourseId(course_id)),
        other => panic!("expected ALREADY_ENROLLED, got {other:?}"),
    }

    let mut tx = fx.store.begin().await.unwrap();
    assert_eq!(store::find_course(&mut tx, CourseId(course_id)).await.unwrap().unwrap().enrolled, 1);
}

#[tokio::test]
async fn cancel_then_reenroll_keeps_capacity_consistent() {
    let fx = common::fresh().await;
    let dept = common::seed_department(&fx.store).await;
    let course_id = common::seed_course(&fx.store, dept, 2, 3, DayOfWeek::Mon, (9, 0), (10, 0)).await;
    let student_a = common::seed_student(&fx.store, dept, 1).await;
    let student_b = common::seed_student(&fx.store, dept, 2).await;
    let student_c = common::seed_student(&fx.store, dept, 3).await;

    let enrollment_a = fx.engine.enroll(student_a, CourseId(course_id)).await.unwrap();
    fx.engine.enroll(student_b, CourseId(course_id)).await.unwrap();

    fx.engine.cancel(student_a, enrollment_a.id).await.unwrap();
    fx.engine.enroll(student_c, CourseId(course_id)).await.unwrap();

    let mut tx = fx.store.begin().await.unwrap();
    assert_eq!(store::find_course(&mut tx, CourseId(course_id)).await.unwrap().unwrap().enrolled, 2);
}

#[tokio::test]
async fn cancelling_nonexistent_enrollment_is_a_no_op() {
    let fx = common::fresh().await;
    let dept = common::seed_department(&fx.store).await;
    let student = common::seed_student(&fx.store, dept, 1).await;

    let result = fx.engine.cancel(student, EnrollmentId(999_999)).await;
    assert!(matches!(result, Err(EngineError::EnrollmentNotFound)));
}

#[tokio::test]
async fn cancelling_twice_returns_not_found_second_time() {
    let fx = common::fresh().await;
    let dept = common::seed_department(&fx.store).await;
    let course_id = common::seed_course(&fx.store, dept, 5, 3, DayOfWeek::Mon, (9, 0), (10, 0)).await;
    let student = common::seed_student(&fx.store, dept, 1).await;

    let enrollment = fx.engine.enroll(student, CourseId(course_id)).await.unwrap();
    fx.engine.cancel(student, enrollment.id).await.unwrap();
    let second = fx.engine.cancel(student, enrollment.id).await;

    assert!(matches!(second, Err(EngineError::EnrollmentNotFound)));

    let mut tx = fx.store.begin().await.unwrap();
    assert_eq!(store::find_course(&mut tx, CourseId(course_id)).await.unwrap().unwrap().enrolled, 0);
}

#[tokio::test(flavor = "multi_thread")]
async fn independent_operations_converge_regardless_of_interleaving() {
    let fx = common::fresh().await;
    let dept = common::seed_department(&fx.store).await;
    let course_a = common::seed_course(&fx.store, dept, 5, 3, DayOfWeek::Mon, (9, 0), (10, 0)).await;
    let course_b = common::seed_course(&fx.store, dept, 5, 3, DayOfWeek::Tue, (9, 0), (10, 0)).await;
    let student_a = common::seed_student(&fx.store, dept, 1).await;
    let student_b = common::seed_student(&fx.store, dept, 2).await;

    let e1 = fx.engine.clone();
    let e2 = fx.engine.clone();
    let h1 = tokio::spawn(async move { e1.enroll(student_a, CourseId(course_a)).await });
    let h2 = tokio::spawn(async move { e2.enroll(student_b, CourseId(course_b)).await });

    let (r1, r2) = tokio::join!(h1, h2);
    assert!(r1.unwrap().is_ok());
    assert!(r2.unwrap().is_ok());

    let mut tx = fx.store.begin().await.unwrap();
    assert_eq!(store::find_course(&mut tx, CourseId(course_a)).await.unwrap().unwrap().enrolled, 1);
    assert_eq!(store::find_course(&mut tx, CourseId(course_b)).await.unwrap().unwrap().enrolled, 1);
}
