//! Integration tests for SqlEntityDao on SQLite.
//!
//! Each test runs against a fresh database file in a temporary directory.

mod common;

use common::{course_dao, department_dao, Course, Department, TestDatabase};
use courses_core::CoursesError;
use courses_dao::{EntityDao, Filter};
use futures::future::join_all;
use std::sync::Arc;

async fn count_courses(db: &TestDatabase) -> i64 {
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM courses")
        .fetch_one(db.database().inner())
        .await
        .expect("count query failed");
    count
}

#[tokio::test]
async fn test_add_then_read_back() {
    let db = TestDatabase::new().await;
    let dao = course_dao(db.pool());

    let mut courses = vec![Course::new("Algebra", 36), Course::new("Biology", 48)];
    dao.add(&mut courses).await.expect("Failed to add courses");

    let stored = dao
        .get_by_filter(&Filter::new())
        .await
        .expect("Failed to read courses");
    assert_eq!(stored.len(), 2);
    assert!(stored.iter().all(|c| c.id.is_some()));

    let algebra = stored
        .iter()
        .find(|c| c.title.as_deref() == Some("Algebra"))
        .expect("Algebra not found");
    let by_id = dao
        .get_by_filter(&Filter::new().with("id", algebra.id))
        .await
        .expect("Failed to read by id");

    assert_eq!(by_id.len(), 1);
    assert_eq!(by_id[0].title, courses[0].title);
    assert_eq!(by_id[0].hours, courses[0].hours);
    assert_eq!(by_id[0].department_id, courses[0].department_id);
}

#[tokio::test]
async fn test_filter_by_null_and_value() {
    let db = TestDatabase::new().await;
    let departments = department_dao(db.pool());
    let dao = course_dao(db.pool());

    departments.add(&mut [Department::new("Science")]).await.unwrap();
    let science = departments.get_by_filter(&Filter::new()).await.unwrap()[0]
        .id
        .expect("department id assigned");

    dao.add(&mut [
        Course::new("Algebra", 36),
        Course::new("Biology", 48).in_department(science),
        Course::new("Chemistry", 48).in_department(science),
    ])
    .await
    .unwrap();

    let unassigned = dao
        .get_by_filter(&Filter::new().with("department_id", None::<i64>))
        .await
        .unwrap();
    assert_eq!(unassigned.len(), 1);
    assert_eq!(unassigned[0].title.as_deref(), Some("Algebra"));

    let science_48 = dao
        .get_by_filter(
            &Filter::new()
                .with("department_id", science)
                .with("hours", 48),
        )
        .await
        .unwrap();
    let titles: Vec<_> = science_48.iter().filter_map(|c| c.title.as_deref()).collect();
    assert_eq!(titles, vec!["Biology", "Chemistry"]);
}

#[tokio::test]
async fn test_sparse_update_is_idempotent() {
    let db = TestDatabase::new().await;
    let dao = course_dao(db.pool());

    dao.add(&mut [Course::new("Algebra", 36)]).await.unwrap();
    let id = dao.get_by_filter(&Filter::new()).await.unwrap()[0].id.unwrap();

    let patch = Course {
        hours: Some(40),
        ..Course::patch(id)
    };
    dao.update(&[patch.clone()]).await.expect("Failed to update");
    let once = dao.get_by_filter(&Filter::new().with("id", id)).await.unwrap();

    dao.update(&[patch]).await.expect("Failed to repeat update");
    let twice = dao.get_by_filter(&Filter::new().with("id", id)).await.unwrap();

    assert_eq!(once, twice);
    assert_eq!(once[0].hours, Some(40));
    assert_eq!(once[0].title.as_deref(), Some("Algebra"), "absent attributes are untouched");
}

#[tokio::test]
async fn test_update_with_nothing_present_changes_nothing() {
    let db = TestDatabase::new().await;
    let dao = course_dao(db.pool());

    dao.add(&mut [Course::new("Algebra", 36)]).await.unwrap();
    let before = dao.get_by_filter(&Filter::new()).await.unwrap();
    let id = before[0].id.unwrap();

    dao.update(&[Course::patch(id)]).await.unwrap();
    assert_eq!(dao.get_by_filter(&Filter::new()).await.unwrap(), before);
}

#[tokio::test]
async fn test_failed_batch_leaves_no_rows() {
    let db = TestDatabase::new().await;
    let dao = course_dao(db.pool());

    // Second course references a department that does not exist.
    let err = dao
        .add(&mut [
            Course::new("Algebra", 36),
            Course::new("Biology", 48).in_department(999),
        ])
        .await
        .unwrap_err();

    assert!(matches!(err, CoursesError::Store(_)));
    assert_eq!(count_courses(&db).await, 0);

    // The connection went back to the pool usable.
    dao.add(&mut [Course::new("Algebra", 36)]).await.unwrap();
    assert_eq!(count_courses(&db).await, 1);
}

#[tokio::test]
#[allow(deprecated)]
async fn test_delete_cascade_removes_dependent_rows() {
    let db = TestDatabase::new().await;
    let departments = department_dao(db.pool());
    let courses = course_dao(db.pool());

    departments
        .add(&mut [Department::new("Science"), Department::new("Arts")])
        .await
        .unwrap();
    let all = departments.get_by_filter(&Filter::new()).await.unwrap();
    let science = all.iter().find(|d| d.name.as_deref() == Some("Science")).unwrap();
    let arts = all.iter().find(|d| d.name.as_deref() == Some("Arts")).unwrap();

    courses
        .add(&mut [
            Course::new("Biology", 48).in_department(science.id.unwrap()),
            Course::new("Painting", 20).in_department(arts.id.unwrap()),
        ])
        .await
        .unwrap();

    departments
        .delete_cascade(std::slice::from_ref(science))
        .await
        .expect("Failed to delete department");

    let remaining = courses.get_by_filter(&Filter::new()).await.unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].title.as_deref(), Some("Painting"));
    assert_eq!(departments.get_by_filter(&Filter::new()).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_unknown_filter_attribute_is_rejected() {
    let db = TestDatabase::new().await;
    let dao = course_dao(db.pool());

    let err = dao
        .get_by_filter(&Filter::new().with("instructor", "Smith"))
        .await
        .unwrap_err();
    assert!(matches!(err, CoursesError::InvalidRequest(_)));
}

#[tokio::test]
async fn test_concurrent_callers_get_their_own_connections() {
    let db = TestDatabase::with_max_connections(4).await;
    let dao: Arc<dyn EntityDao<Course>> = Arc::new(course_dao(db.pool()));

    let tasks = (0..8).map(|i| {
        let dao = Arc::clone(&dao);
        tokio::spawn(async move {
            let mut batch = vec![
                Course::new(&format!("Course {i}a"), 10),
                Course::new(&format!("Course {i}b"), 20),
            ];
            dao.add(&mut batch).await
        })
    });

    for result in join_all(tasks).await {
        result.expect("task panicked").expect("concurrent add failed");
    }

    assert_eq!(count_courses(&db).await, 16);
    assert_eq!(
        dao.get_by_filter(&Filter::new().with("hours", 20)).await.unwrap().len(),
        8
    );
}
