//! Common test infrastructure for DAO tests.
//!
//! Provides two sample entities with their mappers, a recording pool that
//! counts every interaction with fake connections, and a SQLite database on
//! a temporary file.

#![allow(dead_code)]

use async_trait::async_trait;
use courses_config::DatabaseConfig;
use courses_core::{rules, CoursesResult, EntityId, Identifiable, StoreError, ValidateExt};
use courses_dao::{
    BoundStatement, ConnectionPool, DatabasePool, EntityMapper, Params, ResultRow, SqlEntityDao,
    StoreConnection, TableAttr, TableSchema,
};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use validator::Validate;

// =============================================================================
// Entities
// =============================================================================

pub const COURSE_ID: TableAttr = TableAttr::identity("id");

pub fn course_schema() -> TableSchema {
    TableSchema::new(
        "courses",
        vec![
            COURSE_ID,
            TableAttr::data("title"),
            TableAttr::data("hours"),
            TableAttr::reference("department_id"),
        ],
        &COURSE_ID,
    )
    .expect("course schema is valid")
}

#[derive(Debug, Clone, Default, PartialEq, Validate)]
pub struct Course {
    pub id: Option<EntityId>,
    #[validate(length(min = 1, max = 64))]
    pub title: Option<String>,
    #[validate(range(min = 1, max = 500))]
    pub hours: Option<i64>,
    pub department_id: Option<EntityId>,
}

impl Course {
    pub fn new(title: &str, hours: i64) -> Self {
        Self {
            id: None,
            title: Some(title.to_string()),
            hours: Some(hours),
            department_id: None,
        }
    }

    pub fn in_department(mut self, department_id: EntityId) -> Self {
        self.department_id = Some(department_id);
        self
    }

    /// A sparse update carrying only the identity.
    pub fn patch(id: EntityId) -> Self {
        Self {
            id: Some(id),
            ..Self::default()
        }
    }
}

impl Identifiable for Course {
    fn id(&self) -> Option<EntityId> {
        self.id
    }

    fn set_id(&mut self, id: Option<EntityId>) {
        self.id = id;
    }
}

pub struct CourseMapper;

impl EntityMapper for CourseMapper {
    type Entity = Course;

    fn validate_for_insert(&self, course: &Course) -> bool {
        course.is_valid() && rules::required_text(course.title.as_deref()).is_ok()
    }

    fn bind_attributes(&self, course: &Course, params: &mut Params<'_>) {
        params
            .bind("title", course.title.clone())
            .bind("hours", course.hours)
            .bind("department_id", course.department_id);
    }

    fn materialize(&self, row: &ResultRow) -> CoursesResult<Course> {
        Ok(Course {
            id: row.get_opt_i64("id")?,
            title: row.get_opt_string("title")?,
            hours: row.get_opt_i64("hours")?,
            department_id: row.get_opt_i64("department_id")?,
        })
    }

    fn null_attribute_mask(&self, course: &Course) -> Vec<bool> {
        vec![
            course.id.is_none(),
            course.title.is_none(),
            course.hours.is_none(),
            course.department_id.is_none(),
        ]
    }
}

pub const DEPARTMENT_ID: TableAttr = TableAttr::identity("id");

pub fn department_schema() -> TableSchema {
    TableSchema::new(
        "departments",
        vec![DEPARTMENT_ID, TableAttr::data("name")],
        &DEPARTMENT_ID,
    )
    .expect("department schema is valid")
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Department {
    pub id: Option<EntityId>,
    pub name: Option<String>,
}

impl Department {
    pub fn new(name: &str) -> Self {
        Self {
            id: None,
            name: Some(name.to_string()),
        }
    }
}

impl Identifiable for Department {
    fn id(&self) -> Option<EntityId> {
        self.id
    }

    fn set_id(&mut self, id: Option<EntityId>) {
        self.id = id;
    }
}

pub struct DepartmentMapper;

impl EntityMapper for DepartmentMapper {
    type Entity = Department;

    fn validate_for_insert(&self, department: &Department) -> bool {
        rules::required_text(department.name.as_deref()).is_ok()
    }

    fn bind_attributes(&self, department: &Department, params: &mut Params<'_>) {
        params.bind("name", department.name.clone());
    }

    fn materialize(&self, row: &ResultRow) -> CoursesResult<Department> {
        Ok(Department {
            id: row.get_opt_i64("id")?,
            name: row.get_opt_string("name")?,
        })
    }

    fn null_attribute_mask(&self, department: &Department) -> Vec<bool> {
        vec![department.id.is_none(), department.name.is_none()]
    }
}

pub fn course_dao(pool: Arc<dyn ConnectionPool>) -> SqlEntityDao<CourseMapper> {
    SqlEntityDao::new(course_schema(), CourseMapper, pool)
}

pub fn department_dao(pool: Arc<dyn ConnectionPool>) -> SqlEntityDao<DepartmentMapper> {
    SqlEntityDao::new(department_schema(), DepartmentMapper, pool)
}

// =============================================================================
// Recording pool
// =============================================================================

/// Everything the DAO did to the recording pool and its connections.
#[derive(Debug, Clone, Default)]
pub struct Stats {
    pub acquires: usize,
    pub releases: usize,
    pub batches: Vec<Vec<BoundStatement>>,
    pub queries: Vec<BoundStatement>,
    pub commits: usize,
    pub rollbacks: usize,
}

impl Stats {
    /// Number of statements executed across every batch.
    pub fn statements(&self) -> usize {
        self.batches.iter().map(Vec::len).sum()
    }
}

#[derive(Default)]
struct State {
    stats: Stats,
    rows: Vec<ResultRow>,
    fail_acquire: bool,
    fail_execute: bool,
    fail_rollback: bool,
}

/// In-memory pool whose connections record calls instead of touching a store.
#[derive(Clone, Default)]
pub struct RecordingPool {
    state: Arc<Mutex<State>>,
}

impl RecordingPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rows every query returns.
    pub fn with_rows(self, rows: Vec<ResultRow>) -> Self {
        self.state.lock().unwrap().rows = rows;
        self
    }

    pub fn failing_acquire(self) -> Self {
        self.state.lock().unwrap().fail_acquire = true;
        self
    }

    pub fn failing_execute(self) -> Self {
        self.state.lock().unwrap().fail_execute = true;
        self
    }

    pub fn failing_rollback(self) -> Self {
        self.state.lock().unwrap().fail_rollback = true;
        self
    }

    pub fn stats(&self) -> Stats {
        self.state.lock().unwrap().stats.clone()
    }

    pub fn shared(&self) -> Arc<dyn ConnectionPool> {
        Arc::new(self.clone())
    }
}

#[async_trait]
impl ConnectionPool for RecordingPool {
    async fn acquire(&self) -> Result<Box<dyn StoreConnection>, StoreError> {
        let mut state = self.state.lock().unwrap();
        if state.fail_acquire {
            return Err(StoreError::PoolExhausted);
        }
        state.stats.acquires += 1;
        Ok(Box::new(RecordingConnection {
            state: Arc::clone(&self.state),
        }))
    }

    fn release(&self, _connection: Box<dyn StoreConnection>) {
        self.state.lock().unwrap().stats.releases += 1;
    }
}

struct RecordingConnection {
    state: Arc<Mutex<State>>,
}

#[async_trait]
impl StoreConnection for RecordingConnection {
    async fn execute_batch(&mut self, batch: &[BoundStatement]) -> Result<Vec<u64>, StoreError> {
        let mut state = self.state.lock().unwrap();
        state.stats.batches.push(batch.to_vec());
        if state.fail_execute {
            return Err(StoreError::execution("injected execution failure"));
        }
        Ok(vec![1; batch.len()])
    }

    async fn query(&mut self, statement: &BoundStatement) -> Result<Vec<ResultRow>, StoreError> {
        let mut state = self.state.lock().unwrap();
        state.stats.queries.push(statement.clone());
        Ok(state.rows.clone())
    }

    async fn commit(&mut self) -> Result<(), StoreError> {
        self.state.lock().unwrap().stats.commits += 1;
        Ok(())
    }

    async fn rollback(&mut self) -> Result<(), StoreError> {
        let mut state = self.state.lock().unwrap();
        state.stats.rollbacks += 1;
        if state.fail_rollback {
            return Err(StoreError::execution("injected rollback failure"));
        }
        Ok(())
    }
}

// =============================================================================
// SQLite database
// =============================================================================

const SCHEMA: &[&str] = &[
    "CREATE TABLE departments (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL
    )",
    "CREATE TABLE courses (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        title TEXT NOT NULL,
        hours INTEGER,
        department_id INTEGER REFERENCES departments(id) ON DELETE CASCADE
    )",
];

/// SQLite database on a temporary file, removed on drop.
pub struct TestDatabase {
    _dir: TempDir,
    pool: Arc<DatabasePool>,
}

impl TestDatabase {
    pub async fn new() -> Self {
        Self::with_max_connections(5).await
    }

    pub async fn with_max_connections(max_connections: u32) -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let config = DatabaseConfig {
            min_connections: 1,
            max_connections,
            ..DatabaseConfig::with_url(format!(
                "sqlite://{}",
                dir.path().join("courses.db").display()
            ))
        };

        let pool = DatabasePool::connect(&config)
            .await
            .expect("Failed to open test database");
        for ddl in SCHEMA {
            sqlx::query(ddl)
                .execute(pool.inner())
                .await
                .expect("Failed to create schema");
        }

        Self {
            _dir: dir,
            pool: Arc::new(pool),
        }
    }

    /// The pool as the DAO sees it.
    pub fn pool(&self) -> Arc<dyn ConnectionPool> {
        self.pool.clone()
    }

    /// The concrete pool, for direct SQL in assertions.
    pub fn database(&self) -> &DatabasePool {
        &self.pool
    }
}
