//! Student repository implementation

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use lectio_core::{models::Student, traits::StudentRepository, AppError, AppResult};
use sqlx::PgPool;
use tracing::{debug, error, instrument};

/// Database row representation of a student
#[derive(Debug, sqlx::FromRow)]
struct StudentRow {
    id: i32,
    full_name: String,
    phone: String,
    email: Option<String>,
    current_branch_id: Option<i32>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<StudentRow> for Student {
    fn from(row: StudentRow) -> Self {
        Student {
            id: row.id,
            full_name: row.full_name,
            phone: row.phone,
            email: row.email,
            current_branch_id: row.current_branch_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// PostgreSQL implementation of StudentRepository
pub struct PgStudentRepository {
    pool: PgPool,
}

impl PgStudentRepository {
    /// Create a new student repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl StudentRepository for PgStudentRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: i32) -> AppResult<Option<Student>> {
        debug!("Finding student by id: {}", id);

        let result = sqlx::query_as::<sqlx::Postgres, StudentRow>(
            r#"
            SELECT id, full_name, phone, email, current_branch_id,
                   created_at, updated_at
            FROM students
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error finding student {}: {}", id, e);
            AppError::Database(format!("Failed to find student: {}", e))
        })?;

        Ok(result.map(Into::into))
    }

    #[instrument(skip(self))]
    async fn find_by_phone(&self, phone: &str) -> AppResult<Option<Student>> {
        debug!("Finding student by phone");

        let result = sqlx::query_as::<sqlx::Postgres, StudentRow>(
            r#"
            SELECT id, full_name, phone, email, current_branch_id,
                   created_at, updated_at
            FROM students
            WHERE phone = $1
            "#,
        )
        .bind(phone)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error finding student by phone: {}", e);
            AppError::Database(format!("Failed to find student by phone: {}", e))
        })?;

        Ok(result.map(Into::into))
    }

    #[instrument(skip(self))]
    async fn create(
        &self,
        full_name: &str,
        phone: &str,
        email: Option<&str>,
    ) -> AppResult<Student> {
        debug!("Creating student");

        let row = sqlx::query_as::<sqlx::Postgres, StudentRow>(
            r#"
            INSERT INTO students (full_name, phone, email)
            VALUES ($1, $2, $3)
            RETURNING id, full_name, phone, email, current_branch_id,
                      created_at, updated_at
            "#,
        )
        .bind(full_name)
        .bind(phone)
        .bind(email)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error creating student: {}", e);
            if e.to_string().contains("unique constraint") {
                AppError::AlreadyExists(format!("Student with phone {} already exists", phone))
            } else {
                AppError::Database(format!("Failed to create student: {}", e))
            }
        })?;

        Ok(row.into())
    }
}
