//! `PostgreSQL` repository implementations.
//!
//! Backed by `sqlx` with a shared `PgPool`. Uniqueness of question text is
//! enforced by the database itself; a violated index surfaces as
//! `RepositoryError::UniqueViolation`.
//!
//! # Table Schema
//!
//! ```sql
//! CREATE TABLE users (
//!     id UUID PRIMARY KEY,
//!     name TEXT NOT NULL,
//!     api_token TEXT NOT NULL UNIQUE
//! );
//!
//! CREATE TABLE questions (
//!     id UUID PRIMARY KEY,
//!     question TEXT NOT NULL UNIQUE,
//!     status VARCHAR(32) NOT NULL DEFAULT 'draft',
//!     user_id UUID NOT NULL REFERENCES users(id),
//!     created_at TIMESTAMPTZ NOT NULL,
//!     updated_at TIMESTAMPTZ NOT NULL
//! );
//! ```

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::{Question, QuestionId, QuestionStatus, Timestamp, User, UserId};
use crate::infrastructure::{
    QuestionRepository, QuestionUniqueness, RepositoryError, UserRepository,
};

const QUESTION_COLUMNS: &str = "id, question, status, user_id, created_at, updated_at";

type QuestionRow = (Uuid, String, String, Uuid, DateTime<Utc>, DateTime<Utc>);

type UserRow = (Uuid, String, String);

/// Maps a `sqlx` error, keeping unique violations distinguishable.
fn map_database_error(error: &sqlx::Error) -> RepositoryError {
    if let sqlx::Error::Database(database_error) = error
        && database_error.is_unique_violation()
    {
        return RepositoryError::UniqueViolation(
            database_error
                .constraint()
                .unwrap_or("unique constraint")
                .to_string(),
        );
    }
    RepositoryError::DatabaseError(error.to_string())
}

fn question_from_row(row: QuestionRow) -> Question {
    let (id, question, status, user_id, created_at, updated_at) = row;

    Question {
        id: QuestionId::from_uuid(id),
        question,
        status: QuestionStatus::from(status),
        user_id: UserId::from_uuid(user_id),
        created_at: Timestamp::from_datetime(created_at),
        updated_at: Timestamp::from_datetime(updated_at),
    }
}

fn user_from_row(row: UserRow) -> User {
    let (id, name, api_token) = row;
    User::new(UserId::from_uuid(id), name, api_token)
}

// =============================================================================
// PostgreSQL Question Repository
// =============================================================================

/// `PostgreSQL` implementation of `QuestionRepository`.
#[derive(Debug, Clone)]
pub struct PostgresQuestionRepository {
    pool: PgPool,
}

impl PostgresQuestionRepository {
    /// Creates a new repository with the given connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl QuestionUniqueness for PostgresQuestionRepository {
    async fn is_question_taken(
        &self,
        text: &str,
        excluding: &QuestionId,
    ) -> Result<bool, RepositoryError> {
        let (taken,): (bool,) = sqlx::query_as(
            "SELECT EXISTS (SELECT 1 FROM questions WHERE question = $1 AND id <> $2)",
        )
        .bind(text)
        .bind(excluding.as_uuid())
        .fetch_one(&self.pool)
        .await
        .map_err(|error| map_database_error(&error))?;

        Ok(taken)
    }
}

#[async_trait]
impl QuestionRepository for PostgresQuestionRepository {
    async fn find_by_id(&self, id: &QuestionId) -> Result<Option<Question>, RepositoryError> {
        let row: Option<QuestionRow> = sqlx::query_as(&format!(
            "SELECT {QUESTION_COLUMNS} FROM questions WHERE id = $1"
        ))
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| map_database_error(&error))?;

        Ok(row.map(question_from_row))
    }

    async fn insert(&self, question: &Question) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO questions (id, question, status, user_id, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(question.id.as_uuid())
        .bind(&question.question)
        .bind(question.status.as_str())
        .bind(question.user_id.as_uuid())
        .bind(question.created_at.as_datetime())
        .bind(question.updated_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|error| map_database_error(&error))?;

        Ok(())
    }

    async fn update_text(
        &self,
        id: &QuestionId,
        text: &str,
        updated_at: &Timestamp,
    ) -> Result<Question, RepositoryError> {
        let row: Option<QuestionRow> = sqlx::query_as(&format!(
            "UPDATE questions SET question = $2, updated_at = $3 \
             WHERE id = $1 RETURNING {QUESTION_COLUMNS}"
        ))
        .bind(id.as_uuid())
        .bind(text)
        .bind(updated_at.as_datetime())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| map_database_error(&error))?;

        match row {
            Some(row) => Ok(question_from_row(row)),
            None => Err(RepositoryError::NotFound(format!("Question {id}"))),
        }
    }
}

// =============================================================================
// PostgreSQL User Repository
// =============================================================================

/// `PostgreSQL` implementation of `UserRepository`.
#[derive(Debug, Clone)]
pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    /// Creates a new repository with the given connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_by_api_token(&self, token: &str) -> Result<Option<User>, RepositoryError> {
        let row: Option<UserRow> =
            sqlx::query_as("SELECT id, name, api_token FROM users WHERE api_token = $1")
                .bind(token)
                .fetch_optional(&self.pool)
                .await
                .map_err(|error| map_database_error(&error))?;

        Ok(row.map(user_from_row))
    }

    async fn insert(&self, user: &User) -> Result<(), RepositoryError> {
        sqlx::query("INSERT INTO users (id, name, api_token) VALUES ($1, $2, $3)")
            .bind(user.id.as_uuid())
            .bind(&user.name)
            .bind(&user.api_token)
            .execute(&self.pool)
            .await
            .map_err(|error| map_database_error(&error))?;

        Ok(())
    }
}
