//! Repository factory for runtime backend selection.
//!
//! Picks the in-memory or `PostgreSQL` stores based on environment
//! configuration.
//!
//! # Environment Variables
//!
//! - `STORAGE_MODE`: `in_memory` (default) | `postgres`
//! - `DATABASE_URL`: `PostgreSQL` connection URL (required when `STORAGE_MODE=postgres`)
//!
//! # Example
//!
//! ```ignore
//! let config = RepositoryConfig::from_env()?;
//! let repositories = RepositoryFactory::new(config).create().await?;
//! let question = repositories.question_repository.find_by_id(&id).await?;
//! ```

use std::env;
use std::str::FromStr;
use std::sync::Arc;

use sqlx::PgPool;
use thiserror::Error;

use super::{
    InMemoryQuestionRepository, InMemoryUserRepository, PostgresQuestionRepository,
    PostgresUserRepository, QuestionRepository, UserRepository,
};

// =============================================================================
// Configuration Types
// =============================================================================

/// Storage mode for persistent data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StorageMode {
    /// Process-local storage. Contents are lost on restart.
    #[default]
    InMemory,
    /// `PostgreSQL` storage for production use.
    Postgres,
}

impl FromStr for StorageMode {
    type Err = ConfigurationError;

    /// Parses a storage mode from a string.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError::InvalidStorageMode` if the string is not recognized.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_lowercase().as_str() {
            "in_memory" | "inmemory" | "memory" => Ok(Self::InMemory),
            "postgres" | "postgresql" | "pg" => Ok(Self::Postgres),
            _ => Err(ConfigurationError::InvalidStorageMode(value.to_string())),
        }
    }
}

/// Configuration for the repository factory.
#[derive(Debug, Clone, Default)]
pub struct RepositoryConfig {
    /// Storage mode for questions and users.
    pub storage_mode: StorageMode,
    /// `PostgreSQL` connection URL (required when `storage_mode` is `Postgres`).
    pub database_url: Option<String>,
}

impl RepositoryConfig {
    /// Creates a new configuration builder.
    pub fn builder() -> RepositoryConfigBuilder {
        RepositoryConfigBuilder::default()
    }

    /// Creates a configuration from process environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError` if:
    /// - `STORAGE_MODE` contains an invalid value
    /// - `DATABASE_URL` is missing when `STORAGE_MODE=postgres`
    pub fn from_env() -> Result<Self, ConfigurationError> {
        Self::from_lookup(|key| env::var(key))
    }

    /// Creates a configuration from an arbitrary variable lookup.
    ///
    /// `from_env` delegates here with `std::env::var`.
    ///
    /// # Errors
    ///
    /// Same as [`RepositoryConfig::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigurationError>
    where
        F: Fn(&str) -> Result<String, env::VarError>,
    {
        let storage_mode = match lookup("STORAGE_MODE") {
            Ok(value) => value.parse()?,
            Err(env::VarError::NotPresent) => StorageMode::default(),
            Err(env::VarError::NotUnicode(_)) => {
                return Err(ConfigurationError::InvalidStorageMode(
                    "<non-UTF-8 value>".to_string(),
                ));
            }
        };

        // Empty or whitespace-only URLs count as unset.
        let database_url = lookup("DATABASE_URL")
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty());

        let config = Self {
            storage_mode,
            database_url,
        };

        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError::MissingDatabaseUrl` if `PostgreSQL` is
    /// selected without a URL.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.storage_mode == StorageMode::Postgres && self.database_url.is_none() {
            return Err(ConfigurationError::MissingDatabaseUrl);
        }
        Ok(())
    }
}

/// Builder for `RepositoryConfig`.
#[derive(Debug, Clone, Default)]
pub struct RepositoryConfigBuilder {
    storage_mode: StorageMode,
    database_url: Option<String>,
}

impl RepositoryConfigBuilder {
    /// Sets the storage mode.
    #[must_use]
    pub const fn storage_mode(mut self, mode: StorageMode) -> Self {
        self.storage_mode = mode;
        self
    }

    /// Sets the `PostgreSQL` database URL.
    #[must_use]
    pub fn database_url(mut self, url: impl Into<String>) -> Self {
        self.database_url = Some(url.into());
        self
    }

    /// Builds the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError` if the configuration is invalid.
    pub fn build(self) -> Result<RepositoryConfig, ConfigurationError> {
        let config = RepositoryConfig {
            storage_mode: self.storage_mode,
            database_url: self.database_url,
        };

        config.validate()?;
        Ok(config)
    }
}

// =============================================================================
// Error Types
// =============================================================================

/// Errors in the repository configuration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    /// Invalid storage mode value.
    #[error("Invalid storage mode: '{0}'. Expected 'in_memory' or 'postgres'")]
    InvalidStorageMode(String),

    /// Missing `DATABASE_URL` when storage mode is Postgres.
    #[error("DATABASE_URL environment variable is required when STORAGE_MODE=postgres")]
    MissingDatabaseUrl,
}

/// Errors that can occur during factory initialization.
#[derive(Debug, Error)]
pub enum FactoryError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    /// Database connection error.
    #[error("Database connection error: {0}")]
    DatabaseConnection(String),
}

// =============================================================================
// Repository Factory
// =============================================================================

/// Collection of initialized repositories.
#[derive(Clone)]
pub struct Repositories {
    /// Question store.
    pub question_repository: Arc<dyn QuestionRepository + Send + Sync>,
    /// User store, also used to resolve bearer tokens.
    pub user_repository: Arc<dyn UserRepository + Send + Sync>,
}

impl Repositories {
    /// Creates empty in-memory repositories.
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            question_repository: Arc::new(InMemoryQuestionRepository::new()),
            user_repository: Arc::new(InMemoryUserRepository::new()),
        }
    }
}

impl std::fmt::Debug for Repositories {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("Repositories")
            .field("question_repository", &"Arc<dyn QuestionRepository>")
            .field("user_repository", &"Arc<dyn UserRepository>")
            .finish()
    }
}

/// Factory for creating repository instances based on configuration.
#[derive(Debug, Clone)]
pub struct RepositoryFactory {
    config: RepositoryConfig,
}

impl RepositoryFactory {
    /// Creates a new repository factory with the given configuration.
    #[must_use]
    pub const fn new(config: RepositoryConfig) -> Self {
        Self { config }
    }

    /// Creates all repositories based on the configuration.
    ///
    /// # Errors
    ///
    /// Returns `FactoryError` if the database connection fails.
    pub async fn create(&self) -> Result<Repositories, FactoryError> {
        match self.config.storage_mode {
            StorageMode::InMemory => Ok(Repositories::in_memory()),
            StorageMode::Postgres => {
                let pool = self.create_postgres_pool().await?;
                Ok(Repositories {
                    question_repository: Arc::new(PostgresQuestionRepository::new(pool.clone())),
                    user_repository: Arc::new(PostgresUserRepository::new(pool)),
                })
            }
        }
    }

    async fn create_postgres_pool(&self) -> Result<PgPool, FactoryError> {
        let database_url = self
            .config
            .database_url
            .as_ref()
            .ok_or(ConfigurationError::MissingDatabaseUrl)?;

        PgPool::connect(database_url)
            .await
            .map_err(|error| FactoryError::DatabaseConnection(error.to_string()))
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::QuestionId;
    use rstest::rstest;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Result<String, env::VarError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| ((*key).to_string(), (*value).to_string()))
            .collect();
        move |key| vars.get(key).cloned().ok_or(env::VarError::NotPresent)
    }

    // -------------------------------------------------------------------------
    // StorageMode Tests
    // -------------------------------------------------------------------------

    #[rstest]
    #[case("in_memory", StorageMode::InMemory)]
    #[case("memory", StorageMode::InMemory)]
    #[case("IN_MEMORY", StorageMode::InMemory)]
    #[case("postgres", StorageMode::Postgres)]
    #[case("postgresql", StorageMode::Postgres)]
    #[case("pg", StorageMode::Postgres)]
    fn test_storage_mode_from_str_valid(#[case] input: &str, #[case] expected: StorageMode) {
        assert_eq!(input.parse::<StorageMode>().unwrap(), expected);
    }

    #[rstest]
    #[case("invalid")]
    #[case("mysql")]
    #[case("")]
    fn test_storage_mode_from_str_invalid(#[case] input: &str) {
        let result: Result<StorageMode, _> = input.parse();
        assert_eq!(
            result.unwrap_err(),
            ConfigurationError::InvalidStorageMode(input.to_string())
        );
    }

    // -------------------------------------------------------------------------
    // RepositoryConfig Tests
    // -------------------------------------------------------------------------

    #[rstest]
    fn test_from_lookup_defaults_to_in_memory() {
        let config = RepositoryConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.storage_mode, StorageMode::InMemory);
        assert!(config.database_url.is_none());
    }

    #[rstest]
    fn test_from_lookup_postgres_with_url() {
        let config = RepositoryConfig::from_lookup(lookup_from(&[
            ("STORAGE_MODE", "postgres"),
            ("DATABASE_URL", "  postgres://localhost/questions  "),
        ]))
        .unwrap();
        assert_eq!(config.storage_mode, StorageMode::Postgres);
        assert_eq!(
            config.database_url.as_deref(),
            Some("postgres://localhost/questions")
        );
    }

    #[rstest]
    #[case(&[("STORAGE_MODE", "postgres")])]
    #[case(&[("STORAGE_MODE", "postgres"), ("DATABASE_URL", "   ")])]
    fn test_from_lookup_postgres_without_url(#[case] pairs: &[(&str, &str)]) {
        let result = RepositoryConfig::from_lookup(lookup_from(pairs));
        assert_eq!(result.unwrap_err(), ConfigurationError::MissingDatabaseUrl);
    }

    #[rstest]
    fn test_from_lookup_invalid_mode() {
        let result = RepositoryConfig::from_lookup(lookup_from(&[("STORAGE_MODE", "sqlite")]));
        assert_eq!(
            result.unwrap_err(),
            ConfigurationError::InvalidStorageMode("sqlite".to_string())
        );
    }

    #[rstest]
    fn test_builder_missing_database_url() {
        let result = RepositoryConfig::builder()
            .storage_mode(StorageMode::Postgres)
            .build();
        assert_eq!(result.unwrap_err(), ConfigurationError::MissingDatabaseUrl);
    }

    #[rstest]
    fn test_builder_with_database_url() {
        let config = RepositoryConfig::builder()
            .storage_mode(StorageMode::Postgres)
            .database_url("postgres://localhost/test")
            .build()
            .unwrap();
        assert_eq!(config.storage_mode, StorageMode::Postgres);
    }

    // -------------------------------------------------------------------------
    // RepositoryFactory Tests
    // -------------------------------------------------------------------------

    #[rstest]
    #[tokio::test]
    async fn test_factory_creates_functional_in_memory_repositories() {
        let factory = RepositoryFactory::new(RepositoryConfig::default());
        let repositories = factory.create().await.unwrap();

        let found = repositories
            .question_repository
            .find_by_id(&QuestionId::generate())
            .await
            .unwrap();
        assert!(found.is_none());

        let debug_string = format!("{repositories:?}");
        assert!(debug_string.contains("question_repository"));
        assert!(debug_string.contains("user_repository"));
    }

    #[rstest]
    fn test_error_display() {
        let error = ConfigurationError::InvalidStorageMode("foo".to_string());
        assert!(error.to_string().contains("foo"));

        let error = FactoryError::Configuration(ConfigurationError::MissingDatabaseUrl);
        assert!(error.to_string().contains("DATABASE_URL"));

        let error = FactoryError::DatabaseConnection("connection refused".to_string());
        assert!(error.to_string().contains("connection refused"));
    }

    #[rstest]
    #[tokio::test]
    #[ignore = "Requires PostgreSQL instance"]
    async fn test_factory_create_postgres() {
        let config = RepositoryConfig::builder()
            .storage_mode(StorageMode::Postgres)
            .database_url("postgres://localhost/test")
            .build()
            .unwrap();

        let result = RepositoryFactory::new(config).create().await;
        assert!(result.is_ok());
    }
}
