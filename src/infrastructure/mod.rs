//! Infrastructure module for external services.
//!
//! This module contains the question and user stores, their in-memory and
//! `PostgreSQL` implementations, and the factory that selects between them.

pub mod factory;
pub mod in_memory;
pub mod postgres;
pub mod repository;

pub use factory::{
    ConfigurationError, FactoryError, Repositories, RepositoryConfig, RepositoryConfigBuilder,
    RepositoryFactory, StorageMode,
};
pub use in_memory::{InMemoryQuestionRepository, InMemoryUserRepository};
pub use postgres::{PostgresQuestionRepository, PostgresUserRepository};
pub use repository::{QuestionRepository, QuestionUniqueness, RepositoryError, UserRepository};
