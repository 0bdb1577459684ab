//! Author profile entity with validated fields and SQLite persistence.
//! This crate is the single source of truth for author invariants.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use db::{open_db, open_db_in_memory, DbError, DbResult};
pub use logging::{default_log_level, init_logging, logging_status, LogLevel, LoggingConfig};
pub use model::author::{
    generate_activation_token, Author, AuthorId, AuthorPublicView, IntoAuthorId,
};
pub use model::error::{AuthorField, ValidationCause, ValidationError, ValidationKind};
pub use repo::author_repo::{AuthorRepository, RepoError, RepoResult, SqliteAuthorRepository};
pub use service::author_service::{AuthorService, RegisterAuthorRequest};
