//! Author repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD and username lookup over the `author` table.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - Lookup inputs are validated before any SQL runs.
//! - Read paths rebuild rows through `Author::new` and fail on invalid
//!   persisted state instead of masking it.
//! - Zero affected rows on update/delete is reported as a count, not an error.

use crate::db::migrations::{current_version, latest_version};
use crate::db::DbError;
use crate::model::author::{Author, AuthorId, IntoAuthorId};
use crate::model::error::{AuthorField, ValidationError};
use crate::model::validate::{normalize_bounded_string, USERNAME_MAX_LEN};
use log::{debug, warn};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

const AUTHOR_TABLE: &str = "author";
const AUTHOR_COLUMNS: &[&str] = &[
    "authorId",
    "authorActivationToken",
    "authorAvatarUrl",
    "authorEmail",
    "authorHash",
    "authorUsername",
];
const AUTHOR_SELECT_SQL: &str = "SELECT
    authorId,
    authorActivationToken,
    authorAvatarUrl,
    authorEmail,
    authorHash,
    authorUsername
FROM author";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for author persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    /// Caller input (id, username) failed validation; the store was not queried.
    Validation(ValidationError),
    /// A stored row could not be rebuilt into a valid `Author`.
    InvalidRow {
        id: AuthorId,
        source: ValidationError,
    },
    /// Store failure: connectivity, constraint violation or schema mismatch.
    Db(DbError),
    InvalidData(String),
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl RepoError {
    /// Whether a write failed on a duplicate id, email or username.
    pub fn is_constraint_violation(&self) -> bool {
        matches!(self, Self::Db(err) if err.is_constraint_violation())
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::InvalidRow { id, source } => {
                write!(f, "stored author {id} failed validation: {source}")
            }
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted author data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} does not match required {expected_version}; open it with db::open_db"
            ),
            Self::MissingRequiredTable(table) => write!(f, "required table `{table}` is missing"),
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "required column `{table}.{column}` is missing")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::InvalidRow { source, .. } => Some(source),
            Self::Db(err) => Some(err),
            Self::InvalidData(_)
            | Self::UninitializedConnection { .. }
            | Self::MissingRequiredTable(_)
            | Self::MissingRequiredColumn { .. } => None,
        }
    }
}

impl From<ValidationError> for RepoError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Repository interface for author persistence.
pub trait AuthorRepository {
    /// Inserts a new row for `author`.
    fn create_author(&self, author: &Author) -> RepoResult<()>;
    /// Overwrites the row matching `author.id()`; returns affected rows.
    fn update_author(&self, author: &Author) -> RepoResult<usize>;
    /// Removes the row matching `id`; returns affected rows.
    fn delete_author(&self, id: AuthorId) -> RepoResult<usize>;
    /// Gets one author by id; `None` when no row matches.
    fn get_author<I: IntoAuthorId>(&self, id: I) -> RepoResult<Option<Author>>;
    /// Lists authors whose username matches case-insensitively.
    fn find_authors_by_username(&self, username: &str) -> RepoResult<Vec<Author>>;
}

/// SQLite-backed author repository over a borrowed connection.
pub struct SqliteAuthorRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteAuthorRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    ///
    /// # Errors
    /// - `UninitializedConnection` when migrations were not applied.
    /// - `MissingRequiredTable` / `MissingRequiredColumn` when the schema is
    ///   not the one this crate writes.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl AuthorRepository for SqliteAuthorRepository<'_> {
    fn create_author(&self, author: &Author) -> RepoResult<()> {
        self.conn
            .execute(
                "INSERT INTO author (
                    authorId,
                    authorActivationToken,
                    authorAvatarUrl,
                    authorEmail,
                    authorHash,
                    authorUsername
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
                params![
                    author.id().as_bytes().as_slice(),
                    author.activation_token(),
                    author.avatar_url(),
                    author.email(),
                    author.password_hash(),
                    author.username(),
                ],
            )
            .map_err(|err| {
                warn!(
                    "event=author_insert module=repo status=error author_id={} error={err}",
                    author.id()
                );
                err
            })?;

        debug!(
            "event=author_insert module=repo status=ok author_id={}",
            author.id()
        );
        Ok(())
    }

    fn update_author(&self, author: &Author) -> RepoResult<usize> {
        let changed = self.conn.execute(
            "UPDATE author
             SET
                authorActivationToken = ?1,
                authorAvatarUrl = ?2,
                authorEmail = ?3,
                authorHash = ?4,
                authorUsername = ?5
             WHERE authorId = ?6;",
            params![
                author.activation_token(),
                author.avatar_url(),
                author.email(),
                author.password_hash(),
                author.username(),
                author.id().as_bytes().as_slice(),
            ],
        )?;

        debug!(
            "event=author_update module=repo status=ok author_id={} rows={changed}",
            author.id()
        );
        Ok(changed)
    }

    fn delete_author(&self, id: AuthorId) -> RepoResult<usize> {
        let changed = self.conn.execute(
            "DELETE FROM author WHERE authorId = ?1;",
            [id.as_bytes().as_slice()],
        )?;

        debug!("event=author_delete module=repo status=ok author_id={id} rows={changed}");
        Ok(changed)
    }

    fn get_author<I: IntoAuthorId>(&self, id: I) -> RepoResult<Option<Author>> {
        let id = id.into_author_id()?;
        let mut stmt = self
            .conn
            .prepare(&format!("{AUTHOR_SELECT_SQL} WHERE authorId = ?1;"))?;

        let row = stmt
            .query_row([id.as_bytes().as_slice()], read_author_row)
            .optional()?;
        row.map(StoredAuthor::into_author).transpose()
    }

    fn find_authors_by_username(&self, username: &str) -> RepoResult<Vec<Author>> {
        let username = normalize_bounded_string(AuthorField::Username, username, USERNAME_MAX_LEN)?;
        let mut stmt = self.conn.prepare(&format!(
            "{AUTHOR_SELECT_SQL}
             WHERE authorUsername = ?1 COLLATE NOCASE
             ORDER BY authorUsername ASC, authorId ASC;"
        ))?;

        let mut rows = stmt.query([username.as_str()])?;
        let mut authors = Vec::new();
        while let Some(row) = rows.next()? {
            authors.push(read_author_row(row)?.into_author()?);
        }

        Ok(authors)
    }
}

/// Raw column values of one `author` row, not yet validated.
struct StoredAuthor {
    id: Vec<u8>,
    activation_token: Option<String>,
    avatar_url: Option<String>,
    email: String,
    password_hash: String,
    username: Option<String>,
}

impl StoredAuthor {
    fn into_author(self) -> RepoResult<Author> {
        let id = Uuid::from_slice(&self.id).map_err(|_| {
            RepoError::InvalidData(format!(
                "author.authorId must be 16 bytes, got {}",
                self.id.len()
            ))
        })?;

        Author::new(
            id,
            self.activation_token.as_deref(),
            self.avatar_url.as_deref(),
            &self.email,
            &self.password_hash,
            self.username.as_deref(),
        )
        .map_err(|source| {
            warn!(
                "event=author_read module=repo status=error author_id={id} field={} kind={}",
                source.field, source.kind
            );
            RepoError::InvalidRow { id, source }
        })
    }
}

fn read_author_row(row: &Row<'_>) -> rusqlite::Result<StoredAuthor> {
    Ok(StoredAuthor {
        id: row.get("authorId")?,
        activation_token: row.get("authorActivationToken")?,
        avatar_url: row.get("authorAvatarUrl")?,
        email: row.get("authorEmail")?,
        password_hash: row.get("authorHash")?,
        username: row.get("authorUsername")?,
    })
}

fn ensure_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version = current_version(conn)?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    let table_exists: bool = conn.query_row(
        "SELECT EXISTS(
            SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1
        );",
        [AUTHOR_TABLE],
        |row| row.get(0),
    )?;
    if !table_exists {
        return Err(RepoError::MissingRequiredTable(AUTHOR_TABLE));
    }

    let mut stmt = conn.prepare("SELECT name FROM pragma_table_info(?1);")?;
    let present = stmt
        .query_map([AUTHOR_TABLE], |row| row.get::<_, String>(0))?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    if let Some(column) = AUTHOR_COLUMNS
        .iter()
        .copied()
        .find(|column| !present.iter().any(|name| name == column))
    {
        return Err(RepoError::MissingRequiredColumn {
            table: AUTHOR_TABLE,
            column,
        });
    }

    Ok(())
}
