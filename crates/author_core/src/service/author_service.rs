//! Author use-case service.
//!
//! # Responsibility
//! - Provide stable entry points for author persistence.
//! - Emit one audit log line per operation.
//!
//! # Invariants
//! - Service APIs never bypass repository validation/persistence contracts.
//! - Log lines carry the author id only; email, token and hash stay out.

use crate::model::author::{generate_activation_token, Author, AuthorId, IntoAuthorId};
use crate::repo::author_repo::{AuthorRepository, RepoResult};
use log::{info, warn};
use uuid::Uuid;

/// Input for registering a brand-new author.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterAuthorRequest {
    pub avatar_url: Option<String>,
    pub email: String,
    /// Encoded Argon2i hash produced by the caller's password hasher.
    pub password_hash: String,
    pub username: Option<String>,
}

/// Use-case service wrapper for author persistence.
pub struct AuthorService<R: AuthorRepository> {
    repo: R,
}

impl<R: AuthorRepository> AuthorService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Registers an author with a generated id and activation token.
    ///
    /// Returns the persisted author so the caller can deliver its token.
    pub fn register(&self, request: &RegisterAuthorRequest) -> RepoResult<Author> {
        let token = generate_activation_token();
        let author = Author::new(
            Uuid::new_v4(),
            Some(token.as_str()),
            request.avatar_url.as_deref(),
            &request.email,
            &request.password_hash,
            request.username.as_deref(),
        )
        .map_err(|err| {
            warn!(
                "event=author_register module=service status=error field={} kind={}",
                err.field, err.kind
            );
            err
        })?;

        self.create_author(&author)?;
        Ok(author)
    }

    pub fn create_author(&self, author: &Author) -> RepoResult<()> {
        match self.repo.create_author(author) {
            Ok(()) => {
                info!(
                    "event=author_create module=service status=ok author_id={}",
                    author.id()
                );
                Ok(())
            }
            Err(err) => {
                warn!(
                    "event=author_create module=service status=error author_id={} constraint={}",
                    author.id(),
                    err.is_constraint_violation()
                );
                Err(err)
            }
        }
    }

    /// Updates an author row; a zero count means no row had that id.
    pub fn update_author(&self, author: &Author) -> RepoResult<usize> {
        let changed = self.repo.update_author(author)?;
        if changed == 0 {
            warn!(
                "event=author_update module=service status=not_found author_id={}",
                author.id()
            );
        } else {
            info!(
                "event=author_update module=service status=ok author_id={}",
                author.id()
            );
        }
        Ok(changed)
    }

    pub fn delete_author(&self, id: AuthorId) -> RepoResult<usize> {
        let changed = self.repo.delete_author(id)?;
        info!("event=author_delete module=service status=ok author_id={id} rows={changed}");
        Ok(changed)
    }

    pub fn get_author<I: IntoAuthorId>(&self, id: I) -> RepoResult<Option<Author>> {
        self.repo.get_author(id)
    }

    pub fn find_authors_by_username(&self, username: &str) -> RepoResult<Vec<Author>> {
        self.repo.find_authors_by_username(username)
    }
}
