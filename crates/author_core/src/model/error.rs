//! Field validation error taxonomy.
//!
//! # Responsibility
//! - Describe which author field failed validation and why.
//! - Preserve the underlying parse error as the error source.
//!
//! # Invariants
//! - Errors are built at the failure site with an explicit `ValidationKind`.
//! - `Display` never echoes the rejected value for secret fields.

use std::error::Error;
use std::fmt::{Display, Formatter};

/// Author fields that carry validation rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuthorField {
    Id,
    ActivationToken,
    AvatarUrl,
    Email,
    PasswordHash,
    Username,
}

impl AuthorField {
    /// Returns the public (camelCase) field name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::ActivationToken => "activationToken",
            Self::AvatarUrl => "avatarUrl",
            Self::Email => "email",
            Self::PasswordHash => "passwordHash",
            Self::Username => "username",
        }
    }
}

impl Display for AuthorField {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Category of a rejected field value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValidationKind {
    /// Malformed id, email, token or hash shape.
    Format,
    /// Value exceeds or mismatches the required length.
    Length,
    /// Required value is empty after normalization.
    Empty,
}

impl Display for ValidationKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Format => f.write_str("format"),
            Self::Length => f.write_str("length"),
            Self::Empty => f.write_str("empty"),
        }
    }
}

/// Lower-level parse failure that caused a validation error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationCause {
    Uuid(uuid::Error),
    PasswordHash(argon2::password_hash::Error),
}

impl Display for ValidationCause {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Uuid(err) => write!(f, "{err}"),
            Self::PasswordHash(err) => write!(f, "{err}"),
        }
    }
}

/// Rejection of one author field value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: AuthorField,
    pub kind: ValidationKind,
    pub reason: String,
    pub cause: Option<ValidationCause>,
}

impl ValidationError {
    pub fn format(field: AuthorField, reason: impl Into<String>) -> Self {
        Self::new(field, ValidationKind::Format, reason)
    }

    pub fn length(field: AuthorField, reason: impl Into<String>) -> Self {
        Self::new(field, ValidationKind::Length, reason)
    }

    pub fn empty(field: AuthorField, reason: impl Into<String>) -> Self {
        Self::new(field, ValidationKind::Empty, reason)
    }

    /// Attaches the parse error that triggered this rejection.
    pub fn with_cause(mut self, cause: ValidationCause) -> Self {
        self.cause = Some(cause);
        self
    }

    fn new(field: AuthorField, kind: ValidationKind, reason: impl Into<String>) -> Self {
        Self {
            field,
            kind,
            reason: reason.into(),
            cause: None,
        }
    }
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid author {} ({}): {}", self.field, self.kind, self.reason)
    }
}

impl Error for ValidationError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match &self.cause {
            Some(ValidationCause::Uuid(err)) => Some(err),
            Some(ValidationCause::PasswordHash(err)) => Some(err),
            None => None,
        }
    }
}
