//! Author domain model.
//!
//! # Responsibility
//! - Hold one validated author profile.
//! - Provide the hash-free public view used for external transport.
//!
//! # Invariants
//! - Every field is validated on assignment; no partially valid `Author` exists.
//! - `id` is fixed at construction and never changes.
//! - `password_hash` is an encoded hash, never a plaintext password, and is
//!   never serialized.

use crate::model::error::{AuthorField, ValidationError};
use crate::model::validate::{
    check_author_id, normalize_bounded_string, normalize_email, normalize_hex32,
    normalize_password_hash, parse_author_id, AVATAR_URL_MAX_LEN, USERNAME_MAX_LEN,
};
use serde::{Serialize, Serializer};
use std::fmt::{Debug, Formatter};
use uuid::Uuid;

/// Stable identifier (primary key) of an author.
pub type AuthorId = Uuid;

/// Conversion of caller-supplied id values into a validated `AuthorId`.
pub trait IntoAuthorId {
    fn into_author_id(self) -> Result<AuthorId, ValidationError>;
}

impl IntoAuthorId for Uuid {
    fn into_author_id(self) -> Result<AuthorId, ValidationError> {
        check_author_id(self)
    }
}

impl IntoAuthorId for &str {
    fn into_author_id(self) -> Result<AuthorId, ValidationError> {
        parse_author_id(self)
    }
}

impl IntoAuthorId for String {
    fn into_author_id(self) -> Result<AuthorId, ValidationError> {
        parse_author_id(&self)
    }
}

impl IntoAuthorId for &String {
    fn into_author_id(self) -> Result<AuthorId, ValidationError> {
        parse_author_id(self)
    }
}

/// Generates a fresh activation token (32 lowercase hex characters).
pub fn generate_activation_token() -> String {
    Uuid::new_v4().simple().to_string()
}

/// One author profile.
#[derive(Clone, PartialEq, Eq)]
pub struct Author {
    id: AuthorId,
    activation_token: Option<String>,
    avatar_url: Option<String>,
    email: String,
    password_hash: String,
    username: Option<String>,
}

impl Author {
    /// Builds an author, validating every field in declaration order.
    ///
    /// # Errors
    /// - Returns the first field's `ValidationError`; nothing is constructed.
    pub fn new(
        id: impl IntoAuthorId,
        activation_token: Option<&str>,
        avatar_url: Option<&str>,
        email: &str,
        password_hash: &str,
        username: Option<&str>,
    ) -> Result<Self, ValidationError> {
        let mut author = Self {
            id: id.into_author_id()?,
            activation_token: None,
            avatar_url: None,
            email: String::new(),
            password_hash: String::new(),
            username: None,
        };
        author.set_activation_token(activation_token)?;
        author.set_avatar_url(avatar_url)?;
        author.set_email(email)?;
        author.set_password_hash(password_hash)?;
        author.set_username(username)?;
        Ok(author)
    }

    pub fn id(&self) -> AuthorId {
        self.id
    }

    pub fn activation_token(&self) -> Option<&str> {
        self.activation_token.as_deref()
    }

    pub fn avatar_url(&self) -> Option<&str> {
        self.avatar_url.as_deref()
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn password_hash(&self) -> &str {
        &self.password_hash
    }

    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    /// Sets or clears the activation token. Input is trimmed and lowercased.
    pub fn set_activation_token(&mut self, token: Option<&str>) -> Result<(), ValidationError> {
        self.activation_token = match token {
            Some(raw) => Some(normalize_hex32(AuthorField::ActivationToken, raw)?),
            None => None,
        };
        Ok(())
    }

    pub fn set_avatar_url(&mut self, avatar_url: Option<&str>) -> Result<(), ValidationError> {
        self.avatar_url = match avatar_url {
            Some(raw) => Some(normalize_bounded_string(
                AuthorField::AvatarUrl,
                raw,
                AVATAR_URL_MAX_LEN,
            )?),
            None => None,
        };
        Ok(())
    }

    pub fn set_email(&mut self, email: &str) -> Result<(), ValidationError> {
        self.email = normalize_email(email)?;
        Ok(())
    }

    /// Replaces the stored hash. Accepts only an encoded Argon2i hash.
    pub fn set_password_hash(&mut self, password_hash: &str) -> Result<(), ValidationError> {
        self.password_hash = normalize_password_hash(password_hash)?;
        Ok(())
    }

    pub fn set_username(&mut self, username: Option<&str>) -> Result<(), ValidationError> {
        self.username = match username {
            Some(raw) => Some(normalize_bounded_string(
                AuthorField::Username,
                raw,
                USERNAME_MAX_LEN,
            )?),
            None => None,
        };
        Ok(())
    }

    /// Returns the external representation (everything except the hash).
    pub fn to_public_view(&self) -> AuthorPublicView {
        AuthorPublicView {
            id: self.id.hyphenated().to_string(),
            activation_token: self.activation_token.clone(),
            avatar_url: self.avatar_url.clone(),
            email: self.email.clone(),
            username: self.username.clone(),
        }
    }
}

// Hand-written so the hash never reaches debug logs or panic messages.
impl Debug for Author {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Author")
            .field("id", &self.id)
            .field("activation_token", &self.activation_token)
            .field("avatar_url", &self.avatar_url)
            .field("email", &self.email)
            .field("password_hash", &"<redacted>")
            .field("username", &self.username)
            .finish()
    }
}

impl Serialize for Author {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_public_view().serialize(serializer)
    }
}

/// Hash-free author representation safe for external consumers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorPublicView {
    /// Canonical hyphenated UUID.
    pub id: String,
    pub activation_token: Option<String>,
    pub avatar_url: Option<String>,
    pub email: String,
    pub username: Option<String>,
}
