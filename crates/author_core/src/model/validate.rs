//! Pure normalization helpers shared by author field setters.
//!
//! # Responsibility
//! - Trim, sanitize and bound raw user input.
//! - Classify every rejection as `Format`, `Length` or `Empty`.
//!
//! # Invariants
//! - Helpers are side-effect free and never panic on input.
//! - Lengths are measured in characters, not bytes.

use crate::model::error::{AuthorField, ValidationCause, ValidationError};
use argon2::password_hash::PasswordHash;
use once_cell::sync::Lazy;
use regex::Regex;
use uuid::Uuid;

/// Required activation token length.
pub const ACTIVATION_TOKEN_LEN: usize = 32;
/// Maximum avatar reference length.
pub const AVATAR_URL_MAX_LEN: usize = 255;
/// Maximum email length.
pub const EMAIL_MAX_LEN: usize = 128;
/// Required encoded password hash length.
pub const PASSWORD_HASH_LEN: usize = 97;
/// Maximum username length.
pub const USERNAME_MAX_LEN: usize = 32;

const EMAIL_LOCAL_MAX_LEN: usize = 64;
const PASSWORD_HASH_ALGORITHM: &str = "argon2i";

static MARKUP_TAG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<[^>]*(?:>|$)").expect("valid markup tag regex"));
static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"^[A-Za-z0-9!#$%\&'*+/=?^_`{|}\~\-]+(?:\.[A-Za-z0-9!#$%\&'*+/=?^_`{|}\~\-]+)*",
        r"@[A-Za-z0-9](?:[A-Za-z0-9\-]{0,61}[A-Za-z0-9])?",
        r"(?:\.[A-Za-z0-9](?:[A-Za-z0-9\-]{0,61}[A-Za-z0-9])?)+$",
    ))
    .expect("valid email regex")
});

/// Strips NUL bytes and markup tags, then trims surrounding whitespace.
///
/// An unterminated `<` removes everything after it. Quotes are kept as-is.
pub fn sanitize_markup(value: &str) -> String {
    let without_nul = value.replace('\0', "");
    MARKUP_TAG_RE
        .replace_all(&without_nul, "")
        .trim()
        .to_string()
}

/// Parses a canonical (or simple/braced/urn) UUID string.
pub fn parse_author_id(raw: &str) -> Result<Uuid, ValidationError> {
    let id = Uuid::parse_str(raw.trim()).map_err(|err| {
        ValidationError::format(AuthorField::Id, "author id is not a valid uuid")
            .with_cause(ValidationCause::Uuid(err))
    })?;
    check_author_id(id)
}

/// Rejects the nil UUID, which can never identify a stored author.
pub fn check_author_id(id: Uuid) -> Result<Uuid, ValidationError> {
    if id.is_nil() {
        return Err(ValidationError::format(
            AuthorField::Id,
            "author id must not be the nil uuid",
        ));
    }
    Ok(id)
}

/// Normalizes a 32-character lowercase hexadecimal token.
pub fn normalize_hex32(field: AuthorField, raw: &str) -> Result<String, ValidationError> {
    let token = raw.trim().to_ascii_lowercase();
    if token.is_empty() || !token.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(ValidationError::format(
            field,
            "value must contain only hexadecimal characters",
        ));
    }
    if token.len() != ACTIVATION_TOKEN_LEN {
        return Err(ValidationError::length(
            field,
            format!(
                "value must be exactly {ACTIVATION_TOKEN_LEN} characters, got {}",
                token.len()
            ),
        ));
    }
    Ok(token)
}

/// Trims and sanitizes free text, enforcing a non-empty bounded result.
pub fn normalize_bounded_string(
    field: AuthorField,
    raw: &str,
    max_chars: usize,
) -> Result<String, ValidationError> {
    let value = sanitize_markup(raw.trim());
    if value.is_empty() {
        return Err(ValidationError::empty(field, "value is empty or insecure"));
    }
    let len = value.chars().count();
    if len > max_chars {
        return Err(ValidationError::length(
            field,
            format!("value must be at most {max_chars} characters, got {len}"),
        ));
    }
    Ok(value)
}

/// Trims and validates an email address.
pub fn normalize_email(raw: &str) -> Result<String, ValidationError> {
    let email = raw.trim();
    if email.is_empty() {
        return Err(ValidationError::empty(AuthorField::Email, "email is empty"));
    }
    let len = email.chars().count();
    if len > EMAIL_MAX_LEN {
        return Err(ValidationError::length(
            AuthorField::Email,
            format!("email must be at most {EMAIL_MAX_LEN} characters, got {len}"),
        ));
    }
    let local_len = email.split('@').next().map_or(0, str::len);
    if local_len > EMAIL_LOCAL_MAX_LEN || !EMAIL_RE.is_match(email) {
        return Err(ValidationError::format(
            AuthorField::Email,
            "email is not a valid address",
        ));
    }
    Ok(email.to_string())
}

/// Validates an encoded Argon2i password hash without touching any secret.
///
/// The rejection reason never includes the hash text.
pub fn normalize_password_hash(raw: &str) -> Result<String, ValidationError> {
    let hash = raw.trim();
    if hash.is_empty() {
        return Err(ValidationError::empty(
            AuthorField::PasswordHash,
            "password hash is empty",
        ));
    }

    let parsed = PasswordHash::new(hash).map_err(|err| {
        ValidationError::format(
            AuthorField::PasswordHash,
            "password hash is not a PHC-encoded hash",
        )
        .with_cause(ValidationCause::PasswordHash(err))
    })?;
    if parsed.algorithm.as_str() != PASSWORD_HASH_ALGORITHM {
        return Err(ValidationError::format(
            AuthorField::PasswordHash,
            format!("password hash must use {PASSWORD_HASH_ALGORITHM}"),
        ));
    }

    let len = hash.chars().count();
    if len != PASSWORD_HASH_LEN {
        return Err(ValidationError::length(
            AuthorField::PasswordHash,
            format!("password hash must be exactly {PASSWORD_HASH_LEN} characters, got {len}"),
        ));
    }
    Ok(hash.to_string())
}
