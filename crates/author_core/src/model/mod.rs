//! Author domain model.
//!
//! # Responsibility
//! - Define the canonical author record and its field validation rules.
//! - Keep validation pure so model and repository share one policy.
//!
//! # Invariants
//! - Every author is identified by a stable, non-nil `AuthorId`.
//! - Validation failures carry an explicit `ValidationKind`.

pub mod author;
pub mod error;
pub mod validate;
