//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the author data access contract.
//! - Isolate SQLite query details from service orchestration.
//!
//! # Invariants
//! - Repositories borrow an explicit connection; there is no global handle.
//! - Repository APIs return semantic errors (`InvalidRow`, `Validation`) in
//!   addition to store errors.

pub mod author_repo;
