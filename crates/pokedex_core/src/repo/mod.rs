//! Record store abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the store capability consumed by the services.
//! - Isolate SQLite query details from service orchestration.
//!
//! # Invariants
//! - Store-native duplicate signals surface as `RepoError::DuplicateKey`.
//! - Repository constructors reject connections that are not migrated.

pub mod pokemon_repo;
