//! Catalog domain model.
//!
//! # Responsibility
//! - Define canonical data structures used by the record and seed services.
//! - Keep request-scoped value objects (pagination) next to the record shape.
//!
//! # Invariants
//! - Every record is identified by a stable `PokemonId`.
//! - Deletion is physical; there are no tombstones.

pub mod pagination;
pub mod pokemon;
