//! Catalog use-case services.
//!
//! # Responsibility
//! - Orchestrate store and fetch capabilities into use-case level APIs.
//! - Keep transport layers decoupled from storage details.
//!
//! # Invariants
//! - Services receive their capabilities through constructors; no global handles.
//! - Every operation returns `ServiceResult`.

pub mod error;
pub mod pokemon_service;
pub mod seed_service;
