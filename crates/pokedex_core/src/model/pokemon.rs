//! Pokemon domain model.
//!
//! # Responsibility
//! - Define the canonical catalog record and its write-side inputs.
//! - Own field validation for create/update inputs.
//!
//! # Invariants
//! - `id` is assigned once at creation and never reused.
//! - Persisted `name` values are lowercase.
//! - `name` and every present `no` are unique across the catalog (enforced by store).

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Store-assigned opaque identifier of a catalog record.
pub type PokemonId = Uuid;

/// Canonical catalog record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pokemon {
    /// Stable identifier assigned at creation.
    pub id: PokemonId,
    /// Business-facing ordinal key. `None` only for imported entries whose
    /// source URL carried no numeric id.
    pub no: Option<i64>,
    /// Lowercased display name.
    pub name: String,
}

impl Pokemon {
    /// Builds a new record with a generated identifier.
    ///
    /// `name` is stored exactly as given; callers normalize before this point.
    pub fn new(no: i64, name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            no: Some(no),
            name: name.into(),
        }
    }

    /// Returns a copy overlaid with the fields present in `patch`.
    pub fn merged_with(&self, patch: &UpdatePokemon) -> Self {
        Self {
            id: self.id,
            no: patch.no.or(self.no),
            name: patch.name.clone().unwrap_or_else(|| self.name.clone()),
        }
    }
}

/// Field-level validation failure for create/update inputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PokemonValidationError {
    /// `no` must be a positive integer.
    NonPositiveNo(i64),
    /// `name` must contain at least one non-whitespace character.
    EmptyName,
}

impl Display for PokemonValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NonPositiveNo(no) => write!(f, "no must be a positive integer, got {no}"),
            Self::EmptyName => write!(f, "name must not be empty"),
        }
    }
}

impl Error for PokemonValidationError {}

/// Input for creating one record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatePokemon {
    pub no: i64,
    pub name: String,
}

impl CreatePokemon {
    pub fn new(no: i64, name: impl Into<String>) -> Self {
        Self {
            no,
            name: name.into(),
        }
    }

    /// Checks transport-level constraints (`no >= 1`, non-empty `name`).
    pub fn validate(&self) -> Result<(), PokemonValidationError> {
        validate_no(self.no)?;
        validate_name(&self.name)
    }
}

/// Partial update input. Absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdatePokemon {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub no: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl UpdatePokemon {
    /// Validates only the fields that are present.
    pub fn validate(&self) -> Result<(), PokemonValidationError> {
        if let Some(no) = self.no {
            validate_no(no)?;
        }
        if let Some(name) = self.name.as_deref() {
            validate_name(name)?;
        }
        Ok(())
    }

    /// Returns whether no field is set.
    pub fn is_empty(&self) -> bool {
        self.no.is_none() && self.name.is_none()
    }
}

/// Transient `{name, no}` pair produced while importing an external listing.
///
/// Import records bypass `CreatePokemon::validate()`; they are written as
/// derived from the source, including a missing `no`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedImportRecord {
    pub name: String,
    pub no: Option<i64>,
}

fn validate_no(no: i64) -> Result<(), PokemonValidationError> {
    if no < 1 {
        return Err(PokemonValidationError::NonPositiveNo(no));
    }
    Ok(())
}

fn validate_name(name: &str) -> Result<(), PokemonValidationError> {
    if name.trim().is_empty() {
        return Err(PokemonValidationError::EmptyName);
    }
    Ok(())
}
