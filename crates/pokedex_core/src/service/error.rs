//! Service-boundary error taxonomy.
//!
//! # Invariants
//! - Unclassified store failures are logged here and never rendered to callers.

use crate::fetch::FetchError;
use crate::model::pokemon::PokemonValidationError;
use crate::repo::pokemon_repo::RepoError;
use log::error;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Error returned by record and seed service operations.
#[derive(Debug)]
pub enum ServiceError {
    /// Input failed field validation.
    Validation(PokemonValidationError),
    /// A unique field already holds `value`.
    DuplicateKey { field: &'static str, value: String },
    /// No record matched the lookup term or identifier.
    NotFound { term: String },
    /// The seed's external listing could not be fetched or used.
    Fetch(FetchError),
    /// Store failure with no caller-facing classification. `operation` is a
    /// verb phrase such as `"create pokemon"`.
    InternalStore {
        operation: &'static str,
        source: RepoError,
    },
}

impl ServiceError {
    /// Classifies a repository failure raised while running `operation`
    /// (a verb phrase, e.g. `"clear the catalog"`).
    pub(crate) fn from_repo(operation: &'static str, err: RepoError) -> Self {
        match err {
            RepoError::DuplicateKey { field, value } => Self::DuplicateKey { field, value },
            RepoError::NotFound(id) => Self::NotFound {
                term: id.to_string(),
            },
            other => {
                error!(
                    "event=store_failure module=service status=error operation={} error={}",
                    operation, other
                );
                Self::InternalStore {
                    operation,
                    source: other,
                }
            }
        }
    }

    /// Store failure behind an `InternalStore` error, for operator-side logging.
    pub fn internal_source(&self) -> Option<&RepoError> {
        match self {
            Self::InternalStore { source, .. } => Some(source),
            _ => None,
        }
    }

    /// Returns whether this is a not-found condition.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "invalid pokemon input: {err}"),
            Self::DuplicateKey { field, value } => {
                write!(f, "pokemon exists in db {{ {field}: {value} }}")
            }
            Self::NotFound { term } => {
                write!(f, "pokemon with id, name or no \"{term}\" not found")
            }
            Self::Fetch(err) => write!(f, "seed source unavailable: {err}"),
            Self::InternalStore { operation, .. } => {
                write!(f, "can't {operation} - check server logs")
            }
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Fetch(err) => Some(err),
            _ => None,
        }
    }
}

impl From<PokemonValidationError> for ServiceError {
    fn from(value: PokemonValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<FetchError> for ServiceError {
    fn from(value: FetchError) -> Self {
        Self::Fetch(value)
    }
}
