//! Catalog seeding from the public PokeAPI listing.
//!
//! # Responsibility
//! - Replace the whole catalog with records derived from one remote listing.
//!
//! # Invariants
//! - The catalog is cleared before the listing is fetched; a later failure
//!   leaves it empty until the seed is re-run.
//! - Import records are written in one batch, without create-path validation.
//! - An entry whose URL carries no numeric id is imported with no `no`.

use crate::fetch::Fetcher;
use crate::model::pokemon::SeedImportRecord;
use crate::repo::pokemon_repo::PokemonRepository;
use crate::service::error::{ServiceError, ServiceResult};
use log::{error, info, warn};
use serde::Deserialize;
use std::time::Instant;

/// Listing endpoint capped at 650 entries.
pub const POKEAPI_LISTING_URL: &str = "https://pokeapi.co/api/v2/pokemon?limit=650";

/// Value returned by a completed seed run.
pub const SEED_EXECUTED: &str = "Seed Executed";

/// Paged listing body returned by the listing endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PokeListing {
    pub results: Vec<PokeListingEntry>,
}

/// One `{name, url}` listing entry.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PokeListingEntry {
    pub name: String,
    pub url: String,
}

pub struct SeedService<R: PokemonRepository, F: Fetcher> {
    repo: R,
    fetcher: F,
    source_url: String,
}

impl<R: PokemonRepository, F: Fetcher> SeedService<R, F> {
    /// Creates a seed service reading from `POKEAPI_LISTING_URL`.
    pub fn new(repo: R, fetcher: F) -> Self {
        Self::with_source_url(repo, fetcher, POKEAPI_LISTING_URL)
    }

    /// Creates a seed service reading the listing from `source_url`.
    pub fn with_source_url(repo: R, fetcher: F, source_url: impl Into<String>) -> Self {
        Self {
            repo,
            fetcher,
            source_url: source_url.into(),
        }
    }

    pub fn source_url(&self) -> &str {
        &self.source_url
    }

    /// Clears the catalog and repopulates it from the remote listing.
    ///
    /// # Errors
    /// - `Fetch` when the listing cannot be fetched or decoded.
    /// - `DuplicateKey`/`InternalStore` when the batch insert fails.
    pub fn execute_seed(&self) -> ServiceResult<&'static str> {
        let started_at = Instant::now();
        info!(
            "event=seed_run module=seed status=start source={}",
            self.source_url
        );

        let cleared = self
            .repo
            .delete_all()
            .map_err(|err| ServiceError::from_repo("clear the catalog", err))?;

        let listing = self
            .fetcher
            .get::<PokeListing>(&self.source_url)
            .inspect_err(|err| {
                error!(
                    "event=seed_run module=seed status=error stage=fetch cleared={} error={}",
                    cleared, err
                );
            })?;

        let records = listing_to_import_records(&listing);

        let imported = self
            .repo
            .insert_many(&records)
            .map_err(|err| ServiceError::from_repo("import the seed listing", err))?;

        info!(
            "event=seed_run module=seed status=ok cleared={} imported={} duration_ms={}",
            cleared,
            imported,
            started_at.elapsed().as_millis()
        );
        Ok(SEED_EXECUTED)
    }
}

/// Converts listing entries into import records, preserving listing order.
///
/// Entries whose URL yields no numeric id keep their name and get `no: None`.
pub fn listing_to_import_records(listing: &PokeListing) -> Vec<SeedImportRecord> {
    listing
        .results
        .iter()
        .map(|entry| {
            let no = no_from_resource_url(&entry.url);
            if no.is_none() {
                warn!(
                    "event=seed_entry module=seed status=no_missing name={} url={}",
                    entry.name, entry.url
                );
            }
            SeedImportRecord {
                name: entry.name.clone(),
                no,
            }
        })
        .collect()
}

/// Reads the second-to-last `/` segment of a resource URL as an integer.
///
/// `https://pokeapi.co/api/v2/pokemon/25/` yields `25`.
pub fn no_from_resource_url(url: &str) -> Option<i64> {
    let mut segments = url.rsplit('/');
    segments.next()?;
    segments.next()?.parse().ok()
}
