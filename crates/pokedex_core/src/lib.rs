//! Core domain logic for the Pokedex catalog.
//! This crate owns record resolution, catalog seeding and their store contracts.

pub mod config;
pub mod db;
pub mod fetch;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::{ConfigError, PokedexConfig};
pub use fetch::{FetchError, FetchResult, Fetcher, HttpFetcher};
pub use logging::{default_log_level, init_logging, logging_status, LogLevel, LoggingError};
pub use model::pagination::{Page, PaginationParams};
pub use model::pokemon::{
    CreatePokemon, Pokemon, PokemonId, PokemonValidationError, SeedImportRecord, UpdatePokemon,
};
pub use repo::pokemon_repo::{PokemonRepository, RepoError, RepoResult, SqlitePokemonRepository};
pub use service::error::{ServiceError, ServiceResult};
pub use service::pokemon_service::PokemonService;
pub use service::seed_service::{
    PokeListing, PokeListingEntry, SeedService, POKEAPI_LISTING_URL, SEED_EXECUTED,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
