//! Pokemon record use-case service.
//!
//! # Responsibility
//! - Provide create/list/resolve/update/delete entry points.
//! - Resolve records by `no`, identifier or name through a fixed fallback chain.
//! - Map store failures into the service error taxonomy.
//!
//! # Invariants
//! - Names are lowercased before any write.
//! - `resolve` tries `no`, then identifier, then name, and stops at the first hit.
//! - `update` returns the resolved snapshot overlaid with the applied fields;
//!   it does not re-read the store.

use crate::model::pagination::PaginationParams;
use crate::model::pokemon::{CreatePokemon, Pokemon, UpdatePokemon};
use crate::repo::pokemon_repo::{PokemonRepository, RepoResult};
use crate::service::error::{ServiceError, ServiceResult};
use log::{debug, info};
use uuid::Uuid;

type Lookup<S> = fn(&S, &str) -> RepoResult<Option<Pokemon>>;

/// Use-case service over a record store.
pub struct PokemonService<R: PokemonRepository> {
    repo: R,
    default_limit: u32,
}

impl<R: PokemonRepository> PokemonService<R> {
    /// Creates a service; `default_limit` applies when a list call omits `limit`.
    pub fn new(repo: R, default_limit: u32) -> Self {
        Self {
            repo,
            default_limit,
        }
    }

    /// Limit applied to list calls without an explicit one.
    pub fn default_limit(&self) -> u32 {
        self.default_limit
    }

    /// Creates one record and returns it with its assigned identifier.
    ///
    /// # Errors
    /// - `Validation` for `no < 1` or an empty name.
    /// - `DuplicateKey` when `no` or the lowercased name already exists.
    /// - `InternalStore` for any other store failure.
    pub fn create(&self, input: &CreatePokemon) -> ServiceResult<Pokemon> {
        input.validate()?;

        let pokemon = Pokemon::new(input.no, input.name.to_lowercase());
        self.repo
            .insert_pokemon(&pokemon)
            .map_err(|err| ServiceError::from_repo("create pokemon", err))?;

        info!(
            "event=pokemon_create module=service status=ok id={} no={}",
            pokemon.id, input.no
        );
        Ok(pokemon)
    }

    /// Lists one page of records ordered by `no` ascending.
    pub fn list(&self, pagination: &PaginationParams) -> ServiceResult<Vec<Pokemon>> {
        let page = pagination.resolve(self.default_limit);
        self.repo
            .list_pokemon(page)
            .map_err(|err| ServiceError::from_repo("list pokemon", err))
    }

    /// Finds one record by `no`, identifier or name, in that order.
    ///
    /// A numeric term matching some record's `no` wins even when the same
    /// string is also another record's identifier or name.
    pub fn resolve(&self, term: &str) -> ServiceResult<Pokemon> {
        let strategies: [(&str, Lookup<Self>); 3] = [
            ("no", Self::lookup_by_no),
            ("id", Self::lookup_by_id),
            ("name", Self::lookup_by_name),
        ];

        for (strategy, lookup) in strategies {
            let found =
                lookup(self, term).map_err(|err| ServiceError::from_repo("look up pokemon", err))?;
            if let Some(pokemon) = found {
                debug!(
                    "event=pokemon_resolve module=service status=ok strategy={} id={}",
                    strategy, pokemon.id
                );
                return Ok(pokemon);
            }
        }

        Err(ServiceError::NotFound {
            term: term.to_string(),
        })
    }

    /// Resolves `term` and applies the present fields of `patch`.
    pub fn update(&self, term: &str, patch: &UpdatePokemon) -> ServiceResult<Pokemon> {
        patch.validate()?;
        let pokemon = self.resolve(term)?;

        let mut patch = patch.clone();
        if let Some(name) = patch.name.as_mut() {
            *name = name.to_lowercase();
        }

        self.repo
            .update_pokemon(pokemon.id, &patch)
            .map_err(|err| ServiceError::from_repo("update pokemon", err))?;

        info!(
            "event=pokemon_update module=service status=ok id={}",
            pokemon.id
        );
        Ok(pokemon.merged_with(&patch))
    }

    /// Physically deletes the record with identifier `id`.
    ///
    /// An `id` that matches nothing (including one that is not a valid
    /// identifier) fails with `NotFound`.
    pub fn delete(&self, id: &str) -> ServiceResult<()> {
        let deleted = match Uuid::try_parse(id) {
            Ok(pokemon_id) => self
                .repo
                .delete_by_id(pokemon_id)
                .map_err(|err| ServiceError::from_repo("delete pokemon", err))?,
            Err(_) => 0,
        };

        if deleted == 0 {
            return Err(ServiceError::NotFound {
                term: id.to_string(),
            });
        }

        info!("event=pokemon_delete module=service status=ok id={id}");
        Ok(())
    }

    fn lookup_by_no(&self, term: &str) -> RepoResult<Option<Pokemon>> {
        match term.trim().parse::<i64>() {
            Ok(no) => self.repo.find_by_no(no),
            Err(_) => Ok(None),
        }
    }

    fn lookup_by_id(&self, term: &str) -> RepoResult<Option<Pokemon>> {
        match Uuid::try_parse(term) {
            Ok(id) => self.repo.find_by_id(id),
            Err(_) => Ok(None),
        }
    }

    fn lookup_by_name(&self, term: &str) -> RepoResult<Option<Pokemon>> {
        self.repo.find_by_name(term.to_lowercase().trim())
    }
}
