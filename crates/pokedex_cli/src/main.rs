//! Command-line front end for the Pokedex catalog.
//!
//! # Responsibility
//! - Load configuration, open the store and wire the services.
//! - Map subcommands onto service operations and print JSON results.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::info;
use pokedex_core::db::open_db_url;
use pokedex_core::{
    init_logging, CreatePokemon, HttpFetcher, PaginationParams, PokedexConfig, PokemonService,
    SeedService, SqlitePokemonRepository, UpdatePokemon,
};
use serde::Serialize;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "pokedex")]
#[command(about = "Pokemon catalog backed by SQLite")]
#[command(version = pokedex_core::core_version())]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Replace the catalog with the PokeAPI listing
    Seed,
    /// Add one pokemon
    Create {
        /// Ordinal number (>= 1)
        #[arg(long)]
        no: i64,
        /// Name (stored lowercase)
        #[arg(long)]
        name: String,
    },
    /// List pokemon ordered by number
    List {
        /// Page size (defaults to POKEDEX_DEFAULT_LIMIT)
        #[arg(short, long)]
        limit: Option<u32>,
        /// Records to skip
        #[arg(short, long)]
        offset: Option<u32>,
    },
    /// Look up one pokemon by number, id or name
    Get {
        term: String,
    },
    /// Change the number and/or name of one pokemon
    Update {
        /// Number, id or name of the pokemon to change
        term: String,
        #[arg(long)]
        no: Option<i64>,
        #[arg(long)]
        name: Option<String>,
    },
    /// Delete one pokemon by id
    Delete {
        id: String,
    },
}

fn main() -> ExitCode {
    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = PokedexConfig::from_env().context("failed to load configuration")?;

    if let Some(log_dir) = &config.log_dir {
        init_logging(config.log_level, log_dir).context("failed to initialize logging")?;
    }

    let conn = open_db_url(&config.database)
        .with_context(|| format!("failed to open database `{}`", config.database))?;
    let repo = SqlitePokemonRepository::try_new(&conn)?;
    let pokemon = PokemonService::new(&repo, config.default_limit);

    match cli.command {
        Command::Seed => {
            let fetcher = HttpFetcher::new()?;
            let seed = SeedService::new(&repo, fetcher);
            println!("{}", seed.execute_seed()?);
        }
        Command::Create { no, name } => {
            print_json(&pokemon.create(&CreatePokemon::new(no, name))?)?;
        }
        Command::List { limit, offset } => {
            print_json(&pokemon.list(&PaginationParams::new(limit, offset))?)?;
        }
        Command::Get { term } => {
            print_json(&pokemon.resolve(&term)?)?;
        }
        Command::Update { term, no, name } => {
            print_json(&pokemon.update(&term, &UpdatePokemon { no, name })?)?;
        }
        Command::Delete { id } => {
            pokemon.delete(&id)?;
        }
    }

    info!("event=cli_command module=cli status=ok");
    Ok(())
}

fn print_json(value: &impl Serialize) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
