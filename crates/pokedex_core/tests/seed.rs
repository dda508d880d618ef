use pokedex_core::db::open_db_in_memory;
use pokedex_core::{
    CreatePokemon, FetchError, FetchResult, Fetcher, PaginationParams, PokemonService,
    SeedService, ServiceError, SqlitePokemonRepository, POKEAPI_LISTING_URL, SEED_EXECUTED,
};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::cell::RefCell;

/// Serves one canned JSON body (or failure) and records requested URLs.
struct StubFetcher {
    response: Result<Value, FetchError>,
    requested: RefCell<Vec<String>>,
}

impl StubFetcher {
    fn with_body(body: Value) -> Self {
        Self {
            response: Ok(body),
            requested: RefCell::new(Vec::new()),
        }
    }

    fn failing(err: FetchError) -> Self {
        Self {
            response: Err(err),
            requested: RefCell::new(Vec::new()),
        }
    }
}

impl Fetcher for StubFetcher {
    fn get<T: DeserializeOwned>(&self, url: &str) -> FetchResult<T> {
        self.requested.borrow_mut().push(url.to_string());
        let body = self.response.clone()?;
        serde_json::from_value(body).map_err(|err| FetchError::Decode(err.to_string()))
    }
}

fn listing(count: i64) -> Value {
    let results: Vec<Value> = (1..=count)
        .map(|no| {
            json!({
                "name": format!("pokemon-{no}"),
                "url": format!("https://pokeapi.co/api/v2/pokemon/{no}/"),
            })
        })
        .collect();
    json!({ "count": count, "next": null, "previous": null, "results": results })
}

#[test]
fn seed_imports_every_listing_entry() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqlitePokemonRepository::try_new(&conn).unwrap();
    let fetcher = StubFetcher::with_body(listing(12));
    let seed = SeedService::new(&repo, &fetcher);

    assert_eq!(seed.execute_seed().unwrap(), SEED_EXECUTED);
    assert_eq!(*fetcher.requested.borrow(), vec![POKEAPI_LISTING_URL.to_string()]);

    let pokemon = PokemonService::new(&repo, 100);
    let all = pokemon.list(&PaginationParams::default()).unwrap();
    assert_eq!(all.len(), 12);
    for (index, record) in all.iter().enumerate() {
        let expected_no = index as i64 + 1;
        assert_eq!(record.no, Some(expected_no));
        assert_eq!(record.name, format!("pokemon-{expected_no}"));
    }
}

#[test]
fn seed_replaces_previous_records() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqlitePokemonRepository::try_new(&conn).unwrap();
    let pokemon = PokemonService::new(&repo, 100);
    pokemon.create(&CreatePokemon::new(999, "leftover")).unwrap();
    pokemon.create(&CreatePokemon::new(1, "pokemon-1")).unwrap();

    let fetcher = StubFetcher::with_body(listing(3));
    SeedService::new(&repo, &fetcher).execute_seed().unwrap();

    let all = pokemon.list(&PaginationParams::default()).unwrap();
    let numbers: Vec<Option<i64>> = all.iter().map(|record| record.no).collect();
    assert_eq!(numbers, vec![Some(1), Some(2), Some(3)]);
    assert!(pokemon.resolve("leftover").unwrap_err().is_not_found());
}

#[test]
fn seed_running_twice_is_stable() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqlitePokemonRepository::try_new(&conn).unwrap();
    let fetcher = StubFetcher::with_body(listing(5));
    let seed = SeedService::new(&repo, &fetcher);

    seed.execute_seed().unwrap();
    seed.execute_seed().unwrap();

    let all = PokemonService::new(&repo, 100)
        .list(&PaginationParams::default())
        .unwrap();
    assert_eq!(all.len(), 5);
}

#[test]
fn seed_uses_configured_source_url() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqlitePokemonRepository::try_new(&conn).unwrap();
    let fetcher = StubFetcher::with_body(listing(1));
    let seed = SeedService::with_source_url(&repo, &fetcher, "http://mirror.local/pokemon");

    seed.execute_seed().unwrap();
    assert_eq!(seed.source_url(), "http://mirror.local/pokemon");
    assert_eq!(
        *fetcher.requested.borrow(),
        vec!["http://mirror.local/pokemon".to_string()]
    );
}

#[test]
fn fetch_failure_leaves_collection_empty() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqlitePokemonRepository::try_new(&conn).unwrap();
    let pokemon = PokemonService::new(&repo, 100);
    pokemon.create(&CreatePokemon::new(1, "bulbasaur")).unwrap();

    let fetcher = StubFetcher::failing(FetchError::Status {
        url: POKEAPI_LISTING_URL.to_string(),
        status: 503,
    });
    let err = SeedService::new(&repo, &fetcher).execute_seed().unwrap_err();

    assert!(matches!(
        err,
        ServiceError::Fetch(FetchError::Status { status: 503, .. })
    ));
    assert!(pokemon.list(&PaginationParams::default()).unwrap().is_empty());
}

#[test]
fn malformed_body_is_a_fetch_error() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqlitePokemonRepository::try_new(&conn).unwrap();
    let fetcher = StubFetcher::with_body(json!({ "items": [] }));

    let err = SeedService::new(&repo, &fetcher).execute_seed().unwrap_err();
    assert!(matches!(err, ServiceError::Fetch(FetchError::Decode(_))));
}

#[test]
fn entry_without_numeric_segment_is_imported_without_no() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqlitePokemonRepository::try_new(&conn).unwrap();
    let fetcher = StubFetcher::with_body(json!({
        "results": [
            { "name": "bulbasaur", "url": "https://pokeapi.co/api/v2/pokemon/1/" },
            { "name": "ivysaur", "url": "https://pokeapi.co/api/v2/pokemon/2/" },
            { "name": "glitch", "url": "https://pokeapi.co/api/v2/pokemon/glitch/" },
        ]
    }));

    assert_eq!(
        SeedService::new(&repo, &fetcher).execute_seed().unwrap(),
        SEED_EXECUTED
    );

    let pokemon = PokemonService::new(&repo, 100);
    let all = pokemon.list(&PaginationParams::default()).unwrap();
    assert_eq!(all.len(), 3);

    let glitch = pokemon.resolve("glitch").unwrap();
    assert_eq!(glitch.no, None);
    assert_eq!(pokemon.resolve("2").unwrap().name, "ivysaur");
}

#[test]
fn several_entries_without_numeric_segment_coexist() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqlitePokemonRepository::try_new(&conn).unwrap();
    let fetcher = StubFetcher::with_body(json!({
        "results": [
            { "name": "glitch-a", "url": "https://pokeapi.co/api/v2/pokemon/a/" },
            { "name": "bulbasaur", "url": "https://pokeapi.co/api/v2/pokemon/1/" },
            { "name": "glitch-b", "url": "https://pokeapi.co/api/v2/pokemon/b/" },
        ]
    }));

    SeedService::new(&repo, &fetcher).execute_seed().unwrap();

    let all = PokemonService::new(&repo, 100)
        .list(&PaginationParams::default())
        .unwrap();
    let numbers: Vec<Option<i64>> = all.iter().map(|pokemon| pokemon.no).collect();
    assert_eq!(numbers, vec![None, None, Some(1)]);
}

#[test]
fn duplicate_entries_fail_the_whole_batch() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqlitePokemonRepository::try_new(&conn).unwrap();
    let fetcher = StubFetcher::with_body(json!({
        "results": [
            { "name": "bulbasaur", "url": "https://pokeapi.co/api/v2/pokemon/1/" },
            { "name": "ivysaur", "url": "https://pokeapi.co/api/v2/pokemon/1/" },
        ]
    }));

    let err = SeedService::new(&repo, &fetcher).execute_seed().unwrap_err();
    assert!(matches!(err, ServiceError::DuplicateKey { field: "no", .. }));

    let all = PokemonService::new(&repo, 100)
        .list(&PaginationParams::default())
        .unwrap();
    assert!(all.is_empty());
}

#[test]
fn imported_names_bypass_create_normalization() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqlitePokemonRepository::try_new(&conn).unwrap();
    let fetcher = StubFetcher::with_body(json!({
        "results": [
            { "name": "Mr-Mime", "url": "https://pokeapi.co/api/v2/pokemon/122/" },
        ]
    }));

    SeedService::new(&repo, &fetcher).execute_seed().unwrap();

    let pokemon = PokemonService::new(&repo, 100);
    let stored = pokemon.resolve("122").unwrap();
    assert_eq!(stored.name, "Mr-Mime");
}

#[test]
fn store_failure_while_clearing_names_the_catalog() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqlitePokemonRepository::try_new(&conn).unwrap();
    conn.execute_batch("DROP TABLE pokemon;").unwrap();
    let fetcher = StubFetcher::with_body(listing(1));

    let err = SeedService::new(&repo, &fetcher).execute_seed().unwrap_err();

    assert!(matches!(err, ServiceError::InternalStore { .. }));
    assert_eq!(err.to_string(), "can't clear the catalog - check server logs");
    assert!(fetcher.requested.borrow().is_empty());
}
