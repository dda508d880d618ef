//! Pokemon record store contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide the store operations the record and seed services need.
//! - Translate SQLite unique-constraint failures into `RepoError::DuplicateKey`.
//! - Keep SQL details inside the persistence boundary.
//!
//! # Invariants
//! - Read paths never project `created_at`/`updated_at`.
//! - Read paths reject invalid persisted state instead of masking it.
//! - `insert_many` is all-or-nothing.
//! - `no` may be NULL for imported rows; NULLs never collide on the unique index
//!   and sort before numbered rows.

use crate::db::migrations::latest_version;
use crate::db::DbError;
use crate::model::pagination::Page;
use crate::model::pokemon::{Pokemon, PokemonId, SeedImportRecord, UpdatePokemon};
use once_cell::sync::Lazy;
use regex::Regex;
use rusqlite::{params, Connection, ErrorCode, OptionalExtension, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

const POKEMON_SELECT_SQL: &str = "SELECT id, no, name FROM pokemon";

const INSERT_POKEMON_SQL: &str = "INSERT INTO pokemon (id, no, name) VALUES (?1, ?2, ?3);";

static CONSTRAINT_COLUMN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"constraint failed: \w+\.(\w+)").expect("valid constraint column regex")
});

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for catalog persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    /// A unique index rejected the write.
    DuplicateKey {
        field: &'static str,
        value: String,
    },
    NotFound(PokemonId),
    InvalidData(String),
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::DuplicateKey { field, value } => {
                write!(f, "duplicate value for unique field `{field}`: {value}")
            }
            Self::NotFound(id) => write!(f, "pokemon not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted pokemon data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} does not match expected {expected_version}"
            ),
            Self::MissingRequiredTable(table) => write!(f, "missing required table `{table}`"),
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "missing required column `{table}.{column}`")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Record store capability used by the record and seed services.
pub trait PokemonRepository {
    /// Inserts one record.
    fn insert_pokemon(&self, pokemon: &Pokemon) -> RepoResult<()>;
    /// Inserts all records in one batch; nothing is written on failure.
    fn insert_many(&self, records: &[SeedImportRecord]) -> RepoResult<usize>;
    /// Lists records ordered by `no` ascending. `limit == 0` means unbounded.
    fn list_pokemon(&self, page: Page) -> RepoResult<Vec<Pokemon>>;
    fn find_by_no(&self, no: i64) -> RepoResult<Option<Pokemon>>;
    fn find_by_id(&self, id: PokemonId) -> RepoResult<Option<Pokemon>>;
    fn find_by_name(&self, name: &str) -> RepoResult<Option<Pokemon>>;
    /// Applies the present fields of `patch` to the record with `id`.
    fn update_pokemon(&self, id: PokemonId, patch: &UpdatePokemon) -> RepoResult<()>;
    /// Deletes one record; returns the number of rows removed (0 or 1).
    fn delete_by_id(&self, id: PokemonId) -> RepoResult<usize>;
    /// Deletes every record; returns the number of rows removed.
    fn delete_all(&self) -> RepoResult<usize>;
}

impl<R: PokemonRepository + ?Sized> PokemonRepository for &R {
    fn insert_pokemon(&self, pokemon: &Pokemon) -> RepoResult<()> {
        (**self).insert_pokemon(pokemon)
    }

    fn insert_many(&self, records: &[SeedImportRecord]) -> RepoResult<usize> {
        (**self).insert_many(records)
    }

    fn list_pokemon(&self, page: Page) -> RepoResult<Vec<Pokemon>> {
        (**self).list_pokemon(page)
    }

    fn find_by_no(&self, no: i64) -> RepoResult<Option<Pokemon>> {
        (**self).find_by_no(no)
    }

    fn find_by_id(&self, id: PokemonId) -> RepoResult<Option<Pokemon>> {
        (**self).find_by_id(id)
    }

    fn find_by_name(&self, name: &str) -> RepoResult<Option<Pokemon>> {
        (**self).find_by_name(name)
    }

    fn update_pokemon(&self, id: PokemonId, patch: &UpdatePokemon) -> RepoResult<()> {
        (**self).update_pokemon(id, patch)
    }

    fn delete_by_id(&self, id: PokemonId) -> RepoResult<usize> {
        (**self).delete_by_id(id)
    }

    fn delete_all(&self) -> RepoResult<usize> {
        (**self).delete_all()
    }
}

/// SQLite-backed record store.
pub struct SqlitePokemonRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqlitePokemonRepository<'conn> {
    /// Creates a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_pokemon_connection_ready(conn)?;
        Ok(Self { conn })
    }

    fn find_one(&self, filter: &str, value: impl rusqlite::ToSql) -> RepoResult<Option<Pokemon>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{POKEMON_SELECT_SQL} WHERE {filter} = ?1 LIMIT 1;"))?;
        let row = stmt
            .query_row([value], |row| Ok(parse_pokemon_row(row)))
            .optional()?;
        row.transpose()
    }
}

impl PokemonRepository for SqlitePokemonRepository<'_> {
    fn insert_pokemon(&self, pokemon: &Pokemon) -> RepoResult<()> {
        self.conn
            .execute(
                INSERT_POKEMON_SQL,
                params![pokemon.id.to_string(), pokemon.no, pokemon.name.as_str()],
            )
            .map_err(|err| translate_write_error(err, pokemon.no, &pokemon.name))?;
        Ok(())
    }

    fn insert_many(&self, records: &[SeedImportRecord]) -> RepoResult<usize> {
        let tx = self.conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare(INSERT_POKEMON_SQL)?;
            for record in records {
                stmt.execute(params![
                    Uuid::new_v4().to_string(),
                    record.no,
                    record.name.as_str()
                ])
                .map_err(|err| translate_write_error(err, record.no, &record.name))?;
            }
        }
        tx.commit()?;
        Ok(records.len())
    }

    fn list_pokemon(&self, page: Page) -> RepoResult<Vec<Pokemon>> {
        let limit = if page.limit == 0 {
            -1
        } else {
            i64::from(page.limit)
        };

        let mut stmt = self.conn.prepare(&format!(
            "{POKEMON_SELECT_SQL}
             ORDER BY no ASC
             LIMIT ?1 OFFSET ?2;"
        ))?;
        let mut rows = stmt.query(params![limit, i64::from(page.offset)])?;
        let mut items = Vec::new();

        while let Some(row) = rows.next()? {
            items.push(parse_pokemon_row(row)?);
        }

        Ok(items)
    }

    fn find_by_no(&self, no: i64) -> RepoResult<Option<Pokemon>> {
        self.find_one("no", no)
    }

    fn find_by_id(&self, id: PokemonId) -> RepoResult<Option<Pokemon>> {
        self.find_one("id", id.to_string())
    }

    fn find_by_name(&self, name: &str) -> RepoResult<Option<Pokemon>> {
        self.find_one("name", name)
    }

    fn update_pokemon(&self, id: PokemonId, patch: &UpdatePokemon) -> RepoResult<()> {
        let changed = self
            .conn
            .execute(
                "UPDATE pokemon
                 SET
                    no = COALESCE(?1, no),
                    name = COALESCE(?2, name),
                    updated_at = (strftime('%s', 'now') * 1000)
                 WHERE id = ?3;",
                params![patch.no, patch.name.as_deref(), id.to_string()],
            )
            .map_err(|err| {
                translate_write_error(err, patch.no, patch.name.as_deref().unwrap_or_default())
            })?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        Ok(())
    }

    fn delete_by_id(&self, id: PokemonId) -> RepoResult<usize> {
        let deleted = self
            .conn
            .execute("DELETE FROM pokemon WHERE id = ?1;", [id.to_string()])?;
        Ok(deleted)
    }

    fn delete_all(&self) -> RepoResult<usize> {
        let deleted = self.conn.execute("DELETE FROM pokemon;", [])?;
        Ok(deleted)
    }
}

/// Maps a SQLite unique-constraint failure to `RepoError::DuplicateKey`.
///
/// `no`/`name` are the values the failed write attempted; the one matching
/// the violated column is reported.
fn translate_write_error(err: rusqlite::Error, no: Option<i64>, name: &str) -> RepoError {
    let field = match &err {
        rusqlite::Error::SqliteFailure(code, Some(message))
            if code.code == ErrorCode::ConstraintViolation =>
        {
            violated_field(message)
        }
        _ => None,
    };

    match field {
        Some("no") => RepoError::DuplicateKey {
            field: "no",
            value: no.map_or_else(|| String::from("null"), |no| no.to_string()),
        },
        Some("name") => RepoError::DuplicateKey {
            field: "name",
            value: name.to_string(),
        },
        Some("id") => RepoError::DuplicateKey {
            field: "id",
            value: String::from("<generated>"),
        },
        _ => err.into(),
    }
}

fn violated_field(message: &str) -> Option<&'static str> {
    if !message.starts_with("UNIQUE") && !message.starts_with("PRIMARY KEY") {
        return None;
    }
    let captures = CONSTRAINT_COLUMN_RE.captures(message)?;
    match captures.get(1)?.as_str() {
        "no" => Some("no"),
        "name" => Some("name"),
        "id" => Some("id"),
        _ => None,
    }
}

fn parse_pokemon_row(row: &Row<'_>) -> RepoResult<Pokemon> {
    let id_text: String = row.get("id")?;
    let id = Uuid::parse_str(&id_text).map_err(|_| {
        RepoError::InvalidData(format!("invalid uuid value `{id_text}` in pokemon.id"))
    })?;

    let name: String = row.get("name")?;
    if name.is_empty() {
        return Err(RepoError::InvalidData(format!(
            "empty name for pokemon `{id_text}`"
        )));
    }

    Ok(Pokemon {
        id,
        no: row.get("no")?,
        name,
    })
}

fn ensure_pokemon_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    if !table_exists(conn, "pokemon")? {
        return Err(RepoError::MissingRequiredTable("pokemon"));
    }

    for column in ["id", "no", "name", "created_at", "updated_at"] {
        if !table_has_column(conn, "pokemon", column)? {
            return Err(RepoError::MissingRequiredColumn {
                table: "pokemon",
                column,
            });
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> RepoResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}
