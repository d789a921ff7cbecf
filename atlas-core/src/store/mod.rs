/*!
   Module `store` persists the city reference table and the per-user city associations.

   [CityStore] holds nothing but the database path. Every public operation opens its own
   connection, runs a single statement or a single transaction on it and closes it again, so a
   store value is cheap to clone and safe to share between request-handling threads.
*/

mod variants;

use crate::{
    constants::{MAX_CITY_SUGGESTIONS, SQLITE_BUSY_TIMEOUT_MS},
    types::{AddCityOutcome, Coordinates, MarkerColor, SavedCity, UserStats},
};

use std::{path::PathBuf, time::Duration};

use rusqlite::{Connection, OptionalExtension, Row, TransactionBehavior, params};
use thiserror::Error;
use tracing::{debug, info, warn};

use variants::name_variants;

const SCHEMA: &str = include_str!("schema.sql");

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// A row of the `cities` reference table matched by a lookup.
#[derive(Debug, Clone, PartialEq)]
struct CityRow {
    id: i64,
    name: String,
}

#[derive(Debug, Clone)]
pub struct CityStore {
    path: PathBuf,
}

impl CityStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn connect(&self) -> Result<Connection, StoreError> {
        let conn = Connection::open(&self.path)?;
        conn.busy_timeout(Duration::from_millis(SQLITE_BUSY_TIMEOUT_MS))?;
        // `cities` is seeded elsewhere and its `id` may not qualify as a parent key.
        conn.pragma_update(None, "foreign_keys", "OFF")?;
        Ok(conn)
    }

    /// Creates the association table and its index when missing. Idempotent.
    pub fn initialize(&self) -> Result<(), StoreError> {
        info!("Preparing city store at {}", self.path.display());

        let conn = self.connect()?;
        conn.execute_batch(SCHEMA)?;

        Ok(())
    }

    /// Exact-name coordinate lookup. Unknown names are `None`.
    pub fn resolve_coordinates(&self, name: &str) -> Result<Option<Coordinates>, StoreError> {
        let conn = self.connect()?;
        Ok(Self::coordinates_of(&conn, name)?)
    }

    /// [Self::resolve_coordinates] for several names over one connection. The result is aligned
    /// with `names`.
    pub fn resolve_all<S: AsRef<str>>(
        &self,
        names: &[S],
    ) -> Result<Vec<Option<Coordinates>>, StoreError> {
        let conn = self.connect()?;

        names
            .iter()
            .map(|name| Self::coordinates_of(&conn, name.as_ref()).map_err(StoreError::from))
            .collect()
    }

    /// Finds the stored spelling of `name`, trying it as typed, then title, upper and lower
    /// case. First match wins.
    pub fn canonical_name(&self, name: &str) -> Result<Option<String>, StoreError> {
        let conn = self.connect()?;
        Ok(Self::find_city(&conn, name)?.map(|city| city.name))
    }

    /// Saves `name` for `user_id`, or recolors it when already saved.
    pub fn add_city_for_user(
        &self,
        user_id: i64,
        name: &str,
        color: MarkerColor,
    ) -> Result<AddCityOutcome, StoreError> {
        let mut conn = self.connect()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let Some(city) = Self::find_city(&tx, name)? else {
            debug!(user_id, name, "No city matches any spelling");
            return Ok(AddCityOutcome::UnknownCity);
        };

        let created = Self::upsert_association(&tx, user_id, city.id, color)?;
        tx.commit()?;

        debug!(user_id, city = %city.name, %color, created, "Saved city for user");

        Ok(AddCityOutcome::Saved {
            canonical_name: city.name,
            created,
        })
    }

    /// Sets the marker color of a saved city, saving the city first if the user hadn't yet.
    /// Returns false only when the city is unknown.
    pub fn set_marker_color(
        &self,
        user_id: i64,
        name: &str,
        color: MarkerColor,
    ) -> Result<bool, StoreError> {
        let mut conn = self.connect()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let Some(city) = Self::find_city(&tx, name)? else {
            return Ok(false);
        };

        Self::upsert_association(&tx, user_id, city.id, color)?;
        tx.commit()?;

        Ok(true)
    }

    /// Returns whether an association was actually deleted.
    pub fn remove_city_for_user(&self, user_id: i64, name: &str) -> Result<bool, StoreError> {
        let mut conn = self.connect()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let Some(city) = Self::find_city(&tx, name)? else {
            return Ok(false);
        };

        let removed = tx.execute(
            "DELETE FROM users_cities WHERE user_id = ?1 AND city_id = ?2",
            params![user_id, city.id],
        )?;
        tx.commit()?;

        Ok(removed > 0)
    }

    /// The user's saved cities, most recently saved first.
    pub fn list_cities_for_user(&self, user_id: i64) -> Result<Vec<SavedCity>, StoreError> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare(
            "SELECT c.city AS city, uc.marker_color AS marker_color, uc.created_at AS created_at
             FROM users_cities uc
             JOIN cities c ON uc.city_id = c.id
             WHERE uc.user_id = ?1
             ORDER BY uc.created_at DESC, uc.id DESC",
        )?;

        let cities = stmt
            .query_map(params![user_id], row_to_saved_city)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(cities)
    }

    /// Up to 15 city names containing `term` (case-sensitive). Exact matches come first, then
    /// prefix, suffix and finally inner matches; ties keep table order.
    pub fn find_city_variants(&self, term: &str) -> Result<Vec<String>, StoreError> {
        let term = term.trim();
        if term.is_empty() {
            return Ok(Vec::new());
        }

        let conn = self.connect()?;
        let mut stmt = conn.prepare(
            "SELECT city, MIN(id) AS first_id
             FROM cities
             WHERE instr(city, ?1) > 0
             GROUP BY city
             ORDER BY
                 CASE
                     WHEN city = ?1 THEN 0
                     WHEN substr(city, 1, length(?1)) = ?1 THEN 1
                     WHEN substr(city, -length(?1)) = ?1 THEN 2
                     ELSE 3
                 END,
                 first_id
             LIMIT ?2",
        )?;

        let names = stmt
            .query_map(params![term, MAX_CITY_SUGGESTIONS as i64], |row| {
                row.get::<_, String>(0)
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(names)
    }

    pub fn user_stats(&self, user_id: i64) -> Result<UserStats, StoreError> {
        let conn = self.connect()?;
        let (total, unique): (i64, i64) = conn.query_row(
            "SELECT COUNT(*), COUNT(DISTINCT marker_color) FROM users_cities WHERE user_id = ?1",
            params![user_id],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;

        Ok(UserStats {
            total_cities: total.max(0) as u64,
            unique_colors: unique.max(0) as u64,
        })
    }

    fn coordinates_of(conn: &Connection, name: &str) -> rusqlite::Result<Option<Coordinates>> {
        conn.query_row(
            "SELECT lat, lng FROM cities WHERE city = ?1 ORDER BY id LIMIT 1",
            params![name],
            |row| Ok(Coordinates::new(row.get("lat")?, row.get("lng")?)),
        )
        .optional()
    }

    fn find_city(conn: &Connection, name: &str) -> rusqlite::Result<Option<CityRow>> {
        let mut stmt =
            conn.prepare("SELECT id, city FROM cities WHERE city = ?1 ORDER BY id LIMIT 1")?;

        for variant in name_variants(name.trim()) {
            let city = stmt
                .query_row(params![variant], |row| {
                    Ok(CityRow {
                        id: row.get("id")?,
                        name: row.get("city")?,
                    })
                })
                .optional()?;

            if city.is_some() {
                return Ok(city);
            }
        }

        Ok(None)
    }

    /// Inserts the association or updates its color. Returns true when a row was inserted.
    fn upsert_association(
        conn: &Connection,
        user_id: i64,
        city_id: i64,
        color: MarkerColor,
    ) -> rusqlite::Result<bool> {
        let updated = conn.execute(
            "UPDATE users_cities SET marker_color = ?3 WHERE user_id = ?1 AND city_id = ?2",
            params![user_id, city_id, color.as_str()],
        )?;

        if updated > 0 {
            return Ok(false);
        }

        conn.execute(
            "INSERT INTO users_cities (user_id, city_id, marker_color) VALUES (?1, ?2, ?3)",
            params![user_id, city_id, color.as_str()],
        )?;

        Ok(true)
    }
}

fn row_to_saved_city(row: &Row) -> rusqlite::Result<SavedCity> {
    let name: String = row.get("city")?;
    let tag: String = row.get("marker_color")?;

    let color = MarkerColor::try_from_str(&tag).unwrap_or_else(|err| {
        warn!(city = %name, "{err}, falling back to the default marker color");
        MarkerColor::default()
    });

    Ok(SavedCity {
        name,
        color,
        created_at: row.get("created_at")?,
    })
}
