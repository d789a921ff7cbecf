use atlas_core::{
    AddCityOutcome, CityStore, Coordinates, MarkerColor, SavedCity, StoreError, UserStats,
};

use crate::domain::{
    models::{CommandError, UserId},
    ports::CityRepository,
};

/// [CityRepository] over the SQLite [CityStore]. Store calls block, so each one runs on the
/// blocking thread pool.
#[derive(Debug, Clone)]
pub struct SqliteRepository {
    store: CityStore,
}

impl SqliteRepository {
    pub fn new(store: CityStore) -> Self {
        Self { store }
    }

    async fn blocking<T, F>(&self, op: F) -> Result<T, CommandError>
    where
        T: Send + 'static,
        F: FnOnce(&CityStore) -> Result<T, StoreError> + Send + 'static,
    {
        let store = self.store.clone();

        tokio::task::spawn_blocking(move || op(&store))
            .await
            .map_err(|err| CommandError::Storage(err.into()))?
            .map_err(|err| CommandError::Storage(err.into()))
    }
}

impl CityRepository for SqliteRepository {
    async fn canonical_name(&self, name: &str) -> Result<Option<String>, CommandError> {
        let name = name.to_string();
        self.blocking(move |store| store.canonical_name(&name)).await
    }

    async fn coordinates(&self, name: &str) -> Result<Option<Coordinates>, CommandError> {
        let name = name.to_string();
        self.blocking(move |store| store.resolve_coordinates(&name))
            .await
    }

    async fn add_city(
        &self,
        user: UserId,
        name: &str,
        color: MarkerColor,
    ) -> Result<AddCityOutcome, CommandError> {
        let name = name.to_string();
        self.blocking(move |store| store.add_city_for_user(user.raw(), &name, color))
            .await
    }

    async fn set_color(
        &self,
        user: UserId,
        name: &str,
        color: MarkerColor,
    ) -> Result<bool, CommandError> {
        let name = name.to_string();
        self.blocking(move |store| store.set_marker_color(user.raw(), &name, color))
            .await
    }

    async fn remove_city(&self, user: UserId, name: &str) -> Result<bool, CommandError> {
        let name = name.to_string();
        self.blocking(move |store| store.remove_city_for_user(user.raw(), &name))
            .await
    }

    async fn list_cities(&self, user: UserId) -> Result<Vec<SavedCity>, CommandError> {
        self.blocking(move |store| store.list_cities_for_user(user.raw()))
            .await
    }

    async fn find_variants(&self, term: &str) -> Result<Vec<String>, CommandError> {
        let term = term.to_string();
        self.blocking(move |store| store.find_city_variants(&term))
            .await
    }

    async fn stats(&self, user: UserId) -> Result<UserStats, CommandError> {
        self.blocking(move |store| store.user_stats(user.raw())).await
    }
}
