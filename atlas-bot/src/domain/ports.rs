/*
   Module `ports` specifies the API by which external modules interact with the atlas domain.

   All traits are bounded by `Send + Sync + 'static`, since their implementations must be shareable
   between request-handling threads.

   Trait methods are explicitly asynchronous, including `Send` bounds on response types,
   since the application is expected to always run in a multithreaded environment.
*/

use std::future::Future;

use atlas_core::{AddCityOutcome, Coordinates, MapStyle, MarkerColor, SavedCity, UserStats};

use crate::domain::models::*;

/// `AtlasService` is the public API for the atlas domain.
///
/// External modules must conform to this contract – the domain is not concerned with the
/// implementation details or underlying technology of any external code.
pub trait AtlasService: Clone + Send + Sync + 'static {
    /// Asynchronously run a chat command and produce the [Reply] to send back.
    ///
    /// Unknown cities and empty results are ordinary replies.
    ///
    /// # Errors
    ///
    /// - [CommandError::Storage] if the city records could not be read or written.
    /// - [CommandError::Rendering] if a map image could not be produced.
    fn handle_command(
        &self,
        req: &CommandRequest,
    ) -> impl Future<Output = Result<Reply, CommandError>> + Send;
}

/// `CityRepository` represents the store of known cities and of the cities users have saved.
///
/// External modules must conform to this contract – the domain is not concerned with the
/// implementation details or underlying technology of any external code.
pub trait CityRepository: Send + Sync + Clone + 'static {
    /// The stored spelling of `name`, if any spelling of it is known.
    fn canonical_name(
        &self,
        name: &str,
    ) -> impl Future<Output = Result<Option<String>, CommandError>> + Send;

    /// Exact-name coordinate lookup.
    fn coordinates(
        &self,
        name: &str,
    ) -> impl Future<Output = Result<Option<Coordinates>, CommandError>> + Send;

    fn add_city(
        &self,
        user: UserId,
        name: &str,
        color: MarkerColor,
    ) -> impl Future<Output = Result<AddCityOutcome, CommandError>> + Send;

    /// Returns false when the city is unknown.
    fn set_color(
        &self,
        user: UserId,
        name: &str,
        color: MarkerColor,
    ) -> impl Future<Output = Result<bool, CommandError>> + Send;

    /// Returns whether a saved city was actually removed.
    fn remove_city(
        &self,
        user: UserId,
        name: &str,
    ) -> impl Future<Output = Result<bool, CommandError>> + Send;

    /// Most recently saved first.
    fn list_cities(
        &self,
        user: UserId,
    ) -> impl Future<Output = Result<Vec<SavedCity>, CommandError>> + Send;

    fn find_variants(
        &self,
        term: &str,
    ) -> impl Future<Output = Result<Vec<String>, CommandError>> + Send;

    fn stats(&self, user: UserId) -> impl Future<Output = Result<UserStats, CommandError>> + Send;
}

/// `MapPainter` produces the PNG images sent back to users.
pub trait MapPainter: Send + Sync + Clone + 'static {
    fn paint_cities(
        &self,
        cities: Vec<(String, MarkerColor)>,
        style: MapStyle,
    ) -> impl Future<Output = Result<Vec<u8>, CommandError>> + Send;

    fn paint_distance(
        &self,
        from: &str,
        to: &str,
    ) -> impl Future<Output = Result<Vec<u8>, CommandError>> + Send;
}

/// `CommandMetrics` describes an aggregator of command handling metrics, such as a time-series
/// database.
pub trait CommandMetrics: Send + Sync + Clone + 'static {
    /// Record a command that produced a reply.
    fn record_command_success(&self, command: &'static str) -> impl Future<Output = ()> + Send;

    /// Record a command that failed with a [CommandError].
    fn record_command_failure(&self, command: &'static str) -> impl Future<Output = ()> + Send;
}
