/*!
   Module `service` provides the canonical implementation of the [AtlasService] port.
*/

use atlas_core::{AddCityOutcome, MAX_CITY_SUGGESTIONS, MapStyle, MarkerColor, distance_km};

use super::{
    models::{Command, CommandError, CommandRequest, Reply, UserId},
    ports::{AtlasService, CityRepository, CommandMetrics, MapPainter},
};

const GREETING: &str = "Hi! I can show cities on a map and remember your favourite ones. \
                        Send /help to see the commands.";

const HELP: &str = "Available commands:
/start - greeting
/help - this list
/show_city <city> - show a city on the map
/remember_city <city> [color] - save a city to your list
/set_color <city> <color> - change the marker color of a saved city
/remove_city <city> - remove a city from your list
/show_my_cities [style] - show all your saved cities
/search <part of a name> - find city names containing the text
/stats - how many cities and colors you have saved
/distance <city>, <city> - draw the shortest route between two cities
/colors - marker colors
/styles - map styles";

const UNKNOWN_CITY_HINT: &str = "Make sure it is spelled in English, or try /search.";

/// Canonical implementation of the [AtlasService] port, through which the atlas domain API is
/// consumed.
#[derive(Debug, Clone)]
pub struct Service<R, P, M>
where
    R: CityRepository,
    P: MapPainter,
    M: CommandMetrics,
{
    repository: R,
    painter: P,
    metrics: M,
}

impl<R, P, M> Service<R, P, M>
where
    R: CityRepository,
    P: MapPainter,
    M: CommandMetrics,
{
    pub fn new(repository: R, painter: P, metrics: M) -> Self {
        Self {
            repository,
            painter,
            metrics,
        }
    }

    async fn run(&self, user: UserId, command: &Command) -> Result<Reply, CommandError> {
        match command {
            Command::Start => Ok(Reply::text(GREETING)),
            Command::Help => Ok(Reply::text(HELP)),
            Command::ShowCity { name } => self.show_city(name).await,
            Command::RememberCity { name, color } => self.remember_city(user, name, *color).await,
            Command::SetColor { name, color } => self.set_color(user, name, *color).await,
            Command::RemoveCity { name } => self.remove_city(user, name).await,
            Command::ShowMyCities { style } => self.show_my_cities(user, *style).await,
            Command::Search { term } => self.search(term).await,
            Command::Stats => {
                let stats = self.repository.stats(user).await?;
                Ok(Reply::Text(format!(
                    "You have saved {} cities using {} marker colors.",
                    stats.total_cities, stats.unique_colors
                )))
            }
            Command::Distance { from, to } => self.distance(from, to).await,
            Command::Colors => Ok(Reply::Text(format!(
                "Marker colors: {}",
                MarkerColor::ALL.map(|color| color.as_str()).join(", ")
            ))),
            Command::Styles => Ok(Reply::Text(format!(
                "Map styles for /show_my_cities: {}",
                MapStyle::ALL.map(|style| style.as_str()).join(", ")
            ))),
        }
    }

    async fn show_city(&self, name: &str) -> Result<Reply, CommandError> {
        let Some(city) = self.repository.canonical_name(name).await? else {
            return Ok(Reply::Text(format!(
                "I don't know the city {name}. {UNKNOWN_CITY_HINT}"
            )));
        };

        let png = self
            .painter
            .paint_cities(vec![(city.clone(), MarkerColor::Red)], MapStyle::Simple)
            .await?;

        Ok(Reply::Photo {
            png,
            caption: format!("City: {city}"),
        })
    }

    async fn remember_city(
        &self,
        user: UserId,
        name: &str,
        color: MarkerColor,
    ) -> Result<Reply, CommandError> {
        let reply = match self.repository.add_city(user, name, color).await? {
            AddCityOutcome::Saved {
                canonical_name,
                created: true,
            } => format!("Saved {canonical_name} with a {color} marker!"),
            AddCityOutcome::Saved {
                canonical_name,
                created: false,
            } => format!("{canonical_name} was already saved, its marker is now {color}."),
            AddCityOutcome::UnknownCity => {
                format!("I don't know the city {name}. {UNKNOWN_CITY_HINT}")
            }
        };

        Ok(Reply::Text(reply))
    }

    async fn set_color(
        &self,
        user: UserId,
        name: &str,
        color: MarkerColor,
    ) -> Result<Reply, CommandError> {
        let Some(city) = self.repository.canonical_name(name).await? else {
            return Ok(Reply::Text(format!(
                "I don't know the city {name}. {UNKNOWN_CITY_HINT}"
            )));
        };

        let reply = if self.repository.set_color(user, &city, color).await? {
            format!("The marker of {city} is now {color}.")
        } else {
            format!("I don't know the city {city}. {UNKNOWN_CITY_HINT}")
        };

        Ok(Reply::Text(reply))
    }

    async fn remove_city(&self, user: UserId, name: &str) -> Result<Reply, CommandError> {
        let city = self
            .repository
            .canonical_name(name)
            .await?
            .unwrap_or_else(|| name.to_string());

        let reply = if self.repository.remove_city(user, &city).await? {
            format!("Removed {city} from your cities.")
        } else {
            format!("{city} is not among your saved cities. Send /show_my_cities to see them.")
        };

        Ok(Reply::Text(reply))
    }

    async fn show_my_cities(&self, user: UserId, style: MapStyle) -> Result<Reply, CommandError> {
        let cities = self.repository.list_cities(user).await?;

        if cities.is_empty() {
            return Ok(Reply::text(
                "You have no saved cities yet. Use /remember_city to add one.",
            ));
        }

        let caption = cities.iter().fold(
            String::from("Your saved cities:"),
            |mut caption, city| {
                caption.push_str(&format!("\n• {} ({})", city.name, city.color));
                caption
            },
        );

        let png = self
            .painter
            .paint_cities(
                cities
                    .into_iter()
                    .map(|city| (city.name, city.color))
                    .collect(),
                style,
            )
            .await?;

        Ok(Reply::Photo { png, caption })
    }

    async fn search(&self, term: &str) -> Result<Reply, CommandError> {
        let names = self.repository.find_variants(term).await?;

        if names.is_empty() {
            return Ok(Reply::Text(format!(
                "No cities contain \"{term}\". Names are case-sensitive and in English."
            )));
        }

        let mut reply = format!("Cities matching \"{term}\":");
        for name in &names {
            reply.push_str("\n• ");
            reply.push_str(name);
        }
        if names.len() == MAX_CITY_SUGGESTIONS {
            reply.push_str("\nShowing the first matches only, try a longer search.");
        }

        Ok(Reply::Text(reply))
    }

    async fn distance(&self, from: &str, to: &str) -> Result<Reply, CommandError> {
        let start = self.repository.coordinates(from).await?;
        let end = self.repository.coordinates(to).await?;

        let (Some(start), Some(end)) = (start, end) else {
            let unknown = if start.is_none() { from } else { to };
            return Ok(Reply::Text(format!(
                "I don't know the city {unknown}. The distance needs exact names, try /search."
            )));
        };

        let png = self.painter.paint_distance(from, to).await?;

        Ok(Reply::Photo {
            png,
            caption: format!("{from} to {to}: {:.0} km", distance_km(start, end)),
        })
    }
}

impl<R, P, M> AtlasService for Service<R, P, M>
where
    R: CityRepository,
    P: MapPainter,
    M: CommandMetrics,
{
    /// Run the command in `req` and record the outcome.
    ///
    /// # Errors
    ///
    /// - Propagates any [CommandError] returned by the [CityRepository] or the [MapPainter].
    async fn handle_command(&self, req: &CommandRequest) -> Result<Reply, CommandError> {
        let command = req.command();
        let result = self.run(req.user_id(), command).await;

        match result {
            Ok(_) => self.metrics.record_command_success(command.name()).await,
            Err(_) => self.metrics.record_command_failure(command.name()).await,
        }

        result
    }
}

#[cfg(test)]
mod test {
    use super::*;

    use std::sync::{Arc, Mutex};

    use atlas_core::{Coordinates, SavedCity, UserStats};
    use chrono::NaiveDateTime;

    const KNOWN: [(&str, Coordinates); 3] = [
        ("London", Coordinates::new(51.5074, -0.1278)),
        ("Paris", Coordinates::new(48.8566, 2.3522)),
        ("New York", Coordinates::new(40.7128, -74.0060)),
    ];

    /// Keeps saved cities in memory and matches names case-insensitively.
    #[derive(Clone, Default)]
    struct MemoryRepository {
        saved: Arc<Mutex<Vec<(UserId, String, MarkerColor)>>>,
        broken: bool,
    }

    impl MemoryRepository {
        fn broken() -> Self {
            Self {
                broken: true,
                ..Self::default()
            }
        }

        fn check(&self) -> Result<(), CommandError> {
            match self.broken {
                true => Err(CommandError::Storage(anyhow::anyhow!("database is locked"))),
                false => Ok(()),
            }
        }

        fn lookup(name: &str) -> Option<&'static str> {
            KNOWN
                .iter()
                .find(|(known, _)| known.eq_ignore_ascii_case(name))
                .map(|(known, _)| *known)
        }
    }

    impl CityRepository for MemoryRepository {
        async fn canonical_name(&self, name: &str) -> Result<Option<String>, CommandError> {
            self.check()?;
            Ok(Self::lookup(name).map(str::to_string))
        }

        async fn coordinates(&self, name: &str) -> Result<Option<Coordinates>, CommandError> {
            self.check()?;
            Ok(KNOWN
                .iter()
                .find(|(known, _)| *known == name)
                .map(|(_, coords)| *coords))
        }

        async fn add_city(
            &self,
            user: UserId,
            name: &str,
            color: MarkerColor,
        ) -> Result<AddCityOutcome, CommandError> {
            self.check()?;
            let Some(city) = Self::lookup(name) else {
                return Ok(AddCityOutcome::UnknownCity);
            };

            let mut saved = self.saved.lock().unwrap();
            let created = match saved.iter_mut().find(|(u, c, _)| *u == user && c == city) {
                Some(entry) => {
                    entry.2 = color;
                    false
                }
                None => {
                    saved.push((user, city.to_string(), color));
                    true
                }
            };

            Ok(AddCityOutcome::Saved {
                canonical_name: city.to_string(),
                created,
            })
        }

        async fn set_color(
            &self,
            user: UserId,
            name: &str,
            color: MarkerColor,
        ) -> Result<bool, CommandError> {
            Ok(self.add_city(user, name, color).await?.is_saved())
        }

        async fn remove_city(&self, user: UserId, name: &str) -> Result<bool, CommandError> {
            self.check()?;
            let Some(city) = Self::lookup(name) else {
                return Ok(false);
            };

            let mut saved = self.saved.lock().unwrap();
            let before = saved.len();
            saved.retain(|(u, c, _)| !(*u == user && c == city));
            Ok(saved.len() < before)
        }

        async fn list_cities(&self, user: UserId) -> Result<Vec<SavedCity>, CommandError> {
            self.check()?;
            let saved = self.saved.lock().unwrap();
            Ok(saved
                .iter()
                .rev()
                .filter(|(u, _, _)| *u == user)
                .map(|(_, name, color)| SavedCity {
                    name: name.clone(),
                    color: *color,
                    created_at: NaiveDateTime::default(),
                })
                .collect())
        }

        async fn find_variants(&self, term: &str) -> Result<Vec<String>, CommandError> {
            self.check()?;
            Ok(KNOWN
                .iter()
                .filter(|(known, _)| known.contains(term))
                .map(|(known, _)| known.to_string())
                .collect())
        }

        async fn stats(&self, user: UserId) -> Result<UserStats, CommandError> {
            let cities = self.list_cities(user).await?;
            let mut colors = cities.iter().map(|city| city.color).collect::<Vec<_>>();
            colors.sort();
            colors.dedup();

            Ok(UserStats {
                total_cities: cities.len() as u64,
                unique_colors: colors.len() as u64,
            })
        }
    }

    /// Records what it was asked to paint and returns a fixed image.
    #[derive(Clone, Default)]
    struct RecordingPainter {
        painted: Arc<Mutex<Vec<String>>>,
        broken: bool,
    }

    impl MapPainter for RecordingPainter {
        async fn paint_cities(
            &self,
            cities: Vec<(String, MarkerColor)>,
            style: MapStyle,
        ) -> Result<Vec<u8>, CommandError> {
            if self.broken {
                return Err(CommandError::Rendering(anyhow::anyhow!("no canvas")));
            }

            let names = cities
                .iter()
                .map(|(name, color)| format!("{name}:{color}"))
                .collect::<Vec<_>>();
            self.painted
                .lock()
                .unwrap()
                .push(format!("{style} {}", names.join(",")));

            Ok(b"png".to_vec())
        }

        async fn paint_distance(&self, from: &str, to: &str) -> Result<Vec<u8>, CommandError> {
            self.painted.lock().unwrap().push(format!("{from}->{to}"));
            Ok(b"png".to_vec())
        }
    }

    #[derive(Clone, Default)]
    struct CountingMetrics {
        outcomes: Arc<Mutex<Vec<(&'static str, bool)>>>,
    }

    impl CommandMetrics for CountingMetrics {
        async fn record_command_success(&self, command: &'static str) {
            self.outcomes.lock().unwrap().push((command, true));
        }

        async fn record_command_failure(&self, command: &'static str) {
            self.outcomes.lock().unwrap().push((command, false));
        }
    }

    type TestService = Service<MemoryRepository, RecordingPainter, CountingMetrics>;

    fn service() -> TestService {
        Service::new(
            MemoryRepository::default(),
            RecordingPainter::default(),
            CountingMetrics::default(),
        )
    }

    async fn send(service: &TestService, user: i64, text: &str) -> Result<Reply, CommandError> {
        let command = Command::parse(text).unwrap();
        service
            .handle_command(&CommandRequest::new(UserId::from(user), command))
            .await
    }

    fn text(reply: Reply) -> String {
        match reply {
            Reply::Text(text) => text,
            Reply::Photo { caption, .. } => panic!("Expected text, got a photo: {caption}"),
        }
    }

    fn caption(reply: Reply) -> String {
        match reply {
            Reply::Photo { caption, .. } => caption,
            Reply::Text(text) => panic!("Expected a photo, got text: {text}"),
        }
    }

    #[tokio::test]
    async fn test_show_city_uses_the_canonical_name() {
        let service = service();

        let reply = send(&service, 1, "/show_city london").await.unwrap();
        assert_eq!(caption(reply), "City: London");
        assert_eq!(
            service.painter.painted.lock().unwrap().as_slice(),
            ["simple London:red"]
        );

        let reply = send(&service, 1, "/show_city Atlantis").await.unwrap();
        assert!(text(reply).contains("I don't know the city Atlantis"));
    }

    #[tokio::test]
    async fn test_remember_recolor_and_remove() {
        let service = service();

        let reply = send(&service, 1, "/remember_city london").await.unwrap();
        assert_eq!(text(reply), "Saved London with a red marker!");

        let reply = send(&service, 1, "/remember_city London blue").await.unwrap();
        assert!(text(reply).contains("already saved"));

        let reply = send(&service, 1, "/set_color London green").await.unwrap();
        assert_eq!(text(reply), "The marker of London is now green.");

        let reply = send(&service, 1, "/remove_city London").await.unwrap();
        assert_eq!(text(reply), "Removed London from your cities.");

        let reply = send(&service, 1, "/remove_city London").await.unwrap();
        assert!(text(reply).contains("not among your saved cities"));
    }

    #[tokio::test]
    async fn test_replies_name_the_stored_city() {
        let service = service();

        send(&service, 1, "/remember_city Paris").await.unwrap();

        let reply = send(&service, 1, "/set_color paris green").await.unwrap();
        assert_eq!(text(reply), "The marker of Paris is now green.");

        let reply = send(&service, 1, "/remove_city PARIS").await.unwrap();
        assert_eq!(text(reply), "Removed Paris from your cities.");

        let reply = send(&service, 1, "/remove_city paris").await.unwrap();
        assert_eq!(
            text(reply),
            "Paris is not among your saved cities. Send /show_my_cities to see them."
        );

        let reply = send(&service, 1, "/set_color atlantis blue").await.unwrap();
        assert!(text(reply).contains("I don't know the city atlantis"));
    }

    #[tokio::test]
    async fn test_show_my_cities() {
        let service = service();

        let reply = send(&service, 5, "/show_my_cities").await.unwrap();
        assert!(text(reply).contains("/remember_city"), "Empty list gives a hint");

        send(&service, 5, "/remember_city London").await.unwrap();
        send(&service, 5, "/remember_city Paris blue").await.unwrap();
        send(&service, 6, "/remember_city New York").await.unwrap();

        let reply = send(&service, 5, "/show_my_cities detailed").await.unwrap();
        assert_eq!(
            caption(reply),
            "Your saved cities:\n• Paris (blue)\n• London (red)"
        );
        assert_eq!(
            service.painter.painted.lock().unwrap().as_slice(),
            ["detailed Paris:blue,London:red"]
        );
    }

    #[tokio::test]
    async fn test_search_and_stats() {
        let service = service();

        let reply = send(&service, 1, "/search Lon").await.unwrap();
        assert_eq!(text(reply), "Cities matching \"Lon\":\n• London");

        let reply = send(&service, 1, "/search Atl").await.unwrap();
        assert!(text(reply).starts_with("No cities contain"));

        send(&service, 1, "/remember_city London").await.unwrap();
        send(&service, 1, "/remember_city Paris red").await.unwrap();
        send(&service, 1, "/remember_city New York blue").await.unwrap();

        let reply = send(&service, 1, "/stats").await.unwrap();
        assert_eq!(
            text(reply),
            "You have saved 3 cities using 2 marker colors."
        );
    }

    #[tokio::test]
    async fn test_distance() {
        let service = service();

        let reply = send(&service, 1, "/distance London, Paris").await.unwrap();
        assert!(caption(reply).starts_with("London to Paris: 3"));

        let reply = send(&service, 1, "/distance London, Atlantis").await.unwrap();
        assert!(text(reply).contains("Atlantis"));

        let reply = send(&service, 1, "/distance london, Paris").await.unwrap();
        assert!(
            text(reply).contains("london"),
            "Distances resolve names exactly"
        );

        assert_eq!(
            service.painter.painted.lock().unwrap().as_slice(),
            ["London->Paris"]
        );
    }

    #[tokio::test]
    async fn test_failures_are_typed_and_recorded() {
        let service = Service::new(
            MemoryRepository::broken(),
            RecordingPainter::default(),
            CountingMetrics::default(),
        );

        let err = send(&service, 1, "/stats").await.unwrap_err();
        assert!(matches!(err, CommandError::Storage(_)));

        let service = Service::new(
            MemoryRepository::default(),
            RecordingPainter {
                broken: true,
                ..RecordingPainter::default()
            },
            CountingMetrics::default(),
        );

        let err = send(&service, 1, "/show_city Paris").await.unwrap_err();
        assert!(matches!(err, CommandError::Rendering(_)));

        send(&service, 1, "/help").await.unwrap();
        assert_eq!(
            service.metrics.outcomes.lock().unwrap().as_slice(),
            [("show_city", false), ("help", true)]
        );
    }
}
