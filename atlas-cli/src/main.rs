use atlas_core::{
    AddCityOutcome, Basemap, CityStore, DrawConfig, MapRenderer, MapStyle, MarkerColor,
};

use std::{
    fs::create_dir_all as create_generated_dir,
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::Level;
use uuid::Uuid;

const GENERATED_DIR: &str = "generated";

#[derive(Parser, Debug)]
#[command(version, about = "Save favourite cities and draw them on a map", long_about = None)]
struct Args {
    /// SQLite database with the `cities` table
    #[arg(short, long, default_value = "cities.db")]
    database: PathBuf,

    /// Directory holding the Natural Earth GeoJSON layers
    #[arg(long, default_value = "basemap")]
    basemap_dir: PathBuf,

    /// Whole-world relief image for the physical style
    #[arg(long)]
    relief: Option<PathBuf>,

    /// Log what is going on
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create the user tables if they are missing
    Init,
    /// Save a city for a user, or recolor it if already saved
    Add {
        #[arg(short, long)]
        user: i64,
        city: String,
        #[arg(short, long, default_value_t, value_enum)]
        color: MarkerColor,
    },
    /// Change the marker color of a city
    Color {
        #[arg(short, long)]
        user: i64,
        city: String,
        #[arg(value_enum)]
        color: MarkerColor,
    },
    /// Forget a saved city
    Remove {
        #[arg(short, long)]
        user: i64,
        city: String,
    },
    /// List a user's saved cities, newest first
    List {
        #[arg(short, long)]
        user: i64,
    },
    /// Find city names containing a piece of text
    Search { term: String },
    /// Count a user's saved cities and marker colors
    Stats {
        #[arg(short, long)]
        user: i64,
    },
    /// Draw one or more cities
    Show {
        #[arg(required = true)]
        cities: Vec<String>,
        #[arg(short, long, default_value_t, value_enum)]
        color: MarkerColor,
        #[arg(short, long, default_value_t, value_enum)]
        style: MapStyle,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Draw all of a user's saved cities
    Mine {
        #[arg(short, long)]
        user: i64,
        #[arg(short, long, default_value_t, value_enum)]
        style: MapStyle,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Draw the great-circle route between two cities
    Distance {
        from: String,
        to: String,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_max_level(if args.verbose { Level::DEBUG } else { Level::WARN })
        .init();

    let store = CityStore::new(&args.database);

    match args.command {
        Commands::Init => {
            store.initialize()?;
            println!("Database ready at {}", args.database.display());
        }
        Commands::Add { user, city, color } => match store.add_city_for_user(user, &city, color)? {
            AddCityOutcome::Saved {
                canonical_name,
                created,
            } => {
                let verb = if created { "Saved" } else { "Recolored" };
                println!("{verb} {canonical_name} ({color})");
            }
            AddCityOutcome::UnknownCity => println!("Unknown city: {city}"),
        },
        Commands::Color { user, city, color } => {
            if store.set_marker_color(user, &city, color)? {
                println!("{city} is now {color}");
            } else {
                println!("Unknown city: {city}");
            }
        }
        Commands::Remove { user, city } => {
            if store.remove_city_for_user(user, &city)? {
                println!("Removed {city}");
            } else {
                println!("{city} was not saved");
            }
        }
        Commands::List { user } => {
            for city in store.list_cities_for_user(user)? {
                println!("{}\t{}\t{}", city.name, city.color, city.created_at);
            }
        }
        Commands::Search { term } => {
            for name in store.find_city_variants(&term)? {
                println!("{name}");
            }
        }
        Commands::Stats { user } => {
            let stats = store.user_stats(user)?;
            println!(
                "{} cities, {} marker colors",
                stats.total_cities, stats.unique_colors
            );
        }
        Commands::Show {
            cities,
            color,
            style,
            output,
        } => {
            let cities = cities
                .into_iter()
                .map(|city| (city, color))
                .collect::<Vec<_>>();
            let output = output_path(output)?;

            let written = renderer(&args.basemap_dir, args.relief, store)
                .render_cities(&output, &cities, style)?;
            println!("Saving map to: {}", written.display());
        }
        Commands::Mine {
            user,
            style,
            output,
        } => {
            let cities = store
                .list_cities_for_user(user)?
                .into_iter()
                .map(|city| (city.name, city.color))
                .collect::<Vec<_>>();

            if cities.is_empty() {
                println!("User {user} has no saved cities");
                return Ok(());
            }

            let output = output_path(output)?;
            let written = renderer(&args.basemap_dir, args.relief, store)
                .render_cities(&output, &cities, style)?;
            println!("Saving map to: {}", written.display());
        }
        Commands::Distance { from, to, output } => {
            let output = output_path(output)?;
            let written = renderer(&args.basemap_dir, args.relief, store)
                .render_distance(&output, &from, &to)?;
            println!("Saving map to: {}", written.display());
        }
    }

    Ok(())
}

fn renderer(basemap_dir: &Path, relief: Option<PathBuf>, store: CityStore) -> MapRenderer {
    let mut basemap = Basemap::load(basemap_dir);
    if let Some(relief) = relief {
        basemap = basemap.with_relief(relief);
    }

    MapRenderer::new(store, Arc::new(basemap), DrawConfig::default())
}

/// The requested path, or a fresh file in `generated/`.
fn output_path(requested: Option<PathBuf>) -> anyhow::Result<PathBuf> {
    if let Some(path) = requested {
        return Ok(path);
    }

    create_generated_dir(GENERATED_DIR)
        .with_context(|| format!("failed to create '{GENERATED_DIR}' directory"))?;

    Ok(Path::new(GENERATED_DIR).join(format!("{}-map.png", Uuid::new_v4())))
}

#[cfg(test)]
mod test {
    use super::*;

    use clap::CommandFactory;

    #[test]
    fn test_args_are_consistent() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_parse_show() {
        let args = Args::parse_from([
            "atlas-cli",
            "--database",
            "test.db",
            "show",
            "London",
            "New York",
            "--style",
            "physical",
            "--color",
            "blue",
        ]);

        assert_eq!(args.database, PathBuf::from("test.db"));
        match args.command {
            Commands::Show {
                cities,
                color,
                style,
                output,
            } => {
                assert_eq!(cities, vec!["London", "New York"]);
                assert_eq!(color, MarkerColor::Blue);
                assert_eq!(style, MapStyle::Physical);
                assert_eq!(output, None);
            }
            other => panic!("Unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_show_needs_a_city() {
        assert!(Args::try_parse_from(["atlas-cli", "show"]).is_err());
    }
}
