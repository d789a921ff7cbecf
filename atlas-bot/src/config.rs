use std::{env, path::PathBuf, str::FromStr};

use anyhow::Context;
use tracing::Level;

const SERVER_PORT_KEY: &str = "SERVER_PORT";
const DATABASE_PATH_KEY: &str = "DATABASE_PATH";
const BASEMAP_DIR_KEY: &str = "BASEMAP_DIR";
const RELIEF_IMAGE_KEY: &str = "RELIEF_IMAGE";
const MAP_WIDTH_KEY: &str = "MAP_WIDTH";
const MAP_HEIGHT_KEY: &str = "MAP_HEIGHT";
const LOG_LEVEL_KEY: &str = "LOG_LEVEL";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub server_port: String,
    pub database_path: PathBuf,
    pub basemap_dir: PathBuf,
    pub relief_image: Option<PathBuf>,
    pub map_width: u32,
    pub map_height: u32,
    pub log_level: Level,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Config> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Config> {
        let server_port = lookup(SERVER_PORT_KEY)
            .with_context(|| format!("{SERVER_PORT_KEY} must be set"))?;

        let path_or = |key: &str, default: &str| {
            PathBuf::from(lookup(key).unwrap_or_else(|| default.to_string()))
        };

        Ok(Config {
            server_port,
            database_path: path_or(DATABASE_PATH_KEY, "cities.db"),
            basemap_dir: path_or(BASEMAP_DIR_KEY, "basemap"),
            relief_image: lookup(RELIEF_IMAGE_KEY).map(PathBuf::from),
            map_width: parse_or(&lookup, MAP_WIDTH_KEY, 1200)?,
            map_height: parse_or(&lookup, MAP_HEIGHT_KEY, 800)?,
            log_level: parse_or(&lookup, LOG_LEVEL_KEY, Level::INFO)?,
        })
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .parse()
            .with_context(|| format!("invalid {key}: {raw}")),
        None => Ok(default),
    }
}
