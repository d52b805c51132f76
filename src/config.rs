use std::collections::HashSet;
use std::env;

use base64::{engine::general_purpose::STANDARD, Engine};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

pub const DEFAULT_DISTANCE: u32 = 500;
pub const DEFAULT_TIMEZONE: Tz = Tz::Europe__Oslo;

#[derive(thiserror::Error, Debug)]
pub enum ConfigDecodeError {
    #[error("Missing environment variable: {0}")]
    MissingVariable(&'static str),

    #[error("Invalid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("Invalid settings JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid position: {0}")]
    Position(String),

    #[error("Invalid timezone: {0}")]
    Timezone(String),
}

pub type ConfigResult<T> = Result<T, ConfigDecodeError>;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Position {
    pub latitude: f64,
    pub longitude: f64,
}

impl Position {
    /// Parses `"<lat>,<lon>"`. Without any `.`, a `-` is read as the decimal separator,
    /// which is how positions appear in an encoded board path (`59-91,10-75`).
    pub fn decode(encoded: &str) -> ConfigResult<Position> {
        let trimmed = encoded.trim().trim_start_matches('@');
        let normalized = if trimmed.contains('.') {
            trimmed.to_string()
        } else {
            trimmed.replace('-', ".")
        };
        let (lat, lon) = normalized
            .split_once(',')
            .ok_or_else(|| ConfigDecodeError::Position(encoded.to_string()))?;

        let parse = |value: &str| {
            value
                .trim()
                .parse::<f64>()
                .map_err(|e| ConfigDecodeError::Position(format!("{}: {}", encoded, e)))
        };

        Ok(Position {
            latitude: parse(lat)?,
            longitude: parse(lon)?,
        })
    }
}

impl From<Position> for geo::Point {
    fn from(position: Position) -> Self {
        geo::Point::new(position.longitude, position.latitude)
    }
}

/// Visibility sets and search radius chosen on the settings page
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardSettings {
    pub hidden_station_ids: HashSet<String>,
    pub hidden_stop_ids: HashSet<String>,
    pub hidden_route_keys: HashSet<String>,
    pub hidden_modes: HashSet<String>,
    pub distance_meters: u32,
}

impl Default for BoardSettings {
    fn default() -> Self {
        BoardSettings {
            hidden_station_ids: HashSet::new(),
            hidden_stop_ids: HashSet::new(),
            hidden_route_keys: HashSet::new(),
            hidden_modes: HashSet::new(),
            distance_meters: DEFAULT_DISTANCE,
        }
    }
}

/// Stops and stations added by id on top of the position search
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackedIds {
    pub stop_ids: Vec<String>,
    pub station_ids: Vec<String>,
}

/// Shape of the encoded settings blob
#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct EncodedSettings {
    hidden_stations: HashSet<String>,
    hidden_stops: HashSet<String>,
    hidden_routes: HashSet<String>,
    hidden_modes: HashSet<String>,
    distance: Option<u32>,
    new_stops: Vec<String>,
    new_stations: Vec<String>,
}

/// Decodes a base64 JSON settings blob. An empty blob gives the defaults.
pub fn decode_settings(encoded: &str) -> ConfigResult<(BoardSettings, TrackedIds)> {
    let encoded = encoded.trim();
    if encoded.is_empty() {
        return Ok(Default::default());
    }

    let bytes = STANDARD.decode(encoded)?;
    let raw: EncodedSettings = serde_json::from_slice(&bytes)?;

    let settings = BoardSettings {
        hidden_station_ids: raw.hidden_stations,
        hidden_stop_ids: raw.hidden_stops,
        hidden_route_keys: raw.hidden_routes,
        hidden_modes: raw.hidden_modes,
        distance_meters: raw.distance.unwrap_or(DEFAULT_DISTANCE),
    };
    let tracked = TrackedIds {
        stop_ids: raw.new_stops,
        station_ids: raw.new_stations,
    };
    Ok((settings, tracked))
}

/// Like [`decode_settings`], but a broken blob is logged and replaced by defaults
pub fn settings_or_default(encoded: &str) -> (BoardSettings, TrackedIds) {
    decode_settings(encoded).unwrap_or_else(|e| {
        log::warn!("Ignoring board settings: {}", e);
        Default::default()
    })
}

#[derive(Debug, Clone)]
pub struct BoardConfig {
    pub position: Position,
    pub settings: BoardSettings,
    pub tracked: TrackedIds,
    pub timezone: Tz,
}

impl BoardConfig {
    pub fn new(position: Position, settings: BoardSettings, tracked: TrackedIds) -> Self {
        BoardConfig {
            position,
            settings,
            tracked,
            timezone: DEFAULT_TIMEZONE,
        }
    }

    pub fn from_env() -> ConfigResult<BoardConfig> {
        let position = env::var("TAVLA_POSITION")
            .map_err(|_| ConfigDecodeError::MissingVariable("TAVLA_POSITION"))?;
        let position = Position::decode(&position)?;

        let (settings, tracked) =
            settings_or_default(&env::var("TAVLA_SETTINGS").unwrap_or_default());

        let timezone = match env::var("TAVLA_TIMEZONE") {
            Ok(tz) => tz
                .parse::<Tz>()
                .map_err(|e| ConfigDecodeError::Timezone(e.to_string()))?,
            Err(_) => DEFAULT_TIMEZONE,
        };

        Ok(BoardConfig {
            timezone,
            ..BoardConfig::new(position, settings, tracked)
        })
    }
}
