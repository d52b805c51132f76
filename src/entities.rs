use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TransportMode {
    Bus,
    Bike,
    Ferry,
    Metro,
    Rail,
    Tram,
    Lock,
}

impl TransportMode {
    /// Maps a transport mode as reported by the journey planner.
    /// Coach services are shown as buses and `water` is the planner's name for ferries.
    pub fn from_raw(mode: &str) -> Option<TransportMode> {
        match mode {
            "bus" | "coach" => Some(TransportMode::Bus),
            "bike" => Some(TransportMode::Bike),
            "ferry" | "water" => Some(TransportMode::Ferry),
            "metro" => Some(TransportMode::Metro),
            "rail" => Some(TransportMode::Rail),
            "tram" => Some(TransportMode::Tram),
            "lock" => Some(TransportMode::Lock),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TransportMode::Bus => "bus",
            TransportMode::Bike => "bike",
            TransportMode::Ferry => "ferry",
            TransportMode::Metro => "metro",
            TransportMode::Rail => "rail",
            TransportMode::Tram => "tram",
            TransportMode::Lock => "lock",
        }
    }
}

/// A display-ready departure
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LineData {
    #[serde(rename = "type")]
    pub mode: TransportMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub_type: Option<String>,
    pub time: String,
    pub route: String,
}

/// Stop place as tracked by the board
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct StopPlace {
    pub id: String,
    pub name: String,
    pub departures: Vec<LineData>,
}

/// Static attributes of a stop place, as returned by a roster fetch
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct StopPlaceDetails {
    pub id: String,
    pub name: String,
}

/// Departures for one stop place from a single departures fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StopDepartures {
    pub id: String,
    pub departures: Vec<LineData>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BikeStation {
    pub id: String,
    pub name: String,
    pub bikes_available: u32,
    pub docks_available: u32,
}
