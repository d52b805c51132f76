// Response shapes of the journey planner GraphQL API.
// Everything the normalizer checks is optional here so a single bad
// departure does not fail the whole response.

use chrono::{DateTime, FixedOffset};
use serde::Deserialize;

use crate::entities::{BikeStation, StopPlaceDetails};

#[derive(Deserialize, Debug)]
pub struct GraphQlResponse<T> {
    pub data: Option<T>,
    pub errors: Option<Vec<GraphQlError>>,
}

#[derive(Deserialize, Debug)]
pub struct GraphQlError {
    pub message: String,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct RawPlace {
    pub id: String,
    pub name: Option<String>,
}

impl RawPlace {
    pub fn into_details(self) -> Option<StopPlaceDetails> {
        let RawPlace { id, name } = self;
        name.map(|name| StopPlaceDetails { id, name })
    }
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct StopPlaceData {
    pub stop_place: Option<RawPlace>,
}

#[derive(Deserialize, Debug)]
pub struct NearestData {
    pub nearest: Option<PlaceConnection>,
}

#[derive(Deserialize, Debug)]
pub struct PlaceConnection {
    #[serde(default)]
    pub edges: Vec<PlaceEdge>,
}

#[derive(Deserialize, Debug)]
pub struct PlaceEdge {
    pub node: Option<PlaceNode>,
}

#[derive(Deserialize, Debug)]
pub struct PlaceNode {
    pub place: Option<RawPlace>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct StopPlacesData {
    #[serde(default)]
    pub stop_places: Vec<Option<RawStopPlaceDepartures>>,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RawStopPlaceDepartures {
    pub id: String,
    pub estimated_calls: Option<Vec<RawDeparture>>,
}

#[derive(Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct RawDeparture {
    pub expected_departure_time: Option<DateTime<FixedOffset>>,
    pub destination_display: Option<RawDestinationDisplay>,
    pub service_journey: Option<RawServiceJourney>,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RawDestinationDisplay {
    pub front_text: Option<String>,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RawServiceJourney {
    pub journey_pattern: Option<RawJourneyPattern>,
    pub transport_submode: Option<String>,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct RawJourneyPattern {
    pub line: Option<RawLine>,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RawLine {
    pub public_code: Option<String>,
    pub transport_mode: Option<String>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct BikeStationsData {
    #[serde(default)]
    pub bike_rental_stations_by_bbox: Vec<Option<RawBikeStation>>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct BikeStationData {
    pub bike_rental_station: Option<RawBikeStation>,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct RawBikeStation {
    pub id: String,
    pub name: String,
    pub bikes_available: Option<u32>,
    pub spaces_available: Option<u32>,
}

impl From<RawBikeStation> for BikeStation {
    fn from(raw: RawBikeStation) -> Self {
        BikeStation {
            id: raw.id,
            name: raw.name,
            bikes_available: raw.bikes_available.unwrap_or(0),
            docks_available: raw.spaces_available.unwrap_or(0),
        }
    }
}
