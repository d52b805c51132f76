use reqwest::header::{HeaderMap, HeaderValue};
use serde_json::{json, Value};
use url::Url;

use super::entities::{
    BikeStationData, BikeStationsData, GraphQlResponse, NearestData, RawStopPlaceDepartures,
    StopPlaceData, StopPlacesData,
};
use super::error::{EnturError, EnturResult};
use super::{BoardService, DepartureQuery};
use crate::config::Position;
use crate::entities::{BikeStation, StopPlaceDetails};
use crate::geo::search_area;

pub const DEFAULT_API_URL: &str = "https://api.entur.io/journey-planner/v2/graphql";

const STOP_PLACE_QUERY: &str = r#"
query stopPlace($id: String!) {
    stopPlace(id: $id) { id name }
}"#;

const NEAREST_STOP_PLACES_QUERY: &str = r#"
query nearestStopPlaces($latitude: Float!, $longitude: Float!, $distance: Int!) {
    nearest(
        latitude: $latitude
        longitude: $longitude
        maximumDistance: $distance
        maximumResults: 50
        filterByPlaceTypes: [stopPlace]
        multiModalMode: parent
    ) {
        edges { node { place { id ... on StopPlace { name } } } }
    }
}"#;

const DEPARTURES_QUERY: &str = r#"
query stopPlaceDepartures($ids: [String]!, $departures: Int!, $omitNonBoarding: Boolean!) {
    stopPlaces(ids: $ids) {
        id
        estimatedCalls(numberOfDepartures: $departures, omitNonBoarding: $omitNonBoarding) {
            expectedDepartureTime
            destinationDisplay { frontText }
            serviceJourney {
                transportSubmode
                journeyPattern { line { publicCode transportMode } }
            }
        }
    }
}"#;

const BIKE_STATIONS_QUERY: &str = r#"
query bikeRentalStations($minLat: Float!, $minLon: Float!, $maxLat: Float!, $maxLon: Float!) {
    bikeRentalStationsByBbox(
        minimumLatitude: $minLat
        minimumLongitude: $minLon
        maximumLatitude: $maxLat
        maximumLongitude: $maxLon
    ) { id name bikesAvailable spacesAvailable }
}"#;

const BIKE_STATION_QUERY: &str = r#"
query bikeRentalStation($id: String!) {
    bikeRentalStation(id: $id) { id name bikesAvailable spacesAvailable }
}"#;

#[derive(Clone)]
pub struct EnturClient {
    client: reqwest::Client,
    url: Url,
}

impl EnturClient {
    pub fn new(client_name: &str, api_url: &str) -> EnturResult<EnturClient> {
        let url = Url::parse(api_url).map_err(|e| EnturError::Init(e.to_string()))?;

        let mut headers = HeaderMap::new();
        headers.insert(
            "ET-Client-Name",
            HeaderValue::from_str(client_name).map_err(|e| EnturError::Init(e.to_string()))?,
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| EnturError::Init(e.to_string()))?;

        Ok(EnturClient { client, url })
    }

    async fn request<T>(&self, name: &str, query: &str, variables: Value) -> EnturResult<T>
    where
        T: serde::de::DeserializeOwned,
    {
        log::debug!("Requesting {} from {}", name, self.url);
        let response = self
            .client
            .post(self.url.clone())
            .json(&json!({ "query": query, "variables": variables }))
            .send()
            .await?;

        let status = response.status();
        let data_str = response.text().await?;
        log::trace!("Response: {}", data_str);

        if !status.is_success() {
            return Err(EnturError::Status(status.as_u16(), data_str));
        }

        let GraphQlResponse { data, errors } = serde_json::from_str(&data_str)?;
        if let Some(errors) = errors.filter(|errors| !errors.is_empty()) {
            let message = errors
                .into_iter()
                .map(|e| e.message)
                .collect::<Vec<_>>()
                .join("; ");
            return Err(EnturError::GraphQl(message));
        }

        data.ok_or(EnturError::MissingData)
    }
}

impl BoardService for EnturClient {
    async fn get_stop_places_by_position(
        &self,
        position: Position,
        distance: u32,
    ) -> EnturResult<Vec<StopPlaceDetails>> {
        let variables = json!({
            "latitude": position.latitude,
            "longitude": position.longitude,
            "distance": distance,
        });
        let NearestData { nearest } = self
            .request("nearestStopPlaces", NEAREST_STOP_PLACES_QUERY, variables)
            .await?;

        let stops = nearest
            .map(|connection| connection.edges)
            .unwrap_or_default()
            .into_iter()
            .filter_map(|edge| edge.node?.place?.into_details())
            .collect();
        Ok(stops)
    }

    async fn get_stop_place(&self, id: &str) -> EnturResult<StopPlaceDetails> {
        let StopPlaceData { stop_place } = self
            .request("stopPlace", STOP_PLACE_QUERY, json!({ "id": id }))
            .await?;

        stop_place
            .and_then(|place| place.into_details())
            .ok_or_else(|| EnturError::NotFound(id.to_string()))
    }

    async fn get_stop_place_departures(
        &self,
        ids: &[String],
        query: DepartureQuery,
    ) -> EnturResult<Vec<RawStopPlaceDepartures>> {
        let variables = json!({
            "ids": ids,
            "departures": query.departures,
            "omitNonBoarding": !query.include_non_boarding,
        });
        let StopPlacesData { stop_places } = self
            .request("stopPlaceDepartures", DEPARTURES_QUERY, variables)
            .await?;

        Ok(stop_places.into_iter().flatten().collect())
    }

    async fn get_bike_rental_stations(
        &self,
        position: Position,
        distance: u32,
    ) -> EnturResult<Vec<BikeStation>> {
        let area = search_area(position, distance as f64);
        let (min, max) = (area.min(), area.max());
        let variables = json!({
            "minLat": min.y,
            "minLon": min.x,
            "maxLat": max.y,
            "maxLon": max.x,
        });
        let BikeStationsData {
            bike_rental_stations_by_bbox,
        } = self
            .request("bikeRentalStations", BIKE_STATIONS_QUERY, variables)
            .await?;

        Ok(bike_rental_stations_by_bbox
            .into_iter()
            .flatten()
            .map(BikeStation::from)
            .collect())
    }

    async fn get_bike_rental_station(&self, id: &str) -> EnturResult<BikeStation> {
        let BikeStationData {
            bike_rental_station,
        } = self
            .request("bikeRentalStation", BIKE_STATION_QUERY, json!({ "id": id }))
            .await?;

        bike_rental_station
            .map(BikeStation::from)
            .ok_or_else(|| EnturError::NotFound(id.to_string()))
    }
}
