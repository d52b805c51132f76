pub mod client;
pub mod entities;
pub mod error;

use std::future::Future;

use crate::config::Position;
use crate::entities::{BikeStation, StopPlaceDetails};

use self::entities::RawStopPlaceDepartures;
use self::error::EnturResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DepartureQuery {
    pub include_non_boarding: bool,
    pub departures: u32,
}

/// What the board asks for on every departures fetch
pub const BOARD_DEPARTURES: DepartureQuery = DepartureQuery {
    include_non_boarding: false,
    departures: 50,
};

/// Transit and bike data needed by the board
pub trait BoardService: Send + Sync + 'static {
    fn get_stop_places_by_position(
        &self,
        position: Position,
        distance: u32,
    ) -> impl Future<Output = EnturResult<Vec<StopPlaceDetails>>> + Send;

    fn get_stop_place(
        &self,
        id: &str,
    ) -> impl Future<Output = EnturResult<StopPlaceDetails>> + Send;

    fn get_stop_place_departures(
        &self,
        ids: &[String],
        query: DepartureQuery,
    ) -> impl Future<Output = EnturResult<Vec<RawStopPlaceDepartures>>> + Send;

    fn get_bike_rental_stations(
        &self,
        position: Position,
        distance: u32,
    ) -> impl Future<Output = EnturResult<Vec<BikeStation>>> + Send;

    fn get_bike_rental_station(
        &self,
        id: &str,
    ) -> impl Future<Output = EnturResult<BikeStation>> + Send;
}
