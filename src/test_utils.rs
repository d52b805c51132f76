use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{Duration, Utc};
use tokio::sync::watch;

use crate::config::Position;
use crate::entities::{BikeStation, StopPlaceDetails};
use crate::entur::entities::{
    RawDeparture, RawDestinationDisplay, RawJourneyPattern, RawLine, RawServiceJourney,
    RawStopPlaceDepartures,
};
use crate::entur::error::{EnturError, EnturResult};
use crate::entur::{BoardService, DepartureQuery};

pub fn init() {
    dotenvy::from_filename(".dev.vars").ok();
    env_logger::builder().is_test(true).try_init().ok();
}

/// Departures for a stop as `(minutes from now, mode, public code, destination)`
pub fn raw_stop(
    id: &str,
    departures: &[(i64, &str, Option<&str>, &str)],
) -> RawStopPlaceDepartures {
    let calls = departures
        .iter()
        .map(|&(minutes, mode, public_code, front_text)| RawDeparture {
            // half a minute of slack so the minute count is stable by the time it is normalized
            expected_departure_time: Some(
                (Utc::now() + Duration::minutes(minutes) + Duration::seconds(30)).fixed_offset(),
            ),
            destination_display: Some(RawDestinationDisplay {
                front_text: Some(front_text.to_string()),
            }),
            service_journey: Some(RawServiceJourney {
                journey_pattern: Some(RawJourneyPattern {
                    line: Some(RawLine {
                        public_code: public_code.map(str::to_string),
                        transport_mode: Some(mode.to_string()),
                    }),
                }),
                transport_submode: None,
            }),
        })
        .collect();

    RawStopPlaceDepartures {
        id: id.to_string(),
        estimated_calls: Some(calls),
    }
}

#[derive(Default)]
struct FakeState {
    nearby_stops: Mutex<Vec<StopPlaceDetails>>,
    stops: Mutex<HashMap<String, StopPlaceDetails>>,
    departures: Mutex<Vec<RawStopPlaceDepartures>>,
    nearby_stations: Mutex<Vec<BikeStation>>,
    stations: Mutex<HashMap<String, BikeStation>>,
    fail_departures: AtomicBool,
    fail_stations: AtomicBool,
    stall_roster: AtomicBool,
    departures_stall: Mutex<Option<watch::Receiver<bool>>>,
    station_stalls: Mutex<HashMap<String, watch::Receiver<bool>>>,
    departure_calls: AtomicUsize,
}

/// In-memory [`BoardService`]
#[derive(Clone, Default)]
pub struct FakeService {
    state: Arc<FakeState>,
}

impl FakeService {
    pub fn add_nearby_stop(&self, id: &str, name: &str) {
        self.state.nearby_stops.lock().unwrap().push(StopPlaceDetails {
            id: id.to_string(),
            name: name.to_string(),
        });
    }

    pub fn add_stop(&self, id: &str, name: &str) {
        self.state.stops.lock().unwrap().insert(
            id.to_string(),
            StopPlaceDetails {
                id: id.to_string(),
                name: name.to_string(),
            },
        );
    }

    pub fn set_departures(&self, departures: Vec<RawStopPlaceDepartures>) {
        *self.state.departures.lock().unwrap() = departures;
    }

    pub fn add_nearby_station(&self, id: &str, name: &str, bikes: u32) {
        self.state
            .nearby_stations
            .lock()
            .unwrap()
            .push(station(id, name, bikes));
    }

    pub fn add_station(&self, id: &str, name: &str, bikes: u32) {
        self.state
            .stations
            .lock()
            .unwrap()
            .insert(id.to_string(), station(id, name, bikes));
    }

    pub fn fail_departures(&self, fail: bool) {
        self.state.fail_departures.store(fail, Ordering::SeqCst);
    }

    pub fn fail_stations(&self, fail: bool) {
        self.state.fail_stations.store(fail, Ordering::SeqCst);
    }

    /// Makes the nearby stop place search never resolve
    pub fn stall_roster(&self, stall: bool) {
        self.state.stall_roster.store(stall, Ordering::SeqCst);
    }

    /// Holds departure fetches until `false` is sent or the sender is dropped
    pub fn stall_departures(&self) -> watch::Sender<bool> {
        let (release, stalled) = watch::channel(true);
        *self.state.departures_stall.lock().unwrap() = Some(stalled);
        release
    }

    /// Holds detail fetches for one bike station, like [`FakeService::stall_departures`]
    pub fn stall_station(&self, id: &str) -> watch::Sender<bool> {
        let (release, stalled) = watch::channel(true);
        self.state
            .station_stalls
            .lock()
            .unwrap()
            .insert(id.to_string(), stalled);
        release
    }

    pub fn departure_calls(&self) -> usize {
        self.state.departure_calls.load(Ordering::SeqCst)
    }
}

fn station(id: &str, name: &str, bikes: u32) -> BikeStation {
    BikeStation {
        id: id.to_string(),
        name: name.to_string(),
        bikes_available: bikes,
        docks_available: 12 - bikes.min(12),
    }
}

async fn hold(stalled: Option<watch::Receiver<bool>>) {
    if let Some(mut stalled) = stalled {
        stalled.wait_for(|stalled| !*stalled).await.ok();
    }
}

fn network_error() -> EnturError {
    EnturError::Status(503, "Service Unavailable".to_string())
}

impl BoardService for FakeService {
    async fn get_stop_places_by_position(
        &self,
        _position: Position,
        _distance: u32,
    ) -> EnturResult<Vec<StopPlaceDetails>> {
        if self.state.stall_roster.load(Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }
        Ok(self.state.nearby_stops.lock().unwrap().clone())
    }

    async fn get_stop_place(&self, id: &str) -> EnturResult<StopPlaceDetails> {
        self.state
            .stops
            .lock()
            .unwrap()
            .get(id)
            .cloned()
            .ok_or_else(|| EnturError::NotFound(id.to_string()))
    }

    async fn get_stop_place_departures(
        &self,
        ids: &[String],
        query: DepartureQuery,
    ) -> EnturResult<Vec<RawStopPlaceDepartures>> {
        assert_eq!(query.departures, 50);
        assert!(!query.include_non_boarding);

        self.state.departure_calls.fetch_add(1, Ordering::SeqCst);
        let stalled = self.state.departures_stall.lock().unwrap().clone();
        hold(stalled).await;
        if self.state.fail_departures.load(Ordering::SeqCst) {
            return Err(network_error());
        }

        Ok(self
            .state
            .departures
            .lock()
            .unwrap()
            .iter()
            .filter(|stop| ids.contains(&stop.id))
            .cloned()
            .collect())
    }

    async fn get_bike_rental_stations(
        &self,
        _position: Position,
        _distance: u32,
    ) -> EnturResult<Vec<BikeStation>> {
        if self.state.fail_stations.load(Ordering::SeqCst) {
            return Err(network_error());
        }
        Ok(self.state.nearby_stations.lock().unwrap().clone())
    }

    async fn get_bike_rental_station(&self, id: &str) -> EnturResult<BikeStation> {
        let stalled = self.state.station_stalls.lock().unwrap().get(id).cloned();
        hold(stalled).await;
        if self.state.fail_stations.load(Ordering::SeqCst) {
            return Err(network_error());
        }
        self.state
            .stations
            .lock()
            .unwrap()
            .get(id)
            .cloned()
            .ok_or_else(|| EnturError::NotFound(id.to_string()))
    }
}
