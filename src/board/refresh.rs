use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use futures_util::future::{join, join_all};
use serde::Serialize;
use tokio::sync::watch;
use tokio::task::{JoinError, JoinHandle, JoinSet};
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use super::merge::merge;
use super::normalize::normalize_stop;
use super::visibility::{no_stops, visible_count};
use crate::config::BoardConfig;
use crate::entities::{BikeStation, StopPlace, StopPlaceDetails};
use crate::entur::{BoardService, BOARD_DEPARTURES};

pub const REFRESH_INTERVAL: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Phase {
    Idle,
    InitialLoading,
    Ready,
    Refreshing,
}

/// What the board shows at one moment. Never changed once published.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardSnapshot {
    pub phase: Phase,
    pub stops_data: Vec<StopPlace>,
    pub station_data: Vec<BikeStation>,
    pub visible_stop_count: usize,
    pub visible_station_count: usize,
    pub no_stops: bool,
    #[serde(skip)]
    started: bool,
    #[serde(skip)]
    initial_loading: bool,
    #[serde(skip)]
    cycles_in_flight: usize,
}

impl BoardSnapshot {
    fn empty() -> Self {
        BoardSnapshot {
            phase: Phase::Idle,
            stops_data: vec![],
            station_data: vec![],
            visible_stop_count: 0,
            visible_station_count: 0,
            no_stops: false,
            started: false,
            initial_loading: false,
            cycles_in_flight: 0,
        }
    }

    /// Recomputes everything derived from the entity lists and the loading state
    fn settle(&mut self, config: &BoardConfig) {
        let settings = &config.settings;
        self.visible_stop_count = visible_count(&self.stops_data, &settings.hidden_stop_ids);
        self.visible_station_count =
            visible_count(&self.station_data, &settings.hidden_station_ids);

        self.phase = if !self.started {
            Phase::Idle
        } else if self.initial_loading {
            Phase::InitialLoading
        } else if self.cycles_in_flight > 0 {
            Phase::Refreshing
        } else {
            Phase::Ready
        };

        self.no_stops = self.started
            && no_stops(
                self.visible_stop_count,
                self.visible_station_count,
                self.initial_loading,
            );
    }
}

struct Board<S> {
    service: S,
    config: BoardConfig,
    state: watch::Sender<Arc<BoardSnapshot>>,
}

/// Keeps the board's stops and stations up to date.
///
/// Every fetch result goes through [`merge`] into a fresh snapshot, so readers only ever
/// see complete snapshots. Fetch failures are logged and leave the previous data in place.
pub struct RefreshOrchestrator<S> {
    board: Arc<Board<S>>,
}

impl<S> Clone for RefreshOrchestrator<S> {
    fn clone(&self) -> Self {
        RefreshOrchestrator {
            board: self.board.clone(),
        }
    }
}

impl<S: BoardService> RefreshOrchestrator<S> {
    pub fn new(service: S, config: BoardConfig) -> Self {
        let (state, _) = watch::channel(Arc::new(BoardSnapshot::empty()));
        RefreshOrchestrator {
            board: Arc::new(Board {
                service,
                config,
                state,
            }),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<BoardSnapshot>> {
        self.board.state.subscribe()
    }

    pub fn snapshot(&self) -> Arc<BoardSnapshot> {
        self.board.state.borrow().clone()
    }

    /// Starts the initial load and the periodic refresh in the background
    pub fn start(self) -> Scheduler {
        let receiver = self.subscribe();
        let handle = tokio::spawn(self.run());
        Scheduler { handle, receiver }
    }

    async fn run(self) {
        log::info!("Board refresh is running");

        // Cycle tasks belong to this set, so they go away with the loop
        let mut tasks = JoinSet::new();
        let initial = self.clone();
        tasks.spawn(async move { initial.initial_load().await });

        let mut ticker = interval_at(Instant::now() + REFRESH_INTERVAL, REFRESH_INTERVAL);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let cycle = self.clone();
                    tasks.spawn(async move { cycle.refresh().await });
                }
                Some(result) = tasks.join_next(), if !tasks.is_empty() => {
                    if let Err(e) = result {
                        log::error!("Refresh task failed: {}", e);
                    }
                }
            }
        }
    }

    /// Builds the roster, then runs the first refresh cycle
    pub async fn initial_load(&self) {
        self.update(|snapshot| {
            snapshot.started = true;
            snapshot.initial_loading = true;
        });

        let (nearby, tracked) = join(self.fetch_nearby_stops(), self.fetch_tracked_stops()).await;
        let roster: Vec<StopPlaceDetails> = nearby.into_iter().chain(tracked).collect();
        self.update(|snapshot| snapshot.stops_data = merge(&snapshot.stops_data, &roster));

        self.run_cycle().await;

        self.update(|snapshot| snapshot.initial_loading = false);
        log::info!(
            "Initial load done: {} stops, {} stations",
            self.snapshot().stops_data.len(),
            self.snapshot().station_data.len()
        );
    }

    /// One refresh cycle. Overlapping cycles are fine since every merge is keyed by id.
    pub async fn refresh(&self) {
        self.update(|snapshot| {
            snapshot.started = true;
            snapshot.cycles_in_flight += 1;
        });

        self.run_cycle().await;

        self.update(|snapshot| {
            snapshot.cycles_in_flight = snapshot.cycles_in_flight.saturating_sub(1)
        });
    }

    async fn run_cycle(&self) {
        log::debug!("Refreshing departures and stations");
        join(self.refresh_departures(), self.refresh_stations()).await;
    }

    async fn fetch_nearby_stops(&self) -> Vec<StopPlaceDetails> {
        let config = &self.board.config;
        match self
            .board
            .service
            .get_stop_places_by_position(config.position, config.settings.distance_meters)
            .await
        {
            Ok(stops) => stops,
            Err(e) => {
                log::error!("Error getting nearby stop places: {}", e);
                vec![]
            }
        }
    }

    async fn fetch_tracked_stops(&self) -> Vec<StopPlaceDetails> {
        let fetches = self
            .board
            .config
            .tracked
            .stop_ids
            .iter()
            .map(|id| async move {
                match self.board.service.get_stop_place(id).await {
                    Ok(stop) => Some(stop),
                    Err(e) => {
                        log::error!("Error getting stop place {}: {}", id, e);
                        None
                    }
                }
            });

        join_all(fetches).await.into_iter().flatten().collect()
    }

    async fn refresh_departures(&self) {
        let ids: Vec<String> = self
            .snapshot()
            .stops_data
            .iter()
            .map(|stop| stop.id.clone())
            .collect();
        if ids.is_empty() {
            log::debug!("No stops to fetch departures for");
            return;
        }

        let results = match self
            .board
            .service
            .get_stop_place_departures(&ids, BOARD_DEPARTURES)
            .await
        {
            Ok(results) => results,
            Err(e) => {
                log::error!("Error getting departures: {}", e);
                return;
            }
        };

        let now = Utc::now();
        let tz = self.board.config.timezone;
        let departures: Vec<_> = results
            .iter()
            .filter_map(|stop| normalize_stop(stop, now, &tz))
            .collect();

        self.update(|snapshot| snapshot.stops_data = merge(&snapshot.stops_data, &departures));
    }

    async fn refresh_stations(&self) {
        let config = &self.board.config;
        match self
            .board
            .service
            .get_bike_rental_stations(config.position, config.settings.distance_meters)
            .await
        {
            Ok(stations) => {
                self.update(|snapshot| {
                    snapshot.station_data = merge(&snapshot.station_data, &stations)
                });
            }
            Err(e) => log::error!("Error getting bike rental stations: {}", e),
        }

        // each detail merges on its own as soon as it arrives
        join_all(config.tracked.station_ids.iter().map(|id| self.refresh_station(id))).await;
    }

    async fn refresh_station(&self, id: &str) {
        match self.board.service.get_bike_rental_station(id).await {
            Ok(station) => self.update(|snapshot| {
                snapshot.station_data =
                    merge(&snapshot.station_data, std::slice::from_ref(&station))
            }),
            Err(e) => log::warn!("Error getting bike rental station {}: {}", id, e),
        }
    }

    /// Publishes the next snapshot, built from the current one
    fn update(&self, f: impl FnOnce(&mut BoardSnapshot)) {
        let config = &self.board.config;
        self.board.state.send_modify(|current| {
            let mut next = (**current).clone();
            f(&mut next);
            next.settle(config);
            *current = Arc::new(next);
        });
    }
}

/// Owns the background refresh. Stopping or dropping it cancels the loop and every
/// cycle still in flight.
pub struct Scheduler {
    handle: JoinHandle<()>,
    receiver: watch::Receiver<Arc<BoardSnapshot>>,
}

impl Scheduler {
    pub fn subscribe(&self) -> watch::Receiver<Arc<BoardSnapshot>> {
        self.receiver.clone()
    }

    /// Resolves when the refresh loop ends, which only happens if it panics or is aborted
    pub async fn finished(&mut self) -> Result<(), JoinError> {
        (&mut self.handle).await
    }

    pub async fn stop(mut self) {
        self.handle.abort();
        match self.finished().await {
            Err(e) if e.is_panic() => log::error!("Board refresh panicked: {}", e),
            _ => log::info!("Board refresh stopped"),
        }
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
