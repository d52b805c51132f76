use serde::Serialize;

use super::refresh::BoardSnapshot;
use super::routes::{group_by_route, RouteGroup};
use super::visibility::{is_mode_visible, is_route_group_visible, visible_stations, visible_stops};
use crate::config::BoardSettings;
use crate::entities::{BikeStation, TransportMode};

#[derive(Debug, Serialize, PartialEq)]
pub struct DepartureTile {
    pub id: String,
    pub name: String,
    pub routes: Vec<RouteGroup>,
}

/// The board as it should be drawn
#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BoardView {
    pub no_stops: bool,
    pub departure_tiles: Vec<DepartureTile>,
    pub bike_stations: Vec<BikeStation>,
}

pub fn board_view(snapshot: &BoardSnapshot, settings: &BoardSettings) -> BoardView {
    let departure_tiles = if snapshot.visible_stop_count > 0 {
        visible_stops(&snapshot.stops_data, &settings.hidden_stop_ids)
            .into_iter()
            .filter_map(|stop| {
                let mut routes = group_by_route(&stop.departures);
                if !is_route_group_visible(&routes, &settings.hidden_route_keys) {
                    return None;
                }

                routes.retain(|group| !settings.hidden_route_keys.contains(&group.route));
                for group in routes.iter_mut() {
                    group
                        .departures
                        .retain(|d| is_mode_visible(d.mode, &settings.hidden_modes));
                }
                routes.retain(|group| !group.departures.is_empty());
                if routes.is_empty() {
                    return None;
                }

                Some(DepartureTile {
                    id: stop.id,
                    name: stop.name,
                    routes,
                })
            })
            .collect()
    } else {
        vec![]
    };

    let bike_stations = if snapshot.visible_station_count > 0
        && is_mode_visible(TransportMode::Bike, &settings.hidden_modes)
    {
        visible_stations(&snapshot.station_data, &settings.hidden_station_ids)
    } else {
        vec![]
    };

    BoardView {
        no_stops: snapshot.no_stops,
        departure_tiles,
        bike_stations,
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::board::refresh::RefreshOrchestrator;
    use crate::config::{BoardConfig, Position, TrackedIds};
    use crate::test_utils::{init, raw_stop, FakeService};

    async fn snapshot(settings: &BoardSettings) -> BoardSnapshot {
        snapshot_of(oslo(), settings).await
    }

    fn oslo() -> FakeService {
        let service = FakeService::default();
        service.add_nearby_stop("NSR:StopPlace:1", "Storo");
        service.add_nearby_stop("NSR:StopPlace:2", "Carl Berners plass");
        service.add_nearby_stop("NSR:StopPlace:3", "Økern");
        service.set_departures(vec![
            raw_stop(
                "NSR:StopPlace:1",
                &[
                    (2, "tram", Some("11"), "Majorstuen"),
                    (4, "bus", Some("31"), "Snarøya"),
                    (9, "tram", Some("11"), "Majorstuen"),
                ],
            ),
            raw_stop("NSR:StopPlace:2", &[(1, "metro", Some("5"), "Vestli")]),
            raw_stop("NSR:StopPlace:3", &[]),
        ]);
        service.add_nearby_station("YOS:1", "Storo T", 0);
        service
    }

    async fn snapshot_of(service: FakeService, settings: &BoardSettings) -> BoardSnapshot {
        let position = Position {
            latitude: 59.9139,
            longitude: 10.7522,
        };
        let config = BoardConfig::new(position, settings.clone(), TrackedIds::default());
        let board = RefreshOrchestrator::new(service, config);
        board.initial_load().await;
        (*board.snapshot()).clone()
    }

    #[tokio::test]
    async fn test_view_groups_and_sorts() {
        init();
        let settings = BoardSettings::default();

        let view = board_view(&snapshot(&settings).await, &settings);

        let names: Vec<_> = view.departure_tiles.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["Carl Berners plass", "Storo"]);

        let storo = &view.departure_tiles[1];
        let routes: Vec<_> = storo.routes.iter().map(|r| r.route.as_str()).collect();
        assert_eq!(routes, vec!["11 Majorstuen", "31 Snarøya"]);
        assert_eq!(storo.routes[0].departures.len(), 2);

        assert_eq!(view.bike_stations.len(), 1);
        assert!(!view.no_stops);
    }

    #[tokio::test]
    async fn test_view_hides_routes_and_modes() {
        init();
        let mut settings = BoardSettings::default();
        settings.hidden_route_keys.insert("5 Vestli".to_string());
        settings.hidden_modes.insert("tram".to_string());
        settings.hidden_modes.insert("bike".to_string());

        let view = board_view(&snapshot(&settings).await, &settings);

        assert_eq!(view.departure_tiles.len(), 1);
        let storo = &view.departure_tiles[0];
        assert_eq!(storo.name, "Storo");
        assert_eq!(storo.routes.len(), 1);
        assert_eq!(storo.routes[0].route, "31 Snarøya");
        assert!(view.bike_stations.is_empty());
    }

    #[tokio::test]
    async fn test_view_hides_modes_within_a_route() {
        init();
        let service = FakeService::default();
        service.add_nearby_stop("NSR:StopPlace:1", "Storo");
        // replacement buses run under the tram's route
        service.set_departures(vec![raw_stop(
            "NSR:StopPlace:1",
            &[
                (2, "bus", Some("11"), "Majorstuen"),
                (6, "tram", Some("11"), "Majorstuen"),
                (8, "bus", Some("11"), "Majorstuen"),
                (9, "bus", Some("31"), "Snarøya"),
            ],
        )]);
        let mut settings = BoardSettings::default();
        settings.hidden_modes.insert("bus".to_string());

        let view = board_view(&snapshot_of(service, &settings).await, &settings);

        assert_eq!(view.departure_tiles.len(), 1);
        let routes = &view.departure_tiles[0].routes;
        assert_eq!(routes.len(), 1);
        assert_eq!(routes[0].route, "11 Majorstuen");
        assert_eq!(routes[0].departures.len(), 1);
        assert_eq!(routes[0].departures[0].mode, TransportMode::Tram);
    }
}
