use std::collections::HashSet;

use itertools::Itertools;

use super::collation::norwegian_cmp;
use super::merge::Entity;
use super::routes::RouteGroup;
use crate::entities::{BikeStation, StopPlace, TransportMode};

/// Stops that have departures and are not hidden, in Norwegian alphabetical order
pub fn visible_stops(stops: &[StopPlace], hidden_stop_ids: &HashSet<String>) -> Vec<StopPlace> {
    stops
        .iter()
        .filter(|stop| !stop.departures.is_empty())
        .filter(|stop| !hidden_stop_ids.contains(&stop.id))
        .sorted_by(|a, b| norwegian_cmp(&a.name, &b.name))
        .cloned()
        .collect()
}

/// Stations that are not hidden. A station with no bikes is still shown.
pub fn visible_stations(
    stations: &[BikeStation],
    hidden_station_ids: &HashSet<String>,
) -> Vec<BikeStation> {
    stations
        .iter()
        .filter(|station| !hidden_station_ids.contains(&station.id))
        .cloned()
        .collect()
}

pub fn is_route_group_visible(groups: &[RouteGroup], hidden_route_keys: &HashSet<String>) -> bool {
    groups
        .iter()
        .any(|group| !hidden_route_keys.contains(&group.route))
}

pub fn is_mode_visible(mode: TransportMode, hidden_modes: &HashSet<String>) -> bool {
    !hidden_modes.contains(mode.as_str())
}

/// Number of entities left once hidden ids are taken out.
/// Hidden ids that are not tracked do not count.
pub fn visible_count<E: Entity>(entities: &[E], hidden_ids: &HashSet<String>) -> usize {
    let present: HashSet<&str> = entities.iter().map(|e| e.id()).collect();
    let hidden = hidden_ids
        .iter()
        .filter(|id| present.contains(id.as_str()))
        .count();
    present.len() - hidden
}

/// Whether the board should show the "no stops" state
pub fn no_stops(
    visible_stop_count: usize,
    visible_station_count: usize,
    initial_loading: bool,
) -> bool {
    visible_stop_count + visible_station_count == 0 && !initial_loading
}
