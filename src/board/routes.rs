use std::collections::HashMap;

use serde::Serialize;

use crate::entities::{LineData, TransportMode};

#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct RouteGroup {
    pub route: String,
    pub departures: Vec<LineData>,
}

#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct UniqueRoute {
    pub route: String,
    #[serde(rename = "type")]
    pub mode: TransportMode,
}

/// Groups departures by route, keeping groups in first-seen order
/// and departures in their original order within each group.
pub fn group_by_route(departures: &[LineData]) -> Vec<RouteGroup> {
    let mut positions = HashMap::<&str, usize>::new();
    let mut groups: Vec<RouteGroup> = vec![];

    for departure in departures {
        let index = *positions.entry(departure.route.as_str()).or_insert_with(|| {
            groups.push(RouteGroup {
                route: departure.route.clone(),
                departures: vec![],
            });
            groups.len() - 1
        });
        groups[index].departures.push(departure.clone());
    }

    groups
}

/// One entry per route in first-seen order. When a route repeats,
/// the mode of its last departure wins.
pub fn unique_by_route(departures: &[LineData]) -> Vec<UniqueRoute> {
    let mut positions = HashMap::<&str, usize>::new();
    let mut routes: Vec<UniqueRoute> = vec![];

    for departure in departures {
        match positions.get(departure.route.as_str()) {
            Some(&index) => routes[index].mode = departure.mode,
            None => {
                positions.insert(departure.route.as_str(), routes.len());
                routes.push(UniqueRoute {
                    route: departure.route.clone(),
                    mode: departure.mode,
                });
            }
        }
    }

    routes
}
