use std::collections::HashMap;

use crate::entities::{BikeStation, StopDepartures, StopPlace, StopPlaceDetails};

/// Something the board tracks by id
pub trait Entity: Clone {
    fn id(&self) -> &str;
}

/// A fetched payload that refreshes (part of) an entity
pub trait Update<E: Entity> {
    fn entity_id(&self) -> &str;

    /// The entity to start tracking when the id is new, if this payload can create one
    fn create(&self) -> Option<E>;

    /// The entity after this payload has been applied to the tracked version
    fn apply(&self, current: &E) -> E;
}

/// A full entity replaces the tracked one
impl<E: Entity> Update<E> for E {
    fn entity_id(&self) -> &str {
        self.id()
    }

    fn create(&self) -> Option<E> {
        Some(self.clone())
    }

    fn apply(&self, _current: &E) -> E {
        self.clone()
    }
}

impl Entity for StopPlace {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Entity for BikeStation {
    fn id(&self) -> &str {
        &self.id
    }
}

/// Roster data leaves the departures alone
impl Update<StopPlace> for StopPlaceDetails {
    fn entity_id(&self) -> &str {
        &self.id
    }

    fn create(&self) -> Option<StopPlace> {
        Some(StopPlace {
            id: self.id.clone(),
            name: self.name.clone(),
            departures: vec![],
        })
    }

    fn apply(&self, current: &StopPlace) -> StopPlace {
        StopPlace {
            id: current.id.clone(),
            name: self.name.clone(),
            departures: current.departures.clone(),
        }
    }
}

/// Departures replace the whole departure list and nothing else.
/// Departures for a stop that is not tracked are ignored.
impl Update<StopPlace> for StopDepartures {
    fn entity_id(&self) -> &str {
        &self.id
    }

    fn create(&self) -> Option<StopPlace> {
        None
    }

    fn apply(&self, current: &StopPlace) -> StopPlace {
        StopPlace {
            id: current.id.clone(),
            name: current.name.clone(),
            departures: self.departures.clone(),
        }
    }
}

/// Merges fetched payloads into an entity list.
///
/// Tracked entities keep their relative order, new ones are appended in the order they
/// arrived, and nothing is ever removed. A repeated id in `incoming` is applied twice,
/// so the later payload wins.
pub fn merge<E, U>(existing: &[E], incoming: &[U]) -> Vec<E>
where
    E: Entity,
    U: Update<E>,
{
    let mut merged: Vec<E> = Vec::with_capacity(existing.len() + incoming.len());
    let mut positions = HashMap::<String, usize>::new();

    for entity in existing {
        if !positions.contains_key(entity.id()) {
            positions.insert(entity.id().to_string(), merged.len());
            merged.push(entity.clone());
        }
    }

    for update in incoming {
        match positions.get(update.entity_id()) {
            Some(&index) => merged[index] = update.apply(&merged[index]),
            None => {
                if let Some(entity) = update.create() {
                    positions.insert(update.entity_id().to_string(), merged.len());
                    merged.push(entity);
                }
            }
        }
    }

    merged
}
