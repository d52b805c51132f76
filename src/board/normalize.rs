use chrono::{DateTime, Utc};
use chrono_tz::Tz;

use super::format::format_departure;
use crate::entities::{LineData, StopDepartures, TransportMode};
use crate::entur::entities::{RawDeparture, RawStopPlaceDepartures};

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum MalformedDepartureError {
    #[error("Departure is missing {0}")]
    Missing(&'static str),

    #[error("Unsupported transport mode: {0}")]
    UnsupportedMode(String),
}

pub fn normalize(
    departure: &RawDeparture,
    now: DateTime<Utc>,
    tz: &Tz,
) -> Result<LineData, MalformedDepartureError> {
    use MalformedDepartureError::Missing;

    let expected = departure
        .expected_departure_time
        .ok_or(Missing("expectedDepartureTime"))?;
    let front_text = departure
        .destination_display
        .as_ref()
        .ok_or(Missing("destinationDisplay"))?
        .front_text
        .as_deref()
        .ok_or(Missing("destinationDisplay.frontText"))?;
    let service_journey = departure
        .service_journey
        .as_ref()
        .ok_or(Missing("serviceJourney"))?;
    let line = service_journey
        .journey_pattern
        .as_ref()
        .ok_or(Missing("serviceJourney.journeyPattern"))?
        .line
        .as_ref()
        .ok_or(Missing("serviceJourney.journeyPattern.line"))?;
    let raw_mode = line
        .transport_mode
        .as_deref()
        .ok_or(Missing("line.transportMode"))?;
    let mode = TransportMode::from_raw(raw_mode)
        .ok_or_else(|| MalformedDepartureError::UnsupportedMode(raw_mode.to_string()))?;

    // num_minutes truncates toward zero
    let minutes = (expected.with_timezone(&Utc) - now).num_minutes();
    let time = format_departure(minutes, &expected.with_timezone(tz));

    let public_code = line.public_code.as_deref().unwrap_or_default();
    let route = format!("{} {}", public_code, front_text).trim().to_string();

    Ok(LineData {
        mode,
        sub_type: service_journey.transport_submode.clone(),
        time,
        route,
    })
}

/// Normalizes the departures of one stop place, dropping records that cannot be shown.
/// Returns `None` when the service sent no departure list for the stop.
pub fn normalize_stop(
    stop: &RawStopPlaceDepartures,
    now: DateTime<Utc>,
    tz: &Tz,
) -> Option<StopDepartures> {
    let calls = stop.estimated_calls.as_ref()?;

    let departures = calls
        .iter()
        .filter_map(|call| match normalize(call, now, tz) {
            Ok(line) => Some(line),
            Err(e) => {
                log::warn!("Dropping departure from {}: {}", stop.id, e);
                None
            }
        })
        .collect();

    Some(StopDepartures {
        id: stop.id.clone(),
        departures,
    })
}
