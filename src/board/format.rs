use chrono::DateTime;
use chrono_tz::Tz;

/// Departures at least this far away show the clock time instead of a countdown
pub const COUNTDOWN_MINUTES: i64 = 15;

pub fn format_departure(minutes_until_departure: i64, departure_time: &DateTime<Tz>) -> String {
    if minutes_until_departure >= COUNTDOWN_MINUTES {
        return departure_time.format("%H:%M").to_string();
    }

    if minutes_until_departure < 1 {
        "nå".to_string()
    } else {
        format!("{} min", minutes_until_departure)
    }
}
