use geo::{HaversineDestination, Point, Rect};

use crate::config::Position;

/// Smallest square that contains the circle of `radius_metres` around `center`
pub fn search_area(center: Position, radius_metres: f64) -> Rect {
    let center = Point::from(center);
    // pythagoras
    let corner_distance = (radius_metres.powi(2) * 2.0).sqrt();

    Rect::new(
        // north-west
        center.haversine_destination(315., corner_distance),
        // south-east
        center.haversine_destination(135., corner_distance),
    )
}
