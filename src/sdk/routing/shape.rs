use super::coord::Coord;
use super::error::ShapeError;
use super::polyline::{decode_with_precision, Precision};
use super::provider::types::RouteResponse;

/// Decodes every leg's shape in leg order and concatenates them into one path.
///
/// Points shared by consecutive legs are kept twice. A leg without a shape contributes
/// nothing, but a leg whose shape fails to decode fails the whole extraction.
pub fn extract_shape(route: &RouteResponse, precision: Precision) -> Result<Vec<Coord>, ShapeError> {
    let Some(trip) = &route.trip else {
        return Ok(Vec::new());
    };

    let mut shape = Vec::new();
    for (leg_index, leg) in trip.legs.iter().enumerate() {
        let Some(encoded) = &leg.shape else {
            log::debug!("Leg {} carries no shape", leg_index);
            continue;
        };
        let points = decode_with_precision(encoded, precision).map_err(|source| ShapeError::Decode {
            leg: leg_index,
            source,
        })?;
        log::debug!("Leg {} decoded into {} points", leg_index, points.len());
        shape.extend(points);
    }

    Ok(shape)
}
