use serde::{Deserialize, Serialize};
use std::fmt;

/// A geographic position in the crate's canonical (longitude, latitude) order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coord {
    pub lon: f64,
    pub lat: f64,
}

impl Coord {
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    /// Builds a coordinate from the (lat, lon) order used by waypoints and the routing API.
    pub fn from_lat_lon(lat: f64, lon: f64) -> Self {
        Self { lon, lat }
    }

    /// GeoJSON position, always `[lon, lat]`.
    pub fn position(&self) -> Vec<f64> {
        vec![self.lon, self.lat]
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.6}, {:.6})", self.lon, self.lat)
    }
}

/// Rounds to 6 decimal places (micro-degrees).
pub fn round6(value: f64) -> f64 {
    (value * 1e6).round() / 1e6
}

/// Wire representation of a point as the routing service expects it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub lat: f64,
    pub lon: f64,
}

impl From<Coord> for Location {
    fn from(coord: Coord) -> Self {
        Location {
            lat: round6(coord.lat),
            lon: round6(coord.lon),
        }
    }
}

impl From<Location> for Coord {
    fn from(loc: Location) -> Self {
        Coord::from_lat_lon(loc.lat, loc.lon)
    }
}

/// Parses a `lat,lon` pair such as `47.6287,-122.3462`.
pub fn parse_lat_lon(s: &str) -> Result<Coord, String> {
    let (lat, lon) = s
        .split_once(',')
        .ok_or_else(|| format!("expected `lat,lon`, got \"{}\"", s))?;
    let lat: f64 = lat
        .trim()
        .parse()
        .map_err(|e| format!("invalid latitude \"{}\": {}", lat.trim(), e))?;
    let lon: f64 = lon
        .trim()
        .parse()
        .map_err(|e| format!("invalid longitude \"{}\": {}", lon.trim(), e))?;
    if !(-90.0..=90.0).contains(&lat) {
        return Err(format!("latitude {} out of range [-90, 90]", lat));
    }
    if !(-180.0..=180.0).contains(&lon) {
        return Err(format!("longitude {} out of range [-180, 180]", lon));
    }
    Ok(Coord::from_lat_lon(lat, lon))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_swaps_and_rounds() {
        let loc = Location::from(Coord::new(-122.34621234, 47.62871299));
        assert_eq!(loc.lat, 47.628713);
        assert_eq!(loc.lon, -122.346212);
    }

    #[test]
    fn test_location_serializes_lat_first() {
        let json = serde_json::to_string(&Location::from(Coord::new(2.0, 1.0))).unwrap();
        assert_eq!(json, r#"{"lat":1.0,"lon":2.0}"#);
    }

    #[test]
    fn test_parse_lat_lon() {
        let coord = parse_lat_lon("47.6287, -122.3462").unwrap();
        assert_eq!(coord, Coord::new(-122.3462, 47.6287));
    }

    #[test]
    fn test_parse_lat_lon_rejects_bad_input() {
        assert!(parse_lat_lon("47.6287").is_err());
        assert!(parse_lat_lon("abc,1.0").is_err());
        assert!(parse_lat_lon("95.0,1.0").is_err());
        assert!(parse_lat_lon("10.0,-181.0").is_err());
    }
}
