use super::{commit, OutputError};
use crate::sdk::routing::provider::types::Units;
use crate::sdk::routing::trace::SpeedSample;
use geojson::{Feature, FeatureCollection, Geometry, JsonObject, JsonValue, Value};
use serde_json::json;
use std::path::Path;

/// Indices of samples whose speed differs from the previous sample's.
///
/// Comparison starts from "no previous speed", so a first sample with a speed is marked
/// and a first sample without one is not.
pub fn speed_change_indices(samples: &[SpeedSample]) -> Vec<usize> {
    let mut previous = None;
    let mut indices = Vec::new();
    for (i, sample) in samples.iter().enumerate() {
        if sample.speed != previous {
            indices.push(i);
        }
        previous = sample.speed;
    }
    indices
}

fn properties(value: JsonValue) -> Option<JsonObject> {
    match value {
        JsonValue::Object(map) => Some(map),
        _ => None,
    }
}

fn feature(geometry: Geometry, props: JsonValue) -> Feature {
    Feature {
        bbox: None,
        geometry: Some(geometry),
        id: None,
        properties: properties(props),
        foreign_members: None,
    }
}

/// The route as a single `LineString`.
pub fn route_feature(samples: &[SpeedSample]) -> Feature {
    let line = samples.iter().map(|s| s.coord.position()).collect();
    feature(
        Geometry::new(Value::LineString(line)),
        json!({
            "name": "Generated Route",
            "stroke": "blue",
            "stroke-opacity": 0.6,
            "stroke-width": 3
        }),
    )
}

pub fn marker_feature(sample: &SpeedSample, units: Units) -> Feature {
    let label = match sample.speed {
        Some(speed) => format!("Speed: {} {}", speed, units.speed_label()),
        None => "Speed: unknown".to_string(),
    };
    feature(
        Geometry::new(Value::Point(sample.coord.position())),
        json!({
            "name": label,
            "speed": sample.speed,
            "speed_source": sample.source,
            "marker-symbol": "circle",
            "marker-color": "#FF0000"
        }),
    )
}

/// Route line, followed by a marker at every speed change when `markers` is set.
pub fn build_collection(samples: &[SpeedSample], markers: Option<Units>) -> FeatureCollection {
    let mut features = vec![route_feature(samples)];
    if let Some(units) = markers {
        features.extend(
            speed_change_indices(samples)
                .into_iter()
                .map(|i| marker_feature(&samples[i], units)),
        );
    }
    FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    }
}

fn write_collection(collection: &FeatureCollection, path: &Path) -> Result<(), OutputError> {
    let contents = serde_json::to_vec_pretty(collection).map_err(|source| OutputError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    commit(path, &contents)
}

pub fn write_geojson<P: AsRef<Path>>(samples: &[SpeedSample], path: P) -> Result<(), OutputError> {
    write_collection(&build_collection(samples, None), path.as_ref())
}

pub fn write_geojson_with_speed<P: AsRef<Path>>(
    samples: &[SpeedSample],
    units: Units,
    path: P,
) -> Result<(), OutputError> {
    write_collection(&build_collection(samples, Some(units)), path.as_ref())
}
