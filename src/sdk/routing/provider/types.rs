use crate::sdk::routing::coord::{Coord, Location};
use serde::{Deserialize, Deserializer, Serialize};

// --- Request options shared by /route and /trace_attributes ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Units {
    #[default]
    Miles,
    Kilometers,
}

impl Units {
    /// Unit label for speeds reported in this unit system.
    pub fn speed_label(&self) -> &'static str {
        match self {
            Units::Miles => "mph",
            Units::Kilometers => "km/h",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum ShapeMatch {
    #[default]
    MapSnap,
    EdgeWalk,
    WalkOrSnap,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RequestOptions {
    pub costing: String,
    pub units: Units,
    pub shape_match: ShapeMatch,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            costing: "auto".to_string(),
            units: Units::default(),
            shape_match: ShapeMatch::default(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DirectionsOptions {
    pub units: Units,
}

// --- /route ---

#[derive(Debug, Serialize)]
pub struct RouteRequest {
    pub locations: Vec<Location>,
    pub costing: String,
    pub directions_options: DirectionsOptions,
}

impl RouteRequest {
    pub fn new(waypoints: &[Coord], options: &RequestOptions) -> Self {
        Self {
            locations: waypoints.iter().copied().map(Location::from).collect(),
            costing: options.costing.clone(),
            directions_options: DirectionsOptions {
                units: options.units,
            },
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct RouteResponse {
    #[serde(default)]
    pub trip: Option<Trip>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Trip {
    #[serde(default)]
    pub legs: Vec<Leg>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Leg {
    #[serde(default)]
    pub shape: Option<String>,
}

// --- /trace_attributes ---

#[derive(Debug, Serialize)]
pub struct TraceAttributesRequest {
    pub shape: Vec<Location>,
    pub costing: String,
    pub shape_match: ShapeMatch,
    pub directions_options: DirectionsOptions,
}

impl TraceAttributesRequest {
    pub fn new(shape: &[Coord], options: &RequestOptions) -> Self {
        Self {
            shape: shape.iter().copied().map(Location::from).collect(),
            costing: options.costing.clone(),
            shape_match: options.shape_match,
            directions_options: DirectionsOptions {
                units: options.units,
            },
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct TraceAttributesResponse {
    #[serde(default)]
    pub edges: Vec<Edge>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Edge {
    #[serde(default)]
    pub begin_shape_index: usize,
    #[serde(default)]
    pub end_shape_index: usize,
    /// Posted speed limit. Valhalla writes `"unlimited"` for unrestricted roads.
    #[serde(default, deserialize_with = "lenient_speed")]
    pub speed_limit: Option<f64>,
    /// Observed or estimated travel speed.
    #[serde(default, deserialize_with = "lenient_speed")]
    pub speed: Option<f64>,
}

fn lenient_speed<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| v.as_f64()))
}
