use super::coord::Coord;
use super::error::TransportError;
use super::polyline::Precision;
use super::provider::types::{RouteResponse, TraceAttributesResponse};

pub trait RoutingProvider: Send + Sync {
    /// Requests a route through the ordered waypoints.
    fn route(&self, waypoints: &[Coord]) -> Result<RouteResponse, TransportError>;

    /// Requests per-edge attributes for a bounded slice of a shape.
    fn trace_attributes(&self, shape: &[Coord]) -> Result<TraceAttributesResponse, TransportError>;

    /// Precision of the encoded shapes this provider returns.
    fn shape_precision(&self) -> Precision {
        Precision::VALHALLA
    }
}
