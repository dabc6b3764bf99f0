use super::coord::Coord;
use super::error::PipelineError;
use super::service::RoutingProvider;
use super::shape::extract_shape;
use super::trace::{annotate, AnnotatedRoute, TraceConfig};

/// Routes through `waypoints` and annotates the resulting shape with per-point speeds.
///
/// Route and shape failures abort; per-batch annotation failures are collected in the
/// returned route instead.
pub fn get_annotated_route<P: RoutingProvider + ?Sized>(
    provider: &P,
    waypoints: &[Coord],
    config: &TraceConfig,
) -> Result<AnnotatedRoute, PipelineError> {
    if waypoints.len() < 2 {
        return Err(PipelineError::TooFewWaypoints(waypoints.len()));
    }

    let route = provider.route(waypoints).map_err(PipelineError::Route)?;
    let shape = extract_shape(&route, provider.shape_precision())?;
    if shape.is_empty() {
        return Err(PipelineError::EmptyShape);
    }
    log::info!("Route shape decoded into {} points", shape.len());

    Ok(annotate(&shape, config, |batch| provider.trace_attributes(batch)))
}
