pub mod coord;
pub mod error;
pub mod polyline;
pub mod provider;
pub mod route;
pub mod service;
pub mod shape;
pub mod trace;

pub use coord::{parse_lat_lon, Coord};
pub use error::{DecodeError, PipelineError, ShapeError, TransportError};
pub use polyline::{decode, decode_with_precision, encode, Precision};
pub use provider::ValhallaProvider;
pub use route::get_annotated_route;
pub use service::RoutingProvider;
pub use shape::extract_shape;
pub use trace::{annotate, partition, AnnotatedRoute, BatchFailure, SpeedSample, SpeedSource, TraceConfig};
