pub mod sdk;

pub use sdk::config::ValhallaConfig;
pub use sdk::output::{write_geojson, write_geojson_with_speed, write_text};
pub use sdk::routing::route::get_annotated_route;
pub use sdk::routing::trace::{annotate, AnnotatedRoute, SpeedSample, TraceConfig};
pub use sdk::routing::polyline::decode;
