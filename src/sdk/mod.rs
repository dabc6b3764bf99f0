pub mod config;
pub mod output;
pub mod routing;
pub mod util;
