pub mod remote;
pub mod types;

pub use remote::ValhallaProvider;
