use serde::Deserialize;
use thiserror::Error;

// Shape of the JSON error body Valhalla returns on non-2xx responses
#[derive(Deserialize, Debug)]
pub struct ValhallaErrorPayload {
    pub error_code: u32,
    pub error: String,
    #[serde(default)]
    pub status_code: Option<u16>,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("polyline ends mid-coordinate at byte {offset}")]
    Truncated { offset: usize },

    #[error("invalid polyline byte 0x{byte:02x} at offset {offset}")]
    InvalidByte { offset: usize, byte: u8 },

    #[error("polyline value starting before byte {offset} overflows 64 bits")]
    Overflow { offset: usize },
}

#[derive(Error, Debug)]
pub enum ShapeError {
    #[error("failed to decode shape of leg {leg}: {source}")]
    Decode {
        leg: usize,
        #[source]
        source: DecodeError,
    },
}

#[derive(Error, Debug)]
pub enum TransportError {
    // Structured error returned by the routing service
    #[error("API Error (HTTP {status}, code {code}): {message}")]
    Api {
        status: u16,
        code: u32,
        message: String,
    },

    // Non-success response whose body is not the expected error JSON
    #[error("Unstructured API Error (HTTP {status}): {body}")]
    RawApi { status: u16, body: String },

    #[error("Underlying request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Failed to parse JSON response: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("at least two waypoints are required, got {0}")]
    TooFewWaypoints(usize),

    #[error("route request failed: {0}")]
    Route(#[source] TransportError),

    #[error(transparent)]
    Shape(#[from] ShapeError),

    #[error("route response contained no shape geometry")]
    EmptyShape,
}
