// phoenixbad-api: Async HTTP client and response parser for the live visitor endpoints

pub mod client;
pub mod error;
pub mod parse;
pub mod transport;

pub use client::OccupancyClient;
pub use error::Error;
pub use parse::{RawExtraction, ResponseShape, classify, parse};
pub use transport::{DEFAULT_TIMEOUT, DEFAULT_USER_AGENT, TransportConfig};
