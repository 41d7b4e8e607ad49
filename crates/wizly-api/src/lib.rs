// wizly-api: Async Rust client for the Wizarr management API
//
// One `WizarrClient` per server. Every call is a single request with the
// `X-API-Key` header, and every response comes back as raw JSON for the
// core crate to normalize.

pub mod client;
pub mod endpoint;
pub mod error;
pub mod transport;

pub use client::{API_KEY_HEADER, WizarrClient};
pub use endpoint::Endpoint;
pub use error::{Error, ErrorKind};
pub use transport::{TlsMode, TransportConfig};
