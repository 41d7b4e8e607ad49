// ── Snapshot storage and refresh ──

pub mod refresh;
pub mod snapshot;

pub use refresh::{EndpointFetcher, refresh};
pub use snapshot::{EndpointState, Snapshot};
