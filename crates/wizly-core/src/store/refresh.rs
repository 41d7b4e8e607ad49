// ── Refresh aggregator ──
//
// One cycle: fire all six reads at once, wait for every one of them, and
// fold the outcomes into a `Snapshot`. A failed read only marks its own
// endpoint unavailable; the cycle itself never fails.

use std::future::Future;

use chrono::Utc;
use serde_json::Value;
use tracing::{debug, info, warn};
use wizly_api::{Endpoint, WizarrClient};

use super::snapshot::{EndpointState, Snapshot};
use crate::model::RawPayload;
use crate::normalize::normalize;

/// Anything that can answer a read endpoint with raw JSON.
///
/// Implemented by [`WizarrClient`]; tests substitute scripted fakes.
pub trait EndpointFetcher: Sync {
    fn fetch(
        &self,
        endpoint: Endpoint,
    ) -> impl Future<Output = Result<Value, wizly_api::Error>> + Send;
}

impl EndpointFetcher for WizarrClient {
    fn fetch(
        &self,
        endpoint: Endpoint,
    ) -> impl Future<Output = Result<Value, wizly_api::Error>> + Send {
        WizarrClient::fetch(self, endpoint)
    }
}

/// Run one refresh cycle against `fetcher`.
pub async fn refresh<F: EndpointFetcher>(fetcher: &F) -> Snapshot {
    let (status, users, invitations, libraries, servers, api_keys) = tokio::join!(
        fetcher.fetch(Endpoint::Status),
        fetcher.fetch(Endpoint::Users),
        fetcher.fetch(Endpoint::Invitations),
        fetcher.fetch(Endpoint::Libraries),
        fetcher.fetch(Endpoint::Servers),
        fetcher.fetch(Endpoint::ApiKeys),
    );

    let snapshot = Snapshot::new(
        Utc::now(),
        [
            settle(Endpoint::Status, status),
            settle(Endpoint::Users, users),
            settle(Endpoint::Invitations, invitations),
            settle(Endpoint::Libraries, libraries),
            settle(Endpoint::Servers, servers),
            settle(Endpoint::ApiKeys, api_keys),
        ],
    );

    info!(
        available = snapshot.available_count(),
        total = Endpoint::ALL.len(),
        "refresh cycle complete"
    );
    snapshot
}

fn settle(endpoint: Endpoint, result: Result<Value, wizly_api::Error>) -> EndpointState {
    match result {
        Ok(value) => {
            let raw = RawPayload::from(value);
            let records = normalize(endpoint, &raw);
            debug!(%endpoint, records = records.len(), "endpoint refreshed");
            EndpointState::Available { raw, records }
        }
        Err(e) => {
            warn!(%endpoint, kind = %e.kind(), error = %e, "endpoint unavailable");
            EndpointState::Unavailable {
                kind: e.kind(),
                reason: e.to_string(),
            }
        }
    }
}
