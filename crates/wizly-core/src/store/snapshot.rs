// ── Snapshot ──
//
// The result of one refresh cycle. Built once, never mutated, replaced
// wholesale by the next cycle. Always holds exactly one entry per
// endpoint.

use chrono::{DateTime, Utc};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use wizly_api::{Endpoint, ErrorKind};

use crate::model::{RawPayload, Record};

/// Outcome of one endpoint's fetch within a cycle.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum EndpointState {
    /// The endpoint answered; `records` is `raw` normalized.
    Available {
        raw: RawPayload,
        records: Vec<Record>,
    },
    /// The fetch failed; the reason is kept for display only.
    Unavailable { kind: ErrorKind, reason: String },
}

impl EndpointState {
    pub fn is_available(&self) -> bool {
        matches!(self, Self::Available { .. })
    }
}

/// Per-endpoint results of a single refresh cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    fetched_at: DateTime<Utc>,
    entries: [EndpointState; 6],
}

impl Snapshot {
    /// Build from entries indexed in [`Endpoint::ALL`] order.
    pub fn new(fetched_at: DateTime<Utc>, entries: [EndpointState; 6]) -> Self {
        Self {
            fetched_at,
            entries,
        }
    }

    pub fn fetched_at(&self) -> DateTime<Utc> {
        self.fetched_at
    }

    pub fn get(&self, endpoint: Endpoint) -> &EndpointState {
        &self.entries[endpoint.index()]
    }

    /// Normalized records, empty when the endpoint is unavailable.
    pub fn records(&self, endpoint: Endpoint) -> &[Record] {
        match self.get(endpoint) {
            EndpointState::Available { records, .. } => records,
            EndpointState::Unavailable { .. } => &[],
        }
    }

    pub fn raw(&self, endpoint: Endpoint) -> Option<&RawPayload> {
        match self.get(endpoint) {
            EndpointState::Available { raw, .. } => Some(raw),
            EndpointState::Unavailable { .. } => None,
        }
    }

    pub fn is_available(&self, endpoint: Endpoint) -> bool {
        self.get(endpoint).is_available()
    }

    pub fn available_count(&self) -> usize {
        self.entries.iter().filter(|e| e.is_available()).count()
    }

    /// A cycle counts as successful when at least one endpoint answered.
    pub fn any_available(&self) -> bool {
        self.available_count() > 0
    }

    pub fn iter(&self) -> impl Iterator<Item = (Endpoint, &EndpointState)> {
        Endpoint::ALL.into_iter().zip(self.entries.iter())
    }

    pub fn unavailable(&self) -> impl Iterator<Item = Endpoint> + '_ {
        self.iter()
            .filter(|(_, state)| !state.is_available())
            .map(|(endpoint, _)| endpoint)
    }
}

impl Serialize for Snapshot {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len() + 1))?;
        map.serialize_entry("fetched_at", &self.fetched_at)?;
        for (endpoint, state) in self.iter() {
            map.serialize_entry(endpoint.name(), state)?;
        }
        map.end()
    }
}
