// ── Derived views ──
//
// Per-endpoint summary of a snapshot: a headline state (online, a count,
// or unavailable) plus an ordered attribute map of totals and group-by
// histograms. Pure functions over already-normalized data.

use std::fmt;

use indexmap::IndexMap;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};
use wizly_api::Endpoint;

use crate::model::{RawPayload, Record};
use crate::resolve::{build_library_labels, build_user_labels, enrich_invitations};
use crate::store::{EndpointState, Snapshot};

/// Bucket for records whose grouping field is missing or null.
pub const UNKNOWN_BUCKET: &str = "unknown";

/// Status fields copied through to the status view.
const STATUS_PASSTHROUGH: [&str; 4] =
    ["total_users", "total_invitations", "total_requests", "version"];

// ── ViewState ───────────────────────────────────────────────────────

/// Headline value of a view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewState {
    /// The status endpoint answered.
    Online,
    /// Number of records on a list endpoint.
    Count(usize),
    /// The endpoint failed during the last refresh.
    Unavailable,
}

impl fmt::Display for ViewState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Online => f.write_str("online"),
            Self::Count(n) => write!(f, "{n}"),
            Self::Unavailable => f.write_str("unavailable"),
        }
    }
}

impl Serialize for ViewState {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Count(n) => serializer.serialize_u64(u64::try_from(*n).unwrap_or(u64::MAX)),
            other => serializer.collect_str(other),
        }
    }
}

// ── DerivedView ─────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DerivedView {
    pub endpoint: Endpoint,
    pub state: ViewState,
    pub attributes: IndexMap<String, Value>,
}

impl DerivedView {
    pub fn unavailable(endpoint: Endpoint) -> Self {
        let mut attributes = IndexMap::new();
        attributes.insert("status".to_owned(), Value::from("unavailable"));
        Self {
            endpoint,
            state: ViewState::Unavailable,
            attributes,
        }
    }

    pub fn attribute(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key)
    }

    pub fn is_available(&self) -> bool {
        self.state != ViewState::Unavailable
    }
}

/// Build the view for one endpoint from its normalized records and the
/// raw payload they came from.
pub fn build_view(endpoint: Endpoint, records: &[Record], raw: &RawPayload) -> DerivedView {
    let mut attributes = IndexMap::new();

    if endpoint == Endpoint::Status {
        if let Some(status) = raw.as_mapping() {
            for key in STATUS_PASSTHROUGH {
                if let Some(value) = status.get(key) {
                    attributes.insert(key.to_owned(), value.clone());
                }
            }
        }
        return DerivedView {
            endpoint,
            state: ViewState::Online,
            attributes,
        };
    }

    attributes.insert(
        format!("total_{}", endpoint.entity_key()),
        Value::from(records.len()),
    );

    if !records.is_empty() {
        match endpoint {
            Endpoint::Users => {
                attributes.insert("users_by_server".into(), histogram(records, "server_type"));
            }
            Endpoint::Invitations => {
                attributes.insert("invitations_by_status".into(), histogram(records, "status"));
            }
            Endpoint::Libraries => {
                attributes.insert("libraries_by_server".into(), histogram(records, "server_name"));
            }
            Endpoint::Servers => {
                attributes.insert("servers_by_type".into(), histogram(records, "server_type"));
            }
            Endpoint::ApiKeys => {
                let active = records
                    .iter()
                    .filter(|key| !is_truthy(key.get("deleted_at")))
                    .count();
                attributes.insert("active_count".into(), Value::from(active));
                attributes.insert("inactive_count".into(), Value::from(records.len() - active));
            }
            Endpoint::Status => {}
        }
    }

    DerivedView {
        endpoint,
        state: ViewState::Count(records.len()),
        attributes,
    }
}

/// Views for all six endpoints, in refresh order.
///
/// Unavailable endpoints get an `unavailable` view. The invitations view
/// also carries the enriched invitation list under `invitations`.
pub fn build_views(snapshot: &Snapshot) -> Vec<DerivedView> {
    Endpoint::ALL
        .into_iter()
        .map(|endpoint| match snapshot.get(endpoint) {
            EndpointState::Available { raw, records } => {
                let mut view = build_view(endpoint, records, raw);
                if endpoint == Endpoint::Invitations {
                    let enriched = enrich_invitations(
                        records,
                        &build_user_labels(snapshot.records(Endpoint::Users)),
                        &build_library_labels(snapshot.records(Endpoint::Libraries)),
                    );
                    let list = enriched.into_iter().map(|e| e.into_record().into_value());
                    view.attributes
                        .insert("invitations".into(), Value::Array(list.collect()));
                }
                view
            }
            EndpointState::Unavailable { .. } => DerivedView::unavailable(endpoint),
        })
        .collect()
}

/// Count records by `field`, in first-seen bucket order.
fn histogram(records: &[Record], field: &str) -> Value {
    let mut buckets: IndexMap<String, u64> = IndexMap::new();
    for record in records {
        let key = match record.get(field) {
            None | Some(Value::Null) => UNKNOWN_BUCKET.to_owned(),
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
        };
        *buckets.entry(key).or_default() += 1;
    }
    Value::Object(
        buckets
            .into_iter()
            .map(|(key, count)| (key, Value::from(count)))
            .collect::<Map<String, Value>>(),
    )
}

/// JSON truthiness: null, `false`, zero, and empty strings or containers
/// are falsy.
fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f.abs() > 0.0),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(a)) => !a.is_empty(),
        Some(Value::Object(o)) => !o.is_empty(),
    }
}
