// ── Cross-reference resolver ──
//
// Builds id → label tables from users and libraries, then rewrites the
// foreign-key-like fields of invitation *copies* (`used_by`,
// `specific_libraries`) into readable labels. Every function here is
// total: malformed records are skipped, unresolvable references kept.

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;

use crate::model::{Record, RecordId};

/// Library server name that carries no information.
const UNKNOWN_SERVER: &str = "Unknown";

// ── LookupTable ─────────────────────────────────────────────────────

/// `id → display label`, rebuilt from scratch every refresh.
///
/// Iteration follows insertion order; a repeated id keeps its last label.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct LookupTable(IndexMap<RecordId, String>);

impl LookupTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: RecordId, label: String) {
        self.0.insert(id, label);
    }

    pub fn get(&self, id: &RecordId) -> Option<&str> {
        self.0.get(id).map(String::as_str)
    }

    /// Look up a JSON value that is itself a usable id.
    pub fn get_value(&self, value: &Value) -> Option<&str> {
        RecordId::from_value(value).and_then(|id| self.get(&id))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&RecordId, &str)> {
        self.0.iter().map(|(id, label)| (id, label.as_str()))
    }
}

impl FromIterator<(RecordId, String)> for LookupTable {
    fn from_iter<I: IntoIterator<Item = (RecordId, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

// ── Labels ──────────────────────────────────────────────────────────

/// `"{username} ({email})"`, else whichever is present, else `"User {id}"`.
pub fn user_label(user: &Record) -> Option<(RecordId, String)> {
    let id = user.id()?;
    let label = match (user.str_field("username"), user.str_field("email")) {
        (Some(username), Some(email)) => format!("{username} ({email})"),
        (Some(username), None) => username.to_owned(),
        (None, Some(email)) => email.to_owned(),
        (None, None) => format!("User {id}"),
    };
    Some((id, label))
}

/// `name`, else `title`, else `"Library {id}"`, suffixed with
/// `" ({server_name})"` when the server name is informative.
pub fn library_label(library: &Record) -> Option<(RecordId, String)> {
    let id = library.id()?;
    let base = library
        .str_field("name")
        .or_else(|| library.str_field("title"))
        .map_or_else(|| format!("Library {id}"), str::to_owned);
    let label = match library.str_field("server_name") {
        Some(server) if server != UNKNOWN_SERVER => format!("{base} ({server})"),
        _ => base,
    };
    Some((id, label))
}

pub fn build_user_labels(users: &[Record]) -> LookupTable {
    users.iter().filter_map(user_label).collect()
}

pub fn build_library_labels(libraries: &[Record]) -> LookupTable {
    libraries.iter().filter_map(library_label).collect()
}

// ── Enrichment ──────────────────────────────────────────────────────

/// An invitation copy whose references have been resolved to labels.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct EnrichedInvitation(Record);

impl EnrichedInvitation {
    pub fn record(&self) -> &Record {
        &self.0
    }

    pub fn into_record(self) -> Record {
        self.0
    }

    pub fn used_by(&self) -> Option<&Value> {
        self.0.get("used_by")
    }

    pub fn specific_libraries(&self) -> Option<&Value> {
        self.0.get("specific_libraries")
    }
}

/// Resolve `used_by` and `specific_libraries` on copies of `invitations`.
///
/// The input slice and both tables are only read.
pub fn enrich_invitations(
    invitations: &[Record],
    user_labels: &LookupTable,
    library_labels: &LookupTable,
) -> Vec<EnrichedInvitation> {
    invitations
        .iter()
        .map(|invitation| enrich_one(invitation.clone(), user_labels, library_labels))
        .collect()
}

fn enrich_one(
    mut invitation: Record,
    user_labels: &LookupTable,
    library_labels: &LookupTable,
) -> EnrichedInvitation {
    if let Some(fields) = invitation.as_object_mut() {
        if let Some(used_by) = fields.get_mut("used_by") {
            if let Some(label) = resolve_used_by(used_by, user_labels) {
                *used_by = Value::String(label);
            }
        }
        if let Some(Value::Array(libraries)) = fields.get_mut("specific_libraries") {
            if !libraries.is_empty() {
                let labels = libraries
                    .iter()
                    .map(|lib| Value::String(resolve_library(lib, library_labels)))
                    .collect();
                *libraries = labels;
            }
        }
    }
    EnrichedInvitation(invitation)
}

/// `"<User N>"`, `{"id": N, ...}` or a bare integer. `None` leaves the
/// field untouched.
fn resolve_used_by(used_by: &Value, user_labels: &LookupTable) -> Option<String> {
    let id = match used_by {
        Value::String(s) => RecordId::Int(parse_user_ref(s)?),
        Value::Object(map) => RecordId::from_value(map.get("id")?)?,
        Value::Number(n) => RecordId::Int(n.as_i64()?),
        _ => return None,
    };
    user_labels.get(&id).map(str::to_owned)
}

/// Parse the `"<User N>"` repr some Wizarr versions emit.
fn parse_user_ref(s: &str) -> Option<i64> {
    s.strip_prefix("<User ")?
        .strip_suffix('>')?
        .trim()
        .parse()
        .ok()
}

fn resolve_library(element: &Value, library_labels: &LookupTable) -> String {
    match element {
        Value::Object(map) => match map.get("id") {
            Some(id_value) => library_labels
                .get_value(id_value)
                .map(str::to_owned)
                .or_else(|| {
                    map.get("name")
                        .and_then(Value::as_str)
                        .filter(|s| !s.is_empty())
                        .map(str::to_owned)
                })
                .unwrap_or_else(|| format!("Library {}", display_scalar(id_value))),
            None => element.to_string(),
        },
        Value::Number(n) if n.is_i64() => library_labels
            .get_value(element)
            .map_or_else(|| n.to_string(), str::to_owned),
        other => display_scalar(other),
    }
}

/// String form of a scalar without JSON quoting.
fn display_scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
