// ── Shape normalizer ──
//
// Wizarr list endpoints answer in several shapes depending on version:
// a bare array, `{"data": [...]}`, `{"<entity>": [...]}`, or an object
// with one list among scalar fields. `normalize` reduces all of them to
// one ordered `Vec<Record>`. It is total: no input makes it fail.

use serde_json::{Map, Value};
use wizly_api::Endpoint;

use crate::model::{RawPayload, Record};

/// Field that never holds the record list, even when it is an array.
const COUNT_FIELD: &str = "count";

/// Reduce a raw payload to the endpoint's canonical record list.
///
/// Rules, first match wins:
/// 1. a sequence is returned as-is;
/// 2. a mapping's `data` array;
/// 3. a mapping's array under the endpoint's entity key;
/// 4. the first array-valued field in the mapping's own order, skipping
///    `count`;
/// 5. a record-like mapping (usable `id`) becomes a single record;
///    anything else (absent, scalar, scalar-only mapping) is empty.
pub fn normalize(endpoint: Endpoint, raw: &RawPayload) -> Vec<Record> {
    match raw {
        RawPayload::Sequence(items) => to_records(items),
        RawPayload::Mapping(map) => normalize_mapping(endpoint, map),
        RawPayload::Absent | RawPayload::Scalar(_) => Vec::new(),
    }
}

/// Convenience wrapper for callers holding a plain JSON value.
pub fn normalize_value(endpoint: Endpoint, value: &Value) -> Vec<Record> {
    normalize(endpoint, &RawPayload::from(value.clone()))
}

fn normalize_mapping(endpoint: Endpoint, map: &Map<String, Value>) -> Vec<Record> {
    if let Some(Value::Array(items)) = map.get("data") {
        return to_records(items);
    }
    if let Some(Value::Array(items)) = map.get(endpoint.entity_key()) {
        return to_records(items);
    }
    let first_list = map
        .iter()
        .filter(|(key, _)| key.as_str() != COUNT_FIELD)
        .find_map(|(_, value)| value.as_array());
    if let Some(items) = first_list {
        return to_records(items);
    }
    if Record::is_record_like(map) {
        return vec![Record::new(Value::Object(map.clone()))];
    }
    Vec::new()
}

fn to_records(items: &[Value]) -> Vec<Record> {
    items.iter().cloned().map(Record::new).collect()
}
