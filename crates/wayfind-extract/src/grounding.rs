//! Cross-referencing of model-proposed map links against grounding evidence.
//!
//! A record is only marked verified when a citation returned alongside the
//! generated text corroborates it. The adopted link always comes from the
//! evidence; a link invented by the model is never kept.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use wayfind_core::{Citation, PlaceRecord};

/// Characters left unescaped by `encodeURIComponent`.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// URI fragments identifying a map-provider link.
const MAP_DOMAINS: &[&str] = &[
    "google.com/maps",
    "maps.google.",
    "goo.gl/maps",
    "maps.app.goo.gl",
];

/// Whether `uri` is a specific map-provider link rather than a generic search.
#[must_use]
pub fn is_trusted_map_uri(uri: &str) -> bool {
    let lower = uri.to_lowercase();
    MAP_DOMAINS.iter().any(|domain| lower.contains(domain)) && !is_generic_search(&lower)
}

/// `/maps/search/...` paths, and `?q=` queries that name no specific place.
fn is_generic_search(lower: &str) -> bool {
    let (path, query) = lower.split_once('?').unwrap_or((lower, ""));
    if path.split('/').any(|segment| segment == "search") {
        return true;
    }
    if path.contains("/place/") {
        return false;
    }
    let mut params = query.split(['&', '#']);
    let has_free_text = params
        .clone()
        .filter_map(|p| p.strip_prefix("q=").or_else(|| p.strip_prefix("query=")))
        .any(|value| !value.starts_with("place_id:"));
    has_free_text && !params.any(|p| p.starts_with("cid=") || p.starts_with("query_place_id="))
}

/// Cross-reference every record against the same evidence.
///
/// Records are handled independently; the output has the same length and
/// order as the input.
#[must_use]
pub fn reconcile(records: Vec<PlaceRecord>, evidence: &[Citation]) -> Vec<PlaceRecord> {
    let total = records.len();
    let reconciled: Vec<PlaceRecord> = records
        .into_iter()
        .map(|record| cross_reference(record, evidence))
        .collect();
    let verified = reconciled.iter().filter(|r| r.is_verified).count();
    tracing::debug!(
        total,
        verified,
        citations = evidence.len(),
        "cross-referenced places against grounding evidence"
    );
    reconciled
}

/// Verify one record's map link against `evidence`.
///
/// The proposed `map_uri` only gates the lookup: when it is missing or is not
/// a specific map link the record comes back unverified with no link. When a
/// citation matches, its URI replaces the proposed one.
#[must_use]
pub fn cross_reference(mut record: PlaceRecord, evidence: &[Citation]) -> PlaceRecord {
    let proposed = record.map_uri.take();
    record.is_verified = false;

    let Some(proposed) = proposed else {
        return record;
    };
    if !is_trusted_map_uri(&proposed) {
        tracing::warn!(
            place = %record.name,
            uri = %proposed,
            "discarding generic or unrecognised map link"
        );
        return record;
    }

    if let Some(uri) = find_corroborating_uri(&record.name, evidence) {
        tracing::debug!(place = %record.name, %uri, "place verified by grounding evidence");
        record.map_uri = Some(uri.to_string());
        record.is_verified = true;
    }
    record
}

fn find_corroborating_uri<'a>(name: &str, evidence: &'a [Citation]) -> Option<&'a str> {
    if name.is_empty() {
        return None;
    }
    let encoded = utf8_percent_encode(name, URI_COMPONENT).to_string();

    evidence.iter().find_map(|citation| {
        let uri = citation.uri()?;
        let adoptable = match citation {
            Citation::Map { .. } => true,
            Citation::Web { .. } => is_trusted_map_uri(uri),
        };
        if !adoptable {
            return None;
        }
        let matches = citation.title().is_some_and(|t| t.contains(name))
            || uri.contains(name)
            || uri.contains(&encoded);
        matches.then_some(uri)
    })
}
