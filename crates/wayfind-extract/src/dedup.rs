//! Identity-preserving deduplication of place records.
//!
//! Records describing the same real-world place collapse into one. The
//! survivor always carries the id of the record seen first, so a place keeps
//! its identifier no matter how many later extractions rediscover it.

use std::collections::{HashMap, HashSet};

use wayfind_core::{decompose_location, new_place_id, PlaceRecord};

use crate::grounding::is_trusted_map_uri;

/// Compute the identity key used to detect duplicates.
///
/// A verified record with a specific map link is keyed by that link.
/// Everything else is keyed by normalised name plus normalised region, where
/// the region comes from [`decompose_location`] on the location guess.
#[must_use]
pub fn dedup_key(record: &PlaceRecord) -> String {
    verified_uri(record).map_or_else(|| name_key(record), |uri| format!("uri:{uri}"))
}

fn verified_uri(record: &PlaceRecord) -> Option<&str> {
    if !record.is_verified {
        return None;
    }
    record.map_uri.as_deref().filter(|u| is_trusted_map_uri(u))
}

fn name_key(record: &PlaceRecord) -> String {
    let region = decompose_location(&record.location_guess).region;
    format!("name:{}\x00{}", normalize(&record.name), normalize(&region))
}

fn normalize(text: &str) -> String {
    text.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Completeness of `record` relative to `rival`, in half-points.
///
/// Coordinates are worth 2, an address 1, an image 1, and a description
/// strictly longer than the rival's 0.5.
#[must_use]
pub fn completeness_score(record: &PlaceRecord, rival: &PlaceRecord) -> u32 {
    let mut score = 0;
    if record.has_coordinates() {
        score += 4;
    }
    if record.has_address() {
        score += 2;
    }
    if record.has_image() {
        score += 2;
    }
    if record.description.chars().count() > rival.description.chars().count() {
        score += 1;
    }
    score
}

/// Whether `incoming` should replace `existing` under the same key.
fn incoming_wins(existing: &PlaceRecord, incoming: &PlaceRecord) -> bool {
    match (existing.is_verified, incoming.is_verified) {
        (false, true) => return true,
        (true, false) => return false,
        _ => {}
    }
    completeness_score(incoming, existing) > completeness_score(existing, incoming)
}

/// Lookup of live records by map link and by name + region.
///
/// Every record is reachable through its name key; verified records are also
/// reachable through their map link.
#[derive(Default)]
struct KeyIndex {
    by_uri: HashMap<String, usize>,
    by_name: HashMap<String, usize>,
}

impl KeyIndex {
    /// Position of the live record `incoming` duplicates, if any.
    ///
    /// A name match is rejected when both records carry different verified
    /// links, since those are two distinct places sharing a name.
    fn find(&self, out: &[PlaceRecord], incoming: &PlaceRecord) -> Option<usize> {
        let uri = verified_uri(incoming);
        if let Some(&pos) = uri.and_then(|u| self.by_uri.get(u)) {
            return Some(pos);
        }
        let &pos = self.by_name.get(&name_key(incoming))?;
        match (uri, verified_uri(&out[pos])) {
            (Some(a), Some(b)) if a != b => None,
            _ => Some(pos),
        }
    }

    fn insert(&mut self, record: &PlaceRecord, pos: usize) {
        if let Some(uri) = verified_uri(record) {
            self.by_uri.entry(uri.to_owned()).or_insert(pos);
        }
        self.by_name.entry(name_key(record)).or_insert(pos);
    }
}

/// Collapse duplicates, keeping first-seen order and first-seen ids.
///
/// Never fails; empty input yields empty output, and running the result
/// through again changes nothing.
#[must_use]
pub fn deduplicate(records: Vec<PlaceRecord>) -> Vec<PlaceRecord> {
    let input_len = records.len();
    let mut out: Vec<PlaceRecord> = Vec::with_capacity(input_len);
    let mut index = KeyIndex::default();
    let mut live_ids: HashSet<String> = HashSet::with_capacity(input_len);

    for mut incoming in records {
        if let Some(pos) = index.find(&out, &incoming) {
            // The loser's keys stay indexed so later spellings still match.
            index.insert(&incoming, pos);
            let existing = &mut out[pos];
            if incoming_wins(existing, &incoming) {
                tracing::debug!(
                    id = %existing.id,
                    replaced_by = %incoming.id,
                    place = %incoming.name,
                    "merged duplicate place, keeping incoming fields"
                );
                incoming.id = std::mem::take(&mut existing.id);
                *existing = incoming;
            } else {
                tracing::debug!(
                    id = %existing.id,
                    dropped = %incoming.id,
                    place = %existing.name,
                    "merged duplicate place, keeping existing record"
                );
            }
            continue;
        }

        if !live_ids.insert(incoming.id.clone()) {
            let fresh = new_place_id();
            tracing::warn!(
                old_id = %incoming.id,
                new_id = %fresh,
                place = %incoming.name,
                "id already used by a different place, re-identifying"
            );
            live_ids.insert(fresh.clone());
            incoming.id = fresh;
        }
        index.insert(&incoming, out.len());
        out.push(incoming);
    }

    tracing::debug!(input = input_len, output = out.len(), "deduplicated places");
    out
}

/// Merge a new batch into an existing catalogue.
///
/// Existing records keep their positions and ids; records for new places are
/// appended.
#[must_use]
pub fn merge_batches(existing: Vec<PlaceRecord>, incoming: Vec<PlaceRecord>) -> Vec<PlaceRecord> {
    let mut all = existing;
    all.extend(incoming);
    deduplicate(all)
}

#[cfg(test)]
#[path = "dedup_test.rs"]
mod tests;
