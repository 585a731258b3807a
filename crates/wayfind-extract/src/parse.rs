//! Recovery of structured place data from raw model text.
//!
//! The model is asked for JSON but routinely wraps it in Markdown fences,
//! surrounds it with prose, leaves trailing commas, or returns a bare array.
//! [`parse_response`] walks an ordered chain of recovery stages and stops at
//! the first one that yields a `{ summary, places }` document. If every stage
//! fails the caller gets a [`MalformedResponse`] with the original text; an
//! empty result is never substituted for unparseable input.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value};
use wayfind_core::{new_place_id, AnalysisResult, Category, Coordinates, PlaceRecord, PriceLevel};

use crate::error::MalformedResponse;

/// Summary used when the model returned a bare array of places.
pub const PLACEHOLDER_SUMMARY: &str = "Extracted places";

/// A comma directly followed (ignoring whitespace) by a closing brace or bracket.
static TRAILING_COMMA_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r",(\s*[}\]])").expect("valid regex"));

/// Which recovery stage produced a parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryStage {
    /// The whole text was a valid document.
    Direct,
    /// Valid once Markdown code fences were removed.
    FenceStripped,
    /// Valid between the first `{` and the last `}`.
    BraceSlice,
    /// Valid after removing trailing commas from the brace slice.
    TrailingCommaRepair,
    /// A bare array of places, wrapped with a placeholder summary.
    BareArray,
}

/// A successful parse together with the stage that recovered it.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedResponse {
    pub result: AnalysisResult,
    pub stage: RecoveryStage,
}

/// Parse raw model text into an [`AnalysisResult`].
///
/// # Errors
///
/// Returns [`MalformedResponse`] when no recovery stage succeeds.
pub fn parse_response(raw: &str) -> Result<AnalysisResult, MalformedResponse> {
    parse_response_with_stage(raw).map(|parsed| parsed.result)
}

/// Like [`parse_response`] but also reports the recovery stage used.
///
/// # Errors
///
/// Returns [`MalformedResponse`] when no recovery stage succeeds.
pub fn parse_response_with_stage(raw: &str) -> Result<ParsedResponse, MalformedResponse> {
    let trimmed = raw.trim();

    // Stage 1
    if let Some((summary, entries)) = parse_document(trimmed) {
        return Ok(finish(summary, &entries, RecoveryStage::Direct));
    }

    // Stage 2
    let unfenced = strip_code_fence(trimmed);
    if let Some((summary, entries)) = parse_document(unfenced) {
        return Ok(finish(summary, &entries, RecoveryStage::FenceStripped));
    }

    // Stages 3 and 4
    if let Some(slice) = slice_between(unfenced, '{', '}') {
        if let Some((summary, entries)) = parse_document(slice) {
            return Ok(finish(summary, &entries, RecoveryStage::BraceSlice));
        }
        let repaired = remove_trailing_commas(slice);
        if let Some((summary, entries)) = parse_document(&repaired) {
            return Ok(finish(
                summary,
                &entries,
                RecoveryStage::TrailingCommaRepair,
            ));
        }
    }

    // Stage 5
    if let Some(entries) = parse_bare_array(unfenced) {
        return Ok(finish(
            PLACEHOLDER_SUMMARY.to_string(),
            &entries,
            RecoveryStage::BareArray,
        ));
    }

    tracing::error!(
        raw_len = raw.len(),
        "model response could not be recovered into place data"
    );
    Err(MalformedResponse {
        raw: raw.to_string(),
        reason: if trimmed.is_empty() {
            "response was empty".to_string()
        } else {
            "no recovery stage produced a {summary, places} document".to_string()
        },
    })
}

fn finish(summary: String, entries: &[Value], stage: RecoveryStage) -> ParsedResponse {
    let places: Vec<PlaceRecord> = entries
        .iter()
        .enumerate()
        .filter_map(|(index, entry)| place_from_value(index, entry))
        .collect();
    tracing::debug!(
        ?stage,
        entries = entries.len(),
        places = places.len(),
        "parsed model response"
    );
    ParsedResponse {
        result: AnalysisResult { summary, places },
        stage,
    }
}

/// Strict parse of a `{ summary, places: [...] }` document.
fn parse_document(text: &str) -> Option<(String, Vec<Value>)> {
    let Ok(Value::Object(mut obj)) = serde_json::from_str::<Value>(text) else {
        return None;
    };
    let Some(Value::Array(entries)) = obj.remove("places") else {
        return None;
    };
    let summary = obj
        .get("summary")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    Some((summary, entries))
}

fn parse_bare_array(text: &str) -> Option<Vec<Value>> {
    let as_array = |candidate: &str| match serde_json::from_str::<Value>(candidate) {
        Ok(Value::Array(entries)) => Some(entries),
        _ => None,
    };

    if let Some(entries) = as_array(text) {
        return Some(entries);
    }
    let slice = slice_between(text, '[', ']')?;
    as_array(slice).or_else(|| as_array(&remove_trailing_commas(slice)))
}

/// Remove a leading ```` ```lang ```` line and a trailing ```` ``` ```` marker.
fn strip_code_fence(text: &str) -> &str {
    let mut s = text.trim();
    if let Some(rest) = s.strip_prefix("```") {
        s = match rest.find('\n') {
            Some(newline) => &rest[newline + 1..],
            None => rest.trim_start_matches(|c: char| c.is_ascii_alphanumeric()),
        };
    }
    if let Some(rest) = s.trim_end().strip_suffix("```") {
        s = rest;
    }
    s.trim()
}

/// Substring from the first `open` to the last `close`, inclusive.
fn slice_between(text: &str, open: char, close: char) -> Option<&str> {
    let start = text.find(open)?;
    let end = text.rfind(close)?;
    (start < end).then(|| &text[start..=end])
}

fn remove_trailing_commas(text: &str) -> String {
    TRAILING_COMMA_RE.replace_all(text, "$1").into_owned()
}

// ---------------------------------------------------------------------------
// Record interpretation
// ---------------------------------------------------------------------------

/// Build a [`PlaceRecord`] from one entry of the `places` array.
///
/// Entries without a usable name are skipped. Any `isVerified` claim from the
/// model is ignored; verification happens against grounding evidence only.
fn place_from_value(index: usize, entry: &Value) -> Option<PlaceRecord> {
    let Some(obj) = entry.as_object() else {
        tracing::warn!(index, "skipping place entry that is not an object");
        return None;
    };

    let Some(name) = string_field(obj, &["name", "title"]) else {
        tracing::warn!(index, "skipping place entry without a name");
        return None;
    };

    let id = string_field(obj, &["id"]).unwrap_or_else(new_place_id);

    Some(PlaceRecord {
        id,
        name,
        category: string_field(obj, &["category"])
            .map(|c| Category::from_label(&c))
            .unwrap_or_default(),
        sub_category: string_field(obj, &["subCategory", "sub_category"]),
        description: string_field(obj, &["description"]).unwrap_or_default(),
        tags: tags_field(obj),
        rating_prediction: rating_field(obj),
        price_level: string_field(obj, &["priceLevel", "price_level"])
            .map(|p| PriceLevel::from_label(&p))
            .unwrap_or_default(),
        location_guess: string_field(obj, &["locationGuess", "location_guess", "location"])
            .unwrap_or_default(),
        address: string_field(obj, &["address"]),
        coordinates: coordinates_field(index, obj),
        opening_hours: string_field(obj, &["openingHours", "opening_hours"]),
        map_uri: string_field(obj, &["mapUri", "map_uri", "googleMapsUri"]),
        is_verified: false,
        image_uri: string_field(obj, &["imageUri", "image_uri", "imageUrl"]),
        website_uri: string_field(obj, &["websiteUri", "website_uri", "website"]),
    })
}

/// First non-empty string (or number rendered as a string) among `keys`.
fn string_field(obj: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| match obj.get(*key)? {
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

/// First numeric value among `keys`, accepting numeric strings.
fn number_field(obj: &Map<String, Value>, keys: &[&str]) -> Option<f64> {
    keys.iter().find_map(|key| match obj.get(*key)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    })
}

fn tags_field(obj: &Map<String, Value>) -> Vec<String> {
    match obj.get("tags") {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect(),
        Some(Value::String(joined)) => joined
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}

fn rating_field(obj: &Map<String, Value>) -> Option<f32> {
    let rating = number_field(obj, &["ratingPrediction", "rating_prediction", "rating"])?;
    if !rating.is_finite() {
        return None;
    }
    // Clamped to [1, 5] first, so the narrowing cast cannot overflow.
    #[allow(clippy::cast_possible_truncation)]
    let clamped = rating.clamp(1.0, 5.0) as f32;
    Some(clamped)
}

/// Coordinates from a nested `coordinates` object or top-level lat/lng keys.
///
/// Out-of-range or non-finite values are dropped, leaving the record
/// coordinate-less.
fn coordinates_field(index: usize, obj: &Map<String, Value>) -> Option<Coordinates> {
    let source = obj
        .get("coordinates")
        .and_then(Value::as_object)
        .unwrap_or(obj);
    let lat = number_field(source, &["lat", "latitude"])?;
    let lng = number_field(source, &["lng", "lon", "longitude"])?;
    let coords = Coordinates::checked(lat, lng);
    if coords.is_none() {
        tracing::debug!(index, lat, lng, "dropping out-of-range coordinates");
    }
    coords
}

#[cfg(test)]
#[path = "parse_test.rs"]
mod tests;
