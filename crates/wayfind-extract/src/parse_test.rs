use super::*;

const CLEAN: &str = r#"{
    "summary": "A food crawl through Fukuoka",
    "places": [
        {
            "id": "p1",
            "name": "Ichiran Nakasu",
            "category": "FOOD",
            "subCategory": "Ramen",
            "description": "Tonkotsu ramen in solo booths.",
            "tags": ["ramen", "late-night"],
            "ratingPrediction": 4.5,
            "priceLevel": "$$",
            "locationGuess": "Fukuoka Nakasu",
            "address": "5-3-2 Nakasu, Hakata-ku",
            "coordinates": {"lat": 33.5929, "lng": 130.4041},
            "openingHours": "24h",
            "mapUri": "https://www.google.com/maps/place/Ichiran",
            "websiteUri": "https://ichiran.com"
        }
    ]
}"#;

// ---------------------------------------------------------------------------
// Recovery stages
// ---------------------------------------------------------------------------

#[test]
fn clean_document_parses_directly() {
    let parsed = parse_response_with_stage(CLEAN).unwrap();
    assert_eq!(parsed.stage, RecoveryStage::Direct);
    assert_eq!(parsed.result.summary, "A food crawl through Fukuoka");
    assert_eq!(parsed.result.places.len(), 1);

    let place = &parsed.result.places[0];
    assert_eq!(place.id, "p1");
    assert_eq!(place.name, "Ichiran Nakasu");
    assert_eq!(place.category, Category::Food);
    assert_eq!(place.sub_category.as_deref(), Some("Ramen"));
    assert_eq!(place.tags, vec!["ramen", "late-night"]);
    assert_eq!(place.rating_prediction, Some(4.5));
    assert_eq!(place.price_level, PriceLevel::Moderate);
    assert_eq!(place.location_guess, "Fukuoka Nakasu");
    assert_eq!(place.opening_hours.as_deref(), Some("24h"));
    assert!(place.has_coordinates());
    assert_eq!(place.website_uri.as_deref(), Some("https://ichiran.com"));
}

#[test]
fn fenced_document_parses_after_stripping_fences() {
    let raw = "```json\n{\"summary\":\"s\",\"places\":[{\"name\":\"Cafe A\",\"category\":\"FOOD\"}]}\n```";
    let parsed = parse_response_with_stage(raw).unwrap();
    assert_eq!(parsed.stage, RecoveryStage::FenceStripped);
    assert_eq!(parsed.result.summary, "s");
    assert_eq!(parsed.result.places.len(), 1);
    assert_eq!(parsed.result.places[0].name, "Cafe A");
    assert!(
        !parsed.result.places[0].id.is_empty(),
        "a missing id must be generated"
    );
}

#[test]
fn fence_without_language_tag_is_stripped() {
    let raw = "```\n{\"summary\":\"s\",\"places\":[]}\n```";
    let parsed = parse_response_with_stage(raw).unwrap();
    assert_eq!(parsed.stage, RecoveryStage::FenceStripped);
}

#[test]
fn surrounding_prose_is_cut_by_brace_slice() {
    let raw = "Sure! Here is the data you asked for:\n{\"summary\":\"s\",\"places\":[{\"name\":\"Cafe A\"}]}\nLet me know if you need more.";
    let parsed = parse_response_with_stage(raw).unwrap();
    assert_eq!(parsed.stage, RecoveryStage::BraceSlice);
    assert_eq!(parsed.result.places[0].name, "Cafe A");
}

#[test]
fn trailing_commas_are_repaired() {
    let raw = r#"{"summary":"s","places":[{"name":"Cafe A","tags":["x",],},],}"#;
    let parsed = parse_response_with_stage(raw).unwrap();
    assert_eq!(parsed.stage, RecoveryStage::TrailingCommaRepair);
    assert_eq!(parsed.result.places[0].tags, vec!["x"]);
}

#[test]
fn bare_array_is_wrapped_with_placeholder_summary() {
    let raw = r#"[{"name":"Cafe A"},{"name":"Bar B","category":"DRINK"}]"#;
    let parsed = parse_response_with_stage(raw).unwrap();
    assert_eq!(parsed.stage, RecoveryStage::BareArray);
    assert_eq!(parsed.result.summary, PLACEHOLDER_SUMMARY);
    assert_eq!(parsed.result.places.len(), 2);
    assert_eq!(parsed.result.places[1].category, Category::Drink);
}

#[test]
fn fenced_bare_array_with_trailing_comma_is_recovered() {
    let raw = "Here you go:\n```json\n[{\"name\":\"Cafe A\"},]\n```";
    let parsed = parse_response_with_stage(raw).unwrap();
    assert_eq!(parsed.stage, RecoveryStage::BareArray);
    assert_eq!(parsed.result.places.len(), 1);
}

#[test]
fn each_stage_is_deterministic_across_runs() {
    let inputs = [
        CLEAN.to_string(),
        format!("```json\n{CLEAN}\n```"),
        format!("Intro text {CLEAN} outro text"),
        r#"{"summary":"s","places":[{"name":"A",},]}"#.to_string(),
        r#"[{"name":"A"}]"#.to_string(),
    ];
    let expected = [
        RecoveryStage::Direct,
        RecoveryStage::FenceStripped,
        RecoveryStage::BraceSlice,
        RecoveryStage::TrailingCommaRepair,
        RecoveryStage::BareArray,
    ];
    for (input, stage) in inputs.iter().zip(expected) {
        for _ in 0..3 {
            assert_eq!(parse_response_with_stage(input).unwrap().stage, stage);
        }
    }
}

#[test]
fn clean_parse_is_stable_under_reserialization() {
    let first = parse_response(CLEAN).unwrap();
    let reserialized = serde_json::to_string(&first).unwrap();
    let second = parse_response(&reserialized).unwrap();
    assert_eq!(first, second);
}

// ---------------------------------------------------------------------------
// Failures
// ---------------------------------------------------------------------------

#[test]
fn unrecoverable_text_is_malformed_and_keeps_original() {
    let raw = "I could not find any places in that article.";
    let err = parse_response(raw).unwrap_err();
    assert_eq!(err.raw, raw);
}

#[test]
fn empty_text_is_malformed() {
    let err = parse_response("   ").unwrap_err();
    assert_eq!(err.reason, "response was empty");
}

#[test]
fn object_without_places_is_malformed() {
    assert!(parse_response(r#"{"summary":"nothing here"}"#).is_err());
}

#[test]
fn truncated_document_is_malformed() {
    let raw = r#"{"summary":"s","places":[{"name":"Cafe A","description":"cut o"#;
    assert!(parse_response(raw).is_err());
}

#[test]
fn empty_places_array_is_a_valid_empty_result() {
    let result = parse_response(r#"{"summary":"s","places":[]}"#).unwrap();
    assert!(result.places.is_empty());
}

// ---------------------------------------------------------------------------
// Record interpretation
// ---------------------------------------------------------------------------

#[test]
fn entries_without_name_are_skipped() {
    let raw = r#"{"summary":"s","places":[{"category":"FOOD"},{"name":"  "},"oops",{"name":"Kept"}]}"#;
    let result = parse_response(raw).unwrap();
    assert_eq!(result.places.len(), 1);
    assert_eq!(result.places[0].name, "Kept");
}

#[test]
fn generated_ids_are_unique_within_a_batch() {
    let raw = r#"{"summary":"s","places":[{"name":"A"},{"name":"B"}]}"#;
    let result = parse_response(raw).unwrap();
    assert_ne!(result.places[0].id, result.places[1].id);
}

#[test]
fn model_verification_claims_are_ignored() {
    let raw = r#"{"summary":"s","places":[{"name":"A","isVerified":true,"mapUri":"https://maps.google.com/?cid=1"}]}"#;
    let result = parse_response(raw).unwrap();
    assert!(!result.places[0].is_verified);
    assert_eq!(
        result.places[0].map_uri.as_deref(),
        Some("https://maps.google.com/?cid=1")
    );
}

#[test]
fn out_of_range_coordinates_are_dropped_not_rejected() {
    let raw = r#"{"summary":"s","places":[{"name":"A","coordinates":{"lat":1000,"lng":0}}]}"#;
    let result = parse_response(raw).unwrap();
    assert_eq!(result.places.len(), 1);
    assert!(result.places[0].coordinates.is_none());
}

#[test]
fn numeric_strings_and_alternate_keys_are_accepted() {
    let raw = r#"{"summary":"s","places":[{
        "name":"A",
        "ratingPrediction":"9",
        "priceLevel":"free",
        "coordinates":{"latitude":"35.0","longitude":"135.5"}
    }]}"#;
    let place = parse_response(raw).unwrap().places.remove(0);
    assert_eq!(place.rating_prediction, Some(5.0), "rating is clamped to 5");
    assert_eq!(place.price_level, PriceLevel::Free);
    let coords = place.coordinates.unwrap();
    assert!((coords.lat - 35.0).abs() < 1e-9);
    assert!((coords.lng - 135.5).abs() < 1e-9);
}

#[test]
fn top_level_lat_lng_are_accepted() {
    let raw = r#"{"summary":"s","places":[{"name":"A","lat":10.5,"lng":-20.25}]}"#;
    let place = parse_response(raw).unwrap().places.remove(0);
    assert!(place.has_coordinates());
}

#[test]
fn comma_separated_tags_are_split() {
    let raw = r#"{"summary":"s","places":[{"name":"A","tags":"coffee, quiet ,, wifi"}]}"#;
    let place = parse_response(raw).unwrap().places.remove(0);
    assert_eq!(place.tags, vec!["coffee", "quiet", "wifi"]);
}

#[test]
fn unknown_enumerations_fall_back() {
    let raw = r#"{"summary":"s","places":[{"name":"A","category":"NIGHTLIFE","priceLevel":"pricey"}]}"#;
    let place = parse_response(raw).unwrap().places.remove(0);
    assert_eq!(place.category, Category::Other);
    assert_eq!(place.price_level, PriceLevel::Unknown);
}

#[test]
fn empty_optional_strings_are_absent() {
    let raw = r#"{"summary":"s","places":[{"name":"A","address":"","imageUri":"  ","mapUri":""}]}"#;
    let place = parse_response(raw).unwrap().places.remove(0);
    assert!(place.address.is_none());
    assert!(place.image_uri.is_none());
    assert!(place.map_uri.is_none());
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

#[test]
fn strip_code_fence_handles_single_line_fence() {
    assert_eq!(strip_code_fence("```json{\"a\":1}```"), "{\"a\":1}");
}

#[test]
fn slice_between_requires_ordered_delimiters() {
    assert_eq!(slice_between("} nothing {", '{', '}'), None);
    assert_eq!(slice_between("x {a} y {b} z", '{', '}'), Some("{a} y {b}"));
}

#[test]
fn remove_trailing_commas_keeps_inner_commas() {
    assert_eq!(
        remove_trailing_commas(r#"{"a":[1, 2,  ], "b": 3 ,}"#),
        r#"{"a":[1, 2  ], "b": 3 }"#
    );
}
