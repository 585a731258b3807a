//! Extraction prompt sent to the model.

/// Instructions preceding the user content. Grounding tools cannot be combined
/// with a JSON response mode, so the expected shape is spelled out here and
/// the reply is recovered by [`crate::parse_response`].
const INSTRUCTIONS: &str = r#"You are a travel research assistant. Read the content below and list every
concrete, visitable place it mentions (restaurants, cafes, bars, sights,
shops, activities, hotels). Use the map tool to confirm each place and copy
the exact map link it returns into "mapUri". Do not guess links.

Reply with JSON only, no commentary, in exactly this shape:

{
  "summary": "one or two sentences describing the content",
  "places": [
    {
      "name": "official place name",
      "category": "FOOD | DRINK | SIGHTSEEING | SHOPPING | ACTIVITY | LODGING | OTHER",
      "subCategory": "e.g. Ramen, Temple, Vintage clothing",
      "description": "what the content says about this place",
      "tags": ["short", "keywords"],
      "ratingPrediction": 4.2,
      "priceLevel": "Free | $ | $$ | $$$ | $$$$",
      "locationGuess": "Region Subregion, e.g. Tokyo Shibuya",
      "address": "street address if known",
      "coordinates": { "lat": 35.6595, "lng": 139.7005 },
      "openingHours": "opening hours if known",
      "mapUri": "map link returned by the map tool",
      "websiteUri": "official website if known"
    }
  ]
}

Omit fields you do not know instead of inventing values. If no places are
mentioned, return an empty "places" array.

Content:
"#;

/// Build the full prompt for `content`.
#[must_use]
pub fn build_prompt(content: &str) -> String {
    let content = content.trim();
    let mut prompt = String::with_capacity(INSTRUCTIONS.len() + content.len() + 1);
    prompt.push_str(INSTRUCTIONS);
    prompt.push_str(content);
    prompt.push('\n');
    prompt
}
