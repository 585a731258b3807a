//! Gemini `generateContent` wire types.
//!
//! Only the fields the pipeline reads are modelled; everything else in the
//! response is ignored.

use serde::{Deserialize, Serialize};
use wayfind_core::{Citation, GroundingTool};

use crate::error::UpstreamError;

// ---------------------------------------------------------------------------
// Request
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct GenerateContentRequest<'a> {
    pub contents: Vec<Content<'a>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<Tool>,
}

impl<'a> GenerateContentRequest<'a> {
    pub fn new(prompt: &'a str, grounding: GroundingTool) -> Self {
        let tools = match grounding {
            GroundingTool::GoogleMaps => vec![Tool::GoogleMaps(EmptyConfig {})],
            GroundingTool::GoogleSearch => vec![Tool::GoogleSearch(EmptyConfig {})],
            GroundingTool::None => Vec::new(),
        };
        Self {
            contents: vec![Content {
                role: "user",
                parts: vec![TextPart { text: prompt }],
            }],
            tools,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct Content<'a> {
    pub role: &'static str,
    pub parts: Vec<TextPart<'a>>,
}

#[derive(Debug, Serialize)]
pub struct TextPart<'a> {
    pub text: &'a str,
}

/// A grounding tool, serialized as `{"googleMaps": {}}` or `{"googleSearch": {}}`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Tool {
    GoogleMaps(EmptyConfig),
    GoogleSearch(EmptyConfig),
}

#[derive(Debug, Serialize)]
pub struct EmptyConfig {}

// ---------------------------------------------------------------------------
// Response
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<CandidateContent>,
    #[serde(default)]
    pub grounding_metadata: Option<GroundingMetadata>,
}

#[derive(Debug, Deserialize)]
pub struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
pub struct ResponsePart {
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroundingMetadata {
    #[serde(default)]
    pub grounding_chunks: Vec<GroundingChunk>,
}

/// One grounding chunk. Chunks of other kinds deserialize with both fields
/// empty and are skipped.
#[derive(Debug, Deserialize)]
pub struct GroundingChunk {
    #[serde(default)]
    pub web: Option<ChunkSource>,
    #[serde(default)]
    pub maps: Option<ChunkSource>,
}

#[derive(Debug, Deserialize)]
pub struct ChunkSource {
    #[serde(default)]
    pub uri: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
}

impl GroundingChunk {
    pub fn into_citation(self) -> Option<Citation> {
        match (self.maps, self.web) {
            (Some(maps), _) => Some(Citation::Map {
                title: maps.title,
                uri: maps.uri,
            }),
            (None, Some(web)) => Some(Citation::Web {
                title: web.title,
                uri: web.uri,
            }),
            (None, None) => None,
        }
    }
}

impl Candidate {
    /// Concatenated text of every part.
    pub fn text(&self) -> String {
        self.content
            .iter()
            .flat_map(|c| &c.parts)
            .filter_map(|p| p.text.as_deref())
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Error envelope
// ---------------------------------------------------------------------------

/// `{"error": {"code": 503, "message": "...", "status": "UNAVAILABLE"}}`
#[derive(Debug, Deserialize)]
pub struct ErrorEnvelope {
    #[serde(default)]
    pub error: Option<ErrorBody>,
}

#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub code: Option<u16>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

impl ErrorEnvelope {
    /// Build an [`UpstreamError`] from a non-2xx response.
    ///
    /// The HTTP status wins over the envelope's `code`; a body that is not a
    /// recognisable envelope leaves `message` empty.
    pub fn upstream_error(http_status: Option<u16>, body: &str) -> UpstreamError {
        let parsed = serde_json::from_str::<ErrorEnvelope>(body)
            .ok()
            .and_then(|env| env.error);
        match parsed {
            Some(err) => UpstreamError {
                status: http_status.or(err.code),
                api_status: err.status,
                message: err.message,
            },
            None => UpstreamError {
                status: http_status,
                api_status: None,
                message: None,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_serializes_maps_tool() {
        let req = GenerateContentRequest::new("find places", GroundingTool::GoogleMaps);
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "contents": [{"role": "user", "parts": [{"text": "find places"}]}],
                "tools": [{"googleMaps": {}}]
            })
        );
    }

    #[test]
    fn request_without_grounding_omits_tools() {
        let req = GenerateContentRequest::new("x", GroundingTool::None);
        let json = serde_json::to_value(&req).unwrap();
        assert!(json.get("tools").is_none());
    }

    #[test]
    fn search_tool_serializes_camel_case() {
        let req = GenerateContentRequest::new("x", GroundingTool::GoogleSearch);
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["tools"], serde_json::json!([{"googleSearch": {}}]));
    }

    #[test]
    fn candidate_text_joins_parts() {
        let resp: GenerateContentResponse = serde_json::from_value(serde_json::json!({
            "candidates": [{"content": {"parts": [{"text": "{\"a\":"}, {"text": "1}"}]}}]
        }))
        .unwrap();
        assert_eq!(resp.candidates[0].text(), "{\"a\":1}");
    }

    #[test]
    fn chunks_map_to_citations() {
        let maps: GroundingChunk = serde_json::from_value(serde_json::json!({
            "maps": {"uri": "https://maps.google.com/?cid=1", "title": "Cafe"}
        }))
        .unwrap();
        assert_eq!(
            maps.into_citation(),
            Some(Citation::Map {
                title: Some("Cafe".to_string()),
                uri: Some("https://maps.google.com/?cid=1".to_string()),
            })
        );

        let other: GroundingChunk =
            serde_json::from_value(serde_json::json!({"retrievedContext": {}})).unwrap();
        assert_eq!(other.into_citation(), None);
    }

    #[test]
    fn error_envelope_fields_are_optional() {
        let full = ErrorEnvelope::upstream_error(
            Some(503),
            r#"{"error":{"code":503,"message":"The model is overloaded.","status":"UNAVAILABLE"}}"#,
        );
        assert_eq!(full.status, Some(503));
        assert_eq!(full.api_status.as_deref(), Some("UNAVAILABLE"));

        let bare = ErrorEnvelope::upstream_error(None, "<html>gateway</html>");
        assert_eq!(bare, UpstreamError::unknown());
    }
}
