use thiserror::Error;

/// HTTP status codes treated as transient server failures.
const TRANSIENT_STATUS_CODES: [u16; 2] = [500, 503];

/// API status strings the model service uses for server-internal failures.
const TRANSIENT_API_STATUSES: &[&str] = &["INTERNAL", "UNAVAILABLE"];

/// Lower-case message fragments that indicate overload or internal errors.
const TRANSIENT_MESSAGE_MARKERS: &[&str] = &[
    "overloaded",
    "internal error",
    "unavailable",
    "capacity",
    "try again later",
];

/// Error envelope reported by the model service.
///
/// Every field is optional: a failure with no status and no message is still
/// representable and renders as "unknown error".
#[derive(Debug, Clone, Default, PartialEq, Eq, Error)]
#[error("{msg} (status {code})",
    msg = .message.as_deref().unwrap_or("unknown error"),
    code = .status.map_or_else(|| "none".to_string(), |s| s.to_string()))]
pub struct UpstreamError {
    /// HTTP status code, when the failure came from an HTTP response.
    pub status: Option<u16>,
    /// Symbolic API status such as `"UNAVAILABLE"` or `"PERMISSION_DENIED"`.
    pub api_status: Option<String>,
    pub message: Option<String>,
}

impl UpstreamError {
    /// A failure about which nothing is known.
    #[must_use]
    pub fn unknown() -> Self {
        Self::default()
    }

    /// Whether this failure is likely to succeed on retry.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        if self
            .status
            .is_some_and(|s| TRANSIENT_STATUS_CODES.contains(&s))
        {
            return true;
        }
        if self
            .api_status
            .as_deref()
            .is_some_and(|s| TRANSIENT_API_STATUSES.contains(&s))
        {
            return true;
        }
        self.message.as_deref().is_some_and(|m| {
            let lower = m.to_lowercase();
            TRANSIENT_MESSAGE_MARKERS
                .iter()
                .any(|marker| lower.contains(marker))
        })
    }
}

/// Errors from the text-generation boundary.
#[derive(Debug, Error)]
pub enum GenerateError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The model service answered with a non-2xx status.
    #[error("model API error: {0}")]
    Api(UpstreamError),

    /// The response envelope did not match the expected shape.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// The response carried no candidate text.
    #[error("model returned no text")]
    EmptyResponse,

    #[error("invalid base URL \"{url}\": {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}

/// The model's text could not be recovered into structured data.
#[derive(Debug, Clone, Error)]
#[error("model response could not be parsed: {reason}")]
pub struct MalformedResponse {
    /// The original response text, kept for diagnostics.
    pub raw: String,
    pub reason: String,
}

/// What a user-facing layer should suggest after a failed extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserAction {
    /// The service was busy; the same request may succeed later.
    Retry,
    /// The model produced unusable output; different input may help.
    RephraseInput,
    /// Credentials, quota or request shape are wrong; retrying won't help.
    CheckSettings,
}

/// Errors surfaced by the extraction pipeline.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error(transparent)]
    Malformed(#[from] MalformedResponse),

    /// A transient upstream failure that outlasted every retry.
    #[error("model call kept failing after retries: {0}")]
    TransientUpstream(#[source] GenerateError),

    /// A permanent upstream failure, surfaced without retrying.
    #[error("model call rejected: {0}")]
    NonRetryableUpstream(#[source] GenerateError),
}

impl ExtractError {
    /// Wrap a generation failure according to its transient classification.
    #[must_use]
    pub fn from_upstream(err: GenerateError) -> Self {
        use crate::retry::Transient;

        if err.is_transient() {
            Self::TransientUpstream(err)
        } else {
            Self::NonRetryableUpstream(err)
        }
    }

    #[must_use]
    pub fn user_action(&self) -> UserAction {
        match self {
            Self::Malformed(_)
            | Self::NonRetryableUpstream(
                GenerateError::EmptyResponse | GenerateError::Deserialize { .. },
            ) => UserAction::RephraseInput,
            Self::TransientUpstream(_) => UserAction::Retry,
            Self::NonRetryableUpstream(_) => UserAction::CheckSettings,
        }
    }
}
