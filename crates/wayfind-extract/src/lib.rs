//! Resilient extraction of place records from generative-model output.

pub mod dedup;
pub mod error;
pub mod gemini;
pub mod generator;
pub mod grounding;
pub mod parse;
pub mod pipeline;
pub mod prompt;
pub mod retry;

pub use dedup::{completeness_score, dedup_key, deduplicate, merge_batches};
pub use error::{ExtractError, GenerateError, MalformedResponse, UpstreamError, UserAction};
pub use gemini::GeminiClient;
pub use generator::{GenerateRequest, Generation, Generator};
pub use grounding::{cross_reference, is_trusted_map_uri, reconcile};
pub use parse::{parse_response, parse_response_with_stage, ParsedResponse, RecoveryStage};
pub use pipeline::ExtractionPipeline;
pub use prompt::build_prompt;
pub use retry::{retry_with_backoff, with_retry, RetryPolicy, Sleep, TokioSleep, Transient};
