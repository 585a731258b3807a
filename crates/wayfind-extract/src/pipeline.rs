//! The extraction pipeline: generate → parse → cross-reference → deduplicate.

use wayfind_core::{AnalysisResult, AppConfig, GroundingTool, PlaceRecord};

use crate::dedup::{deduplicate, merge_batches};
use crate::error::{ExtractError, GenerateError};
use crate::gemini::GeminiClient;
use crate::generator::{GenerateRequest, Generator};
use crate::grounding::reconcile;
use crate::parse::parse_response_with_stage;
use crate::prompt::build_prompt;
use crate::retry::{retry_with_backoff, RetryPolicy, Sleep, TokioSleep};

/// Turns free-form content into a validated batch of places.
///
/// A batch is returned only once every stage has succeeded; on error the
/// caller's catalogue is untouched.
pub struct ExtractionPipeline<G, S = TokioSleep> {
    generator: G,
    sleeper: S,
    policy: RetryPolicy,
    grounding: GroundingTool,
}

impl<G: Generator> ExtractionPipeline<G> {
    #[must_use]
    pub fn new(generator: G, policy: RetryPolicy, grounding: GroundingTool) -> Self {
        Self {
            generator,
            sleeper: TokioSleep,
            policy,
            grounding,
        }
    }
}

impl ExtractionPipeline<GeminiClient> {
    /// Builds a Gemini-backed pipeline from loaded config.
    ///
    /// # Errors
    ///
    /// Returns [`GenerateError`] if the HTTP client cannot be constructed.
    pub fn from_config(config: &AppConfig) -> Result<Self, GenerateError> {
        Ok(Self::new(
            GeminiClient::from_config(config)?,
            RetryPolicy::from_config(config),
            config.grounding,
        ))
    }
}

impl<G, S> ExtractionPipeline<G, S>
where
    G: Generator,
    S: Sleep,
{
    /// Replaces the back-off timer, e.g. with a recording fake in tests.
    #[must_use]
    pub fn with_sleeper<S2: Sleep>(self, sleeper: S2) -> ExtractionPipeline<G, S2> {
        ExtractionPipeline {
            generator: self.generator,
            sleeper,
            policy: self.policy,
            grounding: self.grounding,
        }
    }

    /// Analyzes one piece of content into a deduplicated batch.
    ///
    /// # Errors
    ///
    /// - [`ExtractError::TransientUpstream`] when the model kept failing with
    ///   transient errors until the retry budget ran out.
    /// - [`ExtractError::NonRetryableUpstream`] on a permanent model failure.
    /// - [`ExtractError::Malformed`] when the reply could not be parsed.
    pub async fn analyze(&self, content: &str) -> Result<AnalysisResult, ExtractError> {
        let request = GenerateRequest {
            prompt: build_prompt(content),
            grounding: self.grounding,
        };

        let generation = retry_with_backoff(&self.policy, &self.sleeper, || {
            self.generator.generate(&request)
        })
        .await
        .map_err(ExtractError::from_upstream)?;

        let parsed = parse_response_with_stage(&generation.text)?;
        let parsed_count = parsed.result.places.len();

        let reconciled = reconcile(parsed.result.places, &generation.evidence);
        let places = deduplicate(reconciled);

        tracing::info!(
            stage = ?parsed.stage,
            parsed = parsed_count,
            kept = places.len(),
            verified = places.iter().filter(|p| p.is_verified).count(),
            citations = generation.evidence.len(),
            "analysis complete"
        );

        Ok(AnalysisResult {
            summary: parsed.result.summary,
            places,
        })
    }

    /// Analyzes `content` and merges the new batch into `existing`.
    ///
    /// Returns the summary of the new batch and the merged catalogue. Existing
    /// records keep their ids and positions; `existing` itself is never
    /// modified, so a failed call leaves the catalogue as it was.
    ///
    /// # Errors
    ///
    /// Same as [`ExtractionPipeline::analyze`].
    pub async fn analyze_and_merge(
        &self,
        existing: &[PlaceRecord],
        content: &str,
    ) -> Result<AnalysisResult, ExtractError> {
        let batch = self.analyze(content).await?;
        Ok(AnalysisResult {
            summary: batch.summary,
            places: merge_batches(existing.to_vec(), batch.places),
        })
    }
}
