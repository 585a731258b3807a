//! The text-generation boundary consumed by the pipeline.

use std::future::Future;

use wayfind_core::{Citation, GroundingTool};

use crate::error::GenerateError;

/// One call to the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateRequest {
    pub prompt: String,
    pub grounding: GroundingTool,
}

/// Generated text plus the grounding citations returned with it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Generation {
    pub text: String,
    pub evidence: Vec<Citation>,
}

/// A source of generated text.
///
/// Implemented by [`crate::GeminiClient`] in production and by in-memory
/// fakes in tests.
pub trait Generator {
    fn generate(
        &self,
        request: &GenerateRequest,
    ) -> impl Future<Output = Result<Generation, GenerateError>> + Send;
}
