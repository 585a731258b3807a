//! `analyze` command handler.

use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::Context;
use wayfind_core::AppConfig;
use wayfind_extract::{ExtractError, ExtractionPipeline, UserAction};

use crate::catalogue::{write_output, Catalogue};

/// Read content from `input` (`-` for stdin).
fn read_input(input: &Path) -> anyhow::Result<String> {
    if input == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read content from stdin")?;
        Ok(buf)
    } else {
        std::fs::read_to_string(input)
            .with_context(|| format!("failed to read {}", input.display()))
    }
}

/// One-line hint printed after a failed analysis.
pub(crate) fn guidance(err: &ExtractError) -> &'static str {
    match err.user_action() {
        UserAction::Retry => {
            "The model service is busy. Wait a minute and run the same command again."
        }
        UserAction::RephraseInput => {
            "The model reply could not be read. Try shorter or more focused content."
        }
        UserAction::CheckSettings => {
            "The request was rejected. Check WAYFIND_GEMINI_API_KEY, quota and model name."
        }
    }
}

/// Analyze content and print or store the resulting catalogue.
///
/// With `catalogue` set, the new batch is merged into that file's places
/// (existing ids are kept) and the merged catalogue is written back to the
/// same file unless `output` points elsewhere.
///
/// # Errors
///
/// Returns an error if the input or catalogue cannot be read, the pipeline
/// fails, or the output cannot be written.
pub(crate) async fn run_analyze(
    config: &AppConfig,
    input: &Path,
    catalogue: Option<&PathBuf>,
    output: Option<&PathBuf>,
) -> anyhow::Result<()> {
    let content = read_input(input)?;
    if content.trim().is_empty() {
        anyhow::bail!("input {} is empty", input.display());
    }

    let pipeline = ExtractionPipeline::from_config(config)
        .context("failed to build Gemini client")?;

    let existing = match catalogue {
        Some(path) => Catalogue::load_or_default(path)?.places,
        None => Vec::new(),
    };

    tracing::info!(
        env = %config.env,
        model = %config.gemini_model,
        grounding = %config.grounding,
        existing = existing.len(),
        content_len = content.len(),
        "analyzing content"
    );

    let result = match pipeline.analyze_and_merge(&existing, &content).await {
        Ok(result) => result,
        Err(err) => {
            eprintln!("{}", guidance(&err));
            return Err(err.into());
        }
    };

    let added = result.places.len().saturating_sub(existing.len());
    let verified = result.places.iter().filter(|p| p.is_verified).count();
    let body = Catalogue::new(result.summary, result.places).to_json()?;

    let destination = output.or(catalogue).map(PathBuf::as_path);
    write_output(destination, &body)?;

    if let Some(path) = destination {
        println!(
            "analysis complete: {added} new places, {verified} verified, written to {}",
            path.display()
        );
    }
    Ok(())
}
