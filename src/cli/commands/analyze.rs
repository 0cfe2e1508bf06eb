//! Analyze command - run the full video analysis pipeline.

use crate::analysis::AnalysisMode;
use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::VideoPipeline;
use crate::video_source::{parse_source_type, SourceResolver, SourceType};

/// Run the analyze command.
pub async fn run_analyze(
    source: &str,
    source_type: &str,
    mode: &str,
    prompt: Option<String>,
    output: Option<String>,
    settings: Settings,
) -> anyhow::Result<()> {
    let explicit = parse_source_type(source_type)?;
    let mode: AnalysisMode = mode.parse()?;

    // Classify up front so pre-flight only demands the tools this run needs.
    let classified = SourceResolver::new().classify(source, explicit);
    match classified {
        SourceType::YouTube => preflight::check(Operation::AnalyzeRemote)?,
        SourceType::File => preflight::check(Operation::AnalyzeLocal)?,
    }

    let pipeline = VideoPipeline::new(&settings)?;

    Output::info(&format!("Analyzing {} ({})...", source, classified));
    let outcome = pipeline
        .analyze(source, explicit, mode, prompt.as_deref())
        .await?;

    for warning in &outcome.warnings {
        Output::warning(warning);
    }

    match output {
        Some(path) => {
            std::fs::write(&path, &outcome.analysis.full_analysis)?;
            Output::success(&format!("Analysis written to {}", path));
        }
        None => {
            let title = outcome.title.as_deref().unwrap_or(source);
            Output::header(title);
            println!("{}", outcome.analysis.full_analysis);
            println!();
            Output::kv("Source type", &outcome.source_type.to_string());
            Output::kv("Mode", &outcome.mode.to_string());
            Output::kv("Size", &format!("{:.2} MB", outcome.video_size_mb));
            Output::kv("Model", &outcome.analysis.model_used);
        }
    }

    Ok(())
}
