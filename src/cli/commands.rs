//! Command implementations.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::mpsc;

use crate::config::Config;
use crate::llm::InferenceClient;
use crate::models::Document;
use crate::synthesis::{SynthesisEvent, SynthesisService};

/// Generate a study guide from the given files.
pub async fn cmd_generate(config: Config, files: &[PathBuf], json: bool) -> anyhow::Result<()> {
    let documents = read_documents(files)?;
    println!(
        "{} Loaded {} document(s), {} words total",
        style("→").cyan(),
        documents.len(),
        documents.iter().map(|d| d.word_count).sum::<usize>()
    );

    let client = Arc::new(InferenceClient::new(config.inference));
    if client.connect().await {
        println!(
            "{} Connected to {} (model: {})",
            style("✓").green(),
            client.config().endpoint,
            client.current_model().unwrap_or_default()
        );
    } else {
        println!(
            "{} Inference service unavailable at {}; using heuristic fallback content",
            style("!").yellow(),
            client.config().endpoint
        );
    }

    let service = SynthesisService::new(client.clone(), config.synthesis);

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::with_template("{spinner} {msg}").unwrap());
    spinner.enable_steady_tick(Duration::from_millis(120));
    spinner.set_message("Synthesizing study guide...");

    let (event_tx, mut event_rx) = mpsc::channel::<SynthesisEvent>(32);
    let progress = spinner.clone();
    let printer = tokio::spawn(async move {
        while let Some(event) = event_rx.recv().await {
            match event {
                SynthesisEvent::Phase { phase } => {
                    progress.set_message(format!("Synthesizing ({})...", phase.as_str()));
                }
                SynthesisEvent::CategoryCompleted {
                    kind,
                    lines,
                    fell_back,
                } => {
                    let source = if fell_back { "fallback" } else { "ai" };
                    progress.println(format!(
                        "  {} {}: {} line(s) [{}]",
                        style("·").dim(),
                        kind.as_str(),
                        lines,
                        source
                    ));
                }
                SynthesisEvent::CacheHit => {
                    progress.println(format!(
                        "  {} served from result cache",
                        style("·").dim()
                    ));
                }
                _ => {}
            }
        }
    });

    let outcome = service.synthesize_with_events(&documents, event_tx).await?;
    let _ = printer.await;
    spinner.finish_and_clear();

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
        return Ok(());
    }

    for section in &outcome.sections {
        println!();
        println!("{}", style(&section.title).cyan().bold());
        print_list("Keywords", &section.keywords);
        print_list("Summaries", &section.summaries);
        print_list("Questions", &section.questions);
        print_list("Examples", &section.examples);
        print_list("Annotations", &section.annotations);
    }

    println!(
        "\n{} {} section(s) generated",
        style("✓").green(),
        outcome.sections.len()
    );
    Ok(())
}

/// List models reported by the inference service.
pub async fn cmd_models(config: Config) -> anyhow::Result<()> {
    let client = InferenceClient::new(config.inference);
    if !client.connect().await {
        print_unreachable(&client);
        return Ok(());
    }

    let models = client.models();
    let current = client.current_model().unwrap_or_default();
    println!(
        "{} {} model(s) at {}",
        style("✓").green(),
        models.len(),
        client.config().endpoint
    );
    for model in models {
        let marker = if model.name == current { "*" } else { " " };
        let size_mb = model.size_bytes / (1024 * 1024);
        let modified = model
            .modified_at
            .map(|dt| dt.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "-".to_string());
        println!("  {} {:<32} {:>8} MB  {}", marker, model.name, size_mb, modified);
    }
    Ok(())
}

/// Probe inference service availability.
pub async fn cmd_check(config: Config) -> anyhow::Result<()> {
    let client = InferenceClient::new(config.inference);
    if client.connect().await {
        println!(
            "{} Inference service reachable at {} (status: {}, model: {})",
            style("✓").green(),
            client.config().endpoint,
            client.status().as_str(),
            client.current_model().unwrap_or_default()
        );
    } else {
        print_unreachable(&client);
    }
    Ok(())
}

fn print_unreachable(client: &InferenceClient) {
    println!(
        "{} Inference service not available at {} (status: {})",
        style("✗").red(),
        client.config().endpoint,
        client.status().as_str()
    );
    println!("  Make sure the service is running: ollama serve");
}

/// Read each input file as one UTF-8 document.
fn read_documents(files: &[PathBuf]) -> anyhow::Result<Vec<Document>> {
    files
        .iter()
        .map(|path| {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("Cannot read {}", path.display()))?;
            Ok(Document::new(display_name(path), raw))
        })
        .collect()
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("document")
        .to_string()
}

fn print_list(label: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    println!("  {}", style(label).bold());
    for item in items {
        println!("    - {}", item);
    }
}
