//! Orchestration: plan, dispatch, merge, print

use anyhow::{Context, Result};
use serde::Serialize;

use chunkscribe_core::{
    CancelToken, Chunk, CutKind, GroqProvider, MergeDiagnostics, MergedWord, PlanStatus,
    WavExtractor, WavProbe, merge, plan, transcribe_all, validate_api_key,
};

use crate::args::Cli;
use crate::hooks::CliHooks;

/// JSON output shape for `--json`
#[derive(Serialize)]
struct TranscriptReport {
    text: String,
    words: Vec<MergedWord>,
    diagnostics: MergeDiagnostics,
    status: PlanStatus,
    chunks_succeeded: usize,
    chunks_total: usize,
}

pub async fn run(cli: Cli) -> Result<()> {
    let config = cli.to_config();

    let mut probe = WavProbe::open(&cli.file)
        .with_context(|| format!("Failed to open {}", cli.file.display()))?;

    chunkscribe_core::info!("Planning chunks for {}", cli.file.display());
    let progress = |pct: f64| {
        chunkscribe_core::verbose!("Planning: {pct:.0}%");
    };
    let chunks = plan(&mut probe, &config, Some(&progress))?;
    chunkscribe_core::info!("Planned {} chunk(s)", chunks.len());

    if cli.plan_only {
        print_plan(&chunks);
        return Ok(());
    }

    let api_key = resolve_api_key(&cli)?;
    let mut extractor = WavExtractor::new(&cli.file, config.max_chunk_bytes);
    let backend = GroqProvider;
    let hooks = CliHooks::new(chunks.len());

    let cancel = CancelToken::new();
    let ctrl_c_token = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            chunkscribe_core::warn!("Interrupt received, finishing current work...");
            ctrl_c_token.cancel();
        }
    });

    let outcome = transcribe_all(
        &chunks,
        &mut extractor,
        &backend,
        &api_key,
        &config,
        &hooks,
        &cancel,
    )
    .await?;

    let merged = merge(&outcome.results);

    match outcome.status {
        PlanStatus::Completed => {}
        PlanStatus::PartiallyCompleted => chunkscribe_core::warn!(
            "{} of {} chunks succeeded; transcript is best-effort",
            outcome.succeeded(),
            chunks.len()
        ),
        PlanStatus::Cancelled => chunkscribe_core::warn!(
            "Cancelled after {} of {} chunks; transcript is partial",
            outcome.succeeded(),
            chunks.len()
        ),
    }
    if merged.diagnostics.overlaps_merged > 0 {
        chunkscribe_core::verbose!(
            "Merged {} overlap(s), dropped {} duplicated word(s)",
            merged.diagnostics.overlaps_merged,
            merged.diagnostics.words_dropped
        );
    }

    if cli.json {
        let report = TranscriptReport {
            text: merged.text,
            words: merged.words,
            diagnostics: merged.diagnostics,
            status: outcome.status,
            chunks_succeeded: outcome.succeeded(),
            chunks_total: chunks.len(),
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", merged.text);
    }

    Ok(())
}

fn resolve_api_key(cli: &Cli) -> Result<String> {
    let api_key = match &cli.api_key {
        Some(key) => key.clone(),
        None => {
            dotenvy::dotenv().ok();
            std::env::var("GROQ_API_KEY").map_err(|_| {
                anyhow::anyhow!(
                    "No API key configured. Pass --api-key or set GROQ_API_KEY"
                )
            })?
        }
    };

    if let Err(reason) = validate_api_key(&api_key) {
        chunkscribe_core::warn!("API key looks wrong ({reason}); trying anyway");
    }
    chunkscribe_core::verbose!("Using API key {}", mask_key(&api_key));
    Ok(api_key)
}

/// Mask an API key for display (show first 6 and last 4 chars)
fn mask_key(key: &str) -> String {
    if key.len() > 10 {
        format!("{}...{}", &key[..6], &key[key.len() - 4..])
    } else {
        "***".to_string()
    }
}

fn print_plan(chunks: &[Chunk]) {
    println!("{:>5}  {:>18}  {:>18}  {:>9}  cut", "chunk", "logical", "actual", "overlap");
    for chunk in chunks {
        let cut = match chunk.cut_kind {
            CutKind::Silence => "silence",
            CutKind::Exact => "exact",
            CutKind::End => "end",
        };
        println!(
            "{:>5}  {:>8.1}-{:>8.1}s  {:>8.1}-{:>8.1}s  {:>3.0}s/{:>3.0}s  {cut}",
            chunk.index,
            chunk.logical_start,
            chunk.logical_end,
            chunk.actual_start,
            chunk.actual_end,
            chunk.leading_overlap(),
            chunk.trailing_overlap(),
        );
    }
}
