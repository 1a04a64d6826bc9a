//! Text segmentation: split into sentences, merge fragments, pack into batches

pub mod merger;
pub mod packer;
pub mod splitter;

use anyhow::{Context, Result};
use colored::Colorize;
use std::io::Read;
use std::path::Path;

use crate::cli::SegmentArgs;
use crate::config::Config;
use crate::utils::truncate_display;
pub use packer::Batch;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegmentOptions {
    pub batch_char_budget: usize,
    pub merge_min_length: usize,
}

impl Default for SegmentOptions {
    fn default() -> Self {
        Self {
            batch_char_budget: crate::config::DEFAULT_BATCH_CHAR_BUDGET,
            merge_min_length: crate::config::DEFAULT_MERGE_MIN_LENGTH,
        }
    }
}

/// Split, merge and pack `text` into ordered batches.
pub fn segment(text: &str, options: SegmentOptions) -> Vec<Batch> {
    let sentences = splitter::split(text);
    let merged = merger::merge(&sentences, options.merge_min_length);
    tracing::debug!(
        "Segmented {} candidate sentences into {} after merging",
        sentences.len(),
        merged.len()
    );
    packer::pack(merged, options.batch_char_budget)
}

/// Read source text from a file, or from stdin when the path is `-`.
pub fn read_source(path: &Path) -> Result<String> {
    if path.as_os_str() == "-" {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("Failed to read source text from stdin")?;
        return Ok(text);
    }
    std::fs::read_to_string(path).context(format!("Failed to read {}", path.display()))
}

pub fn run(args: SegmentArgs) -> Result<()> {
    let cfg = Config::load().unwrap_or_default();
    let options = SegmentOptions {
        batch_char_budget: args
            .batch_chars
            .unwrap_or(cfg.pipeline.batch_char_budget),
        merge_min_length: args.merge_min.unwrap_or(cfg.pipeline.merge_min_length),
    };
    if options.batch_char_budget == 0 {
        anyhow::bail!("Batch character budget must be greater than zero");
    }

    let text = read_source(&args.input)?;
    let batches = segment(&text, options);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&batches)?);
        return Ok(());
    }

    let total: usize = batches.iter().map(Batch::len).sum();
    println!(
        "{}",
        format!(
            "[Segment] {} sentence(s) in {} batch(es)",
            total,
            batches.len()
        )
        .green()
    );

    for batch in &batches {
        println!(
            "{}",
            format!(
                "Batch {} ({} sentences, {} chars)",
                batch.index + 1,
                batch.len(),
                batch.packed_len()
            )
            .cyan()
        );
        for (i, sentence) in batch.sentences.iter().enumerate() {
            println!("  {:>3}. {}", i + 1, truncate_display(sentence.trim(), 100));
        }
    }

    Ok(())
}
