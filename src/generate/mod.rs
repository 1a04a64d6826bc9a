//! `generate` command: translate text and write a bilingual book

use anyhow::{Context, Result};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::book::{Book, epub};
use crate::cli::{GenerateArgs, OutputFormat};
use crate::config::Config;
use crate::languages;
use crate::pipeline::{
    Orchestrator, PipelineObserver, PipelineOptions, ProgressUpdate, RunSummary, TranslatedBatch,
};
use crate::session::{self, Session, UiString};
use crate::translate::client::TranslationClient;
use crate::translate::endpoint::{GoogleEndpoint, TranslationEndpoint};
use crate::utils::format_duration;

const STDIN_BOOK_NAME: &str = "bilingual_book";

/// A text to translate and where its book goes.
struct Job {
    label: String,
    text: String,
    output: PathBuf,
}

/// Collects delivered batches into a book and drives the progress bar.
struct BookCollector<'a> {
    book: Book,
    bar: ProgressBar,
    session: &'a Session,
}

impl BookCollector<'_> {
    fn status(&self, progress: &ProgressUpdate) -> String {
        status_line(self.session, progress)
    }
}

impl PipelineObserver for BookCollector<'_> {
    fn on_start(&mut self, source_language: &str, progress: &ProgressUpdate) {
        self.book.set_source_language(source_language);
        self.bar.set_length(progress.total as u64);
        self.bar.set_message(self.status(progress));
    }

    fn on_batch(&mut self, batch: &TranslatedBatch, progress: &ProgressUpdate) {
        self.book.push_batch(batch);
        for column in batch.columns.iter().filter(|c| c.failed) {
            self.bar.suspend(|| {
                eprintln!(
                    "{}",
                    format!(
                        "[ERROR] Batch {} could not be translated to {}",
                        batch.index + 1,
                        column.language
                    )
                    .red()
                );
            });
        }
        self.bar.set_position(progress.completed as u64);
        self.bar.set_message(self.status(progress));
    }
}

/// `Translated: x / y (p%) | ETA: 1m 5s` in the session language.
fn status_line(session: &Session, progress: &ProgressUpdate) -> String {
    let eta = if progress.completed == 0 {
        session.text(UiString::Calculating).to_string()
    } else {
        format_duration(progress.remaining())
    };
    format!(
        "{}: {} / {} ({}%) | {}: {}",
        session.text(UiString::Translated),
        progress.completed,
        progress.total,
        progress.percent(),
        session.text(UiString::Eta),
        eta
    )
}

pub async fn run(args: GenerateArgs) -> Result<()> {
    let (mut cfg, config_loaded) = match Config::load() {
        Ok(cfg) => (cfg, true),
        Err(e) => {
            warn!("Could not load config, using defaults: {:#}", e);
            (Config::default(), false)
        }
    };

    let ui_language = session::resolve_ui_language(
        args.ui_lang.as_deref(),
        cfg.general.ui_language.as_deref(),
        session::system_locale().as_deref(),
    );
    if args.ui_lang.is_some() && config_loaded {
        session::remember_ui_language(&mut cfg, &ui_language);
    }

    // CLI > config > default
    if let Some(n) = args.batch_chars {
        cfg.pipeline.batch_char_budget = n;
    }
    if let Some(n) = args.max_in_flight {
        cfg.pipeline.max_in_flight = n;
    }
    let source = languages::normalize(
        args.source
            .as_deref()
            .unwrap_or(cfg.translation.source_language.as_str()),
    );
    let targets = target_languages(&args.targets, &cfg.translation.target_languages);
    if targets.is_empty() {
        anyhow::bail!(
            "No target languages given. Use -t <LANG> or set translation.target_languages"
        );
    }
    for code in targets.iter().chain(std::iter::once(&source)) {
        if code != languages::AUTO_DETECT && !languages::is_known(code) {
            println!(
                "{}",
                format!("[WARN] Unknown language code: {}", code).yellow()
            );
        }
    }

    let options = PipelineOptions::from_config(&cfg.pipeline, &cfg.translation.fallback_language);
    options.validate()?;

    let jobs = collect_jobs(&args, cfg.general.output_dir.as_deref().map(Path::new))?;
    if jobs.is_empty() {
        println!("{}", "[WARN] No .txt files found".yellow());
        return Ok(());
    }

    let endpoint: Arc<dyn TranslationEndpoint> = Arc::new(GoogleEndpoint::new(
        &cfg.translation.endpoint,
        Duration::from_secs(cfg.translation.timeout_secs),
    )?);

    let mut session = Session::new(&ui_language);
    session.localize(endpoint.as_ref()).await;
    debug!("Interface language: {}", session.ui_language());

    let client = TranslationClient::new(
        Arc::clone(&endpoint),
        cfg.pipeline.retry_length_ratio,
        session.text(UiString::TranslationError),
    );
    let orchestrator = Orchestrator::new(Arc::new(client), options);

    let title = args
        .title
        .clone()
        .or_else(|| cfg.book.title.clone())
        .unwrap_or_else(|| session.text(UiString::BilingualBook).to_string());
    let author = args.author.clone().unwrap_or_else(|| cfg.book.author.clone());

    let cancel = CancellationToken::new();
    let watcher = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        })
    };

    println!(
        "{}",
        format!(
            "[Generate] {} -> {} via {}",
            describe(&source),
            targets.iter().map(|t| describe(t)).collect::<Vec<_>>().join(", "),
            endpoint.name()
        )
        .green()
    );

    for job in jobs {
        println!("{}", format!("[Generate] {}", job.label).green());

        let bar = ProgressBar::new(0);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {msg}")?
                .progress_chars("=>-"),
        );
        bar.enable_steady_tick(Duration::from_millis(100));

        let mut collector = BookCollector {
            book: Book::new(
                title.clone(),
                author.clone(),
                targets.clone(),
                session.text(UiString::TranslationError),
            ),
            bar,
            session: &session,
        };

        let summary = orchestrator
            .run(&job.text, &source, &targets, &cancel, &mut collector)
            .await?;
        collector.bar.finish_and_clear();

        if collector.book.is_empty() {
            println!("{}", "[WARN] Nothing was translated".yellow());
        } else {
            write_book(&collector.book, args.format, &job.output)?;
            print_summary(&summary);
            println!(
                "{}",
                format!("[OK] Wrote {}", job.output.display()).green()
            );
        }

        if summary.cancelled {
            println!(
                "{}",
                format!(
                    "[WARN] Cancelled after {} of {} batch(es)",
                    summary.delivered_batches, summary.total_batches
                )
                .yellow()
            );
            break;
        }
    }

    watcher.abort();
    if !cancel.is_cancelled() {
        println!("{}", session.text(UiString::TranslationFinished).green());
    }

    Ok(())
}

/// `French (fr)` for known codes, the bare code otherwise.
fn describe(code: &str) -> String {
    match languages::name(code) {
        Some(name) => format!("{} ({})", name, code),
        None => code.to_string(),
    }
}

/// CLI targets when given, otherwise the configured ones; normalized and
/// without duplicates.
fn target_languages(cli: &[String], configured: &[String]) -> Vec<String> {
    let requested = if cli.is_empty() { configured } else { cli };
    let mut targets: Vec<String> = Vec::new();
    for code in requested
        .iter()
        .flat_map(|value| value.split(','))
        .map(str::trim)
        .filter(|code| !code.is_empty())
        .map(languages::normalize)
    {
        if !targets.contains(&code) {
            targets.push(code);
        }
    }
    targets
}

fn collect_jobs(args: &GenerateArgs, output_dir: Option<&Path>) -> Result<Vec<Job>> {
    let input = &args.input;
    let format = args.format;

    if input.as_os_str() == "-" {
        let text = crate::segment::read_source(input)?;
        let name = format!("{}.{}", STDIN_BOOK_NAME, format.extension());
        let output = match (&args.output, output_dir) {
            (Some(path), _) if path.is_dir() => path.join(name),
            (Some(path), _) => path.clone(),
            (None, Some(dir)) => dir.join(name),
            (None, None) => PathBuf::from(name),
        };
        return Ok(vec![Job {
            label: "<stdin>".to_string(),
            text,
            output,
        }]);
    }

    if input.is_file() {
        let text = crate::segment::read_source(input)?;
        let output = match &args.output {
            Some(path) if path.is_dir() => path.join(book_file_name(input, format)),
            Some(path) => path.clone(),
            None => default_output(input, output_dir, format),
        };
        return Ok(vec![Job {
            label: input.display().to_string(),
            text,
            output,
        }]);
    }

    if input.is_dir() {
        let walker = if args.recursive {
            WalkDir::new(input)
        } else {
            WalkDir::new(input).max_depth(1)
        };

        let mut files: Vec<PathBuf> = walker
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .map(|e| e.into_path())
            .filter(|p| p.extension().map(|ext| ext == "txt").unwrap_or(false))
            .collect();
        files.sort();

        let mut jobs = Vec::with_capacity(files.len());
        for path in files {
            let text = fs::read_to_string(&path)
                .context(format!("Failed to read {}", path.display()))?;
            let output = match &args.output {
                Some(base) => {
                    let rel = path.strip_prefix(input).unwrap_or(&path);
                    base.join(rel).with_extension(format.extension())
                }
                None => default_output(&path, output_dir, format),
            };
            jobs.push(Job {
                label: path.display().to_string(),
                text,
                output,
            });
        }
        return Ok(jobs);
    }

    anyhow::bail!("Input path does not exist: {}", input.display());
}

fn book_file_name(input: &Path, format: OutputFormat) -> String {
    let stem = input.file_stem().unwrap_or_default().to_string_lossy();
    format!("{}_bilingual.{}", stem, format.extension())
}

fn default_output(input: &Path, output_dir: Option<&Path>, format: OutputFormat) -> PathBuf {
    let name = book_file_name(input, format);
    match output_dir {
        Some(dir) => dir.join(name),
        None => input.with_file_name(name),
    }
}

fn write_book(book: &Book, format: OutputFormat, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).context("Failed to create output directory")?;
        }
    }

    match format {
        OutputFormat::Epub => epub::write_epub(book, path),
        OutputFormat::Html => {
            fs::write(path, book.render_html()).context("Failed to write output file")
        }
        OutputFormat::Text => {
            fs::write(path, book.render_text()).context("Failed to write output file")
        }
    }
}

fn print_summary(summary: &RunSummary) {
    println!(
        "  {} sentence(s) in {} batch(es) from {} in {}",
        summary.delivered_sentences,
        summary.delivered_batches,
        summary.source_language,
        format_duration(summary.elapsed)
    );
    if summary.retried_requests > 0 {
        println!(
            "  {} request(s) retried after a suspiciously short answer",
            summary.retried_requests
        );
    }
    if summary.failed_cells > 0 {
        println!(
            "{}",
            format!(
                "  {} translation(s) replaced by the error placeholder",
                summary.failed_cells
            )
            .yellow()
        );
    }
}
