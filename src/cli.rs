use crate::{
    chunking::{ChunkParams, ChunkingStrategy},
    config::Config,
    engine::pdfium::probe_library,
    ocr::{MistralOcrClient, OcrClient},
    pipeline::Pipeline,
    report::SavedDocument,
    util::{ensure_dir, ensure_parent, list_inputs},
};
use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "policy-ingest")]
#[command(about = "Insurance policy ingestion: PDF/DOCX extraction, OCR fallback, cleaning and chunking")]
pub struct Args {
    #[command(subcommand)]
    pub cmd: Command,

    /// Path to config TOML. If omitted, uses ./policy-ingest.toml if present,
    /// else built-in defaults.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Override log level (trace/debug/info/warn/error).
    #[arg(long)]
    pub log_level: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Check that pdfium binds and the OCR key is present.
    Doctor {},
    /// Process a single PDF or DOCX.
    Process {
        #[arg(long)]
        input: PathBuf,
        #[arg(long, value_enum)]
        strategy: Option<ChunkingStrategy>,
        #[arg(long)]
        chunk_size: Option<usize>,
        #[arg(long)]
        overlap: Option<usize>,
        /// Write the document JSON here instead of stdout.
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Process every PDF and DOCX in a directory.
    Batch {
        #[arg(long)]
        dataset: Option<PathBuf>,
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

pub fn dispatch(args: Args) -> Result<()> {
    // A missing .env is fine; the key may come from the real environment.
    dotenvy::dotenv().ok();

    let cfg_path = resolve_config_path(args.config.as_deref())?;
    let cfg = match &cfg_path {
        Some(p) => Config::load(p)?,
        None => {
            let cfg = Config::default();
            cfg.validate()?;
            cfg
        }
    };

    let log_path = resolve_log_path(&cfg);
    let _guard = init_logging(&args, &cfg, log_path.as_deref())?;
    match &cfg_path {
        Some(p) => info!("config: {}", p.display()),
        None => info!("config: built-in defaults"),
    }

    match &args.cmd {
        Command::Doctor {} => doctor(&cfg, cfg_path.as_deref()),
        Command::Process {
            input,
            strategy,
            chunk_size,
            overlap,
            out,
        } => {
            let params = chunk_params(&cfg, *strategy, *chunk_size, *overlap)?;
            process(&cfg, input, &params, out.as_deref())
        }
        Command::Batch { dataset, out } => batch(&cfg, dataset.as_deref(), out.as_deref()),
    }
}

fn resolve_config_path(user: Option<&Path>) -> Result<Option<PathBuf>> {
    if let Some(p) = user {
        if !p.exists() {
            return Err(anyhow!("config file does not exist: {}", p.display()));
        }
        return Ok(Some(p.to_path_buf()));
    }
    let default = PathBuf::from("policy-ingest.toml");
    if default.exists() {
        Ok(Some(default))
    } else {
        Ok(None)
    }
}

fn init_logging(args: &Args, cfg: &Config, file_path: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let level = args
        .log_level
        .as_deref()
        .unwrap_or(cfg.logging.level.as_str());

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    // Logs go to stderr so `process` can print the document on stdout.
    let stdout_layer = if cfg.logging.json {
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_target(true)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .boxed()
    };

    let (file_layer, guard) = if let Some(path) = file_path {
        ensure_parent(path)?;
        let file = std::fs::File::create(path)
            .with_context(|| format!("create log file: {}", path.display()))?;
        let (non_blocking, guard) = tracing_appender::non_blocking(file);
        let layer = tracing_subscriber::fmt::layer()
            .with_writer(non_blocking)
            .with_ansi(false)
            .with_target(true)
            .boxed();
        (Some(layer), Some(guard))
    } else {
        (None, None)
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stdout_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow!("failed to init logging: {e}"))?;

    Ok(guard)
}

fn resolve_log_path(cfg: &Config) -> Option<PathBuf> {
    if !cfg.logging.write_to_file || cfg.logging.file_path.is_empty() {
        return None;
    }
    Some(PathBuf::from(&cfg.logging.file_path))
}

/// Command-line overrides on top of `[chunking]`, checked against the
/// configured size range and the overlap rule.
pub fn chunk_params(
    cfg: &Config,
    strategy: Option<ChunkingStrategy>,
    chunk_size: Option<usize>,
    overlap: Option<usize>,
) -> Result<ChunkParams> {
    let chunk_size = chunk_size.unwrap_or(cfg.chunking.chunk_size);
    let (min, max) = (cfg.chunking.min_chunk_size, cfg.chunking.max_chunk_size);
    if !(min..=max).contains(&chunk_size) {
        return Err(anyhow!(
            "chunk_size must be between {min} and {max}, got {chunk_size}"
        ));
    }
    let params = ChunkParams::new(
        strategy.unwrap_or(cfg.chunking.strategy),
        chunk_size,
        overlap.unwrap_or(cfg.chunking.overlap),
    )?;
    Ok(params)
}

/// OCR client for the run, or `None` when OCR is off or unusable.
fn build_ocr_client(cfg: &Config) -> Option<Arc<dyn OcrClient>> {
    if !cfg.extraction.use_ocr {
        return None;
    }
    match MistralOcrClient::from_config(&cfg.ocr) {
        Ok(client) => Some(Arc::new(client)),
        Err(err) => {
            warn!("OCR disabled: {err}");
            None
        }
    }
}

fn to_json<T: Serialize>(cfg: &Config, value: &T) -> Result<String> {
    let raw = if cfg.output.pretty_json {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    Ok(raw)
}

fn doctor(cfg: &Config, cfg_path: Option<&Path>) -> Result<()> {
    let lib_dir = Path::new(&cfg.paths.pdfium_lib_dir);
    let pdfium = match probe_library(lib_dir) {
        Ok(()) => serde_json::json!({ "ok": true }),
        Err(err) => serde_json::json!({ "ok": false, "error": format!("{err:#}") }),
    };
    let key_present = std::env::var(&cfg.ocr.api_key_env)
        .map(|v| !v.trim().is_empty())
        .unwrap_or(false);

    println!(
        "{}",
        serde_json::to_string_pretty(&serde_json::json!({
            "config": cfg_path.map(|p| p.display().to_string()),
            "pdfium": pdfium,
            "pdfium_lib_dir": cfg.paths.pdfium_lib_dir,
            "ocr": {
                "enabled": cfg.extraction.use_ocr,
                "api_key_env": cfg.ocr.api_key_env,
                "api_key_present": key_present,
                "model": cfg.ocr.model,
            },
        }))?
    );
    Ok(())
}

fn process(cfg: &Config, input: &Path, params: &ChunkParams, out: Option<&Path>) -> Result<()> {
    let pipeline = Pipeline::new(cfg, build_ocr_client(cfg))?;

    let doc = match pipeline.process_document(input, params) {
        Ok(doc) => doc,
        Err(err) => {
            println!(
                "{}",
                serde_json::to_string_pretty(&serde_json::json!({
                    "status": "failed",
                    "input": input,
                    "kind": err.kind(),
                    "reason": err.to_string(),
                }))?
            );
            return Err(err.into());
        }
    };

    let raw = to_json(cfg, &doc)?;
    match out {
        Some(path) => {
            ensure_parent(path)?;
            std::fs::write(path, raw).with_context(|| format!("writing {}", path.display()))?;
            info!("wrote {}", path.display());
            if cfg.global.print_summary {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&serde_json::json!({
                        "status": "ok",
                        "input": input,
                        "out": path,
                        "extraction_method": doc.metadata.extraction_method,
                        "chunk_count": doc.chunk_metadata.chunk_count,
                    }))?
                );
            }
        }
        None => println!("{raw}"),
    }
    Ok(())
}

fn batch(cfg: &Config, dataset: Option<&Path>, out: Option<&Path>) -> Result<()> {
    let dataset = dataset
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(&cfg.paths.dataset_dir));
    let out = out
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(&cfg.paths.output_path));

    if !dataset.is_dir() {
        return Err(anyhow!("dataset directory does not exist: {}", dataset.display()));
    }
    let inputs = list_inputs(&dataset)?;
    if inputs.is_empty() {
        warn!("no PDF or DOCX files in {}", dataset.display());
    }
    info!("{} documents in {}", inputs.len(), dataset.display());

    let pipeline = Pipeline::new(cfg, build_ocr_client(cfg))?;
    let params = pipeline.default_params();
    params.validate()?;
    let outcome = pipeline.process_batch(&inputs, &params);

    if cfg.output.write_documents_json {
        let saved: Vec<SavedDocument> = outcome.documents.iter().map(SavedDocument::from).collect();
        ensure_parent(&out)?;
        std::fs::write(&out, to_json(cfg, &saved)?)
            .with_context(|| format!("writing {}", out.display()))?;
        info!("saved {} documents to {}", saved.len(), out.display());
    }

    if cfg.output.write_report_json {
        let dir = out
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        ensure_dir(dir)?;
        let report_path = dir.join(&cfg.output.report_filename);
        std::fs::write(&report_path, to_json(cfg, &outcome.report)?)
            .with_context(|| format!("writing {}", report_path.display()))?;
        info!("report written to {}", report_path.display());
    }

    if cfg.global.print_summary {
        print!("{}", outcome.report.render_summary());
    }
    Ok(())
}
