use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use match_engine::config::Config;
use match_engine::extract::{ContentKind, DocumentKind, FeatureBundle, SystemClock};
use match_engine::pipeline::{Document, MatchPipeline};
use match_engine::scoring::top_k;
use match_engine::skills::SkillTaxonomy;

#[derive(Parser, Debug)]
#[command(name = "match-engine")]
#[command(about = "Resume/job match engine - feature extraction and match scoring")]
struct Args {
    /// Config file path
    #[arg(short, long, default_value = "config.yaml")]
    config: String,

    /// Log level
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Log format (text or json)
    #[arg(long, default_value = "text")]
    log_format: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Extract the feature bundle of a resume or job posting
    Extract {
        #[arg(short, long, value_enum)]
        kind: DocumentKind,
        file: PathBuf,
    },
    /// Extract contact details from a resume
    Contact { file: PathBuf },
    /// Rank job postings against a resume
    Match {
        #[arg(short, long)]
        resume: PathBuf,
        #[arg(short, long = "job", required = true)]
        jobs: Vec<PathBuf>,
        /// Only print the best N matches
        #[arg(short, long)]
        top: Option<usize>,
    },
    /// Score previously extracted feature bundles
    Score {
        #[arg(long)]
        resume_features: PathBuf,
        #[arg(long)]
        job_features: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(&args.log_level, &args.log_format)?;

    info!("Starting match-engine v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config = Config::load(&args.config).context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;
    info!("Configuration loaded");

    let taxonomy = Arc::new(
        SkillTaxonomy::load(config.taxonomy.path.as_deref())
            .context("Failed to load skill taxonomy")?,
    );

    let pipeline = MatchPipeline::from_config(taxonomy, &config, Arc::new(SystemClock));

    match args.command {
        Command::Extract { kind, file } => {
            let text = read_text(&file)?;
            let bundle = pipeline.extractor().extract(kind, &text);
            print_json(&bundle)
        }
        Command::Contact { file } => {
            let text = read_text(&file)?;
            print_json(&pipeline.extractor().extract_contact(&text))
        }
        Command::Match { resume, jobs, top } => {
            let resume = Document::new(document_id(&resume), read_text(&resume)?);
            let jobs = jobs
                .iter()
                .map(|path| Ok(Document::new(document_id(path), read_text(path)?)))
                .collect::<Result<Vec<_>>>()?;

            let mut results = pipeline.run(resume, jobs).await?;
            if let Some(top) = top {
                results = top_k(results, top);
            }
            print_json(&results)
        }
        Command::Score {
            resume_features,
            job_features,
        } => {
            let resume = read_bundle(&resume_features)?;
            let job = read_bundle(&job_features)?;
            let result = pipeline.scorer().match_result(
                &document_id(&resume_features),
                &resume,
                &document_id(&job_features),
                &job,
            );
            print_json(&result)
        }
    }
}

fn init_logging(level: &str, format: &str) -> Result<()> {
    let log_level = match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let builder = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_writer(std::io::stderr);

    // stdout carries the JSON results
    let installed = if format.eq_ignore_ascii_case("json") {
        tracing::subscriber::set_global_default(builder.json().finish())
    } else {
        tracing::subscriber::set_global_default(builder.finish())
    };
    installed.context("Failed to set tracing subscriber")
}

fn read_text(path: &Path) -> Result<String> {
    if let Some(kind) = ContentKind::from_path(path) {
        if !kind.is_plain_text() {
            bail!(
                "{} is a {:?} file; convert it to plain text first",
                path.display(),
                kind
            );
        }
    }
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

fn read_bundle(path: &Path) -> Result<FeatureBundle> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("Invalid feature bundle in {}", path.display()))
}

fn document_id(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{}", json);
    Ok(())
}
