use std::io;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use mailprio_ai::{ArtifactPaths, InferenceContext};
use mailprio_core::{Config, Threshold};
use tracing_subscriber::EnvFilter;

mod display;
mod interactive;
mod train;

#[derive(Parser)]
#[command(name = "mailprio", version)]
#[command(about = "Classify email as important or not important")]
struct Cli {
    /// Config file (default: ./mailprio.toml if present)
    #[arg(long, global = true, env = "MAILPRIO_CONFIG")]
    config: Option<PathBuf>,

    /// Artifact directory (overrides config)
    #[arg(long, global = true, env = "MAILPRIO_MODELS")]
    models: Option<PathBuf>,

    /// Score with an ONNX model instead of the native network
    #[cfg(feature = "onnx")]
    #[arg(long, global = true)]
    onnx_model: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Fit the vectorizer and network on a labelled CSV and save artifacts
    Train {
        /// CSV with subject, body, label columns (overrides config)
        #[arg(long)]
        data: Option<PathBuf>,
    },
    /// Classify a single email
    Classify {
        #[arg(short, long, default_value = "")]
        subject: String,
        #[arg(short, long, default_value = "")]
        body: String,
        /// Importance threshold in percent (30-90)
        #[arg(short, long, default_value_t = Threshold::DEFAULT)]
        threshold: Threshold,
        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Prompt for emails on stdin and classify each one
    Interactive {
        /// Starting threshold in percent (30-90)
        #[arg(short, long, default_value_t = Threshold::DEFAULT)]
        threshold: Threshold,
    },
    /// Show artifact dimensions and the stored training report
    Inspect,
}

fn init_logging(default_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

/// ONNX model requested on the command line, if any.
#[cfg(feature = "onnx")]
fn onnx_model(cli: &Cli) -> Option<&Path> {
    cli.onnx_model.as_deref()
}

#[cfg(not(feature = "onnx"))]
fn onnx_model(_cli: &Cli) -> Option<&Path> {
    None
}

fn load_context(cli: &Cli, paths: &ArtifactPaths) -> anyhow::Result<InferenceContext> {
    if let Some(model_path) = onnx_model(cli) {
        return load_onnx_context(model_path, paths);
    }
    paths
        .load_context()
        .with_context(|| format!("loading artifacts from {}", paths.vectorizer.display()))
}

#[cfg(feature = "onnx")]
fn load_onnx_context(model_path: &Path, paths: &ArtifactPaths) -> anyhow::Result<InferenceContext> {
    let vectorizer = paths
        .load_vectorizer()
        .with_context(|| format!("loading {}", paths.vectorizer.display()))?;
    let model = mailprio_ai::OnnxModel::load(model_path)?;
    Ok(InferenceContext::new(vectorizer, model)?)
}

#[cfg(not(feature = "onnx"))]
fn load_onnx_context(model_path: &Path, _paths: &ArtifactPaths) -> anyhow::Result<InferenceContext> {
    anyhow::bail!("{} requested but built without the onnx feature", model_path.display())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = Config::resolve(cli.config.as_deref()).context("reading config")?;
    init_logging(&config.logging.level);
    tracing::debug!("mailprio v{}", env!("CARGO_PKG_VERSION"));

    let model_dir = cli.models.clone().unwrap_or_else(|| config.artifacts.dir.clone());
    let paths = ArtifactPaths::in_dir(&model_dir);

    match &cli.command {
        Command::Train { data } => {
            let data = data.clone().unwrap_or_else(|| config.data.csv_path.clone());
            let stats = train::run_training(&data, &paths)?;
            println!("Test Accuracy: {:.2}%", stats.test_accuracy * 100.0);
            println!(
                "Trained on {} rows in {:.1}s. Model & vectorizer saved to {}.",
                stats.rows,
                stats.elapsed_secs,
                model_dir.display()
            );
        }
        Command::Classify {
            subject,
            body,
            threshold,
            json,
        } => {
            let ctx = load_context(&cli, &paths)?;
            let outcome = ctx.classify(subject, body, *threshold)?;
            display::write_outcome(&mut io::stdout().lock(), &mut io::stderr().lock(), &outcome, *json)?;
        }
        Command::Interactive { threshold } => {
            let ctx = load_context(&cli, &paths)?;
            interactive::run(&ctx, *threshold, &mut io::stdin().lock(), &mut io::stdout().lock())?;
        }
        Command::Inspect => {
            let ctx = load_context(&cli, &paths)?;
            println!("=== {} ===", model_dir.display());
            println!("  {:<18} {}", "feature_dim", ctx.feature_dim());
            match onnx_model(&cli) {
                Some(model_path) => println!("  {:<18} onnx ({})", "scorer", model_path.display()),
                None => {
                    let network = paths.load_network()?;
                    println!("  {:<18} native", "scorer");
                    println!("  {:<18} {}", "parameters", network.param_count());
                }
            }
            println!();
            match paths.load_report()? {
                Some(report) => display::write_report(&mut io::stdout().lock(), &report)?,
                None => println!("No training report found."),
            }
        }
    }

    Ok(())
}
