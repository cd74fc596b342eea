use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use lexcon_eval::{render_table, EvaluationMode, Evaluator, LexconEvalConfig};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter, Registry};

#[derive(Parser)]
struct EvalArgs {
    /// Path of the configuration file, with a `lexcon_eval` section
    #[arg(short, long)]
    config_path: String,

    /// Constraint kind the outputs were generated with
    #[arg(short, long, value_enum, default_value_t = EvaluationMode::Template)]
    mode: EvaluationMode,

    /// Overrides the configured directory of result files
    #[arg(short, long)]
    output_dir: Option<PathBuf>,
}

/// Configure logging to the console
fn setup_logging() {
    let console_layer = fmt::layer()
        .with_target(true)
        .with_line_number(true)
        .with_file(true);

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,lexcon_eval=info"));

    Registry::default()
        .with(env_filter)
        .with(console_layer)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    setup_logging();

    let args = EvalArgs::parse();
    let mut config = LexconEvalConfig::from_file_path(&args.config_path)
        .with_context(|| format!("Failed to load configuration from {}", args.config_path))?;
    if let Some(output_dir) = args.output_dir {
        config.output_dir = output_dir;
    }

    info!(
        target = "lexcon_eval",
        event = "lexcon-eval-start",
        "Evaluating result files in {}, mode: {}",
        config.output_dir.display(),
        args.mode
    );

    let mut evaluator = Evaluator::new(config);
    let rows = evaluator
        .run(args.mode)
        .await
        .context("Failed to evaluate result files")?;

    print!("{}", render_table(&rows, args.mode));
    Ok(())
}
