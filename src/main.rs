use anyhow::Result;
use clap::Parser;
use class_deps::cli::{Cli, Commands, InputArgs};
use class_deps::config::{AnalysisConfig, load_config, resolve_config_path};
use class_deps::report::{CycleReport, Report, write_output};
use std::path::Path;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match &cli.command {
        Commands::Analyze {
            input,
            group_by,
            format,
            output,
        } => {
            let config = resolve_config(cli.config.as_deref(), input)?;
            let analysis = config.analyzer().analyze();
            let content = Report::new(&analysis, *group_by).render(*format)?;
            write_output(&content, output.as_deref())?;
        }
        Commands::Cycles {
            input,
            format,
            output,
        } => {
            let config = resolve_config(cli.config.as_deref(), input)?;
            let analysis = config.analyzer().analyze();
            let content = CycleReport::new(&analysis).render(*format)?;
            write_output(&content, output.as_deref())?;
        }
    }

    Ok(())
}

/// Logs go to stderr so stdout stays machine-readable.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn resolve_config(cli_path: Option<&Path>, input: &InputArgs) -> Result<AnalysisConfig> {
    let config = match resolve_config_path(cli_path)? {
        Some(path) => {
            tracing::debug!(path = %path.display(), "loading config");
            load_config(&path)?
        }
        None => AnalysisConfig::default(),
    };
    let config = config.merge(input);
    if config.paths.is_empty() {
        anyhow::bail!("No input paths given (pass PATH arguments or set \"paths\" in the config file)");
    }
    Ok(config)
}
