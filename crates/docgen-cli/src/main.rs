//! Docgen CLI - Generate Markdown documentation from source comments

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use docgen_core::{Config, Generator, RunOutcome};

#[derive(Parser, Debug)]
#[command(name = "docgen")]
#[command(version = docgen_core::VERSION)]
#[command(about = "Generate documentation from commands embedded in source comments", long_about = None)]
struct Cli {
    /// Output directory (overrides `output-dir` from docgen.toml)
    output_dir: Option<PathBuf>,

    /// Project root containing the template and sources
    #[arg(short = 'C', long, default_value = ".")]
    root: PathBuf,

    /// Template file, relative to the project root
    #[arg(short, long)]
    template: Option<PathBuf>,

    /// Load configuration from this file instead of <root>/docgen.toml
    #[arg(long)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, conflicts_with = "quiet")]
    verbose: u8,

    /// Only log errors
    #[arg(short, long)]
    quiet: bool,
}

impl Cli {
    /// Default log filter; `RUST_LOG` takes precedence
    fn log_filter(&self) -> &'static str {
        if self.quiet {
            return "error";
        }
        match self.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }

    /// Load the configuration and apply command-line overrides
    fn load_config(&self) -> Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::from_path(path)
                .with_context(|| format!("Failed to load config '{}'", path.display()))?,
            None => Config::load(&self.root).with_context(|| {
                format!("Failed to load config from '{}'", self.root.display())
            })?,
        };

        if let Some(template) = &self.template {
            config.template.clone_from(template);
        }
        if let Some(output_dir) = &self.output_dir {
            config.output_dir.clone_from(output_dir);
        }

        config.validate().context("Invalid configuration")?;
        Ok(config)
    }
}

fn init_logging(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_filter());

    let config = cli.load_config()?;
    let generator = Generator::new(&cli.root, config);

    // Reported problems do not change the exit status
    let outcome = generator.run().context("Documentation generation failed")?;
    if let RunOutcome::Generated { path, .. } = outcome {
        println!("{}", path.display());
    }

    Ok(())
}
