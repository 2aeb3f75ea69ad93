use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

use covtree::cli;
use covtree::config::{Config, CONFIG_FILE};

/// Package outline and treemap datasets for coverage reports.
#[derive(Parser)]
#[command(name = "covtree", version, about)]
struct Cli {
    /// Path to the config file (optional; defaults apply when missing).
    #[arg(long, global = true, default_value = CONFIG_FILE)]
    config: PathBuf,

    /// Log debug output to stderr.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Options shared by every command that reads coverage files.
#[derive(Args)]
struct InputArgs {
    /// Coverage files (Clover XML, JaCoCo XML, or JSON facts).
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Override format detection (clover, jacoco, json).
    #[arg(long)]
    format: Option<String>,

    /// Label of the project root node.
    #[arg(long)]
    project_name: Option<String>,

    /// Keep one outline node per package segment.
    #[arg(long)]
    no_compact: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Write the package outline and treemap payload files.
    Build {
        #[command(flatten)]
        input: InputArgs,

        /// Output directory for the payload files.
        #[arg(long)]
        out_dir: Option<PathBuf>,

        /// Leave the generation time out of the treemap root id.
        #[arg(long)]
        no_timestamp: bool,
    },

    /// Show project-wide coverage totals.
    Summary {
        #[command(flatten)]
        input: InputArgs,
    },

    /// List coverage per package.
    Packages {
        #[command(flatten)]
        input: InputArgs,

        /// Sort by coverage ascending (show worst packages first).
        #[arg(long)]
        sort_by_coverage: bool,
    },

    /// Print both trees as JSON.
    Json {
        #[command(flatten)]
        input: InputArgs,
    },
}

impl InputArgs {
    fn apply(&self, config: &mut Config) {
        if let Some(format) = &self.format {
            config.format = Some(format.clone());
        }
        if let Some(name) = &self.project_name {
            config.project_name = name.clone();
        }
        if self.no_compact {
            config.compact_packages = false;
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut config = Config::load_or_default(&cli.config)
        .with_context(|| format!("Failed to load config {}", cli.config.display()))?;

    let output = match cli.command {
        Commands::Build {
            input,
            out_dir,
            no_timestamp,
        } => {
            input.apply(&mut config);
            if let Some(dir) = out_dir {
                config.output_dir = dir;
            }
            if no_timestamp {
                config.timestamp = false;
            }
            cli::cmd_build(&input.files, &config)?
        }
        Commands::Summary { input } => {
            input.apply(&mut config);
            cli::cmd_summary(&input.files, &config)?
        }
        Commands::Packages {
            input,
            sort_by_coverage,
        } => {
            input.apply(&mut config);
            cli::cmd_packages(&input.files, &config, sort_by_coverage)?
        }
        Commands::Json { input } => {
            input.apply(&mut config);
            cli::cmd_json(&input.files, &config)?
        }
    };

    print!("{output}");
    Ok(())
}
