use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use catalog_manifest_core::{logging, CatalogExporter, Config, LogLevel};
use log::{info, warn};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "catalog-manifest")]
#[command(about = "Turn a catalog export into Shopify image manifests")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    run: RunArgs,
}

#[derive(Args, Clone, Default)]
struct RunArgs {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Directory containing catalogs/, styles/ and images/
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    /// Log image copies without writing them
    #[arg(long, global = true)]
    dry_run: bool,

    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Export every catalog: inventory CSVs, renamed images and manifests
    Run,

    /// Rebuild manifests from existing inventory CSVs
    Manifest,

    /// Generate default configuration file
    GenerateConfig {
        /// Path to save configuration file
        #[arg(default_value = "catalog-manifest.json")]
        path: PathBuf,
    },
}

/// Build the configuration from an optional file and command line overrides
fn load_config(args: &RunArgs) -> anyhow::Result<Config> {
    let mut config = match &args.config {
        Some(path) => Config::from_file(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => Config::default(),
    };

    if let Some(root) = &args.root {
        config.root = root.clone();
    }
    if args.dry_run {
        config.dry_run = true;
    }
    match args.verbose {
        0 => {}
        1 => config.log_level = LogLevel::Debug,
        _ => config.log_level = LogLevel::Trace,
    }

    config.validate()?;
    Ok(config)
}

fn init_logging(config: &Config) -> anyhow::Result<()> {
    logging::init_logger(&config.log_path(), config.log_level.to_level_filter())
        .map_err(|e| anyhow::anyhow!("initializing logger: {}", e))
}

fn main() -> anyhow::Result<()> {
    // Parse command line arguments
    let cli = Cli::parse();

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => {
            let config = load_config(&cli.run)?;
            init_logging(&config)?;

            let exporter = CatalogExporter::new(config);

            info!("Starting catalog export...");
            let summaries = exporter.run()?;
            info!("Export complete: {} catalogs processed", summaries.len());

            Ok(())
        }

        Commands::Manifest => {
            let config = load_config(&cli.run)?;
            init_logging(&config)?;

            let exporter = CatalogExporter::new(config);
            for (catalog, rows) in exporter.run_manifests() {
                match rows {
                    Some(rows) => info!("Catalog '{}': {} manifest rows", catalog, rows),
                    None => warn!("Catalog '{}': manifest not produced", catalog),
                }
            }

            Ok(())
        }

        Commands::GenerateConfig { path } => {
            let config = Config::default();
            config.save_to_file(&path)?;
            println!("Configuration file generated at: {}", path.display());
            Ok(())
        }
    }
}
