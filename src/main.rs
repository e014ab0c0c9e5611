//! CLI entry point for PHP test discovery.
//!
//! Provides commands for parsing a single test file, sweeping a project for
//! tests and managing the `.phptest` configuration.

use clap::{
    Parser, Subcommand,
    builder::styling::{AnsiColor, Effects, Styles},
};
use phptest::io::{ExitCode, OutputFormat, OutputManager};
use phptest::{DiscoveryError, Settings, TestParser, discover, logging};
use std::path::PathBuf;

fn clap_cargo_style() -> Styles {
    Styles::styled()
        .header(AnsiColor::Cyan.on_default() | Effects::BOLD)
        .usage(AnsiColor::Cyan.on_default() | Effects::BOLD)
        .literal(AnsiColor::Green.on_default())
        .placeholder(AnsiColor::Green.on_default())
}

/// PHP test discovery
#[derive(Parser)]
#[command(
    name = "phptest",
    version = env!("CARGO_PKG_VERSION"),
    about = "Discover PHPUnit and Pest tests",
    long_about = "Parse PHP test files into trees of namespaces, classes, tests and data sets.",
    next_line_help = true,
    styles = clap_cargo_style()
)]
struct Cli {
    /// Path to custom settings.toml file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Project root used for Pest class names (overrides test_root)
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create .phptest/settings.toml with default values
    Init {
        /// Overwrite an existing configuration file
        #[arg(short, long)]
        force: bool,
    },

    /// Display active settings
    Config,

    /// Parse one PHP file and print its tests
    Parse {
        /// File to parse
        file: PathBuf,

        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Find all test files under the test root
    Discover {
        /// Directory to search instead of the configured include paths
        path: Option<PathBuf>,

        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },
}

fn load_settings(cli: &Cli) -> Result<Settings, DiscoveryError> {
    let loaded = match &cli.config {
        Some(path) => Settings::load_from(path),
        None => Settings::load(),
    };
    let mut settings = loaded.map_err(|e| DiscoveryError::ConfigError {
        reason: e.to_string(),
    })?;

    if cli.debug {
        settings.debug = true;
    }
    if let Some(root) = &cli.root {
        settings.test_root = root.clone();
    }
    Ok(settings)
}

async fn run(cli: Cli, settings: Settings) -> Result<ExitCode, DiscoveryError> {
    let io_error = |path: PathBuf| {
        move |source: std::io::Error| DiscoveryError::FileWrite { path, source }
    };

    match cli.command {
        Commands::Init { force } => {
            let path = Settings::init_config_file(force).map_err(|e| {
                DiscoveryError::ConfigError {
                    reason: e.to_string(),
                }
            })?;
            println!("Created configuration file at: {}", path.display());
            Ok(ExitCode::Success)
        }

        Commands::Config => {
            let rendered =
                toml::to_string_pretty(&settings).map_err(|e| DiscoveryError::ConfigError {
                    reason: e.to_string(),
                })?;
            println!("{rendered}");
            Ok(ExitCode::Success)
        }

        Commands::Parse { file, json } => {
            let mut output = OutputManager::new(OutputFormat::from_json_flag(json));
            let mut parser = TestParser::from_settings(&settings).map_err(|source| {
                DiscoveryError::Parse {
                    path: file.clone(),
                    source,
                }
            })?;

            let tests = parser.try_parse_file(&file).await?;
            output.parsed(&file, tests).map_err(io_error(file))
        }

        Commands::Discover { path, json } => {
            let mut output = OutputManager::new(OutputFormat::from_json_flag(json));
            let mut settings = settings;
            if let Some(path) = &path {
                settings.discovery.include = vec![path.clone()];
            }
            let searched = settings
                .discovery
                .include
                .iter()
                .map(|p| p.display().to_string())
                .collect::<Vec<_>>()
                .join(", ");

            let report = discover(&settings).await?;
            output
                .report(&report, &searched)
                .map_err(io_error(PathBuf::from("<stdout>")))
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let json = matches!(
        cli.command,
        Commands::Parse { json: true, .. } | Commands::Discover { json: true, .. }
    );
    let mut output = OutputManager::new(OutputFormat::from_json_flag(json));

    let settings = match load_settings(&cli) {
        Ok(settings) => settings,
        Err(e) => {
            let code = output.error(&e).unwrap_or(ExitCode::ConfigError);
            std::process::exit(code.into());
        }
    };
    logging::init(&settings);

    let code = match run(cli, settings).await {
        Ok(code) => code,
        Err(e) => output
            .error(&e)
            .unwrap_or_else(|_| ExitCode::from_error(&e)),
    };
    std::process::exit(code.into());
}
