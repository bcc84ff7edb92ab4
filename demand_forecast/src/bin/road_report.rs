use clap::{Parser, Subcommand};
use demand_forecast::config::{self, AppConfig};
use demand_forecast::{DataLoader, DemandPipeline, ForecastError, SegmentRepository};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::subscriber::SetGlobalDefaultError;

/// Traffic demand projection and intervention diagnosis for road segments
#[derive(Debug, Parser)]
#[command(name = "road_report", version)]
struct Cli {
    /// TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Segment dataset (CSV); overrides the configured path
    #[arg(long, global = true)]
    dataset: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List road identifiers
    Roads,
    /// List the segments of a road
    Segments {
        #[arg(long)]
        road: String,
    },
    /// Forecast and diagnose one segment
    Report {
        #[arg(long)]
        road: String,
        /// Segment label as printed by `segments`
        #[arg(long)]
        segment: String,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
}

fn init_tracing(level: tracing::Level) -> Result<(), SetGlobalDefaultError> {
    let subscriber = tracing_subscriber::fmt()
        .with_target(false)
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
}

/// Explicit config file, else `default_path` if it exists, else defaults
fn load_config(path: Option<&Path>, default_path: &Path) -> Result<AppConfig, ForecastError> {
    match path {
        Some(path) => config::load_from_path(path),
        None if default_path.exists() => config::load_from_path(default_path),
        None => Ok(AppConfig::default()),
    }
}

/// `--dataset` wins over `[dataset].path`
fn resolve_dataset(cli_dataset: Option<PathBuf>, config: &AppConfig) -> Result<PathBuf, ForecastError> {
    cli_dataset
        .or_else(|| config.dataset_path().map(PathBuf::from))
        .ok_or_else(|| {
            ForecastError::InvalidParameter(
                "no dataset given; pass --dataset or set [dataset].path".to_string(),
            )
        })
}

fn run<W: Write>(
    command: Command,
    dataset: &Path,
    config: &AppConfig,
    out: &mut W,
) -> Result<(), ForecastError> {
    let repository = DataLoader::from_csv(dataset)?;

    match command {
        Command::Roads => {
            for road in repository.roads() {
                writeln!(out, "{}", road)?;
            }
        }
        Command::Segments { road } => {
            let segments = repository.segments(&road);
            if segments.is_empty() {
                return Err(ForecastError::DataError(format!("unknown road '{}'", road)));
            }
            for segment in segments {
                writeln!(out, "{}", segment.label())?;
            }
        }
        Command::Report {
            road,
            segment,
            json,
        } => {
            let record = repository.find(&road, &segment).ok_or_else(|| {
                ForecastError::DataError(format!("no segment '{}' on road '{}'", segment, road))
            })?;
            let pipeline = DemandPipeline::from_config(config)?;
            let report = pipeline.run_segment(record)?;
            if json {
                writeln!(out, "{}", report.to_json()?)?;
            } else {
                write!(out, "{}", report)?;
            }
        }
    }

    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match load_config(cli.config.as_deref(), Path::new(config::DEFAULT_CONFIG_PATH)) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = init_tracing(config.log_level().unwrap_or(tracing::Level::INFO)) {
        eprintln!("warning: could not install the log subscriber: {}", e);
    }
    tracing::info!(version = demand_forecast::VERSION, "road_report starting");

    let result = resolve_dataset(cli.dataset, &config)
        .and_then(|dataset| run(cli.command, &dataset, &config, &mut io::stdout().lock()));

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Report aborted");
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const DATASET: &str = "\
ROL,NOMBRE DEL CAMINO,ESTACIÓN,TIPO DE CARPETA,TMDA 2015,TMDA 2017,TMDA 2018,TMDA 2020,TMDA 2022,TMDA 2024
L-11,Camino A,E-01,Asfalto,1000,1200,1300,1600,2000,2500
K-25,Camino Costero,E-250,Tierra,80,,95,,110,120
";

    fn write(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_second_subscriber_install_is_reported() {
        let _ = init_tracing(tracing::Level::WARN);
        assert!(init_tracing(tracing::Level::WARN).is_err());
    }

    #[test]
    fn test_load_config_fallbacks() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("road_report.toml");

        // No file at the default location
        let config = load_config(None, &missing).unwrap();
        assert_eq!(config, AppConfig::default());

        let default_path = write(&dir, "road_report.toml", "[model]\ndamping = 0.9\n");
        let config = load_config(None, &default_path).unwrap();
        assert_eq!(config.model.damping, 0.9);

        let explicit = write(&dir, "other.toml", "[model]\ndamping = 0.7\n");
        let config = load_config(Some(explicit.as_path()), &default_path).unwrap();
        assert_eq!(config.model.damping, 0.7);

        // An explicit path must exist
        assert!(matches!(
            load_config(Some(dir.path().join("nope.toml").as_path()), &default_path),
            Err(ForecastError::IoError(_))
        ));
    }

    #[test]
    fn test_dataset_flag_overrides_config() {
        let config = AppConfig::from_toml("[dataset]\npath = \"from_config.csv\"\n").unwrap();

        let chosen = resolve_dataset(Some(PathBuf::from("from_flag.csv")), &config).unwrap();
        assert_eq!(chosen, PathBuf::from("from_flag.csv"));

        let chosen = resolve_dataset(None, &config).unwrap();
        assert_eq!(chosen, PathBuf::from("from_config.csv"));

        assert!(matches!(
            resolve_dataset(None, &AppConfig::default()),
            Err(ForecastError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_list_commands() {
        let dir = TempDir::new().unwrap();
        let dataset = write(&dir, "segments.csv", DATASET);
        let config = AppConfig::default();

        let mut out = Vec::new();
        run(Command::Roads, &dataset, &config, &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "K-25\nL-11\n");

        let mut out = Vec::new();
        let command = Command::Segments {
            road: "L-11".to_string(),
        };
        run(command, &dataset, &config, &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "Camino A (E-01)\n");
    }

    #[test]
    fn test_report_command() {
        let dir = TempDir::new().unwrap();
        let dataset = write(&dir, "segments.csv", DATASET);

        let mut out = Vec::new();
        let command = Command::Report {
            road: "L-11".to_string(),
            segment: "Camino A (E-01)".to_string(),
            json: true,
        };
        run(command, &dataset, &AppConfig::default(), &mut out).unwrap();

        let json: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(json["kpis"]["current_year"], 2024);
    }

    #[test]
    fn test_unknown_road_or_segment_fails() {
        let dir = TempDir::new().unwrap();
        let dataset = write(&dir, "segments.csv", DATASET);
        let config = AppConfig::default();

        let command = Command::Segments {
            road: "R-0".to_string(),
        };
        assert!(matches!(
            run(command, &dataset, &config, &mut Vec::<u8>::new()),
            Err(ForecastError::DataError(_))
        ));

        let command = Command::Report {
            road: "L-11".to_string(),
            segment: "Camino A (E-99)".to_string(),
            json: false,
        };
        assert!(matches!(
            run(command, &dataset, &config, &mut Vec::<u8>::new()),
            Err(ForecastError::DataError(_))
        ));

        assert!(matches!(
            run(Command::Roads, &dir.path().join("missing.csv"), &config, &mut Vec::<u8>::new()),
            Err(ForecastError::IoError(_))
        ));
    }
}
