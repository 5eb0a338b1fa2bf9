//! im CLI
//!
//! Score a response file, run the offline benchmark, check a catalog or dump
//! the default engine configuration.

#[cfg(feature = "cli")]
use anyhow::{Context, Result};
#[cfg(feature = "cli")]
use clap::{Parser, Subcommand, ValueEnum};
#[cfg(feature = "cli")]
use im_core::api::ResponseInput;
#[cfg(feature = "cli")]
use im_core::{
    default_catalog, validate_catalog, BenchmarkOptions, BenchmarkReport, Engine, EngineConfig,
    FitMethod, ItemCatalog, ResponseSet,
};
#[cfg(feature = "cli")]
use std::path::{Path, PathBuf};
#[cfg(feature = "cli")]
use tracing::info;
#[cfg(feature = "cli")]
use tracing_subscriber::EnvFilter;

#[cfg(feature = "cli")]
#[derive(Parser)]
#[command(name = "im")]
#[command(about = "Big5 scoring, type mapping and calibration benchmark", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[cfg(feature = "cli")]
#[derive(Clone, Copy, ValueEnum)]
enum Method {
    Isotonic,
    Platt,
}

#[cfg(feature = "cli")]
impl From<Method> for FitMethod {
    fn from(m: Method) -> Self {
        match m {
            Method::Isotonic => FitMethod::Isotonic,
            Method::Platt => FitMethod::Platt,
        }
    }
}

#[cfg(feature = "cli")]
#[derive(Subcommand)]
enum Commands {
    /// Score one response file (JSON list or id → answer map)
    Score {
        /// Input JSON file path
        #[arg(long)]
        input: PathBuf,

        /// Engine config (YAML, or JSON by extension)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Run the pipeline twice and compare hashes
        #[arg(long, default_value = "false")]
        guarded: bool,
    },

    /// Run the synthetic benchmark and fit calibration parameters
    Bench {
        #[arg(long, default_value_t = im_core::benchmark::DEFAULT_SEED)]
        seed: u64,

        #[arg(long, default_value_t = im_core::benchmark::DEFAULT_REPEATS)]
        repeats: usize,

        /// Fitting family for the MBTI axes
        #[arg(long, value_enum, default_value = "isotonic")]
        method: Method,

        /// Engine config (YAML, or JSON by extension)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Write the full JSON report here
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Check a catalog file (JSON) or the built-in catalog
    ValidateCatalog {
        #[arg(long)]
        catalog: Option<PathBuf>,
    },

    /// Print the default engine config as YAML
    DefaultConfig {
        /// Write to a file instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

#[cfg(feature = "cli")]
fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Score { input, config, guarded } => {
            let engine = build_engine(config.as_deref())?;
            let responses = read_responses(&input)?;
            let result = if guarded {
                engine.score_guarded(&responses, None)?
            } else {
                engine.score(&responses)?
            };
            println!("{}", serde_json::to_string_pretty(&result)?);
        }

        Commands::Bench { seed, repeats, method, config, output } => {
            let engine = build_engine(config.as_deref())?;
            let options = BenchmarkOptions {
                seed,
                repeats,
                method: method.into(),
                ..BenchmarkOptions::default()
            };
            let report = im_core::run_benchmark(&engine, &options)?;
            print_report(&report);

            if let Some(path) = output {
                save_json(&path, &report)?;
            }
            if !report.verdict.passed {
                anyhow::bail!("benchmark thresholds failed: {}", report.verdict.failures.join("; "));
            }
        }

        Commands::ValidateCatalog { catalog } => {
            let catalog = match catalog {
                Some(path) => read_catalog(&path)?,
                None => default_catalog().clone(),
            };
            let stats = validate_catalog(&catalog)
                .with_context(|| format!("catalog {} is structurally invalid", catalog.version))?;
            println!("✅ Catalog {} is valid", stats.version);
            println!("   Items:         {}", stats.total_items);
            println!(
                "   Reverse-keyed: {} ({:.1}%)",
                stats.reverse_items,
                stats.reverse_ratio * 100.0
            );
        }

        Commands::DefaultConfig { output } => {
            let yaml = EngineConfig::default().to_yaml()?;
            match output {
                Some(path) => {
                    std::fs::write(&path, yaml)
                        .with_context(|| format!("cannot write {}", path.display()))?;
                    info!(path = %path.display(), "default config written");
                }
                None => print!("{yaml}"),
            }
        }
    }

    Ok(())
}

#[cfg(feature = "cli")]
fn build_engine(config: Option<&Path>) -> Result<Engine> {
    let config = match config {
        Some(path) => EngineConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => EngineConfig::default(),
    };
    Ok(Engine::new(default_catalog().clone(), config)?)
}

#[cfg(feature = "cli")]
fn read_responses(path: &Path) -> Result<ResponseSet> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read {}", path.display()))?;
    let input: ResponseInput = serde_json::from_str(&text)
        .with_context(|| format!("{} is not a response list or map", path.display()))?;
    input.into_set().map_err(anyhow::Error::msg)
}

#[cfg(feature = "cli")]
fn read_catalog(path: &Path) -> Result<ItemCatalog> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("{} is not a catalog", path.display()))
}

#[cfg(feature = "cli")]
fn print_report(report: &BenchmarkReport) {
    let after = &report.phase2.after;
    println!(
        "\n📊 Benchmark {} (seed {}, {} rows)",
        report.engine_version, report.seed, report.row_count
    );
    println!(
        "   Phase 1:    MBTI {:.0}%  Enneagram {:.0}%",
        report.phase1.mbti_accuracy * 100.0,
        report.phase1.enneagram_accuracy * 100.0
    );
    println!(
        "   MBTI:       type acc {:.3}  AUROC {:.3}  ECE {:.3}",
        after.mbti.type_accuracy, after.mbti.mean_auroc, after.mbti.mean_ece
    );
    println!(
        "   Enneagram:  top-1 {:.3}  top-3 {:.3}  ECE {:.3}",
        after.enneagram.top1, after.enneagram.top3, after.enneagram.ece
    );
    println!(
        "   ECE gain:   MBTI {:+.3}  Enneagram {:+.3}",
        report.calibration.improvement.mbti_ece, report.calibration.improvement.enneagram_ece
    );
    for entry in &report.confusion {
        println!("   confused:   {} ({})", entry.key, entry.count);
    }
    for line in &report.recommendations {
        println!("   💡 {line}");
    }
    if report.verdict.passed {
        println!("✅ All thresholds met");
    } else {
        println!("❌ {}", report.verdict.failures.join("; "));
    }
}

#[cfg(feature = "cli")]
fn save_json<T: serde::Serialize>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    std::fs::write(path, json).with_context(|| format!("cannot write {}", path.display()))?;
    println!("\n📄 Report saved to: {}", path.display());
    Ok(())
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("im CLI is not available. Enable the 'cli' feature to use it.");
    std::process::exit(1);
}
