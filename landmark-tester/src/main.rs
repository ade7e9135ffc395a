mod backend;
mod http;
mod logic;

use anyhow::{Context, Result, bail};
use chrono::Utc;
use clap::{Parser, ValueEnum};
use colored::Colorize;
use landmark_core::MarketConfig;
use std::fs::File;
use std::io::{BufWriter, Write, stdout};
use std::path::{Path, PathBuf};
use std::time::Instant;

use backend::BackendSpec;
use logic::{LandTester, Scenario, ScenarioResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BackendKind {
    /// Generated in-memory map (fast, deterministic per seed)
    Memory,
    /// Live backend at --base-url
    Http,
}

#[derive(Debug, Parser)]
#[command(name = "landmark-tester", version)]
#[command(about = "Scenario runner for the land market purchase flows")]
struct Args {
    /// Backend to drive
    #[arg(long, value_enum, default_value_t = BackendKind::Memory)]
    backend: BackendKind,

    /// API base URL (http backend only)
    #[arg(long, default_value = "http://localhost:3000/api")]
    base_url: String,

    /// Optional JSON market config; missing keys take defaults
    #[arg(long)]
    config: Option<PathBuf>,

    /// Scenarios to run (comma-separated, or "all")
    #[arg(long, default_value = "smoke")]
    scenarios: String,

    /// List all available scenarios and exit
    #[arg(long)]
    list_scenarios: bool,

    /// Seeds for generated maps (comma-separated)
    #[arg(long, default_value = "1337")]
    seeds: String,

    /// Hex rings around the origin for generated maps
    #[arg(long, default_value_t = 4)]
    radius: i32,

    /// Output report format
    #[arg(long, default_value = "console")]
    #[arg(value_parser = ["json", "markdown", "console"])]
    report: String,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Optional path to write the report output instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    if maybe_list_scenarios(&args)? {
        return Ok(());
    }

    announce_banner();

    let start_time = Instant::now();
    let scenarios = expand_scenarios(&args.scenarios)?;
    let seeds = parse_seeds(&args.seeds)?;
    let config = load_config(args.config.as_deref())?;
    let tester = LandTester::new(backend_spec(&args), config, args.verbose);

    let results = tester.run_all(&scenarios, &seeds).await;
    write_reports(&args, &results, start_time)?;

    if results.iter().any(|r| !r.passed) {
        std::process::exit(1);
    }
    Ok(())
}

fn maybe_list_scenarios(args: &Args) -> Result<bool> {
    if !args.list_scenarios {
        return Ok(false);
    }
    let mut output_target = OutputTarget::new(args.output.clone())?;
    writeln!(output_target.writer(), "Available scenarios:")?;
    for scenario in Scenario::ALL {
        writeln!(
            output_target.writer(),
            "  {:25} - {}",
            scenario.key(),
            scenario.description()
        )?;
    }
    output_target.flush_inner()?;
    Ok(true)
}

fn announce_banner() {
    println!("{}", "🗺️  Landmark Market Tester".bright_cyan().bold());
    println!("{}", "==========================".cyan());
}

fn split_csv(s: &str) -> Vec<String> {
    s.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(ToString::to_string)
        .collect()
}

fn expand_scenarios(scenarios_arg: &str) -> Result<Vec<Scenario>> {
    let mut scenarios = Vec::new();
    for key in split_csv(scenarios_arg) {
        if key == "all" {
            scenarios.extend(Scenario::ALL);
            continue;
        }
        match Scenario::from_key(&key) {
            Some(scenario) => scenarios.push(scenario),
            None => bail!("unknown scenario: {key} (see --list-scenarios)"),
        }
    }
    scenarios.dedup();
    Ok(scenarios)
}

fn parse_seeds(seeds_arg: &str) -> Result<Vec<u64>> {
    let seeds = split_csv(seeds_arg)
        .iter()
        .map(|token| {
            token
                .parse::<u64>()
                .with_context(|| format!("invalid seed: {token}"))
        })
        .collect::<Result<Vec<_>>>()?;
    if seeds.is_empty() {
        bail!("at least one seed is required");
    }
    Ok(seeds)
}

fn load_config(path: Option<&Path>) -> Result<MarketConfig> {
    let Some(path) = path else {
        return Ok(MarketConfig::default());
    };
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    MarketConfig::from_json(&json).with_context(|| format!("invalid config {}", path.display()))
}

fn backend_spec(args: &Args) -> BackendSpec {
    match args.backend {
        BackendKind::Memory => BackendSpec::Memory {
            radius: args.radius,
        },
        BackendKind::Http => BackendSpec::Http {
            base_url: args.base_url.clone(),
        },
    }
}

fn write_reports(args: &Args, results: &[ScenarioResult], start_time: Instant) -> Result<()> {
    let mut output_target = OutputTarget::new(args.output.clone())?;

    match args.report.as_str() {
        "json" => logic::reports::generate_json_report(&mut output_target, results)?,
        "markdown" => {
            if results.is_empty() {
                writeln!(
                    &mut output_target,
                    "# Land Market Scenario Results\n\n_No scenarios executed._"
                )?;
            } else {
                logic::reports::generate_markdown_report(&mut output_target, results, Utc::now())?;
            }
        }
        _ => {
            logic::reports::generate_console_report(
                &mut output_target,
                results,
                start_time.elapsed(),
            )?;
            writeln!(&mut output_target)?;
            writeln!(
                &mut output_target,
                "🏁 Total time: {:?}",
                start_time.elapsed()
            )?;
        }
    }

    output_target.flush_inner()?;
    Ok(())
}

enum OutputTarget {
    Stdout(BufWriter<std::io::Stdout>),
    File(BufWriter<File>),
}

impl OutputTarget {
    fn new(path: Option<PathBuf>) -> Result<Self> {
        if let Some(path) = path {
            let file = File::create(&path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            Ok(Self::File(BufWriter::new(file)))
        } else {
            Ok(Self::Stdout(BufWriter::new(stdout())))
        }
    }

    fn writer(&mut self) -> &mut dyn Write {
        match self {
            Self::Stdout(w) => w,
            Self::File(w) => w,
        }
    }

    fn flush_inner(&mut self) -> std::io::Result<()> {
        match self {
            Self::Stdout(w) => w.flush(),
            Self::File(w) => w.flush(),
        }
    }
}

impl Write for OutputTarget {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.writer().write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.flush_inner()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn base_args() -> Args {
        Args {
            backend: BackendKind::Memory,
            base_url: "http://localhost:3000/api".to_string(),
            config: None,
            scenarios: "smoke".to_string(),
            list_scenarios: false,
            seeds: "1337".to_string(),
            radius: 2,
            report: "json".to_string(),
            verbose: false,
            output: None,
        }
    }

    fn temp_path(label: &str) -> PathBuf {
        std::env::temp_dir().join(format!("landmark-main-{label}-{}", std::process::id()))
    }

    #[test]
    fn expands_all_keyword_without_duplicates() {
        let expanded = expand_scenarios("smoke,all").unwrap();
        assert_eq!(expanded.len(), Scenario::ALL.len());
        assert_eq!(expanded[0], Scenario::Smoke);
        assert_eq!(expand_scenarios("smoke,smoke").unwrap(), vec![Scenario::Smoke]);
    }

    #[test]
    fn rejects_unknown_scenarios_and_bad_seeds() {
        assert!(expand_scenarios("smoke,nope").is_err());
        assert!(parse_seeds("1,x").is_err());
        assert!(parse_seeds(" , ").is_err());
        assert_eq!(parse_seeds("1, 2").unwrap(), vec![1, 2]);
    }

    #[test]
    fn config_file_overrides_defaults() {
        let path = temp_path("config.json");
        std::fs::write(&path, r#"{"tiles_ttl_ms": 5000}"#).unwrap();
        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.tiles_ttl_ms, 5000);
        assert_eq!(load_config(None).unwrap(), MarketConfig::default());
    }

    #[test]
    fn backend_spec_follows_args() {
        let args = Args {
            backend: BackendKind::Http,
            ..base_args()
        };
        assert_eq!(
            backend_spec(&args),
            BackendSpec::Http {
                base_url: "http://localhost:3000/api".to_string()
            }
        );
        assert_eq!(backend_spec(&base_args()), BackendSpec::Memory { radius: 2 });
    }

    #[test]
    fn maybe_list_scenarios_writes_output() {
        let path = temp_path("list.txt");
        let args = Args {
            list_scenarios: true,
            output: Some(path.clone()),
            ..base_args()
        };
        assert!(maybe_list_scenarios(&args).unwrap());
        let content = std::fs::read_to_string(path).unwrap();
        assert!(content.contains("Available scenarios"));
        assert!(content.contains("validation-guards"));
        assert!(!maybe_list_scenarios(&base_args()).unwrap());
    }

    #[test]
    fn write_reports_markdown_empty_results() {
        let path = temp_path("empty.md");
        let args = Args {
            report: "markdown".to_string(),
            output: Some(path.clone()),
            ..base_args()
        };
        write_reports(&args, &[], Instant::now()).unwrap();
        let content = std::fs::read_to_string(path).unwrap();
        assert!(content.contains("No scenarios executed"));
    }

    #[test]
    fn write_reports_emits_json_for_results() {
        let path = temp_path("results.json");
        let args = Args {
            output: Some(path.clone()),
            ..base_args()
        };
        let result = ScenarioResult {
            scenario_name: "smoke".to_string(),
            backend: "memory".to_string(),
            seed: 1,
            passed: true,
            failure: None,
            duration: Duration::from_millis(1),
        };
        write_reports(&args, &[result], Instant::now()).unwrap();
        let content = std::fs::read_to_string(path).unwrap();
        assert!(content.contains("\"scenario_name\": \"smoke\""));
    }
}
