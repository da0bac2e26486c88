//! Command-line interface for tracegen.

use chrono::{DateTime, Utc};
use clap::{ArgAction, Args, Parser, Subcommand};
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::check;
use crate::config::{self, GeneratorConfig, SinkConfig};
use crate::generate::{self, Plan};
use crate::meta::{MetaProvider, NetworkMeta};
use crate::random::FakeSource;
use crate::registry::{ProducerKind, ProducerRegistry};
use crate::report;
use crate::sink::{HttpSink, Sink};

/// Exit codes.
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILED: i32 = 1;
pub const EXIT_ERROR: i32 = 2;

/// Synthetic HTTP traffic for ingestion and traffic-analysis pipelines.
///
/// Tracegen runs a set of producers, each of which fakes one kind of API
/// call, and writes the resulting request/response records as JSON lines
/// or posts them to a collector.
#[derive(Parser)]
#[command(name = "tracegen")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate transaction records
    #[command(visible_alias = "gen")]
    Generate(GenerateArgs),
    /// Validate files of transaction records
    Check(CheckArgs),
    /// List available producers
    List(ListArgs),
    /// Create a new tracegen config from a template
    Init(InitArgs),
}

/// Arguments for the generate command.
#[derive(Args, Default)]
pub struct GenerateArgs {
    /// Path to config YAML file (default: auto-discover)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Number of records to generate
    #[arg(short = 'n', long)]
    pub count: Option<usize>,

    /// Master seed for reproducible output
    #[arg(short, long)]
    pub seed: Option<u64>,

    /// Simulated time of the first emission (RFC 3339)
    #[arg(long, value_parser = parse_timestamp)]
    pub start: Option<DateTime<Utc>>,

    /// Producer name glob to run (repeatable)
    #[arg(short, long = "producer")]
    pub producers: Vec<String>,

    /// Producer name glob to skip (repeatable)
    #[arg(long)]
    pub exclude: Vec<String>,

    /// Pretty-print records instead of one per line
    #[arg(long)]
    pub pretty: bool,

    /// Emit in real time, starting now
    #[arg(short, long)]
    pub follow: bool,

    /// Collector URL; records are POSTed there instead of printed
    #[arg(long)]
    pub sink: Option<String>,

    /// API key sent to the collector
    #[arg(long, env = "TRACEGEN_API_KEY")]
    pub api_key: Option<String>,

    /// Records per collector request
    #[arg(long)]
    pub batch_size: Option<usize>,
}

/// Arguments for the check command.
#[derive(Args)]
pub struct CheckArgs {
    /// Record file, directory of *.jsonl files, or - for stdin
    pub path: PathBuf,

    /// Output format: pretty or json
    #[arg(short, long, default_value = "pretty")]
    pub format: String,
}

/// Arguments for the list command.
#[derive(Args, Default)]
pub struct ListArgs {
    /// Show a single producer by name
    pub name: Option<String>,
}

/// Arguments for the init command.
#[derive(Args)]
pub struct InitArgs {
    /// Output file path
    #[arg(short, long, default_value = "tracegen.yaml")]
    pub output: PathBuf,

    /// Template to use
    #[arg(short, long, default_value = "default")]
    pub template: String,

    /// List available templates
    #[arg(short, long)]
    pub list: bool,
}

/// Available config templates.
struct Template {
    name: &'static str,
    description: &'static str,
    content: &'static str,
}

static TEMPLATES: &[Template] = &[
    Template {
        name: "default",
        description: "Seeded run of every producer, printed as JSON lines",
        content: include_str!("templates/default.yaml"),
    },
    Template {
        name: "collector",
        description: "Batches posted to an HTTP collector with an API key",
        content: include_str!("templates/collector.yaml"),
    },
];

fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(s)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| format!("invalid RFC 3339 timestamp {:?}: {}", s, e))
}

/// Fold command-line overrides into the loaded config.
pub fn apply_overrides(config: &mut GeneratorConfig, args: &GenerateArgs) {
    if let Some(count) = args.count {
        config.count = count;
    }
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    if args.start.is_some() {
        config.start = args.start;
    }
    if !args.producers.is_empty() {
        config.producers = args.producers.clone();
    }
    if !args.exclude.is_empty() {
        config.exclude = args.exclude.clone();
    }
    if let Some(batch_size) = args.batch_size {
        config.batch_size = batch_size;
    }
    if let Some(url) = &args.sink {
        match config.sink.as_mut() {
            Some(sink) => sink.url = url.clone(),
            None => {
                config.sink = Some(SinkConfig {
                    url: url.clone(),
                    api_key: None,
                    timeout_ms: 5000,
                })
            }
        }
    }
    if let (Some(sink), Some(key)) = (config.sink.as_mut(), &args.api_key) {
        sink.api_key = Some(key.clone());
    }
}

/// Run the generate command.
pub fn run_generate(args: &GenerateArgs) -> anyhow::Result<i32> {
    let (mut config, config_path) = match GeneratorConfig::load(args.config.as_deref()) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("Error parsing config: {}", e);
            return Ok(EXIT_ERROR);
        }
    };
    apply_overrides(&mut config, args);

    if let Err(e) = config::validate(&config) {
        eprintln!("Error: invalid config: {}", e);
        return Ok(EXIT_ERROR);
    }

    let registry = match ProducerRegistry::select(&config.producers, &config.exclude) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!("Run 'tracegen list' to see available producers");
            return Ok(EXIT_ERROR);
        }
    };

    tracing::info!(
        config = ?config_path,
        producers = ?registry.kinds().iter().map(|k| k.as_str()).collect::<Vec<_>>(),
        count = config.count,
        seed = ?config.seed,
        "starting generation"
    );

    let meta: Arc<dyn MetaProvider> = Arc::new(NetworkMeta::new(config.meta.clone()));
    let start = if args.follow {
        Utc::now()
    } else {
        config.start.unwrap_or_else(Utc::now)
    };
    let emitter = registry.emitter(config.seed, meta, start)?;

    let sink = match &config.sink {
        Some(sink) => Sink::Http(HttpSink::new(sink)?),
        None => Sink::Stdout {
            pretty: args.pretty,
        },
    };

    let plan = Plan {
        count: config.count,
        batch_size: config.batch_size,
        follow: args.follow,
    };

    let runtime = tokio::runtime::Runtime::new()?;
    let summary = runtime.block_on(generate::run(emitter, &sink, plan))?;

    if matches!(sink, Sink::Http(_)) {
        eprintln!(
            "Sent {} records in {} batches to {}",
            summary.records,
            summary.batches,
            sink.describe()
        );
    }

    Ok(EXIT_SUCCESS)
}

/// Run the check command.
pub fn run_check(args: &CheckArgs) -> anyhow::Result<i32> {
    if args.format != "pretty" && args.format != "json" {
        eprintln!(
            "Error: invalid format {:?}, must be 'pretty' or 'json'",
            args.format
        );
        return Ok(EXIT_ERROR);
    }

    let result = if args.path == Path::new("-") {
        let stdin = std::io::stdin();
        if stdin.is_terminal() {
            eprintln!("Error: refusing to read records from a terminal");
            return Ok(EXIT_ERROR);
        }
        check::check_reader(stdin.lock(), "<stdin>")?
    } else {
        if !args.path.exists() {
            eprintln!("Error: cannot access path {:?}", args.path);
            return Ok(EXIT_ERROR);
        }
        let files = check::collect_files(&args.path)?;
        if files.is_empty() {
            eprintln!("Warning: no record files to check");
            return Ok(EXIT_SUCCESS);
        }
        check::check_files(&files)?
    };

    tracing::info!(
        records = result.records,
        issues = result.issues.len(),
        "check finished"
    );

    let path_str = args.path.to_string_lossy().to_string();
    match args.format.as_str() {
        "json" => report::write_json(&path_str, &result)?,
        _ => report::write_pretty(&path_str, &result),
    }

    if result.passed() {
        Ok(EXIT_SUCCESS)
    } else {
        Ok(EXIT_FAILED)
    }
}

/// Run the list command.
pub fn run_list(args: &ListArgs) -> anyhow::Result<i32> {
    let kinds: Vec<ProducerKind> = match &args.name {
        Some(name) => match ProducerKind::parse(name) {
            Some(kind) => vec![kind],
            None => {
                eprintln!("Error: unknown producer {:?}", name);
                eprintln!("Run 'tracegen list' to see available producers");
                return Ok(EXIT_ERROR);
            }
        },
        None => ProducerKind::ALL.to_vec(),
    };

    let meta: Arc<dyn MetaProvider> = Arc::new(NetworkMeta::default());
    let intervals: Vec<_> = kinds
        .iter()
        .map(|k| k.build(FakeSource::seeded(0), meta.clone()).avg_emit_delta())
        .collect();

    report::write_producers(&kinds, &intervals);
    Ok(EXIT_SUCCESS)
}

/// Run the init command.
pub fn run_init(args: &InitArgs) -> anyhow::Result<i32> {
    if args.list {
        return list_templates();
    }

    let template = match TEMPLATES.iter().find(|t| t.name == args.template) {
        Some(t) => t,
        None => {
            eprintln!("Error: unknown template {:?}", args.template);
            eprintln!("Run 'tracegen init --list' to see available templates");
            return Ok(EXIT_ERROR);
        }
    };

    if args.output.exists() {
        eprintln!("Error: file already exists: {}", args.output.display());
        eprintln!("Remove it or use --output to specify a different path");
        return Ok(EXIT_ERROR);
    }

    if let Some(parent) = args.output.parent() {
        if !parent.as_os_str().is_empty() && parent != Path::new(".") {
            if let Err(e) = std::fs::create_dir_all(parent) {
                eprintln!("Error: failed to create directory: {}", e);
                return Ok(EXIT_ERROR);
            }
        }
    }

    if let Err(e) = std::fs::write(&args.output, template.content) {
        eprintln!("Error: failed to write config: {}", e);
        return Ok(EXIT_ERROR);
    }

    println!("Created {} from template '{}'", args.output.display(), template.name);
    println!();
    println!("Next steps:");
    println!("  1. Edit {} to pick producers and a seed", args.output.display());
    println!("  2. Run: tracegen generate --config {}", args.output.display());

    Ok(EXIT_SUCCESS)
}

fn list_templates() -> anyhow::Result<i32> {
    println!("Available templates:");
    println!();

    for template in TEMPLATES {
        let name = if template.name == "default" {
            format!("{} (default)", template.name)
        } else {
            template.name.to_string()
        };
        println!("  {:<20} {}", name, template.description);
    }

    println!();
    println!("Usage:");
    println!("  tracegen init --template <name>");

    Ok(EXIT_SUCCESS)
}
