use std::{
    fs,
    io::{self, Read},
    num::NonZeroUsize,
    path::{Path, PathBuf},
    process::ExitCode,
};

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use perfdata::{
    config::{self, Config},
    datafile,
    functions::{self, AppendOutcome},
    models::short_id,
    report, timings,
    workload::{self, WorkloadConfig},
    Bench, Commit, Tool,
};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Configuration file; missing files are ignored
    #[arg(long, global = true, default_value = config::DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Data file to operate on, overriding the configuration
    #[arg(long, global = true)]
    data_file: Option<PathBuf>,

    /// More logging; repeat for trace output
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Suites, entry counts and the range of commits they cover
    Summary,

    /// Check the data file for duplicate commits, ordering and unit problems
    Validate,

    /// Merge cumulative snapshots of the data file into one history
    Merge {
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        #[arg(short, long)]
        output: PathBuf,
    },

    /// Record the benches of a commit, replacing an earlier run of the same commit
    Append {
        /// JSON file with the commit object (`-` for stdin)
        #[arg(long)]
        commit: PathBuf,

        /// JSON array of benches (`-` for stdin)
        #[arg(long, conflicts_with = "timings", required_unless_present = "timings")]
        benches: Option<PathBuf>,

        /// Compiler timings report to convert into benches
        #[arg(long)]
        timings: Option<PathBuf>,

        #[arg(long)]
        suite: Option<String>,

        #[arg(long)]
        tool: Option<Tool>,

        /// Keep at most this many entries in the suite
        #[arg(long)]
        max_items: Option<NonZeroUsize>,

        /// Measurement time in epoch milliseconds, defaults to now
        #[arg(long)]
        date: Option<i64>,
    },

    /// Compare an entry with its predecessor and print a Markdown report
    Compare {
        #[arg(long)]
        suite: Option<String>,

        /// Commit id or unique prefix, defaults to the newest entry
        #[arg(long)]
        commit: Option<String>,

        #[arg(long)]
        threshold: Option<f64>,
    },

    /// Print the values of one bench over time
    History {
        bench: String,

        #[arg(long)]
        suite: Option<String>,

        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },

    /// Convert a compiler timings report into a JSON bench array
    Timings { report: PathBuf },

    /// Print the synthetic program the compiler benchmark runs on
    Workload {
        #[arg(long, default_value_t = WorkloadConfig::default().functions)]
        functions: usize,

        #[arg(long, default_value_t = WorkloadConfig::default().statements)]
        statements: usize,

        #[arg(long, default_value_t = WorkloadConfig::default().seed)]
        seed: u64,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum OutputFormat {
    Table,
    Csv,
    Json,
}

fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(code) => code,
        Err(err) => {
            error!("{err:#}");
            ExitCode::from(2)
        }
    }
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "perfdata=info",
        1 => "perfdata=debug",
        _ => "perfdata=trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: Cli) -> Result<ExitCode> {
    let mut config = config::get_config(&cli.config)
        .with_context(|| format!("invalid configuration in {}", cli.config.display()))?;
    if let Some(data_file) = cli.data_file {
        config.data_file = data_file;
    }

    match cli.command {
        Command::Summary => summary(&config),
        Command::Validate => validate(&config),
        Command::Merge { inputs, output } => merge(&inputs, &output),
        Command::Append {
            commit,
            benches,
            timings,
            suite,
            tool,
            max_items,
            date,
        } => {
            let from_stdin = [Some(&commit), benches.as_ref(), timings.as_ref()]
                .into_iter()
                .flatten()
                .filter(|path| path.as_path() == Path::new("-"))
                .count();
            if from_stdin > 1 {
                bail!("only one of --commit, --benches and --timings can read stdin");
            }

            let commit: Commit = serde_json::from_str(&read_input(&commit)?)
                .with_context(|| format!("{} is not a commit object", commit.display()))?;
            let benches = match (benches, timings) {
                (Some(path), _) => serde_json::from_str::<Vec<Bench>>(&read_input(&path)?)
                    .with_context(|| format!("{} is not a bench array", path.display()))?,
                (None, Some(path)) => benches_from_report(&path)?,
                (None, None) => bail!("either --benches or --timings is required"),
            };
            let date = match date {
                Some(millis) => DateTime::from_timestamp_millis(millis)
                    .with_context(|| format!("--date {millis} is out of range"))?,
                None => Utc::now(),
            };
            let suite = suite.unwrap_or_else(|| config.suite.clone());
            let tool = tool.unwrap_or_else(|| config.tool.clone());
            append(&config, &suite, commit, tool, benches, max_items, date)
        }
        Command::Compare {
            suite,
            commit,
            threshold,
        } => {
            let suite = suite.unwrap_or_else(|| config.suite.clone());
            let threshold = threshold.unwrap_or(config.alert_threshold);
            compare(&config, &suite, commit.as_deref(), threshold)
        }
        Command::History {
            bench,
            suite,
            format,
        } => {
            let suite = suite.unwrap_or_else(|| config.suite.clone());
            history(&config, &suite, &bench, format)
        }
        Command::Timings { report } => {
            let benches = benches_from_report(&report)?;
            println!("{}", serde_json::to_string_pretty(&benches)?);
            Ok(ExitCode::SUCCESS)
        }
        Command::Workload {
            functions,
            statements,
            seed,
        } => {
            let program = workload::generate(&WorkloadConfig {
                functions,
                statements,
                seed,
            })?;
            print!("{program}");
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn read_input(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut text = String::new();
        io::stdin()
            .read_to_string(&mut text)
            .context("failed to read stdin")?;
        Ok(text)
    } else {
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
    }
}

fn benches_from_report(path: &Path) -> Result<Vec<Bench>> {
    let report = read_input(path)?;
    let timings = timings::parse_report(&report)
        .with_context(|| format!("failed to parse timings report {}", path.display()))?;
    if timings.is_empty() {
        bail!("{} contains no complete timing section", path.display());
    }
    Ok(timings.to_benches())
}

fn load(config: &Config) -> Result<perfdata::BenchmarkData> {
    datafile::load(&config.data_file)
        .with_context(|| format!("failed to load {}", config.data_file.display()))
}

fn summary(config: &Config) -> Result<ExitCode> {
    let data = load(config)?;
    println!("repository:  {}", data.repo_url);
    println!("last update: {}", data.last_update.format("%Y-%m-%d %H:%M:%S UTC"));
    for (suite, entries) in &data.entries {
        println!();
        println!("{suite}: {} entries", entries.len());
        for (label, entry) in [("first", entries.first()), ("last", entries.last())] {
            if let Some(entry) = entry {
                println!(
                    "  {label:<5} {} {} ({} benches) {}",
                    entry.commit.short_id(),
                    entry.date.format("%Y-%m-%d %H:%M"),
                    entry.benches.len(),
                    entry.commit.summary()
                );
            }
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn validate(config: &Config) -> Result<ExitCode> {
    let data = load(config)?;
    let issues = functions::validate(&data);
    for issue in &issues {
        println!("{issue}");
    }
    if issues.is_empty() {
        println!("no issues found in {}", config.data_file.display());
    }
    Ok(if functions::has_errors(&issues) {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

fn merge(inputs: &[PathBuf], output: &Path) -> Result<ExitCode> {
    let snapshots = inputs
        .iter()
        .map(|path| {
            datafile::load(path).with_context(|| format!("failed to load {}", path.display()))
        })
        .collect::<Result<Vec<_>>>()?;
    let merged = functions::merge_snapshots(snapshots)?;
    datafile::save(output, &merged)
        .with_context(|| format!("failed to write {}", output.display()))?;
    println!(
        "merged {} snapshots into {} ({} entries)",
        inputs.len(),
        output.display(),
        merged.entry_count()
    );
    Ok(ExitCode::SUCCESS)
}

fn append(
    config: &Config,
    suite: &str,
    commit: Commit,
    tool: Tool,
    benches: Vec<Bench>,
    max_items: Option<NonZeroUsize>,
    date: DateTime<Utc>,
) -> Result<ExitCode> {
    let mut data = datafile::load_or_new(&config.data_file, &config.repo_url)
        .with_context(|| format!("failed to load {}", config.data_file.display()))?;
    if !config.repo_url.is_empty() && data.repo_url != config.repo_url {
        warn!(
            file = %data.repo_url,
            configured = %config.repo_url,
            "data file belongs to a different repository than configured"
        );
    }

    let short = commit.short_id().to_string();
    let entry = functions::new_entry(commit, tool, benches, date)?;
    let outcome = functions::append_entry(
        &mut data,
        suite,
        entry,
        max_items.or(config.max_items),
        Utc::now(),
    );
    datafile::save(&config.data_file, &data)
        .with_context(|| format!("failed to write {}", config.data_file.display()))?;

    let action = match outcome {
        AppendOutcome::Inserted { .. } => "added",
        AppendOutcome::Replaced { .. } => "replaced",
    };
    println!("{action} {short} in '{suite}'");
    if outcome.trimmed() > 0 {
        info!(trimmed = outcome.trimmed(), "dropped old entries");
    }
    Ok(ExitCode::SUCCESS)
}

fn compare(
    config: &Config,
    suite: &str,
    commit: Option<&str>,
    threshold: f64,
) -> Result<ExitCode> {
    let data = load(config)?;
    let run = match commit {
        Some(prefix) => functions::compare_commit(&data, suite, prefix, threshold)?,
        None => functions::compare_latest(&data, suite, threshold)?,
    };
    println!("{}", report::markdown(&run));

    if run.has_alerts() {
        warn!(
            alerts = run.alerts().count(),
            threshold, "benchmarks regressed beyond the alert threshold"
        );
        if config.fail_on_alert {
            return Ok(ExitCode::FAILURE);
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn history(config: &Config, suite: &str, bench: &str, format: OutputFormat) -> Result<ExitCode> {
    let data = load(config)?;
    let series = functions::history(&data, suite, bench)?;
    if series.is_empty() {
        let known = functions::bench_names(&data, suite)?;
        if !known.contains(&bench) {
            bail!("suite '{suite}' has no bench named '{bench}'");
        }
    }

    match format {
        OutputFormat::Table => {
            for point in &series {
                println!(
                    "{}  {}  {:>14}  {}",
                    point.date.format("%Y-%m-%d %H:%M"),
                    short_id(&point.commit),
                    report::format_value(point.value, &point.unit),
                    point.summary
                );
            }
        }
        OutputFormat::Csv => {
            println!("commit,date,value,unit");
            for point in &series {
                println!(
                    "{},{},{},{}",
                    point.commit,
                    point.date.timestamp_millis(),
                    point.value,
                    point.unit
                );
            }
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&series)?),
    }
    Ok(ExitCode::SUCCESS)
}
