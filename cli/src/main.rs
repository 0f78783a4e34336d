use anyhow::{bail, Context, Result};
use chrono::Local;
use clap::{Parser, Subcommand};
use codeflux_core::align::{align, render_alignment};
use codeflux_core::config::{CppVersion, ReasoningEffort, Settings};
use codeflux_core::detect::identify_patterns;
use codeflux_core::extract::{extract_pattern_knowledge, ConversionResult};
use codeflux_core::history::{HistoryItem, HistoryStore};
use codeflux_core::knowledge::format_knowledge_markdown;
use codeflux_core::logger::{LogBuffer, Logger};
use codeflux_core::pattern::{lookup, PatternType};
use codeflux_core::perf::{generate_performance_data, PerformanceSummary};
use codeflux_core::prompts::build_conversion_prompt;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "codeflux", about = "Inspect and record MPI/OpenMP to C++ conversions")]
struct Cli {
    /// Settings file (camelCase JSON)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Emit log records as they happen instead of only on failure
    #[arg(long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

/// Inputs named `-` are read from stdin.
#[derive(Subcommand)]
enum Command {
    /// Align two files line by line
    Diff {
        original: PathBuf,
        modified: PathBuf,
        #[arg(long)]
        json: bool,
    },
    /// Separate converted code from explanation in a model reply
    Split {
        response: PathBuf,
        #[arg(long)]
        json: bool,
    },
    /// Extract pattern knowledge from a model reply
    Knowledge {
        response: PathBuf,
        /// Patterns to fall back on when the reply is unusable
        #[arg(long, value_delimiter = ',')]
        patterns: Vec<String>,
        #[arg(long)]
        json: bool,
    },
    /// List parallel patterns found in MPI/OpenMP source
    Detect { source: PathBuf },
    /// Print the conversion prompt for a source file
    Prompt {
        source: PathBuf,
        #[arg(long)]
        cpp: Option<CppVersion>,
        #[arg(long)]
        no_explanations: bool,
        #[arg(long)]
        effort: Option<ReasoningEffort>,
    },
    /// Store a finished conversion in the history file
    Record {
        source: PathBuf,
        response: PathBuf,
        /// Model reply carrying pattern knowledge JSON
        #[arg(long)]
        knowledge: Option<PathBuf>,
        /// Seed for the synthetic performance figures
        #[arg(long)]
        seed: Option<u64>,
    },
    /// List or clear stored conversions
    History {
        #[arg(long)]
        clear: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let rid = ((Local::now().timestamp_millis() as u64) ^ u64::from(std::process::id())).max(1);

    let buffer = LogBuffer::default();
    let logger = if cli.verbose {
        Logger::new(rid)
    } else {
        Logger::with_buffer(rid, buffer.clone())
    };

    let settings = match &cli.config {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };

    let outcome = run(cli.command, settings, &logger);
    if outcome.is_err() && !cli.verbose {
        if let Ok(records) = buffer.lock() {
            eprint!("{records}");
        }
    }
    outcome
}

fn run(command: Command, mut settings: Settings, logger: &Logger) -> Result<()> {
    match command {
        Command::Diff { original, modified, json } => {
            let alignment = align(&read_input(&original)?, &read_input(&modified)?);
            if json {
                println!("{}", serde_json::to_string_pretty(&alignment)?);
            } else {
                print!("{}", render_alignment(&alignment));
                println!(
                    "\n{} unchanged, {} removed, {} added",
                    alignment.matched_pairs(),
                    alignment.removed(),
                    alignment.added()
                );
            }
        }
        Command::Split { response, json } => {
            let result = ConversionResult::from_response(&read_input(&response)?);
            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                println!("{}", result.converted_code);
                if !result.explanation.is_empty() {
                    println!("\n{}", result.explanation);
                }
            }
        }
        Command::Knowledge { response, patterns, json } => {
            let records = extract_pattern_knowledge(&read_input(&response)?, patterns.as_slice(), logger)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&records)?);
            } else {
                print!("{}", format_knowledge_markdown(&records));
            }
        }
        Command::Detect { source } => {
            for kind in identify_patterns(&read_input(&source)?) {
                let Some(entry) = lookup(kind) else {
                    println!("{kind}: no recognizable parallel construct");
                    continue;
                };
                println!("{kind}: {}", entry.description);
                if let Some(mpi) = entry.mpi_equivalent {
                    println!("  MPI:    {mpi}");
                }
                if let Some(omp) = entry.openmp_equivalent {
                    println!("  OpenMP: {omp}");
                }
                println!("  C++:    {}", entry.cpp_equivalent);
            }
        }
        Command::Prompt { source, cpp, no_explanations, effort } => {
            if let Some(cpp) = cpp {
                settings.target_cpp = cpp;
            }
            if no_explanations {
                settings.include_explanations = false;
            }
            if let Some(effort) = effort {
                settings.reasoning_effort = effort;
            }
            let prompt = build_conversion_prompt(&read_input(&source)?, &settings);
            println!("# system\n{}", prompt.system);
            println!("# user\n{}", prompt.user);
            println!("# max_tokens: {}", prompt.max_tokens);
        }
        Command::Record { source, response, knowledge, seed } => {
            let input = read_input(&source)?;
            let result = ConversionResult::from_response(&read_input(&response)?);
            if !result.success {
                bail!(result.error.unwrap_or_else(|| "conversion failed".to_string()));
            }

            let patterns = identify_patterns(&input);
            let mut rng = match seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_entropy(),
            };
            let performance = generate_performance_data(&patterns, &mut rng);
            let summary = PerformanceSummary::from_rows(&performance);

            let mut item = HistoryItem::new(&input, &result.converted_code, patterns.clone(), settings.target_cpp)
                .with_explanation(result.explanation)
                .with_performance(performance);

            if let Some(path) = knowledge {
                let names: Vec<&str> = patterns
                    .iter()
                    .filter(|p| **p != PatternType::Unknown)
                    .map(|p| p.as_str())
                    .collect();
                let records = extract_pattern_knowledge(&read_input(&path)?, names.as_slice(), logger)?;
                item = item.with_knowledge(records);
            }

            let mut store = HistoryStore::load(&settings.history_path, settings.max_history, logger)?;
            let id = store.add(item);
            store.save()?;

            println!("recorded {id}");
            if let Some(summary) = summary {
                println!(
                    "speedup avg {:.2}x, max {:.2}x",
                    summary.average_speedup, summary.max_speedup
                );
            }
        }
        Command::History { clear } => {
            let mut store = HistoryStore::load(&settings.history_path, settings.max_history, logger)?;
            if clear {
                store.clear();
                store.save()?;
                println!("history cleared");
                return Ok(());
            }
            if store.items().is_empty() {
                println!("no history");
            }
            for item in store.items() {
                let names: Vec<&str> = item.patterns.iter().map(|p| p.as_str()).collect();
                println!(
                    "{}  {}  {}  [{}]  {:.0}% changed",
                    item.id,
                    item.timestamp.with_timezone(&Local).format("%Y-%m-%d %H:%M"),
                    item.target_cpp,
                    names.join(", "),
                    item.changed_ratio * 100.0
                );
            }
        }
    }
    Ok(())
}

fn read_input(path: &Path) -> Result<String> {
    if path.as_os_str() == "-" {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("Failed to read stdin")?;
        return Ok(text);
    }
    fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}
