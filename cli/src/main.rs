//! Six Degrees CLI: builds the processed dataset and answers path queries
//! against it without a running server.

use anyhow::Context;
use clap::{Parser, Subcommand};
use comfy_table::{ContentArrangement, Table};
use sixdegrees::graph::SearchHit;
use sixdegrees::pipeline::{apply_amendment, prepare_import, Amendment, StageReport};
use sixdegrees::{load_snapshot, Config, GraphSnapshot, PathEngine, PathResult, Pipeline};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sixdegrees", version, about = "Six Degrees dataset and path CLI")]
struct Cli {
    /// Configuration file (defaults to $SIXDEGREES_CONFIG, then built-in defaults)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(long, default_value = "table", global = true)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, clap::ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the processed files from the raw tables
    Process,
    /// Write bulk-import files from the processed files
    Export,
    /// Append hand-curated records to the processed files
    Amend {
        /// YAML file with `people`, `movies` and `roles` lists
        file: PathBuf,
    },
    /// Shortest path between two people or movies
    Path {
        /// Start reference (`nm...`, `tt...`, `person:<id>` or `movie:<id>`)
        start: String,
        /// End reference
        end: String,
    },
    /// Find people and movies by name
    Search {
        query: String,
    },
    /// Graph size after loading the processed files
    Stats,
    /// Interactive path queries against one loaded graph
    Shell,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = Config::load(cli.config.as_deref())?;
    let format = &cli.format;

    match cli.command {
        Commands::Process => run_process(&config, format),
        Commands::Export => run_export(&config, format),
        Commands::Amend { file } => run_amend(&config, &file, format),
        Commands::Path { start, end } => {
            let snapshot = load(&config)?;
            let engine = PathEngine::new(config.query.clone());
            let result = engine.find_shortest_path_str(&snapshot, &start, &end)?;
            print_path(&result, format)
        }
        Commands::Search { query } => {
            let snapshot = load(&config)?;
            let engine = PathEngine::new(config.query.clone());
            let hits = engine.search(&snapshot, &query)?;
            print_hits(&hits, format)
        }
        Commands::Stats => {
            let snapshot = load(&config)?;
            let stats = snapshot.statistics();
            match format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&stats)?),
                OutputFormat::Table => {
                    println!("Nodes:   {}", stats.nodes);
                    println!("People:  {}", stats.people);
                    println!("Movies:  {}", stats.movies);
                    println!("Edges:   {}", stats.edges);
                }
            }
            Ok(())
        }
        Commands::Shell => run_shell(&config, format),
    }
}

fn load(config: &Config) -> anyhow::Result<GraphSnapshot> {
    let paths = config.pipeline.processed_paths();
    let (snapshot, _report) = load_snapshot(&paths, config.pipeline.chunk_size.max(1))
        .context("loading processed files (run `process` first)")?;
    Ok(snapshot)
}

fn run_process(config: &Config, format: &OutputFormat) -> anyhow::Result<()> {
    let report = Pipeline::new(config.pipeline.clone()).run()?;
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Table => {
            let mut table = Table::new();
            table.set_content_arrangement(ContentArrangement::Dynamic);
            table.set_header(vec!["stage", "read", "kept", "filtered", "malformed", "duplicates"]);
            for stage in [&report.movies, &report.principals, &report.names, &report.finalize] {
                table.add_row(stage_row(stage));
            }
            println!("{}", table);
        }
    }
    Ok(())
}

fn stage_row(stage: &StageReport) -> Vec<String> {
    vec![
        stage.stage.to_string(),
        stage.rows_read.to_string(),
        stage.kept.to_string(),
        stage.filtered.to_string(),
        stage.malformed.to_string(),
        stage.duplicates.to_string(),
    ]
}

fn run_export(config: &Config, format: &OutputFormat) -> anyhow::Result<()> {
    let report = prepare_import(&config.pipeline.processed_dir, &config.pipeline.import_dir)?;
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Table => {
            for (file, bytes) in &report.files {
                println!("{:<12} {} bytes", file, bytes);
            }
            println!(
                "Import files written to {} (relationship type {})",
                report.import_dir.display(),
                report.relationship_type
            );
        }
    }
    Ok(())
}

fn run_amend(config: &Config, file: &Path, format: &OutputFormat) -> anyhow::Result<()> {
    let text = std::fs::read_to_string(file)
        .with_context(|| format!("reading {}", file.display()))?;
    let amendment =
        Amendment::from_yaml(&text).with_context(|| format!("parsing {}", file.display()))?;
    if amendment.is_empty() {
        println!("Nothing to apply");
        return Ok(());
    }

    let paths = config.pipeline.processed_paths();
    let report = apply_amendment(&paths, &amendment, config.pipeline.chunk_size.max(1))?;
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Table => {
            println!(
                "Added {} people, {} movies, {} roles",
                report.people_added, report.movies_added, report.roles_added
            );
            for reason in &report.rejected {
                println!("  rejected: {}", reason);
            }
        }
    }
    Ok(())
}

fn print_path(result: &PathResult, format: &OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(result)?),
        OutputFormat::Table => {
            if !result.path_found {
                println!("(no path)");
                return Ok(());
            }
            let mut table = Table::new();
            table.set_content_arrangement(ContentArrangement::Dynamic);
            table.set_header(vec!["#", "type", "id", "name"]);
            for (i, step) in result.steps.iter().enumerate() {
                table.add_row(vec![
                    i.to_string(),
                    step.kind.to_string(),
                    step.id.clone(),
                    step.name.clone(),
                ]);
            }
            println!("{}", table);
            match result.degrees {
                Some(d) => println!("{} hop(s), {} degree(s) of separation", result.hops, d),
                None => println!("{} hop(s)", result.hops),
            }
        }
    }
    Ok(())
}

fn print_hits(hits: &[SearchHit], format: &OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(hits)?),
        OutputFormat::Table => {
            if hits.is_empty() {
                println!("(no results)");
                return Ok(());
            }
            let mut table = Table::new();
            table.set_content_arrangement(ContentArrangement::Dynamic);
            table.set_header(vec!["type", "id", "name", "year"]);
            for hit in hits {
                let year = hit.born.or(hit.year).map(|y| y.to_string()).unwrap_or_default();
                table.add_row(vec![hit.kind.to_string(), hit.id.clone(), hit.name.clone(), year]);
            }
            println!("{}", table);
            println!("{} result(s)", hits.len());
        }
    }
    Ok(())
}

fn run_shell(config: &Config, format: &OutputFormat) -> anyhow::Result<()> {
    let snapshot = load(config)?;
    let engine = PathEngine::new(config.query.clone());
    let stats = snapshot.statistics();
    println!("Six Degrees Interactive Shell ({} people, {} movies)", stats.people, stats.movies);
    println!("Type `<start> <end>` for a path, :search <text>, or :quit to exit.\n");

    let stdin = std::io::stdin();
    let mut line = String::new();

    loop {
        eprint!("sixdegrees> ");

        line.clear();
        if stdin.read_line(&mut line)? == 0 {
            break; // EOF
        }

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        match trimmed {
            ":quit" | ":exit" | ":q" => break,
            ":help" | ":h" => {
                println!("Commands:");
                println!("  <start> <end>    Shortest path between two references");
                println!("  :search <text>   Find people and movies by name");
                println!("  :quit            Exit shell");
            }
            other => {
                let outcome = if let Some(query) = other.strip_prefix(":search") {
                    engine
                        .search(&snapshot, query.trim())
                        .map_err(anyhow::Error::from)
                        .and_then(|hits| print_hits(&hits, format))
                } else {
                    let mut parts = other.split_whitespace();
                    match (parts.next(), parts.next(), parts.next()) {
                        (Some(start), Some(end), None) => engine
                            .find_shortest_path_str(&snapshot, start, end)
                            .map_err(anyhow::Error::from)
                            .and_then(|result| print_path(&result, format)),
                        _ => Err(anyhow::anyhow!("expected `<start> <end>`")),
                    }
                };
                if let Err(e) = outcome {
                    eprintln!("Error: {}", e);
                }
            }
        }
    }

    println!("Bye!");
    Ok(())
}
