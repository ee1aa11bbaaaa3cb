//! deduction-graph CLI
//!
//! Builds deduction dependency graphs from solver trace tables.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Once;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use deduction_graph::{annotate, export, table, BuildOptions, DeductionGraph, HeightConfig, Palette};

#[derive(Parser)]
#[command(name = "deduction-graph")]
#[command(about = "Deduction dependency graphs from puzzle solver traces", long_about = None)]
struct Cli {
    /// Verbose mode
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the merged graph and write DOT, JSON, or an image via Graphviz
    Graph {
        /// Trace table (CSV)
        input: PathBuf,

        /// Output file (default: <input stem>.<format>)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Height increment config (JSON)
        #[arg(short, long, env = "DEDUCTION_GRAPH_CONFIG")]
        config: Option<PathBuf>,

        /// Output format; inferred from the output extension when omitted
        #[arg(short, long, value_enum)]
        format: Option<OutputFormat>,

        /// Don't merge sibling nodes
        #[arg(long)]
        no_merge: bool,

        /// Drop edges from hints that have no row of their own
        #[arg(long)]
        no_implicit_hints: bool,

        /// Graph title (default: input file stem)
        #[arg(long)]
        title: Option<String>,
    },

    /// Write the table back with a computed Height column
    Annotate {
        /// Trace table (CSV)
        input: PathBuf,

        /// Output table (default: <input stem>_with_height.csv)
        output: Option<PathBuf>,

        /// Height increment config (JSON)
        #[arg(short, long, env = "DEDUCTION_GRAPH_CONFIG")]
        config: Option<PathBuf>,
    },

    /// Print graph statistics
    Stats {
        /// Trace table (CSV)
        input: PathBuf,

        /// Height increment config (JSON)
        #[arg(short, long, env = "DEDUCTION_GRAPH_CONFIG")]
        config: Option<PathBuf>,

        /// Don't merge sibling nodes
        #[arg(long)]
        no_merge: bool,

        /// Output as JSON (machine-readable)
        #[arg(long)]
        json: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Dot,
    Json,
    Png,
    Svg,
    Pdf,
    Jpg,
}

impl OutputFormat {
    fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()).map(str::to_ascii_lowercase).as_deref() {
            Some("dot") | Some("gv") => OutputFormat::Dot,
            Some("json") => OutputFormat::Json,
            Some("svg") => OutputFormat::Svg,
            Some("pdf") => OutputFormat::Pdf,
            Some("jpg") | Some("jpeg") => OutputFormat::Jpg,
            _ => OutputFormat::Png,
        }
    }

    fn extension(self) -> &'static str {
        match self {
            OutputFormat::Dot => "dot",
            OutputFormat::Json => "json",
            OutputFormat::Png => "png",
            OutputFormat::Svg => "svg",
            OutputFormat::Pdf => "pdf",
            OutputFormat::Jpg => "jpg",
        }
    }
}

static INIT: Once = Once::new();

/// Reads `DEDUCTION_GRAPH_LOG` (e.g. `deduction_graph=debug`); falls back to
/// `deduction_graph=info`, or `debug` with `--verbose`.
fn init_tracing(verbose: bool) {
    INIT.call_once(|| {
        let fallback = if verbose { "deduction_graph=debug" } else { "deduction_graph=info" };
        let filter = EnvFilter::try_from_env("DEDUCTION_GRAPH_LOG")
            .unwrap_or_else(|_| EnvFilter::new(fallback));

        tracing_subscriber::registry()
            .with(fmt::layer().with_target(verbose).with_writer(std::io::stderr))
            .with(filter)
            .init();
    });
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Graph { input, output, config, format, no_merge, no_implicit_hints, title } => {
            let config = HeightConfig::load_or_default(config.as_deref())?;
            let options = BuildOptions {
                merge_siblings: !no_merge,
                materialize_hints: !no_implicit_hints,
            };
            let graph = load_graph(&input, &config, &options)?;

            let format = format
                .or_else(|| output.as_deref().map(OutputFormat::from_path))
                .unwrap_or(OutputFormat::Png);
            let output = output.unwrap_or_else(|| default_output(&input, "", format.extension()));
            let title = title.unwrap_or_else(|| file_stem(&input));

            println!("Reading: {}", input.display());
            println!("   {}", graph.summary());

            match format {
                OutputFormat::Dot => {
                    let dot = export::to_dot(&graph, &title, &Palette::default());
                    std::fs::write(&output, dot)
                        .with_context(|| format!("writing {}", output.display()))?;
                }
                OutputFormat::Json => {
                    let json = export::to_json(&graph, &title)?;
                    std::fs::write(&output, json)
                        .with_context(|| format!("writing {}", output.display()))?;
                }
                _ => {
                    let dot = export::to_dot(&graph, &title, &Palette::default());
                    export::render(&dot, &output)?;
                }
            }
            println!("Graph saved to: {}", output.display());
        }

        Commands::Annotate { input, output, config } => {
            let config = HeightConfig::load_or_default(config.as_deref())?;
            let file = File::open(&input).with_context(|| format!("opening {}", input.display()))?;
            let table = table::read_table(BufReader::new(file))?;
            info!(rows = table.len(), "table loaded");

            let annotated = annotate::annotate_heights(&table, &config);
            let output = output.unwrap_or_else(|| default_output(&input, "_with_height", "csv"));

            let file = File::create(&output).with_context(|| format!("creating {}", output.display()))?;
            let mut writer = BufWriter::new(file);
            table::write_table(&mut writer, &annotated.header, &annotated.records)?;
            writer.flush()?;
            println!("Output: {}", output.display());
        }

        Commands::Stats { input, config, no_merge, json } => {
            let config = HeightConfig::load_or_default(config.as_deref())?;
            let options = BuildOptions { merge_siblings: !no_merge, ..Default::default() };
            let graph = load_graph(&input, &config, &options)?;

            if json {
                println!("{}", serde_json::to_string_pretty(graph.summary())?);
            } else {
                let s = graph.summary();
                println!("Rows:            {} ({} skipped, {} duplicate)", s.rows_read, s.rows_skipped, s.duplicate_cells);
                println!("Cells:           {} (+{} implicit hints)", s.cells, s.implicit_hints);
                println!("Nodes:           {} ({} merged, {} cells absorbed)", s.nodes, s.merged_nodes, s.merged_cells);
                println!("Edges:           {}", s.edges);
                println!("Dangling refs:   {}", s.dangling_references);
                println!("Level conflicts: {}", s.level_conflicts);
                if let (Some(lo), Some(hi)) = (s.min_height, s.max_height) {
                    println!("Height range:    {lo} - {hi}");
                }
            }
        }
    }

    Ok(())
}

fn load_graph(input: &Path, config: &HeightConfig, options: &BuildOptions) -> Result<DeductionGraph> {
    let file = File::open(input).with_context(|| format!("opening {}", input.display()))?;
    DeductionGraph::from_reader(BufReader::new(file), config, options)
        .with_context(|| format!("reading {}", input.display()))
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "graph".to_string())
}

/// `<dir>/<stem><suffix>.<ext>` next to the input.
fn default_output(input: &Path, suffix: &str, ext: &str) -> PathBuf {
    input.with_file_name(format!("{}{}.{}", file_stem(input), suffix, ext))
}
