//! Command-line interface for the ergraph utility
//!
//! Provides a CLI to generate Mermaid ER diagrams from decorated entity models.

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use tracing::debug;

use ergraph::core::logging::init_logging;
use ergraph::plugins::er::{SchemaGraph, SchemaStats};
use ergraph::{normalize_type, Diagnostics, Generator, GeneratorConfig};

/// ergraph - Generate entity-relationship diagrams from TypeScript models
#[derive(Parser)]
#[command(name = "ergraph")]
#[command(about = "Generate Mermaid ER diagrams from decorated TypeScript entity and enum files")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(author = env!("CARGO_PKG_AUTHORS"))]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Set log level (trace|debug|info|warn|error)
    #[arg(long, value_enum, default_value_t = LogLevel::Warn, global = true)]
    pub log_level: LogLevel,

    /// Set log format (compact|pretty|json)
    #[arg(long, value_enum, default_value_t = LogFormat::Compact, global = true)]
    pub log_format: LogFormat,
}

/// Log level options
#[derive(Copy, Clone, Debug, clap::ValueEnum, PartialEq, Eq)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

/// Log format options
#[derive(Copy, Clone, Debug, clap::ValueEnum, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

impl LogFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogFormat::Compact => "compact",
            LogFormat::Pretty => "pretty",
            LogFormat::Json => "json",
        }
    }
}

/// Where to read models from
#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceArgs {
    /// JSON config file; flags below override its values
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Directory containing *.entity.ts files
    #[arg(long)]
    pub models: Option<PathBuf>,

    /// Directory containing *.enum.ts files
    #[arg(long)]
    pub enums: Option<PathBuf>,

    /// Extract files on a single thread
    #[arg(long)]
    pub sequential: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Scan models and enums and write the Mermaid and HTML files
    Generate {
        #[command(flatten)]
        source: SourceArgs,

        /// Output file for the Mermaid diagram
        #[arg(long)]
        mermaid_out: Option<PathBuf>,

        /// Output file for the HTML viewer
        #[arg(long)]
        html_out: Option<PathBuf>,

        /// Title of the HTML viewer
        #[arg(long)]
        title: Option<String>,
    },

    /// Print the extracted schema without writing files
    Inspect {
        #[command(flatten)]
        source: SourceArgs,

        /// Print the graph and diagnostics as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the canonical diagram token for raw type expressions
    Normalize {
        /// Raw type expressions, e.g. "Date | null"
        #[arg(required = true)]
        types: Vec<String>,
    },
}

/// JSON document printed by `inspect --json`
#[derive(Serialize)]
struct InspectReport<'a> {
    stats: SchemaStats,
    graph: &'a SchemaGraph,
    diagnostics: &'a Diagnostics,
}

/// Main CLI application
pub struct ErgraphApp {
    base_config: GeneratorConfig,
}

impl ErgraphApp {
    /// Create a new application instance with default settings
    pub fn new() -> Self {
        Self::with_config(GeneratorConfig::default())
    }

    /// Create a new application instance on top of a base config
    pub fn with_config(base_config: GeneratorConfig) -> Self {
        Self { base_config }
    }

    /// Run the application with the given CLI arguments
    pub fn run(&self, cli: Cli) -> Result<()> {
        // Environment variables take precedence over CLI flags
        let log_level_str = std::env::var("ERGRAPH_LOG_LEVEL")
            .ok()
            .or_else(|| std::env::var("RUST_LOG").ok())
            .or_else(|| {
                let level = if cli.verbose && cli.log_level == LogLevel::Warn {
                    LogLevel::Info
                } else {
                    cli.log_level
                };
                Some(level.as_str().to_string())
            });

        let log_format_str = std::env::var("ERGRAPH_LOG_FORMAT")
            .ok()
            .or_else(|| Some(cli.log_format.as_str().to_string()));

        if let Err(e) = init_logging(log_level_str.as_deref(), log_format_str.as_deref()) {
            eprintln!("Warning: Failed to initialize logging: {}", e);
        }

        if cli.verbose {
            eprintln!("ergraph v{}", env!("CARGO_PKG_VERSION"));
        }

        match cli.command {
            Commands::Generate {
                source,
                mermaid_out,
                html_out,
                title,
            } => {
                let mut config = self.build_config(&source)?;
                if let Some(path) = mermaid_out {
                    config.mermaid_output = path;
                }
                if let Some(path) = html_out {
                    config.html_output = path;
                }
                if let Some(title) = title {
                    config.title = title;
                }
                self.generate_command(config, cli.verbose)
            }
            Commands::Inspect { source, json } => {
                let config = self.build_config(&source)?;
                self.inspect_command(config, json, cli.verbose)
            }
            Commands::Normalize { types } => self.normalize_command(&types),
        }
    }

    /// Merge the base config, an optional config file and CLI overrides
    pub fn build_config(&self, source: &SourceArgs) -> Result<GeneratorConfig> {
        let mut config = match &source.config {
            Some(path) => GeneratorConfig::from_file(path)?,
            None => self.base_config.clone(),
        };
        if let Some(models) = &source.models {
            config.models_dir = models.clone();
        }
        if let Some(enums) = &source.enums {
            config.enums_dir = enums.clone();
        }
        if source.sequential {
            config.parallel = false;
        }
        debug!(
            models = %config.models_dir.display(),
            enums = %config.enums_dir.display(),
            parallel = config.parallel,
            "Resolved config"
        );
        Ok(config)
    }

    /// Handle the generate command
    fn generate_command(&self, config: GeneratorConfig, verbose: bool) -> Result<()> {
        let report = Generator::new(config)?.generate()?;

        println!(
            "Found {} entities and {} enums",
            report.stats.entity_count, report.stats.enum_count
        );
        println!("Found {} relationships", report.stats.edge_count);
        println!("ER diagram written to: {}", report.html_path.display());
        println!("Mermaid syntax written to: {}", report.mermaid_path.display());

        let warnings = report.diagnostics.warning_count();
        if verbose {
            print_diagnostics(&report.diagnostics);
        } else if warnings > 0 {
            eprintln!("{} warnings (use --verbose to list them)", warnings);
        }
        Ok(())
    }

    /// Handle the inspect command
    fn inspect_command(&self, config: GeneratorConfig, json: bool, verbose: bool) -> Result<()> {
        let extraction = Generator::new(config)?.extract()?;

        if json {
            let document = InspectReport {
                stats: extraction.graph.stats(),
                graph: &extraction.graph,
                diagnostics: &extraction.diagnostics,
            };
            println!("{}", serde_json::to_string_pretty(&document)?);
            return Ok(());
        }

        print!("{}", summarize(&extraction.graph));
        print_diagnostics(&extraction.diagnostics);
        if verbose {
            eprintln!("{} diagnostics", extraction.diagnostics.len());
        }
        Ok(())
    }

    /// Handle the normalize command
    fn normalize_command(&self, types: &[String]) -> Result<()> {
        for raw in types {
            println!("{}\t{}", raw, normalize_type(raw));
        }
        Ok(())
    }
}

impl Default for ErgraphApp {
    fn default() -> Self {
        Self::new()
    }
}

/// Human-readable listing of a graph
pub fn summarize(graph: &SchemaGraph) -> String {
    let stats = graph.stats();
    let mut out = format!(
        "{} entities, {} enums, {} relationships ({} rendered)\n",
        stats.entity_count, stats.enum_count, stats.edge_count, stats.rendered_edge_count
    );

    for entity in graph.entities() {
        match &entity.table_name {
            Some(table) => out.push_str(&format!("\n{} ({})\n", entity.name, table)),
            None => out.push_str(&format!("\n{}\n", entity.name)),
        }
        for field in entity.sorted_fields() {
            let key = if field.is_primary_key { " PK" } else { "" };
            let optional = if field.is_optional { "?" } else { "" };
            out.push_str(&format!("  {}{}: {}{}\n", field.name, optional, field.ty, key));
        }
        for edge in &entity.relationships {
            out.push_str(&format!(
                "  {} {} {}\n",
                edge.property_name,
                edge.kind.symbol(),
                edge.to_entity
            ));
        }
    }

    for def in graph.enums() {
        out.push_str(&format!("\nenum {} [{}]\n", def.name, def.members.join(", ")));
    }
    out
}

fn print_diagnostics(diagnostics: &Diagnostics) {
    for diagnostic in diagnostics.iter() {
        eprintln!("{}", diagnostic);
    }
}
