//! CLI adapter.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::app::api::{self, ConvertOptions, InspectOptions};
use crate::domain::{AppError, SourceConfig};

#[derive(Parser)]
#[command(name = "mapconv")]
#[command(version)]
#[command(
    about = "Convert ORM entity mapping metadata between formats",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Collect entity metadata from mapping sources and write it in a target format
    #[clap(visible_alias = "c")]
    Convert {
        /// Mapping source as <format>:<dir>; may be repeated
        #[arg(short, long = "source", value_name = "FORMAT:DIR", value_parser = parse_source)]
        sources: Vec<SourceConfig>,
        /// Target format (xml, yaml, native, annotation)
        #[arg(short, long)]
        to: Option<String>,
        /// Output directory for rendered mapping documents
        #[arg(short, long)]
        dest: Option<PathBuf>,
        /// Config file path (defaults to mapconv.toml)
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// List entities discovered across the mapping sources
    #[clap(visible_alias = "ls")]
    List {
        /// Mapping source as <format>:<dir>; may be repeated
        #[arg(short, long = "source", value_name = "FORMAT:DIR", value_parser = parse_source)]
        sources: Vec<SourceConfig>,
        /// Config file path (defaults to mapconv.toml)
        #[arg(long)]
        config: Option<PathBuf>,
        /// Emit the listing as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Entry point for the CLI.
pub fn run() {
    let cli = Cli::parse();

    let result: Result<(), AppError> = match cli.command {
        Commands::Convert { sources, to, dest, config } => {
            run_convert(ConvertOptions { sources, to, dest, config })
        }
        Commands::List { sources, config, json } => {
            run_list(InspectOptions { sources, config }, json)
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run_convert(options: ConvertOptions) -> Result<(), AppError> {
    let report = api::convert(options)?;
    println!("✅ Converted {} entity record(s) to {}", report.entities.len(), report.format);
    for (i, path) in report.written.iter().enumerate() {
        println!("  {}. {}", i + 1, path.display());
    }
    Ok(())
}

fn run_list(options: InspectOptions, json: bool) -> Result<(), AppError> {
    let summaries = api::inspect(options)?;
    if json {
        let rendered = serde_json::to_string_pretty(&summaries).map_err(|e| {
            AppError::RenderError { what: "entity listing".to_string(), details: e.to_string() }
        })?;
        println!("{}", rendered);
        return Ok(());
    }

    println!("Found {} entity record(s):", summaries.len());
    for summary in summaries {
        let table = summary.table.as_deref().unwrap_or("-");
        println!(
            "  {} (table: {}) {} field(s), {} association(s)",
            summary.name, table, summary.fields, summary.associations
        );
    }
    Ok(())
}

fn parse_source(raw: &str) -> Result<SourceConfig, String> {
    let (format, dir) = raw
        .split_once(':')
        .ok_or_else(|| format!("expected <format>:<dir>, got '{raw}'"))?;
    if format.is_empty() || dir.is_empty() {
        return Err(format!("expected <format>:<dir>, got '{raw}'"));
    }
    Ok(SourceConfig { dir: PathBuf::from(dir), format: format.to_string() })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_source_splits_format_and_dir() {
        let source = parse_source("xml:mappings/xml").unwrap();
        assert_eq!(source.format, "xml");
        assert_eq!(source.dir, PathBuf::from("mappings/xml"));
    }

    #[test]
    fn parse_source_keeps_colons_in_the_path() {
        let source = parse_source("yaml:odd:dir:name").unwrap();
        assert_eq!(source.format, "yaml");
        assert_eq!(source.dir, PathBuf::from("odd:dir:name"));
    }

    #[test]
    fn parse_source_rejects_missing_separator() {
        assert!(parse_source("xml").is_err());
        assert!(parse_source(":dir").is_err());
        assert!(parse_source("xml:").is_err());
    }
}
