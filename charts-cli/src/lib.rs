//! # Canvas Charts CLI
//!
//! Resolves chart documents into the configuration a canvas chart renderer
//! consumes, and bins raw values into histogram tables.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::Context;
use charts_core::{bin, resolve_config, ChartSpecDocument, StaticControllers, DEFAULT_BIN_COUNT};
use charts_runtime::default_catalog;
use clap::{Parser, Subcommand};
use serde_json::Value;

/// Command-line arguments.
#[derive(Parser, Debug)]
#[command(name = "chart-normalize")]
#[command(about = "Resolve chart documents into renderer configuration")]
#[command(version)]
pub struct CliArgs {
    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pub pretty: bool,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Resolve a chart document
    Normalize {
        /// Chart document path, or `-` for stdin
        #[arg(long)]
        spec: PathBuf,

        /// Extensions to treat as registered (e.g. matrix,financial)
        #[arg(long, env = "CHARTS_EXTENSIONS", value_delimiter = ',')]
        extensions: Vec<String>,
    },
    /// Bin values into a histogram table
    Bins {
        /// Values to bin
        #[arg(long, value_delimiter = ',', required = true, allow_negative_numbers = true)]
        values: Vec<f64>,

        /// Explicit bin edges
        #[arg(long, value_delimiter = ',', allow_negative_numbers = true)]
        edges: Option<Vec<f64>>,

        /// Number of equal-width bins when no edges are given
        #[arg(long, default_value_t = DEFAULT_BIN_COUNT)]
        count: usize,
    },
}

/// Controllers provided by the named extensions.
///
/// Catalog names expand to their controllers; any other name is taken as a
/// controller name.
#[must_use]
pub fn controllers_for(extensions: &[String]) -> StaticControllers {
    let catalog = default_catalog();
    let names = extensions
        .iter()
        .map(String::as_str)
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .flat_map(|name| match catalog.iter().find(|d| d.name == name) {
            Some(descriptor) => descriptor.controllers.clone(),
            None => {
                tracing::debug!("'{}' is not a catalog extension, using it as a controller", name);
                vec![name.to_string()]
            }
        });
    StaticControllers::from_names(names)
}

fn read_spec(path: &Path) -> anyhow::Result<String> {
    if path == Path::new("-") {
        let mut input = String::new();
        std::io::stdin()
            .read_to_string(&mut input)
            .context("Failed to read chart document from stdin")?;
        Ok(input)
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read chart document {}", path.display()))
    }
}

/// Resolve a chart document into renderer JSON.
///
/// # Errors
///
/// Returns an error if the document is malformed.
pub fn normalize_document(json: &str, extensions: &[String]) -> anyhow::Result<Value> {
    let spec = ChartSpecDocument::from_json(json)
        .context("Invalid chart document")?
        .into_spec();
    let config = resolve_config(&spec, &controllers_for(extensions));
    if config.resolved_type.fell_back {
        tracing::warn!(
            "No controller for {}; rendering as '{}'",
            spec.chart_type,
            config.tag()
        );
    }
    Ok(config.to_value())
}

/// Bin values into JSON `[{rangeLabel, start, end, count}]`.
///
/// # Errors
///
/// Returns an error if the table cannot be serialized.
pub fn bin_values(values: &[f64], edges: Option<&[f64]>, count: usize) -> anyhow::Result<Value> {
    let bins = bin(values, edges, count);
    tracing::debug!("Binned {} value(s) into {} bin(s)", values.len(), bins.len());
    Ok(serde_json::to_value(bins)?)
}

/// Run a parsed command line, returning the text to print.
///
/// # Errors
///
/// Returns an error if input cannot be read or parsed.
pub fn run(args: &CliArgs) -> anyhow::Result<String> {
    let output = match &args.command {
        Command::Normalize { spec, extensions } => {
            normalize_document(&read_spec(spec)?, extensions)?
        }
        Command::Bins {
            values,
            edges,
            count,
        } => bin_values(values, edges.as_deref(), *count)?,
    };

    Ok(if args.pretty {
        serde_json::to_string_pretty(&output)?
    } else {
        serde_json::to_string(&output)?
    })
}

#[cfg(test)]
mod tests {
    use charts_core::ControllerLookup;
    use serde_json::json;

    use super::*;

    #[test]
    fn catalog_names_expand_to_controllers() {
        let controllers = controllers_for(&["financial".to_string(), " sankey ".to_string()]);
        assert!(controllers.has_controller("candlestick"));
        assert!(controllers.has_controller("ohlc"));
        assert!(controllers.has_controller("sankey"));
        assert!(!controllers.has_controller("financial"));
    }

    #[test]
    fn normalize_without_extensions_falls_back() {
        let value = normalize_document(
            r#"{"type": "funnel", "datasets": [{"data": [3, 2, 1]}]}"#,
            &[],
        )
        .expect("normalize");
        assert_eq!(value["type"], json!("bar"));

        let value = normalize_document(
            r#"{"type": "funnel", "datasets": [{"data": [3, 2, 1]}]}"#,
            &["funnel".to_string()],
        )
        .expect("normalize");
        assert_eq!(value["type"], json!("funnel"));
    }

    #[test]
    fn normalize_rejects_unknown_type() {
        let err = normalize_document(r#"{"type": "sankey"}"#, &[]).expect_err("unknown type");
        assert!(err.to_string().contains("Invalid chart document"));
    }

    #[test]
    fn parses_bins_command() {
        let args = CliArgs::try_parse_from([
            "chart-normalize",
            "bins",
            "--values",
            "1,6,10",
            "--edges",
            "0,5,10",
        ])
        .expect("parse");
        let output = run(&args).expect("run");
        let bins: Value = serde_json::from_str(&output).expect("json");
        assert_eq!(bins[0]["rangeLabel"], json!("0.00 - 5.00"));
        assert_eq!(bins[0]["count"], json!(1));
        assert_eq!(bins[1]["count"], json!(2));
    }

    #[test]
    fn bins_accept_negative_values() {
        let args = CliArgs::try_parse_from([
            "chart-normalize",
            "bins",
            "--values=-2,2",
            "--count",
            "2",
        ])
        .expect("parse");
        let output = run(&args).expect("run");
        let bins: Value = serde_json::from_str(&output).expect("json");
        assert_eq!(bins.as_array().map(Vec::len), Some(2));
    }

    #[test]
    fn bins_require_values() {
        assert!(CliArgs::try_parse_from(["chart-normalize", "bins"]).is_err());
    }
}
