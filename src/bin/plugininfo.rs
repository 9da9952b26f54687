use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;

use plugininfo_core::config::{Config, LogFormat, DEBUG_LOG_FILTER};
use plugininfo_core::operations::export_reports;
use plugininfo_core::registry::{self, describe_all, describe_plugin, grep_plugins, related_uris};
use plugininfo_core::{telemetry, FactGraph};

/// Validate and describe LV2 plugin metadata.
#[derive(Parser, Debug)]
#[command(name = "plugininfo", version, disable_help_subcommand = true)]
struct Cli {
    /// JSON fact document to load; repeat to merge several.
    #[arg(
        long = "facts",
        value_name = "FILE",
        env = "PLUGININFO_FACTS",
        value_delimiter = ',',
        global = true
    )]
    facts: Vec<PathBuf>,
    /// JSON configuration file.
    #[arg(long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,
    /// Log filter directive, e.g. `info` or `plugininfo_core=debug`.
    #[arg(long, value_name = "FILTER", env = "PLUGININFO_LOG", global = true)]
    log: Option<String>,
    #[arg(long, value_enum, global = true)]
    log_format: Option<LogFormat>,
    /// Enable debug logging.
    #[arg(short, long, global = true)]
    debug: bool,
    /// Worker threads used when describing every plugin.
    #[arg(long, value_name = "N", global = true)]
    jobs: Option<usize>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the validated descriptor of one plugin, or of every plugin.
    Info {
        uri: Option<String>,
        /// Pretty-print the JSON output.
        #[arg(short, long)]
        pretty: bool,
    },
    /// List plugins whose URI matches a regular expression.
    List {
        pattern: Option<String>,
        #[arg(short, long)]
        ignore_case: bool,
        /// Print a JSON list of objects instead of bare URIs.
        #[arg(short, long)]
        json: bool,
        /// Add the categories of each plugin (requires -j).
        #[arg(short, long, requires = "json")]
        categories: bool,
    },
    /// List the presets of a plugin.
    Presets { uri: String },
    /// Print the bundle, library, data and resource URIs of a plugin.
    Uris { uri: String },
    /// Describe every plugin and write the reports to a directory.
    Report { dir: PathBuf },
}

fn resolve_config(cli: &Cli) -> Result<Config> {
    let mut config = Config::load(cli.config.as_deref())?;
    if !cli.facts.is_empty() {
        config.facts = cli.facts.clone();
    }
    if let Some(log) = &cli.log {
        config.log_filter = log.clone();
    }
    if cli.debug {
        config.log_filter = DEBUG_LOG_FILTER.to_string();
    }
    if let Some(format) = cli.log_format {
        config.log_format = format;
    }
    if cli.jobs.is_some() {
        config.jobs = cli.jobs;
    }
    Ok(config)
}

fn print_json<T: Serialize>(value: &T, pretty: bool) -> Result<()> {
    let json = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{}", json);
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = resolve_config(&cli)?;
    telemetry::initialise(&config)?;

    if config.facts.is_empty() {
        bail!("no fact documents given; use --facts or PLUGININFO_FACTS");
    }
    let graph = FactGraph::load_files(config.facts.as_slice()).context("Failed to load plugin metadata")?;

    match cli.command {
        Command::Info { uri, pretty } => {
            config.pretty |= pretty;
            match uri {
                Some(uri) => print_json(&describe_plugin(&graph, &uri)?, config.pretty)?,
                None => print_json(&describe_all(&graph, config.jobs)?, config.pretty)?,
            }
        }
        Command::List {
            pattern,
            ignore_case,
            json,
            categories,
        } => {
            let summaries = grep_plugins(&graph, pattern.as_deref().unwrap_or(""), ignore_case)?;
            if json {
                let listing: Vec<serde_json::Value> = summaries
                    .iter()
                    .map(|summary| {
                        let mut entry = serde_json::json!({
                            "name": summary.name,
                            "uri": summary.uri,
                        });
                        if categories {
                            entry["categories"] = serde_json::json!(summary.categories);
                        }
                        entry
                    })
                    .collect();
                print_json(&listing, true)?;
            } else {
                for summary in summaries {
                    println!("{}", summary.uri);
                }
            }
        }
        Command::Presets { uri } => {
            print_json(&registry::list_presets(&graph, &uri)?, config.pretty)?;
        }
        Command::Uris { uri } => {
            print_json(&related_uris(&graph, &uri)?, config.pretty)?;
        }
        Command::Report { dir } => {
            let descriptors = describe_all(&graph, config.jobs)?;
            let manifest = export_reports(&descriptors, &dir)?;
            println!("{}", manifest.display());
        }
    }

    Ok(())
}
