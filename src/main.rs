use anyhow::{Context, Result};
use caselaw_gateway::config::{
    default_config_path, find_config_file, init_config_file, load_config, render_config, Config,
    LOCAL_CONFIG_FILE,
};
use caselaw_gateway::gateway::Gateway;
use caselaw_gateway::models::{
    DocId, DocumentRecord, DocumentRequest, SearchFilters, SearchQuery, SearchResultSet,
};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::io::IsTerminal;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Caselaw Gateway - keep the case-law API token server-side and give the browser a stable contract
#[derive(Parser, Debug)]
#[command(name = "caselaw-gateway")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Credential-injecting proxy for a case-law search API", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose logging (-v debug, -vv trace)
    #[arg(long, short, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(long, short, global = true)]
    quiet: bool,

    /// Configuration file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Output format for results
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum OutputFormat {
    /// Automatic based on terminal (table if TTY, JSON otherwise)
    Auto,
    /// Table format (human-readable)
    Table,
    /// JSON format (machine-readable)
    Json,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP proxy
    Serve {
        /// Host to bind to (overrides server.host)
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on (overrides server.port)
        #[arg(long, short)]
        port: Option<u16>,
    },

    /// Run one search through the gateway and print the normalized result
    #[command(alias = "s")]
    Search {
        /// Search query text
        query: String,

        /// Zero-based page number
        #[arg(long, default_value_t = 0)]
        page: u32,

        /// Maximum related citations per hit
        #[arg(long, default_value_t = 5)]
        max_cites: u32,

        #[command(flatten)]
        filters: FilterArgs,

        #[arg(long, short, value_enum, default_value_t = OutputFormat::Auto)]
        output: OutputFormat,
    },

    /// Fetch one document through the gateway
    #[command(alias = "d")]
    Doc {
        /// Document identifier
        doc_id: String,

        /// Maximum outbound citations
        #[arg(long, default_value_t = 5)]
        max_cites: u32,

        /// Maximum inbound (cited-by) citations
        #[arg(long, default_value_t = 5)]
        max_cited_by: u32,

        #[arg(long, short, value_enum, default_value_t = OutputFormat::Auto)]
        output: OutputFormat,
    },

    /// Inspect or create configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Args, Debug, Default)]
struct FilterArgs {
    /// Document types, e.g. "supremecourt,delhi"
    #[arg(long)]
    doctypes: Option<String>,

    /// Earliest date (DD-MM-YYYY)
    #[arg(long)]
    fromdate: Option<String>,

    /// Latest date (DD-MM-YYYY)
    #[arg(long)]
    todate: Option<String>,

    /// Words in the title
    #[arg(long)]
    title: Option<String>,

    /// Citation
    #[arg(long)]
    cite: Option<String>,

    /// Judgment author
    #[arg(long)]
    author: Option<String>,

    /// Bench member
    #[arg(long)]
    bench: Option<String>,
}

impl From<FilterArgs> for SearchFilters {
    fn from(args: FilterArgs) -> Self {
        SearchFilters {
            doctypes: args.doctypes,
            fromdate: args.fromdate,
            todate: args.todate,
            title: args.title,
            cite: args.cite,
            author: args.author,
            bench: args.bench,
        }
    }
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Print the effective configuration (token redacted)
    Show,

    /// Write a default configuration file
    Init {
        /// Destination (default: ./caselaw-gateway.toml)
        path: Option<PathBuf>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Print where configuration is looked up
    Path,
}

fn init_tracing(cli: &Cli, config: &Config) {
    let level = match (cli.quiet, cli.verbose) {
        (true, _) => "error",
        (false, 0) => config.logging.level.as_str(),
        (false, 1) => "debug",
        (false, _) => "trace",
    };

    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| format!("caselaw_gateway={}", level)),
    );

    let json = config
        .logging
        .format
        .as_deref()
        .is_some_and(|f| f.eq_ignore_ascii_case("json"));

    // Logs go to stderr so `search`/`doc` output stays pipeable
    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = cli.config.clone().or_else(find_config_file);
    let config = load_config(config_path.as_deref()).with_context(|| match &config_path {
        Some(path) => format!("Failed to load config from {}", path.display()),
        None => "Failed to load config from environment".to_string(),
    })?;

    init_tracing(&cli, &config);
    if let Some(path) = &config_path {
        tracing::info!("Using config file: {}", path.display());
    }

    match cli.command {
        Commands::Serve { host, port } => {
            let mut config = config;
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }

            if !config.has_token() {
                tracing::warn!(
                    "No upstream API token configured; every request will fail with 500. \
                     Set CASELAW_GATEWAY_UPSTREAM__API_TOKEN or INDIANKANOON_API_TOKEN."
                );
            }

            let gateway = Gateway::from_config(&config)?;
            caselaw_gateway::server::serve(&config.bind_addr(), gateway).await?;
        }

        Commands::Search {
            query,
            page,
            max_cites,
            filters,
            output,
        } => {
            let gateway = Gateway::from_config(&config)?;
            let query = SearchQuery::new(query)
                .page(page)
                .max_cites(max_cites)
                .filters(filters.into());

            let result = gateway
                .search(query)
                .await
                .map_err(|e| anyhow::anyhow!("Search failed: {}", e))?;
            output_search(&result, output)?;
        }

        Commands::Doc {
            doc_id,
            max_cites,
            max_cited_by,
            output,
        } => {
            let gateway = Gateway::from_config(&config)?;
            let request = DocumentRequest::new(doc_id)
                .max_cites(max_cites)
                .max_cited_by(max_cited_by);

            let record = gateway
                .document(request)
                .await
                .map_err(|e| anyhow::anyhow!("Document fetch failed: {}", e))?;
            output_document(&record, output)?;
        }

        Commands::Config { action } => match action {
            ConfigAction::Show => {
                print!("{}", render_config(&config, true)?);
            }
            ConfigAction::Init { path, force } => {
                let path = path.unwrap_or_else(|| PathBuf::from(LOCAL_CONFIG_FILE));
                init_config_file(&path, force)?;
                println!("Wrote {}", path.display());
            }
            ConfigAction::Path => {
                println!("./{}", LOCAL_CONFIG_FILE);
                if let Some(path) = default_config_path() {
                    println!("{}", path.display());
                }
                match config_path {
                    Some(path) => println!("Active: {}", path.display()),
                    None => println!("Active: none (defaults + environment)"),
                }
            }
        },
    }

    Ok(())
}

fn resolve_format(format: OutputFormat) -> OutputFormat {
    match format {
        OutputFormat::Auto if std::io::stdout().is_terminal() => OutputFormat::Table,
        OutputFormat::Auto => OutputFormat::Json,
        other => other,
    }
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() > max {
        let cut: String = text.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", cut)
    } else {
        text.to_string()
    }
}

fn output_search(result: &SearchResultSet, format: OutputFormat) -> Result<()> {
    match resolve_format(format) {
        OutputFormat::Table => {
            use comfy_table::{Attribute, Cell, Table};
            let mut table = Table::new();
            table.load_preset(comfy_table::presets::UTF8_FULL);
            table.set_header(vec!["ID", "Title", "Source", "Date"]);

            for doc in &result.docs {
                table.add_row(vec![
                    Cell::new(doc.tid.as_ref().map(DocId::to_string).unwrap_or_default()),
                    Cell::new(truncate(doc.title.as_deref().unwrap_or(""), 60))
                        .add_attribute(Attribute::Bold),
                    Cell::new(truncate(doc.docsource.as_deref().unwrap_or(""), 30)),
                    Cell::new(doc.publishdate.as_deref().unwrap_or("")),
                ]);
            }
            println!("{table}");
            println!("Found: {}", result.found);
        }
        _ => println!("{}", serde_json::to_string_pretty(result)?),
    }
    Ok(())
}

fn output_document(record: &DocumentRecord, format: OutputFormat) -> Result<()> {
    match resolve_format(format) {
        OutputFormat::Table => {
            use comfy_table::{Cell, Table};
            println!("{} ({})", record.title, record.tid);

            let mut table = Table::new();
            table.load_preset(comfy_table::presets::UTF8_FULL);
            table.set_header(vec!["Direction", "ID", "Title"]);
            let edges = record
                .cite_list
                .iter()
                .map(|c| ("cites", c))
                .chain(record.citedby_list.iter().map(|c| ("cited by", c)));
            for (direction, citation) in edges {
                table.add_row(vec![
                    Cell::new(direction),
                    Cell::new(citation.tid.as_ref().map(DocId::to_string).unwrap_or_default()),
                    Cell::new(truncate(citation.title.as_deref().unwrap_or(""), 60)),
                ]);
            }
            println!("{table}");
        }
        _ => println!("{}", serde_json::to_string_pretty(record)?),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_serve_command() {
        let cli = Cli::parse_from(["caselaw-gateway", "serve"]);
        match &cli.command {
            Commands::Serve { host, port } => {
                assert!(host.is_none());
                assert!(port.is_none());
            }
            _ => panic!("Expected Serve command"),
        }
    }

    #[test]
    fn test_cli_serve_overrides() {
        let cli = Cli::parse_from(["caselaw-gateway", "serve", "--host", "0.0.0.0", "-p", "8080"]);
        match &cli.command {
            Commands::Serve { host, port } => {
                assert_eq!(host.as_deref(), Some("0.0.0.0"));
                assert_eq!(*port, Some(8080));
            }
            _ => panic!("Expected Serve command"),
        }
    }

    #[test]
    fn test_cli_search_defaults() {
        let cli = Cli::parse_from(["caselaw-gateway", "search", "murder"]);
        match &cli.command {
            Commands::Search {
                query,
                page,
                max_cites,
                output,
                ..
            } => {
                assert_eq!(query, "murder");
                assert_eq!(*page, 0);
                assert_eq!(*max_cites, 5);
                assert_eq!(*output, OutputFormat::Auto);
            }
            _ => panic!("Expected Search command"),
        }
    }

    #[test]
    fn test_cli_search_with_filters() {
        let cli = Cli::parse_from([
            "caselaw-gateway",
            "search",
            "bail",
            "--page",
            "2",
            "--doctypes",
            "supremecourt",
            "--fromdate",
            "1-1-2015",
            "-o",
            "json",
        ]);
        match cli.command {
            Commands::Search {
                page,
                filters,
                output,
                ..
            } => {
                assert_eq!(page, 2);
                assert_eq!(output, OutputFormat::Json);
                let filters: SearchFilters = filters.into();
                assert_eq!(filters.doctypes.as_deref(), Some("supremecourt"));
                assert_eq!(filters.fromdate.as_deref(), Some("1-1-2015"));
                assert!(filters.bench.is_none());
            }
            _ => panic!("Expected Search command"),
        }
    }

    #[test]
    fn test_cli_doc_command() {
        let cli = Cli::parse_from(["caselaw-gateway", "doc", "1560742", "--max-cited-by", "9"]);
        match &cli.command {
            Commands::Doc {
                doc_id,
                max_cites,
                max_cited_by,
                ..
            } => {
                assert_eq!(doc_id, "1560742");
                assert_eq!(*max_cites, 5);
                assert_eq!(*max_cited_by, 9);
            }
            _ => panic!("Expected Doc command"),
        }
    }

    #[test]
    fn test_cli_config_init() {
        let cli = Cli::parse_from(["caselaw-gateway", "config", "init", "--force"]);
        match &cli.command {
            Commands::Config {
                action: ConfigAction::Init { path, force },
            } => {
                assert!(path.is_none());
                assert!(*force);
            }
            _ => panic!("Expected Config Init command"),
        }
    }

    #[test]
    fn test_cli_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["caselaw-gateway", "serve", "-vv", "--config", "gw.toml"]);
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.config, Some(PathBuf::from("gw.toml")));
    }

    #[test]
    fn test_truncate_is_char_safe() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("ābcdefghij", 6), "ābc...");
    }
}
