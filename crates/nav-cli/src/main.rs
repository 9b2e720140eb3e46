#![forbid(unsafe_code)]

//! nav - work with navigation page schemas from the command line.
//!
//! # Commands
//!
//! - `parse`: Output parsed components as JSON or YAML
//! - `lint`: Report lines the parser dropped or could not make sense of
//! - `sort`: Reorder sections and links alphabetically
//! - `search`: Filter a schema's links the way the page search box does
//! - `share`: Build a shareable `data:text/html,` URL (or a bookmarklet)
//! - `extract`: Recover the schema from a shareable URL
//! - `export`: Write links as a Chrome-importable bookmark file
//! - `watch`: Re-parse on file change (requires `watch` feature)

use std::io::{self, Read, Write};
use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use nav_core::{LinkComponent, NavConfig};
use nav_parser::{
    MAX_STARTING_COUNTER, ParseResult, SchemaParser, SearchIntent, build_search_matcher,
    parse_summary_json, sort_schema_by_sections,
};
use nav_render_html::{
    export_chrome_bookmarks, extract_shared_schema, generate_bookmarklet,
    generate_shareable_document,
};
use serde::Serialize;
use sha2::{Digest, Sha256};
use time::OffsetDateTime;
use tracing::{debug, info, warn};

/// nav - parse, lint, sort, share and export navigation schemas.
#[derive(Debug, Parser)]
#[command(
    name = "nav",
    version,
    about = "Parse, lint, sort, share and export navigation schemas",
    long_about = "Tooling for the plain-text navigation page format.\n\n\
        A schema is a title, headers, and one link per line. Input can be a\n\
        file path, \"-\" for stdin, or the schema text itself."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable verbose logging (can be repeated for more detail: -v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// TOML configuration file
    #[arg(short, long, global = true)]
    config: Option<String>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Parse a schema and output its components.
    Parse {
        /// Input file path or "-" for stdin.
        #[arg(default_value = "-")]
        input: String,

        /// Output format
        #[arg(short, long, value_enum, default_value = "json")]
        format: DataFormat,

        /// Output every component (default is summary)
        #[arg(long)]
        full: bool,

        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,

        /// Starting value for component keys (defaults to the current time in ms)
        #[arg(long, value_parser = clap::value_parser!(u64).range(..=MAX_STARTING_COUNTER))]
        counter: Option<u64>,
    },

    /// Report parse warnings.
    Lint {
        /// Input file path or "-" for stdin.
        #[arg(default_value = "-")]
        input: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,

        /// Exit with non-zero status when there are any warnings
        #[arg(long)]
        strict: bool,
    },

    /// Sort sections by header and links by text.
    Sort {
        /// Input file path or "-" for stdin.
        #[arg(default_value = "-")]
        input: String,

        /// Rewrite the input file instead of printing
        #[arg(short, long, conflicts_with = "output")]
        in_place: bool,

        /// Output file path. If omitted, writes to stdout.
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Filter links by text or URL. Start the query with `/` for fuzzy matching.
    Search {
        /// Search query
        query: String,

        /// Input file path or "-" for stdin.
        #[arg(default_value = "-")]
        input: String,

        /// Maximum number of results (defaults to the configured suggestion limit)
        #[arg(short, long)]
        limit: Option<usize>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Build a shareable data URL that opens the schema as a page.
    Share {
        /// Input file path or "-" for stdin.
        #[arg(default_value = "-")]
        input: String,

        /// Build the lighter bookmarklet variant
        #[arg(long)]
        bookmarklet: bool,

        /// Where the page loads index.css and index.js from
        #[arg(long)]
        base_url: Option<String>,

        /// Output file path. If omitted, writes to stdout.
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Print the schema embedded in a shareable data URL.
    Extract {
        /// Data URL, a file holding one, or "-" for stdin.
        #[arg(default_value = "-")]
        input: String,

        /// Output file path. If omitted, writes to stdout.
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Export links as a Netscape bookmark file for Chrome.
    Export {
        /// Input file path or "-" for stdin.
        #[arg(default_value = "-")]
        input: String,

        /// ADD_DATE value in seconds since the epoch (defaults to now)
        #[arg(long)]
        timestamp: Option<u64>,

        /// Output file path. If omitted, writes to stdout.
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Watch a schema file and re-parse on changes (requires `watch` feature).
    #[cfg(feature = "watch")]
    Watch {
        /// Input file path to watch.
        input: String,

        /// Clear screen before each report
        #[arg(long)]
        clear: bool,
    },
}

/// Serialization format for parse output.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
enum DataFormat {
    Json,
    Yaml,
}

#[derive(Debug, Serialize)]
struct LintResult {
    valid: bool,
    title: Option<String>,
    link_count: usize,
    source_sha256: String,
    warnings: Vec<LintWarning>,
}

#[derive(Debug, Serialize)]
struct LintWarning {
    code: &'static str,
    message: String,
    line: usize,
}

#[derive(Debug, Serialize)]
struct SearchHit<'a> {
    text: &'a str,
    url: &'a str,
    header: &'a str,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose, cli.quiet);
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Command::Parse {
            input,
            format,
            full,
            pretty,
            counter,
        } => cmd_parse(&config, &input, format, full, pretty, counter),

        Command::Lint {
            input,
            json,
            strict,
        } => cmd_lint(&config, &input, json, strict),

        Command::Sort {
            input,
            in_place,
            output,
        } => cmd_sort(&input, in_place, output.as_deref()),

        Command::Search {
            query,
            input,
            limit,
            json,
        } => cmd_search(&config, &query, &input, limit, json),

        Command::Share {
            input,
            bookmarklet,
            base_url,
            output,
        } => cmd_share(
            &config,
            &input,
            bookmarklet,
            base_url.as_deref(),
            output.as_deref(),
        ),

        Command::Extract { input, output } => cmd_extract(&input, output.as_deref()),

        Command::Export {
            input,
            timestamp,
            output,
        } => cmd_export(&config, &input, timestamp, output.as_deref()),

        #[cfg(feature = "watch")]
        Command::Watch { input, clear } => cmd_watch(&config, &input, clear),
    }
}

fn init_tracing(verbose: u8, quiet: bool) {
    let filter = if quiet {
        "error"
    } else {
        match verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .without_time()
        .with_writer(io::stderr)
        .try_init();
}

fn load_config(path: Option<&str>) -> Result<NavConfig> {
    let Some(path) = path else {
        return Ok(NavConfig::default());
    };
    let content =
        std::fs::read_to_string(path).context(format!("Failed to read config: {path}"))?;
    let config: NavConfig =
        toml::from_str(&content).context(format!("Failed to parse config: {path}"))?;
    config
        .validate()
        .context(format!("Invalid config: {path}"))?;
    debug!(path, "loaded config");
    Ok(config)
}

fn load_input(input: &str) -> Result<String> {
    if input == "-" {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .context("Failed to read from stdin")?;
        Ok(buffer)
    } else if Path::new(input).exists() {
        std::fs::read_to_string(input).context(format!("Failed to read file: {input}"))
    } else {
        // Inline schema text
        Ok(input.to_string())
    }
}

fn write_output(output: Option<&str>, content: &str) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, content).context(format!("Failed to write to: {path}"))?;
            info!("Wrote output to: {path}");
        }
        None => {
            let mut stdout = io::stdout();
            stdout
                .write_all(content.as_bytes())
                .and_then(|()| stdout.write_all(b"\n"))
                .context("Failed to write to stdout")?;
        }
    }
    Ok(())
}

fn parse_with(config: &NavConfig, source: &str, counter: Option<u64>) -> ParseResult {
    let parser = counter.map_or_else(SchemaParser::new, SchemaParser::with_counter);
    let mut parser = parser.with_config(config.parser.clone());
    let started = Instant::now();
    let parsed = parser.parse(source);
    debug!(
        components = parsed.components.len(),
        elapsed_us = started.elapsed().as_micros(),
        "parsed schema"
    );
    parsed
}

fn source_digest(source: &str) -> String {
    let digest = Sha256::digest(source.as_bytes());
    digest.iter().map(|byte| format!("{byte:02x}")).collect()
}

// =============================================================================
// Command: parse
// =============================================================================

fn cmd_parse(
    config: &NavConfig,
    input: &str,
    format: DataFormat,
    full: bool,
    pretty: bool,
    counter: Option<u64>,
) -> Result<()> {
    let source = load_input(input)?;
    let parsed = parse_with(config, &source, counter);

    let output = if full {
        match format {
            DataFormat::Json => parsed.to_json(pretty)?,
            DataFormat::Yaml => serde_yaml::to_string(&parsed)?,
        }
    } else {
        let mut summary: serde_json::Value = serde_json::from_str(&parse_summary_json(&parsed))?;
        summary["favicon"] = parsed.favicon_or(&config.page.default_favicon).into();
        summary["source_sha256"] = source_digest(&source).into();
        match format {
            DataFormat::Json if pretty => serde_json::to_string_pretty(&summary)?,
            DataFormat::Json => serde_json::to_string(&summary)?,
            DataFormat::Yaml => serde_yaml::to_string(&summary)?,
        }
    };
    write_output(None, output.trim_end())?;

    for warning in &parsed.warnings {
        warn!(line = warning.line, "Parse warning: {}", warning.message);
    }

    Ok(())
}

// =============================================================================
// Command: lint
// =============================================================================

fn cmd_lint(config: &NavConfig, input: &str, json_output: bool, strict: bool) -> Result<()> {
    let source = load_input(input)?;
    let parsed = parse_with(config, &source, None);

    let warnings: Vec<LintWarning> = parsed
        .warnings
        .iter()
        .map(|warning| LintWarning {
            code: warning.code.as_str(),
            message: warning.message.clone(),
            line: warning.line,
        })
        .collect();

    let result = LintResult {
        valid: !strict || warnings.is_empty(),
        title: parsed.title().map(str::to_string),
        link_count: parsed.links().count(),
        source_sha256: source_digest(&source),
        warnings,
    };

    if json_output {
        let output = serde_json::to_string_pretty(&result)?;
        println!("{output}");
    } else {
        match (&result.title, result.warnings.is_empty()) {
            (Some(title), true) => println!("✓ {title}"),
            (None, true) => println!("✓ Untitled schema"),
            (_, false) => println!("✗ {} warning(s)", result.warnings.len()),
        }
        println!("  Links: {}", result.link_count);

        if !result.warnings.is_empty() {
            println!("\nWarnings:");
            for warning in &result.warnings {
                println!("  [{}] line {}: {}", warning.code, warning.line, warning.message);
            }
        }
    }

    if !result.valid {
        std::process::exit(1);
    }

    Ok(())
}

// =============================================================================
// Command: sort
// =============================================================================

fn cmd_sort(input: &str, in_place: bool, output: Option<&str>) -> Result<()> {
    let source = load_input(input)?;
    let sorted = sort_schema_by_sections(&source);

    if in_place {
        if input == "-" || !Path::new(input).exists() {
            bail!("--in-place needs an existing file, got: {input}");
        }
        if sorted == source {
            info!("{input} is already sorted");
            return Ok(());
        }
        std::fs::write(input, &sorted).context(format!("Failed to write to: {input}"))?;
        info!("Sorted {input}");
        return Ok(());
    }

    write_output(output, &sorted)
}

// =============================================================================
// Command: search
// =============================================================================

fn cmd_search(
    config: &NavConfig,
    query: &str,
    input: &str,
    limit: Option<usize>,
    json_output: bool,
) -> Result<()> {
    let query = match SearchIntent::parse(query) {
        SearchIntent::Empty => bail!("Search query is empty"),
        SearchIntent::WebSearch(rest) => {
            bail!("`?{rest}` is a web search query; nothing to filter locally")
        }
        SearchIntent::Filter(query) => query,
    };
    let Some(matcher) = build_search_matcher(query) else {
        bail!("Query `{query}` has nothing to match");
    };
    debug!(mode = matcher.mode().as_str(), pattern = matcher.pattern(), "search");

    let source = load_input(input)?;
    let parsed = parse_with(config, &source, None);
    let limit = limit.unwrap_or(config.search.suggestion_limit);

    let hits: Vec<SearchHit<'_>> = parsed
        .links()
        .filter(|link| matcher.is_match(&link.link_text) || matcher.is_match(&link.link_url))
        .take(limit)
        .map(search_hit)
        .collect();

    if json_output {
        println!("{}", serde_json::to_string_pretty(&hits)?);
    } else {
        for hit in &hits {
            println!("{}\t{}", hit.text, hit.url);
        }
    }

    Ok(())
}

fn search_hit(link: &LinkComponent) -> SearchHit<'_> {
    SearchHit {
        text: &link.link_text,
        url: &link.link_url,
        header: &link.header_name,
    }
}

// =============================================================================
// Command: share / extract
// =============================================================================

fn cmd_share(
    config: &NavConfig,
    input: &str,
    bookmarklet: bool,
    base_url: Option<&str>,
    output: Option<&str>,
) -> Result<()> {
    let base_url = match base_url {
        Some(url) => {
            let mut checked = config.clone();
            checked.share.base_url = url.to_string();
            checked.validate().context("Invalid --base-url")?;
            checked.share.base_url
        }
        None => config.share.base_url.clone(),
    };

    let source = load_input(input)?;
    let url = if bookmarklet {
        generate_bookmarklet(&source, &base_url)
    } else {
        generate_shareable_document(&source, &base_url)
    };
    debug!(bytes = url.len(), bookmarklet, "built data URL");
    write_output(output, &url)
}

fn cmd_extract(input: &str, output: Option<&str>) -> Result<()> {
    let source = load_input(input)?;
    let schema = extract_shared_schema(&source).context("Failed to extract schema")?;
    write_output(output, &schema)
}

// =============================================================================
// Command: export
// =============================================================================

fn cmd_export(
    config: &NavConfig,
    input: &str,
    timestamp: Option<u64>,
    output: Option<&str>,
) -> Result<()> {
    let source = load_input(input)?;
    let parsed = parse_with(config, &source, None);
    let timestamp = timestamp.unwrap_or_else(|| {
        u64::try_from(OffsetDateTime::now_utc().unix_timestamp()).unwrap_or_default()
    });
    let html = export_chrome_bookmarks(&parsed.components, timestamp);
    write_output(output, html.trim_end())
}

// =============================================================================
// Command: watch (optional feature)
// =============================================================================

#[cfg(feature = "watch")]
fn cmd_watch(config: &NavConfig, input: &str, clear: bool) -> Result<()> {
    use notify::{Config, RecommendedWatcher, RecursiveMode, Watcher};
    use std::sync::mpsc::channel;
    use std::time::Duration;

    let path = Path::new(input);
    if !path.exists() {
        bail!("File not found: {input}");
    }

    let (tx, rx) = channel();

    let mut watcher = RecommendedWatcher::new(tx, Config::default())?;
    watcher.watch(path, RecursiveMode::NonRecursive)?;

    println!("Watching {input} for changes... (Ctrl+C to stop)");

    if let Err(e) = report_once(config, input, clear) {
        eprintln!("Initial parse failed: {e}");
    }

    loop {
        match rx.recv_timeout(Duration::from_secs(1)) {
            Ok(Ok(_event)) => {
                // Debounce rapid events
                std::thread::sleep(Duration::from_millis(100));
                while rx.try_recv().is_ok() {}

                if let Err(e) = report_once(config, input, clear) {
                    eprintln!("Parse error: {e}");
                }
            }
            Ok(Err(e)) => {
                eprintln!("Watch error: {e}");
            }
            Err(std::sync::mpsc::RecvTimeoutError::Timeout) => {}
            Err(std::sync::mpsc::RecvTimeoutError::Disconnected) => {
                break;
            }
        }
    }

    Ok(())
}

#[cfg(feature = "watch")]
fn report_once(config: &NavConfig, input: &str, clear: bool) -> Result<()> {
    let source = std::fs::read_to_string(input).context(format!("Failed to read file: {input}"))?;
    let parsed = parse_with(config, &source, None);

    if clear {
        print!("\x1B[2J\x1B[H");
    }
    println!(
        "{}: {} sections, {} links, {} warnings",
        parsed.title().unwrap_or(input),
        parsed.sections().len(),
        parsed.links().count(),
        parsed.warnings.len()
    );
    for warning in &parsed.warnings {
        println!("  line {}: {}", warning.line, warning.message);
    }
    io::stdout().flush().context("Failed to flush stdout")?;
    Ok(())
}
