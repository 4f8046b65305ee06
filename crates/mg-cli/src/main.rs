#![forbid(unsafe_code)]

//! Mermaid graph CLI - parse, detect and validate Mermaid diagrams.
//!
//! # Commands
//!
//! - `parse`: Output the node/edge graph as JSON, or an error report
//! - `detect`: Show the detected diagram type and how it was decided
//! - `validate`: Check input for errors and report diagnostics

use std::io::{self, Read};
use std::path::Path;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use mg_core::{ErrorReport, ParseResult};
use mg_layout::LayoutConfig;
use mg_parser::{MermaidParser, ParseError, detect_with_method};
use serde::Serialize;
use tracing::{debug, info};

/// Mermaid graph CLI - parse, detect and validate Mermaid diagrams.
#[derive(Debug, Parser)]
#[command(
    name = "mg-cli",
    version,
    about = "Mermaid graph CLI - parse, detect and validate Mermaid diagrams",
    long_about = "Turns a restricted subset of Mermaid text into a node/edge graph.\n\n\
        Flowcharts get grid positions; sequence diagrams become participants\n\
        and messages. Other diagram types are detected but rejected."
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
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Parse a diagram and output its graph as JSON.
    Parse {
        /// Input file path or "-" for stdin. Anything else is parsed as inline text.
        #[arg(default_value = "-")]
        input: String,

        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,

        /// TOML file with layout grid settings
        #[arg(short, long)]
        config: Option<String>,
    },

    /// Detect the diagram type from its declaration line.
    Detect {
        /// Input file path or "-" for stdin.
        #[arg(default_value = "-")]
        input: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Validate a diagram and report diagnostics.
    Validate {
        /// Input file path or "-" for stdin.
        #[arg(default_value = "-")]
        input: String,

        /// Output as JSON (structured diagnostics)
        #[arg(long)]
        json: bool,

        /// Exit with non-zero status on warnings (not just errors)
        #[arg(long)]
        strict: bool,
    },
}

/// Result of detecting diagram type.
#[derive(Debug, Serialize)]
struct DetectResult {
    diagram_type: String,
    supported: bool,
    detection_method: String,
    first_line: String,
}

/// Result of validating a diagram.
#[derive(Debug, Serialize)]
struct ValidateResult {
    valid: bool,
    diagram_type: Option<String>,
    node_count: usize,
    edge_count: usize,
    warnings: Vec<Diagnostic>,
    errors: Vec<Diagnostic>,
}

#[derive(Debug, Serialize)]
struct Diagnostic {
    code: String,
    message: String,
    line: Option<usize>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose, cli.quiet);

    match cli.command {
        Command::Parse {
            input,
            pretty,
            config,
        } => cmd_parse(&input, pretty, config.as_deref()),

        Command::Detect { input, json } => cmd_detect(&input, json),

        Command::Validate {
            input,
            json,
            strict,
        } => cmd_validate(&input, json, strict),
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
        .with_writer(io::stderr)
        .without_time()
        .try_init();
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
        // Treat as inline diagram text
        Ok(input.to_string())
    }
}

fn load_layout_config(path: Option<&str>) -> Result<LayoutConfig> {
    let Some(path) = path else {
        return Ok(LayoutConfig::default());
    };
    let raw =
        std::fs::read_to_string(path).context(format!("Failed to read config file: {path}"))?;
    let config: LayoutConfig =
        toml::from_str(&raw).context(format!("Invalid layout config: {path}"))?;
    info!("Loaded layout config from: {path}");
    Ok(config)
}

fn to_json<T: Serialize>(value: &T, pretty: bool) -> Result<String> {
    let output = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    Ok(output)
}

// =============================================================================
// Command: parse
// =============================================================================

fn cmd_parse(input: &str, pretty: bool, config: Option<&str>) -> Result<()> {
    let source = load_input(input)?;
    let parser = MermaidParser::with_layout_config(load_layout_config(config)?);

    match parser.parse(&source) {
        Ok(result) => {
            debug!("Parse summary: {}", result.summary_json());
            println!("{}", to_json(&result, pretty)?);
            Ok(())
        }
        Err(error) => {
            println!("{}", to_json(&ErrorReport::from(&error), pretty)?);
            std::process::exit(1);
        }
    }
}

// =============================================================================
// Command: detect
// =============================================================================

fn cmd_detect(input: &str, json_output: bool) -> Result<()> {
    let source = load_input(input)?;
    let first_line = source
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .unwrap_or("");

    let detection = detect_with_method(first_line);
    let result = DetectResult {
        diagram_type: detection.diagram_type.as_str().to_string(),
        supported: detection.diagram_type.is_supported(),
        detection_method: detection.method.as_str().to_string(),
        first_line: first_line.chars().take(100).collect(),
    };

    if json_output {
        println!("{}", to_json(&result, true)?);
    } else {
        println!("Diagram type: {}", result.diagram_type);
        println!("Supported:    {}", if result.supported { "yes" } else { "no" });
        println!("Method:       {}", result.detection_method);
        if !first_line.is_empty() {
            println!(
                "First line:   {}",
                first_line.chars().take(60).collect::<String>()
            );
        }
    }

    Ok(())
}

// =============================================================================
// Command: validate
// =============================================================================

fn validate_source(source: &str, strict: bool) -> ValidateResult {
    match MermaidParser::new().parse(source) {
        Ok(result) => validation_from_result(&result, strict),
        Err(error) => validation_from_error(&error),
    }
}

fn validation_from_result(result: &ParseResult, strict: bool) -> ValidateResult {
    info!("Parse summary: {}", result.summary_json());

    let warnings: Vec<Diagnostic> = result
        .warnings
        .iter()
        .map(|warning| Diagnostic {
            code: warning.code.as_str().to_string(),
            message: warning.message.clone(),
            line: Some(warning.line_number),
        })
        .collect();

    ValidateResult {
        valid: !strict || warnings.is_empty(),
        diagram_type: Some(result.diagram_type.as_str().to_string()),
        node_count: result.nodes.len(),
        edge_count: result.edges.len(),
        warnings,
        errors: Vec::new(),
    }
}

fn validation_from_error(error: &ParseError) -> ValidateResult {
    let diagram_type = match error {
        ParseError::UnsupportedDiagramType(diagram_type) => Some(diagram_type.as_str().to_string()),
        _ => None,
    };
    let message = match error.details() {
        Some(details) => format!("{error} ({details})"),
        None => error.to_string(),
    };

    ValidateResult {
        valid: false,
        diagram_type,
        node_count: 0,
        edge_count: 0,
        warnings: Vec::new(),
        errors: vec![Diagnostic {
            code: error.code().as_str().to_string(),
            message,
            line: error.line_number(),
        }],
    }
}

fn cmd_validate(input: &str, json_output: bool, strict: bool) -> Result<()> {
    let source = load_input(input)?;
    let result = validate_source(&source, strict);

    if json_output {
        println!("{}", to_json(&result, true)?);
    } else {
        match (&result.diagram_type, result.valid) {
            (Some(diagram_type), true) => println!("✓ Valid {diagram_type} diagram"),
            _ => println!("✗ Invalid diagram"),
        }

        println!("  Nodes: {}", result.node_count);
        println!("  Edges: {}", result.edge_count);

        if !result.errors.is_empty() {
            println!("\nErrors:");
            for err in &result.errors {
                print_diagnostic(err);
            }
        }

        if !result.warnings.is_empty() {
            println!("\nWarnings:");
            for warn in &result.warnings {
                print_diagnostic(warn);
            }
        }
    }

    if !result.valid {
        std::process::exit(1);
    }

    Ok(())
}

fn print_diagnostic(diagnostic: &Diagnostic) {
    let location = diagnostic
        .line
        .map(|line| format!(" (line {line})"))
        .unwrap_or_default();
    println!("  [{}] {}{}", diagnostic.code, diagnostic.message, location);
}
