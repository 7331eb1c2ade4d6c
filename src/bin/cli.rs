use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use windowguard::config::Config;
use windowguard::error::GuardError;
use windowguard::output::OutputFormat;
use windowguard::rules::{RuleEngine, Severity};
use windowguard::{ScanOptions, ScanReport};

#[derive(Parser)]
#[command(
    name = "windowguard",
    about = "Finds Electron BrowserWindows that expose Node.js to web content",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan a source tree for insecure BrowserWindow options
    Scan {
        /// Path to the application directory or a single source file
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Config file path
        #[arg(long, short = 'c')]
        config: Option<PathBuf>,

        /// Output format (console, json, sarif)
        #[arg(long, short = 'f', default_value = "console")]
        format: String,

        /// Minimum severity to fail (info, low, medium, high, critical)
        #[arg(long)]
        fail_on: Option<String>,

        /// Write output to file instead of stdout
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },

    /// Run the checks on an ESTree JSON dump produced by another parser
    CheckAst {
        /// ESTree JSON file
        path: PathBuf,

        /// Config file path (only [checks] and [policy] are used)
        #[arg(long, short = 'c')]
        config: Option<PathBuf>,

        /// Output format (console, json, sarif)
        #[arg(long, short = 'f', default_value = "console")]
        format: String,
    },

    /// List all available detection rules
    ListRules {
        /// Output format (table, json)
        #[arg(long, short = 'f', default_value = "table")]
        format: String,
    },

    /// Generate a starter .windowguard.toml config file
    Init {
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Scan {
            path,
            config,
            format,
            fail_on,
            output,
        } => cmd_scan(path, config, format, fail_on, output),
        Commands::CheckAst {
            path,
            config,
            format,
        } => cmd_check_ast(path, config, format),
        Commands::ListRules { format } => cmd_list_rules(format),
        Commands::Init { force } => cmd_init(force),
    };

    match result {
        Ok(exit_code) => process::exit(exit_code),
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(e.exit_code());
        }
    }
}

fn parse_format(format_str: &str) -> OutputFormat {
    OutputFormat::from_str_lenient(format_str).unwrap_or_else(|| {
        eprintln!("Warning: unknown format '{}', using console", format_str);
        OutputFormat::Console
    })
}

fn cmd_scan(
    path: PathBuf,
    config: Option<PathBuf>,
    format_str: String,
    fail_on_str: Option<String>,
    output_path: Option<PathBuf>,
) -> Result<i32, GuardError> {
    let format = parse_format(&format_str);

    let fail_on = fail_on_str.and_then(|s| {
        let sev = Severity::from_str_lenient(&s);
        if sev.is_none() {
            eprintln!("Warning: unknown severity '{}', using config default", s);
        }
        sev
    });

    let options = ScanOptions {
        config_path: config,
        format,
        fail_on_override: fail_on,
    };

    let report = windowguard::scan(&path, &options)?;
    let rendered = windowguard::render_report(&report, format)?;

    match output_path {
        Some(out) => std::fs::write(&out, &rendered)?,
        None => print!("{}", rendered),
    }

    // Exit code: 0 = pass, 1 = findings above threshold
    Ok(if report.verdict.pass { 0 } else { 1 })
}

fn cmd_check_ast(
    path: PathBuf,
    config: Option<PathBuf>,
    format_str: String,
) -> Result<i32, GuardError> {
    let format = parse_format(&format_str);
    let config = match config {
        Some(config_path) => Config::load(&config_path)?,
        None => Config::default(),
    };

    let started_at = chrono::Utc::now();
    let json = std::fs::read_to_string(&path)?;
    let issues = windowguard::check_estree(&json, &path, &config.checks)?;

    let policy = &config.policy;
    let report = ScanReport {
        target_name: path.display().to_string(),
        started_at,
        files_scanned: 1,
        findings: policy.apply(&issues),
        verdict: policy.evaluate(&issues),
    };

    print!("{}", windowguard::render_report(&report, format)?);
    Ok(if report.verdict.pass { 0 } else { 1 })
}

fn cmd_list_rules(format_str: String) -> Result<i32, GuardError> {
    let engine = RuleEngine::default();
    let rules = engine.list_rules();

    match format_str.as_str() {
        "json" => {
            let json = serde_json::to_string_pretty(&rules)?;
            println!("{}", json);
        }
        _ => {
            println!(
                "{:<28} {:<30} {:<10} {:<8}",
                "ID", "NAME", "SEVERITY", "CWE"
            );
            println!("{}", "-".repeat(80));
            for rule in &rules {
                println!(
                    "{:<28} {:<30} {:<10} {:<8}",
                    rule.id,
                    rule.name,
                    rule.default_severity.to_string(),
                    rule.cwe_id.as_deref().unwrap_or("-"),
                );
            }
        }
    }

    Ok(0)
}

fn cmd_init(force: bool) -> Result<i32, GuardError> {
    let path = PathBuf::from(".windowguard.toml");

    if path.exists() && !force {
        eprintln!(".windowguard.toml already exists. Use --force to overwrite.");
        return Ok(1);
    }

    std::fs::write(&path, Config::starter_toml())?;
    println!("Created .windowguard.toml");

    Ok(0)
}
