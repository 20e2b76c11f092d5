//! Codegen Pipeline Driver
//!
//! Runs the lowered-artifact lifecycle over a module description and reports
//! what the imported timing annotations say about each function.

mod pipeline;

use anyhow::{bail, Context, Result};
use cgp_annot::{AnnotationImporter, DocumentSource, JsonFileSource};
use cgp_common::{Diagnostic, ErrorReporter, LookupPolicy, Module, PipelineConfig};
use clap::{Args, Parser, Subcommand, ValueEnum};
use pipeline::{run_module, RunOptions, UnitReport};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "cgp")]
#[command(about = "Codegen pipeline: artifact lifecycle and timing annotations")]
#[command(version = "0.1.0")]
struct Cli {
    /// Enable logging (filter with RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the artifact lifecycle over every function of a module
    Run(RunArgs),

    /// Parse annotation documents and report what they contain
    Check {
        /// Annotation documents (JSON)
        #[arg(required = true)]
        documents: Vec<PathBuf>,
    },
}

#[derive(Args)]
struct RunArgs {
    /// Module description (JSON)
    module: PathBuf,

    /// Pipeline configuration file (JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Annotation document; may be repeated, consulted after the configured ones
    #[arg(short, long = "annotations", value_name = "FILE")]
    annotations: Vec<PathBuf>,

    /// Discard persisted artifacts and build fresh ones
    #[arg(long)]
    force_rebuild: bool,

    /// Persist artifacts between passes instead of dropping them
    #[arg(long)]
    preserve: bool,

    /// Which document answers when several have a record
    #[arg(long, value_enum)]
    policy: Option<PolicyArg>,

    /// Number of passes over the module
    #[arg(long, default_value_t = 1)]
    passes: usize,

    /// Never build artifacts; only reuse persisted ones
    #[arg(long)]
    consume_only: bool,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum PolicyArg {
    First,
    Last,
}

impl From<PolicyArg> for LookupPolicy {
    fn from(policy: PolicyArg) -> Self {
        match policy {
            PolicyArg::First => LookupPolicy::FirstMatch,
            PolicyArg::Last => LookupPolicy::LastMatch,
        }
    }
}

fn main() {
    let cli = Cli::parse();

    if cli.verbose {
        env_logger::init();
    }

    match cli.command {
        Commands::Run(args) => {
            if let Err(e) = run_command(&args) {
                eprintln!("Error running pipeline: {:#}", e);
                std::process::exit(1);
            }
        }
        Commands::Check { documents } => {
            if let Err(e) = check_command(&documents) {
                eprintln!("Error checking annotations: {:#}", e);
                std::process::exit(1);
            }
        }
    }
}

/// Configuration file first, then command-line overrides
fn build_config(args: &RunArgs) -> Result<PipelineConfig> {
    let mut config = match &args.config {
        Some(path) => PipelineConfig::load(path)
            .with_context(|| format!("loading configuration {}", path.display()))?,
        None => PipelineConfig::default(),
    };

    config.force_rebuild |= args.force_rebuild;
    config.preserve_on_release |= args.preserve;
    config
        .document_locations
        .extend(args.annotations.iter().map(|path| path.display().to_string()));
    if let Some(policy) = args.policy {
        config.lookup_policy = policy.into();
    }

    Ok(config)
}

fn run_command(args: &RunArgs) -> Result<()> {
    let module = Module::load(&args.module)?;
    let config = build_config(args)?;

    let mut importer = AnnotationImporter::from_config(&config);
    let summary = importer.initialize();
    let diagnostics = importer.diagnostics();
    if diagnostics.warning_count() > 0 {
        diagnostics.print_diagnostics();
        eprintln!("Annotations: {}", diagnostics.summary());
    }

    let options = RunOptions {
        passes: args.passes,
        consume_only: args.consume_only,
    };
    let reports = run_module(&module, &config, &importer, options)
        .with_context(|| format!("lifecycle aborted in module '{}'", module.name))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
        return Ok(());
    }

    if importer.is_available() {
        println!(
            "Loaded {} annotation document{} ({} skipped)",
            summary.loaded,
            if summary.loaded == 1 { "" } else { "s" },
            summary.skipped
        );
    } else {
        println!("No annotation data available");
    }
    print_reports(&module.name, &reports);
    Ok(())
}

fn print_reports(module: &str, reports: &[UnitReport]) {
    println!("\nModule '{}':", module);
    println!(
        "{:>4}  {:<24} {:>4}  {:<6} {:>10} {:>12}  {}",
        "pass", "function", "#", "source", "cost", "criticality", "release"
    );

    for report in reports {
        let cost = match (report.annotated, report.known_cost) {
            (_, Some(cost)) => cost.to_string(),
            (true, None) => "?".to_string(),
            (false, None) => "-".to_string(),
        };
        let criticality = report
            .max_criticality
            .map_or_else(|| "-".to_string(), |weight| format!("{:.3}", weight));

        println!(
            "{:>4}  {:<24} {:>4}  {:<6} {:>10} {:>12}  {}",
            report.pass,
            report.function,
            report.number,
            if report.reused { "reused" } else { "built" },
            cost,
            criticality,
            if report.persisted { "persisted" } else { "destroyed" }
        );
    }
}

fn check_command(documents: &[PathBuf]) -> Result<()> {
    let reporter = check_documents(documents);
    reporter.print_diagnostics();

    if reporter.has_errors() {
        bail!(
            "{} of {} documents could not be loaded ({})",
            reporter.error_count(),
            documents.len(),
            reporter.summary()
        );
    }
    Ok(())
}

/// Load each document, print what it holds and report the ones that fail
fn check_documents(documents: &[PathBuf]) -> ErrorReporter {
    let mut reporter = ErrorReporter::new();

    for path in documents {
        let location = path.display().to_string();
        match JsonFileSource.load(&location) {
            Ok(document) => println!(
                "{}: {} functions, {} blocks",
                location,
                document.function_count(),
                document.block_count()
            ),
            Err(e) => {
                reporter.report(
                    Diagnostic::error("annotation document could not be loaded".to_string())
                        .at(&location)
                        .with_note(e.to_string()),
                );
            }
        }
    }

    reporter
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_args(argv: &[&str]) -> RunArgs {
        let cli = Cli::try_parse_from(argv).expect("valid command line");
        match cli.command {
            Commands::Run(args) => args,
            Commands::Check { .. } => panic!("expected the run subcommand"),
        }
    }

    #[test]
    fn test_command_line_overrides() {
        let args = run_args(&[
            "cgp", "run", "m.json", "--preserve", "-a", "x.json", "-a", "y.json", "--policy", "last",
        ]);
        let config = build_config(&args).expect("no configuration file to read");

        assert!(config.preserve_on_release);
        assert!(!config.force_rebuild);
        assert_eq!(config.document_locations, vec!["x.json", "y.json"]);
        assert_eq!(config.lookup_policy, LookupPolicy::LastMatch);
        assert_eq!(args.passes, 1);
    }

    #[test]
    fn test_missing_configuration_file() {
        let args = run_args(&["cgp", "run", "m.json", "--config", "/nonexistent/cgp.json"]);
        assert!(build_config(&args).is_err());
    }

    #[test]
    fn test_check_reports_unreadable_documents() {
        let documents = vec![PathBuf::from("/nonexistent/a.json"), PathBuf::from("/nonexistent/b.json")];
        let reporter = check_documents(&documents);

        assert_eq!(reporter.error_count(), 2);
        assert_eq!(reporter.summary(), "2 errors");
        assert_eq!(reporter.diagnostics()[0].origin.as_deref(), Some("/nonexistent/a.json"));
        assert!(check_command(&documents).is_err());
    }

    #[test]
    fn test_check_requires_documents() {
        assert!(Cli::try_parse_from(["cgp", "check"]).is_err());
    }
}
