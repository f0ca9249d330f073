use crate::config::Config;
use crate::report::render_diagnostic;
use anyhow::{anyhow, Result};
use clap::{Args, ValueEnum};
use colored::Colorize;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use stencil_generator::{
    add_references, generate_all, Diagnostic, GeneratedArtifact, GenerationReport, PassFailure,
};
use stencil_parser::error::pretty;
use stencil_semantics::{Compilation, SemanticError};
use tracing::debug;
use walkdir::WalkDir;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Args)]
pub struct GenerateArgs {
    /// Project directory (defaults to current directory)
    #[arg(default_value = ".")]
    pub path: String,

    /// Output directory (overrides config)
    #[arg(short, long)]
    pub out_dir: Option<String>,

    /// Print generated sources instead of writing files
    #[arg(long)]
    pub stdout: bool,

    /// Report format
    #[arg(short, long, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

/// Machine-readable result of `stencil generate --format json`
#[derive(Debug, Serialize)]
struct JsonReport<'a> {
    artifacts: Vec<&'a GeneratedArtifact>,
    diagnostics: Vec<&'a Diagnostic>,
    failures: &'a [PassFailure],
}

pub fn generate(args: GenerateArgs, cwd: &str) -> Result<()> {
    let root = PathBuf::from(cwd).join(&args.path);
    let config = Config::load(&root)?;
    let src_dir = config.get_src_dir(&root);
    let out_dir = match &args.out_dir {
        Some(out) => PathBuf::from(cwd).join(out),
        None => config.get_out_dir(&root),
    };

    if !src_dir.exists() {
        return Err(anyhow!("Source directory does not exist: {:?}", src_dir));
    }

    let text = args.format == OutputFormat::Text;
    if text {
        println!("{}", "🔨 Generating declarations...".bright_blue().bold());
    }

    let mut compilation = Compilation::new();
    add_references(&mut compilation)?;

    let sources = find_cs_files(&src_dir, &out_dir);
    debug!(files = sources.len(), dir = %src_dir.display(), "discovered sources");

    let mut parse_errors = 0;
    for dir in config.get_reference_dirs(&root) {
        for file in reference_files(&dir, &out_dir, &sources) {
            let path = display_path(&file, &root);
            let source = fs::read_to_string(&file)?;
            if let Err(error) = compilation.add_reference(&path, &source) {
                report_parse_error(&error, &source);
                parse_errors += 1;
            }
        }
    }

    for file in &sources {
        let path = display_path(file, &root);
        let source = fs::read_to_string(file)?;
        if let Err(error) = compilation.add_source(&path, &source) {
            report_parse_error(&error, &source);
            parse_errors += 1;
        }
    }

    if text {
        println!("Found {} files", sources.len());
    }

    let model = compilation.semantic_model();
    let registry = config.registry();
    let templates = config.template_source(&root);
    let report = generate_all(&registry, &model, &templates);

    let mut written = Vec::new();
    if !args.stdout {
        for artifact in report.artifacts() {
            written.push((artifact, artifact.write_to(&out_dir)?));
        }
    }

    match args.format {
        OutputFormat::Json => {
            let json = JsonReport {
                artifacts: report.artifacts().collect(),
                diagnostics: report.diagnostics().collect(),
                failures: &report.failures,
            };
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
        OutputFormat::Text => {
            if args.stdout {
                for artifact in report.artifacts() {
                    println!("{}", format!("// {}", artifact.hint_name).dimmed());
                    println!("{}", artifact.text);
                }
            }
            for (artifact, path) in &written {
                println!("  {} {} → {}", "✓".green(), artifact.target, path.display());
            }
            print_diagnostics(&report, &compilation);
            print_summary(&report, parse_errors);
        }
    }

    let errors = parse_errors
        + report.failures.len()
        + report.diagnostics().filter(|d| d.is_error()).count();
    if errors > 0 {
        return Err(anyhow!("generation finished with {} error(s)", errors));
    }

    Ok(())
}

fn print_diagnostics(report: &GenerationReport, compilation: &Compilation) {
    for diagnostic in report.diagnostics() {
        let source = compilation
            .trees()
            .iter()
            .find(|tree| tree.path == diagnostic.location.path)
            .map(|tree| tree.source.as_str());
        eprintln!("{}", render_diagnostic(diagnostic, source));
    }

    for failure in &report.failures {
        eprintln!(
            "  {} [{}] {}",
            "✗".red(),
            failure.kind,
            failure.error.red()
        );
    }
}

fn print_summary(report: &GenerationReport, parse_errors: usize) {
    let artifacts = report.artifacts().count();
    let warnings = report.diagnostics().filter(|d| !d.is_error()).count();
    let errors = parse_errors
        + report.failures.len()
        + report.diagnostics().filter(|d| d.is_error()).count();

    println!();
    if errors == 0 && warnings == 0 {
        println!("{} Generated {} declarations", "✅".green(), artifacts);
    } else {
        println!(
            "{} Generated {} declarations, {} errors, {} warnings",
            "⚠️".yellow(),
            artifacts,
            errors,
            warnings
        );
    }
}

fn report_parse_error(error: &SemanticError, source: &str) {
    let SemanticError::Parse { path, source: parse_error } = error;
    eprintln!(
        "{} Failed to parse {}\n{}",
        "✗".red(),
        path,
        pretty::format_error(parse_error, path, source)
    );
}

/// `.cs` files under `dir`, sorted, skipping generated output
fn find_cs_files(dir: &Path, out_dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
        .map(|entry| entry.into_path())
        .filter(|path| path.is_file() && path.extension().is_some_and(|e| e == "cs"))
        .filter(|path| !path.starts_with(out_dir))
        .filter(|path| {
            !path
                .file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| name.ends_with(".g.cs"))
        })
        .collect();
    files.sort();
    files
}

/// Files of a reference directory that are not already sources, so a
/// directory overlapping the source directory adds each file once
fn reference_files(dir: &Path, out_dir: &Path, sources: &[PathBuf]) -> Vec<PathBuf> {
    find_cs_files(dir, out_dir)
        .into_iter()
        .filter(|file| !sources.contains(file))
        .collect()
}

fn display_path(file: &Path, root: &Path) -> String {
    file.strip_prefix(root)
        .unwrap_or(file)
        .to_string_lossy()
        .replace('\\', "/")
}
