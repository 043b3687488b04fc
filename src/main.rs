use clap::Parser;
use itertools::Itertools;
use serde::Serialize;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use unity_clippy::LintEngine;
use unity_clippy::cli::{Args, Command, LintArgs, OutputFormat};
use unity_clippy::config;
use unity_clippy::level::LintLevel;
use unity_clippy::lint::{LintRegistry, LintSettings};
use walkdir::WalkDir;

fn main() -> ExitCode {
    unity_clippy::telemetry::init_tracing();
    match run() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{err:#}");
            ExitCode::from(2)
        }
    }
}

fn run() -> anyhow::Result<ExitCode> {
    let args = Args::parse();

    match args.command {
        Some(Command::ListRules) => {
            list_rules();
            Ok(ExitCode::SUCCESS)
        }
        Some(Command::Explain { rule }) => {
            explain_rule(&rule)?;
            Ok(ExitCode::SUCCESS)
        }
        Some(Command::Lint(lint)) => lint_command(lint),
        None => lint_command(args.lint),
    }
}

fn list_rules() {
    let registry = LintRegistry::default_rules();
    let mut rules: Vec<_> = registry.descriptors().collect();
    rules.sort_by_key(|d| d.name);

    for d in rules {
        println!(
            "{}\t{}\t{}\t{}",
            d.name,
            d.category.as_str(),
            d.group.as_str(),
            d.description
        );
    }
}

fn explain_rule(rule: &str) -> anyhow::Result<()> {
    let registry = LintRegistry::default_rules();
    let Some(d) = registry.find_descriptor(rule) else {
        anyhow::bail!("unknown lint: {rule}");
    };

    println!("name: {}", d.name);
    println!("category: {}", d.category.as_str());
    println!("group: {}", d.group.as_str());
    println!("description: {}", d.description);
    Ok(())
}

fn lint_command(args: LintArgs) -> anyhow::Result<ExitCode> {
    let start_dir = infer_start_dir(&args)?;
    let loaded_cfg = config::load_config(args.config.as_deref(), &start_dir)?;

    let (disabled, settings, preview) = match loaded_cfg.as_ref() {
        Some((_path, cfg)) => (
            cfg.lints.disabled.clone(),
            LintSettings::default()
                .with_config_levels(cfg.lints.levels.clone())
                .disable(cfg.lints.disabled.clone()),
            // CLI flag takes precedence over config
            args.preview || cfg.lints.preview,
        ),
        None => (Vec::new(), LintSettings::default(), args.preview),
    };

    let registry = LintRegistry::default_rules_filtered(&args.only, &args.skip, &disabled, preview)?;
    let engine = LintEngine::new_with_settings(registry, settings);

    let mut total_diags = 0usize;
    let mut has_error = false;

    match args.format {
        OutputFormat::Json => {
            let mut out: Vec<JsonDiagnostic> = Vec::new();

            if args.paths.is_empty() {
                let (count, file_has_error, mut diags) = lint_stdin_json(&engine)?;
                total_diags += count;
                has_error |= file_has_error;
                out.append(&mut diags);
            } else {
                for path in collect_script_files(&args.paths)? {
                    let (count, file_has_error, mut diags) = lint_file_json(&engine, &path)?;
                    total_diags += count;
                    has_error |= file_has_error;
                    out.append(&mut diags);
                }
            }

            out.sort_by(|a, b| {
                (a.file.as_str(), a.row, a.column, a.lint.as_str()).cmp(&(
                    b.file.as_str(),
                    b.row,
                    b.column,
                    b.lint.as_str(),
                ))
            });

            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        OutputFormat::Pretty | OutputFormat::Github => {
            if args.paths.is_empty() {
                let (count, file_has_error) =
                    lint_stdin_text(&engine, args.format, args.deny_warnings)?;
                total_diags += count;
                has_error |= file_has_error;
            } else {
                for path in collect_script_files(&args.paths)? {
                    let (count, file_has_error) =
                        lint_file_text(&engine, &path, args.format, args.deny_warnings)?;
                    total_diags += count;
                    has_error |= file_has_error;
                }
            }
        }
    }

    if has_error || (args.deny_warnings && total_diags > 0) {
        Ok(ExitCode::from(1))
    } else {
        Ok(ExitCode::SUCCESS)
    }
}

#[derive(Debug, Serialize)]
struct JsonDiagnostic {
    file: String,
    row: usize,
    column: usize,
    level: String,
    lint: String,
    message: String,
}

fn infer_start_dir(args: &LintArgs) -> anyhow::Result<PathBuf> {
    if let Some(first) = args.paths.first() {
        let meta = std::fs::metadata(first)?;
        if meta.is_dir() {
            return Ok(first.clone());
        }
        if let Some(parent) = first.parent()
            && !parent.as_os_str().is_empty()
        {
            return Ok(parent.to_path_buf());
        }
    }
    Ok(std::env::current_dir()?)
}

/// Collect `.cs` files from the given paths, recursing into directories.
fn collect_script_files(paths: &[PathBuf]) -> anyhow::Result<Vec<PathBuf>> {
    let mut out = Vec::new();
    for path in paths {
        let meta = std::fs::metadata(path)?;
        if meta.is_dir() {
            for entry in WalkDir::new(path) {
                let entry = entry?;
                if entry.file_type().is_file()
                    && entry.path().extension().and_then(|e| e.to_str()) == Some("cs")
                {
                    out.push(entry.into_path());
                }
            }
        } else {
            out.push(path.clone());
        }
    }

    Ok(out.into_iter().sorted().dedup().collect())
}

fn lint_stdin_text(
    engine: &LintEngine,
    format: OutputFormat,
    deny_warnings: bool,
) -> anyhow::Result<(usize, bool)> {
    let source = read_stdin()?;
    let diagnostics = engine.lint_source(&source)?;
    print_text_diagnostics(&diagnostics, "<stdin>", format, deny_warnings)
}

fn lint_file_text(
    engine: &LintEngine,
    path: &Path,
    format: OutputFormat,
    deny_warnings: bool,
) -> anyhow::Result<(usize, bool)> {
    let source = std::fs::read_to_string(path)?;
    let diagnostics = engine.lint_source(&source)?;
    print_text_diagnostics(&diagnostics, &path.display().to_string(), format, deny_warnings)
}

fn print_text_diagnostics(
    diagnostics: &[unity_clippy::diagnostics::Diagnostic],
    file: &str,
    format: OutputFormat,
    deny_warnings: bool,
) -> anyhow::Result<(usize, bool)> {
    let mut has_error = false;

    for diag in diagnostics {
        match format {
            OutputFormat::Pretty => {
                println!(
                    "{}:{}:{}: {}: {}: {}",
                    file,
                    diag.span.start.row,
                    diag.span.start.column,
                    diag.level.as_str(),
                    diag.lint.name,
                    diag.message
                );
                if let Some(help) = &diag.help {
                    println!("  help: {help}");
                }
            }
            OutputFormat::Github => {
                let kind = if diag.level == LintLevel::Error
                    || (deny_warnings && diag.level == LintLevel::Warn)
                {
                    "error"
                } else {
                    "warning"
                };
                println!(
                    "::{} file={},line={},col={},title={}::{}",
                    kind,
                    github_escape(file),
                    diag.span.start.row,
                    diag.span.start.column,
                    diag.lint.name,
                    github_escape(&diag.message)
                );
            }
            OutputFormat::Json => unreachable!(),
        }
        has_error |= diag.level == LintLevel::Error;
    }

    Ok((diagnostics.len(), has_error))
}

fn lint_stdin_json(engine: &LintEngine) -> anyhow::Result<(usize, bool, Vec<JsonDiagnostic>)> {
    let source = read_stdin()?;
    let diagnostics = engine.lint_source(&source)?;
    Ok(to_json_diagnostics(&diagnostics, "<stdin>"))
}

fn lint_file_json(
    engine: &LintEngine,
    path: &Path,
) -> anyhow::Result<(usize, bool, Vec<JsonDiagnostic>)> {
    let source = std::fs::read_to_string(path)?;
    let diagnostics = engine.lint_source(&source)?;
    Ok(to_json_diagnostics(&diagnostics, &path.display().to_string()))
}

fn to_json_diagnostics(
    diagnostics: &[unity_clippy::diagnostics::Diagnostic],
    file: &str,
) -> (usize, bool, Vec<JsonDiagnostic>) {
    let mut has_error = false;
    let out = diagnostics
        .iter()
        .map(|d| {
            has_error |= d.level == LintLevel::Error;
            JsonDiagnostic {
                file: file.to_string(),
                row: d.span.start.row,
                column: d.span.start.column,
                level: d.level.as_str().to_string(),
                lint: d.lint.name.to_string(),
                message: d.message.clone(),
            }
        })
        .collect();
    (diagnostics.len(), has_error, out)
}

fn read_stdin() -> anyhow::Result<String> {
    let mut buf = String::new();
    std::io::stdin().read_to_string(&mut buf)?;
    Ok(buf)
}

fn github_escape(text: &str) -> String {
    text.replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}
