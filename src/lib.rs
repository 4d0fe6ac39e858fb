pub mod analyzer;
pub mod catalog;
pub mod cli;
pub mod condition;
pub mod config;
pub mod decompose;
pub mod diagnostic;
pub mod formatter;
pub mod model;
pub mod pattern;
pub mod syntax;
pub mod walker;

#[cfg(test)]
pub mod testutil;

use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::time::Instant;

use anyhow::{Context, Result};

use analyzer::{Analysis, analyze};
use catalog::Catalog;
use cli::Args;
use condition::ConditionTag;
use config::load_config;
use formatter::create_formatter;
use syntax::{Stmt, parse_procedure};

/// Run the extractor. Returns the exit code: 0 = done, 1 = error-severity
/// diagnostics with `--fail-on-error`.
pub fn run(args: Args) -> Result<i32> {
    if args.list_conditions {
        list_conditions(&mut std::io::stdout().lock())?;
        return Ok(0);
    }
    if args.list_patterns {
        list_patterns(Catalog::builtin(), &mut std::io::stdout().lock())?;
        return Ok(0);
    }

    let config_start = Instant::now();
    let config = load_config(args.config.as_deref())?;
    match config.source() {
        Some(path) => log::debug!("config loaded from: {}", path.display()),
        None => log::debug!("no config file found"),
    }
    log::debug!("config loading: {:.0?}", config_start.elapsed());

    let (name, text) = read_input(&args)?;

    let parse_start = Instant::now();
    let body: Vec<Stmt> = if args.reads_ast_json() {
        serde_json::from_str(&text)
            .with_context(|| format!("failed to parse syntax tree {name}"))?
    } else {
        parse_procedure(&text).with_context(|| format!("failed to parse {name}"))?
    };
    log::debug!(
        "parse: {:.0?} ({} top-level statements)",
        parse_start.elapsed(),
        body.len()
    );

    let analysis_start = Instant::now();
    let analysis = analyze(&body, &config);
    log::debug!(
        "analysis: {:.0?} ({} shops, {} items, {} diagnostics)",
        analysis_start.elapsed(),
        analysis.model.len(),
        analysis.model.item_count(),
        analysis.diagnostics.len()
    );

    let formatter = create_formatter(&args.format);
    match &args.output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            let mut out = BufWriter::new(file);
            formatter
                .format_to(&analysis, &mut out)
                .with_context(|| format!("failed to write {}", path.display()))?;
            out.flush()
                .with_context(|| format!("failed to write {}", path.display()))?;
        }
        None => formatter.print(&analysis).context("failed to write report")?,
    }

    Ok(exit_code(&analysis, args.fail_on_error))
}

fn exit_code(analysis: &Analysis, fail_on_error: bool) -> i32 {
    if fail_on_error && analysis.has_errors() {
        1
    } else {
        0
    }
}

/// Display name and contents of the input.
fn read_input(args: &Args) -> Result<(String, String)> {
    if args.stdin {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("failed to read stdin")?;
        return Ok(("<stdin>".to_string(), text));
    }
    let Some(path) = &args.input else {
        anyhow::bail!("no input given");
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    Ok((path.display().to_string(), text))
}

/// `code  name  complement` for every tag, in code order.
pub fn list_conditions(out: &mut dyn Write) -> std::io::Result<()> {
    let mut tags = ConditionTag::ALL.to_vec();
    tags.sort_by_key(|t| t.code());
    for tag in tags {
        match tag.complement() {
            Ok(complement) => writeln!(out, "{:>5}  {tag}  !{complement}", tag.code())?,
            Err(_) => writeln!(out, "{:>5}  {tag}", tag.code())?,
        }
    }
    Ok(())
}

/// Catalog shapes in match order.
pub fn list_patterns(catalog: &Catalog, out: &mut dyn Write) -> std::io::Result<()> {
    for (entry, pattern) in catalog.entries() {
        writeln!(out, "{}: {}", entry.tag, pattern.source())?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(f: impl FnOnce(&mut dyn Write) -> std::io::Result<()>) -> String {
        let mut buf = Vec::new();
        f(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn conditions_listed_in_code_order() {
        let out = render(|w| list_conditions(w));
        assert_eq!(out.lines().count(), ConditionTag::ALL.len());
        assert!(out.contains("   43  Hardmode  !PreHardmode"));
        assert!(out.contains("   54  Christmas\n"));
        let first = out.lines().next().unwrap();
        assert!(first.trim_start().starts_with('-'), "{first}");
    }

    #[test]
    fn only_error_diagnostics_fail_the_run() {
        use crate::diagnostic::{Diagnostic, DiagnosticKind};

        let mut analysis = Analysis::default();
        assert_eq!(exit_code(&analysis, true), 0);

        analysis.diagnostics.push(Diagnostic::new(
            DiagnosticKind::UnrecognizedGuard,
            Some(1),
            "if (x)",
            "guard not in catalog",
        ));
        assert_eq!(exit_code(&analysis, true), 0);

        analysis.diagnostics.push(Diagnostic::new(
            DiagnosticKind::ContractViolation,
            Some(1),
            "if (Main.hardMode)",
            "complement table pairs Hardmode with TimeDay",
        ));
        assert!(analysis.has_errors());
        assert_eq!(exit_code(&analysis, true), 1);
        assert_eq!(exit_code(&analysis, false), 0);
    }

    #[test]
    fn patterns_listed_in_match_order() {
        let catalog = Catalog::builtin();
        let out = render(|w| list_patterns(catalog, w));
        assert_eq!(out.lines().count(), catalog.len());
        assert_eq!(out.lines().next(), Some("TimeDay: #day_time"));
    }
}
