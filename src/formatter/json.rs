use std::io::Write;

use serde::Serialize;

use crate::analyzer::Analysis;
use crate::diagnostic::{Diagnostic, Severity};
use crate::formatter::Formatter;
use crate::model::Shop;

pub struct JsonFormatter;

#[derive(Serialize)]
struct JsonOutput<'a> {
    metadata: Metadata,
    shops: Vec<&'a Shop>,
    diagnostics: &'a [Diagnostic],
}

#[derive(Serialize)]
struct Metadata {
    version: &'static str,
    digest: String,
    shop_count: usize,
    item_count: usize,
    error_count: usize,
    warning_count: usize,
}

impl Formatter for JsonFormatter {
    fn format_to(&self, analysis: &Analysis, out: &mut dyn Write) -> std::io::Result<()> {
        let output = JsonOutput {
            metadata: Metadata {
                version: env!("CARGO_PKG_VERSION"),
                digest: analysis.model.digest(),
                shop_count: analysis.model.len(),
                item_count: analysis.model.item_count(),
                error_count: analysis.count(Severity::Error),
                warning_count: analysis.count(Severity::Warning),
            },
            shops: analysis.model.shops().collect(),
            diagnostics: &analysis.diagnostics,
        };
        let json = serde_json::to_string_pretty(&output).map_err(std::io::Error::other)?;
        writeln!(out, "{json}")
    }
}
