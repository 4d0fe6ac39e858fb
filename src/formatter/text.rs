use std::io::Write;

use crate::analyzer::Analysis;
use crate::formatter::Formatter;

/// Indented shop / item / condition listing, then diagnostics.
pub struct TextFormatter;

fn indent(depth: usize) -> String {
    "  ".repeat(depth)
}

fn plural(n: usize, word: &str) -> String {
    if n == 1 {
        format!("{n} {word}")
    } else {
        format!("{n} {word}s")
    }
}

impl Formatter for TextFormatter {
    fn format_to(&self, analysis: &Analysis, out: &mut dyn Write) -> std::io::Result<()> {
        for shop in analysis.model.shops() {
            writeln!(out, "Shop {}", shop.id)?;
            for item in &shop.items {
                writeln!(out, "{}Item {}", indent(1), item.id)?;
                for condition in &item.conditions {
                    writeln!(out, "{}{condition}", indent(2))?;
                }
            }
        }

        if !analysis.diagnostics.is_empty() {
            writeln!(out)?;
            for d in &analysis.diagnostics {
                writeln!(out, "{d}")?;
            }
        }

        writeln!(
            out,
            "\n{}, {}, {}",
            plural(analysis.model.len(), "shop"),
            plural(analysis.model.item_count(), "item"),
            plural(analysis.diagnostics.len(), "diagnostic"),
        )
    }
}
