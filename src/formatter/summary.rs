use std::io::Write;

use crate::analyzer::Analysis;
use crate::diagnostic::Severity;
use crate::formatter::Formatter;

/// One line per shop: id, item count, conditional item count.
pub struct SummaryFormatter;

impl Formatter for SummaryFormatter {
    fn format_to(&self, analysis: &Analysis, out: &mut dyn Write) -> std::io::Result<()> {
        for shop in analysis.model.shops() {
            let conditional = shop
                .items
                .iter()
                .filter(|i| !i.conditions.is_empty())
                .count();
            writeln!(
                out,
                "shop {:>3}: {:>3} items ({conditional} conditional)",
                shop.id,
                shop.items.len()
            )?;
        }
        writeln!(
            out,
            "total: {} shops, {} items, {} errors, {} warnings",
            analysis.model.len(),
            analysis.model.item_count(),
            analysis.count(Severity::Error),
            analysis.count(Severity::Warning),
        )
    }
}
