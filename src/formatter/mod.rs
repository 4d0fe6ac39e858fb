pub mod json;
pub mod summary;
pub mod text;

use std::io::Write;

use crate::analyzer::Analysis;

/// Output format names accepted by `--format`.
pub const FORMATS: &[&str] = &["text", "json", "summary"];

pub trait Formatter {
    fn format_to(&self, analysis: &Analysis, out: &mut dyn Write) -> std::io::Result<()>;

    fn print(&self, analysis: &Analysis) -> std::io::Result<()> {
        let stdout = std::io::stdout();
        let mut lock = stdout.lock();
        self.format_to(analysis, &mut lock)
    }
}

pub fn create_formatter(format: &str) -> Box<dyn Formatter> {
    match format {
        "json" => Box::new(json::JsonFormatter),
        "summary" => Box::new(summary::SummaryFormatter),
        // "text" and any unknown value
        _ => Box::new(text::TextFormatter),
    }
}
