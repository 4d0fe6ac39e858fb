use std::path::{Path, PathBuf};

use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "shopdb",
    version,
    about = "Extract a declarative shop database from an NPC shop setup procedure"
)]
pub struct Args {
    /// C# source of the shop setup procedure, or a JSON syntax tree
    #[arg(value_name = "INPUT", required_unless_present_any = ["stdin", "list_conditions", "list_patterns"])]
    pub input: Option<PathBuf>,

    /// Read the input from stdin instead of a file
    #[arg(long, conflicts_with = "input")]
    pub stdin: bool,

    /// Treat the input as a JSON syntax tree (implied by a `.json` extension)
    #[arg(long)]
    pub ast_json: bool,

    /// Path to configuration file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, default_value = "text", value_parser = ["text", "json", "summary"])]
    pub format: String,

    /// Write the report to FILE instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Enable debug output
    #[arg(long)]
    pub debug: bool,

    /// List all condition tags with their codes and complements, then exit
    #[arg(long)]
    pub list_conditions: bool,

    /// List the catalog's expression shapes in match order, then exit
    #[arg(long)]
    pub list_patterns: bool,

    /// Exit with code 1 if any diagnostic has error severity
    #[arg(long)]
    pub fail_on_error: bool,
}

impl Args {
    /// Whether the input is a serialized syntax tree rather than source text.
    pub fn reads_ast_json(&self) -> bool {
        self.ast_json
            || self
                .input
                .as_deref()
                .and_then(Path::extension)
                .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
    }
}
