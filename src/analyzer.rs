//! Locates the dispatch switch and turns each of its sections into a shop.

use rayon::prelude::*;

use crate::catalog::Catalog;
use crate::config::AnalysisConfig;
use crate::diagnostic::{Diagnostic, DiagnosticKind, Severity};
use crate::model::{Model, ModelBuilder, Shop};
use crate::syntax::{CaseLabel, Expr, ParseError, Stmt, SwitchSection, parse_procedure};
use crate::walker::ShopWalker;

/// Result of analyzing one shop setup procedure.
#[derive(Debug, Clone, Default)]
pub struct Analysis {
    pub model: Model,
    pub diagnostics: Vec<Diagnostic>,
}

impl Analysis {
    pub fn count(&self, severity: Severity) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == severity)
            .count()
    }

    pub fn has_errors(&self) -> bool {
        self.count(Severity::Error) > 0
    }
}

/// What a dispatch section turned into.
enum Section {
    Shop(Shop, Vec<Diagnostic>),
    Skipped(Diagnostic),
}

/// Parse `src` and analyze it with the built-in catalog.
pub fn analyze_source(src: &str, config: &AnalysisConfig) -> Result<Analysis, ParseError> {
    let body = parse_procedure(src)?;
    Ok(analyze(&body, config))
}

pub fn analyze(body: &[Stmt], config: &AnalysisConfig) -> Analysis {
    analyze_with(Catalog::builtin(), body, config)
}

pub fn analyze_with(catalog: &Catalog, body: &[Stmt], config: &AnalysisConfig) -> Analysis {
    let Some((scrutinee, sections)) = find_dispatch(body) else {
        let diagnostic = Diagnostic::new(
            DiagnosticKind::NoDispatchSwitch,
            None,
            "",
            "procedure has no top-level switch statement",
        );
        log::debug!("{diagnostic}");
        return Analysis {
            model: Model::default(),
            diagnostics: vec![diagnostic],
        };
    };
    log::debug!(
        "dispatch on `{scrutinee}` with {} sections",
        sections.len()
    );

    let outcomes: Vec<Section> = sections
        .par_iter()
        .map(|section| analyze_section(catalog, config, section))
        .collect();

    let mut builder = ModelBuilder::new();
    let mut diagnostics = Vec::new();
    for outcome in outcomes {
        match outcome {
            Section::Skipped(diagnostic) => {
                log::debug!("{diagnostic}");
                diagnostics.push(diagnostic);
            }
            Section::Shop(shop, shop_diagnostics) => {
                diagnostics.extend(shop_diagnostics);
                if let Err(duplicate) = builder.add_shop(shop) {
                    let diagnostic = Diagnostic::new(
                        DiagnosticKind::DuplicateShop,
                        Some(duplicate.id),
                        format!("case {}", duplicate.id),
                        format!(
                            "shop already defined; dropping {} later items",
                            duplicate.items.len()
                        ),
                    );
                    log::debug!("{diagnostic}");
                    diagnostics.push(diagnostic);
                }
            }
        }
    }

    Analysis {
        model: builder.freeze(),
        diagnostics,
    }
}

fn analyze_section(catalog: &Catalog, config: &AnalysisConfig, section: &SwitchSection) -> Section {
    let label = match section.labels.as_slice() {
        [CaseLabel::Case { value }] => value,
        labels => {
            return Section::Skipped(Diagnostic::new(
                DiagnosticKind::SkippedSection,
                None,
                render_labels(labels),
                "dispatch section needs exactly one case label",
            ));
        }
    };
    let Some(id) = label.as_int() else {
        return Section::Skipped(Diagnostic::new(
            DiagnosticKind::SkippedSection,
            None,
            format!("case {label}"),
            "dispatch label is not an integer literal",
        ));
    };
    if config.is_excluded(id) {
        return Section::Skipped(Diagnostic::new(
            DiagnosticKind::ExcludedShop,
            Some(id),
            format!("case {id}"),
            "shop id is excluded by configuration",
        ));
    }

    let (shop, diagnostics) = ShopWalker::new(catalog, config, id).walk(&section.body);
    Section::Shop(shop, diagnostics)
}

/// First switch among the top-level statements, looking through plain
/// blocks.
fn find_dispatch(body: &[Stmt]) -> Option<(&Expr, &[SwitchSection])> {
    body.iter().find_map(|stmt| match stmt {
        Stmt::Switch {
            scrutinee,
            sections,
        } => Some((scrutinee, sections.as_slice())),
        Stmt::Block { body } => find_dispatch(body),
        _ => None,
    })
}

fn render_labels(labels: &[CaseLabel]) -> String {
    labels
        .iter()
        .map(|label| match label {
            CaseLabel::Case { value } => format!("case {value}:"),
            CaseLabel::Default => "default:".to_string(),
        })
        .collect::<Vec<_>>()
        .join(" ")
}
