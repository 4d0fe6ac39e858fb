use std::fmt;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl Severity {
    pub fn letter(&self) -> char {
        match self {
            Severity::Info => 'I',
            Severity::Warning => 'W',
            Severity::Error => 'E',
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}

/// What kind of construct the analysis had to give up on or skip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    UnrecognizedGuard,
    UnrecognizedLoop,
    MalformedBound,
    FailedInversion,
    ContractViolation,
    UnrecognizedLabel,
    NoDispatchSwitch,
    SkippedSection,
    DuplicateShop,
    ExcludedShop,
}

impl DiagnosticKind {
    pub fn name(self) -> &'static str {
        match self {
            DiagnosticKind::UnrecognizedGuard => "unrecognized-guard",
            DiagnosticKind::UnrecognizedLoop => "unrecognized-loop",
            DiagnosticKind::MalformedBound => "malformed-bound",
            DiagnosticKind::FailedInversion => "failed-inversion",
            DiagnosticKind::ContractViolation => "contract-violation",
            DiagnosticKind::UnrecognizedLabel => "unrecognized-label",
            DiagnosticKind::NoDispatchSwitch => "no-dispatch-switch",
            DiagnosticKind::SkippedSection => "skipped-section",
            DiagnosticKind::DuplicateShop => "duplicate-shop",
            DiagnosticKind::ExcludedShop => "excluded-shop",
        }
    }

    pub fn default_severity(self) -> Severity {
        match self {
            DiagnosticKind::ContractViolation => Severity::Error,
            DiagnosticKind::ExcludedShop => Severity::Info,
            _ => Severity::Warning,
        }
    }
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A non-fatal degradation recorded during analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub severity: Severity,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shop: Option<i64>,
    /// Rendered source of the construct concerned.
    pub construct: String,
    pub message: String,
}

impl Diagnostic {
    pub fn new(
        kind: DiagnosticKind,
        shop: Option<i64>,
        construct: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            severity: kind.default_severity(),
            shop,
            construct: construct.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.shop {
            Some(shop) => write!(f, "shop {shop}: ")?,
            None => write!(f, "-: ")?,
        }
        write!(f, "{}: {}: {}", self.severity, self.kind, self.message)?;
        if !self.construct.is_empty() {
            write!(f, " [{}]", self.construct)?;
        }
        Ok(())
    }
}
