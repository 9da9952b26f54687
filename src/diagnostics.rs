//! Diagnostics collected while validating one plugin.
//!
//! A [`Diagnostics`] sink is created per plugin and passed by mutable
//! reference through every resolver stage. Nothing is ever thrown: each
//! metadata defect is appended as an error or a warning and validation
//! carries on. [`Diagnostics::finish`] turns the log into a
//! [`DiagnosticReport`] with both lists de-duplicated and sorted.

use std::collections::BTreeSet;

use serde::Serialize;
use tracing::debug;

/// Severity of a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    /// The descriptor is not compliant and the plugin is not ready for
    /// distribution.
    Error,
    /// Stylistic or low-risk issue.
    Warning,
}

/// Append-only diagnostic log for a single validation pass.
#[derive(Debug, Default)]
pub struct Diagnostics {
    entries: Vec<(Severity, String)>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.push(Severity::Error, message.into());
    }

    pub fn warning(&mut self, message: impl Into<String>) {
        self.push(Severity::Warning, message.into());
    }

    pub fn push(&mut self, severity: Severity, message: String) {
        debug!(?severity, %message, "diagnostic");
        self.entries.push((severity, message));
    }

    pub fn error_count(&self) -> usize {
        self.count(Severity::Error)
    }

    pub fn warning_count(&self) -> usize {
        self.count(Severity::Warning)
    }

    fn count(&self, severity: Severity) -> usize {
        self.entries.iter().filter(|(s, _)| *s == severity).count()
    }

    /// Consumes the log, de-duplicating and sorting each severity.
    pub fn finish(self) -> DiagnosticReport {
        let mut errors = BTreeSet::new();
        let mut warnings = BTreeSet::new();
        for (severity, message) in self.entries {
            match severity {
                Severity::Error => errors.insert(message),
                Severity::Warning => warnings.insert(message),
            };
        }
        DiagnosticReport {
            errors: errors.into_iter().collect(),
            warnings: warnings.into_iter().collect(),
        }
    }
}

/// Finished diagnostics: sorted, without duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DiagnosticReport {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl DiagnosticReport {
    /// True when no errors were recorded. Warnings do not affect compliance.
    pub fn is_compliant(&self) -> bool {
        self.errors.is_empty()
    }
}
