//! Detection of NaN/Inf produced by singular geometry or stratification.
//!
//! The TEM formulas divide by `cosφ` and by `∂Θ/∂p`, so poles and neutrally
//! stratified levels yield non-finite values. These are kept in the output
//! and counted here so callers can report them.

use std::fmt;

use crate::bundle::{DiagnosticBundle, DiagnosticKind};

/// Per-field count of non-finite values in a [`DiagnosticBundle`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SingularityReport {
    counts: Vec<(DiagnosticKind, usize)>,
}

impl SingularityReport {
    /// Counts NaN and infinite values in every field of `bundle`.
    pub fn scan(bundle: &DiagnosticBundle) -> Self {
        let counts = bundle
            .fields()
            .iter()
            .map(|f| (f.kind(), f.data().iter().filter(|v| !v.is_finite()).count()))
            .filter(|&(_, n)| n > 0)
            .collect();
        Self { counts }
    }

    /// `true` when every value is finite.
    pub fn is_clean(&self) -> bool {
        self.counts.is_empty()
    }

    /// Non-finite count for `kind`.
    pub fn count(&self, kind: DiagnosticKind) -> usize {
        self.counts
            .iter()
            .find(|(k, _)| *k == kind)
            .map_or(0, |&(_, n)| n)
    }

    /// Total non-finite values across all fields.
    pub fn total(&self) -> usize {
        self.counts.iter().map(|(_, n)| n).sum()
    }

    /// Fields with at least one non-finite value, in output order.
    pub fn entries(&self) -> &[(DiagnosticKind, usize)] {
        &self.counts
    }

    /// Adds the counts of `other` (e.g. from another time chunk).
    pub fn merge(&mut self, other: &SingularityReport) {
        let mut merged = Vec::new();
        for kind in DiagnosticKind::ALL {
            let n = self.count(kind) + other.count(kind);
            if n > 0 {
                merged.push((kind, n));
            }
        }
        self.counts = merged;
    }
}

impl fmt::Display for SingularityReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_clean() {
            return write!(f, "none");
        }
        let parts: Vec<String> = self
            .counts
            .iter()
            .map(|(kind, n)| format!("{}={n}", kind.name()))
            .collect();
        write!(f, "{}", parts.join(", "))
    }
}
