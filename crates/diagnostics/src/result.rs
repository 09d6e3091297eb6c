//! Result type for a TEM computation.

use crate::bundle::DiagnosticBundle;
use crate::singularity::SingularityReport;

/// The output of [`compute_tem`](crate::compute_tem).
///
/// Carries the diagnostic bundle together with the count of non-finite
/// values it contains.
#[derive(Debug, Clone)]
pub struct TemResult {
    bundle: DiagnosticBundle,
    singularities: SingularityReport,
}

impl TemResult {
    pub(crate) fn new(bundle: DiagnosticBundle, singularities: SingularityReport) -> Self {
        Self {
            bundle,
            singularities,
        }
    }

    /// The nine diagnostics.
    pub fn bundle(&self) -> &DiagnosticBundle {
        &self.bundle
    }

    /// Consumes `self` and returns the bundle.
    pub fn into_bundle(self) -> DiagnosticBundle {
        self.bundle
    }

    /// Non-finite values found in the bundle.
    pub fn singularities(&self) -> &SingularityReport {
        &self.singularities
    }
}
