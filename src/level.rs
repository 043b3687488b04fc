//! Severity levels for Unity Clippy diagnostics.

use serde::{Deserialize, Serialize};

/// Severity of a reported lint, settable per lint name in
/// `unity-clippy.toml` (e.g. `should_cache_delegate = "error"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LintLevel {
    /// Suppress the lint entirely.
    Allow,
    /// Report without failing the run.
    #[default]
    Warn,
    /// Report and exit nonzero.
    Error,
}

impl LintLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LintLevel::Allow => "allow",
            LintLevel::Warn => "warning",
            LintLevel::Error => "error",
        }
    }
}
