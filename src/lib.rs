//! Core Unity Clippy engine and lint registry.
//!
//! The crate parses C# scripts with tree-sitter, builds a single-file
//! semantic model, and runs registered lint rules over it. The flagship
//! analysis flags delegate references that are freshly allocated inside
//! frame-tick methods (`Update`, `FixedUpdate`, ...) instead of cached.

pub mod behaviour;
pub mod cli;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod level;
pub mod lint;
pub mod parser;
pub mod rules;
pub mod semantic;
pub mod telemetry;
pub mod type_classifier;

use anyhow::Result;

use crate::diagnostics::Diagnostic;
use crate::lint::{LintContext, LintRegistry, LintSettings};
use crate::parser::parse_source;
use crate::semantic::ScriptModel;

/// Engine orchestrates linting by parsing source, building the semantic
/// model, and running registered rules.
pub struct LintEngine {
    registry: LintRegistry,
    settings: LintSettings,
}

impl LintEngine {
    /// Create a new engine with default lint settings.
    pub fn new(registry: LintRegistry) -> Self {
        Self {
            registry,
            settings: LintSettings::default(),
        }
    }

    /// Create a new engine with explicit lint settings (e.g. from config).
    pub fn new_with_settings(registry: LintRegistry, settings: LintSettings) -> Self {
        Self { registry, settings }
    }

    /// Lint a single in-memory source string and return diagnostics.
    ///
    /// Analysis is stateless across invocations: the same input always
    /// produces the same diagnostics in the same order.
    pub fn lint_source(&self, source: &str) -> Result<Vec<Diagnostic>> {
        let tree = parse_source(source)?;
        let model = ScriptModel::build(tree.root_node(), source);

        let mut ctx = LintContext::new(source, self.settings.clone());
        for rule in self.registry.rules() {
            rule.check(&model, &mut ctx);
        }

        Ok(ctx.into_diagnostics())
    }
}

/// Construct a `LintEngine` with all built-in stable lints enabled.
pub fn create_default_engine() -> LintEngine {
    let registry = LintRegistry::default_rules_filtered(
        &[],   // only
        &[],   // skip
        &[],   // disabled
        false, // preview
    )
    .expect("Failed to create default registry");

    LintEngine::new(registry)
}
