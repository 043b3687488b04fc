use crate::diagnostics::{Diagnostic, Span};
use crate::level::LintLevel;
use crate::semantic::ScriptModel;
use anyhow::{Result, anyhow};
use std::collections::{HashMap, HashSet};
use tree_sitter::Node;

// ============================================================================
// Rule Groups (Preview vs Stable)
// ============================================================================

/// Classification of lint rules by stability level.
///
/// New rules start in `Preview` and graduate to `Stable` once they hold up
/// against real project code without false positives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Hash)]
pub enum RuleGroup {
    /// Battle-tested rules with minimal false positives. Enabled by default.
    #[default]
    Stable,

    /// New rules that need validation. Require `--preview` or
    /// `preview = true` in config.
    Preview,
}

impl RuleGroup {
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleGroup::Stable => "stable",
            RuleGroup::Preview => "preview",
        }
    }
}

// ============================================================================
// Lint Categories
// ============================================================================

/// High-level categories used to group lints, mirroring the diagnostic
/// categories of the upstream Unity analyzers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LintCategory {
    /// Patterns that allocate garbage-collected memory every frame.
    Gc,
    /// Patterns that cost CPU time every frame without allocating.
    Performance,
    /// Everything else worth flagging.
    Misc,
}

impl LintCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            LintCategory::Gc => "gc",
            LintCategory::Performance => "performance",
            LintCategory::Misc => "misc",
        }
    }
}

/// Static metadata describing a lint rule.
#[derive(Debug)]
pub struct LintDescriptor {
    pub name: &'static str,
    pub category: LintCategory,
    pub description: &'static str,
    /// Stability group: Stable or Preview.
    pub group: RuleGroup,
}

impl LintDescriptor {
    /// Helper to create a stable lint descriptor.
    pub const fn stable(
        name: &'static str,
        category: LintCategory,
        description: &'static str,
    ) -> Self {
        Self {
            name,
            category,
            description,
            group: RuleGroup::Stable,
        }
    }

    /// Helper to create a preview lint descriptor.
    pub const fn preview(
        name: &'static str,
        category: LintCategory,
        description: &'static str,
    ) -> Self {
        Self {
            name,
            category,
            description,
            group: RuleGroup::Preview,
        }
    }
}

/// A single lint rule that inspects the semantic model of one file.
pub trait LintRule: Send + Sync {
    fn descriptor(&self) -> &'static LintDescriptor;
    fn check(&self, model: &ScriptModel<'_>, ctx: &mut LintContext<'_>);
}

/// Per-lint configuration derived from `unity-clippy.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LintSettings {
    levels: HashMap<String, LintLevel>,
}

impl LintSettings {
    #[must_use]
    pub fn with_config_levels(mut self, levels: HashMap<String, LintLevel>) -> Self {
        self.levels.extend(levels);
        self
    }

    #[must_use]
    pub fn disable(mut self, disabled: impl IntoIterator<Item = String>) -> Self {
        for name in disabled {
            self.levels.insert(name, LintLevel::Allow);
        }
        self
    }

    pub fn level_for(&self, lint_name: &str) -> LintLevel {
        self.levels.get(lint_name).copied().unwrap_or_default()
    }
}

/// Mutable context passed to lint rules while analyzing a file.
///
/// This is the finding sink: diagnostics accumulate in insertion order, and
/// `into_diagnostics` yields them in that stable order.
pub struct LintContext<'src> {
    source: &'src str,
    settings: LintSettings,
    diagnostics: Vec<Diagnostic>,
}

impl<'src> LintContext<'src> {
    pub fn new(source: &'src str, settings: LintSettings) -> Self {
        Self {
            source,
            settings,
            diagnostics: Vec::new(),
        }
    }

    /// Report a diagnostic spanning exactly `node`.
    pub fn report_node(
        &mut self,
        lint: &'static LintDescriptor,
        node: Node<'_>,
        message: impl Into<String>,
    ) {
        self.report_span(lint, Span::from_range(node.range()), message, None);
    }

    /// Report a diagnostic spanning exactly `node`, with a help note.
    pub fn report_node_with_help(
        &mut self,
        lint: &'static LintDescriptor,
        node: Node<'_>,
        message: impl Into<String>,
        help: impl Into<String>,
    ) {
        self.report_span(lint, Span::from_range(node.range()), message, Some(help.into()));
    }

    pub fn report_span(
        &mut self,
        lint: &'static LintDescriptor,
        span: Span,
        message: impl Into<String>,
        help: Option<String>,
    ) {
        let level = self.settings.level_for(lint.name);
        if level == LintLevel::Allow {
            return;
        }

        self.diagnostics.push(Diagnostic {
            lint,
            level,
            file: None,
            span,
            message: message.into(),
            help,
        });
    }

    pub fn source(&self) -> &'src str {
        self.source
    }

    pub fn settings(&self) -> &LintSettings {
        &self.settings
    }

    #[must_use]
    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }
}

pub fn all_known_lints() -> HashSet<&'static str> {
    LintRegistry::default_rules()
        .descriptors()
        .collect::<Vec<_>>()
        .into_iter()
        .map(|d| d.name)
        .collect()
}

/// Registry of lint rules used by the engine.
pub struct LintRegistry {
    rules: Vec<Box<dyn LintRule>>,
}

impl Default for LintRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl LintRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    #[must_use]
    pub fn with_rule(mut self, rule: impl LintRule + 'static) -> Self {
        self.rules.push(Box::new(rule));
        self
    }

    pub fn rules(&self) -> impl Iterator<Item = &Box<dyn LintRule>> {
        self.rules.iter()
    }

    pub fn descriptors(&self) -> impl Iterator<Item = &'static LintDescriptor> + '_ {
        self.rules.iter().map(|r| r.descriptor())
    }

    pub fn find_descriptor(&self, name: &str) -> Option<&'static LintDescriptor> {
        self.descriptors().find(|d| d.name == name)
    }

    #[must_use = "registry should be used to create an engine"]
    pub fn default_rules() -> Self {
        Self::new()
            .with_rule(crate::rules::ShouldCacheDelegateLint)
            .with_rule(crate::rules::OnGuiUsageLint)
            .with_rule(crate::rules::EmptyFrameTickMethodLint)
    }

    /// Build the default registry filtered by CLI/config selections.
    ///
    /// # Errors
    ///
    /// Returns an error if any lint name in `only`, `skip`, or `disabled` is
    /// unknown.
    pub fn default_rules_filtered(
        only: &[String],
        skip: &[String],
        disabled: &[String],
        preview: bool,
    ) -> Result<Self> {
        let known = all_known_lints();
        for n in only.iter().chain(skip.iter()).chain(disabled.iter()) {
            if !known.contains(n.as_str()) {
                return Err(anyhow!("unknown lint: {n}"));
            }
        }

        let only_set: Option<HashSet<&str>> = if only.is_empty() {
            None
        } else {
            Some(only.iter().map(String::as_str).collect())
        };
        let skip_set: HashSet<&str> = skip.iter().map(String::as_str).collect();
        let disabled_set: HashSet<&str> = disabled.iter().map(String::as_str).collect();

        let mut reg = Self::new();
        for rule in Self::default_rules().rules {
            let descriptor = rule.descriptor();
            let name = descriptor.name;

            if let Some(ref only) = only_set
                && !only.contains(name)
            {
                continue;
            }
            if skip_set.contains(name) || disabled_set.contains(name) {
                continue;
            }
            if descriptor.group == RuleGroup::Preview && !preview {
                continue;
            }

            reg.rules.push(rule);
        }

        Ok(reg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_registry_contains_core_lints() {
        let names = all_known_lints();
        assert!(names.contains("should_cache_delegate"));
        assert!(names.contains("on_gui_usage"));
        assert!(names.contains("empty_frame_tick_method"));
    }

    #[test]
    fn filtered_registry_rejects_unknown_names() {
        let err = LintRegistry::default_rules_filtered(&["no_such_lint".to_string()], &[], &[], false)
            .err()
            .expect("unknown lint should error");
        assert!(err.to_string().contains("no_such_lint"));
    }

    #[test]
    fn skip_removes_rule() {
        let reg = LintRegistry::default_rules_filtered(
            &[],
            &["on_gui_usage".to_string()],
            &[],
            false,
        )
        .expect("filtering should succeed");
        assert!(reg.find_descriptor("on_gui_usage").is_none());
        assert!(reg.find_descriptor("should_cache_delegate").is_some());
    }

    #[test]
    fn allow_level_suppresses_report() {
        let settings = LintSettings::default().disable(["should_cache_delegate".to_string()]);
        assert_eq!(settings.level_for("should_cache_delegate"), LintLevel::Allow);
        assert_eq!(settings.level_for("on_gui_usage"), LintLevel::Warn);
    }
}
