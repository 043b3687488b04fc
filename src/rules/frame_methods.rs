//! Classifier-driven checks on frame-tick method declarations themselves.

use crate::behaviour::BehaviourInfo;
use crate::lint::{LintCategory, LintContext, LintDescriptor, LintRule};
use crate::semantic::ScriptModel;
use tree_sitter::Node;

// ============================================================================
// OnGuiUsageLint
// ============================================================================

pub struct OnGuiUsageLint;

static ON_GUI_USAGE: LintDescriptor = LintDescriptor::stable(
    "on_gui_usage",
    LintCategory::Gc,
    "Usage of OnGUI is known to cause GC and/or performance issues",
);

impl LintRule for OnGuiUsageLint {
    fn descriptor(&self) -> &'static LintDescriptor {
        &ON_GUI_USAGE
    }

    fn check(&self, model: &ScriptModel<'_>, ctx: &mut LintContext<'_>) {
        for (class_idx, class) in model.classes() {
            let info = BehaviourInfo::new(model, class_idx);
            if !info.is_engine_behaviour() {
                continue;
            }
            for method in &class.methods {
                if method.name == "OnGUI" {
                    ctx.report_node(
                        &ON_GUI_USAGE,
                        method.name_node,
                        format!(
                            "'{}' implements OnGUI. This is known to cause GC and/or performance issues",
                            class.name
                        ),
                    );
                }
            }
        }
    }
}

// ============================================================================
// EmptyFrameTickMethodLint
// ============================================================================

pub struct EmptyFrameTickMethodLint;

static EMPTY_FRAME_TICK_METHOD: LintDescriptor = LintDescriptor::stable(
    "empty_frame_tick_method",
    LintCategory::Performance,
    "Empty frame-tick methods still cost a native-to-managed call every frame",
);

impl LintRule for EmptyFrameTickMethodLint {
    fn descriptor(&self) -> &'static LintDescriptor {
        &EMPTY_FRAME_TICK_METHOD
    }

    fn check(&self, model: &ScriptModel<'_>, ctx: &mut LintContext<'_>) {
        for (class_idx, class) in model.classes() {
            let info = BehaviourInfo::new(model, class_idx);
            for method in info.frame_tick_methods() {
                let Some(body) = method.body else {
                    continue;
                };
                if is_empty_block(body) {
                    ctx.report_node_with_help(
                        &EMPTY_FRAME_TICK_METHOD,
                        method.name_node,
                        format!(
                            "'{}' has an empty frame-tick method '{}'",
                            class.name, method.name
                        ),
                        "Remove the method; the engine skips callbacks that are not declared",
                    );
                }
            }
        }
    }
}

fn is_empty_block(block: Node<'_>) -> bool {
    let mut cursor = block.walk();
    block
        .named_children(&mut cursor)
        .all(|c| c.kind() == "comment")
}
