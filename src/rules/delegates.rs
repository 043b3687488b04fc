//! Delegate caching analysis for frame-tick methods.
//!
//! Subscribing a bare instance-method group (`e += OnCallBack;`) or passing
//! one as a delegate-typed argument constructs a fresh delegate instance on
//! every evaluation. Inside a method that runs every frame that is steady
//! garbage-collector pressure for no benefit: the delegate can be created
//! once and stored. Static method groups are exempt (no per-instance closure
//! is allocated), and reads of delegate-typed fields, locals, or parameters
//! are reuse by definition.
//!
//! The analysis is per-statement and syntactic: it does not trace how a
//! cached field was assigned, and it never guesses. Anything the single-file
//! model cannot resolve is not a site at all.

use crate::behaviour::BehaviourInfo;
use crate::lint::{LintCategory, LintContext, LintDescriptor, LintRule};
use crate::semantic::{MethodDecl, MethodScope, Resolved, ScriptModel, walk};
use crate::trace_unresolved;
use crate::type_classifier::is_delegate_type;
use tree_sitter::Node;

pub struct ShouldCacheDelegateLint;

static SHOULD_CACHE_DELEGATE: LintDescriptor = LintDescriptor::stable(
    "should_cache_delegate",
    LintCategory::Gc,
    "Delegate references in frame-tick methods should be cached, not recreated every frame",
);

/// How a callable-reference expression obtains its delegate value.
///
/// Kept as an explicit enumeration with a single flagworthy table so the
/// policy stays auditable and extensible to new reference shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceShape {
    /// `OnCallBack` resolving to an instance method of the enclosing type.
    BareMethodGroup,
    /// `this.OnCallBack` resolving the same way.
    QualifiedMethodGroup,
    /// A read of a delegate-typed field, local, or parameter.
    StoredReference,
    /// A method group resolving to a static method.
    StaticMethodGroup,
    /// Any other delegate-producing expression: lambda, anonymous method,
    /// nested invocation, `new Handler(...)`.
    Opaque,
}

impl ReferenceShape {
    /// Flagworthy table: does evaluating this shape allocate a fresh
    /// delegate instance?
    pub fn is_fresh_construction(self) -> bool {
        match self {
            ReferenceShape::BareMethodGroup => true,
            ReferenceShape::QualifiedMethodGroup => true,
            ReferenceShape::StoredReference => false,
            ReferenceShape::StaticMethodGroup => false,
            ReferenceShape::Opaque => true,
        }
    }
}

impl LintRule for ShouldCacheDelegateLint {
    fn descriptor(&self) -> &'static LintDescriptor {
        &SHOULD_CACHE_DELEGATE
    }

    fn check(&self, model: &ScriptModel<'_>, ctx: &mut LintContext<'_>) {
        for (class_idx, _) in model.classes() {
            let info = BehaviourInfo::new(model, class_idx);
            for method in info.frame_tick_methods() {
                analyze_method(model, class_idx, method, ctx);
            }
        }
    }
}

fn analyze_method(
    model: &ScriptModel<'_>,
    class_idx: usize,
    method: &MethodDecl<'_>,
    ctx: &mut LintContext<'_>,
) {
    // A method the parser could not give a body yields zero findings.
    let Some(body) = method.body else {
        return;
    };

    let scope = model.method_scope(method);
    let mut reported: Vec<(usize, usize)> = Vec::new();

    walk(body, &mut |node| match node.kind() {
        "assignment_expression" => {
            check_combination_site(model, class_idx, &scope, method, node, ctx, &mut reported);
        }
        "invocation_expression" => {
            check_argument_sites(model, class_idx, &scope, method, node, ctx, &mut reported);
        }
        _ => {}
    });
}

/// `target += expr` / `target -= expr` where `target` is event- or
/// delegate-typed: the right-hand side is a callable-reference site.
fn check_combination_site(
    model: &ScriptModel<'_>,
    class_idx: usize,
    scope: &MethodScope,
    method: &MethodDecl<'_>,
    node: Node<'_>,
    ctx: &mut LintContext<'_>,
    reported: &mut Vec<(usize, usize)>,
) {
    if !is_combination_operator(model, node) {
        return;
    }
    let (Some(left), Some(right)) = (
        node.child_by_field_name("left"),
        node.child_by_field_name("right"),
    ) else {
        return;
    };
    if !is_delegate_target(model, class_idx, scope, left) {
        return;
    }

    match classify_reference(model, class_idx, scope, right) {
        Some(shape) if shape.is_fresh_construction() => {
            report_site(model, method, right, shape, ctx, reported);
        }
        Some(_) => {}
        // Unresolved: not a site (fail-open).
        None => {}
    }
}

/// Arguments whose declared parameter type is a delegate type are
/// callable-reference sites; all other arguments are ignored.
fn check_argument_sites(
    model: &ScriptModel<'_>,
    class_idx: usize,
    scope: &MethodScope,
    method: &MethodDecl<'_>,
    node: Node<'_>,
    ctx: &mut LintContext<'_>,
    reported: &mut Vec<(usize, usize)>,
) {
    // Outermost-site rule: an invocation nested inside an already-reported
    // combination right-hand side is not re-scanned.
    if reported
        .iter()
        .any(|&(start, end)| start <= node.start_byte() && node.end_byte() <= end)
    {
        return;
    }

    let Some(callee_name) = self_call_target(model, node) else {
        return;
    };
    let args = call_arguments(node);
    let Some(callee) = model.resolve_method_by_arity(class_idx, callee_name, args.len()) else {
        trace_unresolved!(callee = callee_name, "invocation target not resolved in unit");
        return;
    };

    for (position, arg) in args.iter().enumerate() {
        // Named arguments bind to the parameter they name, not to their
        // position in the argument list.
        let param = match arg.label {
            Some(label) => {
                let label = model.text(label);
                callee.params.iter().find(|p| p.name == label)
            }
            None => callee.params.get(position),
        };
        let Some(param) = param else {
            trace_unresolved!(callee = callee_name, "argument binds to no declared parameter");
            continue;
        };
        if !is_delegate_type(model, &param.type_name) {
            continue;
        }
        match classify_reference(model, class_idx, scope, arg.expr) {
            Some(shape) if shape.is_fresh_construction() => {
                report_site(model, method, arg.expr, shape, ctx, reported);
            }
            _ => {}
        }
    }
}

fn report_site(
    model: &ScriptModel<'_>,
    method: &MethodDecl<'_>,
    site: Node<'_>,
    shape: ReferenceShape,
    ctx: &mut LintContext<'_>,
    reported: &mut Vec<(usize, usize)>,
) {
    // Narrow `this.OnCallBack` down to the method name itself so tooling
    // underlines exactly the reference.
    let node = if shape == ReferenceShape::QualifiedMethodGroup {
        site.child_by_field_name("name").unwrap_or(site)
    } else {
        site
    };

    let range = (node.start_byte(), node.end_byte());
    if reported.contains(&range) {
        return;
    }
    reported.push(range);

    let message = match shape {
        ReferenceShape::BareMethodGroup | ReferenceShape::QualifiedMethodGroup => format!(
            "The method group '{}' allocates a new delegate every time '{}' runs",
            model.text(node),
            method.name
        ),
        _ => format!(
            "This delegate expression allocates a new instance every time '{}' runs",
            method.name
        ),
    };

    ctx.report_node_with_help(
        &SHOULD_CACHE_DELEGATE,
        node,
        message,
        "Create the delegate once in a setup method such as Awake and store it in a field",
    );
}

fn is_combination_operator(model: &ScriptModel<'_>, assignment: Node<'_>) -> bool {
    for i in 0..assignment.child_count() {
        if let Some(child) = assignment.child(i) {
            let text = model.text(child);
            if text == "+=" || text == "-=" {
                return true;
            }
            if child.kind() == "assignment_operator" {
                // Some other compound or plain assignment.
                return false;
            }
        }
    }
    false
}

/// Whether the left-hand side of a combination resolves to an event or
/// delegate-typed member/local. Unresolvable targets are not sites.
fn is_delegate_target(
    model: &ScriptModel<'_>,
    class_idx: usize,
    scope: &MethodScope,
    node: Node<'_>,
) -> bool {
    let node = unwrap_parens(node);
    let resolved = match node.kind() {
        "identifier" => model.resolve_identifier(class_idx, scope, model.text(node)),
        "member_access_expression" => match self_member_name(model, node) {
            Some(name) => model.resolve_member(class_idx, name),
            None => None,
        },
        _ => None,
    };

    match resolved {
        Some(Resolved::Field(field)) => field.is_event || is_delegate_type(model, &field.type_name),
        Some(Resolved::Local { type_name }) => is_delegate_type(model, type_name),
        Some(Resolved::Method(_)) => false,
        None => {
            trace_unresolved!("combination target not resolved; skipping site");
            false
        }
    }
}

/// Classify a callable-reference expression. `None` means the expression
/// could not be resolved and must not be treated as a site.
fn classify_reference(
    model: &ScriptModel<'_>,
    class_idx: usize,
    scope: &MethodScope,
    node: Node<'_>,
) -> Option<ReferenceShape> {
    let node = unwrap_parens(node);

    match node.kind() {
        "identifier" => {
            match model.resolve_identifier(class_idx, scope, model.text(node))? {
                Resolved::Local { type_name } => {
                    is_delegate_type(model, type_name).then_some(ReferenceShape::StoredReference)
                }
                Resolved::Field(field) => (field.is_event
                    || is_delegate_type(model, &field.type_name))
                .then_some(ReferenceShape::StoredReference),
                Resolved::Method(method) if method.is_static => {
                    Some(ReferenceShape::StaticMethodGroup)
                }
                Resolved::Method(_) => Some(ReferenceShape::BareMethodGroup),
            }
        }
        "member_access_expression" => {
            // Only `this.<name>` is resolvable within the unit; member access
            // on any other receiver could be a stored reference on a foreign
            // object, so it is not a site.
            let name = self_member_name(model, node)?;
            match model.resolve_member(class_idx, name)? {
                Resolved::Field(field) => (field.is_event
                    || is_delegate_type(model, &field.type_name))
                .then_some(ReferenceShape::StoredReference),
                Resolved::Method(method) if method.is_static => {
                    Some(ReferenceShape::StaticMethodGroup)
                }
                Resolved::Method(_) => Some(ReferenceShape::QualifiedMethodGroup),
                Resolved::Local { .. } => None,
            }
        }
        // Lambdas, anonymous methods, nested invocations, object creation:
        // evaluating any of these constructs a fresh delegate.
        _ => Some(ReferenceShape::Opaque),
    }
}

fn unwrap_parens(mut node: Node<'_>) -> Node<'_> {
    while node.kind() == "parenthesized_expression" {
        match node.named_child(0) {
            Some(inner) => node = inner,
            None => break,
        }
    }
    node
}

/// For `this.<identifier>` member accesses, the member name; otherwise None.
fn self_member_name<'a>(model: &ScriptModel<'a>, node: Node<'a>) -> Option<&'a str> {
    let receiver = node.child_by_field_name("expression")?;
    if receiver.kind() != "this_expression" {
        return None;
    }
    let name = node.child_by_field_name("name")?;
    Some(model.text(name))
}

/// Callee name for invocations on the enclosing instance: `Foo(...)` or
/// `this.Foo(...)`. Invocations on other receivers cannot be resolved in a
/// single unit and yield no sites.
fn self_call_target<'a>(model: &ScriptModel<'a>, invocation: Node<'a>) -> Option<&'a str> {
    let function = invocation.child_by_field_name("function")?;
    match function.kind() {
        "identifier" => Some(model.text(function)),
        "member_access_expression" => self_member_name(model, function),
        _ => None,
    }
}

/// One invocation argument: the label of a named argument
/// (`callback: expr`) when present, and the argument expression itself.
struct CallArgument<'a> {
    label: Option<Node<'a>>,
    expr: Node<'a>,
}

fn call_arguments<'a>(invocation: Node<'a>) -> Vec<CallArgument<'a>> {
    let Some(list) = invocation.child_by_field_name("arguments") else {
        return Vec::new();
    };

    let mut out = Vec::new();
    let mut cursor = list.walk();
    for arg in list.children(&mut cursor) {
        if arg.kind() != "argument" {
            continue;
        }
        let mut inner = arg.walk();
        let children: Vec<Node<'a>> = arg.children(&mut inner).collect();

        // A name label is the identifier preceding the ':' token; the
        // expression is the last named child (skips labels and ref/out
        // modifiers).
        let label = match children.iter().position(|c| c.kind() == ":") {
            Some(i) => children[..i].iter().rev().find(|c| c.is_named()).copied(),
            None => arg.child_by_field_name("name").or_else(|| {
                children
                    .iter()
                    .find(|c| c.kind() == "name_colon")
                    .and_then(|n| n.named_child(0))
            }),
        };
        let Some(expr) = children.iter().rev().find(|c| c.is_named()).copied() else {
            continue;
        };
        if label.is_some_and(|l| l.id() == expr.id()) {
            // A label with no expression after it; nothing to classify.
            continue;
        }
        out.push(CallArgument { label, expr });
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flagworthy_table_matches_policy() {
        assert!(ReferenceShape::BareMethodGroup.is_fresh_construction());
        assert!(ReferenceShape::QualifiedMethodGroup.is_fresh_construction());
        assert!(ReferenceShape::Opaque.is_fresh_construction());
        assert!(!ReferenceShape::StoredReference.is_fresh_construction());
        assert!(!ReferenceShape::StaticMethodGroup.is_fresh_construction());
    }
}
