use crate::error::{ClippyResult, UnityClippyError};
use tree_sitter::{Language, Parser, Tree};

fn csharp_language() -> Language {
    tree_sitter_c_sharp::language()
}

/// Parse a C# source string into a tree-sitter syntax tree.
///
/// Editor buffers are routinely incomplete, so trees containing ERROR nodes
/// are returned as-is; downstream analysis fails open on anything it cannot
/// resolve inside them.
pub fn parse_source(source: &str) -> ClippyResult<Tree> {
    let mut parser = Parser::new();
    parser
        .set_language(csharp_language())
        .map_err(|e| UnityClippyError::grammar(format!("failed to load C# grammar: {e}")))?;

    parser
        .parse(source, None)
        .ok_or_else(|| UnityClippyError::parse("tree-sitter failed to parse source"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_minimal_class() {
        let src = r#"
using UnityEngine;

class C : MonoBehaviour
{
    void Update() { }
}
"#;
        let tree = parse_source(src).expect("parse should succeed");
        assert_eq!(tree.root_node().kind(), "compilation_unit");
    }

    #[test]
    fn tolerates_incomplete_source() {
        let src = "class C : MonoBehaviour {\n    void Update() {";
        let tree = parse_source(src).expect("parse should succeed even on broken input");
        assert!(tree.root_node().child_count() > 0);
    }
}
