//! Checks for comparison of something with nil using `==` or `===`

use patina_core::{Edit, Fix, Node};

use crate::engine::{CheckContext, Cop};

const PATTERN: &str = "(send $_ {:== :===} nil)";

/// Rewrites `x == nil` to `x.nil?`
pub struct NilComparison;

impl Cop for NilComparison {
    fn name(&self) -> &'static str {
        "Style/NilComparison"
    }

    fn patterns(&self) -> &[&str] {
        &[PATTERN]
    }

    fn node_kinds(&self) -> &'static [&'static str] {
        &["send"]
    }

    fn check(&self, node: &Node, ctx: &mut CheckContext<'_>) {
        let Some(pattern) = ctx.pattern(PATTERN) else {
            return;
        };
        let Some(result) = pattern.match_node(node) else {
            return;
        };
        let message = "Prefer the use of the `nil?` predicate.";

        // The receiver must be a real node with resolvable source text for
        // the fix to be expressible.
        let replacement = result
            .node(0)
            .and_then(|recv| ctx.file().slice(recv.span()))
            .map(|recv| format!("{recv}.nil?"));
        match replacement {
            Some(replacement) => {
                let fix = Fix::safe(
                    "Replace the comparison with `.nil?`",
                    vec![Edit::replace(node.span(), replacement)],
                );
                ctx.offense_with_fix(node.span(), message, fix);
            }
            None => ctx.offense(node.span(), message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{Engine, EngineConfig};
    use patina_core::{SourceFile, Span, Value};

    fn nil_compare(selector: &str) -> Node {
        // x == nil
        Node::new(
            "send",
            vec![
                Value::node(Node::new("lvar", vec![Value::sym("x")], Span::new(0, 1))),
                Value::sym(selector),
                Value::node(Node::leaf("nil", Span::new(5, 8))),
            ],
            Span::new(0, 8),
        )
    }

    #[test]
    fn test_rewrites_nil_comparison() {
        let mut engine = Engine::new(EngineConfig { autocorrect: true, ..Default::default() });
        engine.register(Box::new(NilComparison)).unwrap();

        let file = SourceFile::new("t.rb", "x == nil");
        let outcome = engine.run(&file, &nil_compare("=="));
        assert_eq!(outcome.diagnostics.len(), 1);
        assert!(outcome.diagnostics[0].has_safe_fix());
        assert_eq!(outcome.rewritten.as_deref(), Some("x.nil?"));
    }

    #[test]
    fn test_case_equality_also_flagged() {
        let mut engine = Engine::new(EngineConfig::default());
        engine.register(Box::new(NilComparison)).unwrap();

        let file = SourceFile::new("t.rb", "x === nil");
        let outcome = engine.run(&file, &nil_compare("==="));
        assert_eq!(outcome.diagnostics.len(), 1);
    }

    #[test]
    fn test_other_comparisons_ignored() {
        let mut engine = Engine::new(EngineConfig::default());
        engine.register(Box::new(NilComparison)).unwrap();

        let file = SourceFile::new("t.rb", "x != nil");
        let outcome = engine.run(&file, &nil_compare("!="));
        assert!(outcome.diagnostics.is_empty());
    }
}
