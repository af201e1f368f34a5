//! Checks for uses of double negation (`!!`)

use patina_core::Node;

use crate::engine::{CheckContext, Cop};

const PATTERN: &str = "(send (send _ :!) :!)";

/// `!!x` converts a value to a boolean the hard way. The rewrite to
/// `!x.nil?` changes behavior for `false`, so this cop only reports.
pub struct DoubleNegation;

impl Cop for DoubleNegation {
    fn name(&self) -> &'static str {
        "Style/DoubleNegation"
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
        if pattern.matches(node) {
            ctx.offense(node.span(), "Avoid the use of double negation (`!!`).");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{Engine, EngineConfig};
    use patina_core::{SourceFile, Span, Value};

    fn bang(receiver: Node, span: Span) -> Node {
        Node::new("send", vec![Value::node(receiver), Value::sym("!")], span)
    }

    #[test]
    fn test_reports_double_negation() {
        let mut engine = Engine::new(EngineConfig::default());
        engine.register(Box::new(DoubleNegation)).unwrap();

        let file = SourceFile::new("t.rb", "!!x");
        let x = Node::new("lvar", vec![Value::sym("x")], Span::new(2, 3));
        let tree = bang(bang(x, Span::new(1, 3)), Span::new(0, 3));

        let outcome = engine.run(&file, &tree);
        assert_eq!(outcome.diagnostics.len(), 1);
        assert!(outcome.diagnostics[0].fix.is_none());
    }

    #[test]
    fn test_single_negation_is_fine() {
        let mut engine = Engine::new(EngineConfig::default());
        engine.register(Box::new(DoubleNegation)).unwrap();

        let file = SourceFile::new("t.rb", "!x");
        let x = Node::new("lvar", vec![Value::sym("x")], Span::new(1, 2));
        let tree = bang(x, Span::new(0, 2));

        assert!(engine.run(&file, &tree).diagnostics.is_empty());
    }
}
