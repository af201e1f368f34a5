//! Checks for `reverse.each` chains

use patina_core::{Edit, Fix, Node};

use crate::engine::{CheckContext, Cop};

const PATTERN: &str = "(send (send $_ :reverse) :each)";

/// Rewrites `xs.reverse.each` to `xs.reverse_each`, which skips the
/// intermediate array.
pub struct ReverseEach;

impl Cop for ReverseEach {
    fn name(&self) -> &'static str {
        "Performance/ReverseEach"
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
        let message = "Use `reverse_each` instead of `reverse.each`.";

        let replacement = result
            .node(0)
            .and_then(|recv| ctx.file().slice(recv.span()))
            .map(|recv| format!("{recv}.reverse_each"));
        match replacement {
            Some(replacement) => {
                let fix = Fix::safe(
                    "Replace the chain with `reverse_each`",
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

    fn reverse_each_chain() -> Node {
        // xs.reverse.each
        let xs = Node::new("lvar", vec![Value::sym("xs")], Span::new(0, 2));
        let reverse = Node::new(
            "send",
            vec![Value::node(xs), Value::sym("reverse")],
            Span::new(0, 10),
        );
        Node::new(
            "send",
            vec![Value::node(reverse), Value::sym("each")],
            Span::new(0, 15),
        )
    }

    #[test]
    fn test_rewrites_reverse_each() {
        let mut engine = Engine::new(EngineConfig { autocorrect: true, ..Default::default() });
        engine.register(Box::new(ReverseEach)).unwrap();

        let file = SourceFile::new("t.rb", "xs.reverse.each");
        let outcome = engine.run(&file, &reverse_each_chain());
        assert_eq!(outcome.diagnostics.len(), 1);
        assert_eq!(outcome.rewritten.as_deref(), Some("xs.reverse_each"));
    }

    #[test]
    fn test_plain_each_ignored() {
        let mut engine = Engine::new(EngineConfig::default());
        engine.register(Box::new(ReverseEach)).unwrap();

        let file = SourceFile::new("t.rb", "xs.each");
        let xs = Node::new("lvar", vec![Value::sym("xs")], Span::new(0, 2));
        let each = Node::new(
            "send",
            vec![Value::node(xs), Value::sym("each")],
            Span::new(0, 7),
        );
        assert!(engine.run(&file, &each).diagnostics.is_empty());
    }
}
