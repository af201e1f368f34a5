//! Behavioral properties of the pattern matcher across its public surface

use patina_core::{Node, PatinaError, Span, Value};
use patina_rules::{Capture, Lit, MatchContext, MatchTarget, Pattern, PredicateTable};

fn lvar(name: &str, span: Span) -> Node {
    Node::new("lvar", vec![Value::sym(name)], span)
}

fn str_node(text: &str, span: Span) -> Node {
    Node::new("str", vec![Value::str(text)], span)
}

/// `puts "hi"` with an implicit receiver
fn implicit_puts() -> Node {
    Node::new(
        "send",
        vec![
            Value::None,
            Value::sym("puts"),
            Value::node(str_node("hi", Span::new(5, 9))),
        ],
        Span::new(0, 9),
    )
}

/// `x.puts "hi"`
fn explicit_puts() -> Node {
    Node::new(
        "send",
        vec![
            Value::node(lvar("x", Span::new(0, 1))),
            Value::sym("puts"),
            Value::node(str_node("hi", Span::new(7, 11))),
        ],
        Span::new(0, 11),
    )
}

#[test]
fn extracts_argument_only_for_implicit_receiver() {
    let pattern = Pattern::compile("(send nil? :puts $str_type?)").unwrap();

    let tree = implicit_puts();
    let result = pattern.match_node(&tree).unwrap();
    assert_eq!(result.len(), 1);
    let arg = result.node(0).unwrap();
    assert_eq!(arg.kind(), "str");
    assert_eq!(arg.span(), Span::new(5, 9));

    assert!(pattern.match_node(&explicit_puts()).is_none());
}

#[test]
fn repeated_matches_are_identical() {
    let pattern = Pattern::compile("(send nil? :puts $str_type?)").unwrap();
    let tree = implicit_puts();
    let spans: Vec<Span> = (0..10)
        .map(|_| pattern.match_node(&tree).unwrap().node(0).unwrap().span())
        .collect();
    assert!(spans.iter().all(|&s| s == spans[0]));
}

#[test]
fn captures_arrive_in_pattern_source_order() {
    let pattern = Pattern::compile("(send $_ :foo $_)").unwrap();
    let tree = Node::new(
        "send",
        vec![
            Value::node(lvar("recv", Span::new(0, 4))),
            Value::sym("foo"),
            Value::node(Node::new("int", vec![Value::Int(1)], Span::new(9, 10))),
        ],
        Span::new(0, 11),
    );
    let result = pattern.match_node(&tree).unwrap();
    assert_eq!(result.node(0).unwrap().kind(), "lvar");
    assert_eq!(result.node(1).unwrap().kind(), "int");
}

#[test]
fn rest_splits_around_fixed_ends() {
    let pattern = Pattern::compile("(array _ $... _)").unwrap();
    let elements: Vec<Value> = (0..5)
        .map(|n| Value::node(Node::new("int", vec![Value::Int(n)], Span::at(n as usize))))
        .collect();
    let array = Node::new("array", elements, Span::new(0, 15));

    let result = pattern.match_node(&array).unwrap();
    let middle = result.get(0).unwrap().as_seq().unwrap();
    assert_eq!(middle.len(), 3);
    let values: Vec<i64> = middle
        .iter()
        .map(|v| match v.as_node().unwrap().child(0) {
            Some(Value::Int(n)) => *n,
            other => panic!("unexpected element {other:?}"),
        })
        .collect();
    assert_eq!(values, vec![1, 2, 3]);

    // The gap may be empty but the fixed ends are required.
    let two = Node::new(
        "array",
        vec![
            Value::node(Node::new("int", vec![Value::Int(0)], Span::at(0))),
            Value::node(Node::new("int", vec![Value::Int(1)], Span::at(1))),
        ],
        Span::new(0, 6),
    );
    assert!(pattern.matches(&two));
    let one = Node::new(
        "array",
        vec![Value::node(Node::new("int", vec![Value::Int(0)], Span::at(0)))],
        Span::new(0, 3),
    );
    assert!(!pattern.matches(&one));
}

#[test]
fn alternation_is_ordered_and_capture_balanced() {
    // Both branches match this node; the first one decides the binding.
    let pattern = Pattern::compile("{(send $_ :each) (send $_ _)}").unwrap();
    let tree = Node::new(
        "send",
        vec![Value::node(lvar("xs", Span::new(0, 2))), Value::sym("each")],
        Span::new(0, 7),
    );
    let result = pattern.match_node(&tree).unwrap();
    assert_eq!(result.len(), 1);
    assert_eq!(result.node(0).unwrap().kind(), "lvar");
}

#[test]
fn negation_never_leaks_captures() {
    let pattern = Pattern::compile("[(send _ _) !(send _ :skip)]").unwrap();
    let keep = Node::new(
        "send",
        vec![Value::node(lvar("x", Span::at(0))), Value::sym("go")],
        Span::new(0, 4),
    );
    let skip = Node::new(
        "send",
        vec![Value::node(lvar("x", Span::at(0))), Value::sym("skip")],
        Span::new(0, 6),
    );
    let result = pattern.match_node(&keep).unwrap();
    assert!(result.is_empty());
    assert!(!pattern.matches(&skip));
}

#[test]
fn params_substitute_into_literal_positions() {
    let pattern = Pattern::compile("(send _ %1 (int %2))").unwrap();
    let tree = Node::new(
        "send",
        vec![
            Value::node(lvar("x", Span::at(0))),
            Value::sym("pow"),
            Value::node(Node::new("int", vec![Value::Int(2)], Span::at(6))),
        ],
        Span::new(0, 8),
    );
    let params = [Lit::Sym("pow".to_string()), Lit::Int(2)];
    assert!(pattern.match_with(&tree, &MatchContext::with_params(&params)).is_some());

    let wrong = [Lit::Sym("pow".to_string()), Lit::Int(3)];
    assert!(pattern.match_with(&tree, &MatchContext::with_params(&wrong)).is_none());
}

#[test]
fn predicates_receive_target_and_arguments() {
    let pattern = Pattern::compile("(send _ #allowed?(:each, :map))").unwrap();
    let mut table = PredicateTable::new();
    table.register("allowed?", |target, args| {
        let MatchTarget::Value(Value::Sym(selector)) = target else {
            return false;
        };
        args.iter().any(|a| matches!(a, Lit::Sym(s) if s == selector))
    });
    let ctx = MatchContext::with_predicates(&table);

    let each = Node::new(
        "send",
        vec![Value::node(lvar("xs", Span::at(0))), Value::sym("each")],
        Span::new(0, 7),
    );
    let drop = Node::new(
        "send",
        vec![Value::node(lvar("xs", Span::at(0))), Value::sym("drop")],
        Span::new(0, 7),
    );
    assert!(pattern.match_with(&each, &ctx).is_some());
    assert!(pattern.match_with(&drop, &ctx).is_none());
}

#[test]
fn search_walks_the_subtree_in_preorder() {
    let pattern = Pattern::compile("(lvar :y)").unwrap();
    let tree = Node::new(
        "begin",
        vec![
            Value::node(lvar("x", Span::new(0, 1))),
            Value::node(lvar("y", Span::new(3, 4))),
            Value::node(lvar("y", Span::new(6, 7))),
        ],
        Span::new(0, 7),
    );
    let ctx = MatchContext::default();
    let (found, _) = pattern.search(&tree, &ctx).unwrap();
    assert_eq!(found.span(), Span::new(3, 4));
    assert_eq!(pattern.search_all(&tree, &ctx).len(), 2);
}

#[test]
fn sequence_captures_coexist_with_node_captures() {
    let pattern = Pattern::compile("(send $_ :push $...)").unwrap();
    let tree = Node::new(
        "send",
        vec![
            Value::node(lvar("xs", Span::new(0, 2))),
            Value::sym("push"),
            Value::node(Node::new("int", vec![Value::Int(1)], Span::at(8))),
            Value::node(Node::new("int", vec![Value::Int(2)], Span::at(11))),
        ],
        Span::new(0, 12),
    );
    let result = pattern.match_node(&tree).unwrap();
    assert_eq!(result.len(), 2);
    assert!(matches!(result.get(0), Some(Capture::Node(_))));
    assert_eq!(result.get(1).unwrap().as_seq().unwrap().len(), 2);
}

#[test]
fn compile_errors_carry_offsets() {
    match Pattern::compile("(send _").unwrap_err() {
        PatinaError::PatternCompile { offset, .. } => assert_eq!(offset, 0),
        other => panic!("expected PatternCompile, got {other:?}"),
    }
    match Pattern::compile("(array ... _ ...)").unwrap_err() {
        PatinaError::PatternCompile { offset, .. } => assert_eq!(offset, 13),
        other => panic!("expected PatternCompile, got {other:?}"),
    }
    assert!(Pattern::compile("{(send $_ :a) (send _ :b)}").is_err());
    assert!(Pattern::compile("!(send $_ :a)").is_err());
}

#[test]
fn no_match_is_never_an_error() {
    let pattern = Pattern::compile("(send _ :frozen)").unwrap();
    let tree = lvar("x", Span::at(0));
    assert!(pattern.match_node(&tree).is_none());
    assert!(!pattern.matches(&tree));
}
