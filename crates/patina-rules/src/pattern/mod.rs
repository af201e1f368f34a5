//! The node-pattern DSL: lexer, parser, matcher, and pattern registry

pub mod lexer;
pub mod parser;
pub mod matcher;
pub mod registry;

pub use matcher::{
    Capture, MatchContext, MatchResult, MatchTarget, NoPredicates, Pattern, PredicateResolver,
    PredicateTable,
};
pub use parser::{Arg, Lit, Pat};
pub use registry::PatternRegistry;
