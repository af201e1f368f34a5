//! Patina Rules
//!
//! The node-pattern DSL and the rule runtime built on `patina-core`.
//! Patterns are compiled once into a shared registry; cops subscribe to
//! node kinds and report offenses, optionally with autocorrections that
//! the engine applies atomically per file.

pub mod builtin;
pub mod engine;
pub mod pattern;

pub use builtin::{default_cops, DoubleNegation, NilComparison, ReverseEach};
pub use engine::{CheckContext, Cop, Engine, EngineConfig, FileOutcome};
pub use pattern::{
    Capture, Lit, MatchContext, MatchResult, MatchTarget, NoPredicates, Pattern,
    PatternRegistry, PredicateResolver, PredicateTable,
};
