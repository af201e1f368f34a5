//! Built-in cops

mod double_negation;
mod nil_comparison;
mod reverse_each;

pub use double_negation::DoubleNegation;
pub use nil_comparison::NilComparison;
pub use reverse_each::ReverseEach;

use crate::engine::Cop;

/// The cops an engine starts with by default
pub fn default_cops() -> Vec<Box<dyn Cop>> {
    vec![
        Box::new(DoubleNegation),
        Box::new(NilComparison),
        Box::new(ReverseEach),
    ]
}
