//! Patina Core
//!
//! Core engine for the Patina linter: the immutable syntax tree model,
//! source mapping, diagnostics, and the edit-collecting corrector. The
//! pattern DSL and the rule runtime live in `patina-rules`.

pub mod corrector;
pub mod diagnostics;
pub mod error;
pub mod result;
pub mod source;
pub mod tree;

// Re-export commonly used types
pub use corrector::{Corrector, Edit, EditKind};
pub use diagnostics::{
    diagnostics_to_json, Applicability, Diagnostic, Fix, Location, Severity,
};
pub use error::{ErrorKind, PatinaError};
pub use result::{Result, ResultExt};
pub use source::SourceFile;
pub use tree::{Descendants, Node, SourceParser, Span, Value};

/// Initialize the tracing subscriber for logging
pub fn init_tracing() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("patina=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_file(true)
                .with_line_number(true),
        )
        .init();
}

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
