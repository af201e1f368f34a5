//! Compiled-pattern registry
//!
//! Rules declare pattern sources once at registration; the registry compiles
//! and deduplicates them. After registration it is read-only, so `Arc`
//! handles can be shared across worker threads without locking.

use std::collections::HashMap;
use std::sync::Arc;

use patina_core::Result;
use tracing::debug;

use super::matcher::Pattern;

#[derive(Debug, Default)]
pub struct PatternRegistry {
    patterns: HashMap<String, Arc<Pattern>>,
}

impl PatternRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compile `source` and store it, returning the shared handle. The same
    /// source string compiles only once.
    pub fn compile(&mut self, source: &str) -> Result<Arc<Pattern>> {
        if let Some(pattern) = self.patterns.get(source) {
            return Ok(Arc::clone(pattern));
        }
        let pattern = Arc::new(Pattern::compile(source)?);
        debug!(pattern = source, captures = pattern.capture_count(), "compiled pattern");
        self.patterns.insert(source.to_string(), Arc::clone(&pattern));
        Ok(pattern)
    }

    /// Look up an already-compiled pattern by its source text
    pub fn get(&self, source: &str) -> Option<Arc<Pattern>> {
        self.patterns.get(source).map(Arc::clone)
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}
