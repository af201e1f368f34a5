//! Rule runtime
//!
//! An [`Engine`] owns a set of registered cops, their compiled patterns, and
//! a kind-indexed dispatch table. Running one file is a single pre-order
//! walk of the tree: each node is offered only to the cops that subscribed
//! to its kind. Diagnostics accumulate per file; accepted fixes flow into
//! one [`Corrector`] and are applied as a single atomic rewrite at the end.
//!
//! Files are independent, so [`Engine::run_files`] fans out with rayon.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use patina_core::{
    Applicability, Corrector, Diagnostic, Fix, Location, Node, PatinaError, Result, ResultExt,
    Severity, SourceFile, SourceParser, Span,
};

use crate::pattern::{Pattern, PatternRegistry};

/// Engine behavior toggles
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Collect fix edits and rewrite sources
    pub autocorrect: bool,
    /// Also apply fixes marked as needing review
    pub apply_unsafe: bool,
    /// Report rewrites without writing them back
    pub dry_run: bool,
}

/// One lint rule
///
/// Cops are stateless; per-file state lives in the [`CheckContext`] handed
/// to `check`. Pattern sources returned from `patterns` are compiled at
/// registration and fetched back through [`CheckContext::pattern`].
pub trait Cop: Send + Sync {
    /// Rule identifier, e.g. `Style/NilComparison`
    fn name(&self) -> &'static str;

    /// Pattern sources this cop uses; compiled once at registration
    fn patterns(&self) -> &[&str] {
        &[]
    }

    /// Node kinds this cop wants to see
    fn node_kinds(&self) -> &'static [&'static str];

    fn severity(&self) -> Severity {
        Severity::Warning
    }

    /// Inspect one node and report offenses through the context
    fn check(&self, node: &Node, ctx: &mut CheckContext<'_>);
}

/// Per-file state threaded through cop callbacks
pub struct CheckContext<'a> {
    file: &'a SourceFile,
    registry: &'a PatternRegistry,
    rule_id: &'static str,
    severity: Severity,
    config: EngineConfig,
    diagnostics: &'a mut Vec<Diagnostic>,
    corrector: &'a mut Corrector,
}

impl<'a> CheckContext<'a> {
    pub fn file(&self) -> &'a SourceFile {
        self.file
    }

    /// Fetch a pattern compiled at registration time
    pub fn pattern(&self, source: &str) -> Option<Arc<Pattern>> {
        let pattern = self.registry.get(source);
        if pattern.is_none() {
            warn!(rule = self.rule_id, pattern = source, "pattern was not registered");
        }
        pattern
    }

    /// Report an offense with no autocorrection
    pub fn offense(&mut self, span: Span, message: impl Into<String>) {
        let location = Location::from_span(self.file, span);
        self.diagnostics.push(Diagnostic::new(
            self.rule_id,
            self.severity,
            message,
            location,
        ));
    }

    /// Report an offense carrying a fix. When autocorrect is on and the fix
    /// is eligible, its edits join the file's shared corrector.
    pub fn offense_with_fix(&mut self, span: Span, message: impl Into<String>, fix: Fix) {
        let eligible =
            fix.applicability == Applicability::Always || self.config.apply_unsafe;
        if self.config.autocorrect && eligible {
            self.corrector.extend(fix.edits.iter().cloned());
        }
        let location = Location::from_span(self.file, span);
        self.diagnostics.push(
            Diagnostic::new(self.rule_id, self.severity, message, location).with_fix(fix),
        );
    }
}

/// Result of running the engine over one file
#[derive(Debug)]
pub struct FileOutcome {
    pub path: PathBuf,
    pub diagnostics: Vec<Diagnostic>,
    /// Rewritten source, present only when autocorrect produced a change
    pub rewritten: Option<String>,
    /// Overlapping edit pair that aborted this file's rewrite
    pub conflict: Option<(Span, Span)>,
}

impl FileOutcome {
    pub fn has_offenses(&self) -> bool {
        !self.diagnostics.is_empty()
    }
}

/// Owns cops, compiled patterns, and the per-kind dispatch table
pub struct Engine {
    cops: Vec<Box<dyn Cop>>,
    registry: PatternRegistry,
    dispatch: HashMap<&'static str, Vec<usize>>,
    config: EngineConfig,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            cops: Vec::new(),
            registry: PatternRegistry::new(),
            dispatch: HashMap::new(),
            config,
        }
    }

    /// Engine preloaded with the built-in cops
    pub fn with_default_cops(config: EngineConfig) -> Result<Self> {
        let mut engine = Self::new(config);
        for cop in crate::builtin::default_cops() {
            engine.register(cop)?;
        }
        Ok(engine)
    }

    /// Register a cop, compiling its patterns. A pattern that fails to
    /// compile rejects the cop here rather than surfacing mid-run.
    pub fn register(&mut self, cop: Box<dyn Cop>) -> Result<()> {
        for source in cop.patterns() {
            self.registry.compile(source).map_err(|e| match e {
                PatinaError::PatternCompile { message, offset } => PatinaError::rule_error(
                    cop.name(),
                    format!("bad pattern at offset {offset}: {message}"),
                ),
                other => other,
            })?;
        }
        let index = self.cops.len();
        for kind in cop.node_kinds() {
            self.dispatch.entry(kind).or_default().push(index);
        }
        debug!(rule = cop.name(), "registered cop");
        self.cops.push(cop);
        Ok(())
    }

    pub fn config(&self) -> EngineConfig {
        self.config
    }

    /// Lint one parsed file
    pub fn run(&self, file: &SourceFile, root: &Node) -> FileOutcome {
        let mut diagnostics = Vec::new();
        let mut corrector = Corrector::new();

        for node in root.descendants() {
            let Some(indices) = self.dispatch.get(node.kind()) else {
                continue;
            };
            for &index in indices {
                let cop = &self.cops[index];
                let mut ctx = CheckContext {
                    file,
                    registry: &self.registry,
                    rule_id: cop.name(),
                    severity: cop.severity(),
                    config: self.config,
                    diagnostics: &mut diagnostics,
                    corrector: &mut corrector,
                };
                cop.check(node, &mut ctx);
            }
        }

        let mut rewritten = None;
        let mut conflict = None;
        if self.config.autocorrect && !corrector.is_empty() {
            match corrector.apply(file.content()) {
                Ok(output) => {
                    if output != file.content() {
                        rewritten = Some(output);
                    }
                }
                Err(PatinaError::EditConflict { first, second }) => {
                    warn!(
                        file = %file.path().display(),
                        %first,
                        %second,
                        "conflicting fixes, skipping rewrite"
                    );
                    conflict = Some((first, second));
                }
                Err(e) => {
                    warn!(file = %file.path().display(), error = %e, "rewrite failed");
                }
            }
        }

        FileOutcome {
            path: file.path().to_path_buf(),
            diagnostics,
            rewritten,
            conflict,
        }
    }

    /// Lint many parsed files in parallel. Trees are read-only and patterns
    /// are shared immutably, so files fan out without coordination.
    pub fn run_files(&self, files: &[(SourceFile, Node)]) -> Vec<FileOutcome> {
        files
            .par_iter()
            .map(|(file, root)| self.run(file, root))
            .collect()
    }

    /// Read, parse, lint, and (outside dry-run) rewrite one file on disk.
    /// The write happens only when the whole edit set applied cleanly.
    pub fn apply_to_path(
        &self,
        path: impl AsRef<Path>,
        parser: &dyn SourceParser,
    ) -> Result<FileOutcome> {
        let path = path.as_ref();
        let content =
            fs::read_to_string(path).map_err(|e| PatinaError::io_error(path, e))?;
        let file = SourceFile::new(path, content);
        let root = parser.parse(file.content())?;
        let outcome = self.run(&file, &root);
        if let Some(rewritten) = &outcome.rewritten {
            if !self.config.dry_run {
                fs::write(path, rewritten).map_err(|e| PatinaError::io_error(path, e))?;
            }
        }
        Ok(outcome)
    }

    /// Lint many files on disk in parallel. A file that fails to parse or
    /// rewrite is logged and skipped; the rest of the batch proceeds.
    pub fn apply_to_paths(
        &self,
        paths: &[PathBuf],
        parser: &(dyn SourceParser + Sync),
    ) -> Vec<FileOutcome> {
        paths
            .par_iter()
            .filter_map(|path| self.apply_to_path(path, parser).log_and_continue())
            .collect()
    }
}
