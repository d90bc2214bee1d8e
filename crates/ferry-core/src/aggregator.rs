//! # Multi-File Aggregator
//!
//! Drives parse → build → resolve over a root input and, optionally, every
//! file it includes.
//!
//! - FIFO queue seeded with the root, plus a visited set of canonical paths
//! - One `ResolutionSession` per `obtain` call
//! - Accepted functions go under the processed file, accepted structs under
//!   their declaring file
//! - Inline source is written to a scratch file that is removed on every
//!   exit path; its bucket has no origin

use crate::ast::{ParserAdapter, TranslationUnit};
use crate::builder::EntityBuilder;
use crate::catalog::{Catalog, FunctionEntry, Origin, StructEntry};
use crate::diagnostics::DiagnosticSink;
use crate::normalize::AliasTable;
use crate::policy::Policy;
use crate::primitives::{INLINE_SOURCE_PREFIX, INLINE_SOURCE_SUFFIX};
use crate::resolver::{ResolutionSession, Resolver};
use crate::{FerryError, Struct};
use regex::Regex;
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

// =============================================================================
// INPUT & OPTIONS
// =============================================================================

/// What to extract from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceInput {
    /// A file on disk.
    Path(PathBuf),
    /// C++ source text.
    Inline(String),
}

impl SourceInput {
    /// An existing file path is a path; anything else is source text.
    #[must_use]
    pub fn detect(text: &str) -> Self {
        let path = Path::new(text);
        if path.is_file() {
            Self::Path(path.to_path_buf())
        } else {
            Self::Inline(text.to_string())
        }
    }
}

/// Traversal settings of one aggregation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregatorOptions {
    /// Extra include directories handed to the parser.
    pub include_dirs: Vec<PathBuf>,
    /// Enqueue included files after the root.
    pub follow_includes: bool,
    /// When non-empty, an include is followed only if one of these matches.
    pub include_patterns: Vec<String>,
    /// An include matching any of these is never followed.
    pub exclude_patterns: Vec<String>,
}

impl Default for AggregatorOptions {
    fn default() -> Self {
        Self {
            include_dirs: Vec::new(),
            follow_includes: true,
            include_patterns: Vec::new(),
            exclude_patterns: Vec::new(),
        }
    }
}

/// Compiled include/exclude patterns, anchored at the start of the path.
#[derive(Debug, Clone)]
struct IncludeFilter {
    include: Vec<Regex>,
    exclude: Vec<Regex>,
}

impl IncludeFilter {
    fn new(options: &AggregatorOptions) -> Result<Self, FerryError> {
        Ok(Self {
            include: compile(&options.include_patterns)?,
            exclude: compile(&options.exclude_patterns)?,
        })
    }

    fn allows(&self, path: &Path) -> bool {
        let text = path.to_string_lossy();
        if self.exclude.iter().any(|re| re.is_match(&text)) {
            return false;
        }
        self.include.is_empty() || self.include.iter().any(|re| re.is_match(&text))
    }
}

fn compile(patterns: &[String]) -> Result<Vec<Regex>, FerryError> {
    patterns
        .iter()
        .map(|pattern| {
            Regex::new(&format!("^(?:{})", pattern)).map_err(|e| FerryError::InvalidPattern {
                pattern: pattern.clone(),
                reason: e.to_string(),
            })
        })
        .collect()
}

// =============================================================================
// AGGREGATOR
// =============================================================================

/// Runs whole extractions against one parser and one policy.
///
/// An `Aggregator` holds no per-run state, so one instance can serve many
/// `obtain` calls, including concurrent ones.
pub struct Aggregator<'a> {
    parser: &'a dyn ParserAdapter,
    policy: &'a dyn Policy,
    options: AggregatorOptions,
    filter: IncludeFilter,
}

impl<'a> Aggregator<'a> {
    /// Fails with `InvalidPattern` when a filter does not compile.
    pub fn new(
        parser: &'a dyn ParserAdapter,
        policy: &'a dyn Policy,
        options: AggregatorOptions,
    ) -> Result<Self, FerryError> {
        let filter = IncludeFilter::new(&options)?;
        Ok(Self {
            parser,
            policy,
            options,
            filter,
        })
    }

    #[must_use]
    pub fn options(&self) -> &AggregatorOptions {
        &self.options
    }

    /// Extract the catalog of `input`, reporting every rejection to `sink`.
    ///
    /// Any parse failure aborts the whole run.
    pub fn obtain(
        &self,
        input: &SourceInput,
        sink: &mut dyn DiagnosticSink,
    ) -> Result<Catalog, FerryError> {
        match input {
            SourceInput::Path(path) => {
                let root = path
                    .canonicalize()
                    .map_err(|e| FerryError::Io(format!("{}: {}", path.display(), e)))?;
                self.run(&root, None, sink)
            }
            SourceInput::Inline(text) => {
                let scratch = write_scratch(text)?;
                let root = scratch
                    .path()
                    .canonicalize()
                    .map_err(|e| FerryError::TemporaryResource(e.to_string()))?;
                // An early return drops `scratch`, which removes the file.
                let catalog = self.run(&root, Some(&root), sink)?;
                scratch
                    .close()
                    .map_err(|e| FerryError::TemporaryResource(e.to_string()))?;
                Ok(catalog)
            }
        }
    }

    fn run(
        &self,
        root: &Path,
        inline_root: Option<&Path>,
        sink: &mut dyn DiagnosticSink,
    ) -> Result<Catalog, FerryError> {
        let mut session = ResolutionSession::new();
        let mut catalog = Catalog::new();
        let mut queue = VecDeque::from([root.to_path_buf()]);
        let mut parsed = BTreeSet::new();

        while let Some(file) = queue.pop_front() {
            tracing::debug!(file = %file.display(), queued = queue.len(), "Processing file");
            parsed.insert(file.clone());

            let unit = self.parser.parse(&file, &self.options.include_dirs)?;
            self.process(&unit, &file, inline_root, &mut session, &mut catalog, sink)?;

            if !self.options.follow_includes {
                continue;
            }
            for edge in &unit.includes {
                let target = &edge.target;
                if !self.filter.allows(target) {
                    tracing::debug!(include = %target.display(), "Include filtered out");
                    continue;
                }
                if parsed.contains(target) || queue.contains(target) {
                    continue;
                }
                tracing::debug!(include = %target.display(), "Include queued");
                queue.push_back(target.clone());
            }
        }

        Ok(catalog)
    }

    /// Build, resolve and bucket the entities of one processed file.
    fn process(
        &self,
        unit: &TranslationUnit,
        file: &Path,
        inline_root: Option<&Path>,
        session: &mut ResolutionSession,
        catalog: &mut Catalog,
        sink: &mut dyn DiagnosticSink,
    ) -> Result<(), FerryError> {
        session.set_aliases(AliasTable::build(unit, self.policy)?);
        let entities = EntityBuilder::new(session.aliases()).collect(unit, file);

        // First definition of a name wins.
        let mut candidates: BTreeMap<String, Struct> = BTreeMap::new();
        for record in entities.structs {
            candidates.entry(record.name.clone()).or_insert(record);
        }

        let origin_of = |path: &Path| -> Origin {
            match inline_root {
                Some(root) if root == path => None,
                _ => Some(path.to_path_buf()),
            }
        };

        let mut resolver = Resolver::new(session, &candidates, self.policy, file);
        if let Some(root) = inline_root {
            resolver = resolver.with_inline_root(root);
        }
        let functions: Vec<FunctionEntry> = entities
            .functions
            .iter()
            .filter(|function| resolver.verify_function(function))
            .map(FunctionEntry::from)
            .collect();
        let resolution = resolver.finish();

        for diagnostic in &resolution.diagnostics {
            sink.report(diagnostic);
        }

        catalog
            .bucket(origin_of(file), unit.includes_of(file).cloned())
            .function_list
            .extend(functions);

        for name in &resolution.accepted_structs {
            if let Some(record) = candidates.get(name) {
                catalog
                    .bucket(origin_of(&record.file), unit.includes_of(&record.file).cloned())
                    .struct_list
                    .push(StructEntry::from(record));
            }
        }
        Ok(())
    }
}

/// Write inline source to a `.cpp` scratch file.
fn write_scratch(text: &str) -> Result<NamedTempFile, FerryError> {
    let mut scratch = tempfile::Builder::new()
        .prefix(INLINE_SOURCE_PREFIX)
        .suffix(INLINE_SOURCE_SUFFIX)
        .tempfile()
        .map_err(|e| FerryError::TemporaryResource(e.to_string()))?;
    scratch
        .write_all(text.as_bytes())
        .and_then(|()| scratch.flush())
        .map_err(|e| FerryError::TemporaryResource(e.to_string()))?;
    Ok(scratch)
}

// =============================================================================
// TESTS
// =============================================================================
